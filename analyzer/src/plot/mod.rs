pub mod figure;

use crate::analysis::Analysis;
use anyhow::Error;

/// Renders the analysis as a standalone HTML page with plotly.js inlined, so
/// the page renders without network access.
///
/// The output depends only on `analysis`: the same block dump always renders
/// to the same bytes.
pub fn render_html(analysis: &Analysis) -> Result<String, Error> {
    Ok(figure::build_figure(analysis)?.to_html())
}
