use crate::{
    analysis::{self, Analysis},
    chain::{block::load_blocks, Block},
    plot,
    utils::{
        config::Config,
        file_operations::{select_input_file, write_output},
    },
};
use anyhow::Error;
use std::path::{Path, PathBuf};
use tracing::info;

fn describe_span(path: &Path, blocks: &[Block]) {
    let (Some(first), Some(last)) = (blocks.first(), blocks.last()) else {
        return;
    };
    let format_time = |block: &Block| {
        block
            .mined_at()
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| block.timestamp.to_string())
    };
    info!(
        "Loaded {} blocks #{}..#{} ({} .. {}) from {}",
        blocks.len(),
        first.number,
        last.number,
        format_time(first),
        format_time(last),
        path.display()
    );
}

/// Loads the selected block dump and derives the series without touching the
/// output file.
pub fn load_and_analyze(config: &Config, identifier: Option<&str>) -> Result<Analysis, Error> {
    let input = select_input_file(&config.input_dir, identifier)?;
    let blocks = load_blocks(&input)?;
    describe_span(&input, &blocks);
    analysis::analyze(&blocks, &config.analysis)
}

/// Runs the whole pipeline and returns the path of the written chart. Nothing
/// is written unless every stage succeeds.
pub fn run(config: &Config, identifier: Option<&str>) -> Result<PathBuf, Error> {
    let analysis = load_and_analyze(config, identifier)?;
    let html = plot::render_html(&analysis)?;
    write_output(&config.output_file, &html)?;
    Ok(config.output_file.clone())
}
