use crate::analysis::Analysis;
use anyhow::Error;
use plotly::{
    common::{AxisSide, Mode, Title, Visible},
    layout::{Annotation, Axis, HoverMode},
    Layout, Plot, Scatter,
};

const MINER_PANEL_TITLE: &str = "The miner of each block, indexed within its epoch";
const SIZE_PANEL_TITLE: &str = "Block size and latency over time";

// Vertical split of the two panels, in paper coordinates.
const TOP_PANEL_DOMAIN: [f64; 2] = [0.575, 1.0];
const BOTTOM_PANEL_DOMAIN: [f64; 2] = [0.0, 0.425];

fn panel_title(text: &str, y: f64) -> Annotation {
    Annotation::new()
        .text(text)
        .show_arrow(false)
        .x(0.5)
        .x_ref("paper")
        .y(y)
        .y_ref("paper")
}

fn tick_positions(ticks: &[i64]) -> Result<Vec<f64>, Error> {
    ticks
        .iter()
        .map(|tick| {
            i32::try_from(*tick)
                .map(f64::from)
                .map_err(|e| anyhow::anyhow!("tick_positions: tick {} out of range: {}", tick, e))
        })
        .collect()
}

/// Builds the plot with the miner index on top and block size plus block
/// interval below.
pub fn build_figure(analysis: &Analysis) -> Result<Plot, Error> {
    let title = format!("Miner rotation around block {}", analysis.target_block_number);
    let x_title = format!("block number (0 is block-{})", analysis.target_block_number);

    let miners = Scatter::new(
        analysis.miner_series.offsets.clone(),
        analysis.miner_series.values.clone(),
    )
    .name("miner idx")
    .mode(Mode::Markers)
    .hover_text_array(analysis.miner_series.labels.clone())
    .x_axis("x")
    .y_axis("y");

    let sizes = Scatter::new(
        analysis.size_series.offsets.clone(),
        analysis.size_series.values.clone(),
    )
    .name("size")
    .mode(Mode::Markers)
    .x_axis("x2")
    .y_axis("y2");

    let intervals = Scatter::new(
        analysis.interval_series.offsets.clone(),
        analysis.interval_series.values.clone(),
    )
    .name("block timestamp interval")
    .mode(Mode::Markers)
    .visible(Visible::LegendOnly)
    .x_axis("x2")
    .y_axis("y3");

    let layout = Layout::new()
        .title(Title::with_text(title.as_str()))
        .height(900)
        .hover_mode(HoverMode::Closest)
        .annotations(vec![
            panel_title(MINER_PANEL_TITLE, TOP_PANEL_DOMAIN[1]),
            panel_title(SIZE_PANEL_TITLE, BOTTOM_PANEL_DOMAIN[1]),
        ])
        .x_axis(
            Axis::new()
                .anchor("y")
                .domain(&[0.0, 1.0])
                .title(Title::with_text(x_title.as_str()))
                .tick_values(tick_positions(&analysis.tick_values)?),
        )
        .y_axis(
            Axis::new()
                .anchor("x")
                .domain(&TOP_PANEL_DOMAIN)
                .title(Title::with_text("master node index within the epoch")),
        )
        .x_axis2(
            Axis::new()
                .anchor("y2")
                .domain(&[0.0, 0.94])
                .title(Title::with_text(x_title.as_str())),
        )
        .y_axis2(
            Axis::new()
                .anchor("x2")
                .domain(&BOTTOM_PANEL_DOMAIN)
                .title(Title::with_text("block size")),
        )
        .y_axis3(
            Axis::new()
                .anchor("x2")
                .overlaying("y2")
                .side(AxisSide::Right)
                .title(Title::with_text("time interval (second)")),
        );

    let mut plot = Plot::new();
    plot.add_trace(miners);
    plot.add_trace(sizes);
    plot.add_trace(intervals);
    plot.set_layout(layout);
    Ok(plot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{analyze, AnalysisConfig};
    use crate::chain::Block;
    use serde_json::{json, Value};

    #[test]
    fn test_figure_panels() {
        let config = AnalysisConfig {
            target_block_number: 1000,
            ..AnalysisConfig::default()
        };
        let blocks: Vec<Block> = (0..1200u64)
            .map(|i| Block {
                number: 400 + i,
                timestamp: 2 * i,
                size: 700,
                miner_address: format!("0x{}", i % 3),
                transactions: vec![],
            })
            .collect();
        let analysis = analyze(&blocks, &config).unwrap();
        let plot = build_figure(&analysis).unwrap();
        let figure: Value = serde_json::from_str(&plot.to_json()).unwrap();

        let data = figure["data"].as_array().unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data[0]["x"].as_array().unwrap().len(), 1200);
        assert_eq!(data[1]["y"].as_array().unwrap().len(), 1199);
        assert_eq!(data[2]["yaxis"], "y3");
        assert_eq!(data[2]["visible"], "legendonly");
        assert_eq!(
            figure["layout"]["xaxis"]["tickvals"],
            json!([-600.0, -300.0, 0.0, 300.0])
        );
        assert_eq!(
            figure["layout"]["xaxis"]["title"]["text"],
            "block number (0 is block-1000)"
        );
    }

    #[test]
    fn test_tick_positions_out_of_range() {
        assert_eq!(tick_positions(&[-300, 0]).unwrap(), vec![-300.0, 0.0]);
        assert!(tick_positions(&[i64::MAX]).is_err());
    }
}
