pub mod duplicates;
pub mod epoch;
pub mod node_index;
pub mod series;

use crate::chain::Block;
use crate::utils::logging::EPOCH_SUMMARY_TARGET;
use anyhow::Error;
use duplicates::{find_duplicate_transactions, DuplicateTransaction};
use epoch::{partition_epochs, Epoch};
use node_index::NodeIndex;
use series::Series;
use tracing::{debug, info, warn};

pub const DEFAULT_TARGET_BLOCK: u64 = 7_074_000;
pub const DEFAULT_EPOCH_LENGTH: usize = 900;
pub const DEFAULT_TICK_STEP: usize = 300;
pub const DEFAULT_SYSTEM_CONTRACTS: [&str; 2] = [
    "xdc0000000000000000000000000000000000000092",
    "xdc0000000000000000000000000000000000000094",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub target_block_number: u64,
    pub epoch_length: usize,
    pub tick_step: usize,
    pub system_contracts: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            target_block_number: DEFAULT_TARGET_BLOCK,
            epoch_length: DEFAULT_EPOCH_LENGTH,
            tick_step: DEFAULT_TICK_STEP,
            system_contracts: DEFAULT_SYSTEM_CONTRACTS
                .iter()
                .map(|c| c.to_string())
                .collect(),
        }
    }
}

/// Everything derived from one block dump.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub target_block_number: u64,
    pub target_index: usize,
    pub epochs: Vec<Epoch>,
    pub miner_series: Series<usize>,
    pub size_series: Series<u64>,
    pub interval_series: Series<i64>,
    pub tick_values: Vec<i64>,
    pub duplicates: Vec<DuplicateTransaction>,
}

/// Position of the target block, counted from the first record.
pub fn target_index(blocks: &[Block], target_block_number: u64) -> Result<usize, Error> {
    let first = blocks
        .first()
        .ok_or_else(|| anyhow::anyhow!("No block records loaded"))?;
    let offset = target_block_number.checked_sub(first.number).ok_or_else(|| {
        anyhow::anyhow!(
            "Target block {} precedes the first loaded block {}",
            target_block_number,
            first.number
        )
    })?;
    let index = usize::try_from(offset)?;
    if index >= blocks.len() {
        return Err(anyhow::anyhow!(
            "Target block {} is beyond the {} loaded blocks starting at {}",
            target_block_number,
            blocks.len(),
            first.number
        ));
    }
    Ok(index)
}

const MAX_REPORTED_GAPS: usize = 5;

/// Pairs of consecutive records whose heights are not consecutive.
fn find_gaps(blocks: &[Block]) -> Vec<(u64, u64)> {
    blocks
        .windows(2)
        .filter(|pair| pair[0].number.checked_add(1) != Some(pair[1].number))
        .map(|pair| (pair[0].number, pair[1].number))
        .collect()
}

fn warn_on_gaps(blocks: &[Block]) {
    let gaps = find_gaps(blocks);
    for (previous, next) in gaps.iter().take(MAX_REPORTED_GAPS) {
        warn!(
            "Block {} follows block {}: positions no longer match heights",
            next, previous
        );
    }
    if gaps.len() > MAX_REPORTED_GAPS {
        warn!(
            "{} gaps in block numbers in total, only the first {} are listed",
            gaps.len(),
            MAX_REPORTED_GAPS
        );
    }
}

pub fn analyze(blocks: &[Block], config: &AnalysisConfig) -> Result<Analysis, Error> {
    let target_index = target_index(blocks, config.target_block_number)?;
    warn_on_gaps(blocks);

    let epochs = partition_epochs(blocks.len(), target_index, config.epoch_length)?
        .into_iter()
        .map(|range| {
            NodeIndex::from_range(blocks, range).map(|nodes| Epoch { range, nodes })
        })
        .collect::<Result<Vec<_>, Error>>()?;
    debug!("Partitioned {} blocks into {} epochs", blocks.len(), epochs.len());

    let miner_series = series::build_miner_series(blocks, &epochs, target_index)?;
    let size_series = series::build_size_series(blocks, target_index)?;
    let interval_series = series::build_interval_series(blocks, target_index)?;

    let first_offset = miner_series.offsets.first().copied().unwrap_or_default();
    let last_offset = miner_series.offsets.last().copied().unwrap_or_default();
    let tick_values = series::tick_values(first_offset, last_offset, config.tick_step)?;

    let duplicates = find_duplicate_transactions(blocks, &config.system_contracts);

    let analysis = Analysis {
        target_block_number: config.target_block_number,
        target_index,
        epochs,
        miner_series,
        size_series,
        interval_series,
        tick_values,
        duplicates,
    };
    log_epoch_summaries(&analysis)?;
    Ok(analysis)
}

fn log_epoch_summaries(analysis: &Analysis) -> Result<(), Error> {
    for epoch in &analysis.epochs {
        let start_offset = series::relative_offset(epoch.range.start, analysis.target_index)?;
        let busiest = epoch
            .nodes
            .block_counts()
            .iter()
            .enumerate()
            .max_by_key(|(index, count)| (**count, std::cmp::Reverse(*index)))
            .map(|(index, count)| {
                format!(
                    "{} ({} blocks)",
                    epoch.nodes.address_of(index).unwrap_or_default(),
                    count
                )
            })
            .unwrap_or_default();
        info!(
            target: EPOCH_SUMMARY_TARGET,
            "epoch [{}, {}) offset {:>6} | {:>4} blocks | {:>3} miners | busiest {}",
            epoch.range.start,
            epoch.range.end,
            start_offset,
            epoch.range.len(),
            epoch.nodes.len(),
            busiest
        );
    }
    if !analysis.duplicates.is_empty() {
        warn!(
            "{} duplicated consensus transactions found",
            analysis.duplicates.len()
        );
    }
    Ok(())
}
