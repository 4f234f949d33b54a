use super::epoch::Epoch;
use crate::chain::Block;
use anyhow::Error;

/// Values paired with their position relative to the target block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Series<T> {
    pub offsets: Vec<i64>,
    pub values: Vec<T>,
    /// Optional per-point hover labels, empty when unused.
    pub labels: Vec<String>,
}

impl<T> Default for Series<T> {
    fn default() -> Self {
        Series {
            offsets: Vec::new(),
            values: Vec::new(),
            labels: Vec::new(),
        }
    }
}

impl<T> Series<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Series {
            offsets: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            labels: Vec::new(),
        }
    }

    pub fn push(&mut self, offset: i64, value: T) {
        self.offsets.push(offset);
        self.values.push(value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

pub fn relative_offset(index: usize, target_index: usize) -> Result<i64, Error> {
    let index = i64::try_from(index)?;
    let target_index = i64::try_from(target_index)?;
    index
        .checked_sub(target_index)
        .ok_or_else(|| anyhow::anyhow!("relative_offset: subtraction overflow"))
}

/// Size of every block except the last one.
pub fn build_size_series(blocks: &[Block], target_index: usize) -> Result<Series<u64>, Error> {
    let count = blocks.len().saturating_sub(1);
    let mut series = Series::with_capacity(count);
    for (index, block) in blocks.iter().take(count).enumerate() {
        series.push(relative_offset(index, target_index)?, block.size);
    }
    Ok(series)
}

/// Seconds between each block and its successor, placed at the earlier block.
pub fn build_interval_series(
    blocks: &[Block],
    target_index: usize,
) -> Result<Series<i64>, Error> {
    let mut series = Series::with_capacity(blocks.len().saturating_sub(1));
    for (index, pair) in blocks.windows(2).enumerate() {
        let interval = i64::try_from(pair[1].timestamp)?
            .checked_sub(i64::try_from(pair[0].timestamp)?)
            .ok_or_else(|| anyhow::anyhow!("build_interval_series: subtraction overflow"))?;
        series.push(relative_offset(index, target_index)?, interval);
    }
    Ok(series)
}

/// Node index of every block's miner, looked up in the epoch owning the
/// block. Labels carry the miner address for hover text.
pub fn build_miner_series(
    blocks: &[Block],
    epochs: &[Epoch],
    target_index: usize,
) -> Result<Series<usize>, Error> {
    let mut series = Series::with_capacity(blocks.len());
    for epoch in epochs {
        for index in epoch.range.indices() {
            let block = blocks.get(index).ok_or_else(|| {
                anyhow::anyhow!("build_miner_series: no block at position {}", index)
            })?;
            let node = epoch.nodes.index_of(&block.miner_address).ok_or_else(|| {
                anyhow::anyhow!(
                    "build_miner_series: miner {} of block {} missing from its epoch",
                    block.miner_address,
                    block.number
                )
            })?;
            series.push(relative_offset(index, target_index)?, node);
            series.labels.push(block.miner_address.clone());
        }
    }
    Ok(series)
}

/// Every multiple of `step` between `min` and `max` inclusive.
pub fn tick_values(min: i64, max: i64, step: usize) -> Result<Vec<i64>, Error> {
    let step = i64::try_from(step)?;
    if step <= 0 {
        return Err(anyhow::anyhow!("tick_values: step must be positive"));
    }
    let mut tick = min
        .checked_div_euclid(step)
        .and_then(|q| q.checked_mul(step))
        .ok_or_else(|| anyhow::anyhow!("tick_values: overflow"))?;
    if tick < min {
        tick = tick
            .checked_add(step)
            .ok_or_else(|| anyhow::anyhow!("tick_values: overflow"))?;
    }

    let mut ticks = Vec::new();
    while tick <= max {
        ticks.push(tick);
        match tick.checked_add(step) {
            Some(next) => tick = next,
            None => break,
        }
    }
    Ok(ticks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{epoch::EpochRange, node_index::NodeIndex};

    fn blocks(timestamps: &[u64]) -> Vec<Block> {
        timestamps
            .iter()
            .enumerate()
            .map(|(i, ts)| Block {
                number: 100 + i as u64,
                timestamp: *ts,
                size: 500 + i as u64,
                miner_address: format!("0x{}", i % 2),
                transactions: vec![],
            })
            .collect()
    }

    #[test]
    fn test_size_series_excludes_last_block() {
        let blocks = blocks(&[10, 12, 14, 16]);
        let series = build_size_series(&blocks, 1).unwrap();
        assert_eq!(series.offsets, vec![-1, 0, 1]);
        assert_eq!(series.values, vec![500, 501, 502]);
    }

    #[test]
    fn test_interval_series() {
        let blocks = blocks(&[10, 12, 11, 20]);
        let series = build_interval_series(&blocks, 2).unwrap();
        assert_eq!(series.offsets, vec![-2, -1, 0]);
        assert_eq!(series.values, vec![2, -1, 9]);
    }

    #[test]
    fn test_single_block_has_no_size_or_interval() {
        let blocks = blocks(&[10]);
        assert!(build_size_series(&blocks, 0).unwrap().is_empty());
        assert!(build_interval_series(&blocks, 0).unwrap().is_empty());
    }

    #[test]
    fn test_miner_series_uses_owning_epoch() {
        let blocks = blocks(&[0, 2, 4, 6]);
        let ranges = [EpochRange::new(0, 1), EpochRange::new(1, 4)];
        let epochs: Vec<Epoch> = ranges
            .iter()
            .map(|range| Epoch {
                range: *range,
                nodes: NodeIndex::from_range(&blocks, *range).unwrap(),
            })
            .collect();

        let series = build_miner_series(&blocks, &epochs, 1).unwrap();
        assert_eq!(series.offsets, vec![-1, 0, 1, 2]);
        // block 1 ("0x1") opens the second epoch
        assert_eq!(series.values, vec![0, 0, 1, 0]);
        assert_eq!(series.labels, vec!["0x0", "0x1", "0x0", "0x1"]);
    }

    #[test]
    fn test_tick_values() {
        assert_eq!(tick_values(-700, 650, 300).unwrap(), vec![-600, -300, 0, 300, 600]);
        assert_eq!(tick_values(0, 0, 300).unwrap(), vec![0]);
        assert_eq!(tick_values(-300, 300, 300).unwrap(), vec![-300, 0, 300]);
        assert!(tick_values(0, 10, 0).is_err());
    }
}
