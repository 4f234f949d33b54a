use super::node_index::NodeIndex;
use anyhow::Error;
use std::ops::Range;

/// Half-open range `[start, end)` of block positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EpochRange {
    pub start: usize,
    pub end: usize,
}

impl EpochRange {
    pub fn new(start: usize, end: usize) -> Self {
        EpochRange { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn indices(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// An epoch range together with the miner labels assigned inside it.
#[derive(Debug, Clone)]
pub struct Epoch {
    pub range: EpochRange,
    pub nodes: NodeIndex,
}

/// Tiles `[0, total)` into windows of `epoch_length` blocks so that one window
/// starts exactly at `target_index`.
///
/// Windows before the target are cut back from it, which leaves a shorter
/// leading window when `target_index` is not a multiple of the epoch length.
/// The last window ends at `total`. A sequence shorter than one epoch is
/// returned as a single window.
pub fn partition_epochs(
    total: usize,
    target_index: usize,
    epoch_length: usize,
) -> Result<Vec<EpochRange>, Error> {
    if epoch_length == 0 {
        return Err(anyhow::anyhow!("partition_epochs: epoch length must be positive"));
    }
    if total == 0 {
        return Ok(vec![]);
    }
    if target_index >= total {
        return Err(anyhow::anyhow!(
            "partition_epochs: target index {} outside of the {} loaded blocks",
            target_index,
            total
        ));
    }
    if total < epoch_length {
        return Ok(vec![EpochRange::new(0, total)]);
    }

    let first_boundary = target_index
        .checked_rem(epoch_length)
        .ok_or_else(|| anyhow::anyhow!("partition_epochs: remainder by zero"))?;

    let mut epochs = Vec::new();
    if first_boundary > 0 {
        epochs.push(EpochRange::new(0, first_boundary));
    }
    let mut start = first_boundary;
    while start < total {
        let end = start.saturating_add(epoch_length).min(total);
        epochs.push(EpochRange::new(start, end));
        start = end;
    }
    Ok(epochs)
}
