use super::epoch::EpochRange;
use crate::chain::Block;
use anyhow::Error;
use std::collections::HashMap;

/// Labels every miner of an epoch with a small integer, in order of first
/// appearance. The first miner seen gets 0.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NodeIndex {
    indices: HashMap<String, usize>,
    addresses: Vec<String>,
    block_counts: Vec<usize>,
}

impl NodeIndex {
    pub fn from_range(blocks: &[Block], range: EpochRange) -> Result<Self, Error> {
        let epoch_blocks = blocks.get(range.indices()).ok_or_else(|| {
            anyhow::anyhow!(
                "NodeIndex: range [{}, {}) exceeds the {} loaded blocks",
                range.start,
                range.end,
                blocks.len()
            )
        })?;

        let mut node_index = NodeIndex::default();
        for block in epoch_blocks {
            node_index.record(&block.miner_address);
        }
        Ok(node_index)
    }

    fn record(&mut self, address: &str) {
        let address = address.to_lowercase();
        let next = self.addresses.len();
        let index = *self.indices.entry(address.clone()).or_insert(next);
        if index == next {
            self.addresses.push(address);
            self.block_counts.push(0);
        }
        if let Some(count) = self.block_counts.get_mut(index) {
            *count = count.saturating_add(1);
        }
    }

    pub fn index_of(&self, address: &str) -> Option<usize> {
        self.indices.get(&address.to_lowercase()).copied()
    }

    pub fn address_of(&self, index: usize) -> Option<&str> {
        self.addresses.get(index).map(String::as_str)
    }

    /// Number of blocks mined by each index within the epoch.
    pub fn block_counts(&self) -> &[usize] {
        &self.block_counts
    }

    pub fn len(&self) -> usize {
        self.addresses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }
}
