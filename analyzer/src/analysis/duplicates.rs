use crate::chain::{block::normalize_address, Block};
use std::collections::HashMap;

/// A consensus transaction whose nonce and input repeat the previous one sent
/// by the same miner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateTransaction {
    pub block_number: u64,
    pub miner_address: String,
    pub hash: String,
    pub nonce: u64,
}

struct LastCall<'a> {
    nonce: u64,
    input: &'a str,
}

/// Scans the transactions a block's own miner sent to one of
/// `system_contracts` and reports those identical to that miner's previous
/// call.
pub fn find_duplicate_transactions(
    blocks: &[Block],
    system_contracts: &[String],
) -> Vec<DuplicateTransaction> {
    let contracts: Vec<String> = system_contracts
        .iter()
        .map(|c| normalize_address(c))
        .collect();

    let mut last_calls: HashMap<String, LastCall> = HashMap::new();
    let mut duplicates = Vec::new();

    for block in blocks {
        let miner = normalize_address(&block.miner_address);
        for tx in &block.transactions {
            let to_system_contract = tx
                .to
                .as_deref()
                .map(normalize_address)
                .is_some_and(|to| contracts.contains(&to));
            if !to_system_contract || normalize_address(&tx.from) != miner {
                continue;
            }

            let repeated = last_calls
                .get(&miner)
                .is_some_and(|last| last.nonce == tx.nonce && last.input == tx.input);
            if repeated {
                tracing::warn!(
                    "Found duplicated transaction {} at block {} from miner {}",
                    tx.hash,
                    block.number,
                    block.miner_address
                );
                duplicates.push(DuplicateTransaction {
                    block_number: block.number,
                    miner_address: block.miner_address.clone(),
                    hash: tx.hash.clone(),
                    nonce: tx.nonce,
                });
            } else {
                last_calls.insert(
                    miner.clone(),
                    LastCall {
                        nonce: tx.nonce,
                        input: &tx.input,
                    },
                );
            }
        }
    }

    duplicates
}
