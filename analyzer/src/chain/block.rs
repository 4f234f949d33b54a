use anyhow::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::path::Path;

/// One record of a block dump.
///
/// `miner_address` is lowercased while deserializing, so two records mined by
/// the same node always carry the same string.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    #[serde(deserialize_with = "deserialize_quantity")]
    pub number: u64,
    #[serde(deserialize_with = "deserialize_quantity")]
    pub timestamp: u64,
    #[serde(deserialize_with = "deserialize_quantity")]
    pub size: u64,
    #[serde(deserialize_with = "deserialize_lowercase")]
    pub miner_address: String,
    #[serde(default, deserialize_with = "deserialize_transactions")]
    pub transactions: Vec<BlockTransaction>,
}

impl Block {
    pub fn mined_at(&self) -> Option<DateTime<Utc>> {
        let secs = i64::try_from(self.timestamp).ok()?;
        DateTime::from_timestamp(secs, 0)
    }
}

/// The subset of a full transaction object needed to spot repeated
/// consensus calls.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BlockTransaction {
    pub hash: String,
    #[serde(deserialize_with = "deserialize_lowercase")]
    pub from: String,
    #[serde(default, deserialize_with = "deserialize_optional_lowercase")]
    pub to: Option<String>,
    #[serde(deserialize_with = "deserialize_quantity")]
    pub nonce: u64,
    #[serde(default)]
    pub input: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Quantity {
    Number(u64),
    Text(String),
}

fn parse_quantity(text: &str) -> Result<u64, String> {
    let text = text.trim();
    let parsed = match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => text.parse::<u64>(),
    };
    parsed.map_err(|e| format!("invalid quantity '{text}': {e}"))
}

/// Accepts a JSON integer, a decimal string or a `0x` prefixed hex string.
fn deserialize_quantity<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Quantity::deserialize(deserializer)? {
        Quantity::Number(n) => Ok(n),
        Quantity::Text(s) => parse_quantity(&s).map_err(serde::de::Error::custom),
    }
}

fn deserialize_lowercase<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    Ok(s.to_lowercase())
}

fn deserialize_optional_lowercase<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Deserialize::deserialize(deserializer)?;
    Ok(s.map(|s| s.to_lowercase()))
}

// Dumps fetched without full transaction objects hold plain hashes; those
// carry nothing to compare, so only objects are kept. Transactions only feed
// the duplicate finder, so an undecodable object is skipped rather than
// failing the block.
fn deserialize_transactions<'de, D>(deserializer: D) -> Result<Vec<BlockTransaction>, D::Error>
where
    D: Deserializer<'de>,
{
    let values: Option<Vec<Value>> = Deserialize::deserialize(deserializer)?;
    Ok(values
        .unwrap_or_default()
        .into_iter()
        .filter(Value::is_object)
        .filter_map(|v| match serde_json::from_value::<BlockTransaction>(v) {
            Ok(tx) => Some(tx),
            Err(e) => {
                tracing::warn!("Skipping undecodable transaction object: {}", e);
                None
            }
        })
        .collect())
}

/// Lowercases an address and maps the XDC `xdc` prefix onto `0x`, so the
/// same account compares equal whichever form the node returned.
pub fn normalize_address(address: &str) -> String {
    let lower = address.trim().to_lowercase();
    match lower.strip_prefix("xdc") {
        Some(rest) => format!("0x{rest}"),
        None => lower,
    }
}

pub fn parse_blocks(json: &str) -> Result<Vec<Block>, Error> {
    serde_json::from_str(json).map_err(|e| anyhow::anyhow!("Failed to parse block records: {}", e))
}

pub fn load_blocks(path: &Path) -> Result<Vec<Block>, Error> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?;
    let blocks = parse_blocks(&content)
        .map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))?;
    tracing::debug!("Loaded {} block records from {}", blocks.len(), path.display());
    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mixed_quantities() {
        let json = r#"[
            {"number": 7074000, "timestamp": "1600000000", "size": "0x2a3", "minerAddress": "0xAbC"},
            {"number": "0x6BF0D1", "timestamp": 1600000002, "size": 700, "minerAddress": "0xdef"}
        ]"#;
        let blocks = parse_blocks(json).unwrap();
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].number, 7_074_000);
        assert_eq!(blocks[0].timestamp, 1_600_000_000);
        assert_eq!(blocks[0].size, 0x2a3);
        assert_eq!(blocks[0].miner_address, "0xabc");
        assert_eq!(blocks[1].number, 7_074_001);
        assert!(blocks[1].transactions.is_empty());
    }

    #[test]
    fn test_missing_miner_address_is_rejected() {
        let json = r#"[{"number": 1, "timestamp": 2, "size": 3}]"#;
        let err = parse_blocks(json).unwrap_err();
        assert!(err.to_string().contains("minerAddress"));
    }

    #[test]
    fn test_malformed_number_is_rejected() {
        let json = r#"[{"number": "seven", "timestamp": 2, "size": 3, "minerAddress": "0x1"}]"#;
        assert!(parse_blocks(json).is_err());
    }

    #[test]
    fn test_transactions_keep_only_objects() {
        let json = r#"[{
            "number": 1, "timestamp": 2, "size": 3, "minerAddress": "xdcAA",
            "transactions": [
                "0xdeadbeef",
                {"hash": "0x01", "from": "xdcAA", "to": "XDC0000000000000000000000000000000000000089",
                 "nonce": "0x5", "input": "0xe341eaa4", "gas": "0x1"}
            ]
        }]"#;
        let blocks = parse_blocks(json).unwrap();
        let txs = &blocks[0].transactions;
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].from, "xdcaa");
        assert_eq!(
            txs[0].to.as_deref(),
            Some("xdc0000000000000000000000000000000000000089")
        );
        assert_eq!(txs[0].nonce, 5);
    }

    #[test]
    fn test_undecodable_transaction_is_skipped() {
        let json = r#"[{
            "number": 1, "timestamp": 2, "size": 3, "minerAddress": "0xaa",
            "transactions": [
                {"from": "0xaa", "to": "0x92", "nonce": "0x1", "input": "0x"},
                {"hash": "0x02", "from": "0xaa", "to": "0x92", "nonce": "not-a-nonce"},
                {"hash": "0x03", "from": "0xaa", "to": "0x92", "nonce": 4, "input": "0x"}
            ]
        }]"#;
        let blocks = parse_blocks(json).unwrap();
        assert_eq!(blocks[0].miner_address, "0xaa");
        assert_eq!(blocks[0].transactions.len(), 1);
        assert_eq!(blocks[0].transactions[0].hash, "0x03");
    }

    #[test]
    fn test_normalize_address() {
        assert_eq!(normalize_address("XDCab12"), "0xab12");
        assert_eq!(normalize_address("0xAB12"), "0xab12");
    }

    #[test]
    fn test_mined_at() {
        let json = r#"[{"number": 1, "timestamp": 86400, "size": 3, "minerAddress": "0x1"}]"#;
        let blocks = parse_blocks(json).unwrap();
        let mined_at = blocks[0].mined_at().unwrap();
        assert_eq!(mined_at.to_rfc3339(), "1970-01-02T00:00:00+00:00");
    }
}
