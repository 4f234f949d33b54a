use crate::analysis::{
    AnalysisConfig, DEFAULT_EPOCH_LENGTH, DEFAULT_SYSTEM_CONTRACTS, DEFAULT_TARGET_BLOCK,
    DEFAULT_TICK_STEP,
};
use anyhow::Error;
use std::{path::PathBuf, str::FromStr};
use tracing::{info, warn};

pub struct Config {
    pub input_dir: PathBuf,
    pub output_file: PathBuf,
    pub analysis: AnalysisConfig,
}

fn parse_number<T>(name: &str, value: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("{} must be a number, got '{}': {}", name, value, e))
}

fn parse_positive(name: &str, value: &str) -> Result<usize, Error> {
    let parsed = parse_number::<usize>(name, value)?;
    if parsed == 0 {
        return Err(anyhow::anyhow!("{} must be a positive number", name));
    }
    Ok(parsed)
}

fn parse_address_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|address| address.trim().to_lowercase())
        .filter(|address| !address.is_empty())
        .collect()
}

impl Config {
    pub fn read_env_variables() -> Result<Self, Error> {
        // Load environment variables from .env file
        dotenvy::dotenv().ok();

        const INPUT_DIR: &str = "INPUT_DIR";
        let input_dir = std::env::var(INPUT_DIR).unwrap_or_else(|_| "output".to_string());

        let output_file =
            std::env::var("OUTPUT_FILE").unwrap_or_else(|_| "results.html".to_string());

        let target_block_number = parse_number::<u64>(
            "TARGET_BLOCK",
            &std::env::var("TARGET_BLOCK").unwrap_or(DEFAULT_TARGET_BLOCK.to_string()),
        )?;

        let epoch_length = parse_positive(
            "EPOCH_LENGTH",
            &std::env::var("EPOCH_LENGTH").unwrap_or(DEFAULT_EPOCH_LENGTH.to_string()),
        )?;

        let tick_step = parse_positive(
            "TICK_STEP",
            &std::env::var("TICK_STEP").unwrap_or(DEFAULT_TICK_STEP.to_string()),
        )?;

        const SYSTEM_CONTRACTS: &str = "SYSTEM_CONTRACTS";
        let system_contracts = match std::env::var(SYSTEM_CONTRACTS) {
            Ok(value) => parse_address_list(&value),
            Err(_) => DEFAULT_SYSTEM_CONTRACTS
                .iter()
                .map(|c| c.to_string())
                .collect(),
        };
        if system_contracts.is_empty() {
            warn!(
                "{} is empty, duplicated consensus transactions will not be reported",
                SYSTEM_CONTRACTS
            );
        }

        let config = Self {
            input_dir: PathBuf::from(input_dir),
            output_file: PathBuf::from(output_file),
            analysis: AnalysisConfig {
                target_block_number,
                epoch_length,
                tick_step,
                system_contracts,
            },
        };

        info!(
            r#"
Configuration:
Input directory: {}
Output file: {}
Target block: {}
Epoch length: {} blocks
Tick step: {}
System contracts: {:?}
"#,
            config.input_dir.display(),
            config.output_file.display(),
            config.analysis.target_block_number,
            config.analysis.epoch_length,
            config.analysis.tick_step,
            config.analysis.system_contracts,
        );

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number::<u64>("TARGET_BLOCK", " 7074000 ").unwrap(), 7_074_000);
        let err = parse_number::<u64>("TARGET_BLOCK", "abc").unwrap_err();
        assert!(err.to_string().contains("TARGET_BLOCK must be a number"));
    }

    #[test]
    fn test_parse_positive_rejects_zero() {
        assert_eq!(parse_positive("EPOCH_LENGTH", "900").unwrap(), 900);
        assert!(parse_positive("EPOCH_LENGTH", "0").is_err());
        assert!(parse_positive("EPOCH_LENGTH", "-1").is_err());
    }

    #[test]
    fn test_parse_address_list() {
        assert_eq!(
            parse_address_list("XDC01, 0xAB ,,"),
            vec!["xdc01".to_string(), "0xab".to_string()]
        );
        assert!(parse_address_list("").is_empty());
    }
}
