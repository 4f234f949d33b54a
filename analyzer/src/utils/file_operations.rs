use anyhow::Error;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum InputSelectionError {
    #[error("cannot find any json file in {}, please download one first", .0.display())]
    NoJsonFile(PathBuf),
    #[error(
        "more than one json file in {}: {candidates:?}, pass the name of the one to analyze",
        .dir.display()
    )]
    Ambiguous {
        dir: PathBuf,
        candidates: Vec<String>,
    },
    #[error("block dump {} does not exist", .0.display())]
    NotFound(PathBuf),
    #[error("failed to list {}: {source}", .dir.display())]
    Io {
        dir: PathBuf,
        source: std::io::Error,
    },
}

/// Picks the block dump to analyze.
///
/// With an identifier the dump is `<input_dir>/<identifier>.json`. Without
/// one, `input_dir` must hold exactly one file whose name contains `.json`.
pub fn select_input_file(
    input_dir: &Path,
    identifier: Option<&str>,
) -> Result<PathBuf, InputSelectionError> {
    if let Some(identifier) = identifier {
        let path = input_dir.join(format!("{identifier}.json"));
        if !path.is_file() {
            return Err(InputSelectionError::NotFound(path));
        }
        return Ok(path);
    }

    let entries = std::fs::read_dir(input_dir).map_err(|source| InputSelectionError::Io {
        dir: input_dir.to_path_buf(),
        source,
    })?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| InputSelectionError::Io {
            dir: input_dir.to_path_buf(),
            source,
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.contains(".json") && entry.path().is_file() {
            candidates.push(name);
        }
    }
    candidates.sort();

    if candidates.len() > 1 {
        return Err(InputSelectionError::Ambiguous {
            dir: input_dir.to_path_buf(),
            candidates,
        });
    }
    match candidates.pop() {
        Some(only) => Ok(input_dir.join(only)),
        None => Err(InputSelectionError::NoJsonFile(input_dir.to_path_buf())),
    }
}

pub fn write_output(path: &Path, contents: &str) -> Result<(), Error> {
    std::fs::write(path, contents)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {}", path.display(), e))
}
