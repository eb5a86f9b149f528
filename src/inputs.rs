//! Input aggregation: many input files, one text block.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

/// Why an input file was left out of the aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    Missing,
    Empty,
    Unreadable(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::Missing => f.write_str("missing"),
            SkipReason::Empty => f.write_str("empty"),
            SkipReason::Unreadable(e) => write!(f, "unreadable: {e}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Survivors joined with `\n`, plus what was dropped along the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Aggregate {
    pub text: String,
    pub used: Vec<String>,
    pub skipped: Vec<Skipped>,
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("no valid input files to process in {} ({skipped} skipped)", .dir.display())]
    NoValidInputs { dir: PathBuf, skipped: usize },
}

/// Reads `names` from `dir` in order, trimming each file. Missing, unreadable
/// and empty files are skipped with a warning; if none survive the whole
/// aggregation fails.
pub fn aggregate(dir: &Path, names: &[String]) -> Result<Aggregate, InputError> {
    let mut parts = Vec::with_capacity(names.len());
    let mut used = Vec::with_capacity(names.len());
    let mut skipped = Vec::new();

    for name in names {
        let path = dir.join(name);
        let reason = if !path.is_file() {
            warn!(path = %path.display(), "input file does not exist, skipping");
            SkipReason::Missing
        } else {
            match std::fs::read_to_string(&path) {
                Ok(content) if content.trim().is_empty() => {
                    warn!(path = %path.display(), "input file is empty, skipping");
                    SkipReason::Empty
                }
                Ok(content) => {
                    parts.push(content.trim().to_string());
                    used.push(name.clone());
                    continue;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "error reading input file, skipping");
                    SkipReason::Unreadable(e.to_string())
                }
            }
        };
        skipped.push(Skipped { path, reason });
    }

    if parts.is_empty() {
        return Err(InputError::NoValidInputs {
            dir: dir.to_path_buf(),
            skipped: skipped.len(),
        });
    }

    Ok(Aggregate {
        text: parts.join("\n"),
        used,
        skipped,
    })
}
