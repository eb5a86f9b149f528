//! Output dispatch: echo the raw response, then persist it by kind.
//!
//! `.json` jobs parse the response and wrap it as `{"response": <value>}`.
//! `.sql` and `.md` jobs store the text as-is with a guaranteed trailing
//! newline. The raw response reaches stdout before any parsing, so the
//! operator sees what the model said even when the parse fails.

use std::io::Write;
use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;
use tracing::info;

use crate::job::OutputExt;

/// Top-level key wrapping structured responses.
pub const RESPONSE_KEY: &str = "response";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("invalid JSON in model response: {0}")]
    Format(#[source] serde_json::Error),

    #[error("could not serialize output document: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("could not create output directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("could not echo response to stdout: {0}")]
    Echo(#[source] std::io::Error),
}

/// What ended up on disk.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputArtifact {
    Structured { path: PathBuf, value: Value },
    RawText { path: PathBuf },
}

impl OutputArtifact {
    pub fn path(&self) -> &Path {
        match self {
            OutputArtifact::Structured { path, .. } | OutputArtifact::RawText { path } => path,
        }
    }
}

/// Parses a structured response. Leading/trailing whitespace is tolerated.
pub fn parse_structured(raw: &str) -> Result<Value, OutputError> {
    serde_json::from_str(raw).map_err(OutputError::Format)
}

/// Serializes `value` under [`RESPONSE_KEY`] with two-space indentation.
/// `serde_json` leaves non-ASCII characters unescaped.
pub fn render_structured(value: Value) -> Result<String, OutputError> {
    let mut doc = serde_json::Map::new();
    doc.insert(RESPONSE_KEY.to_string(), value);
    serde_json::to_string_pretty(&Value::Object(doc)).map_err(OutputError::Encode)
}

/// Returns `raw` ending in exactly one added newline if it had none.
pub fn render_raw(raw: &str) -> String {
    if raw.ends_with('\n') {
        raw.to_string()
    } else {
        format!("{raw}\n")
    }
}

/// Writes `raw` for a job of kind `ext` to `output_dir/output_file`, echoing
/// it to `stdout` first.
pub fn dispatch(
    raw: &str,
    ext: OutputExt,
    output_dir: &Path,
    output_file: &str,
    stdout: &mut impl Write,
) -> Result<OutputArtifact, OutputError> {
    std::fs::create_dir_all(output_dir).map_err(|source| OutputError::CreateDir {
        path: output_dir.to_path_buf(),
        source,
    })?;

    writeln!(stdout, "{raw}")
        .and_then(|()| stdout.flush())
        .map_err(OutputError::Echo)?;

    let path = output_dir.join(output_file);
    let (contents, artifact) = if ext.is_structured() {
        let value = parse_structured(raw)?;
        (
            render_structured(value.clone())?,
            OutputArtifact::Structured {
                path: path.clone(),
                value,
            },
        )
    } else {
        (render_raw(raw), OutputArtifact::RawText { path: path.clone() })
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| OutputError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(&path, contents).map_err(|source| OutputError::Write {
        path: path.clone(),
        source,
    })?;

    info!(path = %path.display(), kind = %ext, "output written");
    Ok(artifact)
}
