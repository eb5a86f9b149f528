//! Job descriptors: `jobs/job-<name>.json`.
//!
//! A descriptor names the prompt template, the input files, the output kind
//! and file, the model and its temperature. [`load`] reads and validates it
//! once; the resulting [`JobDescriptor`] is never modified afterwards.
//!
//! Validation collects every violation instead of stopping at the first one,
//! so an operator fixing a descriptor sees all of its problems at once.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Fields every descriptor must carry, in reporting order.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "template",
    "input",
    "output_ext",
    "output_file",
    "model",
    "temperature",
];

pub const MIN_TEMPERATURE: f64 = 0.0;
pub const MAX_TEMPERATURE: f64 = 2.0;

/// Kind of artifact a job produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputExt {
    #[serde(rename = ".json")]
    Json,
    #[serde(rename = ".sql")]
    Sql,
    #[serde(rename = ".md")]
    Md,
}

impl OutputExt {
    pub const ALL: [OutputExt; 3] = [OutputExt::Json, OutputExt::Sql, OutputExt::Md];

    pub fn as_str(self) -> &'static str {
        match self {
            OutputExt::Json => ".json",
            OutputExt::Sql => ".sql",
            OutputExt::Md => ".md",
        }
    }

    /// Exact match only: `".JSON"` or `"json"` are rejected.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ext| ext.as_str() == s)
    }

    /// Structured kinds are parsed before they are written.
    pub fn is_structured(self) -> bool {
        matches!(self, OutputExt::Json)
    }
}

impl fmt::Display for OutputExt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobDescriptor {
    /// Job name the descriptor was loaded under.
    pub name: String,
    pub template: String,
    /// Input file names in concatenation order. Never empty.
    pub input: Vec<String>,
    pub output_ext: OutputExt,
    /// Relative file name under the output directory.
    pub output_file: String,
    pub model: String,
    /// Within `[0, 2]`.
    pub temperature: f64,
}

/// One problem found in a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    NotAnObject,
    MissingFields(Vec<&'static str>),
    EmptyString { field: &'static str },
    WrongType { field: &'static str, expected: &'static str },
    InvalidInput,
    TemperatureOutOfRange(f64),
    InvalidOutputExt(String),
    ExtensionMismatch { output_file: String, output_ext: OutputExt },
    UnsafeOutputFile(String),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::NotAnObject => write!(f, "descriptor must be a JSON object"),
            Violation::MissingFields(fields) => {
                write!(f, "missing required fields: {}", fields.join(", "))
            }
            Violation::EmptyString { field } => write!(f, "'{field}' must be a non-empty string"),
            Violation::WrongType { field, expected } => {
                write!(f, "'{field}' must be {expected}")
            }
            Violation::InvalidInput => {
                write!(f, "'input' must be a non-empty list of file names")
            }
            Violation::TemperatureOutOfRange(t) => write!(
                f,
                "temperature {t} out of range, must be between \
                 {MIN_TEMPERATURE} and {MAX_TEMPERATURE}"
            ),
            Violation::InvalidOutputExt(ext) => {
                write!(f, "invalid output_ext '{ext}', must be .json, .sql, or .md")
            }
            Violation::ExtensionMismatch {
                output_file,
                output_ext,
            } => write!(f, "output_file '{output_file}' must end with output_ext {output_ext}"),
            Violation::UnsafeOutputFile(file) => write!(
                f,
                "output_file '{file}' must be a relative path without '..' segments"
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum JobError {
    #[error("invalid job name '{0}': must be non-empty and contain no path separators")]
    InvalidName(String),

    #[error("job file {} does not exist", .0.display())]
    NotFound(PathBuf),

    #[error("error reading job file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid JSON in job file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("job file {} is invalid: {}", .path.display(), summarize(.violations))]
    Invalid {
        path: PathBuf,
        violations: Vec<Violation>,
    },
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Descriptor location for `name`: `<jobs_dir>/job-<name>.json`.
pub fn job_path(jobs_dir: &Path, name: &str) -> PathBuf {
    jobs_dir.join(format!("job-{name}.json"))
}

/// Reads and validates the descriptor for job `name`.
pub fn load(jobs_dir: &Path, name: &str) -> Result<JobDescriptor, JobError> {
    if name.is_empty() || name.contains(['/', '\\']) || name == ".." {
        return Err(JobError::InvalidName(name.to_string()));
    }

    let path = job_path(jobs_dir, name);
    if !path.is_file() {
        return Err(JobError::NotFound(path));
    }
    let contents = std::fs::read_to_string(&path).map_err(|source| JobError::Read {
        path: path.clone(),
        source,
    })?;
    let value: Value = serde_json::from_str(&contents).map_err(|source| JobError::Parse {
        path: path.clone(),
        source,
    })?;

    validate(name, &value).map_err(|violations| JobError::Invalid { path, violations })
}

/// Checks a parsed descriptor against every rule and builds the job.
pub fn validate(name: &str, value: &Value) -> Result<JobDescriptor, Vec<Violation>> {
    let Some(obj) = value.as_object() else {
        return Err(vec![Violation::NotAnObject]);
    };

    let mut violations = Vec::new();

    let missing: Vec<&'static str> = REQUIRED_FIELDS
        .into_iter()
        .filter(|field| !obj.contains_key(*field))
        .collect();
    if !missing.is_empty() {
        violations.push(Violation::MissingFields(missing));
    }

    let template = non_empty_string(obj, "template", &mut violations);
    let model = non_empty_string(obj, "model", &mut violations);

    let input = obj.get("input").and_then(|v| {
        let names = v
            .as_array()
            .filter(|items| !items.is_empty())
            .and_then(|items| {
                items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
            });
        if names.is_none() {
            violations.push(Violation::InvalidInput);
        }
        names
    });

    let temperature = obj.get("temperature").and_then(|v| match v.as_f64() {
        Some(t) if (MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&t) => Some(t),
        Some(t) => {
            violations.push(Violation::TemperatureOutOfRange(t));
            None
        }
        None => {
            violations.push(Violation::WrongType {
                field: "temperature",
                expected: "a number",
            });
            None
        }
    });

    let output_ext = obj.get("output_ext").and_then(|v| {
        let ext = v.as_str().and_then(OutputExt::parse);
        if ext.is_none() {
            let shown = v.as_str().map_or_else(|| v.to_string(), str::to_string);
            violations.push(Violation::InvalidOutputExt(shown));
        }
        ext
    });

    let output_file = match obj.get("output_file") {
        None => None,
        Some(Value::String(file)) if file.is_empty() => {
            violations.push(Violation::EmptyString {
                field: "output_file",
            });
            None
        }
        Some(Value::String(file)) => {
            let mut ok = true;
            if is_unsafe_output_path(file) {
                violations.push(Violation::UnsafeOutputFile(file.clone()));
                ok = false;
            }
            if let Some(ext) = output_ext.filter(|ext| !file.ends_with(ext.as_str())) {
                violations.push(Violation::ExtensionMismatch {
                    output_file: file.clone(),
                    output_ext: ext,
                });
                ok = false;
            }
            ok.then(|| file.clone())
        }
        Some(_) => {
            violations.push(Violation::WrongType {
                field: "output_file",
                expected: "a string",
            });
            None
        }
    };

    match (template, input, output_ext, output_file, model, temperature) {
        (
            Some(template),
            Some(input),
            Some(output_ext),
            Some(output_file),
            Some(model),
            Some(temperature),
        ) if violations.is_empty() => {
            Ok(JobDescriptor {
                name: name.to_string(),
                template,
                input,
                output_ext,
                output_file,
                model,
                temperature,
            })
        }
        _ => Err(violations),
    }
}

fn non_empty_string(
    obj: &Map<String, Value>,
    field: &'static str,
    violations: &mut Vec<Violation>,
) -> Option<String> {
    match obj.get(field)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::String(_) => {
            violations.push(Violation::EmptyString { field });
            None
        }
        _ => {
            violations.push(Violation::WrongType {
                field,
                expected: "a string",
            });
            None
        }
    }
}

/// True when `file` could escape the output directory: absolute paths
/// (Unix, UNC or drive-letter) and any `..` segment.
pub fn is_unsafe_output_path(file: &str) -> bool {
    let bytes = file.as_bytes();
    let has_drive = bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':';
    Path::new(file).is_absolute()
        || file.starts_with(['/', '\\'])
        || has_drive
        || file.split(['/', '\\']).any(|segment| segment == "..")
}
