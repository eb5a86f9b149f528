use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::Stage;
use crate::anthropic::Usage;

/// Error taxonomy of a run. Every kind is fatal; none is retried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// Invalid job descriptor, missing credential, bad config file.
    Configuration(String),
    /// Missing or unusable template, no usable inputs, output I/O.
    Resource(String),
    /// Transport or provider failure during the model call.
    Invocation(String),
    /// Structured output declared but the response did not parse.
    Format(String),
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Configuration(msg) => write!(f, "Configuration error: {msg}"),
            FailureKind::Resource(msg) => write!(f, "Resource error: {msg}"),
            FailureKind::Invocation(msg) => write!(f, "Invocation error: {msg}"),
            FailureKind::Format(msg) => write!(f, "Format error: {msg}"),
        }
    }
}

/// The result of executing one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageOutcome {
    Success,
    Failure(FailureKind),
}

/// How a finished run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunStatus {
    Running,
    Dispatched,
    Aborted,
}

/// Mutable bookkeeping for the run in progress.
#[derive(Debug, Clone)]
pub struct Run {
    pub id: Uuid,
    pub job: String,
    pub stage: Stage,
    pub history: Vec<Stage>,
    pub failure: Option<FailureKind>,
    pub usage: Option<Usage>,
    /// Request id and model reported by the provider.
    pub request_id: Option<String>,
    pub model: Option<String>,
    pub output: Option<PathBuf>,
    pub started_at: DateTime<Utc>,
}

impl Run {
    pub fn new(job: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            job: job.to_string(),
            stage: Stage::Idle,
            history: Vec::new(),
            failure: None,
            usage: None,
            request_id: None,
            model: None,
            output: None,
            started_at: Utc::now(),
        }
    }

    pub fn status(&self) -> RunStatus {
        match self.stage {
            Stage::Dispatched => RunStatus::Dispatched,
            Stage::Aborted => RunStatus::Aborted,
            _ => RunStatus::Running,
        }
    }
}

/// Summary emitted when a run ends, successful or not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub run_id: Uuid,
    pub job: String,
    pub status: RunStatus,
    pub stages: Vec<Stage>,
    pub failure: Option<FailureKind>,
    pub usage: Option<Usage>,
    pub request_id: Option<String>,
    pub model: Option<String>,
    pub output: Option<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration_ms: i64,
}

impl RunRecord {
    pub fn from_run(run: &Run) -> Self {
        let now = Utc::now();
        let mut stages = run.history.clone();
        stages.push(run.stage);

        Self {
            run_id: run.id,
            job: run.job.clone(),
            status: run.status(),
            stages,
            failure: run.failure.clone(),
            usage: run.usage,
            request_id: run.request_id.clone(),
            model: run.model.clone(),
            output: run.output.clone(),
            started_at: run.started_at,
            finished_at: now,
            duration_ms: (now - run.started_at).num_milliseconds(),
        }
    }
}
