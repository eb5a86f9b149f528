use std::fmt;

use serde::{Deserialize, Serialize};

use super::run::{FailureKind, Run, StageOutcome};

/// Stages of a single run.
///
/// A run flows: IDLE → JOB_LOADED → TEMPLATE_LOADED → INPUT_AGGREGATED →
/// PROMPT_RENDERED → MODEL_INVOKED → DISPATCHED, or drops to ABORTED from any
/// non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Idle,
    JobLoaded,
    TemplateLoaded,
    InputAggregated,
    PromptRendered,
    ModelInvoked,
    Dispatched,
    Aborted,
}

impl Stage {
    /// The stage a successful step leads to. `None` for terminal stages.
    pub fn successor(self) -> Option<Stage> {
        match self {
            Stage::Idle => Some(Stage::JobLoaded),
            Stage::JobLoaded => Some(Stage::TemplateLoaded),
            Stage::TemplateLoaded => Some(Stage::InputAggregated),
            Stage::InputAggregated => Some(Stage::PromptRendered),
            Stage::PromptRendered => Some(Stage::ModelInvoked),
            Stage::ModelInvoked => Some(Stage::Dispatched),
            Stage::Dispatched | Stage::Aborted => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Idle => "IDLE",
            Stage::JobLoaded => "JOB_LOADED",
            Stage::TemplateLoaded => "TEMPLATE_LOADED",
            Stage::InputAggregated => "INPUT_AGGREGATED",
            Stage::PromptRendered => "PROMPT_RENDERED",
            Stage::ModelInvoked => "MODEL_INVOKED",
            Stage::Dispatched => "DISPATCHED",
            Stage::Aborted => "ABORTED",
        };
        f.write_str(name)
    }
}

/// The result of evaluating a stage outcome.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Advance to the next stage.
    Next(Stage),
    /// The step failed; the run is over.
    Abort { from: Stage, reason: FailureKind },
    /// The run was already terminal; nothing changed.
    Finished(Stage),
}

/// Drives a [`Run`] through its stages.
pub struct StateMachine;

impl StateMachine {
    /// Applies the outcome of the step that just ran.
    ///
    /// Success advances by one stage, failure jumps to `Aborted`. There is
    /// no retry edge. Terminal runs are left untouched.
    pub fn next(run: &mut Run, outcome: StageOutcome) -> Transition {
        let current = run.stage;
        let transition = match (current.successor(), outcome) {
            (None, _) => Transition::Finished(current),
            (Some(next), StageOutcome::Success) => Transition::Next(next),
            (Some(_), StageOutcome::Failure(reason)) => Transition::Abort {
                from: current,
                reason,
            },
        };

        match &transition {
            Transition::Next(next) => {
                run.history.push(current);
                run.stage = *next;
            }
            Transition::Abort { reason, .. } => {
                run.history.push(current);
                run.stage = Stage::Aborted;
                run.failure = Some(reason.clone());
            }
            Transition::Finished(_) => {}
        }

        transition
    }
}
