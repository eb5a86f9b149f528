mod run;
mod state;

pub use run::{FailureKind, Run, RunRecord, RunStatus, StageOutcome};
pub use state::{Stage, StateMachine, Transition};
