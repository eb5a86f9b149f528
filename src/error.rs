use thiserror::Error;

use crate::anthropic::AnthropicError;
use crate::inputs::InputError;
use crate::job::JobError;
use crate::output::OutputError;
use crate::prompt::RenderError;
use crate::state_machine::FailureKind;
use crate::template::TemplateError;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Job(#[from] JobError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Inputs(#[from] InputError),

    #[error("error creating prompt from template {template}: {source}")]
    Render {
        template: String,
        source: RenderError,
    },

    #[error("model invocation failed: {0}")]
    Invocation(#[from] AnthropicError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

impl PipelineError {
    /// Maps the error onto the run's failure taxonomy.
    pub fn failure_kind(&self) -> FailureKind {
        let msg = self.to_string();
        match self {
            PipelineError::Job(_) => FailureKind::Configuration(msg),
            PipelineError::Template(_)
            | PipelineError::Inputs(_)
            | PipelineError::Render { .. } => FailureKind::Resource(msg),
            PipelineError::Invocation(_) => FailureKind::Invocation(msg),
            PipelineError::Output(OutputError::Format(_)) => FailureKind::Format(msg),
            PipelineError::Output(_) => FailureKind::Resource(msg),
        }
    }
}
