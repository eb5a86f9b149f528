//! Runs one job end to end: load, render, invoke once, dispatch.

use std::io::Write;

use tracing::{debug, error, info};

use crate::anthropic::MessageSender;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::output::OutputArtifact;
use crate::state_machine::{Run, RunRecord, StageOutcome, StateMachine, Transition};
use crate::ui::RunProgress;
use crate::{inputs, invoker, job, output, prompt, template};

/// Outcome of [`Pipeline::run`]. The record is produced even when the run aborts.
#[derive(Debug)]
pub struct RunReport {
    pub record: RunRecord,
    pub result: Result<OutputArtifact, PipelineError>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Wires the stages of a run together.
pub struct Pipeline<'a, S> {
    config: &'a PipelineConfig,
    sender: &'a S,
    progress: RunProgress,
}

impl<'a, S: MessageSender> Pipeline<'a, S> {
    pub fn new(config: &'a PipelineConfig, sender: &'a S) -> Self {
        Self {
            config,
            sender,
            progress: RunProgress::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: RunProgress) -> Self {
        self.progress = progress;
        self
    }

    pub fn progress(&self) -> &RunProgress {
        &self.progress
    }

    /// Runs job `name`, echoing the raw response to `stdout`.
    ///
    /// Any stage failure aborts the run; nothing from earlier stages is kept.
    pub async fn run(&self, name: &str, stdout: &mut impl Write) -> RunReport {
        let mut run = Run::new(name);
        info!(job = name, run_id = %run.id, "starting run");

        let result = self.execute(&mut run, name, stdout).await;
        if let Err(e) = &result {
            let t = StateMachine::next(&mut run, StageOutcome::Failure(e.failure_kind()));
            if let Transition::Abort { from, .. } = t {
                error!(job = name, stage = %from, "{e}");
            }
        }

        let record = RunRecord::from_run(&run);
        self.progress.complete(&record);
        debug!(
            "run record: {}",
            serde_json::to_string(&record).unwrap_or_default()
        );
        RunReport { record, result }
    }

    async fn execute(
        &self,
        run: &mut Run,
        name: &str,
        stdout: &mut impl Write,
    ) -> Result<OutputArtifact, PipelineError> {
        let job = job::load(&self.config.jobs_dir, name)?;
        info!(
            job = %job.name,
            template = %job.template,
            inputs = job.input.len(),
            output = %job.output_file,
            model = %job.model,
            temperature = job.temperature,
            "job loaded"
        );
        self.advance(run, &job.template);

        let template = template::load(self.config.template_dir.as_deref(), &job.template)?;
        self.advance(run, &format!("{} input file(s)", job.input.len()));

        let aggregate = inputs::aggregate(&self.config.input_dir, &job.input)?;
        debug!(
            used = aggregate.used.len(),
            skipped = aggregate.skipped.len(),
            "inputs aggregated"
        );
        self.advance(run, "rendering prompt");

        let prompt = prompt::render(&template, &aggregate.text).map_err(|source| {
            PipelineError::Render {
                template: job.template.clone(),
                source,
            }
        })?;
        debug!("prompt sent to model: {prompt}");
        self.advance(run, &format!("waiting for {}", job.model));

        let response = invoker::invoke(
            self.sender,
            &job.model,
            job.temperature,
            self.config.max_tokens,
            &prompt,
        )
        .await?;
        run.usage = Some(response.usage);
        run.request_id = Some(response.id.clone());
        run.model = Some(response.model.clone());
        self.advance(run, &job.output_file);

        let artifact = output::dispatch(
            &response.content,
            job.output_ext,
            &self.config.output_dir,
            &job.output_file,
            stdout,
        )?;
        run.output = Some(artifact.path().to_path_buf());
        self.advance(run, &job.output_file);

        Ok(artifact)
    }

    fn advance(&self, run: &mut Run, detail: &str) {
        if let Transition::Next(stage) = StateMachine::next(run, StageOutcome::Success) {
            debug!(stage = %stage, "stage reached");
            self.progress.update_stage(stage, detail);
        }
    }
}
