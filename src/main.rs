mod anthropic;
mod cli;
mod config;
mod error;
mod inputs;
mod invoker;
mod job;
mod output;
mod pipeline;
mod prompt;
mod state_machine;
mod template;
mod ui;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use anthropic::AnthropicClient;
use cli::Cli;
use config::PipelineConfig;
use pipeline::Pipeline;
use ui::RunProgress;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr; stdout carries only the model response.
fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("{}={level}", env!("CARGO_PKG_NAME")))),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

async fn run(cli: &Cli) -> Result<bool> {
    let config = PipelineConfig::load(&cli.root)?;
    let client = AnthropicClient::with_base_url(
        config.api_key.clone(),
        config.api_url.clone(),
        config.request_timeout,
    )?;

    let progress = if cli.verbose || !console::Term::stderr().is_term() {
        RunProgress::hidden()
    } else {
        RunProgress::start(&cli.job)
    };
    let pipeline = Pipeline::new(&config, &client).with_progress(progress);

    let mut stdout = std::io::stdout().lock();
    let report = pipeline.run(&cli.job, &mut stdout).await;

    if cli.audit {
        pipeline.progress().print_audit(&report.record);
    }
    Ok(report.is_success())
}
