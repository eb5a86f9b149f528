//! Interface de terminal do promptjob: spinner e saída colorida.
//!
//! Tudo aqui escreve em stderr. O stdout é reservado para a resposta bruta
//! do modelo.

use console::Style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::state_machine::{RunRecord, RunStatus, Stage};

/// Indicador visual do estágio atual de uma execução.
pub struct RunProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
    yellow: Style,
}

impl RunProgress {
    /// Inicia o spinner com o nome do job.
    pub fn start(job: &str) -> Self {
        let pb = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("{}: {job}", Stage::Idle));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        Self::with_bar(pb)
    }

    /// Progresso invisível, usado com `--verbose`, fora de um terminal e em testes.
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(pb: ProgressBar) -> Self {
        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Atualiza a mensagem do spinner para o estágio atual.
    pub fn update_stage(&self, stage: Stage, detail: &str) {
        self.pb.set_message(format!("{stage}: {detail}"));
    }

    /// Finaliza o spinner e mostra o resultado da execução.
    pub fn complete(&self, record: &RunRecord) {
        self.pb.finish_and_clear();
        if self.pb.is_hidden() {
            return;
        }
        match record.status {
            RunStatus::Dispatched => {
                let target = record
                    .output
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                eprintln!(
                    "  {} Job {} written to {target}",
                    self.green.apply_to("✓"),
                    record.job
                );
            }
            _ => {
                let reason = record
                    .failure
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                eprintln!("  {} Job {} aborted: {reason}", self.red.apply_to("✗"), record.job);
            }
        }
    }

    /// Imprime o registro de auditoria em JSON no stderr.
    pub fn print_audit(&self, record: &RunRecord) {
        let style = match record.status {
            RunStatus::Dispatched => &self.green,
            RunStatus::Aborted => &self.red,
            RunStatus::Running => &self.yellow,
        };
        eprintln!();
        eprintln!("{}", style.apply_to("─── Run Record ───"));
        eprintln!(
            "{}",
            serde_json::to_string_pretty(record).unwrap_or_default()
        );
    }
}
