//! Interface de linha de comando do promptjob baseada em clap.
//!
//! Um único argumento obrigatório, `--job`, escolhe o descritor
//! `jobs/job-<nome>.json`. As demais flags ajustam raiz, logs e auditoria.

use std::path::PathBuf;

use clap::Parser;

/// promptjob: executa um job de prompt com uma única chamada ao modelo.
#[derive(Debug, Parser)]
#[command(name = "promptjob", version, about)]
pub struct Cli {
    /// Nome do job (carrega jobs/job-<nome>.json).
    #[arg(long)]
    pub job: String,

    /// Raiz do projeto contendo jobs/, prompt_templates/, inputs/ e output/.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Habilita logs de depuração (prompt e resposta bruta) no stderr.
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,

    /// Imprime o registro da execução em JSON no stderr ao final.
    #[arg(long, default_value_t = false)]
    pub audit: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_job() {
        let cli = Cli::parse_from(["promptjob", "--job", "summary"]);
        assert_eq!(cli.job, "summary");
        assert_eq!(cli.root, PathBuf::from("."));
        assert!(!cli.verbose);
        assert!(!cli.audit);
    }

    #[test]
    fn cli_parses_flags() {
        let cli = Cli::parse_from([
            "promptjob", "--job", "sql", "--root", "/srv/jobs", "-v", "--audit",
        ]);
        assert_eq!(cli.job, "sql");
        assert_eq!(cli.root, PathBuf::from("/srv/jobs"));
        assert!(cli.verbose);
        assert!(cli.audit);
    }

    #[test]
    fn cli_requires_job() {
        assert!(Cli::try_parse_from(["promptjob"]).is_err());
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
