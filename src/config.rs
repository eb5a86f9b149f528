//! Configuração do promptjob.
//!
//! As camadas são aplicadas nesta ordem: valores padrão, o arquivo opcional
//! `promptjob.toml` na raiz do projeto e, por fim, as variáveis de ambiente
//! (`ANTHROPIC_API_KEY`, `TEMPLATE_DIR`). Um `.env` no diretório atual é
//! carregado antes da leitura do ambiente.
//!
//! O resultado é um [`PipelineConfig`] explícito, passado para cada
//! componente; nenhum componente lê o ambiente por conta própria.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use crate::anthropic::client::API_URL;

pub const CONFIG_FILE: &str = "promptjob.toml";
pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";
pub const TEMPLATE_DIR_VAR: &str = "TEMPLATE_DIR";

/// Conteúdo de `promptjob.toml`. Todos os campos são opcionais.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Chave da API. A variável de ambiente tem precedência.
    #[serde(default)]
    pub api_key: String,

    /// Endpoint da API Messages.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Limite de tokens gerados por chamada.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Timeout da requisição em segundos. Ausente: padrão do transporte.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    #[serde(default = "default_jobs_dir")]
    pub jobs_dir: PathBuf,

    #[serde(default = "default_template_dir")]
    pub template_dir: PathBuf,

    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_api_url() -> String {
    API_URL.to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_jobs_dir() -> PathBuf {
    PathBuf::from("jobs")
}

fn default_template_dir() -> PathBuf {
    PathBuf::from("prompt_templates")
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("inputs")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: default_api_url(),
            max_tokens: default_max_tokens(),
            request_timeout_secs: None,
            jobs_dir: default_jobs_dir(),
            template_dir: default_template_dir(),
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
        }
    }
}

impl ConfigFile {
    /// Lê `promptjob.toml` em `root`, ou usa os padrões se o arquivo não existir.
    pub fn read(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&contents).with_context(|| format!("invalid config file {}", path.display()))
    }
}

/// Configuração resolvida de uma execução. Diretórios já são absolutos ou
/// relativos à raiz informada.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub api_key: String,
    pub api_url: String,
    pub max_tokens: u32,
    pub request_timeout: Option<Duration>,
    pub jobs_dir: PathBuf,
    /// `None` quando `TEMPLATE_DIR` está definido mas vazio.
    pub template_dir: Option<PathBuf>,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl PipelineConfig {
    /// Carrega `.env`, o arquivo de configuração e o ambiente do processo.
    pub fn load(root: &Path) -> Result<Self> {
        dotenvy::dotenv().ok();
        let file = ConfigFile::read(root)?;
        Self::resolve(root, file, |key| std::env::var(key).ok())
    }

    /// Aplica o ambiente (via `env`) sobre `file` e resolve os caminhos.
    pub fn resolve(
        root: &Path,
        file: ConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let api_key = env(API_KEY_VAR)
            .filter(|key| !key.is_empty())
            .unwrap_or(file.api_key);
        if api_key.trim().is_empty() {
            bail!("{API_KEY_VAR} is not set and no api_key is configured in {CONFIG_FILE}");
        }

        // Variável presente porém vazia desativa o diretório padrão.
        let template_dir = match env(TEMPLATE_DIR_VAR) {
            Some(dir) if dir.is_empty() => None,
            Some(dir) => Some(root.join(dir)),
            None => Some(root.join(file.template_dir)),
        };

        Ok(Self {
            api_key,
            api_url: file.api_url,
            max_tokens: file.max_tokens,
            request_timeout: file.request_timeout_secs.map(Duration::from_secs),
            jobs_dir: root.join(file.jobs_dir),
            template_dir,
            input_dir: root.join(file.input_dir),
            output_dir: root.join(file.output_dir),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn default_config_values() {
        let config = ConfigFile::default();
        assert_eq!(config.api_url, API_URL);
        assert_eq!(config.max_tokens, 4096);
        assert_eq!(config.request_timeout_secs, None);
        assert_eq!(config.jobs_dir, PathBuf::from("jobs"));
        assert_eq!(config.template_dir, PathBuf::from("prompt_templates"));
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            api_key = "sk-test-123"
            max_tokens = 1024
            output_dir = "build/out"
        "#;
        let config: ConfigFile = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api_key, "sk-test-123");
        assert_eq!(config.max_tokens, 1024);
        assert_eq!(config.output_dir, PathBuf::from("build/out"));
        assert_eq!(config.input_dir, PathBuf::from("inputs"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(toml::from_str::<ConfigFile>("max_retries = 3").is_err());
    }

    #[test]
    fn resolve_joins_directories_onto_root() {
        let root = Path::new("/project");
        let config =
            PipelineConfig::resolve(root, ConfigFile::default(), env_of(&[(API_KEY_VAR, "sk")]))
                .unwrap();
        assert_eq!(config.api_key, "sk");
        assert_eq!(config.jobs_dir, root.join("jobs"));
        assert_eq!(config.template_dir, Some(root.join("prompt_templates")));
        assert_eq!(config.input_dir, root.join("inputs"));
        assert_eq!(config.output_dir, root.join("output"));
    }

    #[test]
    fn env_key_overrides_file_key() {
        let file = ConfigFile {
            api_key: "from-file".into(),
            ..Default::default()
        };
        let config = PipelineConfig::resolve(
            Path::new("."),
            file.clone(),
            env_of(&[(API_KEY_VAR, "from-env")]),
        )
        .unwrap();
        assert_eq!(config.api_key, "from-env");

        let config = PipelineConfig::resolve(Path::new("."), file, env_of(&[])).unwrap();
        assert_eq!(config.api_key, "from-file");
    }

    #[test]
    fn missing_api_key_is_startup_error() {
        let err = PipelineConfig::resolve(Path::new("."), ConfigFile::default(), env_of(&[]))
            .unwrap_err();
        assert!(err.to_string().contains(API_KEY_VAR));
    }

    #[test]
    fn template_dir_env_override() {
        let root = Path::new("/project");
        let config = PipelineConfig::resolve(
            root,
            ConfigFile::default(),
            env_of(&[(API_KEY_VAR, "sk"), (TEMPLATE_DIR_VAR, "/shared/templates")]),
        )
        .unwrap();
        assert_eq!(config.template_dir, Some(PathBuf::from("/shared/templates")));

        let config = PipelineConfig::resolve(
            root,
            ConfigFile::default(),
            env_of(&[(API_KEY_VAR, "sk"), (TEMPLATE_DIR_VAR, "")]),
        )
        .unwrap();
        assert_eq!(config.template_dir, None);
    }

    #[test]
    fn read_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigFile::read(dir.path()).unwrap();
        assert_eq!(config.max_tokens, 4096);
    }

    #[test]
    fn read_parses_config_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "request_timeout_secs = 30\n").unwrap();
        let config = ConfigFile::read(dir.path()).unwrap();
        assert_eq!(config.request_timeout_secs, Some(30));
    }
}
