use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::analysis::clauses::ClauseOptions;
use crate::analysis::summary::SummaryOptions;
use crate::text::sentences::SplitterKind;
use crate::text::tokens::TokenizerKind;

/// Root configuration structure, deserialized from `.terms-checkr/config.toml`.
///
/// Every section and field is optional; missing values take the built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub chunking: ChunkingConfig,
    pub clauses: ClauseOptions,
    pub summary: SummaryOptions,
    pub services: ServicesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Token budget per chunk.
    pub max_tokens: usize,
    pub tokenizer: TokenizerKind,
    pub sentence_splitter: SplitterKind,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_tokens: 512,
            tokenizer: TokenizerKind::default(),
            sentence_splitter: SplitterKind::default(),
        }
    }
}

/// Remote collaborators, only contacted with `--online`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    /// Hugging Face Inference API base URL; the model id is appended.
    pub endpoint: String,
    pub summarizer_model: String,
    pub classifier_model: String,
    /// Environment variable holding the Inference API bearer token.
    pub token_env: String,
    pub translator_url: String,
    /// Environment variable holding the translator API key, if the instance needs one.
    pub translator_key_env: String,
    pub timeout_secs: u64,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api-inference.huggingface.co/models".to_string(),
            summarizer_model: "facebook/bart-large-cnn".to_string(),
            classifier_model: "facebook/bart-large-mnli".to_string(),
            token_env: "HF_API_TOKEN".to_string(),
            translator_url: "https://libretranslate.com/translate".to_string(),
            translator_key_env: "LIBRETRANSLATE_API_KEY".to_string(),
            timeout_secs: 10,
        }
    }
}

impl Config {
    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.chunking.max_tokens == 0 {
            bail!("[chunking] max_tokens must be at least 1");
        }
        if self.summary.batch_size == 0 {
            bail!("[summary] batch_size must be at least 1");
        }
        if self.summary.min_length > self.summary.max_length {
            bail!(
                "[summary] min_length ({}) exceeds max_length ({})",
                self.summary.min_length,
                self.summary.max_length
            );
        }
        if self.services.timeout_secs == 0 {
            bail!("[services] timeout_secs must be at least 1");
        }
        Ok(())
    }

    /// Apply the `--max-tokens` override and re-check the result.
    pub fn override_max_tokens(&mut self, max_tokens: usize) -> Result<()> {
        self.chunking.max_tokens = max_tokens;
        self.validate()
    }
}

/// Load the configuration, searching in order:
///
/// 1. `config_override`, the path passed via `--config`
/// 2. `<base_dir>/.terms-checkr/config.toml`
/// 3. `~/.config/terms-checkr/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(base_dir: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return read_config(path);
    }

    let project_config = base_dir.join(".terms-checkr").join("config.toml");
    if project_config.exists() {
        return read_config(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home.join(".config").join("terms-checkr").join("config.toml");
        if home_config.exists() {
            return read_config(&home_config);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("invalid config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.chunking.max_tokens, 512);
        assert_eq!(cfg.chunking.tokenizer, TokenizerKind::Estimate);
        assert_eq!(cfg.clauses.context_radius, 50);
        assert_eq!(cfg.clauses.max_clauses, 4);
        assert_eq!(cfg.summary.max_length, 150);
        assert_eq!(cfg.summary.min_length, 40);
        assert_eq!(cfg.services.token_env, "HF_API_TOKEN");
        assert_eq!(cfg.services.timeout_secs, 10);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [chunking]
            max_tokens = 256
            sentence_splitter = "unicode"

            [clauses]
            max_clauses = 10
            "#,
        )
        .unwrap();
        assert_eq!(cfg.chunking.max_tokens, 256);
        assert_eq!(cfg.chunking.sentence_splitter, SplitterKind::Unicode);
        assert_eq!(cfg.chunking.tokenizer, TokenizerKind::Estimate);
        assert_eq!(cfg.clauses.max_clauses, 10);
        assert_eq!(cfg.clauses.context_radius, 50);
        assert_eq!(cfg.summary.batch_size, 8);
    }

    #[test]
    fn test_unknown_tokenizer_rejected() {
        let result: std::result::Result<Config, _> = toml::from_str("[chunking]\ntokenizer = \"bpe\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_lengths() {
        let mut cfg = Config::default();
        cfg.summary.min_length = 200;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.summary.batch_size = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_zero_max_tokens_rejected() {
        let mut cfg = Config::default();
        cfg.chunking.max_tokens = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("max_tokens"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zero.toml");
        std::fs::write(&path, "[chunking]\nmax_tokens = 0\n").unwrap();
        assert!(load_config(dir.path(), Some(&path)).is_err());
    }

    #[test]
    fn test_max_tokens_override_is_validated() {
        let mut cfg = Config::default();
        assert!(cfg.override_max_tokens(0).is_err());

        let mut cfg = Config::default();
        cfg.override_max_tokens(64).unwrap();
        assert_eq!(cfg.chunking.max_tokens, 64);
    }

    #[test]
    fn test_load_project_config() {
        let dir = tempfile::tempdir().unwrap();
        let cfg_dir = dir.path().join(".terms-checkr");
        std::fs::create_dir_all(&cfg_dir).unwrap();
        std::fs::write(cfg_dir.join("config.toml"), "[summary]\nbatch_size = 2\n").unwrap();

        let cfg = load_config(dir.path(), None).unwrap();
        assert_eq!(cfg.summary.batch_size, 2);
    }

    #[test]
    fn test_override_wins_over_project() {
        let dir = tempfile::tempdir().unwrap();
        let cfg_dir = dir.path().join(".terms-checkr");
        std::fs::create_dir_all(&cfg_dir).unwrap();
        std::fs::write(cfg_dir.join("config.toml"), "[chunking]\nmax_tokens = 100\n").unwrap();
        let override_path = dir.path().join("custom.toml");
        std::fs::write(&override_path, "[chunking]\nmax_tokens = 300\n").unwrap();

        let cfg = load_config(dir.path(), Some(&override_path)).unwrap();
        assert_eq!(cfg.chunking.max_tokens, 300);
    }

    #[test]
    fn test_missing_override_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load_config(dir.path(), Some(&missing)).is_err());
    }

    #[test]
    fn test_invalid_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[summary]\nmin_length = 500\n").unwrap();
        assert!(load_config(dir.path(), Some(&path)).is_err());
    }
}
