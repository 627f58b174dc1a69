use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "Satya";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "satya=info,satya_lib=info,warn"
}

/// Get the configuration directory (~/.config/satya on Linux).
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("satya"))
}

/// Get the optional JSON configuration file path.
pub fn config_file_path() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("config.json"))
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {reason}")]
    Parse { path: String, reason: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Runtime settings for the guardian pipeline.
///
/// Built from defaults, then an optional JSON file, then `SATYA_*`
/// environment variables (highest precedence).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardianConfig {
    /// Ollama endpoint. Must be a loopback address.
    pub ollama_url: String,
    /// Model reading label photos.
    pub vision_model: String,
    /// Model for judgment stages: extraction from pages, normalizer, evaluators, critique.
    pub judgment_model: String,
    /// Model writing the consumer-facing narrative.
    pub prose_model: String,
    /// Budget for one whole evaluation, all stages included.
    pub request_timeout_secs: u64,
    /// Budget for a single evaluator inside the fan-out.
    pub evaluator_timeout_secs: u64,
    /// HTTP timeout for one inference call.
    pub inference_timeout_secs: u64,
    /// HTTP timeout for fetching a product page.
    pub fetch_timeout_secs: u64,
    /// Sampling temperature for judgment stages.
    pub deterministic_temperature: f32,
    /// Sampling temperature for narrative writing.
    pub creative_temperature: f32,
    /// Extracted text longer than this is truncated before normalization.
    pub max_ingredient_chars: usize,
}

impl Default for GuardianConfig {
    fn default() -> Self {
        Self {
            ollama_url: "http://localhost:11434".to_string(),
            vision_model: "gemma3:4b".to_string(),
            judgment_model: "gemma3:4b".to_string(),
            prose_model: "gemma3:4b".to_string(),
            request_timeout_secs: 180,
            evaluator_timeout_secs: 60,
            inference_timeout_secs: 120,
            fetch_timeout_secs: 20,
            deterministic_temperature: 0.0,
            creative_temperature: 0.7,
            max_ingredient_chars: 8_000,
        }
    }
}

impl GuardianConfig {
    /// Load from the default config file (if present) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let base = match config_file_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        base.with_env_overrides(|key| std::env::var(key).ok())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Apply `SATYA_*` overrides. `lookup` is injected so tests never touch
    /// the process environment.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("SATYA_OLLAMA_URL") {
            self.ollama_url = v;
        }
        if let Some(v) = lookup("SATYA_VISION_MODEL") {
            self.vision_model = v;
        }
        if let Some(v) = lookup("SATYA_JUDGMENT_MODEL") {
            self.judgment_model = v;
        }
        if let Some(v) = lookup("SATYA_PROSE_MODEL") {
            self.prose_model = v;
        }
        if let Some(v) = lookup("SATYA_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_value("SATYA_REQUEST_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("SATYA_EVALUATOR_TIMEOUT_SECS") {
            self.evaluator_timeout_secs = parse_value("SATYA_EVALUATOR_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("SATYA_INFERENCE_TIMEOUT_SECS") {
            self.inference_timeout_secs = parse_value("SATYA_INFERENCE_TIMEOUT_SECS", &v)?;
        }
        if let Some(v) = lookup("SATYA_FETCH_TIMEOUT_SECS") {
            self.fetch_timeout_secs = parse_value("SATYA_FETCH_TIMEOUT_SECS", &v)?;
        }
        Ok(self)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn evaluator_timeout(&self) -> Duration {
        Duration::from_secs(self.evaluator_timeout_secs)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    #[test]
    fn app_name_is_satya() {
        assert_eq!(APP_NAME, "Satya");
    }

    #[test]
    fn defaults_are_local_and_bounded() {
        let config = GuardianConfig::default();
        assert!(config.ollama_url.starts_with("http://localhost"));
        assert!(config.evaluator_timeout_secs < config.request_timeout_secs);
        assert!(config.deterministic_temperature < config.creative_temperature);
    }

    #[test]
    fn env_overrides_take_precedence() {
        let env: HashMap<&str, &str> = [
            ("SATYA_PROSE_MODEL", "llama3:8b"),
            ("SATYA_EVALUATOR_TIMEOUT_SECS", "5"),
        ]
        .into_iter()
        .collect();
        let config = GuardianConfig::default()
            .with_env_overrides(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.prose_model, "llama3:8b");
        assert_eq!(config.evaluator_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn invalid_number_is_reported() {
        let err = GuardianConfig::default()
            .with_env_overrides(|k| {
                (k == "SATYA_REQUEST_TIMEOUT_SECS").then(|| "soon".to_string())
            })
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"judgment_model": "medgemma:4b"}}"#).unwrap();
        let config = GuardianConfig::from_file(file.path()).unwrap();
        assert_eq!(config.judgment_model, "medgemma:4b");
        assert_eq!(config.request_timeout_secs, 180);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = GuardianConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
