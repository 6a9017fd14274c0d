use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

use crate::error::{NewsglotError, Result};

fn default_timeout_secs() -> u64 {
    120
}

fn default_concurrency() -> usize {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub provider: ProviderConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    /// Extra or overriding language definitions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<LanguageEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the OpenAI-compatible API
    pub endpoint: String,
    /// Chat model used for every translation
    pub model: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum output tokens per completion
    pub max_tokens: u32,
    /// Deadline for a single completion request (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// API credential; usually supplied through OPENAI_API_KEY instead
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Languages translated in parallel per request; 1 keeps them sequential
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level filter (trace, debug, info, warn, error)
    pub level: String,
    /// Directory receiving the daily rolling log files
    pub directory: String,
}

/// A language definition supplied through the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LanguageEntry {
    pub key: String,
    pub name: String,
    pub code: String,
    pub prompt_template: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: ProviderConfig {
                endpoint: "https://api.openai.com/v1".to_string(),
                model: "gpt-4o".to_string(),
                temperature: 0.3,
                max_tokens: 4000,
                timeout_secs: default_timeout_secs(),
                api_key: None,
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                concurrency: default_concurrency(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: ".newsglot/log".to_string(),
            },
            languages: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| NewsglotError::Config(format!("Failed to read config file: {}", e)))?;

        let mut config: Config = toml::from_str(&content)?;
        config.logging.level = normalize_level(&config.logging.level)?;
        Ok(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| NewsglotError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| NewsglotError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Overlay values from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Overlay values from an arbitrary variable lookup.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENAI_API_KEY").filter(|k| !k.trim().is_empty()) {
            self.provider.api_key = Some(key);
        }
        if let Some(endpoint) = lookup("OPENAI_BASE_URL") {
            self.provider.endpoint = endpoint;
        }
        if let Some(model) = lookup("OPENAI_MODEL") {
            self.provider.model = model;
        }
        if let Some(value) = lookup("OPENAI_TEMPERATURE") {
            self.provider.temperature = parse_var("OPENAI_TEMPERATURE", &value)?;
        }
        if let Some(value) = lookup("OPENAI_MAX_TOKENS") {
            self.provider.max_tokens = parse_var("OPENAI_MAX_TOKENS", &value)?;
        }
        if let Some(value) = lookup("OPENAI_TIMEOUT_SECS") {
            self.provider.timeout_secs = parse_var("OPENAI_TIMEOUT_SECS", &value)?;
        }
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(value) = lookup("PORT") {
            self.server.port = parse_var("PORT", &value)?;
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            self.logging.level = normalize_level(&level)?;
        }

        debug!("Effective provider model: {}", self.provider.model);
        Ok(())
    }
}

/// Map a level name onto a `tracing` level directive. The Python logging
/// names `WARNING`, `CRITICAL` and `FATAL` are accepted as aliases.
fn normalize_level(level: &str) -> Result<String> {
    let lowered = level.trim().to_lowercase();
    let normalized = match lowered.as_str() {
        "warning" => "warn",
        "critical" | "fatal" => "error",
        "trace" | "debug" | "info" | "warn" | "error" => lowered.as_str(),
        _ => {
            return Err(NewsglotError::Config(format!(
                "Invalid log level '{}': expected one of trace, debug, info, warn(ing), error, critical",
                level
            )))
        }
    };
    Ok(normalized.to_string())
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value.trim().parse().map_err(|_| {
        NewsglotError::Config(format!("Invalid value for {}: '{}'", name, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::prelude::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_matches_provider_defaults() {
        let config = Config::default();
        assert_eq!(config.provider.model, "gpt-4o");
        assert_eq!(config.provider.max_tokens, 4000);
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.server.concurrency, 1);
        assert!(config.provider.api_key.is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("newsglot.toml");

        let mut config = Config::default();
        config.provider.model = "gpt-4o-mini".to_string();
        config.save_to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.provider.model, "gpt-4o-mini");
        assert_eq!(loaded.logging.directory, ".newsglot/log");
    }

    #[test]
    fn test_load_with_custom_languages_and_defaults() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("config.toml");
        file.write_str(
            r#"
[provider]
endpoint = "http://localhost:8080/v1"
model = "local"
temperature = 0.0
max_tokens = 512

[server]
host = "127.0.0.1"
port = 8571

[logging]
level = "debug"
directory = "logs"

[[languages]]
key = "ko"
name = "Korean"
code = "ko"
prompt_template = "{title} {description} {content}"
"#,
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.provider.timeout_secs, 120);
        assert_eq!(config.server.concurrency, 1);
        assert_eq!(config.languages.len(), 1);
        assert_eq!(config.languages[0].code, "ko");
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Config::from_file("/nonexistent/newsglot.toml").unwrap_err();
        assert!(matches!(err, NewsglotError::Config(_)));
    }

    #[test]
    fn test_overrides_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4.1"),
            ("OPENAI_TEMPERATURE", "0.7"),
            ("PORT", "8571"),
            ("LOG_LEVEL", "DEBUG"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_overrides(|name| vars.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.provider.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.provider.model, "gpt-4.1");
        assert!((config.provider.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.server.port, 8571);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_python_log_level_names_are_accepted() {
        for (given, expected) in [
            ("WARNING", "warn"),
            ("CRITICAL", "error"),
            ("fatal", "error"),
            ("Info", "info"),
        ] {
            let mut config = Config::default();
            config
                .apply_overrides(|name| (name == "LOG_LEVEL").then(|| given.to_string()))
                .unwrap();
            assert_eq!(config.logging.level, expected);
            assert!(config.logging.level.parse::<tracing::Level>().is_ok());
        }
    }

    #[test]
    fn test_unknown_log_level_is_config_error() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|name| (name == "LOG_LEVEL").then(|| "verbose".to_string()))
            .unwrap_err();
        assert!(matches!(err, NewsglotError::Config(_)));
        assert!(err.to_string().contains("warn(ing)"));
    }

    #[test]
    fn test_malformed_file_is_toml_error() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("broken.toml");
        file.write_str("[provider\nmodel = ").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, NewsglotError::Toml(_)));
    }

    #[test]
    fn test_blank_api_key_is_ignored() {
        let mut config = Config::default();
        config
            .apply_overrides(|name| (name == "OPENAI_API_KEY").then(|| "  ".to_string()))
            .unwrap();
        assert!(config.provider.api_key.is_none());
    }

    #[test]
    fn test_invalid_numeric_override() {
        let mut config = Config::default();
        let err = config
            .apply_overrides(|name| (name == "OPENAI_MAX_TOKENS").then(|| "lots".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("OPENAI_MAX_TOKENS"));
    }
}
