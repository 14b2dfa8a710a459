use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LifechartConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_url: String,
    pub model: String,
    pub api_key: String,
    /// Per-attempt request timeout in seconds.
    pub timeout_secs: u64,
    /// Retries after the first attempt, for transient overload only.
    pub max_retries: u32,
    /// Base backoff delay in milliseconds; delay = min(base * 2^attempt, 10_000).
    pub backoff_base_ms: u64,
}

impl Default for LifechartConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::default(),
            gemini: GeminiConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_lifechart_dir()
            .join("lifechart.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_url: "https://generativelanguage.googleapis.com/v1beta".into(),
            model: "gemini-3-flash-preview".into(),
            api_key: String::new(),
            timeout_secs: 30,
            max_retries: 3,
            backoff_base_ms: 1000,
        }
    }
}

/// Returns `~/.lifechart/`
pub fn default_lifechart_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".lifechart")
}

/// Returns the default config file path: `~/.lifechart/config.toml`
pub fn default_config_path() -> PathBuf {
    default_lifechart_dir().join("config.toml")
}

impl LifechartConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides. A missing
    /// file is not an error; defaults apply. Kept free of tracing calls
    /// because it runs before the subscriber is installed.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            LifechartConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (LIFECHART_DB, LIFECHART_LOG_LEVEL,
    /// GEMINI_API_KEY).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("LIFECHART_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("LIFECHART_LOG_LEVEL") {
            self.server.log_level = val;
        }
        if let Ok(val) = std::env::var("GEMINI_API_KEY") {
            self.gemini.api_key = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = LifechartConfig::default();
        assert_eq!(config.server.log_level, "info");
        assert!(config.storage.db_path.ends_with("lifechart.db"));
        assert_eq!(config.gemini.model, "gemini-3-flash-preview");
        assert_eq!(config.gemini.max_retries, 3);
        assert_eq!(config.gemini.timeout_secs, 30);
        assert!(config.gemini.api_key.is_empty());
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let config = LifechartConfig::load_from("/nonexistent/lifechart/config.toml").unwrap();
        assert_eq!(config.gemini.model, "gemini-3-flash-preview");
        assert_eq!(config.gemini.max_retries, 3);
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
log_level = "debug"

[storage]
db_path = "/tmp/test.db"

[gemini]
api_key = "abc123"
max_retries = 5
"#;
        let config: LifechartConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.log_level, "debug");
        assert_eq!(config.storage.db_path, "/tmp/test.db");
        assert_eq!(config.gemini.api_key, "abc123");
        assert_eq!(config.gemini.max_retries, 5);
        // defaults still apply for unset fields
        assert_eq!(config.gemini.timeout_secs, 30);
        assert_eq!(config.gemini.backoff_base_ms, 1000);
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = LifechartConfig::default();
        std::env::set_var("LIFECHART_DB", "/tmp/override.db");
        std::env::set_var("LIFECHART_LOG_LEVEL", "trace");
        std::env::set_var("GEMINI_API_KEY", "env-key");

        config.apply_env_overrides();

        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(config.server.log_level, "trace");
        assert_eq!(config.gemini.api_key, "env-key");

        // Clean up
        std::env::remove_var("LIFECHART_DB");
        std::env::remove_var("LIFECHART_LOG_LEVEL");
        std::env::remove_var("GEMINI_API_KEY");
    }
}
