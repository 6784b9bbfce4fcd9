//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Document store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Logging configuration.
    #[serde(default)]
    pub log: LogConfig,
}

/// Document store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Maximum number of conditional-commit attempts before a reversal
    /// gives up with a retry-exhausted error.
    #[serde(default = "default_max_commit_attempts")]
    pub max_commit_attempts: u32,
}

fn default_max_commit_attempts() -> u32 {
    5
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_commit_attempts: default_max_commit_attempts(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Default tracing filter, overridable via `RUST_LOG`.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "vendra=debug".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("VENDRA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
