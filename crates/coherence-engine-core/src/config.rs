//! Configuration management for the coherence engine.

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{CoherenceError, CoherenceResult};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub persistence: PersistenceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Configuration is loaded in order:
    /// 1. config/default.toml (base settings)
    /// 2. config/{COHERENCE_ENGINE_ENV}.toml (environment-specific)
    /// 3. Environment variables with COHERENCE_ENGINE prefix
    pub fn load() -> CoherenceResult<Self> {
        let env =
            std::env::var("COHERENCE_ENGINE_ENV").unwrap_or_else(|_| "development".to_string());

        let builder = ::config::Config::builder()
            .add_source(::config::File::with_name("config/default").required(false))
            .add_source(::config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(::config::Environment::with_prefix("COHERENCE_ENGINE").separator("__"));

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> CoherenceResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoherenceError::ConfigError(format!(
                "Failed to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| {
            CoherenceError::ConfigError(format!("Failed to parse config file: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> CoherenceResult<()> {
        self.engine.validate()?;
        self.persistence.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Engine behaviour settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Length of each per-user history sequence (default: 100)
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Minimum spacing between feedback emissions in ms (default: 3000)
    #[serde(default = "default_feedback_interval_ms")]
    pub feedback_interval_ms: u64,

    /// Capabilities advertised in the bridge-ready announcement
    #[serde(default = "default_capabilities")]
    pub capabilities: Vec<String>,
}

fn default_history_window() -> usize {
    constants::history::DEFAULT_WINDOW
}

fn default_feedback_interval_ms() -> u64 {
    constants::feedback::DEFAULT_INTERVAL_MS
}

fn default_capabilities() -> Vec<String> {
    [
        "harmonic-analysis",
        "coherence-scoring",
        "collective-sync",
        "feedback-generation",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            feedback_interval_ms: default_feedback_interval_ms(),
            capabilities: default_capabilities(),
        }
    }
}

impl EngineConfig {
    /// Validate the engine configuration.
    ///
    /// FAIL FAST: the stability statistics read the last 20 entries, so a
    /// window shorter than that would silently change the scoring contract.
    pub fn validate(&self) -> CoherenceResult<()> {
        if self.history_window < constants::history::STATS_WINDOW {
            return Err(CoherenceError::ConfigError(format!(
                "engine.history_window must be >= {}, got {}",
                constants::history::STATS_WINDOW,
                self.history_window
            )));
        }

        if self.feedback_interval_ms == 0 {
            return Err(CoherenceError::ConfigError(
                "engine.feedback_interval_ms must be greater than 0".into(),
            ));
        }

        if self.capabilities.iter().any(|c| c.trim().is_empty()) {
            return Err(CoherenceError::ConfigError(
                "engine.capabilities must not contain empty names".into(),
            ));
        }

        Ok(())
    }
}

/// Persistence writer settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PersistenceConfig {
    /// Bound of the pending-write queue (default: 64)
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Maximum records returned by a history query (default: 100)
    #[serde(default = "default_query_limit")]
    pub query_limit: usize,
}

fn default_queue_capacity() -> usize {
    64
}

fn default_query_limit() -> usize {
    100
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            query_limit: default_query_limit(),
        }
    }
}

impl PersistenceConfig {
    pub fn validate(&self) -> CoherenceResult<()> {
        if self.queue_capacity == 0 {
            return Err(CoherenceError::ConfigError(
                "persistence.queue_capacity must be greater than 0".into(),
            ));
        }
        if self.query_limit == 0 {
            return Err(CoherenceError::ConfigError(
                "persistence.query_limit must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            include_location: false,
        }
    }
}

impl LoggingConfig {
    pub fn validate(&self) -> CoherenceResult<()> {
        match self.format.to_lowercase().as_str() {
            "pretty" | "compact" => Ok(()),
            other => Err(CoherenceError::ConfigError(format!(
                "logging.format must be 'pretty' or 'compact', got '{}'",
                other
            ))),
        }
    }
}
