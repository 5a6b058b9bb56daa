//! Configuration for the coilscan service.
//!
//! Loads a JSON config file from the user's home directory, falling back to
//! defaults when the file is absent. Every section is optional in the file;
//! serde defaults keep partial configs valid.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::screener::ScreenerConfig;

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".coilscan"),
        |dirs| dirs.home_dir().join(".coilscan"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Market data source configuration
    #[serde(default)]
    pub data: DataConfig,

    /// Screener configuration
    #[serde(default)]
    pub screener: ScreenerConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Load configuration with environment variable overrides applied.
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var("COILSCAN_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Ok(format) = std::env::var("COILSCAN_LOG_FORMAT") {
            self.observability.log_format = format;
        }
        if let Ok(workers) = std::env::var("COILSCAN_WORKERS") {
            if let Ok(w) = workers.parse() {
                self.screener.workers = w;
            }
        }
    }
}

// ============================================================================
// Observability Configuration
// ============================================================================

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level", alias = "level")]
    pub log_level: String,

    /// Log format (json, pretty)
    #[serde(default = "default_log_format", alias = "format")]
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "info".into()
}

fn default_log_format() -> String {
    "pretty".into()
}

// ============================================================================
// Data Source Configuration
// ============================================================================

/// Market data source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// HTTP request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Enabled data sources in any order; routing uses per-source priority
    #[serde(default = "default_sources")]
    pub sources: Vec<SourceEntry>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout_secs(),
            sources: default_sources(),
        }
    }
}

/// One configured data source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEntry {
    /// Provider name (e.g., "eastmoney", "sina")
    pub provider: String,

    /// Whether this source is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Priority (lower = tried first)
    #[serde(default = "default_priority")]
    pub priority: u8,
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_sources() -> Vec<SourceEntry> {
    vec![
        SourceEntry {
            provider: "eastmoney".to_string(),
            enabled: true,
            priority: 1,
        },
        SourceEntry {
            provider: "sina".to_string(),
            enabled: true,
            priority: 2,
        },
    ]
}

fn default_true() -> bool {
    true
}

fn default_priority() -> u8 {
    1
}

// ============================================================================
// Tests
// ============================================================================
