//! Configuration management for Roam services.
//!
//! The recommender reads a single configuration file at `~/.roam/config.json`.
//!
//! # Configuration Priority
//!
//! 1. Environment variables (ROAM_* prefix)
//! 2. Explicit config file values
//! 3. Default values
//!
//! # Environment Variable Mapping
//!
//! - `ROAM_HOST` → server.host
//! - `ROAM_PORT` → server.port
//! - `ROAM_LOG_LEVEL` → observability.log_level
//! - `ROAM_LOG_FORMAT` → observability.log_format
//! - `ROAM_DINING_CSV` → data.dining_csv
//! - `ROAM_ATTRACTIONS_CSV` → data.attractions_csv
//! - `ROAM_TOP_N` → recommender.top_n

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the configuration directory path.
pub fn config_dir() -> PathBuf {
    directories::UserDirs::new().map_or_else(
        || PathBuf::from(".roam"),
        |dirs| dirs.home_dir().join(".roam"),
    )
}

/// Get the configuration file path.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

// ============================================================================
// Root Configuration
// ============================================================================

/// Root configuration structure for Roam services.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// HTTP listener configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Input data sources
    #[serde(default)]
    pub data: DataConfig,

    /// Ranking behaviour
    #[serde(default)]
    pub recommender: RecommenderConfig,

    /// Column resolution rules for heterogeneous review tables
    #[serde(default)]
    pub columns: ColumnRulesConfig,
}

impl Config {
    /// Load configuration from the default path.
    pub fn load() -> Result<Self> {
        let path = config_path();
        if !path.exists() {
            tracing::info!("Config file not found, using defaults");
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

    /// Load configuration with environment variable overrides.
    pub fn load_with_env() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(host) = lookup("ROAM_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("ROAM_PORT") {
            match port.parse() {
                Ok(p) => self.server.port = p,
                Err(_) => tracing::warn!(value = %port, "Ignoring invalid ROAM_PORT"),
            }
        }

        if let Some(level) = lookup("ROAM_LOG_LEVEL") {
            self.observability.log_level = level;
        }
        if let Some(format) = lookup("ROAM_LOG_FORMAT") {
            self.observability.log_format = format;
        }

        if let Some(path) = lookup("ROAM_DINING_CSV") {
            self.data.dining_csv = Some(path);
        }
        if let Some(path) = lookup("ROAM_ATTRACTIONS_CSV") {
            self.data.attractions_csv = Some(path);
        }

        if let Some(top_n) = lookup("ROAM_TOP_N") {
            match top_n.parse() {
                Ok(n) => self.recommender.top_n = n,
                Err(_) => tracing::warn!(value = %top_n, "Ignoring invalid ROAM_TOP_N"),
            }
        }
    }

    /// Socket address string for the HTTP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// ============================================================================
// Server Configuration
// ============================================================================

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host. Default is `127.0.0.1` (local only).
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
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

    /// Additional module targets to pin at `warn`.
    #[serde(default)]
    pub excluded_targets: Vec<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: default_log_format(),
            excluded_targets: Vec::new(),
        }
    }
}

// ============================================================================
// Data Configuration
// ============================================================================

/// Where the dining and attraction review tables come from.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DataConfig {
    /// Path to the dining reviews CSV (`~` is expanded)
    #[serde(default)]
    pub dining_csv: Option<String>,

    /// Path to the attraction reviews CSV (`~` is expanded)
    #[serde(default)]
    pub attractions_csv: Option<String>,

    /// Leading lines to skip before the header row
    #[serde(default)]
    pub skip_rows: usize,

    /// Header names applied positionally when the exported header is blank
    /// (e.g. `["Place", "Review", "Location"]`)
    #[serde(default)]
    pub positional_headers: Option<Vec<String>>,
}

impl DataConfig {
    /// Expanded dining CSV path, if configured.
    pub fn dining_path(&self) -> Option<PathBuf> {
        self.dining_csv.as_deref().map(expand_path)
    }

    /// Expanded attractions CSV path, if configured.
    pub fn attractions_path(&self) -> Option<PathBuf> {
        self.attractions_csv.as_deref().map(expand_path)
    }
}

fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

// ============================================================================
// Recommender Configuration
// ============================================================================

/// Ranking behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommenderConfig {
    /// Number of places returned per category when the caller gives no limit
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Upper bound for caller-supplied limits
    #[serde(default = "default_max_limit")]
    pub max_limit: usize,

    /// Capacity of the review polarity cache (0 disables caching)
    #[serde(default = "default_scorer_cache_capacity")]
    pub scorer_cache_capacity: usize,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            top_n: default_top_n(),
            max_limit: default_max_limit(),
            scorer_cache_capacity: default_scorer_cache_capacity(),
        }
    }
}

// ============================================================================
// Column Rules Configuration
// ============================================================================

/// Exact names and substring fragments that identify one canonical column.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnMatchConfig {
    /// Lowercase column names mapped directly
    #[serde(default)]
    pub synonyms: Vec<String>,

    /// Lowercase fragments searched for when no synonym is present
    #[serde(default)]
    pub fragments: Vec<String>,
}

impl ColumnMatchConfig {
    fn new(synonyms: &[&str], fragments: &[&str]) -> Self {
        Self {
            synonyms: synonyms.iter().map(|s| s.to_string()).collect(),
            fragments: fragments.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// True when the rule can never match anything.
    pub fn is_empty(&self) -> bool {
        self.synonyms.is_empty() && self.fragments.is_empty()
    }
}

/// Column resolution rules for the three canonical fields.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ColumnRulesConfig {
    #[serde(default = "default_place_rule")]
    pub place: ColumnMatchConfig,

    #[serde(default = "default_location_rule")]
    pub location: ColumnMatchConfig,

    #[serde(default = "default_review_rule")]
    pub review: ColumnMatchConfig,
}

impl Default for ColumnRulesConfig {
    fn default() -> Self {
        Self {
            place: default_place_rule(),
            location: default_location_rule(),
            review: default_review_rule(),
        }
    }
}

fn default_place_rule() -> ColumnMatchConfig {
    ColumnMatchConfig::new(&["name", "place_name", "place"], &["name", "place"])
}

fn default_location_rule() -> ColumnMatchConfig {
    ColumnMatchConfig::new(
        &["location", "city", "address"],
        &["city", "location", "address"],
    )
}

fn default_review_rule() -> ColumnMatchConfig {
    ColumnMatchConfig::new(
        &["review", "reviews", "comment"],
        &["review", "comment", "feedback"],
    )
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    4480
}
fn default_log_level() -> String {
    "info".into()
}
fn default_log_format() -> String {
    "pretty".into()
}
fn default_top_n() -> usize {
    3
}
fn default_max_limit() -> usize {
    20
}
fn default_scorer_cache_capacity() -> usize {
    4096
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.bind_address(), "127.0.0.1:4480");
        assert_eq!(config.recommender.top_n, 3);
        assert_eq!(config.observability.log_format, "pretty");
        assert!(config.data.dining_csv.is_none());
        assert_eq!(config.columns.place.synonyms, vec!["name", "place_name", "place"]);
        assert_eq!(
            config.columns.review.fragments,
            vec!["review", "comment", "feedback"]
        );
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let json = r#"{
            "server": { "port": 9000 },
            "data": { "dining_csv": "data/Dining.csv", "skip_rows": 2 },
            "observability": { "level": "debug" }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.data.skip_rows, 2);
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.recommender.top_n, 3);
        assert_eq!(config.columns, ColumnRulesConfig::default());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.bind_address(), config.bind_address());
        assert_eq!(parsed.columns, config.columns);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{ "recommender": { "top_n": 5 } }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.recommender.top_n, 5);
        assert_eq!(config.recommender.max_limit, 20);
    }

    #[test]
    fn test_load_from_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("ROAM_PORT", "5000"),
            ("ROAM_LOG_LEVEL", "trace"),
            ("ROAM_DINING_CSV", "/tmp/dining.csv"),
            ("ROAM_TOP_N", "not-a-number"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.observability.log_level, "trace");
        assert_eq!(config.data.dining_path(), Some(PathBuf::from("/tmp/dining.csv")));
        // Invalid numbers are ignored
        assert_eq!(config.recommender.top_n, 3);
    }

    #[test]
    fn test_tilde_expansion() {
        let data = DataConfig {
            attractions_csv: Some("~/data/Spots.csv".into()),
            ..Default::default()
        };
        let path = data.attractions_path().unwrap();
        assert!(path.ends_with("data/Spots.csv"));
        assert!(data.dining_path().is_none());
    }
}
