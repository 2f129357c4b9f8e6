//! Configuration validation for Roam services.
//!
//! Provides validation logic for configuration fields to ensure
//! all required values are present and within valid ranges.

use thiserror::Error;

use crate::config::{
    ColumnRulesConfig, Config, ObservabilityConfig, RecommenderConfig, ServerConfig,
};

/// Configuration validation error.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid port {port}: must be between 1 and 65535")]
    InvalidPort { port: u16, field: String },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Multiple validation errors: {0:?}")]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Trait for validatable configuration sections.
pub trait Validate {
    /// Validate this configuration section.
    fn validate(&self) -> ValidationResult<()>;
}

impl Config {
    /// Validate the entire configuration.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();

        if let Err(e) = self.server.validate() {
            errors.push(e);
        }
        if let Err(e) = self.observability.validate() {
            errors.push(e);
        }
        if let Err(e) = self.recommender.validate() {
            errors.push(e);
        }
        if let Err(e) = self.columns.validate() {
            errors.push(e);
        }

        if errors.is_empty() {
            Ok(())
        } else if errors.len() == 1 {
            Err(errors.remove(0))
        } else {
            Err(ValidationError::Multiple(errors))
        }
    }

    /// Load and validate configuration (environment overrides applied).
    pub fn load_and_validate() -> anyhow::Result<Self> {
        let config = Self::load_with_env()?;
        config.validate().map_err(|e| anyhow::anyhow!("{}", e))?;
        Ok(config)
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort {
                port: self.port,
                field: "server.port".into(),
            });
        }
        if self.host.trim().is_empty() {
            return Err(ValidationError::MissingField {
                field: "server.host".into(),
            });
        }
        Ok(())
    }
}

impl Validate for ObservabilityConfig {
    fn validate(&self) -> ValidationResult<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_level".into(),
                reason: format!("must be one of: {}", valid_levels.join(", ")),
            });
        }

        if self.log_format != "json" && self.log_format != "pretty" {
            return Err(ValidationError::InvalidValue {
                field: "observability.log_format".into(),
                reason: "must be 'json' or 'pretty'".into(),
            });
        }

        Ok(())
    }
}

impl Validate for RecommenderConfig {
    fn validate(&self) -> ValidationResult<()> {
        if self.top_n == 0 {
            return Err(ValidationError::InvalidValue {
                field: "recommender.top_n".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.max_limit < self.top_n {
            return Err(ValidationError::InvalidValue {
                field: "recommender.max_limit".into(),
                reason: format!("must not be below top_n ({})", self.top_n),
            });
        }
        Ok(())
    }
}

impl Validate for ColumnRulesConfig {
    fn validate(&self) -> ValidationResult<()> {
        let rules = [
            ("columns.place", &self.place),
            ("columns.location", &self.location),
            ("columns.review", &self.review),
        ];

        for (field, rule) in rules {
            if rule.is_empty() {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    reason: "needs at least one synonym or fragment".into(),
                });
            }
            if rule
                .synonyms
                .iter()
                .chain(&rule.fragments)
                .any(|name| name.trim().is_empty() || name.trim() != name.to_lowercase().trim())
            {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    reason: "names must be non-empty lowercase strings".into(),
                });
            }
        }

        Ok(())
    }
}
