//! Roam Common - Shared configuration, errors, and logging for Roam services.
//!
//! This crate provides:
//! - Configuration types and loading
//! - Configuration validation
//! - Error types and handling utilities
//! - Logging setup
//! - Small text helpers shared by the recommender and its HTTP layer

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod logging;
pub mod util;
pub mod validation;

pub use config::{
    ColumnMatchConfig, ColumnRulesConfig, Config, DataConfig, ObservabilityConfig,
    RecommenderConfig, ServerConfig,
};
pub use error::{Error, Result};
pub use validation::{Validate, ValidationError, ValidationResult};

