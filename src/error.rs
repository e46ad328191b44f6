//! Error types for route-warden
//!
//! This module defines the error hierarchy used throughout the crate.
//! Evaluation itself never fails: denials are values (see
//! [`Denial`](crate::access_control::Denial)). Errors only arise while
//! loading and compiling a rule set.

use crate::access_control::Denial;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Access denied: {0}")]
    AccessDenied(#[from] Denial),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },

    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    /// Create an `Invalid` error for a rule at the given position
    pub fn invalid_rule(index: usize, message: impl std::fmt::Display) -> Self {
        ConfigError::Invalid {
            message: format!("access_control.rules[{}]: {}", index, message),
        }
    }
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;
