//! Error types for context configuration.

use thiserror::Error;

/// Errors raised while loading or validating a [`crate::TimingConfig`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The configuration document could not be parsed.
    #[error("failed to parse timing configuration: {0}")]
    Parse(String),

    /// A field holds a value the resolver cannot work with.
    #[error("invalid timing configuration value for '{field}': {message}")]
    InvalidValue { field: &'static str, message: String },
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        ConfigError::Parse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
