//! Engine construction errors.
//!
//! Evaluation itself never fails: denials are values, not errors.

use cadence_context::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, EngineError>;
