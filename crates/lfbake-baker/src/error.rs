//! Error types for the baker.

use thiserror::Error;

/// Errors that can occur while configuring the baker.
#[derive(Error, Debug)]
pub enum BakerError {
    /// Invalid classifier settings.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Settings could not be parsed.
    #[error("failed to parse settings: {0}")]
    Config(#[from] toml::de::Error),
}

/// Result type for baker operations.
pub type Result<T> = std::result::Result<T, BakerError>;
