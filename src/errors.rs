use std::result::Result as StdResult;

use thiserror::Error;

/// Unified error type for the funnel domain, storage, and configuration layers.
#[derive(Debug, Error)]
pub enum FunnelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Step incomplete: {0}")]
    Incomplete(String),
    #[error("Photo processing failed: {0}")]
    Photo(String),
    #[error("Analytics sink failed: {0}")]
    Analytics(String),
    #[error("External handler failed: {0}")]
    External(String),
}

pub type Result<T> = StdResult<T, FunnelError>;

impl From<image::ImageError> for FunnelError {
    fn from(err: image::ImageError) -> Self {
        FunnelError::Photo(err.to_string())
    }
}

impl From<url::ParseError> for FunnelError {
    fn from(err: url::ParseError) -> Self {
        FunnelError::InvalidInput(err.to_string())
    }
}
