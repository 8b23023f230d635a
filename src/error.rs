//! Error types for posture tracking

use thiserror::Error;

/// Result type for posture tracking operations
pub type Result<T> = std::result::Result<T, PostureError>;

#[derive(Error, Debug)]
pub enum PostureError {
    /// Invalid configuration detected at startup
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Two of the points forming an angle coincide, so the angle is undefined
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed landmark record
    #[error("Parse error on line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },

    #[error("Failed to read config: {0}")]
    Toml(#[from] toml::de::Error),
}

impl PostureError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
