//! Error types for the limelight-core crate.

use thiserror::Error;

/// Top-level error type for explanation and rendering operations.
#[derive(Debug, Error)]
pub enum LimeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Shape mismatch: expected {expected} outputs, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Unknown output: {0}")]
    UnknownOutput(String),

    #[error("Engine error: {0}")]
    Engine(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl LimeError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn conversion(msg: impl Into<String>) -> Self {
        Self::Conversion(msg.into())
    }

    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    pub fn model(msg: impl Into<String>) -> Self {
        Self::Model(msg.into())
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}
