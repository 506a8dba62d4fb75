//! Core error types for cancelwatch-core.
//!
//! The countdown tracker itself never fails: malformed input degrades to
//! "action not allowed". Errors here cover the surfaces around it, namely
//! configuration, the order API client and runtime setup.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for cancelwatch-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Order API errors
    #[error("Order API error: {0}")]
    Client(#[from] ClientError),

    /// A countdown session was created outside a tokio runtime.
    #[error("no tokio runtime available to drive the countdown ticker")]
    NoRuntime,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Dot-path key does not name a config field
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Home/config directory could not be prepared
    #[error("Failed to prepare config directory {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised by [`crate::client::OrderClient`].
#[derive(Error, Debug)]
pub enum ClientError {
    /// Base URL or a joined endpoint is not a valid URL
    #[error("invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Transport-level failure or undecodable body
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with an unexpected status
    #[error("server rejected request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// Cancellation requested after the local window closed
    #[error("cancellation window for order {order_id} is closed")]
    WindowClosed { order_id: String },

    /// No order with that id in the listing
    #[error("order {0} not found")]
    OrderNotFound(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
