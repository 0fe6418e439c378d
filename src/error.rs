//! Error types for the SICK Tag-LOC connector

use thiserror::Error;

/// Errors produced while talking to the RTLS or the local configuration.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Configuration file could not be read or deserialized
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Configuration loaded but failed validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// REST request failed (transport error or non-2xx status)
    #[error("REST request failed: {0}")]
    Rest(#[from] reqwest::Error),

    /// WebSocket transport failure
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// A JSON payload did not deserialize
    #[error("malformed JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// A feed update arrived but its contents were not usable
    #[error("malformed feed update: {0}")]
    Message(String),

    /// Operation needs a server-assigned id that is not present
    #[error("{0} has no server-assigned id")]
    MissingId(&'static str),
}
