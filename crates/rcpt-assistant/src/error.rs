//! Error types for the assistant layer.

use thiserror::Error;

/// Errors that can occur while talking to an assistant.
#[derive(Error, Debug)]
pub enum AssistantError {
    /// The assistant is not configured or not usable on this device.
    #[error("assistant unavailable: {0}")]
    Unavailable(String),

    /// Transport failure talking to a remote endpoint.
    #[cfg(feature = "cloud")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The model produced no text output.
    #[error("assistant returned no text")]
    EmptyResponse,

    /// A response body could not be decoded.
    #[error("invalid response JSON: {0}")]
    Json(#[from] serde_json::Error),
}
