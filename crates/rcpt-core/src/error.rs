//! Error types for the rcpt-core library.

use thiserror::Error;

/// Main error type for the rcpt library.
#[derive(Error, Debug)]
pub enum RcptError {
    /// Error from an assistant backend.
    #[error("assistant error: {0}")]
    Assistant(#[from] rcpt_assistant::AssistantError),

    /// Assistant answered, but not with a usable receipt.
    #[error("response error: {0}")]
    Response(#[from] ResponseError),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors related to interpreting an assistant's answer.
#[derive(Error, Debug)]
pub enum ResponseError {
    /// The answer is not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The answer is JSON, but not an object.
    #[error("expected a JSON object")]
    NotAnObject,

    /// A required field is missing or has the wrong shape.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A field value could not be interpreted.
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

/// Result type for the rcpt library.
pub type Result<T> = std::result::Result<T, RcptError>;
