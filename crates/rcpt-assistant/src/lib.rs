//! Generative assistant abstraction layer for rcpt.
//!
//! This crate provides a unified interface for asking a text-generation model
//! to structure receipt text:
//! - an adapter over a host-supplied on-device model
//! - an OpenAI-compatible chat-completion client (`cloud` feature)

mod backend;
mod error;
mod message;

pub use backend::on_device::{GenerateFuture, OnDeviceAssistant, OnDeviceModel, strip_code_fences};
pub use backend::{Assistant, AssistantFuture};
pub use error::AssistantError;
pub use message::{ChatMessage, OutputPart, Role};

#[cfg(feature = "cloud")]
pub use backend::cloud::CloudAssistant;

/// Result type for assistant operations.
pub type Result<T> = std::result::Result<T, AssistantError>;
