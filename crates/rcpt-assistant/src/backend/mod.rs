//! Assistant backend implementations.

#[cfg(feature = "cloud")]
pub mod cloud;

pub mod on_device;

use std::future::Future;
use std::pin::Pin;

use crate::{ChatMessage, Result};

/// Boxed future returned by [`Assistant::complete`].
pub type AssistantFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + Send + 'a>>;

/// Trait for generative assistants.
///
/// This trait abstracts over where the model runs, allowing the same
/// orchestration code to try an on-device model and a remote endpoint in a
/// fixed order.
pub trait Assistant: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Check whether the assistant can be called right now.
    fn is_available(&self) -> bool;

    /// Send the conversation and return the answer text.
    ///
    /// The returned text is expected to be a single JSON document; transport
    /// wrapping such as Markdown fences is removed by the implementation.
    fn complete<'a>(&'a self, messages: &'a [ChatMessage]) -> AssistantFuture<'a>;
}
