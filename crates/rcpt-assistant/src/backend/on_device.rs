//! Adapter for text-generation models running on the host device.

use std::future::Future;
use std::pin::Pin;

use tracing::debug;

use super::{Assistant, AssistantFuture};
use crate::{AssistantError, ChatMessage, OutputPart, Result};

/// Boxed future returned by [`OnDeviceModel::generate`].
pub type GenerateFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<OutputPart>>> + Send + 'a>>;

/// A model supplied by the host platform.
pub trait OnDeviceModel: Send + Sync {
    /// Whether the model is present and ready on this device.
    fn is_available(&self) -> bool;

    /// Run the model over the conversation.
    fn generate<'a>(&'a self, messages: &'a [ChatMessage]) -> GenerateFuture<'a>;
}

/// [`Assistant`] over an [`OnDeviceModel`].
pub struct OnDeviceAssistant<M> {
    model: M,
}

impl<M: OnDeviceModel> OnDeviceAssistant<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }
}

impl<M: OnDeviceModel> Assistant for OnDeviceAssistant<M> {
    fn name(&self) -> &str {
        "on-device"
    }

    fn is_available(&self) -> bool {
        self.model.is_available()
    }

    fn complete<'a>(&'a self, messages: &'a [ChatMessage]) -> AssistantFuture<'a> {
        Box::pin(async move {
            let parts = self.model.generate(messages).await?;
            debug!("On-device model returned {} output parts", parts.len());

            let text = parts
                .iter()
                .find(|part| part.is_text())
                .and_then(|part| part.text.as_deref())
                .ok_or(AssistantError::EmptyResponse)?;

            let body = strip_code_fences(text);
            if body.is_empty() {
                return Err(AssistantError::EmptyResponse);
            }
            Ok(body.to_string())
        })
    }
}

/// Remove a Markdown code fence (```` ```json ... ``` ````) around a response.
///
/// Text without a leading fence is returned trimmed but otherwise unchanged.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string ("json") on the opening fence line.
    let body = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}
