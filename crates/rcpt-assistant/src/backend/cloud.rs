//! OpenAI-compatible chat-completion backend.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{Assistant, AssistantFuture};
use crate::{AssistantError, ChatMessage, Result};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Assistant backed by a remote `/chat/completions` endpoint.
///
/// Requests ask for `response_format: json_object`, so the message content is
/// returned as-is without fence stripping.
#[derive(Debug, Clone)]
pub struct CloudAssistant {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
}

impl CloudAssistant {
    /// Create a client. A missing or blank key leaves the assistant unavailable.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Set the API base URL (without the `/chat/completions` suffix).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        if !base_url.trim().is_empty() {
            self.base_url = base_url.trim_end_matches('/').to_string();
        }
        self
    }

    /// Set the model name.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        let model = model.into();
        if !model.trim().is_empty() {
            self.model = model;
        }
        self
    }

    /// Bound each request by a transport timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    fn request_body(&self, messages: &[ChatMessage]) -> serde_json::Value {
        json!({
            "model": self.model,
            "messages": messages,
            "response_format": {"type": "json_object"}
        })
    }
}

impl Assistant for CloudAssistant {
    fn name(&self) -> &str {
        "cloud"
    }

    fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    fn complete<'a>(&'a self, messages: &'a [ChatMessage]) -> AssistantFuture<'a> {
        Box::pin(async move {
            let key = self
                .api_key
                .as_deref()
                .ok_or_else(|| AssistantError::Unavailable("no API key configured".to_string()))?;

            let url = format!("{}/chat/completions", self.base_url);
            debug!("Posting {} messages to {} ({})", messages.len(), url, self.model);

            let response = self
                .client
                .post(&url)
                .bearer_auth(key)
                .json(&self.request_body(messages))
                .send()
                .await?;

            let status = response.status();
            let text = response.text().await?;
            if !status.is_success() {
                return Err(AssistantError::Api {
                    status: status.as_u16(),
                    message: extract_api_error(&text).unwrap_or(text),
                });
            }

            extract_content(&text)
        })
    }
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Pull the first choice's content out of a completion body.
fn extract_content(body: &str) -> Result<String> {
    let parsed: CompletionResponse = serde_json::from_str(body)?;
    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or(AssistantError::EmptyResponse)
}

fn extract_api_error(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<ApiError>,
    }

    #[derive(Deserialize)]
    struct ApiError {
        message: Option<String>,
    }

    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    parsed.error?.message
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blank_key_is_unavailable() {
        assert!(!CloudAssistant::new(None).is_available());
        assert!(!CloudAssistant::new(Some("  ".to_string())).is_available());
        assert!(CloudAssistant::new(Some("sk-test".to_string())).is_available());
    }

    #[test]
    fn test_request_body_asks_for_json_object() {
        let assistant = CloudAssistant::new(Some("sk-test".to_string())).with_model("small-model");
        let body = assistant.request_body(&[
            ChatMessage::system("rules"),
            ChatMessage::user("receipt"),
        ]);

        assert_eq!(body["model"], "small-model");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "receipt");
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let assistant = CloudAssistant::new(None).with_base_url("http://localhost:8080/v1/");
        assert_eq!(assistant.base_url, "http://localhost:8080/v1");
    }

    #[test]
    fn test_extract_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"{\"items\":[]}"}}]}"#;
        assert_eq!(extract_content(body).unwrap(), r#"{"items":[]}"#);

        let empty = r#"{"choices":[]}"#;
        assert!(matches!(extract_content(empty), Err(AssistantError::EmptyResponse)));

        assert!(matches!(extract_content("not json"), Err(AssistantError::Json(_))));
    }

    #[test]
    fn test_extract_api_error() {
        let body = r#"{"error":{"message":"Invalid API key","type":"auth"}}"#;
        assert_eq!(extract_api_error(body), Some("Invalid API key".to_string()));
        assert_eq!(extract_api_error("<html>"), None);
    }

    #[tokio::test]
    async fn test_complete_without_key_fails_fast() {
        let assistant = CloudAssistant::new(None);
        let messages = [ChatMessage::user("x")];
        let err = assistant.complete(&messages).await.unwrap_err();
        assert!(matches!(err, AssistantError::Unavailable(_)));
    }
}
