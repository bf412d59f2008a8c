//! Hybrid receipt parser: assistants first, rules last.

use std::sync::Arc;
use std::time::Instant;

use rcpt_assistant::Assistant;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::models::config::RcptConfig;
use crate::models::receipt::{ExtractionResult, ExtractionSource};

use super::parser::RuleBasedParser;
use super::prompt::{build_messages, parse_assistant_response};

/// Confidence assigned to an on-device assistant answer.
pub const ON_DEVICE_CONFIDENCE: f32 = 1.0;

/// Confidence assigned to a cloud assistant answer.
pub const CLOUD_CONFIDENCE: f32 = 0.95;

/// One step of the fallback chain.
#[derive(Clone)]
pub enum Strategy {
    /// Ask a generative assistant; its answer carries a fixed confidence.
    Assistant {
        assistant: Arc<dyn Assistant>,
        source: ExtractionSource,
        confidence: f32,
    },
    /// Deterministic rule-based parse. Always succeeds.
    Rules,
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Assistant {
                assistant, source, ..
            } => write!(f, "Assistant({}, {})", assistant.name(), source),
            Strategy::Rules => write!(f, "Rules"),
        }
    }
}

/// Receipt parser that tries assistants in order and falls back to rules.
///
/// The on-device assistant is always attempted before the cloud assistant,
/// and the rule-based parser always runs when neither produces a result.
#[derive(Debug, Clone)]
pub struct HybridReceiptParser {
    on_device: Option<Strategy>,
    cloud: Option<Strategy>,
    rules: RuleBasedParser,
}

impl HybridReceiptParser {
    /// Create a parser that only uses rules.
    pub fn new() -> Self {
        Self {
            on_device: None,
            cloud: None,
            rules: RuleBasedParser::new(),
        }
    }

    /// Build a parser from configuration.
    ///
    /// The on-device model is supplied by the host; the cloud key is resolved
    /// by the caller. Disabled or missing assistants are left out.
    pub fn from_config(
        config: &RcptConfig,
        on_device: Option<Arc<dyn Assistant>>,
        cloud_api_key: Option<String>,
    ) -> Result<Self> {
        let mut parser = Self::new().with_rules(RuleBasedParser::with_config(config.extraction.clone()));

        if config.assistant.on_device_enabled {
            if let Some(assistant) = on_device {
                parser = parser.with_on_device(assistant);
            }
        }

        #[cfg(feature = "cloud")]
        if config.assistant.cloud_enabled {
            let cloud = rcpt_assistant::CloudAssistant::new(cloud_api_key)
                .with_base_url(&config.assistant.cloud_base_url)
                .with_model(&config.assistant.cloud_model)
                .with_timeout(std::time::Duration::from_secs(config.assistant.cloud_timeout_secs))?;
            parser = parser.with_cloud(Arc::new(cloud));
        }

        #[cfg(not(feature = "cloud"))]
        if config.assistant.cloud_enabled && cloud_api_key.is_some() {
            warn!("Cloud assistant requested but the `cloud` feature is disabled");
        }

        Ok(parser)
    }

    /// Use an on-device assistant as the first strategy.
    pub fn with_on_device(mut self, assistant: Arc<dyn Assistant>) -> Self {
        self.on_device = Some(Strategy::Assistant {
            assistant,
            source: ExtractionSource::OnDevice,
            confidence: ON_DEVICE_CONFIDENCE,
        });
        self
    }

    /// Use a cloud assistant after the on-device one.
    pub fn with_cloud(mut self, assistant: Arc<dyn Assistant>) -> Self {
        self.cloud = Some(Strategy::Assistant {
            assistant,
            source: ExtractionSource::Cloud,
            confidence: CLOUD_CONFIDENCE,
        });
        self
    }

    /// Replace the rule-based fallback.
    pub fn with_rules(mut self, rules: RuleBasedParser) -> Self {
        self.rules = rules;
        self
    }

    /// The fallback chain in the order it is attempted.
    pub fn strategies(&self) -> Vec<Strategy> {
        self.on_device
            .iter()
            .chain(self.cloud.iter())
            .cloned()
            .chain(std::iter::once(Strategy::Rules))
            .collect()
    }

    /// Parse stitched receipt text.
    ///
    /// Never fails: assistant failures are logged and the next strategy runs.
    pub async fn parse(&self, text: &str) -> ExtractionResult {
        if text.trim().is_empty() {
            debug!("Empty receipt text, skipping extraction");
            return ExtractionResult::empty(text);
        }

        let start = Instant::now();

        for strategy in self.strategies() {
            let Strategy::Assistant {
                assistant,
                source,
                confidence,
            } = strategy
            else {
                break;
            };

            if !assistant.is_available() {
                debug!("Assistant {} unavailable, skipping", assistant.name());
                continue;
            }

            match attempt(assistant.as_ref(), text, source, confidence).await {
                Ok(result) => {
                    info!(
                        "Parsed receipt with {} assistant in {}ms ({} items)",
                        source,
                        start.elapsed().as_millis(),
                        result.items.len()
                    );
                    return result;
                }
                Err(e) => warn!("Assistant {} failed: {}", assistant.name(), e),
            }
        }

        let result = self.rules.parse(text);
        info!(
            "Parsed receipt with rules in {}ms ({} items, confidence {:.2})",
            start.elapsed().as_millis(),
            result.items.len(),
            result.confidence
        );
        result
    }
}

impl Default for HybridReceiptParser {
    fn default() -> Self {
        Self::new()
    }
}

async fn attempt(
    assistant: &dyn Assistant,
    text: &str,
    source: ExtractionSource,
    confidence: f32,
) -> Result<ExtractionResult> {
    let messages = build_messages(text);
    let response = assistant.complete(&messages).await?;
    debug!("Assistant {} answered {} bytes", assistant.name(), response.len());
    Ok(parse_assistant_response(&response, text, source, confidence)?)
}
