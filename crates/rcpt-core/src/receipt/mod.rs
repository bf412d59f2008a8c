//! Receipt field extraction module.

mod confidence;
mod cursor;
mod hybrid;
mod parser;
mod prompt;
pub mod rules;

pub use confidence::score as score_confidence;
pub use hybrid::{CLOUD_CONFIDENCE, HybridReceiptParser, ON_DEVICE_CONFIDENCE, Strategy};
pub use parser::RuleBasedParser;
pub use prompt::{
    RECEIPT_INSTRUCTIONS, build_messages, parse_assistant_response, preprocess_for_assistant,
};

use crate::models::receipt::ExtractionResult;

/// Trait for synchronous receipt extractors.
pub trait ReceiptExtractor {
    /// Extract receipt data from stitched text.
    fn extract(&self, text: &str) -> ExtractionResult;
}
