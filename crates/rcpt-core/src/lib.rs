//! Core library for receipt understanding.
//!
//! This crate provides:
//! - Spatial stitching of OCR fragments into logical receipt lines
//! - Rule-based extraction of store, date, items, subtotal, tax and total
//! - A completeness confidence score
//! - A hybrid parser that asks generative assistants before falling back to rules

pub mod error;
pub mod models;
pub mod ocr;
pub mod receipt;

pub use error::{RcptError, ResponseError, Result};
pub use models::config::RcptConfig;
pub use models::receipt::{ExtractionResult, ExtractionSource, LineItem};
pub use ocr::{Geometry, LineStitcher, OcrInput, TextBlock, TextFragment};
pub use receipt::{HybridReceiptParser, ReceiptExtractor, RuleBasedParser};

/// Re-export assistant types.
pub use rcpt_assistant::{Assistant, AssistantError, ChatMessage, OnDeviceAssistant, OnDeviceModel};

#[cfg(feature = "cloud")]
pub use rcpt_assistant::CloudAssistant;
