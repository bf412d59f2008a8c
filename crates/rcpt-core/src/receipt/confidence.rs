//! Completeness score for extraction results.

use crate::models::receipt::ExtractionResult;

const TOTAL_WEIGHT: f32 = 0.4;
const DATE_WEIGHT: f32 = 0.3;
const STORE_WEIGHT: f32 = 0.2;
const ITEMS_WEIGHT: f32 = 0.1;

/// Score how complete a result is (0.0 - 1.0), rounded to two decimals.
///
/// This rewards the presence of fields, not their correctness.
pub fn score(result: &ExtractionResult) -> f32 {
    let mut confidence = 0.0f32;
    if result.total.is_some() {
        confidence += TOTAL_WEIGHT;
    }
    if result.date.is_some() {
        confidence += DATE_WEIGHT;
    }
    if result.store_name.is_some() {
        confidence += STORE_WEIGHT;
    }
    if !result.items.is_empty() {
        confidence += ITEMS_WEIGHT;
    }

    ((confidence * 100.0).round() / 100.0).clamp(0.0, 1.0)
}
