//! Receipt extraction data models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A purchased line on a receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Cleaned, upper-cased item name. Never empty.
    pub name: String,

    /// Unit price as printed (two decimal places).
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,

    /// Number of units, at least 1.
    pub quantity: u32,
}

impl LineItem {
    /// Create a single-unit item.
    pub fn new(name: impl Into<String>, price: Decimal) -> Self {
        Self {
            name: name.into(),
            price,
            quantity: 1,
        }
    }

    /// Set the quantity. Zero is clamped to one.
    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity.max(1);
        self
    }

    /// Price multiplied by quantity, or `None` if it overflows.
    pub fn line_total(&self) -> Option<Decimal> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }
}

/// Which extraction strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionSource {
    /// Generative model running on the device.
    OnDevice,
    /// Remote generative model.
    Cloud,
    /// Deterministic rule-based parser.
    #[default]
    Rules,
}

impl std::fmt::Display for ExtractionSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionSource::OnDevice => write!(f, "on_device"),
            ExtractionSource::Cloud => write!(f, "cloud"),
            ExtractionSource::Rules => write!(f, "rules"),
        }
    }
}

/// Structured record extracted from one receipt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Line items in receipt order.
    pub items: Vec<LineItem>,

    /// Merchant name from the receipt header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_name: Option<String>,

    /// Transaction date (serialized as `YYYY-MM-DD`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,

    /// Explicitly printed subtotal. Never derived from items.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub subtotal: Option<Decimal>,

    /// Tax amount.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub tax: Option<Decimal>,

    /// Grand total.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub total: Option<Decimal>,

    /// The stitched input text, verbatim.
    pub raw_text: String,

    /// Completeness score (0.0 - 1.0).
    pub confidence: f32,

    /// Strategy that produced this result.
    #[serde(default)]
    pub source: ExtractionSource,
}

impl ExtractionResult {
    /// A result with no extracted fields and zero confidence.
    pub fn empty(raw_text: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            store_name: None,
            date: None,
            subtotal: None,
            tax: None,
            total: None,
            raw_text: raw_text.into(),
            confidence: 0.0,
            source: ExtractionSource::Rules,
        }
    }

    /// Sum of all item line totals, or `None` if it overflows.
    pub fn items_total(&self) -> Option<Decimal> {
        self.items
            .iter()
            .try_fold(Decimal::ZERO, |sum, item| sum.checked_add(item.line_total()?))
    }

    /// Whether a human should look at this result before it is trusted.
    pub fn needs_review(&self) -> bool {
        self.confidence < 0.7
    }

    /// Cross-check the extracted amounts and report inconsistencies.
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        let tolerance = Decimal::new(1, 2);

        if self.store_name.is_none() {
            issues.push("Missing store name".to_string());
        }

        if self.date.is_none() {
            issues.push("Missing date".to_string());
        }

        if self.items.is_empty() {
            issues.push("No line items".to_string());
        }

        let Some(total) = self.total else {
            issues.push("Missing total".to_string());
            return issues;
        };

        if let (Some(subtotal), Some(tax)) = (self.subtotal, self.tax) {
            let differs = subtotal
                .checked_add(tax)
                .and_then(|sum| sum.checked_sub(total))
                .is_none_or(|diff| diff.abs() > tolerance);
            if differs {
                issues.push(format!(
                    "Subtotal ({}) plus tax ({}) differs from total ({})",
                    subtotal, tax, total
                ));
            }
        }

        if let Some(subtotal) = self.subtotal {
            match self.items_total() {
                Some(items_total) => {
                    let differs = items_total
                        .checked_sub(subtotal)
                        .is_none_or(|diff| diff.abs() > tolerance);
                    if !self.items.is_empty() && differs {
                        issues.push(format!(
                            "Line item total ({}) differs from subtotal ({})",
                            items_total, subtotal
                        ));
                    }
                }
                None => issues.push("Line item total overflows".to_string()),
            }
        }

        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> ExtractionResult {
        ExtractionResult {
            items: vec![
                LineItem::new("MILK", Decimal::new(299, 2)),
                LineItem::new("BREAD", Decimal::new(150, 2)).with_quantity(2),
            ],
            store_name: Some("KROGER".to_string()),
            date: NaiveDate::from_ymd_opt(2024, 1, 15),
            subtotal: Some(Decimal::new(599, 2)),
            tax: Some(Decimal::new(48, 2)),
            total: Some(Decimal::new(647, 2)),
            raw_text: "KROGER".to_string(),
            confidence: 1.0,
            source: ExtractionSource::Rules,
        }
    }

    #[test]
    fn test_quantity_is_at_least_one() {
        let item = LineItem::new("EGGS", Decimal::new(349, 2)).with_quantity(0);
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn test_items_total_uses_quantity() {
        assert_eq!(sample().items_total(), Some(Decimal::new(599, 2)));
    }

    #[test]
    fn test_line_total_overflow() {
        let item = LineItem::new("X", Decimal::MAX).with_quantity(u32::MAX);
        assert_eq!(item.line_total(), None);

        let mut result = sample();
        result.items.push(item);
        assert_eq!(result.items_total(), None);
        assert!(result.validate().contains(&"Line item total overflows".to_string()));
    }

    #[test]
    fn test_serializes_camel_case_with_numbers() {
        let json = serde_json::to_value(sample()).unwrap();

        assert_eq!(json["storeName"], "KROGER");
        assert_eq!(json["date"], "2024-01-15");
        assert_eq!(json["total"], 6.47);
        assert_eq!(json["items"][1]["quantity"], 2);
        assert_eq!(json["source"], "rules");
    }

    #[test]
    fn test_empty_result_omits_optional_fields() {
        let json = serde_json::to_value(ExtractionResult::empty("")).unwrap();
        let obj = json.as_object().unwrap();

        assert!(!obj.contains_key("total"));
        assert!(!obj.contains_key("storeName"));
        assert_eq!(json["confidence"], 0.0);
    }

    #[test]
    fn test_validate_consistent_receipt() {
        assert!(sample().validate().is_empty());
    }

    #[test]
    fn test_validate_reports_mismatch() {
        let mut result = sample();
        result.total = Some(Decimal::new(1000, 2));

        let issues = result.validate();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("differs from total"));
    }

    #[test]
    fn test_needs_review_threshold() {
        let mut result = sample();
        assert!(!result.needs_review());
        result.confidence = 0.5;
        assert!(result.needs_review());
    }
}
