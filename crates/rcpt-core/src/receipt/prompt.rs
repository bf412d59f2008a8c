//! Assistant instructions and response normalization.

use std::str::FromStr;

use chrono::NaiveDate;
use rcpt_assistant::ChatMessage;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ResponseError;
use crate::models::receipt::{ExtractionResult, ExtractionSource, LineItem};

use super::rules::{clean_name, is_price_line};

/// System instruction sent with every assistant request.
pub const RECEIPT_INSTRUCTIONS: &str = "\
You extract structured data from grocery and retail receipt text produced by OCR.

Return exactly one JSON object and nothing else, with these fields:
- \"storeName\": merchant name as printed in the header, or null
- \"date\": transaction date as \"YYYY-MM-DD\", or null
- \"items\": array of {\"name\": string, \"price\": number, \"quantity\": integer}
- \"subtotal\": number or null
- \"tax\": number or null
- \"total\": number or null

Rules:
- Item lines usually look like \"NAME CODE PRICE FLAG\". Strip trailing one or two
  letter codes such as PC, SC, WT or QP from item names.
- A name printed on its own line belongs to the price on the following line.
- Lines like \"3 @ 0.99 LIMES\" mean quantity 3 at unit price 0.99.
- Savings, coupons, payment and card lines are not items.
- Prices are plain numbers without currency symbols.
- Use null for anything not present on the receipt. Do not guess.";

/// Drop lines that carry no information for an assistant.
///
/// A line is kept when it is a price or longer than two characters.
pub fn preprocess_for_assistant(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| is_price_line(line) || line.chars().count() > 2)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the two-message conversation for a receipt.
pub fn build_messages(text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(RECEIPT_INSTRUCTIONS),
        ChatMessage::user(preprocess_for_assistant(text)),
    ]
}

/// Normalize an assistant's JSON answer into an [`ExtractionResult`].
///
/// Numbers may arrive as JSON numbers or numeric strings. Items with an empty
/// name or a missing or negative price are dropped.
pub fn parse_assistant_response(
    response: &str,
    raw_text: &str,
    source: ExtractionSource,
    confidence: f32,
) -> Result<ExtractionResult, ResponseError> {
    let value: Value = serde_json::from_str(response.trim())?;
    let object = value.as_object().ok_or(ResponseError::NotAnObject)?;

    let items = object
        .get("items")
        .and_then(Value::as_array)
        .ok_or_else(|| ResponseError::MissingField("items".to_string()))?;

    let items: Vec<LineItem> = items.iter().filter_map(parse_item).collect();
    debug!("Assistant returned {} usable items", items.len());

    Ok(ExtractionResult {
        items,
        store_name: get_string(object, "storeName"),
        date: get_string(object, "date").and_then(|d| NaiveDate::from_str(&d).ok()),
        subtotal: get_amount(object, "subtotal")?,
        tax: get_amount(object, "tax")?,
        total: get_amount(object, "total")?,
        raw_text: raw_text.to_string(),
        confidence,
        source,
    })
}

fn parse_item(value: &Value) -> Option<LineItem> {
    let object = value.as_object()?;

    let name = clean_name(object.get("name")?.as_str()?);
    if name.is_empty() {
        return None;
    }

    let price = object.get("price").and_then(to_decimal)?;
    if price.is_sign_negative() {
        debug!("Dropping {:?} with negative price {}", name, price);
        return None;
    }

    let quantity = object
        .get("quantity")
        .and_then(to_decimal)
        .and_then(|q| q.trunc().to_u32())
        .unwrap_or(1);

    Some(LineItem::new(name, price).with_quantity(quantity))
}

fn get_string(object: &Map<String, Value>, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn get_amount(object: &Map<String, Value>, key: &str) -> Result<Option<Decimal>, ResponseError> {
    match object.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => to_decimal(value).map(Some).ok_or_else(|| ResponseError::InvalidValue {
            field: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn to_decimal(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().trim_start_matches(['$', '€', '£']).replace(',', ""),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
        .map(|d| d.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_preprocess_drops_short_tokens() {
        let text = "Kroger\n\n  PC \nMILK 2.99\n4\n0.04\nTotal 5.94";
        assert_eq!(
            preprocess_for_assistant(text),
            "Kroger\nMILK 2.99\n0.04\nTotal 5.94"
        );
    }

    #[test]
    fn test_build_messages() {
        let messages = build_messages("Kroger\nSC");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], ChatMessage::system(RECEIPT_INSTRUCTIONS));
        assert_eq!(messages[1], ChatMessage::user("Kroger"));
    }

    #[test]
    fn test_parse_full_response() {
        let response = r#"{
            "storeName": "Kroger",
            "date": "2024-01-15",
            "items": [
                {"name": "Milk", "price": 2.99, "quantity": 1},
                {"name": "Limes", "price": "0.99", "quantity": 3}
            ],
            "subtotal": null,
            "tax": "0.45",
            "total": 5.94
        }"#;

        let result =
            parse_assistant_response(response, "raw", ExtractionSource::OnDevice, 1.0).unwrap();

        assert_eq!(result.store_name.as_deref(), Some("Kroger"));
        assert_eq!(result.date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(
            result.items,
            vec![
                LineItem::new("MILK", Decimal::new(299, 2)),
                LineItem::new("LIMES", Decimal::new(99, 2)).with_quantity(3),
            ]
        );
        assert_eq!(result.subtotal, None);
        assert_eq!(result.tax, Some(Decimal::new(45, 2)));
        assert_eq!(result.total, Some(Decimal::new(594, 2)));
        assert_eq!(result.raw_text, "raw");
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.source, ExtractionSource::OnDevice);
    }

    #[test]
    fn test_drops_unusable_items() {
        let response = r#"{"items": [
            {"name": "  ", "price": 1.00},
            {"name": "COUPON", "price": -1.00},
            {"name": "BREAD"},
            "not an item",
            {"name": "EGGS", "price": 3.49}
        ]}"#;

        let result = parse_assistant_response(response, "", ExtractionSource::Cloud, 0.95).unwrap();
        assert_eq!(result.items, vec![LineItem::new("EGGS", Decimal::new(349, 2))]);
        assert_eq!(result.total, None);
    }

    #[test]
    fn test_invalid_date_is_ignored() {
        let response = r#"{"items": [], "date": "yesterday"}"#;
        let result = parse_assistant_response(response, "", ExtractionSource::Cloud, 0.95).unwrap();
        assert_eq!(result.date, None);
    }

    #[test]
    fn test_rejects_malformed_responses() {
        let source = ExtractionSource::Cloud;
        assert!(matches!(
            parse_assistant_response("Sure! Here is the JSON", "", source, 0.95),
            Err(ResponseError::InvalidJson(_))
        ));
        assert!(matches!(
            parse_assistant_response("[1, 2]", "", source, 0.95),
            Err(ResponseError::NotAnObject)
        ));
        assert!(matches!(
            parse_assistant_response(r#"{"total": 5.94}"#, "", source, 0.95),
            Err(ResponseError::MissingField(_))
        ));
        assert!(matches!(
            parse_assistant_response(r#"{"items": [], "total": "lots"}"#, "", source, 0.95),
            Err(ResponseError::InvalidValue { .. })
        ));
    }
}
