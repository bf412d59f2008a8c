//! Boilerplate, noise and item-name cleanup.

use super::patterns::{NAME_DISALLOWED, SKIP_LINE, WHITESPACE};

/// Check if a line is known non-item vocabulary.
///
/// Covers store policy text, payment terminal metadata, card networks,
/// greetings and footers, and any line mentioning savings.
pub fn should_skip_line(line: &str) -> bool {
    is_savings_line(line) || SKIP_LINE.is_match(line)
}

/// Check if a line reports a discount ("SAVINGS" anywhere).
pub fn is_savings_line(line: &str) -> bool {
    line.to_uppercase().contains("SAVINGS")
}

/// Check if a line is too short or too symbolic to be an item name.
pub fn is_noise(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.chars().count() <= 2
        || !trimmed.chars().any(char::is_alphabetic)
        || should_skip_line(trimmed)
}

/// Normalize an item name: drop stray punctuation, collapse whitespace, upper-case.
pub fn clean_name(raw: &str) -> String {
    let stripped = NAME_DISALLOWED.replace_all(raw, " ");
    WHITESPACE
        .replace_all(stripped.trim(), " ")
        .to_uppercase()
}

/// Check if a candidate item name is really a transaction artifact.
///
/// Rejects card-transaction hashes (8+ alphanumerics mixing letters and
/// digits, no spaces), purely numeric strings, and "TC" certificate lines.
pub fn is_rejected_name(name: &str) -> bool {
    let name = name.trim();
    is_transaction_hash(name)
        || name.chars().all(|c| c.is_ascii_digit() || c.is_whitespace())
        || name.to_uppercase().starts_with("TC")
}

/// Check if a token looks like a card-transaction hash: 8+ alphanumerics
/// mixing letters and digits, no spaces.
pub fn is_transaction_hash(s: &str) -> bool {
    let s = s.trim();
    s.chars().count() >= 8
        && s.chars().all(|c| c.is_ascii_alphanumeric())
        && s.chars().any(|c| c.is_ascii_alphabetic())
        && s.chars().any(|c| c.is_ascii_digit())
}
