//! Summary label detection (total, subtotal, tax).

use super::patterns::{SUBTOTAL_LABEL, TAX_LABEL, TOTAL_LABEL};

/// Check if a line is labelled as the grand total (or balance/payment).
///
/// Subtotal and "TOTAL TAX" lines are not totals.
pub fn is_total_label(line: &str) -> bool {
    TOTAL_LABEL.is_match(line) && !is_subtotal_label(line) && !is_tax_label(line)
}

/// Check if a line is labelled as the subtotal.
pub fn is_subtotal_label(line: &str) -> bool {
    SUBTOTAL_LABEL.is_match(line)
}

/// Check if a line starts with a tax label.
pub fn is_tax_label(line: &str) -> bool {
    TAX_LABEL.is_match(line)
}
