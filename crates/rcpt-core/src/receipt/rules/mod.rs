//! Lexical classifiers for receipt lines.
//!
//! Pure, stateless predicates and extractors over a single line of text.

pub mod dates;
pub mod labels;
pub mod patterns;
pub mod prices;
pub mod text;

pub use dates::{extract_date, is_date_line};
pub use labels::{is_subtotal_label, is_tax_label, is_total_label};
pub use prices::{extract_price, is_price_line, parse_price};
pub use text::{
    clean_name, is_noise, is_rejected_name, is_savings_line, is_transaction_hash, should_skip_line,
};
