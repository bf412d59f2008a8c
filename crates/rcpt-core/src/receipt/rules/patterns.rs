//! Common regex patterns for receipt line classification.

use lazy_static::lazy_static;
use regex::Regex;

/// A two-decimal amount, optionally with thousands separators.
macro_rules! price {
    () => {
        r"(\d{1,3}(?:,\d{3})+\.\d{2}|\d+\.\d{2})"
    };
}

/// Trailing flag printed after a price (tax codes like "F", "N", "TX", or a marker).
macro_rules! flag {
    () => {
        r"(?:[A-Z]{1,2}|[*#-])"
    };
}

lazy_static! {
    // Prices
    pub static ref PRICE_LINE: Regex = Regex::new(
        concat!(r"(?i)^[$€£]?\s*", price!(), r"\s*", flag!(), r"?$")
    ).unwrap();

    pub static ref PRICE_AT_END: Regex = Regex::new(
        concat!(r"(?i)[$€£]?\s*", price!(), r"\s*(?:USD|CAD|EUR|", flag!(), r")?\s*$")
    ).unwrap();

    pub static ref PRICE_AT_START: Regex = Regex::new(
        concat!(r"^\s*[$€£]?\s*", price!(), r"\b")
    ).unwrap();

    // Item lines: "NAME ... PRICE [FLAG]" and "QTY @ UNIT_PRICE NAME"
    pub static ref ITEM_LINE: Regex = Regex::new(
        concat!(r"(?i)^(.+?)\s+[$€£]?", price!(), r"\s*", flag!(), r"?$")
    ).unwrap();

    pub static ref QUANTITY_ITEM_LINE: Regex = Regex::new(
        concat!(r"^(\d+)\s*@\s*[$€£]?", price!(), r"\s+(.+)$")
    ).unwrap();

    // Dates: M/D/YYYY, M-D-YY, M.D.YYYY
    pub static ref DATE: Regex = Regex::new(
        r"\b(\d{1,2})[/.\-](\d{1,2})[/.\-](\d{4}|\d{2})\b"
    ).unwrap();

    // Summary labels
    pub static ref TOTAL_LABEL: Regex = Regex::new(
        r"(?i)\b(?:GRAND\s+TOTAL|TOTAL|BALANCE|AMOUNT\s+DUE|PAYMENT|PAID)\b"
    ).unwrap();

    pub static ref SUBTOTAL_LABEL: Regex = Regex::new(
        r"(?i)\bSUB[\s\-]?TOTAL\b"
    ).unwrap();

    pub static ref TAX_LABEL: Regex = Regex::new(
        r"(?i)^\s*(?:SALES\s+TAX|TOTAL\s+TAX|TAX\d*|HST|GST|VAT)\b"
    ).unwrap();

    // Boilerplate that never names an item: policy text, payment terminal
    // metadata, card networks, greetings and footers.
    pub static ref SKIP_LINE: Regex = Regex::new(
        r"(?ix)
        \b(?:
            YOU\s+SAVED | RETURNS? | REFUNDS? | POLICY | EXCHANGES? | RECEIPT
          | CUSTOMER\s+COPY | MERCHANT\s+COPY | CASHIER | ITEMS\s+SOLD | STORE\s*\#
          | THANK\s+YOU | THANKS | WELCOME | COME\s+AGAIN | HAVE\s+A\s+(?:NICE|GREAT|GOOD)
          | SURVEY | FEEDBACK
          | VISA | MASTER\s*CARD | AMEX | AMERICAN\s+EXPRESS | DISCOVER | DEBIT | CREDIT | USD
          | APPROVED | APPROVAL | AUTH | AUTHORIZATION | TERMINAL | TERM\s*(?:ID|\#)
          | MERCHANT | REF | REFERENCE | TRANS | TRANSACTION | SEQ | AID | TVR | TSI
          | CHIP | CONTACTLESS | ENTRY\s+METHOD | ACCOUNT | ACCT | CARD | CHANGE
          | PHONE | TEL
        )\b
        | WWW\. | \.COM\b
        | [X*]{4,}\d{2,4}
        "
    ).unwrap();

    // Whitespace runs, for name cleanup
    pub static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    // Characters that survive name cleanup
    pub static ref NAME_DISALLOWED: Regex = Regex::new(r"[^\p{L}\p{N}\s&'\-]").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_line() {
        assert!(PRICE_LINE.is_match("36.97"));
        assert!(PRICE_LINE.is_match("$1,234.56"));
        assert!(PRICE_LINE.is_match("2.99 F"));
        assert!(PRICE_LINE.is_match("0.50-"));
        assert!(!PRICE_LINE.is_match("MILK 2.99"));
        assert!(!PRICE_LINE.is_match("2.9"));
    }

    #[test]
    fn test_item_line_captures() {
        let caps = ITEM_LINE.captures("Item 1 1.99").unwrap();
        assert_eq!(&caps[1], "Item 1");
        assert_eq!(&caps[2], "1.99");

        let caps = ITEM_LINE.captures("BANANAS 0.59 N").unwrap();
        assert_eq!(&caps[1], "BANANAS");
    }

    #[test]
    fn test_quantity_item_line_captures() {
        let caps = QUANTITY_ITEM_LINE.captures("3 @ 0.99 LIMES").unwrap();
        assert_eq!(&caps[1], "3");
        assert_eq!(&caps[2], "0.99");
        assert_eq!(&caps[3], "LIMES");
    }

    #[test]
    fn test_labels() {
        assert!(TOTAL_LABEL.is_match("Total Sale***"));
        assert!(TOTAL_LABEL.is_match("BALANCE DUE 12.00"));
        assert!(!TOTAL_LABEL.is_match("SUBTOTAL 12.00"));
        assert!(SUBTOTAL_LABEL.is_match("Sub-Total 12.00"));
        assert!(TAX_LABEL.is_match("TAX1 0.45"));
        assert!(!TAX_LABEL.is_match("TAXABLE GOODS"));
        assert!(!TAX_LABEL.is_match("NO TAX 0.00"));
    }

    #[test]
    fn test_skip_line() {
        assert!(SKIP_LINE.is_match("VISA CREDIT"));
        assert!(SKIP_LINE.is_match("************1234"));
        assert!(SKIP_LINE.is_match("Thank you for shopping"));
        assert!(SKIP_LINE.is_match("www.kroger.com"));
        assert!(!SKIP_LINE.is_match("REFRIED BEANS 1.29"));
        assert!(!SKIP_LINE.is_match("Kroger"));
    }
}
