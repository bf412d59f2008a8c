//! Rule-based receipt parser.

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::config::ExtractionConfig;
use crate::models::receipt::{ExtractionResult, ExtractionSource, LineItem};

use super::confidence;
use super::cursor::{LineCursor, is_name_candidate, name_behind, price_ahead};
use super::rules::{
    clean_name, extract_date, extract_price, is_noise, is_price_line, is_rejected_name,
    is_savings_line, is_subtotal_label, is_tax_label, is_total_label, is_transaction_hash,
    parse_price,
    patterns::{ITEM_LINE, QUANTITY_ITEM_LINE},
    should_skip_line,
};
use super::ReceiptExtractor;

/// Outcome of matching one line against the item shapes.
#[derive(Debug, Clone, PartialEq)]
enum ItemMatch {
    /// A named, priced item.
    Item(LineItem),
    /// A price whose name is missing or unusable on this line.
    PriceOnly(Decimal),
    /// Not an item line.
    None,
}

/// Running totals carried through the scan.
#[derive(Debug, Default)]
struct ScanState {
    items: Vec<LineItem>,
    subtotal: Option<Decimal>,
    tax: Option<Decimal>,
    total: Option<Decimal>,
    /// Line that supplied the previous item's name.
    last_name_line: Option<usize>,
}

impl ScanState {
    /// Keep the largest labelled total seen so far.
    fn offer_total(&mut self, price: Decimal) {
        self.total = Some(self.total.map_or(price, |current| current.max(price)));
    }

    fn push_item(&mut self, item: LineItem, name_line: usize) {
        debug!("Item {:?} at {} (name from line {})", item.name, item.price, name_line);
        self.items.push(item);
        self.last_name_line = Some(name_line);
    }
}

/// Deterministic single-pass receipt parser.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedParser {
    config: ExtractionConfig,
}

impl RuleBasedParser {
    /// Create a parser with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a parser with explicit settings.
    pub fn with_config(config: ExtractionConfig) -> Self {
        Self { config }
    }

    /// Parse stitched receipt text.
    pub fn parse(&self, text: &str) -> ExtractionResult {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();

        if lines.is_empty() {
            return ExtractionResult::empty(text);
        }

        let store_name = self.extract_store_name(&lines);
        let date = lines.iter().find_map(|line| extract_date(line));
        let state = self.scan(&lines);

        let mut result = ExtractionResult {
            items: state.items,
            store_name,
            date,
            subtotal: state.subtotal,
            tax: state.tax,
            total: state.total,
            raw_text: text.to_string(),
            confidence: 0.0,
            source: ExtractionSource::Rules,
        };
        result.confidence = confidence::score(&result);

        debug!(
            "Rule-based parse: {} items, total {:?}, confidence {:.2}",
            result.items.len(),
            result.total,
            result.confidence
        );

        result
    }

    fn extract_store_name(&self, lines: &[&str]) -> Option<String> {
        lines
            .iter()
            .take(self.config.store_name_window)
            .filter(|l| l.chars().count() >= self.config.min_store_name_len)
            .filter(|l| !l.starts_with(|c: char| c.is_ascii_digit()))
            .filter(|l| !should_skip_line(l))
            .map(|l| clean_name(l))
            .find(|name| !name.is_empty())
    }

    fn scan(&self, lines: &[&str]) -> ScanState {
        let mut state = ScanState::default();
        let mut cursor = LineCursor::new(lines);

        while let Some((index, line)) = cursor.next() {
            if should_skip_line(line) {
                continue;
            }

            if is_subtotal_label(line) {
                if let Some(price) = extract_price(line) {
                    state.subtotal = Some(price);
                } else if let Some((price, offset)) = price_ahead(lines, index, 1) {
                    state.subtotal = Some(price);
                    cursor.consume(offset);
                }
                continue;
            }

            if is_total_label(line) {
                if let Some(price) = extract_price(line) {
                    state.offer_total(price);
                } else if let Some((price, offset)) = price_ahead(lines, index, 1) {
                    debug!("Total {} found on the line after {:?}", price, line);
                    state.offer_total(price);
                    cursor.consume(offset);
                }
                continue;
            }

            if is_tax_label(line) {
                if let Some(price) = extract_price(line) {
                    state.tax = Some(price);
                } else if let Some((price, offset)) =
                    price_ahead(lines, index, self.config.tax_lookahead)
                {
                    debug!("Tax {} found {} lines after label", price, offset);
                    state.tax = Some(price);
                    cursor.claim(index + offset);
                }
                continue;
            }

            match match_item(line) {
                ItemMatch::Item(item) => self.accept_item(lines, index, item, &mut state),
                ItemMatch::PriceOnly(price) => self.attribute_orphan(lines, index, price, &mut state),
                ItemMatch::None => {}
            }
        }

        state
    }

    /// Push a parsed item, borrowing the previous line's name when the
    /// printed one is a terse code split off from its real name.
    fn accept_item(&self, lines: &[&str], index: usize, mut item: LineItem, state: &mut ScanState) {
        let mut name_line = index;

        if item.name.chars().count() <= self.config.short_name_max_len && index > 0 {
            let previous = index - 1;
            let borrowed = clean_name(lines[previous]);
            if state.last_name_line != Some(previous)
                && is_name_candidate(lines[previous])
                && !borrowed.is_empty()
                && !is_rejected_name(&borrowed)
            {
                debug!("Replacing short name {:?} with {:?}", item.name, borrowed);
                item.name = borrowed;
                name_line = previous;
            }
        }

        state.push_item(item, name_line);
    }

    /// Find a name for a price printed on its own.
    fn attribute_orphan(&self, lines: &[&str], index: usize, price: Decimal, state: &mut ScanState) {
        if index > 0 && is_savings_line(lines[index - 1]) {
            debug!("Discarding {} after savings line", price);
            return;
        }

        let Some(offset) = name_behind(lines, index, self.config.name_lookback, state.last_name_line)
        else {
            debug!("No name found for orphaned price {}", price);
            return;
        };

        let name_line = index - offset;
        let name = clean_name(lines[name_line]);
        if name.is_empty() || is_rejected_name(lines[name_line]) || is_rejected_name(&name) {
            debug!("Rejected name candidate {:?} for {}", lines[name_line], price);
            return;
        }

        state.push_item(LineItem::new(name, price), name_line);
    }
}

impl ReceiptExtractor for RuleBasedParser {
    fn extract(&self, text: &str) -> ExtractionResult {
        self.parse(text)
    }
}

/// Match a single line against the item shapes.
fn match_item(line: &str) -> ItemMatch {
    if let Some(caps) = QUANTITY_ITEM_LINE.captures(line) {
        let quantity = caps[1].parse::<u32>().ok();
        let price = parse_price(&caps[2]);
        let name = clean_name(&caps[3]);
        if let (Some(quantity), Some(price)) = (quantity, price) {
            if !is_noise(&name) && !is_transaction_hash(&name) {
                return ItemMatch::Item(LineItem::new(name, price).with_quantity(quantity));
            }
        }
    }

    if is_price_line(line) {
        return extract_price(line).map_or(ItemMatch::None, ItemMatch::PriceOnly);
    }

    let Some(caps) = ITEM_LINE.captures(line) else {
        return ItemMatch::None;
    };
    let Some(price) = parse_price(&caps[2]) else {
        return ItemMatch::None;
    };

    let name = clean_name(&caps[1]);
    if name.is_empty() || is_noise(&name) {
        ItemMatch::PriceOnly(price)
    } else if is_transaction_hash(&name) {
        ItemMatch::None
    } else {
        ItemMatch::Item(LineItem::new(name, price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn parse(lines: &[&str]) -> ExtractionResult {
        RuleBasedParser::new().parse(&lines.join("\n"))
    }

    fn money(cents: i64) -> Decimal {
        Decimal::new(cents, 2)
    }

    #[test]
    fn test_empty_text() {
        for text in ["", "\n\n  \n"] {
            let result = RuleBasedParser::new().parse(text);
            assert!(result.items.is_empty());
            assert_eq!(result.total, None);
            assert_eq!(result.store_name, None);
            assert_eq!(result.confidence, 0.0);
            assert_eq!(result.raw_text, text);
        }
    }

    #[test]
    fn test_basic_receipt() {
        let result = parse(&["Kroger", "Item 1 1.99", "Item 2 3.50", "Tax 0.45", "Total 5.94"]);

        assert_eq!(result.store_name.as_deref(), Some("KROGER"));
        assert_eq!(
            result.items,
            vec![
                LineItem::new("ITEM 1", money(199)),
                LineItem::new("ITEM 2", money(350)),
            ]
        );
        assert_eq!(result.tax, Some(money(45)));
        assert_eq!(result.total, Some(money(594)));
        assert_eq!(result.subtotal, None);
        assert_eq!(result.date, None);
        // Total, store and items present; no date.
        assert_eq!(result.confidence, 0.7);
    }

    #[test]
    fn test_basic_receipt_with_date() {
        let result = parse(&[
            "Kroger",
            "01/15/2024 10:32 AM",
            "Item 1 1.99",
            "Item 2 3.50",
            "Tax 0.45",
            "Total 5.94",
        ]);

        assert_eq!(result.date, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(result.items.len(), 2);
        assert!(result.confidence > 0.8);
    }

    #[test]
    fn test_raw_text_is_verbatim() {
        let text = "  Kroger\n\nTotal 5.94  ";
        assert_eq!(RuleBasedParser::new().parse(text).raw_text, text);
    }

    #[test]
    fn test_total_on_following_line() {
        let result = parse(&[
            "KROGER",
            "WHOLE MILK 2.99",
            "Total Sale***",
            "36.97",
            "DEBIT",
            "USD$ 36.97",
            "CHANGE DUE 0.00",
        ]);

        assert_eq!(result.total, Some(money(3697)));
        assert_eq!(result.items, vec![LineItem::new("WHOLE MILK", money(299))]);
        assert!(
            result
                .items
                .iter()
                .all(|i| !i.name.contains("USD") && !i.name.contains("DEBIT"))
        );
    }

    #[test]
    fn test_total_keeps_maximum() {
        let result = parse(&[
            "STORE",
            "TOTAL 10.50",
            "BREAD 2.00",
            "BALANCE DUE 12.75",
            "TOTAL 11.00",
        ]);

        assert_eq!(result.total, Some(money(1275)));
    }

    #[test]
    fn test_tax_lookahead_skips_masked_card() {
        let result = parse(&["STORE", "APPLES 3.96", "TAX", "************1234", "0.04", "TOTAL 4.00"]);

        assert_eq!(result.tax, Some(money(4)));
        assert_eq!(result.total, Some(money(400)));
        // The tax amount is not re-read as an item price.
        assert_eq!(result.items, vec![LineItem::new("APPLES", money(396))]);
    }

    #[test]
    fn test_tax_lookahead_window() {
        let parser = RuleBasedParser::with_config(ExtractionConfig {
            tax_lookahead: 1,
            ..ExtractionConfig::default()
        });
        let result = parser.parse("STORE\nTAX\n************1234\n0.04");

        assert_eq!(result.tax, None);
    }

    #[test]
    fn test_savings_price_is_discarded() {
        let result = parse(&[
            "KROGER",
            "GROUND BEEF 8.99",
            "KROGER SAVINGS",
            "2.00",
            "Total 6.99",
        ]);

        assert_eq!(result.items, vec![LineItem::new("GROUND BEEF", money(899))]);
        assert!(result.items.iter().all(|i| !i.name.contains("SAVINGS")));
    }

    #[test]
    fn test_savings_with_price_is_not_an_item() {
        let result = parse(&["KROGER", "YOUR SAVINGS 3.00", "EGGS LARGE 3.49"]);

        assert_eq!(result.items, vec![LineItem::new("EGGS LARGE", money(349))]);
    }

    #[test]
    fn test_orphan_price_takes_name_from_previous_line() {
        let result = parse(&["WALMART", "GREAT VALUE MILK", "PC 3.48 N", "Total 3.48"]);

        assert_eq!(result.items, vec![LineItem::new("GREAT VALUE MILK", money(348))]);
    }

    #[test]
    fn test_bare_price_looks_back_past_noise() {
        let result = parse(&["SAFEWAY", "ORGANIC SPINACH", "SC", "4.99"]);

        assert_eq!(result.items, vec![LineItem::new("ORGANIC SPINACH", money(499))]);
    }

    #[test]
    fn test_name_line_is_not_reused() {
        let result = parse(&["SAFEWAY", "VISA", "ORGANIC SPINACH", "4.99", "1.25"]);

        assert_eq!(result.items, vec![LineItem::new("ORGANIC SPINACH", money(499))]);
    }

    #[test]
    fn test_short_name_is_repaired() {
        let result = parse(&["STORE", "ORGANIC BANANAS", "BNNA 1.29"]);

        assert_eq!(result.items, vec![LineItem::new("ORGANIC BANANAS", money(129))]);
    }

    #[test]
    fn test_short_name_kept_when_previous_has_price() {
        let result = parse(&["STORE", "BREAD 2.50", "MILK 2.99"]);

        assert_eq!(
            result.items,
            vec![
                LineItem::new("BREAD", money(250)),
                LineItem::new("MILK", money(299)),
            ]
        );
    }

    #[test]
    fn test_transaction_hash_never_becomes_item() {
        let result = parse(&["STORE", "4AC8A26D631B1AE5", "12.00", "4AC8A26D631B1AE5 7.50"]);

        assert!(result.items.is_empty());
    }

    #[test]
    fn test_numeric_and_tc_names_rejected() {
        let result = parse(&["STORE", "TC 00112233", "9.99"]);
        assert!(result.items.is_empty());
    }

    #[test]
    fn test_printed_names_only_drop_hashes() {
        let result = parse(&["STORE", "WHOLE MILK 2.99", "TCBY YOGURT 3.99", "2 @ 1.25 TCBY CUPS"]);

        assert_eq!(
            result.items,
            vec![
                LineItem::new("WHOLE MILK", money(299)),
                LineItem::new("TCBY YOGURT", money(399)),
                LineItem::new("TCBY CUPS", money(125)).with_quantity(2),
            ]
        );
    }

    #[test]
    fn test_quantity_line() {
        let result = parse(&["STORE", "3 @ 0.99 LIMES"]);

        assert_eq!(
            result.items,
            vec![LineItem::new("LIMES", money(99)).with_quantity(3)]
        );
    }

    #[test]
    fn test_subtotal_only_when_labelled() {
        let result = parse(&["STORE", "WHOLE MILK 2.99", "BREAD 1.50", "TOTAL 4.85"]);
        assert_eq!(result.subtotal, None);

        let result = parse(&["STORE", "WHOLE MILK 2.99", "SUBTOTAL", "2.99", "TOTAL 3.20"]);
        assert_eq!(result.subtotal, Some(money(299)));
        assert_eq!(result.total, Some(money(320)));
        assert_eq!(result.items.len(), 1);
    }

    #[test]
    fn test_store_name_rules() {
        let result = parse(&["12 MAIN ST", "VISA", "ab", "Trader Joe's #552", "MILK 2.99"]);
        assert_eq!(result.store_name.as_deref(), Some("TRADER JOE'S 552"));

        let result = parse(&["1", "2", "3", "4", "5", "LATE HEADER"]);
        assert_eq!(result.store_name, None);
    }

    #[test]
    fn test_extractor_trait() {
        let extractor: &dyn ReceiptExtractor = &RuleBasedParser::new();
        assert_eq!(extractor.extract("Total 1.00").total, Some(money(100)));
    }
}
