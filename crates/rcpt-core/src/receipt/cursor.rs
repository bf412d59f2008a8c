//! Cursor and window helpers for the single-pass receipt scan.
//!
//! Lookahead and lookback are pure functions of `(lines, index, window)` that
//! return the match together with its offset from `index`; the cursor is the
//! only thing that moves.

use std::collections::BTreeSet;

use rust_decimal::Decimal;

use super::rules::{
    extract_price, is_date_line, is_noise, is_price_line, is_subtotal_label, is_tax_label,
    is_total_label, should_skip_line,
};

/// Forward cursor over an immutable slice of lines.
#[derive(Debug)]
pub struct LineCursor<'a> {
    lines: &'a [&'a str],
    next: usize,
    claimed: BTreeSet<usize>,
}

impl<'a> LineCursor<'a> {
    pub fn new(lines: &'a [&'a str]) -> Self {
        Self {
            lines,
            next: 0,
            claimed: BTreeSet::new(),
        }
    }

    /// Skip the next `count` lines (they were consumed by a lookahead).
    pub fn consume(&mut self, count: usize) {
        self.next = (self.next + count).min(self.lines.len());
    }

    /// Mark a line ahead as used, so the cursor passes over it without
    /// consuming anything in between.
    pub fn claim(&mut self, index: usize) {
        self.claimed.insert(index);
    }
}

impl<'a> Iterator for LineCursor<'a> {
    type Item = (usize, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        while self.next < self.lines.len() {
            let index = self.next;
            self.next += 1;
            if !self.claimed.contains(&index) {
                return Some((index, self.lines[index]));
            }
        }
        None
    }
}

/// Find the first bare price line within `window` lines after `index`.
///
/// Returns the price and its offset from `index`.
pub fn price_ahead(lines: &[&str], index: usize, window: usize) -> Option<(Decimal, usize)> {
    (1..=window).find_map(|offset| {
        let line = lines.get(index + offset)?;
        if !is_price_line(line) {
            return None;
        }
        extract_price(line).map(|price| (price, offset))
    })
}

/// Find the nearest line within `window` lines before `index` that can serve
/// as an item name, skipping `exclude`.
///
/// Returns the offset back from `index`.
pub fn name_behind(
    lines: &[&str],
    index: usize,
    window: usize,
    exclude: Option<usize>,
) -> Option<usize> {
    (1..=window)
        .take_while(|&offset| offset <= index)
        .find(|&offset| {
            let candidate = index - offset;
            Some(candidate) != exclude && is_name_candidate(lines[candidate])
        })
}

/// Check if a line could be the name of an item whose price sits elsewhere.
///
/// Name lines carry no price of their own and are not labels, dates,
/// boilerplate or noise.
pub fn is_name_candidate(line: &str) -> bool {
    !should_skip_line(line)
        && !is_noise(line)
        && !is_price_line(line)
        && extract_price(line).is_none()
        && !is_total_label(line)
        && !is_subtotal_label(line)
        && !is_tax_label(line)
        && !is_date_line(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cursor_consume_and_claim() {
        let lines = ["a", "b", "c", "d", "e"];
        let mut cursor = LineCursor::new(&lines);

        assert_eq!(cursor.next(), Some((0, "a")));
        cursor.consume(1);
        cursor.claim(3);
        assert_eq!(cursor.next(), Some((2, "c")));
        assert_eq!(cursor.next(), Some((4, "e")));
        assert_eq!(cursor.next(), None);
    }

    #[test]
    fn test_consume_past_end() {
        let lines = ["a"];
        let mut cursor = LineCursor::new(&lines);
        cursor.consume(5);
        assert_eq!(cursor.next(), None);
    }

    #[test]
    fn test_price_ahead_tolerates_noise_line() {
        let lines = ["TAX", "************1234", "0.04"];

        assert_eq!(price_ahead(&lines, 0, 2), Some((Decimal::new(4, 2), 2)));
        assert_eq!(price_ahead(&lines, 0, 1), None);
    }

    #[test]
    fn test_price_ahead_at_end_of_input() {
        let lines = ["TOTAL"];
        assert_eq!(price_ahead(&lines, 0, 1), None);
    }

    #[test]
    fn test_name_behind() {
        let lines = ["GREAT VALUE MILK", "SC", "3.48"];

        assert_eq!(name_behind(&lines, 2, 3, None), Some(2));
        assert_eq!(name_behind(&lines, 2, 3, Some(0)), None);
        assert_eq!(name_behind(&lines, 2, 1, None), None);
    }

    #[test]
    fn test_name_candidates() {
        assert!(is_name_candidate("ORGANIC BANANAS"));
        assert!(!is_name_candidate("MILK 2.99"));
        assert!(!is_name_candidate("SUBTOTAL"));
        assert!(!is_name_candidate("01/15/2024 10:32 AM"));
        assert!(!is_name_candidate("YOUR SAVINGS"));
    }
}
