//! Date extraction for receipt lines.

use chrono::NaiveDate;

use super::patterns::DATE;

/// Check if a line contains a numeric date.
pub fn is_date_line(line: &str) -> bool {
    DATE.is_match(line)
}

/// Extract the first valid date on a line.
///
/// Dates are read month-first (US receipts); when that reading is impossible
/// the day-first reading is tried. Two-digit years map to 20YY.
pub fn extract_date(line: &str) -> Option<NaiveDate> {
    DATE.captures_iter(line).find_map(|caps| {
        let first: u32 = caps[1].parse().ok()?;
        let second: u32 = caps[2].parse().ok()?;
        let year = parse_year(&caps[3])?;

        NaiveDate::from_ymd_opt(year, first, second)
            .or_else(|| NaiveDate::from_ymd_opt(year, second, first))
    })
}

fn parse_year(s: &str) -> Option<i32> {
    let year: i32 = s.parse().ok()?;
    if s.len() == 2 {
        Some(2000 + year)
    } else {
        Some(year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_month_first() {
        assert_eq!(
            extract_date("01/15/2024 10:32 AM"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
    }

    #[test]
    fn test_two_digit_year() {
        assert_eq!(extract_date("3-7-24"), NaiveDate::from_ymd_opt(2024, 3, 7));
    }

    #[test]
    fn test_day_first_fallback() {
        assert_eq!(extract_date("25.12.2023"), NaiveDate::from_ymd_opt(2023, 12, 25));
    }

    #[test]
    fn test_invalid_date() {
        assert!(is_date_line("45/45/2024"));
        assert_eq!(extract_date("45/45/2024"), None);
        assert_eq!(extract_date("TOTAL 5.94"), None);
    }
}
