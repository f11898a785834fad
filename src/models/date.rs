//! Calendar date parsing shared by the import pipeline, stored transactions
//! and custom report ranges.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Formats tried after the numeric shapes, in order.
const FALLBACK_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%b %d %Y",
    "%B %d %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%d-%b-%Y",
];

/// Parse a date token from a CSV cell, a stored record or the command line.
///
/// Recognized shapes, tried in order:
/// - `YYYY-M-D` (ISO, zero padding optional)
/// - `M/D/YYYY` and `M/D/YY` (two-digit years land in 20YY)
/// - `M-D-YYYY` and `M-D-YY`
/// - a handful of spelled-out forms (`Jan 5, 2024`, `5 Jan 2024`, `2024/01/05`)
/// - RFC 3339 timestamps and `YYYY-MM-DDTHH:MM:SS`, truncated to the day
///
/// Returns `None` for anything else, including impossible calendar dates.
pub fn parse_date_token(token: &str) -> Option<NaiveDate> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    if let Some(date) = parse_numeric(token) {
        return Some(date);
    }

    for format in FALLBACK_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(token, format) {
            return Some(date);
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(token) {
        return Some(ts.date_naive());
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(token, "%Y-%m-%dT%H:%M:%S") {
        return Some(ts.date());
    }

    None
}

/// Numeric `Y-M-D`, `M/D/Y` and `M-D-Y` shapes.
fn parse_numeric(token: &str) -> Option<NaiveDate> {
    let separator = if token.contains('/') { '/' } else { '-' };
    let parts: Vec<&str> = token.split(separator).collect();
    if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    if !parts.iter().all(|p| p.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }

    let numbers: Vec<u32> = parts
        .iter()
        .map(|p| p.parse::<u32>().ok())
        .collect::<Option<Vec<_>>>()?;

    if separator == '-' && parts[0].len() == 4 {
        return NaiveDate::from_ymd_opt(numbers[0] as i32, numbers[1], numbers[2]);
    }

    let year = match parts[2].len() {
        2 => 2000 + numbers[2] as i32,
        4 => numbers[2] as i32,
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, numbers[0], numbers[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_iso_dates() {
        assert_eq!(parse_date_token("2024-03-05"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date_token("2024-3-5"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date_token(" 2024-12-31 "), Some(ymd(2024, 12, 31)));
    }

    #[test]
    fn test_us_slash_dates() {
        assert_eq!(parse_date_token("3/5/2024"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date_token("03/05/2024"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date_token("3/5/24"), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn test_us_dash_dates() {
        assert_eq!(parse_date_token("03-05-2024"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date_token("3-5-24"), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn test_fallback_formats() {
        assert_eq!(parse_date_token("Jan 5, 2024"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date_token("5 January 2024"), Some(ymd(2024, 1, 5)));
        assert_eq!(parse_date_token("2024/01/05"), Some(ymd(2024, 1, 5)));
        assert_eq!(
            parse_date_token("2024-01-05T10:30:00Z"),
            Some(ymd(2024, 1, 5))
        );
    }

    #[test]
    fn test_invalid_dates() {
        assert_eq!(parse_date_token(""), None);
        assert_eq!(parse_date_token("not a date"), None);
        assert_eq!(parse_date_token("2024-02-30"), None);
        assert_eq!(parse_date_token("13/01/2024"), None);
        assert_eq!(parse_date_token("1/2/345"), None);
    }

    #[test]
    fn test_every_numeric_format_round_trips() {
        let dates = [
            ymd(2000, 1, 1),
            ymd(2023, 11, 9),
            ymd(2023, 12, 31),
            ymd(2024, 1, 1),
            ymd(2024, 2, 29),
            ymd(2024, 3, 1),
            ymd(2099, 12, 31),
        ];
        let formats = [
            "%Y-%m-%d",
            "%Y-%-m-%-d",
            "%m/%d/%Y",
            "%-m/%-d/%Y",
            "%m/%d/%y",
            "%m-%d-%Y",
            "%m-%d-%y",
        ];

        for date in dates {
            for format in formats {
                let text = date.format(format).to_string();
                assert_eq!(parse_date_token(&text), Some(date), "{} via {}", text, format);
            }
        }
    }
}
