//! Cell-level parsing shared by the loaders.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parses a timestamp cell.
///
/// Offsets are converted to UTC and dropped; a bare date maps to midnight.
/// Returns `None` if no accepted form matches.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(t) = s.parse::<NaiveDateTime>() {
        return Some(t);
    }
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.naive_utc());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(t) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(t);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parses a numeric cell. Blank and `NaN` cells are a missing reading.
pub fn parse_reading(raw: &str) -> Result<Option<f64>, String> {
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    s.parse::<f64>()
        .map(Some)
        .map_err(|_| format!("'{s}' is not a number"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, sec: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, sec)
            .unwrap()
    }

    #[test]
    fn test_parse_iso_forms() {
        assert_eq!(parse_timestamp("2025-05-26T09:30:00"), Some(at(2025, 5, 26, 9, 30, 0)));
        assert_eq!(parse_timestamp("2025-05-26 09:30:00"), Some(at(2025, 5, 26, 9, 30, 0)));
        assert_eq!(parse_timestamp("2025-05-26 09:30"), Some(at(2025, 5, 26, 9, 30, 0)));
        assert_eq!(parse_timestamp("2025/05/26 09:30"), Some(at(2025, 5, 26, 9, 30, 0)));
    }

    #[test]
    fn test_parse_rfc3339_converts_to_utc() {
        assert_eq!(
            parse_timestamp("2025-05-26T18:30:00+09:00"),
            Some(at(2025, 5, 26, 9, 30, 0))
        );
    }

    #[test]
    fn test_parse_bare_date_is_midnight() {
        assert_eq!(parse_timestamp("2025-05-26"), Some(at(2025, 5, 26, 0, 0, 0)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("2025-13-40 10:00"), None);
    }

    #[test]
    fn test_parse_reading() {
        assert_eq!(parse_reading(" 1.25 "), Ok(Some(1.25)));
        assert_eq!(parse_reading(""), Ok(None));
        assert_eq!(parse_reading("NaN"), Ok(None));
        assert!(parse_reading("high").is_err());
    }
}
