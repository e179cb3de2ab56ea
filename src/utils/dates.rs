//! Date unification.
//!
//! Trackers format join dates in several conventions. One shared routine
//! normalizes all known formats to a canonical `NaiveDateTime`; unrecognized
//! input yields `None` (the explicit "unknown" marker), never an error.

use chrono::{NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M:%S"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%d-%b-%Y", "%d.%m.%Y"];

/// Normalize a heterogeneous date string to a canonical timestamp.
pub fn unify_datetime(raw: &str) -> Option<NaiveDateTime> {
    let mut text = raw.trim();
    if text.is_empty() {
        return None;
    }

    // Many sites append a relative age: "2020-01-02 03:04:05 (3 years ago)"
    if let Some(idx) = text.find(" (") {
        text = text[..idx].trim_end();
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Render a unified timestamp in the canonical display format.
pub fn format_datetime(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_datetime() {
        let dt = unify_datetime("2020-01-02 03:04:05").unwrap();
        assert_eq!(format_datetime(&dt), "2020-01-02 03:04:05");
    }

    #[test]
    fn test_day_month_year() {
        let dt = unify_datetime("02-Jan-2020").unwrap();
        assert_eq!(format_datetime(&dt), "2020-01-02 00:00:00");
    }

    #[test]
    fn test_unrecognized_is_unknown() {
        assert_eq!(unify_datetime("???"), None);
        assert_eq!(unify_datetime(""), None);
        assert_eq!(unify_datetime("  "), None);
    }

    #[test]
    fn test_relative_age_suffix_stripped() {
        let dt = unify_datetime("2020-01-02 03:04:05 (3 years ago)").unwrap();
        assert_eq!(format_datetime(&dt), "2020-01-02 03:04:05");
    }

    #[test]
    fn test_slash_date() {
        let dt = unify_datetime("2021/06/15").unwrap();
        assert_eq!(format_datetime(&dt), "2021-06-15 00:00:00");
    }
}
