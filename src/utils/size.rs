//! Locale-formatted byte-size parsing.
//!
//! Trackers render byte counts as "1.5 TB", "3,221,225,472" or "512 MiB".
//! Both `GB` and `GiB` spellings use binary multipliers here, matching
//! tracker display conventions.

use std::sync::OnceLock;

use regex::Regex;

fn size_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)([\d,]+(?:\.\d+)?)\s*([KMGTP])?i?B?").expect("size regex is valid")
    })
}

/// Parse a locale-formatted size string into a byte count.
///
/// Returns `None` for strings with no leading number.
pub fn parse_size_bytes(raw: &str) -> Option<u64> {
    let captures = size_regex().captures(raw.trim())?;
    let number: f64 = captures[1].replace(',', "").parse().ok()?;
    let multiplier: u64 = match captures.get(2).map(|m| m.as_str().to_ascii_uppercase()) {
        None => 1,
        Some(prefix) => match prefix.as_str() {
            "K" => 1 << 10,
            "M" => 1 << 20,
            "G" => 1 << 30,
            "T" => 1u64 << 40,
            "P" => 1u64 << 50,
            _ => 1,
        },
    };
    if number < 0.0 {
        return None;
    }
    Some((number * multiplier as f64).round() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_number() {
        assert_eq!(parse_size_bytes("1000"), Some(1000));
        assert_eq!(parse_size_bytes("3,221,225,472"), Some(3_221_225_472));
    }

    #[test]
    fn test_decimal_units() {
        assert_eq!(parse_size_bytes("1 KB"), Some(1024));
        assert_eq!(parse_size_bytes("1.5 GB"), Some(1_610_612_736));
        assert_eq!(parse_size_bytes("2 TB"), Some(2u64 << 40));
    }

    #[test]
    fn test_iec_units() {
        assert_eq!(parse_size_bytes("512 MiB"), Some(512 << 20));
        assert_eq!(parse_size_bytes("1 PiB"), Some(1u64 << 50));
    }

    #[test]
    fn test_bare_bytes_suffix() {
        assert_eq!(parse_size_bytes("123 B"), Some(123));
    }

    #[test]
    fn test_garbage() {
        assert_eq!(parse_size_bytes("unknown"), None);
        assert_eq!(parse_size_bytes(""), None);
    }
}
