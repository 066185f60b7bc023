// ABOUTME: Count normalization for engagement numbers shown as "1.2K", "5M", or "12,345".
// ABOUTME: Converts any abbreviated or separated count into a canonical non-negative integer string.

//! Engagement count normalization.
//!
//! Counters on video pages are rendered in several shapes: plain integers,
//! comma-separated thousands, and decimals with a magnitude suffix. Everything
//! is reduced to a canonical integer string. Unparseable input degrades to
//! `"0"` instead of failing.

/// Returns the multiplier for a magnitude suffix (case-insensitive).
fn suffix_multiplier(c: char) -> Option<u64> {
    match c.to_ascii_uppercase() {
        'K' => Some(1_000),
        'M' => Some(1_000_000),
        'B' => Some(1_000_000_000),
        _ => None,
    }
}

/// Parses a count with exact integer arithmetic, truncating any fractional remainder.
///
/// Returns `None` for empty, negative, malformed, or overflowing input.
fn parse_canonical(raw: &str) -> Option<u64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    let last = cleaned.chars().last()?;

    let (number, multiplier) = match suffix_multiplier(last) {
        // Suffixes are ASCII so dropping one byte keeps the slice on a char boundary.
        Some(m) => (&cleaned[..cleaned.len() - 1], m),
        None => (cleaned.as_str(), 1),
    };

    let (whole, frac) = number.split_once('.').unwrap_or((number, ""));
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let whole_value: u64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut total = whole_value.checked_mul(multiplier)?;

    let mut scale = multiplier;
    for digit in frac.chars() {
        scale /= 10;
        if scale == 0 {
            break;
        }
        total = total.checked_add(u64::from(digit.to_digit(10)?) * scale)?;
    }

    Some(total)
}

/// Parses a count into a number, returning 0 when the input is unparseable.
pub fn parse_count(raw: &str) -> u64 {
    parse_canonical(raw).unwrap_or(0)
}

/// Normalizes a count string into its canonical integer form.
///
/// `"1.2K"` becomes `"1200"`, `"5M"` becomes `"5000000"`, `"12,345"` becomes
/// `"12345"`. Empty or unparseable input becomes `"0"`.
pub fn normalize_count(raw: &str) -> String {
    parse_count(raw).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffixes() {
        assert_eq!(normalize_count("1.2K"), "1200");
        assert_eq!(normalize_count("5M"), "5000000");
        assert_eq!(normalize_count("2B"), "2000000000");
        assert_eq!(normalize_count("3.5k"), "3500");
        assert_eq!(normalize_count("1.25m"), "1250000");
    }

    #[test]
    fn test_plain_integers() {
        assert_eq!(normalize_count("42"), "42");
        assert_eq!(normalize_count("0"), "0");
        assert_eq!(normalize_count("007"), "7");
    }

    #[test]
    fn test_separators_and_whitespace() {
        assert_eq!(normalize_count("12,345"), "12345");
        assert_eq!(normalize_count(" 1,234,567 "), "1234567");
        assert_eq!(normalize_count("1.5\u{a0}K"), "1500");
    }

    #[test]
    fn test_fraction_is_truncated() {
        assert_eq!(normalize_count("12.7"), "12");
        assert_eq!(normalize_count("1.2345K"), "1234");
        assert_eq!(normalize_count(".5K"), "500");
    }

    #[test]
    fn test_unparseable_degrades_to_zero() {
        assert_eq!(normalize_count(""), "0");
        assert_eq!(normalize_count("   "), "0");
        assert_eq!(normalize_count("K"), "0");
        assert_eq!(normalize_count("abc"), "0");
        assert_eq!(normalize_count("-5"), "0");
        assert_eq!(normalize_count("1.2.3"), "0");
        assert_eq!(normalize_count("99999999999999999999"), "0");
    }

    #[test]
    fn test_parse_count_matches_normalized_value() {
        assert_eq!(parse_count("1.2K"), 1200);
        assert_eq!(parse_count("nope"), 0);
    }
}
