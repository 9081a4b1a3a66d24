use crate::feedback::raw::RawScore;

/// Extracts an integer score from an upstream score value.
///
/// Numbers pass through (rounded to the nearest integer, never clamped).
/// Text yields its first run of ASCII digits, so `"30/100"` is 30; text with
/// no digits, and an absent value, are 0. A digit run too long for `i64`
/// saturates to `i64::MAX`.
pub fn extract_score(value: Option<&RawScore>) -> i64 {
    match value {
        Some(RawScore::Integer(n)) => *n,
        Some(RawScore::Number(n)) => round_score(*n),
        Some(RawScore::Text(s)) => first_integer(s).unwrap_or(0),
        None => 0,
    }
}

/// Rounds a derived score to an integer. `as` saturates out-of-range values.
pub(crate) fn round_score(value: f64) -> i64 {
    value.round() as i64
}

fn first_integer(text: &str) -> Option<i64> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let rest = &text[start..];
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    Some(rest[..end].parse::<i64>().unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> RawScore {
        RawScore::Text(s.to_string())
    }

    #[test]
    fn test_number_passes_through() {
        assert_eq!(extract_score(Some(&RawScore::Number(73.0))), 73);
        assert_eq!(extract_score(Some(&RawScore::Number(140.0))), 140);
        assert_eq!(extract_score(Some(&RawScore::Number(-3.0))), -3);
    }

    #[test]
    fn test_integer_is_exact() {
        let big = 9_007_199_254_740_993;
        assert_eq!(extract_score(Some(&RawScore::Integer(big))), big);
    }

    #[test]
    fn test_fractional_number_rounds() {
        assert_eq!(extract_score(Some(&RawScore::Number(72.6))), 73);
    }

    #[test]
    fn test_first_embedded_integer() {
        assert_eq!(extract_score(Some(&text("73/100"))), 73);
        assert_eq!(extract_score(Some(&text("Score: 42 out of 100"))), 42);
        assert_eq!(extract_score(Some(&text("88"))), 88);
    }

    #[test]
    fn test_sign_and_decimals_are_ignored() {
        assert_eq!(extract_score(Some(&text("-5"))), 5);
        assert_eq!(extract_score(Some(&text("7.9/10"))), 7);
    }

    #[test]
    fn test_no_digits_is_zero() {
        assert_eq!(extract_score(Some(&text("n/a"))), 0);
        assert_eq!(extract_score(Some(&text(""))), 0);
    }

    #[test]
    fn test_absent_is_zero() {
        assert_eq!(extract_score(None), 0);
    }

    #[test]
    fn test_oversized_digit_run_saturates() {
        let huge = text("99999999999999999999999/100");
        assert_eq!(extract_score(Some(&huge)), i64::MAX);
    }
}
