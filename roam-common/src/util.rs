//! Utility functions for Roam services.

/// Truncate a string to at most `max_chars` characters, appending "..." if truncated.
///
/// This function safely handles multi-byte UTF-8 characters (emoji, CJK, accented characters)
/// by using character boundaries instead of byte indices.
pub fn truncate_with_ellipsis(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => {
            let truncated = &s[..idx];
            format!("{}...", truncated.trim_end())
        }
        None => s.to_string(),
    }
}

/// Title-case a string for display.
///
/// The first letter of every alphabetic run is upper-cased and the rest of the
/// run lower-cased, so `"new york"` becomes `"New York"` and `"o'hare"` becomes
/// `"O'Hare"`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }

    out
}

/// Round to a fixed number of decimal places.
///
/// Rounds the exact decimal value of `value` with ties going to the even
/// digit, so `round_to(0.125, 2)` is `0.12` and `round_to(2.675, 2)` is
/// `2.67` (the nearest double sits just below the tie).
pub fn round_to(value: f64, decimals: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{:.*}", decimals as usize, value)
        .parse()
        .unwrap_or(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_truncate_with_ellipsis() {
        assert_eq!(truncate_with_ellipsis("hello", 10), "hello");
        assert_eq!(truncate_with_ellipsis("hello world", 5), "hello...");
        assert_eq!(truncate_with_ellipsis("😀😀😀😀", 2), "😀😀...");
        assert_eq!(truncate_with_ellipsis("", 10), "");
    }

    #[test_case("lakeview", "Lakeview")]
    #[test_case("new york", "New York")]
    #[test_case("SAN FRANCISCO", "San Francisco")]
    #[test_case("o'hare", "O'Hare")]
    #[test_case("st.-tropez", "St.-Tropez")]
    #[test_case("district 9b", "District 9B")]
    #[test_case("", "")]
    fn test_title_case(input: &str, expected: &str) {
        assert_eq!(title_case(input), expected);
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.456, 2), 0.46);
        assert_eq!(round_to(2.84, 1), 2.8);
        assert_eq!(round_to(3.0, 1), 3.0);
        assert_eq!(round_to(1.5, 0), 2.0);
    }

    #[test_case(0.125, 2, 0.12 ; "tie rounds down to even")]
    #[test_case(0.375, 2, 0.38 ; "tie rounds up to even")]
    #[test_case(2.675, 2, 2.67 ; "binary value below the tie")]
    #[test_case(1.25, 1, 1.2 ; "rating tie")]
    #[test_case(0.5, 0, 0.0 ; "half to zero")]
    fn test_round_to_half_even(value: f64, decimals: u32, expected: f64) {
        assert_eq!(round_to(value, decimals), expected);
    }
}
