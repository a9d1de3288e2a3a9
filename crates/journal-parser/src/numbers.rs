//! Deterministic, locale-free numeric normalization.
//!
//! Journals mix `1,234.56`, `1.234,56`, `1 234,56`, and `1234.56` freely.
//! Normalization decides which separator is the decimal mark from the
//! string alone, with no locale input, so the same file parses identically
//! everywhere.

use crate::error::ParseError;
use journal_position::Position;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Normalize a raw quantity string to `[-]digits[.digits][e[+-]digits]`.
///
/// Rules, applied to the cleaned digit/`.`/`,` string:
///
/// 1. Neither `.` nor `,` present: integer, unchanged.
/// 2. One `.`: thousands separator when followed by exactly three digits
///    with a non-zero digit somewhere before it; decimal point otherwise.
/// 3. One `,`: the same rule; a decimal comma becomes `.`.
/// 4. Only dots, several of them: all grouping, stripped.
/// 5. Only commas, several of them: all grouping, stripped.
/// 6. Both present: the separator whose last occurrence is rightmost is the
///    decimal mark, the other is stripped.
///
/// Spaces inside the number are always grouping. The function is
/// idempotent: normalizing a normalized string changes nothing.
pub fn normalize_number(raw: &str) -> String {
    let cleaned: String = raw.chars().filter(|c| *c != ' ' && *c != '\u{a0}').collect();

    // Scientific notation: normalize the mantissa, keep the exponent as-is.
    if let Some(split) = cleaned.find(['e', 'E']) {
        let (mantissa, exponent) = cleaned.split_at(split);
        return format!("{}{}", normalize_mantissa(mantissa), exponent);
    }
    normalize_mantissa(&cleaned)
}

fn normalize_mantissa(s: &str) -> String {
    let (sign, digits) = match s.strip_prefix(['+', '-']) {
        Some(rest) => (&s[..1], rest),
        None => ("", s),
    };

    let dots = digits.matches('.').count();
    let commas = digits.matches(',').count();

    let normalized = match (dots, commas) {
        (0, 0) => digits.to_string(),
        (1, 0) => {
            if is_grouping(digits, '.') {
                digits.replace('.', "")
            } else {
                digits.to_string()
            }
        }
        (0, 1) => {
            if is_grouping(digits, ',') {
                digits.replace(',', "")
            } else {
                digits.replace(',', ".")
            }
        }
        (_, 0) => digits.replace('.', ""),
        (0, _) => digits.replace(',', ""),
        (_, _) => {
            let last_dot = digits.rfind('.').unwrap_or(0);
            let last_comma = digits.rfind(',').unwrap_or(0);
            if last_dot > last_comma {
                digits.replace(',', "")
            } else {
                digits.replace('.', "").replace(',', ".")
            }
        }
    };
    format!("{sign}{normalized}")
}

/// A single separator reads as a thousands separator when exactly three
/// digits follow it and a non-zero digit precedes it.
fn is_grouping(digits: &str, sep: char) -> bool {
    let Some(idx) = digits.find(sep) else { return false };
    let (before, after) = (&digits[..idx], &digits[idx + 1..]);
    after.len() == 3
        && after.bytes().all(|b| b.is_ascii_digit())
        && before.bytes().any(|b| (b'1'..=b'9').contains(&b))
}

/// Parse a raw quantity into an exact decimal.
pub fn parse_quantity(raw: &str, position: Position) -> Result<Decimal, ParseError> {
    let normalized = normalize_number(raw);
    let unsigned = normalized.strip_prefix('+').unwrap_or(&normalized);
    let result = if unsigned.contains(['e', 'E']) {
        Decimal::from_scientific(unsigned)
    } else {
        Decimal::from_str(unsigned)
    };
    result.map_err(|_| ParseError::InvalidNumber { text: raw.to_string(), position })
}
