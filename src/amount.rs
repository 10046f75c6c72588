//! Conversion between user-typed decimal strings and integer base units.
//!
//! Every arithmetic step goes through `BigDecimal`; floating point is never
//! used on amounts.

use crate::errors::{AppError, Result};
use bigdecimal::BigDecimal;
use num_bigint::{BigInt, BigUint};
use num_traits::Signed;
use std::str::FromStr;

/// Maximum number of digits (integer + fractional) an amount may carry.
pub const MAX_TOTAL_DIGITS: usize = 12;
/// Hard cap on fractional digits regardless of token precision.
pub const MAX_FRACTION_DIGITS: u32 = 9;

/// Canonicalize a raw amount string while the user is typing.
///
/// The result keeps a trailing `.` if one was typed so editing is not
/// disrupted mid-keystroke.
pub fn normalize_decimal_input(raw: &str, precision: u32) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c == ',' { '.' } else { c })
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let Some(dot) = cleaned.find('.') else {
        let int_part = strip_leading_zeros(&cleaned);
        return int_part.chars().take(MAX_TOTAL_DIGITS).collect();
    };

    let mut int_part = strip_leading_zeros(&cleaned[..dot]).to_string();
    if int_part.is_empty() {
        int_part.push('0');
    }
    if int_part.len() >= MAX_TOTAL_DIGITS {
        return int_part.chars().take(MAX_TOTAL_DIGITS).collect();
    }

    let allowed =
        (precision.min(MAX_FRACTION_DIGITS) as usize).min(MAX_TOTAL_DIGITS - int_part.len());
    if allowed == 0 {
        return int_part;
    }

    let fraction: String = cleaned[dot + 1..]
        .chars()
        .filter(|c| *c != '.')
        .take(allowed)
        .collect();

    format!("{int_part}.{fraction}")
}

/// Clamp an amount into `[min, max]` and truncate it to `precision` digits.
///
/// Returns an empty string when `raw` has no leading number.
pub fn clamp_decimal(raw: &str, min: f64, max: f64, precision: u32) -> String {
    let Some(value) = leading_number(raw) else {
        return String::new();
    };
    let (Some(min), Some(max)) = (f64_to_decimal(min), f64_to_decimal(max)) else {
        return String::new();
    };

    let clamped = if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    };

    // `with_scale` drops digits, i.e. truncates toward zero
    let truncated = clamped.with_scale(precision as i64);
    trim_decimal(&plain_string(&truncated))
}

/// Convert a human amount into integer base units: `amount * 10^decimals`.
///
/// Any fraction left after scaling is truncated.
pub fn to_base_units(amount: &str, decimals: u8) -> Result<BigUint> {
    let value = parse_amount(amount)?;
    if value.is_negative() {
        return Err(AppError::amount(format!("{amount:?} is negative")));
    }
    let scale: BigDecimal = BigInt::from(10u32).pow(decimals as u32).into();
    let (units, _) = (value * scale).with_scale(0).into_bigint_and_exponent();
    units
        .to_biguint()
        .ok_or_else(|| AppError::amount(format!("{amount:?} is out of range")))
}

/// Render integer base units as a human amount without trailing zeros.
pub fn from_base_units(amount: &BigUint, decimals: u8) -> String {
    let value = BigDecimal::new(BigInt::from(amount.clone()), decimals as i64);
    trim_decimal(&plain_string(&value))
}

/// Whether the string parses as a strictly positive amount.
pub fn is_positive_amount(amount: &str) -> bool {
    parse_amount(amount).map(|v| v.is_positive()).unwrap_or(false)
}

/// Parse a normalized amount, tolerating a trailing separator (`"3."`).
pub fn parse_amount(amount: &str) -> Result<BigDecimal> {
    let trimmed = amount.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(AppError::amount("empty amount"));
    }
    // Digits and at most one separator; no sign or exponent
    let plain = trimmed.chars().all(|c| c.is_ascii_digit() || c == '.')
        && trimmed.matches('.').count() <= 1;
    if !plain {
        return Err(AppError::amount(format!("{amount:?} is not a plain decimal")));
    }
    BigDecimal::from_str(trimmed).map_err(|e| AppError::amount(format!("{amount:?}: {e}")))
}

fn strip_leading_zeros(s: &str) -> &str {
    let stripped = s.trim_start_matches('0');
    if stripped.is_empty() && !s.is_empty() {
        &s[s.len() - 1..]
    } else {
        stripped
    }
}

/// Longest numeric prefix of `raw`, the way a lenient float parser reads it.
fn leading_number(raw: &str) -> Option<BigDecimal> {
    let s = raw.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end = 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > digits_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if frac_end > frac_start {
            has_digits = true;
            end = frac_end;
        }
    }
    if !has_digits {
        return None;
    }
    let mut number = s[..end].to_string();
    if number.starts_with('.') || number.starts_with("-.") || number.starts_with("+.") {
        number = number.replacen('.', "0.", 1);
    }
    BigDecimal::from_str(&number).ok()
}

fn f64_to_decimal(v: f64) -> Option<BigDecimal> {
    if !v.is_finite() {
        return None;
    }
    // Display gives the shortest round-trip form, so 0.1 stays 0.1
    BigDecimal::from_str(&v.to_string()).ok()
}

/// Positional rendering of a decimal, never in exponent form.
fn plain_string(value: &BigDecimal) -> String {
    let (int_val, scale) = value.as_bigint_and_exponent();
    if scale <= 0 {
        let factor = BigInt::from(10u32).pow((-scale) as u32);
        return (int_val * factor).to_string();
    }
    let scale = scale as usize;
    let sign = if int_val.is_negative() { "-" } else { "" };
    let mut digits = int_val.abs().to_string();
    if digits.len() <= scale {
        digits = format!("{}{}", "0".repeat(scale + 1 - digits.len()), digits);
    }
    let (whole, fraction) = digits.split_at(digits.len() - scale);
    format!("{sign}{whole}.{fraction}")
}

/// Drop trailing fractional zeros and a dangling separator; `-0` becomes `0`.
fn trim_decimal(s: &str) -> String {
    let out = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    };
    let out = if out.is_empty() { "0" } else { out };
    match out.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0') => "0".to_string(),
        _ => out.to_string(),
    }
}

/// Count of digits in a normalized amount string.
pub fn digit_count(s: &str) -> usize {
    s.chars().filter(char::is_ascii_digit).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_noise_and_leading_zeros() {
        assert_eq!(normalize_decimal_input("0007.50", 2), "7.50");
        assert_eq!(normalize_decimal_input("1,5", 2), "1.5");
        assert_eq!(normalize_decimal_input("$1 2a3", 2), "123");
        assert_eq!(normalize_decimal_input("000", 2), "0");
        assert_eq!(normalize_decimal_input("", 2), "");
        assert_eq!(normalize_decimal_input(".", 2), "0.");
        assert_eq!(normalize_decimal_input(".5", 2), "0.5");
    }

    #[test]
    fn normalize_keeps_trailing_separator_while_typing() {
        assert_eq!(normalize_decimal_input("3.", 6), "3.");
        assert_eq!(normalize_decimal_input("3.5.", 6), "3.5");
        assert_eq!(normalize_decimal_input("1.2.3", 6), "1.23");
    }

    #[test]
    fn normalize_truncates_fraction_to_precision_and_cap() {
        assert_eq!(normalize_decimal_input("1.123456", 2), "1.12");
        assert_eq!(normalize_decimal_input("0.1234567891234", 18), "0.123456789");
        assert_eq!(normalize_decimal_input("4.99", 0), "4");
    }

    #[test]
    fn normalize_enforces_digit_budget() {
        assert_eq!(normalize_decimal_input("12345678901234", 2), "123456789012");
        assert_eq!(normalize_decimal_input("123456789012.55", 2), "123456789012");
        assert_eq!(normalize_decimal_input("1234567890.123", 9), "1234567890.12");
        for (raw, p) in [
            ("99999999999.9999", 9),
            ("0.000000000001", 9),
            ("5555555.55555555", 6),
            ("1,2,3,4", 3),
        ] {
            let out = normalize_decimal_input(raw, p);
            assert!(digit_count(&out) <= MAX_TOTAL_DIGITS, "{raw} -> {out}");
            assert!(out.matches('.').count() <= 1);
            let frac = out.split_once('.').map_or(0, |(_, f)| f.len());
            assert!(frac <= p.min(MAX_FRACTION_DIGITS) as usize, "{raw} -> {out}");
        }
    }

    #[test]
    fn clamp_matches_blur_behavior() {
        assert_eq!(clamp_decimal("150", 0.1, 100.0, 2), "100");
        assert_eq!(clamp_decimal("0.0001", 0.1, 100.0, 2), "0.1");
        assert_eq!(clamp_decimal("abc", 0.0, 1.0, 2), "");
        assert_eq!(clamp_decimal("12.3456", 0.0, 100.0, 2), "12.34");
        assert_eq!(clamp_decimal("7.5xyz", 0.0, 100.0, 0), "7");
        assert_eq!(clamp_decimal("-5", -10.0, 10.0, 2), "-5");
    }

    #[test]
    fn base_unit_conversion_is_exact() {
        assert_eq!(to_base_units("1.5", 9).unwrap(), BigUint::from(1_500_000_000u64));
        assert_eq!(to_base_units("3.", 6).unwrap(), BigUint::from(3_000_000u64));
        assert_eq!(
            to_base_units("123456789012", 18).unwrap().to_string(),
            "123456789012000000000000000000"
        );
        assert_eq!(to_base_units("0.1234567", 6).unwrap(), BigUint::from(123_456u64));
        assert!(to_base_units("", 6).is_err());
        assert!(to_base_units("-1", 6).is_err());

        let units = BigUint::from(1_500_000_000u64);
        assert_eq!(from_base_units(&units, 9), "1.5");
        assert_eq!(from_base_units(&BigUint::from(42u32), 0), "42");
        assert_eq!(from_base_units(&BigUint::from(5u32), 6), "0.000005");
    }

    #[test]
    fn exponent_and_signs_are_rejected() {
        assert!(to_base_units("1e999999999", 9).is_err());
        assert!(to_base_units("1E3", 6).is_err());
        assert!(to_base_units("+1", 6).is_err());
        assert!(to_base_units("1.2.3", 6).is_err());
        assert!(!is_positive_amount("5e2"));
    }

    #[test]
    fn positivity() {
        assert!(is_positive_amount("0.01"));
        assert!(is_positive_amount("2."));
        assert!(!is_positive_amount("0"));
        assert!(!is_positive_amount("0."));
        assert!(!is_positive_amount(""));
    }
}
