//! # Validation Module
//!
//! Input normalization and validation for Quote Desk.
//!
//! ## Two Strategies
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Input Handling Layers                              │
//! │                                                                         │
//! │  Grid cells (lenient) ── normalize_amount() ──► engine                 │
//! │  ├── ''            → 0                                                 │
//! │  ├── '12.5kg'      → 12.5   (leading number, like parseFloat)          │
//! │  └── 'abc', 'NaN'  → 0      (never NaN in stored state)                │
//! │                                                                         │
//! │  Settings & commands (strict) ── parse_amount() ──► Result             │
//! │  ├── ''            → Err(Required)                                     │
//! │  └── 'abc'         → Err(InvalidNumber)                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use quote_core::validation::{normalize_amount, parse_amount};
//!
//! assert_eq!(normalize_amount(""), 0.0);
//! assert_eq!(normalize_amount("1270"), 1270.0);
//! assert!(parse_amount("market rate", "abc").is_err());
//! ```

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest item name accepted for custom rows.
pub const MAX_NAME_LEN: usize = 200;

// =============================================================================
// Lenient Normalizers
// =============================================================================

/// Replaces `NaN` and infinities with 0.
#[inline]
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Normalizes a raw grid-cell string to a number.
///
/// ## Rules
/// - Empty or whitespace-only input is 0
/// - Otherwise the longest leading decimal number is used (`"12.5kg"` is
///   12.5), matching how browsers read number inputs
/// - Anything without a leading number, or a non-finite result, is 0
pub fn normalize_amount(raw: &str) -> f64 {
    let raw = raw.trim();
    if raw.is_empty() {
        return 0.0;
    }

    let prefix = leading_number(raw);
    prefix.parse::<f64>().map(sanitize).unwrap_or(0.0)
}

/// Returns the longest prefix of `s` that forms a decimal number
/// (`[+-]digits[.digits][e[+-]digits]`).
fn leading_number(s: &str) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;

    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if digits > 0 {
            end = frac_end;
        }
    }

    if digits == 0 {
        return "";
    }

    // Exponent only counts when followed by at least one digit.
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if exp_end < bytes.len() && (bytes[exp_end] == b'+' || bytes[exp_end] == b'-') {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    &s[..end]
}

// =============================================================================
// Strict Validators
// =============================================================================

/// Parses a number strictly: the whole trimmed string must be a finite
/// decimal number.
pub fn parse_amount(field: &str, raw: &str) -> ValidationResult<f64> {
    let raw = raw.trim();

    if raw.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ValidationError::InvalidNumber {
            field: field.to_string(),
            value: raw.to_string(),
        }),
    }
}

/// Validates an item or category name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
pub fn validate_item_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Validates a tax percentage (0% to 100%).
pub fn validate_tax_percent(pct: f64) -> ValidationResult<()> {
    if !(0.0..=100.0).contains(&pct) {
        return Err(ValidationError::OutOfRange {
            field: "tax rate".to_string(),
            min: 0.0,
            max: 100.0,
        });
    }

    Ok(())
}

/// Validates a commodity market rate (non-negative).
pub fn validate_market_rate(rate: f64) -> ValidationResult<()> {
    if rate < 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "market rate".to_string(),
            min: 0.0,
            max: f64::MAX,
        });
    }

    Ok(())
}

/// Validates a quantity (non-negative; fractional lengths are allowed).
pub fn validate_quantity(qty: f64) -> ValidationResult<()> {
    if qty < 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 0.0,
            max: f64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_empty_is_zero() {
        assert_eq!(normalize_amount(""), 0.0);
        assert_eq!(normalize_amount("   "), 0.0);
    }

    #[test]
    fn test_normalize_plain_numbers() {
        assert_eq!(normalize_amount("1270"), 1270.0);
        assert_eq!(normalize_amount(" 0.357 "), 0.357);
        assert_eq!(normalize_amount("-12.5"), -12.5);
        assert_eq!(normalize_amount(".5"), 0.5);
        assert_eq!(normalize_amount("5."), 5.0);
        assert_eq!(normalize_amount("1e3"), 1000.0);
    }

    #[test]
    fn test_normalize_leading_number() {
        assert_eq!(normalize_amount("12.5kg"), 12.5);
        assert_eq!(normalize_amount("3e"), 3.0);
        assert_eq!(normalize_amount("7e+x"), 7.0);
    }

    #[test]
    fn test_normalize_garbage_is_zero() {
        assert_eq!(normalize_amount("abc"), 0.0);
        assert_eq!(normalize_amount("NaN"), 0.0);
        assert_eq!(normalize_amount("inf"), 0.0);
        assert_eq!(normalize_amount("-"), 0.0);
        assert_eq!(normalize_amount("."), 0.0);
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize(f64::NAN), 0.0);
        assert_eq!(sanitize(f64::NEG_INFINITY), 0.0);
        assert_eq!(sanitize(4.2), 4.2);
    }

    #[test]
    fn test_parse_amount_strict() {
        assert_eq!(parse_amount("total", "450").unwrap(), 450.0);
        assert!(matches!(
            parse_amount("total", ""),
            Err(ValidationError::Required { .. })
        ));
        assert!(matches!(
            parse_amount("total", "12abc"),
            Err(ValidationError::InvalidNumber { .. })
        ));
        assert!(parse_amount("total", "NaN").is_err());
    }

    #[test]
    fn test_validate_item_name() {
        assert!(validate_item_name("Installation charges").is_ok());
        assert!(validate_item_name("").is_err());
        assert!(validate_item_name("   ").is_err());
        assert!(validate_item_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_tax_percent() {
        assert!(validate_tax_percent(0.0).is_ok());
        assert!(validate_tax_percent(18.0).is_ok());
        assert!(validate_tax_percent(100.0).is_ok());
        assert!(validate_tax_percent(100.5).is_err());
        assert!(validate_tax_percent(-1.0).is_err());
    }

    #[test]
    fn test_validate_market_rate_and_quantity() {
        assert!(validate_market_rate(1270.0).is_ok());
        assert!(validate_market_rate(-1.0).is_err());
        assert!(validate_quantity(0.0).is_ok());
        assert!(validate_quantity(-2.0).is_err());
    }
}
