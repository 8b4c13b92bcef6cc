//! Money calculation utilities using rust_decimal for precision
//!
//! Amounts are stored and serialized as `f64`; all arithmetic goes through
//! `Decimal` and is rounded back to 2 decimal places.

use rust_decimal::prelude::*;
use shared::error::AppError;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Maximum accepted amount for any single money field
const MAX_AMOUNT: f64 = 1_000_000.0;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// True when the amount is zero within one cent
pub fn is_zero(value: f64) -> bool {
    to_decimal(value).abs() < MONEY_TOLERANCE
}

/// Validate that a f64 value is finite (not NaN, not Infinity)
#[inline]
fn require_finite(value: f64, field_name: &str) -> Result<(), AppError> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "{field_name} must be a finite number, got {value}"
        ))
        .with_detail("field", field_name));
    }
    Ok(())
}

/// Validate a non-negative money amount
pub fn validate_amount(value: f64, field_name: &str) -> Result<(), AppError> {
    require_finite(value, field_name)?;
    if value < 0.0 {
        return Err(AppError::validation(format!(
            "{field_name} must be non-negative, got {value}"
        ))
        .with_detail("field", field_name));
    }
    if value > MAX_AMOUNT {
        return Err(AppError::validation(format!(
            "{field_name} exceeds maximum allowed ({MAX_AMOUNT}), got {value}"
        ))
        .with_detail("field", field_name));
    }
    Ok(())
}

/// Validate a strictly positive money amount
pub fn validate_positive_amount(value: f64, field_name: &str) -> Result<(), AppError> {
    validate_amount(value, field_name)?;
    if value == 0.0 {
        return Err(
            AppError::validation(format!("{field_name} must be positive"))
                .with_detail("field", field_name),
        );
    }
    Ok(())
}

/// Validate a percentage in [0, 100]
pub fn validate_percent(value: f64, field_name: &str) -> Result<(), AppError> {
    require_finite(value, field_name)?;
    if !(0.0..=100.0).contains(&value) {
        return Err(AppError::validation(format!(
            "{field_name} must be between 0 and 100, got {value}"
        ))
        .with_detail("field", field_name));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::error::ErrorCode;

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(to_f64(to_decimal(1.375)), 1.38);
        assert_eq!(to_f64(to_decimal(0.125)), 0.13);
        assert_eq!(to_f64(to_decimal(10.0)), 10.0);
    }

    #[test]
    fn zero_within_a_cent() {
        assert!(is_zero(0.0));
        assert!(is_zero(0.004));
        assert!(!is_zero(0.01));
        assert!(!is_zero(-5.0));
    }

    #[test]
    fn rejects_bad_amounts() {
        assert!(validate_amount(0.0, "amount").is_ok());
        assert!(validate_amount(f64::NAN, "amount").is_err());
        assert!(validate_amount(-1.0, "amount").is_err());
        assert!(validate_amount(2_000_000.0, "amount").is_err());
        let err = validate_positive_amount(0.0, "amount").unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[test]
    fn percent_bounds() {
        assert!(validate_percent(0.0, "p").is_ok());
        assert!(validate_percent(100.0, "p").is_ok());
        assert!(validate_percent(100.5, "p").is_err());
        assert!(validate_percent(-0.1, "p").is_err());
    }
}
