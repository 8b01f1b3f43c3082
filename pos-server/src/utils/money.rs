//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted to `f64`
//! for storage/serialization.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half away from zero)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    round2(value).to_f64().unwrap_or_default()
}

/// Round to cents
#[inline]
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// `price * quantity`, rounded to cents
pub fn line_total(price: f64, quantity: f64) -> f64 {
    to_f64(to_decimal(price) * to_decimal(quantity))
}

/// Validate that a f64 value is finite and non-negative
pub fn require_non_negative(value: f64, field: &str) -> Result<(), String> {
    if !value.is_finite() {
        return Err(format!("{field} must be a finite number, got {value}"));
    }
    if value < 0.0 {
        return Err(format!("{field} must be non-negative, got {value}"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(to_f64(Decimal::new(12345, 3)), 12.35);
        assert_eq!(to_f64(Decimal::new(-12345, 3)), -12.35);
        assert_eq!(to_f64(Decimal::new(250, 0) / Decimal::new(15, 0)), 16.67);
    }

    #[test]
    fn test_line_total_avoids_float_drift() {
        assert_eq!(line_total(0.1, 3.0), 0.3);
        assert_eq!(line_total(19.99, 3.0), 59.97);
    }

    #[test]
    fn test_require_non_negative() {
        assert!(require_non_negative(0.0, "price").is_ok());
        assert!(require_non_negative(-1.0, "price").is_err());
        assert!(require_non_negative(f64::NAN, "price").is_err());
    }
}
