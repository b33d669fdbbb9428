//! Precision helpers for amounts and leave counts.
//!
//! Currency amounts and plain figures are rounded half away from zero to a
//! configured number of decimal places. Earned leave credits may instead be
//! rounded to a step (quarter, half or whole day), rounding ties to even on
//! the scaled value.

use rust_decimal::{Decimal, RoundingStrategy};

use crate::models::EarnedLeaveRounding;

/// Rounds `value` to `precision` decimal places, ties away from zero.
///
/// # Examples
///
/// ```
/// use hrms_rules::rounding::flt;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// assert_eq!(flt(Decimal::from_str("107.025").unwrap(), 2), Decimal::from_str("107.03").unwrap());
/// assert_eq!(flt(Decimal::from_str("-2.345").unwrap(), 2), Decimal::from_str("-2.35").unwrap());
/// ```
pub fn flt(value: Decimal, precision: u32) -> Decimal {
    value.round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero)
}

/// Rounds an earned leave credit.
///
/// With a rounding step the value is rounded to the nearest multiple of the
/// step (ties to even on the scaled value, so 2.5 days rounds to 2 whole
/// days). Without one it is rounded to `float_precision` places.
///
/// # Examples
///
/// ```
/// use hrms_rules::models::EarnedLeaveRounding;
/// use hrms_rules::rounding::round_earned_leaves;
/// use rust_decimal::Decimal;
/// use std::str::FromStr;
///
/// let value = Decimal::from_str("3.9130").unwrap();
/// assert_eq!(
///     round_earned_leaves(value, Some(EarnedLeaveRounding::Half), 2),
///     Decimal::from(4)
/// );
/// assert_eq!(round_earned_leaves(value, None, 2), Decimal::from_str("3.91").unwrap());
/// ```
pub fn round_earned_leaves(
    value: Decimal,
    rounding: Option<EarnedLeaveRounding>,
    float_precision: u32,
) -> Decimal {
    let steps_per_day = match rounding {
        Some(EarnedLeaveRounding::Quarter) => Decimal::from(4),
        Some(EarnedLeaveRounding::Half) => Decimal::from(2),
        Some(EarnedLeaveRounding::Whole) => Decimal::ONE,
        None => return flt(value, float_precision),
    };

    ((value * steps_per_day).round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven)
        / steps_per_day)
        .normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_flt_rounds_to_precision() {
        assert_eq!(flt(dec("1234.5678"), 2), dec("1234.57"));
        assert_eq!(flt(dec("0.005"), 2), dec("0.01"));
        assert_eq!(flt(dec("10"), 2), dec("10"));
    }

    #[test]
    fn test_quarter_rounding() {
        assert_eq!(
            round_earned_leaves(dec("1.13"), Some(EarnedLeaveRounding::Quarter), 2),
            dec("1.25")
        );
        assert_eq!(
            round_earned_leaves(dec("1.1"), Some(EarnedLeaveRounding::Quarter), 2),
            dec("1")
        );
    }

    #[test]
    fn test_half_rounding_ties_to_even() {
        // 1.25 * 2 = 2.5, ties to 2
        assert_eq!(
            round_earned_leaves(dec("1.25"), Some(EarnedLeaveRounding::Half), 2),
            dec("1")
        );
        // 1.75 * 2 = 3.5, ties to 4
        assert_eq!(
            round_earned_leaves(dec("1.75"), Some(EarnedLeaveRounding::Half), 2),
            dec("2")
        );
    }

    #[test]
    fn test_whole_rounding() {
        assert_eq!(
            round_earned_leaves(dec("2.5"), Some(EarnedLeaveRounding::Whole), 2),
            dec("2")
        );
        assert_eq!(
            round_earned_leaves(dec("2.51"), Some(EarnedLeaveRounding::Whole), 2),
            dec("3")
        );
    }

    #[test]
    fn test_no_rounding_uses_float_precision() {
        assert_eq!(round_earned_leaves(dec("0.666666"), None, 2), dec("0.67"));
        assert_eq!(round_earned_leaves(dec("0.666666"), None, 3), dec("0.667"));
    }
}
