//! Money helpers with minor-unit (integer) arithmetic.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Ledger amounts are `rust_decimal::Decimal` values with at most two
//! decimal places. Balance comparisons (debits vs credits) are done on
//! integer minor units so rounding drift can never make an unbalanced
//! group look balanced.

use rust_decimal::Decimal;

/// Number of decimal places in a ledger amount (minor units, e.g. cents).
pub const MINOR_UNIT_SCALE: u32 = 2;

/// Converts an amount to integer minor units (e.g. 12.50 -> 1250).
///
/// Returns `None` if the amount carries sub-minor-unit precision; a
/// tenth-of-a-cent amount is a data error, not something to round away.
#[must_use]
pub fn to_minor_units(amount: Decimal) -> Option<i128> {
    let mut normalized = amount.normalize();
    if normalized.scale() > MINOR_UNIT_SCALE {
        return None;
    }
    normalized.rescale(MINOR_UNIT_SCALE);
    Some(normalized.mantissa())
}

/// Returns true if the amount is a valid ledger amount: strictly
/// positive and representable in minor units.
#[must_use]
pub fn is_valid_amount(amount: Decimal) -> bool {
    amount > Decimal::ZERO && to_minor_units(amount).is_some()
}

/// Sums amounts in minor units.
///
/// Returns `None` if any single amount has sub-minor-unit precision.
#[must_use]
pub fn sum_minor_units<'a, I>(amounts: I) -> Option<i128>
where
    I: IntoIterator<Item = &'a Decimal>,
{
    let mut total: i128 = 0;
    for amount in amounts {
        total = total.checked_add(to_minor_units(*amount)?)?;
    }
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(5000), Some(500_000))]
    #[case(dec!(12.50), Some(1250))]
    #[case(dec!(0.01), Some(1))]
    // 10.100 is the same amount as 10.10
    #[case(dec!(10.100), Some(1010))]
    #[case(dec!(-3.25), Some(-325))]
    #[case(dec!(0.001), None)]
    #[case(dec!(12.505), None)]
    fn test_to_minor_units(#[case] amount: Decimal, #[case] expected: Option<i128>) {
        assert_eq!(to_minor_units(amount), expected);
    }

    #[test]
    fn test_is_valid_amount() {
        assert!(is_valid_amount(dec!(100)));
        assert!(is_valid_amount(dec!(0.01)));
        assert!(!is_valid_amount(dec!(0)));
        assert!(!is_valid_amount(dec!(-5)));
        assert!(!is_valid_amount(dec!(0.005)));
    }

    #[test]
    fn test_sum_minor_units() {
        let amounts = [dec!(100), dec!(0.50), dec!(24.25)];
        assert_eq!(sum_minor_units(amounts.iter()), Some(12475));
    }

    #[test]
    fn test_sum_minor_units_rejects_sub_cent_member() {
        let amounts = [dec!(100), dec!(0.005)];
        assert_eq!(sum_minor_units(amounts.iter()), None);
    }
}
