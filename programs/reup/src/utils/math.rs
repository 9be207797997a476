//! Wide-integer helpers shared by the reward engine, the exit queue and the rebalancer.

#![allow(clippy::assign_op_pattern)]
#![allow(clippy::ptr_offset_with_cast)]
#![allow(clippy::manual_range_contains)]

use uint::construct_uint;

construct_uint! {
    pub struct U256(4);
}

impl U256 {
    /// Narrows to `u128`, `None` when the value does not fit.
    pub fn to_u128(self) -> Option<u128> {
        if self > U256::from(u128::MAX) {
            None
        } else {
            Some(self.low_u128())
        }
    }
}

/// Multiplier that lifts an amount with `decimals` to `target_decimals`.
///
/// `None` when the source has more decimals than the target, since that
/// conversion would not be exact.
pub fn decimal_factor(decimals: u8, target_decimals: u8) -> Option<u64> {
    let exponent = target_decimals.checked_sub(decimals)?;
    10u64.checked_pow(exponent as u32)
}

/// Rescales `amount` between decimal precisions, rounding down.
pub fn normalize_amount(amount: u64, from_decimals: u8, to_decimals: u8) -> Option<u64> {
    if from_decimals <= to_decimals {
        amount.checked_mul(decimal_factor(from_decimals, to_decimals)?)
    } else {
        Some(amount / decimal_factor(to_decimals, from_decimals)?)
    }
}

#[cfg(test)]
mod math_tests {
    use super::*;
    use quickcheck::quickcheck;

    #[test]
    fn to_u128_rejects_wide_values() {
        let big = U256::from(1u128 << 100);
        assert_eq!((big * big / big).to_u128(), Some(1u128 << 100));
        assert_eq!((U256::from(u128::MAX) + U256::one()).to_u128(), None);
    }

    #[test]
    fn decimal_factor_matches_usdc_and_dai_shapes() {
        assert_eq!(decimal_factor(6, 9), Some(1_000));
        assert_eq!(decimal_factor(9, 9), Some(1));
        assert_eq!(decimal_factor(18, 9), None);
    }

    #[test]
    fn normalize_rounds_down_when_dropping_precision() {
        assert_eq!(normalize_amount(1_999, 9, 6), Some(1));
        assert_eq!(normalize_amount(5, 6, 9), Some(5_000));
        assert_eq!(normalize_amount(u64::MAX, 0, 9), None);
    }

    quickcheck! {
        fn normalize_up_then_down_is_identity(amount: u32, decimals: u8) -> bool {
            let decimals = decimals % 10;
            let up = normalize_amount(amount as u64, decimals, 9).unwrap();
            normalize_amount(up, 9, decimals) == Some(amount as u64)
        }
    }
}
