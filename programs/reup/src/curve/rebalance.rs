//! Peg correction planner for the REUSD pool.
//!
//! Reserves are compared in REUSD base units: the counter-asset reserve is
//! normalised to REUSD decimals before it reaches the planner.

/// Which side of the pool the correction lands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RebalanceAction {
    /// The pool is short of REUSD: mint `reusd_amount`, deposit it single-sided,
    /// then pull the same value back out as the counter asset.
    MintAndDeposit { reusd_amount: u64 },
    /// The pool holds surplus REUSD: deposit `counter_amount` of the counter
    /// asset single-sided, then pull REUSD back out and burn it.
    WithdrawAndBurn { counter_amount: u64 },
}

impl RebalanceAction {
    pub fn amount(&self) -> u64 {
        match *self {
            RebalanceAction::MintAndDeposit { reusd_amount } => reusd_amount,
            RebalanceAction::WithdrawAndBurn { counter_amount } => counter_amount,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RebalanceCalculator;

impl RebalanceCalculator {
    /// Plans the correction for a pool holding `reusd_reserve` REUSD and
    /// `counter_reserve` of the counter asset.
    ///
    /// Nothing happens while `|counter - reusd| < threshold`. Otherwise half the
    /// difference moves: adding it to one side and taking it from the other
    /// leaves the reserves at most one unit apart.
    pub fn plan(reusd_reserve: u64, counter_reserve: u64, threshold: u64) -> Option<RebalanceAction> {
        let (excess, counter_heavy) = if counter_reserve >= reusd_reserve {
            (counter_reserve - reusd_reserve, true)
        } else {
            (reusd_reserve - counter_reserve, false)
        };
        if excess == 0 || excess < threshold {
            return None;
        }

        let amount = excess / 2;
        if amount == 0 {
            return None;
        }
        if counter_heavy {
            Some(RebalanceAction::MintAndDeposit { reusd_amount: amount })
        } else {
            Some(RebalanceAction::WithdrawAndBurn { counter_amount: amount })
        }
    }
}

#[cfg(test)]
mod rebalance_tests {
    use super::*;
    use proptest::prelude::*;

    const ONE: u64 = 1_000_000_000;
    const THRESHOLD: u64 = 1_000 * ONE;

    /// Applies a plan to a par-priced pool: what goes in on one side comes out
    /// on the other.
    fn apply(reusd: u64, counter: u64, action: RebalanceAction) -> (u64, u64) {
        match action {
            RebalanceAction::MintAndDeposit { reusd_amount } => {
                (reusd + reusd_amount, counter - reusd_amount)
            }
            RebalanceAction::WithdrawAndBurn { counter_amount } => {
                (reusd - counter_amount, counter + counter_amount)
            }
        }
    }

    #[test]
    fn balanced_pool_is_left_alone() {
        assert_eq!(
            RebalanceCalculator::plan(1_000_000 * ONE, 1_000_000 * ONE, THRESHOLD),
            None
        );
    }

    #[test]
    fn just_under_threshold_is_left_alone() {
        let reusd = 1_000_000 * ONE;
        assert_eq!(
            RebalanceCalculator::plan(reusd, reusd + THRESHOLD - 1, THRESHOLD),
            None
        );
        assert_eq!(
            RebalanceCalculator::plan(reusd + THRESHOLD - 1, reusd, THRESHOLD),
            None
        );
    }

    #[test]
    fn just_over_threshold_mints_half_the_gap() {
        let reusd = 999_000 * ONE;
        let counter = reusd + THRESHOLD + 1;
        assert_eq!(
            RebalanceCalculator::plan(reusd, counter, THRESHOLD),
            Some(RebalanceAction::MintAndDeposit {
                reusd_amount: (THRESHOLD + 1) / 2
            })
        );
    }

    #[test]
    fn surplus_reusd_is_withdrawn() {
        let counter = 800_000 * ONE;
        let reusd = 1_000_000 * ONE;
        assert_eq!(
            RebalanceCalculator::plan(reusd, counter, THRESHOLD),
            Some(RebalanceAction::WithdrawAndBurn {
                counter_amount: 100_000 * ONE
            })
        );
    }

    #[test]
    fn gap_exactly_at_threshold_is_corrected() {
        let reusd = 999_000 * ONE;
        let action = RebalanceCalculator::plan(reusd, reusd + THRESHOLD, THRESHOLD).unwrap();
        assert_eq!(action.amount(), 500 * ONE);
    }

    #[test]
    fn zero_threshold_still_ignores_one_unit_gaps() {
        assert_eq!(RebalanceCalculator::plan(10, 10, 0), None);
        assert_eq!(RebalanceCalculator::plan(10, 11, 0), None);
        assert_eq!(
            RebalanceCalculator::plan(10, 12, 0),
            Some(RebalanceAction::MintAndDeposit { reusd_amount: 1 })
        );
    }

    proptest! {
        #[test]
        fn second_plan_after_correction_is_a_noop(
            reusd in 0u64..u64::MAX / 4,
            counter in 0u64..u64::MAX / 4,
        ) {
            if let Some(action) = RebalanceCalculator::plan(reusd, counter, THRESHOLD) {
                let (reusd, counter) = apply(reusd, counter, action);
                prop_assert_eq!(RebalanceCalculator::plan(reusd, counter, THRESHOLD), None);
            }
        }

        #[test]
        fn correction_always_moves_toward_par(
            reusd in 0u64..u64::MAX / 4,
            counter in 0u64..u64::MAX / 4,
        ) {
            let before = reusd.abs_diff(counter);
            match RebalanceCalculator::plan(reusd, counter, THRESHOLD) {
                None => prop_assert!(before < THRESHOLD),
                Some(action) => {
                    let (reusd_after, counter_after) = apply(reusd, counter, action);
                    let after = reusd_after.abs_diff(counter_after);
                    prop_assert!(after < before);
                    prop_assert!(after <= 1);
                    match action {
                        RebalanceAction::MintAndDeposit { .. } => prop_assert!(counter > reusd),
                        RebalanceAction::WithdrawAndBurn { .. } => prop_assert!(reusd > counter),
                    }
                }
            }
        }
    }
}
