use crate::error::ErrorCode;
use crate::states::Versioned;
use crate::utils::normalize_amount;
use crate::REUSD_DECIMALS;
use anchor_lang::prelude::*;

//
// ──────────────────────────────────────────────────────────────────────────────
// Pool rebalance state (shared with the zapper)
// ──────────────────────────────────────────────────────────────────────────────
//

pub const BLARGITRAGE_SEED: &str = "blargitrage";

/// Program-owned token accounts used by the rebalancer, each derived as
/// `[seed, blargitrage]`.
pub const REUSD_VAULT_SEED: &str = "rebalance_reusd";
pub const POOL_LP_VAULT_SEED: &str = "rebalance_pool_lp";
pub const BASE_LP_VAULT_SEED: &str = "rebalance_base_lp";
pub const INVENTORY_VAULT_SEED: &str = "rebalance_inventory";

/// Largest base pool the rebalancer can route through.
pub const MAX_BASE_POOL_COINS: usize = 4;

/// The REUSD pool, the base pool behind its counter asset, and the running
/// total of desired-asset proceeds sent to the custodian.
///
/// The pool holds REUSD and the base pool's LP token. Coin indices are fixed
/// at initialisation by matching vault mints.
#[account]
#[derive(Default, Debug)]
pub struct Blargitrage {
    pub bump: u8,

    pub contract_version: u64,

    /// Stable-swap program owning both pools.
    pub pool_program: Pubkey,

    pub pool: Pubkey,
    pub pool_authority: Pubkey,
    pub pool_lp_mint: Pubkey,
    /// Coin vaults of the pool, in coin order.
    pub pool_vaults: [Pubkey; 2],
    pub reusd_index: u8,
    pub counter_index: u8,

    pub base_pool: Pubkey,
    pub base_pool_authority: Pubkey,
    pub base_lp_mint: Pubkey,
    pub base_pool_vaults: Vec<Pubkey>,
    pub base_pool_mints: Vec<Pubkey>,

    /// Base pool coin delivered to the custodian.
    pub desired_mint: Pubkey,
    pub desired_index: u8,
    pub desired_decimals: u8,

    /// Decimals of the base LP token, used to compare pool reserves.
    pub counter_decimals: u8,

    /// Desired asset forwarded to the custodian so far.
    pub total_amount: u64,
}

/// Coin indices found by `Blargitrage::detect_indices`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolIndices {
    pub reusd_index: u8,
    pub counter_index: u8,
    pub desired_index: u8,
}

impl Blargitrage {
    /// Breakdown:
    /// - 8: account discriminator
    /// - 1: bump
    /// - 8: contract version
    /// - 32 * 4: pool program, pool, pool authority, pool LP mint
    /// - 32 * 2: pool vaults
    /// - 1 * 2: pool indices
    /// - 32 * 3: base pool, base pool authority, base LP mint
    /// - 2 * (4 + 32 * MAX_BASE_POOL_COINS): base vaults and mints
    /// - 32 + 1 + 1: desired mint, index and decimals
    /// - 1: counter decimals
    /// - 8: total amount
    pub const LEN: usize = 8
        + 1
        + 8
        + 32 * 4
        + 32 * 2
        + 2
        + 32 * 3
        + 2 * (4 + 32 * MAX_BASE_POOL_COINS)
        + 32
        + 1
        + 1
        + 1
        + 8;

    /// Matches coin mints against REUSD and the desired asset.
    ///
    /// - the pool must hold REUSD (`PoolWithoutREUSD`)
    /// - the base pool must not (`BasePoolWithREUSD`)
    /// - the desired asset must be a base pool coin (`DesiredTokenNotInBasePool`)
    /// - the pool's other coin must be the base pool LP token (`PoolMismatch`)
    pub fn detect_indices(
        pool_mints: &[Pubkey; 2],
        base_pool_mints: &[Pubkey],
        base_lp_mint: &Pubkey,
        reusd_mint: &Pubkey,
        desired_mint: &Pubkey,
    ) -> Result<PoolIndices> {
        let reusd_index = pool_mints
            .iter()
            .position(|m| m == reusd_mint)
            .ok_or(ErrorCode::PoolWithoutREUSD)?;
        require!(
            !base_pool_mints.contains(reusd_mint),
            ErrorCode::BasePoolWithREUSD
        );
        let desired_index = base_pool_mints
            .iter()
            .position(|m| m == desired_mint)
            .ok_or(ErrorCode::DesiredTokenNotInBasePool)?;
        let counter_index = 1 - reusd_index;
        require_keys_eq!(
            pool_mints[counter_index],
            *base_lp_mint,
            ErrorCode::PoolMismatch
        );
        Ok(PoolIndices {
            reusd_index: reusd_index as u8,
            counter_index: counter_index as u8,
            desired_index: desired_index as u8,
        })
    }

    /// Index of `mint` among the base pool coins.
    pub fn base_coin_index(&self, mint: &Pubkey) -> Option<u8> {
        self.base_pool_mints
            .iter()
            .position(|m| m == mint)
            .map(|i| i as u8)
    }

    pub fn reusd_vault(&self) -> Pubkey {
        self.pool_vaults[self.reusd_index as usize]
    }

    pub fn counter_vault(&self) -> Pubkey {
        self.pool_vaults[self.counter_index as usize]
    }

    /// Values a base LP reserve in REUSD units.
    ///
    /// One base LP token is taken to be worth one REUSD. The base pool holds
    /// dollar stablecoins only, so its LP drifts above par by accumulated
    /// fees alone; that drift makes the pool look REUSD-heavy by the same
    /// fraction and is absorbed by `BLARGITRAGE_THRESHOLD`.
    pub fn counter_reserve_in_reusd(&self, lp_amount: u64) -> Result<u64> {
        normalize_amount(lp_amount, self.counter_decimals, REUSD_DECIMALS)
            .ok_or_else(|| error!(ErrorCode::MathOverflow))
    }

    /// Single-coin deposit vector for a two-coin pool.
    pub fn pool_amounts(&self, index: u8, amount: u64) -> Vec<u64> {
        let mut amounts = vec![0u64; 2];
        amounts[index as usize] = amount;
        amounts
    }

    /// Single-coin deposit vector for the base pool.
    pub fn base_pool_amounts(&self, index: u8, amount: u64) -> Vec<u64> {
        let mut amounts = vec![0u64; self.base_pool_mints.len()];
        amounts[index as usize] = amount;
        amounts
    }
}

impl Versioned for Blargitrage {
    fn contract_version(&self) -> u64 {
        self.contract_version
    }

    fn set_contract_version(&mut self, version: u64) {
        self.contract_version = version;
    }
}

#[cfg(test)]
mod blargitrage_tests {
    use super::*;

    struct Mints {
        reusd: Pubkey,
        base_lp: Pubkey,
        desired: Pubkey,
        other: Pubkey,
    }

    fn mints() -> Mints {
        Mints {
            reusd: Pubkey::new_unique(),
            base_lp: Pubkey::new_unique(),
            desired: Pubkey::new_unique(),
            other: Pubkey::new_unique(),
        }
    }

    #[test]
    fn detects_reusd_in_either_slot() {
        let m = mints();
        let idx = Blargitrage::detect_indices(
            &[m.base_lp, m.reusd],
            &[m.other, m.desired],
            &m.base_lp,
            &m.reusd,
            &m.desired,
        )
        .unwrap();
        assert_eq!(
            idx,
            PoolIndices {
                reusd_index: 1,
                counter_index: 0,
                desired_index: 1
            }
        );

        let idx = Blargitrage::detect_indices(
            &[m.reusd, m.base_lp],
            &[m.desired, m.other],
            &m.base_lp,
            &m.reusd,
            &m.desired,
        )
        .unwrap();
        assert_eq!(idx.reusd_index, 0);
        assert_eq!(idx.counter_index, 1);
        assert_eq!(idx.desired_index, 0);
    }

    #[test]
    fn rejects_misconfigured_pools() {
        let m = mints();
        let err = Blargitrage::detect_indices(
            &[m.base_lp, m.other],
            &[m.desired],
            &m.base_lp,
            &m.reusd,
            &m.desired,
        )
        .unwrap_err();
        assert_eq!(err, error!(ErrorCode::PoolWithoutREUSD));

        let err = Blargitrage::detect_indices(
            &[m.base_lp, m.reusd],
            &[m.other, m.reusd],
            &m.base_lp,
            &m.reusd,
            &m.desired,
        )
        .unwrap_err();
        assert_eq!(err, error!(ErrorCode::BasePoolWithREUSD));

        let err = Blargitrage::detect_indices(
            &[m.base_lp, m.reusd],
            &[m.other],
            &m.base_lp,
            &m.reusd,
            &m.desired,
        )
        .unwrap_err();
        assert_eq!(err, error!(ErrorCode::DesiredTokenNotInBasePool));

        let err = Blargitrage::detect_indices(
            &[m.other, m.reusd],
            &[m.desired],
            &m.base_lp,
            &m.reusd,
            &m.desired,
        )
        .unwrap_err();
        assert_eq!(err, error!(ErrorCode::PoolMismatch));
    }

    #[test]
    fn single_coin_amount_vectors() {
        let b = Blargitrage {
            base_pool_mints: vec![Pubkey::new_unique(); 3],
            ..Default::default()
        };
        assert_eq!(b.pool_amounts(1, 9), vec![0, 9]);
        assert_eq!(b.base_pool_amounts(2, 4), vec![0, 0, 4]);
    }

    #[test]
    fn base_lp_is_valued_at_par() {
        let lp6 = Blargitrage {
            counter_decimals: 6,
            ..Default::default()
        };
        assert_eq!(lp6.counter_reserve_in_reusd(1_500_000).unwrap(), 1_500_000_000);

        let lp12 = Blargitrage {
            counter_decimals: 12,
            ..Default::default()
        };
        assert_eq!(lp12.counter_reserve_in_reusd(2_000_000_000_999).unwrap(), 2_000_000_000);

        let wide = Blargitrage::default();
        assert_eq!(
            wide.counter_reserve_in_reusd(u64::MAX).unwrap_err(),
            error!(ErrorCode::MathOverflow)
        );
    }
}
