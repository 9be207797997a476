use crate::states::Versioned;
use anchor_lang::prelude::*;

//
// ──────────────────────────────────────────────────────────────────────────────
// Global Configuration Account
// ──────────────────────────────────────────────────────────────────────────────
//

/// PDA seed string used to derive the global configuration account.
pub const GLOBAL_CONFIG_SEED: &str = "global_config";

/// Protocol-wide owner, custodian and REUSD mint.
///
/// Created once by `initialise_config` and read by every instruction that
/// mints REUSD or moves funds to the custodian.
#[account]
#[derive(Default, Debug)]
pub struct GlobalConfig {
    /// PDA bump for this account.
    pub bump: u8,

    pub contract_version: u64,

    /// Current owner; guards configuration, registry and upgrades.
    pub owner: Pubkey,

    /// Nominated owner waiting to call `claim_ownership`.
    pub pending_owner: Pubkey,

    /// Receives stablecoins deposited for REUSD and rebalance proceeds.
    pub custodian: Pubkey,

    /// REUSD mint, authority is the program authority PDA.
    pub reusd_mint: Pubkey,

    /// REUSD minted against stablecoin deposits.
    pub total_minted: u64,
}

impl GlobalConfig {
    /// Breakdown:
    /// - 8: account discriminator
    /// - 1: bump
    /// - 8: contract version
    /// - 32 * 4: four Pubkeys
    /// - 8: total minted
    pub const LEN: usize = 8 + 1 + 8 + 32 * 4 + 8;
}

impl Versioned for GlobalConfig {
    fn contract_version(&self) -> u64 {
        self.contract_version
    }

    fn set_contract_version(&mut self, version: u64) {
        self.contract_version = version;
    }
}
