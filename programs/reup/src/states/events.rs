use crate::states::{Role, UpgradeKind};
use anchor_lang::prelude::*;

//
// ──────────────────────────────────────────────────────────────────────────────
// Events: Emitted for off-chain indexers/clients to track protocol state changes
// ──────────────────────────────────────────────────────────────────────────────
//

/// Emitted once when the global configuration and the REUSD mint are created.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct GlobalConfigInitialized {
    pub owner: Pubkey,
    pub custodian: Pubkey,
    pub reusd_mint: Pubkey,
}

/// Emitted whenever `update_config` changes a field.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct ConfigUpdated {
    pub owner: Pubkey,
    /// Nominated owner, default key when none.
    pub pending_owner: Pubkey,
    pub custodian: Pubkey,
}

#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct OwnershipTransferred {
    pub previous_owner: Pubkey,
    pub new_owner: Pubkey,
}

/// Emitted after a component account moves to a newer contract version.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct ContractUpgraded {
    pub kind: UpgradeKind,
    pub account: Pubkey,
    pub previous_version: u64,
    pub new_version: u64,
}

#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct StablecoinAdded {
    pub mint: Pubkey,
    pub decimals: u8,
    pub baked_in: bool,
}

#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct StablecoinRemoved {
    pub mint: Pubkey,
}

/// Emitted when stablecoin is exchanged for REUSD.
///
/// `stable_amount` is in the stablecoin's units, `reusd_amount` in REUSD units.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct ReusdMinted {
    pub payer: Pubkey,
    pub recipient: Pubkey,
    pub stablecoin: Pubkey,
    pub stable_amount: u64,
    pub reusd_amount: u64,
}

#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct ExitQueued {
    pub user: Pubkey,
    /// Absolute queue position holding the request.
    pub index: u64,
    pub amount: u64,
    pub total_queued: u64,
}

/// Emitted once per payout made by `fund_exit_queue`.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct ExitPaid {
    pub index: u64,
    pub user: Pubkey,
    pub stablecoin: Pubkey,
    pub stable_amount: u64,
    pub reusd_amount: u64,
}

/// Summary of a funding batch.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct ExitQueueFunded {
    pub funder: Pubkey,
    pub stablecoin: Pubkey,
    /// Stablecoin offered by the funder.
    pub stable_offered: u64,
    /// Stablecoin actually paid out.
    pub stable_spent: u64,
    /// REUSD burned from the exit vault.
    pub reusd_redeemed: u64,
    pub queued_exit_start: u64,
    pub total_queued: u64,
}

#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct SelfStakingInitialized {
    pub token: Pubkey,
    pub owner: Pubkey,
    pub reward_mint: Pubkey,
    pub decimals: u8,
}

/// Ledger movement on a self-staking token. Mints have a default `from`,
/// burns a default `to`.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct SelfStakingTransfer {
    pub token: Pubkey,
    pub from: Pubkey,
    pub to: Pubkey,
    pub amount: u64,
}

#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct RoleUpdated {
    pub token: Pubkey,
    pub role: Role,
    pub who: Pubkey,
    pub enabled: bool,
}

#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct ExclusionUpdated {
    pub token: Pubkey,
    pub holder: Pubkey,
    pub excluded: bool,
    pub staking_supply: u64,
}

/// Emitted when a new reward window starts.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct RewardAdded {
    pub token: Pubkey,
    /// Reward tokens deposited by the manager.
    pub amount: u64,
    /// Deposit plus leftover from earlier windows.
    pub amount_to_distribute: u64,
    pub start_timestamp: u64,
    pub end_timestamp: u64,
}

#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct RewardClaimed {
    pub token: Pubkey,
    pub holder: Pubkey,
    /// Delegated claimer, or the holder itself.
    pub claimer: Pubkey,
    pub amount: u64,
}

#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct BridgedOut {
    pub token: Pubkey,
    pub from: Pubkey,
    /// Recipient on the remote chain.
    pub remote_to: [u8; 32],
    pub amount: u64,
}

#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct BridgedIn {
    pub token: Pubkey,
    pub instruction_id: u64,
    pub to: Pubkey,
    pub amount: u64,
    /// Minter whose signature authorised the mint.
    pub signer: Pubkey,
}

#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct BlargitrageInitialized {
    pub pool: Pubkey,
    pub base_pool: Pubkey,
    pub desired_mint: Pubkey,
    pub reusd_index: u8,
    pub desired_index: u8,
}

/// Emitted when `balance` corrects the pool.
///
/// `minted` is true for the REUSD-short direction (mint and deposit), false
/// when surplus REUSD was pulled out and burned.
#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct PoolRebalanced {
    pub minted: bool,
    /// REUSD minted, or counter asset deposited.
    pub amount: u64,
    /// Desired asset sent to the custodian, or REUSD burned.
    pub received: u64,
    pub total_amount: u64,
}

#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct Zapped {
    pub user: Pubkey,
    pub stablecoin: Pubkey,
    pub amount: u64,
    /// True when the deposit went through REUSD minting rather than the base pool.
    pub via_reusd: bool,
    pub lp_received: u64,
}

#[event]
#[cfg_attr(feature = "client", derive(Debug))]
pub struct Unzapped {
    pub user: Pubkey,
    pub lp_amount: u64,
    pub token: Pubkey,
    pub received: u64,
}
