use anchor_lang::prelude::*;

declare_id!("9MmegajB48tH5J6dWfpdXR3eVk7R8NDhnZZcPhvSMuEf");

pub mod admin {
    use anchor_lang::prelude::declare_id;
    declare_id!("9GoeYh7fsaVRfigKzqAhtWsiuF9VCSPSXnu8EqzfQox9");
}

pub const AUTH_SEED: &str = "reup_authority";
pub const REUSD_MINT_SEED: &str = "reusd_mint";
pub const REUSD_DECIMALS: u8 = 9;
pub const PRECISION: u128 = 1_000_000_000;
/// Fixed-point scale of the reward accumulator.
pub const REWARD_SCALE: u128 = PRECISION * PRECISION;
/// Pool imbalance, in REUSD base units, below which `balance` does nothing.
pub const BLARGITRAGE_THRESHOLD: u64 = 1_000 * 1_000_000_000;

pub mod curve;
pub mod error;
pub mod instructions;
pub mod states;
pub mod utils;

use instructions::*;
use states::{Role, UpgradeKind};

#[program]
pub mod reup {

    use super::*;

    // ── configuration ──

    pub fn initialise_config(ctx: Context<InitialiseConfig>, custodian: Pubkey) -> Result<()> {
        instructions::initialise_config(ctx, custodian)
    }

    pub fn update_config(ctx: Context<UpdateConfig>, param: u8, value: u64) -> Result<()> {
        instructions::update_config(ctx, param, value)
    }

    pub fn claim_ownership(ctx: Context<ClaimOwnership>) -> Result<()> {
        instructions::claim_ownership(ctx)
    }

    pub fn upgrade<'info>(
        ctx: Context<'_, '_, 'info, 'info, Upgrade<'info>>,
        kind: UpgradeKind,
        next_version: u64,
        reward_mint: Pubkey,
    ) -> Result<()> {
        instructions::upgrade(ctx, kind, next_version, reward_mint)
    }

    // ── stablecoins and REUSD ──

    pub fn add_stablecoin(ctx: Context<AddStablecoin>, baked_in: bool) -> Result<()> {
        instructions::add_stablecoin(ctx, baked_in)
    }

    pub fn remove_stablecoin(ctx: Context<RemoveStablecoin>, mint: Pubkey) -> Result<()> {
        instructions::remove_stablecoin(ctx, mint)
    }

    pub fn mint_reusd(ctx: Context<MintReusd>, stable_amount: u64) -> Result<()> {
        instructions::mint_reusd(ctx, stable_amount)
    }

    // ── exit queue ──

    pub fn initialise_exit_queue(ctx: Context<InitialiseExitQueue>) -> Result<()> {
        instructions::initialise_exit_queue(ctx)
    }

    pub fn queue_exit(ctx: Context<QueueExit>, amount: u64) -> Result<()> {
        instructions::queue_exit(ctx, amount)
    }

    pub fn fund_exit_queue<'info>(
        ctx: Context<'_, '_, 'info, 'info, FundExitQueue<'info>>,
        stable_amount: u64,
    ) -> Result<()> {
        instructions::fund_exit_queue(ctx, stable_amount)
    }

    // ── self-staking tokens ──

    pub fn initialise_self_staking(ctx: Context<InitialiseSelfStaking>, decimals: u8) -> Result<()> {
        instructions::initialise_self_staking(ctx, decimals)
    }

    pub fn set_role(ctx: Context<SetRole>, role: Role, who: Pubkey, enabled: bool) -> Result<()> {
        instructions::set_role(ctx, role, who, enabled)
    }

    pub fn set_excluded(ctx: Context<SetExcluded>, excluded: bool) -> Result<()> {
        instructions::set_excluded(ctx, excluded)
    }

    pub fn mint_self_staking(ctx: Context<MintSelfStaking>, amount: u64) -> Result<()> {
        instructions::mint_self_staking(ctx, amount)
    }

    pub fn burn_self_staking(ctx: Context<BurnSelfStaking>, amount: u64) -> Result<()> {
        instructions::burn_self_staking(ctx, amount)
    }

    pub fn transfer_self_staking(ctx: Context<TransferSelfStaking>, amount: u64) -> Result<()> {
        instructions::transfer_self_staking(ctx, amount)
    }

    pub fn add_reward(
        ctx: Context<AddReward>,
        amount: u64,
        start_timestamp: u64,
        end_timestamp: u64,
    ) -> Result<()> {
        instructions::add_reward(ctx, amount, start_timestamp, end_timestamp)
    }

    pub fn claim_reward(ctx: Context<ClaimReward>) -> Result<()> {
        instructions::claim_reward(ctx)
    }

    pub fn claim_reward_for(ctx: Context<ClaimRewardFor>) -> Result<()> {
        instructions::claim_reward_for(ctx)
    }

    // ── bridge ──

    pub fn bridge_out(ctx: Context<BridgeOut>, amount: u64, remote_to: [u8; 32]) -> Result<()> {
        instructions::bridge_out(ctx, amount, remote_to)
    }

    pub fn bridge_in(
        ctx: Context<BridgeIn>,
        instruction_id: u64,
        amount: u64,
        deadline: i64,
    ) -> Result<()> {
        instructions::bridge_in(ctx, instruction_id, amount, deadline)
    }

    // ── pools ──

    pub fn initialise_blargitrage<'info>(
        ctx: Context<'_, '_, 'info, 'info, InitialiseBlargitrage<'info>>,
    ) -> Result<()> {
        instructions::initialise_blargitrage(ctx)
    }

    pub fn balance<'info>(ctx: Context<'_, '_, 'info, 'info, Balance<'info>>) -> Result<()> {
        instructions::balance(ctx)
    }

    pub fn zap<'info>(
        ctx: Context<'_, '_, 'info, 'info, Zap<'info>>,
        amount: u64,
        mint_reusd: bool,
    ) -> Result<()> {
        instructions::zap(ctx, amount, mint_reusd)
    }

    pub fn balanced_zap<'info>(
        ctx: Context<'_, '_, 'info, 'info, Zap<'info>>,
        amount: u64,
    ) -> Result<()> {
        instructions::balanced_zap(ctx, amount)
    }

    pub fn unzap(ctx: Context<Unzap>, lp_amount: u64) -> Result<()> {
        instructions::unzap(ctx, lp_amount)
    }
}
