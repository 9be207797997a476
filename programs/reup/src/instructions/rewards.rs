use crate::error::ErrorCode;
use crate::states::*;
use crate::utils::{current_timestamp, transfer_from_pool_vault_to_user, transfer_from_user_to_pool_vault};
use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_interface::{Mint, TokenAccount, TokenInterface},
};

// ──────────────────────────────────────────────────────────────────────────────
// add_reward
// ──────────────────────────────────────────────────────────────────────────────

/// Funds a new reward window on a self-staking token.
///
/// Leftover from the previous window (reserve minus what holders are owed)
/// is folded into the new one.
#[derive(Accounts)]
pub struct AddReward<'info> {
    #[account(
        constraint = token.has_role(Role::RewardManager, &manager.key()) @ ErrorCode::NotRewardManager
    )]
    pub manager: Signer<'info>,

    #[account(mut)]
    pub token: Box<Account<'info, SelfStakingToken>>,

    #[account(address = token.reward_mint @ ErrorCode::WrongRewardToken)]
    pub reward_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(mut, address = token.reward_vault)]
    pub reward_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        token::mint = reward_mint,
        token::authority = manager,
    )]
    pub manager_reward_account: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

/// # Errors
/// - `InvalidParameters`: end past `u32::MAX` or not after the effective start.
/// - `TooMuch`: the new window would overflow the reward accumulator.
pub fn add_reward(
    ctx: Context<AddReward>,
    amount: u64,
    start_timestamp: u64,
    end_timestamp: u64,
) -> Result<()> {
    let now = current_timestamp()?;
    let token = &mut ctx.accounts.token;
    token.add_reward(amount, start_timestamp, end_timestamp, now)?;

    transfer_from_user_to_pool_vault(
        ctx.accounts.manager.to_account_info(),
        ctx.accounts.manager_reward_account.to_account_info(),
        ctx.accounts.reward_vault.to_account_info(),
        ctx.accounts.reward_mint.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        amount,
        ctx.accounts.reward_mint.decimals,
    )?;

    emit!(RewardAdded {
        token: token.key(),
        amount,
        amount_to_distribute: token.amount_to_distribute,
        start_timestamp: token.start_timestamp,
        end_timestamp: token.end_timestamp,
    });
    Ok(())
}

// ──────────────────────────────────────────────────────────────────────────────
// claim_reward
// ──────────────────────────────────────────────────────────────────────────────

/// Pays the caller's settled rewards to their reward-mint ATA.
#[derive(Accounts)]
pub struct ClaimReward<'info> {
    /// Holder claiming rewards (payer for ATA creation if needed).
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(mut)]
    pub token: Box<Account<'info, SelfStakingToken>>,

    #[account(
        mut,
        seeds = [HOLDER_SEED.as_bytes(), token.key().as_ref(), owner.key().as_ref()],
        bump = holder.bump,
    )]
    pub holder: Box<Account<'info, HolderAccount>>,

    /// CHECK: PDA derivation enforced by seeds; used only as a signer.
    #[account(
        seeds = [crate::AUTH_SEED.as_bytes()],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    #[account(address = token.reward_mint @ ErrorCode::WrongRewardToken)]
    pub reward_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(mut, address = token.reward_vault)]
    pub reward_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Created on demand to receive rewards.
    #[account(
        init_if_needed,
        payer = owner,
        associated_token::mint = reward_mint,
        associated_token::authority = owner,
        associated_token::token_program = token_program,
    )]
    pub owner_reward_account: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,

    pub associated_token_program: Program<'info, AssociatedToken>,

    pub system_program: Program<'info, System>,
}

pub fn claim_reward(ctx: Context<ClaimReward>) -> Result<()> {
    let now = current_timestamp()?;
    let holder = &mut ctx.accounts.holder;
    let amount = ctx.accounts.token.claim(holder, now)?;

    transfer_from_pool_vault_to_user(
        ctx.accounts.authority.to_account_info(),
        ctx.accounts.reward_vault.to_account_info(),
        ctx.accounts.owner_reward_account.to_account_info(),
        ctx.accounts.reward_mint.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        amount,
        ctx.accounts.reward_mint.decimals,
        &[&[crate::AUTH_SEED.as_bytes(), &[ctx.bumps.authority]]],
    )?;

    emit!(RewardClaimed {
        token: ctx.accounts.token.key(),
        holder: holder.owner,
        claimer: holder.owner,
        amount,
    });
    Ok(())
}

// ──────────────────────────────────────────────────────────────────────────────
// claim_reward_for
// ──────────────────────────────────────────────────────────────────────────────

/// Claims on behalf of a holder. Tokens still go to the holder.
#[derive(Accounts)]
pub struct ClaimRewardFor<'info> {
    #[account(
        constraint = token.has_role(Role::DelegatedClaimer, &claimer.key()) @ ErrorCode::NotDelegatedClaimer
    )]
    pub claimer: Signer<'info>,

    #[account(mut)]
    pub token: Box<Account<'info, SelfStakingToken>>,

    /// CHECK: identity key only; seeds the holder record.
    pub holder_owner: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [HOLDER_SEED.as_bytes(), token.key().as_ref(), holder_owner.key().as_ref()],
        bump = holder.bump,
    )]
    pub holder: Box<Account<'info, HolderAccount>>,

    /// CHECK: PDA derivation enforced by seeds; used only as a signer.
    #[account(
        seeds = [crate::AUTH_SEED.as_bytes()],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    #[account(address = token.reward_mint @ ErrorCode::WrongRewardToken)]
    pub reward_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(mut, address = token.reward_vault)]
    pub reward_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        token::mint = reward_mint,
        token::authority = holder_owner,
    )]
    pub holder_reward_account: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn claim_reward_for(ctx: Context<ClaimRewardFor>) -> Result<()> {
    let now = current_timestamp()?;
    let holder = &mut ctx.accounts.holder;
    let amount = ctx.accounts.token.claim(holder, now)?;

    transfer_from_pool_vault_to_user(
        ctx.accounts.authority.to_account_info(),
        ctx.accounts.reward_vault.to_account_info(),
        ctx.accounts.holder_reward_account.to_account_info(),
        ctx.accounts.reward_mint.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        amount,
        ctx.accounts.reward_mint.decimals,
        &[&[crate::AUTH_SEED.as_bytes(), &[ctx.bumps.authority]]],
    )?;

    emit!(RewardClaimed {
        token: ctx.accounts.token.key(),
        holder: holder.owner,
        claimer: ctx.accounts.claimer.key(),
        amount,
    });
    Ok(())
}
