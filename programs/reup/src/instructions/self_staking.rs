use crate::error::ErrorCode;
use crate::states::*;
use crate::utils::current_timestamp;
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

//
// ──────────────────────────────────────────────────────────────────────────────
// Self-staking token administration and ledger movements
// ──────────────────────────────────────────────────────────────────────────────
//

/// Creates a self-staking token and its reward vault.
///
/// `token` is a fresh keypair account; its key identifies the ledger in every
/// holder, vault and bridge receipt PDA.
#[derive(Accounts)]
pub struct InitialiseSelfStaking<'info> {
    #[account(
        mut,
        constraint = owner.key() == global_config.owner @ ErrorCode::NotOwner
    )]
    pub owner: Signer<'info>,

    #[account(
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump = global_config.bump,
    )]
    pub global_config: Box<Account<'info, GlobalConfig>>,

    #[account(
        init,
        payer = owner,
        space = SelfStakingToken::LEN
    )]
    pub token: Box<Account<'info, SelfStakingToken>>,

    /// CHECK: PDA derivation enforced via seeds. Not read as an account; used as Pubkey.
    #[account(
        seeds = [crate::AUTH_SEED.as_bytes()],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    pub reward_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        init,
        seeds = [REWARD_VAULT_SEED.as_bytes(), token.key().as_ref()],
        bump,
        payer = owner,
        token::mint = reward_mint,
        token::authority = authority,
        token::token_program = token_program,
    )]
    pub reward_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,

    pub system_program: Program<'info, System>,
}

pub fn initialise_self_staking(ctx: Context<InitialiseSelfStaking>, decimals: u8) -> Result<()> {
    let token = &mut ctx.accounts.token;
    token.contract_version = 1;
    token.owner = ctx.accounts.owner.key();
    token.reward_mint = ctx.accounts.reward_mint.key();
    token.reward_vault = ctx.accounts.reward_vault.key();
    token.decimals = decimals;

    emit!(SelfStakingInitialized {
        token: token.key(),
        owner: token.owner,
        reward_mint: token.reward_mint,
        decimals,
    });
    Ok(())
}

// ──────────────────────────────────────────────────────────────────────────────
// set_role
// ──────────────────────────────────────────────────────────────────────────────

#[derive(Accounts)]
pub struct SetRole<'info> {
    pub owner: Signer<'info>,

    #[account(mut)]
    pub token: Box<Account<'info, SelfStakingToken>>,
}

/// Grants or revokes a role on a self-staking token.
///
/// # Errors
/// - `NotMinterOwner`: non-owner changing minters.
/// - `NotSelfStakingERC20Owner`: non-owner changing any other role.
/// - `ZeroAddress`, `RoleListFull`.
pub fn set_role(ctx: Context<SetRole>, role: Role, who: Pubkey, enabled: bool) -> Result<()> {
    let token = &mut ctx.accounts.token;
    if ctx.accounts.owner.key() != token.owner {
        return match role {
            Role::Minter => err!(ErrorCode::NotMinterOwner),
            _ => err!(ErrorCode::NotSelfStakingERC20Owner),
        };
    }

    if token.set_role(role, who, enabled)? {
        emit!(RoleUpdated {
            token: token.key(),
            role,
            who,
            enabled,
        });
    }
    Ok(())
}

// ──────────────────────────────────────────────────────────────────────────────
// set_excluded
// ──────────────────────────────────────────────────────────────────────────────

/// Moves a holder in or out of the staking supply.
#[derive(Accounts)]
pub struct SetExcluded<'info> {
    #[account(
        mut,
        constraint = owner.key() == token.owner @ ErrorCode::NotSelfStakingERC20Owner
    )]
    pub owner: Signer<'info>,

    #[account(mut)]
    pub token: Box<Account<'info, SelfStakingToken>>,

    /// CHECK: identity key only; seeds the holder record.
    pub holder_owner: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        seeds = [HOLDER_SEED.as_bytes(), token.key().as_ref(), holder_owner.key().as_ref()],
        bump,
        payer = owner,
        space = HolderAccount::LEN
    )]
    pub holder: Box<Account<'info, HolderAccount>>,

    pub system_program: Program<'info, System>,
}

/// Settles the holder, then toggles exclusion. Excluding forfeits the
/// holder's unclaimed rewards into the next window.
pub fn set_excluded(ctx: Context<SetExcluded>, excluded: bool) -> Result<()> {
    let now = current_timestamp()?;
    let token_key = ctx.accounts.token.key();
    let holder = &mut ctx.accounts.holder;
    holder.bind(ctx.bumps.holder, token_key, ctx.accounts.holder_owner.key());

    let token = &mut ctx.accounts.token;
    if token.set_excluded(holder, excluded, now)? {
        emit!(ExclusionUpdated {
            token: token_key,
            holder: holder.owner,
            excluded,
            staking_supply: token.staking_supply,
        });
    }
    Ok(())
}

// ──────────────────────────────────────────────────────────────────────────────
// mint_self_staking
// ──────────────────────────────────────────────────────────────────────────────

#[derive(Accounts)]
pub struct MintSelfStaking<'info> {
    #[account(
        mut,
        constraint = token.has_role(Role::Minter, &minter.key()) @ ErrorCode::NotMinter
    )]
    pub minter: Signer<'info>,

    #[account(mut)]
    pub token: Box<Account<'info, SelfStakingToken>>,

    /// CHECK: identity key only; seeds the holder record.
    pub recipient: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        seeds = [HOLDER_SEED.as_bytes(), token.key().as_ref(), recipient.key().as_ref()],
        bump,
        payer = minter,
        space = HolderAccount::LEN
    )]
    pub holder: Box<Account<'info, HolderAccount>>,

    pub system_program: Program<'info, System>,
}

pub fn mint_self_staking(ctx: Context<MintSelfStaking>, amount: u64) -> Result<()> {
    require_gt!(amount, 0, ErrorCode::ZeroAmount);
    let now = current_timestamp()?;
    let token_key = ctx.accounts.token.key();
    let holder = &mut ctx.accounts.holder;
    holder.bind(ctx.bumps.holder, token_key, ctx.accounts.recipient.key());

    ctx.accounts.token.mint(holder, amount, now)?;

    emit!(SelfStakingTransfer {
        token: token_key,
        from: Pubkey::default(),
        to: holder.owner,
        amount,
    });
    Ok(())
}

// ──────────────────────────────────────────────────────────────────────────────
// burn_self_staking
// ──────────────────────────────────────────────────────────────────────────────

#[derive(Accounts)]
pub struct BurnSelfStaking<'info> {
    pub owner: Signer<'info>,

    #[account(mut)]
    pub token: Box<Account<'info, SelfStakingToken>>,

    #[account(
        mut,
        seeds = [HOLDER_SEED.as_bytes(), token.key().as_ref(), owner.key().as_ref()],
        bump = holder.bump,
    )]
    pub holder: Box<Account<'info, HolderAccount>>,
}

pub fn burn_self_staking(ctx: Context<BurnSelfStaking>, amount: u64) -> Result<()> {
    require_gt!(amount, 0, ErrorCode::ZeroAmount);
    let now = current_timestamp()?;
    let holder = &mut ctx.accounts.holder;
    ctx.accounts.token.burn(holder, amount, now)?;

    emit!(SelfStakingTransfer {
        token: ctx.accounts.token.key(),
        from: holder.owner,
        to: Pubkey::default(),
        amount,
    });
    Ok(())
}

// ──────────────────────────────────────────────────────────────────────────────
// transfer_self_staking
// ──────────────────────────────────────────────────────────────────────────────

#[derive(Accounts)]
pub struct TransferSelfStaking<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(mut)]
    pub token: Box<Account<'info, SelfStakingToken>>,

    #[account(
        mut,
        seeds = [HOLDER_SEED.as_bytes(), token.key().as_ref(), owner.key().as_ref()],
        bump = from_holder.bump,
    )]
    pub from_holder: Box<Account<'info, HolderAccount>>,

    /// CHECK: identity key only; seeds the receiving holder record.
    #[account(
        constraint = recipient.key() != owner.key() @ ErrorCode::InvalidParam
    )]
    pub recipient: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        seeds = [HOLDER_SEED.as_bytes(), token.key().as_ref(), recipient.key().as_ref()],
        bump,
        payer = owner,
        space = HolderAccount::LEN
    )]
    pub to_holder: Box<Account<'info, HolderAccount>>,

    pub system_program: Program<'info, System>,
}

/// Settles sender and recipient, then moves `amount`. A zero amount only
/// settles both sides.
pub fn transfer_self_staking(ctx: Context<TransferSelfStaking>, amount: u64) -> Result<()> {
    let now = current_timestamp()?;
    let token_key = ctx.accounts.token.key();
    let to_holder = &mut ctx.accounts.to_holder;
    to_holder.bind(ctx.bumps.to_holder, token_key, ctx.accounts.recipient.key());
    let from_holder = &mut ctx.accounts.from_holder;

    ctx.accounts
        .token
        .transfer(from_holder, to_holder, amount, now)?;

    emit!(SelfStakingTransfer {
        token: token_key,
        from: from_holder.owner,
        to: to_holder.owner,
        amount,
    });
    Ok(())
}
