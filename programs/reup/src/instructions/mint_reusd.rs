use crate::error::ErrorCode;
use crate::states::*;
use crate::utils::{token_mint_to, transfer_from_user_to_pool_vault};
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

/// Exchanges a registered stablecoin for REUSD at par.
///
/// Funds movement:
/// - `stable_amount` moves from the payer to the custodian's token account.
/// - `stable_amount * factor` REUSD is minted to `recipient_reusd_account`,
///   which may belong to someone other than the payer.
#[derive(Accounts)]
pub struct MintReusd<'info> {
    pub payer: Signer<'info>,

    #[account(
        mut,
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump = global_config.bump,
    )]
    pub global_config: Box<Account<'info, GlobalConfig>>,

    #[account(
        mut,
        seeds = [STABLECOIN_REGISTRY_SEED.as_bytes()],
        bump = stablecoin_registry.bump,
    )]
    pub stablecoin_registry: Box<Account<'info, StablecoinRegistry>>,

    /// CHECK: PDA derivation enforced by seeds; used only as a signer.
    #[account(
        seeds = [crate::AUTH_SEED.as_bytes()],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    pub stable_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        token::mint = stable_mint,
        token::authority = payer,
    )]
    pub payer_stable_account: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Custodian's account for this stablecoin.
    #[account(
        mut,
        token::mint = stable_mint,
        token::authority = global_config.custodian,
    )]
    pub custodian_stable_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut, address = global_config.reusd_mint)]
    pub reusd_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(mut, token::mint = reusd_mint)]
    pub recipient_reusd_account: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

/// Steps:
/// 1) Look up the stablecoin and compute the REUSD amount.
/// 2) Update minted/received totals.
/// 3) Move the stablecoin to the custodian.
/// 4) Mint REUSD to the recipient.
/// 5) Emit `ReusdMinted`.
pub fn mint_reusd(ctx: Context<MintReusd>, stable_amount: u64) -> Result<()> {
    require_gt!(stable_amount, 0, ErrorCode::ZeroAmount);
    let stable_mint = ctx.accounts.stable_mint.key();

    // --- 1) Conversion ---
    let factor = ctx
        .accounts
        .stablecoin_registry
        .get_config(&stable_mint)?
        .factor()?;
    let reusd_amount = stable_amount
        .checked_mul(factor)
        .ok_or(ErrorCode::MathOverflow)?;

    // --- 2) Totals ---
    ctx.accounts
        .stablecoin_registry
        .record_received(&stable_mint, stable_amount)?;
    let global_config = &mut ctx.accounts.global_config;
    global_config.total_minted = global_config
        .total_minted
        .checked_add(reusd_amount)
        .ok_or(ErrorCode::MathOverflow)?;

    // --- 3) Stablecoin → custodian ---
    transfer_from_user_to_pool_vault(
        ctx.accounts.payer.to_account_info(),
        ctx.accounts.payer_stable_account.to_account_info(),
        ctx.accounts.custodian_stable_account.to_account_info(),
        ctx.accounts.stable_mint.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        stable_amount,
        ctx.accounts.stable_mint.decimals,
    )?;

    // --- 4) REUSD → recipient ---
    token_mint_to(
        ctx.accounts.authority.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.reusd_mint.to_account_info(),
        ctx.accounts.recipient_reusd_account.to_account_info(),
        reusd_amount,
        &[&[crate::AUTH_SEED.as_bytes(), &[ctx.bumps.authority]]],
    )?;

    // --- 5) Event ---
    emit!(ReusdMinted {
        payer: ctx.accounts.payer.key(),
        recipient: ctx.accounts.recipient_reusd_account.owner,
        stablecoin: stable_mint,
        stable_amount,
        reusd_amount,
    });
    Ok(())
}
