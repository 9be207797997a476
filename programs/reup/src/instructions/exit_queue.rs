use crate::error::ErrorCode;
use crate::states::*;
use crate::utils::{token_burn, transfer_from_user_to_pool_vault};
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

// ──────────────────────────────────────────────────────────────────────────────
// initialise_exit_queue
// ──────────────────────────────────────────────────────────────────────────────

#[derive(Accounts)]
pub struct InitialiseExitQueue<'info> {
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

    /// CHECK: PDA derivation enforced via seeds. Not read as an account; used as Pubkey.
    #[account(
        seeds = [crate::AUTH_SEED.as_bytes()],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    #[account(
        init,
        seeds = [EXIT_QUEUE_SEED.as_bytes()],
        bump,
        payer = owner,
        space = ExitQueue::LEN
    )]
    pub exit_queue: Box<Account<'info, ExitQueue>>,

    #[account(address = global_config.reusd_mint)]
    pub reusd_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Holds REUSD waiting for redemption.
    #[account(
        init,
        seeds = [EXIT_VAULT_SEED.as_bytes()],
        bump,
        payer = owner,
        token::mint = reusd_mint,
        token::authority = authority,
        token::token_program = token_program,
    )]
    pub exit_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,

    pub system_program: Program<'info, System>,
}

pub fn initialise_exit_queue(ctx: Context<InitialiseExitQueue>) -> Result<()> {
    let exit_queue = &mut ctx.accounts.exit_queue;
    exit_queue.bump = ctx.bumps.exit_queue;
    exit_queue.contract_version = 1;
    exit_queue.exit_vault = ctx.accounts.exit_vault.key();
    exit_queue.reset_entries();
    Ok(())
}

// ──────────────────────────────────────────────────────────────────────────────
// queue_exit
// ──────────────────────────────────────────────────────────────────────────────

/// Locks REUSD in the exit vault and records a redemption request.
///
/// The queue account grows by `EXIT_QUEUE_GROWTH` slots, paid by the user,
/// when its ring is full.
#[derive(Accounts)]
pub struct QueueExit<'info> {
    #[account(mut)]
    pub user: Signer<'info>,

    #[account(
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump = global_config.bump,
    )]
    pub global_config: Box<Account<'info, GlobalConfig>>,

    #[account(
        mut,
        seeds = [EXIT_QUEUE_SEED.as_bytes()],
        bump = exit_queue.bump,
        realloc = ExitQueue::space(exit_queue.required_capacity()),
        realloc::payer = user,
        realloc::zero = false,
    )]
    pub exit_queue: Box<Account<'info, ExitQueue>>,

    #[account(mut, address = exit_queue.exit_vault)]
    pub exit_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(address = global_config.reusd_mint)]
    pub reusd_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        token::mint = reusd_mint,
        token::authority = user,
    )]
    pub user_reusd_account: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,

    pub system_program: Program<'info, System>,
}

/// # Errors
/// - `ZeroAmount`.
/// - `QueueFull` once the ring is at `MAX_EXIT_QUEUE_CAPACITY`.
/// - Token program failure when the caller's balance is too low.
pub fn queue_exit(ctx: Context<QueueExit>, amount: u64) -> Result<()> {
    let user = ctx.accounts.user.key();
    let exit_queue = &mut ctx.accounts.exit_queue;
    let index = exit_queue.queue_exit(user, amount)?;
    let total_queued = exit_queue.total_queued;

    transfer_from_user_to_pool_vault(
        ctx.accounts.user.to_account_info(),
        ctx.accounts.user_reusd_account.to_account_info(),
        ctx.accounts.exit_vault.to_account_info(),
        ctx.accounts.reusd_mint.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        amount,
        ctx.accounts.reusd_mint.decimals,
    )?;

    emit!(ExitQueued {
        user,
        index,
        amount,
        total_queued,
    });
    Ok(())
}

// ──────────────────────────────────────────────────────────────────────────────
// fund_exit_queue
// ──────────────────────────────────────────────────────────────────────────────

/// Pays queued exits from the front with a registered stablecoin.
///
/// `remaining_accounts` holds one writable stablecoin token account per
/// payout, in queue order, each owned by the queued user. Clients read the
/// queue first to know how many entries the batch will reach.
#[derive(Accounts)]
pub struct FundExitQueue<'info> {
    pub funder: Signer<'info>,

    #[account(
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump = global_config.bump,
    )]
    pub global_config: Box<Account<'info, GlobalConfig>>,

    #[account(
        seeds = [STABLECOIN_REGISTRY_SEED.as_bytes()],
        bump = stablecoin_registry.bump,
    )]
    pub stablecoin_registry: Box<Account<'info, StablecoinRegistry>>,

    #[account(
        mut,
        seeds = [EXIT_QUEUE_SEED.as_bytes()],
        bump = exit_queue.bump,
    )]
    pub exit_queue: Box<Account<'info, ExitQueue>>,

    #[account(mut, address = exit_queue.exit_vault)]
    pub exit_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut, address = global_config.reusd_mint)]
    pub reusd_mint: Box<InterfaceAccount<'info, Mint>>,

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
        token::authority = funder,
    )]
    pub funder_stable_account: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

/// Steps:
/// 1) Resolve the stablecoin's decimal factor.
/// 2) Walk the queue (state updated before any transfer).
/// 3) Pay each user from the funder.
/// 4) Burn the redeemed REUSD from the exit vault.
/// 5) Emit per-payout and summary events.
pub fn fund_exit_queue<'info>(
    ctx: Context<'_, '_, 'info, 'info, FundExitQueue<'info>>,
    stable_amount: u64,
) -> Result<()> {
    require_gt!(stable_amount, 0, ErrorCode::ZeroAmount);
    let stable_mint = ctx.accounts.stable_mint.key();

    // --- 1) Conversion factor ---
    let factor = ctx
        .accounts
        .stablecoin_registry
        .get_config(&stable_mint)?
        .factor()?;

    // --- 2) Queue walk ---
    let exit_queue = &mut ctx.accounts.exit_queue;
    let payouts = exit_queue.fund(stable_amount, factor)?;
    let queued_exit_start = exit_queue.queued_exit_start;
    let total_queued = exit_queue.total_queued;
    require_gte!(
        ctx.remaining_accounts.len(),
        payouts.len(),
        ErrorCode::MissingRemainingAccount
    );

    // --- 3) Payouts ---
    let mut stable_spent = 0u64;
    let mut reusd_redeemed = 0u64;
    for (payout, info) in payouts.iter().zip(ctx.remaining_accounts.iter()) {
        let destination = InterfaceAccount::<TokenAccount>::try_from(info)?;
        require_keys_eq!(destination.mint, stable_mint, ErrorCode::InvalidPayoutAccount);
        require_keys_eq!(destination.owner, payout.user, ErrorCode::InvalidPayoutAccount);

        transfer_from_user_to_pool_vault(
            ctx.accounts.funder.to_account_info(),
            ctx.accounts.funder_stable_account.to_account_info(),
            info.clone(),
            ctx.accounts.stable_mint.to_account_info(),
            ctx.accounts.token_program.to_account_info(),
            payout.stable_amount,
            ctx.accounts.stable_mint.decimals,
        )?;
        stable_spent += payout.stable_amount;
        reusd_redeemed += payout.reusd_amount;

        emit!(ExitPaid {
            index: payout.index,
            user: payout.user,
            stablecoin: stable_mint,
            stable_amount: payout.stable_amount,
            reusd_amount: payout.reusd_amount,
        });
    }

    // --- 4) Burn redeemed REUSD ---
    token_burn(
        ctx.accounts.authority.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        ctx.accounts.reusd_mint.to_account_info(),
        ctx.accounts.exit_vault.to_account_info(),
        reusd_redeemed,
        &[&[crate::AUTH_SEED.as_bytes(), &[ctx.bumps.authority]]],
    )?;

    // --- 5) Summary ---
    emit!(ExitQueueFunded {
        funder: ctx.accounts.funder.key(),
        stablecoin: stable_mint,
        stable_offered: stable_amount,
        stable_spent,
        reusd_redeemed,
        queued_exit_start,
        total_queued,
    });
    Ok(())
}
