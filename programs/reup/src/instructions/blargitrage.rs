use crate::curve::{RebalanceAction, RebalanceCalculator};
use crate::error::ErrorCode;
use crate::states::*;
use crate::utils::{normalize_amount, token_burn, token_mint_to, StablePool};
use crate::{BLARGITRAGE_THRESHOLD, REUSD_DECIMALS};
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

//
// ──────────────────────────────────────────────────────────────────────────────
// Shared pool plumbing (also used by the zapper)
// ──────────────────────────────────────────────────────────────────────────────
//

/// Re-reads `account` after a CPI and returns how much its balance grew.
pub(crate) fn balance_increase(
    account: &mut InterfaceAccount<'_, TokenAccount>,
    before: u64,
) -> Result<u64> {
    account.reload()?;
    let increase = account
        .amount
        .checked_sub(before)
        .ok_or(ErrorCode::MathOverflow)?;
    Ok(increase)
}

/// Orders a per-coin pair for the two-coin pool.
pub(crate) fn pool_coin_order<T>(reusd_index: u8, reusd_side: T, counter_side: T) -> Vec<T> {
    if reusd_index == 0 {
        vec![reusd_side, counter_side]
    } else {
        vec![counter_side, reusd_side]
    }
}

/// Base pool vaults from `remaining_accounts`, checked against the stored
/// layout and returned in coin order.
pub(crate) fn base_pool_vault_infos<'info>(
    remaining: &[AccountInfo<'info>],
    blargitrage: &Blargitrage,
) -> Result<Vec<AccountInfo<'info>>> {
    let count = blargitrage.base_pool_vaults.len();
    require_gte!(remaining.len(), count, ErrorCode::MissingRemainingAccount);
    remaining[..count]
        .iter()
        .zip(blargitrage.base_pool_vaults.iter())
        .map(|(info, expected)| {
            require_keys_eq!(info.key(), *expected, ErrorCode::PoolMismatch);
            Ok(info.clone())
        })
        .collect()
}

/// Sources for a single-coin base pool deposit: `source` at `index`, the
/// coin's own vault elsewhere (those legs carry a zero amount).
pub(crate) fn base_pool_sources<'info>(
    base_vaults: &[AccountInfo<'info>],
    index: u8,
    source: AccountInfo<'info>,
) -> Vec<AccountInfo<'info>> {
    let mut sources = base_vaults.to_vec();
    sources[index as usize] = source;
    sources
}

// ──────────────────────────────────────────────────────────────────────────────
// initialise_blargitrage
// ──────────────────────────────────────────────────────────────────────────────

/// Records the REUSD pool, its base pool and the desired asset, and creates
/// the rebalancer's working vaults.
///
/// `remaining_accounts` holds the base pool's coin vaults in coin order.
#[derive(Accounts)]
pub struct InitialiseBlargitrage<'info> {
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
        seeds = [BLARGITRAGE_SEED.as_bytes()],
        bump,
        payer = owner,
        space = Blargitrage::LEN
    )]
    pub blargitrage: Box<Account<'info, Blargitrage>>,

    /// CHECK: stable-swap program; must be executable.
    #[account(executable)]
    pub pool_program: UncheckedAccount<'info>,

    /// CHECK: stored as Pubkey; owned by the stable-swap program.
    #[account(owner = pool_program.key() @ ErrorCode::PoolMismatch)]
    pub pool: UncheckedAccount<'info>,

    /// CHECK: stored as Pubkey.
    pub pool_authority: UncheckedAccount<'info>,

    pub pool_lp_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Pool coin 0 vault.
    pub pool_vault_0: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Pool coin 1 vault.
    pub pool_vault_1: Box<InterfaceAccount<'info, TokenAccount>>,

    /// CHECK: stored as Pubkey; owned by the stable-swap program.
    #[account(owner = pool_program.key() @ ErrorCode::PoolMismatch)]
    pub base_pool: UncheckedAccount<'info>,

    /// CHECK: stored as Pubkey.
    pub base_pool_authority: UncheckedAccount<'info>,

    pub base_lp_mint: Box<InterfaceAccount<'info, Mint>>,

    pub desired_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(address = global_config.reusd_mint)]
    pub reusd_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        init,
        seeds = [REUSD_VAULT_SEED.as_bytes(), blargitrage.key().as_ref()],
        bump,
        payer = owner,
        token::mint = reusd_mint,
        token::authority = authority,
        token::token_program = token_program,
    )]
    pub reusd_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        init,
        seeds = [POOL_LP_VAULT_SEED.as_bytes(), blargitrage.key().as_ref()],
        bump,
        payer = owner,
        token::mint = pool_lp_mint,
        token::authority = authority,
        token::token_program = token_program,
    )]
    pub pool_lp_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        init,
        seeds = [BASE_LP_VAULT_SEED.as_bytes(), blargitrage.key().as_ref()],
        bump,
        payer = owner,
        token::mint = base_lp_mint,
        token::authority = authority,
        token::token_program = token_program,
    )]
    pub base_lp_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Desired-asset inventory spent when the pool holds surplus REUSD.
    #[account(
        init,
        seeds = [INVENTORY_VAULT_SEED.as_bytes(), blargitrage.key().as_ref()],
        bump,
        payer = owner,
        token::mint = desired_mint,
        token::authority = authority,
        token::token_program = token_program,
    )]
    pub inventory_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,

    pub system_program: Program<'info, System>,
}

/// # Errors
/// - `PoolWithoutREUSD`, `BasePoolWithREUSD`, `DesiredTokenNotInBasePool`.
/// - `PoolMismatch`: the pool's other coin is not the base pool LP token.
/// - `InvalidParameters`: base pool too small or too large.
pub fn initialise_blargitrage<'info>(
    ctx: Context<'_, '_, 'info, 'info, InitialiseBlargitrage<'info>>,
) -> Result<()> {
    // --- 1) Base pool coins ---
    let base_vault_infos = ctx.remaining_accounts;
    require!(
        base_vault_infos.len() >= 2 && base_vault_infos.len() <= MAX_BASE_POOL_COINS,
        ErrorCode::InvalidParameters
    );
    let mut base_pool_vaults = Vec::with_capacity(base_vault_infos.len());
    let mut base_pool_mints = Vec::with_capacity(base_vault_infos.len());
    for info in base_vault_infos.iter() {
        let vault = InterfaceAccount::<TokenAccount>::try_from(info)?;
        base_pool_vaults.push(info.key());
        base_pool_mints.push(vault.mint);
    }

    // --- 2) Coin indices ---
    let pool_mints = [ctx.accounts.pool_vault_0.mint, ctx.accounts.pool_vault_1.mint];
    let indices = Blargitrage::detect_indices(
        &pool_mints,
        &base_pool_mints,
        &ctx.accounts.base_lp_mint.key(),
        &ctx.accounts.reusd_mint.key(),
        &ctx.accounts.desired_mint.key(),
    )?;

    // --- 3) Persist ---
    let blargitrage = &mut ctx.accounts.blargitrage;
    blargitrage.bump = ctx.bumps.blargitrage;
    blargitrage.contract_version = 1;
    blargitrage.pool_program = ctx.accounts.pool_program.key();
    blargitrage.pool = ctx.accounts.pool.key();
    blargitrage.pool_authority = ctx.accounts.pool_authority.key();
    blargitrage.pool_lp_mint = ctx.accounts.pool_lp_mint.key();
    blargitrage.pool_vaults = [
        ctx.accounts.pool_vault_0.key(),
        ctx.accounts.pool_vault_1.key(),
    ];
    blargitrage.reusd_index = indices.reusd_index;
    blargitrage.counter_index = indices.counter_index;
    blargitrage.base_pool = ctx.accounts.base_pool.key();
    blargitrage.base_pool_authority = ctx.accounts.base_pool_authority.key();
    blargitrage.base_lp_mint = ctx.accounts.base_lp_mint.key();
    blargitrage.base_pool_vaults = base_pool_vaults;
    blargitrage.base_pool_mints = base_pool_mints;
    blargitrage.desired_mint = ctx.accounts.desired_mint.key();
    blargitrage.desired_index = indices.desired_index;
    blargitrage.desired_decimals = ctx.accounts.desired_mint.decimals;
    blargitrage.counter_decimals = ctx.accounts.base_lp_mint.decimals;
    blargitrage.total_amount = 0;

    emit!(BlargitrageInitialized {
        pool: blargitrage.pool,
        base_pool: blargitrage.base_pool,
        desired_mint: blargitrage.desired_mint,
        reusd_index: indices.reusd_index,
        desired_index: indices.desired_index,
    });
    Ok(())
}

// ──────────────────────────────────────────────────────────────────────────────
// balance
// ──────────────────────────────────────────────────────────────────────────────

/// Nudges the REUSD pool back toward par. Permissionless.
///
/// `remaining_accounts` holds the base pool's coin vaults in coin order.
#[derive(Accounts)]
pub struct Balance<'info> {
    pub caller: Signer<'info>,

    #[account(
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump = global_config.bump,
    )]
    pub global_config: Box<Account<'info, GlobalConfig>>,

    #[account(
        mut,
        seeds = [BLARGITRAGE_SEED.as_bytes()],
        bump = blargitrage.bump,
    )]
    pub blargitrage: Box<Account<'info, Blargitrage>>,

    /// CHECK: PDA derivation enforced by seeds; used only as a signer.
    #[account(
        seeds = [crate::AUTH_SEED.as_bytes()],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    /// CHECK: address checked against the stored pool program.
    #[account(address = blargitrage.pool_program @ ErrorCode::PoolMismatch)]
    pub pool_program: UncheckedAccount<'info>,

    /// CHECK: address checked; state is owned by the pool program.
    #[account(mut, address = blargitrage.pool @ ErrorCode::PoolMismatch)]
    pub pool: UncheckedAccount<'info>,

    /// CHECK: address checked.
    #[account(address = blargitrage.pool_authority @ ErrorCode::PoolMismatch)]
    pub pool_authority: UncheckedAccount<'info>,

    #[account(mut, address = blargitrage.pool_lp_mint @ ErrorCode::PoolMismatch)]
    pub pool_lp_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(mut, address = blargitrage.reusd_vault() @ ErrorCode::PoolMismatch)]
    pub reusd_pool_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(mut, address = blargitrage.counter_vault() @ ErrorCode::PoolMismatch)]
    pub counter_pool_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// CHECK: address checked; state is owned by the pool program.
    #[account(mut, address = blargitrage.base_pool @ ErrorCode::PoolMismatch)]
    pub base_pool: UncheckedAccount<'info>,

    /// CHECK: address checked.
    #[account(address = blargitrage.base_pool_authority @ ErrorCode::PoolMismatch)]
    pub base_pool_authority: UncheckedAccount<'info>,

    #[account(mut, address = blargitrage.base_lp_mint @ ErrorCode::PoolMismatch)]
    pub base_lp_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(mut, address = global_config.reusd_mint)]
    pub reusd_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        seeds = [REUSD_VAULT_SEED.as_bytes(), blargitrage.key().as_ref()],
        bump,
    )]
    pub reusd_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        seeds = [POOL_LP_VAULT_SEED.as_bytes(), blargitrage.key().as_ref()],
        bump,
    )]
    pub pool_lp_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        seeds = [BASE_LP_VAULT_SEED.as_bytes(), blargitrage.key().as_ref()],
        bump,
    )]
    pub base_lp_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        seeds = [INVENTORY_VAULT_SEED.as_bytes(), blargitrage.key().as_ref()],
        bump,
    )]
    pub inventory_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Receives the desired asset when REUSD is minted into the pool.
    #[account(
        mut,
        token::mint = blargitrage.desired_mint,
        token::authority = global_config.custodian,
    )]
    pub custodian_desired_account: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

impl<'info> Balance<'info> {
    fn pool(&self) -> StablePool<'info> {
        StablePool {
            program: self.pool_program.to_account_info(),
            pool: self.pool.to_account_info(),
            pool_authority: self.pool_authority.to_account_info(),
            lp_mint: self.pool_lp_mint.to_account_info(),
            token_program: self.token_program.to_account_info(),
        }
    }

    fn base_pool(&self) -> StablePool<'info> {
        StablePool {
            program: self.pool_program.to_account_info(),
            pool: self.base_pool.to_account_info(),
            pool_authority: self.base_pool_authority.to_account_info(),
            lp_mint: self.base_lp_mint.to_account_info(),
            token_program: self.token_program.to_account_info(),
        }
    }

    fn pool_vault_infos(&self) -> Vec<AccountInfo<'info>> {
        pool_coin_order(
            self.blargitrage.reusd_index,
            self.reusd_pool_vault.to_account_info(),
            self.counter_pool_vault.to_account_info(),
        )
    }

    /// Program-owned deposit sources, one per pool coin.
    fn pool_source_infos(&self) -> Vec<AccountInfo<'info>> {
        pool_coin_order(
            self.blargitrage.reusd_index,
            self.reusd_vault.to_account_info(),
            self.base_lp_vault.to_account_info(),
        )
    }
}

/// Steps:
/// 1) Read both pool reserves in REUSD units and plan a correction.
/// 2) REUSD short: mint, deposit, withdraw as base LP, redeem the desired
///    asset to the custodian.
/// 3) REUSD surplus: deposit desired-asset inventory through the base pool,
///    withdraw REUSD, burn it.
/// 4) Emit `PoolRebalanced`.
pub fn balance<'info>(ctx: Context<'_, '_, 'info, 'info, Balance<'info>>) -> Result<()> {
    // --- 1) Plan ---
    let reusd_reserve = ctx.accounts.reusd_pool_vault.amount;
    let counter_reserve = ctx
        .accounts
        .blargitrage
        .counter_reserve_in_reusd(ctx.accounts.counter_pool_vault.amount)?;
    let Some(action) =
        RebalanceCalculator::plan(reusd_reserve, counter_reserve, BLARGITRAGE_THRESHOLD)
    else {
        msg!(
            "pool within threshold: reusd {} counter {}",
            reusd_reserve,
            counter_reserve
        );
        return Ok(());
    };

    let base_vaults = base_pool_vault_infos(ctx.remaining_accounts, &ctx.accounts.blargitrage)?;
    let auth_bump = ctx.bumps.authority;
    let seeds: &[&[&[u8]]] = &[&[crate::AUTH_SEED.as_bytes(), &[auth_bump]]];
    let reusd_index = ctx.accounts.blargitrage.reusd_index;
    let counter_index = ctx.accounts.blargitrage.counter_index;
    let desired_index = ctx.accounts.blargitrage.desired_index;

    let (minted, amount, received) = match action {
        // --- 2) REUSD short ---
        RebalanceAction::MintAndDeposit { reusd_amount } => {
            token_mint_to(
                ctx.accounts.authority.to_account_info(),
                ctx.accounts.token_program.to_account_info(),
                ctx.accounts.reusd_mint.to_account_info(),
                ctx.accounts.reusd_vault.to_account_info(),
                reusd_amount,
                seeds,
            )?;

            let lp_before = ctx.accounts.pool_lp_vault.amount;
            ctx.accounts.pool().add_liquidity(
                &ctx.accounts.pool_vault_infos(),
                &ctx.accounts.pool_source_infos(),
                ctx.accounts.pool_lp_vault.to_account_info(),
                ctx.accounts.authority.to_account_info(),
                ctx.accounts.blargitrage.pool_amounts(reusd_index, reusd_amount),
                0,
                seeds,
            )?;
            let lp_minted = balance_increase(&mut ctx.accounts.pool_lp_vault, lp_before)?;

            let base_lp_before = ctx.accounts.base_lp_vault.amount;
            ctx.accounts.pool().remove_liquidity_one_coin(
                ctx.accounts.counter_pool_vault.to_account_info(),
                ctx.accounts.pool_lp_vault.to_account_info(),
                ctx.accounts.base_lp_vault.to_account_info(),
                ctx.accounts.authority.to_account_info(),
                lp_minted,
                counter_index,
                0,
                seeds,
            )?;
            let base_lp_received = balance_increase(&mut ctx.accounts.base_lp_vault, base_lp_before)?;

            let desired_before = ctx.accounts.custodian_desired_account.amount;
            ctx.accounts.base_pool().remove_liquidity_one_coin(
                base_vaults[desired_index as usize].clone(),
                ctx.accounts.base_lp_vault.to_account_info(),
                ctx.accounts.custodian_desired_account.to_account_info(),
                ctx.accounts.authority.to_account_info(),
                base_lp_received,
                desired_index,
                0,
                seeds,
            )?;
            let desired_received =
                balance_increase(&mut ctx.accounts.custodian_desired_account, desired_before)?;

            let blargitrage = &mut ctx.accounts.blargitrage;
            blargitrage.total_amount = blargitrage
                .total_amount
                .checked_add(desired_received)
                .ok_or(ErrorCode::MathOverflow)?;
            (true, reusd_amount, desired_received)
        }

        // --- 3) REUSD surplus ---
        RebalanceAction::WithdrawAndBurn { counter_amount } => {
            let wanted = normalize_amount(
                counter_amount,
                REUSD_DECIMALS,
                ctx.accounts.blargitrage.desired_decimals,
            )
            .ok_or(ErrorCode::MathOverflow)?;
            let desired_amount = wanted.min(ctx.accounts.inventory_vault.amount);
            if desired_amount == 0 {
                msg!("no desired-asset inventory to rebalance with");
                return Ok(());
            }

            let base_lp_before = ctx.accounts.base_lp_vault.amount;
            ctx.accounts.base_pool().add_liquidity(
                &base_vaults,
                &base_pool_sources(
                    &base_vaults,
                    desired_index,
                    ctx.accounts.inventory_vault.to_account_info(),
                ),
                ctx.accounts.base_lp_vault.to_account_info(),
                ctx.accounts.authority.to_account_info(),
                ctx.accounts
                    .blargitrage
                    .base_pool_amounts(desired_index, desired_amount),
                0,
                seeds,
            )?;
            let base_lp_minted = balance_increase(&mut ctx.accounts.base_lp_vault, base_lp_before)?;

            let lp_before = ctx.accounts.pool_lp_vault.amount;
            ctx.accounts.pool().add_liquidity(
                &ctx.accounts.pool_vault_infos(),
                &ctx.accounts.pool_source_infos(),
                ctx.accounts.pool_lp_vault.to_account_info(),
                ctx.accounts.authority.to_account_info(),
                ctx.accounts
                    .blargitrage
                    .pool_amounts(counter_index, base_lp_minted),
                0,
                seeds,
            )?;
            let lp_minted = balance_increase(&mut ctx.accounts.pool_lp_vault, lp_before)?;

            let reusd_before = ctx.accounts.reusd_vault.amount;
            ctx.accounts.pool().remove_liquidity_one_coin(
                ctx.accounts.reusd_pool_vault.to_account_info(),
                ctx.accounts.pool_lp_vault.to_account_info(),
                ctx.accounts.reusd_vault.to_account_info(),
                ctx.accounts.authority.to_account_info(),
                lp_minted,
                reusd_index,
                0,
                seeds,
            )?;
            let reusd_received = balance_increase(&mut ctx.accounts.reusd_vault, reusd_before)?;

            token_burn(
                ctx.accounts.authority.to_account_info(),
                ctx.accounts.token_program.to_account_info(),
                ctx.accounts.reusd_mint.to_account_info(),
                ctx.accounts.reusd_vault.to_account_info(),
                reusd_received,
                seeds,
            )?;
            (false, base_lp_minted, reusd_received)
        }
    };

    // --- 4) Event ---
    emit!(PoolRebalanced {
        minted,
        amount,
        received,
        total_amount: ctx.accounts.blargitrage.total_amount,
    });
    Ok(())
}

#[cfg(test)]
mod blargitrage_instruction_tests {
    use super::*;

    #[test]
    fn pool_coin_order_follows_reusd_index() {
        assert_eq!(pool_coin_order(0, "reusd", "lp"), vec!["reusd", "lp"]);
        assert_eq!(pool_coin_order(1, "reusd", "lp"), vec!["lp", "reusd"]);
    }
}
