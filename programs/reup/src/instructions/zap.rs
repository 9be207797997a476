use super::blargitrage::{balance_increase, base_pool_sources, base_pool_vault_infos, pool_coin_order};
use crate::error::ErrorCode;
use crate::states::*;
use crate::utils::{token_mint_to, transfer_from_user_to_pool_vault, StablePool};
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

//
// ──────────────────────────────────────────────────────────────────────────────
// One-step deposits into, and withdrawals out of, the REUSD pool
// ──────────────────────────────────────────────────────────────────────────────
//

/// Turns a stablecoin into REUSD pool LP in one instruction.
///
/// Routes:
/// - REUSD itself is deposited directly.
/// - A registered stablecoin with `mint_reusd` is minted into REUSD first.
/// - A base pool coin is deposited into the base pool and the resulting base
///   LP goes into the REUSD pool.
///
/// `remaining_accounts` holds the base pool's coin vaults in coin order
/// whenever the base pool route is taken.
#[derive(Accounts)]
pub struct Zap<'info> {
    pub user: Signer<'info>,

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

    #[account(
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

    /// Token the user deposits.
    pub stable_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        token::mint = stable_mint,
        token::authority = user,
    )]
    pub user_stable_account: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Needed when the deposit is minted into REUSD.
    #[account(
        mut,
        token::mint = stable_mint,
        token::authority = global_config.custodian,
    )]
    pub custodian_stable_account: Option<Box<InterfaceAccount<'info, TokenAccount>>>,

    /// Receives freshly minted REUSD. Omitted when depositing REUSD directly.
    #[account(
        mut,
        token::mint = reusd_mint,
        token::authority = user,
    )]
    pub user_reusd_account: Option<Box<InterfaceAccount<'info, TokenAccount>>>,

    #[account(
        mut,
        token::mint = base_lp_mint,
        token::authority = user,
    )]
    pub user_base_lp_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        token::mint = pool_lp_mint,
        token::authority = user,
    )]
    pub user_lp_account: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

impl<'info> Zap<'info> {
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

    /// Account REUSD is deposited from: the stablecoin account itself when
    /// the user zaps REUSD, then the user's REUSD account, then the pool's own
    /// vault for a zero REUSD leg.
    fn reusd_source(&self) -> AccountInfo<'info> {
        if self.stable_mint.key() == self.reusd_mint.key() {
            return self.user_stable_account.to_account_info();
        }
        match self.user_reusd_account.as_ref() {
            Some(account) => account.to_account_info(),
            None => self.reusd_pool_vault.to_account_info(),
        }
    }

    /// Mints REUSD to the user against `amount` of a registered stablecoin
    /// paid to the custodian. Returns the REUSD amount.
    fn mint_reusd_for_user(&mut self, amount: u64, auth_bump: u8) -> Result<u64> {
        let stable_mint = self.stable_mint.key();
        let factor = self
            .stablecoin_registry
            .get_config(&stable_mint)?
            .factor()?;
        let reusd_amount = amount.checked_mul(factor).ok_or(ErrorCode::MathOverflow)?;
        self.stablecoin_registry
            .record_received(&stable_mint, amount)?;
        self.global_config.total_minted = self
            .global_config
            .total_minted
            .checked_add(reusd_amount)
            .ok_or(ErrorCode::MathOverflow)?;

        let custodian = self
            .custodian_stable_account
            .as_ref()
            .ok_or(ErrorCode::InvalidParameters)?;
        let user_reusd = self
            .user_reusd_account
            .as_ref()
            .ok_or(ErrorCode::InvalidParameters)?;

        transfer_from_user_to_pool_vault(
            self.user.to_account_info(),
            self.user_stable_account.to_account_info(),
            custodian.to_account_info(),
            self.stable_mint.to_account_info(),
            self.token_program.to_account_info(),
            amount,
            self.stable_mint.decimals,
        )?;
        token_mint_to(
            self.authority.to_account_info(),
            self.token_program.to_account_info(),
            self.reusd_mint.to_account_info(),
            user_reusd.to_account_info(),
            reusd_amount,
            &[&[crate::AUTH_SEED.as_bytes(), &[auth_bump]]],
        )?;

        emit!(ReusdMinted {
            payer: self.user.key(),
            recipient: self.user.key(),
            stablecoin: stable_mint,
            stable_amount: amount,
            reusd_amount,
        });
        Ok(reusd_amount)
    }

    /// Deposits `amount` of a base pool coin into the base pool. Returns the
    /// base LP received by the user.
    fn deposit_into_base_pool(
        &mut self,
        base_vaults: &[AccountInfo<'info>],
        amount: u64,
    ) -> Result<u64> {
        let index = self
            .blargitrage
            .base_coin_index(&self.stable_mint.key())
            .ok_or(ErrorCode::UnsupportedToken)?;

        let before = self.user_base_lp_account.amount;
        self.base_pool().add_liquidity(
            base_vaults,
            &base_pool_sources(base_vaults, index, self.user_stable_account.to_account_info()),
            self.user_base_lp_account.to_account_info(),
            self.user.to_account_info(),
            self.blargitrage.base_pool_amounts(index, amount),
            0,
            &[],
        )?;
        balance_increase(&mut self.user_base_lp_account, before)
    }

    /// Deposits into the REUSD pool from the user's accounts. Returns the LP
    /// received.
    fn deposit_into_pool(&mut self, reusd_amount: u64, base_lp_amount: u64) -> Result<u64> {
        let reusd_index = self.blargitrage.reusd_index;
        let vaults = pool_coin_order(
            reusd_index,
            self.reusd_pool_vault.to_account_info(),
            self.counter_pool_vault.to_account_info(),
        );
        let sources = pool_coin_order(
            reusd_index,
            self.reusd_source(),
            self.user_base_lp_account.to_account_info(),
        );
        let amounts = pool_coin_order(reusd_index, reusd_amount, base_lp_amount);

        let before = self.user_lp_account.amount;
        self.pool().add_liquidity(
            &vaults,
            &sources,
            self.user_lp_account.to_account_info(),
            self.user.to_account_info(),
            amounts,
            0,
            &[],
        )?;
        balance_increase(&mut self.user_lp_account, before)
    }
}

/// # Errors
/// - `ZeroAmount`.
/// - `TokenNotSupported`: `mint_reusd` with an unregistered stablecoin.
/// - `UnsupportedToken`: neither REUSD nor a base pool coin.
pub fn zap<'info>(
    ctx: Context<'_, '_, 'info, 'info, Zap<'info>>,
    amount: u64,
    mint_reusd: bool,
) -> Result<()> {
    require_gt!(amount, 0, ErrorCode::ZeroAmount);
    let accounts = &mut *ctx.accounts;
    let is_reusd = accounts.stable_mint.key() == accounts.reusd_mint.key();

    let lp_received = if is_reusd {
        accounts.deposit_into_pool(amount, 0)?
    } else if mint_reusd {
        let reusd_amount = accounts.mint_reusd_for_user(amount, ctx.bumps.authority)?;
        accounts.deposit_into_pool(reusd_amount, 0)?
    } else {
        let base_vaults = base_pool_vault_infos(ctx.remaining_accounts, &accounts.blargitrage)?;
        let base_lp = accounts.deposit_into_base_pool(&base_vaults, amount)?;
        accounts.deposit_into_pool(0, base_lp)?
    };

    emit!(Zapped {
        user: accounts.user.key(),
        stablecoin: accounts.stable_mint.key(),
        amount,
        via_reusd: is_reusd || mint_reusd,
        lp_received,
    });
    Ok(())
}

/// Splits `amount` between the REUSD mint route and the base pool route and
/// makes a single two-sided pool deposit.
///
/// The stablecoin must be both registered and a base pool coin.
pub fn balanced_zap<'info>(
    ctx: Context<'_, '_, 'info, 'info, Zap<'info>>,
    amount: u64,
) -> Result<()> {
    require_gt!(amount, 1, ErrorCode::ZeroAmount);
    let accounts = &mut *ctx.accounts;
    require_keys_neq!(
        accounts.stable_mint.key(),
        accounts.reusd_mint.key(),
        ErrorCode::UnsupportedToken
    );

    let via_reusd = amount / 2;
    let via_base = amount - via_reusd;
    let base_vaults = base_pool_vault_infos(ctx.remaining_accounts, &accounts.blargitrage)?;

    let reusd_amount = accounts.mint_reusd_for_user(via_reusd, ctx.bumps.authority)?;
    let base_lp = accounts.deposit_into_base_pool(&base_vaults, via_base)?;
    let lp_received = accounts.deposit_into_pool(reusd_amount, base_lp)?;

    emit!(Zapped {
        user: accounts.user.key(),
        stablecoin: accounts.stable_mint.key(),
        amount,
        via_reusd: true,
        lp_received,
    });
    Ok(())
}

// ──────────────────────────────────────────────────────────────────────────────
// unzap
// ──────────────────────────────────────────────────────────────────────────────

/// Burns REUSD pool LP for REUSD or for one base pool coin.
#[derive(Accounts)]
pub struct Unzap<'info> {
    pub user: Signer<'info>,

    #[account(
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump = global_config.bump,
    )]
    pub global_config: Box<Account<'info, GlobalConfig>>,

    #[account(
        seeds = [BLARGITRAGE_SEED.as_bytes()],
        bump = blargitrage.bump,
    )]
    pub blargitrage: Box<Account<'info, Blargitrage>>,

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

    /// Token the user withdraws.
    pub out_mint: Box<InterfaceAccount<'info, Mint>>,

    /// CHECK: base pool vault of `out_mint`; checked against the stored layout
    /// in the handler. Omitted when withdrawing REUSD.
    #[account(mut)]
    pub base_coin_vault: Option<UncheckedAccount<'info>>,

    #[account(
        mut,
        token::mint = pool_lp_mint,
        token::authority = user,
    )]
    pub user_lp_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        token::mint = base_lp_mint,
        token::authority = user,
    )]
    pub user_base_lp_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        token::mint = out_mint,
        token::authority = user,
    )]
    pub user_out_account: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

impl<'info> Unzap<'info> {
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
}

/// # Errors
/// - `ZeroAmount`.
/// - `UnsupportedToken`: `out_mint` is neither REUSD nor a base pool coin.
/// - `PoolMismatch`: `base_coin_vault` missing or not the coin's vault.
pub fn unzap(ctx: Context<Unzap>, lp_amount: u64) -> Result<()> {
    require_gt!(lp_amount, 0, ErrorCode::ZeroAmount);
    let accounts = &mut *ctx.accounts;
    let out_mint = accounts.out_mint.key();
    let out_before = accounts.user_out_account.amount;

    if out_mint == accounts.global_config.reusd_mint {
        accounts.pool().remove_liquidity_one_coin(
            accounts.reusd_pool_vault.to_account_info(),
            accounts.user_lp_account.to_account_info(),
            accounts.user_out_account.to_account_info(),
            accounts.user.to_account_info(),
            lp_amount,
            accounts.blargitrage.reusd_index,
            0,
            &[],
        )?;
    } else {
        let index = accounts
            .blargitrage
            .base_coin_index(&out_mint)
            .ok_or(ErrorCode::UnsupportedToken)?;
        let coin_vault = accounts
            .base_coin_vault
            .as_ref()
            .ok_or(ErrorCode::PoolMismatch)?
            .to_account_info();
        require_keys_eq!(
            coin_vault.key(),
            accounts.blargitrage.base_pool_vaults[index as usize],
            ErrorCode::PoolMismatch
        );

        let base_lp_before = accounts.user_base_lp_account.amount;
        accounts.pool().remove_liquidity_one_coin(
            accounts.counter_pool_vault.to_account_info(),
            accounts.user_lp_account.to_account_info(),
            accounts.user_base_lp_account.to_account_info(),
            accounts.user.to_account_info(),
            lp_amount,
            accounts.blargitrage.counter_index,
            0,
            &[],
        )?;
        let base_lp = balance_increase(&mut accounts.user_base_lp_account, base_lp_before)?;

        accounts.base_pool().remove_liquidity_one_coin(
            coin_vault,
            accounts.user_base_lp_account.to_account_info(),
            accounts.user_out_account.to_account_info(),
            accounts.user.to_account_info(),
            base_lp,
            index,
            0,
            &[],
        )?;
    }
    let received = balance_increase(&mut accounts.user_out_account, out_before)?;

    emit!(Unzapped {
        user: accounts.user.key(),
        lp_amount,
        token: out_mint,
        received,
    });
    Ok(())
}
