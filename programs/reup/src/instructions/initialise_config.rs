use crate::error::ErrorCode;
use crate::states::*;
use crate::{REUSD_DECIMALS, REUSD_MINT_SEED};
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenInterface};

/// Accounts context for `initialise_config`.
///
/// Creates the global configuration, the empty stablecoin registry and the
/// REUSD mint. The mint authority is the program authority PDA, so REUSD can
/// only be minted by this program.
#[derive(Accounts)]
pub struct InitialiseConfig<'info> {
    /// Deployer signer (must match the program-level admin id); becomes the owner.
    #[account(
        mut,
        address = crate::admin::id() @ ErrorCode::NotOwner
    )]
    pub owner: Signer<'info>,

    /// Program authority PDA, mint authority of REUSD.
    ///
    /// CHECK: PDA derivation enforced via seeds. Not read as an account; used as Pubkey.
    #[account(
        seeds = [crate::AUTH_SEED.as_bytes()],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    #[account(
        init,
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump,
        payer = owner,
        space = GlobalConfig::LEN
    )]
    pub global_config: Account<'info, GlobalConfig>,

    #[account(
        init,
        seeds = [STABLECOIN_REGISTRY_SEED.as_bytes()],
        bump,
        payer = owner,
        space = StablecoinRegistry::LEN
    )]
    pub stablecoin_registry: Account<'info, StablecoinRegistry>,

    /// REUSD mint, created here.
    #[account(
        init,
        seeds = [REUSD_MINT_SEED.as_bytes()],
        bump,
        payer = owner,
        mint::decimals = REUSD_DECIMALS,
        mint::authority = authority,
        mint::token_program = token_program,
    )]
    pub reusd_mint: Box<InterfaceAccount<'info, Mint>>,

    pub token_program: Interface<'info, TokenInterface>,

    pub system_program: Program<'info, System>,
}

/// Initializes the protocol.
///
/// Steps:
/// 1. Validate the custodian.
/// 2. Write the global configuration (version 1).
/// 3. Start the stablecoin registry at version 1.
/// 4. Emit `GlobalConfigInitialized`.
pub fn initialise_config(ctx: Context<InitialiseConfig>, custodian: Pubkey) -> Result<()> {
    // --- 1) Validate ---
    require_keys_neq!(custodian, Pubkey::default(), ErrorCode::ZeroAddress);

    // --- 2) Global configuration ---
    let global_config = &mut ctx.accounts.global_config;
    global_config.bump = ctx.bumps.global_config;
    global_config.contract_version = 1;
    global_config.owner = ctx.accounts.owner.key();
    global_config.pending_owner = Pubkey::default();
    global_config.custodian = custodian;
    global_config.reusd_mint = ctx.accounts.reusd_mint.key();
    global_config.total_minted = 0;

    // --- 3) Registry ---
    let registry = &mut ctx.accounts.stablecoin_registry;
    registry.bump = ctx.bumps.stablecoin_registry;
    registry.contract_version = 1;
    registry.stablecoins = Vec::new();

    // --- 4) Event ---
    emit!(GlobalConfigInitialized {
        owner: global_config.owner,
        custodian,
        reusd_mint: global_config.reusd_mint,
    });
    Ok(())
}
