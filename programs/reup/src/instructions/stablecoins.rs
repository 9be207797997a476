use crate::error::ErrorCode;
use crate::states::*;
use anchor_lang::prelude::*;
use anchor_spl::token_interface::Mint;

/// Registers a stablecoin accepted for REUSD minting and exit queue funding.
#[derive(Accounts)]
pub struct AddStablecoin<'info> {
    #[account(
        constraint = owner.key() == global_config.owner @ ErrorCode::NotOwner
    )]
    pub owner: Signer<'info>,

    #[account(
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump = global_config.bump,
    )]
    pub global_config: Account<'info, GlobalConfig>,

    #[account(
        mut,
        seeds = [STABLECOIN_REGISTRY_SEED.as_bytes()],
        bump = stablecoin_registry.bump,
    )]
    pub stablecoin_registry: Account<'info, StablecoinRegistry>,

    /// Stablecoin mint; its decimals are recorded.
    pub mint: Box<InterfaceAccount<'info, Mint>>,
}

/// # Errors
/// - `TokenNotSupported`: mint has more decimals than REUSD.
/// - `StablecoinAlreadyExists`, `RegistryFull`.
pub fn add_stablecoin(ctx: Context<AddStablecoin>, baked_in: bool) -> Result<()> {
    let mint = ctx.accounts.mint.key();
    let decimals = ctx.accounts.mint.decimals;
    ctx.accounts
        .stablecoin_registry
        .add(mint, decimals, baked_in)?;

    emit!(StablecoinAdded {
        mint,
        decimals,
        baked_in,
    });
    Ok(())
}

#[derive(Accounts)]
pub struct RemoveStablecoin<'info> {
    #[account(
        constraint = owner.key() == global_config.owner @ ErrorCode::NotOwner
    )]
    pub owner: Signer<'info>,

    #[account(
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump = global_config.bump,
    )]
    pub global_config: Account<'info, GlobalConfig>,

    #[account(
        mut,
        seeds = [STABLECOIN_REGISTRY_SEED.as_bytes()],
        bump = stablecoin_registry.bump,
    )]
    pub stablecoin_registry: Account<'info, StablecoinRegistry>,
}

/// # Errors
/// - `StablecoinDoesNotExist`, `StablecoinBakedIn`.
pub fn remove_stablecoin(ctx: Context<RemoveStablecoin>, mint: Pubkey) -> Result<()> {
    ctx.accounts.stablecoin_registry.remove(&mint)?;
    emit!(StablecoinRemoved { mint });
    Ok(())
}
