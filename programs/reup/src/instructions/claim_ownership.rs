use crate::error::ErrorCode;
use crate::states::{GlobalConfig, OwnershipTransferred, GLOBAL_CONFIG_SEED};
use anchor_lang::prelude::*;

/// Second step of an ownership transfer: the nominated key takes over.
#[derive(Accounts)]
pub struct ClaimOwnership<'info> {
    #[account(
        constraint = new_owner.key() == global_config.pending_owner @ ErrorCode::NotOwner
    )]
    pub new_owner: Signer<'info>,

    #[account(
        mut,
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump = global_config.bump,
    )]
    pub global_config: Account<'info, GlobalConfig>,
}

pub fn claim_ownership(ctx: Context<ClaimOwnership>) -> Result<()> {
    let global_config = &mut ctx.accounts.global_config;
    let previous_owner = global_config.owner;
    global_config.owner = ctx.accounts.new_owner.key();
    global_config.pending_owner = Pubkey::default();

    emit!(OwnershipTransferred {
        previous_owner,
        new_owner: global_config.owner,
    });
    Ok(())
}
