use crate::error::ErrorCode;
use crate::states::{ConfigUpdated, GlobalConfig, GLOBAL_CONFIG_SEED};
use anchor_lang::prelude::*;

/// Accounts context for the `update_config` instruction.
///
/// Only the current owner stored in `global_config` may update it.
#[derive(Accounts)]
pub struct UpdateConfig<'info> {
    #[account(
        constraint = owner.key() == global_config.owner @ ErrorCode::NotOwner
    )]
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump = global_config.bump,
    )]
    pub global_config: Account<'info, GlobalConfig>,
}

/// Updates selected fields of the global configuration.
///
/// # Param Mapping
/// - `0`: **Nominate owner** → new owner Pubkey via `remaining_accounts[0]`;
///   takes effect once that key calls `claim_ownership`.
/// - `1`: **Custodian** → new custodian Pubkey via `remaining_accounts[0]`.
/// - `2`: **Cancel nomination** → clears the pending owner (`value` ignored).
///
/// Any other `param` value returns `ErrorCode::InvalidParam`.
///
/// # Errors
/// - `NotOwner`: caller is not the owner.
/// - `MissingRemainingAccount`: a key argument was not provided.
/// - `ZeroAddress`: the key argument is the default Pubkey.
pub fn update_config(ctx: Context<UpdateConfig>, param: u8, _value: u64) -> Result<()> {
    let global_config = &mut ctx.accounts.global_config;
    match param {
        0 | 1 => {
            let key = *ctx
                .remaining_accounts
                .iter()
                .next()
                .ok_or(error!(ErrorCode::MissingRemainingAccount))?
                .key;
            require_keys_neq!(key, Pubkey::default(), ErrorCode::ZeroAddress);
            if param == 0 {
                global_config.pending_owner = key;
            } else {
                global_config.custodian = key;
            }
        }
        2 => {
            global_config.pending_owner = Pubkey::default();
        }
        _ => return Err(error!(ErrorCode::InvalidParam)),
    }

    emit!(ConfigUpdated {
        owner: global_config.owner,
        pending_owner: global_config.pending_owner,
        custodian: global_config.custodian,
    });
    Ok(())
}
