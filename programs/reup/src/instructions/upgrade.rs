use crate::error::ErrorCode;
use crate::states::*;
use anchor_lang::prelude::*;

/// Moves one component account to a newer contract version.
///
/// The target account is passed writable in `remaining_accounts[0]`; its type
/// is selected by `kind`.
#[derive(Accounts)]
pub struct Upgrade<'info> {
    #[account(
        constraint = owner.key() == global_config.owner @ ErrorCode::NotOwner
    )]
    pub owner: Signer<'info>,

    #[account(
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump = global_config.bump,
    )]
    pub global_config: Account<'info, GlobalConfig>,
}

fn upgrade_account<'info, T>(info: &'info AccountInfo<'info>, request: &UpgradeRequest) -> Result<u64>
where
    T: AccountSerialize + AccountDeserialize + Owner + Clone + Versioned,
{
    let mut account = Account::<T>::try_from(info)?;
    let previous = account.upgrade(request)?;
    account.exit(&crate::ID)?;
    Ok(previous)
}

/// Runs the component's pre-upgrade hook and bumps its version.
///
/// # Errors
/// - `NotOwner`: caller is not the owner.
/// - `MissingRemainingAccount`: no target account.
/// - `UpgradeToSameVersion` / `UpgradeToOlderVersion`: version does not increase.
/// - `WrongRewardToken`: a self-staking token would change reward mint.
pub fn upgrade<'info>(
    ctx: Context<'_, '_, 'info, 'info, Upgrade<'info>>,
    kind: UpgradeKind,
    next_version: u64,
    reward_mint: Pubkey,
) -> Result<()> {
    let target = ctx
        .remaining_accounts
        .first()
        .ok_or(error!(ErrorCode::MissingRemainingAccount))?;
    let request = UpgradeRequest {
        next_version,
        reward_mint,
    };

    let previous_version = match kind {
        UpgradeKind::GlobalConfig => {
            require_keys_eq!(
                target.key(),
                ctx.accounts.global_config.key(),
                ErrorCode::InvalidParam
            );
            upgrade_account::<GlobalConfig>(target, &request)?
        }
        UpgradeKind::StablecoinRegistry => upgrade_account::<StablecoinRegistry>(target, &request)?,
        UpgradeKind::ExitQueue => upgrade_account::<ExitQueue>(target, &request)?,
        UpgradeKind::SelfStaking => upgrade_account::<SelfStakingToken>(target, &request)?,
        UpgradeKind::Blargitrage => upgrade_account::<Blargitrage>(target, &request)?,
    };

    emit!(ContractUpgraded {
        kind,
        account: target.key(),
        previous_version,
        new_version: next_version,
    });
    Ok(())
}
