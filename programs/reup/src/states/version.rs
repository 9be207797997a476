use crate::error::ErrorCode;
use anchor_lang::prelude::*;

/// Component account targeted by an `upgrade` instruction.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpgradeKind {
    GlobalConfig,
    StablecoinRegistry,
    ExitQueue,
    SelfStaking,
    Blargitrage,
}

/// What a new program build announces about itself when it takes over an account.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpgradeRequest {
    pub next_version: u64,
    /// Reward mint the new build expects; only meaningful for self-staking tokens.
    pub reward_mint: Pubkey,
}

/// Version ladder shared by every component account.
///
/// `Active(v)` moves to `Active(next)` only when `next > v` and the
/// component's own `before_upgrade` hook accepts the request.
pub trait Versioned {
    fn contract_version(&self) -> u64;

    fn set_contract_version(&mut self, version: u64);

    /// Component-specific validation run before the version changes.
    fn before_upgrade(&self, _request: &UpgradeRequest) -> Result<()> {
        Ok(())
    }

    /// Applies the upgrade and returns the version that was replaced.
    fn upgrade(&mut self, request: &UpgradeRequest) -> Result<u64> {
        let current = self.contract_version();
        require!(
            request.next_version != current,
            ErrorCode::UpgradeToSameVersion
        );
        require_gt!(
            request.next_version,
            current,
            ErrorCode::UpgradeToOlderVersion
        );
        self.before_upgrade(request)?;
        self.set_contract_version(request.next_version);
        Ok(current)
    }
}

#[cfg(test)]
mod version_tests {
    use super::*;

    #[derive(Default)]
    struct Component {
        version: u64,
        locked: bool,
    }

    impl Versioned for Component {
        fn contract_version(&self) -> u64 {
            self.version
        }

        fn set_contract_version(&mut self, version: u64) {
            self.version = version;
        }

        fn before_upgrade(&self, _request: &UpgradeRequest) -> Result<()> {
            require!(!self.locked, ErrorCode::WrongRewardToken);
            Ok(())
        }
    }

    fn request(next_version: u64) -> UpgradeRequest {
        UpgradeRequest {
            next_version,
            reward_mint: Pubkey::default(),
        }
    }

    #[test]
    fn strictly_increasing_versions_are_accepted() {
        let mut c = Component {
            version: 1,
            ..Default::default()
        };
        assert_eq!(c.upgrade(&request(2)).unwrap(), 1);
        assert_eq!(c.upgrade(&request(2_000_000_000)).unwrap(), 2);
        assert_eq!(c.contract_version(), 2_000_000_000);
    }

    #[test]
    fn same_or_older_version_is_rejected() {
        let mut c = Component {
            version: 5,
            ..Default::default()
        };
        assert_eq!(
            c.upgrade(&request(5)).unwrap_err(),
            error!(ErrorCode::UpgradeToSameVersion)
        );
        assert_eq!(
            c.upgrade(&request(4)).unwrap_err(),
            error!(ErrorCode::UpgradeToOlderVersion)
        );
        assert_eq!(c.contract_version(), 5);
    }

    #[test]
    fn failing_hook_keeps_the_old_version() {
        let mut c = Component {
            version: 1,
            locked: true,
        };
        assert_eq!(
            c.upgrade(&request(2)).unwrap_err(),
            error!(ErrorCode::WrongRewardToken)
        );
        assert_eq!(c.contract_version(), 1);
    }
}
