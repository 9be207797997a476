use crate::error::ErrorCode;
use crate::states::Versioned;
use crate::utils::decimal_factor;
use crate::REUSD_DECIMALS;
use anchor_lang::prelude::*;

pub const STABLECOIN_REGISTRY_SEED: &str = "stablecoin_registry";

/// Maximum number of registered stablecoins.
pub const MAX_STABLECOINS: usize = 8;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct StablecoinEntry {
    pub mint: Pubkey,
    pub decimals: u8,
    /// Built-in entries cannot be removed.
    pub baked_in: bool,
    /// Stablecoin received from REUSD minting, in the coin's own units.
    pub total_received: u64,
}

impl StablecoinEntry {
    /// REUSD units per stablecoin base unit.
    pub fn factor(&self) -> Result<u64> {
        decimal_factor(self.decimals, REUSD_DECIMALS).ok_or_else(|| error!(ErrorCode::TokenNotSupported))
    }
}

/// Stablecoins accepted for minting REUSD and funding the exit queue.
#[account]
#[derive(Default, Debug)]
pub struct StablecoinRegistry {
    pub bump: u8,
    pub contract_version: u64,
    pub stablecoins: Vec<StablecoinEntry>,
}

impl StablecoinRegistry {
    /// Breakdown: discriminator, bump, version, vector prefix and entries of 32 + 1 + 1 + 8.
    pub const LEN: usize = 8 + 1 + 8 + 4 + MAX_STABLECOINS * (32 + 1 + 1 + 8);

    fn position(&self, mint: &Pubkey) -> Option<usize> {
        self.stablecoins.iter().position(|s| s.mint == *mint)
    }

    pub fn get_config(&self, mint: &Pubkey) -> Result<&StablecoinEntry> {
        self.stablecoins
            .iter()
            .find(|s| s.mint == *mint)
            .ok_or_else(|| error!(ErrorCode::TokenNotSupported))
    }

    pub fn add(&mut self, mint: Pubkey, decimals: u8, baked_in: bool) -> Result<()> {
        require_keys_neq!(mint, Pubkey::default(), ErrorCode::ZeroAddress);
        require!(
            decimals <= REUSD_DECIMALS,
            ErrorCode::TokenNotSupported
        );
        require!(
            self.position(&mint).is_none(),
            ErrorCode::StablecoinAlreadyExists
        );
        require!(
            self.stablecoins.len() < MAX_STABLECOINS,
            ErrorCode::RegistryFull
        );
        self.stablecoins.push(StablecoinEntry {
            mint,
            decimals,
            baked_in,
            total_received: 0,
        });
        Ok(())
    }

    pub fn remove(&mut self, mint: &Pubkey) -> Result<()> {
        let index = self
            .position(mint)
            .ok_or(ErrorCode::StablecoinDoesNotExist)?;
        require!(
            !self.stablecoins[index].baked_in,
            ErrorCode::StablecoinBakedIn
        );
        self.stablecoins.remove(index);
        Ok(())
    }

    pub fn record_received(&mut self, mint: &Pubkey, amount: u64) -> Result<()> {
        let index = self.position(mint).ok_or(ErrorCode::TokenNotSupported)?;
        let entry = &mut self.stablecoins[index];
        entry.total_received = entry
            .total_received
            .checked_add(amount)
            .ok_or(ErrorCode::MathOverflow)?;
        Ok(())
    }
}

impl Versioned for StablecoinRegistry {
    fn contract_version(&self) -> u64 {
        self.contract_version
    }

    fn set_contract_version(&mut self, version: u64) {
        self.contract_version = version;
    }
}

#[cfg(test)]
mod registry_tests {
    use super::*;

    #[test]
    fn add_get_remove() {
        let mut r = StablecoinRegistry::default();
        let usdc = Pubkey::new_unique();
        let dai = Pubkey::new_unique();
        r.add(usdc, 6, true).unwrap();
        r.add(dai, 9, false).unwrap();

        assert_eq!(r.get_config(&usdc).unwrap().factor().unwrap(), 1_000);
        assert_eq!(r.get_config(&dai).unwrap().factor().unwrap(), 1);

        assert_eq!(
            r.add(dai, 9, false).unwrap_err(),
            error!(ErrorCode::StablecoinAlreadyExists)
        );
        assert_eq!(
            r.remove(&usdc).unwrap_err(),
            error!(ErrorCode::StablecoinBakedIn)
        );
        r.remove(&dai).unwrap();
        assert_eq!(
            r.remove(&dai).unwrap_err(),
            error!(ErrorCode::StablecoinDoesNotExist)
        );
        assert_eq!(
            r.get_config(&dai).unwrap_err(),
            error!(ErrorCode::TokenNotSupported)
        );
        assert!(r.get_config(&usdc).is_ok());
    }

    #[test]
    fn rejects_unrepresentable_decimals_and_overflowing_registry() {
        let mut r = StablecoinRegistry::default();
        assert_eq!(
            r.add(Pubkey::new_unique(), 18, false).unwrap_err(),
            error!(ErrorCode::TokenNotSupported)
        );
        assert_eq!(
            r.add(Pubkey::default(), 6, false).unwrap_err(),
            error!(ErrorCode::ZeroAddress)
        );
        for _ in 0..MAX_STABLECOINS {
            r.add(Pubkey::new_unique(), 6, false).unwrap();
        }
        assert_eq!(
            r.add(Pubkey::new_unique(), 6, false).unwrap_err(),
            error!(ErrorCode::RegistryFull)
        );
    }

    #[test]
    fn received_totals_accumulate() {
        let mut r = StablecoinRegistry::default();
        let usdc = Pubkey::new_unique();
        r.add(usdc, 6, false).unwrap();
        r.record_received(&usdc, 5).unwrap();
        r.record_received(&usdc, 7).unwrap();
        assert_eq!(r.get_config(&usdc).unwrap().total_received, 12);
        assert!(r.record_received(&Pubkey::new_unique(), 1).is_err());
    }
}
