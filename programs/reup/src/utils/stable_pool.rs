//! CPI surface of the external stable-swap program holding the REUSD pool
//! and its base pool.
//!
//! `add_liquidity` accounts:
//! 0. pool (writable)
//! 1. pool authority
//! 2. LP mint (writable)
//! 3. LP destination (writable)
//! 4. owner (signer)
//! 5. token program
//! 6.. one `(vault, source)` writable pair per pool coin, in coin order
//!
//! `remove_liquidity_one_coin` accounts:
//! 0. pool (writable)
//! 1. pool authority
//! 2. LP mint (writable)
//! 3. LP source (writable)
//! 4. owner (signer)
//! 5. token program
//! 6. vault of the withdrawn coin (writable)
//! 7. destination (writable)

use anchor_lang::prelude::*;
use anchor_lang::solana_program::hash::hash;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::solana_program::program::invoke_signed;

#[derive(AnchorSerialize, AnchorDeserialize, Debug, PartialEq)]
pub struct AddLiquidity {
    pub amounts: Vec<u64>,
    pub min_mint_amount: u64,
}

#[derive(AnchorSerialize, AnchorDeserialize, Debug, PartialEq)]
pub struct RemoveLiquidityOneCoin {
    pub lp_amount: u64,
    pub index: u8,
    pub min_amount_out: u64,
}

/// Anchor-style payload: `sha256("global:<name>")[..8]` followed by borsh args.
pub fn instruction_data<T: AnchorSerialize>(name: &str, args: &T) -> Result<Vec<u8>> {
    let preimage = format!("global:{}", name);
    let mut data = hash(preimage.as_bytes()).to_bytes()[..8].to_vec();
    args.serialize(&mut data)
        .map_err(|_| ProgramError::InvalidInstructionData)?;
    Ok(data)
}

/// Accounts identifying one pool of the external program.
pub struct StablePool<'info> {
    pub program: AccountInfo<'info>,
    pub pool: AccountInfo<'info>,
    pub pool_authority: AccountInfo<'info>,
    pub lp_mint: AccountInfo<'info>,
    pub token_program: AccountInfo<'info>,
}

impl<'info> StablePool<'info> {
    fn header_metas(&self, lp_account: &AccountInfo<'info>, owner: &AccountInfo<'info>) -> Vec<AccountMeta> {
        vec![
            AccountMeta::new(self.pool.key(), false),
            AccountMeta::new_readonly(self.pool_authority.key(), false),
            AccountMeta::new(self.lp_mint.key(), false),
            AccountMeta::new(lp_account.key(), false),
            AccountMeta::new_readonly(owner.key(), true),
            AccountMeta::new_readonly(self.token_program.key(), false),
        ]
    }

    fn header_infos(&self, lp_account: &AccountInfo<'info>, owner: &AccountInfo<'info>) -> Vec<AccountInfo<'info>> {
        vec![
            self.pool.clone(),
            self.pool_authority.clone(),
            self.lp_mint.clone(),
            lp_account.clone(),
            owner.clone(),
            self.token_program.clone(),
        ]
    }

    /// Deposits `amounts[i]` of coin `i` from `sources[i]`; LP tokens go to
    /// `lp_destination`. `vaults` and `sources` are in pool coin order.
    #[allow(clippy::too_many_arguments)]
    pub fn add_liquidity(
        &self,
        vaults: &[AccountInfo<'info>],
        sources: &[AccountInfo<'info>],
        lp_destination: AccountInfo<'info>,
        owner: AccountInfo<'info>,
        amounts: Vec<u64>,
        min_mint_amount: u64,
        signer_seeds: &[&[&[u8]]],
    ) -> Result<()> {
        require_eq!(vaults.len(), sources.len());
        require_eq!(vaults.len(), amounts.len());

        let mut metas = self.header_metas(&lp_destination, &owner);
        let mut infos = self.header_infos(&lp_destination, &owner);
        for (vault, source) in vaults.iter().zip(sources.iter()) {
            metas.push(AccountMeta::new(vault.key(), false));
            metas.push(AccountMeta::new(source.key(), false));
            infos.push(vault.clone());
            infos.push(source.clone());
        }
        infos.push(self.program.clone());

        let ix = Instruction {
            program_id: self.program.key(),
            accounts: metas,
            data: instruction_data(
                "add_liquidity",
                &AddLiquidity {
                    amounts,
                    min_mint_amount,
                },
            )?,
        };
        invoke_signed(&ix, &infos, signer_seeds)?;
        Ok(())
    }

    /// Burns `lp_amount` LP tokens for coin `index` only.
    #[allow(clippy::too_many_arguments)]
    pub fn remove_liquidity_one_coin(
        &self,
        coin_vault: AccountInfo<'info>,
        lp_source: AccountInfo<'info>,
        destination: AccountInfo<'info>,
        owner: AccountInfo<'info>,
        lp_amount: u64,
        index: u8,
        min_amount_out: u64,
        signer_seeds: &[&[&[u8]]],
    ) -> Result<()> {
        let mut metas = self.header_metas(&lp_source, &owner);
        let mut infos = self.header_infos(&lp_source, &owner);
        metas.push(AccountMeta::new(coin_vault.key(), false));
        metas.push(AccountMeta::new(destination.key(), false));
        infos.push(coin_vault);
        infos.push(destination);
        infos.push(self.program.clone());

        let ix = Instruction {
            program_id: self.program.key(),
            accounts: metas,
            data: instruction_data(
                "remove_liquidity_one_coin",
                &RemoveLiquidityOneCoin {
                    lp_amount,
                    index,
                    min_amount_out,
                },
            )?,
        };
        invoke_signed(&ix, &infos, signer_seeds)?;
        Ok(())
    }
}

#[cfg(test)]
mod stable_pool_tests {
    use super::*;

    #[test]
    fn add_liquidity_payload_layout() {
        let data = instruction_data(
            "add_liquidity",
            &AddLiquidity {
                amounts: vec![0, 1_000],
                min_mint_amount: 0,
            },
        )
        .unwrap();

        assert_eq!(&data[..8], &hash(b"global:add_liquidity").to_bytes()[..8]);
        // vec length prefix, two amounts, min mint
        assert_eq!(data.len(), 8 + 4 + 8 * 2 + 8);
        assert_eq!(&data[8..12], &2u32.to_le_bytes());
        assert_eq!(&data[20..28], &1_000u64.to_le_bytes());
    }

    #[test]
    fn remove_one_coin_payload_round_trips() {
        let args = RemoveLiquidityOneCoin {
            lp_amount: 12_345,
            index: 1,
            min_amount_out: 7,
        };
        let data = instruction_data("remove_liquidity_one_coin", &args).unwrap();
        assert_eq!(
            &data[..8],
            &hash(b"global:remove_liquidity_one_coin").to_bytes()[..8]
        );
        let decoded = RemoveLiquidityOneCoin::deserialize(&mut &data[8..]).unwrap();
        assert_eq!(decoded, args);
    }
}
