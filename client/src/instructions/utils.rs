use anchor_lang::AccountDeserialize;
use anyhow::Result;
use reup::states::{
    BASE_LP_VAULT_SEED, BLARGITRAGE_SEED, BRIDGE_RECEIPT_SEED, EXIT_QUEUE_SEED, EXIT_VAULT_SEED,
    GLOBAL_CONFIG_SEED, HOLDER_SEED, INVENTORY_VAULT_SEED, POOL_LP_VAULT_SEED, REUSD_VAULT_SEED,
    REWARD_VAULT_SEED, STABLECOIN_REGISTRY_SEED,
};
use solana_sdk::{account::Account, pubkey::Pubkey};

pub fn deserialize_anchor_account<T: AccountDeserialize>(account: &Account) -> Result<T> {
    let mut data: &[u8] = &account.data;
    T::try_deserialize(&mut data).map_err(Into::into)
}

pub fn get_global_config_address(program_id: &Pubkey) -> Pubkey {
    let (global_config, _bump) =
        Pubkey::find_program_address(&[GLOBAL_CONFIG_SEED.as_bytes()], program_id);
    global_config
}

pub fn get_stablecoin_registry_address(program_id: &Pubkey) -> Pubkey {
    let (registry, _bump) =
        Pubkey::find_program_address(&[STABLECOIN_REGISTRY_SEED.as_bytes()], program_id);
    registry
}

pub fn get_authority_address(program_id: &Pubkey) -> Pubkey {
    let (authority, _bump) =
        Pubkey::find_program_address(&[reup::AUTH_SEED.as_bytes()], program_id);
    authority
}

pub fn get_reusd_mint_address(program_id: &Pubkey) -> Pubkey {
    let (mint, _bump) =
        Pubkey::find_program_address(&[reup::REUSD_MINT_SEED.as_bytes()], program_id);
    mint
}

pub fn get_exit_queue_address(program_id: &Pubkey) -> Pubkey {
    let (exit_queue, _bump) =
        Pubkey::find_program_address(&[EXIT_QUEUE_SEED.as_bytes()], program_id);
    exit_queue
}

pub fn get_exit_vault_address(program_id: &Pubkey) -> Pubkey {
    let (exit_vault, _bump) =
        Pubkey::find_program_address(&[EXIT_VAULT_SEED.as_bytes()], program_id);
    exit_vault
}

pub fn get_reward_vault_address(token: &Pubkey, program_id: &Pubkey) -> Pubkey {
    let (vault, _bump) = Pubkey::find_program_address(
        &[REWARD_VAULT_SEED.as_bytes(), token.as_ref()],
        program_id,
    );
    vault
}

pub fn get_holder_address(token: &Pubkey, owner: &Pubkey, program_id: &Pubkey) -> Pubkey {
    let (holder, _bump) = Pubkey::find_program_address(
        &[HOLDER_SEED.as_bytes(), token.as_ref(), owner.as_ref()],
        program_id,
    );
    holder
}

pub fn get_bridge_receipt_address(token: &Pubkey, instruction_id: u64, program_id: &Pubkey) -> Pubkey {
    let (receipt, _bump) = Pubkey::find_program_address(
        &[
            BRIDGE_RECEIPT_SEED.as_bytes(),
            token.as_ref(),
            &instruction_id.to_le_bytes(),
        ],
        program_id,
    );
    receipt
}

pub fn get_blargitrage_address(program_id: &Pubkey) -> Pubkey {
    let (blargitrage, _bump) =
        Pubkey::find_program_address(&[BLARGITRAGE_SEED.as_bytes()], program_id);
    blargitrage
}

/// Working vault of the rebalancer derived from `seed`.
pub fn get_blargitrage_vault_address(seed: &str, program_id: &Pubkey) -> Pubkey {
    let blargitrage = get_blargitrage_address(program_id);
    let (vault, _bump) =
        Pubkey::find_program_address(&[seed.as_bytes(), blargitrage.as_ref()], program_id);
    vault
}

pub fn get_rebalance_vaults(program_id: &Pubkey) -> [Pubkey; 4] {
    [
        REUSD_VAULT_SEED,
        POOL_LP_VAULT_SEED,
        BASE_LP_VAULT_SEED,
        INVENTORY_VAULT_SEED,
    ]
    .map(|seed| get_blargitrage_vault_address(seed, program_id))
}

/// Parses a 32-byte remote address given as hex, with or without `0x`.
pub fn parse_remote_address(s: &str) -> Result<[u8; 32]> {
    let raw = hex::decode(s.trim_start_matches("0x"))?;
    let mut out = [0u8; 32];
    anyhow::ensure!(raw.len() <= 32, "remote address longer than 32 bytes");
    // left-pad shorter (e.g. 20-byte) addresses
    out[32 - raw.len()..].copy_from_slice(&raw);
    Ok(out)
}

#[cfg(test)]
mod utils_tests {
    use super::*;

    #[test]
    fn remote_addresses_are_left_padded() {
        let parsed = parse_remote_address("0x00000000000000000000000000000000000000ff").unwrap();
        assert_eq!(parsed[31], 0xff);
        assert!(parsed[..31].iter().all(|b| *b == 0));
        assert!(parse_remote_address(&"11".repeat(33)).is_err());
    }

    #[test]
    fn holder_addresses_differ_per_token() {
        let program = reup::id();
        let owner = Pubkey::new_unique();
        assert_ne!(
            get_holder_address(&Pubkey::new_unique(), &owner, &program),
            get_holder_address(&Pubkey::new_unique(), &owner, &program)
        );
    }
}
