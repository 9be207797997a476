use anchor_client::{Client, Cluster, Program};
use anchor_lang::prelude::AccountMeta;
use anyhow::Result;
use solana_sdk::{
    ed25519_program,
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    system_program,
};
use spl_associated_token_account::get_associated_token_address;
use std::rc::Rc;

use reup::accounts as reup_accounts;
use reup::instruction as reup_instructions;
use reup::states::{Blargitrage, ExitPayout, GlobalConfig, Role, UpgradeKind};
use reup::utils::BridgeInMessage;

use super::utils::*;
use super::super::{read_keypair_file, ClientConfig};

fn program(config: &ClientConfig) -> Result<Program<Rc<Keypair>>> {
    let payer = read_keypair_file(&config.payer_path)?;
    let url = Cluster::Custom(config.http_url.clone(), config.ws_url.clone());
    let client = Client::new(url, Rc::new(payer));
    Ok(client.program(config.reup_program)?)
}

// ── configuration ──

pub fn initialise_config_instr(config: &ClientConfig, custodian: Pubkey) -> Result<Vec<Instruction>> {
    let program = program(config)?;
    let instructions = program
        .request()
        .accounts(reup_accounts::InitialiseConfig {
            owner: program.payer(),
            authority: get_authority_address(&program.id()),
            global_config: get_global_config_address(&program.id()),
            stablecoin_registry: get_stablecoin_registry_address(&program.id()),
            reusd_mint: get_reusd_mint_address(&program.id()),
            token_program: spl_token::id(),
            system_program: system_program::id(),
        })
        .args(reup_instructions::InitialiseConfig { custodian })
        .instructions()?;
    Ok(instructions)
}

/// `target` is appended as the account the parameter refers to (new owner
/// or custodian).
pub fn update_config_instr(
    config: &ClientConfig,
    param: u8,
    value: u64,
    target: Option<Pubkey>,
) -> Result<Vec<Instruction>> {
    let program = program(config)?;
    let mut ixs = program
        .request()
        .accounts(reup_accounts::UpdateConfig {
            owner: program.payer(),
            global_config: get_global_config_address(&program.id()),
        })
        .args(reup_instructions::UpdateConfig { param, value })
        .instructions()?;

    if let Some(target) = target {
        ixs[0]
            .accounts
            .push(AccountMeta::new_readonly(target, false));
    }
    Ok(ixs)
}

pub fn claim_ownership_instr(config: &ClientConfig) -> Result<Vec<Instruction>> {
    let program = program(config)?;
    let ixs = program
        .request()
        .accounts(reup_accounts::ClaimOwnership {
            new_owner: program.payer(),
            global_config: get_global_config_address(&program.id()),
        })
        .args(reup_instructions::ClaimOwnership {})
        .instructions()?;
    Ok(ixs)
}

pub fn upgrade_instr(
    config: &ClientConfig,
    kind: UpgradeKind,
    target: Pubkey,
    next_version: u64,
    reward_mint: Pubkey,
) -> Result<Vec<Instruction>> {
    let program = program(config)?;
    let mut ixs = program
        .request()
        .accounts(reup_accounts::Upgrade {
            owner: program.payer(),
            global_config: get_global_config_address(&program.id()),
        })
        .args(reup_instructions::Upgrade {
            kind,
            next_version,
            reward_mint,
        })
        .instructions()?;
    ixs[0].accounts.push(AccountMeta::new(target, false));
    Ok(ixs)
}

// ── stablecoins and REUSD ──

pub fn add_stablecoin_instr(config: &ClientConfig, mint: Pubkey, baked_in: bool) -> Result<Vec<Instruction>> {
    let program = program(config)?;
    let ixs = program
        .request()
        .accounts(reup_accounts::AddStablecoin {
            owner: program.payer(),
            global_config: get_global_config_address(&program.id()),
            stablecoin_registry: get_stablecoin_registry_address(&program.id()),
            mint,
        })
        .args(reup_instructions::AddStablecoin { baked_in })
        .instructions()?;
    Ok(ixs)
}

pub fn remove_stablecoin_instr(config: &ClientConfig, mint: Pubkey) -> Result<Vec<Instruction>> {
    let program = program(config)?;
    let ixs = program
        .request()
        .accounts(reup_accounts::RemoveStablecoin {
            owner: program.payer(),
            global_config: get_global_config_address(&program.id()),
            stablecoin_registry: get_stablecoin_registry_address(&program.id()),
        })
        .args(reup_instructions::RemoveStablecoin { mint })
        .instructions()?;
    Ok(ixs)
}

pub fn mint_reusd_instr(
    config: &ClientConfig,
    global_config: &GlobalConfig,
    stable_mint: Pubkey,
    stable_amount: u64,
    recipient: Pubkey,
) -> Result<Vec<Instruction>> {
    let program = program(config)?;
    let ixs = program
        .request()
        .accounts(reup_accounts::MintReusd {
            payer: program.payer(),
            global_config: get_global_config_address(&program.id()),
            stablecoin_registry: get_stablecoin_registry_address(&program.id()),
            authority: get_authority_address(&program.id()),
            stable_mint,
            payer_stable_account: get_associated_token_address(&program.payer(), &stable_mint),
            custodian_stable_account: get_associated_token_address(
                &global_config.custodian,
                &stable_mint,
            ),
            reusd_mint: global_config.reusd_mint,
            recipient_reusd_account: get_associated_token_address(
                &recipient,
                &global_config.reusd_mint,
            ),
            token_program: spl_token::id(),
        })
        .args(reup_instructions::MintReusd { stable_amount })
        .instructions()?;
    Ok(ixs)
}

// ── exit queue ──

pub fn initialise_exit_queue_instr(config: &ClientConfig) -> Result<Vec<Instruction>> {
    let program = program(config)?;
    let ixs = program
        .request()
        .accounts(reup_accounts::InitialiseExitQueue {
            owner: program.payer(),
            global_config: get_global_config_address(&program.id()),
            authority: get_authority_address(&program.id()),
            exit_queue: get_exit_queue_address(&program.id()),
            reusd_mint: get_reusd_mint_address(&program.id()),
            exit_vault: get_exit_vault_address(&program.id()),
            token_program: spl_token::id(),
            system_program: system_program::id(),
        })
        .args(reup_instructions::InitialiseExitQueue {})
        .instructions()?;
    Ok(ixs)
}

pub fn queue_exit_instr(config: &ClientConfig, amount: u64) -> Result<Vec<Instruction>> {
    let program = program(config)?;
    let reusd_mint = get_reusd_mint_address(&program.id());
    let ixs = program
        .request()
        .accounts(reup_accounts::QueueExit {
            user: program.payer(),
            global_config: get_global_config_address(&program.id()),
            exit_queue: get_exit_queue_address(&program.id()),
            exit_vault: get_exit_vault_address(&program.id()),
            reusd_mint,
            user_reusd_account: get_associated_token_address(&program.payer(), &reusd_mint),
            token_program: spl_token::id(),
            system_program: system_program::id(),
        })
        .args(reup_instructions::QueueExit { amount })
        .instructions()?;
    Ok(ixs)
}

/// `payouts` comes from replaying `ExitQueue::fund` on a fetched copy of the
/// queue; one stablecoin ATA per payout is appended.
pub fn fund_exit_queue_instr(
    config: &ClientConfig,
    stable_mint: Pubkey,
    stable_amount: u64,
    payouts: &[ExitPayout],
) -> Result<Vec<Instruction>> {
    let program = program(config)?;
    let mut ixs = program
        .request()
        .accounts(reup_accounts::FundExitQueue {
            funder: program.payer(),
            global_config: get_global_config_address(&program.id()),
            stablecoin_registry: get_stablecoin_registry_address(&program.id()),
            exit_queue: get_exit_queue_address(&program.id()),
            exit_vault: get_exit_vault_address(&program.id()),
            reusd_mint: get_reusd_mint_address(&program.id()),
            authority: get_authority_address(&program.id()),
            stable_mint,
            funder_stable_account: get_associated_token_address(&program.payer(), &stable_mint),
            token_program: spl_token::id(),
        })
        .args(reup_instructions::FundExitQueue { stable_amount })
        .instructions()?;
    for payout in payouts {
        ixs[0].accounts.push(AccountMeta::new(
            get_associated_token_address(&payout.user, &stable_mint),
            false,
        ));
    }
    Ok(ixs)
}

// ── self-staking tokens ──

pub fn initialise_self_staking_instr(
    config: &ClientConfig,
    token: Pubkey,
    reward_mint: Pubkey,
    decimals: u8,
) -> Result<Vec<Instruction>> {
    let program = program(config)?;
    let ixs = program
        .request()
        .accounts(reup_accounts::InitialiseSelfStaking {
            owner: program.payer(),
            global_config: get_global_config_address(&program.id()),
            token,
            authority: get_authority_address(&program.id()),
            reward_mint,
            reward_vault: get_reward_vault_address(&token, &program.id()),
            token_program: spl_token::id(),
            system_program: system_program::id(),
        })
        .args(reup_instructions::InitialiseSelfStaking { decimals })
        .instructions()?;
    Ok(ixs)
}

pub fn set_role_instr(
    config: &ClientConfig,
    token: Pubkey,
    role: Role,
    who: Pubkey,
    enabled: bool,
) -> Result<Vec<Instruction>> {
    let program = program(config)?;
    let ixs = program
        .request()
        .accounts(reup_accounts::SetRole {
            owner: program.payer(),
            token,
        })
        .args(reup_instructions::SetRole { role, who, enabled })
        .instructions()?;
    Ok(ixs)
}

pub fn set_excluded_instr(
    config: &ClientConfig,
    token: Pubkey,
    holder_owner: Pubkey,
    excluded: bool,
) -> Result<Vec<Instruction>> {
    let program = program(config)?;
    let ixs = program
        .request()
        .accounts(reup_accounts::SetExcluded {
            owner: program.payer(),
            token,
            holder_owner,
            holder: get_holder_address(&token, &holder_owner, &program.id()),
            system_program: system_program::id(),
        })
        .args(reup_instructions::SetExcluded { excluded })
        .instructions()?;
    Ok(ixs)
}

pub fn mint_self_staking_instr(
    config: &ClientConfig,
    token: Pubkey,
    recipient: Pubkey,
    amount: u64,
) -> Result<Vec<Instruction>> {
    let program = program(config)?;
    let ixs = program
        .request()
        .accounts(reup_accounts::MintSelfStaking {
            minter: program.payer(),
            token,
            recipient,
            holder: get_holder_address(&token, &recipient, &program.id()),
            system_program: system_program::id(),
        })
        .args(reup_instructions::MintSelfStaking { amount })
        .instructions()?;
    Ok(ixs)
}

pub fn burn_self_staking_instr(config: &ClientConfig, token: Pubkey, amount: u64) -> Result<Vec<Instruction>> {
    let program = program(config)?;
    let ixs = program
        .request()
        .accounts(reup_accounts::BurnSelfStaking {
            owner: program.payer(),
            token,
            holder: get_holder_address(&token, &program.payer(), &program.id()),
        })
        .args(reup_instructions::BurnSelfStaking { amount })
        .instructions()?;
    Ok(ixs)
}

pub fn transfer_self_staking_instr(
    config: &ClientConfig,
    token: Pubkey,
    recipient: Pubkey,
    amount: u64,
) -> Result<Vec<Instruction>> {
    let program = program(config)?;
    let ixs = program
        .request()
        .accounts(reup_accounts::TransferSelfStaking {
            owner: program.payer(),
            token,
            from_holder: get_holder_address(&token, &program.payer(), &program.id()),
            recipient,
            to_holder: get_holder_address(&token, &recipient, &program.id()),
            system_program: system_program::id(),
        })
        .args(reup_instructions::TransferSelfStaking { amount })
        .instructions()?;
    Ok(ixs)
}

pub fn add_reward_instr(
    config: &ClientConfig,
    token: Pubkey,
    reward_mint: Pubkey,
    amount: u64,
    start_timestamp: u64,
    end_timestamp: u64,
) -> Result<Vec<Instruction>> {
    let program = program(config)?;
    let ixs = program
        .request()
        .accounts(reup_accounts::AddReward {
            manager: program.payer(),
            token,
            reward_mint,
            reward_vault: get_reward_vault_address(&token, &program.id()),
            manager_reward_account: get_associated_token_address(&program.payer(), &reward_mint),
            token_program: spl_token::id(),
        })
        .args(reup_instructions::AddReward {
            amount,
            start_timestamp,
            end_timestamp,
        })
        .instructions()?;
    Ok(ixs)
}

pub fn claim_reward_instr(config: &ClientConfig, token: Pubkey, reward_mint: Pubkey) -> Result<Vec<Instruction>> {
    let program = program(config)?;
    let ixs = program
        .request()
        .accounts(reup_accounts::ClaimReward {
            owner: program.payer(),
            token,
            holder: get_holder_address(&token, &program.payer(), &program.id()),
            authority: get_authority_address(&program.id()),
            reward_mint,
            reward_vault: get_reward_vault_address(&token, &program.id()),
            owner_reward_account: get_associated_token_address(&program.payer(), &reward_mint),
            token_program: spl_token::id(),
            associated_token_program: spl_associated_token_account::id(),
            system_program: system_program::id(),
        })
        .args(reup_instructions::ClaimReward {})
        .instructions()?;
    Ok(ixs)
}

pub fn claim_reward_for_instr(
    config: &ClientConfig,
    token: Pubkey,
    reward_mint: Pubkey,
    holder_owner: Pubkey,
) -> Result<Vec<Instruction>> {
    let program = program(config)?;
    let ixs = program
        .request()
        .accounts(reup_accounts::ClaimRewardFor {
            claimer: program.payer(),
            token,
            holder_owner,
            holder: get_holder_address(&token, &holder_owner, &program.id()),
            authority: get_authority_address(&program.id()),
            reward_mint,
            reward_vault: get_reward_vault_address(&token, &program.id()),
            holder_reward_account: get_associated_token_address(&holder_owner, &reward_mint),
            token_program: spl_token::id(),
        })
        .args(reup_instructions::ClaimRewardFor {})
        .instructions()?;
    Ok(ixs)
}

// ── bridge ──

pub fn bridge_out_instr(
    config: &ClientConfig,
    token: Pubkey,
    amount: u64,
    remote_to: [u8; 32],
) -> Result<Vec<Instruction>> {
    let program = program(config)?;
    let ixs = program
        .request()
        .accounts(reup_accounts::BridgeOut {
            owner: program.payer(),
            token,
            holder: get_holder_address(&token, &program.payer(), &program.id()),
        })
        .args(reup_instructions::BridgeOut { amount, remote_to })
        .instructions()?;
    Ok(ixs)
}

/// Ed25519 precompile instruction carrying one signature, with key,
/// signature and message all inline.
pub fn ed25519_verify_instr(signer: &Keypair, message: &[u8]) -> Instruction {
    const HEADER: usize = 2 + 14;
    let key_offset = HEADER as u16;
    let signature_offset = key_offset + 32;
    let message_offset = signature_offset + 64;
    let signature = signer.sign_message(message);

    let mut data = vec![1u8, 0u8];
    for field in [
        signature_offset,
        u16::MAX,
        key_offset,
        u16::MAX,
        message_offset,
        message.len() as u16,
        u16::MAX,
    ] {
        data.extend_from_slice(&field.to_le_bytes());
    }
    data.extend_from_slice(signer.pubkey().as_ref());
    data.extend_from_slice(signature.as_ref());
    data.extend_from_slice(message);

    Instruction {
        program_id: ed25519_program::id(),
        accounts: vec![],
        data,
    }
}

/// Precompile signature by `minter` followed by `bridge_in`.
pub fn bridge_in_instr(
    config: &ClientConfig,
    minter: &Keypair,
    token: Pubkey,
    instruction_id: u64,
    recipient: Pubkey,
    amount: u64,
    deadline: i64,
) -> Result<Vec<Instruction>> {
    let program = program(config)?;
    let message = BridgeInMessage {
        token,
        instruction_id,
        to: recipient,
        amount,
        deadline,
    };
    let mut ixs = vec![ed25519_verify_instr(minter, &message.hash())];
    ixs.extend(
        program
            .request()
            .accounts(reup_accounts::BridgeIn {
                payer: program.payer(),
                token,
                receipt: get_bridge_receipt_address(&token, instruction_id, &program.id()),
                recipient,
                holder: get_holder_address(&token, &recipient, &program.id()),
                instructions: solana_sdk::sysvar::instructions::id(),
                system_program: system_program::id(),
            })
            .args(reup_instructions::BridgeIn {
                instruction_id,
                amount,
                deadline,
            })
            .instructions()?,
    );
    Ok(ixs)
}

// ── pools ──

#[allow(clippy::too_many_arguments)]
pub fn initialise_blargitrage_instr(
    config: &ClientConfig,
    pool_program: Pubkey,
    pool: Pubkey,
    pool_authority: Pubkey,
    pool_lp_mint: Pubkey,
    pool_vaults: [Pubkey; 2],
    base_pool: Pubkey,
    base_pool_authority: Pubkey,
    base_lp_mint: Pubkey,
    base_pool_vaults: &[Pubkey],
    desired_mint: Pubkey,
) -> Result<Vec<Instruction>> {
    let program = program(config)?;
    let [reusd_vault, pool_lp_vault, base_lp_vault, inventory_vault] =
        get_rebalance_vaults(&program.id());
    let mut ixs = program
        .request()
        .accounts(reup_accounts::InitialiseBlargitrage {
            owner: program.payer(),
            global_config: get_global_config_address(&program.id()),
            authority: get_authority_address(&program.id()),
            blargitrage: get_blargitrage_address(&program.id()),
            pool_program,
            pool,
            pool_authority,
            pool_lp_mint,
            pool_vault_0: pool_vaults[0],
            pool_vault_1: pool_vaults[1],
            base_pool,
            base_pool_authority,
            base_lp_mint,
            desired_mint,
            reusd_mint: get_reusd_mint_address(&program.id()),
            reusd_vault,
            pool_lp_vault,
            base_lp_vault,
            inventory_vault,
            token_program: spl_token::id(),
            system_program: system_program::id(),
        })
        .args(reup_instructions::InitialiseBlargitrage {})
        .instructions()?;
    for vault in base_pool_vaults {
        ixs[0].accounts.push(AccountMeta::new_readonly(*vault, false));
    }
    Ok(ixs)
}

fn push_base_pool_vaults(ix: &mut Instruction, blargitrage: &Blargitrage) {
    for vault in &blargitrage.base_pool_vaults {
        ix.accounts.push(AccountMeta::new(*vault, false));
    }
}

pub fn balance_instr(
    config: &ClientConfig,
    global_config: &GlobalConfig,
    blargitrage: &Blargitrage,
) -> Result<Vec<Instruction>> {
    let program = program(config)?;
    let [reusd_vault, pool_lp_vault, base_lp_vault, inventory_vault] =
        get_rebalance_vaults(&program.id());
    let mut ixs = program
        .request()
        .accounts(reup_accounts::Balance {
            caller: program.payer(),
            global_config: get_global_config_address(&program.id()),
            blargitrage: get_blargitrage_address(&program.id()),
            authority: get_authority_address(&program.id()),
            pool_program: blargitrage.pool_program,
            pool: blargitrage.pool,
            pool_authority: blargitrage.pool_authority,
            pool_lp_mint: blargitrage.pool_lp_mint,
            reusd_pool_vault: blargitrage.reusd_vault(),
            counter_pool_vault: blargitrage.counter_vault(),
            base_pool: blargitrage.base_pool,
            base_pool_authority: blargitrage.base_pool_authority,
            base_lp_mint: blargitrage.base_lp_mint,
            reusd_mint: global_config.reusd_mint,
            reusd_vault,
            pool_lp_vault,
            base_lp_vault,
            inventory_vault,
            custodian_desired_account: get_associated_token_address(
                &global_config.custodian,
                &blargitrage.desired_mint,
            ),
            token_program: spl_token::id(),
        })
        .args(reup_instructions::Balance {})
        .instructions()?;
    push_base_pool_vaults(&mut ixs[0], blargitrage);
    Ok(ixs)
}

fn zap_accounts(
    program: &Program<Rc<Keypair>>,
    global_config: &GlobalConfig,
    blargitrage: &Blargitrage,
    stable_mint: Pubkey,
    minting: bool,
) -> reup_accounts::Zap {
    let user = program.payer();
    reup_accounts::Zap {
        user,
        global_config: get_global_config_address(&program.id()),
        stablecoin_registry: get_stablecoin_registry_address(&program.id()),
        blargitrage: get_blargitrage_address(&program.id()),
        authority: get_authority_address(&program.id()),
        pool_program: blargitrage.pool_program,
        pool: blargitrage.pool,
        pool_authority: blargitrage.pool_authority,
        pool_lp_mint: blargitrage.pool_lp_mint,
        reusd_pool_vault: blargitrage.reusd_vault(),
        counter_pool_vault: blargitrage.counter_vault(),
        base_pool: blargitrage.base_pool,
        base_pool_authority: blargitrage.base_pool_authority,
        base_lp_mint: blargitrage.base_lp_mint,
        reusd_mint: global_config.reusd_mint,
        stable_mint,
        user_stable_account: get_associated_token_address(&user, &stable_mint),
        custodian_stable_account: minting
            .then(|| get_associated_token_address(&global_config.custodian, &stable_mint)),
        user_reusd_account: minting
            .then(|| get_associated_token_address(&user, &global_config.reusd_mint)),
        user_base_lp_account: get_associated_token_address(&user, &blargitrage.base_lp_mint),
        user_lp_account: get_associated_token_address(&user, &blargitrage.pool_lp_mint),
        token_program: spl_token::id(),
    }
}

pub fn zap_instr(
    config: &ClientConfig,
    global_config: &GlobalConfig,
    blargitrage: &Blargitrage,
    stable_mint: Pubkey,
    amount: u64,
    mint_reusd: bool,
) -> Result<Vec<Instruction>> {
    let program = program(config)?;
    let minting = mint_reusd && stable_mint != global_config.reusd_mint;
    let mut ixs = program
        .request()
        .accounts(zap_accounts(&program, global_config, blargitrage, stable_mint, minting))
        .args(reup_instructions::Zap { amount, mint_reusd })
        .instructions()?;
    push_base_pool_vaults(&mut ixs[0], blargitrage);
    Ok(ixs)
}

pub fn balanced_zap_instr(
    config: &ClientConfig,
    global_config: &GlobalConfig,
    blargitrage: &Blargitrage,
    stable_mint: Pubkey,
    amount: u64,
) -> Result<Vec<Instruction>> {
    let program = program(config)?;
    let mut ixs = program
        .request()
        .accounts(zap_accounts(&program, global_config, blargitrage, stable_mint, true))
        .args(reup_instructions::BalancedZap { amount })
        .instructions()?;
    push_base_pool_vaults(&mut ixs[0], blargitrage);
    Ok(ixs)
}

pub fn unzap_instr(
    config: &ClientConfig,
    global_config: &GlobalConfig,
    blargitrage: &Blargitrage,
    out_mint: Pubkey,
    lp_amount: u64,
) -> Result<Vec<Instruction>> {
    let program = program(config)?;
    let user = program.payer();
    let base_coin_vault = blargitrage
        .base_coin_index(&out_mint)
        .map(|index| blargitrage.base_pool_vaults[index as usize]);
    let ixs = program
        .request()
        .accounts(reup_accounts::Unzap {
            user,
            global_config: get_global_config_address(&program.id()),
            blargitrage: get_blargitrage_address(&program.id()),
            pool_program: blargitrage.pool_program,
            pool: blargitrage.pool,
            pool_authority: blargitrage.pool_authority,
            pool_lp_mint: blargitrage.pool_lp_mint,
            reusd_pool_vault: blargitrage.reusd_vault(),
            counter_pool_vault: blargitrage.counter_vault(),
            base_pool: blargitrage.base_pool,
            base_pool_authority: blargitrage.base_pool_authority,
            base_lp_mint: blargitrage.base_lp_mint,
            out_mint,
            base_coin_vault,
            user_lp_account: get_associated_token_address(&user, &blargitrage.pool_lp_mint),
            user_base_lp_account: get_associated_token_address(&user, &blargitrage.base_lp_mint),
            user_out_account: get_associated_token_address(&user, &out_mint),
            token_program: spl_token::id(),
        })
        .args(reup_instructions::Unzap { lp_amount })
        .instructions()?;
    Ok(ixs)
}

#[cfg(test)]
mod reup_instructions_tests {
    use super::*;

    #[test]
    fn precompile_instruction_matches_program_parser() {
        let minter = Keypair::new();
        let message = BridgeInMessage {
            token: Pubkey::new_unique(),
            instruction_id: 3,
            to: Pubkey::new_unique(),
            amount: 10,
            deadline: 1_900_000_000,
        };
        let ix = ed25519_verify_instr(&minter, &message.hash());
        let signer = reup::utils::verify_bridge_in(&ix, &message, |k| *k == minter.pubkey()).unwrap();
        assert_eq!(signer, minter.pubkey());
    }
}
