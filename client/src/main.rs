#![allow(dead_code)]
use anyhow::{format_err, Result};
use clap::{Parser, ValueEnum};
use configparser::ini::Ini;
use solana_client::rpc_client::RpcClient;
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    transaction::Transaction,
};
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

mod instructions;
use instructions::reup_instructions::*;
use instructions::rpc::*;
use instructions::utils::*;

use reup::states::{
    Blargitrage, ExitQueue, GlobalConfig, HolderAccount, Role, SelfStakingToken,
    StablecoinRegistry, UpgradeKind,
};

#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    http_url: String,
    ws_url: String,
    payer_path: String,
    admin_path: String,
    reup_program: Pubkey,
}

fn required(config: &Ini, key: &str) -> Result<String> {
    let value = config
        .get("Global", key)
        .ok_or_else(|| format_err!("{} missing from [Global]", key))?;
    if value.is_empty() {
        return Err(format_err!("{} must not be empty", key));
    }
    Ok(value)
}

fn load_cfg(client_config: &str) -> Result<ClientConfig> {
    let mut config = Ini::new();
    config.load(client_config).map_err(|e| format_err!(e))?;
    let http_url = required(&config, "http_url")?;
    let ws_url = required(&config, "ws_url")?;
    let payer_path = required(&config, "payer_path")?;
    let admin_path = required(&config, "admin_path")?;
    let reup_program = Pubkey::from_str(&required(&config, "reup_program")?)?;

    Ok(ClientConfig {
        http_url,
        ws_url,
        payer_path,
        admin_path,
        reup_program,
    })
}

fn read_keypair_file(s: &str) -> Result<Keypair> {
    solana_sdk::signature::read_keypair_file(s)
        .map_err(|_| format_err!("failed to read keypair from {}", s))
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RoleArg {
    Minter,
    RewardManager,
    DelegatedClaimer,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Minter => Role::Minter,
            RoleArg::RewardManager => Role::RewardManager,
            RoleArg::DelegatedClaimer => Role::DelegatedClaimer,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum UpgradeKindArg {
    GlobalConfig,
    StablecoinRegistry,
    ExitQueue,
    SelfStaking,
    Blargitrage,
}

impl From<UpgradeKindArg> for UpgradeKind {
    fn from(kind: UpgradeKindArg) -> Self {
        match kind {
            UpgradeKindArg::GlobalConfig => UpgradeKind::GlobalConfig,
            UpgradeKindArg::StablecoinRegistry => UpgradeKind::StablecoinRegistry,
            UpgradeKindArg::ExitQueue => UpgradeKind::ExitQueue,
            UpgradeKindArg::SelfStaking => UpgradeKind::SelfStaking,
            UpgradeKindArg::Blargitrage => UpgradeKind::Blargitrage,
        }
    }
}

#[derive(Debug, Parser)]
pub struct Opts {
    #[clap(subcommand)]
    pub command: ReupCommands,
}

#[derive(Debug, Parser)]
pub enum ReupCommands {
    InitialiseConfig {
        #[arg(long)]
        custodian: Pubkey,
    },
    /// 0: nominate owner, 1: set custodian, 2: cancel nomination.
    UpdateConfig {
        #[arg(long)]
        param: u8,
        #[arg(long, default_value_t = 0)]
        value: u64,
        #[arg(long)]
        target: Option<Pubkey>,
    },
    ClaimOwnership {},
    Upgrade {
        #[arg(long, value_enum)]
        kind: UpgradeKindArg,
        #[arg(long)]
        target: Pubkey,
        #[arg(long)]
        next_version: u64,
        #[arg(long, default_value_t = Pubkey::default())]
        reward_mint: Pubkey,
    },
    AddStablecoin {
        #[arg(long)]
        mint: Pubkey,
        #[arg(long)]
        baked_in: bool,
    },
    RemoveStablecoin {
        #[arg(long)]
        mint: Pubkey,
    },
    MintReusd {
        #[arg(long)]
        stable_mint: Pubkey,
        #[arg(long)]
        amount: u64,
        #[arg(long)]
        recipient: Option<Pubkey>,
    },
    InitialiseExitQueue {},
    QueueExit {
        #[arg(long)]
        amount: u64,
    },
    FundExitQueue {
        #[arg(long)]
        stable_mint: Pubkey,
        #[arg(long)]
        amount: u64,
    },
    InitialiseSelfStaking {
        #[arg(long)]
        reward_mint: Pubkey,
        #[arg(long, default_value_t = 9)]
        decimals: u8,
    },
    SetRole {
        #[arg(long)]
        token: Pubkey,
        #[arg(long, value_enum)]
        role: RoleArg,
        #[arg(long)]
        who: Pubkey,
        #[arg(long)]
        enabled: bool,
    },
    SetExcluded {
        #[arg(long)]
        token: Pubkey,
        #[arg(long)]
        holder: Pubkey,
        #[arg(long)]
        excluded: bool,
    },
    MintSelfStaking {
        #[arg(long)]
        token: Pubkey,
        #[arg(long)]
        recipient: Pubkey,
        #[arg(long)]
        amount: u64,
    },
    BurnSelfStaking {
        #[arg(long)]
        token: Pubkey,
        #[arg(long)]
        amount: u64,
    },
    TransferSelfStaking {
        #[arg(long)]
        token: Pubkey,
        #[arg(long)]
        recipient: Pubkey,
        #[arg(long)]
        amount: u64,
    },
    AddReward {
        #[arg(long)]
        token: Pubkey,
        #[arg(long)]
        amount: u64,
        #[arg(long)]
        start: u64,
        #[arg(long)]
        end: u64,
    },
    ClaimReward {
        #[arg(long)]
        token: Pubkey,
    },
    ClaimRewardFor {
        #[arg(long)]
        token: Pubkey,
        #[arg(long)]
        holder: Pubkey,
    },
    BridgeOut {
        #[arg(long)]
        token: Pubkey,
        #[arg(long)]
        amount: u64,
        /// Hex-encoded recipient on the remote chain.
        #[arg(long)]
        remote_to: String,
    },
    BridgeIn {
        #[arg(long)]
        token: Pubkey,
        #[arg(long)]
        instruction_id: u64,
        #[arg(long)]
        recipient: Pubkey,
        #[arg(long)]
        amount: u64,
        #[arg(long)]
        deadline: i64,
        /// Keypair of a minter of `token`.
        #[arg(long)]
        minter_path: String,
    },
    InitialiseBlargitrage {
        #[arg(long)]
        pool_program: Pubkey,
        #[arg(long)]
        pool: Pubkey,
        #[arg(long)]
        pool_authority: Pubkey,
        #[arg(long)]
        pool_lp_mint: Pubkey,
        #[arg(long, num_args = 2)]
        pool_vaults: Vec<Pubkey>,
        #[arg(long)]
        base_pool: Pubkey,
        #[arg(long)]
        base_pool_authority: Pubkey,
        #[arg(long)]
        base_lp_mint: Pubkey,
        #[arg(long, num_args = 2..=4)]
        base_pool_vaults: Vec<Pubkey>,
        #[arg(long)]
        desired_mint: Pubkey,
    },
    Balance {},
    Zap {
        #[arg(long)]
        stable_mint: Pubkey,
        #[arg(long)]
        amount: u64,
        #[arg(long)]
        mint_reusd: bool,
    },
    BalancedZap {
        #[arg(long)]
        stable_mint: Pubkey,
        #[arg(long)]
        amount: u64,
    },
    Unzap {
        #[arg(long)]
        out_mint: Pubkey,
        #[arg(long)]
        lp_amount: u64,
    },
    /// Reward a holder could claim now.
    PendingReward {
        #[arg(long)]
        token: Pubkey,
        #[arg(long)]
        holder: Pubkey,
    },
    /// Queue entry at an absolute position.
    QueuedExitAt {
        #[arg(long)]
        index: u64,
    },
}

fn send(
    rpc_client: &RpcClient,
    payer: &Keypair,
    instructions: &[Instruction],
    extra_signers: &[&Keypair],
) -> Result<()> {
    let mut signers = vec![payer];
    signers.extend_from_slice(extra_signers);
    let recent_hash = rpc_client.get_latest_blockhash()?;
    let txn = Transaction::new_signed_with_payer(
        instructions,
        Some(&payer.pubkey()),
        &signers,
        recent_hash,
    );
    let signature = send_txn(rpc_client, &txn, true)?;
    println!("{}", signature);
    Ok(())
}

fn fetch<T: anchor_lang::AccountDeserialize>(rpc_client: &RpcClient, addr: &Pubkey) -> Result<T> {
    get_anchor_account::<T>(rpc_client, addr)?
        .ok_or_else(|| format_err!("account {} not found", addr))
}

fn unix_now() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

fn main() -> Result<()> {
    let client_config = "client_config.ini";
    let config = load_cfg(client_config)?;
    let payer = read_keypair_file(&config.payer_path)?;
    let rpc_client = RpcClient::new(config.http_url.to_string());
    let program_id = config.reup_program;

    let opts = Opts::parse();
    match opts.command {
        ReupCommands::InitialiseConfig { custodian } => {
            let ixs = initialise_config_instr(&config, custodian)?;
            send(&rpc_client, &payer, &ixs, &[])?;
        }
        ReupCommands::UpdateConfig {
            param,
            value,
            target,
        } => {
            let ixs = update_config_instr(&config, param, value, target)?;
            send(&rpc_client, &payer, &ixs, &[])?;
        }
        ReupCommands::ClaimOwnership {} => {
            let ixs = claim_ownership_instr(&config)?;
            send(&rpc_client, &payer, &ixs, &[])?;
        }
        ReupCommands::Upgrade {
            kind,
            target,
            next_version,
            reward_mint,
        } => {
            let ixs = upgrade_instr(&config, kind.into(), target, next_version, reward_mint)?;
            send(&rpc_client, &payer, &ixs, &[])?;
        }
        ReupCommands::AddStablecoin { mint, baked_in } => {
            let ixs = add_stablecoin_instr(&config, mint, baked_in)?;
            send(&rpc_client, &payer, &ixs, &[])?;
        }
        ReupCommands::RemoveStablecoin { mint } => {
            let ixs = remove_stablecoin_instr(&config, mint)?;
            send(&rpc_client, &payer, &ixs, &[])?;
        }
        ReupCommands::MintReusd {
            stable_mint,
            amount,
            recipient,
        } => {
            let global_config: GlobalConfig =
                fetch(&rpc_client, &get_global_config_address(&program_id))?;
            let recipient = recipient.unwrap_or(payer.pubkey());
            let ixs = mint_reusd_instr(&config, &global_config, stable_mint, amount, recipient)?;
            send(&rpc_client, &payer, &ixs, &[])?;
        }
        ReupCommands::InitialiseExitQueue {} => {
            let ixs = initialise_exit_queue_instr(&config)?;
            send(&rpc_client, &payer, &ixs, &[])?;
        }
        ReupCommands::QueueExit { amount } => {
            let ixs = queue_exit_instr(&config, amount)?;
            send(&rpc_client, &payer, &ixs, &[])?;
        }
        ReupCommands::FundExitQueue {
            stable_mint,
            amount,
        } => {
            // replay the payout walk locally to learn which users get paid
            let registry: StablecoinRegistry =
                fetch(&rpc_client, &get_stablecoin_registry_address(&program_id))?;
            let factor = registry.get_config(&stable_mint)?.factor()?;
            let mut exit_queue: ExitQueue =
                fetch(&rpc_client, &get_exit_queue_address(&program_id))?;
            let payouts = exit_queue.fund(amount, factor)?;
            println!("paying {} queued exits", payouts.len());
            let ixs = fund_exit_queue_instr(&config, stable_mint, amount, &payouts)?;
            send(&rpc_client, &payer, &ixs, &[])?;
        }
        ReupCommands::InitialiseSelfStaking {
            reward_mint,
            decimals,
        } => {
            let token = Keypair::new();
            let ixs = initialise_self_staking_instr(&config, token.pubkey(), reward_mint, decimals)?;
            send(&rpc_client, &payer, &ixs, &[&token])?;
            println!("token: {}", token.pubkey());
        }
        ReupCommands::SetRole {
            token,
            role,
            who,
            enabled,
        } => {
            let ixs = set_role_instr(&config, token, role.into(), who, enabled)?;
            send(&rpc_client, &payer, &ixs, &[])?;
        }
        ReupCommands::SetExcluded {
            token,
            holder,
            excluded,
        } => {
            let ixs = set_excluded_instr(&config, token, holder, excluded)?;
            send(&rpc_client, &payer, &ixs, &[])?;
        }
        ReupCommands::MintSelfStaking {
            token,
            recipient,
            amount,
        } => {
            let ixs = mint_self_staking_instr(&config, token, recipient, amount)?;
            send(&rpc_client, &payer, &ixs, &[])?;
        }
        ReupCommands::BurnSelfStaking { token, amount } => {
            let ixs = burn_self_staking_instr(&config, token, amount)?;
            send(&rpc_client, &payer, &ixs, &[])?;
        }
        ReupCommands::TransferSelfStaking {
            token,
            recipient,
            amount,
        } => {
            let ixs = transfer_self_staking_instr(&config, token, recipient, amount)?;
            send(&rpc_client, &payer, &ixs, &[])?;
        }
        ReupCommands::AddReward {
            token,
            amount,
            start,
            end,
        } => {
            let state: SelfStakingToken = fetch(&rpc_client, &token)?;
            let ixs = add_reward_instr(&config, token, state.reward_mint, amount, start, end)?;
            send(&rpc_client, &payer, &ixs, &[])?;
        }
        ReupCommands::ClaimReward { token } => {
            let state: SelfStakingToken = fetch(&rpc_client, &token)?;
            let ixs = claim_reward_instr(&config, token, state.reward_mint)?;
            send(&rpc_client, &payer, &ixs, &[])?;
        }
        ReupCommands::ClaimRewardFor { token, holder } => {
            let state: SelfStakingToken = fetch(&rpc_client, &token)?;
            let ixs = claim_reward_for_instr(&config, token, state.reward_mint, holder)?;
            send(&rpc_client, &payer, &ixs, &[])?;
        }
        ReupCommands::BridgeOut {
            token,
            amount,
            remote_to,
        } => {
            let remote_to = parse_remote_address(&remote_to)?;
            let ixs = bridge_out_instr(&config, token, amount, remote_to)?;
            send(&rpc_client, &payer, &ixs, &[])?;
        }
        ReupCommands::BridgeIn {
            token,
            instruction_id,
            recipient,
            amount,
            deadline,
            minter_path,
        } => {
            let minter = read_keypair_file(&minter_path)?;
            let ixs = bridge_in_instr(
                &config,
                &minter,
                token,
                instruction_id,
                recipient,
                amount,
                deadline,
            )?;
            send(&rpc_client, &payer, &ixs, &[])?;
        }
        ReupCommands::InitialiseBlargitrage {
            pool_program,
            pool,
            pool_authority,
            pool_lp_mint,
            pool_vaults,
            base_pool,
            base_pool_authority,
            base_lp_mint,
            base_pool_vaults,
            desired_mint,
        } => {
            let ixs = initialise_blargitrage_instr(
                &config,
                pool_program,
                pool,
                pool_authority,
                pool_lp_mint,
                [pool_vaults[0], pool_vaults[1]],
                base_pool,
                base_pool_authority,
                base_lp_mint,
                &base_pool_vaults,
                desired_mint,
            )?;
            send(&rpc_client, &payer, &ixs, &[])?;
        }
        ReupCommands::Balance {} => {
            let global_config: GlobalConfig =
                fetch(&rpc_client, &get_global_config_address(&program_id))?;
            let blargitrage: Blargitrage =
                fetch(&rpc_client, &get_blargitrage_address(&program_id))?;
            let ixs = balance_instr(&config, &global_config, &blargitrage)?;
            send(&rpc_client, &payer, &ixs, &[])?;
        }
        ReupCommands::Zap {
            stable_mint,
            amount,
            mint_reusd,
        } => {
            let global_config: GlobalConfig =
                fetch(&rpc_client, &get_global_config_address(&program_id))?;
            let blargitrage: Blargitrage =
                fetch(&rpc_client, &get_blargitrage_address(&program_id))?;
            let ixs = zap_instr(
                &config,
                &global_config,
                &blargitrage,
                stable_mint,
                amount,
                mint_reusd,
            )?;
            send(&rpc_client, &payer, &ixs, &[])?;
        }
        ReupCommands::BalancedZap {
            stable_mint,
            amount,
        } => {
            let global_config: GlobalConfig =
                fetch(&rpc_client, &get_global_config_address(&program_id))?;
            let blargitrage: Blargitrage =
                fetch(&rpc_client, &get_blargitrage_address(&program_id))?;
            let ixs = balanced_zap_instr(&config, &global_config, &blargitrage, stable_mint, amount)?;
            send(&rpc_client, &payer, &ixs, &[])?;
        }
        ReupCommands::Unzap {
            out_mint,
            lp_amount,
        } => {
            let global_config: GlobalConfig =
                fetch(&rpc_client, &get_global_config_address(&program_id))?;
            let blargitrage: Blargitrage =
                fetch(&rpc_client, &get_blargitrage_address(&program_id))?;
            let ixs = unzap_instr(&config, &global_config, &blargitrage, out_mint, lp_amount)?;
            send(&rpc_client, &payer, &ixs, &[])?;
        }
        ReupCommands::PendingReward { token, holder } => {
            let state: SelfStakingToken = fetch(&rpc_client, &token)?;
            let holder_address = get_holder_address(&token, &holder, &program_id);
            let pending = match get_anchor_account::<HolderAccount>(&rpc_client, &holder_address)? {
                Some(record) => state.pending_reward(&record, unix_now()?)?,
                None => 0,
            };
            println!("{}", pending);
        }
        ReupCommands::QueuedExitAt { index } => {
            let exit_queue: ExitQueue = fetch(&rpc_client, &get_exit_queue_address(&program_id))?;
            let entry = exit_queue.queued_exit_at(index);
            println!("user: {} amount: {}", entry.user, entry.amount);
        }
    }
    Ok(())
}
