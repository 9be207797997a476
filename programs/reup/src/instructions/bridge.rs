use crate::error::ErrorCode;
use crate::states::*;
use crate::utils::{current_timestamp, load_preceding_instruction, verify_bridge_in, BridgeInMessage};
use anchor_lang::prelude::*;
use anchor_lang::solana_program::sysvar;

//
// ──────────────────────────────────────────────────────────────────────────────
// Cross-chain movement of self-staking balances
// ──────────────────────────────────────────────────────────────────────────────
//

/// Burns the caller's ledger balance for delivery on a remote chain.
#[derive(Accounts)]
pub struct BridgeOut<'info> {
    pub owner: Signer<'info>,

    #[account(mut)]
    pub token: Box<Account<'info, SelfStakingToken>>,

    #[account(
        mut,
        seeds = [HOLDER_SEED.as_bytes(), token.key().as_ref(), owner.key().as_ref()],
        bump = holder.bump,
    )]
    pub holder: Box<Account<'info, HolderAccount>>,
}

/// # Errors
/// - `ZeroAmount`, `ZeroAddress` (empty remote recipient).
/// - `InsufficientBalance`.
pub fn bridge_out(ctx: Context<BridgeOut>, amount: u64, remote_to: [u8; 32]) -> Result<()> {
    require_gt!(amount, 0, ErrorCode::ZeroAmount);
    require!(remote_to != [0u8; 32], ErrorCode::ZeroAddress);
    let now = current_timestamp()?;

    let holder = &mut ctx.accounts.holder;
    ctx.accounts.token.burn(holder, amount, now)?;

    emit!(BridgedOut {
        token: ctx.accounts.token.key(),
        from: holder.owner,
        remote_to,
        amount,
    });
    Ok(())
}

// ──────────────────────────────────────────────────────────────────────────────
// bridge_in
// ──────────────────────────────────────────────────────────────────────────────

/// Mints ledger balance authorised by a minter's Ed25519 signature.
///
/// The transaction must carry an Ed25519 precompile instruction directly
/// before this one, signing `BridgeInMessage::hash` with a key holding the
/// token's minter role. Anyone may relay it.
#[derive(Accounts)]
#[instruction(instruction_id: u64)]
pub struct BridgeIn<'info> {
    /// Relayer; pays for the receipt and any new holder record.
    #[account(mut)]
    pub payer: Signer<'info>,

    #[account(mut)]
    pub token: Box<Account<'info, SelfStakingToken>>,

    /// Marks `instruction_id` as consumed for this token.
    #[account(
        init_if_needed,
        seeds = [
            BRIDGE_RECEIPT_SEED.as_bytes(),
            token.key().as_ref(),
            &instruction_id.to_le_bytes(),
        ],
        bump,
        payer = payer,
        space = BridgeReceipt::LEN
    )]
    pub receipt: Box<Account<'info, BridgeReceipt>>,

    /// CHECK: identity key only; seeds the holder record.
    pub recipient: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        seeds = [HOLDER_SEED.as_bytes(), token.key().as_ref(), recipient.key().as_ref()],
        bump,
        payer = payer,
        space = HolderAccount::LEN
    )]
    pub holder: Box<Account<'info, HolderAccount>>,

    /// CHECK: address constrained to the instructions sysvar.
    #[account(address = sysvar::instructions::ID)]
    pub instructions: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

/// Steps:
/// 1) Reject expired or replayed instructions.
/// 2) Verify the preceding precompile signature.
/// 3) Mark the receipt, then mint to the recipient.
pub fn bridge_in(
    ctx: Context<BridgeIn>,
    instruction_id: u64,
    amount: u64,
    deadline: i64,
) -> Result<()> {
    require_gt!(amount, 0, ErrorCode::ZeroAmount);
    let now = current_timestamp()?;

    // --- 1) Freshness and replay ---
    require!(
        deadline >= 0 && deadline as u64 >= now,
        ErrorCode::DeadlineExpired
    );
    require!(
        !ctx.accounts.receipt.fulfilled,
        ErrorCode::DuplicateInstruction
    );

    // --- 2) Signature ---
    let token_key = ctx.accounts.token.key();
    let recipient = ctx.accounts.recipient.key();
    let message = BridgeInMessage {
        token: token_key,
        instruction_id,
        to: recipient,
        amount,
        deadline,
    };
    let precompile = load_preceding_instruction(&ctx.accounts.instructions.to_account_info())?;
    let token = &ctx.accounts.token;
    let signer = verify_bridge_in(&precompile, &message, |k| {
        token.has_role(Role::Minter, k)
    })?;

    // --- 3) Receipt and mint ---
    let receipt = &mut ctx.accounts.receipt;
    receipt.bump = ctx.bumps.receipt;
    receipt.token = token_key;
    receipt.instruction_id = instruction_id;
    receipt.fulfilled = true;

    let holder = &mut ctx.accounts.holder;
    holder.bind(ctx.bumps.holder, token_key, recipient);
    ctx.accounts.token.mint(holder, amount, now)?;

    emit!(BridgedIn {
        token: token_key,
        instruction_id,
        to: recipient,
        amount,
        signer,
    });
    Ok(())
}
