use anchor_lang::prelude::*;

/// PDA seed of bridge receipts: `[BRIDGE_RECEIPT_SEED, token, instruction_id.to_le_bytes()]`.
pub const BRIDGE_RECEIPT_SEED: &str = "bridge_in";

/// Marks one bridge-in instruction id as used for one self-staking token.
#[account]
#[derive(Default, Debug)]
pub struct BridgeReceipt {
    pub bump: u8,
    pub token: Pubkey,
    pub instruction_id: u64,
    pub fulfilled: bool,
}

impl BridgeReceipt {
    pub const LEN: usize = 8 + 1 + 32 + 8 + 1;
}
