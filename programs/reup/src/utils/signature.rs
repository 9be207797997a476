//! Verification of bridge instructions signed off-chain by a minter.
//!
//! The signature itself is checked by the Ed25519 precompile in the same
//! transaction; here we only confirm that the precompile instruction
//! immediately before ours covered the expected message with a minter key.

use crate::error::ErrorCode;
use anchor_lang::prelude::*;
use anchor_lang::solana_program::ed25519_program;
use anchor_lang::solana_program::hash::hashv;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::solana_program::sysvar::instructions::{
    load_current_index_checked, load_instruction_at_checked,
};
use arrayref::array_ref;
use bytemuck::{Pod, Zeroable};

pub const BRIDGE_IN_DOMAIN: &[u8] = b"reup:bridge_in:v1";

/// Offsets pointing at the current instruction's own data.
const SELF_INSTRUCTION_INDEX: u16 = u16::MAX;
const OFFSETS_START: usize = 2;
const OFFSETS_LEN: usize = 14;

/// Canonical content of a bridge-in instruction; its hash is what the
/// minter signs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BridgeInMessage {
    pub token: Pubkey,
    pub instruction_id: u64,
    pub to: Pubkey,
    pub amount: u64,
    pub deadline: i64,
}

impl BridgeInMessage {
    pub fn hash(&self) -> [u8; 32] {
        hashv(&[
            BRIDGE_IN_DOMAIN,
            self.token.as_ref(),
            &self.instruction_id.to_le_bytes(),
            self.to.as_ref(),
            &self.amount.to_le_bytes(),
            &self.deadline.to_le_bytes(),
        ])
        .to_bytes()
    }
}

#[derive(Clone, Copy, Pod, Zeroable)]
#[repr(C)]
struct Ed25519SignatureOffsets {
    signature_offset: u16,
    signature_instruction_index: u16,
    public_key_offset: u16,
    public_key_instruction_index: u16,
    message_data_offset: u16,
    message_data_size: u16,
    message_instruction_index: u16,
}

/// Extracts `(signer, message)` from Ed25519 precompile instruction data.
///
/// Only single-signature instructions whose key and message live inside the
/// precompile instruction itself are accepted.
pub fn ed25519_signed_payload(data: &[u8]) -> Option<(Pubkey, &[u8])> {
    if data.len() < OFFSETS_START + OFFSETS_LEN || data[0] != 1 {
        return None;
    }
    let offsets: Ed25519SignatureOffsets =
        bytemuck::try_pod_read_unaligned(&data[OFFSETS_START..OFFSETS_START + OFFSETS_LEN])
            .ok()?;
    if offsets.signature_instruction_index != SELF_INSTRUCTION_INDEX
        || offsets.public_key_instruction_index != SELF_INSTRUCTION_INDEX
        || offsets.message_instruction_index != SELF_INSTRUCTION_INDEX
    {
        return None;
    }

    let key_offset = offsets.public_key_offset as usize;
    let message_offset = offsets.message_data_offset as usize;
    let message_end = message_offset.checked_add(offsets.message_data_size as usize)?;
    if data.len() < key_offset.checked_add(32)? || data.len() < message_end {
        return None;
    }
    let signer = Pubkey::new_from_array(*array_ref![data, key_offset, 32]);
    Some((signer, &data[message_offset..message_end]))
}

/// Checks a precompile instruction against the expected message and returns
/// the signing key when it is accepted by `is_minter`.
pub fn verify_bridge_in(
    precompile: &Instruction,
    message: &BridgeInMessage,
    is_minter: impl Fn(&Pubkey) -> bool,
) -> Result<Pubkey> {
    require_keys_eq!(
        precompile.program_id,
        ed25519_program::ID,
        ErrorCode::InvalidBridgeSignature
    );
    let (signer, signed) =
        ed25519_signed_payload(&precompile.data).ok_or(ErrorCode::InvalidBridgeSignature)?;
    require!(
        signed == message.hash().as_slice(),
        ErrorCode::InvalidBridgeSignature
    );
    require!(is_minter(&signer), ErrorCode::InvalidBridgeSignature);
    Ok(signer)
}

/// Loads the instruction placed directly before the executing one.
pub fn load_preceding_instruction(instructions_sysvar: &AccountInfo) -> Result<Instruction> {
    let current = load_current_index_checked(instructions_sysvar)?;
    require_gt!(current, 0, ErrorCode::InvalidBridgeSignature);
    Ok(load_instruction_at_checked(
        (current - 1) as usize,
        instructions_sysvar,
    )?)
}

#[cfg(test)]
pub(crate) mod signature_tests {
    use super::*;

    /// Lays out precompile data the way the Ed25519 program expects it:
    /// header, offsets, key, signature, message.
    pub(crate) fn precompile_data(signer: &Pubkey, message: &[u8]) -> Vec<u8> {
        let key_offset = OFFSETS_START + OFFSETS_LEN;
        let signature_offset = key_offset + 32;
        let message_offset = signature_offset + 64;
        let offsets = Ed25519SignatureOffsets {
            signature_offset: signature_offset as u16,
            signature_instruction_index: SELF_INSTRUCTION_INDEX,
            public_key_offset: key_offset as u16,
            public_key_instruction_index: SELF_INSTRUCTION_INDEX,
            message_data_offset: message_offset as u16,
            message_data_size: message.len() as u16,
            message_instruction_index: SELF_INSTRUCTION_INDEX,
        };
        let mut data = vec![1u8, 0u8];
        data.extend_from_slice(bytemuck::bytes_of(&offsets));
        data.extend_from_slice(signer.as_ref());
        data.extend_from_slice(&[7u8; 64]);
        data.extend_from_slice(message);
        data
    }

    fn sample_message() -> BridgeInMessage {
        BridgeInMessage {
            token: Pubkey::new_unique(),
            instruction_id: 0,
            to: Pubkey::new_unique(),
            amount: 1234,
            deadline: 2_000_000_000,
        }
    }

    fn precompile(data: Vec<u8>) -> Instruction {
        Instruction {
            program_id: ed25519_program::ID,
            accounts: vec![],
            data,
        }
    }

    #[test]
    fn accepts_minter_signature_over_expected_hash() {
        let minter = Pubkey::new_unique();
        let message = sample_message();
        let ix = precompile(precompile_data(&minter, &message.hash()));
        let signer = verify_bridge_in(&ix, &message, |k| *k == minter).unwrap();
        assert_eq!(signer, minter);
    }

    #[test]
    fn rejects_valid_signature_from_non_minter() {
        let user = Pubkey::new_unique();
        let message = sample_message();
        let ix = precompile(precompile_data(&user, &message.hash()));
        let err = verify_bridge_in(&ix, &message, |_| false).unwrap_err();
        assert_eq!(err, error!(ErrorCode::InvalidBridgeSignature));
    }

    #[test]
    fn rejects_signature_over_a_different_instruction_id() {
        let minter = Pubkey::new_unique();
        let signed = sample_message();
        let submitted = BridgeInMessage {
            instruction_id: 2,
            ..signed
        };
        let ix = precompile(precompile_data(&minter, &signed.hash()));
        assert!(verify_bridge_in(&ix, &submitted, |k| *k == minter).is_err());
    }

    #[test]
    fn rejects_instructions_from_other_programs() {
        let minter = Pubkey::new_unique();
        let message = sample_message();
        let mut ix = precompile(precompile_data(&minter, &message.hash()));
        ix.program_id = Pubkey::new_unique();
        assert!(verify_bridge_in(&ix, &message, |k| *k == minter).is_err());
    }

    #[test]
    fn malformed_precompile_data_yields_nothing() {
        assert!(ed25519_signed_payload(&[]).is_none());
        assert!(ed25519_signed_payload(&[1u8; 10]).is_none());

        let minter = Pubkey::new_unique();
        let mut data = precompile_data(&minter, b"hello");
        // point the message past the end
        data[10] = 0xff;
        data[11] = 0x00;
        assert!(ed25519_signed_payload(&data).is_none());

        let mut two_signatures = precompile_data(&minter, b"hello");
        two_signatures[0] = 2;
        assert!(ed25519_signed_payload(&two_signatures).is_none());
    }

    #[test]
    fn hash_binds_every_field() {
        let base = sample_message();
        let variants = [
            BridgeInMessage { amount: base.amount + 1, ..base },
            BridgeInMessage { deadline: base.deadline + 1, ..base },
            BridgeInMessage { to: Pubkey::new_unique(), ..base },
            BridgeInMessage { token: Pubkey::new_unique(), ..base },
        ];
        for variant in variants {
            assert_ne!(variant.hash(), base.hash());
        }
    }
}
