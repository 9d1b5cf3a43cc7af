//! Shared fixtures and builders for the decoder integration tests.
//!
//! Provides IDL fixtures, Borsh-style payload encoding helpers and
//! transaction builders that need no signing or runtime.

use std::sync::Arc;

use idl_instruction_decoder::Schema;
use solana_hash::Hash;
use solana_instruction::Instruction;
use solana_message::{
    compiled_instruction::CompiledInstruction, v0, Message, MessageHeader, VersionedMessage,
};
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::versioned::VersionedTransaction;

pub use idl_instruction_decoder::DecoderConfig as Config;

pub const LAUNCHLAB_IDL: &str = include_str!("../fixtures/raydium_launchlab.json");
pub const PUMP_LEGACY_IDL: &str = include_str!("../fixtures/pump_legacy.json");

pub const LAUNCHLAB_PROGRAM_ID: Pubkey =
    solana_pubkey::pubkey!("LanMV9sAd7wArD4vJFi2qDdfnVhFxYSUg6eADduJ3uj");

pub const INITIALIZE_DISCRIMINATOR: [u8; 8] = [175, 175, 109, 31, 13, 152, 155, 237];
pub const BUY_EXACT_IN_DISCRIMINATOR: [u8; 8] = [250, 234, 13, 123, 213, 156, 19, 236];

pub fn launchlab_schema() -> Arc<Schema> {
    Arc::new(Schema::from_json(LAUNCHLAB_IDL).unwrap())
}

pub fn pump_legacy_schema() -> Arc<Schema> {
    Arc::new(Schema::from_json(PUMP_LEGACY_IDL).unwrap())
}

/// Compute Anchor discriminator: sha256("global:<name>")[..8]
pub fn anchor_discriminator(name: &str) -> [u8; 8] {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(format!("global:{name}").as_bytes());
    let hash = hasher.finalize();
    let mut disc = [0u8; 8];
    disc.copy_from_slice(&hash[..8]);
    disc
}

/// Deterministic pubkey with every byte set to `byte`.
pub fn key(byte: u8) -> Pubkey {
    Pubkey::new_from_array([byte; 32])
}

// ---------------------------------------------------------------------------
// Payload encoding
// ---------------------------------------------------------------------------

/// Little-endian instruction payload builder.
#[derive(Debug, Clone, Default)]
pub struct Payload(Vec<u8>);

impl Payload {
    pub fn new(discriminator: [u8; 8]) -> Self {
        Self(discriminator.to_vec())
    }

    pub fn u8(mut self, value: u8) -> Self {
        self.0.push(value);
        self
    }

    pub fn u16(mut self, value: u16) -> Self {
        self.0.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn u32(mut self, value: u32) -> Self {
        self.0.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn u64(mut self, value: u64) -> Self {
        self.0.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn i64(mut self, value: i64) -> Self {
        self.0.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn string(mut self, value: &str) -> Self {
        self.0
            .extend_from_slice(&(value.len() as u32).to_le_bytes());
        self.0.extend_from_slice(value.as_bytes());
        self
    }

    pub fn pubkey(mut self, value: &Pubkey) -> Self {
        self.0.extend_from_slice(value.as_ref());
        self
    }

    pub fn bytes(mut self, value: &[u8]) -> Self {
        self.0.extend_from_slice(value);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.0
    }
}

/// Parameters of a LaunchLab `initialize` with a constant curve.
pub struct InitializeParams<'a> {
    pub decimals: u8,
    pub name: &'a str,
    pub symbol: &'a str,
    pub uri: &'a str,
    pub supply: u64,
    pub total_base_sell: u64,
    pub total_quote_fund_raising: u64,
    pub migrate_type: u8,
    pub total_locked_amount: u64,
    pub cliff_period: u64,
    pub unlock_period: u64,
}

impl Default for InitializeParams<'_> {
    fn default() -> Self {
        Self {
            decimals: 6,
            name: "Bonk Dog",
            symbol: "BDOG",
            uri: "https://ipfs.io/ipfs/bdog.json",
            supply: 1_000_000_000_000_000,
            total_base_sell: 793_100_000_000_000,
            total_quote_fund_raising: 85_000_000_000,
            migrate_type: 1,
            total_locked_amount: 0,
            cliff_period: 0,
            unlock_period: 0,
        }
    }
}

impl InitializeParams<'_> {
    pub fn encode(&self) -> Vec<u8> {
        Payload::new(INITIALIZE_DISCRIMINATOR)
            .u8(self.decimals)
            .string(self.name)
            .string(self.symbol)
            .string(self.uri)
            .u8(0)
            .u64(self.supply)
            .u64(self.total_base_sell)
            .u64(self.total_quote_fund_raising)
            .u8(self.migrate_type)
            .u64(self.total_locked_amount)
            .u64(self.cliff_period)
            .u64(self.unlock_period)
            .build()
    }
}

// ---------------------------------------------------------------------------
// Transaction builders
// ---------------------------------------------------------------------------

/// Unsigned legacy transaction; signatures are zeroed placeholders.
pub fn legacy_transaction(instructions: &[Instruction], payer: &Pubkey) -> VersionedTransaction {
    let message = Message::new(instructions, Some(payer));
    let signatures =
        vec![Signature::default(); usize::from(message.header.num_required_signatures)];
    VersionedTransaction {
        signatures,
        message: VersionedMessage::Legacy(message),
    }
}

/// Unsigned v0 transaction with an explicit static key list and compiled instructions.
pub fn v0_transaction(
    account_keys: Vec<Pubkey>,
    instructions: Vec<CompiledInstruction>,
) -> VersionedTransaction {
    let message = v0::Message {
        header: MessageHeader {
            num_required_signatures: 1,
            num_readonly_signed_accounts: 0,
            num_readonly_unsigned_accounts: 0,
        },
        account_keys,
        recent_blockhash: Hash::default(),
        instructions,
        address_table_lookups: vec![],
    };
    VersionedTransaction {
        signatures: vec![Signature::default()],
        message: VersionedMessage::V0(message),
    }
}

pub fn compiled(program_id_index: u8, accounts: Vec<u8>, data: Vec<u8>) -> CompiledInstruction {
    CompiledInstruction {
        program_id_index,
        accounts,
        data,
    }
}
