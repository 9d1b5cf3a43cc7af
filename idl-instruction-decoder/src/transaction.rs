//! Decoding every instruction of a Solana transaction.
//!
//! Provides:
//! - [`account_keys`] -- the full ordered key list, including loaded addresses
//! - [`decode_transaction`] -- run registered decoders over a [`VersionedTransaction`]
//! - [`log_transaction`] -- report rejections and print formatted output
//! - Snapshot types for JSON/insta testing

use log::{log, Level};
use serde::Serialize;
use solana_message::{v0::LoadedAddresses, VersionedMessage};
use solana_pubkey::Pubkey;
use solana_signature::Signature;
use solana_transaction::versioned::VersionedTransaction;

use crate::{
    config::DecoderConfig,
    core::{DecodeOutcome, DecodedInstruction},
    formatter::format_transaction,
};

const UNKNOWN_PROGRAM: &str = "Unknown Program";

/// One compiled instruction and what its program's decoder made of it.
#[derive(Debug, Clone)]
pub struct InstructionLog {
    pub index: usize,
    pub program_id: Pubkey,
    pub program_name: String,
    pub data: Vec<u8>,
    pub account_indices: Vec<u8>,
    /// `None` when no decoder is registered for the program.
    pub outcome: Option<DecodeOutcome>,
}

#[derive(Debug, Clone)]
pub struct TransactionLog {
    pub signature: Signature,
    pub instructions: Vec<InstructionLog>,
}

impl TransactionLog {
    /// Successfully decoded instructions, in order.
    pub fn decoded(&self) -> impl Iterator<Item = &DecodedInstruction> {
        self.instructions
            .iter()
            .filter_map(|ix| ix.outcome.as_ref().and_then(DecodeOutcome::decoded))
    }
}

// ---------------------------------------------------------------------------
// Account keys
// ---------------------------------------------------------------------------

/// Full ordered account-key list: static keys, then loaded writable, then
/// loaded readonly addresses. `loaded` is ignored for legacy messages.
pub fn account_keys(message: &VersionedMessage, loaded: Option<&LoadedAddresses>) -> Vec<Pubkey> {
    let mut keys = message.static_account_keys().to_vec();
    if let (VersionedMessage::V0(_), Some(loaded)) = (message, loaded) {
        keys.extend_from_slice(&loaded.writable);
        keys.extend_from_slice(&loaded.readonly);
    }
    keys
}

// ---------------------------------------------------------------------------
// Transaction decoding
// ---------------------------------------------------------------------------

/// Decode every instruction in `message` whose program has a registered decoder.
///
/// Each instruction is decoded independently; a rejected instruction never
/// affects the ones after it.
pub fn decode_message(
    message: &VersionedMessage,
    loaded: Option<&LoadedAddresses>,
    config: &DecoderConfig,
) -> Vec<InstructionLog> {
    let keys = account_keys(message, loaded);
    let registry = config.decoder_registry();
    let level = if config.verbose {
        Level::Warn
    } else {
        Level::Debug
    };

    message
        .instructions()
        .iter()
        .enumerate()
        .map(|(index, compiled_ix)| {
            let program_id = keys
                .get(usize::from(compiled_ix.program_id_index))
                .copied()
                .unwrap_or_default();
            let program_name = registry
                .program_name(&program_id)
                .unwrap_or(UNKNOWN_PROGRAM)
                .to_string();
            let outcome =
                registry.decode(&program_id, &compiled_ix.data, &keys, &compiled_ix.accounts);

            if let Some(outcome) = outcome.as_ref().filter(|outcome| outcome.is_rejected()) {
                log!(level, "instruction {index} ({program_name}): {outcome}");
            }

            InstructionLog {
                index,
                program_id,
                program_name,
                data: compiled_ix.data.clone(),
                account_indices: compiled_ix.accounts.clone(),
                outcome,
            }
        })
        .collect()
}

pub fn decode_transaction(tx: &VersionedTransaction, config: &DecoderConfig) -> TransactionLog {
    decode_transaction_with_loaded(tx, None, config)
}

/// Like [`decode_transaction`], with addresses loaded from lookup tables.
pub fn decode_transaction_with_loaded(
    tx: &VersionedTransaction,
    loaded: Option<&LoadedAddresses>,
    config: &DecoderConfig,
) -> TransactionLog {
    TransactionLog {
        signature: tx.signatures.first().copied().unwrap_or_default(),
        instructions: decode_message(&tx.message, loaded, config),
    }
}

/// Print the formatted transaction to stderr when `config.log_events` is set.
pub fn log_transaction(log: &TransactionLog, config: &DecoderConfig, tx_number: usize) {
    if config.log_events {
        eprint!("{}", format_transaction(log, tx_number));
    }
}

// ---------------------------------------------------------------------------
// Snapshot types (JSON-serializable for insta)
// ---------------------------------------------------------------------------

/// JSON-serializable snapshot of an entire transaction.
#[derive(Debug, Serialize)]
pub struct TransactionSnapshot {
    pub signature: String,
    pub instructions: Vec<InstructionSnapshot>,
}

/// JSON-serializable snapshot of a single instruction.
#[derive(Debug, Serialize)]
pub struct InstructionSnapshot {
    pub index: usize,
    pub program_id: String,
    pub program_name: String,
    pub outcome: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoded: Option<DecodedInstruction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

pub fn transaction_log_to_snapshot(log: &TransactionLog) -> TransactionSnapshot {
    TransactionSnapshot {
        signature: log.signature.to_string(),
        instructions: log.instructions.iter().map(instruction_to_snapshot).collect(),
    }
}

fn instruction_to_snapshot(ix: &InstructionLog) -> InstructionSnapshot {
    let (outcome, decoded, reason) = match &ix.outcome {
        None => ("no_decoder", None, None),
        Some(DecodeOutcome::Decoded(decoded)) => ("decoded", Some(decoded.clone()), None),
        Some(other) => (other.kind(), None, Some(other.to_string())),
    };
    InstructionSnapshot {
        index: ix.index,
        program_id: ix.program_id.to_string(),
        program_name: ix.program_name.clone(),
        outcome: outcome.to_string(),
        decoded,
        reason,
    }
}

/// Decode a transaction and convert it into a JSON-serializable snapshot.
pub fn decode_transaction_snapshot(
    tx: &VersionedTransaction,
    config: &DecoderConfig,
) -> TransactionSnapshot {
    transaction_log_to_snapshot(&decode_transaction(tx, config))
}
