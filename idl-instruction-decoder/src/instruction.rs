//! Schema-driven instruction decoding.
//!
//! [`decode_instruction`] runs the full pipeline for one instruction:
//! discriminator lookup, size gate, argument decode and account resolution.
//! [`IdlInstructionDecoder`] binds a schema to a program id so it can sit in a
//! [`DecoderRegistry`](crate::DecoderRegistry) next to other decoders.

use std::sync::Arc;

use solana_pubkey::Pubkey;

use crate::{
    core::{AccountKey, DecodeOutcome, DecodedAccount, DecodedInstruction, InstructionDecoder},
    decode::TypeDecoder,
    error::SchemaError,
    schema::{AccountDef, Discriminator, Schema, DISCRIMINATOR_LEN},
    size::MinSize,
};

/// Decode one instruction against `schema`.
///
/// `account_keys` is the transaction's full ordered key list and
/// `account_indices` the instruction's local indices into it.
pub fn decode_instruction(
    schema: &Schema,
    data: &[u8],
    account_keys: &[Pubkey],
    account_indices: &[u8],
) -> DecodeOutcome {
    let Some(discriminator) = data
        .get(..DISCRIMINATOR_LEN)
        .and_then(|prefix| Discriminator::try_from(prefix).ok())
    else {
        return DecodeOutcome::NotApplicable;
    };
    let Some(instruction) = schema.instruction(&discriminator) else {
        return DecodeOutcome::NotOfInterest;
    };

    if let MinSize::Known(expected_min) = instruction.min_size {
        if data.len() < expected_min {
            return DecodeOutcome::TooShort {
                instruction: instruction.name.clone(),
                expected_min,
                actual: data.len(),
            };
        }
    }

    let decoder = TypeDecoder::new(schema);
    let (args, consumed) = match decoder.decode_fields(data, DISCRIMINATOR_LEN, &instruction.args)
    {
        Ok(decoded) => decoded,
        Err(error) => {
            return DecodeOutcome::DecodeFailed {
                instruction: instruction.name.clone(),
                error,
            }
        }
    };

    DecodeOutcome::Decoded(DecodedInstruction {
        name: instruction.name.clone(),
        args,
        accounts: resolve_accounts(&instruction.accounts, account_keys, account_indices),
        consumed,
    })
}

/// Map declared account slots to keys. Slot `i` reads `account_indices[i]`;
/// either lookup being out of range leaves that slot unresolved.
pub fn resolve_accounts(
    accounts: &[AccountDef],
    account_keys: &[Pubkey],
    account_indices: &[u8],
) -> Vec<DecodedAccount> {
    accounts
        .iter()
        .enumerate()
        .map(|(slot, account)| {
            let key = account_indices
                .get(slot)
                .and_then(|&index| account_keys.get(usize::from(index)))
                .map_or(AccountKey::Unresolved, |pubkey| AccountKey::Resolved(*pubkey));
            DecodedAccount {
                name: account.name.clone(),
                key,
            }
        })
        .collect()
}

/// An [`InstructionDecoder`] backed by a loaded [`Schema`].
#[derive(Debug, Clone)]
pub struct IdlInstructionDecoder {
    program_id: Pubkey,
    program_name: String,
    schema: Arc<Schema>,
}

impl IdlInstructionDecoder {
    /// Use the program address and name declared in the schema.
    pub fn new(schema: Arc<Schema>) -> Result<Self, SchemaError> {
        let program_id = schema.address().ok_or(SchemaError::MissingProgramId)?;
        Ok(Self::with_program_id(program_id, schema))
    }

    /// Bind the schema to an explicit program id.
    pub fn with_program_id(program_id: Pubkey, schema: Arc<Schema>) -> Self {
        let program_name = schema
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| program_id.to_string());
        Self {
            program_id,
            program_name,
            schema,
        }
    }

    pub fn with_program_name(mut self, program_name: impl Into<String>) -> Self {
        self.program_name = program_name.into();
        self
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }
}

impl InstructionDecoder for IdlInstructionDecoder {
    fn program_id(&self) -> Pubkey {
        self.program_id
    }

    fn program_name(&self) -> &str {
        &self.program_name
    }

    fn decode(
        &self,
        data: &[u8],
        account_keys: &[Pubkey],
        account_indices: &[u8],
    ) -> DecodeOutcome {
        decode_instruction(&self.schema, data, account_keys, account_indices)
    }
}
