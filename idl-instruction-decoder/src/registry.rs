//! Decoder registry keyed by program id.

use std::{collections::HashMap, fmt, sync::Arc};

use solana_pubkey::Pubkey;

use crate::{
    core::{DecodeOutcome, InstructionDecoder},
    instruction::IdlInstructionDecoder,
    schema::Schema,
};

/// Holds one [`InstructionDecoder`] per program id.
#[derive(Clone, Default)]
pub struct DecoderRegistry {
    decoders: HashMap<Pubkey, Arc<dyn InstructionDecoder>>,
}

impl DecoderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a decoder, replacing any existing decoder for the same program.
    pub fn register(&mut self, decoder: Box<dyn InstructionDecoder>) {
        self.decoders.insert(decoder.program_id(), Arc::from(decoder));
    }

    /// Register a schema-backed decoder for `program_id`.
    pub fn register_schema(&mut self, program_id: Pubkey, schema: Arc<Schema>) {
        self.register(Box::new(IdlInstructionDecoder::with_program_id(
            program_id, schema,
        )));
    }

    pub fn has_decoder(&self, program_id: &Pubkey) -> bool {
        self.decoders.contains_key(program_id)
    }

    pub fn get(&self, program_id: &Pubkey) -> Option<&dyn InstructionDecoder> {
        self.decoders.get(program_id).map(|decoder| decoder.as_ref())
    }

    pub fn program_name(&self, program_id: &Pubkey) -> Option<&str> {
        self.get(program_id).map(|decoder| decoder.program_name())
    }

    /// Decode with the program's decoder, or `None` if no decoder is registered.
    pub fn decode(
        &self,
        program_id: &Pubkey,
        data: &[u8],
        account_keys: &[Pubkey],
        account_indices: &[u8],
    ) -> Option<DecodeOutcome> {
        self.get(program_id)
            .map(|decoder| decoder.decode(data, account_keys, account_indices))
    }

    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }
}

impl fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.decoders
                    .iter()
                    .map(|(program_id, decoder)| (program_id, decoder.program_name())),
            )
            .finish()
    }
}
