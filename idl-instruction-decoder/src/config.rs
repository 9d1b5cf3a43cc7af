//! Configuration for transaction-level decoding and logging.

use std::{env, sync::Arc};

use solana_pubkey::Pubkey;

use crate::{core::InstructionDecoder, registry::DecoderRegistry, schema::Schema};

const VERBOSE_ENV: &str = "IDL_DECODER_VERBOSE";
const LOG_EVENTS_ENV: &str = "IDL_DECODER_LOG_EVENTS";

/// Controls how decoded transactions are reported and which programs are decoded.
#[derive(Debug, Clone, Default)]
pub struct DecoderConfig {
    /// Log rejected instructions (too short, decode failed) at `warn` instead of `debug`.
    pub verbose: bool,
    /// Print every formatted transaction to stderr.
    pub log_events: bool,
    registry: DecoderRegistry,
}

impl DecoderConfig {
    /// Both flags on.
    pub fn debug() -> Self {
        Self {
            verbose: true,
            log_events: true,
            ..Self::default()
        }
    }

    /// Read flags from `IDL_DECODER_VERBOSE` and `IDL_DECODER_LOG_EVENTS`.
    pub fn from_env() -> Self {
        Self {
            verbose: env_flag(VERBOSE_ENV),
            log_events: env_flag(LOG_EVENTS_ENV),
            ..Self::default()
        }
    }

    pub fn with_decoders(mut self, decoders: Vec<Box<dyn InstructionDecoder>>) -> Self {
        for decoder in decoders {
            self.registry.register(decoder);
        }
        self
    }

    pub fn with_schema(mut self, program_id: Pubkey, schema: Arc<Schema>) -> Self {
        self.registry.register_schema(program_id, schema);
        self
    }

    pub fn decoder_registry(&self) -> &DecoderRegistry {
        &self.registry
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|value| parse_flag(&value))
        .unwrap_or(false)
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
