//! Schema-driven instruction decoder for Anchor-style programs.
//!
//! This crate provides:
//! - An immutable [`Schema`] loaded from an IDL document
//! - Minimum-size estimation used to reject truncated or coincidental matches
//! - Recursive decoding of primitives, structs and enums into [`DecodedValue`]s
//! - [`decode_instruction`] returning an explicit [`DecodeOutcome`] per instruction
//! - A [`DecoderRegistry`] and transaction-level decoding for many programs
//!
//! Decoding is synchronous and keeps no state between calls; a schema can be
//! shared through an `Arc` by any number of threads.

pub use solana_pubkey;

mod core;
pub use self::core::{
    AccountKey, DecodeOutcome, DecodedAccount, DecodedField, DecodedInstruction, DecodedValue,
    InstructionDecoder,
};

pub mod config;
pub mod decode;
pub mod error;
pub mod instruction;
pub mod registry;
pub mod schema;
pub mod size;

// Off-chain only modules (uses tabled)
#[cfg(not(target_os = "solana"))]
pub mod formatter;
#[cfg(all(not(target_os = "solana"), feature = "transaction"))]
pub mod transaction;

pub use config::DecoderConfig;
pub use decode::TypeDecoder;
pub use error::{DecodeError, SchemaError, SizeUnknown};
pub use instruction::{decode_instruction, IdlInstructionDecoder};
pub use registry::DecoderRegistry;
pub use schema::{
    anchor_discriminator, AccountDef, Discriminator, Field, InstructionDef, Primitive, Schema,
    TypeDef, TypeRef, Variant,
};
pub use size::{MinSize, SizeEstimator};
#[cfg(all(not(target_os = "solana"), feature = "transaction"))]
pub use transaction::{decode_transaction, TransactionLog, TransactionSnapshot};
