//! Error types for schema loading, size estimation and instruction decoding.
//!
//! Only [`SchemaError`] is fatal. [`DecodeError`] and [`SizeUnknown`] are
//! scoped to a single instruction and never poison the schema or later calls.

use std::path::PathBuf;

use thiserror::Error;

/// Malformed schema document. Raised at load time only.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("failed to read schema file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid schema document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("instruction `{instruction}` has a {len}-byte discriminator, expected 8")]
    InvalidDiscriminator { instruction: String, len: usize },

    #[error("instructions `{first}` and `{second}` share the same discriminator")]
    DuplicateDiscriminator { first: String, second: String },

    #[error("type `{0}` is defined more than once")]
    DuplicateTypeName(String),

    #[error("program address `{address}` is not a valid base58 pubkey")]
    InvalidAddress { address: String },

    #[error("schema does not declare a program address")]
    MissingProgramId,
}

/// Structural failure while decoding one instruction's arguments.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("not enough data for {type_name} at offset {offset}: need {needed} bytes, {remaining} remain")]
    InsufficientBytes {
        type_name: &'static str,
        offset: usize,
        needed: usize,
        remaining: usize,
    },

    #[error("string at offset {offset} claims {length} bytes but only {remaining} remain")]
    StringLengthOverflow {
        offset: usize,
        length: usize,
        remaining: usize,
    },

    #[error("invalid {type_name} at offset {offset}: {reason}")]
    InvalidValue {
        type_name: &'static str,
        offset: usize,
        reason: String,
    },

    #[error("enum `{type_name}` tag {tag} at offset {offset} is out of range ({variant_count} variants)")]
    InvalidEnumTag {
        type_name: String,
        offset: usize,
        tag: u8,
        variant_count: usize,
    },

    #[error("unknown type `{name}` referenced at offset {offset}")]
    UnknownType { name: String, offset: usize },

    #[error("unsupported type `{name}` at offset {offset}")]
    UnsupportedType { name: String, offset: usize },

    #[error("type nesting deeper than {limit} at offset {offset}")]
    DepthLimitExceeded { limit: usize, offset: usize },
}

impl DecodeError {
    /// Byte offset into the instruction data at which decoding failed.
    pub fn offset(&self) -> usize {
        match self {
            Self::InsufficientBytes { offset, .. }
            | Self::StringLengthOverflow { offset, .. }
            | Self::InvalidValue { offset, .. }
            | Self::InvalidEnumTag { offset, .. }
            | Self::UnknownType { offset, .. }
            | Self::UnsupportedType { offset, .. }
            | Self::DepthLimitExceeded { offset, .. } => *offset,
        }
    }
}

/// Reason an instruction's minimum size could not be computed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SizeUnknown {
    #[error("unknown type `{0}`")]
    UnknownType(String),

    #[error("unsupported type `{0}`")]
    Unsupported(String),

    #[error("type `{0}` is recursive")]
    Recursive(String),
}
