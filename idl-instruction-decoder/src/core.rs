//! Core types for instruction decoding.

use std::fmt;

use serde::{ser::SerializeMap, Serialize, Serializer};
use solana_pubkey::Pubkey;

use crate::error::DecodeError;

/// A decoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedValue {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Bool(bool),
    String(String),
    Pubkey(Pubkey),
    /// Struct fields in declaration order.
    Struct(Vec<DecodedField>),
    /// Selected enum variant and its fields in declaration order.
    Enum {
        variant: String,
        fields: Vec<DecodedField>,
    },
}

impl DecodedValue {
    /// Look up a struct or enum field by name.
    pub fn field(&self, name: &str) -> Option<&DecodedValue> {
        match self {
            DecodedValue::Struct(fields) | DecodedValue::Enum { fields, .. } => {
                find_field(fields, name)
            }
            _ => None,
        }
    }

    pub fn variant(&self) -> Option<&str> {
        match self {
            DecodedValue::Enum { variant, .. } => Some(variant.as_str()),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            DecodedValue::U8(v) => Some(v.into()),
            DecodedValue::U16(v) => Some(v.into()),
            DecodedValue::U32(v) => Some(v.into()),
            DecodedValue::U64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            DecodedValue::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_pubkey(&self) -> Option<&Pubkey> {
        match self {
            DecodedValue::Pubkey(pubkey) => Some(pubkey),
            _ => None,
        }
    }
}

/// Base58 text form of a pubkey, for display and serialization only.
pub(crate) fn base58(pubkey: &Pubkey) -> String {
    bs58::encode(pubkey.to_bytes()).into_string()
}

fn find_field<'a>(fields: &'a [DecodedField], name: &str) -> Option<&'a DecodedValue> {
    fields.iter().find(|f| f.name == name).map(|f| &f.value)
}

impl fmt::Display for DecodedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedValue::U8(v) => write!(f, "{v}"),
            DecodedValue::U16(v) => write!(f, "{v}"),
            DecodedValue::U32(v) => write!(f, "{v}"),
            DecodedValue::U64(v) => write!(f, "{v}"),
            DecodedValue::I8(v) => write!(f, "{v}"),
            DecodedValue::I16(v) => write!(f, "{v}"),
            DecodedValue::I32(v) => write!(f, "{v}"),
            DecodedValue::I64(v) => write!(f, "{v}"),
            DecodedValue::Bool(v) => write!(f, "{v}"),
            DecodedValue::String(v) => write!(f, "{v:?}"),
            DecodedValue::Pubkey(v) => f.write_str(&base58(v)),
            DecodedValue::Struct(fields) => write_fields(f, fields),
            DecodedValue::Enum { variant, fields } => {
                f.write_str(variant)?;
                if !fields.is_empty() {
                    f.write_str(" ")?;
                    write_fields(f, fields)?;
                }
                Ok(())
            }
        }
    }
}

fn write_fields(f: &mut fmt::Formatter<'_>, fields: &[DecodedField]) -> fmt::Result {
    f.write_str("{ ")?;
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}: {}", field.name, field.value)?;
    }
    f.write_str(" }")
}

impl Serialize for DecodedValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            DecodedValue::U8(v) => serializer.serialize_u8(*v),
            DecodedValue::U16(v) => serializer.serialize_u16(*v),
            DecodedValue::U32(v) => serializer.serialize_u32(*v),
            DecodedValue::U64(v) => serializer.serialize_u64(*v),
            DecodedValue::I8(v) => serializer.serialize_i8(*v),
            DecodedValue::I16(v) => serializer.serialize_i16(*v),
            DecodedValue::I32(v) => serializer.serialize_i32(*v),
            DecodedValue::I64(v) => serializer.serialize_i64(*v),
            DecodedValue::Bool(v) => serializer.serialize_bool(*v),
            DecodedValue::String(v) => serializer.serialize_str(v),
            DecodedValue::Pubkey(v) => serializer.serialize_str(&base58(v)),
            DecodedValue::Struct(fields) => FieldMap(fields).serialize(serializer),
            DecodedValue::Enum { variant, fields } => {
                let mut map = serializer.serialize_map(Some(fields.len() + 1))?;
                map.serialize_entry("variant", variant)?;
                for field in fields {
                    map.serialize_entry(&field.name, &field.value)?;
                }
                map.end()
            }
        }
    }
}

/// Serializes an ordered field list as a JSON object.
struct FieldMap<'a>(&'a [DecodedField]);

impl Serialize for FieldMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for field in self.0 {
            map.serialize_entry(&field.name, &field.value)?;
        }
        map.end()
    }
}

/// A named decoded value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedField {
    pub name: String,
    pub value: DecodedValue,
}

impl DecodedField {
    pub fn new(name: impl Into<String>, value: DecodedValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Resolution of one declared account slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKey {
    Resolved(Pubkey),
    /// The slot index or the key index it points to was out of range.
    Unresolved,
}

impl AccountKey {
    pub fn pubkey(&self) -> Option<Pubkey> {
        match self {
            AccountKey::Resolved(pubkey) => Some(*pubkey),
            AccountKey::Unresolved => None,
        }
    }
}

impl fmt::Display for AccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountKey::Resolved(pubkey) => f.write_str(&base58(pubkey)),
            AccountKey::Unresolved => f.write_str("N/A"),
        }
    }
}

impl Serialize for AccountKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            AccountKey::Resolved(pubkey) => serializer.serialize_str(&base58(pubkey)),
            AccountKey::Unresolved => serializer.serialize_none(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAccount {
    pub name: String,
    pub key: AccountKey,
}

/// Result of successfully decoding an instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedInstruction {
    /// Instruction name as declared in the schema.
    pub name: String,
    /// Decoded arguments in declaration order.
    pub args: Vec<DecodedField>,
    /// Declared account slots in order.
    pub accounts: Vec<DecodedAccount>,
    /// Offset just past the last decoded argument.
    pub consumed: usize,
}

impl DecodedInstruction {
    pub fn arg(&self, name: &str) -> Option<&DecodedValue> {
        find_field(&self.args, name)
    }

    pub fn account(&self, name: &str) -> Option<AccountKey> {
        self.accounts.iter().find(|a| a.name == name).map(|a| a.key)
    }
}

impl Serialize for DecodedInstruction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        struct AccountMap<'a>(&'a [DecodedAccount]);

        impl Serialize for AccountMap<'_> {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                let mut map = serializer.serialize_map(Some(self.0.len()))?;
                for account in self.0 {
                    map.serialize_entry(&account.name, &account.key)?;
                }
                map.end()
            }
        }

        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("instruction_name", &self.name)?;
        map.serialize_entry("args", &FieldMap(&self.args))?;
        map.serialize_entry("accounts", &AccountMap(&self.accounts))?;
        map.serialize_entry("consumed", &self.consumed)?;
        map.end()
    }
}

/// Outcome of presenting one instruction to a decoder.
///
/// Every non-success case is explicit so callers can tell an instruction that
/// is simply not of interest apart from a malformed one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeOutcome {
    Decoded(DecodedInstruction),
    /// Data shorter than a discriminator.
    NotApplicable,
    /// Discriminator absent from the schema.
    NotOfInterest,
    /// Data shorter than the instruction's minimum size.
    TooShort {
        instruction: String,
        expected_min: usize,
        actual: usize,
    },
    /// Structural decode failure.
    DecodeFailed {
        instruction: String,
        error: DecodeError,
    },
}

impl DecodeOutcome {
    pub fn is_decoded(&self) -> bool {
        matches!(self, DecodeOutcome::Decoded(_))
    }

    pub fn decoded(&self) -> Option<&DecodedInstruction> {
        match self {
            DecodeOutcome::Decoded(decoded) => Some(decoded),
            _ => None,
        }
    }

    pub fn into_decoded(self) -> Option<DecodedInstruction> {
        match self {
            DecodeOutcome::Decoded(decoded) => Some(decoded),
            _ => None,
        }
    }

    /// Whether the instruction matched a schema entry but could not be decoded.
    pub fn is_rejected(&self) -> bool {
        matches!(
            self,
            DecodeOutcome::TooShort { .. } | DecodeOutcome::DecodeFailed { .. }
        )
    }

    /// Name of the matched schema instruction, if the discriminator matched.
    pub fn instruction_name(&self) -> Option<&str> {
        match self {
            DecodeOutcome::Decoded(decoded) => Some(decoded.name.as_str()),
            DecodeOutcome::TooShort { instruction, .. }
            | DecodeOutcome::DecodeFailed { instruction, .. } => Some(instruction.as_str()),
            DecodeOutcome::NotApplicable | DecodeOutcome::NotOfInterest => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            DecodeOutcome::Decoded(_) => "decoded",
            DecodeOutcome::NotApplicable => "not_applicable",
            DecodeOutcome::NotOfInterest => "not_of_interest",
            DecodeOutcome::TooShort { .. } => "too_short",
            DecodeOutcome::DecodeFailed { .. } => "decode_failed",
        }
    }
}

impl fmt::Display for DecodeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeOutcome::Decoded(decoded) => write!(f, "decoded {}", decoded.name),
            DecodeOutcome::NotApplicable => {
                f.write_str("not applicable: shorter than a discriminator")
            }
            DecodeOutcome::NotOfInterest => f.write_str("not of interest"),
            DecodeOutcome::TooShort {
                instruction,
                expected_min,
                actual,
            } => write!(f, "short {instruction} data ({actual}/{expected_min} bytes)"),
            DecodeOutcome::DecodeFailed { instruction, error } => {
                write!(f, "failed to decode {instruction}: {error}")
            }
        }
    }
}

/// Trait for instruction decoders - each program implements this.
pub trait InstructionDecoder: Send + Sync {
    /// Program ID this decoder handles.
    fn program_id(&self) -> Pubkey;

    /// Human-readable program name.
    fn program_name(&self) -> &str;

    /// Decode one instruction.
    ///
    /// `account_keys` is the transaction's full ordered key list and
    /// `account_indices` the instruction's indices into it.
    fn decode(&self, data: &[u8], account_keys: &[Pubkey], account_indices: &[u8])
        -> DecodeOutcome;
}
