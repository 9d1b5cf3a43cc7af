//! Immutable in-memory schema built from an IDL document.
//!
//! A [`Schema`] maps 8-byte discriminators to [`InstructionDef`]s and type
//! names to [`TypeDef`]s. It is built once by [`Schema::from_json`] (or one of
//! its siblings in [`idl`]) and never mutated afterwards, so a single
//! `Arc<Schema>` can back any number of concurrent decode calls.

pub mod idl;

use std::collections::HashMap;

use solana_pubkey::Pubkey;

use crate::size::{MinSize, SizeEstimator};

pub use idl::{anchor_discriminator, IdlDocument};

/// Number of bytes in an instruction discriminator.
pub const DISCRIMINATOR_LEN: usize = 8;

/// Fixed 8-byte prefix identifying an instruction.
pub type Discriminator = [u8; DISCRIMINATOR_LEN];

/// Primitive wire types. All multi-byte integers are little-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    Bool,
    /// 4-byte length prefix followed by UTF-8 bytes.
    String,
    /// 32 raw bytes.
    Pubkey,
}

impl Primitive {
    /// Parse a primitive type name. `publicKey` is accepted for older IDLs.
    pub fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "u8" => Self::U8,
            "u16" => Self::U16,
            "u32" => Self::U32,
            "u64" => Self::U64,
            "i8" => Self::I8,
            "i16" => Self::I16,
            "i32" => Self::I32,
            "i64" => Self::I64,
            "bool" => Self::Bool,
            "string" => Self::String,
            "pubkey" | "publicKey" => Self::Pubkey,
            _ => return None,
        })
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::Bool => "bool",
            Self::String => "string",
            Self::Pubkey => "pubkey",
        }
    }

    /// Minimum encoded size in bytes.
    ///
    /// For `string` this is only the length prefix; the body is unbounded.
    pub fn min_size(self) -> usize {
        match self {
            Self::U8 | Self::I8 | Self::Bool => 1,
            Self::U16 | Self::I16 => 2,
            Self::U32 | Self::I32 | Self::String => 4,
            Self::U64 | Self::I64 => 8,
            Self::Pubkey => 32,
        }
    }
}

/// Reference to a field's type.
///
/// `Defined` holds only the name; it is looked up in [`Schema::type_def`]
/// every time it is decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Primitive(Primitive),
    Defined(String),
    /// A type reference the decoder cannot interpret (`vec`, `option`,
    /// `array`, `u128`, ...). Kept so the schema still loads.
    Unsupported(String),
}

/// A named, typed field of an instruction, struct or enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub ty: TypeRef,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub name: String,
    pub fields: Vec<Field>,
}

/// A user-defined composite type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDef {
    Struct { fields: Vec<Field> },
    Enum { variants: Vec<Variant> },
    /// Any kind other than `struct` or `enum` (`alias`, `type`, ...).
    Unsupported { kind: String },
}

/// Positional account slot. Its index is its declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountDef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionDef {
    pub name: String,
    pub discriminator: Discriminator,
    pub args: Vec<Field>,
    pub accounts: Vec<AccountDef>,
    /// Minimum valid payload size including the discriminator, computed once
    /// at load time.
    pub min_size: MinSize,
}

/// Immutable decoding schema for a single program.
#[derive(Debug, Clone)]
pub struct Schema {
    name: Option<String>,
    address: Option<Pubkey>,
    instructions: HashMap<Discriminator, InstructionDef>,
    instruction_order: Vec<Discriminator>,
    types: HashMap<String, TypeDef>,
}

impl Schema {
    pub(crate) fn new(
        name: Option<String>,
        address: Option<Pubkey>,
        instructions: HashMap<Discriminator, InstructionDef>,
        instruction_order: Vec<Discriminator>,
        types: HashMap<String, TypeDef>,
    ) -> Self {
        Self {
            name,
            address,
            instructions,
            instruction_order,
            types,
        }
    }

    /// Program name declared by the document, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Program address declared by the document, if any.
    pub fn address(&self) -> Option<Pubkey> {
        self.address
    }

    pub fn instruction(&self, discriminator: &Discriminator) -> Option<&InstructionDef> {
        self.instructions.get(discriminator)
    }

    pub fn instruction_by_name(&self, name: &str) -> Option<&InstructionDef> {
        self.instructions().find(|ix| ix.name == name)
    }

    /// Instructions in declaration order.
    pub fn instructions(&self) -> impl Iterator<Item = &InstructionDef> {
        self.instruction_order
            .iter()
            .filter_map(|disc| self.instructions.get(disc))
    }

    pub fn instruction_names(&self) -> Vec<&str> {
        self.instructions().map(|ix| ix.name.as_str()).collect()
    }

    /// Map of instruction name to discriminator.
    pub fn discriminators(&self) -> HashMap<&str, Discriminator> {
        self.instructions()
            .map(|ix| (ix.name.as_str(), ix.discriminator))
            .collect()
    }

    /// Precomputed minimum size for the instruction with this discriminator.
    pub fn min_size(&self, discriminator: &Discriminator) -> Option<&MinSize> {
        self.instructions.get(discriminator).map(|ix| &ix.min_size)
    }

    pub fn type_def(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    pub fn types(&self) -> &HashMap<String, TypeDef> {
        &self.types
    }

    pub fn size_estimator(&self) -> SizeEstimator<'_> {
        SizeEstimator::new(&self.types)
    }
}
