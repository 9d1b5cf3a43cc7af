//! IDL document format and the loader that turns it into a [`Schema`].
//!
//! The document shape follows Anchor IDLs, old and new:
//! - type references are a primitive name, `{"defined": "Name"}` or
//!   `{"defined": {"name": "Name"}}`
//! - type definitions are `{name, type: {kind, ...}}` or `{name, kind, ...}`
//! - account lists may nest groups as `{name, accounts: [...]}`
//! - instructions without a `discriminator` get Anchor's sighash

use std::{
    collections::{hash_map::Entry, HashMap},
    fs,
    path::Path,
    str::FromStr,
};

use heck::ToSnakeCase;
use log::{debug, warn};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use solana_pubkey::Pubkey;

use super::{
    AccountDef, Discriminator, Field, InstructionDef, Primitive, Schema, TypeDef, TypeRef,
    Variant, DISCRIMINATOR_LEN,
};
use crate::{error::SchemaError, size::SizeEstimator};

// ---------------------------------------------------------------------------
// Document types
// ---------------------------------------------------------------------------

/// Raw IDL document as read from JSON.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdlDocument {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub metadata: Option<IdlMetadata>,
    #[serde(default)]
    pub instructions: Vec<IdlInstruction>,
    #[serde(default)]
    pub types: Vec<IdlTypeDef>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdlMetadata {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdlInstruction {
    pub name: String,
    #[serde(default)]
    pub discriminator: Option<Vec<u8>>,
    #[serde(default)]
    pub args: Vec<IdlField>,
    #[serde(default)]
    pub accounts: Vec<IdlAccountItem>,
}

/// An account slot, or a named group of slots when `accounts` is present.
#[derive(Debug, Clone, Deserialize)]
pub struct IdlAccountItem {
    pub name: String,
    #[serde(default)]
    pub accounts: Option<Vec<IdlAccountItem>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdlField {
    Named {
        name: String,
        #[serde(rename = "type")]
        ty: IdlType,
    },
    /// Tuple field, named `field{index}` on load.
    Unnamed(IdlType),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdlType {
    Name(String),
    Defined { defined: IdlDefined },
    Other(serde_json::Value),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdlDefined {
    Name(String),
    Named { name: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdlTypeDef {
    Wrapped {
        name: String,
        #[serde(rename = "type")]
        body: IdlTypeBody,
    },
    Inline {
        name: String,
        kind: String,
        #[serde(default)]
        fields: Vec<IdlField>,
        #[serde(default)]
        variants: Vec<IdlVariant>,
    },
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdlTypeBody {
    pub kind: String,
    #[serde(default)]
    pub fields: Vec<IdlField>,
    #[serde(default)]
    pub variants: Vec<IdlVariant>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IdlVariant {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<IdlField>,
}

// ---------------------------------------------------------------------------
// Conversion
// ---------------------------------------------------------------------------

impl From<IdlType> for TypeRef {
    fn from(ty: IdlType) -> Self {
        match ty {
            IdlType::Name(name) => match Primitive::from_name(&name) {
                Some(primitive) => TypeRef::Primitive(primitive),
                None => TypeRef::Unsupported(name),
            },
            IdlType::Defined {
                defined: IdlDefined::Name(name) | IdlDefined::Named { name },
            } => TypeRef::Defined(name),
            IdlType::Other(value) => TypeRef::Unsupported(value.to_string()),
        }
    }
}

fn convert_fields(fields: Vec<IdlField>) -> Vec<Field> {
    fields
        .into_iter()
        .enumerate()
        .map(|(index, field)| match field {
            IdlField::Named { name, ty } => Field {
                name,
                ty: ty.into(),
            },
            IdlField::Unnamed(ty) => Field {
                name: format!("field{index}"),
                ty: ty.into(),
            },
        })
        .collect()
}

fn convert_type_body(kind: String, fields: Vec<IdlField>, variants: Vec<IdlVariant>) -> TypeDef {
    match kind.as_str() {
        "struct" => TypeDef::Struct {
            fields: convert_fields(fields),
        },
        "enum" => TypeDef::Enum {
            variants: variants
                .into_iter()
                .map(|variant| Variant {
                    name: variant.name,
                    fields: convert_fields(variant.fields),
                })
                .collect(),
        },
        _ => TypeDef::Unsupported { kind },
    }
}

impl IdlTypeDef {
    fn into_named(self) -> (String, TypeDef) {
        match self {
            IdlTypeDef::Wrapped { name, body } => {
                (name, convert_type_body(body.kind, body.fields, body.variants))
            }
            IdlTypeDef::Inline {
                name,
                kind,
                fields,
                variants,
            } => (name, convert_type_body(kind, fields, variants)),
        }
    }
}

fn flatten_accounts(items: Vec<IdlAccountItem>, out: &mut Vec<AccountDef>) {
    for item in items {
        match item.accounts {
            Some(group) => flatten_accounts(group, out),
            None => out.push(AccountDef { name: item.name }),
        }
    }
}

/// Anchor's instruction sighash: `sha256("global:<snake_case_name>")[..8]`.
pub fn anchor_discriminator(instruction_name: &str) -> Discriminator {
    let mut hasher = Sha256::new();
    hasher.update(format!("global:{}", instruction_name.to_snake_case()).as_bytes());
    let hash = hasher.finalize();
    let mut disc = [0u8; DISCRIMINATOR_LEN];
    disc.copy_from_slice(&hash[..DISCRIMINATOR_LEN]);
    disc
}

fn resolve_discriminator(ix: &IdlInstruction) -> Result<Discriminator, SchemaError> {
    match &ix.discriminator {
        Some(bytes) => {
            Discriminator::try_from(bytes.as_slice()).map_err(|_| {
                SchemaError::InvalidDiscriminator {
                    instruction: ix.name.clone(),
                    len: bytes.len(),
                }
            })
        }
        None => {
            debug!(
                "instruction `{}` has no discriminator, deriving Anchor sighash",
                ix.name
            );
            Ok(anchor_discriminator(&ix.name))
        }
    }
}

fn parse_address(address: &str) -> Result<Pubkey, SchemaError> {
    Pubkey::from_str(address).map_err(|_| SchemaError::InvalidAddress {
        address: address.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Schema {
    /// Parse and build a schema from IDL JSON text.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let document: IdlDocument = serde_json::from_str(json)?;
        Self::from_document(document)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, SchemaError> {
        let document: IdlDocument = serde_json::from_slice(bytes)?;
        Self::from_document(document)
    }

    /// Read an IDL JSON file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| SchemaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_slice(&bytes)
    }

    /// Build a schema from an already parsed document.
    ///
    /// Fails on a discriminator that is not 8 bytes, a repeated discriminator,
    /// a repeated type name or an unparseable program address. Instructions
    /// whose minimum size cannot be computed still load; they are decoded
    /// without the size pre-check.
    pub fn from_document(document: IdlDocument) -> Result<Self, SchemaError> {
        let IdlDocument {
            address,
            name,
            metadata,
            instructions: raw_instructions,
            types: raw_types,
        } = document;
        let metadata = metadata.unwrap_or_default();

        let address = address
            .or(metadata.address)
            .map(|address| parse_address(&address))
            .transpose()?;
        let name = name.or(metadata.name);

        let mut types = HashMap::with_capacity(raw_types.len());
        for raw in raw_types {
            let (type_name, def) = raw.into_named();
            match types.entry(type_name) {
                Entry::Occupied(entry) => {
                    return Err(SchemaError::DuplicateTypeName(entry.key().clone()))
                }
                Entry::Vacant(entry) => {
                    entry.insert(def);
                }
            }
        }

        let estimator = SizeEstimator::new(&types);
        let mut instructions = HashMap::with_capacity(raw_instructions.len());
        let mut instruction_order = Vec::with_capacity(raw_instructions.len());
        for raw in raw_instructions {
            let discriminator = resolve_discriminator(&raw)?;
            let args = convert_fields(raw.args);
            let mut accounts = Vec::new();
            flatten_accounts(raw.accounts, &mut accounts);

            let min_size = estimator.instruction_min_size(&args);
            if let Some(reason) = min_size.unknown_reason() {
                warn!(
                    "cannot compute minimum size for instruction `{}` ({reason}); \
                     it will be decoded without a size check",
                    raw.name
                );
            }

            let def = InstructionDef {
                name: raw.name,
                discriminator,
                args,
                accounts,
                min_size,
            };
            match instructions.entry(discriminator) {
                Entry::Occupied(entry) => {
                    let existing: &InstructionDef = entry.get();
                    return Err(SchemaError::DuplicateDiscriminator {
                        first: existing.name.clone(),
                        second: def.name,
                    });
                }
                Entry::Vacant(entry) => {
                    instruction_order.push(discriminator);
                    entry.insert(def);
                }
            }
        }

        Ok(Schema::new(
            name,
            address,
            instructions,
            instruction_order,
            types,
        ))
    }
}
