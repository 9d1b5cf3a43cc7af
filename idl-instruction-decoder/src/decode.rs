//! Recursive-descent decoding of schema types.
//!
//! Every decode step takes a byte offset and returns the value together with
//! the offset just past it. Offsets only move forward and never pass the end
//! of the buffer; any read that would is a [`DecodeError`].

use borsh::BorshDeserialize;
use solana_pubkey::Pubkey;

use crate::{
    core::{DecodedField, DecodedValue},
    error::DecodeError,
    schema::{Field, Primitive, Schema, TypeDef, TypeRef},
};

/// Maximum nesting of defined types before decoding gives up.
pub const MAX_DEPTH: usize = 64;

/// Decodes values of schema types out of a byte buffer.
#[derive(Debug, Clone, Copy)]
pub struct TypeDecoder<'a> {
    schema: &'a Schema,
}

impl<'a> TypeDecoder<'a> {
    pub fn new(schema: &'a Schema) -> Self {
        Self { schema }
    }

    /// Decode one value of type `ty` starting at `offset`.
    pub fn decode(
        &self,
        data: &[u8],
        offset: usize,
        ty: &TypeRef,
    ) -> Result<(DecodedValue, usize), DecodeError> {
        self.decode_at(data, offset, ty, 0)
    }

    /// Decode `fields` in order starting at `offset`.
    ///
    /// A failure at any field fails the whole list; no partial result is
    /// returned.
    pub fn decode_fields(
        &self,
        data: &[u8],
        offset: usize,
        fields: &[Field],
    ) -> Result<(Vec<DecodedField>, usize), DecodeError> {
        self.fields_at(data, offset, fields, 0)
    }

    fn decode_at(
        &self,
        data: &[u8],
        offset: usize,
        ty: &TypeRef,
        depth: usize,
    ) -> Result<(DecodedValue, usize), DecodeError> {
        match ty {
            TypeRef::Primitive(primitive) => decode_primitive(data, offset, *primitive),
            TypeRef::Defined(name) => self.decode_defined(data, offset, name, depth + 1),
            TypeRef::Unsupported(name) => Err(DecodeError::UnsupportedType {
                name: name.clone(),
                offset,
            }),
        }
    }

    fn fields_at(
        &self,
        data: &[u8],
        mut offset: usize,
        fields: &[Field],
        depth: usize,
    ) -> Result<(Vec<DecodedField>, usize), DecodeError> {
        let mut decoded = Vec::with_capacity(fields.len());
        for field in fields {
            let (value, next) = self.decode_at(data, offset, &field.ty, depth)?;
            decoded.push(DecodedField::new(field.name.clone(), value));
            offset = next;
        }
        Ok((decoded, offset))
    }

    fn decode_defined(
        &self,
        data: &[u8],
        offset: usize,
        name: &str,
        depth: usize,
    ) -> Result<(DecodedValue, usize), DecodeError> {
        if depth > MAX_DEPTH {
            return Err(DecodeError::DepthLimitExceeded {
                limit: MAX_DEPTH,
                offset,
            });
        }
        let def = self
            .schema
            .type_def(name)
            .ok_or_else(|| DecodeError::UnknownType {
                name: name.to_string(),
                offset,
            })?;

        match def {
            TypeDef::Struct { fields } => {
                let (fields, next) = self.fields_at(data, offset, fields, depth)?;
                Ok((DecodedValue::Struct(fields), next))
            }
            TypeDef::Enum { variants } => {
                // The tag is a positional index into the declared variants.
                let (tag, next): (u8, usize) = read(data, offset, 1, "enum tag")?;
                let variant =
                    variants
                        .get(usize::from(tag))
                        .ok_or_else(|| DecodeError::InvalidEnumTag {
                            type_name: name.to_string(),
                            offset,
                            tag,
                            variant_count: variants.len(),
                        })?;
                let (fields, next) = self.fields_at(data, next, &variant.fields, depth)?;
                Ok((
                    DecodedValue::Enum {
                        variant: variant.name.clone(),
                        fields,
                    },
                    next,
                ))
            }
            TypeDef::Unsupported { kind } => Err(DecodeError::UnsupportedType {
                name: format!("{name} (kind `{kind}`)"),
                offset,
            }),
        }
    }
}

/// Bounds-check `width` bytes at `offset` and borsh-decode them as `T`.
fn read<T: BorshDeserialize>(
    data: &[u8],
    offset: usize,
    width: usize,
    type_name: &'static str,
) -> Result<(T, usize), DecodeError> {
    let remaining = data.len().saturating_sub(offset);
    if remaining < width {
        return Err(DecodeError::InsufficientBytes {
            type_name,
            offset,
            needed: width,
            remaining,
        });
    }
    let mut bytes = &data[offset..offset + width];
    let value = T::deserialize(&mut bytes).map_err(|err| DecodeError::InvalidValue {
        type_name,
        offset,
        reason: err.to_string(),
    })?;
    Ok((value, offset + width))
}

fn decode_primitive(
    data: &[u8],
    offset: usize,
    primitive: Primitive,
) -> Result<(DecodedValue, usize), DecodeError> {
    let width = primitive.min_size();
    let type_name = primitive.name();

    macro_rules! fixed {
        ($variant:ident) => {{
            let (value, next) = read(data, offset, width, type_name)?;
            (DecodedValue::$variant(value), next)
        }};
    }

    Ok(match primitive {
        Primitive::U8 => fixed!(U8),
        Primitive::U16 => fixed!(U16),
        Primitive::U32 => fixed!(U32),
        Primitive::U64 => fixed!(U64),
        Primitive::I8 => fixed!(I8),
        Primitive::I16 => fixed!(I16),
        Primitive::I32 => fixed!(I32),
        Primitive::I64 => fixed!(I64),
        Primitive::Bool => fixed!(Bool),
        Primitive::Pubkey => {
            let (bytes, next): ([u8; 32], usize) = read(data, offset, width, type_name)?;
            (DecodedValue::Pubkey(Pubkey::new_from_array(bytes)), next)
        }
        Primitive::String => {
            let (length, body): (u32, usize) = read(data, offset, width, "string length")?;
            let length = length as usize;
            let remaining = data.len() - body;
            if length > remaining {
                return Err(DecodeError::StringLengthOverflow {
                    offset,
                    length,
                    remaining,
                });
            }
            let text = std::str::from_utf8(&data[body..body + length]).map_err(|err| {
                DecodeError::InvalidValue {
                    type_name,
                    offset: body,
                    reason: err.to_string(),
                }
            })?;
            (DecodedValue::String(text.to_string()), body + length)
        }
    })
}
