//! Minimum payload size estimation.
//!
//! Real transaction streams carry instructions from other programs whose data
//! happens to start with a known discriminator. Checking the buffer against a
//! precomputed minimum size rejects most of them before any structural decode.

use std::collections::HashMap;

use crate::{
    error::SizeUnknown,
    schema::{Field, TypeDef, TypeRef, DISCRIMINATOR_LEN},
};

/// Minimum valid size of an instruction payload, discriminator included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MinSize {
    Known(usize),
    /// The schema cannot bound this instruction; decoding skips the pre-check.
    Unknown(SizeUnknown),
}

impl MinSize {
    pub fn known(&self) -> Option<usize> {
        match self {
            MinSize::Known(size) => Some(*size),
            MinSize::Unknown(_) => None,
        }
    }

    pub fn unknown_reason(&self) -> Option<&SizeUnknown> {
        match self {
            MinSize::Known(_) => None,
            MinSize::Unknown(reason) => Some(reason),
        }
    }

    /// Whether a payload of `len` bytes passes the size gate.
    /// An unknown minimum admits every length.
    pub fn admits(&self, len: usize) -> bool {
        match self {
            MinSize::Known(size) => len >= *size,
            MinSize::Unknown(_) => true,
        }
    }
}

/// Computes lower bounds on encoded sizes from type definitions.
#[derive(Debug, Clone, Copy)]
pub struct SizeEstimator<'a> {
    types: &'a HashMap<String, TypeDef>,
}

impl<'a> SizeEstimator<'a> {
    pub fn new(types: &'a HashMap<String, TypeDef>) -> Self {
        Self { types }
    }

    /// `8 + sum(min_size(arg))`, or `Unknown` if any argument cannot be bounded.
    pub fn instruction_min_size(&self, args: &[Field]) -> MinSize {
        match self.fields_min_size(args, &mut Vec::new()) {
            Ok(size) => MinSize::Known(DISCRIMINATOR_LEN + size),
            Err(reason) => MinSize::Unknown(reason),
        }
    }

    pub fn type_min_size(&self, ty: &TypeRef) -> Result<usize, SizeUnknown> {
        self.type_ref_min_size(ty, &mut Vec::new())
    }

    fn type_ref_min_size(
        &self,
        ty: &TypeRef,
        visiting: &mut Vec<&'a str>,
    ) -> Result<usize, SizeUnknown> {
        match ty {
            TypeRef::Primitive(primitive) => Ok(primitive.min_size()),
            TypeRef::Defined(name) => self.defined_min_size(name, visiting),
            TypeRef::Unsupported(descr) => Err(SizeUnknown::Unsupported(descr.clone())),
        }
    }

    fn defined_min_size(
        &self,
        name: &str,
        visiting: &mut Vec<&'a str>,
    ) -> Result<usize, SizeUnknown> {
        let types: &'a HashMap<String, TypeDef> = self.types;
        let (name, def) = types
            .get_key_value(name)
            .ok_or_else(|| SizeUnknown::UnknownType(name.to_string()))?;
        if visiting.contains(&name.as_str()) {
            return Err(SizeUnknown::Recursive(name.clone()));
        }

        visiting.push(name.as_str());
        let size = match def {
            TypeDef::Struct { fields } => self.fields_min_size(fields, visiting),
            TypeDef::Enum { variants } => variants
                .iter()
                .map(|variant| self.fields_min_size(&variant.fields, visiting))
                .collect::<Result<Vec<_>, _>>()
                // Tag byte plus the smallest variant; 0 when there are none.
                .map(|sizes| 1 + sizes.into_iter().min().unwrap_or(0)),
            TypeDef::Unsupported { kind } => Err(SizeUnknown::Unsupported(format!(
                "{name} (kind `{kind}`)"
            ))),
        };
        visiting.pop();
        size
    }

    fn fields_min_size(
        &self,
        fields: &[Field],
        visiting: &mut Vec<&'a str>,
    ) -> Result<usize, SizeUnknown> {
        let mut total = 0usize;
        for field in fields {
            total = total.saturating_add(self.type_ref_min_size(&field.ty, visiting)?);
        }
        Ok(total)
    }
}
