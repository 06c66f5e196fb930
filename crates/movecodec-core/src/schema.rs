//! Schema types — the in-memory description of a type's wire layout.
//!
//! A `Schema` carries everything the codec needs to encode or decode a
//! value: field order, variant order, element types, fixed widths. The
//! bytes themselves carry none of this (BCS is not self-describing), so
//! the schema *is* the wire contract — two parties must agree on it
//! exactly.

use crate::error::CodecError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed-width primitive kinds.
///
/// Integers are unsigned and little-endian on the wire. `Address` is a
/// raw fixed-width byte string whose width is set at schema-definition
/// time (32 bytes for Move chains) and never varies per value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    Bool,
    Address(usize),
}

impl PrimitiveKind {
    /// Wire width in bytes.
    pub fn width(&self) -> usize {
        match self {
            PrimitiveKind::U8 | PrimitiveKind::Bool => 1,
            PrimitiveKind::U16 => 2,
            PrimitiveKind::U32 => 4,
            PrimitiveKind::U64 => 8,
            PrimitiveKind::U128 => 16,
            PrimitiveKind::U256 => 32,
            PrimitiveKind::Address(w) => *w,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveKind::U8 => write!(f, "u8"),
            PrimitiveKind::U16 => write!(f, "u16"),
            PrimitiveKind::U32 => write!(f, "u32"),
            PrimitiveKind::U64 => write!(f, "u64"),
            PrimitiveKind::U128 => write!(f, "u128"),
            PrimitiveKind::U256 => write!(f, "u256"),
            PrimitiveKind::Bool => write!(f, "bool"),
            PrimitiveKind::Address(w) => write!(f, "address({w})"),
        }
    }
}

/// A type's wire layout.
///
/// Closed tagged enum: every kind has exactly one encoder and one
/// decoder, enforced by exhaustive matching in `encode`/`decode`.
///
/// `Named` references are resolved lazily by name through a
/// [`SchemaResolver`] during the encode/decode walk — this is what makes
/// recursive/self-referential types legal. `TypeParam` appears only
/// inside registered generic definitions and is fully substituted away
/// before any encoding begins; one reaching the codec is a programmer
/// error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Schema {
    /// Fixed-width scalar.
    Primitive(PrimitiveKind),
    /// ULEB128 byte-length prefix + raw UTF-8 bytes.
    Str,
    /// ULEB128 length prefix + raw bytes. Wire-identical to
    /// `Vector(U8)`, but decodes to a contiguous byte value.
    Bytes,
    /// ULEB128 length prefix + homogeneous elements.
    Vector(Box<Schema>),
    /// Exactly `len` elements, no length prefix.
    FixedArray { elem: Box<Schema>, len: usize },
    /// Positional fields concatenated in order, no prefix.
    Tuple(Vec<Schema>),
    /// Presence byte (0 or 1) + inner value if present.
    Option(Box<Schema>),
    /// Named fields encoded strictly in declaration order. Field names
    /// never appear on the wire.
    Struct {
        name: String,
        fields: Vec<(String, Schema)>,
    },
    /// ULEB128 variant index + the variant payload (omitted for unit
    /// variants). Indices are 0-based positions in the declared order.
    Enum {
        name: String,
        variants: Vec<(String, Option<Schema>)>,
    },
    /// Reference to a registered type, resolved through a
    /// [`SchemaResolver`] with the given type arguments.
    Named {
        name: String,
        type_args: Vec<Schema>,
    },
    /// Placeholder for the N-th type argument of a generic definition.
    TypeParam(usize),
}

impl Schema {
    /// Shorthand for `Schema::Vector`.
    pub fn vector(elem: Schema) -> Self {
        Schema::Vector(Box::new(elem))
    }

    /// Shorthand for `Schema::Option`.
    pub fn option(inner: Schema) -> Self {
        Schema::Option(Box::new(inner))
    }

    /// Reference to a non-generic registered type.
    pub fn named(name: impl Into<String>) -> Self {
        Schema::Named {
            name: name.into(),
            type_args: Vec::new(),
        }
    }

    /// A struct layout from `(field name, schema)` pairs.
    pub fn structure(
        name: impl Into<String>,
        fields: impl IntoIterator<Item = (impl Into<String>, Schema)>,
    ) -> Self {
        Schema::Struct {
            name: name.into(),
            fields: fields.into_iter().map(|(n, s)| (n.into(), s)).collect(),
        }
    }

    /// An enum layout from `(variant name, optional payload)` pairs.
    pub fn enumeration(
        name: impl Into<String>,
        variants: impl IntoIterator<Item = (impl Into<String>, Option<Schema>)>,
    ) -> Self {
        Schema::Enum {
            name: name.into(),
            variants: variants.into_iter().map(|(n, s)| (n.into(), s)).collect(),
        }
    }

    /// Replace every `TypeParam(i)` with `args[i]`, recursively.
    ///
    /// Pure: returns a new tree, never mutates the definition it is
    /// called on. Arity is the caller's responsibility (the registry
    /// checks it before substituting).
    pub fn substitute(&self, args: &[Schema]) -> Result<Schema, CodecError> {
        Ok(match self {
            Schema::TypeParam(i) => args
                .get(*i)
                .cloned()
                .ok_or(CodecError::UnresolvedTypeParam { index: *i })?,
            Schema::Primitive(_) | Schema::Str | Schema::Bytes => self.clone(),
            Schema::Vector(elem) => Schema::Vector(Box::new(elem.substitute(args)?)),
            Schema::FixedArray { elem, len } => Schema::FixedArray {
                elem: Box::new(elem.substitute(args)?),
                len: *len,
            },
            Schema::Tuple(elems) => Schema::Tuple(
                elems
                    .iter()
                    .map(|e| e.substitute(args))
                    .collect::<Result<_, _>>()?,
            ),
            Schema::Option(inner) => Schema::Option(Box::new(inner.substitute(args)?)),
            Schema::Struct { name, fields } => Schema::Struct {
                name: name.clone(),
                fields: fields
                    .iter()
                    .map(|(n, s)| Ok((n.clone(), s.substitute(args)?)))
                    .collect::<Result<_, CodecError>>()?,
            },
            Schema::Enum { name, variants } => Schema::Enum {
                name: name.clone(),
                variants: variants
                    .iter()
                    .map(|(n, s)| {
                        Ok((
                            n.clone(),
                            s.as_ref().map(|s| s.substitute(args)).transpose()?,
                        ))
                    })
                    .collect::<Result<_, CodecError>>()?,
            },
            Schema::Named { name, type_args } => Schema::Named {
                name: name.clone(),
                type_args: type_args
                    .iter()
                    .map(|a| a.substitute(args))
                    .collect::<Result<_, _>>()?,
            },
        })
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Schema::Primitive(k) => write!(f, "{k}"),
            Schema::Str => write!(f, "string"),
            Schema::Bytes => write!(f, "bytes"),
            Schema::Vector(elem) => write!(f, "vector<{elem}>"),
            Schema::FixedArray { elem, len } => write!(f, "{elem}[{len}]"),
            Schema::Tuple(elems) => {
                let parts: Vec<_> = elems.iter().map(|e| e.to_string()).collect();
                write!(f, "({})", parts.join(", "))
            }
            Schema::Option(inner) => write!(f, "option<{inner}>"),
            Schema::Struct { name, .. } => write!(f, "struct {name}"),
            Schema::Enum { name, .. } => write!(f, "enum {name}"),
            Schema::Named { name, type_args } => {
                if type_args.is_empty() {
                    write!(f, "{name}")
                } else {
                    let parts: Vec<_> = type_args.iter().map(|a| a.to_string()).collect();
                    write!(f, "{name}<{}>", parts.join(", "))
                }
            }
            Schema::TypeParam(i) => write!(f, "T{i}"),
        }
    }
}

/// A thread-safe, read-only source of named schema definitions.
///
/// `resolve` applies a registered definition to `type_args` and returns
/// the fully substituted layout. Concrete implementations live in
/// `movecodec-registry`; tests can supply their own.
pub trait SchemaResolver: Send + Sync {
    /// Resolve a registered name against already-resolved type arguments.
    ///
    /// Fails with `UnknownSchema` for unregistered names and
    /// `ArityMismatch` when `type_args` does not match the definition's
    /// declared parameter count.
    fn resolve(&self, name: &str, type_args: &[Schema]) -> Result<Schema, CodecError>;
}

/// A resolver with no definitions. Suitable for schemas that contain no
/// `Named` references.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyResolver;

impl SchemaResolver for EmptyResolver {
    fn resolve(&self, name: &str, _type_args: &[Schema]) -> Result<Schema, CodecError> {
        Err(CodecError::UnknownSchema {
            name: name.to_string(),
        })
    }
}
