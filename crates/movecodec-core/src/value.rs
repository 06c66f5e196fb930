//! The decoded in-memory representation.
//!
//! A `Value` is a plain, independently owned tree mirroring the shape of
//! the schema that produced it. It holds no reference back to that
//! schema — value and schema lifetimes are fully decoupled.

use crate::error::CodecError;
use indexmap::IndexMap;
use num_bigint::BigUint;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A decoded (or to-be-encoded) value.
///
/// Struct fields are kept in an insertion-ordered map; equality on the
/// map is order-insensitive, so two struct values with the same named
/// fields compare equal regardless of the order they were built in.
/// Encoding order always follows the schema, never the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    /// 256-bit unsigned integer, arbitrary precision in memory, exactly
    /// 32 little-endian bytes on the wire.
    U256(BigUint),
    Bool(bool),
    /// Fixed-width raw address bytes.
    Address(Vec<u8>),
    Str(String),
    Bytes(Vec<u8>),
    Vector(Vec<Value>),
    Tuple(Vec<Value>),
    Option(Option<Box<Value>>),
    Struct(IndexMap<String, Value>),
    /// One active enum variant, tagged by name, with an optional payload.
    Variant {
        name: String,
        payload: Option<Box<Value>>,
    },
}

/// Largest value that fits in 256 bits: 2^256 - 1.
fn u256_max() -> BigUint {
    (BigUint::from(1u8) << 256u32) - 1u8
}

impl Value {
    /// Parse a decimal string into a `U256` value.
    ///
    /// Overflow past 2^256 - 1 is a hard error, never saturation.
    pub fn u256_from_decimal(s: &str) -> Result<Self, CodecError> {
        let n: BigUint = s.parse().map_err(|_| CodecError::InvalidInteger {
            value: s.to_string(),
        })?;
        if n > u256_max() {
            return Err(CodecError::IntegerOverflow {
                ty: "u256".into(),
                value: s.to_string(),
            });
        }
        Ok(Value::U256(n))
    }

    /// Parse a decimal string into a `U128` value.
    pub fn u128_from_decimal(s: &str) -> Result<Self, CodecError> {
        match s.parse::<u128>() {
            Ok(n) => Ok(Value::U128(n)),
            Err(_) => {
                // Distinguish "too big" from "not a number".
                if s.parse::<BigUint>().is_ok() {
                    Err(CodecError::IntegerOverflow {
                        ty: "u128".into(),
                        value: s.to_string(),
                    })
                } else {
                    Err(CodecError::InvalidInteger {
                        value: s.to_string(),
                    })
                }
            }
        }
    }

    /// A `None` optional.
    pub fn none() -> Self {
        Value::Option(None)
    }

    /// A `Some` optional wrapping `inner`.
    pub fn some(inner: Value) -> Self {
        Value::Option(Some(Box::new(inner)))
    }

    /// A struct value from `(field name, value)` pairs.
    pub fn structure(fields: impl IntoIterator<Item = (impl Into<String>, Value)>) -> Self {
        Value::Struct(fields.into_iter().map(|(n, v)| (n.into(), v)).collect())
    }

    /// A unit enum variant.
    pub fn unit_variant(name: impl Into<String>) -> Self {
        Value::Variant {
            name: name.into(),
            payload: None,
        }
    }

    /// An enum variant carrying a payload.
    pub fn variant(name: impl Into<String>, payload: Value) -> Self {
        Value::Variant {
            name: name.into(),
            payload: Some(Box::new(payload)),
        }
    }

    /// The wire-kind name, used in `TypeMismatch` diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::U128(_) => "u128",
            Value::U256(_) => "u256",
            Value::Bool(_) => "bool",
            Value::Address(_) => "address",
            Value::Str(_) => "string",
            Value::Bytes(_) => "bytes",
            Value::Vector(_) => "vector",
            Value::Tuple(_) => "tuple",
            Value::Option(_) => "option",
            Value::Struct(_) => "struct",
            Value::Variant { .. } => "variant",
        }
    }

    /// Returns the field map if this is a struct value.
    pub fn as_struct(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Struct(fields) => Some(fields),
            _ => None,
        }
    }

    /// Looks up a struct field by name.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.as_struct()?.get(name)
    }

    /// Coerce to a u64 if this is a `U64`.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::U64(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the inner bytes if this is an `Address`.
    pub fn as_address(&self) -> Option<&[u8]> {
        match self {
            Value::Address(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the inner string if this is a `Str`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::U8(v) => write!(f, "{v}"),
            Value::U16(v) => write!(f, "{v}"),
            Value::U32(v) => write!(f, "{v}"),
            Value::U64(v) => write!(f, "{v}"),
            Value::U128(v) => write!(f, "{v}"),
            Value::U256(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Address(b) => write!(f, "0x{}", hex::encode(b)),
            Value::Str(s) => write!(f, "{s}"),
            Value::Bytes(b) => write!(f, "0x{}", hex::encode(b)),
            Value::Vector(vs) | Value::Tuple(vs) => {
                let parts: Vec<_> = vs.iter().map(|v| v.to_string()).collect();
                write!(f, "[{}]", parts.join(", "))
            }
            Value::Option(None) => write!(f, "none"),
            Value::Option(Some(v)) => write!(f, "some({v})"),
            Value::Struct(fields) => {
                let parts: Vec<_> = fields.iter().map(|(k, v)| format!("{k}: {v}")).collect();
                write!(f, "{{{}}}", parts.join(", "))
            }
            Value::Variant { name, payload } => match payload {
                Some(v) => write!(f, "{name}({v})"),
                None => write!(f, "{name}"),
            },
        }
    }
}
