//! Deserialization: schema × bytes → value, with canonical validation.
//!
//! The decoder walks the schema against a byte cursor and rejects
//! malformed input at every step: truncated reads, non-minimal varints,
//! flag bytes outside {0, 1}, out-of-range variant tags, and — at the
//! top level — any bytes left over after the requested schema has been
//! fully decoded. Malformed bytes are a permanent condition; nothing
//! here retries.

use crate::config::CodecConfig;
use crate::cursor::Cursor;
use crate::error::CodecError;
use crate::schema::{PrimitiveKind, Schema, SchemaResolver};
use crate::uleb;
use crate::value::Value;
use indexmap::IndexMap;
use num_bigint::BigUint;

/// Deserialize `bytes` against `schema` with default limits.
///
/// The input must be consumed exactly; leftover bytes fail with
/// `TrailingBytes`.
pub fn deserialize(
    resolver: &dyn SchemaResolver,
    schema: &Schema,
    bytes: &[u8],
) -> Result<Value, CodecError> {
    deserialize_with(resolver, schema, bytes, &CodecConfig::default())
}

/// Deserialize `bytes` against `schema` with explicit limits.
pub fn deserialize_with(
    resolver: &dyn SchemaResolver,
    schema: &Schema,
    bytes: &[u8],
    config: &CodecConfig,
) -> Result<Value, CodecError> {
    let decoder = Decoder { resolver, config };
    let mut cur = Cursor::new(bytes);
    let value = decoder.decode_value(schema, &mut cur, 0)?;
    if !cur.is_exhausted() {
        return Err(CodecError::TrailingBytes {
            schema: schema.to_string(),
            remaining: cur.remaining(),
        });
    }
    Ok(value)
}

struct Decoder<'a> {
    resolver: &'a dyn SchemaResolver,
    config: &'a CodecConfig,
}

impl Decoder<'_> {
    fn decode_value(
        &self,
        schema: &Schema,
        cur: &mut Cursor<'_>,
        depth: usize,
    ) -> Result<Value, CodecError> {
        if depth > self.config.max_depth {
            return Err(CodecError::RecursionLimitExceeded {
                limit: self.config.max_depth,
            });
        }

        match schema {
            Schema::Primitive(kind) => self.decode_primitive(kind, cur),

            Schema::Str => {
                let len = read_len(cur)?;
                let offset = cur.position();
                let raw = cur.read_exact(len)?;
                let s = std::str::from_utf8(raw)
                    .map_err(|_| CodecError::InvalidUtf8 { offset })?;
                Ok(Value::Str(s.to_string()))
            }

            Schema::Bytes => {
                let len = read_len(cur)?;
                Ok(Value::Bytes(cur.read_exact(len)?.to_vec()))
            }

            Schema::Vector(elem) => {
                let len = read_len(cur)?;
                let mut items = Vec::with_capacity(len.min(4096));
                for i in 0..len {
                    let item = self
                        .decode_value(elem, cur, depth + 1)
                        .map_err(|e| e.at_index(i))?;
                    items.push(item);
                }
                Ok(Value::Vector(items))
            }

            Schema::FixedArray { elem, len } => {
                let mut items = Vec::with_capacity((*len).min(4096));
                for i in 0..*len {
                    let item = self
                        .decode_value(elem, cur, depth + 1)
                        .map_err(|e| e.at_index(i))?;
                    items.push(item);
                }
                Ok(Value::Vector(items))
            }

            Schema::Tuple(elems) => {
                let mut items = Vec::with_capacity(elems.len());
                for (i, elem) in elems.iter().enumerate() {
                    let item = self
                        .decode_value(elem, cur, depth + 1)
                        .map_err(|e| e.at_index(i))?;
                    items.push(item);
                }
                Ok(Value::Tuple(items))
            }

            Schema::Option(inner) => {
                let offset = cur.position();
                match cur.read_u8()? {
                    0 => Ok(Value::Option(None)),
                    1 => {
                        let item = self.decode_value(inner, cur, depth + 1)?;
                        Ok(Value::Option(Some(Box::new(item))))
                    }
                    byte => Err(CodecError::InvalidOptionTag { byte, offset }),
                }
            }

            Schema::Struct { fields, .. } => {
                let mut record = IndexMap::with_capacity(fields.len());
                for (field_name, field_schema) in fields {
                    let value = self
                        .decode_value(field_schema, cur, depth + 1)
                        .map_err(|e| e.in_field(field_name.clone()))?;
                    record.insert(field_name.clone(), value);
                }
                Ok(Value::Struct(record))
            }

            Schema::Enum { name, variants } => {
                let index = uleb::decode(cur)?;
                let (variant_name, payload_schema) = variants
                    .get(index as usize)
                    .ok_or_else(|| CodecError::VariantIndexOutOfRange {
                        enum_name: name.clone(),
                        index,
                        count: variants.len(),
                    })?;
                let payload = match payload_schema {
                    None => None,
                    Some(schema) => Some(Box::new(
                        self.decode_value(schema, cur, depth + 1)
                            .map_err(|e| e.in_variant(variant_name.clone()))?,
                    )),
                };
                Ok(Value::Variant {
                    name: variant_name.clone(),
                    payload,
                })
            }

            Schema::Named { name, type_args } => {
                let resolved = self.resolver.resolve(name, type_args)?;
                self.decode_value(&resolved, cur, depth + 1)
            }

            Schema::TypeParam(i) => Err(CodecError::UnresolvedTypeParam { index: *i }),
        }
    }

    fn decode_primitive(
        &self,
        kind: &PrimitiveKind,
        cur: &mut Cursor<'_>,
    ) -> Result<Value, CodecError> {
        match kind {
            PrimitiveKind::U8 => Ok(Value::U8(cur.read_u8()?)),
            PrimitiveKind::U16 => Ok(Value::U16(u16::from_le_bytes(cur.read_array()?))),
            PrimitiveKind::U32 => Ok(Value::U32(u32::from_le_bytes(cur.read_array()?))),
            PrimitiveKind::U64 => Ok(Value::U64(u64::from_le_bytes(cur.read_array()?))),
            PrimitiveKind::U128 => Ok(Value::U128(u128::from_le_bytes(cur.read_array()?))),
            PrimitiveKind::U256 => {
                let raw = cur.read_exact(32)?;
                Ok(Value::U256(BigUint::from_bytes_le(raw)))
            }
            PrimitiveKind::Bool => {
                let offset = cur.position();
                match cur.read_u8()? {
                    0 => Ok(Value::Bool(false)),
                    1 => Ok(Value::Bool(true)),
                    byte => Err(CodecError::InvalidBoolean { byte, offset }),
                }
            }
            PrimitiveKind::Address(width) => {
                Ok(Value::Address(cur.read_exact(*width)?.to_vec()))
            }
        }
    }
}

/// Read a ULEB128 length prefix as a usize.
fn read_len(cur: &mut Cursor<'_>) -> Result<usize, CodecError> {
    Ok(uleb::decode(cur)? as usize)
}
