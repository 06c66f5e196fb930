//! Serialization: schema × value → canonical bytes.
//!
//! The encoder walks a schema alongside a value tree, emitting bytes in
//! field/variant declaration order. Any shape mismatch between the two
//! aborts the whole call with a typed error; there is no partial output
//! contract on failure.

use crate::config::CodecConfig;
use crate::error::CodecError;
use crate::schema::{PrimitiveKind, Schema, SchemaResolver};
use crate::uleb;
use crate::value::Value;
use bytes::BufMut;

/// Serialize `value` against `schema` with default limits.
pub fn serialize(
    resolver: &dyn SchemaResolver,
    schema: &Schema,
    value: &Value,
) -> Result<Vec<u8>, CodecError> {
    serialize_with(resolver, schema, value, &CodecConfig::default())
}

/// Serialize `value` against `schema` with explicit limits.
pub fn serialize_with(
    resolver: &dyn SchemaResolver,
    schema: &Schema,
    value: &Value,
    config: &CodecConfig,
) -> Result<Vec<u8>, CodecError> {
    let encoder = Encoder { resolver, config };
    let mut out = Vec::new();
    encoder.encode_value(schema, value, &mut out, 0)?;
    Ok(out)
}

struct Encoder<'a> {
    resolver: &'a dyn SchemaResolver,
    config: &'a CodecConfig,
}

impl Encoder<'_> {
    fn encode_value(
        &self,
        schema: &Schema,
        value: &Value,
        out: &mut Vec<u8>,
        depth: usize,
    ) -> Result<(), CodecError> {
        if depth > self.config.max_depth {
            return Err(CodecError::RecursionLimitExceeded {
                limit: self.config.max_depth,
            });
        }

        match (schema, value) {
            (Schema::Primitive(kind), value) => self.encode_primitive(kind, value, out),

            (Schema::Str, Value::Str(s)) => {
                uleb::encode(s.len() as u64, out);
                out.put_slice(s.as_bytes());
                Ok(())
            }

            (Schema::Bytes, Value::Bytes(b)) => {
                uleb::encode(b.len() as u64, out);
                out.put_slice(b);
                Ok(())
            }

            (Schema::Vector(elem), Value::Vector(items)) => {
                uleb::encode(items.len() as u64, out);
                for (i, item) in items.iter().enumerate() {
                    self.encode_value(elem, item, out, depth + 1)
                        .map_err(|e| e.at_index(i))?;
                }
                Ok(())
            }

            (Schema::FixedArray { elem, len }, Value::Vector(items)) => {
                if items.len() != *len {
                    return Err(CodecError::TypeMismatch {
                        expected: schema.to_string(),
                        got: format!("vector of length {}", items.len()),
                    });
                }
                for (i, item) in items.iter().enumerate() {
                    self.encode_value(elem, item, out, depth + 1)
                        .map_err(|e| e.at_index(i))?;
                }
                Ok(())
            }

            (Schema::Tuple(elems), Value::Tuple(items)) => {
                if items.len() != elems.len() {
                    return Err(CodecError::TypeMismatch {
                        expected: schema.to_string(),
                        got: format!("tuple of length {}", items.len()),
                    });
                }
                for (i, (elem, item)) in elems.iter().zip(items).enumerate() {
                    self.encode_value(elem, item, out, depth + 1)
                        .map_err(|e| e.at_index(i))?;
                }
                Ok(())
            }

            (Schema::Option(inner), Value::Option(opt)) => match opt {
                None => {
                    out.put_u8(0);
                    Ok(())
                }
                Some(item) => {
                    out.put_u8(1);
                    self.encode_value(inner, item, out, depth + 1)
                }
            },

            (Schema::Struct { name, fields }, Value::Struct(map)) => {
                // Declaration order from the schema, never map order.
                for (field_name, field_schema) in fields {
                    let field_value =
                        map.get(field_name).ok_or_else(|| CodecError::MissingField {
                            struct_name: name.clone(),
                            field: field_name.clone(),
                        })?;
                    self.encode_value(field_schema, field_value, out, depth + 1)
                        .map_err(|e| e.in_field(field_name.clone()))?;
                }
                Ok(())
            }

            (
                Schema::Enum { name, variants },
                Value::Variant {
                    name: variant_name,
                    payload,
                },
            ) => {
                let (index, (_, payload_schema)) = variants
                    .iter()
                    .enumerate()
                    .find(|(_, (n, _))| n == variant_name)
                    .ok_or_else(|| CodecError::UnknownVariant {
                        enum_name: name.clone(),
                        variant: variant_name.clone(),
                    })?;
                uleb::encode(index as u64, out);
                match (payload_schema, payload) {
                    (None, None) => Ok(()),
                    (Some(schema), Some(value)) => self
                        .encode_value(schema, value, out, depth + 1)
                        .map_err(|e| e.in_variant(variant_name.clone())),
                    (None, Some(_)) => Err(CodecError::TypeMismatch {
                        expected: format!("unit variant '{variant_name}'"),
                        got: "variant with payload".into(),
                    }),
                    (Some(schema), None) => Err(CodecError::TypeMismatch {
                        expected: format!("variant '{variant_name}' with {schema} payload"),
                        got: "unit variant".into(),
                    }),
                }
            }

            (Schema::Named { name, type_args }, value) => {
                let resolved = self.resolver.resolve(name, type_args)?;
                self.encode_value(&resolved, value, out, depth + 1)
            }

            (Schema::TypeParam(i), _) => Err(CodecError::UnresolvedTypeParam { index: *i }),

            (schema, value) => Err(CodecError::TypeMismatch {
                expected: schema.to_string(),
                got: value.kind().to_string(),
            }),
        }
    }

    fn encode_primitive(
        &self,
        kind: &PrimitiveKind,
        value: &Value,
        out: &mut Vec<u8>,
    ) -> Result<(), CodecError> {
        match (kind, value) {
            (PrimitiveKind::U8, Value::U8(v)) => out.put_u8(*v),
            (PrimitiveKind::U16, Value::U16(v)) => out.put_u16_le(*v),
            (PrimitiveKind::U32, Value::U32(v)) => out.put_u32_le(*v),
            (PrimitiveKind::U64, Value::U64(v)) => out.put_u64_le(*v),
            (PrimitiveKind::U128, Value::U128(v)) => out.put_u128_le(*v),
            (PrimitiveKind::U256, Value::U256(v)) => {
                let le = v.to_bytes_le();
                if le.len() > 32 {
                    return Err(CodecError::IntegerOverflow {
                        ty: "u256".into(),
                        value: v.to_string(),
                    });
                }
                out.put_slice(&le);
                out.put_bytes(0, 32 - le.len());
            }
            (PrimitiveKind::Bool, Value::Bool(v)) => out.put_u8(*v as u8),
            (PrimitiveKind::Address(width), Value::Address(bytes)) => {
                if bytes.len() != *width {
                    return Err(CodecError::InvalidAddressWidth {
                        expected: *width,
                        got: bytes.len(),
                    });
                }
                out.put_slice(bytes);
            }
            (kind, value) => {
                return Err(CodecError::TypeMismatch {
                    expected: kind.to_string(),
                    got: value.kind().to_string(),
                })
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EmptyResolver;
    use num_bigint::BigUint;

    fn encode(schema: &Schema, value: &Value) -> Result<Vec<u8>, CodecError> {
        serialize(&EmptyResolver, schema, value)
    }

    #[test]
    fn u64_little_endian() {
        let bytes = encode(&Schema::Primitive(PrimitiveKind::U64), &Value::U64(1)).unwrap();
        assert_eq!(bytes, [1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn u256_padded_to_32_bytes() {
        let bytes = encode(
            &Schema::Primitive(PrimitiveKind::U256),
            &Value::U256(BigUint::from(7u8)),
        )
        .unwrap();
        assert_eq!(bytes.len(), 32);
        assert_eq!(bytes[0], 7);
        assert!(bytes[1..].iter().all(|&b| b == 0));
    }

    #[test]
    fn u256_wider_than_32_bytes_is_overflow() {
        let too_big = BigUint::from(1u8) << 256u32;
        let err = encode(
            &Schema::Primitive(PrimitiveKind::U256),
            &Value::U256(too_big),
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::IntegerOverflow { .. }));
    }

    #[test]
    fn string_is_byte_length_prefixed() {
        // "héllo" is 5 chars but 6 bytes — the prefix counts bytes.
        let bytes = encode(&Schema::Str, &Value::Str("héllo".into())).unwrap();
        assert_eq!(bytes[0], 6);
        assert_eq!(&bytes[1..], "héllo".as_bytes());
    }

    #[test]
    fn empty_vector_is_one_zero_byte() {
        let schema = Schema::vector(Schema::Primitive(PrimitiveKind::U8));
        let bytes = encode(&schema, &Value::Vector(vec![])).unwrap();
        assert_eq!(bytes, [0x00]);
    }

    #[test]
    fn option_wire_shape() {
        let schema = Schema::option(Schema::Primitive(PrimitiveKind::U64));
        assert_eq!(encode(&schema, &Value::none()).unwrap(), [0x00]);
        assert_eq!(
            encode(&schema, &Value::some(Value::U64(1))).unwrap(),
            [0x01, 0x01, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn struct_fields_follow_schema_order_not_insertion_order() {
        let schema = Schema::structure(
            "Pair",
            [
                ("first", Schema::Primitive(PrimitiveKind::U8)),
                ("second", Schema::Primitive(PrimitiveKind::U8)),
            ],
        );
        let forward = Value::structure([("first", Value::U8(1)), ("second", Value::U8(2))]);
        let reversed = Value::structure([("second", Value::U8(2)), ("first", Value::U8(1))]);
        let a = encode(&schema, &forward).unwrap();
        let b = encode(&schema, &reversed).unwrap();
        assert_eq!(a, [1, 2]);
        assert_eq!(a, b);
    }

    #[test]
    fn missing_struct_field() {
        let schema = Schema::structure("Pair", [("first", Schema::Primitive(PrimitiveKind::U8))]);
        let err = encode(&schema, &Value::structure([("other", Value::U8(1))])).unwrap_err();
        match err {
            CodecError::MissingField { struct_name, field } => {
                assert_eq!(struct_name, "Pair");
                assert_eq!(field, "first");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn enum_tag_is_declared_position() {
        let schema = Schema::enumeration(
            "Status",
            [
                ("Active", None),
                ("Retired", Some(Schema::Primitive(PrimitiveKind::U64))),
            ],
        );
        assert_eq!(
            encode(&schema, &Value::unit_variant("Active")).unwrap(),
            [0x00]
        );
        assert_eq!(
            encode(&schema, &Value::variant("Retired", Value::U64(9))).unwrap(),
            [0x01, 9, 0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn unknown_variant_rejected() {
        let schema = Schema::enumeration("Status", [("Active", Option::<Schema>::None)]);
        let err = encode(&schema, &Value::unit_variant("Missing")).unwrap_err();
        assert!(matches!(err, CodecError::UnknownVariant { .. }));
    }

    #[test]
    fn address_width_enforced() {
        let schema = Schema::Primitive(PrimitiveKind::Address(32));
        let err = encode(&schema, &Value::Address(vec![0u8; 20])).unwrap_err();
        match err {
            CodecError::InvalidAddressWidth { expected, got } => {
                assert_eq!(expected, 32);
                assert_eq!(got, 20);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn type_mismatch_names_both_sides() {
        let err = encode(&Schema::Primitive(PrimitiveKind::U8), &Value::Bool(true)).unwrap_err();
        match err {
            CodecError::TypeMismatch { expected, got } => {
                assert_eq!(expected, "u8");
                assert_eq!(got, "bool");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn element_errors_carry_index() {
        let schema = Schema::vector(Schema::Primitive(PrimitiveKind::U8));
        let err = encode(
            &schema,
            &Value::Vector(vec![Value::U8(1), Value::Bool(true)]),
        )
        .unwrap_err();
        match err {
            CodecError::AtIndex { index, .. } => assert_eq!(index, 1),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn fixed_array_length_must_match() {
        let schema = Schema::FixedArray {
            elem: Box::new(Schema::Primitive(PrimitiveKind::U8)),
            len: 3,
        };
        assert_eq!(
            encode(
                &schema,
                &Value::Vector(vec![Value::U8(1), Value::U8(2), Value::U8(3)])
            )
            .unwrap(),
            [1, 2, 3]
        );
        let err = encode(&schema, &Value::Vector(vec![Value::U8(1)])).unwrap_err();
        assert!(matches!(err, CodecError::TypeMismatch { .. }));
    }
}
