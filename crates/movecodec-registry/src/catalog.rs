//! Type-catalog parser.
//!
//! A catalog is a YAML document mapping type names to wire layouts — the
//! "deps" metadata a chain module publishes for its on-chain types. This
//! parser converts raw YAML text into `movecodec_core::Schema` trees
//! ready for registration.
//!
//! Layout tags:
//! - scalars: `U8 U16 U32 U64 U128 U256 BOOL ADDRESS STR BYTES`
//! - `SEQ: <layout>` — length-prefixed vector
//! - `OPTION: <layout>` — optional value
//! - `TUPLE: [<layout>, ...]` — positional fields
//! - `TUPLEARRAY: {CONTENT: <layout>, SIZE: <n>}` — fixed-length array
//! - `TYPENAME: <Name>` (optional `ARGS: [<layout>, ...]`) — reference
//!   to another catalog type, with type arguments for generics
//! - `TYPEPARAM: <n>` — the n-th type parameter of a generic definition
//! - `STRUCT: [- field: <layout>, ...]` — ordered named fields; also
//!   valid inline in any layout position (e.g. a struct-variant payload)
//! - `ENUM: {<index>: {Variant: UNIT | {NEWTYPE: <layout>} | <layout>}}`
//! - `PARAMS: <n>` — type-parameter count of a generic STRUCT/ENUM
//! - `NEWTYPESTRUCT: <layout>` — transparent alias

use indexmap::IndexMap;
use movecodec_core::{
    error::RegistryError,
    schema::{PrimitiveKind, Schema},
};
use serde_yaml::Value;
use std::collections::BTreeMap;

/// Address width used by `ADDRESS` catalog entries, in bytes.
pub const ADDRESS_WIDTH: usize = 32;

/// One parsed catalog entry, ready for `RegistryBuilder::register`.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeEntry {
    pub name: String,
    pub params: usize,
    pub schema: Schema,
}

// ─── Parser ───────────────────────────────────────────────────────────────────

pub struct CatalogParser;

impl CatalogParser {
    /// Parse every type definition from a catalog YAML string, in
    /// document order.
    pub fn parse_all(yaml: &str) -> Result<Vec<TypeEntry>, RegistryError> {
        let doc: Value = serde_yaml::from_str(yaml)
            .map_err(|e| RegistryError::ParseError(e.to_string()))?;
        let mapping = match doc {
            Value::Mapping(m) => m,
            Value::Null => return Ok(Vec::new()),
            _ => {
                return Err(RegistryError::ParseError(
                    "catalog document must be a YAML mapping of type names".into(),
                ))
            }
        };

        // IndexMap keyed by name: preserves document order and catches
        // duplicate definitions within one document.
        let mut entries: IndexMap<String, TypeEntry> = IndexMap::with_capacity(mapping.len());
        for (key, body) in &mapping {
            let name = key
                .as_str()
                .ok_or_else(|| {
                    RegistryError::ParseError("type names must be strings".into())
                })?
                .to_string();
            if entries.contains_key(&name) {
                return Err(RegistryError::ParseError(format!(
                    "type '{name}' defined twice in catalog"
                )));
            }
            let entry = Self::parse_type(&name, body)?;
            entries.insert(name, entry);
        }
        Ok(entries.into_values().collect())
    }

    /// Parse one type definition body.
    fn parse_type(name: &str, body: &Value) -> Result<TypeEntry, RegistryError> {
        let params = match body {
            Value::Mapping(map) => match get(map, "PARAMS") {
                None => 0,
                Some(v) => v.as_u64().ok_or_else(|| {
                    RegistryError::ParseError(format!("type '{name}': PARAMS must be an integer"))
                })? as usize,
            },
            _ => 0,
        };

        let schema = if let Value::Mapping(map) = body {
            if let Some(fields) = get(map, "STRUCT") {
                Self::parse_struct(name, fields)?
            } else if let Some(variants) = get(map, "ENUM") {
                Self::parse_enum(name, variants)?
            } else if let Some(inner) = get(map, "NEWTYPESTRUCT") {
                Self::parse_layout(name, inner)?
            } else if params != 0 {
                return Err(RegistryError::ParseError(format!(
                    "type '{name}': PARAMS is only valid on STRUCT or ENUM definitions"
                )));
            } else {
                Self::parse_layout(name, body)?
            }
        } else {
            Self::parse_layout(name, body)?
        };

        Ok(TypeEntry {
            name: name.to_string(),
            params,
            schema,
        })
    }

    /// Parse a `STRUCT` field list: a sequence of single-key mappings,
    /// in declaration order.
    fn parse_struct(name: &str, fields: &Value) -> Result<Schema, RegistryError> {
        let seq = fields.as_sequence().ok_or_else(|| {
            RegistryError::ParseError(format!(
                "type '{name}': STRUCT must be a sequence of 'field: layout' entries"
            ))
        })?;

        let mut parsed: Vec<(String, Schema)> = Vec::with_capacity(seq.len());
        for entry in seq {
            let (field_key, layout) = single_entry(entry).ok_or_else(|| {
                RegistryError::ParseError(format!(
                    "type '{name}': each STRUCT entry must be a single 'field: layout' mapping"
                ))
            })?;
            let field_name = field_key.as_str().ok_or_else(|| {
                RegistryError::ParseError(format!("type '{name}': field names must be strings"))
            })?;
            if parsed.iter().any(|(n, _)| n == field_name) {
                return Err(RegistryError::ParseError(format!(
                    "type '{name}': duplicate field '{field_name}'"
                )));
            }
            let schema = Self::parse_layout(name, layout).map_err(|e| match e {
                // Prefix the field without re-nesting the Display wrapper.
                RegistryError::ParseError(msg) => {
                    RegistryError::ParseError(format!("field '{field_name}': {msg}"))
                }
                other => other,
            })?;
            parsed.push((field_name.to_string(), schema));
        }

        Ok(Schema::Struct {
            name: name.to_string(),
            fields: parsed,
        })
    }

    /// Parse an `ENUM` variant map. Indices must be contiguous from 0;
    /// the declared order on the wire is the index order.
    fn parse_enum(name: &str, variants: &Value) -> Result<Schema, RegistryError> {
        let map = variants.as_mapping().ok_or_else(|| {
            RegistryError::ParseError(format!(
                "type '{name}': ENUM must be a mapping of variant indices"
            ))
        })?;

        let mut by_index: BTreeMap<u64, (String, Option<Schema>)> = BTreeMap::new();
        for (key, body) in map {
            let index = key.as_u64().ok_or_else(|| {
                RegistryError::ParseError(format!(
                    "type '{name}': ENUM keys must be non-negative integers"
                ))
            })?;
            if by_index.contains_key(&index) {
                return Err(RegistryError::ParseError(format!(
                    "type '{name}': duplicate variant index {index}"
                )));
            }
            let (variant_key, layout) = single_entry(body).ok_or_else(|| {
                RegistryError::ParseError(format!(
                    "type '{name}': each ENUM variant must be a single 'Name: layout' mapping"
                ))
            })?;
            let variant_name = variant_key.as_str().ok_or_else(|| {
                RegistryError::ParseError(format!("type '{name}': variant names must be strings"))
            })?;
            let payload = Self::parse_variant_payload(name, layout)?;
            by_index.insert(index, (variant_name.to_string(), payload));
        }

        // Reject gaps: the wire tag is a 0-based position.
        for (expected, actual) in by_index.keys().enumerate() {
            if expected as u64 != *actual {
                return Err(RegistryError::ParseError(format!(
                    "type '{name}': ENUM variant indices must be contiguous from 0 (missing {expected})"
                )));
            }
        }

        Ok(Schema::Enum {
            name: name.to_string(),
            variants: by_index.into_values().collect(),
        })
    }

    /// A variant payload: `UNIT`, a `NEWTYPE` wrapper, or a bare layout.
    fn parse_variant_payload(
        name: &str,
        layout: &Value,
    ) -> Result<Option<Schema>, RegistryError> {
        match layout {
            Value::String(s) if s == "UNIT" => Ok(None),
            Value::Mapping(map) => {
                if let Some(inner) = get(map, "NEWTYPE") {
                    Ok(Some(Self::parse_layout(name, inner)?))
                } else {
                    Ok(Some(Self::parse_layout(name, layout)?))
                }
            }
            other => Ok(Some(Self::parse_layout(name, other)?)),
        }
    }

    /// Parse a wire layout node.
    fn parse_layout(name: &str, layout: &Value) -> Result<Schema, RegistryError> {
        match layout {
            Value::String(tag) => match tag.as_str() {
                "U8" => Ok(Schema::Primitive(PrimitiveKind::U8)),
                "U16" => Ok(Schema::Primitive(PrimitiveKind::U16)),
                "U32" => Ok(Schema::Primitive(PrimitiveKind::U32)),
                "U64" => Ok(Schema::Primitive(PrimitiveKind::U64)),
                "U128" => Ok(Schema::Primitive(PrimitiveKind::U128)),
                "U256" => Ok(Schema::Primitive(PrimitiveKind::U256)),
                "BOOL" => Ok(Schema::Primitive(PrimitiveKind::Bool)),
                "ADDRESS" => Ok(Schema::Primitive(PrimitiveKind::Address(ADDRESS_WIDTH))),
                "STR" => Ok(Schema::Str),
                "BYTES" => Ok(Schema::Bytes),
                // Zero-byte layout, e.g. a marker field.
                "UNIT" => Ok(Schema::Tuple(Vec::new())),
                other => Err(RegistryError::ParseError(format!(
                    "type '{name}': unknown layout tag '{other}'"
                ))),
            },
            Value::Mapping(map) => {
                if let Some(elem) = get(map, "SEQ") {
                    Ok(Schema::Vector(Box::new(Self::parse_layout(name, elem)?)))
                } else if let Some(inner) = get(map, "OPTION") {
                    Ok(Schema::Option(Box::new(Self::parse_layout(name, inner)?)))
                } else if let Some(elems) = get(map, "TUPLE") {
                    let seq = elems.as_sequence().ok_or_else(|| {
                        RegistryError::ParseError(format!(
                            "type '{name}': TUPLE must be a sequence of layouts"
                        ))
                    })?;
                    let parsed = seq
                        .iter()
                        .map(|e| Self::parse_layout(name, e))
                        .collect::<Result<Vec<_>, _>>()?;
                    Ok(Schema::Tuple(parsed))
                } else if let Some(array) = get(map, "TUPLEARRAY") {
                    let array_map = array.as_mapping().ok_or_else(|| {
                        RegistryError::ParseError(format!(
                            "type '{name}': TUPLEARRAY must carry CONTENT and SIZE"
                        ))
                    })?;
                    let content = get(array_map, "CONTENT").ok_or_else(|| {
                        RegistryError::ParseError(format!(
                            "type '{name}': TUPLEARRAY missing CONTENT"
                        ))
                    })?;
                    let size = get(array_map, "SIZE").and_then(Value::as_u64).ok_or_else(|| {
                        RegistryError::ParseError(format!(
                            "type '{name}': TUPLEARRAY missing integer SIZE"
                        ))
                    })?;
                    Ok(Schema::FixedArray {
                        elem: Box::new(Self::parse_layout(name, content)?),
                        len: size as usize,
                    })
                } else if let Some(target) = get(map, "TYPENAME") {
                    let target_name = target.as_str().ok_or_else(|| {
                        RegistryError::ParseError(format!(
                            "type '{name}': TYPENAME must be a string"
                        ))
                    })?;
                    let type_args = match get(map, "ARGS") {
                        None => Vec::new(),
                        Some(args) => args
                            .as_sequence()
                            .ok_or_else(|| {
                                RegistryError::ParseError(format!(
                                    "type '{name}': ARGS must be a sequence of layouts"
                                ))
                            })?
                            .iter()
                            .map(|a| Self::parse_layout(name, a))
                            .collect::<Result<Vec<_>, _>>()?,
                    };
                    Ok(Schema::Named {
                        name: target_name.to_string(),
                        type_args,
                    })
                } else if let Some(index) = get(map, "TYPEPARAM") {
                    let index = index.as_u64().ok_or_else(|| {
                        RegistryError::ParseError(format!(
                            "type '{name}': TYPEPARAM must be an integer"
                        ))
                    })?;
                    Ok(Schema::TypeParam(index as usize))
                } else if let Some(fields) = get(map, "STRUCT") {
                    // Inline struct, e.g. a struct-variant enum payload.
                    Self::parse_struct(name, fields)
                } else if let Some(inner) = get(map, "NEWTYPESTRUCT") {
                    Self::parse_layout(name, inner)
                } else {
                    Err(RegistryError::ParseError(format!(
                        "type '{name}': unrecognized layout mapping"
                    )))
                }
            }
            _ => Err(RegistryError::ParseError(format!(
                "type '{name}': layout must be a string tag or a mapping"
            ))),
        }
    }
}

fn get<'a>(map: &'a serde_yaml::Mapping, key: &str) -> Option<&'a Value> {
    map.get(Value::String(key.to_string()))
}

/// The sole `key: value` pair of a single-entry mapping.
fn single_entry(node: &Value) -> Option<(&Value, &Value)> {
    let map = node.as_mapping()?;
    let mut entries = map.iter();
    match (entries.next(), entries.next()) {
        (Some(kv), None) => Some(kv),
        _ => None,
    }
}
