//! Golden wire-format integration tests.
//!
//! Each test loads a YAML type catalog into a registry, then encodes or
//! decodes values and asserts the exact byte layout (or the exact
//! rejection) the canonical format prescribes.

use movecodec_core::{CodecError, PrimitiveKind, Schema, Value};
use movecodec_registry::Registry;

// ─── Catalog fixture ──────────────────────────────────────────────────────────

const FEED_CATALOG: &str = r#"
BlobId:
  STRUCT:
    - pos0: U256

FeedContent:
  STRUCT:
    - content: { TYPENAME: BlobId }
    - author: ADDRESS
    - sub_feed: { OPTION: ADDRESS }

FeedOwnership:
  ENUM:
    0:
      User: { NEWTYPE: ADDRESS }
    1:
      Community: UNIT

Node:
  STRUCT:
    - label: U8
    - next: { OPTION: { TYPENAME: Node } }

Entry:
  PARAMS: 1
  STRUCT:
    - key: STR
    - values: { SEQ: { TYPEPARAM: 0 } }
"#;

fn feed_registry() -> Registry {
    let mut builder = Registry::builder();
    let loaded = builder
        .load_catalog_str(FEED_CATALOG)
        .expect("catalog should parse");
    assert_eq!(loaded, 5);
    builder.build()
}

fn feed_content(sub_feed: Value) -> Value {
    Value::structure([
        (
            "content",
            Value::structure([("pos0", Value::u256_from_decimal("7").unwrap())]),
        ),
        ("author", Value::Address(vec![0x11; 32])),
        ("sub_feed", sub_feed),
    ])
}

// ─── FeedContent layout ───────────────────────────────────────────────────────

#[test]
fn feed_content_without_sub_feed_is_65_bytes() {
    let registry = feed_registry();
    let value = feed_content(Value::none());

    let bytes = registry.serialize("FeedContent", &[], &value).unwrap();
    assert_eq!(bytes.len(), 65);

    // pos0: 7 as 32 little-endian bytes.
    assert_eq!(bytes[0], 0x07);
    assert!(bytes[1..32].iter().all(|&b| b == 0));
    // author: 32 raw address bytes, no length prefix.
    assert_eq!(&bytes[32..64], &[0x11; 32]);
    // sub_feed: absent.
    assert_eq!(bytes[64], 0x00);

    let back = registry.deserialize("FeedContent", &[], &bytes).unwrap();
    assert_eq!(back, value);
}

#[test]
fn feed_content_with_sub_feed_is_97_bytes() {
    let registry = feed_registry();
    let value = feed_content(Value::some(Value::Address(vec![0x22; 32])));

    let bytes = registry.serialize("FeedContent", &[], &value).unwrap();
    assert_eq!(bytes.len(), 97);
    assert_eq!(bytes[64], 0x01);
    assert_eq!(&bytes[65..97], &[0x22; 32]);

    let back = registry.deserialize("FeedContent", &[], &bytes).unwrap();
    assert_eq!(back, value);
}

#[test]
fn field_encoding_order_follows_schema_not_insertion() {
    let registry = feed_registry();
    // Same fields, different insertion order.
    let shuffled = Value::structure([
        ("sub_feed", Value::none()),
        ("author", Value::Address(vec![0x11; 32])),
        (
            "content",
            Value::structure([("pos0", Value::u256_from_decimal("7").unwrap())]),
        ),
    ]);

    let a = registry
        .serialize("FeedContent", &[], &feed_content(Value::none()))
        .unwrap();
    let b = registry.serialize("FeedContent", &[], &shuffled).unwrap();
    assert_eq!(a, b);
}

// ─── Canonical-form rejection ─────────────────────────────────────────────────

#[test]
fn trailing_byte_is_rejected() {
    let registry = feed_registry();
    let value = feed_content(Value::none());
    let mut bytes = registry.serialize("FeedContent", &[], &value).unwrap();
    bytes.push(0xFF);

    let err = registry
        .deserialize("FeedContent", &[], &bytes)
        .unwrap_err();
    match err {
        CodecError::TrailingBytes { remaining, .. } => assert_eq!(remaining, 1),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn truncated_input_is_rejected() {
    let registry = feed_registry();
    let value = feed_content(Value::none());
    let bytes = registry.serialize("FeedContent", &[], &value).unwrap();

    let err = registry
        .deserialize("FeedContent", &[], &bytes[..40])
        .unwrap_err();
    assert!(matches!(
        err.root_cause(),
        CodecError::UnexpectedEndOfInput { .. }
    ));
}

#[test]
fn enum_tag_out_of_range_is_rejected() {
    let registry = feed_registry();
    // FeedOwnership has variants 0 and 1; tag 5 names nothing.
    let err = registry
        .deserialize("FeedOwnership", &[], &[0x05])
        .unwrap_err();
    match err {
        CodecError::VariantIndexOutOfRange { index, count, .. } => {
            assert_eq!(index, 5);
            assert_eq!(count, 2);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// ─── Enums ────────────────────────────────────────────────────────────────────

#[test]
fn enum_variant_roundtrips_with_tag_and_payload() {
    let registry = feed_registry();
    let owned = Value::variant("User", Value::Address(vec![0x33; 32]));

    let bytes = registry.serialize("FeedOwnership", &[], &owned).unwrap();
    assert_eq!(bytes.len(), 33);
    assert_eq!(bytes[0], 0x00);

    let community = Value::unit_variant("Community");
    let bytes = registry
        .serialize("FeedOwnership", &[], &community)
        .unwrap();
    assert_eq!(bytes, [0x01]);
    let back = registry.deserialize("FeedOwnership", &[], &bytes).unwrap();
    assert_eq!(back, community);
}

#[test]
fn struct_variant_enum_roundtrips() {
    let catalog = r#"
ExecutionStatus:
  ENUM:
    0:
      Success: UNIT
    1:
      Failure:
        STRUCT:
          - code: U64
"#;
    let mut builder = Registry::builder();
    builder.load_catalog_str(catalog).unwrap();
    let registry = builder.build();

    let failure = Value::variant("Failure", Value::structure([("code", Value::U64(7))]));
    let bytes = registry
        .serialize("ExecutionStatus", &[], &failure)
        .unwrap();
    // Tag 1, then the inline struct's single u64 field.
    assert_eq!(bytes, [0x01, 7, 0, 0, 0, 0, 0, 0, 0]);
    let back = registry
        .deserialize("ExecutionStatus", &[], &bytes)
        .unwrap();
    assert_eq!(back, failure);

    let success = Value::unit_variant("Success");
    let bytes = registry
        .serialize("ExecutionStatus", &[], &success)
        .unwrap();
    assert_eq!(bytes, [0x00]);
}

// ─── Sequences and options ────────────────────────────────────────────────────

#[test]
fn empty_vector_is_a_single_zero_byte() {
    let registry = feed_registry();
    let empty = Value::structure([
        ("key", Value::Str("feeds".into())),
        ("values", Value::Vector(vec![])),
    ]);

    let u64_arg = [Schema::Primitive(PrimitiveKind::U64)];
    let bytes = registry.serialize("Entry", &u64_arg, &empty).unwrap();
    // "feeds" = len 5 + bytes, then the empty sequence.
    assert_eq!(bytes, [0x05, b'f', b'e', b'e', b'd', b's', 0x00]);
}

#[test]
fn generic_instantiation_roundtrips() {
    let registry = feed_registry();
    let entry = Value::structure([
        ("key", Value::Str("scores".into())),
        (
            "values",
            Value::Vector(vec![Value::U64(1), Value::U64(2), Value::U64(300)]),
        ),
    ]);

    let u64_arg = [Schema::Primitive(PrimitiveKind::U64)];
    let bytes = registry.serialize("Entry", &u64_arg, &entry).unwrap();
    let back = registry.deserialize("Entry", &u64_arg, &bytes).unwrap();
    assert_eq!(back, entry);

    // The same bytes under a different instantiation must not parse the
    // same way: u8 elements are one byte each, so the length prefix no
    // longer matches the payload.
    let u8_arg = [Schema::Primitive(PrimitiveKind::U8)];
    assert!(registry.deserialize("Entry", &u8_arg, &bytes).is_err());
}

#[test]
fn bytes_tuple_and_fixed_array_layouts_roundtrip() {
    let catalog = r#"
Checkpoint:
  STRUCT:
    - digest: { TUPLEARRAY: { CONTENT: U8, SIZE: 4 } }
    - payload: BYTES
    - range: { TUPLE: [U64, U64] }
"#;
    let mut builder = Registry::builder();
    builder.load_catalog_str(catalog).unwrap();
    let registry = builder.build();

    let checkpoint = Value::structure([
        (
            "digest",
            Value::Vector(vec![
                Value::U8(0xDE),
                Value::U8(0xAD),
                Value::U8(0xBE),
                Value::U8(0xEF),
            ]),
        ),
        ("payload", Value::Bytes(vec![1, 2])),
        ("range", Value::Tuple(vec![Value::U64(5), Value::U64(9)])),
    ]);

    let bytes = registry.serialize("Checkpoint", &[], &checkpoint).unwrap();
    // digest: 4 raw bytes, no prefix. payload: length then raw bytes.
    // range: two u64s back to back.
    assert_eq!(
        bytes,
        [
            0xDE, 0xAD, 0xBE, 0xEF, //
            0x02, 1, 2, //
            5, 0, 0, 0, 0, 0, 0, 0, //
            9, 0, 0, 0, 0, 0, 0, 0,
        ]
    );
    let back = registry.deserialize("Checkpoint", &[], &bytes).unwrap();
    assert_eq!(back, checkpoint);

    // A fifth digest byte shifts everything and must not parse.
    let mut padded = bytes.clone();
    padded.push(0xFF);
    assert!(registry.deserialize("Checkpoint", &[], &padded).is_err());
}

// ─── Recursive definitions ────────────────────────────────────────────────────

#[test]
fn recursive_catalog_type_roundtrips() {
    let registry = feed_registry();
    let list = Value::structure([
        ("label", Value::U8(1)),
        (
            "next",
            Value::some(Value::structure([
                ("label", Value::U8(2)),
                ("next", Value::none()),
            ])),
        ),
    ]);

    let bytes = registry.serialize("Node", &[], &list).unwrap();
    assert_eq!(bytes, [0x01, 0x01, 0x02, 0x00]);
    let back = registry.deserialize("Node", &[], &bytes).unwrap();
    assert_eq!(back, list);
}

#[test]
fn unbounded_recursion_hits_the_depth_limit() {
    let registry = feed_registry();
    // A long chain of `some` flags with no terminator in sight.
    let bytes = vec![0x01; 8192];
    let err = registry.deserialize("Node", &[], &bytes).unwrap_err();
    assert!(matches!(
        err.root_cause(),
        CodecError::RecursionLimitExceeded { .. }
    ));
}
