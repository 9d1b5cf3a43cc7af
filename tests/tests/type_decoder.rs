use idl_decoder_tests::{key, launchlab_schema, Payload};
use idl_instruction_decoder::{
    decode::MAX_DEPTH, DecodeError, DecodedValue, Primitive, Schema, TypeDecoder, TypeRef,
};

fn schema_with_types(types: &str) -> Schema {
    Schema::from_json(&format!(r#"{{ "instructions": [], "types": {types} }}"#)).unwrap()
}

fn prim(primitive: Primitive) -> TypeRef {
    TypeRef::Primitive(primitive)
}

fn defined(name: &str) -> TypeRef {
    TypeRef::Defined(name.to_string())
}

#[test]
fn test_decodes_little_endian_integers() {
    let schema = schema_with_types("[]");
    let decoder = TypeDecoder::new(&schema);
    let data = Payload::default()
        .u16(0x0102)
        .u32(0xdead_beef)
        .u64(u64::MAX - 1)
        .i64(-42)
        .u8(0xff)
        .build();

    let (v, offset) = decoder.decode(&data, 0, &prim(Primitive::U16)).unwrap();
    assert_eq!((v, offset), (DecodedValue::U16(0x0102), 2));
    let (v, offset) = decoder.decode(&data, offset, &prim(Primitive::U32)).unwrap();
    assert_eq!((v, offset), (DecodedValue::U32(0xdead_beef), 6));
    let (v, offset) = decoder.decode(&data, offset, &prim(Primitive::U64)).unwrap();
    assert_eq!((v, offset), (DecodedValue::U64(u64::MAX - 1), 14));
    let (v, offset) = decoder.decode(&data, offset, &prim(Primitive::I64)).unwrap();
    assert_eq!((v, offset), (DecodedValue::I64(-42), 22));
    let (v, offset) = decoder.decode(&data, offset, &prim(Primitive::I8)).unwrap();
    assert_eq!((v, offset), (DecodedValue::I8(-1), 23));
    assert_eq!(offset, data.len());
}

#[test]
fn test_signed_small_integers() {
    let schema = schema_with_types("[]");
    let decoder = TypeDecoder::new(&schema);
    let data = [0xfe, 0xff, 0xfd, 0xff, 0xff, 0xff];

    assert_eq!(
        decoder.decode(&data, 0, &prim(Primitive::I16)).unwrap(),
        (DecodedValue::I16(-2), 2)
    );
    assert_eq!(
        decoder.decode(&data, 2, &prim(Primitive::I32)).unwrap(),
        (DecodedValue::I32(-3), 6)
    );
}

#[test]
fn test_bool_accepts_only_zero_and_one() {
    let schema = schema_with_types("[]");
    let decoder = TypeDecoder::new(&schema);

    assert_eq!(
        decoder.decode(&[0], 0, &prim(Primitive::Bool)).unwrap(),
        (DecodedValue::Bool(false), 1)
    );
    assert_eq!(
        decoder.decode(&[1], 0, &prim(Primitive::Bool)).unwrap(),
        (DecodedValue::Bool(true), 1)
    );
    let err = decoder.decode(&[2], 0, &prim(Primitive::Bool)).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::InvalidValue {
            type_name: "bool",
            offset: 0,
            ..
        }
    ));
}

#[test]
fn test_insufficient_bytes_for_fixed_width() {
    let schema = schema_with_types("[]");
    let decoder = TypeDecoder::new(&schema);
    let data = [1, 2, 3, 4, 5];

    let err = decoder.decode(&data, 2, &prim(Primitive::U32)).unwrap_err();
    assert_eq!(
        err,
        DecodeError::InsufficientBytes {
            type_name: "u32",
            offset: 2,
            needed: 4,
            remaining: 3,
        }
    );
    assert_eq!(err.offset(), 2);

    // Offset at the very end
    let err = decoder.decode(&data, 5, &prim(Primitive::U8)).unwrap_err();
    assert!(matches!(err, DecodeError::InsufficientBytes { remaining: 0, .. }));
}

#[test]
fn test_string_decodes_exact_body() {
    let schema = schema_with_types("[]");
    let decoder = TypeDecoder::new(&schema);
    let data = Payload::default().string("BONK").u8(9).build();

    assert_eq!(
        decoder.decode(&data, 0, &prim(Primitive::String)).unwrap(),
        (DecodedValue::String("BONK".to_string()), 8)
    );

    let empty = Payload::default().string("").build();
    assert_eq!(
        decoder.decode(&empty, 0, &prim(Primitive::String)).unwrap(),
        (DecodedValue::String(String::new()), 4)
    );
}

#[test]
fn test_string_length_beyond_buffer_is_an_error() {
    let schema = schema_with_types("[]");
    let decoder = TypeDecoder::new(&schema);
    let data = Payload::default().u32(10).bytes(b"short").build();

    let err = decoder.decode(&data, 0, &prim(Primitive::String)).unwrap_err();
    assert_eq!(
        err,
        DecodeError::StringLengthOverflow {
            offset: 0,
            length: 10,
            remaining: 5,
        }
    );
}

#[test]
fn test_string_must_be_utf8() {
    let schema = schema_with_types("[]");
    let decoder = TypeDecoder::new(&schema);
    let data = Payload::default().u32(2).bytes(&[0xc3, 0x28]).build();

    let err = decoder.decode(&data, 0, &prim(Primitive::String)).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::InvalidValue {
            type_name: "string",
            offset: 4,
            ..
        }
    ));
}

#[test]
fn test_pubkey_needs_32_bytes() {
    let schema = schema_with_types("[]");
    let decoder = TypeDecoder::new(&schema);
    let data = Payload::default().pubkey(&key(7)).build();

    assert_eq!(
        decoder.decode(&data, 0, &prim(Primitive::Pubkey)).unwrap(),
        (DecodedValue::Pubkey(key(7)), 32)
    );

    let err = decoder
        .decode(&data[..31], 0, &prim(Primitive::Pubkey))
        .unwrap_err();
    assert!(matches!(
        err,
        DecodeError::InsufficientBytes {
            type_name: "pubkey",
            needed: 32,
            remaining: 31,
            ..
        }
    ));
}

#[test]
fn test_struct_fields_decode_in_declaration_order() {
    let schema = launchlab_schema();
    let decoder = TypeDecoder::new(&schema);
    let data = Payload::default()
        .u8(6)
        .string("Bonk Dog")
        .string("BDOG")
        .string("uri")
        .build();

    let (value, offset) = decoder.decode(&data, 0, &defined("MintParams")).unwrap();
    assert_eq!(offset, data.len());
    let DecodedValue::Struct(fields) = &value else {
        panic!("expected struct, got {value:?}");
    };
    let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["decimals", "name", "symbol", "uri"]);
    assert_eq!(value.field("decimals"), Some(&DecodedValue::U8(6)));
    assert_eq!(value.field("symbol").and_then(DecodedValue::as_str), Some("BDOG"));
}

#[test]
fn test_struct_failure_returns_no_partial_value() {
    let schema = launchlab_schema();
    let decoder = TypeDecoder::new(&schema);
    // `uri` is missing entirely
    let data = Payload::default()
        .u8(6)
        .string("Bonk Dog")
        .string("BDOG")
        .build();

    let err = decoder.decode(&data, 0, &defined("MintParams")).unwrap_err();
    assert_eq!(
        err,
        DecodeError::InsufficientBytes {
            type_name: "string length",
            offset: data.len(),
            needed: 4,
            remaining: 0,
        }
    );
}

#[test]
fn test_enum_tag_selects_variant_by_position() {
    let schema = launchlab_schema();
    let decoder = TypeDecoder::new(&schema);
    let data = Payload::default()
        .u8(1)
        .u64(500)
        .u64(85)
        .u8(0)
        .build();

    let (value, offset) = decoder.decode(&data, 0, &defined("CurveParams")).unwrap();
    assert_eq!(offset, 18);
    assert_eq!(value.variant(), Some("Fixed"));
    let curve = value.field("data").unwrap();
    assert_eq!(curve.field("supply"), Some(&DecodedValue::U64(500)));
    assert_eq!(curve.field("migrate_type"), Some(&DecodedValue::U8(0)));
}

#[test]
fn test_enum_tag_out_of_range() {
    let schema = launchlab_schema();
    let decoder = TypeDecoder::new(&schema);

    for tag in [3u8, 4, 255] {
        let data = Payload::default().u8(tag).u64(1).u64(2).u8(0).build();
        let err = decoder.decode(&data, 0, &defined("CurveParams")).unwrap_err();
        assert_eq!(
            err,
            DecodeError::InvalidEnumTag {
                type_name: "CurveParams".to_string(),
                offset: 0,
                tag,
                variant_count: 3,
            }
        );
    }
}

#[test]
fn test_enum_without_variants_always_fails() {
    let schema = schema_with_types(
        r#"[{ "name": "Never", "type": { "kind": "enum", "variants": [] } }]"#,
    );
    let decoder = TypeDecoder::new(&schema);

    let err = decoder.decode(&[0], 0, &defined("Never")).unwrap_err();
    assert!(matches!(
        err,
        DecodeError::InvalidEnumTag {
            tag: 0,
            variant_count: 0,
            ..
        }
    ));
}

#[test]
fn test_unit_variant_consumes_only_the_tag() {
    let schema = schema_with_types(
        r#"[{ "name": "Side", "type": { "kind": "enum", "variants": [
            { "name": "Buy" }, { "name": "Sell" }
        ] } }]"#,
    );
    let decoder = TypeDecoder::new(&schema);

    let (value, offset) = decoder.decode(&[1, 0xaa], 0, &defined("Side")).unwrap();
    assert_eq!(offset, 1);
    assert_eq!(
        value,
        DecodedValue::Enum {
            variant: "Sell".to_string(),
            fields: vec![],
        }
    );
}

#[test]
fn test_unknown_defined_type() {
    let schema = schema_with_types("[]");
    let decoder = TypeDecoder::new(&schema);

    let err = decoder.decode(&[0; 8], 3, &defined("Ghost")).unwrap_err();
    assert_eq!(
        err,
        DecodeError::UnknownType {
            name: "Ghost".to_string(),
            offset: 3,
        }
    );
}

#[test]
fn test_unsupported_kinds_and_references_fail() {
    let schema = schema_with_types(
        r#"[
            { "name": "Alias", "type": { "kind": "type", "alias": "u64" } },
            { "name": "Wrapper", "type": { "kind": "struct", "fields": [
                { "name": "items", "type": { "vec": "u8" } }
            ] } }
        ]"#,
    );
    let decoder = TypeDecoder::new(&schema);

    assert!(matches!(
        decoder.decode(&[0; 8], 0, &defined("Alias")),
        Err(DecodeError::UnsupportedType { offset: 0, .. })
    ));
    assert!(matches!(
        decoder.decode(&[0; 8], 0, &defined("Wrapper")),
        Err(DecodeError::UnsupportedType { offset: 0, .. })
    ));
    assert!(matches!(
        decoder.decode(&[0; 8], 0, &TypeRef::Unsupported("u128".to_string())),
        Err(DecodeError::UnsupportedType { .. })
    ));
}

#[test]
fn test_self_referencing_struct_hits_depth_limit() {
    let schema = schema_with_types(
        r#"[{ "name": "Loop", "type": { "kind": "struct", "fields": [
            { "name": "again", "type": { "defined": "Loop" } }
        ] } }]"#,
    );
    let decoder = TypeDecoder::new(&schema);

    let err = decoder.decode(&[], 0, &defined("Loop")).unwrap_err();
    assert_eq!(
        err,
        DecodeError::DepthLimitExceeded {
            limit: MAX_DEPTH,
            offset: 0,
        }
    );
}

#[test]
fn test_tuple_fields_are_named_by_position() {
    let schema = launchlab_schema();
    let decoder = TypeDecoder::new(&schema);
    let data = Payload::default().u8(2).u64(250).build();

    let (value, _) = decoder
        .decode(&data, 0, &defined("PlatformConfigParam"))
        .unwrap();
    assert_eq!(value.variant(), Some("FeeRate"));
    assert_eq!(value.field("field0"), Some(&DecodedValue::U64(250)));
}
