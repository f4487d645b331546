
use fieldstripe_core::{
    CompositeType, FieldQualifier, FieldType, PrimitiveType, SchemaError, SchemaProvider,
};
use fieldstripe_protobuf::{
    PresencePolicy, ProtobufSchemaProvider, protobuf_descriptor_to_schema,
    protobuf_descriptor_to_schema_with_policy,
};
use prost_types::{
    DescriptorProto,
    field_descriptor_proto::{Label, Type},
};
use test_helpers::*;

fn primitive(schema: &CompositeType, path: &str) -> (PrimitiveType, FieldQualifier) {
    let field = schema
        .field_by_path(path)
        .unwrap_or_else(|| panic!("no field {path}"));
    (field.field_type().as_primitive().unwrap(), field.qualifier())
}

#[test]
fn scalar_fields() {
    let msg = message(
        "Scalars",
        vec![
            scalar_field("f_double", 1, Type::Double),
            scalar_field("f_float", 2, Type::Float),
            scalar_field("f_int32", 3, Type::Int32),
            scalar_field("f_int64", 4, Type::Int64),
            scalar_field("f_uint32", 5, Type::Uint32),
            scalar_field("f_sint32", 7, Type::Sint32),
            scalar_field("f_sint64", 8, Type::Sint64),
            scalar_field("f_fixed32", 9, Type::Fixed32),
            scalar_field("f_sfixed32", 11, Type::Sfixed32),
            scalar_field("f_sfixed64", 12, Type::Sfixed64),
            scalar_field("f_bool", 13, Type::Bool),
            scalar_field("f_string", 14, Type::String),
        ],
    );
    let fds = build_fds("scalars.proto", vec![msg]);
    let schema = protobuf_descriptor_to_schema("Scalars", &fds).unwrap();

    let expected = [
        ("f_double", 1, PrimitiveType::Double),
        ("f_float", 2, PrimitiveType::Float),
        ("f_int32", 3, PrimitiveType::Int),
        ("f_int64", 4, PrimitiveType::Long),
        ("f_uint32", 5, PrimitiveType::Long),
        ("f_sint32", 7, PrimitiveType::Int),
        ("f_sint64", 8, PrimitiveType::Long),
        ("f_fixed32", 9, PrimitiveType::Long),
        ("f_sfixed32", 11, PrimitiveType::Int),
        ("f_sfixed64", 12, PrimitiveType::Long),
        ("f_bool", 13, PrimitiveType::Boolean),
        ("f_string", 14, PrimitiveType::String),
    ];

    assert_eq!(schema.name(), "Scalars");
    assert_eq!(schema.fields().len(), expected.len());
    for (field, (name, index, p)) in schema.fields().iter().zip(expected) {
        assert_eq!(field.name(), name);
        assert_eq!(field.index(), index);
        assert_eq!(field.field_type().as_primitive(), Some(p));
        // proto3 implicit presence
        assert_eq!(field.qualifier(), FieldQualifier::One);
        assert_eq!(field.depth().get(), 1);
    }
}

#[test]
fn unsigned_64_bit_and_bytes_are_unsupported() {
    for (typ, kind) in [
        (Type::Uint64, "Uint64"),
        (Type::Fixed64, "Fixed64"),
        (Type::Bytes, "Bytes"),
    ] {
        let fds = build_fds(
            "unsupported.proto",
            vec![message("Blob", vec![scalar_field("data", 1, typ)])],
        );
        let err = protobuf_descriptor_to_schema("Blob", &fds).unwrap_err();
        match err {
            SchemaError::Unsupported {
                type_name,
                field,
                kind: actual,
            } => {
                assert_eq!(type_name, "Blob");
                assert_eq!(field, "data");
                assert_eq!(actual, kind);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

#[test]
fn repeated_field_is_zero_or_more() {
    let fds = build_fds(
        "list.proto",
        vec![message("WithList", vec![repeated_field("values", 1, Type::Int32)])],
    );
    let schema = protobuf_descriptor_to_schema("WithList", &fds).unwrap();

    assert_eq!(
        primitive(&schema, "values"),
        (PrimitiveType::Int, FieldQualifier::ZeroOrMore)
    );
}

#[test]
fn nested_message_becomes_composite() {
    let inner = message("Inner", vec![scalar_field("value", 1, Type::Float)]);
    let outer = message(
        "Outer",
        vec![
            message_field("inner", 1, ".Inner", Label::Optional),
            message_field("items", 2, ".Inner", Label::Repeated),
        ],
    );
    let fds = build_fds("nested.proto", vec![inner, outer]);
    let schema = protobuf_descriptor_to_schema("Outer", &fds).unwrap();

    let inner = schema.field_by_name("inner").unwrap();
    assert_eq!(inner.qualifier(), FieldQualifier::ZeroOrOne);
    assert!(matches!(inner.field_type(), FieldType::Composite(c) if c.name() == "Inner"));
    assert_eq!(
        schema.field_by_name("items").unwrap().qualifier(),
        FieldQualifier::ZeroOrMore
    );

    let value = schema.field_by_path("items.value").unwrap();
    assert_eq!(value.depth().get(), 2);
    assert_eq!(value.path().to_string(), "items.value");
    assert_eq!(schema.leaves().len(), 2);
}

#[test]
fn enum_field_becomes_int() {
    let msg = message("WithEnum", vec![enum_field("color", 1, ".Color")]);
    let fds = build_fds_with_enums(
        "enum.proto",
        vec![msg],
        vec![simple_enum("Color", &[("RED", 0), ("GREEN", 1)])],
    );
    let schema = protobuf_descriptor_to_schema("WithEnum", &fds).unwrap();

    assert_eq!(
        primitive(&schema, "color"),
        (PrimitiveType::Int, FieldQualifier::One)
    );
}

#[test]
fn map_field_becomes_repeated_entry() {
    let msg = DescriptorProto {
        nested_type: vec![map_entry_message(
            "LabelsEntry",
            Type::String,
            Type::Int64,
        )],
        ..message(
            "WithMap",
            vec![message_field(
                "labels",
                1,
                ".WithMap.LabelsEntry",
                Label::Repeated,
            )],
        )
    };
    let fds = build_fds("map.proto", vec![msg]);
    let schema = protobuf_descriptor_to_schema("WithMap", &fds).unwrap();

    let labels = schema.field_by_name("labels").unwrap();
    assert_eq!(labels.qualifier(), FieldQualifier::ZeroOrMore);
    assert_eq!(
        primitive(&schema, "labels.key"),
        (PrimitiveType::String, FieldQualifier::One)
    );
    assert_eq!(
        primitive(&schema, "labels.value"),
        (PrimitiveType::Long, FieldQualifier::One)
    );
}

#[test]
fn proto3_optional_is_zero_or_one() {
    let msg = DescriptorProto {
        oneof_decl: vec![synthetic_oneof("_count")],
        ..message(
            "WithOptional",
            vec![
                proto3_optional_scalar_field("count", 1, Type::Int32, 0),
                scalar_field("plain", 2, Type::Int32),
            ],
        )
    };
    let fds = build_fds("optional.proto", vec![msg]);
    let schema = protobuf_descriptor_to_schema("WithOptional", &fds).unwrap();

    assert_eq!(
        primitive(&schema, "count"),
        (PrimitiveType::Int, FieldQualifier::ZeroOrOne)
    );
    assert_eq!(
        primitive(&schema, "plain"),
        (PrimitiveType::Int, FieldQualifier::One)
    );
}

#[test]
fn all_optional_policy_relaxes_singular_fields() {
    let msg = message(
        "Scalars",
        vec![
            scalar_field("x", 1, Type::Int32),
            repeated_field("xs", 2, Type::Int32),
        ],
    );
    let fds = build_fds("policy.proto", vec![msg]);
    let schema =
        protobuf_descriptor_to_schema_with_policy("Scalars", &fds, PresencePolicy::AllOptional)
            .unwrap();

    assert_eq!(
        primitive(&schema, "x"),
        (PrimitiveType::Int, FieldQualifier::ZeroOrOne)
    );
    assert_eq!(
        primitive(&schema, "xs"),
        (PrimitiveType::Int, FieldQualifier::ZeroOrMore)
    );
}

#[test]
fn proto2_labels() {
    let msg = message(
        "Legacy",
        vec![
            required_field("id", 1, Type::Int64),
            scalar_field("note", 2, Type::String),
            repeated_field("tags", 3, Type::String),
        ],
    );
    let fds = build_proto2_fds("legacy.proto", vec![msg]);

    for policy in [PresencePolicy::PresenceAware, PresencePolicy::AllOptional] {
        let schema = protobuf_descriptor_to_schema_with_policy("Legacy", &fds, policy).unwrap();
        assert_eq!(
            primitive(&schema, "id"),
            (PrimitiveType::Long, FieldQualifier::One)
        );
        assert_eq!(
            primitive(&schema, "note"),
            (PrimitiveType::String, FieldQualifier::ZeroOrOne)
        );
        assert_eq!(
            primitive(&schema, "tags"),
            (PrimitiveType::String, FieldQualifier::ZeroOrMore)
        );
    }
}

#[test]
fn unknown_message_name_is_not_found() {
    let fds = build_fds(
        "test.proto",
        vec![message("Exists", vec![scalar_field("x", 1, Type::Int32)])],
    );
    let err = protobuf_descriptor_to_schema("DoesNotExist", &fds).unwrap_err();
    assert!(matches!(err, SchemaError::NotFound { ref name } if name == "DoesNotExist"));
    assert!(err.to_string().contains("DoesNotExist"));
}

#[test]
fn nested_message_is_not_top_level() {
    let outer = DescriptorProto {
        nested_type: vec![message("Inner", vec![scalar_field("x", 1, Type::Int32)])],
        ..message(
            "Outer",
            vec![message_field("inner", 1, ".Outer.Inner", Label::Optional)],
        )
    };
    let fds = build_fds("nested.proto", vec![outer]);
    let provider = ProtobufSchemaProvider::decode(&fds).unwrap();

    assert!(provider.root_type("Outer").is_ok());
    let err = provider.root_type("Outer.Inner").unwrap_err();
    assert!(matches!(err, SchemaError::NotTopLevel { .. }));
    assert_eq!(provider.top_level_messages(), vec!["Outer".to_string()]);
}

#[test]
fn recursive_message_is_rejected() {
    let node = message(
        "Node",
        vec![
            scalar_field("id", 1, Type::Int32),
            message_field("children", 2, ".Node", Label::Repeated),
        ],
    );
    let fds = build_fds("tree.proto", vec![node]);
    let err = protobuf_descriptor_to_schema("Node", &fds).unwrap_err();

    match err {
        SchemaError::Recursive { type_name, field } => {
            assert_eq!(type_name, "Node");
            assert_eq!(field, "Node.children");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn message_without_fields_is_invalid() {
    let fds = build_fds("empty.proto", vec![message("Empty", vec![])]);
    let err = protobuf_descriptor_to_schema("Empty", &fds).unwrap_err();
    assert!(matches!(err, SchemaError::Invalid { .. }));
}

#[test]
fn invalid_schema_data_is_a_parse_error() {
    let err = protobuf_descriptor_to_schema("Foo", &[0xff, 0xff, 0xff]).unwrap_err();
    assert!(matches!(err, SchemaError::Parse { .. }));
}

#[test]
fn provider_from_file_descriptor_set() {
    let fds = file_set(
        "direct.proto",
        "proto3",
        vec![message("Direct", vec![scalar_field("x", 1, Type::Bool)])],
        vec![],
    );
    let provider = ProtobufSchemaProvider::from_file_descriptor_set(fds)
        .unwrap()
        .with_presence_policy(PresencePolicy::AllOptional);

    assert_eq!(provider.presence_policy(), PresencePolicy::AllOptional);
    let schema = provider.root_type("Direct").unwrap();
    assert_eq!(
        primitive(&schema, "x"),
        (PrimitiveType::Boolean, FieldQualifier::ZeroOrOne)
    );
}
