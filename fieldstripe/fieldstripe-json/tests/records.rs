use fieldstripe::{ErrorKind, ShredError, build_decoder, build_encoder};
use fieldstripe_core::{
    CompositeDef, CompositeType, FieldDef, FieldQualifier, MemoryStripeStore, PrimitiveType,
    RecordError, Value,
};
use fieldstripe_json::{JsonRecordSink, JsonRecords, json_record_source, value_to_json};

/// `{name: string, dept*: {title: string, ids*: int}, age?: byte, ratio?: float}`
fn schema() -> CompositeType {
    CompositeType::resolve(&CompositeDef::new(
        "Person",
        vec![
            FieldDef::primitive(1, "name", FieldQualifier::One, PrimitiveType::String),
            FieldDef::composite(
                2,
                "dept",
                FieldQualifier::ZeroOrMore,
                CompositeDef::new(
                    "Dept",
                    vec![
                        FieldDef::primitive(1, "title", FieldQualifier::One, PrimitiveType::String),
                        FieldDef::primitive(2, "ids", FieldQualifier::ZeroOrMore, PrimitiveType::Int),
                    ],
                ),
            ),
            FieldDef::primitive(3, "age", FieldQualifier::ZeroOrOne, PrimitiveType::Byte),
            FieldDef::primitive(4, "ratio", FieldQualifier::ZeroOrOne, PrimitiveType::Float),
        ],
    ))
    .unwrap()
}

fn parse(input: &str) -> Vec<Result<Value, RecordError>> {
    JsonRecords::new(input.as_bytes(), &schema()).collect()
}

#[test]
fn positional_arrays_become_struct_records() {
    let records = parse(
        r#"["alice", [["eng", [1, 2]], ["ops", []]], 30, 0.5]
           ["bob", null, null, null]"#,
    );

    assert_eq!(records.len(), 2);
    assert_eq!(
        records[0].as_ref().unwrap(),
        &Value::Struct(vec![
            Value::string("alice"),
            Value::List(vec![
                Value::Struct(vec![
                    Value::string("eng"),
                    Value::List(vec![Value::Int(1), Value::Int(2)]),
                ]),
                Value::Struct(vec![Value::string("ops"), Value::List(vec![])]),
            ]),
            Value::Byte(30),
            Value::Float(0.5),
        ])
    );
    assert_eq!(
        records[1].as_ref().unwrap(),
        &Value::Struct(vec![
            Value::string("bob"),
            Value::Null,
            Value::Null,
            Value::Null,
        ])
    );
}

#[test]
fn shape_errors_name_the_field() {
    let cases = [
        (r#"{"name": "x"}"#, "expected an array for 'Person'"),
        (r#"["x", [], null]"#, "has 4 fields, array has 3"),
        (r#"["x", 5, null, null]"#, "expected an array for 'dept'"),
        (r#"["x", [["t", ["1"]]], null, null]"#, "'dept.ids' expects int"),
        (r#"["x", [], 300, null]"#, "'age' expects byte, found number 300"),
        (r#"["x", [], 1.5, null]"#, "'age' expects byte"),
        (r#"[7, [], null, null]"#, "'name' expects string"),
        (r#"["x", [], null, 1e300]"#, "'ratio' expects float, found number 1e300"),
        (r#"["x", [], null, -3.5e38]"#, "'ratio' expects float"),
    ];
    for (input, fragment) in cases {
        let records = parse(input);
        assert_eq!(records.len(), 1, "{input}");
        match &records[0] {
            Err(RecordError::Malformed { detail }) => {
                assert!(detail.contains(fragment), "{detail:?} lacks {fragment:?}");
                assert!(detail.starts_with("record 0: "), "{detail:?}");
            }
            other => panic!("{input}: unexpected {other:?}"),
        }
    }
}

#[test]
fn invalid_json_is_malformed() {
    let records = parse(r#"["x", [], null, null] [oops"#);
    assert!(records[0].is_ok());
    assert!(matches!(records[1], Err(RecordError::Malformed { .. })));
}

#[test]
fn null_element_is_rejected_by_the_encoder() {
    let schema = schema();
    let input = r#"["x", [["t", [1, null]]], null, null]"#;
    let mut store = MemoryStripeStore::new();
    let mut encoder = build_encoder(&schema, &mut store).unwrap();

    let err = encoder
        .encode_all(&mut json_record_source(input.as_bytes(), &schema))
        .unwrap_err();
    assert!(matches!(&err, ShredError::NullElement { field } if field == "dept.ids"));
    assert_eq!(err.kind(), ErrorKind::InvalidData);
}

#[test]
fn encode_then_decode_reproduces_json_lines() {
    let schema = schema();
    let input = r#"
        ["alice", [["eng", [1, 2]], ["ops", []]], 30, 0.5]
        ["bob", [], null, null]
        ["carol", [["x", [-2147483648]]], -128, -1.25]
    "#;

    let mut store = MemoryStripeStore::new();
    let mut encoder = build_encoder(&schema, &mut store).unwrap();
    let count = encoder
        .encode_all(&mut json_record_source(input.as_bytes(), &schema))
        .unwrap();
    encoder.finish().unwrap();
    assert_eq!(count, 3);

    let mut decoder = build_decoder(&schema, &mut store).unwrap();
    let mut sink = JsonRecordSink::new(Vec::new(), &schema);
    decoder.decode_all(&mut sink).unwrap();
    assert_eq!(sink.records_written(), 3);

    let output = String::from_utf8(sink.finish().unwrap()).unwrap();
    assert_eq!(
        output,
        concat!(
            "[\"alice\",[[\"eng\",[1,2]],[\"ops\",[]]],30,0.5]\n",
            "[\"bob\",[],null,null]\n",
            "[\"carol\",[[\"x\",[-2147483648]]],-128,-1.25]\n",
        )
    );
}

#[test]
fn non_finite_floats_cannot_be_written() {
    let err = value_to_json(&Value::Double(f64::NAN)).unwrap_err();
    assert!(matches!(err, RecordError::Malformed { .. }));
    assert_eq!(
        value_to_json(&Value::List(vec![Value::Short(-1), Value::Boolean(true)])).unwrap(),
        serde_json::json!([-1, true])
    );
}

#[test]
fn floats_keep_their_range_and_precision() {
    let records = parse(r#"["x", [], null, 3.4e38] ["y", [], null, 0.1]"#);
    assert_eq!(
        records[0].as_ref().unwrap(),
        &Value::Struct(vec![
            Value::string("x"),
            Value::Null,
            Value::Null,
            Value::Float(3.4e38_f64 as f32),
        ])
    );

    // Written back at f32 precision.
    let json = value_to_json(records[1].as_ref().unwrap()).unwrap();
    assert_eq!(json.to_string(), r#"["y",null,null,0.1]"#);
}
