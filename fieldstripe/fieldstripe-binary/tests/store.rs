use std::fs;

use fieldstripe::{ErrorKind, ShredError, build_decoder, build_encoder};
use fieldstripe_binary::DirectoryStripeStore;
use fieldstripe_core::{
    CompositeDef, CompositeType, Depth, FieldDef, FieldQualifier, Marker, PrimitiveType,
    StripeError, StripeReaderFactory, StripeWriterFactory, Token, Value, ValueRecordSink,
    ValueRecordSource,
};

type TestResult = Result<(), Box<dyn std::error::Error>>;

/// `{id: long, doc: repeated Doc{title: string, score?: double, tags*: string, flags*: boolean}, rank?: short}`
fn schema() -> CompositeType {
    CompositeType::resolve(&CompositeDef::new(
        "Index",
        vec![
            FieldDef::primitive(1, "id", FieldQualifier::One, PrimitiveType::Long),
            FieldDef::composite(
                2,
                "doc",
                FieldQualifier::ZeroOrMore,
                CompositeDef::new(
                    "Doc",
                    vec![
                        FieldDef::primitive(1, "title", FieldQualifier::One, PrimitiveType::String),
                        FieldDef::primitive(
                            2,
                            "score",
                            FieldQualifier::ZeroOrOne,
                            PrimitiveType::Double,
                        ),
                        FieldDef::primitive(
                            3,
                            "tags",
                            FieldQualifier::ZeroOrMore,
                            PrimitiveType::String,
                        ),
                        FieldDef::primitive(
                            4,
                            "flags",
                            FieldQualifier::ZeroOrMore,
                            PrimitiveType::Boolean,
                        ),
                    ],
                ),
            ),
            FieldDef::primitive(3, "rank", FieldQualifier::ZeroOrOne, PrimitiveType::Short),
            FieldDef::primitive(4, "weight", FieldQualifier::ZeroOrOne, PrimitiveType::Float),
            FieldDef::primitive(5, "kind", FieldQualifier::One, PrimitiveType::Byte),
            FieldDef::primitive(6, "count", FieldQualifier::One, PrimitiveType::Int),
        ],
    ))
    .unwrap()
}

fn doc(title: &str, score: Option<f64>, tags: &[&str], flags: &[bool]) -> Value {
    Value::Struct(vec![
        Value::string(title),
        score.map(Value::Double).unwrap_or(Value::Null),
        Value::List(tags.iter().map(Value::string).collect()),
        Value::List(flags.iter().copied().map(Value::Boolean).collect()),
    ])
}

fn records() -> Vec<Value> {
    vec![
        Value::Struct(vec![
            Value::Long(1),
            Value::List(vec![
                doc("a", Some(0.5), &["x", "y"], &[true]),
                doc("b", None, &[], &[]),
            ]),
            Value::Short(-3),
            Value::Float(1.25),
            Value::Byte(-1),
            Value::Int(i32::MAX),
        ]),
        Value::Struct(vec![
            Value::Long(-1 << 40),
            Value::List(vec![]),
            Value::Null,
            Value::Null,
            Value::Byte(0),
            Value::Int(i32::MIN),
        ]),
        Value::Struct(vec![
            Value::Long(0),
            Value::List(vec![doc("ünïcode", Some(-1e10), &["", "z"], &[false, true])]),
            Value::Short(i16::MIN),
            Value::Null,
            Value::Byte(127),
            Value::Int(0),
        ]),
    ]
}

fn encode_into(dir: &std::path::Path, schema: &CompositeType, records: Vec<Value>) -> TestResult {
    let mut store = DirectoryStripeStore::create(dir)?;
    let mut encoder = build_encoder(schema, &mut store)?;
    let count = encoder.encode_all(&mut ValueRecordSource::from_values(records, schema))?;
    assert_eq!(count, 3);
    encoder.finish()?;
    Ok(())
}

#[test]
fn encode_and_decode_through_files() -> TestResult {
    let dir = tempfile::tempdir()?;
    let schema = schema();
    encode_into(dir.path(), &schema, records())?;

    let mut store = DirectoryStripeStore::open(dir.path())?;
    assert_eq!(
        store.stripe_names()?,
        vec![
            "count",
            "doc.flags",
            "doc.score",
            "doc.tags",
            "doc.title",
            "id",
            "kind",
            "rank",
            "weight"
        ]
    );

    let mut decoder = build_decoder(&schema, &mut store)?;
    let mut sink = ValueRecordSink::new(&schema);
    assert_eq!(decoder.decode_all(&mut sink)?, 3);
    assert_eq!(sink.take_records(), records());
    Ok(())
}

#[test]
fn file_reader_yields_written_tokens() -> TestResult {
    let dir = tempfile::tempdir()?;
    let schema = schema();
    encode_into(dir.path(), &schema, records())?;

    let title = schema.field_by_path("doc.title").unwrap();
    let mut reader = DirectoryStripeStore::open(dir.path())?.open_reader(title)?;
    let depth = Depth::new(1).unwrap();

    assert_eq!(reader.peek()?, Some(Marker::Value));
    assert_eq!(reader.peek()?, Some(Marker::Value));
    let mut tokens = Vec::new();
    while let Some(token) = reader.read_token()? {
        tokens.push(token);
    }
    assert_eq!(
        tokens,
        vec![
            Token::Value(Value::string("a")),
            Token::RepeatedParent(depth),
            Token::Value(Value::string("b")),
            Token::UnsetParent(depth),
            Token::Value(Value::string("ünïcode")),
        ]
    );
    assert_eq!(reader.peek()?, None);
    Ok(())
}

#[test]
fn existing_stripe_is_not_overwritten() -> TestResult {
    let dir = tempfile::tempdir()?;
    let schema = schema();
    encode_into(dir.path(), &schema, records())?;

    let mut store = DirectoryStripeStore::create(dir.path())?;
    let err = build_encoder(&schema, &mut store).err().unwrap();
    assert!(matches!(
        err,
        ShredError::OpenStripe {
            source: StripeError::AlreadyExists { .. },
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::Resource);
    Ok(())
}

#[test]
fn missing_stripe_is_not_found() -> TestResult {
    let dir = tempfile::tempdir()?;
    let schema = schema();
    let mut store = DirectoryStripeStore::open(dir.path())?;

    let err = build_decoder(&schema, &mut store).err().unwrap();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(matches!(
        DirectoryStripeStore::open(dir.path().join("nope")),
        Err(StripeError::NotFound { .. })
    ));
    Ok(())
}

#[test]
fn stripe_of_another_type_is_malformed() -> TestResult {
    let dir = tempfile::tempdir()?;
    let schema = schema();
    encode_into(dir.path(), &schema, records())?;
    let store = DirectoryStripeStore::open(dir.path())?;

    let id = schema.field_by_path("id").unwrap();
    let rank = schema.field_by_path("rank").unwrap();
    fs::copy(store.stripe_path(rank), store.stripe_path(id))?;

    let err = store.clone().open_reader(id).err().unwrap();
    assert!(matches!(err, StripeError::Malformed { .. }));
    Ok(())
}

#[test]
fn truncated_stripe_is_malformed() -> TestResult {
    let dir = tempfile::tempdir()?;
    let schema = schema();
    encode_into(dir.path(), &schema, records())?;
    let store = DirectoryStripeStore::open(dir.path())?;

    let title = schema.field_by_path("doc.title").unwrap();
    let path = store.stripe_path(title);
    let mut bytes = fs::read(&path)?;
    bytes.truncate(bytes.len() - 1);
    fs::write(&path, bytes)?;

    let mut decoder = build_decoder(&schema, &mut store.clone())?;
    let err = decoder
        .decode_all(&mut ValueRecordSink::new(&schema))
        .unwrap_err();
    assert!(matches!(
        err,
        ShredError::Stripe {
            source: StripeError::Malformed { .. },
            ..
        }
    ));
    assert_eq!(err.kind(), ErrorKind::InvalidData);

    fs::write(&path, b"FST")?;
    let err = store.clone().open_reader(title).err().unwrap();
    assert!(matches!(err, StripeError::Malformed { .. }));
    Ok(())
}

#[test]
fn writer_rejects_value_of_wrong_type() -> TestResult {
    let dir = tempfile::tempdir()?;
    let schema = schema();
    let mut store = DirectoryStripeStore::create(dir.path())?;

    let id = schema.field_by_path("id").unwrap();
    let mut writer = store.create_writer(id)?;
    let err = writer.write_value(&Value::Int(1)).unwrap_err();
    assert!(matches!(err, StripeError::Malformed { .. }));

    writer.write_value(&Value::Long(1))?;
    writer.finish()?;
    let mut reader = store.open_reader(id)?;
    assert_eq!(reader.read_token()?, Some(Token::Value(Value::Long(1))));
    assert_eq!(reader.read_token()?, None);
    Ok(())
}
