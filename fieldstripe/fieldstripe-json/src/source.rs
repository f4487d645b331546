//! JSON text to [`Value`] records.

use std::io::Read;

use fieldstripe_core::{
    CompositeType, Field, FieldType, PrimitiveType, RecordError, Value, ValueRecordSource,
};
use serde_json::{Deserializer, StreamDeserializer, de::IoRead};

/// [`RecordSource`](fieldstripe_core::RecordSource) over a stream of positional JSON records.
pub type JsonRecordSource<R> = ValueRecordSource<JsonRecords<R>>;

/// Pull records of `root` from whitespace-separated JSON arrays in `reader`.
pub fn json_record_source<R: Read>(reader: R, root: &CompositeType) -> JsonRecordSource<R> {
    ValueRecordSource::new(JsonRecords::new(reader, root), root)
}

/// Iterator converting each JSON value of a stream into a `Value::Struct` record.
pub struct JsonRecords<R: Read> {
    stream: StreamDeserializer<'static, IoRead<R>, serde_json::Value>,
    root: CompositeType,
    record: u64,
}

impl<R: Read> JsonRecords<R> {
    pub fn new(reader: R, root: &CompositeType) -> Self {
        Self {
            stream: Deserializer::from_reader(reader).into_iter(),
            root: root.clone(),
            record: 0,
        }
    }
}

impl<R: Read> Iterator for JsonRecords<R> {
    type Item = Result<Value, RecordError>;

    fn next(&mut self) -> Option<Self::Item> {
        let json = match self.stream.next()? {
            Ok(json) => json,
            Err(e) if e.is_io() => return Some(Err(RecordError::Io(e.into()))),
            Err(e) => {
                return Some(Err(RecordError::malformed(format!(
                    "record {}: {e}",
                    self.record
                ))));
            }
        };
        let record = self.record;
        self.record += 1;
        Some(
            composite_to_value(&self.root, json)
                .map_err(|detail| RecordError::malformed(format!("record {record}: {detail}"))),
        )
    }
}

fn composite_to_value(composite: &CompositeType, json: serde_json::Value) -> Result<Value, String> {
    let items = match json {
        serde_json::Value::Array(items) => items,
        other => {
            return Err(format!(
                "expected an array for '{}', found {}",
                composite.name(),
                json_kind(&other)
            ));
        }
    };
    if items.len() != composite.fields().len() {
        return Err(format!(
            "'{}' has {} fields, array has {} elements",
            composite.name(),
            composite.fields().len(),
            items.len()
        ));
    }
    composite
        .fields()
        .iter()
        .zip(items)
        .map(|(field, item)| field_to_value(field, item))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Struct)
}

fn field_to_value(field: &Field, json: serde_json::Value) -> Result<Value, String> {
    match json {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Array(items) if field.is_multi_valued() => items
            .into_iter()
            .map(|item| element_to_value(field, item))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::List),
        other if field.is_multi_valued() => Err(format!(
            "expected an array for '{}', found {}",
            field.path(),
            json_kind(&other)
        )),
        other => element_to_value(field, other),
    }
}

/// Single value of `field`; for repeated fields, one element.
fn element_to_value(field: &Field, json: serde_json::Value) -> Result<Value, String> {
    if json.is_null() {
        return Ok(Value::Null);
    }
    match field.field_type() {
        FieldType::Composite(child) => composite_to_value(child, json),
        FieldType::Primitive(p) => primitive_to_value(*p, &json).ok_or_else(|| {
            format!(
                "'{}' expects {p}, found {}",
                field.path(),
                json_kind_detail(&json)
            )
        }),
    }
}

fn primitive_to_value(p: PrimitiveType, json: &serde_json::Value) -> Option<Value> {
    let value = match p {
        PrimitiveType::Byte => Value::Byte(i8::try_from(json.as_i64()?).ok()?),
        PrimitiveType::Short => Value::Short(i16::try_from(json.as_i64()?).ok()?),
        PrimitiveType::Int => Value::Int(i32::try_from(json.as_i64()?).ok()?),
        PrimitiveType::Long => Value::Long(json.as_i64()?),
        PrimitiveType::Float => {
            let wide = json.as_f64()?;
            let narrow = wide as f32;
            if !narrow.is_finite() && wide.is_finite() {
                return None;
            }
            Value::Float(narrow)
        }
        PrimitiveType::Double => Value::Double(json.as_f64()?),
        PrimitiveType::Boolean => Value::Boolean(json.as_bool()?),
        PrimitiveType::String => Value::string(json.as_str()?),
    };
    Some(value)
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

fn json_kind_detail(json: &serde_json::Value) -> String {
    match json {
        serde_json::Value::Number(n) => format!("number {n}"),
        other => json_kind(other).to_string(),
    }
}
