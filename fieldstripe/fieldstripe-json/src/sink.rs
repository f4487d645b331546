//! [`Value`] records to JSON lines.

use std::io::Write;

use fieldstripe_core::{CompositeType, Field, RecordError, RecordSink, Value, ValueRecordSink};
use serde_json::Number;

/// Writes every completed record as one positional JSON array per line.
pub struct JsonRecordSink<W: Write> {
    records: ValueRecordSink,
    out: W,
    written: u64,
}

impl<W: Write> JsonRecordSink<W> {
    pub fn new(out: W, root: &CompositeType) -> Self {
        Self {
            records: ValueRecordSink::new(root),
            out,
            written: 0,
        }
    }

    pub fn records_written(&self) -> u64 {
        self.written
    }

    /// Flush and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W, RecordError> {
        self.out.flush()?;
        Ok(self.out)
    }
}

impl<W: Write> RecordSink for JsonRecordSink<W> {
    fn start_record(&mut self) -> Result<(), RecordError> {
        self.records.start_record()
    }

    fn end_record(&mut self) -> Result<(), RecordError> {
        self.records.end_record()?;
        for record in self.records.take_records() {
            let json = value_to_json(&record)?;
            serde_json::to_writer(&mut self.out, &json).map_err(std::io::Error::from)?;
            self.out.write_all(b"\n")?;
            self.written += 1;
        }
        Ok(())
    }

    fn write_field(&mut self, field: &Field, value: Value) -> Result<(), RecordError> {
        self.records.write_field(field, value)
    }

    fn write_unset_field(&mut self, field: &Field) -> Result<(), RecordError> {
        self.records.write_unset_field(field)
    }

    fn start_array(&mut self, field: &Field) -> Result<(), RecordError> {
        self.records.start_array(field)
    }

    fn end_array(&mut self) -> Result<(), RecordError> {
        self.records.end_array()
    }

    fn start_structure(&mut self, field: &Field) -> Result<(), RecordError> {
        self.records.start_structure(field)
    }

    fn end_structure(&mut self) -> Result<(), RecordError> {
        self.records.end_structure()
    }
}

/// Convert a decoded record into its positional JSON form.
pub fn value_to_json(value: &Value) -> Result<serde_json::Value, RecordError> {
    let json = match value {
        Value::Null => serde_json::Value::Null,
        Value::Byte(v) => (*v).into(),
        Value::Short(v) => (*v).into(),
        Value::Int(v) => (*v).into(),
        Value::Long(v) => (*v).into(),
        // Shortest f32 decimal, so 0.1f32 is written as 0.1.
        Value::Float(v) => float(v.to_string().parse().unwrap_or_else(|_| f64::from(*v)))?,
        Value::Double(v) => float(*v)?,
        Value::Boolean(v) => (*v).into(),
        Value::String(v) => serde_json::Value::String(v.to_string()),
        Value::Struct(items) | Value::List(items) => serde_json::Value::Array(
            items
                .iter()
                .map(value_to_json)
                .collect::<Result<Vec<_>, _>>()?,
        ),
    };
    Ok(json)
}

fn float(v: f64) -> Result<serde_json::Value, RecordError> {
    Number::from_f64(v)
        .map(serde_json::Value::Number)
        .ok_or_else(|| RecordError::malformed(format!("{v} has no JSON representation")))
}
