//! [`RecordSource`] / [`RecordSink`] implementations over [`Value`] trees.

use std::{collections::VecDeque, iter::Peekable, mem};

use crate::{
    error::{RecordError, ValueTypeError},
    record::{RecordSink, RecordSource},
    schema::{CompositeType, Field},
    value::Value,
};

enum SourceFrame {
    Struct(Vec<Value>),
    Array(VecDeque<Value>),
    /// An absent structure that was entered and must still be exited.
    Absent,
}

/// Pulls records from an iterator of `Value::Struct` records.
pub struct ValueRecordSource<I>
where
    I: Iterator<Item = Result<Value, RecordError>>,
{
    records: Peekable<I>,
    root_width: usize,
    frames: Vec<SourceFrame>,
}

impl ValueRecordSource<std::vec::IntoIter<Result<Value, RecordError>>> {
    pub fn from_values(records: Vec<Value>, root: &CompositeType) -> Self {
        Self::new(
            records.into_iter().map(Ok).collect::<Vec<_>>().into_iter(),
            root,
        )
    }
}

impl<I> ValueRecordSource<I>
where
    I: Iterator<Item = Result<Value, RecordError>>,
{
    /// Records must be `Value::Struct`s of `root`, one value per field.
    pub fn new(records: I, root: &CompositeType) -> Self {
        Self {
            records: records.peekable(),
            root_width: root.fields().len(),
            frames: Vec::new(),
        }
    }

    /// Take the value of `field` from the innermost open frame.
    fn take(&mut self, field: &Field) -> Result<Value, RecordError> {
        match self.frames.last_mut() {
            Some(SourceFrame::Struct(values)) => Ok(values
                .get_mut(field.position())
                .map(mem::take)
                .unwrap_or(Value::Null)),
            Some(SourceFrame::Array(items)) => items.pop_front().ok_or_else(|| {
                RecordError::protocol(format!("read past the last element of '{}'", field.path()))
            }),
            Some(SourceFrame::Absent) => Err(RecordError::protocol(format!(
                "read of '{}' inside an absent structure",
                field.path()
            ))),
            None => Err(RecordError::protocol(format!(
                "read of '{}' outside of a record",
                field.path()
            ))),
        }
    }

    fn read<T>(
        &mut self,
        field: &Field,
        convert: impl FnOnce(&Value) -> Result<Option<T>, ValueTypeError>,
    ) -> Result<Option<T>, RecordError> {
        let value = self.take(field)?;
        convert(&value).map_err(|source| mismatch(field, source))
    }
}

const RECORD: &str = "<record>";

/// A struct value must carry exactly one value per field of its composite.
fn check_width(field: &str, width: usize, values: &[Value]) -> Result<(), RecordError> {
    if values.len() == width {
        return Ok(());
    }
    Err(RecordError::TypeMismatch {
        field: field.to_string(),
        source: ValueTypeError::new(
            format!("Struct of {width} fields"),
            format!("Struct of {} values", values.len()),
        ),
    })
}

fn mismatch(field: &Field, source: ValueTypeError) -> RecordError {
    RecordError::TypeMismatch {
        field: field.path().to_string(),
        source,
    }
}

impl<I> RecordSource for ValueRecordSource<I>
where
    I: Iterator<Item = Result<Value, RecordError>>,
{
    fn has_more_records(&mut self) -> Result<bool, RecordError> {
        Ok(self.records.peek().is_some())
    }

    fn start_record(&mut self) -> Result<(), RecordError> {
        if !self.frames.is_empty() {
            return Err(RecordError::protocol("record started inside another record"));
        }
        match self.records.next() {
            Some(Ok(Value::Struct(values))) => {
                check_width(RECORD, self.root_width, &values)?;
                self.frames.push(SourceFrame::Struct(values));
                Ok(())
            }
            Some(Ok(other)) => Err(RecordError::TypeMismatch {
                field: RECORD.to_string(),
                source: other.type_mismatch("Struct"),
            }),
            Some(Err(e)) => Err(e),
            None => Err(RecordError::protocol("no more records")),
        }
    }

    fn end_record(&mut self) -> Result<(), RecordError> {
        match (self.frames.pop(), self.frames.is_empty()) {
            (Some(SourceFrame::Struct(_)), true) => Ok(()),
            _ => Err(RecordError::protocol("record ended with open structures")),
        }
    }

    fn read_byte(&mut self, field: &Field) -> Result<Option<i8>, RecordError> {
        self.read(field, Value::try_i8)
    }

    fn read_short(&mut self, field: &Field) -> Result<Option<i16>, RecordError> {
        self.read(field, Value::try_i16)
    }

    fn read_int(&mut self, field: &Field) -> Result<Option<i32>, RecordError> {
        self.read(field, Value::try_i32)
    }

    fn read_long(&mut self, field: &Field) -> Result<Option<i64>, RecordError> {
        self.read(field, Value::try_i64)
    }

    fn read_float(&mut self, field: &Field) -> Result<Option<f32>, RecordError> {
        self.read(field, Value::try_f32)
    }

    fn read_double(&mut self, field: &Field) -> Result<Option<f64>, RecordError> {
        self.read(field, Value::try_f64)
    }

    fn read_boolean(&mut self, field: &Field) -> Result<Option<bool>, RecordError> {
        self.read(field, Value::try_bool)
    }

    fn read_string(&mut self, field: &Field) -> Result<Option<String>, RecordError> {
        self.read(field, |v| Ok(v.try_str()?.map(str::to_string)))
    }

    fn start_array(&mut self, field: &Field) -> Result<bool, RecordError> {
        match self.take(field)? {
            Value::List(items) => {
                self.frames.push(SourceFrame::Array(items.into()));
                Ok(true)
            }
            Value::Null => {
                self.frames.push(SourceFrame::Array(VecDeque::new()));
                Ok(false)
            }
            other => Err(mismatch(field, other.type_mismatch("List"))),
        }
    }

    fn has_more_elements(&mut self) -> Result<bool, RecordError> {
        match self.frames.last() {
            Some(SourceFrame::Array(items)) => Ok(!items.is_empty()),
            _ => Err(RecordError::protocol("element check outside of an array")),
        }
    }

    fn end_array(&mut self) -> Result<(), RecordError> {
        match self.frames.pop() {
            Some(SourceFrame::Array(_)) => Ok(()),
            _ => Err(RecordError::protocol("array ended without being started")),
        }
    }

    fn start_structure(&mut self, field: &Field) -> Result<bool, RecordError> {
        match self.take(field)? {
            Value::Struct(values) => {
                let width = field
                    .field_type()
                    .as_composite()
                    .map(|c| c.fields().len())
                    .ok_or_else(|| {
                        RecordError::protocol(format!(
                            "'{}' is not a composite field",
                            field.path()
                        ))
                    })?;
                check_width(&field.path().to_string(), width, &values)?;
                self.frames.push(SourceFrame::Struct(values));
                Ok(true)
            }
            Value::Null => {
                self.frames.push(SourceFrame::Absent);
                Ok(false)
            }
            other => Err(mismatch(field, other.type_mismatch("Struct"))),
        }
    }

    fn end_structure(&mut self) -> Result<(), RecordError> {
        match self.frames.pop() {
            Some(SourceFrame::Struct(_) | SourceFrame::Absent) if !self.frames.is_empty() => Ok(()),
            _ => Err(RecordError::protocol("structure ended without being started")),
        }
    }
}

enum SinkFrame {
    /// `position` is `None` for the record root.
    Struct {
        position: Option<usize>,
        values: Vec<Value>,
    },
    Array {
        position: usize,
        items: Vec<Value>,
    },
}

/// Rebuilds `Value::Struct` records pushed by a decoder.
pub struct ValueRecordSink {
    root_width: usize,
    frames: Vec<SinkFrame>,
    records: Vec<Value>,
}

impl ValueRecordSink {
    pub fn new(root: &CompositeType) -> Self {
        Self {
            root_width: root.fields().len(),
            frames: Vec::new(),
            records: Vec::new(),
        }
    }

    /// Completed records, oldest first. Leaves the sink empty.
    pub fn take_records(&mut self) -> Vec<Value> {
        mem::take(&mut self.records)
    }

    fn place(&mut self, position: usize, value: Value) -> Result<(), RecordError> {
        match self.frames.last_mut() {
            Some(SinkFrame::Struct { values, .. }) => {
                let slot = values.get_mut(position).ok_or_else(|| {
                    RecordError::protocol(format!("field position {position} out of range"))
                })?;
                *slot = value;
                Ok(())
            }
            Some(SinkFrame::Array { items, .. }) => {
                items.push(value);
                Ok(())
            }
            None => Err(RecordError::protocol("write outside of a record")),
        }
    }
}

impl RecordSink for ValueRecordSink {
    fn start_record(&mut self) -> Result<(), RecordError> {
        if !self.frames.is_empty() {
            return Err(RecordError::protocol("record started inside another record"));
        }
        self.frames.push(SinkFrame::Struct {
            position: None,
            values: vec![Value::Null; self.root_width],
        });
        Ok(())
    }

    fn end_record(&mut self) -> Result<(), RecordError> {
        match self.frames.pop() {
            Some(SinkFrame::Struct {
                position: None,
                values,
            }) if self.frames.is_empty() => {
                self.records.push(Value::Struct(values));
                Ok(())
            }
            _ => Err(RecordError::protocol("record ended with open structures")),
        }
    }

    fn write_field(&mut self, field: &Field, value: Value) -> Result<(), RecordError> {
        self.place(field.position(), value)
    }

    fn write_unset_field(&mut self, field: &Field) -> Result<(), RecordError> {
        self.place(field.position(), Value::Null)
    }

    fn start_array(&mut self, field: &Field) -> Result<(), RecordError> {
        if matches!(self.frames.last(), Some(SinkFrame::Array { .. }) | None) {
            return Err(RecordError::protocol(format!(
                "array '{}' must be started inside a structure",
                field.path()
            )));
        }
        self.frames.push(SinkFrame::Array {
            position: field.position(),
            items: Vec::new(),
        });
        Ok(())
    }

    fn end_array(&mut self) -> Result<(), RecordError> {
        match self.frames.pop() {
            Some(SinkFrame::Array { position, items }) => self.place(position, Value::List(items)),
            _ => Err(RecordError::protocol("array ended without being started")),
        }
    }

    fn start_structure(&mut self, field: &Field) -> Result<(), RecordError> {
        let width = field
            .field_type()
            .as_composite()
            .map(|c| c.fields().len())
            .ok_or_else(|| {
                RecordError::protocol(format!("'{}' is not a composite field", field.path()))
            })?;
        if self.frames.is_empty() {
            return Err(RecordError::protocol("write outside of a record"));
        }
        self.frames.push(SinkFrame::Struct {
            position: Some(field.position()),
            values: vec![Value::Null; width],
        });
        Ok(())
    }

    fn end_structure(&mut self) -> Result<(), RecordError> {
        match self.frames.pop() {
            Some(SinkFrame::Struct {
                position: Some(position),
                values,
            }) => self.place(position, Value::Struct(values)),
            _ => Err(RecordError::protocol("structure ended without being started")),
        }
    }
}
