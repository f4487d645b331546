//! Row-oriented record access contract.
//!
//! The encoder tree pulls from a [`RecordSource`]; the decoder tree pushes
//! into a [`RecordSink`]. Both are driven strictly in schema field order.

use crate::{error::RecordError, schema::Field, value::Value};

/// Pull side of the record contract.
///
/// Typed reads return `Ok(None)` for an absent value. Inside an array entered
/// with [`start_array`](RecordSource::start_array), each typed read or
/// [`start_structure`](RecordSource::start_structure) consumes the next element.
///
/// When the encoder rejects a null element in a repeated field it still closes
/// the open structure and array. Any other failure abandons the record
/// with its frames still open; the source is not reused after that.
pub trait RecordSource {
    fn has_more_records(&mut self) -> Result<bool, RecordError>;

    fn start_record(&mut self) -> Result<(), RecordError>;

    fn end_record(&mut self) -> Result<(), RecordError>;

    fn read_byte(&mut self, field: &Field) -> Result<Option<i8>, RecordError>;

    fn read_short(&mut self, field: &Field) -> Result<Option<i16>, RecordError>;

    fn read_int(&mut self, field: &Field) -> Result<Option<i32>, RecordError>;

    fn read_long(&mut self, field: &Field) -> Result<Option<i64>, RecordError>;

    fn read_float(&mut self, field: &Field) -> Result<Option<f32>, RecordError>;

    fn read_double(&mut self, field: &Field) -> Result<Option<f64>, RecordError>;

    fn read_boolean(&mut self, field: &Field) -> Result<Option<bool>, RecordError>;

    fn read_string(&mut self, field: &Field) -> Result<Option<String>, RecordError>;

    /// Enter a repeated field. Returns whether the array is present.
    /// [`end_array`](RecordSource::end_array) must follow even when it is not.
    fn start_array(&mut self, field: &Field) -> Result<bool, RecordError>;

    fn has_more_elements(&mut self) -> Result<bool, RecordError>;

    fn end_array(&mut self) -> Result<(), RecordError>;

    /// Enter a composite field. Returns whether the structure is present.
    /// [`end_structure`](RecordSource::end_structure) must follow even when it is not.
    fn start_structure(&mut self, field: &Field) -> Result<bool, RecordError>;

    fn end_structure(&mut self) -> Result<(), RecordError>;
}

/// Push side of the record contract.
///
/// Inside an array, [`write_field`](RecordSink::write_field) and
/// [`start_structure`](RecordSink::start_structure) append a new element.
pub trait RecordSink {
    fn start_record(&mut self) -> Result<(), RecordError>;

    fn end_record(&mut self) -> Result<(), RecordError>;

    fn write_field(&mut self, field: &Field, value: Value) -> Result<(), RecordError>;

    fn write_unset_field(&mut self, field: &Field) -> Result<(), RecordError>;

    fn start_array(&mut self, field: &Field) -> Result<(), RecordError>;

    fn end_array(&mut self) -> Result<(), RecordError>;

    fn start_structure(&mut self, field: &Field) -> Result<(), RecordError>;

    fn end_structure(&mut self) -> Result<(), RecordError>;
}
