//! JSON record adapters for fieldstripe.
//!
//! Records are positional: a record of a composite type is a JSON array with
//! one element per field, in field order. Nested structures are nested
//! arrays, repeated fields are arrays of their elements, and an absent value
//! is `null`.
//!
//! ```text
//! ["alice", [["eng", [1, 2]], ["ops", []]], null]
//! ```
//!
//! [`json_record_source`] reads a stream of such arrays (separated by any
//! whitespace) for the encoder; [`JsonRecordSink`] writes one array per line
//! for the decoder.

mod sink;
mod source;

pub use sink::{JsonRecordSink, value_to_json};
pub use source::{JsonRecordSource, JsonRecords, json_record_source};
