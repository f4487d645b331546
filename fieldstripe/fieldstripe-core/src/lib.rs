//! Storage- and format-agnostic core types for `fieldstripe`.
//!
//! This crate provides the schema model ([`CompositeType`] / [`Field`] /
//! [`Path`]), the record [`Value`] tree, and the two channel contracts the
//! encoder and decoder trees are written against:
//!
//! - [`StripeWriter`] / [`StripeReader`]: the per-leaf token stream.
//! - [`RecordSource`] / [`RecordSink`]: the row-oriented record side.
//!
//! In-memory implementations of both contracts ([`MemoryStripeStore`],
//! [`ValueRecordSource`], [`ValueRecordSink`]) live here as well; concrete
//! file formats build on top of them in sibling crates.

mod error;
mod memory;
mod record;
mod records;
mod schema;
mod stripe;
mod value;

pub use error::{RecordError, SchemaError, StripeError, ValueTypeError};
pub use memory::{MemoryStripeReader, MemoryStripeStore, MemoryStripeWriter};
pub use record::{RecordSink, RecordSource};
pub use records::{ValueRecordSink, ValueRecordSource};
pub use schema::{
    CompositeDef, CompositeType, Depth, Field, FieldDef, FieldQualifier, FieldType, Path,
    PathSegment, PrimitiveType, SchemaProvider, TypeDef, format_schema,
};
pub use stripe::{Marker, StripeReader, StripeReaderFactory, StripeWriter, StripeWriterFactory, Token};
pub use value::Value;
