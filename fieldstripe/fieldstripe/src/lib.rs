//! Field-striped storage of nested records.
//!
//! Every leaf field of a schema is written to its own stripe. Nesting and
//! repetition are not kept in a side index; instead the encoder tree
//! interleaves compact structural markers into each stripe, and the decoder
//! tree consumes them to rebuild the original records exactly.
//!
//! # Typical Flow
//! ```rust
//! use fieldstripe::{build_decoder, build_encoder};
//! use fieldstripe::core::{
//!     CompositeDef, CompositeType, FieldDef, FieldQualifier, MemoryStripeStore, PrimitiveType,
//!     Value, ValueRecordSink, ValueRecordSource,
//! };
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let schema = CompositeType::resolve(&CompositeDef::new(
//!     "Doc",
//!     vec![FieldDef::primitive(1, "id", FieldQualifier::One, PrimitiveType::Long)],
//! ))?;
//! let records = vec![Value::Struct(vec![Value::Long(7)])];
//!
//! let mut store = MemoryStripeStore::new();
//! let mut encoder = build_encoder(&schema, &mut store)?;
//! encoder.encode_all(&mut ValueRecordSource::from_values(records.clone(), &schema))?;
//! encoder.finish()?;
//!
//! let mut sink = ValueRecordSink::new(&schema);
//! build_decoder(&schema, &mut store)?.decode_all(&mut sink)?;
//! assert_eq!(sink.take_records(), records);
//! # Ok(())
//! # }
//! ```

mod build;
mod decode;
mod encode;
mod error;

pub use build::{build_decoder, build_encoder};
pub use decode::{FieldDecoder, LeafDecoder, NodeDecoder, RootDecoder};
pub use encode::{FieldEncoder, LeafEncoder, NodeEncoder, RootEncoder};
pub use error::{ErrorKind, ShredError};
pub use fieldstripe_core as core;
