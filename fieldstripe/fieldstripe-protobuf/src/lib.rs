//! Protobuf [`SchemaProvider`](fieldstripe_core::SchemaProvider) for fieldstripe.
//!
//! This crate provides [`ProtobufSchemaProvider`], which resolves a message
//! of a serialized `FileDescriptorSet` into the [`CompositeType`] consumed by
//! the encoder and decoder builders. Field numbers become field indexes;
//! labels and presence become qualifiers according to a [`PresencePolicy`].
//!
//! Type mapping:
//! - `double`, `float`, `bool`, `string` map to their namesakes.
//! - `int32`, `sint32`, `sfixed32` and enums map to `int`.
//! - `int64`, `sint64`, `sfixed64`, `uint32` and `fixed32` map to `long`.
//! - messages are composite fields; maps are repeated `{key, value}` entries.
//! - `uint64`, `fixed64` and `bytes` are rejected as unsupported.
//!
//! [`CompositeType`]: fieldstripe_core::CompositeType

mod policy;
mod schema;

pub use policy::PresencePolicy;
pub use schema::{
    ProtobufSchemaProvider, protobuf_descriptor_to_schema,
    protobuf_descriptor_to_schema_with_policy,
};
