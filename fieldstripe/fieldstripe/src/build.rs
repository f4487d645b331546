//! Depth-first construction of encoder and decoder trees from a schema.
//!
//! Children are built before their parent node, and every leaf asks the
//! stripe factory for its own channel. The first factory failure aborts the
//! build; everything built so far is dropped.

use fieldstripe_core::{CompositeType, FieldType, StripeReaderFactory, StripeWriterFactory};

use crate::{
    decode::{FieldDecoder, LeafDecoder, NodeDecoder, RootDecoder},
    encode::{FieldEncoder, LeafEncoder, NodeEncoder, RootEncoder},
    error::ShredError,
};

/// Build an encoder tree for records of `root`, with one stripe writer per leaf.
pub fn build_encoder(
    root: &CompositeType,
    factory: &mut dyn StripeWriterFactory,
) -> Result<RootEncoder, ShredError> {
    let children = build_field_encoders(root, factory)?;
    tracing::debug!(root = root.name(), "built encoder tree");
    Ok(RootEncoder::new(children))
}

fn build_field_encoders(
    composite: &CompositeType,
    factory: &mut dyn StripeWriterFactory,
) -> Result<Vec<FieldEncoder>, ShredError> {
    let mut encoders = Vec::with_capacity(composite.fields().len());
    for field in composite.fields() {
        let encoder = match field.field_type() {
            FieldType::Composite(child) => {
                let children = build_field_encoders(child, factory)?;
                tracing::debug!(field = %field.path(), depth = %field.depth(), "node encoder");
                FieldEncoder::Node(NodeEncoder::new(field.clone(), children)?)
            }
            FieldType::Primitive(_) => {
                let stripe =
                    factory
                        .create_writer(field)
                        .map_err(|source| ShredError::OpenStripe {
                            field: field.path().to_string(),
                            source,
                        })?;
                tracing::debug!(field = %field.path(), depth = %field.depth(), "leaf encoder");
                FieldEncoder::Leaf(LeafEncoder::new(field.clone(), stripe)?)
            }
        };
        encoders.push(encoder);
    }
    Ok(encoders)
}

/// Build a decoder tree for records of `root`, with one stripe reader per leaf.
pub fn build_decoder(
    root: &CompositeType,
    factory: &mut dyn StripeReaderFactory,
) -> Result<RootDecoder, ShredError> {
    let children = build_field_decoders(root, factory)?;
    tracing::debug!(root = root.name(), "built decoder tree");
    Ok(RootDecoder::new(children))
}

fn build_field_decoders(
    composite: &CompositeType,
    factory: &mut dyn StripeReaderFactory,
) -> Result<Vec<FieldDecoder>, ShredError> {
    let mut decoders = Vec::with_capacity(composite.fields().len());
    for field in composite.fields() {
        let decoder = match field.field_type() {
            FieldType::Composite(child) => {
                let children = build_field_decoders(child, factory)?;
                tracing::debug!(field = %field.path(), depth = %field.depth(), "node decoder");
                FieldDecoder::Node(NodeDecoder::new(field.clone(), children)?)
            }
            FieldType::Primitive(_) => {
                let stripe =
                    factory
                        .open_reader(field)
                        .map_err(|source| ShredError::OpenStripe {
                            field: field.path().to_string(),
                            source,
                        })?;
                tracing::debug!(field = %field.path(), depth = %field.depth(), "leaf decoder");
                FieldDecoder::Leaf(LeafDecoder::new(field.clone(), stripe)?)
            }
        };
        decoders.push(decoder);
    }
    Ok(decoders)
}
