//! Schema model: qualifiers, primitive and composite types, fields and paths.
//!
//! Schemas are described with path-free definitions ([`CompositeDef`],
//! [`FieldDef`]) and then resolved once into an immutable tree
//! ([`CompositeType`]) in which every [`Field`] knows its [`Path`] from the
//! root.

mod def;
mod format;
mod path;
mod types;

pub use def::{CompositeDef, FieldDef, TypeDef};
pub use format::format_schema;
pub use path::{Depth, Path, PathSegment};
pub use types::{CompositeType, Field, FieldQualifier, FieldType, PrimitiveType};

use crate::error::SchemaError;

/// Source of root message types, consulted once at startup.
pub trait SchemaProvider {
    /// Resolve the fully-qualified `message_name` into a root [`CompositeType`].
    ///
    /// Returns [`SchemaError::NotFound`] when no such message exists and
    /// [`SchemaError::NotTopLevel`] when it exists but cannot be a record root.
    fn root_type(&self, message_name: &str) -> Result<CompositeType, SchemaError>;
}
