use std::{
    collections::HashSet,
    fmt::{Display, Formatter, Result as FmtResult},
    sync::Arc,
};

use super::{
    def::{CompositeDef, TypeDef},
    path::{Depth, Path, PathSegment},
};
use crate::error::SchemaError;

/// Cardinality of a field.
///
/// The ordinals are stable and may be persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FieldQualifier {
    /// Required, single-valued.
    One = 0,
    /// Optional, single-valued.
    ZeroOrOne = 1,
    /// Repeated, multi-valued.
    ZeroOrMore = 2,
}

impl FieldQualifier {
    pub fn is_multi_valued(self) -> bool {
        matches!(self, FieldQualifier::ZeroOrMore)
    }

    pub fn ordinal(self) -> u8 {
        self as u8
    }

    pub fn from_ordinal(ordinal: u8) -> Option<Self> {
        match ordinal {
            0 => Some(FieldQualifier::One),
            1 => Some(FieldQualifier::ZeroOrOne),
            2 => Some(FieldQualifier::ZeroOrMore),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldQualifier::One => "one",
            FieldQualifier::ZeroOrOne => "zero_or_one",
            FieldQualifier::ZeroOrMore => "zero_or_more",
        }
    }
}

/// Scalar leaf type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    Boolean,
    String,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
        PrimitiveType::Boolean,
        PrimitiveType::String,
    ];

    pub fn type_name(self) -> &'static str {
        match self {
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::String => "string",
        }
    }

    /// Stable one-byte tag, used by persisted stripe headers.
    pub fn tag(self) -> u8 {
        match self {
            PrimitiveType::Byte => 0,
            PrimitiveType::Short => 1,
            PrimitiveType::Int => 2,
            PrimitiveType::Long => 3,
            PrimitiveType::Float => 4,
            PrimitiveType::Double => 5,
            PrimitiveType::Boolean => 6,
            PrimitiveType::String => 7,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.tag() == tag)
    }
}

impl Display for PrimitiveType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.type_name())
    }
}

/// Type of a field: either a leaf or a nested composite.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Primitive(PrimitiveType),
    Composite(Arc<CompositeType>),
}

impl FieldType {
    pub fn is_primitive(&self) -> bool {
        matches!(self, FieldType::Primitive(_))
    }

    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            FieldType::Primitive(p) => Some(*p),
            FieldType::Composite(_) => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositeType> {
        match self {
            FieldType::Primitive(_) => None,
            FieldType::Composite(c) => Some(c),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            FieldType::Primitive(p) => p.type_name(),
            FieldType::Composite(c) => c.name(),
        }
    }
}

/// Resolved schema field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    index: u32,
    qualifier: FieldQualifier,
    field_type: FieldType,
    name: String,
    path: Path,
    position: usize,
    depth: Depth,
}

impl Field {
    /// Schema field number.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn qualifier(&self) -> FieldQualifier {
        self.qualifier
    }

    pub fn field_type(&self) -> &FieldType {
        &self.field_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 0-based ordinal within the parent's field list.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Schema depth; a direct child of the root has depth 1.
    pub fn depth(&self) -> Depth {
        self.depth
    }

    pub fn is_multi_valued(&self) -> bool {
        self.qualifier.is_multi_valued()
    }
}

/// Resolved composite (message) type owning an ordered, non-empty field list.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeType {
    name: String,
    fields: Vec<Field>,
}

impl CompositeType {
    /// Resolve a definition as the root message: its fields get depth 1.
    pub fn resolve(def: &CompositeDef) -> Result<Self, SchemaError> {
        Self::resolve_at(def, &Path::root())
    }

    fn resolve_at(def: &CompositeDef, parent: &Path) -> Result<Self, SchemaError> {
        let invalid = |detail: String| SchemaError::Invalid {
            type_name: def.name.clone(),
            detail,
        };

        if def.fields.is_empty() {
            return Err(invalid("composite type has no fields".to_string()));
        }

        let mut names = HashSet::new();
        let mut indexes = HashSet::new();
        let mut fields = Vec::with_capacity(def.fields.len());

        for (position, fd) in def.fields.iter().enumerate() {
            if !names.insert(fd.name.as_str()) {
                return Err(invalid(format!("duplicate field name '{}'", fd.name)));
            }
            if !indexes.insert(fd.index) {
                return Err(invalid(format!("duplicate field index {}", fd.index)));
            }

            let path = parent.child(PathSegment::new(fd.index, &fd.name, fd.qualifier));
            let depth = u32::try_from(path.depth())
                .ok()
                .and_then(Depth::new)
                .ok_or_else(|| invalid(format!("field '{}' is nested too deeply", fd.name)))?;
            let field_type = match &fd.type_def {
                TypeDef::Primitive(p) => FieldType::Primitive(*p),
                TypeDef::Composite(child) => {
                    FieldType::Composite(Arc::new(Self::resolve_at(child, &path)?))
                }
            };

            fields.push(Field {
                index: fd.index,
                qualifier: fd.qualifier,
                field_type,
                name: fd.name.clone(),
                path,
                position,
                depth,
            });
        }

        Ok(Self {
            name: def.name.clone(),
            fields,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Find a descendant field by dotted path (`"dept.name"`).
    pub fn field_by_path(&self, dotted: &str) -> Option<&Field> {
        let mut names = dotted.split('.');
        let mut field = self.field_by_name(names.next()?)?;
        for name in names {
            field = field.field_type().as_composite()?.field_by_name(name)?;
        }
        Some(field)
    }

    /// Leaf fields, depth-first in field order.
    pub fn leaves(&self) -> Vec<&Field> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a Field>) {
        for field in &self.fields {
            match field.field_type() {
                FieldType::Primitive(_) => out.push(field),
                FieldType::Composite(child) => child.collect_leaves(out),
            }
        }
    }
}

impl Display for CompositeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let text = super::format_schema(self)?;
        f.write_str(&text)
    }
}
