use super::{FieldQualifier, PrimitiveType};

/// Unresolved field type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDef {
    Primitive(PrimitiveType),
    Composite(CompositeDef),
}

/// Unresolved composite (message) type: a name and its ordered fields.
#[derive(Debug, Clone, PartialEq)]
pub struct CompositeDef {
    pub name: String,
    pub fields: Vec<FieldDef>,
}

impl CompositeDef {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDef>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }
}

/// Unresolved field definition. `index` is the schema field number and may be
/// sparse; iteration order of the parent's field list is what counts.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub index: u32,
    pub name: String,
    pub qualifier: FieldQualifier,
    pub type_def: TypeDef,
}

impl FieldDef {
    pub fn new(
        index: u32,
        name: impl Into<String>,
        qualifier: FieldQualifier,
        type_def: TypeDef,
    ) -> Self {
        Self {
            index,
            name: name.into(),
            qualifier,
            type_def,
        }
    }

    pub fn primitive(
        index: u32,
        name: impl Into<String>,
        qualifier: FieldQualifier,
        primitive: PrimitiveType,
    ) -> Self {
        Self::new(index, name, qualifier, TypeDef::Primitive(primitive))
    }

    pub fn composite(
        index: u32,
        name: impl Into<String>,
        qualifier: FieldQualifier,
        composite: CompositeDef,
    ) -> Self {
        Self::new(index, name, qualifier, TypeDef::Composite(composite))
    }
}
