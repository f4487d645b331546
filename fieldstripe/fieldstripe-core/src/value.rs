//! Record value tree consumed by row adapters and carried by stripe tokens.

use std::sync::Arc;

use crate::{error::ValueTypeError, schema::PrimitiveType};

/// A record, or any part of one.
///
/// `Struct` children are positional: child `i` belongs to the field at
/// [`Field::position`](crate::Field::position) `i`. Only scalar variants may
/// appear in a stripe.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    String(Arc<str>),
    Struct(Vec<Value>),
    List(Vec<Value>),
}

impl Value {
    pub fn string(s: impl AsRef<str>) -> Self {
        Self::String(Arc::from(s.as_ref()))
    }

    /// Primitive kind of a scalar value; `None` for `Null` and composites.
    pub fn primitive_type(&self) -> Option<PrimitiveType> {
        Some(match self {
            Value::Byte(_) => PrimitiveType::Byte,
            Value::Short(_) => PrimitiveType::Short,
            Value::Int(_) => PrimitiveType::Int,
            Value::Long(_) => PrimitiveType::Long,
            Value::Float(_) => PrimitiveType::Float,
            Value::Double(_) => PrimitiveType::Double,
            Value::Boolean(_) => PrimitiveType::Boolean,
            Value::String(_) => PrimitiveType::String,
            Value::Null | Value::Struct(_) | Value::List(_) => return None,
        })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn try_i8(&self) -> Result<Option<i8>, ValueTypeError> {
        match self {
            Value::Byte(v) => Ok(Some(*v)),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("Byte")),
        }
    }

    pub fn try_i16(&self) -> Result<Option<i16>, ValueTypeError> {
        match self {
            Value::Short(v) => Ok(Some(*v)),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("Short")),
        }
    }

    pub fn try_i32(&self) -> Result<Option<i32>, ValueTypeError> {
        match self {
            Value::Int(v) => Ok(Some(*v)),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("Int")),
        }
    }

    pub fn try_i64(&self) -> Result<Option<i64>, ValueTypeError> {
        match self {
            Value::Long(v) => Ok(Some(*v)),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("Long")),
        }
    }

    pub fn try_f32(&self) -> Result<Option<f32>, ValueTypeError> {
        match self {
            Value::Float(v) => Ok(Some(*v)),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("Float")),
        }
    }

    pub fn try_f64(&self) -> Result<Option<f64>, ValueTypeError> {
        match self {
            Value::Double(v) => Ok(Some(*v)),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("Double")),
        }
    }

    pub fn try_bool(&self) -> Result<Option<bool>, ValueTypeError> {
        match self {
            Value::Boolean(v) => Ok(Some(*v)),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("Boolean")),
        }
    }

    pub fn try_str(&self) -> Result<Option<&str>, ValueTypeError> {
        match self {
            Value::String(v) => Ok(Some(v.as_ref())),
            Value::Null => Ok(None),
            _ => Err(self.type_mismatch("String")),
        }
    }

    pub fn type_mismatch(&self, expected: impl Into<String>) -> ValueTypeError {
        ValueTypeError::new(expected, self.variant_name())
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Byte(_) => "Byte",
            Value::Short(_) => "Short",
            Value::Int(_) => "Int",
            Value::Long(_) => "Long",
            Value::Float(_) => "Float",
            Value::Double(_) => "Double",
            Value::Boolean(_) => "Boolean",
            Value::String(_) => "String",
            Value::Struct(_) => "Struct",
            Value::List(_) => "List",
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::string(value)
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(Arc::from(value))
    }
}
