//! Convert a protobuf `FileDescriptorSet` into a fieldstripe schema.

use fieldstripe_core::{
    CompositeDef, CompositeType, FieldDef, FieldQualifier, PrimitiveType, SchemaError,
    SchemaProvider, TypeDef,
};
use prost_reflect::{Cardinality, DescriptorPool, FieldDescriptor, Kind, MessageDescriptor};
use prost_types::FileDescriptorSet;

use crate::PresencePolicy;

/// [`SchemaProvider`] backed by a protobuf descriptor pool.
#[derive(Debug, Clone)]
pub struct ProtobufSchemaProvider {
    pool: DescriptorPool,
    policy: PresencePolicy,
}

impl ProtobufSchemaProvider {
    /// Parse serialized `google.protobuf.FileDescriptorSet` bytes.
    pub fn decode(schema_data: &[u8]) -> Result<Self, SchemaError> {
        let pool = DescriptorPool::decode(schema_data).map_err(|e| SchemaError::Parse {
            source: Box::new(e),
        })?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_file_descriptor_set(fds: FileDescriptorSet) -> Result<Self, SchemaError> {
        let pool =
            DescriptorPool::from_file_descriptor_set(fds).map_err(|e| SchemaError::Parse {
                source: Box::new(e),
            })?;
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: DescriptorPool) -> Self {
        Self {
            pool,
            policy: PresencePolicy::default(),
        }
    }

    pub fn with_presence_policy(mut self, policy: PresencePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn presence_policy(&self) -> PresencePolicy {
        self.policy
    }

    /// Fully-qualified names of every message usable as a record root.
    pub fn top_level_messages(&self) -> Vec<String> {
        self.pool
            .all_messages()
            .filter(|m| m.parent_message().is_none() && !m.is_map_entry())
            .map(|m| m.full_name().to_string())
            .collect()
    }
}

impl SchemaProvider for ProtobufSchemaProvider {
    fn root_type(&self, message_name: &str) -> Result<CompositeType, SchemaError> {
        let desc = self
            .pool
            .get_message_by_name(message_name)
            .ok_or_else(|| SchemaError::NotFound {
                name: message_name.to_string(),
            })?;
        if desc.parent_message().is_some() || desc.is_map_entry() {
            return Err(SchemaError::NotTopLevel {
                name: message_name.to_string(),
            });
        }

        let def = message_to_composite_def(&desc, self.policy, &mut Vec::new())?;
        let root = CompositeType::resolve(&def)?;
        tracing::debug!(
            schema = message_name,
            leaves = root.leaves().len(),
            "resolved protobuf schema"
        );
        Ok(root)
    }
}

/// Derive the root [`CompositeType`] for `schema_name` from serialized
/// `FileDescriptorSet` bytes, using the presence-aware policy.
pub fn protobuf_descriptor_to_schema(
    schema_name: &str,
    schema_data: &[u8],
) -> Result<CompositeType, SchemaError> {
    protobuf_descriptor_to_schema_with_policy(
        schema_name,
        schema_data,
        PresencePolicy::PresenceAware,
    )
}

/// Derive the root [`CompositeType`] with a presence policy.
pub fn protobuf_descriptor_to_schema_with_policy(
    schema_name: &str,
    schema_data: &[u8],
    policy: PresencePolicy,
) -> Result<CompositeType, SchemaError> {
    ProtobufSchemaProvider::decode(schema_data)?
        .with_presence_policy(policy)
        .root_type(schema_name)
}

/// `active` holds the full names of the messages currently being expanded.
fn message_to_composite_def(
    desc: &MessageDescriptor,
    policy: PresencePolicy,
    active: &mut Vec<String>,
) -> Result<CompositeDef, SchemaError> {
    active.push(desc.full_name().to_string());
    let fields = desc
        .fields()
        .map(|f| field_descriptor_to_field_def(desc, &f, policy, active))
        .collect::<Result<Vec<_>, _>>()?;
    active.pop();
    Ok(CompositeDef::new(desc.name(), fields))
}

fn field_descriptor_to_field_def(
    parent: &MessageDescriptor,
    fd: &FieldDescriptor,
    policy: PresencePolicy,
    active: &mut Vec<String>,
) -> Result<FieldDef, SchemaError> {
    let type_def = match fd.kind() {
        Kind::Message(msg) => {
            if active.iter().any(|name| name == msg.full_name()) {
                return Err(SchemaError::Recursive {
                    type_name: msg.full_name().to_string(),
                    field: format!("{}.{}", parent.full_name(), fd.name()),
                });
            }
            // Map fields arrive here as repeated `{key, value}` entry messages.
            TypeDef::Composite(message_to_composite_def(&msg, policy, active)?)
        }
        kind => TypeDef::Primitive(kind_to_primitive(parent, fd, &kind)?),
    };

    Ok(FieldDef::new(
        fd.number(),
        fd.name(),
        qualifier(fd, policy),
        type_def,
    ))
}

fn qualifier(fd: &FieldDescriptor, policy: PresencePolicy) -> FieldQualifier {
    if fd.is_list() || fd.is_map() {
        return FieldQualifier::ZeroOrMore;
    }
    if matches!(fd.cardinality(), Cardinality::Required) {
        return FieldQualifier::One;
    }
    match policy {
        PresencePolicy::AllOptional => FieldQualifier::ZeroOrOne,
        PresencePolicy::PresenceAware if fd.supports_presence() => FieldQualifier::ZeroOrOne,
        PresencePolicy::PresenceAware => FieldQualifier::One,
    }
}

fn kind_to_primitive(
    parent: &MessageDescriptor,
    fd: &FieldDescriptor,
    kind: &Kind,
) -> Result<PrimitiveType, SchemaError> {
    let primitive = match kind {
        Kind::Double => PrimitiveType::Double,
        Kind::Float => PrimitiveType::Float,
        Kind::Int32 | Kind::Sint32 | Kind::Sfixed32 => PrimitiveType::Int,
        Kind::Int64 | Kind::Sint64 | Kind::Sfixed64 => PrimitiveType::Long,
        // Every uint32 fits in a signed 64-bit long.
        Kind::Uint32 | Kind::Fixed32 => PrimitiveType::Long,
        Kind::Bool => PrimitiveType::Boolean,
        Kind::String => PrimitiveType::String,
        Kind::Enum(_) => PrimitiveType::Int,
        Kind::Uint64 | Kind::Fixed64 | Kind::Bytes | Kind::Message(_) => {
            return Err(SchemaError::Unsupported {
                type_name: parent.full_name().to_string(),
                field: fd.name().to_string(),
                kind: format!("{kind:?}"),
            });
        }
    };
    Ok(primitive)
}
