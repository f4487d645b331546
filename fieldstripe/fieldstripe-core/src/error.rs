//! Error types for the schema, stripe and record layers.

/// Error returned by [`SchemaProvider`](crate::SchemaProvider) implementations
/// and by schema resolution.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// Schema input (e.g., a serialized `FileDescriptorSet`) could not be parsed.
    #[error("failed to parse schema input: {source}")]
    Parse {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The requested message name does not exist in the schema input.
    #[error("message '{name}' not found")]
    NotFound { name: String },

    /// The requested message exists but cannot serve as a record root.
    #[error("message '{name}' is not a top-level message")]
    NotTopLevel { name: String },

    /// A composite type is structurally invalid (no fields, duplicate names or indexes).
    #[error("invalid type '{type_name}': {detail}")]
    Invalid { type_name: String, detail: String },

    /// A field uses a type that has no primitive or composite counterpart.
    #[error("field '{field}' of '{type_name}' has unsupported type {kind}")]
    Unsupported {
        type_name: String,
        field: String,
        kind: String,
    },

    /// The composite type graph is not a tree.
    #[error("type '{type_name}' is recursive through field '{field}'")]
    Recursive { type_name: String, field: String },
}

/// Error returned by [`StripeWriter`](crate::StripeWriter) and
/// [`StripeReader`](crate::StripeReader) implementations.
#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// No stripe exists for the requested field.
    #[error("stripe '{stripe}' not found")]
    NotFound { stripe: String },

    /// Stripe already exists and would be overwritten.
    #[error("stripe '{stripe}' already exists")]
    AlreadyExists { stripe: String },

    /// Stripe bytes could not be decoded into tokens.
    #[error("malformed stripe '{stripe}': {detail}")]
    Malformed { stripe: String, detail: String },
}

/// Error returned by [`RecordSource`](crate::RecordSource) and
/// [`RecordSink`](crate::RecordSink) implementations.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Source record syntax is invalid.
    #[error("malformed record: {detail}")]
    Malformed { detail: String },

    /// A record value does not have the shape its field requires.
    #[error("value of '{field}' has unexpected shape: {source}")]
    TypeMismatch {
        field: String,
        #[source]
        source: ValueTypeError,
    },

    /// Calls arrived in an order the pull/push protocol does not allow.
    #[error("record protocol violation: {detail}")]
    Protocol { detail: String },
}

impl RecordError {
    pub fn protocol(detail: impl Into<String>) -> Self {
        Self::Protocol {
            detail: detail.into(),
        }
    }

    pub fn malformed(detail: impl Into<String>) -> Self {
        Self::Malformed {
            detail: detail.into(),
        }
    }
}

/// A [`Value`](crate::Value) variant did not match the expected kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("expected {expected}, found {actual}")]
pub struct ValueTypeError {
    pub expected: String,
    pub actual: String,
}

impl ValueTypeError {
    pub fn new(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}
