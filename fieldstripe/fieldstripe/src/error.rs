//! Error type for encoder/decoder tree construction and traversal.

use fieldstripe_core::{Depth, Field, RecordError, SchemaError, StripeError};

/// Diagnostic category of a [`ShredError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Programming or schema-mismatch bug; never recoverable.
    ContractViolation,
    /// Input data has the wrong shape or is corrupt.
    InvalidData,
    /// A stripe or record channel could not be opened, read or written.
    Resource,
    /// Requested schema or stripe does not exist.
    NotFound,
}

/// Errors produced while building or driving an encoder/decoder tree.
///
/// Every variant aborts the current run; none is retried.
#[derive(Debug, thiserror::Error)]
pub enum ShredError {
    /// Internal contract broken, e.g. a composite value where a primitive was required.
    #[error("contract violation at '{field}': {detail}")]
    ContractViolation { field: String, detail: String },

    /// A repeated field contained an absent element.
    #[error("repeated field '{field}' contains a null element")]
    NullElement { field: String },

    /// A stripe token did not match the structure the decoder expected.
    #[error("stripe '{field}' out of sync: expected {expected}, found {found}")]
    StripeDesync {
        field: String,
        expected: String,
        found: String,
    },

    /// A stripe channel read or write failed.
    #[error("stripe operation on '{field}' failed{}: {source}", depth_suffix(.depth))]
    Stripe {
        field: String,
        depth: Option<Depth>,
        #[source]
        source: StripeError,
    },

    /// A record source or sink call failed.
    #[error("record access at '{field}' failed: {source}")]
    Record {
        field: String,
        #[source]
        source: RecordError,
    },

    /// The stripe factory could not provide a channel while building a tree.
    #[error("failed to open stripe for '{field}': {source}")]
    OpenStripe {
        field: String,
        #[source]
        source: StripeError,
    },

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

fn depth_suffix(depth: &Option<Depth>) -> String {
    depth.map(|d| format!(" at depth {d}")).unwrap_or_default()
}

/// Field label used for record-boundary errors.
pub(crate) const RECORD: &str = "<record>";

impl ShredError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ShredError::ContractViolation { .. } => ErrorKind::ContractViolation,
            ShredError::NullElement { .. } | ShredError::StripeDesync { .. } => {
                ErrorKind::InvalidData
            }
            ShredError::Stripe { source, .. } | ShredError::OpenStripe { source, .. } => {
                match source {
                    StripeError::NotFound { .. } => ErrorKind::NotFound,
                    StripeError::Malformed { .. } => ErrorKind::InvalidData,
                    StripeError::Io(_) | StripeError::AlreadyExists { .. } => ErrorKind::Resource,
                }
            }
            ShredError::Record { source, .. } => match source {
                RecordError::Io(_) => ErrorKind::Resource,
                RecordError::Malformed { .. } | RecordError::TypeMismatch { .. } => {
                    ErrorKind::InvalidData
                }
                RecordError::Protocol { .. } => ErrorKind::ContractViolation,
            },
            ShredError::Schema(source) => match source {
                SchemaError::NotFound { .. } | SchemaError::NotTopLevel { .. } => {
                    ErrorKind::NotFound
                }
                _ => ErrorKind::InvalidData,
            },
        }
    }

    pub(crate) fn contract(field: &Field, detail: impl Into<String>) -> Self {
        ShredError::ContractViolation {
            field: field.path().to_string(),
            detail: detail.into(),
        }
    }

    pub(crate) fn record(field: &Field, source: RecordError) -> Self {
        ShredError::Record {
            field: field.path().to_string(),
            source,
        }
    }

    pub(crate) fn stripe(field: &Field, depth: Option<Depth>, source: StripeError) -> Self {
        ShredError::Stripe {
            field: field.path().to_string(),
            depth,
            source,
        }
    }

    pub(crate) fn desync(field: &Field, expected: impl Into<String>, found: impl Into<String>) -> Self {
        ShredError::StripeDesync {
            field: field.path().to_string(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}
