//! Per-leaf stripe channel contract.
//!
//! A stripe is a forward-only stream of [`Token`]s for exactly one leaf
//! field. Besides values, it carries the structural markers the encoder tree
//! emits so that the decoder tree can rebuild nesting without a side index.

use crate::{
    error::StripeError,
    schema::{Depth, Field},
    value::Value,
};

/// One element of a stripe.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A present scalar value.
    Value(Value),
    /// The field itself has no value (or a repeated field has zero elements).
    Unset,
    /// The next value is another element of the same repeated field.
    RepeatedValue,
    /// The ancestor composite at this depth is absent.
    UnsetParent(Depth),
    /// The ancestor composite at this depth starts another repetition.
    RepeatedParent(Depth),
}

impl Token {
    pub fn marker(&self) -> Marker {
        match self {
            Token::Value(_) => Marker::Value,
            Token::Unset => Marker::Unset,
            Token::RepeatedValue => Marker::RepeatedValue,
            Token::UnsetParent(d) => Marker::UnsetParent(*d),
            Token::RepeatedParent(d) => Marker::RepeatedParent(*d),
        }
    }
}

/// A [`Token`] without its payload, as returned by [`StripeReader::peek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Value,
    Unset,
    RepeatedValue,
    UnsetParent(Depth),
    RepeatedParent(Depth),
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Marker::Value => f.write_str("value"),
            Marker::Unset => f.write_str("unset"),
            Marker::RepeatedValue => f.write_str("repeated-value"),
            Marker::UnsetParent(d) => write!(f, "unset-parent({d})"),
            Marker::RepeatedParent(d) => write!(f, "repeated-parent({d})"),
        }
    }
}

/// Write side of a stripe. Append-only.
pub trait StripeWriter {
    /// Append a scalar value. Callers only pass values whose
    /// [`Value::primitive_type`] matches the stripe's field.
    fn write_value(&mut self, value: &Value) -> Result<(), StripeError>;

    fn write_unset(&mut self) -> Result<(), StripeError>;

    fn write_repeated_value(&mut self) -> Result<(), StripeError>;

    fn write_unset_parent(&mut self, depth: Depth) -> Result<(), StripeError>;

    fn write_repeated_parent(&mut self, depth: Depth) -> Result<(), StripeError>;

    /// Flush buffered tokens. Called once after the last record.
    fn finish(&mut self) -> Result<(), StripeError> {
        Ok(())
    }
}

/// Read side of a stripe. Forward-only with one token of look-ahead.
pub trait StripeReader {
    /// Inspect the next token without consuming it; `None` at end of stripe.
    fn peek(&mut self) -> Result<Option<Marker>, StripeError>;

    /// Consume the next token; `None` at end of stripe.
    fn read_token(&mut self) -> Result<Option<Token>, StripeError>;
}

/// Creates one exclusively owned [`StripeWriter`] per leaf field.
pub trait StripeWriterFactory {
    fn create_writer(&mut self, field: &Field) -> Result<Box<dyn StripeWriter>, StripeError>;
}

/// Opens one exclusively owned [`StripeReader`] per leaf field.
pub trait StripeReaderFactory {
    fn open_reader(&mut self, field: &Field) -> Result<Box<dyn StripeReader>, StripeError>;
}
