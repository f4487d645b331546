//! Decoder tree: rebuilds records from per-leaf stripes into a [`RecordSink`].
//!
//! The tree mirrors the encoder node for node. All leaves below a composite
//! field receive identical markers at that field's depth, so a
//! [`NodeDecoder`] decides presence and repetition by peeking at one
//! representative leaf (the first leaf reachable through its first child)
//! and then consumes the same marker from every descendant leaf. A leaf whose
//! marker disagrees with the representative is reported as
//! [`ShredError::StripeDesync`].

use fieldstripe_core::{
    Depth, Field, Marker, PrimitiveType, RecordSink, StripeReader, Token, Value,
};

use crate::error::{RECORD, ShredError};

/// Top of a decoder tree. Rebuilds one record per [`decode`](Self::decode) call.
pub struct RootDecoder {
    children: Vec<FieldDecoder>,
}

impl RootDecoder {
    pub(crate) fn new(children: Vec<FieldDecoder>) -> Self {
        Self { children }
    }

    pub fn children(&self) -> &[FieldDecoder] {
        &self.children
    }

    /// Decode the next record into `sink`.
    ///
    /// Returns `Ok(false)` once every stripe is exhausted. Stripes that end at
    /// different records are reported as out of sync.
    pub fn decode(&mut self, sink: &mut dyn RecordSink) -> Result<bool, ShredError> {
        if !self.has_more_records()? {
            return Ok(false);
        }

        let record_err = |e| ShredError::Record {
            field: RECORD.to_string(),
            source: e,
        };
        sink.start_record().map_err(record_err)?;
        for child in &mut self.children {
            child.decode(sink)?;
        }
        sink.end_record().map_err(record_err)?;
        tracing::trace!("decoded record");
        Ok(true)
    }

    /// Decode every remaining record and return how many were processed.
    pub fn decode_all(&mut self, sink: &mut dyn RecordSink) -> Result<u64, ShredError> {
        let mut count = 0;
        while self.decode(sink)? {
            count += 1;
        }
        Ok(count)
    }

    fn has_more_records(&mut self) -> Result<bool, ShredError> {
        let mut remaining = 0usize;
        let mut exhausted: Option<String> = None;
        for child in &mut self.children {
            child.try_for_each_leaf(&mut |leaf: &mut LeafDecoder| -> Result<(), ShredError> {
                if leaf.peek()?.is_some() {
                    remaining += 1;
                } else if exhausted.is_none() {
                    exhausted = Some(leaf.field.path().to_string());
                }
                Ok(())
            })?;
        }

        match (remaining, exhausted) {
            (_, None) => Ok(true),
            (0, Some(_)) => Ok(false),
            (_, Some(field)) => Err(ShredError::StripeDesync {
                field,
                expected: "another record".to_string(),
                found: "end of stripe".to_string(),
            }),
        }
    }
}

/// A composite or primitive field in a decoder tree.
pub enum FieldDecoder {
    Node(NodeDecoder),
    Leaf(LeafDecoder),
}

impl FieldDecoder {
    pub fn field(&self) -> &Field {
        match self {
            FieldDecoder::Node(n) => &n.field,
            FieldDecoder::Leaf(l) => &l.field,
        }
    }

    fn decode(&mut self, sink: &mut dyn RecordSink) -> Result<(), ShredError> {
        match self {
            FieldDecoder::Node(n) => n.decode(sink),
            FieldDecoder::Leaf(l) => l.decode(sink),
        }
    }

    /// Next marker of the representative leaf below this field.
    fn peek(&mut self) -> Result<Option<Marker>, ShredError> {
        match self {
            FieldDecoder::Node(n) => n.peek(),
            FieldDecoder::Leaf(l) => l.peek(),
        }
    }

    fn try_for_each_leaf(
        &mut self,
        f: &mut dyn FnMut(&mut LeafDecoder) -> Result<(), ShredError>,
    ) -> Result<(), ShredError> {
        match self {
            FieldDecoder::Node(n) => n
                .children
                .iter_mut()
                .try_for_each(|child| child.try_for_each_leaf(&mut *f)),
            FieldDecoder::Leaf(l) => f(l),
        }
    }
}

/// Decoder for a composite field.
pub struct NodeDecoder {
    field: Field,
    children: Vec<FieldDecoder>,
}

impl NodeDecoder {
    /// Fails with a contract violation when `field` is not composite or has no children.
    pub fn new(field: Field, children: Vec<FieldDecoder>) -> Result<Self, ShredError> {
        if field.field_type().is_primitive() {
            return Err(ShredError::contract(
                &field,
                "primitive field routed to a node decoder",
            ));
        }
        if children.is_empty() {
            return Err(ShredError::contract(&field, "node decoder without children"));
        }
        Ok(Self { field, children })
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn children(&self) -> &[FieldDecoder] {
        &self.children
    }

    fn peek(&mut self) -> Result<Option<Marker>, ShredError> {
        match self.children.first_mut() {
            Some(first) => first.peek(),
            None => Ok(None),
        }
    }

    fn decode(&mut self, sink: &mut dyn RecordSink) -> Result<(), ShredError> {
        let depth = self.field.depth();
        let absent = match self.peek()? {
            Some(marker) => marker == Marker::UnsetParent(depth),
            None => {
                return Err(ShredError::desync(
                    &self.field,
                    format!("structure at depth {depth}"),
                    "end of stripe",
                ));
            }
        };

        if self.field.is_multi_valued() {
            sink.start_array(&self.field)
                .map_err(|e| ShredError::record(&self.field, e))?;
            if absent {
                self.skip_unset_parent(depth)?;
            } else {
                loop {
                    self.decode_element(sink)?;
                    if self.peek()? != Some(Marker::RepeatedParent(depth)) {
                        break;
                    }
                    self.skip_repeated_parent(depth)?;
                }
            }
            sink.end_array()
                .map_err(|e| ShredError::record(&self.field, e))
        } else if absent {
            self.skip_unset_parent(depth)?;
            sink.write_unset_field(&self.field)
                .map_err(|e| ShredError::record(&self.field, e))
        } else {
            self.decode_element(sink)
        }
    }

    fn decode_element(&mut self, sink: &mut dyn RecordSink) -> Result<(), ShredError> {
        sink.start_structure(&self.field)
            .map_err(|e| ShredError::record(&self.field, e))?;
        for child in &mut self.children {
            child.decode(sink)?;
        }
        sink.end_structure()
            .map_err(|e| ShredError::record(&self.field, e))
    }

    fn skip_unset_parent(&mut self, depth: Depth) -> Result<(), ShredError> {
        self.for_each_leaf(|leaf| leaf.expect_marker(Marker::UnsetParent(depth)))
    }

    fn skip_repeated_parent(&mut self, depth: Depth) -> Result<(), ShredError> {
        self.for_each_leaf(|leaf| leaf.expect_marker(Marker::RepeatedParent(depth)))
    }

    fn for_each_leaf(
        &mut self,
        mut f: impl FnMut(&mut LeafDecoder) -> Result<(), ShredError>,
    ) -> Result<(), ShredError> {
        self.children
            .iter_mut()
            .try_for_each(|child| child.try_for_each_leaf(&mut f))
    }
}

/// Decoder for a primitive field, owning that field's stripe.
pub struct LeafDecoder {
    field: Field,
    primitive: PrimitiveType,
    stripe: Box<dyn StripeReader>,
}

impl LeafDecoder {
    /// Fails with a contract violation when `field` is not primitive.
    pub fn new(field: Field, stripe: Box<dyn StripeReader>) -> Result<Self, ShredError> {
        let primitive = field.field_type().as_primitive().ok_or_else(|| {
            ShredError::contract(&field, "composite field routed to a leaf decoder")
        })?;
        Ok(Self {
            field,
            primitive,
            stripe,
        })
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    fn peek(&mut self) -> Result<Option<Marker>, ShredError> {
        self.stripe
            .peek()
            .map_err(|e| ShredError::stripe(&self.field, None, e))
    }

    fn next_token(&mut self, expected: &str) -> Result<Token, ShredError> {
        self.stripe
            .read_token()
            .map_err(|e| ShredError::stripe(&self.field, None, e))?
            .ok_or_else(|| ShredError::desync(&self.field, expected, "end of stripe"))
    }

    /// Consume a structural marker, which must match `expected` exactly.
    fn expect_marker(&mut self, expected: Marker) -> Result<(), ShredError> {
        let token = self.next_token(&expected.to_string())?;
        if token.marker() == expected {
            Ok(())
        } else {
            Err(ShredError::desync(
                &self.field,
                expected.to_string(),
                token.marker().to_string(),
            ))
        }
    }

    fn decode(&mut self, sink: &mut dyn RecordSink) -> Result<(), ShredError> {
        if self.field.is_multi_valued() {
            self.decode_repeated(sink)
        } else {
            match self.next_token("value or unset")? {
                Token::Value(value) => self.write_value(sink, value),
                Token::Unset => sink
                    .write_unset_field(&self.field)
                    .map_err(|e| ShredError::record(&self.field, e)),
                other => Err(ShredError::desync(
                    &self.field,
                    "value or unset",
                    other.marker().to_string(),
                )),
            }
        }
    }

    fn decode_repeated(&mut self, sink: &mut dyn RecordSink) -> Result<(), ShredError> {
        sink.start_array(&self.field)
            .map_err(|e| ShredError::record(&self.field, e))?;
        match self.next_token("value or unset")? {
            Token::Unset => {}
            Token::Value(first) => {
                self.write_value(sink, first)?;
                while self.peek()? == Some(Marker::RepeatedValue) {
                    self.expect_marker(Marker::RepeatedValue)?;
                    match self.next_token("value")? {
                        Token::Value(value) => self.write_value(sink, value)?,
                        other => {
                            return Err(ShredError::desync(
                                &self.field,
                                "value",
                                other.marker().to_string(),
                            ));
                        }
                    }
                }
            }
            other => {
                return Err(ShredError::desync(
                    &self.field,
                    "value or unset",
                    other.marker().to_string(),
                ));
            }
        }
        sink.end_array()
            .map_err(|e| ShredError::record(&self.field, e))
    }

    fn write_value(&mut self, sink: &mut dyn RecordSink, value: Value) -> Result<(), ShredError> {
        match value.primitive_type() {
            Some(p) if p == self.primitive => sink
                .write_field(&self.field, value)
                .map_err(|e| ShredError::record(&self.field, e)),
            _ => Err(ShredError::contract(
                &self.field,
                format!(
                    "{} value read from {} stripe",
                    value.variant_name(),
                    self.primitive
                ),
            )),
        }
    }
}
