//! Encoder tree: walks records from a [`RecordSource`] into per-leaf stripes.
//!
//! Every leaf owns one [`StripeWriter`]. Composite fields own no storage;
//! a [`NodeEncoder`] translates the presence and repetition of its
//! substructure into unset-parent / repeated-parent markers that it fans out
//! to every descendant leaf. Marker depths are always the schema depth of the
//! field that triggered them.

use fieldstripe_core::{Depth, Field, PrimitiveType, RecordSource, StripeWriter, Value};

use crate::error::{RECORD, ShredError};

/// Top of an encoder tree. Drives one record per [`encode`](Self::encode) call.
pub struct RootEncoder {
    children: Vec<FieldEncoder>,
}

impl RootEncoder {
    pub(crate) fn new(children: Vec<FieldEncoder>) -> Self {
        Self { children }
    }

    pub fn children(&self) -> &[FieldEncoder] {
        &self.children
    }

    /// Encode the next record of `source`.
    ///
    /// Returns `Ok(false)` without touching any stripe when the source is
    /// exhausted; callers loop until then.
    pub fn encode(&mut self, source: &mut dyn RecordSource) -> Result<bool, ShredError> {
        let record_err = |e| ShredError::Record {
            field: RECORD.to_string(),
            source: e,
        };

        if !source.has_more_records().map_err(record_err)? {
            return Ok(false);
        }
        source.start_record().map_err(record_err)?;
        for child in &mut self.children {
            child.encode(source)?;
        }
        source.end_record().map_err(record_err)?;
        tracing::trace!("encoded record");
        Ok(true)
    }

    /// Encode every remaining record and return how many were processed.
    pub fn encode_all(&mut self, source: &mut dyn RecordSource) -> Result<u64, ShredError> {
        let mut count = 0;
        while self.encode(source)? {
            count += 1;
        }
        Ok(count)
    }

    /// Flush every leaf's stripe writer.
    pub fn finish(&mut self) -> Result<(), ShredError> {
        for child in &mut self.children {
            child.finish()?;
        }
        Ok(())
    }
}

/// A composite or primitive field in an encoder tree.
pub enum FieldEncoder {
    Node(NodeEncoder),
    Leaf(LeafEncoder),
}

impl FieldEncoder {
    pub fn field(&self) -> &Field {
        match self {
            FieldEncoder::Node(n) => &n.field,
            FieldEncoder::Leaf(l) => &l.field,
        }
    }

    fn encode(&mut self, source: &mut dyn RecordSource) -> Result<(), ShredError> {
        match self {
            FieldEncoder::Node(n) => n.encode(source),
            FieldEncoder::Leaf(l) => l.encode(source),
        }
    }

    fn unset_parent(&mut self, depth: Depth) -> Result<(), ShredError> {
        match self {
            FieldEncoder::Node(n) => n.unset_parent(depth),
            FieldEncoder::Leaf(l) => l.unset_parent(depth),
        }
    }

    fn repeated_parent(&mut self, depth: Depth) -> Result<(), ShredError> {
        match self {
            FieldEncoder::Node(n) => n.repeated_parent(depth),
            FieldEncoder::Leaf(l) => l.repeated_parent(depth),
        }
    }

    fn finish(&mut self) -> Result<(), ShredError> {
        match self {
            FieldEncoder::Node(n) => n.children.iter_mut().try_for_each(FieldEncoder::finish),
            FieldEncoder::Leaf(l) => l
                .stripe
                .finish()
                .map_err(|e| ShredError::stripe(&l.field, None, e)),
        }
    }
}

/// Encoder for a composite field. Pure fan-out; owns no stripe.
pub struct NodeEncoder {
    field: Field,
    children: Vec<FieldEncoder>,
}

impl NodeEncoder {
    /// Fails with a contract violation when `field` is not composite.
    pub fn new(field: Field, children: Vec<FieldEncoder>) -> Result<Self, ShredError> {
        if field.field_type().is_primitive() {
            return Err(ShredError::contract(
                &field,
                "primitive field routed to a node encoder",
            ));
        }
        Ok(Self { field, children })
    }

    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn children(&self) -> &[FieldEncoder] {
        &self.children
    }

    fn encode(&mut self, source: &mut dyn RecordSource) -> Result<(), ShredError> {
        let depth = self.field.depth();

        if self.field.is_multi_valued() {
            let present = source
                .start_array(&self.field)
                .map_err(|e| ShredError::record(&self.field, e))?;
            let mut count = 0usize;
            if present {
                while source
                    .has_more_elements()
                    .map_err(|e| ShredError::record(&self.field, e))?
                {
                    if count > 0 {
                        self.repeated_parent(depth)?;
                    }
                    let element = source
                        .start_structure(&self.field)
                        .map_err(|e| ShredError::record(&self.field, e))?;
                    if !element {
                        source
                            .end_structure()
                            .and_then(|()| source.end_array())
                            .map_err(|e| ShredError::record(&self.field, e))?;
                        return Err(ShredError::NullElement {
                            field: self.field.path().to_string(),
                        });
                    }
                    self.encode_children(source)?;
                    source
                        .end_structure()
                        .map_err(|e| ShredError::record(&self.field, e))?;
                    count += 1;
                }
            }
            if count == 0 {
                self.unset_parent(depth)?;
            }
            source
                .end_array()
                .map_err(|e| ShredError::record(&self.field, e))
        } else {
            let present = source
                .start_structure(&self.field)
                .map_err(|e| ShredError::record(&self.field, e))?;
            if present {
                self.encode_children(source)?;
            } else {
                self.unset_parent(depth)?;
            }
            source
                .end_structure()
                .map_err(|e| ShredError::record(&self.field, e))
        }
    }

    fn encode_children(&mut self, source: &mut dyn RecordSource) -> Result<(), ShredError> {
        for child in &mut self.children {
            child.encode(source)?;
        }
        Ok(())
    }

    fn unset_parent(&mut self, depth: Depth) -> Result<(), ShredError> {
        self.children
            .iter_mut()
            .try_for_each(|child| child.unset_parent(depth))
    }

    fn repeated_parent(&mut self, depth: Depth) -> Result<(), ShredError> {
        self.children
            .iter_mut()
            .try_for_each(|child| child.repeated_parent(depth))
    }
}

/// Encoder for a primitive field, owning that field's stripe.
pub struct LeafEncoder {
    field: Field,
    primitive: PrimitiveType,
    stripe: Box<dyn StripeWriter>,
}

impl LeafEncoder {
    /// Fails with a contract violation when `field` is not primitive.
    pub fn new(field: Field, stripe: Box<dyn StripeWriter>) -> Result<Self, ShredError> {
        let primitive = field.field_type().as_primitive().ok_or_else(|| {
            ShredError::contract(&field, "composite field routed to a leaf encoder")
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

    fn encode(&mut self, source: &mut dyn RecordSource) -> Result<(), ShredError> {
        if self.field.is_multi_valued() {
            self.encode_repeated(source)
        } else {
            match self.read_value(source)? {
                Some(value) => self.write_value(&value),
                None => self.write_unset(),
            }
        }
    }

    fn encode_repeated(&mut self, source: &mut dyn RecordSource) -> Result<(), ShredError> {
        let present = source
            .start_array(&self.field)
            .map_err(|e| ShredError::record(&self.field, e))?;
        let mut count = 0usize;
        if present {
            while source
                .has_more_elements()
                .map_err(|e| ShredError::record(&self.field, e))?
            {
                if count > 0 {
                    self.stripe
                        .write_repeated_value()
                        .map_err(|e| ShredError::stripe(&self.field, None, e))?;
                }
                let Some(value) = self.read_value(source)? else {
                    source
                        .end_array()
                        .map_err(|e| ShredError::record(&self.field, e))?;
                    return Err(ShredError::NullElement {
                        field: self.field.path().to_string(),
                    });
                };
                self.write_value(&value)?;
                count += 1;
            }
        }
        if count == 0 {
            self.write_unset()?;
        }
        source
            .end_array()
            .map_err(|e| ShredError::record(&self.field, e))
    }

    /// Pull one value through the typed accessor matching the declared type.
    fn read_value(&self, source: &mut dyn RecordSource) -> Result<Option<Value>, ShredError> {
        let field = &self.field;
        let value = match self.primitive {
            PrimitiveType::Byte => source.read_byte(field).map(|v| v.map(Value::Byte)),
            PrimitiveType::Short => source.read_short(field).map(|v| v.map(Value::Short)),
            PrimitiveType::Int => source.read_int(field).map(|v| v.map(Value::Int)),
            PrimitiveType::Long => source.read_long(field).map(|v| v.map(Value::Long)),
            PrimitiveType::Float => source.read_float(field).map(|v| v.map(Value::Float)),
            PrimitiveType::Double => source.read_double(field).map(|v| v.map(Value::Double)),
            PrimitiveType::Boolean => source.read_boolean(field).map(|v| v.map(Value::Boolean)),
            PrimitiveType::String => source.read_string(field).map(|v| v.map(Value::from)),
        };
        value.map_err(|e| ShredError::record(field, e))
    }

    fn write_value(&mut self, value: &Value) -> Result<(), ShredError> {
        if value.primitive_type() != Some(self.primitive) {
            return Err(ShredError::contract(
                &self.field,
                format!(
                    "{} value written to {} stripe",
                    value.variant_name(),
                    self.primitive
                ),
            ));
        }
        self.stripe
            .write_value(value)
            .map_err(|e| ShredError::stripe(&self.field, None, e))
    }

    fn write_unset(&mut self) -> Result<(), ShredError> {
        self.stripe
            .write_unset()
            .map_err(|e| ShredError::stripe(&self.field, None, e))
    }

    fn unset_parent(&mut self, depth: Depth) -> Result<(), ShredError> {
        self.stripe
            .write_unset_parent(depth)
            .map_err(|e| ShredError::stripe(&self.field, Some(depth), e))
    }

    fn repeated_parent(&mut self, depth: Depth) -> Result<(), ShredError> {
        self.stripe
            .write_repeated_parent(depth)
            .map_err(|e| ShredError::stripe(&self.field, Some(depth), e))
    }
}
