use std::{
    fmt::{self, Display, Formatter},
    num::NonZeroU32,
    sync::Arc,
};

use super::FieldQualifier;

/// Schema depth of a field: 1-based distance from the (unrepresented) root.
///
/// This is the depth carried by unset-parent / repeated-parent markers. It is
/// a property of the schema, not of any encoder or decoder object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Depth(NonZeroU32);

impl Depth {
    /// Depth of a direct child of the root message.
    pub const FIRST: Depth = Depth(NonZeroU32::MIN);

    /// Returns `None` for 0, which is never a valid schema depth.
    pub fn new(depth: u32) -> Option<Self> {
        NonZeroU32::new(depth).map(Self)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl Display for Depth {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One step of a [`Path`]: identifies a field by its position in the schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathSegment {
    index: u32,
    name: Arc<str>,
    qualifier: FieldQualifier,
}

impl PathSegment {
    pub fn new(index: u32, name: impl AsRef<str>, qualifier: FieldQualifier) -> Self {
        Self {
            index,
            name: Arc::from(name.as_ref()),
            qualifier,
        }
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualifier(&self) -> FieldQualifier {
        self.qualifier
    }
}

/// Ordered sequence of fields from (but excluding) the schema root to a field.
///
/// Immutable value type; equality and hashing are structural.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    segments: Arc<[PathSegment]>,
}

impl Path {
    /// The empty path, depth 0.
    pub fn root() -> Self {
        Self {
            segments: Arc::from(Vec::new()),
        }
    }

    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self {
            segments: Arc::from(segments),
        }
    }

    /// Path extended by one segment.
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut segments = self.segments.to_vec();
        segments.push(segment);
        Self::new(segments)
    }

    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }

    /// Path without its last segment. The root path is its own parent.
    pub fn parent_path(&self) -> Path {
        match self.segments.split_last() {
            Some((_, parent)) => Self::new(parent.to_vec()),
            None => self.clone(),
        }
    }

    /// Length of the longest shared prefix, compared from the root.
    pub fn common_path_length(&self, other: &Path) -> usize {
        self.segments
            .iter()
            .zip(other.segments.iter())
            .take_while(|(a, b)| a == b)
            .count()
    }

    pub fn common_subpath(&self, other: &Path) -> Path {
        let len = self.common_path_length(other);
        Self::new(self.segments[..len].to_vec())
    }

    pub fn is_prefix_of(&self, other: &Path) -> bool {
        self.common_path_length(other) == self.depth()
    }

    /// Number of fields strictly above the last one that carry `qualifier`.
    pub fn parent_qualifier_count(&self, qualifier: FieldQualifier) -> usize {
        match self.segments.split_last() {
            Some((_, parents)) => parents
                .iter()
                .filter(|segment| segment.qualifier == qualifier)
                .count(),
            None => 0,
        }
    }
}

impl Default for Path {
    fn default() -> Self {
        Self::root()
    }
}

impl Display for Path {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(&segment.name)?;
        }
        Ok(())
    }
}
