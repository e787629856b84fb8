// SPDX-FileCopyrightText: The im-hierarchy authors
// SPDX-License-Identifier: MPL-2.0

use std::fmt;

/// Key segment of a [`HierarchyPath`].
///
/// Segments are compared by value. A segment is the local identity of
/// a node below its parent.
pub trait PathSegment: Clone + Eq + fmt::Debug {}

impl<T> PathSegment for T where T: Clone + Eq + fmt::Debug {}

/// Absolute path of a node, starting at the root.
///
/// The empty sequence of segments denotes the root node. Paths are
/// never modified, [`Self::join()`] and [`Self::parent()`] create new
/// paths.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_more::From)]
pub struct HierarchyPath<K> {
    segments: Vec<K>,
}

impl<K> HierarchyPath<K> {
    /// The path of the root node.
    #[must_use]
    pub const fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    #[must_use]
    pub fn from_segments(segments: impl IntoIterator<Item = K>) -> Self {
        Self {
            segments: segments.into_iter().collect(),
        }
    }

    /// All segments from the root down to the addressed node.
    #[must_use]
    pub fn segments(&self) -> &[K] {
        &self.segments
    }

    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments, i.e. the distance from the root node.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.segments.len()
    }

    #[must_use]
    pub fn last_segment(&self) -> Option<&K> {
        self.segments.last()
    }

    /// Split the path into parent segments and the last child segment.
    ///
    /// The child segment is `None` for the root path.
    #[must_use]
    pub fn parent_child_segments(&self) -> (&[K], Option<&K>) {
        match self.segments.split_last() {
            Some((child_segment, parent_segments)) => (parent_segments, Some(child_segment)),
            None => (&[], None),
        }
    }
}

impl<K> HierarchyPath<K>
where
    K: Clone,
{
    /// Create the path of a child node.
    #[must_use]
    pub fn join(&self, segment: K) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend_from_slice(&self.segments);
        segments.push(segment);
        Self { segments }
    }

    /// The path of the parent node.
    ///
    /// Returns `None` for the root path.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        let (parent_segments, child_segment) = self.parent_child_segments();
        child_segment?;
        Some(Self {
            segments: parent_segments.to_vec(),
        })
    }
}

impl<K> HierarchyPath<K>
where
    K: PartialEq,
{
    /// Check if `prefix` addresses this node or one of its ancestors.
    #[must_use]
    pub fn starts_with(&self, prefix: &Self) -> bool {
        self.segments.starts_with(&prefix.segments)
    }
}

impl HierarchyPath<String> {
    /// Parse a delimited path.
    ///
    /// Empty segments are skipped, i.e. `""`, `"/"` and `"//"` all parse
    /// into the root path when using `"/"` as the separator.
    #[must_use]
    pub fn parse(text: &str, separator: &str) -> Self {
        if separator.is_empty() {
            if text.is_empty() {
                return Self::root();
            }
            return Self {
                segments: vec![text.to_owned()],
            };
        }
        text.split(separator)
            .filter(|segment| !segment.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    }
}

impl<K> Default for HierarchyPath<K> {
    fn default() -> Self {
        Self::root()
    }
}

impl<K> FromIterator<K> for HierarchyPath<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        Self::from_segments(iter)
    }
}

impl<K> fmt::Display for HierarchyPath<K>
where
    K: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return f.write_str("/");
        }
        for segment in &self.segments {
            write!(f, "/{segment}")?;
        }
        Ok(())
    }
}
