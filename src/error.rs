// SPDX-FileCopyrightText: The im-hierarchy authors
// SPDX-License-Identifier: MPL-2.0

use thiserror::Error;

use crate::{HierarchyPath, PathSegment};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HierarchyError<K>
where
    K: PathSegment,
{
    /// The node addressed by [`crate::Hierarchy::add()`] already holds a value.
    #[error("node at {path:?} already has a value")]
    AlreadyHasValue { path: HierarchyPath<K> },

    /// A segment along the path does not resolve to an existing child node.
    ///
    /// `missing_segment` is the first segment that could not be resolved.
    #[error("node at {path:?} not found: missing segment {missing_segment:?}")]
    NodeNotFound {
        path: HierarchyPath<K>,
        missing_segment: K,
    },

    /// A child substitution was requested for a segment that is not
    /// an existing child.
    ///
    /// Indicates an inconsistency in the calling code rather than
    /// invalid user input.
    #[error("node {segment:?} does not substitute any child node of {parent:?}")]
    InvalidStructuralOperation { parent: K, segment: K },
}

impl<K> HierarchyError<K>
where
    K: PathSegment,
{
    /// The path that caused the failure, if any.
    #[must_use]
    pub const fn path(&self) -> Option<&HierarchyPath<K>> {
        match self {
            Self::AlreadyHasValue { path } | Self::NodeNotFound { path, .. } => Some(path),
            Self::InvalidStructuralOperation { .. } => None,
        }
    }
}
