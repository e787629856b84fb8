// SPDX-FileCopyrightText: The im-hierarchy authors
// SPDX-License-Identifier: MPL-2.0

use std::sync::Arc;

use crate::{HierarchyError, HierarchyPath, PathSegment, TraversableNode, Traverser};

/// Computes the value of nodes that are created implicitly.
///
/// Invoked with the path of the new node. Nodes created as the target
/// of an operation don't receive a default value.
pub type DefaultValue<K, V> = Arc<dyn Fn(&HierarchyPath<K>) -> V + Send + Sync>;

/// Path-addressable value store.
///
/// Common contract of [`ImmutableHierarchy`](crate::ImmutableHierarchy)
/// and [`MutableHierarchy`](crate::MutableHierarchy).
pub trait Hierarchy<K, V>
where
    K: PathSegment,
{
    /// Node handle used for traversal.
    type Node<'a>: TraversableNode<Segment = K, Value = V>
    where
        Self: 'a;

    /// Create or overwrite the value at `path`.
    ///
    /// Missing nodes along the path are created.
    ///
    /// # Errors
    ///
    /// Fails with [`HierarchyError::InvalidStructuralOperation`] if the
    /// nodes along `path` are inconsistent.
    fn set(&mut self, path: &HierarchyPath<K>, value: V) -> Result<(), HierarchyError<K>>;

    /// Create the value at `path`.
    ///
    /// Missing nodes along the path are created.
    ///
    /// # Errors
    ///
    /// Fails with [`HierarchyError::AlreadyHasValue`] if the node already
    /// holds a different value.
    fn add(&mut self, path: &HierarchyPath<K>, value: V) -> Result<(), HierarchyError<K>>;

    /// The value at `path`.
    ///
    /// Returns `None` if either the node or its value doesn't exist.
    #[must_use]
    fn try_get_value(&self, path: &HierarchyPath<K>) -> Option<V>;

    /// Remove values from the node at `path` and its descendants.
    ///
    /// A `max_depth` of `None` or 1 only affects the node at `path`,
    /// greater depths include `max_depth - 1` levels of descendants and
    /// 0 removes nothing.
    ///
    /// Returns `true` if at least one value has been removed.
    ///
    /// # Errors
    ///
    /// Fails with [`HierarchyError::NodeNotFound`] if the node doesn't
    /// exist.
    fn remove(
        &mut self,
        path: &HierarchyPath<K>,
        max_depth: Option<usize>,
    ) -> Result<bool, HierarchyError<K>>;

    /// Remove the node at `path` from the hierarchy.
    ///
    /// Without `recurse` nodes with children are kept and `false` is
    /// returned. The root node is never removed, only cleared.
    ///
    /// # Errors
    ///
    /// Fails with [`HierarchyError::NodeNotFound`] if the node doesn't
    /// exist.
    fn remove_node(&mut self, path: &HierarchyPath<K>, recurse: bool)
        -> Result<bool, HierarchyError<K>>;

    /// Cursor on the node at `path`.
    ///
    /// # Errors
    ///
    /// Fails with [`HierarchyError::NodeNotFound`] if the node doesn't
    /// exist.
    fn traverse(
        &self,
        path: &HierarchyPath<K>,
    ) -> Result<Traverser<Self::Node<'_>>, HierarchyError<K>>;

    /// Paths and values of all nodes that hold a value.
    #[must_use]
    fn values(&self) -> Vec<(HierarchyPath<K>, V)>
    where
        V: Clone,
    {
        self.traverse(&HierarchyPath::root())
            .map(|root| root.values().collect())
            .unwrap_or_default()
    }
}
