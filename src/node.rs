// SPDX-FileCopyrightText: The im-hierarchy authors
// SPDX-License-Identifier: MPL-2.0

use std::sync::Arc;

use crate::{ChildNodes, HierarchyError, PathSegment};

/// Immutable node of an [`ImmutableHierarchy`](crate::ImmutableHierarchy).
///
/// Nodes are never modified after construction. All operations that
/// change a node return a new node that shares the unchanged children
/// with the original node. Operations that don't change anything return
/// the original handle, i.e. `Arc::ptr_eq()` holds between receiver
/// and result.
#[derive(Debug, Clone)]
pub struct Node<K, V> {
    segment: K,
    value: Option<V>,
    children: ChildNodes<Arc<Node<K, V>>>,
}

impl<K, V> Node<K, V>
where
    K: PathSegment,
    V: Clone,
{
    /// Construct a node without a value and without children.
    #[must_use]
    pub fn new(segment: K) -> Arc<Self> {
        Self::with_children(segment, None, std::iter::empty())
    }

    /// Construct a node with a value and without children.
    #[must_use]
    pub fn with_value(segment: K, value: V) -> Arc<Self> {
        Self::with_children(segment, Some(value), std::iter::empty())
    }

    /// Construct a node from all of its parts.
    ///
    /// The segments of `children` are expected to be unique.
    #[must_use]
    pub fn with_children(
        segment: K,
        value: Option<V>,
        children: impl IntoIterator<Item = Arc<Self>>,
    ) -> Arc<Self> {
        let children = children.into_iter().collect::<ChildNodes<_>>();
        debug_assert!(children.iter().enumerate().all(|(index, child)| children
            .iter()
            .skip(index + 1)
            .all(|other| other.segment != child.segment)));
        Arc::new(Self {
            segment,
            value,
            children,
        })
    }

    #[must_use]
    pub const fn segment(&self) -> &K {
        &self.segment
    }

    #[must_use]
    pub const fn has_value(&self) -> bool {
        self.value.is_some()
    }

    /// The value of this node.
    ///
    /// A node without a value is distinguishable from a node that holds
    /// a default value.
    #[must_use]
    pub const fn try_get_value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    #[must_use]
    pub fn has_child_nodes(&self) -> bool {
        !self.children.is_empty()
    }

    /// Direct children in insertion order.
    pub fn child_nodes(&self) -> impl Iterator<Item = &Arc<Self>> + '_ {
        self.children.iter()
    }

    /// Find a direct child by its segment.
    #[must_use]
    pub fn child_node(&self, segment: &K) -> Option<&Arc<Self>> {
        self.children.iter().find(|child| child.segment == *segment)
    }

    /// Check if any descendant (recursively) holds a value.
    ///
    /// The value of this node is not considered.
    #[must_use]
    pub fn has_descendant_values(&self) -> bool {
        self.children
            .iter()
            .any(|child| child.has_value() || child.has_descendant_values())
    }

    /// Neither a value nor children.
    #[must_use]
    pub fn is_vacant(&self) -> bool {
        !self.has_value() && !self.has_child_nodes()
    }

    fn child_index(&self, segment: &K) -> Option<usize> {
        self.children
            .iter()
            .position(|child| child.segment == *segment)
    }

    /// Replace the value.
    ///
    /// Returns the receiver if it already holds an equal value.
    #[must_use]
    pub fn set_value(self: &Arc<Self>, value: V) -> Arc<Self>
    where
        V: PartialEq,
    {
        if self.value.as_ref() == Some(&value) {
            log::trace!("Node {segment:?} already has this value", segment = self.segment);
            return Arc::clone(self);
        }
        Arc::new(Self {
            segment: self.segment.clone(),
            value: Some(value),
            children: self.children.clone(),
        })
    }

    /// Append a new child.
    ///
    /// Does not check for an existing child with the same segment. The
    /// caller must ensure that no such child exists.
    #[must_use]
    pub fn add_child_node(self: &Arc<Self>, child: Arc<Self>) -> Arc<Self> {
        debug_assert!(self.child_node(&child.segment).is_none());
        let mut children = self.children.clone();
        children.extend(std::iter::once(child));
        Arc::new(Self {
            segment: self.segment.clone(),
            value: self.value.clone(),
            children,
        })
    }

    /// Substitute the existing child with the same segment as `new_child`.
    ///
    /// Returns the receiver if `new_child` is already the child of this
    /// node.
    ///
    /// # Errors
    ///
    /// Fails with [`HierarchyError::InvalidStructuralOperation`] if there
    /// is no child with the same segment.
    pub fn set_child_node(
        self: &Arc<Self>,
        new_child: Arc<Self>,
    ) -> Result<Arc<Self>, HierarchyError<K>> {
        let Some(index) = self.child_index(&new_child.segment) else {
            return Err(HierarchyError::InvalidStructuralOperation {
                parent: self.segment.clone(),
                segment: new_child.segment.clone(),
            });
        };
        if Arc::ptr_eq(&self.children[index], &new_child) {
            return Ok(Arc::clone(self));
        }
        let mut children = self.children.clone();
        children[index] = new_child;
        Ok(Arc::new(Self {
            segment: self.segment.clone(),
            value: self.value.clone(),
            children,
        }))
    }

    /// Detach the child with the given segment.
    ///
    /// # Errors
    ///
    /// Fails with [`HierarchyError::InvalidStructuralOperation`] if there
    /// is no such child.
    pub fn remove_child_node(
        self: &Arc<Self>,
        segment: &K,
    ) -> Result<Arc<Self>, HierarchyError<K>> {
        let Some(index) = self.child_index(segment) else {
            return Err(HierarchyError::InvalidStructuralOperation {
                parent: self.segment.clone(),
                segment: segment.clone(),
            });
        };
        let mut children = self.children.clone();
        let removed = children.remove(index);
        log::debug!(
            "Detached child node {removed_segment:?} from {segment:?}",
            removed_segment = removed.segment,
            segment = self.segment,
        );
        Ok(Arc::new(Self {
            segment: self.segment.clone(),
            value: self.value.clone(),
            children,
        }))
    }

    /// Remove the value.
    ///
    /// Returns the receiver if it has no value. If `prune` is `true` and
    /// none of the descendants holds a value then all children are
    /// dropped.
    #[must_use]
    pub fn unset_value(self: &Arc<Self>, prune: bool) -> Arc<Self> {
        if !self.has_value() {
            return Arc::clone(self);
        }
        if prune && !self.has_descendant_values() {
            if self.has_child_nodes() {
                log::debug!("Pruning all child nodes of {segment:?}", segment = self.segment);
            }
            return Self::new(self.segment.clone());
        }
        Arc::new(Self {
            segment: self.segment.clone(),
            value: None,
            children: self.children.clone(),
        })
    }

    /// Drop the value and all children, keeping only the segment.
    ///
    /// Returns the receiver if it is already vacant.
    #[must_use]
    pub fn clear(self: &Arc<Self>) -> Arc<Self> {
        if self.is_vacant() {
            return Arc::clone(self);
        }
        Self::new(self.segment.clone())
    }
}
