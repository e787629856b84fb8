// SPDX-FileCopyrightText: The im-hierarchy authors
// SPDX-License-Identifier: MPL-2.0

use crate::{HierarchyError, PathSegment};

/// Node of a [`MutableHierarchy`](crate::MutableHierarchy).
///
/// The segment is fixed for the lifetime of the node. The value and the
/// children are modified in place.
#[derive(Debug, Clone)]
pub struct MutableNode<K, V> {
    segment: K,
    value: Option<V>,
    children: Vec<MutableNode<K, V>>,
}

impl<K, V> MutableNode<K, V>
where
    K: PathSegment,
{
    /// Construct a node without a value and without children.
    #[must_use]
    pub const fn new(segment: K) -> Self {
        Self {
            segment,
            value: None,
            children: Vec::new(),
        }
    }

    /// Construct a node with a value and without children.
    #[must_use]
    pub const fn with_value(segment: K, value: V) -> Self {
        Self {
            segment,
            value: Some(value),
            children: Vec::new(),
        }
    }

    #[must_use]
    pub const fn segment(&self) -> &K {
        &self.segment
    }

    #[must_use]
    pub const fn has_value(&self) -> bool {
        self.value.is_some()
    }

    #[must_use]
    pub const fn try_get_value(&self) -> Option<&V> {
        self.value.as_ref()
    }

    #[must_use]
    pub const fn has_child_nodes(&self) -> bool {
        !self.children.is_empty()
    }

    /// Direct children in insertion order.
    pub fn child_nodes(&self) -> impl Iterator<Item = &Self> + '_ {
        self.children.iter()
    }

    #[must_use]
    pub fn child_node(&self, segment: &K) -> Option<&Self> {
        self.children.iter().find(|child| child.segment == *segment)
    }

    #[must_use]
    pub fn child_node_mut(&mut self, segment: &K) -> Option<&mut Self> {
        self.children
            .iter_mut()
            .find(|child| child.segment == *segment)
    }

    pub(crate) fn child_index(&self, segment: &K) -> Option<usize> {
        self.children
            .iter()
            .position(|child| child.segment == *segment)
    }

    pub(crate) fn child_node_at_mut(&mut self, index: usize) -> &mut Self {
        &mut self.children[index]
    }

    pub(crate) const fn child_count(&self) -> usize {
        self.children.len()
    }

    pub(crate) fn child_nodes_mut(&mut self) -> impl Iterator<Item = &mut Self> + '_ {
        self.children.iter_mut()
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

    /// Replace the value.
    ///
    /// An equal value is not replaced.
    pub fn set_value(&mut self, value: V) -> &mut Self
    where
        V: PartialEq,
    {
        if self.value.as_ref() == Some(&value) {
            log::trace!("Node {segment:?} already has this value", segment = self.segment);
            return self;
        }
        self.value = Some(value);
        self
    }

    /// Append a new child.
    ///
    /// Does not check for an existing child with the same segment. The
    /// caller must ensure that no such child exists.
    pub fn add_child_node(&mut self, child: Self) -> &mut Self {
        debug_assert!(self.child_node(&child.segment).is_none());
        self.children.push(child);
        self
    }

    /// Substitute the existing child with the same segment as `new_child`.
    ///
    /// # Errors
    ///
    /// Fails with [`HierarchyError::InvalidStructuralOperation`] if there
    /// is no child with the same segment.
    pub fn set_child_node(&mut self, new_child: Self) -> Result<&mut Self, HierarchyError<K>> {
        let Some(index) = self.child_index(&new_child.segment) else {
            return Err(HierarchyError::InvalidStructuralOperation {
                parent: self.segment.clone(),
                segment: new_child.segment,
            });
        };
        self.children[index] = new_child;
        Ok(self)
    }

    /// Excise the child with the given segment.
    ///
    /// Returns the detached child or `None` if no such child exists.
    pub fn remove_child_node(&mut self, segment: &K) -> Option<Self> {
        let index = self.child_index(segment)?;
        log::debug!(
            "Detached child node {segment:?} from {parent_segment:?}",
            parent_segment = self.segment,
        );
        Some(self.children.remove(index))
    }

    /// Remove the value.
    ///
    /// Nothing happens if there is no value. If `prune` is `true` and
    /// none of the descendants holds a value then all children are
    /// dropped.
    pub fn unset_value(&mut self, prune: bool) -> &mut Self {
        if self.value.take().is_none() {
            return self;
        }
        if prune && self.has_child_nodes() && !self.has_descendant_values() {
            log::debug!("Pruning all child nodes of {segment:?}", segment = self.segment);
            self.children.clear();
        }
        self
    }

    /// Drop the value and all children, keeping only the segment.
    pub fn clear(&mut self) -> &mut Self {
        self.value = None;
        self.children.clear();
        self
    }
}
