// SPDX-FileCopyrightText: The im-hierarchy authors
// SPDX-License-Identifier: MPL-2.0

use std::{fmt, sync::Arc};

use crate::{
    DefaultValue, Hierarchy, HierarchyError, HierarchyPath, MutableNode, MutableTraverser,
    PathSegment, TraversalOrder, Traverser,
};

/// Hierarchy of nodes that are modified in place.
///
/// Not synchronized. Concurrent access requires external locking.
#[derive(Clone)]
pub struct MutableHierarchy<K, V> {
    root_node: MutableNode<K, V>,
    prune_on_remove: bool,
    default_value: Option<DefaultValue<K, V>>,
}

impl<K, V> MutableHierarchy<K, V>
where
    K: PathSegment + Default,
{
    /// Create an empty hierarchy.
    ///
    /// The root node is identified by the default segment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_root_segment(K::default())
    }
}

impl<K, V> Default for MutableHierarchy<K, V>
where
    K: PathSegment + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

fn descend_mut<'a, K, V>(
    root_node: &'a mut MutableNode<K, V>,
    segments: &[K],
    path: &HierarchyPath<K>,
) -> Result<&'a mut MutableNode<K, V>, HierarchyError<K>>
where
    K: PathSegment,
{
    let mut node = root_node;
    for segment in segments {
        let Some(index) = node.child_index(segment) else {
            return Err(HierarchyError::NodeNotFound {
                path: path.clone(),
                missing_segment: segment.clone(),
            });
        };
        node = node.child_node_at_mut(index);
    }
    Ok(node)
}

/// Remove the values of `node` and of `levels - 1` levels of its
/// descendants.
///
/// Descendants are processed before their parents. With `prune` enabled
/// descendants that became vacant are detached.
fn unset_values<K, V>(node: &mut MutableNode<K, V>, levels: usize, prune: bool) -> bool
where
    K: PathSegment,
{
    debug_assert!(levels > 0);
    let mut removed = false;
    if levels > 1 {
        let mut vacated_segments = Vec::new();
        for child_node in node.child_nodes_mut() {
            if !unset_values(child_node, levels - 1, prune) {
                continue;
            }
            removed = true;
            if prune && child_node.is_vacant() {
                vacated_segments.push(child_node.segment().clone());
            }
        }
        for segment in &vacated_segments {
            node.remove_child_node(segment);
        }
    }
    if node.has_value() {
        removed = true;
        node.unset_value(prune);
    }
    removed
}

impl<K, V> MutableHierarchy<K, V>
where
    K: PathSegment,
{
    /// Create an empty hierarchy with a custom root segment.
    #[must_use]
    pub const fn with_root_segment(root_segment: K) -> Self {
        Self {
            root_node: MutableNode::new(root_segment),
            prune_on_remove: false,
            default_value: None,
        }
    }

    /// Drop empty nodes when removing values.
    #[must_use]
    pub const fn with_prune_on_remove(mut self, prune_on_remove: bool) -> Self {
        self.prune_on_remove = prune_on_remove;
        self
    }

    /// Seed implicitly created nodes with a computed value.
    ///
    /// The root node receives a default value if it has none yet.
    #[must_use]
    pub fn with_default_value(
        mut self,
        default_value: impl Fn(&HierarchyPath<K>) -> V + Send + Sync + 'static,
    ) -> Self
    where
        V: PartialEq,
    {
        if !self.root_node.has_value() {
            self.root_node
                .set_value(default_value(&HierarchyPath::root()));
        }
        self.default_value = Some(Arc::new(default_value));
        self
    }

    #[must_use]
    pub const fn prune_on_remove(&self) -> bool {
        self.prune_on_remove
    }

    #[must_use]
    pub const fn root_node(&self) -> &MutableNode<K, V> {
        &self.root_node
    }

    fn find_node(&self, path: &HierarchyPath<K>) -> Result<&MutableNode<K, V>, HierarchyError<K>> {
        let mut node = &self.root_node;
        for segment in path.segments() {
            node = node
                .child_node(segment)
                .ok_or_else(|| HierarchyError::NodeNotFound {
                    path: path.clone(),
                    missing_segment: segment.clone(),
                })?;
        }
        Ok(node)
    }

    fn find_or_create_node(&mut self, path: &HierarchyPath<K>) -> &mut MutableNode<K, V> {
        let default_value = self.default_value.as_ref();
        let mut node = &mut self.root_node;
        for (index, segment) in path.segments().iter().enumerate() {
            let child_index = if let Some(child_index) = node.child_index(segment) {
                child_index
            } else {
                let is_target = index + 1 == path.depth();
                let child_node = match default_value {
                    Some(default_value) if !is_target => {
                        let child_path: HierarchyPath<K> =
                            path.segments()[..=index].iter().cloned().collect();
                        MutableNode::with_value(segment.clone(), default_value(&child_path))
                    }
                    _ => MutableNode::new(segment.clone()),
                };
                log::debug!(
                    "Adding new child node {segment:?} at depth {depth}",
                    depth = index + 1
                );
                node.add_child_node(child_node);
                node.child_count() - 1
            };
            node = node.child_node_at_mut(child_index);
        }
        node
    }

    /// Create or overwrite the value at `path`.
    pub fn set(&mut self, path: &HierarchyPath<K>, value: V)
    where
        V: PartialEq,
    {
        self.find_or_create_node(path).set_value(value);
    }

    /// Create the value at `path`.
    ///
    /// Adding a value that equals the existing value is a no-op.
    ///
    /// # Errors
    ///
    /// Fails with [`HierarchyError::AlreadyHasValue`] if a different value
    /// is present.
    pub fn add(&mut self, path: &HierarchyPath<K>, value: V) -> Result<(), HierarchyError<K>>
    where
        V: PartialEq,
    {
        let node = self.find_or_create_node(path);
        if let Some(existing_value) = node.try_get_value() {
            if *existing_value == value {
                log::trace!("Node at {path:?} already has this value");
                return Ok(());
            }
            return Err(HierarchyError::AlreadyHasValue { path: path.clone() });
        }
        node.set_value(value);
        Ok(())
    }

    /// The value at `path`.
    #[must_use]
    pub fn try_get_value(&self, path: &HierarchyPath<K>) -> Option<&V> {
        self.find_node(path).ok()?.try_get_value()
    }

    /// Remove values from the node at `path` and its descendants.
    ///
    /// See [`Hierarchy::remove()`].
    ///
    /// # Errors
    ///
    /// Fails with [`HierarchyError::NodeNotFound`] if the node doesn't
    /// exist.
    pub fn remove(
        &mut self,
        path: &HierarchyPath<K>,
        max_depth: Option<usize>,
    ) -> Result<bool, HierarchyError<K>> {
        let levels = max_depth.unwrap_or(1);
        let prune = self.prune_on_remove;
        let node = descend_mut(&mut self.root_node, path.segments(), path)?;
        if levels == 0 {
            return Ok(false);
        }
        if !unset_values(node, levels, prune) {
            return Ok(false);
        }
        if prune && node.is_vacant() {
            if let (parent_segments, Some(child_segment)) = path.parent_child_segments() {
                let parent_node = descend_mut(&mut self.root_node, parent_segments, path)?;
                parent_node.remove_child_node(child_segment);
            }
        }
        Ok(true)
    }

    /// Remove the node at `path` from the hierarchy.
    ///
    /// See [`Hierarchy::remove_node()`].
    ///
    /// # Errors
    ///
    /// Fails with [`HierarchyError::NodeNotFound`] if the node doesn't
    /// exist.
    pub fn remove_node(
        &mut self,
        path: &HierarchyPath<K>,
        recurse: bool,
    ) -> Result<bool, HierarchyError<K>> {
        let node = self.find_node(path)?;
        if !recurse && node.has_child_nodes() {
            log::debug!("Keeping node at {path:?} with child nodes");
            return Ok(false);
        }
        let (parent_segments, Some(child_segment)) = path.parent_child_segments() else {
            let removed = !self.root_node.is_vacant();
            self.root_node.clear();
            return Ok(removed);
        };
        let parent_node = descend_mut(&mut self.root_node, parent_segments, path)?;
        Ok(parent_node.remove_child_node(child_segment).is_some())
    }

    /// Cursor on the node at `path`.
    ///
    /// # Errors
    ///
    /// Fails with [`HierarchyError::NodeNotFound`] if the node doesn't
    /// exist.
    pub fn traverse(
        &self,
        path: &HierarchyPath<K>,
    ) -> Result<MutableTraverser<'_, K, V>, HierarchyError<K>> {
        Traverser::new(&self.root_node).descendant_at(path)
    }

    /// Cursor on the node at `path`, creating all missing nodes.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`Self::traverse()`], although all nodes
    /// along `path` exist after creating them.
    pub fn traverse_or_create(
        &mut self,
        path: &HierarchyPath<K>,
    ) -> Result<MutableTraverser<'_, K, V>, HierarchyError<K>> {
        self.find_or_create_node(path);
        self.traverse(path)
    }

    /// Number of nodes that hold a value.
    #[must_use]
    pub fn values_count(&self) -> usize {
        Traverser::new(&self.root_node)
            .descendants_or_self(TraversalOrder::default(), None)
            .filter(Traverser::has_value)
            .count()
    }
}

impl<K, V> fmt::Debug for MutableHierarchy<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MutableHierarchy")
            .field("root_node", &self.root_node)
            .field("prune_on_remove", &self.prune_on_remove)
            .field("default_value", &self.default_value.is_some())
            .finish()
    }
}

impl<K, V> Hierarchy<K, V> for MutableHierarchy<K, V>
where
    K: PathSegment,
    V: Clone + PartialEq,
{
    type Node<'a> = &'a MutableNode<K, V> where Self: 'a;

    fn set(&mut self, path: &HierarchyPath<K>, value: V) -> Result<(), HierarchyError<K>> {
        Self::set(self, path, value);
        Ok(())
    }

    fn add(&mut self, path: &HierarchyPath<K>, value: V) -> Result<(), HierarchyError<K>> {
        Self::add(self, path, value)
    }

    fn try_get_value(&self, path: &HierarchyPath<K>) -> Option<V> {
        Self::try_get_value(self, path).cloned()
    }

    fn remove(
        &mut self,
        path: &HierarchyPath<K>,
        max_depth: Option<usize>,
    ) -> Result<bool, HierarchyError<K>> {
        Self::remove(self, path, max_depth)
    }

    fn remove_node(
        &mut self,
        path: &HierarchyPath<K>,
        recurse: bool,
    ) -> Result<bool, HierarchyError<K>> {
        Self::remove_node(self, path, recurse)
    }

    fn traverse(
        &self,
        path: &HierarchyPath<K>,
    ) -> Result<MutableTraverser<'_, K, V>, HierarchyError<K>> {
        Self::traverse(self, path)
    }
}
