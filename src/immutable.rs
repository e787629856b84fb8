// SPDX-FileCopyrightText: The im-hierarchy authors
// SPDX-License-Identifier: MPL-2.0

use std::{fmt, sync::Arc};

use parking_lot::Mutex;

use crate::{
    DefaultValue, Hierarchy, HierarchyError, HierarchyPath, ImmutableTraverser, Node, PathSegment,
    TraversalOrder, Traverser,
};

/// Nodes visited while descending from the root, excluding the last one.
type Ancestors<K, V> = Vec<Arc<Node<K, V>>>;

/// A node together with all of its ancestors.
type NodeWithAncestors<K, V> = (Ancestors<K, V>, Arc<Node<K, V>>);

/// The replacement for a node and an additional result.
type Modified<K, V, T> = Result<(Arc<Node<K, V>>, T), HierarchyError<K>>;

/// Hierarchy of immutable, structurally shared nodes.
///
/// Every change creates a new root node. Only the nodes on the path from
/// the root to the modified node are replaced, all other nodes are shared
/// between the old and the new root. Previously obtained roots and
/// traversers are never affected by subsequent changes.
///
/// The current root is guarded by a short critical section. Writers hold
/// it for the duration of a single change, readers only while cloning
/// the root handle.
pub struct ImmutableHierarchy<K, V> {
    root_node: Mutex<Arc<Node<K, V>>>,
    prune_on_remove: bool,
    default_value: Option<DefaultValue<K, V>>,
}

impl<K, V> ImmutableHierarchy<K, V>
where
    K: PathSegment + Default,
    V: Clone,
{
    /// Create an empty hierarchy.
    ///
    /// The root node is identified by the default segment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_root_segment(K::default())
    }
}

impl<K, V> Default for ImmutableHierarchy<K, V>
where
    K: PathSegment + Default,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ImmutableHierarchy<K, V>
where
    K: PathSegment,
    V: Clone,
{
    /// Create an empty hierarchy with a custom root segment.
    #[must_use]
    pub fn with_root_segment(root_segment: K) -> Self {
        Self {
            root_node: Mutex::new(Node::new(root_segment)),
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
    ///
    /// The factory is invoked while holding the write lock and must not
    /// access this hierarchy.
    #[must_use]
    pub fn with_default_value(
        mut self,
        default_value: impl Fn(&HierarchyPath<K>) -> V + Send + Sync + 'static,
    ) -> Self {
        let root_node = self.root_node.get_mut();
        if !root_node.has_value() {
            let value = default_value(&HierarchyPath::root());
            *root_node = Node::with_children(
                root_node.segment().clone(),
                Some(value),
                root_node.child_nodes().cloned(),
            );
        }
        self.default_value = Some(Arc::new(default_value));
        self
    }

    #[must_use]
    pub const fn prune_on_remove(&self) -> bool {
        self.prune_on_remove
    }

    /// The current root node.
    ///
    /// The returned snapshot remains valid and unchanged independent of
    /// subsequent modifications.
    #[must_use]
    pub fn root_node(&self) -> Arc<Node<K, V>> {
        Arc::clone(&*self.root_node.lock())
    }

    /// An independent hierarchy that starts with the current root node.
    #[must_use]
    pub fn snapshot(&self) -> Self {
        Self {
            root_node: Mutex::new(self.root_node()),
            prune_on_remove: self.prune_on_remove,
            default_value: self.default_value.clone(),
        }
    }

    /// Replace the root node while holding the write lock.
    fn modify<T>(
        &self,
        modify_root_node: impl FnOnce(&Arc<Node<K, V>>) -> Modified<K, V, T>,
    ) -> Result<T, HierarchyError<K>> {
        let mut root_node = self.root_node.lock();
        let (new_root_node, result) = modify_root_node(&*root_node)?;
        if Arc::ptr_eq(&*root_node, &new_root_node) {
            log::trace!("Root node unchanged");
        } else {
            log::debug!(
                "Replacing root node {old:p} with {new:p}",
                old = Arc::as_ptr(&*root_node),
                new = Arc::as_ptr(&new_root_node),
            );
            *root_node = new_root_node;
        }
        Ok(result)
    }

    /// Find the node at `path` and its ancestors.
    fn find_node(
        root_node: &Arc<Node<K, V>>,
        path: &HierarchyPath<K>,
    ) -> Result<NodeWithAncestors<K, V>, HierarchyError<K>> {
        let mut ancestors = Vec::with_capacity(path.depth());
        let mut node = Arc::clone(root_node);
        for segment in path.segments() {
            let child_node = node
                .child_node(segment)
                .map(Arc::clone)
                .ok_or_else(|| HierarchyError::NodeNotFound {
                    path: path.clone(),
                    missing_segment: segment.clone(),
                })?;
            ancestors.push(node);
            node = child_node;
        }
        Ok((ancestors, node))
    }

    /// Find the node at `path` and its ancestors, creating missing nodes.
    ///
    /// The returned ancestors already contain the newly created children.
    fn find_or_create_node(
        &self,
        root_node: &Arc<Node<K, V>>,
        path: &HierarchyPath<K>,
    ) -> NodeWithAncestors<K, V> {
        let mut ancestors = Vec::with_capacity(path.depth());
        let mut node = Arc::clone(root_node);
        for (index, segment) in path.segments().iter().enumerate() {
            let existing_child_node = node.child_node(segment).map(Arc::clone);
            let child_node = if let Some(child_node) = existing_child_node {
                child_node
            } else {
                let is_target = index + 1 == path.depth();
                let child_node = match &self.default_value {
                    Some(default_value) if !is_target => {
                        let child_path: HierarchyPath<K> =
                            path.segments()[..=index].iter().cloned().collect();
                        Node::with_value(segment.clone(), default_value(&child_path))
                    }
                    _ => Node::new(segment.clone()),
                };
                log::debug!(
                    "Adding new child node {segment:?} at depth {depth}",
                    depth = index + 1
                );
                node = node.add_child_node(Arc::clone(&child_node));
                child_node
            };
            ancestors.push(node);
            node = child_node;
        }
        (ancestors, node)
    }

    /// Reconnect a modified node with all its ancestors up to the root.
    ///
    /// If `detach` is `true` the modified node is removed from its parent
    /// instead.
    fn rebuild_ancestors(
        mut ancestors: Ancestors<K, V>,
        modified_node: Arc<Node<K, V>>,
        detach: bool,
    ) -> Result<Arc<Node<K, V>>, HierarchyError<K>> {
        let mut node = modified_node;
        if detach {
            if let Some(parent_node) = ancestors.pop() {
                node = parent_node.remove_child_node(node.segment())?;
            }
        }
        ancestors
            .into_iter()
            .rev()
            .try_fold(node, |child_node, parent_node| {
                parent_node.set_child_node(child_node)
            })
    }

    /// Remove the values of `node` and of `levels - 1` levels of its
    /// descendants.
    ///
    /// Descendants are processed before their parents. With `prune`
    /// enabled vacant descendants are detached.
    fn unset_values(
        node: &Arc<Node<K, V>>,
        levels: usize,
        prune: bool,
    ) -> Modified<K, V, bool> {
        debug_assert!(levels > 0);
        let mut new_node = Arc::clone(node);
        let mut removed = false;
        if levels > 1 {
            for child_node in node.child_nodes() {
                let (new_child_node, child_removed) =
                    Self::unset_values(child_node, levels - 1, prune)?;
                if !child_removed {
                    continue;
                }
                removed = true;
                new_node = if prune && new_child_node.is_vacant() {
                    new_node.remove_child_node(new_child_node.segment())?
                } else {
                    new_node.set_child_node(new_child_node)?
                };
            }
        }
        if new_node.has_value() {
            removed = true;
            new_node = new_node.unset_value(prune);
        }
        Ok((new_node, removed))
    }

    /// Create or overwrite the value at `path`.
    ///
    /// The root node stays the same if the node already holds an equal
    /// value.
    ///
    /// # Errors
    ///
    /// Fails with [`HierarchyError::InvalidStructuralOperation`] if the
    /// nodes along `path` are inconsistent.
    pub fn set(&self, path: &HierarchyPath<K>, value: V) -> Result<(), HierarchyError<K>>
    where
        V: PartialEq,
    {
        self.modify(|root_node| {
            let (ancestors, node) = self.find_or_create_node(root_node, path);
            let node = node.set_value(value);
            Ok((Self::rebuild_ancestors(ancestors, node, false)?, ()))
        })
    }

    /// Create the value at `path`.
    ///
    /// Adding a value that equals the existing value is a no-op.
    ///
    /// # Errors
    ///
    /// Fails with [`HierarchyError::AlreadyHasValue`] if a different value
    /// is present.
    pub fn add(&self, path: &HierarchyPath<K>, value: V) -> Result<(), HierarchyError<K>>
    where
        V: PartialEq,
    {
        self.modify(|root_node| {
            let (ancestors, node) = self.find_or_create_node(root_node, path);
            if let Some(existing_value) = node.try_get_value() {
                if *existing_value == value {
                    log::trace!("Node at {path:?} already has this value");
                    return Ok((Arc::clone(root_node), ()));
                }
                return Err(HierarchyError::AlreadyHasValue { path: path.clone() });
            }
            let node = node.set_value(value);
            Ok((Self::rebuild_ancestors(ancestors, node, false)?, ()))
        })
    }

    /// The value at `path`.
    #[must_use]
    pub fn try_get_value(&self, path: &HierarchyPath<K>) -> Option<V> {
        let root_node = self.root_node();
        let (_, node) = Self::find_node(&root_node, path).ok()?;
        node.try_get_value().cloned()
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
        &self,
        path: &HierarchyPath<K>,
        max_depth: Option<usize>,
    ) -> Result<bool, HierarchyError<K>> {
        let levels = max_depth.unwrap_or(1);
        let prune = self.prune_on_remove;
        self.modify(|root_node| {
            let (ancestors, node) = Self::find_node(root_node, path)?;
            if levels == 0 {
                return Ok((Arc::clone(root_node), false));
            }
            let (new_node, removed) = Self::unset_values(&node, levels, prune)?;
            if !removed {
                return Ok((Arc::clone(root_node), false));
            }
            let detach = prune && new_node.is_vacant() && !ancestors.is_empty();
            Ok((Self::rebuild_ancestors(ancestors, new_node, detach)?, true))
        })
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
        &self,
        path: &HierarchyPath<K>,
        recurse: bool,
    ) -> Result<bool, HierarchyError<K>> {
        self.modify(|root_node| {
            let (mut ancestors, node) = Self::find_node(root_node, path)?;
            if !recurse && node.has_child_nodes() {
                log::debug!("Keeping node at {path:?} with child nodes");
                return Ok((Arc::clone(root_node), false));
            }
            let Some(parent_node) = ancestors.pop() else {
                let new_root_node = node.clear();
                let removed = !Arc::ptr_eq(&new_root_node, &node);
                return Ok((new_root_node, removed));
            };
            let parent_node = parent_node.remove_child_node(node.segment())?;
            Ok((Self::rebuild_ancestors(ancestors, parent_node, false)?, true))
        })
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
    ) -> Result<ImmutableTraverser<K, V>, HierarchyError<K>> {
        Traverser::new(self.root_node()).descendant_at(path)
    }

    /// Cursor on the node at `path`, creating all missing nodes.
    ///
    /// # Errors
    ///
    /// Fails with [`HierarchyError::InvalidStructuralOperation`] if the
    /// nodes along `path` are inconsistent.
    pub fn traverse_or_create(
        &self,
        path: &HierarchyPath<K>,
    ) -> Result<ImmutableTraverser<K, V>, HierarchyError<K>> {
        let root_node = self.modify(|root_node| {
            let (ancestors, node) = self.find_or_create_node(root_node, path);
            let new_root_node = Self::rebuild_ancestors(ancestors, node, false)?;
            Ok((Arc::clone(&new_root_node), new_root_node))
        })?;
        Traverser::new(root_node).descendant_at(path)
    }

    /// Number of nodes that hold a value.
    #[must_use]
    pub fn values_count(&self) -> usize {
        Traverser::new(self.root_node())
            .descendants_or_self(TraversalOrder::default(), None)
            .filter(Traverser::has_value)
            .count()
    }
}

impl<K, V> Clone for ImmutableHierarchy<K, V>
where
    K: PathSegment,
    V: Clone,
{
    fn clone(&self) -> Self {
        self.snapshot()
    }
}

impl<K, V> fmt::Debug for ImmutableHierarchy<K, V>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImmutableHierarchy")
            .field("root_node", &*self.root_node.lock())
            .field("prune_on_remove", &self.prune_on_remove)
            .field("default_value", &self.default_value.is_some())
            .finish()
    }
}

impl<K, V> Hierarchy<K, V> for ImmutableHierarchy<K, V>
where
    K: PathSegment,
    V: Clone + PartialEq,
{
    type Node<'a> = Arc<Node<K, V>> where Self: 'a;

    fn set(&mut self, path: &HierarchyPath<K>, value: V) -> Result<(), HierarchyError<K>> {
        Self::set(self, path, value)
    }

    fn add(&mut self, path: &HierarchyPath<K>, value: V) -> Result<(), HierarchyError<K>> {
        Self::add(self, path, value)
    }

    fn try_get_value(&self, path: &HierarchyPath<K>) -> Option<V> {
        Self::try_get_value(self, path)
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
    ) -> Result<ImmutableTraverser<K, V>, HierarchyError<K>> {
        Self::traverse(self, path)
    }
}
