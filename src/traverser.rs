// SPDX-FileCopyrightText: The im-hierarchy authors
// SPDX-License-Identifier: MPL-2.0

use std::{collections::VecDeque, sync::Arc};

use crate::{HierarchyError, HierarchyPath, MutableNode, Node, PathSegment};

/// Read-only view of a node for navigation.
///
/// Implemented by the node handles of both storage disciplines.
pub trait TraversableNode: Clone {
    type Segment: PathSegment;
    type Value;

    #[must_use]
    fn segment(&self) -> &Self::Segment;

    #[must_use]
    fn value(&self) -> Option<&Self::Value>;

    #[must_use]
    fn has_child_nodes(&self) -> bool;

    /// Direct children in insertion order.
    #[must_use]
    fn child_nodes(&self) -> Box<dyn Iterator<Item = Self> + '_>;

    #[must_use]
    fn child_node(&self, segment: &Self::Segment) -> Option<Self>;

    /// Identity of the underlying node instance.
    #[must_use]
    fn is_same_node(&self, other: &Self) -> bool;
}

impl<K, V> TraversableNode for Arc<Node<K, V>>
where
    K: PathSegment,
    V: Clone,
{
    type Segment = K;
    type Value = V;

    fn segment(&self) -> &K {
        Node::segment(self)
    }

    fn value(&self) -> Option<&V> {
        Node::try_get_value(self)
    }

    fn has_child_nodes(&self) -> bool {
        Node::has_child_nodes(self)
    }

    fn child_nodes(&self) -> Box<dyn Iterator<Item = Self> + '_> {
        Box::new(Node::child_nodes(self).cloned())
    }

    fn child_node(&self, segment: &K) -> Option<Self> {
        Node::child_node(self, segment).cloned()
    }

    fn is_same_node(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<K, V> TraversableNode for &MutableNode<K, V>
where
    K: PathSegment,
{
    type Segment = K;
    type Value = V;

    fn segment(&self) -> &K {
        MutableNode::segment(self)
    }

    fn value(&self) -> Option<&V> {
        MutableNode::try_get_value(self)
    }

    fn has_child_nodes(&self) -> bool {
        MutableNode::has_child_nodes(self)
    }

    fn child_nodes(&self) -> Box<dyn Iterator<Item = Self> + '_> {
        Box::new(MutableNode::child_nodes(*self))
    }

    fn child_node(&self, segment: &K) -> Option<Self> {
        MutableNode::child_node(*self, segment)
    }

    fn is_same_node(&self, other: &Self) -> bool {
        std::ptr::eq(*self, *other)
    }
}

/// Visiting order of [`Traverser::descendants()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, derive_more::Display)]
pub enum TraversalOrder {
    #[default]
    #[display(fmt = "breadth-first")]
    BreadthFirst,
    #[display(fmt = "depth-first")]
    DepthFirst,
}

/// Cursor on a node that knows the chain of its ancestors.
///
/// The path of the node is not stored. It is computed on demand by
/// following the parent links up to the root.
///
/// Two traversers are equal if they refer to the same node instance.
#[derive(Debug, Clone)]
pub struct Traverser<N> {
    node: N,
    parent: Option<Arc<Traverser<N>>>,
}

pub type ImmutableTraverser<K, V> = Traverser<Arc<Node<K, V>>>;

pub type MutableTraverser<'a, K, V> = Traverser<&'a MutableNode<K, V>>;

impl<N> Traverser<N>
where
    N: TraversableNode,
{
    /// Start at a node without a parent, i.e. the root node.
    #[must_use]
    pub const fn new(node: N) -> Self {
        Self { node, parent: None }
    }

    fn new_child(parent: &Arc<Self>, node: N) -> Self {
        Self {
            node,
            parent: Some(Arc::clone(parent)),
        }
    }

    #[must_use]
    pub const fn node(&self) -> &N {
        &self.node
    }

    #[must_use]
    pub fn segment(&self) -> &N::Segment {
        self.node.segment()
    }

    /// The absolute path of the node.
    ///
    /// Computed by walking up to the root on every invocation.
    #[must_use]
    pub fn path(&self) -> HierarchyPath<N::Segment> {
        let mut segments = std::iter::once(self)
            .chain(self.ancestors())
            .filter(|traverser| traverser.has_parent_node())
            .map(|traverser| traverser.segment().clone())
            .collect::<Vec<_>>();
        segments.reverse();
        HierarchyPath::from(segments)
    }

    /// Number of ancestors.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.ancestors().count()
    }

    #[must_use]
    pub fn has_value(&self) -> bool {
        self.node.value().is_some()
    }

    #[must_use]
    pub fn value(&self) -> Option<&N::Value> {
        self.node.value()
    }

    #[must_use]
    pub fn has_child_nodes(&self) -> bool {
        self.node.has_child_nodes()
    }

    /// Cursors on all direct children, parented to this cursor.
    pub fn child_nodes(&self) -> impl Iterator<Item = Self> + '_ {
        let parent = Arc::new(self.clone());
        self.node
            .child_nodes()
            .map(move |child| Self::new_child(&parent, child))
    }

    #[must_use]
    pub fn child_node(&self, segment: &N::Segment) -> Option<Self> {
        let child = self.node.child_node(segment)?;
        Some(Self::new_child(&Arc::new(self.clone()), child))
    }

    /// Descend along a path relative to this node.
    ///
    /// # Errors
    ///
    /// Fails with [`HierarchyError::NodeNotFound`] on the first segment
    /// that does not resolve to a child.
    pub fn descendant_at(
        &self,
        path: &HierarchyPath<N::Segment>,
    ) -> Result<Self, HierarchyError<N::Segment>> {
        let mut traverser = self.clone();
        for segment in path.segments() {
            traverser = traverser
                .child_node(segment)
                .ok_or_else(|| HierarchyError::NodeNotFound {
                    path: path.clone(),
                    missing_segment: segment.clone(),
                })?;
        }
        Ok(traverser)
    }

    #[must_use]
    pub const fn has_parent_node(&self) -> bool {
        self.parent.is_some()
    }

    #[must_use]
    pub fn parent_node(&self) -> Option<&Self> {
        self.parent.as_deref()
    }

    /// All ancestors from the immediate parent up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = &Self> + '_ {
        std::iter::successors(self.parent_node(), |traverser| traverser.parent_node())
    }

    /// All descendants, excluding this node.
    ///
    /// Children are at depth 1. Only nodes up to `max_depth` are visited,
    /// `None` means unbounded.
    #[must_use]
    pub fn descendants(&self, order: TraversalOrder, max_depth: Option<usize>) -> Descendants<N> {
        let mut pending = VecDeque::new();
        if max_depth.is_none_or(|max_depth| max_depth > 0) {
            let children = self.child_nodes().map(|child| (child, 1));
            match order {
                TraversalOrder::BreadthFirst => pending.extend(children),
                TraversalOrder::DepthFirst => {
                    let mut children = children.collect::<Vec<_>>();
                    children.reverse();
                    pending.extend(children);
                }
            }
        }
        Descendants {
            pending,
            order,
            max_depth,
        }
    }

    /// This node followed by [`Self::descendants()`].
    pub fn descendants_or_self(
        &self,
        order: TraversalOrder,
        max_depth: Option<usize>,
    ) -> impl Iterator<Item = Self> {
        std::iter::once(self.clone()).chain(self.descendants(order, max_depth))
    }

    /// Paths and values of all nodes in the subtree that hold a value.
    ///
    /// Visited in depth-first order, starting with this node.
    pub fn values(&self) -> impl Iterator<Item = (HierarchyPath<N::Segment>, N::Value)>
    where
        N::Value: Clone,
    {
        self.descendants_or_self(TraversalOrder::DepthFirst, None)
            .filter_map(|traverser| {
                let value = traverser.value()?.clone();
                Some((traverser.path(), value))
            })
    }
}

impl<N> PartialEq for Traverser<N>
where
    N: TraversableNode,
{
    fn eq(&self, other: &Self) -> bool {
        self.node.is_same_node(&other.node)
    }
}

impl<N> Eq for Traverser<N> where N: TraversableNode {}

/// Lazy iterator over the descendants of a [`Traverser`].
#[derive(Debug)]
pub struct Descendants<N> {
    pending: VecDeque<(Traverser<N>, usize)>,
    order: TraversalOrder,
    max_depth: Option<usize>,
}

impl<N> Iterator for Descendants<N>
where
    N: TraversableNode,
{
    type Item = Traverser<N>;

    fn next(&mut self) -> Option<Self::Item> {
        let (traverser, depth) = match self.order {
            TraversalOrder::BreadthFirst => self.pending.pop_front(),
            TraversalOrder::DepthFirst => self.pending.pop_back(),
        }?;
        if self.max_depth.is_none_or(|max_depth| depth < max_depth) {
            let children = traverser.child_nodes().map(|child| (child, depth + 1));
            match self.order {
                TraversalOrder::BreadthFirst => self.pending.extend(children),
                TraversalOrder::DepthFirst => {
                    let mut children = children.collect::<Vec<_>>();
                    children.reverse();
                    self.pending.extend(children);
                }
            }
        }
        Some(traverser)
    }
}
