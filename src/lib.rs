// SPDX-FileCopyrightText: The im-hierarchy authors
// SPDX-License-Identifier: MPL-2.0

//! Hierarchical key-value store with persistent and mutable storage.
//!
//! Values are addressed by a [`HierarchyPath`], i.e. a sequence of key
//! segments starting at the root node. Both [`ImmutableHierarchy`] and
//! [`MutableHierarchy`] implement the common [`Hierarchy`] contract.

// Repetitions of module/type names occur frequently when using many
// modules for keeping the size of the source files handy. Often
// types have the same name as their parent module.
#![allow(clippy::module_name_repetitions)]

mod error;
pub use self::error::HierarchyError;

mod hierarchy;
pub use self::hierarchy::{DefaultValue, Hierarchy};

mod immutable;
pub use self::immutable::ImmutableHierarchy;

mod mutable;
pub use self::mutable::MutableHierarchy;

mod mutable_node;
pub use self::mutable_node::MutableNode;

mod node;
pub use self::node::Node;

mod path;
pub use self::path::{HierarchyPath, PathSegment};

mod traverser;
pub use self::traverser::{
    Descendants, ImmutableTraverser, MutableTraverser, TraversableNode, TraversalOrder, Traverser,
};

#[cfg(feature = "im")]
type ChildNodes<T> = im::Vector<T>;

#[cfg(not(feature = "im"))]
type ChildNodes<T> = Vec<T>;
