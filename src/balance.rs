//! Rebalancing strategies for [`SearchTree`](crate::SearchTree).
//!
//! A strategy is a zero-sized marker type that picks the per-node metadata
//! and the hooks the shared search core runs after each structural edit:
//!
//! | Strategy | Metadata | Invariant restored |
//! |---|---|---|
//! | [`Unbalanced`] | none | search order only |
//! | [`Avl`] | subtree height | `|height(left) - height(right)| <= 1` |
//! | [`RedBlack`] | [`Color`] | red-black rules and uniform black height |
//! | [`Splay`] | none | last accessed node is the root |
//!
//! The trait is sealed; the four strategies above are the only implementors.

mod avl;
mod red_black;
mod splay;

use core::fmt::Debug;

pub use avl::Avl;
pub use red_black::{Color, RedBlack};
pub use splay::Splay;

use crate::error::TreeError;
use crate::raw::{Handle, RawBinaryTree, Removal};

mod sealed {
    #[allow(unreachable_pub)]
    pub trait Sealed {}
}

/// Post-edit hooks that keep a binary search tree in shape.
///
/// Every hook runs after the structural edit has completed, so the tree is
/// always a valid search tree on entry.
#[allow(private_interfaces)]
pub trait Balance: sealed::Sealed + Sized {
    /// Per-node bookkeeping.
    type Meta: Copy + Debug + PartialEq;

    #[doc(hidden)]
    fn leaf_meta() -> Self::Meta;

    /// Recomputes metadata derived from `node`'s children.
    #[doc(hidden)]
    fn refresh<K, V>(_tree: &mut RawBinaryTree<K, V, Self>, _node: Handle) {}

    /// Runs after `node` was linked in as a new leaf.
    #[doc(hidden)]
    fn after_insert<K, V>(tree: &mut RawBinaryTree<K, V, Self>, node: Handle);

    /// Runs after a node was spliced out.
    #[doc(hidden)]
    fn after_remove<K, V>(tree: &mut RawBinaryTree<K, V, Self>, removal: Removal<Self::Meta>);

    /// Runs after a lookup through `search` reached `node`.
    #[doc(hidden)]
    fn after_access<K, V>(_tree: &mut RawBinaryTree<K, V, Self>, _node: Handle) {}

    /// Verifies the strategy's own invariant.
    #[doc(hidden)]
    fn check<K, V>(tree: &RawBinaryTree<K, V, Self>) -> Result<(), TreeError>;
}

/// Plain binary search tree: no metadata, no rebalancing.
///
/// Height depends entirely on insertion order; sorted input degenerates into
/// a list.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Unbalanced;

impl sealed::Sealed for Unbalanced {}

#[allow(private_interfaces)]
impl Balance for Unbalanced {
    type Meta = ();

    fn leaf_meta() {}

    fn after_insert<K, V>(_tree: &mut RawBinaryTree<K, V, Self>, _node: Handle) {}

    fn after_remove<K, V>(_tree: &mut RawBinaryTree<K, V, Self>, _removal: Removal<()>) {}

    fn check<K, V>(_tree: &RawBinaryTree<K, V, Self>) -> Result<(), TreeError> {
        Ok(())
    }
}
