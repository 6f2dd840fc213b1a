use tracing::trace;

use super::{Balance, sealed};
use crate::error::TreeError;
use crate::raw::{Handle, RawBinaryTree, Removal};

/// Splay strategy: every access rotates the touched node to the root.
///
/// There is no shape invariant; sequences of operations cost amortized
/// O(log n) each. Misses splay the last node visited, and removals splay the
/// parent of the spliced position.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Splay;

impl sealed::Sealed for Splay {}

/// Rotates `node` up until it is the root.
fn splay<K, V>(tree: &mut RawBinaryTree<K, V, Splay>, node: Handle) {
    while let Some((parent, node_side)) = tree.parent_link(node) {
        match tree.parent_link(parent) {
            None => {
                trace!(?node, "zig");
                tree.rotate_at(node);
            }
            Some((_, parent_side)) if parent_side == node_side => {
                trace!(?node, "zig-zig");
                tree.rotate_at(parent);
                tree.rotate_at(node);
            }
            Some(_) => {
                trace!(?node, "zig-zag");
                tree.rotate_at(node);
                tree.rotate_at(node);
            }
        }
    }
}

#[allow(private_interfaces)]
impl Balance for Splay {
    type Meta = ();

    fn leaf_meta() {}

    fn after_insert<K, V>(tree: &mut RawBinaryTree<K, V, Self>, node: Handle) {
        splay(tree, node);
    }

    fn after_remove<K, V>(tree: &mut RawBinaryTree<K, V, Self>, removal: Removal<()>) {
        if let Some(parent) = removal.parent {
            splay(tree, parent);
        }
    }

    fn after_access<K, V>(tree: &mut RawBinaryTree<K, V, Self>, node: Handle) {
        splay(tree, node);
    }

    fn check<K, V>(_tree: &RawBinaryTree<K, V, Self>) -> Result<(), TreeError> {
        Ok(())
    }
}
