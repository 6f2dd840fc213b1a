use tracing::trace;

use super::{Balance, sealed};
use crate::error::{TreeError, ensure};
use crate::raw::{Handle, RawBinaryTree, Removal, Side};

/// AVL strategy: every node's subtrees differ in height by at most one.
///
/// Insertion repairs with at most one restructure; removal may restructure at
/// every level on the way back to the root.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Avl;

impl sealed::Sealed for Avl {}

/// Height of an optional subtree; an absent child has height -1.
fn stature<K, V>(tree: &RawBinaryTree<K, V, Avl>, node: Option<Handle>) -> i32 {
    node.map_or(-1, |handle| tree.meta(handle))
}

fn child_statures<K, V>(tree: &RawBinaryTree<K, V, Avl>, node: Handle) -> (i32, i32) {
    let n = tree.node(node);
    (stature(tree, n.left), stature(tree, n.right))
}

fn is_balanced<K, V>(tree: &RawBinaryTree<K, V, Avl>, node: Handle) -> bool {
    let (left, right) = child_statures(tree, node);
    (left - right).abs() <= 1
}

/// The taller child of `node`; ties go to the side `node` itself hangs from.
fn taller_child<K, V>(tree: &RawBinaryTree<K, V, Avl>, node: Handle) -> Handle {
    let (left, right) = child_statures(tree, node);
    let side = match left.cmp(&right) {
        core::cmp::Ordering::Greater => Side::Left,
        core::cmp::Ordering::Less => Side::Right,
        core::cmp::Ordering::Equal => tree.parent_link(node).map_or(Side::Left, |(_, side)| side),
    };
    tree.child(node, side).expect("`Avl::taller_child()` - `node` is a leaf!")
}

/// Restructures the unbalanced `node` about its taller grandchild.
fn rebalance<K, V>(tree: &mut RawBinaryTree<K, V, Avl>, node: Handle) -> Handle {
    let child = taller_child(tree, node);
    let grandchild = taller_child(tree, child);
    trace!(?node, "avl imbalance");
    tree.restructure(grandchild)
}

#[allow(private_interfaces)]
impl Balance for Avl {
    type Meta = i32;

    fn leaf_meta() -> i32 {
        0
    }

    fn refresh<K, V>(tree: &mut RawBinaryTree<K, V, Self>, node: Handle) {
        let (left, right) = child_statures(tree, node);
        tree.set_meta(node, 1 + left.max(right));
    }

    fn after_insert<K, V>(tree: &mut RawBinaryTree<K, V, Self>, node: Handle) {
        let mut cursor = tree.parent(node);
        while let Some(ancestor) = cursor {
            if !is_balanced(tree, ancestor) {
                // The restructured subtree is back to its pre-insert height.
                rebalance(tree, ancestor);
                return;
            }

            let before = tree.meta(ancestor);
            Self::refresh(tree, ancestor);
            if tree.meta(ancestor) == before {
                return;
            }
            cursor = tree.parent(ancestor);
        }
    }

    fn after_remove<K, V>(tree: &mut RawBinaryTree<K, V, Self>, removal: Removal<i32>) {
        let mut cursor = removal.parent;
        while let Some(mut ancestor) = cursor {
            if !is_balanced(tree, ancestor) {
                ancestor = rebalance(tree, ancestor);
            }
            Self::refresh(tree, ancestor);
            cursor = tree.parent(ancestor);
        }
    }

    fn check<K, V>(tree: &RawBinaryTree<K, V, Self>) -> Result<(), TreeError> {
        // Post-order visits children first, so each stored child height has
        // already been verified when its parent is checked.
        let mut cursor = tree.root().map(|root| tree.post_order_first(root));
        while let Some(node) = cursor {
            let (left, right) = child_statures(tree, node);
            let stored = tree.meta(node);
            ensure!(
                stored == 1 + left.max(right),
                "node {node:?} stores height {stored}, children have {left} and {right}"
            );
            ensure!((left - right).abs() <= 1, "node {node:?} has balance factor {}", left - right);
            cursor = tree.post_order_next(node);
        }
        Ok(())
    }
}
