use alloc::vec;

use tracing::trace;

use super::{Balance, sealed};
use crate::error::{TreeError, ensure};
use crate::raw::{Handle, RawBinaryTree, Removal, Side};

/// Node color of a [`RedBlackTree`](crate::RedBlackTree).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Color {
    Red,
    Black,
}

/// Red-black strategy.
///
/// The root is black, no red node has a red child, and every path from a node
/// down to an absent child crosses the same number of black nodes. Absent
/// children count as black.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RedBlack;

impl sealed::Sealed for RedBlack {}

type Tree<K, V> = RawBinaryTree<K, V, RedBlack>;

fn is_red<K, V>(tree: &Tree<K, V>, node: Option<Handle>) -> bool {
    node.is_some_and(|handle| tree.meta(handle) == Color::Red)
}

fn is_black<K, V>(tree: &Tree<K, V>, node: Option<Handle>) -> bool {
    !is_red(tree, node)
}

/// Resolves a red `node` whose parent may also be red.
fn solve_double_red<K, V>(tree: &mut Tree<K, V>, mut node: Handle) {
    loop {
        let Some((parent, node_side)) = tree.parent_link(node) else {
            tree.set_meta(node, Color::Black);
            return;
        };
        if tree.meta(parent) == Color::Black {
            return;
        }

        // A red parent is never the root, so the grandparent exists.
        let (grandparent, parent_side) =
            tree.parent_link(parent).expect("`RedBlack::solve_double_red()` - red parent is the root!");
        let uncle = tree.sibling(parent);

        if is_black(tree, uncle) {
            // The median of node, parent and grandparent becomes a black
            // subroot with two red children.
            trace!(?node, "double red, black uncle");
            let subroot = if node_side == parent_side { parent } else { node };
            tree.set_meta(subroot, Color::Black);
            tree.set_meta(grandparent, Color::Red);
            tree.restructure(node);
            return;
        }

        trace!(?node, "double red, red uncle");
        tree.set_meta(parent, Color::Black);
        if let Some(uncle) = uncle {
            tree.set_meta(uncle, Color::Black);
        }
        tree.set_meta(grandparent, Color::Red);
        node = grandparent;
    }
}

/// Resolves a black-height deficit on `side` of `parent`.
fn solve_double_black<K, V>(tree: &mut Tree<K, V>, mut parent: Handle, mut side: Side) {
    loop {
        let sibling = tree
            .child(parent, side.opposite())
            .expect("`RedBlack::solve_double_black()` - deficit side has no sibling!");

        if tree.meta(sibling) == Color::Red {
            // Turn the red sibling into the grandparent, giving `parent` a
            // black sibling, then retry.
            trace!(?parent, "double black, red sibling");
            tree.set_meta(sibling, Color::Black);
            tree.set_meta(parent, Color::Red);
            let nephew = tree
                .child(sibling, side.opposite())
                .expect("`RedBlack::solve_double_black()` - red sibling has no children!");
            tree.restructure(nephew);
            continue;
        }

        let sibling_node = tree.node(sibling);
        let red_nephew = [sibling_node.left, sibling_node.right].into_iter().flatten().find(|&n| is_red(tree, Some(n)));

        if let Some(nephew) = red_nephew {
            trace!(?parent, "double black, red nephew");
            let color = tree.meta(parent);
            let subroot = tree.restructure(nephew);
            for child in [tree.child(subroot, Side::Left), tree.child(subroot, Side::Right)].into_iter().flatten() {
                tree.set_meta(child, Color::Black);
            }
            tree.set_meta(subroot, color);
            return;
        }

        tree.set_meta(sibling, Color::Red);
        if tree.meta(parent) == Color::Red {
            trace!(?parent, "double black, red parent");
            tree.set_meta(parent, Color::Black);
            return;
        }

        trace!(?parent, "double black, propagate");
        match tree.parent_link(parent) {
            Some((grandparent, parent_side)) => {
                parent = grandparent;
                side = parent_side;
            }
            None => return,
        }
    }
}

#[allow(private_interfaces)]
impl Balance for RedBlack {
    type Meta = Color;

    fn leaf_meta() -> Color {
        Color::Red
    }

    fn after_insert<K, V>(tree: &mut RawBinaryTree<K, V, Self>, node: Handle) {
        solve_double_red(tree, node);
    }

    fn after_remove<K, V>(tree: &mut RawBinaryTree<K, V, Self>, removal: Removal<Color>) {
        let (Some(parent), Some(side)) = (removal.parent, removal.side) else {
            if let Some(root) = tree.root() {
                tree.set_meta(root, Color::Black);
            }
            return;
        };

        if removal.meta == Color::Red {
            return;
        }
        if let Some(replacement) = removal.replacement.filter(|&r| tree.meta(r) == Color::Red) {
            tree.set_meta(replacement, Color::Black);
            return;
        }
        solve_double_black(tree, parent, side);
    }

    fn check<K, V>(tree: &RawBinaryTree<K, V, Self>) -> Result<(), TreeError> {
        let Some(root) = tree.root() else {
            return Ok(());
        };
        ensure!(tree.meta(root) == Color::Black, "root {root:?} is red");

        // Depth-first walk carrying the number of black nodes from the root
        // down to and including the current node.
        let mut black_height = None;
        let mut pending = vec![(root, 1usize)];
        while let Some((node, blacks)) = pending.pop() {
            let red = tree.meta(node) == Color::Red;
            for child in [tree.child(node, Side::Left), tree.child(node, Side::Right)] {
                match child {
                    Some(child) => {
                        let child_red = tree.meta(child) == Color::Red;
                        ensure!(!(red && child_red), "red node {node:?} has red child {child:?}");
                        pending.push((child, blacks + usize::from(!child_red)));
                    }
                    None => {
                        let expected = *black_height.get_or_insert(blacks);
                        ensure!(
                            blacks == expected,
                            "path through {node:?} has black height {blacks}, expected {expected}"
                        );
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::compare::Natural;
    use crate::raw::RawSearchTree;
    use proptest::prelude::*;

    type Search = RawSearchTree<u32, (), RedBlack, Natural>;

    fn color_of(tree: &Search, key: u32) -> Option<Color> {
        tree.find(&key).map(|handle| tree.base().meta(handle))
    }

    #[test]
    fn red_uncle_recolors_upward() {
        let mut tree = Search::new(Natural);
        for key in [20, 10, 30, 5] {
            tree.insert(key, ());
        }
        assert_eq!(color_of(&tree, 20), Some(Color::Black));
        assert_eq!(color_of(&tree, 10), Some(Color::Black));
        assert_eq!(color_of(&tree, 30), Some(Color::Black));
        assert_eq!(color_of(&tree, 5), Some(Color::Red));
        assert_eq!(tree.check_invariants(), Ok(()));
    }

    #[test]
    fn black_uncle_restructures() {
        let mut tree = Search::new(Natural);
        for key in [10, 20, 30] {
            tree.insert(key, ());
        }
        let root = tree.base().root().expect("tree is not empty");
        assert_eq!(tree.base().node(root).key, 20);
        assert_eq!(color_of(&tree, 20), Some(Color::Black));
        assert_eq!(color_of(&tree, 10), Some(Color::Red));
        assert_eq!(color_of(&tree, 30), Some(Color::Red));
    }

    #[test]
    fn black_leaf_removal_with_red_sibling() {
        let mut tree = Search::new(Natural);
        for key in 1..=10 {
            tree.insert(key, ());
        }
        assert_eq!(tree.check_invariants(), Ok(()));

        for key in [1, 2, 3, 4] {
            tree.remove_entry(&key);
            assert_eq!(tree.check_invariants(), Ok(()), "after removing {key}");
        }
        assert_eq!(tree.base().len(), 6);
    }

    #[test]
    fn recolored_black_height_is_caught() {
        let mut tree = Search::new(Natural);
        for key in [20, 10, 30, 5] {
            tree.insert(key, ());
        }
        let leaf = tree.find(&5).expect("5 was inserted");
        tree.base_mut().set_meta(leaf, Color::Black);
        assert!(matches!(tree.check_invariants(), Err(TreeError::InvariantViolation(_))));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn red_black_after_every_edit(ops in prop::collection::vec((any::<bool>(), 0..200u32), 0..400)) {
            let mut tree = Search::new(Natural);
            for (insert, key) in ops {
                if insert {
                    tree.insert(key, ());
                } else {
                    tree.remove_entry(&key);
                }
                prop_assert_eq!(tree.check_invariants(), Ok(()));
            }
        }
    }
}
