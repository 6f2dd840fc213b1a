use alloc::string::String;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::cmp::Ordering;

use smallvec::SmallVec;
use tracing::{debug, trace};

use super::arena::Arena;
use super::b_node::{BNode, Children, Keys, SearchResult, Values};
use super::handle::Handle;
use crate::compare::Comparator;
use crate::error::TreeError;

/// The multi-way tree backing `BTree`.
///
/// Entries live in every node, not only the leaves. With minimum degree `m`
/// each node holds at most `2m - 1` keys and every node but the root at least
/// `m - 1`.
pub(crate) struct RawBTree<K, V, C> {
    nodes: Arena<BNode<K, V>>,
    root: Option<Handle>,
    len: usize,
    min_degree: usize,
    cmp: C,
}

/// Path element for tracking traversal during mutations.
#[derive(Clone, Copy, Debug)]
struct PathElement {
    /// Handle to the node at this level.
    node: Handle,
    /// Index of the child we descended into.
    child_index: usize,
}

/// Stack of path elements from the root down.
type Path = SmallVec<[PathElement; 16]>;

impl<K: Clone, V: Clone, C: Clone> Clone for RawBTree<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
            len: self.len,
            min_degree: self.min_degree,
            cmp: self.cmp.clone(),
        }
    }
}

impl<K, V, C> RawBTree<K, V, C> {
    pub(crate) fn new(min_degree: usize, cmp: C) -> Self {
        assert!(min_degree >= 2, "`RawBTree::new()` - `min_degree` must be at least 2!");
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
            min_degree,
            cmp,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) const fn min_degree(&self) -> usize {
        self.min_degree
    }

    pub(crate) const fn comparator(&self) -> &C {
        &self.cmp
    }

    const fn max_keys(&self) -> usize {
        2 * self.min_degree - 1
    }

    const fn min_keys(&self) -> usize {
        self.min_degree - 1
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    pub(crate) const fn root(&self) -> Option<Handle> {
        self.root
    }

    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &BNode<K, V> {
        self.nodes.get(handle)
    }

    pub(crate) const fn nodes(&self) -> &Arena<BNode<K, V>> {
        &self.nodes
    }

    /// Number of edges from the root to any leaf, `None` when empty.
    pub(crate) fn height(&self) -> Option<usize> {
        let mut current = self.root?;
        let mut height = 0;
        while !self.node(current).is_leaf() {
            current = self.node(current).child(0);
            height += 1;
        }
        Some(height)
    }

    pub(crate) fn first_key_value(&self) -> Option<(&K, &V)> {
        let mut current = self.root?;
        while !self.node(current).is_leaf() {
            current = self.node(current).child(0);
        }
        let node = self.node(current);
        Some((node.keys.first()?, node.values.first()?))
    }

    pub(crate) fn last_key_value(&self) -> Option<(&K, &V)> {
        let mut current = self.root?;
        while let Some(&last) = self.node(current).children.last() {
            current = last;
        }
        let node = self.node(current);
        Some((node.keys.last()?, node.values.last()?))
    }

    /// Moves every entry out in key order, leaving the tree empty.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        struct Frame<K, V> {
            keys: <Keys<K> as IntoIterator>::IntoIter,
            values: <Values<V> as IntoIterator>::IntoIter,
            children: <Children as IntoIterator>::IntoIter,
        }

        let mut entries = Vec::with_capacity(self.len);
        let Some(root) = self.root.take() else {
            return entries;
        };

        let mut frames: Vec<Frame<K, V>> = Vec::new();
        let mut descend = Some(root);
        loop {
            // Push the left spine below `descend`.
            while let Some(handle) = descend {
                let node = self.nodes.take(handle);
                let mut children = node.children.into_iter();
                descend = children.next();
                frames.push(Frame {
                    keys: node.keys.into_iter(),
                    values: node.values.into_iter(),
                    children,
                });
            }

            let Some(frame) = frames.last_mut() else {
                break;
            };
            match (frame.keys.next(), frame.values.next()) {
                (Some(key), Some(value)) => {
                    entries.push((key, value));
                    descend = frame.children.next();
                }
                _ => {
                    frames.pop();
                }
            }
        }

        self.clear();
        entries
    }
}

impl<K, V, C> RawBTree<K, V, C> {
    /// Locates `key`, returning its node and slot.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<(Handle, usize)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let mut current = self.root?;
        loop {
            let node = self.node(current);
            match node.search(key, &self.cmp) {
                SearchResult::Found(idx) => return Some((current, idx)),
                SearchResult::NotFound(_) if node.is_leaf() => return None,
                SearchResult::NotFound(idx) => current = node.child(idx),
            }
        }
    }

    pub(crate) fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let (handle, idx) = self.search(key)?;
        let node = self.node(handle);
        Some((&node.keys[idx], &node.values[idx]))
    }

    pub(crate) fn get_key_value_mut<Q>(&mut self, key: &Q) -> Option<(&K, &mut V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let (handle, idx) = self.search(key)?;
        let node = self.nodes.get_mut(handle);
        Some((&node.keys[idx], &mut node.values[idx]))
    }

    /// Inserts a key-value pair, returning the old value if the key was present.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V>
    where
        C: Comparator<K>,
    {
        let Some(root) = self.root else {
            let mut leaf = BNode::new_leaf();
            leaf.push_back(key, value, None);
            self.root = Some(self.nodes.alloc(leaf));
            self.len = 1;
            return None;
        };

        // Every comparison happens during this descent, before any edit.
        let mut path: Path = SmallVec::new();
        let mut current = root;
        let idx = loop {
            let node = self.node(current);
            match node.search(&key, &self.cmp) {
                SearchResult::Found(idx) => {
                    let slot = &mut self.nodes.get_mut(current).values[idx];
                    return Some(core::mem::replace(slot, value));
                }
                SearchResult::NotFound(idx) if node.is_leaf() => break idx,
                SearchResult::NotFound(idx) => {
                    path.push(PathElement {
                        node: current,
                        child_index: idx,
                    });
                    current = node.child(idx);
                }
            }
        };

        self.nodes.get_mut(current).insert(idx, key, value, None);
        self.len += 1;
        self.split_and_propagate(current, &mut path);
        None
    }

    /// Splits `current` while it overflows, promoting medians up `path`.
    fn split_and_propagate(&mut self, mut current: Handle, path: &mut Path) {
        let max_keys = self.max_keys();
        while self.node(current).key_count() > max_keys {
            let (median_key, median_value, right) = self.nodes.get_mut(current).split(self.min_degree);
            let right = self.nodes.alloc(right);
            trace!(node = ?current, ?right, "split");

            match path.pop() {
                Some(elem) => {
                    let parent = self.nodes.get_mut(elem.node);
                    parent.insert(elem.child_index, median_key, median_value, Some(right));
                    current = elem.node;
                }
                None => {
                    let root = self.nodes.alloc(BNode::new_root(median_key, median_value, current, right));
                    self.root = Some(root);
                    debug!(height = ?self.height(), "root split");
                    return;
                }
            }
        }
    }

    pub(crate) fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let mut path: Path = SmallVec::new();
        let mut current = self.root?;
        let idx = loop {
            let node = self.node(current);
            match node.search(key, &self.cmp) {
                SearchResult::Found(idx) => break idx,
                SearchResult::NotFound(_) if node.is_leaf() => return None,
                SearchResult::NotFound(idx) => {
                    path.push(PathElement {
                        node: current,
                        child_index: idx,
                    });
                    current = node.child(idx);
                }
            }
        };

        let (removed, leaf) = if self.node(current).is_leaf() {
            let node = self.nodes.get_mut(current);
            ((node.keys.remove(idx), node.values.remove(idx)), current)
        } else {
            // Replace with the in-order predecessor: the rightmost entry of
            // the left subtree, which always sits in a leaf.
            path.push(PathElement {
                node: current,
                child_index: idx,
            });
            let mut leaf = self.node(current).child(idx);
            while !self.node(leaf).is_leaf() {
                let last = self.node(leaf).children.len() - 1;
                path.push(PathElement {
                    node: leaf,
                    child_index: last,
                });
                leaf = self.node(leaf).child(last);
            }

            let (key, value, _) =
                self.nodes.get_mut(leaf).pop_back().expect("`RawBTree::remove_entry()` - leaf is empty!");
            (self.nodes.get_mut(current).replace(idx, key, value), leaf)
        };

        self.len -= 1;
        self.fix_underflow(leaf, &mut path);
        Some(removed)
    }

    pub(crate) fn pop_first(&mut self) -> Option<(K, V)>
    where
        C: Comparator<K>,
        K: Clone,
    {
        let key = self.first_key_value()?.0.clone();
        self.remove_entry(&key)
    }

    pub(crate) fn pop_last(&mut self) -> Option<(K, V)>
    where
        C: Comparator<K>,
        K: Clone,
    {
        let key = self.last_key_value()?.0.clone();
        self.remove_entry(&key)
    }

    /// Restores the minimum key count from `current` up towards the root.
    fn fix_underflow(&mut self, mut current: Handle, path: &mut Path) {
        let min_keys = self.min_keys();
        loop {
            if self.node(current).key_count() >= min_keys {
                return;
            }

            let Some(PathElement {
                node: parent,
                child_index,
            }) = path.pop()
            else {
                self.shrink_root(current);
                return;
            };

            let siblings = &self.node(parent).children;
            let left = child_index.checked_sub(1).map(|i| siblings[i]);
            let right = siblings.get(child_index + 1).copied();

            if let Some(left) = left.filter(|&h| self.node(h).key_count() > min_keys) {
                self.borrow_from_left(current, left, parent, child_index);
                return;
            }
            if let Some(right) = right.filter(|&h| self.node(h).key_count() > min_keys) {
                self.borrow_from_right(current, right, parent, child_index);
                return;
            }

            // Both neighbours are at the minimum; merge and retry one level up.
            match (left, right) {
                (Some(left), _) => self.merge(left, current, parent, child_index - 1),
                (None, Some(right)) => self.merge(current, right, parent, child_index),
                (None, None) => unreachable!("`RawBTree::fix_underflow()` - non-root node has no siblings!"),
            }
            current = parent;
        }
    }

    /// Drops an empty root, promoting its only child if it has one.
    fn shrink_root(&mut self, root: Handle) {
        let node = self.node(root);
        if node.key_count() > 0 {
            return;
        }

        self.root = node.children.first().copied();
        self.nodes.free(root);
        debug!(height = ?self.height(), "root collapsed");
    }

    /// Rotates the left sibling's last entry up into the parent, and the
    /// parent's separator down to the front of `node`.
    fn borrow_from_left(&mut self, node: Handle, left: Handle, parent: Handle, child_index: usize) {
        let (key, value, child) =
            self.nodes.get_mut(left).pop_back().expect("`RawBTree::borrow_from_left()` - sibling is empty!");
        let (key, value) = self.nodes.get_mut(parent).replace(child_index - 1, key, value);
        self.nodes.get_mut(node).push_front(key, value, child);
        trace!(?node, ?left, "borrow from left");
    }

    /// Rotates the right sibling's first entry up into the parent, and the
    /// parent's separator down to the back of `node`.
    fn borrow_from_right(&mut self, node: Handle, right: Handle, parent: Handle, child_index: usize) {
        let (key, value, child) =
            self.nodes.get_mut(right).pop_front().expect("`RawBTree::borrow_from_right()` - sibling is empty!");
        let (key, value) = self.nodes.get_mut(parent).replace(child_index, key, value);
        self.nodes.get_mut(node).push_back(key, value, child);
        trace!(?node, ?right, "borrow from right");
    }

    /// Folds `right` and the separator between them into `left`.
    fn merge(&mut self, left: Handle, right: Handle, parent: Handle, separator_index: usize) {
        let parent_node = self.nodes.get_mut(parent);
        let key = parent_node.keys.remove(separator_index);
        let value = parent_node.values.remove(separator_index);
        let removed = parent_node.children.remove(separator_index + 1);
        debug_assert_eq!(removed, right, "`RawBTree::merge()` - `right` is not the right neighbour!");

        let right_node = self.nodes.take(right);
        self.nodes.get_mut(left).merge_with_right(key, value, right_node);
        trace!(?left, ?right, "merge");
    }

    /// Checks key counts, ordering against separators, child counts, leaf
    /// depth and `len`, collecting every violation found.
    pub(crate) fn check_invariants(&self) -> Result<(), TreeError>
    where
        C: Comparator<K>,
    {
        let Some(root) = self.root else {
            return if self.len == 0 {
                Ok(())
            } else {
                Err(TreeError::InvariantViolation(alloc::format!("empty tree reports len {}", self.len)))
            };
        };

        let mut errors: Vec<String> = Vec::new();
        let mut leaf_depth = None;
        let mut count = 0;
        let mut pending: Vec<(Handle, usize, Option<&K>, Option<&K>)> = alloc::vec![(root, 0, None, None)];

        while let Some((handle, depth, lower, upper)) = pending.pop() {
            let node = self.node(handle);
            let keys = node.key_count();
            count += keys;

            if keys > self.max_keys() {
                errors.push(alloc::format!("{handle:?} holds {keys} keys, max is {}", self.max_keys()));
            }
            if handle != root && keys < self.min_keys() {
                errors.push(alloc::format!("{handle:?} holds {keys} keys, min is {}", self.min_keys()));
            }
            if node.values.len() != keys {
                errors.push(alloc::format!("{handle:?} has {keys} keys but {} values", node.values.len()));
            }
            if node.keys.windows(2).any(|pair| self.cmp.compare(&pair[0], &pair[1]) != Ordering::Less) {
                errors.push(alloc::format!("{handle:?} keys are not strictly increasing"));
            }
            if let (Some(lower), Some(first)) = (lower, node.keys.first())
                && self.cmp.compare(lower, first) != Ordering::Less
            {
                errors.push(alloc::format!("{handle:?} first key is not above its separator"));
            }
            if let (Some(upper), Some(last)) = (upper, node.keys.last())
                && self.cmp.compare(last, upper) != Ordering::Less
            {
                errors.push(alloc::format!("{handle:?} last key is not below its separator"));
            }

            if node.is_leaf() {
                match leaf_depth {
                    None => leaf_depth = Some(depth),
                    Some(expected) if expected != depth => {
                        errors.push(alloc::format!("leaf {handle:?} at depth {depth}, expected {expected}"));
                    }
                    Some(_) => {}
                }
                continue;
            }

            if node.children.len() != keys + 1 {
                errors.push(alloc::format!("{handle:?} has {keys} keys but {} children", node.children.len()));
                continue;
            }
            for (i, &child) in node.children.iter().enumerate() {
                let child_lower = if i == 0 { lower } else { node.keys.get(i - 1) };
                let child_upper = if i == keys { upper } else { node.keys.get(i) };
                pending.push((child, depth + 1, child_lower, child_upper));
            }
        }

        if count != self.len {
            errors.push(alloc::format!("len mismatch: len={}, actual count={count}", self.len));
        }
        if self.nodes.len() != self.reachable_nodes() {
            errors.push(alloc::format!("arena holds {} nodes, {} reachable", self.nodes.len(), self.reachable_nodes()));
        }

        if errors.is_empty() { Ok(()) } else { Err(TreeError::InvariantViolation(errors.join("\n"))) }
    }

    fn reachable_nodes(&self) -> usize {
        let mut reached = 0;
        let mut pending: Vec<Handle> = self.root.into_iter().collect();
        while let Some(handle) = pending.pop() {
            reached += 1;
            pending.extend(self.node(handle).children.iter().copied());
        }
        reached
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::compare::Natural;
    use alloc::collections::BTreeMap;
    use proptest::prelude::*;

    fn tree_of(min_degree: usize, keys: &[i32]) -> RawBTree<i32, i32, Natural> {
        let mut tree = RawBTree::new(min_degree, Natural);
        for &key in keys {
            tree.insert(key, key * 2);
        }
        tree
    }

    fn root_keys(tree: &RawBTree<i32, i32, Natural>) -> Vec<i32> {
        tree.root().map(|root| tree.node(root).keys.to_vec()).unwrap_or_default()
    }

    fn child_keys(tree: &RawBTree<i32, i32, Natural>) -> Vec<Vec<i32>> {
        let root = tree.root().expect("tree is not empty");
        tree.node(root).children.iter().map(|&child| tree.node(child).keys.to_vec()).collect()
    }

    #[test]
    fn fourth_insert_splits_first_leaf() {
        let mut tree = tree_of(2, &[5, 15, 25]);
        assert_eq!(tree.height(), Some(0));
        assert_eq!(root_keys(&tree), [5, 15, 25]);

        tree.insert(35, 70);
        assert_eq!(tree.height(), Some(1));
        assert_eq!(root_keys(&tree), [25]);
        assert_eq!(child_keys(&tree), [alloc::vec![5, 15], alloc::vec![35]]);

        tree.insert(45, 90);
        assert_eq!(root_keys(&tree), [25]);
        assert_eq!(child_keys(&tree), [alloc::vec![5, 15], alloc::vec![35, 45]]);
        assert_eq!(tree.check_invariants(), Ok(()));
    }

    #[test]
    fn insert_existing_key_replaces_value() {
        let mut tree = tree_of(2, &[1, 2, 3, 4, 5]);
        assert_eq!(tree.insert(3, 33), Some(6));
        assert_eq!(tree.get_key_value(&3), Some((&3, &33)));
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn internal_key_is_replaced_by_predecessor() {
        let mut tree = tree_of(2, &[10, 20, 30, 40, 50, 60, 70]);
        let root = root_keys(&tree);
        let separator = root[0];

        assert_eq!(tree.remove_entry(&separator), Some((separator, separator * 2)));
        assert_eq!(tree.get_key_value(&separator), None);
        assert_eq!(tree.len(), 6);
        assert_eq!(tree.check_invariants(), Ok(()));
    }

    #[test]
    fn underflow_borrows_from_sibling() {
        // Root [25], leaves [5, 15] and [35]: removing 35 borrows 15 through the root.
        let mut tree = tree_of(2, &[5, 15, 25, 35]);
        tree.remove_entry(&35);
        assert_eq!(root_keys(&tree), [15]);
        assert_eq!(child_keys(&tree), [alloc::vec![5], alloc::vec![25]]);
        assert_eq!(tree.check_invariants(), Ok(()));
    }

    #[test]
    fn underflow_merges_and_collapses_root() {
        let mut tree = tree_of(2, &[5, 15, 25, 35]);
        tree.remove_entry(&5);
        tree.remove_entry(&35);
        assert_eq!(tree.height(), Some(0));
        assert_eq!(root_keys(&tree), [15, 25]);
        assert_eq!(tree.check_invariants(), Ok(()));
    }

    #[test]
    fn removing_everything_empties_tree() {
        let keys: Vec<i32> = (0..100).collect();
        let mut tree = tree_of(3, &keys);
        for key in keys.iter().rev() {
            assert_eq!(tree.remove_entry(key), Some((*key, key * 2)));
        }
        assert!(tree.is_empty());
        assert_eq!(tree.root(), None);
        assert_eq!(tree.nodes().len(), 0);
        assert_eq!(tree.check_invariants(), Ok(()));
    }

    #[test]
    fn drain_yields_sorted_entries() {
        let mut tree = tree_of(2, &[9, 3, 7, 1, 5, 8, 2, 6, 4, 0]);
        let drained = tree.drain_to_vec();
        let expected: Vec<(i32, i32)> = (0..10).map(|k| (k, k * 2)).collect();
        assert_eq!(drained, expected);
        assert!(tree.is_empty());
    }

    #[test]
    fn corrupted_node_is_reported() {
        let mut tree = tree_of(2, &[1, 2, 3, 4, 5, 6]);
        let root = tree.root().expect("tree is not empty");
        tree.nodes.get_mut(root).keys[0] = 100;
        let Err(TreeError::InvariantViolation(report)) = tree.check_invariants() else {
            panic!("corruption went unnoticed");
        };
        assert!(report.contains("separator") || report.contains("increasing"), "{report}");
    }

    #[test]
    #[should_panic(expected = "`RawBTree::new()` - `min_degree` must be at least 2!")]
    fn degree_one_is_rejected() {
        let _ = RawBTree::<i32, i32, Natural>::new(1, Natural);
    }

    // Test operations enum for property testing
    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        Remove(i32),
        PopFirst,
        PopLast,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            6 => (0i32..1000).prop_map(Op::Insert),
            3 => (0i32..1000).prop_map(Op::Remove),
            1 => Just(Op::PopFirst),
            1 => Just(Op::PopLast),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn invariants_hold_after_every_edit(
            min_degree in 2usize..6,
            ops in prop::collection::vec(op_strategy(), 0..500),
        ) {
            let mut tree: RawBTree<i32, i32, Natural> = RawBTree::new(min_degree, Natural);
            let mut model = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Insert(key) => {
                        prop_assert_eq!(tree.insert(key, key * 2), model.insert(key, key * 2));
                    }
                    Op::Remove(key) => {
                        prop_assert_eq!(tree.remove_entry(&key), model.remove_entry(&key));
                    }
                    Op::PopFirst => {
                        prop_assert_eq!(tree.pop_first(), model.pop_first());
                    }
                    Op::PopLast => {
                        prop_assert_eq!(tree.pop_last(), model.pop_last());
                    }
                }
                prop_assert_eq!(tree.check_invariants(), Ok(()));
                prop_assert_eq!(tree.len(), model.len());
            }

            prop_assert_eq!(tree.first_key_value(), model.first_key_value());
            prop_assert_eq!(tree.last_key_value(), model.last_key_value());
            prop_assert_eq!(tree.drain_to_vec(), model.into_iter().collect::<Vec<_>>());
        }
    }
}
