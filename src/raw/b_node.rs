use core::borrow::Borrow;

use smallvec::SmallVec;

use super::handle::Handle;
use crate::compare::Comparator;

/// Minimum degree used by [`BTree::new`](crate::BTree::new).
pub(crate) const DEFAULT_MIN_DEGREE: usize = 6;

// Inline room for a full node plus the one extra key that triggers a split.
const INLINE_KEYS: usize = 2 * DEFAULT_MIN_DEGREE;
const INLINE_CHILDREN: usize = INLINE_KEYS + 1;

pub(crate) type Keys<K> = SmallVec<[K; INLINE_KEYS]>;
pub(crate) type Values<V> = SmallVec<[V; INLINE_KEYS]>;
pub(crate) type Children = SmallVec<[Handle; INLINE_CHILDREN]>;

/// Multi-way node. A node with no children is a leaf.
///
/// `keys` and `values` are parallel; an internal node holds one more child
/// than it holds keys, and child `i` brackets the keys between `keys[i - 1]`
/// and `keys[i]`.
#[derive(Clone)]
pub(crate) struct BNode<K, V> {
    pub(crate) keys: Keys<K>,
    pub(crate) values: Values<V>,
    pub(crate) children: Children,
}

/// Result of searching for a key in a node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SearchResult {
    /// Key was found at the given index.
    Found(usize),
    /// Key was not found; index is the child to descend into, or the insertion point in a leaf.
    NotFound(usize),
}

impl<K, V> BNode<K, V> {
    pub(crate) fn new_leaf() -> Self {
        Self {
            keys: SmallVec::new(),
            values: SmallVec::new(),
            children: SmallVec::new(),
        }
    }

    /// Creates a root holding one separator between two existing children.
    pub(crate) fn new_root(key: K, value: V, left: Handle, right: Handle) -> Self {
        let mut root = Self::new_leaf();
        root.keys.push(key);
        root.values.push(value);
        root.children.push(left);
        root.children.push(right);
        root
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    #[inline]
    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> Handle {
        self.children[index]
    }

    #[inline]
    pub(crate) fn search<Q, C>(&self, key: &Q, cmp: &C) -> SearchResult
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        match self.keys.binary_search_by(|k| cmp.compare(k.borrow(), key)) {
            Ok(idx) => SearchResult::Found(idx),
            Err(idx) => SearchResult::NotFound(idx),
        }
    }

    /// Inserts an entry at `index`, and for internal nodes the child to its right.
    pub(crate) fn insert(&mut self, index: usize, key: K, value: V, right_child: Option<Handle>) {
        self.keys.insert(index, key);
        self.values.insert(index, value);
        if let Some(child) = right_child {
            self.children.insert(index + 1, child);
        }
    }

    /// Replaces the entry at `index`, returning the old one.
    pub(crate) fn replace(&mut self, index: usize, key: K, value: V) -> (K, V) {
        (
            core::mem::replace(&mut self.keys[index], key),
            core::mem::replace(&mut self.values[index], value),
        )
    }

    /// Removes the last entry and, for internal nodes, the last child.
    pub(crate) fn pop_back(&mut self) -> Option<(K, V, Option<Handle>)> {
        let key = self.keys.pop()?;
        let value = self.values.pop()?;
        Some((key, value, self.children.pop()))
    }

    /// Removes the first entry and, for internal nodes, the first child.
    pub(crate) fn pop_front(&mut self) -> Option<(K, V, Option<Handle>)> {
        if self.keys.is_empty() {
            return None;
        }

        let key = self.keys.remove(0);
        let value = self.values.remove(0);
        let child = (!self.children.is_empty()).then(|| self.children.remove(0));
        Some((key, value, child))
    }

    pub(crate) fn push_back(&mut self, key: K, value: V, child: Option<Handle>) {
        self.keys.push(key);
        self.values.push(value);
        if let Some(child) = child {
            self.children.push(child);
        }
    }

    pub(crate) fn push_front(&mut self, key: K, value: V, child: Option<Handle>) {
        self.keys.insert(0, key);
        self.values.insert(0, value);
        if let Some(child) = child {
            self.children.insert(0, child);
        }
    }

    /// Splits an overflowing node around `keys[at]`.
    ///
    /// `self` keeps `keys[..at]` and `children[..=at]`; the median entry and
    /// the new right sibling are returned.
    pub(crate) fn split(&mut self, at: usize) -> (K, V, BNode<K, V>) {
        let mut right = BNode::new_leaf();
        right.keys = self.keys.drain(at + 1..).collect();
        right.values = self.values.drain(at + 1..).collect();
        if !self.is_leaf() {
            right.children = self.children.drain(at + 1..).collect();
        }

        let median_key = self.keys.pop().expect("`BNode::split()` - node has no median!");
        let median_value = self.values.pop().expect("`BNode::split()` - node has no median!");
        (median_key, median_value, right)
    }

    /// Appends the separator and every entry and child of `right`.
    pub(crate) fn merge_with_right(&mut self, separator_key: K, separator_value: V, mut right: BNode<K, V>) {
        self.keys.push(separator_key);
        self.values.push(separator_value);
        self.keys.append(&mut right.keys);
        self.values.append(&mut right.values);
        self.children.append(&mut right.children);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::compare::Natural;

    fn leaf_of(keys: &[u32]) -> BNode<u32, u32> {
        let mut node = BNode::new_leaf();
        for &key in keys {
            node.push_back(key, key * 10, None);
        }
        node
    }

    #[test]
    fn search_reports_hits_and_gaps() {
        let node = leaf_of(&[10, 20, 30]);
        assert_eq!(node.search(&20, &Natural), SearchResult::Found(1));
        assert_eq!(node.search(&5, &Natural), SearchResult::NotFound(0));
        assert_eq!(node.search(&25, &Natural), SearchResult::NotFound(2));
        assert_eq!(node.search(&99, &Natural), SearchResult::NotFound(3));
    }

    #[test]
    fn leaf_split_moves_median_up() {
        let mut left = leaf_of(&[1, 2, 3, 4]);
        let (key, value, right) = left.split(2);

        assert_eq!(left.keys.as_slice(), &[1, 2]);
        assert_eq!((key, value), (3, 30));
        assert_eq!(right.keys.as_slice(), &[4]);
        assert_eq!(right.values.as_slice(), &[40]);
        assert!(right.is_leaf());
    }

    #[test]
    fn internal_split_divides_children() {
        let mut node = leaf_of(&[1, 2, 3, 4]);
        node.children = (0..5).map(Handle::from_index).collect();
        let (_, _, right) = node.split(2);

        assert_eq!(node.children.len(), 3);
        assert_eq!(right.children.as_slice(), &[Handle::from_index(3), Handle::from_index(4)]);
    }

    #[test]
    fn merge_restores_split() {
        let mut left = leaf_of(&[1, 2, 3, 4, 5]);
        let (key, value, right) = left.split(2);
        left.merge_with_right(key, value, right);
        assert_eq!(left.keys.as_slice(), &[1, 2, 3, 4, 5]);
        assert_eq!(left.values.as_slice(), &[10, 20, 30, 40, 50]);
    }

    #[test]
    fn front_and_back_moves() {
        let mut node = leaf_of(&[2, 3]);
        node.push_front(1, 10, None);
        assert_eq!(node.pop_back(), Some((3, 30, None)));
        assert_eq!(node.pop_front(), Some((1, 10, None)));
        assert_eq!(node.key_count(), 1);
        assert_eq!(node.replace(0, 7, 70), (2, 20));
        assert_eq!(node.pop_front(), Some((7, 70, None)));
        assert_eq!(node.pop_front(), None);
        assert_eq!(node.pop_back(), None);
    }
}
