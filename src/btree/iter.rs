use alloc::vec::{self, Vec};
use core::fmt;
use core::iter::FusedIterator;

use smallvec::SmallVec;

use super::BTree;
use crate::raw::{Arena, BNode, Handle};

/// Nodes on the path to the next entry, with a key index into each.
type Stack = SmallVec<[(Handle, usize); 16]>;

/// An iterator over the entries of a `BTree`, in key order.
///
/// This `struct` is created by the [`iter`] method on [`BTree`]. See its
/// documentation for more.
///
/// [`iter`]: BTree::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    nodes: &'a Arena<BNode<K, V>>,
    /// Each entry holds the index of the next key to yield from the front.
    front: Stack,
    /// Each entry holds the number of keys not yet yielded from the back.
    back: Stack,
    remaining: usize,
}

/// An iterator over the keys of a `BTree`.
///
/// This `struct` is created by the [`keys`] method on [`BTree`].
///
/// [`keys`]: BTree::keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    pub(super) inner: Iter<'a, K, V>,
}

/// An iterator over the values of a `BTree`.
///
/// This `struct` is created by the [`values`] method on [`BTree`].
///
/// [`values`]: BTree::values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    pub(super) inner: Iter<'a, K, V>,
}

/// An owning iterator over the entries of a `BTree`, sorted by key.
///
/// This `struct` is created by the [`into_iter`] method on [`BTree`]
/// (provided by the [`IntoIterator`] trait).
///
/// [`into_iter`]: IntoIterator::into_iter
pub struct IntoIter<K, V> {
    inner: vec::IntoIter<(K, V)>,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(super) fn new(nodes: &'a Arena<BNode<K, V>>, root: Option<Handle>, len: usize) -> Self {
        let mut iter = Iter {
            nodes,
            front: SmallVec::new(),
            back: SmallVec::new(),
            remaining: len,
        };
        if let Some(root) = root {
            iter.descend_front(root);
            iter.descend_back(root);
        }
        iter
    }

    fn descend_front(&mut self, mut handle: Handle) {
        loop {
            self.front.push((handle, 0));
            let node = self.nodes.get(handle);
            if node.is_leaf() {
                return;
            }
            handle = node.child(0);
        }
    }

    fn descend_back(&mut self, mut handle: Handle) {
        loop {
            let node = self.nodes.get(handle);
            self.back.push((handle, node.key_count()));
            if node.is_leaf() {
                return;
            }
            handle = node.child(node.key_count());
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let nodes = self.nodes;
        loop {
            let (handle, idx) = self.front.last_mut()?;
            let node = nodes.get(*handle);
            if *idx == node.key_count() {
                self.front.pop();
                continue;
            }

            let at = *idx;
            *idx += 1;
            if !node.is_leaf() {
                self.descend_front(node.child(at + 1));
            }
            self.remaining -= 1;
            return Some((&node.keys[at], &node.values[at]));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let nodes = self.nodes;
        loop {
            let (handle, idx) = self.back.last_mut()?;
            let node = nodes.get(*handle);
            if *idx == 0 {
                self.back.pop();
                continue;
            }

            *idx -= 1;
            let at = *idx;
            if !node.is_leaf() {
                self.descend_back(node.child(at));
            }
            self.remaining -= 1;
            return Some((&node.keys[at], &node.values[at]));
        }
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter {
            nodes: self.nodes,
            front: self.front.clone(),
            back: self.back.clone(),
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V: fmt::Debug> fmt::Debug for Values<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K, V> IntoIter<K, V> {
    pub(super) fn new(entries: Vec<(K, V)>) -> Self {
        IntoIter {
            inner: entries.into_iter(),
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoIter").field("len", &self.inner.len()).finish()
    }
}

impl<K, V> Default for IntoIter<K, V> {
    /// Creates an empty `btree::IntoIter`.
    ///
    /// ```
    /// # use balanced_tree::btree;
    /// let iter: btree::IntoIter<u8, u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        IntoIter::new(Vec::new())
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_tree_yields_nothing() {
        let tree: BTree<u32, u32> = BTree::with_min_degree(2);
        let mut iter = tree.iter();
        assert_eq!(iter.len(), 0);
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn both_ends_meet_without_overlap() {
        let mut tree = BTree::with_min_degree(2);
        for key in 0..20u32 {
            tree.insert(key, key * 10);
        }
        assert!(tree.height().is_some_and(|height| height >= 2));

        let mut iter = tree.iter();
        let mut seen = Vec::new();
        while let Some((front, _)) = iter.next() {
            seen.push(*front);
            if let Some((back, _)) = iter.next_back() {
                seen.push(*back);
            }
        }
        seen.sort_unstable();
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn iter_matches_sorted_input(
            keys in prop::collection::btree_set(0..1000u32, 0..200),
            degree in 2..5usize,
            split in 0..200usize,
        ) {
            let mut tree = BTree::with_min_degree(degree);
            tree.extend(keys.iter().map(|&k| (k, k)));
            let expected: Vec<u32> = keys.iter().copied().collect();

            let forward: Vec<u32> = tree.keys().copied().collect();
            prop_assert_eq!(&forward, &expected);

            let mut backward: Vec<u32> = tree.keys().rev().copied().collect();
            backward.reverse();
            prop_assert_eq!(&backward, &expected);

            let split = split.min(expected.len());
            let mut iter = tree.keys();
            let mut mixed: Vec<u32> = iter.by_ref().take(split).copied().collect();
            let mut tail: Vec<u32> = iter.rev().copied().collect();
            tail.reverse();
            mixed.extend(tail);
            prop_assert_eq!(&mixed, &expected);
        }
    }
}
