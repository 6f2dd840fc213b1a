use alloc::collections::VecDeque;
use alloc::vec::{self, Vec};
use core::fmt;
use core::iter::FusedIterator;

use super::SearchTree;
use crate::balance::Balance;
use crate::raw::{Handle, RawBinaryTree};

/// The order in which [`SearchTree::traverse`] visits nodes.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum TraversalOrder {
    /// Left subtree, node, right subtree: ascending key order.
    #[default]
    InOrder,
    /// Node, left subtree, right subtree.
    PreOrder,
    /// Left subtree, right subtree, node.
    PostOrder,
    /// Breadth first, each level left to right.
    LevelOrder,
}

/// An iterator over the entries of a `SearchTree`, in key order.
///
/// This `struct` is created by the [`iter`] method on [`SearchTree`]. See its
/// documentation for more.
///
/// [`iter`]: SearchTree::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V, B: Balance> {
    tree: &'a RawBinaryTree<K, V, B>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
}

/// An iterator over the keys of a `SearchTree`.
///
/// This `struct` is created by the [`keys`] method on [`SearchTree`].
///
/// [`keys`]: SearchTree::keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V, B: Balance> {
    inner: Iter<'a, K, V, B>,
}

/// An iterator over the values of a `SearchTree`.
///
/// This `struct` is created by the [`values`] method on [`SearchTree`].
///
/// [`values`]: SearchTree::values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V, B: Balance> {
    inner: Iter<'a, K, V, B>,
}

/// An owning iterator over the entries of a `SearchTree`, sorted by key.
///
/// This `struct` is created by the [`into_iter`] method on [`SearchTree`]
/// (provided by the [`IntoIterator`] trait).
///
/// [`into_iter`]: IntoIterator::into_iter
pub struct IntoIter<K, V> {
    inner: vec::IntoIter<(K, V)>,
}

/// A walk over the entries of a `SearchTree` in a chosen [`TraversalOrder`].
///
/// This `struct` is created by the [`traverse`] method on [`SearchTree`].
/// It is lazy and can be restarted from any point by cloning it.
///
/// [`traverse`]: SearchTree::traverse
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Traverse<'a, K, V, B: Balance> {
    tree: &'a RawBinaryTree<K, V, B>,
    cursor: Cursor,
    remaining: usize,
}

/// Per-order walk state.
#[derive(Clone)]
enum Cursor {
    InOrder(Option<Handle>),
    /// Nodes still to visit; the next one is on top.
    PreOrder(Vec<Handle>),
    PostOrder(Option<Handle>),
    LevelOrder(VecDeque<Handle>),
}

impl<K, V, B: Balance, C> SearchTree<K, V, B, C> {
    /// Gets an iterator over the entries of the tree, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// tree.insert(3, "c");
    /// tree.insert(2, "b");
    /// tree.insert(1, "a");
    ///
    /// let mut iter = tree.iter();
    /// assert_eq!(iter.next(), Some((&1, &"a")));
    /// assert_eq!(iter.next_back(), Some((&3, &"c")));
    /// assert_eq!(iter.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1) to create the iterator; amortized O(1) per step.
    pub fn iter(&self) -> Iter<'_, K, V, B> {
        let tree = self.raw.base();
        Iter {
            tree,
            front: tree.first(),
            back: tree.last(),
            remaining: tree.len(),
        }
    }

    /// Gets an iterator over the keys of the tree, in sorted order.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::AvlTree;
    ///
    /// let tree = AvlTree::from([(2, "b"), (1, "a")]);
    /// let keys: Vec<_> = tree.keys().cloned().collect();
    /// assert_eq!(keys, [1, 2]);
    /// ```
    pub fn keys(&self) -> Keys<'_, K, V, B> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the tree, in order by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::SplayTree;
    ///
    /// let tree = SplayTree::from([(1, "hello"), (2, "goodbye")]);
    /// let values: Vec<&str> = tree.values().cloned().collect();
    /// assert_eq!(values, ["hello", "goodbye"]);
    /// ```
    pub fn values(&self) -> Values<'_, K, V, B> {
        Values { inner: self.iter() }
    }

    /// Walks the entries in the given order without reshaping the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::{AvlTree, TraversalOrder};
    ///
    /// let tree = AvlTree::from([(1, ()), (2, ()), (3, ()), (4, ())]);
    /// let keys = |order| tree.traverse(order).map(|(k, _)| *k).collect::<Vec<_>>();
    ///
    /// assert_eq!(keys(TraversalOrder::InOrder), [1, 2, 3, 4]);
    /// assert_eq!(keys(TraversalOrder::PreOrder), [2, 1, 3, 4]);
    /// assert_eq!(keys(TraversalOrder::PostOrder), [1, 4, 3, 2]);
    /// assert_eq!(keys(TraversalOrder::LevelOrder), [2, 1, 3, 4]);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n) for the whole walk. Pre-order and level-order walks buffer at
    /// most O(n) pending handles.
    pub fn traverse(&self, order: TraversalOrder) -> Traverse<'_, K, V, B> {
        let tree = self.raw.base();
        let root = tree.root();
        let cursor = match order {
            TraversalOrder::InOrder => Cursor::InOrder(tree.first()),
            TraversalOrder::PreOrder => Cursor::PreOrder(root.into_iter().collect()),
            TraversalOrder::PostOrder => Cursor::PostOrder(root.map(|root| tree.post_order_first(root))),
            TraversalOrder::LevelOrder => Cursor::LevelOrder(root.into_iter().collect()),
        };
        Traverse {
            tree,
            cursor,
            remaining: tree.len(),
        }
    }
}

impl<K, V> IntoIter<K, V> {
    pub(crate) fn new(entries: Vec<(K, V)>) -> Self {
        IntoIter {
            inner: entries.into_iter(),
        }
    }
}

impl<'a, K, V, B: Balance> Iterator for Iter<'a, K, V, B> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.front?;
        self.front = self.tree.next(handle);
        self.remaining -= 1;

        let node = self.tree.node(handle);
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, B: Balance> DoubleEndedIterator for Iter<'_, K, V, B> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.back?;
        self.back = self.tree.prev(handle);
        self.remaining -= 1;

        let node = self.tree.node(handle);
        Some((&node.key, &node.value))
    }
}

impl<K, V, B: Balance> ExactSizeIterator for Iter<'_, K, V, B> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V, B: Balance> FusedIterator for Iter<'_, K, V, B> {}

impl<K, V, B: Balance> Clone for Iter<'_, K, V, B> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, B: Balance> fmt::Debug for Iter<'_, K, V, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V, B: Balance> Iterator for Keys<'a, K, V, B> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, B: Balance> DoubleEndedIterator for Keys<'_, K, V, B> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V, B: Balance> ExactSizeIterator for Keys<'_, K, V, B> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, B: Balance> FusedIterator for Keys<'_, K, V, B> {}

impl<K, V, B: Balance> Clone for Keys<'_, K, V, B> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V, B: Balance> fmt::Debug for Keys<'_, K, V, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V, B: Balance> Iterator for Values<'a, K, V, B> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, B: Balance> DoubleEndedIterator for Values<'_, K, V, B> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V, B: Balance> ExactSizeIterator for Values<'_, K, V, B> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, B: Balance> FusedIterator for Values<'_, K, V, B> {}

impl<K, V, B: Balance> Clone for Values<'_, K, V, B> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V: fmt::Debug, B: Balance> fmt::Debug for Values<'_, K, V, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
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
    /// Creates an empty `search_tree::IntoIter`.
    ///
    /// ```
    /// # use balanced_tree::search_tree;
    /// let iter: search_tree::IntoIter<u8, u8> = Default::default();
    /// assert_eq!(iter.len(), 0);
    /// ```
    fn default() -> Self {
        IntoIter::new(Vec::new())
    }
}

impl<'a, K, V, B: Balance> Iterator for Traverse<'a, K, V, B> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let tree = self.tree;
        let handle = match &mut self.cursor {
            Cursor::InOrder(cursor) => {
                let handle = (*cursor)?;
                *cursor = tree.next(handle);
                handle
            }
            Cursor::PreOrder(pending) => {
                let handle = pending.pop()?;
                let node = tree.node(handle);
                pending.extend(node.right);
                pending.extend(node.left);
                handle
            }
            Cursor::PostOrder(cursor) => {
                let handle = (*cursor)?;
                *cursor = tree.post_order_next(handle);
                handle
            }
            Cursor::LevelOrder(pending) => {
                let handle = pending.pop_front()?;
                let node = tree.node(handle);
                pending.extend(node.left);
                pending.extend(node.right);
                handle
            }
        };
        self.remaining -= 1;

        let node = tree.node(handle);
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, B: Balance> ExactSizeIterator for Traverse<'_, K, V, B> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V, B: Balance> FusedIterator for Traverse<'_, K, V, B> {}

impl<K, V, B: Balance> Clone for Traverse<'_, K, V, B> {
    fn clone(&self) -> Self {
        Traverse {
            tree: self.tree,
            cursor: self.cursor.clone(),
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, B: Balance> fmt::Debug for Traverse<'_, K, V, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
