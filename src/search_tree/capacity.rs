use super::SearchTree;
use crate::balance::Balance;
use crate::compare::Natural;
use crate::raw::RawSearchTree;

impl<K, V, B: Balance> SearchTree<K, V, B> {
    /// Creates an empty tree with room for at least `capacity` nodes before
    /// the node arena reallocates.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::RedBlackTree;
    ///
    /// let tree: RedBlackTree<i32, i32> = RedBlackTree::with_capacity(32);
    /// assert!(tree.is_empty());
    /// assert!(tree.capacity() >= 32);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(capacity) for memory allocation.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        SearchTree {
            raw: RawSearchTree::with_capacity(capacity, Natural),
        }
    }
}

impl<K, V, B: Balance, C> SearchTree<K, V, B, C> {
    /// Returns the number of nodes the tree can hold without reallocating.
    ///
    /// Slots freed by removals are reused before the arena grows.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::AvlTree;
    ///
    /// let mut tree = AvlTree::with_capacity(4);
    /// let capacity = tree.capacity();
    /// tree.insert(1, ());
    /// tree.remove(&1);
    /// tree.insert(2, ());
    /// assert_eq!(tree.capacity(), capacity);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.base().capacity()
    }
}
