use core::borrow::Borrow;

use super::SearchTree;
use crate::balance::{Avl, Balance, Color, RedBlack};
use crate::compare::Comparator;

impl<K, V, B: Balance, C> SearchTree<K, V, B, C> {
    /// Returns the key-value pair stored at the root.
    ///
    /// Mostly useful for observing a [`SplayTree`](crate::SplayTree), whose
    /// root is always the most recently accessed node.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::AvlTree;
    ///
    /// let tree = AvlTree::from([(10, 'a'), (20, 'b'), (30, 'c')]);
    /// assert_eq!(tree.root_key_value(), Some((&20, &'b')));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn root_key_value(&self) -> Option<(&K, &V)> {
        let node = self.raw.base().node(self.raw.base().root()?);
        Some((&node.key, &node.value))
    }

    /// Returns the number of edges on the longest path from the root to a
    /// leaf, or `None` for an empty tree. A single node has height 0.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::BinarySearchTree;
    ///
    /// let mut tree = BinarySearchTree::new();
    /// assert_eq!(tree.height(), None);
    /// tree.insert(1, ());
    /// assert_eq!(tree.height(), Some(0));
    /// tree.extend([(2, ()), (3, ())]);
    /// assert_eq!(tree.height(), Some(2));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n)
    #[must_use]
    pub fn height(&self) -> Option<usize> {
        self.raw.base().height()
    }
}

impl<K, V, C> SearchTree<K, V, RedBlack, C> {
    /// Returns the color of the node holding `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::{Color, RedBlackTree};
    ///
    /// let tree = RedBlackTree::from([(20, ()), (10, ()), (30, ())]);
    /// assert_eq!(tree.color_of(&20), Some(Color::Black));
    /// assert_eq!(tree.color_of(&10), Some(Color::Red));
    /// assert_eq!(tree.color_of(&99), None);
    /// ```
    pub fn color_of<Q>(&self, key: &Q) -> Option<Color>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.raw.find(key).map(|handle| self.raw.base().meta(handle))
    }
}

impl<K, V, C> SearchTree<K, V, Avl, C> {
    /// Returns the height of the subtree rooted at the node holding `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::AvlTree;
    ///
    /// let tree = AvlTree::from([(1, ()), (2, ()), (3, ()), (4, ())]);
    /// assert_eq!(tree.height_of(&2), Some(2));
    /// assert_eq!(tree.height_of(&4), Some(0));
    /// ```
    pub fn height_of<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let handle = self.raw.find(key)?;
        usize::try_from(self.raw.base().meta(handle)).ok()
    }
}
