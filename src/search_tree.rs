use core::borrow::Borrow;
use core::fmt;
use core::ops::Index;

use crate::balance::{Avl, Balance, RedBlack, Splay, Unbalanced};
use crate::compare::{Comparator, Natural};
use crate::error::TreeError;
use crate::raw::RawSearchTree;

mod capacity;
mod inspect;
mod traverse;

pub use traverse::{IntoIter, Iter, Keys, TraversalOrder, Traverse, Values};

/// A binary search tree without rebalancing.
pub type BinarySearchTree<K, V, C = Natural> = SearchTree<K, V, Unbalanced, C>;

/// A height-balanced binary search tree.
///
/// Sibling subtrees differ in height by at most one, which bounds the height
/// by roughly `1.44 log2(n)`.
pub type AvlTree<K, V, C = Natural> = SearchTree<K, V, Avl, C>;

/// A red-black binary search tree.
///
/// Root-to-leaf paths differ in length by at most a factor of two.
pub type RedBlackTree<K, V, C = Natural> = SearchTree<K, V, RedBlack, C>;

/// A self-adjusting binary search tree.
///
/// [`SplayTree::search`] and every insertion or removal rotate the touched
/// node to the root, so recently used keys are cheap to reach again.
pub type SplayTree<K, V, C = Natural> = SearchTree<K, V, Splay, C>;

/// An ordered map based on a [binary search tree].
///
/// Keys are ordered by the comparator `C`, which defaults to [`Natural`] (the
/// key type's [`Ord`]). The strategy `B` decides how the tree keeps its shape
/// after each edit; the aliases [`BinarySearchTree`], [`AvlTree`],
/// [`RedBlackTree`] and [`SplayTree`] name the four available strategies.
///
/// Iterators obtained from functions such as [`SearchTree::iter`],
/// [`SearchTree::into_iter`], [`SearchTree::values`], or [`SearchTree::keys`]
/// produce their items in key order. [`SearchTree::traverse`] additionally
/// walks the tree in pre-order, post-order or level order.
///
/// It is a logic error for a key to be modified in such a way that the key's
/// ordering relative to any other key, as determined by the comparator,
/// changes while it is in the map. The behavior resulting from such a logic
/// error is not specified, but will be encapsulated to the `SearchTree` that
/// observed the logic error and not result in undefined behavior.
///
/// # Examples
///
/// ```
/// use balanced_tree::RedBlackTree;
///
/// // type inference lets us omit an explicit type signature (which
/// // would be `RedBlackTree<&str, &str>` in this example).
/// let mut movie_reviews = RedBlackTree::new();
///
/// // review some movies.
/// movie_reviews.insert("Office Space",       "Deals with real issues in the workplace.");
/// movie_reviews.insert("Pulp Fiction",       "Masterpiece.");
/// movie_reviews.insert("The Godfather",      "Very enjoyable.");
/// movie_reviews.insert("The Blues Brothers", "Eye lyked it a lot.");
///
/// // check for a specific one.
/// if !movie_reviews.contains_key("Les Miserables") {
///     println!("We've got {} reviews, but Les Miserables ain't one.",
///              movie_reviews.len());
/// }
///
/// // oops, this review has a lot of spelling mistakes, let's delete it.
/// movie_reviews.remove("The Blues Brothers");
///
/// // look up the values associated with some keys.
/// let to_find = ["Up!", "Office Space"];
/// for movie in &to_find {
///     match movie_reviews.get(movie) {
///        Some(review) => println!("{movie}: {review}"),
///        None => println!("{movie} is unreviewed.")
///     }
/// }
///
/// // Look up the value for a key (will panic if the key is not found).
/// println!("Movie review: {}", movie_reviews["Office Space"]);
///
/// // iterate over everything.
/// for (movie, review) in &movie_reviews {
///     println!("{movie}: \"{review}\"");
/// }
///
/// // the tree is still a valid red-black tree.
/// assert_eq!(movie_reviews.check_invariants(), Ok(()));
/// ```
///
/// A tree with a known list of items can be initialized from an array:
///
/// ```
/// use balanced_tree::AvlTree;
///
/// let solar_distance = AvlTree::from([
///     ("Mercury", 0.4),
///     ("Venus", 0.7),
///     ("Earth", 1.0),
///     ("Mars", 1.5),
/// ]);
/// assert_eq!(solar_distance.height(), Some(2));
/// ```
///
/// A comparator replaces the key's own ordering:
///
/// ```
/// use balanced_tree::{Natural, Reversed, SplayTree};
///
/// let mut countdown = SplayTree::with_comparator(Reversed(Natural));
/// countdown.extend([(1, "liftoff"), (3, "three"), (2, "two")]);
/// assert_eq!(countdown.keys().copied().collect::<Vec<_>>(), [3, 2, 1]);
/// ```
///
/// [binary search tree]: https://en.wikipedia.org/wiki/Binary_search_tree
pub struct SearchTree<K, V, B: Balance, C = Natural> {
    raw: RawSearchTree<K, V, B, C>,
}

impl<K, V, B: Balance> SearchTree<K, V, B> {
    /// Makes a new, empty tree ordered by the keys' [`Ord`] implementation.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Complexity
    ///
    /// O(1)
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    ///
    /// // entries can now be inserted into the empty tree
    /// tree.insert(1, "a");
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparator(Natural)
    }
}

impl<K, V, B: Balance, C> SearchTree<K, V, B, C> {
    /// Makes a new, empty tree ordered by `cmp`.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::BinarySearchTree;
    ///
    /// let mut by_length = BinarySearchTree::with_comparator(|a: &&str, b: &&str| a.len().cmp(&b.len()));
    /// by_length.insert("three", 3);
    /// by_length.insert("one", 1);
    /// // "two" has the same length as "one", so it replaces the value.
    /// assert_eq!(by_length.insert("two", 2), Some(1));
    /// assert_eq!(by_length.get(&"six"), Some(&2));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn with_comparator(cmp: C) -> Self {
        SearchTree {
            raw: RawSearchTree::new(cmp),
        }
    }

    /// Returns the comparator that orders the keys.
    #[must_use]
    pub const fn comparator(&self) -> &C {
        self.raw.comparator()
    }

    /// Clears the tree, removing all elements.
    ///
    /// # Complexity
    ///
    /// O(n)
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::RedBlackTree;
    ///
    /// let mut a = RedBlackTree::new();
    /// a.insert(1, "a");
    /// a.clear();
    /// assert!(a.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.raw.base_mut().clear();
    }

    /// Returns the number of elements in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::AvlTree;
    ///
    /// let mut a = AvlTree::new();
    /// assert_eq!(a.len(), 0);
    /// a.insert(1, "a");
    /// assert_eq!(a.len(), 1);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.base().len()
    }

    /// Returns `true` if the tree contains no elements.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.base().is_empty()
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the tree's key type, but the
    /// comparator must order the borrowed form the same way as the key type.
    ///
    /// Lookups through `get` never reshape the tree, not even a
    /// [`SplayTree`]; use [`SearchTree::search`] for a self-adjusting lookup.
    ///
    /// # Complexity
    ///
    /// O(height)
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// tree.insert(1, "a");
    /// assert_eq!(tree.get(&1), Some(&"a"));
    /// assert_eq!(tree.get(&2), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.get_key_value(key).map(|(_, value)| value)
    }

    /// Returns the key-value pair corresponding to the supplied key.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// tree.insert(1, "a");
    /// assert_eq!(tree.get_key_value(&1), Some((&1, &"a")));
    /// assert_eq!(tree.get_key_value(&2), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(height)
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let handle = self.raw.find(key)?;
        let node = self.raw.base().node(handle);
        Some((&node.key, &node.value))
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// tree.insert(1, "a");
    /// if let Some(x) = tree.get_mut(&1) {
    ///     *x = "b";
    /// }
    /// assert_eq!(tree[&1], "b");
    /// ```
    ///
    /// # Complexity
    ///
    /// O(height)
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let handle = self.raw.find(key)?;
        Some(&mut self.raw.base_mut().node_mut(handle).value)
    }

    /// Returns `true` if the tree contains a value for the specified key.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::SplayTree;
    ///
    /// let mut tree = SplayTree::new();
    /// tree.insert(1, "a");
    /// assert!(tree.contains_key(&1));
    /// assert!(!tree.contains_key(&2));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(height)
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.raw.find(key).is_some()
    }

    /// Returns the value for `key`, or [`TreeError::KeyNotFound`].
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::KeyNotFound`] if the tree holds no entry for `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::{AvlTree, TreeError};
    ///
    /// let tree = AvlTree::from([(1, "a")]);
    /// assert_eq!(tree.lookup(&1), Ok(&"a"));
    /// assert_eq!(tree.lookup(&2), Err(TreeError::KeyNotFound));
    /// ```
    pub fn lookup<Q>(&self, key: &Q) -> Result<&V, TreeError>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.get(key).ok_or(TreeError::KeyNotFound)
    }

    /// Looks up `key` and lets the balance strategy react to the access.
    ///
    /// For a [`SplayTree`] the found node, or the last node visited on a
    /// miss, is rotated to the root. The other strategies leave the shape
    /// untouched, so for them this is [`SearchTree::get_key_value`] with a
    /// mutable value.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::SplayTree;
    ///
    /// let mut tree = SplayTree::from([(1, "a"), (2, "b"), (3, "c")]);
    /// if let Some((_, value)) = tree.search(&1) {
    ///     *value = "z";
    /// }
    /// assert_eq!(tree.root_key_value(), Some((&1, &"z")));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(height); amortized O(log n) for a [`SplayTree`].
    pub fn search<Q>(&mut self, key: &Q) -> Option<(&K, &mut V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let handle = self.raw.search(key)?;
        let node = self.raw.base_mut().node_mut(handle);
        Some((&node.key, &mut node.value))
    }

    /// Inserts a key-value pair into the tree.
    ///
    /// If the tree did not have this key present, `None` is returned.
    ///
    /// If the tree did have this key present, the value is updated, and the old
    /// value is returned. The key is not updated, though, and the tree's shape
    /// only changes for a [`SplayTree`], which splays the updated node.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// assert_eq!(tree.insert(37, "a"), None);
    /// assert_eq!(tree.is_empty(), false);
    ///
    /// tree.insert(37, "b");
    /// assert_eq!(tree.insert(37, "c"), Some("b"));
    /// assert_eq!(tree[&37], "c");
    /// ```
    ///
    /// # Complexity
    ///
    /// O(height)
    pub fn insert(&mut self, key: K, value: V) -> Option<V>
    where
        C: Comparator<K>,
    {
        self.raw.insert(key, value).1
    }

    /// Inserts a key-value pair and returns a mutable reference to the stored
    /// value, whether or not the key was already present.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::AvlTree;
    ///
    /// let mut counts = AvlTree::new();
    /// *counts.upsert("apple", 0) += 2;
    /// assert_eq!(counts["apple"], 2);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(height)
    pub fn upsert(&mut self, key: K, value: V) -> &mut V
    where
        C: Comparator<K>,
    {
        let (handle, _) = self.raw.insert(key, value);
        &mut self.raw.base_mut().node_mut(handle).value
    }

    /// Removes a key from the tree, returning the value at the key if the key
    /// was previously in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// tree.insert(1, "a");
    /// assert_eq!(tree.remove(&1), Some("a"));
    /// assert_eq!(tree.remove(&1), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(height)
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the tree, returning the stored key and value if the
    /// key was previously in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::new();
    /// tree.insert(1, "a");
    /// assert_eq!(tree.remove_entry(&1), Some((1, "a")));
    /// assert_eq!(tree.remove_entry(&1), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(height)
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.raw.remove_entry(key)
    }

    /// Removes a key from the tree, returning its value.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::KeyNotFound`] and leaves the tree untouched if
    /// `key` is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::{SplayTree, TreeError};
    ///
    /// let mut tree = SplayTree::from([(1, "a")]);
    /// assert_eq!(tree.try_remove(&1), Ok("a"));
    /// assert_eq!(tree.try_remove(&1), Err(TreeError::KeyNotFound));
    /// ```
    pub fn try_remove<Q>(&mut self, key: &Q) -> Result<V, TreeError>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.remove(key).ok_or(TreeError::KeyNotFound)
    }

    /// Returns the first key-value pair in the tree.
    /// The key in this pair is the minimum key in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::AvlTree;
    ///
    /// let mut tree = AvlTree::new();
    /// assert_eq!(tree.first_key_value(), None);
    /// tree.insert(1, "b");
    /// tree.insert(2, "a");
    /// assert_eq!(tree.first_key_value(), Some((&1, &"b")));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(height)
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        let node = self.raw.base().node(self.raw.base().first()?);
        Some((&node.key, &node.value))
    }

    /// Returns the last key-value pair in the tree.
    /// The key in this pair is the maximum key in the tree.
    ///
    /// # Complexity
    ///
    /// O(height)
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        let node = self.raw.base().node(self.raw.base().last()?);
        Some((&node.key, &node.value))
    }

    /// Removes and returns the first element in the tree.
    /// The key of this element is the minimum key that was in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::RedBlackTree;
    ///
    /// let mut tree = RedBlackTree::from([(1, "a"), (2, "b")]);
    /// while let Some((key, _val)) = tree.pop_first() {
    ///     assert!(tree.iter().all(|(k, _v)| *k > key));
    /// }
    /// assert!(tree.is_empty());
    /// ```
    ///
    /// # Complexity
    ///
    /// O(height)
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let handle = self.raw.base().first()?;
        Some(self.raw.remove_handle(handle))
    }

    /// Removes and returns the last element in the tree.
    /// The key of this element is the maximum key that was in the tree.
    ///
    /// # Complexity
    ///
    /// O(height)
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let handle = self.raw.base().last()?;
        Some(self.raw.remove_handle(handle))
    }

    /// Verifies every structural invariant of the tree.
    ///
    /// Checks parent/child links and the element count, that an in-order
    /// walk yields strictly increasing keys under the comparator, and then
    /// the balance strategy's own rule (heights for [`AvlTree`], colors and
    /// black height for [`RedBlackTree`]).
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvariantViolation`] describing the first broken
    /// invariant found.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn check_invariants(&self) -> Result<(), TreeError>
    where
        C: Comparator<K>,
    {
        self.raw.check_invariants()
    }
}

impl<K: Clone, V: Clone, B: Balance, C: Clone> Clone for SearchTree<K, V, B, C> {
    fn clone(&self) -> Self {
        SearchTree {
            raw: self.raw.clone(),
        }
    }
}

impl<K: PartialEq, V: PartialEq, B: Balance, C> PartialEq for SearchTree<K, V, B, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<K: Eq, V: Eq, B: Balance, C> Eq for SearchTree<K, V, B, C> {}

impl<K: fmt::Debug, V: fmt::Debug, B: Balance, C> fmt::Debug for SearchTree<K, V, B, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, B: Balance, C: Default> Default for SearchTree<K, V, B, C> {
    fn default() -> Self {
        SearchTree::with_comparator(C::default())
    }
}

impl<K, V, B: Balance, C: Comparator<K> + Default> FromIterator<(K, V)> for SearchTree<K, V, B, C> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut tree = SearchTree::default();
        tree.extend(iter);
        tree
    }
}

impl<K, V, B: Balance, C: Comparator<K>> Extend<(K, V)> for SearchTree<K, V, B, C> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K: Copy, V: Copy, B: Balance, C: Comparator<K>> Extend<(&'a K, &'a V)> for SearchTree<K, V, B, C> {
    fn extend<T: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: T) {
        for (&k, &v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K, V, B: Balance, C> IntoIterator for &'a SearchTree<K, V, B, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, B>;

    fn into_iter(self) -> Iter<'a, K, V, B> {
        self.iter()
    }
}

impl<K, V, B: Balance, C> IntoIterator for SearchTree<K, V, B, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Gets an owning iterator over the entries of the tree, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::AvlTree;
    ///
    /// let tree = AvlTree::from([(2, "b"), (1, "a")]);
    /// let mut iter = tree.into_iter();
    /// assert_eq!(iter.next(), Some((1, "a")));
    /// assert_eq!(iter.next_back(), Some((2, "b")));
    /// ```
    fn into_iter(mut self) -> IntoIter<K, V> {
        IntoIter::new(self.raw.base_mut().drain_to_vec())
    }
}

impl<K, Q, V, B, C> Index<&Q> for SearchTree<K, V, B, C>
where
    K: Borrow<Q>,
    Q: ?Sized,
    B: Balance,
    C: Comparator<Q>,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the tree.
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Ord, V, B: Balance, const N: usize> From<[(K, V); N]> for SearchTree<K, V, B> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}
