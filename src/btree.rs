use core::borrow::Borrow;
use core::fmt;
use core::ops::Index;

use crate::compare::{Comparator, Natural};
use crate::error::TreeError;
use crate::raw::{DEFAULT_MIN_DEGREE, RawBTree};

mod iter;

pub use iter::{IntoIter, Iter, Keys, Values};

/// An ordered map based on a [B-Tree] with a configurable minimum degree.
///
/// With minimum degree `m`, every node holds at most `2m - 1` keys and every
/// node other than the root holds at least `m - 1`. All leaves sit at the same
/// depth. Entries are stored in internal nodes as well as leaves.
///
/// Keys are ordered by the comparator `C`, which defaults to [`Natural`].
///
/// # Examples
///
/// ```
/// use balanced_tree::BTree;
///
/// let mut inventory = BTree::with_min_degree(2);
/// inventory.insert("apples", 3);
/// inventory.insert("pears", 0);
/// inventory.insert("plums", 12);
/// inventory.insert("figs", 7);
///
/// // the fourth key overflowed the root and split it.
/// assert_eq!(inventory.height(), Some(1));
///
/// if let Some(count) = inventory.get_mut("pears") {
///     *count += 5;
/// }
/// assert_eq!(inventory["pears"], 5);
///
/// inventory.remove("apples");
/// assert_eq!(inventory.keys().copied().collect::<Vec<_>>(), ["figs", "pears", "plums"]);
/// assert_eq!(inventory.check_invariants(), Ok(()));
/// ```
///
/// [B-Tree]: https://en.wikipedia.org/wiki/B-tree
pub struct BTree<K, V, C = Natural> {
    raw: RawBTree<K, V, C>,
}

impl<K, V> BTree<K, V> {
    /// Makes a new, empty `BTree` with the default minimum degree.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::BTree;
    ///
    /// let mut tree = BTree::new();
    /// tree.insert(1, "a");
    /// assert_eq!(tree.min_degree(), 6);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn new() -> Self {
        Self::with_min_degree(DEFAULT_MIN_DEGREE)
    }

    /// Makes a new, empty `BTree` whose nodes hold between `min_degree - 1`
    /// and `2 * min_degree - 1` keys.
    ///
    /// # Panics
    ///
    /// Panics if `min_degree` is less than 2.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::BTree;
    ///
    /// let tree: BTree<i32, i32> = BTree::with_min_degree(3);
    /// assert_eq!(tree.min_degree(), 3);
    /// ```
    #[must_use]
    pub fn with_min_degree(min_degree: usize) -> Self {
        BTree {
            raw: RawBTree::new(min_degree, Natural),
        }
    }
}

impl<K, V, C> BTree<K, V, C> {
    /// Makes a new, empty `BTree` ordered by `cmp` with the given minimum
    /// degree.
    ///
    /// # Panics
    ///
    /// Panics if `min_degree` is less than 2.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::{BTree, Natural, Reversed};
    ///
    /// let mut tree = BTree::with_comparator(2, Reversed(Natural));
    /// tree.extend([(1, ()), (2, ()), (3, ())]);
    /// assert_eq!(tree.first_key_value(), Some((&3, &())));
    /// ```
    #[must_use]
    pub fn with_comparator(min_degree: usize, cmp: C) -> Self {
        BTree {
            raw: RawBTree::new(min_degree, cmp),
        }
    }

    /// Returns the minimum degree the tree was built with.
    #[must_use]
    pub const fn min_degree(&self) -> usize {
        self.raw.min_degree()
    }

    /// Returns the comparator that orders the keys.
    #[must_use]
    pub const fn comparator(&self) -> &C {
        self.raw.comparator()
    }

    /// Returns the number of elements in the tree.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no elements.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Clears the tree, removing all elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::BTree;
    ///
    /// let mut a = BTree::new();
    /// a.insert(1, "a");
    /// a.clear();
    /// assert!(a.is_empty());
    /// assert_eq!(a.height(), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the number of edges from the root to any leaf, or `None` for
    /// an empty tree.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn height(&self) -> Option<usize> {
        self.raw.height()
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::BTree;
    ///
    /// let mut tree = BTree::new();
    /// tree.insert(1, "a");
    /// assert_eq!(tree.get(&1), Some(&"a"));
    /// assert_eq!(tree.get(&2), None);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.raw.get_key_value(key).map(|(_, value)| value)
    }

    /// Returns the key-value pair corresponding to the supplied key.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.raw.get_key_value(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.raw.get_key_value_mut(key).map(|(_, value)| value)
    }

    /// Looks up `key`, returning the stored key and a mutable value.
    ///
    /// A B-tree never reshapes on access, so this only differs from
    /// [`BTree::get_key_value`] in the mutable value. It mirrors
    /// [`SearchTree::search`](crate::SearchTree::search) so every tree kind
    /// shares one lookup contract.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn search<Q>(&mut self, key: &Q) -> Option<(&K, &mut V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.raw.get_key_value_mut(key)
    }

    /// Returns `true` if the tree contains a value for the specified key.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.raw.search(key).is_some()
    }

    /// Returns the value for `key`, or [`TreeError::KeyNotFound`].
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::KeyNotFound`] if the tree holds no entry for `key`.
    pub fn lookup<Q>(&self, key: &Q) -> Result<&V, TreeError>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.get(key).ok_or(TreeError::KeyNotFound)
    }

    /// Inserts a key-value pair into the tree.
    ///
    /// If the tree did not have this key present, `None` is returned.
    ///
    /// If the tree did have this key present, the value is updated, and the old
    /// value is returned. The key is not updated, though.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::BTree;
    ///
    /// let mut tree = BTree::new();
    /// assert_eq!(tree.insert(37, "a"), None);
    /// assert_eq!(tree.insert(37, "b"), Some("a"));
    /// assert_eq!(tree[&37], "b");
    /// ```
    ///
    /// # Complexity
    ///
    /// O(m log n) for minimum degree `m`.
    pub fn insert(&mut self, key: K, value: V) -> Option<V>
    where
        C: Comparator<K>,
    {
        self.raw.insert(key, value)
    }

    /// Removes a key from the tree, returning the value at the key if the key
    /// was previously in the tree.
    ///
    /// # Complexity
    ///
    /// O(m log n) for minimum degree `m`.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.raw.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the tree, returning the stored key and value if the
    /// key was previously in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::BTree;
    ///
    /// let mut tree = BTree::new();
    /// tree.insert(1, "a");
    /// assert_eq!(tree.remove_entry(&1), Some((1, "a")));
    /// assert_eq!(tree.remove_entry(&1), None);
    /// ```
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
    pub fn try_remove<Q>(&mut self, key: &Q) -> Result<V, TreeError>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.remove(key).ok_or(TreeError::KeyNotFound)
    }

    /// Returns the first key-value pair in the tree.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.raw.first_key_value()
    }

    /// Returns the last key-value pair in the tree.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.raw.last_key_value()
    }

    /// Removes and returns the first element in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::BTree;
    ///
    /// let mut tree = BTree::from([(1, "a"), (2, "b")]);
    /// assert_eq!(tree.pop_first(), Some((1, "a")));
    /// assert_eq!(tree.pop_first(), Some((2, "b")));
    /// assert_eq!(tree.pop_first(), None);
    /// ```
    pub fn pop_first(&mut self) -> Option<(K, V)>
    where
        K: Clone,
        C: Comparator<K>,
    {
        self.raw.pop_first()
    }

    /// Removes and returns the last element in the tree.
    pub fn pop_last(&mut self) -> Option<(K, V)>
    where
        K: Clone,
        C: Comparator<K>,
    {
        self.raw.pop_last()
    }

    /// Gets an iterator over the entries of the tree, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use balanced_tree::BTree;
    ///
    /// let tree = BTree::from([(3, "c"), (1, "a"), (2, "b")]);
    /// let mut iter = tree.iter();
    /// assert_eq!(iter.next(), Some((&1, &"a")));
    /// assert_eq!(iter.next_back(), Some((&3, &"c")));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(log n) to create the iterator; amortized O(1) per step.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.raw.nodes(), self.raw.root(), self.raw.len())
    }

    /// Gets an iterator over the keys of the tree, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the tree, in order by key.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Verifies every structural invariant of the tree: key counts per node,
    /// child counts, key order within nodes and against separators, uniform
    /// leaf depth, and the element count.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::InvariantViolation`] listing every violation
    /// found, one per line.
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

impl<K: Clone, V: Clone, C: Clone> Clone for BTree<K, V, C> {
    fn clone(&self) -> Self {
        BTree { raw: self.raw.clone() }
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for BTree<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<K: Eq, V: Eq, C> Eq for BTree<K, V, C> {}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for BTree<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C: Default> Default for BTree<K, V, C> {
    fn default() -> Self {
        BTree::with_comparator(DEFAULT_MIN_DEGREE, C::default())
    }
}

impl<K, V, C: Comparator<K> + Default> FromIterator<(K, V)> for BTree<K, V, C> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut tree = BTree::default();
        tree.extend(iter);
        tree
    }
}

impl<K, V, C: Comparator<K>> Extend<(K, V)> for BTree<K, V, C> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K: Copy, V: Copy, C: Comparator<K>> Extend<(&'a K, &'a V)> for BTree<K, V, C> {
    fn extend<T: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: T) {
        for (&k, &v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K, V, C> IntoIterator for &'a BTree<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K, V, C> IntoIterator for BTree<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Gets an owning iterator over the entries of the tree, sorted by key.
    fn into_iter(mut self) -> IntoIter<K, V> {
        IntoIter::new(self.raw.drain_to_vec())
    }
}

impl<K, Q, V, C> Index<&Q> for BTree<K, V, C>
where
    K: Borrow<Q>,
    Q: ?Sized,
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

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for BTree<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::format;
    use alloc::vec::Vec;

    #[test]
    fn search_and_lookup_agree() {
        let mut tree = BTree::from([(1, 10), (2, 20)]);
        if let Some((key, value)) = tree.search(&2) {
            assert_eq!(*key, 2);
            *value += 1;
        }
        assert_eq!(tree.lookup(&2), Ok(&21));
        assert_eq!(tree.lookup(&3), Err(TreeError::KeyNotFound));
        assert!(tree.search(&3).is_none());
    }

    #[test]
    fn try_remove_leaves_tree_untouched_on_miss() {
        let mut tree = BTree::with_min_degree(2);
        tree.extend((0..10).map(|k| (k, k)));
        let before: Vec<_> = tree.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(tree.try_remove(&42), Err(TreeError::KeyNotFound));
        let after: Vec<_> = tree.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(before, after);
        assert_eq!(tree.try_remove(&4), Ok(4));
        assert_eq!(tree.check_invariants(), Ok(()));
    }

    #[test]
    fn pops_from_both_ends() {
        let mut tree = BTree::with_min_degree(2);
        tree.extend((0..30).map(|k| (k, ())));
        for expected in 0..15 {
            assert_eq!(tree.pop_first(), Some((expected, ())));
            assert_eq!(tree.pop_last(), Some((29 - expected, ())));
            assert_eq!(tree.check_invariants(), Ok(()));
        }
        assert!(tree.is_empty());
        assert_eq!(tree.height(), None);
    }

    #[test]
    fn into_iter_is_sorted() {
        let tree: BTree<i32, char> = [(3, 'c'), (1, 'a'), (2, 'b')].into_iter().collect();
        assert_eq!(tree.into_iter().collect::<Vec<_>>(), [(1, 'a'), (2, 'b'), (3, 'c')]);
    }

    #[test]
    fn equality_ignores_degree() {
        let mut narrow = BTree::with_min_degree(2);
        let mut wide = BTree::with_min_degree(5);
        for key in 0..40 {
            narrow.insert(key, key);
            wide.insert(39 - key, 39 - key);
        }
        assert_eq!(narrow, wide);
        assert_ne!(narrow.height(), wide.height());
    }

    #[test]
    fn debug_lists_entries_in_order() {
        let tree = BTree::from([(2, "b"), (1, "a")]);
        assert_eq!(format!("{tree:?}"), r#"{1: "a", 2: "b"}"#);
    }

    #[test]
    #[should_panic(expected = "no entry found for key")]
    fn index_panics_on_miss() {
        let tree = BTree::from([(1, 1)]);
        let _value = tree[&2];
    }
}
