//! Key ordering supplied at construction.
//!
//! Every tree in this crate orders its keys with a [`Comparator`] rather than
//! calling [`Ord`] directly, so one key type can be stored under different
//! total orders. [`Natural`] (the default) defers to [`Ord`]; any
//! `Fn(&T, &T) -> Ordering` closure is also a comparator.
//!
//! # Examples
//!
//! ```
//! use balanced_tree::{AvlTree, Reversed, Natural};
//!
//! let mut descending = AvlTree::with_comparator(Reversed(Natural));
//! descending.extend([(1, 'a'), (3, 'c'), (2, 'b')]);
//! assert_eq!(descending.keys().copied().collect::<Vec<_>>(), [3, 2, 1]);
//!
//! let by_len = |a: &&str, b: &&str| a.len().cmp(&b.len()).then_with(|| a.cmp(b));
//! let mut words = AvlTree::with_comparator(by_len);
//! words.insert("ccc", 3);
//! words.insert("a", 1);
//! assert_eq!(words.first_key_value(), Some((&"a", &1)));
//! ```

use core::cmp::Ordering;

/// A total order over `T`.
///
/// Implementations must be consistent: reflexive, antisymmetric and
/// transitive. A comparator that panics aborts the current operation before
/// any node is relinked.
pub trait Comparator<T: ?Sized> {
    /// Compares `lhs` against `rhs`.
    fn compare(&self, lhs: &T, rhs: &T) -> Ordering;
}

/// Orders keys by their [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Natural;

impl<T: ?Sized + Ord> Comparator<T> for Natural {
    #[inline]
    fn compare(&self, lhs: &T, rhs: &T) -> Ordering {
        lhs.cmp(rhs)
    }
}

/// Inverts another comparator.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Reversed<C>(pub C);

impl<T: ?Sized, C: Comparator<T>> Comparator<T> for Reversed<C> {
    #[inline]
    fn compare(&self, lhs: &T, rhs: &T) -> Ordering {
        self.0.compare(rhs, lhs)
    }
}

impl<T: ?Sized, F> Comparator<T> for F
where
    F: Fn(&T, &T) -> Ordering,
{
    #[inline]
    fn compare(&self, lhs: &T, rhs: &T) -> Ordering {
        self(lhs, rhs)
    }
}
