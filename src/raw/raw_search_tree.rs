use core::borrow::Borrow;
use core::cmp::Ordering;
use core::mem;

use super::handle::Handle;
use super::node::Side;
use super::raw_binary_tree::RawBinaryTree;
use crate::balance::Balance;
use crate::compare::Comparator;
use crate::error::{TreeError, ensure};

/// Outcome of descending from the root towards a key.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Probe {
    /// The key is stored at this node.
    Found(Handle),
    /// The key is absent. `link` is the empty child slot where it belongs
    /// (`None` for an empty tree), i.e. the last node visited and a side.
    Vacant { link: Option<(Handle, Side)> },
}

/// Ordered search over a [`RawBinaryTree`], with `B`'s hooks run after every
/// structural edit.
pub(crate) struct RawSearchTree<K, V, B: Balance, C> {
    base: RawBinaryTree<K, V, B>,
    cmp: C,
}

impl<K: Clone, V: Clone, B: Balance, C: Clone> Clone for RawSearchTree<K, V, B, C> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
            cmp: self.cmp.clone(),
        }
    }
}

impl<K, V, B: Balance, C> RawSearchTree<K, V, B, C> {
    pub(crate) const fn new(cmp: C) -> Self {
        Self {
            base: RawBinaryTree::new(),
            cmp,
        }
    }

    pub(crate) fn with_capacity(capacity: usize, cmp: C) -> Self {
        Self {
            base: RawBinaryTree::with_capacity(capacity),
            cmp,
        }
    }

    #[inline]
    pub(crate) const fn base(&self) -> &RawBinaryTree<K, V, B> {
        &self.base
    }

    #[inline]
    pub(crate) fn base_mut(&mut self) -> &mut RawBinaryTree<K, V, B> {
        &mut self.base
    }

    pub(crate) const fn comparator(&self) -> &C {
        &self.cmp
    }

    /// Descends from the root comparing `key` against each node.
    ///
    /// All comparisons happen here, before any edit, so a panicking
    /// comparator leaves the tree untouched.
    pub(crate) fn probe<Q>(&self, key: &Q) -> Probe
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let mut link = None;
        let mut cursor = self.base.root();
        while let Some(handle) = cursor {
            let node = self.base.node(handle);
            let side = match self.cmp.compare(key, node.key.borrow()) {
                Ordering::Equal => return Probe::Found(handle),
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
            };
            link = Some((handle, side));
            cursor = node.child(side);
        }
        Probe::Vacant { link }
    }

    /// Locates `key` without running any hook.
    pub(crate) fn find<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        match self.probe(key) {
            Probe::Found(handle) => Some(handle),
            Probe::Vacant { .. } => None,
        }
    }

    /// Locates `key` and reports the access to the strategy.
    ///
    /// On a miss the last node visited is reported instead. The returned
    /// handle stays valid across the hook because rotations only relink.
    pub(crate) fn search<Q>(&mut self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        match self.probe(key) {
            Probe::Found(handle) => {
                B::after_access(&mut self.base, handle);
                Some(handle)
            }
            Probe::Vacant { link } => {
                if let Some((last, _)) = link {
                    B::after_access(&mut self.base, last);
                }
                None
            }
        }
    }

    /// Stores `value` under `key`, returning the node and any value it replaced.
    pub(crate) fn insert(&mut self, key: K, value: V) -> (Handle, Option<V>)
    where
        C: Comparator<K>,
    {
        match self.probe(&key) {
            Probe::Found(handle) => {
                let old = mem::replace(&mut self.base.node_mut(handle).value, value);
                B::after_access(&mut self.base, handle);
                (handle, Some(old))
            }
            Probe::Vacant { link } => {
                let handle = self.base.attach_leaf(link, key, value);
                B::after_insert(&mut self.base, handle);
                (handle, None)
            }
        }
    }

    pub(crate) fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let handle = self.find(key)?;
        Some(self.remove_handle(handle))
    }

    /// Unlinks the node at `handle` and rebalances.
    pub(crate) fn remove_handle(&mut self, handle: Handle) -> (K, V) {
        let (key, value, removal) = self.base.remove_at(handle);
        B::after_remove(&mut self.base, removal);
        (key, value)
    }

    /// Checks links, in-order key order under the comparator, then `B`'s
    /// own invariant.
    pub(crate) fn check_invariants(&self) -> Result<(), TreeError>
    where
        C: Comparator<K>,
    {
        self.base.check_links()?;

        let mut position = 0usize;
        let mut cursor = self.base.first();
        while let Some(handle) = cursor {
            let next = self.base.next(handle);
            if let Some(next) = next {
                let ordering = self.cmp.compare(&self.base.node(handle).key, &self.base.node(next).key);
                ensure!(
                    ordering == Ordering::Less,
                    "keys at in-order positions {position} and {} compare {ordering:?}",
                    position + 1
                );
            }
            position += 1;
            cursor = next;
        }
        ensure!(position == self.base.len(), "in-order walk visited {position} of {} nodes", self.base.len());

        B::check(&self.base)
    }
}
