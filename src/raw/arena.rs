use alloc::vec::Vec;

use super::handle::Handle;

/// Slot storage for tree nodes.
///
/// Nodes never own each other; every link is a [`Handle`] into this arena, so
/// dropping the arena releases a tree of any depth without recursion.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    slots: Vec<Option<T>>,
    vacant: Vec<Handle>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            vacant: Vec::new(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// Number of occupied slots.
    pub(crate) fn len(&self) -> usize {
        self.slots.len().saturating_sub(self.vacant.len())
    }

    pub(crate) fn alloc(&mut self, node: T) -> Handle {
        if let Some(handle) = self.vacant.pop() {
            self.slots[handle.to_index()] = Some(node);
            handle
        } else {
            assert!(
                self.slots.len() <= Handle::MAX,
                "`Arena::alloc()` - arena is at maximum capacity ({})",
                Handle::MAX + 1
            );
            self.slots.push(Some(node));
            Handle::from_index(self.slots.len() - 1)
        }
    }

    #[inline]
    pub(crate) fn get(&self, handle: Handle) -> &T {
        self.slots[handle.to_index()].as_ref().expect("`Arena::get()` - `handle` is vacant!")
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: Handle) -> &mut T {
        self.slots[handle.to_index()].as_mut().expect("`Arena::get_mut()` - `handle` is vacant!")
    }

    /// Borrows two distinct slots mutably at once.
    pub(crate) fn get_pair_mut(&mut self, first: Handle, second: Handle) -> (&mut T, &mut T) {
        let (i, j) = (first.to_index(), second.to_index());
        assert_ne!(i, j, "`Arena::get_pair_mut()` - handles alias the same slot!");

        let (low, high) = self.slots.split_at_mut(i.max(j));
        let (near, far) = (&mut low[i.min(j)], &mut high[0]);
        let (near, far) = (
            near.as_mut().expect("`Arena::get_pair_mut()` - `handle` is vacant!"),
            far.as_mut().expect("`Arena::get_pair_mut()` - `handle` is vacant!"),
        );

        if i < j { (near, far) } else { (far, near) }
    }

    pub(crate) fn take(&mut self, handle: Handle) -> T {
        let node = self.slots[handle.to_index()].take().expect("`Arena::take()` - `handle` is vacant!");
        self.vacant.push(handle);
        node
    }

    pub(crate) fn free(&mut self, handle: Handle) {
        drop(self.take(handle));
    }

    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.vacant.clear();
    }
}
