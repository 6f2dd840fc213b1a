use core::num::NonZero;

// Unit tests use a narrow handle so arena exhaustion is reachable.
#[cfg(test)]
type RawHandle = u16;
#[cfg(not(test))]
type RawHandle = u32;

/// Non-owning reference to a node slot in an [`Arena`](super::arena::Arena).
///
/// Parent and child links are both `Option<Handle>`; the `NonZero` niche keeps
/// those links the same width as the handle itself.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(transparent)]
pub(crate) struct Handle(NonZero<RawHandle>);

impl Handle {
    /// Largest slot index a handle can name.
    pub(crate) const MAX: usize = (RawHandle::MAX - 1) as usize;

    #[inline]
    pub(crate) const fn from_index(index: usize) -> Self {
        assert!(index <= Self::MAX, "`Handle::from_index()` - `index` > `Handle::MAX`!");
        #[allow(clippy::cast_possible_truncation)]
        let shifted = (index + 1) as RawHandle;
        match NonZero::new(shifted) {
            Some(raw) => Self(raw),
            None => panic!("`Handle::from_index()` - slot index wrapped to zero!"),
        }
    }

    #[inline]
    pub(crate) const fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}
