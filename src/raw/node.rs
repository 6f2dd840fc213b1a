use super::handle::Handle;

/// Which child slot of its parent a node occupies.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A binary tree node.
///
/// `parent` is navigational only: the arena owns every node, and a node is
/// reachable for teardown whether or not anything links to it.
#[derive(Clone)]
pub(crate) struct BinaryNode<K, V, M> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) parent: Option<Handle>,
    pub(crate) left: Option<Handle>,
    pub(crate) right: Option<Handle>,
    /// Balance metadata: height, color, or nothing.
    pub(crate) meta: M,
}

impl<K, V, M> BinaryNode<K, V, M> {
    pub(crate) const fn new(key: K, value: V, parent: Option<Handle>, meta: M) -> Self {
        Self {
            key,
            value,
            parent,
            left: None,
            right: None,
            meta,
        }
    }

    #[inline]
    pub(crate) const fn child(&self, side: Side) -> Option<Handle> {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    #[inline]
    pub(crate) fn set_child(&mut self, side: Side, child: Option<Handle>) {
        match side {
            Side::Left => self.left = child,
            Side::Right => self.right = child,
        }
    }

    /// Returns the only child, if the node has at most one.
    ///
    /// `None` means either no children or two.
    pub(crate) const fn sole_child(&self) -> Option<Handle> {
        match (self.left, self.right) {
            (Some(child), None) | (None, Some(child)) => Some(child),
            _ => None,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn side_opposite_is_involution() {
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::Right.opposite().opposite(), Side::Right);
    }

    #[test]
    fn child_slots_follow_side() {
        let mut node = BinaryNode::new(1, 'a', None, ());
        assert_eq!(node.sole_child(), None);

        let right = Handle::from_index(7);
        node.set_child(Side::Right, Some(right));
        assert_eq!(node.child(Side::Right), Some(right));
        assert_eq!(node.child(Side::Left), None);
        assert_eq!(node.sole_child(), Some(right));

        node.set_child(Side::Left, Some(Handle::from_index(3)));
        assert_eq!(node.sole_child(), None);
    }
}
