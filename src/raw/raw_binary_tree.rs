use alloc::vec::Vec;
use core::mem;

use tracing::trace;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{BinaryNode, Side};
use crate::balance::Balance;
use crate::error::{TreeError, ensure};

/// Describes the hole left by [`RawBinaryTree::remove_at`].
#[derive(Clone, Copy, Debug)]
pub(crate) struct Removal<M> {
    /// Parent of the node that was unlinked, `None` if it was the root.
    pub(crate) parent: Option<Handle>,
    /// Which side of `parent` the node occupied.
    pub(crate) side: Option<Side>,
    /// The child promoted into the hole, if any.
    pub(crate) replacement: Option<Handle>,
    /// Metadata of the unlinked node.
    pub(crate) meta: M,
}

/// Binary tree mechanics shared by every search tree: linking, rotation,
/// structural removal and navigation. Ordering is the caller's concern.
pub(crate) struct RawBinaryTree<K, V, B: Balance> {
    nodes: Arena<BinaryNode<K, V, B::Meta>>,
    root: Option<Handle>,
    len: usize,
}

impl<K: Clone, V: Clone, B: Balance> Clone for RawBinaryTree<K, V, B> {
    fn clone(&self) -> Self {
        // Handles index slots, so a slot-for-slot copy keeps every link valid.
        Self {
            nodes: self.nodes.clone(),
            root: self.root,
            len: self.len,
        }
    }
}

impl<K, V, B: Balance> RawBinaryTree<K, V, B> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: None,
            len: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            root: None,
            len: 0,
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
        self.len = 0;
    }

    pub(crate) const fn root(&self) -> Option<Handle> {
        self.root
    }

    #[inline]
    pub(crate) fn node(&self, handle: Handle) -> &BinaryNode<K, V, B::Meta> {
        self.nodes.get(handle)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, handle: Handle) -> &mut BinaryNode<K, V, B::Meta> {
        self.nodes.get_mut(handle)
    }

    #[inline]
    pub(crate) fn parent(&self, handle: Handle) -> Option<Handle> {
        self.node(handle).parent
    }

    #[inline]
    pub(crate) fn child(&self, handle: Handle, side: Side) -> Option<Handle> {
        self.node(handle).child(side)
    }

    #[inline]
    pub(crate) fn meta(&self, handle: Handle) -> B::Meta {
        self.node(handle).meta
    }

    #[inline]
    pub(crate) fn set_meta(&mut self, handle: Handle, meta: B::Meta) {
        self.node_mut(handle).meta = meta;
    }

    /// Returns the parent of `handle` and the side it hangs from.
    pub(crate) fn parent_link(&self, handle: Handle) -> Option<(Handle, Side)> {
        let parent = self.parent(handle)?;
        let side = if self.node(parent).left == Some(handle) {
            Side::Left
        } else {
            Side::Right
        };
        Some((parent, side))
    }

    pub(crate) fn sibling(&self, handle: Handle) -> Option<Handle> {
        let (parent, side) = self.parent_link(handle)?;
        self.child(parent, side.opposite())
    }

    /// Hangs `child` (or nothing) from `parent` on `side`.
    fn attach(&mut self, parent: Handle, side: Side, child: Option<Handle>) {
        self.node_mut(parent).set_child(side, child);
        if let Some(child) = child {
            self.node_mut(child).parent = Some(parent);
        }
    }

    /// Puts `child` where the old occupant of `link` was, or at the root.
    fn relink(&mut self, link: Option<(Handle, Side)>, child: Option<Handle>) {
        match link {
            Some((parent, side)) => self.attach(parent, side, child),
            None => {
                self.root = child;
                if let Some(child) = child {
                    self.node_mut(child).parent = None;
                }
            }
        }
    }

    /// Creates a leaf under `link` (or as the root) and returns its handle.
    pub(crate) fn attach_leaf(&mut self, link: Option<(Handle, Side)>, key: K, value: V) -> Handle {
        let parent = link.map(|(parent, _)| parent);
        let handle = self.nodes.alloc(BinaryNode::new(key, value, parent, B::leaf_meta()));
        self.relink(link, Some(handle));
        self.len += 1;
        handle
    }

    /// Promotes `node` one level by a single rotation about its parent.
    ///
    /// The demoted parent and then `node` are refreshed. Returns `node`.
    ///
    /// # Panics
    ///
    /// Panics if `node` is the root.
    pub(crate) fn rotate_at(&mut self, node: Handle) -> Handle {
        let (parent, side) = self.parent_link(node).expect("`RawBinaryTree::rotate_at()` - `node` is the root!");
        let grandparent = self.parent_link(parent);
        let inner = self.child(node, side.opposite());

        self.attach(parent, side, inner);
        self.attach(node, side.opposite(), Some(parent));
        self.relink(grandparent, Some(node));

        B::refresh(self, parent);
        B::refresh(self, node);
        trace!(?node, ?parent, ?side, "rotate");
        node
    }

    /// Trinode restructuring of `node`, its parent and its grandparent.
    ///
    /// Covers the zig-zig and zig-zag shapes in one 3+4 reconstruction: the
    /// median of the three becomes the subtree root with the other two as its
    /// children. Returns the new subtree root.
    ///
    /// # Panics
    ///
    /// Panics if `node` has no grandparent.
    pub(crate) fn restructure(&mut self, node: Handle) -> Handle {
        let (parent, node_side) =
            self.parent_link(node).expect("`RawBinaryTree::restructure()` - `node` has no grandparent!");
        let (grandparent, parent_side) =
            self.parent_link(parent).expect("`RawBinaryTree::restructure()` - `node` has no grandparent!");
        let above = self.parent_link(grandparent);

        let (v, p, g) = (self.node(node), self.node(parent), self.node(grandparent));
        let (trio, subtrees) = match (parent_side, node_side) {
            (Side::Left, Side::Left) => ([node, parent, grandparent], [v.left, v.right, p.right, g.right]),
            (Side::Left, Side::Right) => ([parent, node, grandparent], [p.left, v.left, v.right, g.right]),
            (Side::Right, Side::Left) => ([grandparent, node, parent], [g.left, v.left, v.right, p.right]),
            (Side::Right, Side::Right) => ([grandparent, parent, node], [g.left, p.left, v.left, v.right]),
        };

        let pivot = self.connect34(trio, subtrees);
        self.relink(above, Some(pivot));
        trace!(?node, ?pivot, "restructure");
        pivot
    }

    /// Rebuilds `a < b < c` over the ordered subtrees `t0..t3` and returns `b`.
    fn connect34(&mut self, [a, b, c]: [Handle; 3], [t0, t1, t2, t3]: [Option<Handle>; 4]) -> Handle {
        self.attach(a, Side::Left, t0);
        self.attach(a, Side::Right, t1);
        B::refresh(self, a);
        self.attach(c, Side::Left, t2);
        self.attach(c, Side::Right, t3);
        B::refresh(self, c);
        self.attach(b, Side::Left, Some(a));
        self.attach(b, Side::Right, Some(c));
        B::refresh(self, b);
        b
    }

    /// Unlinks the entry stored at `target` and returns it.
    ///
    /// A node with two children trades entries with its in-order successor,
    /// which has at most one child and is the node actually spliced out.
    pub(crate) fn remove_at(&mut self, target: Handle) -> (K, V, Removal<B::Meta>) {
        let node = self.node(target);
        let doomed = match (node.left, node.right) {
            (Some(_), Some(right)) => {
                let successor = self.leftmost(right);
                let (a, b) = self.nodes.get_pair_mut(target, successor);
                mem::swap(&mut a.key, &mut b.key);
                mem::swap(&mut a.value, &mut b.value);
                successor
            }
            _ => target,
        };

        let replacement = self.node(doomed).sole_child();
        let link = self.parent_link(doomed);
        self.relink(link, replacement);

        let removed = self.nodes.take(doomed);
        self.len -= 1;
        trace!(?doomed, ?replacement, "splice");

        let removal = Removal {
            parent: link.map(|(parent, _)| parent),
            side: link.map(|(_, side)| side),
            replacement,
            meta: removed.meta,
        };
        (removed.key, removed.value, removal)
    }

    pub(crate) fn leftmost(&self, mut handle: Handle) -> Handle {
        while let Some(left) = self.node(handle).left {
            handle = left;
        }
        handle
    }

    pub(crate) fn rightmost(&self, mut handle: Handle) -> Handle {
        while let Some(right) = self.node(handle).right {
            handle = right;
        }
        handle
    }

    pub(crate) fn first(&self) -> Option<Handle> {
        self.root.map(|root| self.leftmost(root))
    }

    pub(crate) fn last(&self) -> Option<Handle> {
        self.root.map(|root| self.rightmost(root))
    }

    /// In-order successor.
    pub(crate) fn next(&self, handle: Handle) -> Option<Handle> {
        if let Some(right) = self.node(handle).right {
            return Some(self.leftmost(right));
        }

        let mut current = handle;
        loop {
            match self.parent_link(current)? {
                (parent, Side::Left) => return Some(parent),
                (parent, Side::Right) => current = parent,
            }
        }
    }

    /// In-order predecessor.
    pub(crate) fn prev(&self, handle: Handle) -> Option<Handle> {
        if let Some(left) = self.node(handle).left {
            return Some(self.rightmost(left));
        }

        let mut current = handle;
        loop {
            match self.parent_link(current)? {
                (parent, Side::Right) => return Some(parent),
                (parent, Side::Left) => current = parent,
            }
        }
    }

    /// First node of a post-order walk of the subtree at `handle`.
    pub(crate) fn post_order_first(&self, mut handle: Handle) -> Handle {
        loop {
            let node = self.node(handle);
            match (node.left, node.right) {
                (Some(next), _) | (None, Some(next)) => handle = next,
                (None, None) => return handle,
            }
        }
    }

    /// Post-order successor.
    pub(crate) fn post_order_next(&self, handle: Handle) -> Option<Handle> {
        match self.parent_link(handle)? {
            (parent, Side::Left) => match self.node(parent).right {
                Some(right) => Some(self.post_order_first(right)),
                None => Some(parent),
            },
            (parent, Side::Right) => Some(parent),
        }
    }

    /// Number of edges on the longest root-to-leaf path, `None` when empty.
    pub(crate) fn height(&self) -> Option<usize> {
        let root = self.root?;
        let mut deepest = 0;
        let mut pending = alloc::vec![(root, 0usize)];

        while let Some((handle, depth)) = pending.pop() {
            deepest = deepest.max(depth);
            let node = self.node(handle);
            pending.extend(node.left.map(|left| (left, depth + 1)));
            pending.extend(node.right.map(|right| (right, depth + 1)));
        }

        Some(deepest)
    }

    /// Every child names its parent, and exactly `len` nodes are reachable.
    pub(crate) fn check_links(&self) -> Result<(), TreeError> {
        let Some(root) = self.root else {
            ensure!(self.len == 0, "empty tree reports len {}", self.len);
            return Ok(());
        };
        ensure!(self.parent(root).is_none(), "root {root:?} has a parent");

        let mut reached = 0;
        let mut pending = alloc::vec![root];
        while let Some(handle) = pending.pop() {
            reached += 1;
            for child in [self.node(handle).left, self.node(handle).right].into_iter().flatten() {
                ensure!(
                    self.parent(child) == Some(handle),
                    "{child:?} is linked under {handle:?} but names {:?} as parent",
                    self.parent(child)
                );
                pending.push(child);
            }
        }

        ensure!(reached == self.len, "{reached} nodes reachable but len is {}", self.len);
        ensure!(reached == self.nodes.len(), "{reached} nodes reachable but arena holds {}", self.nodes.len());
        Ok(())
    }

    /// Moves every entry out in key order, leaving the tree empty.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        let mut order = Vec::with_capacity(self.len);
        let mut cursor = self.first();
        while let Some(handle) = cursor {
            order.push(handle);
            cursor = self.next(handle);
        }

        let entries = order
            .into_iter()
            .map(|handle| {
                let node = self.nodes.take(handle);
                (node.key, node.value)
            })
            .collect();
        self.clear();
        entries
    }
}
