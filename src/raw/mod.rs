mod arena;
mod b_node;
mod handle;
mod node;
mod raw_binary_tree;
mod raw_btree;
mod raw_search_tree;

pub(crate) use arena::Arena;
pub(crate) use b_node::{BNode, DEFAULT_MIN_DEGREE};
pub(crate) use handle::Handle;
pub(crate) use node::Side;
pub(crate) use raw_binary_tree::{RawBinaryTree, Removal};
pub(crate) use raw_btree::RawBTree;
pub(crate) use raw_search_tree::RawSearchTree;
