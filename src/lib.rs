//! Ordered maps built on binary search trees and B-trees.
//!
//! Every collection in this crate stores key-value pairs in key order under a
//! [`Comparator`] and exposes the same search/insert/remove contract:
//!
//! - [`BinarySearchTree`] - no rebalancing at all
//! - [`AvlTree`] - height-balanced, at most one restructure per insertion
//! - [`RedBlackTree`] - color-balanced, O(1) amortized restructures per edit
//! - [`SplayTree`] - self-adjusting, the last accessed key moves to the root
//! - [`BTree`] - multi-way nodes with a configurable minimum degree
//!
//! The four binary trees are one type, [`SearchTree`], parameterised by a
//! [`Balance`] strategy whose hooks run after each structural edit.
//!
//! # Example
//!
//! ```
//! use balanced_tree::{AvlTree, BTree, SplayTree, TreeError};
//!
//! let mut avl = AvlTree::new();
//! for key in [10, 20, 30] {
//!     avl.insert(key, key * 100);
//! }
//! // A single rotation lifted 20 to the root.
//! assert_eq!(avl.root_key_value(), Some((&20, &2000)));
//! assert_eq!(avl.height(), Some(1));
//!
//! // Misses are reported as errors by the checked accessors.
//! assert_eq!(avl.lookup(&40), Err(TreeError::KeyNotFound));
//!
//! // Splay trees move every searched key to the root.
//! let mut splay: SplayTree<_, _> = avl.iter().map(|(&k, &v)| (k, v)).collect();
//! assert!(splay.search(&10).is_some());
//! assert_eq!(splay.root_key_value(), Some((&10, &1000)));
//!
//! let mut btree = BTree::with_min_degree(2);
//! btree.extend([(1, "a"), (2, "b"), (3, "c"), (4, "d")]);
//! assert_eq!(btree.height(), Some(1));
//! assert_eq!(btree.check_invariants(), Ok(()));
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **Arena storage** - Nodes live in one vector and link by index, so there is no `unsafe` code
//!   and dropping a tree never recurses
//! - **Custom orderings** - Any [`Comparator`], including closures, in place of [`Ord`]
//! - **Self-checking** - `check_invariants` verifies links, ordering and the balance rules
//!
//! # Logging
//!
//! Rebalancing steps emit [`tracing`](https://docs.rs/tracing) events at `trace` level, and a
//! B-tree growing or shrinking a level emits a `debug` event.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![deny(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod raw;

pub mod balance;
pub mod btree;
pub mod compare;
pub mod search_tree;

pub use balance::{Avl, Balance, Color, RedBlack, Splay, Unbalanced};
pub use btree::BTree;
pub use compare::{Comparator, Natural, Reversed};
pub use error::TreeError;
pub use search_tree::{AvlTree, BinarySearchTree, RedBlackTree, SearchTree, SplayTree, TraversalOrder};
