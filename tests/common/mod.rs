//! Shared harness for the integration tests: tracing setup and a model-based
//! driver that replays random operations against `std::collections::BTreeMap`.

#![allow(dead_code)]

use std::collections::BTreeMap;

use balanced_tree::{AvlTree, BTree, BinarySearchTree, RedBlackTree, SplayTree, TreeError};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Installs a test-writer subscriber once per test binary.
///
/// `RUST_LOG=balanced_tree=trace cargo test -- --nocapture` shows every
/// rotation, split and merge.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "balanced_tree=warn".into()))
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

/// Keys are drawn from a narrow range so inserts collide and removes hit.
pub fn key_strategy() -> impl Strategy<Value = i64> {
    -500i64..500i64
}

fn value_strategy() -> impl Strategy<Value = i64> {
    any::<i64>()
}

// ─── Operations enum for driving randomized tests ────────────────────────────

#[derive(Debug, Clone)]
pub enum MapOp {
    Insert(i64, i64),
    Remove(i64),
    TryRemove(i64),
    Get(i64),
    Lookup(i64),
    Search(i64),
    ContainsKey(i64),
    FirstKeyValue,
    LastKeyValue,
    PopFirst,
    PopLast,
}

pub fn map_op_strategy() -> impl Strategy<Value = MapOp> {
    prop_oneof![
        6 => (key_strategy(), value_strategy()).prop_map(|(k, v)| MapOp::Insert(k, v)),
        3 => key_strategy().prop_map(MapOp::Remove),
        1 => key_strategy().prop_map(MapOp::TryRemove),
        2 => key_strategy().prop_map(MapOp::Get),
        1 => key_strategy().prop_map(MapOp::Lookup),
        2 => key_strategy().prop_map(MapOp::Search),
        1 => key_strategy().prop_map(MapOp::ContainsKey),
        1 => Just(MapOp::FirstKeyValue),
        1 => Just(MapOp::LastKeyValue),
        1 => Just(MapOp::PopFirst),
        1 => Just(MapOp::PopLast),
    ]
}

// ─── Uniform view over every tree kind ───────────────────────────────────────

/// The map surface every tree kind shares, so one driver covers them all.
pub trait OrderedMap: Default {
    fn insert(&mut self, key: i64, value: i64) -> Option<i64>;
    fn remove(&mut self, key: &i64) -> Option<i64>;
    fn try_remove(&mut self, key: &i64) -> Result<i64, TreeError>;
    fn get(&self, key: &i64) -> Option<&i64>;
    fn lookup(&self, key: &i64) -> Result<&i64, TreeError>;
    fn search(&mut self, key: &i64) -> Option<i64>;
    fn contains_key(&self, key: &i64) -> bool;
    fn first_key_value(&self) -> Option<(&i64, &i64)>;
    fn last_key_value(&self) -> Option<(&i64, &i64)>;
    fn pop_first(&mut self) -> Option<(i64, i64)>;
    fn pop_last(&mut self) -> Option<(i64, i64)>;
    fn len(&self) -> usize;
    fn entries(&self) -> Vec<(i64, i64)>;
    fn check_invariants(&self) -> Result<(), TreeError>;
}

macro_rules! ordered_map {
    ($($tree:ty),+ $(,)?) => {$(
        impl OrderedMap for $tree {
            fn insert(&mut self, key: i64, value: i64) -> Option<i64> {
                <$tree>::insert(self, key, value)
            }
            fn remove(&mut self, key: &i64) -> Option<i64> {
                <$tree>::remove(self, key)
            }
            fn try_remove(&mut self, key: &i64) -> Result<i64, TreeError> {
                <$tree>::try_remove(self, key)
            }
            fn get(&self, key: &i64) -> Option<&i64> {
                <$tree>::get(self, key)
            }
            fn lookup(&self, key: &i64) -> Result<&i64, TreeError> {
                <$tree>::lookup(self, key)
            }
            fn search(&mut self, key: &i64) -> Option<i64> {
                <$tree>::search(self, key).map(|(_, value)| *value)
            }
            fn contains_key(&self, key: &i64) -> bool {
                <$tree>::contains_key(self, key)
            }
            fn first_key_value(&self) -> Option<(&i64, &i64)> {
                <$tree>::first_key_value(self)
            }
            fn last_key_value(&self) -> Option<(&i64, &i64)> {
                <$tree>::last_key_value(self)
            }
            fn pop_first(&mut self) -> Option<(i64, i64)> {
                <$tree>::pop_first(self)
            }
            fn pop_last(&mut self) -> Option<(i64, i64)> {
                <$tree>::pop_last(self)
            }
            fn len(&self) -> usize {
                <$tree>::len(self)
            }
            fn entries(&self) -> Vec<(i64, i64)> {
                self.iter().map(|(&k, &v)| (k, v)).collect()
            }
            fn check_invariants(&self) -> Result<(), TreeError> {
                <$tree>::check_invariants(self)
            }
        }
    )+};
}

ordered_map!(
    BinarySearchTree<i64, i64>,
    AvlTree<i64, i64>,
    RedBlackTree<i64, i64>,
    SplayTree<i64, i64>,
    BTree<i64, i64>,
);

/// Replays `ops` on `tree` and on a `BTreeMap`, comparing every result.
///
/// With `check_each_step` the tree's invariants are verified after every
/// operation; otherwise only at the end.
pub fn replay<M: OrderedMap>(mut tree: M, ops: &[MapOp], check_each_step: bool) -> Result<(), TestCaseError> {
    let mut model: BTreeMap<i64, i64> = BTreeMap::new();

    for op in ops {
        match op {
            MapOp::Insert(k, v) => {
                prop_assert_eq!(tree.insert(*k, *v), model.insert(*k, *v), "insert({}, {})", k, v);
            }
            MapOp::Remove(k) => {
                prop_assert_eq!(tree.remove(k), model.remove(k), "remove({})", k);
            }
            MapOp::TryRemove(k) => {
                let expected = model.remove(k).ok_or(TreeError::KeyNotFound);
                prop_assert_eq!(tree.try_remove(k), expected, "try_remove({})", k);
            }
            MapOp::Get(k) => {
                prop_assert_eq!(tree.get(k), model.get(k), "get({})", k);
            }
            MapOp::Lookup(k) => {
                prop_assert_eq!(tree.lookup(k), model.get(k).ok_or(TreeError::KeyNotFound), "lookup({})", k);
            }
            MapOp::Search(k) => {
                prop_assert_eq!(tree.search(k), model.get(k).copied(), "search({})", k);
            }
            MapOp::ContainsKey(k) => {
                prop_assert_eq!(tree.contains_key(k), model.contains_key(k), "contains_key({})", k);
            }
            MapOp::FirstKeyValue => {
                prop_assert_eq!(tree.first_key_value(), model.first_key_value(), "first_key_value()");
            }
            MapOp::LastKeyValue => {
                prop_assert_eq!(tree.last_key_value(), model.last_key_value(), "last_key_value()");
            }
            MapOp::PopFirst => {
                prop_assert_eq!(tree.pop_first(), model.pop_first(), "pop_first()");
            }
            MapOp::PopLast => {
                prop_assert_eq!(tree.pop_last(), model.pop_last(), "pop_last()");
            }
        }

        prop_assert_eq!(tree.len(), model.len());
        if check_each_step {
            prop_assert_eq!(tree.check_invariants(), Ok(()), "after {:?}", op);
        }
    }

    prop_assert_eq!(tree.check_invariants(), Ok(()));
    let expected: Vec<(i64, i64)> = model.into_iter().collect();
    prop_assert_eq!(tree.entries(), expected);
    Ok(())
}
