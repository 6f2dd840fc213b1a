mod common;

use std::collections::BTreeMap;

use balanced_tree::{BTree, Natural, Reversed, TreeError};
use common::{MapOp, init_tracing, map_op_strategy, replay};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn keys(tree: &BTree<i32, i32>) -> Vec<i32> {
    tree.keys().copied().collect()
}

// ─── Model-based CRUD ────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    /// The default degree against the model, checking invariants at the end.
    #[test]
    fn ops_match_btreemap(ops in proptest::collection::vec(map_op_strategy(), 5_000)) {
        init_tracing();
        replay(BTree::<i64, i64>::new(), &ops, false)?;
    }

    /// Small degrees split and merge constantly; check after every step.
    #[test]
    fn small_degrees_match_btreemap(
        ops in proptest::collection::vec(map_op_strategy(), 1_000),
        degree in 2usize..5,
    ) {
        replay(BTree::<i64, i64>::with_min_degree(degree), &ops, true)?;
    }

    /// A reversed comparator yields the model's order backwards.
    #[test]
    fn reversed_comparator_iterates_backwards(ops in proptest::collection::vec(map_op_strategy(), 500)) {
        let mut tree = BTree::with_comparator(3, Reversed(Natural));
        let mut model = BTreeMap::new();
        for op in ops {
            if let MapOp::Insert(k, v) = op {
                tree.insert(k, v);
                model.insert(k, v);
            } else if let MapOp::Remove(k) = op {
                prop_assert_eq!(tree.remove(&k), model.remove(&k));
            }
        }
        let forward: Vec<(i64, i64)> = tree.iter().map(|(&k, &v)| (k, v)).collect();
        let expected: Vec<(i64, i64)> = model.into_iter().rev().collect();
        prop_assert_eq!(forward, expected);
        prop_assert_eq!(tree.check_invariants(), Ok(()));
    }
}

// ─── Deterministic split and merge scenarios ─────────────────────────────────

#[test]
fn fourth_insert_at_degree_two_grows_a_level() {
    init_tracing();
    let mut tree = BTree::with_min_degree(2);
    for key in [10, 20, 30] {
        tree.insert(key, key);
        assert_eq!(tree.height(), Some(0));
    }
    tree.insert(40, 40);
    assert_eq!(tree.height(), Some(1));
    assert_eq!(keys(&tree), vec![10, 20, 30, 40]);
    assert_eq!(tree.check_invariants(), Ok(()));
}

#[test]
fn sequential_inserts_grow_one_level_at_a_time() {
    let mut tree = BTree::with_min_degree(2);
    let mut height = Some(0);
    for key in 0..500 {
        tree.insert(key, key);
        let now = tree.height();
        assert!(now == height || now == height.map(|h| h + 1), "height jumped at {key}");
        height = now;
    }
    assert_eq!(tree.check_invariants(), Ok(()));

    for key in 0..500 {
        assert_eq!(tree.remove(&key), Some(key));
        assert_eq!(tree.check_invariants(), Ok(()), "after removing {key}");
    }
    assert!(tree.is_empty());
    assert_eq!(tree.height(), None);
}

#[test]
fn removing_internal_keys_pulls_predecessors() {
    let mut tree = BTree::with_min_degree(3);
    tree.extend((1..=100).map(|k| (k, k * 10)));
    assert!(tree.height().is_some_and(|h| h >= 1));

    // Every third key, so internal separators get hit along the way.
    for key in (3..=99).step_by(3) {
        assert_eq!(tree.try_remove(&key), Ok(key * 10));
        assert_eq!(tree.check_invariants(), Ok(()), "after removing {key}");
    }
    assert_eq!(tree.len(), 67);
    assert_eq!(tree.try_remove(&3), Err(TreeError::KeyNotFound));
    assert_eq!(tree.first_key_value(), Some((&1, &10)));
    assert_eq!(tree.last_key_value(), Some((&100, &1000)));
}

#[test]
fn clone_is_independent() {
    let mut original: BTree<i32, i32> = (0..50).map(|k| (k, k)).collect();
    let copy = original.clone();
    for key in 0..25 {
        original.remove(&key);
    }
    assert_eq!(copy.len(), 50);
    assert_eq!(original.len(), 25);
    assert_eq!(copy.check_invariants(), Ok(()));
    assert_eq!(original.check_invariants(), Ok(()));
}

#[test]
#[should_panic(expected = "`min_degree` must be at least 2")]
fn degree_below_two_is_rejected() {
    let _tree: BTree<i32, i32> = BTree::with_min_degree(1);
}

// ─── Drop semantics ──────────────────────────────────────────────────────────

mod drop_tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use balanced_tree::BTree;

    struct Droppable {
        drop_count: Rc<Cell<i32>>,
    }

    impl Drop for Droppable {
        fn drop(&mut self) {
            self.drop_count.set(self.drop_count.get() + 1);
        }
    }

    #[test]
    fn values_dropped_exactly_once() {
        let drop_count = Rc::new(Cell::new(0));
        let mut tree = BTree::with_min_degree(2);
        for i in 0..100 {
            tree.insert(
                i,
                Droppable {
                    drop_count: drop_count.clone(),
                },
            );
        }

        for i in 0..40 {
            tree.remove(&i);
        }
        assert_eq!(drop_count.get(), 40, "removed values dropped");

        tree.clear();
        assert_eq!(drop_count.get(), 100, "all values dropped after clear");
    }

    #[test]
    fn partially_consumed_into_iter_drops_the_rest() {
        let drop_count = Rc::new(Cell::new(0));
        let mut tree = BTree::with_min_degree(2);
        for i in 0..20 {
            tree.insert(
                i,
                Droppable {
                    drop_count: drop_count.clone(),
                },
            );
        }

        let mut iter = tree.into_iter();
        drop(iter.next());
        assert_eq!(drop_count.get(), 1);
        drop(iter);
        assert_eq!(drop_count.get(), 20);
    }
}
