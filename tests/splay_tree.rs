mod common;

use balanced_tree::{SplayTree, TreeError};
use common::{init_tracing, map_op_strategy, replay};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn root_key(tree: &SplayTree<i32, i32>) -> Option<i32> {
    tree.root_key_value().map(|(k, _)| *k)
}

// ─── Model-based CRUD ────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(20))]

    #[test]
    fn ops_match_btreemap(ops in proptest::collection::vec(map_op_strategy(), 2_000)) {
        init_tracing();
        replay(SplayTree::<i64, i64>::new(), &ops, true)?;
    }

    /// After a successful search the key sits at the root.
    #[test]
    fn search_hit_moves_key_to_root(keys in proptest::collection::vec(-200i32..200, 1..300), pick in any::<prop::sample::Index>()) {
        let mut tree: SplayTree<i32, i32> = keys.iter().map(|&k| (k, k * 2)).collect();
        let key = keys[pick.index(keys.len())];

        let found = tree.search(&key).map(|(k, v)| (*k, *v));
        prop_assert_eq!(found, Some((key, key * 2)));
        prop_assert_eq!(root_key(&tree), Some(key));
        prop_assert_eq!(tree.check_invariants(), Ok(()));
    }

    /// Every insert leaves the inserted key at the root, new or not.
    #[test]
    fn insert_moves_key_to_root(keys in proptest::collection::vec(-200i32..200, 1..300)) {
        let mut tree = SplayTree::new();
        for &key in &keys {
            tree.insert(key, key);
            prop_assert_eq!(root_key(&tree), Some(key));
        }
    }

    /// A miss still splays, but never changes the contents.
    #[test]
    fn search_miss_keeps_entries(keys in proptest::collection::btree_set(0i32..100, 1..50), probe in 100i32..200) {
        let mut tree: SplayTree<i32, i32> = keys.iter().map(|&k| (k, k)).collect();
        prop_assert!(tree.search(&probe).is_none());
        // The descent for a key above every stored key ends at the maximum.
        prop_assert_eq!(root_key(&tree), keys.iter().next_back().copied());
        prop_assert_eq!(tree.keys().copied().collect::<Vec<_>>(), keys.into_iter().collect::<Vec<_>>());
    }
}

// ─── Deterministic scenarios ─────────────────────────────────────────────────

#[test]
fn get_does_not_reshape_but_search_does() {
    init_tracing();
    let mut tree = SplayTree::new();
    for key in 0..32 {
        tree.insert(key, key);
    }
    assert_eq!(root_key(&tree), Some(31));

    assert_eq!(tree.get(&0), Some(&0));
    assert_eq!(root_key(&tree), Some(31));

    let height_before = tree.height();
    assert_eq!(tree.search(&0).map(|(_, v)| *v), Some(0));
    assert_eq!(root_key(&tree), Some(0));
    assert!(tree.height() < height_before);
}

#[test]
fn removal_splays_the_parent() {
    let mut tree = SplayTree::new();
    for key in [10, 20, 30] {
        tree.insert(key, key);
    }
    // 30 is the root with 20 and then 10 down its left spine.
    assert_eq!(tree.remove(&10), Some(10));
    assert_eq!(root_key(&tree), Some(20));
    assert_eq!(tree.try_remove(&10), Err(TreeError::KeyNotFound));
    assert_eq!(tree.check_invariants(), Ok(()));
}

#[test]
fn overwrite_splays_existing_node() {
    let mut tree = SplayTree::from([(1, 1), (2, 2), (3, 3)]);
    assert_eq!(tree.insert(1, 10), Some(1));
    assert_eq!(root_key(&tree), Some(1));
    assert_eq!(tree.len(), 3);
    assert_eq!(tree[&1], 10);
}
