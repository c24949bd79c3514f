use super::*;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeSet;

#[derive(Clone, Debug)]
enum Op {
    Insert(i64),
    Remove(i64),
    Lookup(i64),
    Rebuild,
}

fn sorted_keys() -> impl Strategy<Value = Vec<i64>> {
    prop::collection::btree_set(-500i64..500, 0..=200).prop_map(|set| set.into_iter().collect())
}

fn fan_out() -> impl Strategy<Value = usize> {
    2usize..=9
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = -60i64..60;
    let op = prop_oneof![
        45 => key.clone().prop_map(Op::Insert),
        30 => key.clone().prop_map(Op::Remove),
        24 => key.prop_map(Op::Lookup),
        1 => Just(Op::Rebuild),
    ];
    prop::collection::vec(op, 0..=300)
}

fn subtree_len(node: &Node<i64>) -> usize {
    let mut keys = Vec::new();
    node.collect_into(&mut keys);
    keys.len()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_build_round_trip(keys in sorted_keys(), m in fan_out()) {
        let tree = MTree::from_sorted(m, keys.clone()).unwrap();
        prop_assert_eq!(tree.collect_values(), keys.clone());
        prop_assert_eq!(tree.iter().copied().collect::<Vec<_>>(), keys.clone());
        prop_assert_eq!(tree.len(), keys.len());
        prop_assert_eq!(tree.check_invariants(), Ok(()));
    }

    #[test]
    fn prop_partition_sizes(keys in sorted_keys(), m in fan_out()) {
        let n = keys.len();
        let tree = MTree::from_sorted(m, keys).unwrap();
        let children = tree.root().children();

        if n <= m - 1 {
            prop_assert!(tree.root().is_leaf());
        } else {
            let slice_len = n / m;
            prop_assert_eq!(children.len(), m);
            for child in &children[..m - 1] {
                prop_assert_eq!(subtree_len(child), slice_len);
            }
            prop_assert_eq!(subtree_len(&children[m - 1]), n - (m - 1) * slice_len);
        }
    }

    #[test]
    fn prop_duplicate_insert_is_noop(keys in sorted_keys(), m in fan_out(), key in -600i64..600) {
        let mut tree = MTree::from_sorted(m, keys).unwrap();
        let first = tree.insert(key);
        let after_first = tree.collect_values();

        prop_assert!(!tree.insert(key));
        prop_assert_eq!(tree.collect_values(), after_first);
        prop_assert!(first || tree.find(&key));
    }

    #[test]
    fn prop_insert_then_remove_restores(keys in sorted_keys(), m in fan_out(), key in -600i64..600) {
        prop_assume!(keys.binary_search(&key).is_err());
        let mut tree = MTree::from_sorted(m, keys.clone()).unwrap();
        let before = tree.root().clone();

        prop_assert!(tree.insert(key));
        prop_assert_eq!(tree.remove(&key), Ok(()));
        prop_assert_eq!(tree.collect_values(), keys);
        prop_assert_eq!(tree.root(), &before);
    }

    #[test]
    fn prop_search_agrees_with_find(keys in sorted_keys(), m in fan_out(), probes in prop::collection::vec(-600i64..600, 1..50)) {
        let tree = MTree::from_sorted(m, keys.clone()).unwrap();
        for key in keys.iter().chain(probes.iter()) {
            prop_assert_eq!(tree.search(key), tree.find(key), "key {}", key);
        }
    }

    #[test]
    fn prop_remove_missing_is_not_found(keys in sorted_keys(), m in fan_out(), key in -600i64..600) {
        prop_assume!(keys.binary_search(&key).is_err());
        let mut tree = MTree::from_sorted(m, keys.clone()).unwrap();

        prop_assert_eq!(tree.remove(&key), Err(MTreeError::KeyNotFound));
        prop_assert_eq!(tree.collect_values(), keys);
    }

    #[test]
    fn prop_equivalence_with_btreeset(initial in sorted_keys(), m in fan_out(), ops in ops_strategy()) {
        let mut tree = MTree::from_sorted(m, initial.clone()).unwrap();
        let mut set: BTreeSet<i64> = initial.into_iter().collect();

        for op in ops {
            match op {
                Op::Insert(key) => {
                    prop_assert_eq!(tree.insert(key), set.insert(key));
                }
                Op::Remove(key) => {
                    prop_assert_eq!(tree.remove(&key).is_ok(), set.remove(&key));
                }
                Op::Lookup(key) => {
                    prop_assert_eq!(tree.search(&key), set.contains(&key));
                    prop_assert_eq!(tree.find(&key), set.contains(&key));
                }
                Op::Rebuild => tree.rebuild(),
            }
            prop_assert_eq!(tree.len(), set.len());
        }

        prop_assert_eq!(tree.check_invariants(), Ok(()));
        prop_assert_eq!(tree.collect_values(), set.into_iter().collect::<Vec<_>>());
    }
}

#[test]
fn randomized_stress_against_btreeset() {
    let mut rng = StdRng::seed_from_u64(0x6d74_7265_65);

    for m in 2..=12 {
        let mut tree = MTree::new(m).unwrap();
        let mut set = BTreeSet::new();

        for _ in 0..2_000 {
            let key: i64 = rng.gen_range(-1_000..1_000);
            if rng.gen_bool(0.6) {
                assert_eq!(tree.insert(key), set.insert(key));
            } else {
                assert_eq!(tree.remove(&key).is_ok(), set.remove(&key));
            }
        }

        tree.check_invariants().unwrap();
        assert_eq!(tree.collect_values(), set.iter().copied().collect::<Vec<_>>());
        for key in -1_010..1_010 {
            assert_eq!(tree.search(&key), set.contains(&key), "fan-out {} key {}", m, key);
        }
    }
}
