//! # Integration Tests for Ivtree
//!
//! This module contains end-to-end integration tests that exercise the tree
//! and its cursor through the public API with realistic workloads.

use ivtree::{Interval, IntervalTree};
use rand::prelude::*;
use std::cell::RefCell;

fn iv(low: i64, high: i64) -> Interval<i64> {
	Interval::new(low, high).unwrap()
}

/// Builds a tree of `count` distinct intervals in shuffled insertion order.
fn shuffled_tree(count: i64, seed: u64) -> IntervalTree<i64, i64> {
	let mut rng = StdRng::seed_from_u64(seed);
	let mut keys: Vec<i64> = (0..count).collect();
	keys.shuffle(&mut rng);

	let mut tree = IntervalTree::with_capacity(count as usize);
	for k in keys {
		tree.insert(iv(k * 10, k * 10 + rng.random_range(0..50)), k);
	}
	tree
}

// ===========================================================================
// Ordered Traversal
// ===========================================================================

#[test]
fn unseeded_cursor_yields_every_entry_ascending() {
	let tree = shuffled_tree(2_000, 1);
	let mut cursor = tree.cursor(|_, k| *k);

	let mut previous: Option<Interval<i64>> = None;
	for _ in 0..tree.len() {
		let key = cursor.next().expect("cursor ended early");
		if let Some(prev) = previous {
			assert!(prev < key, "{prev:?} not before {key:?}");
		}
		previous = Some(key);
	}
	assert_eq!(cursor.next(), None);
}

#[test]
fn unseeded_cursor_yields_every_entry_descending() {
	let tree = shuffled_tree(2_000, 2);
	let mut cursor = tree.cursor(|v, _| *v);

	let walked: Vec<_> = (0..tree.len()).map(|_| cursor.prev().unwrap()).collect();
	let expected: Vec<_> = (0..2_000).rev().collect();
	assert_eq!(walked, expected);
	assert_eq!(cursor.prev(), None);
}

#[test]
fn cursor_agrees_with_iter_in_both_directions() {
	let tree = shuffled_tree(500, 3);

	let forward: Vec<_> = tree.iter().map(|(k, v)| (*k, *v)).collect();
	let mut cursor = tree.cursor(|v, k| (*k, *v));
	let walked: Vec<_> = std::iter::from_fn(|| cursor.next()).collect();
	assert_eq!(walked, forward);

	let backward: Vec<_> = tree.iter().rev().map(|(k, v)| (*k, *v)).collect();
	let mut cursor = tree.cursor(|v, k| (*k, *v));
	let walked: Vec<_> = std::iter::from_fn(|| cursor.prev()).collect();
	assert_eq!(walked, backward);
}

// ===========================================================================
// Seeking
// ===========================================================================

#[test]
fn seek_between_points() {
	let mut tree = IntervalTree::new();
	tree.insert(iv(3, 3), "three");
	tree.insert(iv(7, 7), "seven");

	let mut cursor = tree.cursor_from(iv(5, 5), |v, _| *v);
	assert_eq!(cursor.next(), Some("seven"));

	let mut cursor = tree.cursor_from(iv(5, 5), |v, _| *v);
	assert_eq!(cursor.prev(), Some("three"));
}

#[test]
fn seek_orders_by_high_bound_on_equal_low() {
	let mut tree = IntervalTree::new();
	tree.insert(iv(10, 12), 'a');
	tree.insert(iv(10, 20), 'b');
	tree.insert(iv(10, 30), 'c');

	// [10, 15] sits between [10, 12] and [10, 20].
	assert_eq!(tree.cursor_from(iv(10, 15), |v, _| *v).next(), Some('b'));
	assert_eq!(tree.cursor_from(iv(10, 15), |v, _| *v).prev(), Some('a'));
	// [10, 10] sorts before all three.
	assert_eq!(tree.cursor_from(iv(10, 10), |v, _| *v).next(), Some('a'));
	assert_eq!(tree.cursor_from(iv(10, 10), |v, _| *v).prev(), None);
}

#[test]
fn seek_then_walk_to_the_end() {
	let tree = shuffled_tree(1_000, 4);
	// Keys are [10k, 10k + x]; [4005, 4005] lands just before k = 401.
	let mut cursor = tree.cursor_from(iv(4_005, 4_005), |v, _| *v);
	let rest: Vec<_> = std::iter::from_fn(|| cursor.next()).collect();
	assert_eq!(rest, (401..1_000).collect::<Vec<_>>());
}

#[test]
fn random_seeks_match_linear_scan() {
	let tree = shuffled_tree(300, 5);
	let keys: Vec<Interval<i64>> = tree.iter().map(|(k, _)| *k).collect();
	let mut rng = StdRng::seed_from_u64(55);

	for _ in 0..500 {
		let low = rng.random_range(-20..3_100);
		let target = iv(low, low + rng.random_range(0..60));

		let after = keys.iter().find(|k| **k >= target).copied();
		let before = keys.iter().rev().find(|k| **k <= target).copied();

		assert_eq!(tree.cursor_from(target, |_, k| *k).next(), after, "next from {target:?}");
		assert_eq!(tree.cursor_from(target, |_, k| *k).prev(), before, "prev from {target:?}");
	}
}

// ===========================================================================
// Exhaustion and Restart
// ===========================================================================

#[test]
fn exhausted_cursor_restarts_from_minimum() {
	let tree = shuffled_tree(50, 6);
	let mut cursor = tree.cursor(|v, _| *v);
	for _ in 0..50 {
		assert!(cursor.next().is_some());
	}
	assert_eq!(cursor.next(), None);
	assert_eq!(cursor.next(), Some(0));
	assert_eq!(cursor.next(), Some(1));
}

#[test]
fn exhausted_cursor_restarts_from_maximum() {
	let tree = shuffled_tree(50, 7);
	let mut cursor = tree.cursor(|v, _| *v);
	while cursor.prev().is_some() {}
	assert_eq!(cursor.prev(), Some(49));
}

#[test]
fn running_off_the_end_then_reversing_restarts_at_maximum() {
	let tree = shuffled_tree(10, 8);
	let mut cursor = tree.cursor(|v, _| *v);
	while cursor.next().is_some() {}
	// Exhausted forgets where it was; prev() re-anchors at the maximum.
	assert_eq!(cursor.prev(), Some(9));
	assert_eq!(cursor.prev(), Some(8));
}

#[test]
fn empty_tree_cursor_is_inert() {
	let tree: IntervalTree<i64, ()> = IntervalTree::new();
	let mut cursor = tree.cursor(|_, k| *k);
	let mut seeded = tree.cursor_from(iv(1, 2), |_, k| *k);
	for _ in 0..100 {
		assert_eq!(cursor.next(), None);
		assert_eq!(cursor.prev(), None);
		assert_eq!(seeded.next(), None);
		assert_eq!(seeded.prev(), None);
	}
}

// ===========================================================================
// Mixed Direction
// ===========================================================================

#[test]
fn next_then_prev_returns_the_predecessor() {
	let tree = shuffled_tree(100, 9);
	for start in [0, 1, 50, 98] {
		let mut cursor = tree.cursor_from(iv(start * 10, start * 10), |v, _| *v);
		assert_eq!(cursor.next(), Some(start));
		assert_eq!(cursor.next(), Some(start + 1));
		assert_eq!(cursor.prev(), Some(start));
	}
}

#[test]
fn prev_from_minimum_exhausts_then_wraps_to_maximum() {
	let tree = shuffled_tree(20, 10);
	let mut cursor = tree.cursor(|v, _| *v);
	assert_eq!(cursor.next(), Some(0));
	assert_eq!(cursor.prev(), None);
	assert_eq!(cursor.prev(), Some(19));
}

// ===========================================================================
// Mapping Function
// ===========================================================================

#[test]
fn map_called_once_per_successful_step() {
	let mut tree = IntervalTree::new();
	tree.insert(iv(1, 4), "a");
	tree.insert(iv(2, 3), "b");
	tree.insert(iv(5, 9), "c");

	let calls = RefCell::new(Vec::new());
	let mut cursor = tree.cursor(|v, k| {
		calls.borrow_mut().push((*v, *k));
		v.len()
	});

	assert_eq!(cursor.next(), Some(1));
	assert_eq!(cursor.next(), Some(1));
	assert_eq!(cursor.prev(), Some(1));
	assert_eq!(cursor.prev(), None);
	assert_eq!(cursor.prev(), Some(1));

	assert_eq!(
		*calls.borrow(),
		vec![("a", iv(1, 4)), ("b", iv(2, 3)), ("a", iv(1, 4)), ("c", iv(5, 9))]
	);
}

// ===========================================================================
// Tree Workloads
// ===========================================================================

#[test]
fn large_scale_insert_and_lookup() {
	let tree = shuffled_tree(10_000, 11);
	assert_eq!(tree.len(), 10_000);
	for (k, v) in tree.iter() {
		assert_eq!(tree.get(k), Some(v));
	}
	assert!(tree.height() <= 20, "height {} too large", tree.height());
}

#[test]
fn interleaved_insert_remove_keeps_cursor_order() {
	let mut tree = IntervalTree::new();
	let mut rng = StdRng::seed_from_u64(12);
	let mut live = std::collections::BTreeSet::new();

	for _ in 0..5_000 {
		let low = rng.random_range(0..1_000);
		let key = iv(low, low + 5);
		if rng.random_bool(0.6) {
			tree.insert(key, low);
			live.insert(key);
		} else {
			tree.remove(&key);
			live.remove(&key);
		}
	}

	let mut cursor = tree.cursor(|_, k| *k);
	let walked: Vec<_> = std::iter::from_fn(|| cursor.next()).collect();
	assert_eq!(walked, live.into_iter().collect::<Vec<_>>());
}

#[test]
fn overlap_query_over_schedule() {
	let mut tree = IntervalTree::new();
	tree.insert(iv(900, 1_000), "standup");
	tree.insert(iv(1_000, 1_200), "review");
	tree.insert(iv(1_300, 1_400), "lunch");
	tree.insert(iv(1_100, 1_500), "oncall");
	tree.insert(iv(1_600, 1_700), "retro");

	let busy: Vec<_> = tree.overlaps(&iv(1_150, 1_310)).map(|(_, v)| *v).collect();
	assert_eq!(busy, vec!["review", "oncall", "lunch"]);

	let at_ten: Vec<_> = tree.overlaps_point(&1_000).map(|(_, v)| *v).collect();
	assert_eq!(at_ten, vec!["standup", "review"]);
}

#[test]
fn handle_lookup_after_unrelated_removals() {
	let mut tree = shuffled_tree(200, 13);
	let keep = tree.find(&tree.iter().nth(100).map(|(k, _)| *k).unwrap()).unwrap();
	let doomed: Vec<_> = tree.iter().filter(|(_, v)| **v % 2 == 1).map(|(k, _)| *k).collect();
	for k in &doomed {
		tree.remove(k);
	}
	assert_eq!(tree.node(keep).map(|(_, v)| *v), Some(100));
}
