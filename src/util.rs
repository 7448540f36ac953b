//! Test utilities for loading sample trees from JSON fixtures
//!
//! Fixtures describe an exact tree shape. The loader links nodes directly
//! into the arena instead of inserting them, so tests can start from a
//! known layout; heights and `max` are derived bottom-up from that layout.
use crate::node::{Arena, Node};
use crate::{Interval, IntervalTree};
use serde::Deserialize;

#[derive(Deserialize, Debug)]
struct TreeNode {
	low: i64,
	high: i64,
	value: String,
	left: Option<Box<TreeNode>>,
	right: Option<Box<TreeNode>>,
}

#[derive(Deserialize, Debug)]
struct SampleTree {
	root: Option<TreeNode>,
}

fn translate_node(
	arena: &mut Arena<i64, String>,
	tree_node: TreeNode,
	parent: Option<u32>,
	len: &mut usize,
) -> u32 {
	let TreeNode {
		low,
		high,
		value,
		left,
		right,
	} = tree_node;

	let interval = Interval::new(low, high).expect("fixture interval out of order");
	let index = arena.alloc(Node::new(interval, value, parent));
	*len += 1;
	let left = left.map(|l| translate_node(arena, *l, Some(index), len));
	let right = right.map(|r| translate_node(arena, *r, Some(index), len));

	let node = arena.get_mut(index);
	node.left = left;
	node.right = right;
	arena.update(index);
	index
}

pub fn sample_tree<P: AsRef<std::path::Path>>(path: P) -> IntervalTree<i64, String> {
	let file = std::fs::File::open(path).expect("failed to find file");
	let json_tree: SampleTree = serde_json::from_reader(file).unwrap();

	let mut tree = IntervalTree::new();
	let mut len = 0;
	tree.root = json_tree.root.map(|root| translate_node(&mut tree.arena, root, None, &mut len));
	tree.len = len;
	tree
}
