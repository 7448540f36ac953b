//! Arena storage for tree nodes.
//!
//! Nodes never point at each other directly. Every link is a `u32` index
//! into [`Arena::slots`], which keeps the parent links cycle-safe and leaves
//! ownership with the arena alone. Freed slots are recycled through a free
//! list; each slot carries a generation counter that is bumped on free so
//! that a [`NodeId`] taken before the removal can be recognised as stale.

use crate::interval::Interval;
use std::cmp;
use std::fmt;

/// A handle to a node in an [`IntervalTree`](crate::IntervalTree).
///
/// Handles are plain copyable values. They do not keep the node alive and
/// do not borrow the tree. A handle outlives its node if that node is
/// removed, in which case [`IntervalTree::contains_node`] reports it as stale.
///
/// [`IntervalTree::contains_node`]: crate::IntervalTree::contains_node
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
	pub(crate) index: u32,
	pub(crate) generation: u32,
}

impl fmt::Debug for NodeId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "NodeId({}v{})", self.index, self.generation)
	}
}

/// A tree node: one entry plus its links and AVL metadata.
pub(crate) struct Node<T, V> {
	pub key: Interval<T>,
	pub value: V,
	pub parent: Option<u32>,
	pub left: Option<u32>,
	pub right: Option<u32>,
	/// Height of the subtree rooted here; a leaf has height 1.
	pub height: u8,
	/// Largest high bound in the subtree rooted here.
	pub max: T,
}

impl<T: Clone, V> Node<T, V> {
	pub fn new(key: Interval<T>, value: V, parent: Option<u32>) -> Self {
		let max = key.high().clone();
		Node {
			key,
			value,
			parent,
			left: None,
			right: None,
			height: 1,
			max,
		}
	}
}

impl<T: fmt::Debug, V: fmt::Debug> fmt::Debug for Node<T, V> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Node")
			.field("key", &self.key)
			.field("value", &self.value)
			.field("height", &self.height)
			.field("max", &self.max)
			.finish()
	}
}

pub(crate) struct Slot<T, V> {
	pub generation: u32,
	pub node: Option<Node<T, V>>,
}

/// Index arena backing a tree.
pub(crate) struct Arena<T, V> {
	pub slots: Vec<Slot<T, V>>,
	free: Vec<u32>,
}

impl<T, V> Arena<T, V> {
	pub fn with_capacity(capacity: usize) -> Self {
		Arena {
			slots: Vec::with_capacity(capacity),
			free: Vec::new(),
		}
	}

	/// Stores `node`, reusing a freed slot when one is available.
	///
	/// # Panics
	///
	/// Panics if the arena would need more than `u32::MAX` slots.
	pub fn alloc(&mut self, node: Node<T, V>) -> u32 {
		if let Some(index) = self.free.pop() {
			let slot = &mut self.slots[index as usize];
			debug_assert!(slot.node.is_none(), "free list holds a live slot");
			slot.node = Some(node);
			return index;
		}
		let index = u32::try_from(self.slots.len()).expect("interval tree arena exhausted");
		self.slots.push(Slot {
			generation: 0,
			node: Some(node),
		});
		index
	}

	/// Removes the node at `index`, returning it and retiring its handle.
	pub fn free(&mut self, index: u32) -> Node<T, V> {
		let slot = &mut self.slots[index as usize];
		let node = slot.node.take().expect("freeing a vacant slot");
		slot.generation = slot.generation.wrapping_add(1);
		self.free.push(index);
		node
	}

	#[inline]
	pub fn get(&self, index: u32) -> &Node<T, V> {
		self.slots[index as usize].node.as_ref().expect("link to a vacant slot")
	}

	#[inline]
	pub fn get_mut(&mut self, index: u32) -> &mut Node<T, V> {
		self.slots[index as usize].node.as_mut().expect("link to a vacant slot")
	}

	/// Builds the handle for a live index.
	#[inline]
	pub fn handle(&self, index: u32) -> NodeId {
		NodeId {
			index,
			generation: self.slots[index as usize].generation,
		}
	}

	/// Maps a handle back to its index if it still names a live node.
	#[inline]
	pub fn resolve(&self, id: NodeId) -> Option<u32> {
		match self.slots.get(id.index as usize) {
			Some(slot) if slot.generation == id.generation && slot.node.is_some() => Some(id.index),
			_ => None,
		}
	}

	pub fn free_len(&self) -> usize {
		self.free.len()
	}

	#[inline]
	pub fn height(&self, index: Option<u32>) -> u8 {
		index.map_or(0, |i| self.get(i).height)
	}
}

impl<T: Ord + Clone, V> Arena<T, V> {
	/// Recomputes the height and `max` augmentation of `index` from its
	/// children.
	pub fn update(&mut self, index: u32) {
		let (left, right) = {
			let node = self.get(index);
			(node.left, node.right)
		};
		let height = 1 + cmp::max(self.height(left), self.height(right));
		let mut max = self.get(index).key.high().clone();
		for child in [left, right].into_iter().flatten() {
			let child_max = &self.get(child).max;
			if *child_max > max {
				max = child_max.clone();
			}
		}
		let node = self.get_mut(index);
		node.height = height;
		node.max = max;
	}
}
