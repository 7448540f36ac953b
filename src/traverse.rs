//! Ordered traversal primitives.
//!
//! [`Traverse`] is the whole contract a [`Cursor`](crate::Cursor) needs from
//! its host tree. Every method is a bounded walk along parent or child
//! links: none of them visits the whole tree, and none of them recurses.
//!
//! The free functions below implement the contract for the arena used by
//! [`IntervalTree`], working purely on indices.

use crate::interval::Interval;
use crate::node::{Arena, NodeId};
use crate::IntervalTree;
use std::cmp::Ordering;

/// Ordered navigation over the nodes of a binary search tree.
///
/// Handles are opaque. A cursor obtains them from one method and passes them
/// back to another. It never inspects them.
pub trait Traverse {
	/// The search key stored at each node.
	type Key: Ord;
	/// The payload stored alongside each key.
	type Value;
	/// A non-owning reference to a node.
	type Handle: Copy + Eq;

	/// The current root, or `None` if the tree is empty.
	fn root(&self) -> Option<Self::Handle>;

	/// The next node in ascending key order.
	///
	/// Returns `None` for the maximum node or for a stale handle.
	fn successor_of(&self, node: Self::Handle) -> Option<Self::Handle>;

	/// The previous node in ascending key order.
	///
	/// Returns `None` for the minimum node or for a stale handle.
	fn predecessor_of(&self, node: Self::Handle) -> Option<Self::Handle>;

	/// The node with the smallest key `>= key` in the subtree rooted at
	/// `from`. An exact match is returned as-is.
	fn nearest_at_or_after(&self, from: Self::Handle, key: &Self::Key) -> Option<Self::Handle>;

	/// The node with the largest key `<= key` in the subtree rooted at
	/// `from`. An exact match is returned as-is.
	fn nearest_at_or_before(&self, from: Self::Handle, key: &Self::Key)
		-> Option<Self::Handle>;

	/// The leftmost node of the subtree rooted at the live node `subtree`.
	fn minimum_of(&self, subtree: Self::Handle) -> Self::Handle;

	/// The rightmost node of the subtree rooted at the live node `subtree`.
	fn maximum_of(&self, subtree: Self::Handle) -> Self::Handle;

	/// The entry stored at `node`, or `None` for a stale handle.
	fn entry(&self, node: Self::Handle) -> Option<(&Self::Key, &Self::Value)>;

	/// Returns `true` if `node` still names a live node.
	fn is_live(&self, node: Self::Handle) -> bool {
		self.entry(node).is_some()
	}
}

// ---------------------------------------------------------------------------
// Index-level primitives
// ---------------------------------------------------------------------------

/// Leftmost node of the subtree rooted at `curr`.
pub(crate) fn minimum<T, V>(arena: &Arena<T, V>, mut curr: u32) -> u32 {
	while let Some(l) = arena.get(curr).left {
		curr = l;
	}
	curr
}

/// Rightmost node of the subtree rooted at `curr`.
pub(crate) fn maximum<T, V>(arena: &Arena<T, V>, mut curr: u32) -> u32 {
	while let Some(r) = arena.get(curr).right {
		curr = r;
	}
	curr
}

/// In-order successor.
pub(crate) fn successor<T, V>(arena: &Arena<T, V>, mut curr: u32) -> Option<u32> {
	if let Some(r) = arena.get(curr).right {
		return Some(minimum(arena, r));
	}
	// Climb until we arrive from a left child.
	let mut parent = arena.get(curr).parent;
	while let Some(p) = parent {
		if arena.get(p).right == Some(curr) {
			curr = p;
			parent = arena.get(p).parent;
		} else {
			return Some(p);
		}
	}
	None
}

/// In-order predecessor.
pub(crate) fn predecessor<T, V>(arena: &Arena<T, V>, mut curr: u32) -> Option<u32> {
	if let Some(l) = arena.get(curr).left {
		return Some(maximum(arena, l));
	}
	let mut parent = arena.get(curr).parent;
	while let Some(p) = parent {
		if arena.get(p).left == Some(curr) {
			curr = p;
			parent = arena.get(p).parent;
		} else {
			return Some(p);
		}
	}
	None
}

/// Smallest key `>= key` below `from`.
pub(crate) fn lower_bound<T: Ord, V>(
	arena: &Arena<T, V>,
	from: u32,
	key: &Interval<T>,
) -> Option<u32> {
	let mut curr = Some(from);
	let mut best = None;
	while let Some(i) = curr {
		let node = arena.get(i);
		match node.key.cmp(key) {
			Ordering::Equal => return Some(i),
			Ordering::Less => curr = node.right,
			Ordering::Greater => {
				best = Some(i);
				curr = node.left;
			}
		}
	}
	best
}

/// Largest key `<= key` below `from`.
pub(crate) fn upper_bound<T: Ord, V>(
	arena: &Arena<T, V>,
	from: u32,
	key: &Interval<T>,
) -> Option<u32> {
	let mut curr = Some(from);
	let mut best = None;
	while let Some(i) = curr {
		let node = arena.get(i);
		match node.key.cmp(key) {
			Ordering::Equal => return Some(i),
			Ordering::Greater => curr = node.left,
			Ordering::Less => {
				best = Some(i);
				curr = node.right;
			}
		}
	}
	best
}

// ---------------------------------------------------------------------------
// Contract implementation for IntervalTree
// ---------------------------------------------------------------------------

impl<T: Ord, V> Traverse for IntervalTree<T, V> {
	type Key = Interval<T>;
	type Value = V;
	type Handle = NodeId;

	fn root(&self) -> Option<NodeId> {
		self.root.map(|i| self.arena.handle(i))
	}

	fn successor_of(&self, node: NodeId) -> Option<NodeId> {
		let i = self.arena.resolve(node)?;
		successor(&self.arena, i).map(|s| self.arena.handle(s))
	}

	fn predecessor_of(&self, node: NodeId) -> Option<NodeId> {
		let i = self.arena.resolve(node)?;
		predecessor(&self.arena, i).map(|p| self.arena.handle(p))
	}

	fn nearest_at_or_after(&self, from: NodeId, key: &Interval<T>) -> Option<NodeId> {
		let i = self.arena.resolve(from)?;
		lower_bound(&self.arena, i, key).map(|n| self.arena.handle(n))
	}

	fn nearest_at_or_before(&self, from: NodeId, key: &Interval<T>) -> Option<NodeId> {
		let i = self.arena.resolve(from)?;
		upper_bound(&self.arena, i, key).map(|n| self.arena.handle(n))
	}

	fn minimum_of(&self, subtree: NodeId) -> NodeId {
		match self.arena.resolve(subtree) {
			Some(i) => self.arena.handle(minimum(&self.arena, i)),
			None => subtree,
		}
	}

	fn maximum_of(&self, subtree: NodeId) -> NodeId {
		match self.arena.resolve(subtree) {
			Some(i) => self.arena.handle(maximum(&self.arena, i)),
			None => subtree,
		}
	}

	fn entry(&self, node: NodeId) -> Option<(&Interval<T>, &V)> {
		let i = self.arena.resolve(node)?;
		let node = self.arena.get(i);
		Some((&node.key, &node.value))
	}
}
