//! # Ivtree: An Arena-Backed Interval Tree with a Seekable Cursor
//!
//! This crate provides an AVL interval tree whose nodes live in an index
//! arena, plus a stateful [`Cursor`] that walks the tree's intervals in
//! either direction, optionally starting from a target interval that need
//! not be present in the tree.
//!
//! ## Design Overview
//!
//! **Index arena**: Nodes are stored in a `Vec` and link to their parent
//! and children by `u32` index. There are no owning pointers between nodes,
//! so parent links cannot form reference cycles, and a [`NodeId`] handle is
//! just a copyable index plus a generation counter.
//!
//! **Augmentation**: Each node records the height of its subtree (for AVL
//! balancing) and the largest high bound found in its subtree (for pruning
//! overlap searches).
//!
//! **Traversal contract**: The cursor does not know about arenas. It
//! consumes the [`Traverse`] trait: successor, predecessor, nearest
//! at-or-after, nearest at-or-before, minimum and maximum. Each is a bounded
//! walk along links, so a cursor step never rescans the tree.
//!
//! ### Tree Structure
//!
//! ```text
//!                 ┌──────────────────┐
//!                 │  [4, 9]  max=12  │  <- root
//!                 └────────┬─────────┘
//!                ┌─────────┴─────────┐
//!                ▼                   ▼
//!      ┌──────────────────┐ ┌──────────────────┐
//!      │  [1, 3]  max=6   │ │  [7, 12] max=12  │
//!      └────────┬─────────┘ └──────────────────┘
//!               └──────────┐
//!                          ▼
//!                 ┌──────────────────┐
//!                 │  [2, 6]  max=6   │
//!                 └──────────────────┘
//! ```
//!
//! ## Basic Usage
//!
//! ```
//! use ivtree::{Interval, IntervalTree};
//!
//! let mut tree = IntervalTree::new();
//! tree.insert(Interval::new(1, 3).unwrap(), "a");
//! tree.insert(Interval::new(4, 9).unwrap(), "b");
//! tree.insert(Interval::new(7, 12).unwrap(), "c");
//!
//! // Walk backwards from [5, 5], which is not itself in the tree.
//! let mut cursor = tree.cursor_from(Interval::point(5), |v, _| *v);
//! assert_eq!(cursor.prev(), Some("b"));
//! assert_eq!(cursor.prev(), Some("a"));
//! assert_eq!(cursor.prev(), None);
//!
//! // Overlap search.
//! let hits: Vec<_> = tree.overlaps(&Interval::new(8, 8).unwrap()).map(|(_, v)| *v).collect();
//! assert_eq!(hits, vec!["b", "c"]);
//! ```
//!
//! ## Mutation and Cursors
//!
//! A cursor holds a shared borrow of its tree, so the borrow checker rejects
//! any insert or remove while a cursor is alive. Handles obtained with
//! [`IntervalTree::find`] are not borrows; if their node is removed they go
//! stale, which [`IntervalTree::contains_node`] reports.

use smallvec::SmallVec;
use std::fmt;
use std::mem;
use tracing::{debug, trace};

pub mod cursor;
pub mod error;
pub mod interval;
pub mod iter;
pub mod traverse;

#[cfg(any(test, feature = "test-utils"))]
pub mod alloc;

mod node;

#[cfg(test)]
mod util;

pub use cursor::Cursor;
pub use interval::Interval;
pub use node::NodeId;
pub use traverse::Traverse;

use error::{Error, Result};
use node::{Arena, Node};

// ---------------------------------------------------------------------------
// Core Tree Structure
// ---------------------------------------------------------------------------

/// An AVL interval tree mapping closed intervals to values.
///
/// Entries are ordered by interval (low bound, then high bound). Inserting
/// an interval that is already present replaces its value.
///
/// # Type Parameters
///
/// - `T`: The endpoint type. Must implement `Ord + Clone`; the clone is
///   taken when a node's subtree maximum is recomputed.
/// - `V`: The value type.
pub struct IntervalTree<T, V> {
	/// Node storage. All links are indices into this arena.
	pub(crate) arena: Arena<T, V>,

	/// Index of the root node, `None` when the tree is empty.
	pub(crate) root: Option<u32>,

	/// Number of live entries.
	len: usize,
}

/// Direction for tree traversal operations.
#[derive(Debug, PartialEq, Copy, Clone)]
pub(crate) enum Direction {
	/// Toward higher keys.
	Forward,
	/// Toward lower keys.
	Reverse,
}

impl<T: Ord + Clone, V> Default for IntervalTree<T, V> {
	fn default() -> Self {
		Self::new()
	}
}

// ---------------------------------------------------------------------------
// IntervalTree Implementation
// ---------------------------------------------------------------------------

impl<T: Ord + Clone, V> IntervalTree<T, V> {
	// -----------------------------------------------------------------------
	// Construction
	// -----------------------------------------------------------------------

	/// Creates a new, empty tree. Does not allocate.
	///
	/// # Example
	///
	/// ```
	/// use ivtree::IntervalTree;
	///
	/// let tree: IntervalTree<u32, String> = IntervalTree::new();
	/// assert!(tree.is_empty());
	/// assert_eq!(tree.height(), 0);
	/// ```
	pub fn new() -> Self {
		Self::with_capacity(0)
	}

	/// Creates an empty tree with room for `capacity` nodes before the
	/// arena reallocates.
	pub fn with_capacity(capacity: usize) -> Self {
		IntervalTree {
			arena: Arena::with_capacity(capacity),
			root: None,
			len: 0,
		}
	}

	// -----------------------------------------------------------------------
	// Tree Metadata
	// -----------------------------------------------------------------------

	/// Returns the number of entries in the tree.
	pub fn len(&self) -> usize {
		self.len
	}

	/// Returns `true` if the tree contains no entries.
	pub fn is_empty(&self) -> bool {
		self.root.is_none()
	}

	/// Returns the height of the tree: 0 when empty, 1 for a single node.
	///
	/// AVL balancing keeps this below `1.45 * log2(len + 2)`.
	pub fn height(&self) -> usize {
		self.arena.height(self.root) as usize
	}

	// -----------------------------------------------------------------------
	// Lookup
	// -----------------------------------------------------------------------

	/// Returns the handle of the node storing `interval`, if present.
	pub fn find(&self, interval: &Interval<T>) -> Option<NodeId> {
		self.find_index(interval).map(|i| self.arena.handle(i))
	}

	fn find_index(&self, interval: &Interval<T>) -> Option<u32> {
		let root = self.root?;
		traverse::lower_bound(&self.arena, root, interval)
			.filter(|&i| self.arena.get(i).key == *interval)
	}

	/// Returns a reference to the value stored for `interval`.
	pub fn get(&self, interval: &Interval<T>) -> Option<&V> {
		self.find_index(interval).map(|i| &self.arena.get(i).value)
	}

	/// Returns a mutable reference to the value stored for `interval`.
	pub fn get_mut(&mut self, interval: &Interval<T>) -> Option<&mut V> {
		let i = self.find_index(interval)?;
		Some(&mut self.arena.get_mut(i).value)
	}

	/// Returns `true` if the tree contains a value for `interval`.
	pub fn contains_key(&self, interval: &Interval<T>) -> bool {
		self.find_index(interval).is_some()
	}

	/// Returns the entry behind a handle, or `None` if the handle is stale.
	pub fn node(&self, id: NodeId) -> Option<(&Interval<T>, &V)> {
		let i = self.arena.resolve(id)?;
		let node = self.arena.get(i);
		Some((&node.key, &node.value))
	}

	/// Returns `true` if `id` still names a live node of this tree.
	pub fn contains_node(&self, id: NodeId) -> bool {
		self.arena.resolve(id).is_some()
	}

	/// Returns the entry with the smallest interval.
	pub fn first_key_value(&self) -> Option<(&Interval<T>, &V)> {
		let i = traverse::minimum(&self.arena, self.root?);
		let node = self.arena.get(i);
		Some((&node.key, &node.value))
	}

	/// Returns the entry with the largest interval.
	pub fn last_key_value(&self) -> Option<(&Interval<T>, &V)> {
		let i = traverse::maximum(&self.arena, self.root?);
		let node = self.arena.get(i);
		Some((&node.key, &node.value))
	}

	// -----------------------------------------------------------------------
	// Insertion
	// -----------------------------------------------------------------------

	/// Inserts an entry, returning the previous value if `interval` was
	/// already present.
	///
	/// Replacing a value leaves the tree shape, and every handle, untouched.
	///
	/// # Example
	///
	/// ```
	/// use ivtree::{Interval, IntervalTree};
	///
	/// let mut tree = IntervalTree::new();
	/// let key = Interval::new(1, 4).unwrap();
	/// assert_eq!(tree.insert(key, "one"), None);
	/// assert_eq!(tree.insert(key, "uno"), Some("one"));
	/// assert_eq!(tree.len(), 1);
	/// ```
	pub fn insert(&mut self, interval: Interval<T>, value: V) -> Option<V> {
		let Some(mut curr) = self.root else {
			self.root = Some(self.arena.alloc(Node::new(interval, value, None)));
			self.len = 1;
			return None;
		};

		loop {
			let node = self.arena.get(curr);
			let (next, go_left) = match interval.cmp(&node.key) {
				std::cmp::Ordering::Equal => {
					let node = self.arena.get_mut(curr);
					return Some(mem::replace(&mut node.value, value));
				}
				std::cmp::Ordering::Less => (node.left, true),
				std::cmp::Ordering::Greater => (node.right, false),
			};
			match next {
				Some(child) => curr = child,
				None => {
					let child = self.arena.alloc(Node::new(interval, value, Some(curr)));
					let parent = self.arena.get_mut(curr);
					if go_left {
						parent.left = Some(child);
					} else {
						parent.right = Some(child);
					}
					break;
				}
			}
		}

		self.len += 1;
		self.retrace(Some(curr));
		None
	}

	// -----------------------------------------------------------------------
	// Removal
	// -----------------------------------------------------------------------

	/// Removes `interval`, returning its value if it was present.
	pub fn remove(&mut self, interval: &Interval<T>) -> Option<V> {
		self.remove_entry(interval).map(|(_, v)| v)
	}

	/// Removes `interval`, returning the stored key and value.
	pub fn remove_entry(&mut self, interval: &Interval<T>) -> Option<(Interval<T>, V)> {
		let i = self.find_index(interval)?;
		Some(self.unlink(i))
	}

	/// Removes the node behind a handle.
	///
	/// Returns [`Error::StaleNode`] if the node was already removed.
	pub fn remove_node(&mut self, id: NodeId) -> Result<(Interval<T>, V)> {
		match self.arena.resolve(id) {
			Some(i) => Ok(self.unlink(i)),
			None => {
				debug!(node = ?id, "remove_node called with stale handle");
				Err(Error::StaleNode)
			}
		}
	}

	/// Removes every entry. Outstanding handles become stale.
	pub fn clear(&mut self) {
		// Bumping every live generation keeps old handles from resolving
		// once their slots are reused.
		let live: Vec<u32> = self.iter_indices().collect();
		for i in live {
			self.arena.free(i);
		}
		self.root = None;
		self.len = 0;
	}

	/// Detaches node `i` and frees its slot.
	///
	/// A node with two children is replaced by its in-order successor,
	/// which is relinked into the removed node's position. Entries never
	/// move between slots, so every other handle stays valid.
	fn unlink(&mut self, i: u32) -> (Interval<T>, V) {
		let (parent, left, right) = {
			let node = self.arena.get(i);
			(node.parent, node.left, node.right)
		};

		let retrace_from = match (left, right) {
			(Some(l), Some(r)) => {
				let s = traverse::minimum(&self.arena, r);
				let from = if s == r {
					Some(s)
				} else {
					// Detach the successor from deep in the right subtree.
					let sp = self.arena.get(s).parent.expect("successor below its subtree root");
					let sr = self.arena.get(s).right;
					self.arena.get_mut(sp).left = sr;
					if let Some(sr) = sr {
						self.arena.get_mut(sr).parent = Some(sp);
					}
					self.arena.get_mut(s).right = Some(r);
					self.arena.get_mut(r).parent = Some(s);
					Some(sp)
				};
				self.arena.get_mut(s).left = Some(l);
				self.arena.get_mut(l).parent = Some(s);
				self.arena.get_mut(s).parent = parent;
				self.replace_child(parent, i, Some(s));
				from
			}
			(child, None) | (None, child) => {
				if let Some(c) = child {
					self.arena.get_mut(c).parent = parent;
				}
				self.replace_child(parent, i, child);
				parent
			}
		};

		let node = self.arena.free(i);
		self.len -= 1;
		self.retrace(retrace_from);
		(node.key, node.value)
	}

	// -----------------------------------------------------------------------
	// Rebalancing
	// -----------------------------------------------------------------------

	/// Points `parent`'s link to `old` at `new` instead, or the root when
	/// `parent` is `None`.
	fn replace_child(&mut self, parent: Option<u32>, old: u32, new: Option<u32>) {
		match parent {
			None => self.root = new,
			Some(p) => {
				let p = self.arena.get_mut(p);
				if p.left == Some(old) {
					p.left = new;
				} else {
					debug_assert_eq!(p.right, Some(old), "parent does not link to child");
					p.right = new;
				}
			}
		}
	}

	/// Walks from `from` to the root, refreshing metadata and rotating any
	/// node whose balance factor left `[-1, 1]`.
	fn retrace(&mut self, mut from: Option<u32>) {
		while let Some(i) = from {
			let top = self.rebalance(i);
			from = self.arena.get(top).parent;
		}
	}

	/// Restores the AVL property at `i`, returning the new subtree root.
	fn rebalance(&mut self, i: u32) -> u32 {
		self.arena.update(i);
		let balance = self.balance_factor(i);
		if balance > 1 {
			let l = self.arena.get(i).left.expect("left-heavy node has a left child");
			if self.balance_factor(l) < 0 {
				self.rotate_left(l);
			}
			self.rotate_right(i)
		} else if balance < -1 {
			let r = self.arena.get(i).right.expect("right-heavy node has a right child");
			if self.balance_factor(r) > 0 {
				self.rotate_right(r);
			}
			self.rotate_left(i)
		} else {
			i
		}
	}

	fn balance_factor(&self, i: u32) -> i32 {
		let node = self.arena.get(i);
		self.arena.height(node.left) as i32 - self.arena.height(node.right) as i32
	}

	/// ```text
	///     x                y
	///    / \              / \
	///   a   y     =>     x   c
	///      / \          / \
	///     b   c        a   b
	/// ```
	fn rotate_left(&mut self, x: u32) -> u32 {
		let y = self.arena.get(x).right.expect("rotate_left without right child");
		trace!(pivot = x, "rotate left");
		let b = self.arena.get(y).left;
		let parent = self.arena.get(x).parent;

		self.arena.get_mut(x).right = b;
		if let Some(b) = b {
			self.arena.get_mut(b).parent = Some(x);
		}
		self.arena.get_mut(y).parent = parent;
		self.replace_child(parent, x, Some(y));
		self.arena.get_mut(y).left = Some(x);
		self.arena.get_mut(x).parent = Some(y);

		self.arena.update(x);
		self.arena.update(y);
		y
	}

	/// Mirror of [`Self::rotate_left`].
	fn rotate_right(&mut self, x: u32) -> u32 {
		let y = self.arena.get(x).left.expect("rotate_right without left child");
		trace!(pivot = x, "rotate right");
		let b = self.arena.get(y).right;
		let parent = self.arena.get(x).parent;

		self.arena.get_mut(x).left = b;
		if let Some(b) = b {
			self.arena.get_mut(b).parent = Some(x);
		}
		self.arena.get_mut(y).parent = parent;
		self.replace_child(parent, x, Some(y));
		self.arena.get_mut(y).right = Some(x);
		self.arena.get_mut(x).parent = Some(y);

		self.arena.update(x);
		self.arena.update(y);
		y
	}

	// -----------------------------------------------------------------------
	// Iteration
	// -----------------------------------------------------------------------

	/// Returns a cursor that starts at an extremity of the tree.
	///
	/// `map` receives `(value, key)` for every entry the cursor lands on.
	pub fn cursor<R, F>(&self, map: F) -> Cursor<'_, Self, R, F>
	where
		F: FnMut(&V, &Interval<T>) -> R,
	{
		Cursor::new(self, None, map)
	}

	/// Returns a cursor whose first step lands at or next to `interval`.
	///
	/// The first `next()` yields the smallest interval `>= interval`, the
	/// first `prev()` the largest interval `<= interval`.
	pub fn cursor_from<R, F>(&self, interval: Interval<T>, map: F) -> Cursor<'_, Self, R, F>
	where
		F: FnMut(&V, &Interval<T>) -> R,
	{
		Cursor::new(self, Some(interval), map)
	}

	/// Returns an ascending iterator over all entries.
	///
	/// # Example
	///
	/// ```
	/// use ivtree::{Interval, IntervalTree};
	///
	/// let mut tree = IntervalTree::new();
	/// for p in [3, 1, 2] {
	///     tree.insert(Interval::point(p), p);
	/// }
	/// let values: Vec<_> = tree.iter().map(|(_, v)| *v).collect();
	/// assert_eq!(values, vec![1, 2, 3]);
	/// assert_eq!(tree.iter().rev().next().map(|(_, v)| *v), Some(3));
	/// ```
	pub fn iter(&self) -> iter::Iter<'_, T, V> {
		iter::Iter::new(self)
	}

	/// Returns the entries whose interval shares a point with `query`, in
	/// ascending order.
	pub fn overlaps(&self, query: &Interval<T>) -> iter::Overlaps<'_, T, V> {
		iter::Overlaps::new(self, query.clone())
	}

	/// Returns the entries whose interval contains `point`, in ascending
	/// order.
	pub fn overlaps_point(&self, point: &T) -> iter::Overlaps<'_, T, V> {
		iter::Overlaps::new(self, Interval::point(point.clone()))
	}

	fn iter_indices(&self) -> impl Iterator<Item = u32> + '_ {
		let mut stack: SmallVec<[u32; 32]> = SmallVec::new();
		let mut curr = self.root;
		std::iter::from_fn(move || {
			while let Some(i) = curr {
				stack.push(i);
				curr = self.arena.get(i).left;
			}
			let i = stack.pop()?;
			curr = self.arena.get(i).right;
			Some(i)
		})
	}
}

impl<T: fmt::Debug, V: fmt::Debug> fmt::Debug for IntervalTree<T, V>
where
	T: Ord + Clone,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.iter()).finish()
	}
}

impl<T: Ord + Clone, V> Extend<(Interval<T>, V)> for IntervalTree<T, V> {
	fn extend<I: IntoIterator<Item = (Interval<T>, V)>>(&mut self, iter: I) {
		for (interval, value) in iter {
			self.insert(interval, value);
		}
	}
}

impl<T: Ord + Clone, V> FromIterator<(Interval<T>, V)> for IntervalTree<T, V> {
	fn from_iter<I: IntoIterator<Item = (Interval<T>, V)>>(iter: I) -> Self {
		let mut tree = IntervalTree::new();
		tree.extend(iter);
		tree
	}
}

impl<'a, T: Ord + Clone, V> IntoIterator for &'a IntervalTree<T, V> {
	type Item = (&'a Interval<T>, &'a V);
	type IntoIter = iter::Iter<'a, T, V>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

// ===========================================================================
// Test-Only Validation Module
// ===========================================================================

/// Invariant validation for testing.
#[cfg(any(test, feature = "test-utils"))]
impl<T: Ord + Clone + fmt::Debug, V> IntervalTree<T, V> {
	/// Validates all tree invariants. Panics with diagnostic info if any
	/// invariant is violated.
	///
	/// # Invariants Checked
	///
	/// 1. Link symmetry: every child's parent link points back at its parent
	/// 2. Key ordering: an in-order walk yields strictly ascending intervals
	/// 3. Height: every stored height matches the real subtree height
	/// 4. Balance: every balance factor lies in `[-1, 1]`
	/// 5. Augmentation: every `max` is the largest high bound of its subtree
	/// 6. Length: `len` matches the number of reachable nodes
	/// 7. Arena accounting: every slot is either reachable or on the free list
	pub fn assert_invariants(&self) {
		let Some(root) = self.root else {
			assert_eq!(self.len, 0, "Empty tree should have len 0");
			return;
		};
		assert_eq!(self.arena.get(root).parent, None, "Root has a parent link");

		let count = self.validate_node_recursive(root);
		assert_eq!(count, self.len, "len does not match reachable node count");

		let keys: Vec<&Interval<T>> = self.iter_indices().map(|i| &self.arena.get(i).key).collect();
		for pair in keys.windows(2) {
			assert!(pair[0] < pair[1], "Keys out of order: {:?} then {:?}", pair[0], pair[1]);
		}

		let live = self.arena.slots.iter().filter(|s| s.node.is_some()).count();
		assert_eq!(live, self.len, "Arena holds unreachable live slots");
		assert_eq!(
			self.arena.slots.len() - live,
			self.arena.free_len(),
			"Vacant slots missing from the free list"
		);
	}

	/// Recursively validates a subtree, returning its node count.
	fn validate_node_recursive(&self, i: u32) -> usize {
		let node = self.arena.get(i);
		let mut count = 1;
		let mut max = node.key.high().clone();

		for child in [node.left, node.right].into_iter().flatten() {
			let c = self.arena.get(child);
			assert_eq!(c.parent, Some(i), "Child {:?} does not link back to {:?}", c.key, node.key);
			count += self.validate_node_recursive(child);
			if c.max > max {
				max = c.max.clone();
			}
		}

		let lh = self.arena.height(node.left);
		let rh = self.arena.height(node.right);
		assert_eq!(node.height, 1 + lh.max(rh), "Stale height at {:?}", node.key);
		assert!(
			(lh as i32 - rh as i32).abs() <= 1,
			"Unbalanced node {:?}: left height {}, right height {}",
			node.key,
			lh,
			rh
		);
		assert_eq!(node.max, max, "Stale max at {:?}", node.key);
		count
	}
}
