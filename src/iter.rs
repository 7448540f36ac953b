//! Iterators for the `IntervalTree` data structure
use crate::interval::Interval;
use crate::traverse;
use crate::IntervalTree;
use smallvec::SmallVec;
use std::iter::FusedIterator;

/// Ascending iterator over the entries of the tree.
///
/// Built on the same successor/predecessor walks the cursor uses, so each
/// step is a short hop along links. Unlike a [`Cursor`](crate::Cursor) it
/// is fused: once both ends meet it stays exhausted.
pub struct Iter<'t, T, V> {
	tree: &'t IntervalTree<T, V>,
	front: Option<u32>,
	back: Option<u32>,
	remaining: usize,
}

impl<'t, T: Ord + Clone, V> Iter<'t, T, V> {
	pub(crate) fn new(tree: &'t IntervalTree<T, V>) -> Self {
		let (front, back) = match tree.root {
			Some(root) => (
				Some(traverse::minimum(&tree.arena, root)),
				Some(traverse::maximum(&tree.arena, root)),
			),
			None => (None, None),
		};
		Iter {
			tree,
			front,
			back,
			remaining: tree.len(),
		}
	}
}

impl<'t, T, V> Iter<'t, T, V> {
	fn entry(&self, i: u32) -> (&'t Interval<T>, &'t V) {
		let tree = self.tree;
		let node = tree.arena.get(i);
		(&node.key, &node.value)
	}
}

impl<'t, T, V> Iterator for Iter<'t, T, V> {
	type Item = (&'t Interval<T>, &'t V);

	fn next(&mut self) -> Option<Self::Item> {
		if self.remaining == 0 {
			return None;
		}
		let i = self.front?;
		self.remaining -= 1;
		self.front = traverse::successor(&self.tree.arena, i);
		Some(self.entry(i))
	}

	fn size_hint(&self) -> (usize, Option<usize>) {
		(self.remaining, Some(self.remaining))
	}
}

impl<T, V> DoubleEndedIterator for Iter<'_, T, V> {
	fn next_back(&mut self) -> Option<Self::Item> {
		if self.remaining == 0 {
			return None;
		}
		let i = self.back?;
		self.remaining -= 1;
		self.back = traverse::predecessor(&self.tree.arena, i);
		Some(self.entry(i))
	}
}

impl<T, V> ExactSizeIterator for Iter<'_, T, V> {}

impl<T, V> FusedIterator for Iter<'_, T, V> {}

/// Ascending iterator over the entries overlapping a query interval.
///
/// An in-order walk with an explicit stack that skips every subtree whose
/// `max` lies below the query, and stops at the first node whose low bound
/// lies above it.
pub struct Overlaps<'t, T, V> {
	tree: &'t IntervalTree<T, V>,
	query: Interval<T>,
	stack: SmallVec<[u32; 32]>,
}

impl<'t, T: Ord, V> Overlaps<'t, T, V> {
	pub(crate) fn new(tree: &'t IntervalTree<T, V>, query: Interval<T>) -> Self {
		let mut iter = Overlaps {
			tree,
			query,
			stack: SmallVec::new(),
		};
		iter.descend(tree.root);
		iter
	}

	/// Pushes the left spine of `curr`, stopping at subtrees that end
	/// before the query starts.
	fn descend(&mut self, mut curr: Option<u32>) {
		while let Some(i) = curr {
			let node = self.tree.arena.get(i);
			if node.max < *self.query.low() {
				return;
			}
			self.stack.push(i);
			curr = node.left;
		}
	}
}

impl<'t, T: Ord, V> Iterator for Overlaps<'t, T, V> {
	type Item = (&'t Interval<T>, &'t V);

	fn next(&mut self) -> Option<Self::Item> {
		let tree = self.tree;
		while let Some(i) = self.stack.pop() {
			let node = tree.arena.get(i);
			// Everything still stacked, and everything to the right, starts
			// at or after this node.
			if node.key.low() > self.query.high() {
				self.stack.clear();
				return None;
			}
			self.descend(node.right);
			if node.key.overlaps(&self.query) {
				return Some((&node.key, &node.value));
			}
		}
		None
	}
}

impl<T: Ord, V> FusedIterator for Overlaps<'_, T, V> {}
