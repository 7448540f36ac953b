//! Seekable bidirectional cursor.
//!
//! A [`Cursor`] remembers one position in a tree and moves it a single step
//! per call. The first call positions the cursor: either at an extremity of
//! the tree, or at the node nearest a seek target given at construction.
//! Every later call steps to the successor or predecessor of the current
//! node, so a full walk costs one parent-link step per entry rather than one
//! root-to-leaf search per entry.
//!
//! ## States
//!
//! ```text
//!        Seek(key) ──┐          ┌── Unseeded
//!                    ▼          ▼
//!              ┌──────────────────────┐
//!              │   Positioned(node)   │ ◄──┐ successor / predecessor
//!              └──────────┬───────────┘ ───┘
//!                         │ no neighbour
//!                         ▼
//!                    Exhausted ── next/prev re-anchors at min/max
//! ```
//!
//! `Exhausted` re-anchors exactly like `Unseeded`: stepping past either end
//! and calling again restarts from the minimum (`next`) or maximum
//! (`prev`). Traversal is cyclic while the tree is non-empty.

use crate::traverse::Traverse;
use crate::Direction;
use std::fmt;
use tracing::trace;

/// Where a cursor is, or where it will start.
#[derive(Clone, Copy, PartialEq, Eq)]
enum SeekState<K, H> {
	/// Constructed with a target, never stepped.
	Seek(K),
	/// Constructed without a target, never stepped.
	Unseeded,
	/// Anchored at a live node.
	Positioned(H),
	/// A step found no node, or the tree is empty.
	Exhausted,
}

impl<K, H> SeekState<K, H> {
	fn name(&self) -> &'static str {
		match self {
			SeekState::Seek(_) => "seek",
			SeekState::Unseeded => "unseeded",
			SeekState::Positioned(_) => "positioned",
			SeekState::Exhausted => "exhausted",
		}
	}
}

/// A stateful cursor over the entries of a [`Traverse`] tree.
///
/// The cursor borrows the tree, so the tree cannot be modified while the
/// cursor is alive. Each yielded entry is passed through the mapping
/// function given at construction, as `map(value, key)`.
///
/// # Example
///
/// ```
/// use ivtree::{Interval, IntervalTree};
///
/// let mut tree = IntervalTree::new();
/// for p in [3, 7, 11] {
///     tree.insert(Interval::point(p), p * 10);
/// }
///
/// // Start just after [5, 5], which is not in the tree.
/// let mut cursor = tree.cursor_from(Interval::point(5), |v, _| *v);
/// assert_eq!(cursor.next(), Some(70));
/// assert_eq!(cursor.next(), Some(110));
/// assert_eq!(cursor.prev(), Some(70));
/// ```
pub struct Cursor<'t, Tr, R, F>
where
	Tr: Traverse,
	F: FnMut(&Tr::Value, &Tr::Key) -> R,
{
	tree: &'t Tr,
	state: SeekState<Tr::Key, Tr::Handle>,
	map: F,
}

impl<'t, Tr, R, F> Cursor<'t, Tr, R, F>
where
	Tr: Traverse,
	F: FnMut(&Tr::Value, &Tr::Key) -> R,
{
	/// Creates a cursor over `tree`.
	///
	/// With `seek` set, the first `next()` lands on the smallest key
	/// `>= seek` and the first `prev()` on the largest key `<= seek`. The
	/// target only seeds that first step; it is dropped afterwards. Without
	/// `seek`, the first step lands on the minimum or maximum.
	pub fn new(tree: &'t Tr, seek: Option<Tr::Key>, map: F) -> Self {
		let state = match seek {
			Some(key) => SeekState::Seek(key),
			None => SeekState::Unseeded,
		};
		Cursor {
			tree,
			state,
			map,
		}
	}

	/// Steps forward and returns the mapped entry, or `None` past the end.
	#[allow(clippy::should_implement_trait)]
	#[inline]
	pub fn next(&mut self) -> Option<R> {
		self.step(Direction::Forward)
	}

	/// Steps backward and returns the mapped entry, or `None` past the start.
	#[inline]
	pub fn prev(&mut self) -> Option<R> {
		self.step(Direction::Reverse)
	}

	/// Returns `true` unless the cursor is positioned at a node that is no
	/// longer in the tree.
	pub fn is_valid(&self) -> bool {
		match self.state {
			SeekState::Positioned(node) => self.tree.is_live(node),
			_ => true,
		}
	}

	fn step(&mut self, direction: Direction) -> Option<R> {
		let tree = self.tree;
		let from = std::mem::replace(&mut self.state, SeekState::Exhausted);
		let from_name = from.name();
		let found = match (from, direction) {
			(SeekState::Positioned(node), Direction::Forward) => tree.successor_of(node),
			(SeekState::Positioned(node), Direction::Reverse) => tree.predecessor_of(node),
			(SeekState::Seek(key), Direction::Forward) => {
				tree.root().and_then(|root| tree.nearest_at_or_after(root, &key))
			}
			(SeekState::Seek(key), Direction::Reverse) => {
				tree.root().and_then(|root| tree.nearest_at_or_before(root, &key))
			}
			(SeekState::Unseeded | SeekState::Exhausted, Direction::Forward) => {
				tree.root().map(|root| tree.minimum_of(root))
			}
			(SeekState::Unseeded | SeekState::Exhausted, Direction::Reverse) => {
				tree.root().map(|root| tree.maximum_of(root))
			}
		};

		let Some(node) = found else {
			trace!(?direction, from = from_name, "cursor exhausted");
			return None;
		};
		let (key, value) = tree.entry(node)?;
		self.state = SeekState::Positioned(node);
		trace!(?direction, from = from_name, "cursor positioned");
		Some((self.map)(value, key))
	}
}

impl<Tr, R, F> fmt::Debug for Cursor<'_, Tr, R, F>
where
	Tr: Traverse,
	Tr::Key: fmt::Debug,
	Tr::Handle: fmt::Debug,
	F: FnMut(&Tr::Value, &Tr::Key) -> R,
{
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut s = f.debug_struct("Cursor");
		match &self.state {
			SeekState::Seek(key) => s.field("seek", key),
			SeekState::Positioned(node) => s.field("position", node),
			state => s.field("state", &state.name()),
		};
		s.finish()
	}
}
