//! # Error Types for the Interval Tree
//!
//! Cursor traversal never fails: a missing neighbour is reported as `None`.
//! Errors only arise at the edges of the tree's API, when a caller hands it
//! something it cannot accept:
//!
//! - an interval whose bounds are out of order, or
//! - a [`NodeId`](crate::NodeId) whose node has since been removed.
//!
//! ```
//! use ivtree::{error::Error, Interval};
//!
//! assert!(matches!(Interval::new(7, 3), Err(Error::InvalidInterval)));
//! ```

use thiserror::Error;

/// Errors returned by interval construction and handle-based tree operations.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
	/// The interval's low bound is greater than its high bound.
	///
	/// Intervals are closed on both ends, so `[p, p]` is valid but `[7, 3]`
	/// is not.
	#[error("interval low bound is greater than its high bound")]
	InvalidInterval,

	/// The handle no longer names a live node.
	///
	/// Every removal bumps the generation of the freed arena slot, so a
	/// handle taken before the removal is detected here instead of aliasing
	/// whatever entry reuses the slot later.
	#[error("node handle refers to a removed node")]
	StaleNode,
}

/// A Result type alias using our custom Error type.
pub type Result<T> = std::result::Result<T, Error>;
