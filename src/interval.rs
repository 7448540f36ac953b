//! Closed intervals used as tree keys.

use crate::error::{Error, Result};
use std::fmt;
use std::ops::RangeInclusive;

/// A closed interval `[low, high]`.
///
/// Intervals order lexicographically: by `low` first, ties broken by
/// `high`. This is the order the tree stores and the cursor walks.
///
/// ```
/// use ivtree::Interval;
///
/// let a = Interval::new(1, 5).unwrap();
/// let b = Interval::new(1, 9).unwrap();
/// let c = Interval::new(2, 3).unwrap();
/// assert!(a < b && b < c);
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
	feature = "serde",
	serde(try_from = "RawInterval<T>", bound(deserialize = "T: Ord + serde::Deserialize<'de>"))
)]
pub struct Interval<T> {
	low: T,
	high: T,
}

impl<T: Ord> Interval<T> {
	/// Creates the interval `[low, high]`.
	///
	/// Returns [`Error::InvalidInterval`] if `low > high`.
	pub fn new(low: T, high: T) -> Result<Self> {
		if low > high {
			return Err(Error::InvalidInterval);
		}
		Ok(Interval {
			low,
			high,
		})
	}

	/// Returns `true` if the two closed intervals share at least one point.
	pub fn overlaps(&self, other: &Interval<T>) -> bool {
		self.low <= other.high && other.low <= self.high
	}

	/// Returns `true` if `point` lies within `[low, high]`.
	pub fn contains_point(&self, point: &T) -> bool {
		self.low <= *point && *point <= self.high
	}
}

impl<T: Clone> Interval<T> {
	/// Creates the degenerate interval `[point, point]`.
	pub fn point(point: T) -> Self {
		Interval {
			low: point.clone(),
			high: point,
		}
	}
}

impl<T> Interval<T> {
	/// The low bound.
	pub fn low(&self) -> &T {
		&self.low
	}

	/// The high bound.
	pub fn high(&self) -> &T {
		&self.high
	}

	/// Consumes the interval, returning `(low, high)`.
	pub fn into_bounds(self) -> (T, T) {
		(self.low, self.high)
	}
}

impl<T: fmt::Debug> fmt::Debug for Interval<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "[{:?}, {:?}]", self.low, self.high)
	}
}

impl<T: Ord> TryFrom<(T, T)> for Interval<T> {
	type Error = Error;

	fn try_from((low, high): (T, T)) -> Result<Self> {
		Interval::new(low, high)
	}
}

impl<T: Ord> TryFrom<RangeInclusive<T>> for Interval<T> {
	type Error = Error;

	fn try_from(range: RangeInclusive<T>) -> Result<Self> {
		let (low, high) = range.into_inner();
		Interval::new(low, high)
	}
}

/// Unvalidated wire form; deserialization goes through [`Interval::new`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawInterval<T> {
	low: T,
	high: T,
}

#[cfg(feature = "serde")]
impl<T: Ord> TryFrom<RawInterval<T>> for Interval<T> {
	type Error = Error;

	fn try_from(raw: RawInterval<T>) -> Result<Self> {
		Interval::new(raw.low, raw.high)
	}
}
