//! Allocation counting for tests.
//!
//! Cursors promise to allocate nothing: they hold a borrow, a small state
//! enum and the mapping closure. [`CountingAllocator`] lets a test binary
//! check that promise, and check that tree operations release what they
//! allocate.
//!
//! # Usage
//!
//! ```ignore
//! use ivtree::alloc::{self, CountingAllocator};
//!
//! #[global_allocator]
//! static ALLOC: CountingAllocator = CountingAllocator;
//!
//! #[test]
//! fn cursor_walk_is_allocation_free() {
//!     let tree = build_tree();
//!     let (_, stats) = alloc::measure(|| {
//!         let mut cursor = tree.cursor(|v, _| *v);
//!         while cursor.next().is_some() {}
//!     });
//!     assert_eq!(stats.allocations, 0);
//! }
//! ```
//!
//! # Caveats
//!
//! Counters are per thread. [`measure`] only sees allocations made on the
//! calling thread, so work handed to other threads goes uncounted.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

thread_local! {
	static ALLOCATIONS: Cell<usize> = const { Cell::new(0) };
	static DEALLOCATIONS: Cell<usize> = const { Cell::new(0) };
	static LIVE_BYTES: Cell<isize> = const { Cell::new(0) };
}

fn bump<T: Copy + std::ops::Add<Output = T>>(
	counter: &'static std::thread::LocalKey<Cell<T>>,
	delta: T,
) {
	// The slot may already be gone while the thread is shutting down.
	let _ = counter.try_with(|c| c.set(c.get() + delta));
}

fn read<T: Copy + Default>(counter: &'static std::thread::LocalKey<Cell<T>>) -> T {
	counter.try_with(Cell::get).unwrap_or_default()
}

/// A global allocator that forwards to [`System`] and counts every call.
pub struct CountingAllocator;

unsafe impl GlobalAlloc for CountingAllocator {
	unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
		bump(&ALLOCATIONS, 1);
		bump(&LIVE_BYTES, layout.size() as isize);
		System.alloc(layout)
	}

	unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
		bump(&DEALLOCATIONS, 1);
		bump(&LIVE_BYTES, -(layout.size() as isize));
		System.dealloc(ptr, layout)
	}

	unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
		bump(&ALLOCATIONS, 1);
		bump(&LIVE_BYTES, layout.size() as isize);
		System.alloc_zeroed(layout)
	}

	unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
		// One allocation and one release from the caller's view.
		bump(&ALLOCATIONS, 1);
		bump(&DEALLOCATIONS, 1);
		bump(&LIVE_BYTES, new_size as isize - layout.size() as isize);
		System.realloc(ptr, layout, new_size)
	}
}

/// Counter values at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationStats {
	/// Allocation calls, including reallocations.
	pub allocations: usize,
	/// Deallocation calls, including reallocations.
	pub deallocations: usize,
	/// Bytes currently held, relative to the last snapshot.
	pub live_bytes: isize,
}

impl AllocationStats {
	/// Returns the counters accumulated between `earlier` and `self`.
	pub fn since(&self, earlier: &AllocationStats) -> AllocationStats {
		AllocationStats {
			allocations: self.allocations - earlier.allocations,
			deallocations: self.deallocations - earlier.deallocations,
			live_bytes: self.live_bytes - earlier.live_bytes,
		}
	}
}

/// Reads the calling thread's counters.
pub fn snapshot() -> AllocationStats {
	AllocationStats {
		allocations: read(&ALLOCATIONS),
		deallocations: read(&DEALLOCATIONS),
		live_bytes: read(&LIVE_BYTES),
	}
}

/// Runs `f`, returning its result and the allocation activity it caused.
///
/// Only meaningful when [`CountingAllocator`] is the global allocator.
pub fn measure<R>(f: impl FnOnce() -> R) -> (R, AllocationStats) {
	let before = snapshot();
	let result = f();
	let after = snapshot();
	(result, after.since(&before))
}
