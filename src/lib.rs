//! # `memocell` - Invalidation-Aware Memoized Member Cells
//!
//! A small toolkit for giving an owning type cheap, cached derived
//! attributes without cache-invalidation bookkeeping scattered through its
//! mutators. A cell is embedded as a member, bound at construction to a
//! deterministic computation over the owner's state, computed at most once
//! per generation of that state, and recomputed automatically after
//! invalidation or after a failed attempt.
//!
//! ## Value lifecycle
//!
//! A cell is a tiny state machine: uncomputed, valid, or invalidated.
//! - The first read runs the computation and commits value and validity
//!   flag together.
//! - Later reads return the cached value without computing.
//! - [`invalidate`](MemoCell::invalidate) clears only the flag; the next
//!   read recomputes.
//! - A failed computation ([`try_get`](MemoCell::try_get)) leaves the cell
//!   exactly as it was: the error surfaces, nothing is cached, the next
//!   read retries. No operation can leave the cell in a torn or poisoned
//!   state.
//!
//! ## Transplanting between owners
//!
//! Cached state moves between cell instances without recomputation:
//! `Clone` is copy-construction, [`assign_from`](MemoCell::assign_from) /
//! [`take_from`](MemoCell::take_from) are copy/move-assignment, and
//! [`try_assign_from`](MemoCell::try_assign_from) covers value types whose
//! duplication can fail, falling back to the invalid-and-retryable state on
//! failure. Because the owner is passed at each read, a cloned owner's
//! cells automatically compute against the clone.
//!
//! ## Variants
//!
//! - [`MemoCell`]: single-threaded, `RefCell`-backed; reads take `&self`.
//! - [`LockedMemoCell`]: the same state machine behind a mutex; concurrent
//!   first reads compute exactly once, serialized by the lock.
//!
//! ## Example
//!
//! ```rust
//! use memocell::MemoCell;
//!
//! struct Report {
//!     entries: Vec<u64>,
//!     total: MemoCell<u64, Report>,
//! }
//!
//! impl Report {
//!     fn new(entries: Vec<u64>) -> Self {
//!         Self { entries, total: MemoCell::new(|r: &Report| r.entries.iter().sum()) }
//!     }
//!
//!     fn total(&self) -> u64 {
//!         self.total.get(self)
//!     }
//!
//!     fn add(&mut self, entry: u64) {
//!         self.entries.push(entry);
//!         self.total.invalidate();
//!     }
//! }
//!
//! let mut report = Report::new(vec![1, 2, 3]);
//! assert_eq!(report.total(), 6); // computed
//! assert_eq!(report.total(), 6); // cached
//! report.add(4);
//! assert_eq!(report.total(), 10); // recomputed
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod cell;

pub use cell::{LockedMemoCell, MemoCell};

// Compile-time layout assertions. Intentionally loose upper bounds to avoid
// platform brittleness, while still catching accidental large regressions.
const _: () = {
    use core::mem;

    // Single-threaded cell: state machine + one borrow word + one fn pointer.
    assert!(mem::size_of::<MemoCell<u64, ()>>() <= mem::size_of::<usize>() * 6);

    // Locked variant adds only the mutex.
    assert!(mem::size_of::<LockedMemoCell<u64, ()>>() <= mem::size_of::<usize>() * 8);
};
