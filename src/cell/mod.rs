//! Memoized member cell family.
//!
//! The module tree is intentionally stratified:
//! - `state` is the crate-private `value`/`valid` state machine.
//! - `memo` is the single-threaded cell built on it.
//! - `locked` serializes the same state machine behind a mutex.

pub mod locked;
pub mod memo;
pub(crate) mod state;

pub use locked::LockedMemoCell;
pub use memo::MemoCell;

/// Emits a cell lifecycle event when the `tracing` feature is enabled.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn trace_cell<T>(event: &str) {
    tracing::trace!(value_type = core::any::type_name::<T>(), "memo cell {}", event);
}

#[cfg(not(feature = "tracing"))]
#[inline]
pub(crate) fn trace_cell<T>(_event: &str) {}
