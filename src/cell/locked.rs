//! `LockedMemoCell`: the mutex-serialized variant of [`MemoCell`].
//!
//! Same state machine, but every operation holds the cell's lock for its
//! full duration, so a first read racing against other reads, invalidation,
//! or assignment serializes: exactly one thread computes and the rest
//! observe the committed value.
//!
//! The lock is never left poisoned from the caller's point of view. Every
//! commit is a single assignment made only after the computation (or clone)
//! has succeeded, so the state is consistent at every panic point and the
//! lock accessor recovers a poisoned mutex instead of propagating it.
//!
//! [`MemoCell`]: crate::MemoCell

use core::fmt;
use core::marker::PhantomData;
use core::ptr;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::state::MemoState;
use super::trace_cell;

/// A memoized member cell shared between threads.
///
/// API mirrors [`MemoCell`](crate::MemoCell); see there for the embedding
/// pattern. Operations block on the cell's mutex and must not be called
/// reentrantly from this cell's own computation, which would deadlock.
pub struct LockedMemoCell<T, O: ?Sized, F = fn(&O) -> T> {
    state: Mutex<MemoState<T>>,
    compute: F,
    owner: PhantomData<fn(&O) -> T>,
}

impl<T, O: ?Sized, F> LockedMemoCell<T, O, F> {
    /// Creates an uncomputed cell with the given computation.
    pub const fn new(compute: F) -> Self {
        Self {
            state: Mutex::new(MemoState::empty()),
            compute,
            owner: PhantomData,
        }
    }

    /// Acquires the state lock, recovering it if a previous holder
    /// panicked. Sound because state transitions commit atomically under
    /// the guard; a panic can only ever be observed pre-commit.
    fn lock(&self) -> MutexGuard<'_, MemoState<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` if the cell currently holds a valid value.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.lock().is_valid()
    }

    /// The cached value if valid; never computes.
    pub fn peek(&self) -> Option<T>
    where
        T: Clone,
    {
        self.lock().cached().cloned()
    }

    /// Marks the cached value stale. The next read recomputes.
    pub fn invalidate(&self) {
        trace_cell::<T>("invalidated");
        self.lock().invalidate();
    }

    /// Copy-assignment: transplants `source`'s cached state into `self`
    /// without running the computation. Self-assignment is a no-op.
    ///
    /// The target is invalidated before the snapshot is taken, so a
    /// panicking `T::clone` leaves it invalid (basic guarantee), same as
    /// the single-threaded cell. The two cell locks are never held at
    /// once, so concurrent cross-assignment cannot deadlock.
    pub fn assign_from(&self, source: &Self)
    where
        T: Clone,
    {
        if ptr::eq(self, source) {
            return;
        }
        self.lock().invalidate();
        let snapshot = source.lock().snapshot();
        *self.lock() = snapshot;
    }

    /// Move-assignment: takes `source`'s cached state, leaving `source`
    /// uncomputed. Self-assignment is a no-op.
    pub fn take_from(&self, source: &Self) {
        if ptr::eq(self, source) {
            return;
        }
        let snapshot = source.lock().take();
        *self.lock() = snapshot;
    }

    /// Copy-assignment through a fallible cloner.
    ///
    /// The target is invalidated before the clone runs, so on `Err` it is
    /// left invalid and retryable; the error propagates. Self-assignment is
    /// a no-op.
    ///
    /// # Errors
    ///
    /// Propagates the cloner's error; the target is invalid afterwards.
    pub fn try_assign_from<E>(
        &self,
        source: &Self,
        clone_value: impl FnOnce(&T) -> Result<T, E>,
    ) -> Result<(), E> {
        if ptr::eq(self, source) {
            return Ok(());
        }
        self.lock().invalidate();
        let snapshot = source.lock().try_snapshot(clone_value)?;
        *self.lock() = snapshot;
        Ok(())
    }
}

impl<T, O: ?Sized, F> LockedMemoCell<T, O, F>
where
    F: Fn(&O) -> T,
{
    /// The memoized value, computing it from `owner` on first use and
    /// after invalidation.
    ///
    /// The computation runs under the cell's lock: concurrent first reads
    /// compute exactly once, with the losers blocking until the winner
    /// commits.
    pub fn get(&self, owner: &O) -> T
    where
        T: Clone,
    {
        let mut state = self.lock();
        if let Some(hit) = state.cached() {
            return hit.clone();
        }
        trace_cell::<T>("recomputing");
        let value = (self.compute)(owner);
        state.commit(value).clone()
    }

    /// Borrow-access to the memoized value, computing it if needed. The
    /// closure runs under the cell's lock and must not touch the cell.
    pub fn with<R>(&self, owner: &O, f: impl FnOnce(&T) -> R) -> R {
        let mut state = self.lock();
        if let Some(hit) = state.cached() {
            return f(hit);
        }
        trace_cell::<T>("recomputing");
        let value = (self.compute)(owner);
        f(state.commit(value))
    }
}

impl<T, O: ?Sized, E, F> LockedMemoCell<T, O, F>
where
    F: Fn(&O) -> Result<T, E>,
{
    /// Fallible [`get`](Self::get): a failed computation leaves the cell
    /// exactly as it was (strong guarantee) and the next call retries.
    ///
    /// # Errors
    ///
    /// Propagates the computation's error. Nothing is cached on failure.
    pub fn try_get(&self, owner: &O) -> Result<T, E>
    where
        T: Clone,
    {
        let mut state = self.lock();
        if let Some(hit) = state.cached() {
            return Ok(hit.clone());
        }
        trace_cell::<T>("recomputing");
        let value = (self.compute)(owner)?;
        Ok(state.commit(value).clone())
    }

    /// Fallible [`with`](Self::with).
    ///
    /// # Errors
    ///
    /// Propagates the computation's error. Nothing is cached on failure.
    pub fn try_with<R>(&self, owner: &O, f: impl FnOnce(&T) -> R) -> Result<R, E> {
        let mut state = self.lock();
        if let Some(hit) = state.cached() {
            return Ok(f(hit));
        }
        trace_cell::<T>("recomputing");
        let value = (self.compute)(owner)?;
        Ok(f(state.commit(value)))
    }
}

impl<T: Clone, O: ?Sized, F: Clone> Clone for LockedMemoCell<T, O, F> {
    /// Copy-construction: the new cell carries the source's cached state.
    /// The new cell's lock starts fresh; construction is single-owner by
    /// definition, so no lock is needed for the rebinding side.
    fn clone(&self) -> Self {
        Self {
            state: Mutex::new(self.lock().snapshot()),
            compute: self.compute.clone(),
            owner: PhantomData,
        }
    }

    /// Delegates to [`assign_from`](Self::assign_from). The computation is
    /// fixed at construction and is not replaced.
    fn clone_from(&mut self, source: &Self) {
        self.assign_from(source);
    }
}

impl<T, O: ?Sized, F> fmt::Debug for LockedMemoCell<T, O, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LockedMemoCell")
            .field("valid", &self.is_valid())
            .finish_non_exhaustive()
    }
}
