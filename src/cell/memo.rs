//! `MemoCell`: a recomputable memoized member for single-threaded owners.
//!
//! A `MemoCell` is embedded in an owning type to give it a cheap derived
//! attribute: the first read computes, later reads return the cached value,
//! and the owner calls [`invalidate`](MemoCell::invalidate) from its
//! mutators. Reads take `&self`, so an owner method taking `&self` can read
//! its own cells.
//!
//! The owner is passed at each read rather than stored: a member that
//! borrows its enclosing struct cannot be expressed safely, and passing
//! `self` at the call site also makes cloned owners bind their cells to
//! themselves with no explicit rebinding step.
//!
//! ```
//! use memocell::MemoCell;
//!
//! struct Polygon {
//!     vertices: Vec<(f64, f64)>,
//!     perimeter: MemoCell<f64, Polygon>,
//! }
//!
//! impl Polygon {
//!     fn new(vertices: Vec<(f64, f64)>) -> Self {
//!         Self { vertices, perimeter: MemoCell::new(Self::compute_perimeter) }
//!     }
//!
//!     fn compute_perimeter(&self) -> f64 {
//!         self.vertices
//!             .windows(2)
//!             .map(|w| ((w[1].0 - w[0].0).powi(2) + (w[1].1 - w[0].1).powi(2)).sqrt())
//!             .sum()
//!     }
//!
//!     fn perimeter(&self) -> f64 {
//!         self.perimeter.get(self)
//!     }
//!
//!     fn push(&mut self, vertex: (f64, f64)) {
//!         self.vertices.push(vertex);
//!         self.perimeter.invalidate();
//!     }
//! }
//!
//! let mut p = Polygon::new(vec![(0.0, 0.0), (3.0, 4.0)]);
//! assert_eq!(p.perimeter(), 5.0);
//! p.push((3.0, 5.0));
//! assert_eq!(p.perimeter(), 6.0);
//! ```

use core::cell::RefCell;
use core::fmt;
use core::marker::PhantomData;
use core::ptr;

use super::state::MemoState;
use super::trace_cell;

/// A memoized member cell bound to an owner type `O` and a computation `F`.
///
/// The computation is fixed at construction. With `F: Fn(&O) -> T` the cell
/// exposes the infallible surface ([`get`](Self::get), [`with`](Self::with));
/// with `F: Fn(&O) -> Result<T, E>` it exposes the fallible one
/// ([`try_get`](Self::try_get), [`try_with`](Self::try_with)).
///
/// Not `Sync`: concurrent owners use [`LockedMemoCell`](crate::LockedMemoCell).
pub struct MemoCell<T, O: ?Sized, F = fn(&O) -> T> {
    state: RefCell<MemoState<T>>,
    compute: F,
    owner: PhantomData<fn(&O) -> T>,
}

impl<T, O: ?Sized, F> MemoCell<T, O, F> {
    /// Creates an uncomputed cell with the given computation.
    pub const fn new(compute: F) -> Self {
        Self {
            state: RefCell::new(MemoState::empty()),
            compute,
            owner: PhantomData,
        }
    }

    /// Returns `true` if the cell currently holds a valid value.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.state.borrow().is_valid()
    }

    /// The cached value if valid; never computes.
    pub fn peek(&self) -> Option<T>
    where
        T: Clone,
    {
        self.state.borrow().cached().cloned()
    }

    /// Marks the cached value stale. The next read recomputes.
    ///
    /// Owners call this from every mutator that changes state the
    /// computation depends on.
    pub fn invalidate(&self) {
        trace_cell::<T>("invalidated");
        self.state.borrow_mut().invalidate();
    }

    /// Copy-assignment: transplants `source`'s cached state into `self`
    /// without running the computation. Self-assignment is a no-op.
    ///
    /// If `T::clone` panics, `self` is left invalid (basic guarantee).
    pub fn assign_from(&self, source: &Self)
    where
        T: Clone,
    {
        if ptr::eq(self, source) {
            return;
        }
        let mut dst = self.state.borrow_mut();
        let src = source.state.borrow();
        dst.assign_from(&src);
    }

    /// Move-assignment: takes `source`'s cached state, leaving `source`
    /// uncomputed. Self-assignment is a no-op.
    pub fn take_from(&self, source: &Self) {
        if ptr::eq(self, source) {
            return;
        }
        let mut dst = self.state.borrow_mut();
        let mut src = source.state.borrow_mut();
        dst.take_from(&mut src);
    }

    /// Copy-assignment through a fallible cloner, for value types whose
    /// duplication can fail.
    ///
    /// On `Err`, `self` is left invalid and retryable: a later read
    /// recomputes instead of reusing a torn value. Self-assignment is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Propagates the cloner's error; the target is invalid afterwards.
    ///
    /// # Panics
    ///
    /// Panics if `clone_value` touches either cell (the cells are borrowed
    /// for the duration of the transfer).
    pub fn try_assign_from<E>(
        &self,
        source: &Self,
        clone_value: impl FnOnce(&T) -> Result<T, E>,
    ) -> Result<(), E> {
        if ptr::eq(self, source) {
            return Ok(());
        }
        let mut dst = self.state.borrow_mut();
        let src = source.state.borrow();
        dst.try_assign_from(&src, clone_value)
    }
}

impl<T, O: ?Sized, F> MemoCell<T, O, F>
where
    F: Fn(&O) -> T,
{
    /// The memoized value, computing it from `owner` on first use and
    /// after invalidation.
    ///
    /// `owner` must be the embedding instance; the whole cache contract
    /// rests on every read of one cell passing the same owner.
    ///
    /// # Panics
    ///
    /// Panics if called reentrantly from this cell's own computation (the
    /// cell is borrowed for the duration of the read).
    pub fn get(&self, owner: &O) -> T
    where
        T: Clone,
    {
        let mut state = self.state.borrow_mut();
        if let Some(hit) = state.cached() {
            return hit.clone();
        }
        trace_cell::<T>("recomputing");
        let value = (self.compute)(owner);
        state.commit(value).clone()
    }

    /// Borrow-access to the memoized value, computing it if needed. The
    /// closure runs while the cell is borrowed, so it must not touch the
    /// cell.
    ///
    /// This is the non-`Clone` counterpart of [`get`](Self::get).
    ///
    /// # Panics
    ///
    /// Panics if called reentrantly from this cell's own computation, or
    /// if `f` touches the cell.
    pub fn with<R>(&self, owner: &O, f: impl FnOnce(&T) -> R) -> R {
        let mut state = self.state.borrow_mut();
        if let Some(hit) = state.cached() {
            return f(hit);
        }
        trace_cell::<T>("recomputing");
        let value = (self.compute)(owner);
        f(state.commit(value))
    }
}

impl<T, O: ?Sized, E, F> MemoCell<T, O, F>
where
    F: Fn(&O) -> Result<T, E>,
{
    /// Fallible [`get`](Self::get): a failed computation leaves the cell
    /// exactly as it was (strong guarantee) and the next call retries.
    ///
    /// # Errors
    ///
    /// Propagates the computation's error. Nothing is cached on failure.
    ///
    /// # Panics
    ///
    /// Panics if called reentrantly from this cell's own computation.
    pub fn try_get(&self, owner: &O) -> Result<T, E>
    where
        T: Clone,
    {
        let mut state = self.state.borrow_mut();
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
    ///
    /// # Panics
    ///
    /// Panics if called reentrantly from this cell's own computation, or
    /// if `f` touches the cell.
    pub fn try_with<R>(&self, owner: &O, f: impl FnOnce(&T) -> R) -> Result<R, E> {
        let mut state = self.state.borrow_mut();
        if let Some(hit) = state.cached() {
            return Ok(f(hit));
        }
        trace_cell::<T>("recomputing");
        let value = (self.compute)(owner)?;
        Ok(f(state.commit(value)))
    }
}

impl<T: Clone, O: ?Sized, F: Clone> Clone for MemoCell<T, O, F> {
    /// Copy-construction: the new cell carries the source's cached state
    /// and will compute against whatever owner it is embedded in.
    fn clone(&self) -> Self {
        Self {
            state: RefCell::new(self.state.borrow().snapshot()),
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

impl<T, O: ?Sized, F> fmt::Debug for MemoCell<T, O, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoCell")
            .field("valid", &self.is_valid())
            .finish_non_exhaustive()
    }
}
