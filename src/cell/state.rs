//! Crate-private `value`/`valid` state machine shared by both cell variants.
//!
//! [`MemoCell`](crate::MemoCell) wraps this state in a `RefCell`,
//! [`LockedMemoCell`](crate::LockedMemoCell) in a `Mutex`. All transitions
//! live here so the two variants cannot drift apart.

use core::mem;

/// Memoization state: the most recently computed value plus a flag saying
/// whether it reflects the current generation of the owner.
///
/// `valid == false` with `value == Some(_)` is the invalidated-but-stale
/// state: [`invalidate`](Self::invalidate) clears only the flag, never the
/// storage, so a failed recompute cannot tear a previously stored value.
pub(crate) struct MemoState<T> {
    value: Option<T>,
    valid: bool,
}

impl<T> MemoState<T> {
    /// The uncomputed state: no value, not valid.
    pub(crate) const fn empty() -> Self {
        Self {
            value: None,
            valid: false,
        }
    }

    #[inline]
    pub(crate) fn is_valid(&self) -> bool {
        self.valid
    }

    /// The cached value, if it is valid for the current generation.
    #[inline]
    pub(crate) fn cached(&self) -> Option<&T> {
        if self.valid {
            self.value.as_ref()
        } else {
            None
        }
    }

    /// Stores a freshly computed value and marks it valid, returning the
    /// committed value. Callers run the computation (and observe its
    /// failure, if any) *before* calling this, so value and flag only ever
    /// change together.
    #[inline]
    pub(crate) fn commit(&mut self, value: T) -> &T {
        self.valid = true;
        self.value.insert(value)
    }

    /// Clears the validity flag. The storage is deliberately left alone.
    #[inline]
    pub(crate) fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Copy-assignment: transplant `source`'s state into `self`.
    ///
    /// The flag is cleared before the clone runs, so a panicking
    /// `T::clone` leaves `self` invalid rather than exposing a half
    /// transplanted value.
    pub(crate) fn assign_from(&mut self, source: &Self)
    where
        T: Clone,
    {
        self.valid = false;
        self.value.clone_from(&source.value);
        self.valid = source.valid;
    }

    /// Fallible copy-assignment through a caller-supplied cloner.
    ///
    /// Sequence: clear the flag, clone, restore the flag only on success.
    /// On `Err`, `self` is left invalid with its previous storage intact
    /// but unexposed, and the error propagates.
    pub(crate) fn try_assign_from<E>(
        &mut self,
        source: &Self,
        clone_value: impl FnOnce(&T) -> Result<T, E>,
    ) -> Result<(), E> {
        self.valid = false;
        self.value = match source.value.as_ref() {
            Some(value) => Some(clone_value(value)?),
            None => None,
        };
        self.valid = source.valid;
        Ok(())
    }

    /// Move-assignment: take `source`'s state, leaving `source` empty and
    /// invalid.
    pub(crate) fn take_from(&mut self, source: &mut Self) {
        self.valid = false;
        self.value = source.value.take();
        self.valid = mem::replace(&mut source.valid, false);
    }

    /// Detaches the state, leaving `self` empty and invalid.
    pub(crate) fn take(&mut self) -> Self {
        Self {
            value: self.value.take(),
            valid: mem::replace(&mut self.valid, false),
        }
    }

    /// A copy of the state. Used where the original must stay borrowable
    /// while the copy is installed elsewhere (the locked variant never
    /// holds two cell locks at once).
    pub(crate) fn snapshot(&self) -> Self
    where
        T: Clone,
    {
        Self {
            value: self.value.clone(),
            valid: self.valid,
        }
    }

    /// Fallible [`snapshot`](Self::snapshot) through a caller-supplied
    /// cloner.
    pub(crate) fn try_snapshot<E>(
        &self,
        clone_value: impl FnOnce(&T) -> Result<T, E>,
    ) -> Result<Self, E> {
        let value = match self.value.as_ref() {
            Some(value) => Some(clone_value(value)?),
            None => None,
        };
        Ok(Self {
            value,
            valid: self.valid,
        })
    }
}
