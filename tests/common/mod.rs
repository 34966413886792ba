//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

/// Shared call counter for observing how many times a computation ran.
#[derive(Clone, Debug, Default)]
pub struct EvalCounter(Rc<Cell<u32>>);

impl EvalCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bump(&self) {
        self.0.set(self.0.get() + 1);
    }

    pub fn count(&self) -> u32 {
        self.0.get()
    }
}

/// One-shot trigger: fires once after arming, then clears itself.
#[derive(Clone, Debug, Default)]
pub struct Trigger(Rc<Cell<bool>>);

impl Trigger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&self) {
        self.0.set(true);
    }

    /// Returns `true` exactly once after each `arm`.
    pub fn fire(&self) -> bool {
        self.0.replace(false)
    }
}

/// A value whose clone panics while its trigger is armed. Drives the
/// basic-guarantee path of copy-assignment.
#[derive(Debug)]
pub struct PanicOnClone {
    pub value: i32,
    pub trigger: Trigger,
}

impl PanicOnClone {
    pub fn new(value: i32, trigger: Trigger) -> Self {
        Self { value, trigger }
    }
}

impl Clone for PanicOnClone {
    fn clone(&self) -> Self {
        assert!(!self.trigger.fire(), "clone failure injected");
        Self {
            value: self.value,
            trigger: self.trigger.clone(),
        }
    }
}
