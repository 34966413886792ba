//! Concurrency contract of the locked variant: racing first reads compute
//! exactly once, failures stay retryable, and cross-cell assignment cannot
//! deadlock.

mod common;

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Barrier;
use std::thread;

use common::{PanicOnClone, Trigger};
use memocell::LockedMemoCell;

const READERS: usize = 8;

#[test]
fn racing_first_reads_compute_exactly_once() {
    let evals = AtomicU32::new(0);
    let cell = LockedMemoCell::new(|owner: &u64| {
        evals.fetch_add(1, Ordering::SeqCst);
        owner * 2
    });
    let barrier = Barrier::new(READERS);

    thread::scope(|s| {
        let handles: Vec<_> = (0..READERS)
            .map(|_| {
                s.spawn(|| {
                    barrier.wait();
                    cell.get(&21)
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), 42);
        }
    });

    assert_eq!(evals.load(Ordering::SeqCst), 1);
}

#[test]
fn invalidation_under_contention_recomputes_once() {
    let evals = AtomicU32::new(0);
    let cell = LockedMemoCell::new(|owner: &u64| {
        evals.fetch_add(1, Ordering::SeqCst);
        owner + 1
    });

    assert_eq!(cell.get(&1), 2);
    cell.invalidate();

    let barrier = Barrier::new(READERS);
    thread::scope(|s| {
        for _ in 0..READERS {
            s.spawn(|| {
                barrier.wait();
                assert_eq!(cell.get(&1), 2);
            });
        }
    });

    assert_eq!(evals.load(Ordering::SeqCst), 2);
}

#[test]
fn failed_compute_is_retryable() {
    let evals = AtomicU32::new(0);
    let fail = AtomicBool::new(true);
    let cell = LockedMemoCell::new(|owner: &u64| -> Result<u64, &'static str> {
        evals.fetch_add(1, Ordering::SeqCst);
        if fail.swap(false, Ordering::SeqCst) {
            return Err("compute failed");
        }
        Ok(owner * 2)
    });

    assert_eq!(cell.try_get(&21), Err("compute failed"));
    assert!(!cell.is_valid());
    assert_eq!(cell.try_get(&21), Ok(42));
    assert_eq!(evals.load(Ordering::SeqCst), 2);
}

#[test]
fn panicking_compute_does_not_poison_the_cell() {
    let evals = AtomicU32::new(0);
    let fail = AtomicBool::new(true);
    let cell = LockedMemoCell::new(|owner: &u64| {
        evals.fetch_add(1, Ordering::SeqCst);
        assert!(!fail.swap(false, Ordering::SeqCst), "compute panic injected");
        owner * 2
    });

    let panicked = catch_unwind(AssertUnwindSafe(|| cell.get(&21))).is_err();
    assert!(panicked);

    // The lock recovers and the state is still the uncomputed one.
    assert!(!cell.is_valid());
    assert_eq!(cell.get(&21), 42);
    assert_eq!(evals.load(Ordering::SeqCst), 2);
}

#[test]
fn copy_assign_transplants_without_compute() {
    let evals = AtomicU32::new(0);
    let make = |bias: u64| {
        let evals = &evals;
        LockedMemoCell::new(move |owner: &u64| {
            evals.fetch_add(1, Ordering::SeqCst);
            owner + bias
        })
    };
    let a = make(0);
    let b = make(1);

    assert_eq!(a.get(&4), 4);
    assert_eq!(b.get(&4), 5);

    a.assign_from(&b);
    assert_eq!(a.get(&4), 5);
    assert_eq!(evals.load(Ordering::SeqCst), 2);
}

#[test]
fn failed_transfer_leaves_target_retryable() {
    let evals = AtomicU32::new(0);
    let make = || {
        let evals = &evals;
        LockedMemoCell::new(move |owner: &u64| {
            evals.fetch_add(1, Ordering::SeqCst);
            *owner
        })
    };
    let a = make();
    let b = make();

    a.get(&4);
    b.get(&5);

    let result = a.try_assign_from(&b, |_| Err::<u64, _>("copy failed"));
    assert_eq!(result, Err("copy failed"));
    assert!(!a.is_valid());
    assert_eq!(a.get(&4), 4);
    assert_eq!(evals.load(Ordering::SeqCst), 3);
}

#[test]
fn panicking_clone_leaves_target_invalid() {
    let evals = AtomicU32::new(0);
    let trigger = Trigger::new();
    let make = || {
        let evals = &evals;
        let trigger = trigger.clone();
        LockedMemoCell::new(move |owner: &i32| {
            evals.fetch_add(1, Ordering::SeqCst);
            PanicOnClone::new(*owner, trigger.clone())
        })
    };
    let a = make();
    let b = make();

    a.with(&1, |_| ());
    b.with(&2, |_| ());

    trigger.arm();
    let panicked = catch_unwind(AssertUnwindSafe(|| a.assign_from(&b))).is_err();
    assert!(panicked);

    // Basic guarantee: the target fell back to the uncomputed state and the
    // next read recomputes instead of serving the old value.
    assert!(!a.is_valid());
    a.with(&1, |v| assert_eq!(v.value, 1));
    assert_eq!(evals.load(Ordering::SeqCst), 3);
}

#[test]
fn with_gives_borrow_access_to_unclonable_values() {
    // No Clone impl on purpose.
    struct Blob(Vec<u8>);

    let cell: LockedMemoCell<Blob, Vec<u8>, _> =
        LockedMemoCell::new(|owner: &Vec<u8>| Blob(owner.iter().rev().copied().collect()));

    let input = vec![1, 2, 3];
    assert_eq!(cell.with(&input, |blob| blob.0[0]), 3);

    // Second access hits the cache; the closure sees the same value.
    assert_eq!(cell.with(&input, |blob| blob.0.len()), 3);
}

#[test]
fn try_with_failure_is_retryable() {
    let evals = AtomicU32::new(0);
    let fail = AtomicBool::new(true);
    let cell = LockedMemoCell::new(|owner: &u64| -> Result<u64, &'static str> {
        evals.fetch_add(1, Ordering::SeqCst);
        if fail.swap(false, Ordering::SeqCst) {
            return Err("compute failed");
        }
        Ok(owner * 2)
    });

    assert_eq!(cell.try_with(&21, |v| *v), Err("compute failed"));
    assert!(!cell.is_valid());
    assert_eq!(cell.try_with(&21, |v| *v), Ok(42));
    assert_eq!(cell.try_with(&21, |v| *v), Ok(42));
    assert_eq!(evals.load(Ordering::SeqCst), 2);
}

#[test]
fn clone_preserves_validity_and_value() {
    let evals = AtomicU32::new(0);
    let make = || {
        let evals = &evals;
        LockedMemoCell::new(move |owner: &u64| {
            evals.fetch_add(1, Ordering::SeqCst);
            *owner
        })
    };
    let a = make();
    a.get(&7);

    let copy = a.clone();
    assert!(copy.is_valid());
    assert_eq!(copy.get(&7), 7);
    assert_eq!(evals.load(Ordering::SeqCst), 1);
}

#[test]
fn clone_from_delegates_to_assign() {
    let evals = AtomicU32::new(0);
    let make = || {
        let evals = &evals;
        LockedMemoCell::new(move |owner: &u64| {
            evals.fetch_add(1, Ordering::SeqCst);
            *owner
        })
    };
    let a = make();
    let mut b = make();

    a.get(&5);
    b.clone_from(&a);
    assert_eq!(b.get(&4), 5);
    assert_eq!(evals.load(Ordering::SeqCst), 1);
}

#[test]
fn debug_reports_validity_only() {
    let cell: LockedMemoCell<u64, u64> = LockedMemoCell::new(|owner: &u64| *owner);
    assert_eq!(format!("{cell:?}"), "LockedMemoCell { valid: false, .. }");

    cell.get(&3);
    assert_eq!(format!("{cell:?}"), "LockedMemoCell { valid: true, .. }");
}

#[test]
fn move_assign_empties_the_source() {
    let cell_a: LockedMemoCell<u64, u64> = LockedMemoCell::new(|owner: &u64| *owner);
    let cell_b: LockedMemoCell<u64, u64> = LockedMemoCell::new(|owner: &u64| *owner);

    cell_b.get(&5);
    cell_a.take_from(&cell_b);

    assert_eq!(cell_a.peek(), Some(5));
    assert!(!cell_b.is_valid());
    assert_eq!(cell_b.peek(), None);
}

#[test]
fn concurrent_cross_assignment_does_not_deadlock() {
    let a: LockedMemoCell<u64, u64> = LockedMemoCell::new(|owner: &u64| *owner);
    let b: LockedMemoCell<u64, u64> = LockedMemoCell::new(|owner: &u64| owner + 1);

    a.get(&1);
    b.get(&1);

    thread::scope(|s| {
        s.spawn(|| {
            for _ in 0..1_000 {
                a.assign_from(&b);
            }
        });
        s.spawn(|| {
            for _ in 0..1_000 {
                b.assign_from(&a);
            }
        });
    });

    // Both cells still hold one of the two seeded values.
    let left = a.peek().unwrap();
    let right = b.peek().unwrap();
    assert!(left == 1 || left == 2);
    assert!(right == 1 || right == 2);
}

#[test]
fn concurrent_reads_and_invalidations_stay_consistent() {
    let cell: LockedMemoCell<u64, u64> = LockedMemoCell::new(|owner: &u64| owner * 3);

    thread::scope(|s| {
        for _ in 0..4 {
            s.spawn(|| {
                for _ in 0..500 {
                    assert_eq!(cell.get(&7), 21);
                }
            });
        }
        s.spawn(|| {
            for _ in 0..500 {
                cell.invalidate();
            }
        });
    });

    assert_eq!(cell.get(&7), 21);
}
