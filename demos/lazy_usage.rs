//! MemoCell usage examples.
//!
//! Demonstrates lazy computation, caching, invalidation, and the memory
//! footprint of the cells.

use std::cell::Cell;

use memocell::{LockedMemoCell, MemoCell};

fn main() {
    println!("MemoCell Usage Examples");
    println!("=======================");

    // Example 1: Basic lazy computation
    println!("\n1. Basic Lazy Computation:");
    let compute_count = Cell::new(0);

    let doubled = MemoCell::new(|owner: &u64| {
        compute_count.set(compute_count.get() + 1);
        println!("  Computing expensive value...");
        owner * 2
    });

    let owner = 42u64;
    println!("  First access (triggers computation):");
    println!(
        "  Result: {}, Compute count: {}",
        doubled.get(&owner),
        compute_count.get()
    );

    println!("  Second access (uses cache):");
    println!(
        "  Result: {}, Compute count: {}",
        doubled.get(&owner),
        compute_count.get()
    );

    // Example 2: Invalidation and recomputation
    println!("\n2. Invalidation:");
    doubled.invalidate();
    println!("  After invalidate, next access recomputes:");
    println!(
        "  Result: {}, Compute count: {}",
        doubled.get(&owner),
        compute_count.get()
    );

    // Example 3: Memory footprint
    println!("\n3. Memory Footprint:");
    let sizes: MemoCell<Vec<i32>, u64> = MemoCell::new(|owner| (0..*owner as i32).collect());
    println!(
        "  MemoCell<Vec<i32>, u64> size: {} bytes",
        std::mem::size_of_val(&sizes)
    );
    let locked: LockedMemoCell<Vec<i32>, u64> =
        LockedMemoCell::new(|owner| (0..*owner as i32).collect());
    println!(
        "  LockedMemoCell<Vec<i32>, u64> size: {} bytes",
        std::mem::size_of_val(&locked)
    );

    // Example 4: Performance characteristics
    println!("\n4. Performance Characteristics:");
    let slow = MemoCell::new(|owner: &u64| {
        // Use wrapping arithmetic so this example is correct in debug builds too.
        let mut sum: u64 = 0;
        for i in 0..100_000u64 {
            sum = sum.wrapping_add(i.wrapping_mul(*owner));
        }
        sum
    });

    let start = std::time::Instant::now();
    let _ = slow.get(&owner);
    let computation_time = start.elapsed();

    let cached_start = std::time::Instant::now();
    let _ = slow.get(&owner);
    let cached_time = cached_start.elapsed();

    println!("  Computation time: {computation_time:?}");
    println!("  Cached access time: {cached_time:?}");

    println!("\nKey Benefits:");
    println!("- Compute-at-most-once per generation of the owner's state");
    println!("- Explicit invalidation from the owner's mutators");
    println!("- Cached state transplants between instances without recomputation");
}
