//! Embedding cells in an owning type, including a fallible computation.
//!
//! `Ledger` owns raw entry lines and two derived attributes: an infallible
//! line count and a fallible parsed total. Mutators invalidate both cells;
//! cloning the ledger transplants whatever is already cached.

use anyhow::{Context, Result};
use memocell::MemoCell;

#[derive(Clone)]
struct Ledger {
    lines: Vec<String>,
    line_count: MemoCell<usize, Ledger>,
    total: MemoCell<u64, Ledger, fn(&Ledger) -> Result<u64>>,
}

impl Ledger {
    fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            line_count: MemoCell::new(Self::compute_line_count),
            total: MemoCell::new(Self::compute_total),
        }
    }

    fn compute_line_count(&self) -> usize {
        println!("  (counting lines)");
        self.lines.len()
    }

    fn compute_total(&self) -> Result<u64> {
        println!("  (parsing and summing)");
        let mut total = 0u64;
        for line in &self.lines {
            let amount: u64 = line
                .trim()
                .parse()
                .with_context(|| format!("bad ledger line: {line:?}"))?;
            total += amount;
        }
        Ok(total)
    }

    fn line_count(&self) -> usize {
        self.line_count.get(self)
    }

    fn total(&self) -> Result<u64> {
        self.total.try_get(self)
    }

    fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
        self.line_count.invalidate();
        self.total.invalidate();
    }

    fn pop(&mut self) -> Option<String> {
        let line = self.lines.pop();
        self.line_count.invalidate();
        self.total.invalidate();
        line
    }
}

fn main() -> Result<()> {
    let mut ledger = Ledger::new(vec!["10".into(), "20".into(), "12".into()]);

    println!("First reads compute:");
    println!("  lines = {}", ledger.line_count());
    println!("  total = {}", ledger.total()?);

    println!("Second reads are cached:");
    println!("  lines = {}", ledger.line_count());
    println!("  total = {}", ledger.total()?);

    println!("Clones transplant the cache:");
    let copy = ledger.clone();
    println!("  copy total = {}", copy.total()?);

    println!("A bad entry surfaces as an error and stays retryable:");
    ledger.push("not-a-number");
    match ledger.total() {
        Ok(total) => println!("  unexpected total {total}"),
        Err(error) => println!("  error: {error:#}"),
    }

    println!("Fixing the owner state makes the next read succeed:");
    ledger.pop();
    ledger.push("3");
    println!("  total = {}", ledger.total()?);
    println!("  lines = {}", ledger.line_count());

    Ok(())
}
