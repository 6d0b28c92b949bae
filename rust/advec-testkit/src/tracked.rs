//! An element type that keeps score of its own lifetime events.

use std::cell::Cell;
use std::fmt;

use crate::fault::{Operation, tick};

thread_local! {
    static STATS: Cell<LifetimeStats> = const { Cell::new(LifetimeStats::ZERO) };
}

/// Per-thread counters of `Tracked` lifetime events.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LifetimeStats {
    /// Values created by `Tracked::new` or `Default`.
    pub constructed: usize,
    /// Values created by `Clone::clone`.
    pub clones: usize,
    /// Successful `Clone::clone_from` calls.
    pub assigns: usize,
    /// Values dropped.
    pub drops: usize,
}

impl LifetimeStats {
    const ZERO: LifetimeStats = LifetimeStats {
        constructed: 0,
        clones: 0,
        assigns: 0,
        drops: 0,
    };

    /// Number of values currently alive.
    pub fn live(&self) -> usize {
        (self.constructed + self.clones)
            .checked_sub(self.drops)
            .expect("more drops than constructions")
    }
}

fn record(f: impl FnOnce(&mut LifetimeStats)) {
    STATS.with(|s| {
        let mut stats = s.get();
        f(&mut stats);
        s.set(stats);
    });
}

/// A value-carrying element that reports constructions, clones, assignments
/// and drops, and whose `Default`, `Clone` and `clone_from` can be made to
/// panic through [`FaultPlan`](crate::FaultPlan).
pub struct Tracked {
    value: i64,
}

impl Tracked {
    pub fn new(value: i64) -> Tracked {
        record(|s| s.constructed += 1);
        Tracked { value }
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn set_value(&mut self, value: i64) {
        self.value = value;
    }

    /// Counters accumulated on the current thread.
    pub fn stats() -> LifetimeStats {
        STATS.with(|s| s.get())
    }

    /// Clears the counters of the current thread.
    pub fn reset_stats() {
        STATS.with(|s| s.set(LifetimeStats::ZERO));
    }
}

impl Default for Tracked {
    fn default() -> Self {
        tick(Operation::Default);
        Tracked::new(0)
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        tick(Operation::Clone);
        record(|s| s.clones += 1);
        Tracked { value: self.value }
    }

    fn clone_from(&mut self, source: &Self) {
        tick(Operation::Assign);
        self.value = source.value;
        record(|s| s.assigns += 1);
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        record(|s| s.drops += 1);
        tick(Operation::Drop);
    }
}

impl From<i64> for Tracked {
    fn from(value: i64) -> Self {
        Tracked::new(value)
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl Eq for Tracked {}

impl PartialEq<i64> for Tracked {
    fn eq(&self, other: &i64) -> bool {
        self.value == *other
    }
}

impl fmt::Debug for Tracked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tracked({})", self.value)
    }
}
