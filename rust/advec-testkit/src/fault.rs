//! Failure injection for element constructors and destructors.

use std::cell::Cell;
use std::panic::{AssertUnwindSafe, catch_unwind};

thread_local! {
    static DEFAULT_COUNTDOWN: Cell<Option<usize>> = const { Cell::new(None) };
    static CLONE_COUNTDOWN: Cell<Option<usize>> = const { Cell::new(None) };
    static ASSIGN_COUNTDOWN: Cell<Option<usize>> = const { Cell::new(None) };
    static DROP_COUNTDOWN: Cell<Option<usize>> = const { Cell::new(None) };
}

/// Which `Tracked` operation a plan applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Default,
    Clone,
    Assign,
    Drop,
}

/// Arms a panic on the n-th upcoming invocation of a `Tracked` operation.
///
/// Plans are disarmed when the returned value is dropped, so a test that
/// panics for an unrelated reason does not leak the plan into later code on
/// the same thread.
#[must_use = "the plan is disarmed when dropped"]
pub struct FaultPlan {
    op: Operation,
}

impl FaultPlan {
    /// The `n`-th call to `Tracked::default()` from now panics (1-based).
    pub fn fail_default_at(n: usize) -> FaultPlan {
        FaultPlan::arm(Operation::Default, n)
    }

    /// The `n`-th call to `Tracked::clone()` from now panics (1-based).
    pub fn fail_clone_at(n: usize) -> FaultPlan {
        FaultPlan::arm(Operation::Clone, n)
    }

    /// The `n`-th call to `Tracked::clone_from()` from now panics (1-based).
    pub fn fail_assign_at(n: usize) -> FaultPlan {
        FaultPlan::arm(Operation::Assign, n)
    }

    /// The `n`-th `Tracked` drop from now panics (1-based), after the drop
    /// has been counted. The value must not be dropped during an unwind, or
    /// the process aborts.
    pub fn fail_drop_at(n: usize) -> FaultPlan {
        FaultPlan::arm(Operation::Drop, n)
    }

    fn arm(op: Operation, n: usize) -> FaultPlan {
        assert!(n > 0, "invocations are counted from 1");
        slot(op, |c| c.set(Some(n)));
        FaultPlan { op }
    }

    /// Returns `true` while the armed failure has not fired yet.
    pub fn is_pending(&self) -> bool {
        slot(self.op, |c| c.get().is_some())
    }
}

impl Drop for FaultPlan {
    fn drop(&mut self) {
        slot(self.op, |c| c.set(None));
    }
}

/// Counts one invocation of `op` and panics if it is the armed one.
pub(crate) fn tick(op: Operation) {
    let fire = slot(op, |c| match c.get() {
        Some(1) => {
            c.set(None);
            true
        }
        Some(n) => {
            c.set(Some(n - 1));
            false
        }
        None => false,
    });
    if fire {
        panic!("injected {op:?} failure");
    }
}

fn slot<R>(op: Operation, f: impl FnOnce(&Cell<Option<usize>>) -> R) -> R {
    match op {
        Operation::Default => DEFAULT_COUNTDOWN.with(f),
        Operation::Clone => CLONE_COUNTDOWN.with(f),
        Operation::Assign => ASSIGN_COUNTDOWN.with(f),
        Operation::Drop => DROP_COUNTDOWN.with(f),
    }
}

/// Runs `f`, asserts that it panicked and returns the panic message.
#[track_caller]
pub fn expect_panic<R>(f: impl FnOnce() -> R) -> String {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(_) => panic!("expected a panic"),
        Err(payload) => {
            if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else if let Some(s) = payload.downcast_ref::<&str>() {
                s.to_string()
            } else {
                String::new()
            }
        }
    }
}
