//! Test utilities for the advec crates.
//!
//! This crate provides:
//! - `Tracked`, an element type that records every construction, clone,
//!   assignment and drop, and can be told to fail on a chosen invocation
//! - `FaultPlan`, the switchboard that arms those failures
//! - Random operation sequences for differential testing against `Vec`
//!
//! All bookkeeping is thread-local, so tests running in parallel do not
//! observe each other.

pub mod fault;
pub mod ops;
pub mod tracked;

pub use fault::{FaultPlan, expect_panic};
pub use tracked::{LifetimeStats, Tracked};
