//! Random operation sequences for differential testing.
//!
//! An operation carries raw random numbers for positions and lengths; the
//! replaying test reduces them against the current length with
//! [`VecOp::position`] so that every generated sequence is valid.

/// A single mutation of a growable array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VecOp {
    Push(i64),
    Insert { seed: usize, value: i64 },
    Erase { seed: usize },
    PopBack,
    Resize(usize),
    Reserve(usize),
    Clear,
    /// Replace the contents with a copy of a freshly built array of this length.
    AssignCopy(usize),
}

impl VecOp {
    /// Maps a raw seed onto `0..=len` (insert) or `0..len` (erase).
    pub fn position(seed: usize, bound: usize) -> usize {
        if bound == 0 { 0 } else { seed % bound }
    }
}

/// Generates `count` operations from a deterministic seed.
///
/// Lengths used by `Resize`, `Reserve` and `AssignCopy` stay below `max_len`.
pub fn random_ops(seed: u64, count: usize, max_len: usize) -> Vec<VecOp> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let max_len = max_len.max(1);
    (0..count)
        .map(|_| match rng.u8(0..16) {
            0..=5 => VecOp::Push(rng.i64(-1000..1000)),
            6..=7 => VecOp::Insert {
                seed: rng.usize(..),
                value: rng.i64(-1000..1000),
            },
            8..=9 => VecOp::Erase { seed: rng.usize(..) },
            10 => VecOp::PopBack,
            11 => VecOp::Resize(rng.usize(0..max_len)),
            12 => VecOp::Reserve(rng.usize(0..max_len * 2)),
            13 => VecOp::Clear,
            _ => VecOp::AssignCopy(rng.usize(0..max_len)),
        })
        .collect()
}
