//! A growable, contiguous array with explicit control over storage and element
//! lifetime.
//!
//! The crate is layered the same way its storage is:
//!
//! ```text
//! Vector<T, R>
//! ├── RawMemory<T>     (advec-raw-memory: uninitialized block, no element logic)
//! ├── len              (slots 0..len are live)
//! └── R: Relocate<T>   (MoveElements | CloneElements, chosen at compile time)
//! ```
//!
//! `Vector` gives the strong guarantee on every reallocating path: a failure while
//! allocating or relocating leaves the vector in its pre-operation state. The one
//! deliberate exception is `clone_from` into a vector that already has enough
//! capacity, which assigns elements in place.

mod guard;
pub mod into_iter;
pub mod relocate;
pub mod vector;

pub use advec_common::{Error, ErrorKind, Result};
pub use advec_raw_memory::RawMemory;
pub use into_iter::IntoIter;
pub use relocate::{CloneElements, MoveElements, Relocate};
pub use vector::Vector;

#[cfg(test)]
mod tests;
