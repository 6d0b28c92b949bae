//! Strategies for carrying live elements over into a freshly allocated buffer.
//!
//! Every reallocation of a `Vector` (explicit `reserve`, growth on append, insertion
//! into a full vector, growing `resize`) constructs the existing elements in the new
//! buffer before the old one is released. The strategy is a type parameter, so the
//! choice is made at compile time and applied uniformly to all of those paths.
//!
//! - [`MoveElements`] transfers the bits. It cannot fail, and the originals are
//!   consumed by the transfer.
//! - [`CloneElements`] constructs the new elements with `Clone`. A panicking clone
//!   destroys the clones made so far and leaves every original untouched, so the
//!   vector is still in its pre-operation state. On success the originals are
//!   dropped by the vector.
//!
//! Element types without `Clone` have no copy fallback and can only be used with
//! `MoveElements`.

use std::ptr;

use crate::guard::InitGuard;

/// Relocation of live elements between two non-overlapping buffers.
///
/// # Safety
///
/// Implementors must guarantee that [`Relocate::relocate`]:
/// - constructs exactly `count` live values at `dst` when it returns
/// - leaves the values at `src` live when `INFALLIBLE` is `false`, and consumes
///   them (the caller must not drop them) when `INFALLIBLE` is `true`
/// - never unwinds when `INFALLIBLE` is `true`
/// - on unwinding, leaves no live value at `dst` and `src` untouched
pub unsafe trait Relocate<T> {
    /// `true` if relocation can never fail.
    const INFALLIBLE: bool;

    /// Constructs `count` elements at `dst` from the live elements at `src`.
    ///
    /// # Safety
    ///
    /// `src` must point to `count` live values, `dst` must be valid for `count`
    /// writes, and the two ranges must not overlap.
    unsafe fn relocate(src: *const T, dst: *mut T, count: usize);
}

/// Relocates by bitwise move.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveElements;

/// Relocates by `Clone`, keeping the originals intact until every clone succeeded.
#[derive(Debug, Clone, Copy, Default)]
pub struct CloneElements;

unsafe impl<T> Relocate<T> for MoveElements {
    const INFALLIBLE: bool = true;

    #[inline]
    unsafe fn relocate(src: *const T, dst: *mut T, count: usize) {
        unsafe { ptr::copy_nonoverlapping(src, dst, count) };
    }
}

unsafe impl<T: Clone> Relocate<T> for CloneElements {
    const INFALLIBLE: bool = false;

    unsafe fn relocate(src: *const T, dst: *mut T, count: usize) {
        let mut run = InitGuard::new(dst);
        for i in 0..count {
            unsafe { run.push((*src.add(i)).clone()) };
        }
        run.disarm();
    }
}
