use std::ptr;

/// A run of values written one after another into uninitialized slots.
///
/// Until [`InitGuard::disarm`] is called, dropping the guard destroys every value
/// written so far, last one first. This is what unwinds a construction loop
/// when an element constructor panics part-way.
pub(crate) struct InitGuard<T> {
    start: *mut T,
    len: usize,
}

impl<T> InitGuard<T> {
    /// Starts an empty run at `start`.
    #[inline]
    pub(crate) fn new(start: *mut T) -> InitGuard<T> {
        InitGuard { start, len: 0 }
    }

    /// Takes responsibility for `len` values already living at `start`.
    #[inline]
    pub(crate) fn covering(start: *mut T, len: usize) -> InitGuard<T> {
        InitGuard { start, len }
    }

    /// Writes `value` into the next slot of the run.
    ///
    /// # Safety
    ///
    /// The slot right after the run must be valid for writes and hold no live value.
    #[inline]
    pub(crate) unsafe fn push(&mut self, value: T) {
        unsafe { self.start.add(self.len).write(value) };
        self.len += 1;
    }

    /// Hands the run over to the caller and returns its length.
    #[inline]
    pub(crate) fn disarm(self) -> usize {
        let len = self.len;
        std::mem::forget(self);
        len
    }
}

impl<T> Drop for InitGuard<T> {
    fn drop(&mut self) {
        for i in (0..self.len).rev() {
            unsafe { ptr::drop_in_place(self.start.add(i)) };
        }
    }
}
