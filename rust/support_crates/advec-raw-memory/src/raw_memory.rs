//! Typed, uninitialized storage for a fixed number of elements.
//!
//! This module provides `RawMemory<T>`, the storage layer underneath the growable
//! `Vector`. It separates *allocation* from *construction*: a `RawMemory<T>` owns a
//! block sized for `capacity` values of `T`, but it never holds live values as far as
//! it is concerned. Writing values into slots, reading them back and dropping them is
//! entirely the caller's business.
//!
//! # Ownership
//!
//! - Dropping a `RawMemory<T>` releases the block without running any element
//!   destructor. Callers must destroy every value they constructed before that.
//! - The type is not `Clone`: copying a block without knowing which slots are live
//!   cannot be done soundly.
//! - Ownership of the block is transferred with [`RawMemory::take`] or
//!   [`RawMemory::swap`]; the source is left with no block and zero capacity.

use std::alloc::{Layout, alloc, dealloc};
use std::marker::PhantomData;
use std::ptr::NonNull;

use advec_common::{Error, Result};

/// An owned, uninitialized memory block with room for `capacity` values of `T`.
pub struct RawMemory<T> {
    /// Start of the block, dangling when nothing is allocated.
    ptr: NonNull<T>,
    /// Number of `T` slots the block can hold.
    capacity: usize,
    _marker: PhantomData<T>,
}

impl<T> RawMemory<T> {
    /// Creates an empty block. No allocation is performed.
    pub const fn new() -> RawMemory<T> {
        RawMemory {
            ptr: NonNull::dangling(),
            capacity: 0,
            _marker: PhantomData,
        }
    }

    /// Allocates an uninitialized block for `capacity` values of `T`.
    ///
    /// A zero `capacity` yields an empty block without touching the allocator.
    /// Zero-sized `T` never allocates either, but the requested capacity is kept.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - the byte size of the block overflows (`CapacityOverflow`)
    /// - the global allocator cannot satisfy the request (`AllocationFailed`)
    pub fn allocate(capacity: usize) -> Result<RawMemory<T>> {
        if capacity == 0 {
            return Ok(RawMemory::new());
        }

        let layout =
            Layout::array::<T>(capacity).map_err(|_| Error::capacity_overflow(capacity))?;
        if layout.size() == 0 {
            return Ok(RawMemory {
                ptr: NonNull::dangling(),
                capacity,
                _marker: PhantomData,
            });
        }

        let ptr = unsafe { alloc(layout) };
        let ptr = NonNull::new(ptr.cast::<T>()).ok_or_else(|| Error::allocation_failed(layout))?;
        log::trace!(
            "raw memory: allocated {} bytes for {capacity} x {}",
            layout.size(),
            std::any::type_name::<T>()
        );
        Ok(RawMemory {
            ptr,
            capacity,
            _marker: PhantomData,
        })
    }

    /// Returns the number of `T` slots in the block.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the base address of the block as a const pointer.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Returns the base address of the block as a mutable pointer.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Returns the address of slot `index`.
    ///
    /// `index == capacity` is allowed and yields the one-past-the-end address.
    /// The pointer is dangling (but well aligned) when nothing is allocated.
    ///
    /// # Panics
    ///
    /// Panics if `index > capacity`.
    #[inline]
    pub fn offset(&self, index: usize) -> *mut T {
        assert!(
            index <= self.capacity,
            "slot index (is {index}) should be <= capacity (is {})",
            self.capacity
        );
        unsafe { self.ptr.as_ptr().add(index) }
    }

    /// Returns a reference to the value in slot `index`.
    ///
    /// # Safety
    ///
    /// `index` must be below the capacity and the slot must hold a value the
    /// caller has constructed and not yet destroyed.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.capacity);
        unsafe { &*self.ptr.as_ptr().add(index) }
    }

    /// Returns a mutable reference to the value in slot `index`.
    ///
    /// # Safety
    ///
    /// Same requirements as [`RawMemory::get_unchecked`].
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.capacity);
        unsafe { &mut *self.ptr.as_ptr().add(index) }
    }

    /// Exchanges the blocks owned by `self` and `other`.
    #[inline]
    pub fn swap(&mut self, other: &mut RawMemory<T>) {
        std::mem::swap(&mut self.ptr, &mut other.ptr);
        std::mem::swap(&mut self.capacity, &mut other.capacity);
    }

    /// Moves the block out of `self`, leaving an empty block with zero capacity.
    #[inline]
    pub fn take(&mut self) -> RawMemory<T> {
        std::mem::take(self)
    }

    /// Layout of the allocated block, `None` if nothing was handed out by the
    /// allocator.
    fn allocated_layout(&self) -> Option<Layout> {
        if self.capacity == 0 {
            return None;
        }
        match Layout::array::<T>(self.capacity) {
            Ok(layout) if layout.size() != 0 => Some(layout),
            _ => None,
        }
    }
}

impl<T> Default for RawMemory<T> {
    fn default() -> Self {
        RawMemory::new()
    }
}

impl<T> Drop for RawMemory<T> {
    /// Releases the block. Slot contents are never inspected or dropped.
    fn drop(&mut self) {
        if let Some(layout) = self.allocated_layout() {
            log::trace!("raw memory: released {} bytes", layout.size());
            unsafe { dealloc(self.ptr.as_ptr().cast::<u8>(), layout) };
        }
    }
}

// SAFETY: RawMemory owns its block exclusively; moving it to another thread moves
// the right to touch the slots with it.
unsafe impl<T: Send> Send for RawMemory<T> {}

// SAFETY: shared access only hands out raw pointers and `unsafe` accessors; any
// data race on the slots is the responsibility of the caller that writes them.
unsafe impl<T: Sync> Sync for RawMemory<T> {}

impl<T> std::fmt::Debug for RawMemory<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawMemory")
            .field("ptr", &self.ptr)
            .field("capacity", &self.capacity)
            .finish()
    }
}
