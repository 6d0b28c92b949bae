//! A growable, contiguous array built on top of [`RawMemory`].
//!
//! `Vector<T, R>` owns exactly one `RawMemory<T>` block and a length. Slots
//! `0..len` hold live values, slots `len..capacity` are uninitialized. The vector is
//! the only party that decides when values are constructed, dropped or relocated
//! inside the block.
//!
//! # Growth
//!
//! Capacity doubles when an append or insertion finds the vector full (starting at
//! 1). Every growth allocates a new block, relocates the live elements with the
//! strategy `R`, and only then swaps the blocks, so a failure while relocating leaves
//! the vector exactly as it was.
//!
//! # Failure model
//!
//! - Allocation failures are reported by the `try_*` methods as `Err` and escalated
//!   by their infallible counterparts (see [`Error::raise`]).
//! - Element constructors (`Default`, `Clone`, closures) report failure by
//!   panicking. Every construction loop is covered by a drop guard, so values built
//!   before the panic are destroyed on the way out.
//! - `clone_from` into a vector whose capacity already fits the source reuses the
//!   existing elements through `T::clone_from`. A panic there leaves the elements
//!   assigned before it overwritten; this path is deliberately weaker than the
//!   others.

use std::fmt;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::ptr;

use advec_common::{Error, Result, verify_arg};
use advec_raw_memory::RawMemory;

use crate::guard::InitGuard;
use crate::into_iter::IntoIter;
use crate::relocate::{MoveElements, Relocate};

/// A growable array of `T` with explicit control over storage and element lifetime.
///
/// `R` selects how elements are relocated when the storage grows; see
/// [`crate::relocate`].
///
/// # Examples
///
/// ```
/// use advec::Vector;
///
/// let mut v = Vector::<String>::new();
/// v.push("a".to_string());
/// v.push("c".to_string());
/// v.insert(1, "b".to_string());
/// assert_eq!(v, ["a", "b", "c"].map(String::from));
///
/// v.erase(0);
/// assert_eq!(v.len(), 2);
/// assert_eq!(v[0], "b");
/// ```
pub struct Vector<T, R = MoveElements> {
    /// Storage; slots `0..len` are live.
    buf: RawMemory<T>,
    /// Number of live elements.
    len: usize,
    _relocate: PhantomData<fn() -> R>,
}

impl<T, R> Vector<T, R> {
    /// Capacity multiplier applied when a full vector needs one more slot.
    pub const GROWTH_FACTOR: usize = 2;

    /// Capacity of the first block allocated by a growing append.
    pub const MIN_NON_ZERO_CAPACITY: usize = 1;

    /// Creates an empty vector. No allocation is performed.
    pub const fn new() -> Vector<T, R> {
        Vector {
            buf: RawMemory::new(),
            len: 0,
            _relocate: PhantomData,
        }
    }

    /// Returns the number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the vector holds no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of elements the vector can hold without reallocating.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Returns a pointer to the first slot. Dangling when nothing is allocated.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.buf.as_ptr()
    }

    /// Returns a mutable pointer to the first slot.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.as_mut_ptr()
    }

    /// Returns the live elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.buf.as_ptr(), self.len) }
    }

    /// Returns the live elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.buf.as_mut_ptr(), self.len) }
    }

    /// Moves the contents out, leaving `self` with no elements and zero capacity.
    pub fn take(&mut self) -> Vector<T, R> {
        std::mem::take(self)
    }

    /// Drops the current contents of `self` and takes over those of `other`,
    /// which is left with no elements and zero capacity.
    pub fn assign_take(&mut self, other: &mut Vector<T, R>) {
        *self = other.take();
    }

    /// Exchanges the contents of two vectors without touching any element.
    #[inline]
    pub fn swap_with(&mut self, other: &mut Vector<T, R>) {
        self.buf.swap(&mut other.buf);
        std::mem::swap(&mut self.len, &mut other.len);
    }

    /// Drops the elements at positions `new_len..`. Capacity is unchanged.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        let tail = ptr::slice_from_raw_parts_mut(self.buf.offset(new_len), self.len - new_len);
        // The length shrinks first so a panicking destructor cannot lead to a
        // second drop of the same values.
        self.len = new_len;
        unsafe { ptr::drop_in_place(tail) };
    }

    /// Drops every element. Capacity is unchanged.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Drops the last element.
    ///
    /// # Panics
    ///
    /// Panics if the vector is empty.
    pub fn pop_back(&mut self) {
        assert!(!self.is_empty(), "pop_back on an empty vector");
        self.len -= 1;
        unsafe { ptr::drop_in_place(self.buf.offset(self.len)) };
    }

    /// Removes the last element and returns it, or `None` if the vector is empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(unsafe { self.buf.offset(self.len).read() })
    }

    /// Removes the element at `index` and returns it, shifting the following
    /// elements one slot to the left.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        let len = self.len;
        assert!(
            index < len,
            "removal index (is {index}) should be < len (is {len})"
        );
        unsafe {
            let p = self.buf.offset(index);
            let value = p.read();
            ptr::copy(p.add(1), p, len - index - 1);
            self.len = len - 1;
            value
        }
    }

    /// Drops the element at `index`, shifting the following elements one slot to
    /// the left. Returns `index`, which now addresses the element that followed
    /// the erased one (or the end).
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn erase(&mut self, index: usize) -> usize {
        drop(self.remove(index));
        index
    }

    /// Grown capacity for an append that finds the vector full.
    fn grown_capacity(&self) -> Result<usize> {
        match self.capacity() {
            0 => Ok(Self::MIN_NON_ZERO_CAPACITY),
            cap => cap
                .checked_mul(Self::GROWTH_FACTOR)
                .ok_or_else(|| Error::capacity_overflow(cap)),
        }
    }
}

impl<T, R: Relocate<T>> Vector<T, R> {
    /// Creates an empty vector with room for `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Vector<T, R> {
        let mut v = Vector::new();
        v.reserve(capacity);
        v
    }

    /// Creates a vector of `len` default-constructed elements.
    ///
    /// The capacity equals `len`.
    pub fn with_len(len: usize) -> Vector<T, R>
    where
        T: Default,
    {
        Self::try_with_len(len).unwrap_or_else(|e| e.raise())
    }

    /// Creates a vector of `len` default-constructed elements.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be allocated. If `T::default`
    /// panics, the elements built so far are dropped in reverse order before
    /// the panic continues.
    pub fn try_with_len(len: usize) -> Result<Vector<T, R>>
    where
        T: Default,
    {
        let mut v = Vector {
            buf: RawMemory::allocate(len)?,
            len: 0,
            _relocate: PhantomData,
        };
        let mut run = InitGuard::new(v.buf.as_mut_ptr());
        for _ in 0..len {
            unsafe { run.push(T::default()) };
        }
        v.len = run.disarm();
        Ok(v)
    }

    /// Like [`Clone::clone`], but reports allocation failure instead of
    /// escalating it. The copy's capacity equals the source length.
    pub fn try_clone(&self) -> Result<Vector<T, R>>
    where
        T: Clone,
    {
        let mut v = Vector {
            buf: RawMemory::allocate(self.len)?,
            len: 0,
            _relocate: PhantomData,
        };
        let mut run = InitGuard::new(v.buf.as_mut_ptr());
        for item in self.iter() {
            unsafe { run.push(item.clone()) };
        }
        v.len = run.disarm();
        Ok(v)
    }

    /// Ensures the capacity is at least `new_capacity`.
    ///
    /// See [`Vector::try_reserve`].
    pub fn reserve(&mut self, new_capacity: usize) {
        self.try_reserve(new_capacity).unwrap_or_else(|e| e.raise())
    }

    /// Ensures the capacity is at least `new_capacity`.
    ///
    /// Does nothing if the capacity already suffices. Otherwise allocates a block of
    /// exactly `new_capacity` slots, relocates the elements and releases the old
    /// block.
    ///
    /// # Errors
    ///
    /// Returns an error if the new block cannot be allocated; the vector is
    /// unchanged. A panic while relocating also leaves the vector unchanged.
    pub fn try_reserve(&mut self, new_capacity: usize) -> Result<()> {
        if new_capacity <= self.capacity() {
            return Ok(());
        }
        let mut new_buf: RawMemory<T> = RawMemory::allocate(new_capacity)?;
        unsafe { R::relocate(self.buf.as_ptr(), new_buf.as_mut_ptr(), self.len) };
        self.replace_buffer(new_buf, self.len);
        Ok(())
    }

    /// Resizes to `new_len`, filling new slots with `T::default()`.
    pub fn resize(&mut self, new_len: usize)
    where
        T: Default,
    {
        self.resize_with(new_len, T::default);
    }

    /// Resizes to `new_len`.
    ///
    /// Growing reserves exactly `new_len` if the capacity is insufficient and fills
    /// the new slots with values returned by `f`. Shrinking drops the trailing
    /// elements. If `f` panics, the values already built for the new tail are
    /// dropped and the length is left as before.
    pub fn resize_with<F>(&mut self, new_len: usize, mut f: F)
    where
        F: FnMut() -> T,
    {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }
        self.reserve(new_len);
        let mut run = InitGuard::new(self.buf.offset(self.len));
        for _ in self.len..new_len {
            unsafe { run.push(f()) };
        }
        self.len += run.disarm();
    }

    /// Appends `value`, growing the storage if the vector is full.
    pub fn push(&mut self, value: T) -> &mut T {
        self.try_push(value).unwrap_or_else(|e| e.raise())
    }

    /// Appends a clone of `value`.
    ///
    /// The clone is made before the storage is touched.
    pub fn push_clone(&mut self, value: &T) -> &mut T
    where
        T: Clone,
    {
        self.push(value.clone())
    }

    /// Appends the value built by `f` and returns a reference to it.
    ///
    /// If `f` panics, the vector is not modified.
    pub fn emplace_back<F>(&mut self, f: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        self.push(f())
    }

    /// Appends `value`, growing the storage if the vector is full.
    ///
    /// # Errors
    ///
    /// Returns an error if the grown block cannot be allocated. The vector is
    /// unchanged and `value` is dropped.
    pub fn try_push(&mut self, value: T) -> Result<&mut T> {
        let len = self.len;
        if len == self.capacity() {
            let mut new_buf: RawMemory<T> = RawMemory::allocate(self.grown_capacity()?)?;
            unsafe { new_buf.offset(len).write(value) };
            let appended = InitGuard::covering(new_buf.offset(len), 1);
            unsafe { R::relocate(self.buf.as_ptr(), new_buf.as_mut_ptr(), len) };
            appended.disarm();
            self.replace_buffer(new_buf, len + 1);
        } else {
            unsafe { self.buf.offset(len).write(value) };
            self.len = len + 1;
        }
        Ok(unsafe { self.buf.get_unchecked_mut(len) })
    }

    /// Inserts `value` before position `index`, shifting the following elements one
    /// slot to the right, and returns a reference to it at its final position.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) -> &mut T {
        let len = self.len;
        assert!(
            index <= len,
            "insertion index (is {index}) should be <= len (is {len})"
        );
        self.try_insert(index, value).unwrap_or_else(|e| e.raise())
    }

    /// Inserts the value built by `f` before position `index`.
    ///
    /// If `f` panics, the vector is not modified.
    pub fn emplace<F>(&mut self, index: usize, f: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        self.insert(index, f())
    }

    /// Inserts `value` before position `index`.
    ///
    /// Inserting at `len` is an append. A full vector is regrown: the new element is
    /// placed at its final position in the new block, and the elements before and
    /// after it are relocated around it. Otherwise the tail is shifted in place.
    ///
    /// # Errors
    ///
    /// Returns an error if `index > len` or if the grown block cannot be
    /// allocated. In both cases the vector is unchanged and `value` is dropped.
    pub fn try_insert(&mut self, index: usize, value: T) -> Result<&mut T> {
        let len = self.len;
        verify_arg!(index, index <= len);
        if index == len {
            return self.try_push(value);
        }

        if len == self.capacity() {
            let mut new_buf: RawMemory<T> = RawMemory::allocate(self.grown_capacity()?)?;
            unsafe { new_buf.offset(index).write(value) };
            let inserted = InitGuard::covering(new_buf.offset(index), 1);
            unsafe { R::relocate(self.buf.as_ptr(), new_buf.as_mut_ptr(), index) };
            let prefix = InitGuard::covering(new_buf.as_mut_ptr(), index);
            unsafe {
                R::relocate(
                    self.buf.offset(index),
                    new_buf.offset(index + 1),
                    len - index,
                )
            };
            prefix.disarm();
            inserted.disarm();
            self.replace_buffer(new_buf, len + 1);
        } else {
            // Bitwise moves cannot fail, so shifting the tail right and writing the
            // new value into the gap needs no guard.
            unsafe {
                let p = self.buf.offset(index);
                ptr::copy(p, p.add(1), len - index);
                p.write(value);
            }
            self.len = len + 1;
        }
        Ok(unsafe { self.buf.get_unchecked_mut(index) })
    }

    /// Installs `new_buf`, whose slots `0..new_len` already hold the relocated
    /// elements plus any newly placed one, and releases the old block.
    ///
    /// The new length is in effect before the originals are dropped, so a
    /// panicking destructor cannot strand the new elements.
    fn replace_buffer(&mut self, mut new_buf: RawMemory<T>, new_len: usize) {
        let old_len = self.len;
        log::trace!(
            "vector: relocated {} elements, capacity {} -> {} ({})",
            old_len,
            self.capacity(),
            new_buf.capacity(),
            std::any::type_name::<R>()
        );
        self.buf.swap(&mut new_buf);
        self.len = new_len;
        if !R::INFALLIBLE {
            // The originals are still live in the old block.
            let old = ptr::slice_from_raw_parts_mut(new_buf.as_mut_ptr(), old_len);
            unsafe { ptr::drop_in_place(old) };
        }
    }
}

impl<T, R> Drop for Vector<T, R> {
    fn drop(&mut self) {
        let live = ptr::slice_from_raw_parts_mut(self.buf.as_mut_ptr(), self.len);
        unsafe { ptr::drop_in_place(live) };
    }
}

impl<T, R> Default for Vector<T, R> {
    fn default() -> Self {
        Vector::new()
    }
}

impl<T: Clone, R: Relocate<T>> Clone for Vector<T, R> {
    /// Deep copy with capacity equal to the source length.
    ///
    /// If an element clone panics, the clones made so far are dropped.
    fn clone(&self) -> Self {
        self.try_clone().unwrap_or_else(|e| e.raise())
    }

    /// Copy-assigns `source` into `self`.
    ///
    /// If `source` does not fit the current capacity, a full copy is built first
    /// and swapped in, so a panic leaves `self` untouched. Otherwise the common
    /// prefix is assigned element by element through `T::clone_from`, surplus
    /// elements are dropped and missing ones are cloned in place. A panicking
    /// `clone_from` leaves the elements before it already overwritten.
    fn clone_from(&mut self, source: &Self) {
        if source.len > self.capacity() {
            let mut copy = source.clone();
            self.swap_with(&mut copy);
            return;
        }

        let common = self.len.min(source.len);
        for (dst, src) in self.as_mut_slice()[..common]
            .iter_mut()
            .zip(&source.as_slice()[..common])
        {
            dst.clone_from(src);
        }

        if self.len > source.len {
            self.truncate(source.len);
        } else {
            let mut run = InitGuard::new(self.buf.offset(self.len));
            for item in &source.as_slice()[self.len..] {
                unsafe { run.push(item.clone()) };
            }
            self.len += run.disarm();
        }
    }
}

impl<T, R> Deref for Vector<T, R> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T, R> DerefMut for Vector<T, R> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T, R> AsRef<[T]> for Vector<T, R> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T: fmt::Debug, R> fmt::Debug for Vector<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T: PartialEq, R> PartialEq for Vector<T, R> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq, R> Eq for Vector<T, R> {}

impl<T: PartialEq, R> PartialEq<[T]> for Vector<T, R> {
    fn eq(&self, other: &[T]) -> bool {
        self.as_slice() == other
    }
}

impl<T: PartialEq, R, const N: usize> PartialEq<[T; N]> for Vector<T, R> {
    fn eq(&self, other: &[T; N]) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T, R: Relocate<T>> Extend<T> for Vector<T, R> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

impl<T, R: Relocate<T>> FromIterator<T> for Vector<T, R> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut v = Vector::new();
        v.extend(iter);
        v
    }
}

impl<'a, T, R> IntoIterator for &'a Vector<T, R> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, R> IntoIterator for &'a mut Vector<T, R> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<T, R> IntoIterator for Vector<T, R> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        let mut this = ManuallyDrop::new(self);
        let len = this.len;
        IntoIter::new(this.buf.take(), len)
    }
}
