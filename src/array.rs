use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr;

use crate::{AllocError, Arena, Relocate};

/// Growable array over a single [`Arena`] block.
///
/// Slots `[0, len)` hold live values, slots `[len, capacity)` are
/// uninitialized storage that is never read as a typed value. The array is
/// the only party that builds values into slots or drops them; the arena
/// underneath only hands out bytes.
///
/// All operations that may acquire storage return `Result<_, AllocError>`.
/// Failures raised by the element type itself (a panicking clone or
/// constructor closure) unwind through the operation; each operation
/// documents the state it leaves behind, and none of them leak a value or a
/// block. Unless stated otherwise the guarantee is strong: on failure the
/// array is observably unchanged.
///
/// References and iterators obtained from the array point into the current
/// block and are invalidated by any capacity change and by any insert or
/// erase that shifts values; the borrow checker rejects such use at compile
/// time.
pub struct Array<T> where T: Relocate {
    arena: Arena<T>,
    len: usize,
}

/// Drops the values built so far when construction of a range fails
/// part-way.
struct PartialInit<T> {
    base: *mut T,
    built: usize,
}

impl<T> Drop for PartialInit<T> {
    fn drop(&mut self) {
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.base, self.built));
        }
    }
}

/// Rollback bookkeeping for relocation into a fresh arena that already
/// holds the newly built value at `slot`: a prefix `[0, head)`, the slot
/// itself, and `tail` values starting right after the slot.
struct SpliceInit<T> {
    base: *mut T,
    slot: usize,
    head: usize,
    tail: usize,
}

impl<T> Drop for SpliceInit<T> {
    fn drop(&mut self) {
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.base, self.head));
            ptr::drop_in_place(self.base.add(self.slot));
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.base.add(self.slot + 1),
                self.tail,
            ));
        }
    }
}

impl<T> Array<T> where T: Relocate {
    /// An empty array holding no storage block.
    pub fn new() -> Array<T> {
        Array {
            arena: Arena::empty(),
            len: 0,
        }
    }

    /// An empty array with storage for `capacity` values already acquired.
    pub fn with_capacity(capacity: usize) -> Result<Array<T>, AllocError> {
        Ok(Array {
            arena: Arena::with_capacity(capacity)?,
            len: 0,
        })
    }

    /// Builds an array of `len` values produced by `build`, in order, into
    /// storage of exactly `len` slots.
    ///
    /// If `build` panics partway, the values built so far are dropped and
    /// the block released before the panic propagates.
    pub fn from_fn(len: usize, mut build: impl FnMut() -> T) -> Result<Array<T>, AllocError> {
        let arena = Arena::with_capacity(len)?;
        let mut guard = PartialInit { base: arena.base(), built: 0 };
        for i in 0..len {
            unsafe { ptr::write(arena.at(i), build()) };
            guard.built += 1;
        }
        mem::forget(guard);
        Ok(Array { arena, len })
    }

    /// Builds an array of `len` default values.
    pub fn with_len(len: usize) -> Result<Array<T>, AllocError> where T: Default {
        Array::from_fn(len, T::default)
    }

    /// Number of live values.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of values the current block can hold.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.arena.capacity()
    }

    /// The live values as a slice.
    #[inline(always)]
    pub fn as_slice(&self) -> &[T] {
        unsafe { std::slice::from_raw_parts(self.arena.base(), self.len) }
    }

    /// The live values as a mutable slice.
    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        unsafe { std::slice::from_raw_parts_mut(self.arena.base(), self.len) }
    }

    /// Copy-constructs a new array with the same values.
    ///
    /// If a clone panics partway, the clones built so far are dropped and
    /// the fresh block released before the panic propagates; `self` is
    /// never touched.
    pub fn try_clone(&self) -> Result<Array<T>, AllocError> where T: Clone {
        let arena = Arena::with_capacity(self.len)?;
        let mut guard = PartialInit { base: arena.base(), built: 0 };
        for (i, item) in self.iter().enumerate() {
            unsafe { ptr::write(arena.at(i), item.clone()) };
            guard.built += 1;
        }
        mem::forget(guard);
        Ok(Array { arena, len: self.len })
    }

    /// Copy-assignment from another array.
    ///
    /// When `rhs` does not fit the current block, a fresh copy is built and
    /// swapped in, so a failure leaves `self` exactly unchanged (strong
    /// guarantee). When `rhs` fits, values are overwritten in place over
    /// the shared prefix and the remainder is built or dropped; a failure
    /// in this branch leaves `self` valid but possibly partially updated
    /// (basic guarantee). The asymmetry is deliberate and part of the
    /// contract.
    pub fn assign_from(&mut self, rhs: &Array<T>) -> Result<(), AllocError> where T: Clone {
        if rhs.len > self.arena.capacity() {
            let mut fresh = rhs.try_clone()?;
            self.swap(&mut fresh);
            return Ok(());
        }
        let shared = self.len.min(rhs.len);
        for (dst, src) in self.as_mut_slice()[..shared]
            .iter_mut()
            .zip(rhs.as_slice()[..shared].iter())
        {
            dst.clone_from(src);
        }
        if rhs.len > self.len {
            let mut guard = PartialInit {
                base: unsafe { self.arena.at(self.len) },
                built: 0,
            };
            for i in self.len..rhs.len {
                unsafe { ptr::write(self.arena.at(i), rhs.as_slice()[i].clone()) };
                guard.built += 1;
            }
            mem::forget(guard);
        } else {
            unsafe {
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                    self.arena.at(rhs.len),
                    self.len - rhs.len,
                ));
            }
        }
        self.len = rhs.len;
        Ok(())
    }

    /// Moves the contents out, leaving `self` empty with no block. O(1),
    /// no element is copied or moved individually.
    pub fn take(&mut self) -> Array<T> {
        mem::take(self)
    }

    /// Exchanges contents with another array. O(1), never fails.
    pub fn swap(&mut self, other: &mut Array<T>) {
        self.arena.swap(&mut other.arena);
        mem::swap(&mut self.len, &mut other.len);
    }

    /// Ensures storage for at least `new_capacity` values.
    ///
    /// Does nothing when the current block is already large enough;
    /// otherwise acquires a block of exactly `new_capacity` slots and
    /// relocates the live values into it. Strong guarantee: on any failure
    /// the array is unchanged.
    pub fn reserve(&mut self, new_capacity: usize) -> Result<(), AllocError> {
        if new_capacity <= self.arena.capacity() {
            return Ok(());
        }
        trace!("array: reserve {} -> {}", self.arena.capacity(), new_capacity);
        let mut new_arena = Arena::with_capacity(new_capacity)?;
        unsafe {
            let old = self.arena.base();
            let fresh = new_arena.base();
            if T::MOVE_NEVER_FAILS {
                ptr::copy_nonoverlapping(old, fresh, self.len);
            } else {
                Self::duplicate_range(old, fresh, self.len);
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(old, self.len));
            }
        }
        self.arena.swap(&mut new_arena);
        Ok(())
    }

    /// Grows or shrinks to exactly `new_len` values, filling new trailing
    /// slots from `build`.
    ///
    /// A panic in `build` drops the partially built tail and leaves the
    /// length unchanged (the capacity may already have grown).
    pub fn resize_with(
        &mut self,
        new_len: usize,
        mut build: impl FnMut() -> T,
    ) -> Result<(), AllocError> {
        if new_len > self.len {
            self.reserve(new_len)?;
            let mut guard = PartialInit {
                base: unsafe { self.arena.at(self.len) },
                built: 0,
            };
            for i in self.len..new_len {
                unsafe { ptr::write(self.arena.at(i), build()) };
                guard.built += 1;
            }
            mem::forget(guard);
        } else {
            unsafe {
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                    self.arena.at(new_len),
                    self.len - new_len,
                ));
            }
        }
        self.len = new_len;
        Ok(())
    }

    /// Grows or shrinks to exactly `new_len` values, filling with defaults.
    pub fn resize(&mut self, new_len: usize) -> Result<(), AllocError> where T: Default {
        self.resize_with(new_len, T::default)
    }

    /// Appends a value. Amortized O(1).
    ///
    /// On growth the value lands in its slot in the new block before any
    /// relocation starts, so a relocation failure leaves the old array
    /// untouched (the value itself is disposed of with the abandoned
    /// block).
    pub fn push(&mut self, value: T) -> Result<(), AllocError> {
        if self.len == self.arena.capacity() {
            self.splice_grow(self.len, move || value)?;
        } else {
            unsafe { ptr::write(self.arena.at(self.len), value) };
            self.len += 1;
        }
        Ok(())
    }

    /// Appends a copy of a value.
    pub fn push_clone(&mut self, value: &T) -> Result<(), AllocError> where T: Clone {
        if self.len == self.arena.capacity() {
            self.splice_grow(self.len, || value.clone())?;
        } else {
            unsafe { ptr::write(self.arena.at(self.len), value.clone()) };
            self.len += 1;
        }
        Ok(())
    }

    /// Appends a value produced by `build` and returns a reference to it.
    ///
    /// On growth the new block is acquired first and the result of `build`
    /// is written straight to its target slot; if `build` panics the fresh
    /// block is released and the array is untouched.
    pub fn emplace_back_with(
        &mut self,
        build: impl FnOnce() -> T,
    ) -> Result<&mut T, AllocError> {
        self.emplace_with(self.len, build)
    }

    /// Moves the last value out, or `None` when empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(unsafe { ptr::read(self.arena.at(self.len)) })
    }

    /// Drops all live values. The block is kept.
    pub fn clear(&mut self) {
        let live = self.len;
        self.len = 0;
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.arena.base(), live));
        }
    }

    /// Inserts a value at `index`, shifting the values after it one slot
    /// right. Panics when `index > len`.
    ///
    /// Returns a reference to the inserted value; its predecessors keep
    /// their indices and every later value moves up by one.
    pub fn insert(&mut self, index: usize, value: T) -> Result<&mut T, AllocError> {
        self.emplace_with(index, move || value)
    }

    /// Inserts a copy of a value at `index`. Panics when `index > len`.
    pub fn insert_clone(&mut self, index: usize, value: &T) -> Result<&mut T, AllocError>
    where
        T: Clone,
    {
        self.emplace_with(index, || value.clone())
    }

    /// Inserts the value produced by `build` at `index`. Panics when
    /// `index > len`.
    ///
    /// The value is always materialized in full before any destination
    /// slot is overwritten or any relocation begins. Without growth a
    /// panicking `build` leaves the array untouched; with growth it
    /// additionally releases the freshly acquired block.
    pub fn emplace_with(
        &mut self,
        index: usize,
        build: impl FnOnce() -> T,
    ) -> Result<&mut T, AllocError> {
        assert!(index <= self.len, "insert position within [0, len]");
        if self.len == self.arena.capacity() {
            return self.splice_grow(index, build);
        }
        let value = build();
        unsafe {
            if index < self.len {
                ptr::copy(self.arena.at(index), self.arena.at(index + 1), self.len - index);
            }
            ptr::write(self.arena.at(index), value);
            self.len += 1;
            Ok(&mut *self.arena.at(index))
        }
    }

    /// Removes the value at `index`, shifting the values after it one slot
    /// left. Panics when `index >= len`. Capacity is unchanged.
    ///
    /// Returns the value now living at `index` (the removed value's former
    /// successor), or `None` when the removed value was last. On the
    /// copy-assignment shift path a panicking duplicate leaves the array
    /// valid but possibly partially shifted (basic guarantee).
    pub fn erase(&mut self, index: usize) -> Option<&mut T> {
        assert!(index < self.len, "erase position within [0, len)");
        unsafe {
            if T::MOVE_NEVER_FAILS {
                ptr::drop_in_place(self.arena.at(index));
                ptr::copy(
                    self.arena.at(index + 1),
                    self.arena.at(index),
                    self.len - index - 1,
                );
            } else {
                for i in index..self.len - 1 {
                    let source = self.arena.at(i + 1) as *const T;
                    (*self.arena.at(i)).duplicate_from(&*source);
                }
                ptr::drop_in_place(self.arena.at(self.len - 1));
            }
            self.len -= 1;
            if index < self.len {
                Some(&mut *self.arena.at(index))
            } else {
                None
            }
        }
    }

    /// Capacity after a growth step: doubles, never less than one.
    #[inline(always)]
    fn grown_capacity(&self) -> usize {
        if self.len == 0 {
            1
        } else {
            self.len.saturating_mul(2)
        }
    }

    /// Grows the block and inserts the value produced by `build` at
    /// `index` in one relocation pass.
    ///
    /// Order matters here: the block is acquired, the new value is built
    /// straight into its destination slot, and only then are the old
    /// values relocated around it. Any failure disposes of everything
    /// already placed in the new block and leaves the old array serving
    /// unchanged.
    fn splice_grow(
        &mut self,
        index: usize,
        build: impl FnOnce() -> T,
    ) -> Result<&mut T, AllocError> {
        let new_capacity = self.grown_capacity();
        debug!(
            "array: grow {} -> {} splicing at {}",
            self.arena.capacity(),
            new_capacity,
            index
        );
        let mut new_arena = Arena::with_capacity(new_capacity)?;
        unsafe {
            ptr::write(new_arena.at(index), build());
            let old = self.arena.base();
            let fresh = new_arena.base();
            if T::MOVE_NEVER_FAILS {
                ptr::copy_nonoverlapping(old, fresh, index);
                ptr::copy_nonoverlapping(old.add(index), fresh.add(index + 1), self.len - index);
            } else {
                let mut guard = SpliceInit { base: fresh, slot: index, head: 0, tail: 0 };
                for i in 0..index {
                    ptr::write(fresh.add(i), (*old.add(i)).duplicate());
                    guard.head += 1;
                }
                for i in index..self.len {
                    ptr::write(fresh.add(i + 1), (*old.add(i)).duplicate());
                    guard.tail += 1;
                }
                mem::forget(guard);
                ptr::drop_in_place(ptr::slice_from_raw_parts_mut(old, self.len));
            }
            self.arena.swap(&mut new_arena);
            self.len += 1;
            Ok(&mut *self.arena.at(index))
        }
    }

    /// Builds copies of `count` values from `src` at `dst`, dropping the
    /// partially built range if one duplicate panics. The source range is
    /// never modified.
    unsafe fn duplicate_range(src: *const T, dst: *mut T, count: usize) {
        let mut guard = PartialInit { base: dst, built: 0 };
        for i in 0..count {
            ptr::write(dst.add(i), (*src.add(i)).duplicate());
            guard.built += 1;
        }
        mem::forget(guard);
    }
}

impl<T> Drop for Array<T> where T: Relocate {
    fn drop(&mut self) {
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.arena.base(), self.len));
        }
    }
}

impl<T> Default for Array<T> where T: Relocate {
    fn default() -> Array<T> {
        Array::new()
    }
}

impl<T> Deref for Array<T> where T: Relocate {
    type Target = [T];

    #[inline(always)]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for Array<T> where T: Relocate {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<'a, T> IntoIterator for &'a Array<T> where T: Relocate {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Array<T> where T: Relocate {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

impl<T, U> PartialEq<Array<U>> for Array<T>
where
    T: Relocate + PartialEq<U>,
    U: Relocate,
{
    fn eq(&self, other: &Array<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T> Eq for Array<T> where T: Relocate + Eq {}

impl<T> fmt::Debug for Array<T> where T: Relocate + fmt::Debug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}
