use std::alloc::{alloc, dealloc, Layout};
use std::fmt;
use std::mem;
use std::ptr::NonNull;

use crate::AllocError;

/// Owns one contiguous block of uninitialized storage sized for a fixed
/// number of `T` values.
///
/// The arena deals in bytes only: it never constructs a value and never
/// drops one. Whoever writes a value into a slot is responsible for reading
/// it back out or dropping it in place before the arena releases the block.
///
/// An arena cannot be cloned. A byte-for-byte duplicate of a block would be
/// meaningless without knowing which slots hold live values, and would risk
/// two owners releasing the same block. Ownership moves, or is exchanged
/// with [`swap`](Arena::swap).
pub struct Arena<T> where T: Sized {
    ptr: NonNull<T>,
    cap: usize,
}

impl<T> Arena<T> where T: Sized {
    /// An arena holding no block. Capacity is zero, nothing to release.
    pub fn empty() -> Arena<T> {
        Arena {
            ptr: NonNull::dangling(),
            cap: 0,
        }
    }

    /// Allocates an uninitialized block sized for exactly `capacity` values.
    ///
    /// A request for zero capacity, or any capacity of a zero-sized type,
    /// holds no block at all. Allocation failures are reported, never
    /// handled here.
    pub fn with_capacity(capacity: usize) -> Result<Arena<T>, AllocError> {
        let layout = Layout::array::<T>(capacity).map_err(|_| AllocError::CapacityOverflow {
            elements: capacity,
            element_size: mem::size_of::<T>(),
        })?;
        if layout.size() == 0 {
            return Ok(Arena {
                ptr: NonNull::dangling(),
                cap: capacity,
            });
        }
        trace!("arena: allocating {} bytes for {} slots", layout.size(), capacity);
        let raw = unsafe { alloc(layout) } as *mut T;
        match NonNull::new(raw) {
            Some(ptr) => Ok(Arena { ptr, cap: capacity }),
            None => Err(AllocError::OutOfMemory { bytes: layout.size() }),
        }
    }

    /// Number of values the block can hold.
    #[inline(always)]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    /// Pointer to the first slot.
    ///
    /// Dangling (but well aligned) when the arena holds no block, which is
    /// fine for zero-length reads and writes.
    #[inline(always)]
    pub fn base(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Pointer to the slot at `index`, unchecked in release builds.
    ///
    /// The one-past-the-end address may be formed; reading or writing
    /// through it, or through any index beyond capacity, is undefined
    /// behavior.
    #[inline(always)]
    pub unsafe fn at(&self, index: usize) -> *mut T {
        debug_assert!(index <= self.cap, "slot index within capacity");
        self.ptr.as_ptr().add(index)
    }

    /// Exchanges blocks and capacities between two arenas. O(1), never
    /// fails.
    #[inline(always)]
    pub fn swap(&mut self, other: &mut Arena<T>) {
        mem::swap(&mut self.ptr, &mut other.ptr);
        mem::swap(&mut self.cap, &mut other.cap);
    }
}

// The block address is unstable between runs, so only the capacity and
// whether a block is held are shown.
impl<T> fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("capacity", &self.cap)
            .field("holds_block", &(self.cap != 0 && mem::size_of::<T>() != 0))
            .finish()
    }
}

impl<T> Drop for Arena<T> {
    fn drop(&mut self) {
        if self.cap != 0 && mem::size_of::<T>() != 0 {
            trace!("arena: releasing block of {} slots", self.cap);
            // the layout was validated when the block was allocated
            unsafe {
                let layout = Layout::from_size_align_unchecked(
                    mem::size_of::<T>() * self.cap,
                    mem::align_of::<T>(),
                );
                dealloc(self.ptr.as_ptr() as *mut u8, layout);
            }
        }
    }
}
