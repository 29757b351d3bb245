//! Raw, exactly sized element storage

use std::alloc::{self, Layout};
use std::marker::PhantomData;
use std::ptr::{self, NonNull};

use crate::error::StackError;

/// Contiguous heap storage for up to `capacity` values of `T`.
///
/// The buffer tracks no initialization state: the owner must drop any live
/// elements it would lose before shrinking, and before the buffer itself is
/// dropped. `ptr` is null exactly when `capacity` is zero.
pub(crate) struct RawBuffer<T> {
    ptr: *mut T,
    capacity: u32,
    _marker: PhantomData<T>,
}

impl<T> RawBuffer<T> {
    pub(crate) const fn new() -> Self {
        Self {
            ptr: ptr::null_mut(),
            capacity: 0,
            _marker: PhantomData,
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> u32 {
        self.capacity
    }

    #[inline]
    pub(crate) fn as_ptr(&self) -> *mut T {
        self.ptr
    }

    fn layout_of(capacity: u32) -> Result<Layout, StackError> {
        Layout::array::<T>(capacity as usize).map_err(|_| StackError::CapacityOverflow { capacity })
    }

    /// Reallocate to exactly `capacity` elements.
    ///
    /// Existing contents up to the smaller of the two capacities are kept.
    /// On failure the buffer is left as it was.
    pub(crate) fn set_capacity(&mut self, capacity: u32) -> Result<(), StackError> {
        let old_capacity = self.capacity;
        if capacity == old_capacity {
            return Ok(());
        }
        tracing::trace!(from = old_capacity, to = capacity, "reallocating stack buffer");

        if capacity == 0 {
            self.release();
            return Ok(());
        }

        let new_layout = Self::layout_of(capacity)?;
        let new_ptr = if new_layout.size() == 0 {
            NonNull::<T>::dangling().as_ptr()
        } else if old_capacity == 0 {
            // SAFETY: the layout has non-zero size.
            unsafe { alloc::alloc(new_layout).cast::<T>() }
        } else {
            let old_layout = Self::layout_of(old_capacity)?;
            // SAFETY: `ptr` was allocated with `old_layout` and the new size
            // is non-zero and did not overflow when laid out.
            unsafe { alloc::realloc(self.ptr.cast(), old_layout, new_layout.size()).cast::<T>() }
        };
        if new_ptr.is_null() {
            return Err(StackError::AllocationFailed { capacity });
        }

        self.ptr = new_ptr;
        self.capacity = capacity;
        Ok(())
    }

    fn release(&mut self) {
        if self.capacity == 0 {
            return;
        }
        if let Ok(layout) = Self::layout_of(self.capacity) {
            if layout.size() != 0 {
                // SAFETY: `ptr` was allocated with exactly this layout.
                unsafe { alloc::dealloc(self.ptr.cast(), layout) };
            }
        }
        self.ptr = ptr::null_mut();
        self.capacity = 0;
    }
}

impl<T> Drop for RawBuffer<T> {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer_is_null() {
        let buffer = RawBuffer::<u64>::new();
        assert!(buffer.as_ptr().is_null());
        assert_eq!(buffer.capacity(), 0);
    }

    #[test]
    fn test_grow_preserves_contents() {
        let mut buffer = RawBuffer::<u32>::new();
        buffer.set_capacity(2).unwrap();
        unsafe {
            buffer.as_ptr().write(11);
            buffer.as_ptr().add(1).write(22);
        }
        buffer.set_capacity(8).unwrap();
        assert_eq!(buffer.capacity(), 8);
        unsafe {
            assert_eq!(*buffer.as_ptr(), 11);
            assert_eq!(*buffer.as_ptr().add(1), 22);
        }
    }

    #[test]
    fn test_shrink_to_zero_frees() {
        let mut buffer = RawBuffer::<u8>::new();
        buffer.set_capacity(4).unwrap();
        assert!(!buffer.as_ptr().is_null());
        buffer.set_capacity(0).unwrap();
        assert!(buffer.as_ptr().is_null());
        assert_eq!(buffer.capacity(), 0);
    }

    #[test]
    fn test_zero_sized_elements() {
        let mut buffer = RawBuffer::<()>::new();
        buffer.set_capacity(16).unwrap();
        assert!(!buffer.as_ptr().is_null());
        assert_eq!(buffer.capacity(), 16);
    }
}
