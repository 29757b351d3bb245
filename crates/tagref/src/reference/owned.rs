//! Type-erased owned heap cells

use std::alloc::{self, Layout};
use std::any::type_name;
use std::fmt;
use std::ptr::{self, NonNull};

use crate::error::ReferError;

/// Type-erased destructor invoked on an owned cell's contents.
///
/// It must release what the object owns but must not free the object's own
/// storage; the cell does that afterwards.
pub type Destructor = unsafe fn(object: *mut ());

/// Destructor that runs `T`'s `Drop` in place.
///
/// # Safety
///
/// `object` must point to a live, initialized `T` that is not used again.
pub unsafe fn drop_in_place_erased<T>(object: *mut ()) {
    ptr::drop_in_place(object.cast::<T>());
}

unsafe fn release<T>(object: NonNull<()>) {
    let layout = Layout::new::<T>();
    if layout.size() != 0 {
        alloc::dealloc(object.as_ptr().cast(), layout);
    }
}

/// A heap allocation owned by exactly one reference.
///
/// Dropping the cell calls its destructor once on the stored object and then
/// frees the storage.
pub struct OwnedCell {
    object: NonNull<()>,
    destructor: Destructor,
    release: unsafe fn(NonNull<()>),
    type_name: &'static str,
}

impl OwnedCell {
    /// Move `value` into a fresh heap cell guarded by `destructor`.
    ///
    /// Returns [`ReferError::AllocationFailed`] if the allocator refuses;
    /// `value` is dropped normally in that case.
    ///
    /// # Safety
    ///
    /// `destructor` must accept a pointer to a live `T`, as described on
    /// [`Destructor`].
    pub unsafe fn new<T>(value: T, destructor: Destructor) -> Result<Self, ReferError> {
        let layout = Layout::new::<T>();
        let object = if layout.size() == 0 {
            NonNull::<T>::dangling()
        } else {
            NonNull::new(alloc::alloc(layout).cast::<T>()).ok_or(ReferError::AllocationFailed {
                size: layout.size(),
            })?
        };
        object.as_ptr().write(value);
        Ok(Self {
            object: object.cast(),
            destructor,
            release: release::<T>,
            type_name: type_name::<T>(),
        })
    }

    /// Address of the owned object.
    pub fn as_non_null(&self) -> NonNull<()> {
        self.object
    }

    /// Address of the owned object as a raw pointer.
    pub fn as_ptr(&self) -> *mut () {
        self.object.as_ptr()
    }

    /// Name of the stored type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl Drop for OwnedCell {
    fn drop(&mut self) {
        tracing::debug!(type_name = self.type_name, "releasing owned cell");
        // SAFETY: the cell was built by `new`, whose caller vouched for the
        // destructor, and `drop` runs once.
        unsafe {
            (self.destructor)(self.object.as_ptr());
            (self.release)(self.object);
        }
    }
}

impl fmt::Debug for OwnedCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {:p}", self.type_name, self.object.as_ptr())
    }
}
