//! Plugging array elements into references

use std::ptr::{self, NonNull};

use super::Stack;
use crate::element::Element;
use crate::reference::{Reference, Slot};

/// Resolver for "element `offset` of the `Stack<T>` at `start`".
///
/// `start` must resolve to a `Stack<T>` and `offset` to a `u32` index.
/// The array grows at resolve time if the index is past its end. A null
/// `start` resolves to null.
///
/// # Safety
///
/// `start` must be null or point to a live `Stack<T>` with no other active
/// borrow, and `offset` must point to a readable `u32`.
pub unsafe fn element_resolver<T: Element>(start: *mut (), offset: NonNull<()>) -> *mut () {
    let Some(stack) = start.cast::<Stack<T>>().as_mut() else {
        return ptr::null_mut();
    };
    let index = *offset.cast::<u32>().as_ptr();
    ptr::from_mut(stack.element_at(index)).cast()
}

impl<T: Element> Stack<T> {
    /// A reference to element `index` of the array at `stack`.
    ///
    /// Nothing happens until the reference is resolved; each resolve reads
    /// the index stored inline and grows the array as needed. The array must
    /// stay at that address, and outlive the reference, for resolution to be
    /// valid.
    pub fn reference_to<'a>(stack: *mut Stack<T>, index: u32) -> Reference<'a> {
        Reference::new(element_resolver::<T>, Slot::pointer(stack), Slot::value(index))
    }

    /// A reference to element `index` of whatever array `stack_ref` resolves
    /// to; the new reference owns `stack_ref`.
    pub fn reference_through(stack_ref: Reference<'_>, index: u32) -> Reference<'_> {
        Reference::new(
            element_resolver::<T>,
            Slot::OwnedRefer(Box::new(stack_ref)),
            Slot::value(index),
        )
    }

    /// A reference to element `index` of whatever array `stack_ref` resolves
    /// to, borrowing `stack_ref`.
    pub fn reference_through_borrowed<'a>(stack_ref: &'a Reference<'a>, index: u32) -> Reference<'a> {
        Reference::new(element_resolver::<T>, Slot::Refer(stack_ref), Slot::value(index))
    }

    /// Resolve `reference` as a pointer to a `T`.
    ///
    /// # Safety
    ///
    /// The requirements of [`Reference::resolve`] apply, the reference must
    /// denote a `T`, and the returned borrow must end before the array is
    /// touched again.
    pub unsafe fn resolve_element<'r>(reference: &Reference<'_>) -> Option<&'r mut T> {
        reference.resolve().map(|ptr| &mut *ptr.cast::<T>().as_ptr())
    }
}
