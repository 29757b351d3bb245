//! Lazily resolved, optionally owning references
//!
//! A [`Reference`] pairs two tagged slots, `start` and `offset`, with a
//! [`Resolver`] that turns their resolved locations into a final address.
//! Either slot may hold another reference, borrowed or owned, so
//! references chain to any depth. Owned links are released exactly once,
//! when their owner is descoped or dropped.
//!
//! # Example
//!
//! ```
//! use tagref::Reference;
//!
//! let boxed = Reference::owned(7u64).unwrap();
//! let outer = Reference::borrowing(&boxed);
//!
//! let value = unsafe { outer.resolve() }.unwrap();
//! assert_eq!(unsafe { *value.cast::<u64>().as_ptr() }, 7);
//!
//! assert!(unsafe { Reference::null().resolve() }.is_none());
//! ```

mod owned;
mod slot;

pub use owned::{drop_in_place_erased, Destructor, OwnedCell};
pub use slot::{decode_start_tag, Offset, OffsetTag, Slot, Tag};

use std::fmt;
use std::mem;
use std::ptr::NonNull;

use crate::error::ReferError;

/// Computes the address a reference denotes from its resolved halves.
///
/// `offset` is never null; `start` may be. Returning null means the
/// reference does not resolve.
///
/// A [`Slot::Value`] half arrives as the address of the reference's own
/// [`Word`](crate::Word), which is only borrowed shared during resolution.
/// Resolvers may read through such a pointer but must never write through
/// it.
pub type Resolver = unsafe fn(start: *mut (), offset: NonNull<()>) -> *mut ();

/// Resolver that ignores `start` and returns `offset`.
///
/// # Safety
///
/// Performs no dereference; it is `unsafe` only to match [`Resolver`].
pub unsafe fn return_offset(_start: *mut (), offset: NonNull<()>) -> *mut () {
    offset.as_ptr()
}

/// A resolvable handle encoding `(resolver, start, offset)`.
///
/// The record's own storage belongs to whoever holds it (a local, a field,
/// or a parent's owned slot); descoping only releases what the reference
/// owns.
pub struct Reference<'a> {
    resolver: Resolver,
    start: Slot<'a>,
    offset: Offset<'a>,
}

impl<'a> Reference<'a> {
    /// The canonical null reference; it never resolves.
    pub fn null() -> Self {
        Self {
            resolver: return_offset,
            start: Slot::null(),
            offset: Offset::null(),
        }
    }

    /// Assemble a reference from its parts.
    pub fn new(resolver: Resolver, start: Slot<'a>, offset: impl Into<Offset<'a>>) -> Self {
        Self {
            resolver,
            start,
            offset: offset.into(),
        }
    }

    /// Box `value` on the heap behind a reference that owns it.
    ///
    /// `destructor` runs exactly once, when the reference is descoped,
    /// before the cell's storage is freed.
    ///
    /// # Safety
    ///
    /// `destructor` must accept a pointer to a live `T` (see [`Destructor`]).
    pub unsafe fn owned_with<T: 'a>(value: T, destructor: Destructor) -> Result<Self, ReferError> {
        let cell = OwnedCell::new(value, destructor)?;
        Ok(Self::new(return_offset, Slot::null(), cell))
    }

    /// Box `value` on the heap, dropping it normally on descope.
    pub fn owned<T: 'a>(value: T) -> Result<Self, ReferError> {
        // SAFETY: `drop_in_place_erased::<T>` matches the stored type.
        unsafe { Self::owned_with(value, drop_in_place_erased::<T>) }
    }

    /// A reference that resolves wherever `target` resolves, without owning it.
    pub fn borrowing(target: &'a Reference<'a>) -> Self {
        Self::new(return_offset, Slot::null(), Slot::Refer(target))
    }

    /// A reference that resolves wherever `target` resolves and owns it.
    pub fn owning(target: Reference<'a>) -> Self {
        Self::new(return_offset, Slot::null(), Slot::OwnedRefer(Box::new(target)))
    }

    /// Whether this is the canonical null reference.
    pub fn is_null(&self) -> bool {
        self.start.is_null() && self.offset.is_null()
    }

    /// The resolver function.
    pub fn resolver(&self) -> Resolver {
        self.resolver
    }

    /// The start slot.
    pub fn start(&self) -> &Slot<'a> {
        &self.start
    }

    /// The offset slot.
    pub fn offset(&self) -> &Offset<'a> {
        &self.offset
    }

    /// Tag of the start slot.
    pub fn start_tag(&self) -> Tag {
        self.start.tag()
    }

    /// Tag of the offset slot, or [`OffsetTag::Destructor`] for an owned cell.
    pub fn offset_tag(&self) -> OffsetTag {
        self.offset.tag()
    }

    /// Resolve to the address this reference denotes.
    ///
    /// The offset resolves first; if it comes back null the whole reference
    /// is null and neither the start nor the resolver is touched. Resolving
    /// repeatedly without intervening mutation yields the same address.
    ///
    /// # Safety
    ///
    /// Every raw pointer reachable through the chain must be valid for the
    /// resolver that receives it, and nothing else may hold a conflicting
    /// borrow of the data a resolver touches.
    pub unsafe fn resolve(&self) -> Option<NonNull<()>> {
        let offset = self.offset.resolve()?;
        let start = self.start.resolve();
        NonNull::new((self.resolver)(start, offset))
    }

    /// Release everything this reference owns and reset it to null.
    ///
    /// The offset is released before the start. Owned nested references are
    /// descoped recursively before their boxes are freed. Calling this more
    /// than once is harmless; the second call finds nothing to release.
    pub fn descope(&mut self) {
        let offset = mem::take(&mut self.offset);
        release_offset(offset);
        let start = mem::take(&mut self.start);
        release_slot(start);
        self.resolver = return_offset;
    }

    /// Take the contents out, leaving a null reference behind.
    pub fn take(&mut self) -> Reference<'a> {
        mem::take(self)
    }
}

fn release_offset(offset: Offset<'_>) {
    match offset {
        Offset::Tagged(slot) => release_slot(slot),
        Offset::Owned(cell) => drop(cell),
    }
}

fn release_slot(slot: Slot<'_>) {
    if let Slot::OwnedRefer(mut nested) = slot {
        tracing::debug!(tag = %nested.start_tag(), "releasing owned nested reference");
        nested.descope();
    }
}

impl Default for Reference<'_> {
    fn default() -> Self {
        Self::null()
    }
}

impl Drop for Reference<'_> {
    fn drop(&mut self) {
        self.descope();
    }
}

impl fmt::Debug for Reference<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return write!(f, "Reference(null)");
        }
        f.debug_struct("Reference")
            .field("resolver", &(self.resolver as *const ()))
            .field("start", &self.start)
            .field("offset", &self.offset)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word::Word;
    use pretty_assertions::assert_eq;

    unsafe fn add_start_to_offset(start: *mut (), offset: NonNull<()>) -> *mut () {
        let base = start.cast::<u64>();
        base.add(*offset.cast::<u32>().as_ptr() as usize).cast()
    }

    #[test]
    fn test_null_reference() {
        let null = Reference::null();
        assert!(null.is_null());
        assert_eq!(null.start_tag(), Tag::Pointer);
        assert_eq!(null.offset_tag(), OffsetTag::Tag(Tag::Pointer));
        assert!(unsafe { null.resolve() }.is_none());
        assert!(Reference::default().is_null());
    }

    #[test]
    fn test_custom_resolver() {
        let mut data = [10u64, 20, 30];
        let reference = Reference::new(
            add_start_to_offset,
            Slot::pointer(data.as_mut_ptr()),
            Slot::value(2u32),
        );
        let ptr = unsafe { reference.resolve() }.unwrap();
        assert_eq!(unsafe { *ptr.cast::<u64>().as_ptr() }, 30);
    }

    #[test]
    fn test_null_offset_short_circuits() {
        unsafe fn unreachable_resolver(_: *mut (), _: NonNull<()>) -> *mut () {
            panic!("resolver must not run for a null offset");
        }
        let reference = Reference::new(unreachable_resolver, Slot::value(1u32), Slot::null());
        assert!(unsafe { reference.resolve() }.is_none());
    }

    #[test]
    fn test_null_propagates_through_chain() {
        let null = Reference::null();
        let middle = Reference::borrowing(&null);
        let outer = Reference::owning(Reference::borrowing(&middle));
        assert!(unsafe { outer.resolve() }.is_none());
    }

    #[test]
    fn test_owned_value_resolves() {
        let reference = Reference::owned(String::from("boxed")).unwrap();
        assert_eq!(reference.offset_tag(), OffsetTag::Destructor);
        let ptr = unsafe { reference.resolve() }.unwrap();
        assert_eq!(unsafe { &*ptr.cast::<String>().as_ptr() }, "boxed");
    }

    #[test]
    fn test_descope_resets_to_null() {
        let mut reference = Reference::owning(Reference::owned(5u32).unwrap());
        assert_eq!(reference.offset_tag(), OffsetTag::Tag(Tag::OwnedRefer));
        reference.descope();
        assert!(reference.is_null());
        reference.descope();
        assert!(reference.is_null());
    }

    #[test]
    fn test_take_leaves_null() {
        let mut reference = Reference::owned(1u8).unwrap();
        let taken = reference.take();
        assert!(reference.is_null());
        assert!(!taken.is_null());
    }

    #[test]
    fn test_debug_rendering() {
        assert_eq!(format!("{:?}", Reference::null()), "Reference(null)");
        let reference = Reference::new(return_offset, Slot::null(), Slot::Value(Word::from_u32(3)));
        let rendered = format!("{:?}", reference);
        assert!(rendered.contains("Value(Word(0x0000000000000003))"));
    }
}
