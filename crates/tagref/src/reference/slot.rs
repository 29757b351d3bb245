//! Tagged slots: the `start` and `offset` halves of a reference

use std::fmt;
use std::ptr::NonNull;

use super::owned::OwnedCell;
use super::Reference;
use crate::error::{fatal, ReferError};
use crate::word::Word;

/// How a slot's payload is interpreted.
///
/// The numeric encoding occupies three bits; 4 through 7 are reserved and
/// never produced by any constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    /// The payload is a raw address, passed to resolvers as-is
    Pointer = 0,
    /// The payload is the value itself; resolvers receive its address
    Value = 1,
    /// The payload is a borrowed reference, resolved recursively
    Refer = 2,
    /// The payload is an owned reference, resolved recursively and freed with its owner
    OwnedRefer = 3,
}

impl Tag {
    /// Mask covering the three tag bits.
    pub const MASK: u8 = 0b111;

    /// Numeric encoding of this tag.
    pub fn bits(self) -> u8 {
        self as u8
    }

    /// Whether the encoding falls in the reserved range.
    pub fn is_reserved(bits: u8) -> bool {
        (4..=Self::MASK).contains(&bits)
    }
}

impl TryFrom<u8> for Tag {
    type Error = ReferError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(Tag::Pointer),
            1 => Ok(Tag::Value),
            2 => Ok(Tag::Refer),
            3 => Ok(Tag::OwnedRefer),
            4..=7 => Err(ReferError::ReservedTag { tag }),
            _ => Err(ReferError::UnknownTag { tag }),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tag::Pointer => "pointer",
            Tag::Value => "value",
            Tag::Refer => "refer",
            Tag::OwnedRefer => "owned-refer",
        };
        write!(f, "{}", name)
    }
}

/// Decode raw start-tag bits, aborting on anything but the four valid tags.
///
/// Slots carry their tag in the enum discriminant, so nothing inside this
/// crate decodes raw bits. This is the entry point for callers that hold a
/// tag number from an external encoding (for example one produced by
/// [`Tag::bits`]) and want the same fatal handling of reserved values.
/// [`Tag::try_from`] is the recoverable counterpart.
#[track_caller]
pub fn decode_start_tag(bits: u8) -> Tag {
    Tag::try_from(bits).unwrap_or_else(|err| fatal(err))
}

/// Tag reported for an offset slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OffsetTag {
    /// One of the four ordinary tags
    Tag(Tag),
    /// An owned heap allocation with its destructor
    Destructor,
}

/// One half of a reference: a payload plus how to interpret it.
pub enum Slot<'a> {
    /// A raw address (not owned)
    Pointer(*mut ()),
    /// An inline value
    Value(Word),
    /// A borrowed nested reference; it must outlive this slot
    Refer(&'a Reference<'a>),
    /// An owned nested reference, released with this slot
    OwnedRefer(Box<Reference<'a>>),
}

impl<'a> Slot<'a> {
    /// The null pointer slot.
    pub fn null() -> Self {
        Slot::Pointer(std::ptr::null_mut())
    }

    /// A raw address slot.
    pub fn pointer<T>(ptr: *mut T) -> Self {
        Slot::Pointer(ptr.cast())
    }

    /// An inline value slot.
    pub fn value(word: impl Into<Word>) -> Self {
        Slot::Value(word.into())
    }

    /// The tag describing this slot.
    pub fn tag(&self) -> Tag {
        match self {
            Slot::Pointer(_) => Tag::Pointer,
            Slot::Value(_) => Tag::Value,
            Slot::Refer(_) => Tag::Refer,
            Slot::OwnedRefer(_) => Tag::OwnedRefer,
        }
    }

    /// Whether this is a null pointer slot.
    pub fn is_null(&self) -> bool {
        matches!(self, Slot::Pointer(ptr) if ptr.is_null())
    }

    /// Location this slot denotes.
    ///
    /// # Safety
    ///
    /// Nested references are resolved, so the requirements of
    /// [`Reference::resolve`] apply to them.
    pub(crate) unsafe fn resolve(&self) -> *mut () {
        match self {
            // Handed over as-is so resolvers never dereference twice.
            Slot::Pointer(ptr) => *ptr,
            Slot::Value(word) => std::ptr::from_ref(word).cast_mut().cast(),
            Slot::Refer(nested) => nested.resolve().map_or(std::ptr::null_mut(), NonNull::as_ptr),
            Slot::OwnedRefer(nested) => {
                nested.resolve().map_or(std::ptr::null_mut(), NonNull::as_ptr)
            }
        }
    }
}

impl Default for Slot<'_> {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Debug for Slot<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Pointer(ptr) => write!(f, "Pointer({:p})", *ptr),
            Slot::Value(word) => write!(f, "Value({:?})", word),
            Slot::Refer(nested) => write!(f, "Refer({:?})", nested),
            Slot::OwnedRefer(nested) => write!(f, "OwnedRefer({:?})", nested),
        }
    }
}

/// The offset half of a reference, which may also own a heap cell.
pub enum Offset<'a> {
    /// An ordinary tagged slot
    Tagged(Slot<'a>),
    /// An owned heap allocation, destroyed with its destructor on descope
    Owned(OwnedCell),
}

impl<'a> Offset<'a> {
    /// The null pointer offset.
    pub fn null() -> Self {
        Offset::Tagged(Slot::null())
    }

    /// The tag describing this offset.
    pub fn tag(&self) -> OffsetTag {
        match self {
            Offset::Tagged(slot) => OffsetTag::Tag(slot.tag()),
            Offset::Owned(_) => OffsetTag::Destructor,
        }
    }

    /// Whether this is a null pointer offset.
    pub fn is_null(&self) -> bool {
        matches!(self, Offset::Tagged(slot) if slot.is_null())
    }

    /// Location this offset denotes, or `None` when it resolves to null.
    ///
    /// # Safety
    ///
    /// See [`Slot::resolve`].
    pub(crate) unsafe fn resolve(&self) -> Option<NonNull<()>> {
        match self {
            Offset::Tagged(slot) => NonNull::new(slot.resolve()),
            // A fully formed heap object; not tagged any further.
            Offset::Owned(cell) => Some(cell.as_non_null()),
        }
    }
}

impl<'a> From<Slot<'a>> for Offset<'a> {
    fn from(slot: Slot<'a>) -> Self {
        Offset::Tagged(slot)
    }
}

impl From<OwnedCell> for Offset<'_> {
    fn from(cell: OwnedCell) -> Self {
        Offset::Owned(cell)
    }
}

impl Default for Offset<'_> {
    fn default() -> Self {
        Self::null()
    }
}

impl fmt::Debug for Offset<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Offset::Tagged(slot) => fmt::Debug::fmt(slot, f),
            Offset::Owned(cell) => write!(f, "Owned({:?})", cell),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_round_trip() {
        for tag in [Tag::Pointer, Tag::Value, Tag::Refer, Tag::OwnedRefer] {
            assert_eq!(Tag::try_from(tag.bits()), Ok(tag));
        }
    }

    #[test]
    fn test_reserved_tags_rejected() {
        for bits in 4..=7u8 {
            assert!(Tag::is_reserved(bits));
            assert_eq!(Tag::try_from(bits), Err(ReferError::ReservedTag { tag: bits }));
        }
        assert!(!Tag::is_reserved(3));
        assert_eq!(Tag::try_from(8), Err(ReferError::UnknownTag { tag: 8 }));
    }

    #[test]
    fn test_decode_valid_start_tag() {
        assert_eq!(decode_start_tag(2), Tag::Refer);
    }

    #[test]
    #[should_panic(expected = "invalid tagged reference: 6")]
    fn test_decode_reserved_start_tag_is_fatal() {
        decode_start_tag(6);
    }

    #[test]
    fn test_slot_tags() {
        assert_eq!(Slot::null().tag(), Tag::Pointer);
        assert!(Slot::null().is_null());
        assert_eq!(Slot::value(3u32).tag(), Tag::Value);
        assert!(!Slot::value(0u32).is_null());
        assert_eq!(Offset::null().tag(), OffsetTag::Tag(Tag::Pointer));
    }

    #[test]
    fn test_value_slot_resolves_to_its_word() {
        let slot = Slot::value(42u32);
        let ptr = unsafe { slot.resolve() };
        assert_eq!(unsafe { *(ptr as *const u32) }, 42);
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(Tag::OwnedRefer.to_string(), "owned-refer");
    }
}
