//! Eight-byte untagged value slots
//!
//! A [`Word`] holds one scalar or a raw address. Which interpretation is
//! meaningful is never recorded in the word itself; the slot that carries
//! it decides.

use std::fmt;

/// A fixed-size, externally discriminated value slot.
///
/// Every constructor zeroes all eight bytes before writing its field, so
/// reading any interpretation is defined (if not always meaningful).
#[derive(Clone, Copy)]
#[repr(C)]
pub union Word {
    f64: f64,
    f32: f32,
    u64: u64,
    u32: u32,
    u16: u16,
    u8: u8,
    ptr: usize,
}

// Compile-time size assertion
const _: () = assert!(std::mem::size_of::<Word>() == 8);

macro_rules! word_field {
    ($($field:ident: $ty:ty => $from:ident, $read:ident;)*) => {
        impl Word {
            $(
                #[doc = concat!("Create a word holding a `", stringify!($ty), "`.")]
                pub fn $from(value: $ty) -> Self {
                    let mut word = Word { u64: 0 };
                    word.$field = value;
                    word
                }

                #[doc = concat!("Read the word as a `", stringify!($ty), "`.")]
                pub fn $read(&self) -> $ty {
                    // SAFETY: all eight bytes are initialized by every
                    // constructor and every field is plain old data.
                    unsafe { self.$field }
                }
            )*
        }
    };
}

word_field! {
    f64: f64 => from_f64, as_f64;
    f32: f32 => from_f32, as_f32;
    u64: u64 => from_u64, as_u64;
    u32: u32 => from_u32, as_u32;
    u16: u16 => from_u16, as_u16;
    u8: u8 => from_u8, as_u8;
    ptr: usize => from_addr, as_addr;
}

impl Word {
    /// The all-zero word.
    pub const ZERO: Word = Word { u64: 0 };

    /// Create a word holding a raw address.
    pub fn from_ptr<T>(ptr: *mut T) -> Self {
        Self::from_addr(ptr as usize)
    }

    /// Read the word as a raw address.
    pub fn as_ptr<T>(&self) -> *mut T {
        self.as_addr() as *mut T
    }

    /// Raw bit pattern of the whole word.
    pub fn bits(&self) -> u64 {
        self.as_u64()
    }
}

impl Default for Word {
    fn default() -> Self {
        Self::ZERO
    }
}

impl PartialEq for Word {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for Word {}

impl fmt::Debug for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Word({:#018x})", self.bits())
    }
}

impl From<u32> for Word {
    fn from(value: u32) -> Self {
        Word::from_u32(value)
    }
}

impl From<u64> for Word {
    fn from(value: u64) -> Self {
        Word::from_u64(value)
    }
}

impl From<f64> for Word {
    fn from(value: f64) -> Self {
        Word::from_f64(value)
    }
}
