//! # tagref
//!
//! Type-erased tagged references with single-owner resolution chains.
//!
//! A [`Reference`] denotes "whatever a resolver computes from a start and an
//! offset", where each half is a raw pointer, an inline [`Word`], or another
//! reference (borrowed or owned). Owned links form a chain of single-owner
//! cells that is released exactly once. [`Stack`] is a growable array whose
//! [`element_resolver`] lets a reference target an element that does not
//! exist yet: resolving it grows the array.
//!
//! ## Architecture
//!
//! - **Word**: eight-byte untagged value slot
//! - **Reference**: tagged slots, resolvers, owned heap cells
//! - **Element**: lifecycle, equality, and printing contract for array items
//! - **Stack**: growable array with auto-growing access and reference adapters
//!
//! ## Example
//!
//! ```
//! use tagref::Stack;
//!
//! let mut values = Stack::<f64>::new();
//! values.push(1.234).unwrap();
//!
//! let tenth = Stack::<f64>::reference_to(&mut values, 10);
//! assert_eq!(values.len(), 1);
//!
//! unsafe { *Stack::<f64>::resolve_element(&tenth).unwrap() = 10.20 };
//! drop(tenth);
//!
//! assert_eq!(values.len(), 11);
//! assert_eq!(values.as_slice()[10], 10.20);
//! ```
//!
//! Everything here is single-threaded: references hold raw pointers and are
//! neither `Send` nor `Sync`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod element;
pub mod error;
pub mod reference;
pub mod stack;
pub mod word;

// Re-export main types
pub use config::StackConfig;
pub use element::{approx_equal_f32, approx_equal_f64, Element, Printed};
pub use error::{fatal, Error, ReferError, Result, StackError};
pub use reference::{
    decode_start_tag, drop_in_place_erased, return_offset, Destructor, Offset, OffsetTag,
    OwnedCell, Reference, Resolver, Slot, Tag,
};
pub use stack::{element_resolver, Stack};
pub use word::Word;

/// tagref version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }
}
