//! Error types for reference resolution and growable arrays
//!
//! Failures come in two tiers. Recoverable ones (allocation, capacity
//! overflow) are returned as values. Invariant violations (reserved tags,
//! popping an empty array, the reserved index) are fatal: the panicking
//! entry points route them through [`fatal`], while their `try_*`
//! counterparts hand back the same error so callers can inspect it.

use thiserror::Error;

/// Errors raised while building or decoding references.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferError {
    /// One of the four reserved tag encodings (4 through 7)
    #[error("invalid tagged reference: {tag}")]
    ReservedTag {
        /// The raw tag bits
        tag: u8,
    },

    /// A tag outside the three-bit tag space
    #[error("unknown reference tag: {tag}")]
    UnknownTag {
        /// The raw tag bits
        tag: u8,
    },

    /// The heap cell for an owned value could not be allocated
    #[error("failed to allocate {size} bytes for an owned reference")]
    AllocationFailed {
        /// Requested size in bytes
        size: usize,
    },
}

/// Errors raised by [`Stack`](crate::Stack) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StackError {
    /// Pop on an array with no elements
    #[error("no elements in stack")]
    EmptyPop,

    /// Element access with the reserved sentinel index
    #[error("invalid offset: {}", u32::MAX)]
    ReservedIndex,

    /// Growth would exceed the representable or configured capacity
    #[error("cannot grow stack beyond capacity {capacity}")]
    CapacityOverflow {
        /// Capacity at the time growth was attempted
        capacity: u32,
    },

    /// The allocator refused the requested buffer
    #[error("failed to allocate stack buffer of capacity {capacity}")]
    AllocationFailed {
        /// Capacity that was requested
        capacity: u32,
    },
}

/// Main error type for tagref operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Reference construction or decoding failed
    #[error(transparent)]
    Refer(#[from] ReferError),

    /// Growable array operation failed
    #[error(transparent)]
    Stack(#[from] StackError),
}

/// Result type alias for tagref operations
pub type Result<T> = std::result::Result<T, Error>;

/// Report an invariant violation and abort the current operation.
///
/// Used for errors that signal a programming defect rather than a data
/// condition; the message is the error's display text.
#[cold]
#[track_caller]
pub fn fatal(err: impl Into<Error>) -> ! {
    let err = err.into();
    tracing::error!(error = %err, "fatal invariant violation");
    panic!("{err}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_tag_message() {
        let err = ReferError::ReservedTag { tag: 5 };
        assert_eq!(err.to_string(), "invalid tagged reference: 5");
    }

    #[test]
    fn test_reserved_index_message() {
        assert_eq!(
            StackError::ReservedIndex.to_string(),
            format!("invalid offset: {}", u32::MAX)
        );
    }

    #[test]
    fn test_error_from_conversions() {
        let err: Error = StackError::EmptyPop.into();
        assert_eq!(err, Error::Stack(StackError::EmptyPop));
        assert_eq!(err.to_string(), "no elements in stack");

        let err: Error = ReferError::UnknownTag { tag: 9 }.into();
        assert!(matches!(err, Error::Refer(ReferError::UnknownTag { tag: 9 })));
    }

    #[test]
    #[should_panic(expected = "no elements in stack")]
    fn test_fatal_panics_with_message() {
        fatal(StackError::EmptyPop);
    }
}
