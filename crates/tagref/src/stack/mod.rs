//! Growable arrays with value semantics and auto-growing element access
//!
//! A [`Stack`] owns a contiguous buffer of elements. Elements `[0, len)` are
//! live; the rest of the capacity is raw storage. Reading an index past the
//! end grows the array to cover it, filling the gap with default elements,
//! which is what lets a [`Reference`](crate::Reference) target "element N"
//! before element N exists.

mod buffer;
mod refer;

pub use refer::element_resolver;

use std::fmt;
use std::io;

use buffer::RawBuffer;

use crate::config::StackConfig;
use crate::element::{Element, Printed};
use crate::error::{fatal, StackError};

/// A resizable sequence of `T`.
///
/// # Example
///
/// ```
/// use tagref::Stack;
///
/// let mut stack = Stack::<u32>::new();
/// stack.push(7).unwrap();
/// *stack.element_at(3) = 9;
///
/// assert_eq!(stack.len(), 4);
/// assert_eq!(stack.as_slice(), &[7, 0, 0, 9]);
/// assert_eq!(stack.to_string(), "[7, 0, 0, 9, ]");
/// ```
pub struct Stack<T: Element> {
    buffer: RawBuffer<T>,
    count: u32,
    config: StackConfig,
}

impl<T: Element> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Element> Stack<T> {
    /// Create an empty array with the default growth policy.
    pub fn new() -> Self {
        Self::with_config(StackConfig::default())
    }

    /// Create an empty array with a custom growth policy.
    pub fn with_config(config: StackConfig) -> Self {
        Self {
            buffer: RawBuffer::new(),
            count: 0,
            config,
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Inspection
    // ═══════════════════════════════════════════════════════════════════

    /// Number of live elements.
    pub fn len(&self) -> u32 {
        self.count
    }

    /// Whether there are no live elements.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of elements the buffer can hold without reallocating.
    pub fn capacity(&self) -> u32 {
        self.buffer.capacity()
    }

    /// The growth policy.
    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    /// The live elements.
    pub fn as_slice(&self) -> &[T] {
        if self.count == 0 {
            return &[];
        }
        // SAFETY: `[0, count)` are initialized and the buffer is non-null.
        unsafe { std::slice::from_raw_parts(self.buffer.as_ptr(), self.count as usize) }
    }

    /// The live elements, mutably.
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        if self.count == 0 {
            return &mut [];
        }
        // SAFETY: as in `as_slice`, and `&mut self` guarantees exclusivity.
        unsafe { std::slice::from_raw_parts_mut(self.buffer.as_ptr(), self.count as usize) }
    }

    /// Element at `index`, if it is live. Never grows the array.
    pub fn get(&self, index: u32) -> Option<&T> {
        self.as_slice().get(index as usize)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Capacity and Growth
    // ═══════════════════════════════════════════════════════════════════

    /// Reallocate to exactly `capacity` elements.
    ///
    /// Elements past the new capacity are popped and descoped one at a
    /// time, last first. A capacity of zero frees the buffer. On allocation
    /// failure the array keeps its previous buffer (and any elements already
    /// descoped stay gone).
    pub fn set_capacity(&mut self, capacity: u32) -> Result<(), StackError> {
        while self.count > capacity {
            self.pop().descope();
        }
        self.buffer.set_capacity(capacity)
    }

    fn grow_if_full(&mut self) -> Result<(), StackError> {
        let capacity = self.capacity();
        if self.count < capacity {
            return Ok(());
        }
        let desired = self
            .config
            .next_capacity(capacity)
            .ok_or(StackError::CapacityOverflow { capacity })?;
        self.set_capacity(desired)
    }

    /// Append a default-initialized element.
    ///
    /// A full array first grows (doubling, starting from the configured
    /// initial capacity). If growth fails the count is unchanged.
    pub fn append_default(&mut self) -> Result<(), StackError> {
        self.grow_if_full()?;
        self.write_next(T::enscope());
        Ok(())
    }

    /// Append `value`, growing like [`append_default`](Self::append_default).
    ///
    /// On failure `value` is descoped and the count is unchanged.
    pub fn push(&mut self, value: T) -> Result<(), StackError> {
        if let Err(err) = self.grow_if_full() {
            value.descope();
            return Err(err);
        }
        self.write_next(value);
        Ok(())
    }

    fn write_next(&mut self, value: T) {
        debug_assert!(self.count < self.capacity());
        // SAFETY: `count < capacity`, so the slot is in bounds and unused.
        unsafe { self.buffer.as_ptr().add(self.count as usize).write(value) };
        self.count += 1;
    }

    // ═══════════════════════════════════════════════════════════════════
    // Removal
    // ═══════════════════════════════════════════════════════════════════

    /// Remove and return the last element.
    pub fn try_pop(&mut self) -> Result<T, StackError> {
        if self.count == 0 {
            return Err(StackError::EmptyPop);
        }
        self.count -= 1;
        // SAFETY: the slot at the old `count - 1` was live and is now
        // outside `[0, count)`, so it will not be read again.
        Ok(unsafe { self.buffer.as_ptr().add(self.count as usize).read() })
    }

    /// Remove and return the last element; popping an empty array is fatal.
    #[track_caller]
    pub fn pop(&mut self) -> T {
        self.try_pop().unwrap_or_else(|err| fatal(err))
    }

    /// Descope every element, last first, keeping the buffer.
    pub fn clear(&mut self) {
        while let Ok(element) = self.try_pop() {
            element.descope();
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Auto-growing Access
    // ═══════════════════════════════════════════════════════════════════

    /// Element at `index`, appending default elements until it exists.
    ///
    /// `u32::MAX` is reserved and never a valid index.
    pub fn try_element_at(&mut self, index: u32) -> Result<&mut T, StackError> {
        if index == u32::MAX {
            return Err(StackError::ReservedIndex);
        }
        if index >= self.count {
            tracing::trace!(index, count = self.count, "growing stack to reach index");
        }
        while index >= self.count {
            self.append_default()?;
        }
        // SAFETY: `index < count`, so the element is live.
        Ok(unsafe { &mut *self.buffer.as_ptr().add(index as usize) })
    }

    /// Element at `index`, auto-growing; the reserved index or a failed
    /// growth is fatal.
    #[track_caller]
    pub fn element_at(&mut self, index: u32) -> &mut T {
        match self.try_element_at(index) {
            Ok(element) => element,
            Err(err) => fatal(err),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Value Semantics
    // ═══════════════════════════════════════════════════════════════════

    /// Same length and pointwise equal under the element's equality.
    pub fn equal(&self, other: &Self) -> bool {
        self.count == other.count
            && self
                .as_slice()
                .iter()
                .zip(other.as_slice())
                .all(|(a, b)| a.equal(b))
    }

    /// Write the bracketed element list to `out`.
    pub fn print<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{}", self)
    }
}

impl<T: Element> Drop for Stack<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: Element> Element for Stack<T> {
    fn enscope() -> Self {
        Self::new()
    }

    fn equal(&self, other: &Self) -> bool {
        Stack::equal(self, other)
    }

    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for element in self.as_slice() {
            write!(f, "{}, ", Printed(element))?;
        }
        write!(f, "]")
    }
}

impl<T: Element> fmt::Display for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Element::print(self, f)
    }
}

impl<T: Element> fmt::Debug for Stack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stack(count: {}, capacity: {}) {}",
            self.count,
            self.capacity(),
            self
        )
    }
}

impl<T: Element> PartialEq for Stack<T> {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}
