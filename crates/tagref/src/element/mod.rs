//! The capability contract for values stored in growable arrays

mod scalar;

pub use scalar::{approx_equal_f32, approx_equal_f64, F32_EPSILON, F64_EPSILON};

use std::fmt;

/// Lifecycle, comparison, and rendering for array elements.
///
/// - `enscope` produces the default value used to fill newly grown slots
/// - `descope` releases whatever the value owns
/// - `equal` is the element's notion of equality (approximate for floats)
/// - `print` renders a human-readable form
pub trait Element: Sized {
    /// Create a default-initialized value.
    fn enscope() -> Self;

    /// Release any resources this value owns.
    fn descope(self) {}

    /// Compare two values.
    fn equal(&self, other: &Self) -> bool;

    /// Render this value.
    fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

/// Adapter that renders an [`Element`] through `Display`.
pub struct Printed<'a, T: Element>(pub &'a T);

impl<T: Element> fmt::Display for Printed<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.print(f)
    }
}
