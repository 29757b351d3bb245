//! Element implementations for primitive scalars

use std::fmt;

use super::Element;

/// Relative tolerance for single-precision equality
pub const F32_EPSILON: f32 = 1e-5;

/// Relative tolerance for double-precision equality
pub const F64_EPSILON: f64 = 1e-7;

macro_rules! approx_equal {
    ($name:ident, $ty:ty, $epsilon:expr) => {
        #[doc = concat!("NaN-aware approximate equality for `", stringify!($ty), "`.")]
        ///
        /// Two NaNs are equal to each other. Otherwise the difference relative
        /// to the smaller magnitude must be below the epsilon; when either
        /// operand is zero, equality must be exact.
        pub fn $name(a: $ty, b: $ty) -> bool {
            if a.is_nan() && b.is_nan() {
                return true;
            }
            let abs_delta = (a - b).abs();
            let abs_min = a.abs().min(b.abs());
            if abs_min > 0.0 {
                return abs_delta / abs_min < $epsilon;
            }
            a == b
        }
    };
}

approx_equal!(approx_equal_f32, f32, F32_EPSILON);
approx_equal!(approx_equal_f64, f64, F64_EPSILON);

macro_rules! exact_element {
    ($($ty:ty),*) => {
        $(
            impl Element for $ty {
                fn enscope() -> Self {
                    0
                }

                fn equal(&self, other: &Self) -> bool {
                    self == other
                }

                fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self)
                }
            }
        )*
    };
}

exact_element!(u8, u16, u32, u64);

macro_rules! float_element {
    ($($ty:ty => $equal:ident),*) => {
        $(
            impl Element for $ty {
                fn enscope() -> Self {
                    0.0
                }

                fn equal(&self, other: &Self) -> bool {
                    $equal(*self, *other)
                }

                fn print(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self)
                }
            }
        )*
    };
}

float_element!(f32 => approx_equal_f32, f64 => approx_equal_f64);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Printed;

    #[test]
    fn test_nan_equals_nan() {
        assert!(approx_equal_f32(f32::NAN, f32::NAN));
        assert!(approx_equal_f64(f64::NAN, f64::NAN));
        assert!(!approx_equal_f64(f64::NAN, 1.0));
        assert!(!approx_equal_f64(1.0, f64::NAN));
    }

    #[test]
    fn test_relative_tolerance() {
        assert!(approx_equal_f32(1.0, 1.000_001));
        assert!(!approx_equal_f32(1.0, 1.001));
        assert!(approx_equal_f64(1000.0, 1000.000_01));
        assert!(!approx_equal_f64(1.0, 1.000_01));
    }

    #[test]
    fn test_zero_requires_exact() {
        assert!(approx_equal_f64(0.0, 0.0));
        assert!(approx_equal_f64(0.0, -0.0));
        assert!(!approx_equal_f64(0.0, 1e-300));
        assert!(!approx_equal_f32(0.0, f32::MIN_POSITIVE));
    }

    #[test]
    fn test_integer_elements() {
        assert_eq!(u8::enscope(), 0);
        assert_eq!(u64::enscope(), 0);
        assert!(7u32.equal(&7));
        assert!(!7u16.equal(&8));
        assert_eq!(Printed(&42u32).to_string(), "42");
    }

    #[test]
    fn test_float_elements() {
        assert_eq!(f64::enscope(), 0.0);
        assert!(1.234f64.equal(&1.234));
        assert!(3.456f32.equal(&3.456));
        assert_eq!(Printed(&2.5f64).to_string(), "2.5");
    }
}
