//! Utilities functions which do not linked to domain

#[doc(hidden)]
#[macro_export]
/// Implements `From` trait for newtype-like enum variants
macro_rules! enum_trivial_from_impl {
    ($from:ty => $to:ty:$constructor:ident) => {
        impl From<$from> for $to {
            fn from(val: $from) -> Self {
                Self::$constructor(val)
            }
        }
    };
}

const POW_10: [f64; 16] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15,
];

/// The maximum number of decimal digits which is meaningful for the `f64` degrees
pub(crate) const MAX_FRACTION_DIGITS: u32 = 15;

/// Round the value to the given number of decimal digits (half away from zero).
///
/// The non-finite values are returned as is.
pub(crate) fn round_fract(value: f64, digits: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }

    let digits = digits.min(MAX_FRACTION_DIGITS);
    let scale = POW_10[digits as usize];
    let scaled = value * scale;
    if !scaled.is_finite() {
        return value;
    }

    scaled.round() / scale
}
