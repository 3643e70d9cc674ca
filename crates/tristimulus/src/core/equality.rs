use crate::core::FloatExt;
use crate::{Bits, Float};

/// Test macro for asserting the equality of floating point numbers.
///
/// This macro relies on [`to_eq_bits`] to normalize the two floating point
/// numbers by zeroing out not-a-numbers, reducing resolution, and dropping the
/// sign of negative zeros and then compares the resulting bit strings.
///
/// # Panics
///
/// This macro panics if the normalized bit strings are not identical. Its
/// message places the numbers below each other at the beginning of subsequent
/// lines for easy comparability.
#[macro_export]
macro_rules! assert_close_enough {
    ($f1:expr, $f2:expr $(,)?) => {
        let (f1, f2) = ($f1, $f2);
        let bits1 = $crate::to_eq_bits(f1);
        let bits2 = $crate::to_eq_bits(f2);
        assert_eq!(bits1, bits2, "quantities differ:\n{:?}\n{:?}", f1, f2);
    };
}

/// Test macro for asserting that two tristimulus triples are the same.
///
/// Given two coordinate arrays, this macro normalizes each coordinate with
/// [`to_eq_bits`] before comparing the resulting bit strings.
#[cfg(test)]
macro_rules! assert_same_tristimulus {
    ($cs1:expr , $cs2:expr $(,)?) => {
        let (cs1, cs2) = ($cs1, $cs2);
        let bits1 = $crate::core::to_eq_coordinates(&cs1);
        let bits2 = $crate::core::to_eq_coordinates(&cs2);
        assert_eq!(
            bits1, bits2,
            "tristimulus values differ:\n{:?}\n{:?}",
            cs1, cs2
        );
    };
}

#[cfg(test)]
pub(crate) use assert_same_tristimulus;

// --------------------------------------------------------------------------------------------------------------------

/// Normalize tristimulus coordinates for equality testing and hashing.
#[must_use = "function returns new coordinates and does not mutate original value"]
pub(crate) fn to_eq_coordinates(coordinates: &[Float; 3]) -> [Bits; 3] {
    let [x, y, z] = *coordinates;
    [to_eq_bits(x), to_eq_bits(y), to_eq_bits(z)]
}

/// Helper function to normalize a floating point number before hashing or
/// equality testing.
///
/// This function zeros out not-a-number, reduces significant digits after the
/// decimal, and drops the sign of negative zero and returns the result as a bit
/// string. It is only public because the [`assert_close_enough`] test macro
/// uses it.
#[doc(hidden)]
#[inline]
pub fn to_eq_bits(f: Float) -> Bits {
    // Eliminate not-a-number.
    let mut f = if f.is_nan() { 0.0 } else { f };

    // Reduce precision.
    f = (<Float as FloatExt>::ROUNDING_FACTOR * f).round();

    // Too much negativity!
    if f == -0.0 {
        f = 0.0
    }

    f.to_bits()
}

/// Determine whether the two floats are close enough to be considered equal.
/// <i class=python-only>Python only!</i>
#[cfg(feature = "pyffi")]
#[pyo3::pyfunction]
pub fn close_enough(f1: Float, f2: Float) -> bool {
    to_eq_bits(f1) == to_eq_bits(f2)
}

#[cfg(test)]
mod test {
    use super::{to_eq_bits, to_eq_coordinates};
    use crate::Float;

    #[test]
    fn test_to_eq_bits() {
        assert_eq!(to_eq_bits(Float::NAN), to_eq_bits(0.0));
        assert_eq!(to_eq_bits(-0.0), to_eq_bits(0.0));
        assert_ne!(to_eq_bits(1.0), to_eq_bits(1.001));
        assert_close_enough!(0.1 + 0.2, 0.3);
    }

    #[test]
    fn test_to_eq_coordinates() {
        let one = to_eq_coordinates(&[0.1 + 0.2, 1.0, Float::NAN]);
        let two = to_eq_coordinates(&[0.3, 1.0, 0.0]);
        assert_eq!(one, two);
    }
}
