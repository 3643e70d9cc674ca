use crate::Float;

/// An extension trait for floating point numbers.
///
/// For now, this trait exists solely to pre-compute the rounding factor for
/// equality comparisons, which depends on the floating point representation.
pub(crate) trait FloatExt {
    /// The factor determining rounding precision.
    ///
    /// When limiting a floating point number's precision, the number is
    /// multiplied by some factor, rounded, and divided by the same factor
    /// again. Typically, that factor is a power of ten, which directly
    /// translates into significant digits after the decimal.
    const ROUNDING_FACTOR: Self;
}

impl FloatExt for f64 {
    const ROUNDING_FACTOR: f64 = 1e9;
}

impl FloatExt for f32 {
    const ROUNDING_FACTOR: f32 = 1e4;
}

// ----------------------------------------------------------------------------------------------------------

/// A floating point accumulator.
///
/// Unlike plain summation with the `+` operator, this struct minimizes the
/// cumulative error by using [Kahan's algorithm with Neumaier's
/// improvements](https://en.wikipedia.org/wiki/Kahan_summation_algorithm).
/// Numerical integration adds many small trapezoids to a growing total, which
/// is exactly the case where naive summation loses precision.
#[derive(Debug, Default)]
pub(crate) struct Sum {
    sum: Float,
    compensation: Float,
}

impl Sum {
    /// Create a new, empty sum.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the compensated total.
    #[inline]
    pub fn value(&self) -> Float {
        self.sum + self.compensation
    }
}

impl core::ops::AddAssign<Float> for Sum {
    fn add_assign(&mut self, rhs: Float) {
        let t = self.sum + rhs;
        if rhs.abs() < self.sum.abs() {
            self.compensation += (self.sum - t) + rhs;
        } else {
            self.compensation += (rhs - t) + self.sum;
        }
        self.sum = t;
    }
}

// ----------------------------------------------------------------------------------------------------------

/// Linearly interpolate between two values.
#[inline]
pub(crate) fn lerp(t: Float, v0: Float, v1: Float) -> Float {
    v0 + t * (v1 - v0)
}

/// Look up a value in a regularly spaced table.
///
/// The table's first entry is for wavelength `start` and subsequent entries
/// are `step` apart. Wavelengths between entries are linearly interpolated.
/// Wavelengths outside the table's range, including not-a-number, evaluate to
/// zero.
pub(crate) fn interpolate_regular(data: &[Float], start: Float, step: Float, wavelength: Float) -> Float {
    let Some(last) = data.len().checked_sub(1) else {
        return 0.0;
    };

    let end = start + last as Float * step;
    if !(start <= wavelength && wavelength <= end) {
        return 0.0;
    }

    let position = (wavelength - start) / step;
    let index = position.floor() as usize;
    if last <= index {
        return data[last];
    }

    lerp(position - index as Float, data[index], data[index + 1])
}
