//! Real-valued functions of wavelength with finite support.
//!
//! [`FiniteSupportFunction`] is the common interface of light spectra and the
//! standard observer's matching functions. A function evaluates to zero
//! everywhere outside its closed support `[support_min, support_max]`, which
//! lets integration restrict itself to the intersection of two supports.
//! [`Support`] is the small value type for such intervals.

use crate::Float;

/// A closed interval of wavelengths in nanometers.
///
/// The interval is valid when both bounds are finite and `min <= max`. A
/// support with `min == max` is degenerate: It contains exactly one
/// wavelength and has zero width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Support {
    pub min: Float,
    pub max: Float,
}

impl Support {
    /// Create a new support.
    pub const fn new(min: Float, max: Float) -> Self {
        Self { min, max }
    }

    /// Determine whether both bounds are finite and ordered.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min <= self.max
    }

    /// Get this support's width.
    pub fn width(&self) -> Float {
        self.max - self.min
    }

    /// Determine whether this support has zero width.
    pub fn is_degenerate(&self) -> bool {
        self.min == self.max
    }

    /// Determine whether this support contains the wavelength.
    pub fn contains(&self, wavelength: Float) -> bool {
        self.min <= wavelength && wavelength <= self.max
    }

    /// Intersect this support with another.
    ///
    /// If the two supports do not overlap, this method returns none. If they
    /// touch in a single wavelength, the result is degenerate.
    pub fn intersect(&self, other: &Support) -> Option<Support> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        if min <= max {
            Some(Support { min, max })
        } else {
            None
        }
    }
}

impl std::fmt::Display for Support {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}nm, {}nm]", self.min, self.max)
    }
}

// --------------------------------------------------------------------------------------------------------------------

/// A real-valued function of wavelength that is zero outside a closed
/// interval.
///
/// Implementations must be pure: Evaluating the same wavelength twice yields
/// the same value. Evaluating outside the support yields `0.0` and never
/// fails, which includes not-a-number arguments.
pub trait FiniteSupportFunction {
    /// Get a descriptive label for this function.
    fn label(&self) -> String;

    /// Evaluate this function at the wavelength in nanometers.
    fn evaluate_at(&self, wavelength: Float) -> Float;

    /// Get the lower bound of this function's support.
    fn support_min(&self) -> Float;

    /// Get the upper bound of this function's support.
    fn support_max(&self) -> Float;

    /// Get the largest value this function attains on its support.
    fn max_value_on_support(&self) -> Float;

    /// Get this function's support.
    fn support(&self) -> Support {
        Support::new(self.support_min(), self.support_max())
    }
}

impl<F: FiniteSupportFunction + ?Sized> FiniteSupportFunction for &F {
    fn label(&self) -> String {
        (**self).label()
    }

    fn evaluate_at(&self, wavelength: Float) -> Float {
        (**self).evaluate_at(wavelength)
    }

    fn support_min(&self) -> Float {
        (**self).support_min()
    }

    fn support_max(&self) -> Float {
        (**self).support_max()
    }

    fn max_value_on_support(&self) -> Float {
        (**self).max_value_on_support()
    }
}

#[cfg(test)]
mod test {
    use super::Support;

    #[test]
    fn test_intersect() {
        let visible = Support::new(380.0, 780.0);

        assert_eq!(
            visible.intersect(&Support::new(300.0, 500.0)),
            Some(Support::new(380.0, 500.0))
        );
        assert_eq!(
            Support::new(600.0, 900.0).intersect(&visible),
            Some(Support::new(600.0, 780.0))
        );
        assert_eq!(visible.intersect(&Support::new(100.0, 200.0)), None);

        let touching = visible.intersect(&Support::new(780.0, 800.0));
        assert_eq!(touching, Some(Support::new(780.0, 780.0)));
        assert!(touching.is_some_and(|s| s.is_degenerate()));
    }

    #[test]
    fn test_support() {
        let support = Support::new(400.0, 700.0);
        assert!(support.is_valid());
        assert_eq!(support.width(), 300.0);
        assert!(support.contains(400.0));
        assert!(support.contains(700.0));
        assert!(!support.contains(700.1));
        assert!(!support.contains(crate::Float::NAN));

        assert!(!Support::new(700.0, 400.0).is_valid());
        assert!(!Support::new(crate::Float::NEG_INFINITY, 400.0).is_valid());
        assert_eq!(support.to_string(), "[400nm, 700nm]");
    }
}
