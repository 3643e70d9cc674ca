//! Light spectra.
//!
//! A light spectrum is a [`FiniteSupportFunction`] mapping wavelengths in
//! nanometers to radiant power. The [`LightSpectrum`] trait adds one query,
//! [`LightSpectrum::next_sample_after`], which distinguishes spectra with an
//! intrinsic sampling grid from analytic spectra defined by a formula.
//! Integration against the standard observer walks the samples of the former
//! and steps through the latter at the observer table's native resolution.
//!
//! This module includes the following implementations:
//!
//!   * [`RegularSpectrum`] holds amplitudes sampled at evenly spaced
//!     wavelengths.
//!   * [`TabularSpectrum`] holds amplitudes sampled at arbitrary, strictly
//!     increasing wavelengths.
//!   * [`AnalyticSpectrum`] wraps a closure over a support.
//!   * [`ConstantSpectrum`] has the same amplitude across its support.
//!   * [`BlackBodySpectrum`] is Planck's law for a given temperature.
//!   * [`Analytic`] turns any finite-support function into a spectrum
//!     without samples.
//!
//! All spectra validate their inputs upon construction and are immutable
//! afterwards.
//!
//! Spectra may record the [`DataSource`] they were derived from. The
//! converter propagates that reference into [`Xyz`](crate::Xyz) results
//! without keeping the source alive.

mod analytic;
mod sampled;

use std::sync::Weak;

use crate::function::{FiniteSupportFunction, Support};
use crate::Float;

pub use analytic::{AnalyticSpectrum, BlackBodySpectrum, ConstantSpectrum, BLACK_BODY_SUPPORT};
pub use sampled::{RegularSpectrum, TabularSpectrum};

/// Something a color value may have been derived from.
///
/// Conversion results keep a [`SourceRef`] to their data source, which lets
/// callers trace a color back to its origin. All light spectra are data
/// sources.
pub trait DataSource {
    /// Get a descriptive label for this data source.
    fn label(&self) -> String;
}

/// A non-owning reference to a data source.
pub type SourceRef = Weak<dyn DataSource + Send + Sync>;

impl<S: LightSpectrum + ?Sized> DataSource for S {
    fn label(&self) -> String {
        FiniteSupportFunction::label(self)
    }
}

// --------------------------------------------------------------------------------------------------------------------

/// A light spectrum.
///
/// Analytic spectra have no intrinsic sampling grid and always answer
/// [`LightSpectrum::next_sample_after`] with none. Sampled spectra answer with
/// the smallest sample wavelength strictly greater than the argument and with
/// none once the argument reaches the last sample.
pub trait LightSpectrum: FiniteSupportFunction {
    /// Get the wavelength of the next sample strictly after the given
    /// wavelength.
    fn next_sample_after(&self, wavelength: Float) -> Option<Float>;

    /// Get the data source this spectrum was derived from, if any.
    fn data_source(&self) -> Option<SourceRef> {
        None
    }

    /// Determine whether this spectrum has more than one sample.
    fn is_sampled(&self) -> bool {
        self.next_sample_after(self.support_min()).is_some()
    }
}

impl<S: LightSpectrum + ?Sized> LightSpectrum for &S {
    fn next_sample_after(&self, wavelength: Float) -> Option<Float> {
        (**self).next_sample_after(wavelength)
    }

    fn data_source(&self) -> Option<SourceRef> {
        (**self).data_source()
    }
}

// --------------------------------------------------------------------------------------------------------------------

/// An adapter treating a finite-support function as an analytic spectrum.
///
/// The wrapped function is evaluated as is and never reports samples, so
/// convolution steps through it at the matching function's native
/// resolution.
#[derive(Clone, Debug)]
pub struct Analytic<F>(pub F);

impl<F: FiniteSupportFunction> FiniteSupportFunction for Analytic<F> {
    fn label(&self) -> String {
        self.0.label()
    }

    fn evaluate_at(&self, wavelength: Float) -> Float {
        self.0.evaluate_at(wavelength)
    }

    fn support_min(&self) -> Float {
        self.0.support_min()
    }

    fn support_max(&self) -> Float {
        self.0.support_max()
    }

    fn max_value_on_support(&self) -> Float {
        self.0.max_value_on_support()
    }

    fn support(&self) -> Support {
        self.0.support()
    }
}

impl<F: FiniteSupportFunction> LightSpectrum for Analytic<F> {
    fn next_sample_after(&self, _wavelength: Float) -> Option<Float> {
        None
    }
}

/// Validate that a wavelength is finite.
fn check_wavelength(wavelength: Float, index: usize) -> Result<(), crate::error::SpectrumError> {
    use crate::error::{SpectrumError, SpectrumErrorKind};

    if wavelength.is_finite() {
        Ok(())
    } else {
        Err(SpectrumError::at(SpectrumErrorKind::NonFiniteWavelength, index))
    }
}

/// Validate that an amplitude is finite and non-negative.
fn check_amplitude(amplitude: Float, index: usize) -> Result<(), crate::error::SpectrumError> {
    use crate::error::{SpectrumError, SpectrumErrorKind};

    if !amplitude.is_finite() {
        Err(SpectrumError::at(SpectrumErrorKind::NonFiniteAmplitude, index))
    } else if amplitude < 0.0 {
        Err(SpectrumError::at(SpectrumErrorKind::NegativeAmplitude, index))
    } else {
        Ok(())
    }
}

/// Find the largest amplitude.
fn peak_of(amplitudes: &[Float]) -> Float {
    amplitudes.iter().copied().fold(0.0, Float::max)
}

#[cfg(test)]
mod test {
    use super::{Analytic, DataSource, LightSpectrum, RegularSpectrum};
    use crate::error::SpectrumError;
    use crate::function::FiniteSupportFunction;
    use crate::observer::CIE_1931_2DEG_5NM;

    #[test]
    fn test_analytic_adapter() {
        let y = Analytic(&CIE_1931_2DEG_5NM.y);
        assert!(!y.is_sampled());
        assert_eq!(y.next_sample_after(500.0), None);
        assert_eq!(y.support_min(), 380.0);
        assert_eq!(y.support_max(), 780.0);
        assert_eq!(y.evaluate_at(555.0), CIE_1931_2DEG_5NM.y.evaluate_at(555.0));
    }

    #[test]
    fn test_data_source() -> Result<(), SpectrumError> {
        let spectrum = RegularSpectrum::new(400.0, 10.0, vec![1.0, 2.0, 3.0])?
            .with_label("ramp");
        assert_eq!(DataSource::label(&spectrum), "ramp");
        assert!(spectrum.data_source().is_none());
        assert!(spectrum.is_sampled());

        let reference = &spectrum;
        assert_eq!(reference.next_sample_after(400.0), Some(410.0));
        Ok(())
    }
}
