//! Utility module with tristimulus' errors.

#[cfg(feature = "pyffi")]
use pyo3::{exceptions::PyValueError, prelude::*};

/// The kinds of malformed spectra.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpectrumErrorKind {
    /// A sampled spectrum without any samples.
    Empty,

    /// A tabular spectrum whose wavelengths and amplitudes have different
    /// lengths.
    LengthMismatch,

    /// A wavelength that is infinite or not-a-number.
    NonFiniteWavelength,

    /// An amplitude that is infinite or not-a-number.
    NonFiniteAmplitude,

    /// An amplitude below zero.
    NegativeAmplitude,

    /// A wavelength that is not strictly greater than its predecessor.
    NotIncreasing,

    /// A sampling interval that is zero, negative, or not finite.
    InvalidStep,

    /// A support whose bounds are not finite or out of order.
    InvalidSupport,

    /// A black body temperature that is zero, negative, or not finite.
    InvalidTemperature,
}

/// An error indicating a malformed spectrum.
///
/// Spectra validate their data upon construction. Where the problem is with a
/// specific sample, the error also records that sample's index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpectrumError {
    pub kind: SpectrumErrorKind,
    pub index: Option<usize>,
}

impl SpectrumError {
    /// Create a new spectrum error without index.
    pub fn new(kind: SpectrumErrorKind) -> Self {
        Self { kind, index: None }
    }

    /// Create a new spectrum error for the sample with the given index.
    pub fn at(kind: SpectrumErrorKind, index: usize) -> Self {
        Self {
            kind,
            index: Some(index),
        }
    }
}

impl std::fmt::Display for SpectrumError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use SpectrumErrorKind::*;

        match self.kind {
            Empty => f.write_str("spectrum should have at least one sample but has none")?,
            LengthMismatch => f.write_str(
                "spectrum should have as many amplitudes as wavelengths but counts differ",
            )?,
            NonFiniteWavelength => {
                f.write_str("spectrum wavelengths should be finite but one is not")?
            }
            NonFiniteAmplitude => {
                f.write_str("spectrum amplitudes should be finite but one is not")?
            }
            NegativeAmplitude => {
                f.write_str("spectrum amplitudes should be non-negative but one is negative")?
            }
            NotIncreasing => {
                f.write_str("spectrum wavelengths should be strictly increasing but are not")?
            }
            InvalidStep => {
                f.write_str("spectrum step should be positive and finite but is not")?
            }
            InvalidSupport => f.write_str(
                "spectrum support should have finite, ordered bounds but does not",
            )?,
            InvalidTemperature => {
                f.write_str("black body temperature should be positive and finite but is not")?
            }
        }

        if let Some(index) = self.index {
            write!(f, " (sample {})", index)?;
        }
        Ok(())
    }
}

impl std::error::Error for SpectrumError {}

#[cfg(feature = "pyffi")]
impl From<SpectrumError> for PyErr {
    fn from(value: SpectrumError) -> Self {
        PyValueError::new_err(value.to_string())
    }
}

// ====================================================================================================================

/// An error indicating an unknown spectrum strategy.
///
/// Strategies are identified by a code between 0 and 3 or by names such as
/// `5nm-2deg`. This error records the rejected input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownStrategyError {
    pub input: String,
}

impl UnknownStrategyError {
    /// Create a new unknown strategy error.
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

impl std::fmt::Display for UnknownStrategyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "spectrum strategy should be one of 1nm-2deg, 1nm-10deg, 5nm-10deg, 5nm-2deg but is `{}`",
            self.input
        )
    }
}

impl std::error::Error for UnknownStrategyError {}

#[cfg(feature = "pyffi")]
impl From<UnknownStrategyError> for PyErr {
    fn from(value: UnknownStrategyError) -> Self {
        PyValueError::new_err(value.to_string())
    }
}
