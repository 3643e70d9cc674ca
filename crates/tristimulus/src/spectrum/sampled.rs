#[cfg(feature = "pyffi")]
use pyo3::prelude::*;

use super::{check_amplitude, check_wavelength, peak_of, LightSpectrum, SourceRef};
use crate::core::{interpolate_regular, lerp};
use crate::error::{SpectrumError, SpectrumErrorKind};
use crate::function::FiniteSupportFunction;
use crate::Float;
#[cfg(feature = "pyffi")]
use crate::{SpectrumConverter, SpectrumStrategy, Xyz};

/// A spectrum sampled at evenly spaced wavelengths.
///
/// The `i`-th amplitude is the spectrum's value at `start + i * step`
/// nanometers. Between samples, the spectrum is linearly interpolated. Outside
/// `[start, start + (len - 1) * step]`, it is zero.
#[cfg_attr(
    feature = "pyffi",
    pyclass(frozen, module = "tristimulus.spectrum")
)]
#[derive(Clone, Debug)]
pub struct RegularSpectrum {
    label: String,
    start: Float,
    step: Float,
    amplitudes: Vec<Float>,
    peak: Float,
    source: Option<SourceRef>,
}

impl RegularSpectrum {
    /// Create a new regular spectrum.
    ///
    /// The start wavelength must be finite and the step positive and finite.
    /// There must be at least one amplitude and all amplitudes must be finite
    /// and non-negative.
    pub fn new(start: Float, step: Float, amplitudes: Vec<Float>) -> Result<Self, SpectrumError> {
        check_wavelength(start, 0)?;
        if !(step.is_finite() && 0.0 < step) {
            return Err(SpectrumError::new(SpectrumErrorKind::InvalidStep));
        } else if amplitudes.is_empty() {
            return Err(SpectrumError::new(SpectrumErrorKind::Empty));
        }

        for (index, amplitude) in amplitudes.iter().enumerate() {
            check_amplitude(*amplitude, index)?;
        }

        let peak = peak_of(&amplitudes);
        Ok(Self {
            label: format!("Regular spectrum from {}nm by {}nm", start, step),
            start,
            step,
            amplitudes,
            peak,
            source: None,
        })
    }

    /// Replace this spectrum's label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Record the data source this spectrum was derived from.
    pub fn with_source(mut self, source: SourceRef) -> Self {
        self.source = Some(source);
        self
    }

    /// Get the amplitudes.
    pub fn amplitudes(&self) -> &[Float] {
        &self.amplitudes
    }

    fn wavelength(&self, index: usize) -> Float {
        self.start + index as Float * self.step
    }
}

#[cfg_attr(feature = "pyffi", pymethods)]
impl RegularSpectrum {
    /// Create a new regular spectrum.
    #[cfg(feature = "pyffi")]
    #[new]
    pub fn py_new(start: Float, step: Float, amplitudes: Vec<Float>) -> PyResult<Self> {
        Ok(Self::new(start, step, amplitudes)?)
    }

    /// Get this spectrum's label.
    pub fn label(&self) -> String {
        self.label.clone()
    }

    /// Get the wavelength of the first sample.
    pub fn start(&self) -> Float {
        self.start
    }

    /// Get the distance between consecutive samples.
    pub fn step(&self) -> Float {
        self.step
    }

    /// Get the number of samples.
    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    /// Determine whether this spectrum has no samples. That is never the case.
    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }

    /// Convert this spectrum to XYZ with the given strategy.
    ///
    /// Python objects are not shared through an `Arc`, so the result records
    /// the spectrum's own data source, if any, but never the spectrum itself.
    /// <i class=python-only>Python only!</i>
    #[cfg(feature = "pyffi")]
    #[pyo3(name = "to_xyz", signature = (strategy = None))]
    pub fn py_to_xyz(&self, strategy: Option<SpectrumStrategy>) -> Xyz {
        SpectrumConverter::with_strategy(strategy.unwrap_or_default()).convert_detached(self)
    }

    /// Get the number of samples. <i class=python-only>Python only!</i>
    #[cfg(feature = "pyffi")]
    pub fn __len__(&self) -> usize {
        self.amplitudes.len()
    }

    /// Get a debug representation. <i class=python-only>Python only!</i>
    #[cfg(feature = "pyffi")]
    pub fn __repr__(&self) -> String {
        format!(
            "RegularSpectrum(start={}, step={}, len={})",
            self.start,
            self.step,
            self.amplitudes.len()
        )
    }
}

impl FiniteSupportFunction for RegularSpectrum {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn evaluate_at(&self, wavelength: Float) -> Float {
        interpolate_regular(&self.amplitudes, self.start, self.step, wavelength)
    }

    fn support_min(&self) -> Float {
        self.start
    }

    fn support_max(&self) -> Float {
        self.wavelength(self.amplitudes.len() - 1)
    }

    fn max_value_on_support(&self) -> Float {
        self.peak
    }
}

impl LightSpectrum for RegularSpectrum {
    fn next_sample_after(&self, wavelength: Float) -> Option<Float> {
        // Bail before the cast below can saturate on huge wavelengths.
        if wavelength.is_nan() || self.support_max() <= wavelength {
            return None;
        } else if wavelength < self.start {
            return Some(self.start);
        }

        // The quotient only approximates the index, so correct it in both
        // directions against the wavelengths actually produced.
        let len = self.amplitudes.len();
        let mut index = (((wavelength - self.start) / self.step).floor() as usize).min(len - 1);
        while 0 < index && wavelength < self.wavelength(index) {
            index -= 1;
        }
        while index < len && self.wavelength(index) <= wavelength {
            index += 1;
        }

        if index < len {
            Some(self.wavelength(index))
        } else {
            None
        }
    }

    fn data_source(&self) -> Option<SourceRef> {
        self.source.clone()
    }
}

// --------------------------------------------------------------------------------------------------------------------

/// A spectrum sampled at arbitrary wavelengths.
///
/// Wavelengths must be strictly increasing. Between samples, the spectrum is
/// linearly interpolated. Outside the first and last sample, it is zero.
#[cfg_attr(
    feature = "pyffi",
    pyclass(frozen, module = "tristimulus.spectrum")
)]
#[derive(Clone, Debug)]
pub struct TabularSpectrum {
    label: String,
    wavelengths: Vec<Float>,
    amplitudes: Vec<Float>,
    peak: Float,
    source: Option<SourceRef>,
}

impl TabularSpectrum {
    /// Create a new tabular spectrum.
    ///
    /// Both vectors must have the same, non-zero length. Wavelengths must be
    /// finite and strictly increasing. Amplitudes must be finite and
    /// non-negative.
    pub fn new(wavelengths: Vec<Float>, amplitudes: Vec<Float>) -> Result<Self, SpectrumError> {
        if wavelengths.is_empty() {
            return Err(SpectrumError::new(SpectrumErrorKind::Empty));
        } else if wavelengths.len() != amplitudes.len() {
            return Err(SpectrumError::new(SpectrumErrorKind::LengthMismatch));
        }

        for (index, (wavelength, amplitude)) in wavelengths.iter().zip(&amplitudes).enumerate() {
            check_wavelength(*wavelength, index)?;
            check_amplitude(*amplitude, index)?;
            if 0 < index && *wavelength <= wavelengths[index - 1] {
                return Err(SpectrumError::at(SpectrumErrorKind::NotIncreasing, index));
            }
        }

        let peak = peak_of(&amplitudes);
        Ok(Self {
            label: format!("Tabular spectrum with {} samples", wavelengths.len()),
            wavelengths,
            amplitudes,
            peak,
            source: None,
        })
    }

    /// Create a new tabular spectrum from `(wavelength, amplitude)` pairs.
    pub fn from_pairs(pairs: &[(Float, Float)]) -> Result<Self, SpectrumError> {
        let (wavelengths, amplitudes) = pairs.iter().copied().unzip();
        Self::new(wavelengths, amplitudes)
    }

    /// Replace this spectrum's label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Record the data source this spectrum was derived from.
    pub fn with_source(mut self, source: SourceRef) -> Self {
        self.source = Some(source);
        self
    }

    /// Get the sample wavelengths.
    pub fn wavelengths(&self) -> &[Float] {
        &self.wavelengths
    }

    /// Get the sample amplitudes.
    pub fn amplitudes(&self) -> &[Float] {
        &self.amplitudes
    }
}

#[cfg_attr(feature = "pyffi", pymethods)]
impl TabularSpectrum {
    /// Create a new tabular spectrum.
    #[cfg(feature = "pyffi")]
    #[new]
    pub fn py_new(wavelengths: Vec<Float>, amplitudes: Vec<Float>) -> PyResult<Self> {
        Ok(Self::new(wavelengths, amplitudes)?)
    }

    /// Get this spectrum's label.
    pub fn label(&self) -> String {
        self.label.clone()
    }

    /// Get the number of samples.
    pub fn len(&self) -> usize {
        self.wavelengths.len()
    }

    /// Determine whether this spectrum has no samples. That is never the case.
    pub fn is_empty(&self) -> bool {
        self.wavelengths.is_empty()
    }

    /// Convert this spectrum to XYZ with the given strategy.
    ///
    /// Python objects are not shared through an `Arc`, so the result records
    /// the spectrum's own data source, if any, but never the spectrum itself.
    /// <i class=python-only>Python only!</i>
    #[cfg(feature = "pyffi")]
    #[pyo3(name = "to_xyz", signature = (strategy = None))]
    pub fn py_to_xyz(&self, strategy: Option<SpectrumStrategy>) -> Xyz {
        SpectrumConverter::with_strategy(strategy.unwrap_or_default()).convert_detached(self)
    }

    /// Get the number of samples. <i class=python-only>Python only!</i>
    #[cfg(feature = "pyffi")]
    pub fn __len__(&self) -> usize {
        self.wavelengths.len()
    }

    /// Get a debug representation. <i class=python-only>Python only!</i>
    #[cfg(feature = "pyffi")]
    pub fn __repr__(&self) -> String {
        format!(
            "TabularSpectrum(min={}, max={}, len={})",
            self.support_min(),
            self.support_max(),
            self.wavelengths.len()
        )
    }
}

impl FiniteSupportFunction for TabularSpectrum {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn evaluate_at(&self, wavelength: Float) -> Float {
        if !(self.support_min() <= wavelength && wavelength <= self.support_max()) {
            return 0.0;
        }

        let index = self.wavelengths.partition_point(|&w| w <= wavelength);
        if index == self.wavelengths.len() {
            return self.amplitudes[index - 1];
        }

        let (w0, w1) = (self.wavelengths[index - 1], self.wavelengths[index]);
        let t = (wavelength - w0) / (w1 - w0);
        lerp(t, self.amplitudes[index - 1], self.amplitudes[index])
    }

    fn support_min(&self) -> Float {
        self.wavelengths[0]
    }

    fn support_max(&self) -> Float {
        self.wavelengths[self.wavelengths.len() - 1]
    }

    fn max_value_on_support(&self) -> Float {
        self.peak
    }
}

impl LightSpectrum for TabularSpectrum {
    fn next_sample_after(&self, wavelength: Float) -> Option<Float> {
        if wavelength.is_nan() {
            return None;
        }

        let index = self.wavelengths.partition_point(|&w| w <= wavelength);
        self.wavelengths.get(index).copied()
    }

    fn data_source(&self) -> Option<SourceRef> {
        self.source.clone()
    }
}
