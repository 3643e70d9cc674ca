#[cfg(feature = "pyffi")]
use pyo3::prelude::*;

use super::{LightSpectrum, SourceRef};
use crate::error::{SpectrumError, SpectrumErrorKind};
use crate::function::{FiniteSupportFunction, Support};
use crate::Float;
#[cfg(feature = "pyffi")]
use crate::{SpectrumConverter, SpectrumStrategy, Xyz};

fn check_support(support: Support) -> Result<Support, SpectrumError> {
    if support.is_valid() {
        Ok(support)
    } else {
        Err(SpectrumError::new(SpectrumErrorKind::InvalidSupport))
    }
}

/// A spectrum defined by a closure.
///
/// The closure is only invoked for wavelengths inside the support. It should
/// return finite, non-negative values no larger than the declared peak.
pub struct AnalyticSpectrum<F> {
    label: String,
    support: Support,
    peak: Float,
    function: F,
    source: Option<SourceRef>,
}

impl<F: Fn(Float) -> Float> AnalyticSpectrum<F> {
    /// Create a new analytic spectrum.
    pub fn new(
        label: impl Into<String>,
        support: Support,
        peak: Float,
        function: F,
    ) -> Result<Self, SpectrumError> {
        let support = check_support(support)?;
        if !peak.is_finite() {
            return Err(SpectrumError::new(SpectrumErrorKind::NonFiniteAmplitude));
        } else if peak < 0.0 {
            return Err(SpectrumError::new(SpectrumErrorKind::NegativeAmplitude));
        }

        Ok(Self {
            label: label.into(),
            support,
            peak,
            function,
            source: None,
        })
    }

    /// Record the data source this spectrum was derived from.
    pub fn with_source(mut self, source: SourceRef) -> Self {
        self.source = Some(source);
        self
    }
}

impl<F> std::fmt::Debug for AnalyticSpectrum<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticSpectrum")
            .field("label", &self.label)
            .field("support", &self.support)
            .field("peak", &self.peak)
            .finish_non_exhaustive()
    }
}

impl<F: Fn(Float) -> Float> FiniteSupportFunction for AnalyticSpectrum<F> {
    fn label(&self) -> String {
        self.label.clone()
    }

    fn evaluate_at(&self, wavelength: Float) -> Float {
        if self.support.contains(wavelength) {
            (self.function)(wavelength)
        } else {
            0.0
        }
    }

    fn support_min(&self) -> Float {
        self.support.min
    }

    fn support_max(&self) -> Float {
        self.support.max
    }

    fn max_value_on_support(&self) -> Float {
        self.peak
    }

    fn support(&self) -> Support {
        self.support
    }
}

impl<F: Fn(Float) -> Float> LightSpectrum for AnalyticSpectrum<F> {
    fn next_sample_after(&self, _wavelength: Float) -> Option<Float> {
        None
    }

    fn data_source(&self) -> Option<SourceRef> {
        self.source.clone()
    }
}

// --------------------------------------------------------------------------------------------------------------------

/// A spectrum with the same amplitude across its support.
///
/// With amplitude 1 over the visible range, this spectrum is the equal energy
/// illuminant E. With amplitude 0, it is darkness.
#[cfg_attr(
    feature = "pyffi",
    pyclass(frozen, module = "tristimulus.spectrum")
)]
#[derive(Clone, Debug)]
pub struct ConstantSpectrum {
    support: Support,
    amplitude: Float,
}

impl ConstantSpectrum {
    /// Create a new constant spectrum.
    pub fn new(support: Support, amplitude: Float) -> Result<Self, SpectrumError> {
        let support = check_support(support)?;
        super::check_amplitude(amplitude, 0)?;
        Ok(Self { support, amplitude })
    }
}

#[cfg_attr(feature = "pyffi", pymethods)]
impl ConstantSpectrum {
    /// Create a new constant spectrum.
    #[cfg(feature = "pyffi")]
    #[new]
    pub fn py_new(min: Float, max: Float, amplitude: Float) -> PyResult<Self> {
        Ok(Self::new(Support::new(min, max), amplitude)?)
    }

    /// Get the amplitude.
    pub fn amplitude(&self) -> Float {
        self.amplitude
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

    /// Get a debug representation. <i class=python-only>Python only!</i>
    #[cfg(feature = "pyffi")]
    pub fn __repr__(&self) -> String {
        format!(
            "ConstantSpectrum(min={}, max={}, amplitude={})",
            self.support.min, self.support.max, self.amplitude
        )
    }
}

impl FiniteSupportFunction for ConstantSpectrum {
    fn label(&self) -> String {
        format!("Constant spectrum {} over {}", self.amplitude, self.support)
    }

    fn evaluate_at(&self, wavelength: Float) -> Float {
        if self.support.contains(wavelength) {
            self.amplitude
        } else {
            0.0
        }
    }

    fn support_min(&self) -> Float {
        self.support.min
    }

    fn support_max(&self) -> Float {
        self.support.max
    }

    fn max_value_on_support(&self) -> Float {
        self.amplitude
    }
}

impl LightSpectrum for ConstantSpectrum {
    fn next_sample_after(&self, _wavelength: Float) -> Option<Float> {
        None
    }
}

// --------------------------------------------------------------------------------------------------------------------

/// The second radiation constant `hc/k` in nanometer-Kelvin.
const C2: Float = 1.438_776_877e7;

/// Wien's displacement constant in nanometer-Kelvin.
const WIEN: Float = 2.897_771_955e6;

/// The default support of black body spectra in nanometers.
pub const BLACK_BODY_SUPPORT: Support = Support::new(360.0, 830.0);

/// A black body radiator.
///
/// This spectrum follows Planck's law for the given temperature in Kelvin. It
/// is normalized so that its largest value on the support is 1. That peak is
/// at the wavelength given by Wien's displacement law, clamped to the
/// support.
#[cfg_attr(
    feature = "pyffi",
    pyclass(frozen, module = "tristimulus.spectrum")
)]
#[derive(Clone, Debug)]
pub struct BlackBodySpectrum {
    temperature: Float,
    support: Support,
    peak_wavelength: Float,
}

impl BlackBodySpectrum {
    /// Create a new black body spectrum over the default support from 360nm
    /// to 830nm.
    pub fn new(temperature: Float) -> Result<Self, SpectrumError> {
        Self::with_support(temperature, BLACK_BODY_SUPPORT)
    }

    /// Create a new black body spectrum over the given support.
    pub fn with_support(temperature: Float, support: Support) -> Result<Self, SpectrumError> {
        if !(temperature.is_finite() && 0.0 < temperature) {
            return Err(SpectrumError::new(SpectrumErrorKind::InvalidTemperature));
        }
        let support = check_support(support)?;
        if support.min <= 0.0 {
            return Err(SpectrumError::new(SpectrumErrorKind::InvalidSupport));
        }

        let peak_wavelength = (WIEN / temperature).clamp(support.min, support.max);
        Ok(Self {
            temperature,
            support,
            peak_wavelength,
        })
    }
}

#[cfg_attr(feature = "pyffi", pymethods)]
impl BlackBodySpectrum {
    /// Create a new black body spectrum over the default support.
    #[cfg(feature = "pyffi")]
    #[new]
    pub fn py_new(temperature: Float) -> PyResult<Self> {
        Ok(Self::new(temperature)?)
    }

    /// Get the temperature in Kelvin.
    pub fn temperature(&self) -> Float {
        self.temperature
    }

    /// Get the wavelength with the largest value on the support.
    pub fn peak_wavelength(&self) -> Float {
        self.peak_wavelength
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

    /// Get a debug representation. <i class=python-only>Python only!</i>
    #[cfg(feature = "pyffi")]
    pub fn __repr__(&self) -> String {
        format!("BlackBodySpectrum({}K)", self.temperature)
    }
}

impl FiniteSupportFunction for BlackBodySpectrum {
    fn label(&self) -> String {
        format!("Black body at {}K", self.temperature)
    }

    fn evaluate_at(&self, wavelength: Float) -> Float {
        if !self.support.contains(wavelength) {
            return 0.0;
        }

        // Planck's law divided by its value at the peak. Written in terms of
        // exp(-x) so that cold radiators do not overflow.
        let a = C2 / (self.peak_wavelength * self.temperature);
        let b = C2 / (wavelength * self.temperature);
        let ratio = (self.peak_wavelength / wavelength).powi(5);
        ratio * (a - b).exp() * -(-a).exp_m1() / -(-b).exp_m1()
    }

    fn support_min(&self) -> Float {
        self.support.min
    }

    fn support_max(&self) -> Float {
        self.support.max
    }

    fn max_value_on_support(&self) -> Float {
        1.0
    }

    fn support(&self) -> Support {
        self.support
    }
}

impl LightSpectrum for BlackBodySpectrum {
    fn next_sample_after(&self, _wavelength: Float) -> Option<Float> {
        None
    }
}

#[cfg(test)]
mod test {
    use super::{AnalyticSpectrum, BlackBodySpectrum, ConstantSpectrum};
    use crate::error::{SpectrumError, SpectrumErrorKind};
    use crate::function::{FiniteSupportFunction, Support};
    use crate::spectrum::LightSpectrum;
    use crate::{assert_close_enough, Float};

    #[test]
    fn test_analytic() -> Result<(), SpectrumError> {
        let ramp = AnalyticSpectrum::new("ramp", Support::new(400.0, 500.0), 1.0, |w| {
            (w - 400.0) / 100.0
        })?;

        assert_eq!(ramp.evaluate_at(450.0), 0.5);
        assert_eq!(ramp.evaluate_at(500.0), 1.0);
        assert_eq!(ramp.evaluate_at(500.5), 0.0);
        assert_eq!(ramp.evaluate_at(Float::NAN), 0.0);
        assert_eq!(ramp.next_sample_after(400.0), None);
        assert!(!ramp.is_sampled());
        assert!(format!("{:?}", ramp).starts_with("AnalyticSpectrum { label: \"ramp\""));

        assert_eq!(
            AnalyticSpectrum::new("bad", Support::new(500.0, 400.0), 1.0, |_| 1.0)
                .unwrap_err()
                .kind,
            SpectrumErrorKind::InvalidSupport
        );
        Ok(())
    }

    #[test]
    fn test_constant() -> Result<(), SpectrumError> {
        let spectrum = ConstantSpectrum::new(Support::new(400.0, 700.0), 2.0)?;
        assert_eq!(spectrum.evaluate_at(399.0), 0.0);
        assert_eq!(spectrum.evaluate_at(400.0), 2.0);
        assert_eq!(spectrum.evaluate_at(700.0), 2.0);
        assert_eq!(spectrum.max_value_on_support(), 2.0);
        assert_eq!(spectrum.next_sample_after(300.0), None);

        assert_eq!(
            ConstantSpectrum::new(Support::new(400.0, 700.0), -1.0)
                .unwrap_err()
                .kind,
            SpectrumErrorKind::NegativeAmplitude
        );
        Ok(())
    }

    #[test]
    fn test_black_body() -> Result<(), SpectrumError> {
        // Peak at roughly 501.8nm, inside the support.
        let warm = BlackBodySpectrum::new(5_775.0)?;
        assert!((warm.peak_wavelength() - 501.8).abs() < 0.1);
        assert_close_enough!(warm.evaluate_at(warm.peak_wavelength()), 1.0);
        for wavelength in [360.0, 420.0, 600.0, 830.0] {
            let value = warm.evaluate_at(wavelength);
            assert!(0.0 < value && value < 1.0);
        }

        // Peak far in the infrared, so spectrum increases across the support.
        let cold = BlackBodySpectrum::new(1_000.0)?;
        assert_eq!(cold.peak_wavelength(), 830.0);
        assert_close_enough!(cold.evaluate_at(830.0), 1.0);
        assert!(cold.evaluate_at(500.0) < cold.evaluate_at(700.0));

        // Very cold radiators still evaluate to finite numbers.
        let frigid = BlackBodySpectrum::new(10.0)?;
        assert!(frigid.evaluate_at(500.0).is_finite());
        assert_close_enough!(frigid.evaluate_at(830.0), 1.0);

        for temperature in [0.0, -5.0, Float::NAN, Float::INFINITY] {
            assert_eq!(
                BlackBodySpectrum::new(temperature).unwrap_err().kind,
                SpectrumErrorKind::InvalidTemperature
            );
        }
        Ok(())
    }
}
