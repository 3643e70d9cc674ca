//! The CIE standard observers' matching functions.
//!
//! A [`MatchingFunction`] is one of the three curves x̄, ȳ, z̄ of a standard
//! observer, tabulated at a native resolution of 1nm or 5nm. Its
//! [`MatchingFunction::convolve`] method integrates the product of curve and
//! light spectrum over the intersection of their supports, which yields one
//! XYZ tristimulus coordinate. An [`ObserverTriple`] bundles all three curves.
//!
//! This module exports four process-wide triples, built on first use:
//!
//!   * [`CIE_1931_2DEG_5NM`] holds the CIE's tabulated 1931 2º observer
//!     between 380nm and 780nm.
//!   * [`CIE_1931_2DEG_1NM`] tabulates the [multi-lobe
//!     approximation](https://research.nvidia.com/publication/2013-07_simple-analytic-approximations-cie-xyz-color-matching-functions)
//!     of the 1931 2º observer between 360nm and 830nm.
//!   * [`CIE_1964_10DEG_1NM`] and [`CIE_1964_10DEG_5NM`] tabulate the
//!     single-lobe approximation of the 1964 10º observer from the same paper
//!     between 360nm and 830nm.
//!
//! The [`std_observer`] submodule provides the underlying analytical
//! approximations as free-standing functions.

use std::iter::FusedIterator;

use once_cell::sync::Lazy;
use tracing::{trace, warn};

use crate::cie::{CIE_1931_X_5NM, CIE_1931_Y_5NM, CIE_1931_Z_5NM};
use crate::core::{interpolate_regular, Sum};
use crate::function::FiniteSupportFunction;
use crate::spectrum::LightSpectrum;
use crate::Float;

/// A standard observer's matching function at fixed resolution.
///
/// The table's first entry is for the start wavelength and subsequent entries
/// are one step apart. Between entries, the function is linearly interpolated.
/// Outside the table, it is zero. All entries are non-negative.
#[derive(Clone, Debug)]
pub struct MatchingFunction {
    label: &'static str,
    start: Float,
    step: Float,
    data: Vec<Float>,
    peak: Float,
}

impl MatchingFunction {
    /// Create a new matching function from the given table.
    ///
    /// Negative entries are clamped to zero.
    pub(crate) fn new(label: &'static str, start: Float, step: Float, data: Vec<Float>) -> Self {
        let data: Vec<Float> = data.into_iter().map(|v| v.max(0.0)).collect();
        let peak = data.iter().copied().fold(0.0, Float::max);
        Self {
            label,
            start,
            step,
            data,
            peak,
        }
    }

    /// Create a new matching function by sampling the given function from
    /// `start` to `end` inclusive.
    pub(crate) fn tabulate(
        label: &'static str,
        start: Float,
        end: Float,
        step: Float,
        function: impl Fn(Float) -> Float,
    ) -> Self {
        let count = ((end - start) / step).round() as usize + 1;
        let data = (0..count)
            .map(|index| function(start + index as Float * step))
            .collect();
        Self::new(label, start, step, data)
    }

    /// Get the wavelength of the first table entry.
    pub fn start(&self) -> Float {
        self.start
    }

    /// Get the native step between table entries.
    pub fn step(&self) -> Float {
        self.step
    }

    /// Get the number of table entries.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Determine whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the table entries.
    pub fn data(&self) -> &[Float] {
        &self.data
    }

    /// Get the wavelengths at which convolution with the given spectrum
    /// evaluates both functions.
    ///
    /// If the supports of matching function and spectrum do not intersect or
    /// only touch in a single wavelength, the iterator is empty. Otherwise, it
    /// starts with the intersection's lower bound and ends with its upper
    /// bound. In between, it yields the spectrum's samples if the spectrum is
    /// sampled and multiples of the native step otherwise.
    pub fn nodes<'a, S>(&self, spectrum: &'a S) -> IntegrationNodes<'a, S>
    where
        S: LightSpectrum + ?Sized,
    {
        let intersection = self
            .support()
            .intersect(&spectrum.support())
            .filter(|support| !support.is_degenerate());

        let Some(support) = intersection else {
            return IntegrationNodes {
                spectrum,
                walk: Walk::Samples,
                step: self.step,
                next: None,
                end: 0.0,
            };
        };

        let walk = if spectrum.next_sample_after(support.min).is_some() {
            Walk::Samples
        } else {
            Walk::Steps {
                start: support.min,
                step: self.step,
                index: 0,
            }
        };

        IntegrationNodes {
            spectrum,
            walk,
            step: self.step,
            next: Some(support.min),
            end: support.max,
        }
    }

    /// Convolve this matching function with the light spectrum.
    ///
    /// This method integrates the product of the two functions over the
    /// intersection of their supports with the trapezoidal rule, using the
    /// wavelengths produced by [`MatchingFunction::nodes`]. The result is not
    /// normalized. It is zero if the supports do not overlap.
    pub fn convolve<S>(&self, spectrum: &S) -> Float
    where
        S: LightSpectrum + ?Sized,
    {
        let mut nodes = self.nodes(spectrum);
        let Some(mut previous) = nodes.next() else {
            trace!(function = self.label, "convolve: disjoint supports");
            return 0.0;
        };

        let first = previous;
        let mut previous_value = self.evaluate_at(previous) * spectrum.evaluate_at(previous);
        let mut count = 1_usize;
        let mut sum = Sum::new();

        for wavelength in nodes {
            let value = self.evaluate_at(wavelength) * spectrum.evaluate_at(wavelength);
            sum += 0.5 * (previous_value + value) * (wavelength - previous);
            previous = wavelength;
            previous_value = value;
            count += 1;
        }

        trace!(
            function = self.label,
            lo = first,
            hi = previous,
            nodes = count,
            "convolve"
        );
        sum.value()
    }
}

impl FiniteSupportFunction for MatchingFunction {
    fn label(&self) -> String {
        self.label.to_string()
    }

    fn evaluate_at(&self, wavelength: Float) -> Float {
        interpolate_regular(&self.data, self.start, self.step, wavelength)
    }

    fn support_min(&self) -> Float {
        self.start
    }

    fn support_max(&self) -> Float {
        self.start + self.data.len().saturating_sub(1) as Float * self.step
    }

    fn max_value_on_support(&self) -> Float {
        self.peak
    }
}

// --------------------------------------------------------------------------------------------------------------------

#[derive(Clone, Copy, Debug)]
enum Walk {
    Samples,
    Steps { start: Float, step: Float, index: usize },
}

/// An iterator over the wavelengths used for convolution.
///
/// Created with [`MatchingFunction::nodes`]. Wavelengths are strictly
/// increasing. If a sampled spectrum's next sample fails to advance, the
/// iterator logs a warning and steps through the rest of the domain at the
/// matching function's native resolution.
pub struct IntegrationNodes<'a, S: ?Sized> {
    spectrum: &'a S,
    walk: Walk,
    step: Float,
    next: Option<Float>,
    end: Float,
}

impl<S: LightSpectrum + ?Sized> Iterator for IntegrationNodes<'_, S> {
    type Item = Float;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;

        self.next = if current < self.end {
            let candidate = match self.walk {
                Walk::Samples => match self.spectrum.next_sample_after(current) {
                    Some(wavelength) if current < wavelength => Some(wavelength),
                    Some(wavelength) => {
                        warn!(
                            current,
                            sample = wavelength,
                            "next sample does not advance, stepping at native resolution"
                        );
                        self.walk = Walk::Steps {
                            start: current,
                            step: self.step,
                            index: 1,
                        };
                        Some(current + self.step)
                    }
                    None => None,
                },
                Walk::Steps { start, step, index } => {
                    // Multiply instead of accumulating to avoid drift.
                    let index = index + 1;
                    self.walk = Walk::Steps { start, step, index };
                    Some(start + index as Float * step)
                }
            };

            match candidate {
                Some(wavelength) if wavelength < self.end => Some(wavelength),
                _ => Some(self.end),
            }
        } else {
            None
        };

        Some(current)
    }
}

impl<S: LightSpectrum + ?Sized> FusedIterator for IntegrationNodes<'_, S> {}

impl<S: ?Sized> std::fmt::Debug for IntegrationNodes<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntegrationNodes")
            .field("walk", &self.walk)
            .field("step", &self.step)
            .field("next", &self.next)
            .field("end", &self.end)
            .finish_non_exhaustive()
    }
}

// --------------------------------------------------------------------------------------------------------------------

/// The three matching functions of a standard observer.
#[derive(Clone, Debug)]
pub struct ObserverTriple {
    pub x: MatchingFunction,
    pub y: MatchingFunction,
    pub z: MatchingFunction,
}

impl ObserverTriple {
    /// Get the three matching functions in order.
    pub fn functions(&self) -> [&MatchingFunction; 3] {
        [&self.x, &self.y, &self.z]
    }

    /// Convolve all three matching functions with the light spectrum.
    pub fn convolve<S>(&self, spectrum: &S) -> [Float; 3]
    where
        S: LightSpectrum + ?Sized,
    {
        [
            self.x.convolve(spectrum),
            self.y.convolve(spectrum),
            self.z.convolve(spectrum),
        ]
    }
}

/// The CIE 1931 2º standard observer at 5nm resolution.
pub static CIE_1931_2DEG_5NM: Lazy<ObserverTriple> = Lazy::new(|| ObserverTriple {
    x: MatchingFunction::new("CIE 1931 2º x̄ (5nm)", 380.0, 5.0, CIE_1931_X_5NM.to_vec()),
    y: MatchingFunction::new("CIE 1931 2º ȳ (5nm)", 380.0, 5.0, CIE_1931_Y_5NM.to_vec()),
    z: MatchingFunction::new("CIE 1931 2º z̄ (5nm)", 380.0, 5.0, CIE_1931_Z_5NM.to_vec()),
});

/// The CIE 1931 2º standard observer at 1nm resolution.
pub static CIE_1931_2DEG_1NM: Lazy<ObserverTriple> = Lazy::new(|| ObserverTriple {
    x: MatchingFunction::tabulate("CIE 1931 2º x̄ (1nm)", 360.0, 830.0, 1.0, std_observer::x),
    y: MatchingFunction::tabulate("CIE 1931 2º ȳ (1nm)", 360.0, 830.0, 1.0, std_observer::y),
    z: MatchingFunction::tabulate("CIE 1931 2º z̄ (1nm)", 360.0, 830.0, 1.0, std_observer::z),
});

/// The CIE 1964 10º standard observer at 1nm resolution.
pub static CIE_1964_10DEG_1NM: Lazy<ObserverTriple> = Lazy::new(|| ObserverTriple {
    x: MatchingFunction::tabulate("CIE 1964 10º x̄ (1nm)", 360.0, 830.0, 1.0, std_observer::x10),
    y: MatchingFunction::tabulate("CIE 1964 10º ȳ (1nm)", 360.0, 830.0, 1.0, std_observer::y10),
    z: MatchingFunction::tabulate("CIE 1964 10º z̄ (1nm)", 360.0, 830.0, 1.0, std_observer::z10),
});

/// The CIE 1964 10º standard observer at 5nm resolution.
pub static CIE_1964_10DEG_5NM: Lazy<ObserverTriple> = Lazy::new(|| ObserverTriple {
    x: MatchingFunction::tabulate("CIE 1964 10º x̄ (5nm)", 360.0, 830.0, 5.0, std_observer::x10),
    y: MatchingFunction::tabulate("CIE 1964 10º ȳ (5nm)", 360.0, 830.0, 5.0, std_observer::y10),
    z: MatchingFunction::tabulate("CIE 1964 10º z̄ (5nm)", 360.0, 830.0, 5.0, std_observer::z10),
});

// --------------------------------------------------------------------------------------------------------------------

pub mod std_observer {
    //! Free-standing functions approximating the CIE standard observers.

    #[cfg(feature = "pyffi")]
    use pyo3::prelude::pyfunction;

    use crate::Float;

    /// Compute an [analytical
    /// approximation](https://research.nvidia.com/publication/2013-07_simple-analytic-approximations-cie-xyz-color-matching-functions)
    /// for the 1931 2º standard observer's x.
    #[cfg_attr(feature = "pyffi", pyfunction)]
    pub fn x(wavelength: Float) -> Float {
        let p1 = (wavelength - 442.0) * (if wavelength < 442.0 { 0.0624 } else { 0.0374 });
        let p2 = (wavelength - 599.8) * (if wavelength < 599.8 { 0.0264 } else { 0.0323 });
        let p3 = (wavelength - 501.1) * (if wavelength < 501.1 { 0.0490 } else { 0.0382 });

        0.362 * (-0.5 * p1 * p1).exp() + 1.056 * (-0.5 * p2 * p2).exp()
            - 0.065 * (-0.5 * p3 * p3).exp()
    }

    /// Compute an analytical approximation for the 1931 2º standard observer's
    /// y.
    #[cfg_attr(feature = "pyffi", pyfunction)]
    pub fn y(wavelength: Float) -> Float {
        let p1 = (wavelength - 568.8) * (if wavelength < 568.8 { 0.0213 } else { 0.0247 });
        let p2 = (wavelength - 530.9) * (if wavelength < 530.9 { 0.0613 } else { 0.0322 });
        0.821 * (-0.5 * p1 * p1).exp() + 0.286 * (-0.5 * p2 * p2).exp()
    }

    /// Compute an analytical approximation for the 1931 2º standard observer's
    /// z.
    #[cfg_attr(feature = "pyffi", pyfunction)]
    pub fn z(wavelength: Float) -> Float {
        let p1 = (wavelength - 437.0) * (if wavelength < 437.0 { 0.0845 } else { 0.0278 });
        let p2 = (wavelength - 459.0) * (if wavelength < 459.0 { 0.0385 } else { 0.0725 });
        1.217 * (-0.5 * p1 * p1).exp() + 0.681 * (-0.5 * p2 * p2).exp()
    }

    /// Compute the single-lobe approximation for the 1964 10º standard
    /// observer's x.
    #[cfg_attr(feature = "pyffi", pyfunction)]
    pub fn x10(wavelength: Float) -> Float {
        let t1 = ((wavelength + 570.1) / 1014.0).ln();
        let short = 0.398 * (-1250.0 * t1 * t1).exp();
        if 1338.0 <= wavelength {
            return short;
        }

        let t2 = ((1338.0 - wavelength) / 743.5).ln();
        short + 1.132 * (-234.0 * t2 * t2).exp()
    }

    /// Compute the single-lobe approximation for the 1964 10º standard
    /// observer's y.
    #[cfg_attr(feature = "pyffi", pyfunction)]
    pub fn y10(wavelength: Float) -> Float {
        let t = (wavelength - 556.1) / 46.14;
        1.011 * (-0.5 * t * t).exp()
    }

    /// Compute the single-lobe approximation for the 1964 10º standard
    /// observer's z.
    #[cfg_attr(feature = "pyffi", pyfunction)]
    pub fn z10(wavelength: Float) -> Float {
        if wavelength <= 265.8 {
            return 0.0;
        }

        let t = ((wavelength - 265.8) / 180.4).ln();
        2.060 * (-32.0 * t * t).exp()
    }
}
