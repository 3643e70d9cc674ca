//! # Tristimulus
//!
//! Tristimulus converts light spectra into CIE XYZ tristimulus values.
#![cfg_attr(
    not(feature = "pyffi"),
    doc = " This version of the API documentation **covers native Rust interfaces
only**."
)]
#![cfg_attr(
    feature = "pyffi",
    doc = " This version of the API documentation **covers both Rust and Python
interfaces**."
)]
//!
//!
//! ## 1. Overview
//!
//! Tristimulus' main abstractions are:
//!
//!   * [`FiniteSupportFunction`] is a real-valued function of wavelength that
//!     is zero outside a closed interval, its [`Support`].
//!   * [`LightSpectrum`] is a finite-support function that also reports
//!     whether it has been sampled at discrete wavelengths. The [`spectrum`]
//!     module has several implementations, including
//!     [`RegularSpectrum`](spectrum::RegularSpectrum),
//!     [`TabularSpectrum`](spectrum::TabularSpectrum), and
//!     [`BlackBodySpectrum`](spectrum::BlackBodySpectrum).
//!   * [`MatchingFunction`](observer::MatchingFunction) is one of the CIE
//!     standard observer's three curves x̄, ȳ, z̄. Its
//!     [`convolve`](observer::MatchingFunction::convolve) method integrates
//!     the product of curve and spectrum over their shared support, walking
//!     the spectrum's own samples if it has any and the table's native step
//!     otherwise.
//!   * [`SpectrumStrategy`] selects one of four observer tables, 1nm or 5nm
//!     combined with the 2º or 10º field of view.
//!   * [`spectrum_to_xyz`] and [`SpectrumConverter`] put it all together.
//!     The latter produces [`Xyz`] values that keep a weak reference to their
//!     data source.
//!
//!
//! ## 2. Converting a Spectrum
//!
//! ```
//! # use tristimulus::{spectrum_to_xyz, SpectrumError, SpectrumStrategy};
//! # use tristimulus::spectrum::BlackBodySpectrum;
//! # fn main() -> Result<(), SpectrumError> {
//! let lamp = BlackBodySpectrum::new(2_856.0)?;
//! let [x, y, z] = spectrum_to_xyz(&lamp, SpectrumStrategy::default());
//! let sum = x + y + z;
//! assert!((x / sum - 0.4476).abs() < 0.001);
//! assert!((y / sum - 0.4074).abs() < 0.001);
//! # Ok(())
//! # }
//! ```
//!
//! Applications that care about provenance use a [`SpectrumConverter`]
//! instead. Its strategy can also be configured through the
//! `TRISTIMULUS_STRATEGY` environment variable.
//!
//! ```
//! # use std::sync::Arc;
//! # use tristimulus::{SpectrumConverter, SpectrumError};
//! # use tristimulus::spectrum::RegularSpectrum;
//! # fn main() -> Result<(), SpectrumError> {
//! let spectrum = Arc::new(
//!     RegularSpectrum::new(400.0, 10.0, vec![1.0; 31])?.with_label("flat"),
//! );
//! let xyz = SpectrumConverter::from_environment().convert(&spectrum);
//! assert_eq!(xyz.source_label().as_deref(), Some("flat"));
//! # Ok(())
//! # }
//! ```
//!
//!
//! ## 3. Optional Features
//!
//! Tristimulus supports two feature flags:
//!
//!   - **`f64`** selects the eponymous type as floating point type [`Float`]
//!     and `u64` as [`Bits`] instead of `f32` as [`Float`] and `u32` as
//!     [`Bits`]. This feature is enabled by default.
//!   - **`pyffi`** controls tristimulus' Python integration through
//!     [PyO3](https://pyo3.rs/). This feature is disabled by default.
//!
//! Throughout the API documentation, items that are only available in Rust are
//! decorated with <i class=rust-only>Rust only!</i>.
#![cfg_attr(
    feature = "pyffi",
    doc = "Items that are only available in Python are decorated with <i
    class=python-only>Python only!</i>."
)]
//!
//!
//! ## 4. Logging
//!
//! Tristimulus emits [`tracing`](https://docs.rs/tracing) events: one trace
//! event per convolution, one debug event per conversion, and a warning when
//! an unrecognized strategy name is replaced by the default. The library does
//! not install a subscriber.

/// The floating point type in use.
#[cfg(feature = "f64")]
pub type Float = f64;
/// The floating point type in use.
#[cfg(not(feature = "f64"))]
pub type Float = f32;

/// [`Float`]'s bits.
#[cfg(feature = "f64")]
pub type Bits = u64;
/// [`Float`]'s bits.
#[cfg(not(feature = "f64"))]
pub type Bits = u32;

mod cie;
mod convert;
mod core;
pub mod error;
mod function;
pub mod observer;
pub mod spectrum;
mod util;

#[cfg(feature = "pyffi")]
pub use core::close_enough;

#[doc(hidden)]
pub use core::to_eq_bits;

pub use convert::{spectrum_to_xyz, SpectrumConverter, SpectrumStrategy, Xyz, STRATEGY_VARIABLE};
pub use error::{SpectrumError, SpectrumErrorKind, UnknownStrategyError};
pub use function::{FiniteSupportFunction, Support};
pub use spectrum::{DataSource, LightSpectrum, SourceRef};

#[cfg(feature = "pyffi")]
use pyo3::prelude::*;
#[cfg(feature = "pyffi")]
use pyo3::types::PyDict;

#[doc(hidden)]
#[cfg(feature = "pyffi")]
#[pymodule]
pub fn tristimulus(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let modtristimulus_name = m.name()?;
    let modtristimulus_name = modtristimulus_name.to_str()?;
    let modspectrum_name = format!("{}.spectrum", modtristimulus_name);
    let modobserver_name = format!("{}.std_observer", modtristimulus_name);

    // -------------------------------------------------------------------- tristimulus
    m.add_function(wrap_pyfunction!(close_enough, m)?)?;
    m.add_class::<SpectrumStrategy>()?;
    m.add_class::<Xyz>()?;
    m.add("STRATEGY_VARIABLE", STRATEGY_VARIABLE)?;

    // ----------------------------------------------------------- tristimulus.spectrum
    let modspectrum = PyModule::new(m.py(), "spectrum")?;
    modspectrum.add("__package__", modtristimulus_name)?;
    modspectrum.add_class::<spectrum::BlackBodySpectrum>()?;
    modspectrum.add_class::<spectrum::ConstantSpectrum>()?;
    modspectrum.add_class::<spectrum::RegularSpectrum>()?;
    modspectrum.add_class::<spectrum::TabularSpectrum>()?;
    m.add_submodule(&modspectrum)?;

    // Only change __name__ attribute after submodule has been added.
    modspectrum.setattr("__name__", &modspectrum_name)?;

    // ------------------------------------------------------- tristimulus.std_observer
    let modobserver = PyModule::new(m.py(), "std_observer")?;
    modobserver.add("__package__", modtristimulus_name)?;
    modobserver.add_function(wrap_pyfunction!(observer::std_observer::x, &modobserver)?)?;
    modobserver.add_function(wrap_pyfunction!(observer::std_observer::y, &modobserver)?)?;
    modobserver.add_function(wrap_pyfunction!(observer::std_observer::z, &modobserver)?)?;
    modobserver.add_function(wrap_pyfunction!(observer::std_observer::x10, &modobserver)?)?;
    modobserver.add_function(wrap_pyfunction!(observer::std_observer::y10, &modobserver)?)?;
    modobserver.add_function(wrap_pyfunction!(observer::std_observer::z10, &modobserver)?)?;
    m.add_submodule(&modobserver)?;

    // Only change __name__ attribute after submodule has been added.
    modobserver.setattr("__name__", &modobserver_name)?;

    // -------------------------------------------------------------------- sys.modules
    let py_modules: Bound<'_, PyDict> = PyModule::import(m.py(), "sys")?
        .getattr("modules")?
        .downcast_into()?;
    py_modules.set_item(&modspectrum_name, modspectrum)?;
    py_modules.set_item(&modobserver_name, modobserver)?;

    Ok(())
}
