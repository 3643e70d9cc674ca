//! Conversion of light spectra to CIE XYZ.
//!
//! A [`SpectrumStrategy`] picks one of four standard observer tables by
//! resolution and field of view. [`spectrum_to_xyz`] convolves a light
//! spectrum with that table's three matching functions. [`SpectrumConverter`]
//! packages the same computation with a configured strategy and produces
//! [`Xyz`] values that remember where they came from.

use std::str::FromStr;
use std::sync::{Arc, Weak};

#[cfg(feature = "pyffi")]
use pyo3::prelude::*;
use tracing::{debug, warn};

use crate::core::to_eq_coordinates;
use crate::error::UnknownStrategyError;
use crate::function::FiniteSupportFunction;
use crate::observer::{
    ObserverTriple, CIE_1931_2DEG_1NM, CIE_1931_2DEG_5NM, CIE_1964_10DEG_1NM, CIE_1964_10DEG_5NM,
};
use crate::spectrum::{DataSource, LightSpectrum, SourceRef};
use crate::util::{Env, Environment};
use crate::Float;

/// The environment variable for configuring the default spectrum strategy.
pub const STRATEGY_VARIABLE: &str = "TRISTIMULUS_STRATEGY";

/// The choice of standard observer for converting spectra.
///
/// Each strategy combines the native resolution of the matching function
/// tables, 1nm or 5nm, with the observer's field of view, 2º for the CIE 1931
/// observer or 10º for the CIE 1964 observer. The default is 5nm with 2º.
///
/// Strategies are identified by names such as `5nm-2deg` and by 8-bit codes
/// `0..=3` in declaration order.
#[cfg_attr(
    feature = "pyffi",
    pyclass(eq, eq_int, frozen, hash, module = "tristimulus")
)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SpectrumStrategy {
    /// The CIE 1931 2º observer at 1nm.
    Nm1Deg2,
    /// The CIE 1964 10º observer at 1nm.
    Nm1Deg10,
    /// The CIE 1964 10º observer at 5nm.
    Nm5Deg10,
    /// The CIE 1931 2º observer at 5nm.
    #[default]
    Nm5Deg2,
}

impl SpectrumStrategy {
    /// All strategies in declaration order.
    pub const ALL: [SpectrumStrategy; 4] = [
        SpectrumStrategy::Nm1Deg2,
        SpectrumStrategy::Nm1Deg10,
        SpectrumStrategy::Nm5Deg10,
        SpectrumStrategy::Nm5Deg2,
    ];

    /// Get the observer triple for this strategy.
    pub fn observer(&self) -> &'static ObserverTriple {
        use SpectrumStrategy::*;

        match self {
            Nm1Deg2 => &CIE_1931_2DEG_1NM,
            Nm1Deg10 => &CIE_1964_10DEG_1NM,
            Nm5Deg10 => &CIE_1964_10DEG_5NM,
            Nm5Deg2 => &CIE_1931_2DEG_5NM,
        }
    }

    /// Parse the name or code of a strategy, falling back on the default.
    ///
    /// Unlike [`str::parse`], this function accepts any input. If the input
    /// does not name a strategy, it logs a warning and returns
    /// [`SpectrumStrategy::default`].
    pub fn parse_or_default(input: &str) -> Self {
        match input.parse() {
            Ok(strategy) => strategy,
            Err(error) => {
                let fallback = Self::default();
                warn!(input, %error, %fallback, "falling back on default spectrum strategy");
                fallback
            }
        }
    }
}

#[cfg_attr(feature = "pyffi", pymethods)]
impl SpectrumStrategy {
    /// Instantiate a strategy from its 8-bit code. <i
    /// class=python-only>Python only!</i>
    #[cfg(feature = "pyffi")]
    #[staticmethod]
    pub fn try_from_code(value: u8) -> Result<Self, UnknownStrategyError> {
        Self::try_from(value)
    }

    /// Parse a strategy from its name. <i class=python-only>Python only!</i>
    #[cfg(feature = "pyffi")]
    #[staticmethod]
    #[pyo3(name = "parse")]
    pub fn py_parse(value: &str) -> Result<Self, UnknownStrategyError> {
        value.parse()
    }

    /// Get the native wavelength step in nanometers.
    pub fn step(&self) -> Float {
        use SpectrumStrategy::*;

        match self {
            Nm1Deg2 | Nm1Deg10 => 1.0,
            Nm5Deg10 | Nm5Deg2 => 5.0,
        }
    }

    /// Get the field of view in degrees.
    pub fn field_of_view(&self) -> u8 {
        use SpectrumStrategy::*;

        match self {
            Nm1Deg2 | Nm5Deg2 => 2,
            Nm1Deg10 | Nm5Deg10 => 10,
        }
    }

    /// Get this strategy's name, e.g., `5nm-2deg`.
    pub fn name(&self) -> &'static str {
        use SpectrumStrategy::*;

        match self {
            Nm1Deg2 => "1nm-2deg",
            Nm1Deg10 => "1nm-10deg",
            Nm5Deg10 => "5nm-10deg",
            Nm5Deg2 => "5nm-2deg",
        }
    }

    /// Get the 8-bit code for this strategy. <i class=python-only>Python
    /// only!</i>
    #[cfg(feature = "pyffi")]
    pub fn to_code(&self) -> u8 {
        *self as u8
    }

    /// Get a human-readable description. <i class=python-only>Python only!</i>
    #[cfg(feature = "pyffi")]
    pub fn __str__(&self) -> String {
        self.name().to_string()
    }
}

impl TryFrom<u8> for SpectrumStrategy {
    type Error = UnknownStrategyError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        let strategy = match value {
            0 => SpectrumStrategy::Nm1Deg2,
            1 => SpectrumStrategy::Nm1Deg10,
            2 => SpectrumStrategy::Nm5Deg10,
            3 => SpectrumStrategy::Nm5Deg2,
            _ => return Err(UnknownStrategyError::new(value.to_string())),
        };

        Ok(strategy)
    }
}

impl From<SpectrumStrategy> for u8 {
    fn from(value: SpectrumStrategy) -> u8 {
        value as u8
    }
}

impl FromStr for SpectrumStrategy {
    type Err = UnknownStrategyError;

    /// Parse a strategy.
    ///
    /// Parsing ignores case and anything that isn't a letter or digit, so
    /// `5nm-2deg`, `5NM/2°`, and `Nm5Deg2` all name the default strategy. The
    /// codes `0` through `3` are accepted as well.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        use SpectrumStrategy::*;

        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        let strategy = match key.as_str() {
            "1nm2deg" | "1nm2" | "nm1deg2" => Nm1Deg2,
            "1nm10deg" | "1nm10" | "nm1deg10" => Nm1Deg10,
            "5nm10deg" | "5nm10" | "nm5deg10" => Nm5Deg10,
            "5nm2deg" | "5nm2" | "nm5deg2" => Nm5Deg2,
            _ => match key.parse::<u8>() {
                Ok(code) => return Self::try_from(code).map_err(|_| UnknownStrategyError::new(s)),
                Err(_) => return Err(UnknownStrategyError::new(s)),
            },
        };

        Ok(strategy)
    }
}

impl std::fmt::Display for SpectrumStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// --------------------------------------------------------------------------------------------------------------------

/// Convert the light spectrum to XYZ tristimulus values.
///
/// This function convolves the spectrum with the x̄, ȳ, z̄ matching functions
/// of the strategy's observer. The results are not normalized. They are zero
/// if the spectrum's support does not overlap with the observer's.
pub fn spectrum_to_xyz<S>(spectrum: &S, strategy: SpectrumStrategy) -> [Float; 3]
where
    S: LightSpectrum + ?Sized,
{
    let coordinates = strategy.observer().convolve(spectrum);
    debug!(
        spectrum = %FiniteSupportFunction::label(spectrum),
        %strategy,
        x = coordinates[0],
        y = coordinates[1],
        z = coordinates[2],
        "spectrum_to_xyz"
    );
    coordinates
}

// --------------------------------------------------------------------------------------------------------------------

/// The XYZ tristimulus values of a light spectrum.
///
/// Besides its three coordinates, an XYZ value keeps a weak reference to the
/// [`DataSource`] it was computed from. The reference does not keep the
/// source alive and does not participate in equality testing or hashing.
/// Coordinates are compared after normalization with
/// [`to_eq_bits`](crate::to_eq_bits).
#[cfg_attr(
    feature = "pyffi",
    pyclass(eq, frozen, hash, module = "tristimulus")
)]
#[derive(Clone)]
pub struct Xyz {
    coordinates: [Float; 3],
    source: Option<SourceRef>,
}

impl Xyz {
    /// Create a new XYZ value.
    pub fn new(coordinates: [Float; 3], source: Option<SourceRef>) -> Self {
        Self {
            coordinates,
            source,
        }
    }

    /// Get the data source, if it is still alive. <i class=rust-only>Rust
    /// only!</i>
    pub fn source(&self) -> Option<Arc<dyn DataSource + Send + Sync>> {
        self.source.as_ref().and_then(Weak::upgrade)
    }
}

#[cfg_attr(feature = "pyffi", pymethods)]
impl Xyz {
    /// Create a new XYZ value without data source.
    #[cfg(feature = "pyffi")]
    #[new]
    pub fn py_new(x: Float, y: Float, z: Float) -> Self {
        Self::new([x, y, z], None)
    }

    /// Get the X coordinate.
    pub fn x(&self) -> Float {
        self.coordinates[0]
    }

    /// Get the Y coordinate.
    pub fn y(&self) -> Float {
        self.coordinates[1]
    }

    /// Get the Z coordinate.
    pub fn z(&self) -> Float {
        self.coordinates[2]
    }

    /// Get all three coordinates.
    pub fn coordinates(&self) -> [Float; 3] {
        self.coordinates
    }

    /// Get the luminance, which is the Y coordinate.
    pub fn luminance(&self) -> Float {
        self.coordinates[1]
    }

    /// Determine the x, y chromaticity coordinates.
    ///
    /// For black, i.e., all coordinates zero, both chromaticity coordinates
    /// are not-a-number.
    pub fn xy_chromaticity(&self) -> (Float, Float) {
        let [x, y, z] = self.coordinates;
        let sum = x + y + z;
        (x / sum, y / sum)
    }

    /// Scale this XYZ value so that its luminance is 1.
    ///
    /// If the luminance is zero, the coordinates stay as they are. The data
    /// source is retained.
    pub fn normalize(&self) -> Self {
        let [x, y, z] = self.coordinates;
        let coordinates = if y == 0.0 {
            self.coordinates
        } else {
            [x / y, 1.0, z / y]
        };

        Self {
            coordinates,
            source: self.source.clone(),
        }
    }

    /// Get the label of the data source, if it is still alive.
    pub fn source_label(&self) -> Option<String> {
        self.source().map(|source| source.label())
    }

    /// Get a debug representation. <i class=python-only>Python only!</i>
    #[cfg(feature = "pyffi")]
    pub fn __repr__(&self) -> String {
        format!("{:?}", self)
    }
}

impl AsRef<[Float; 3]> for Xyz {
    fn as_ref(&self) -> &[Float; 3] {
        &self.coordinates
    }
}

impl std::ops::Index<usize> for Xyz {
    type Output = Float;

    /// Access the coordinate with the given index.
    ///
    /// # Panics
    ///
    /// This method panics if `2 < index`.
    fn index(&self, index: usize) -> &Self::Output {
        &self.coordinates[index]
    }
}

impl std::hash::Hash for Xyz {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        let [n1, n2, n3] = to_eq_coordinates(&self.coordinates);
        n1.hash(state);
        n2.hash(state);
        n3.hash(state);
    }
}

impl PartialEq for Xyz {
    /// Determine whether this XYZ value equals the other.
    ///
    /// Coordinates are rounded to
    #[cfg_attr(feature = "f64", doc = "9")]
    #[cfg_attr(not(feature = "f64"), doc = "4")]
    /// digits after the decimal before comparison. Data sources are ignored.
    fn eq(&self, other: &Self) -> bool {
        to_eq_coordinates(&self.coordinates) == to_eq_coordinates(&other.coordinates)
    }
}

impl Eq for Xyz {}

impl std::fmt::Debug for Xyz {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [x, y, z] = self.coordinates;
        match self.source_label() {
            Some(label) => write!(f, "Xyz([{}, {}, {}], source={:?})", x, y, z, label),
            None => write!(f, "Xyz([{}, {}, {}])", x, y, z),
        }
    }
}

impl std::fmt::Display for Xyz {
    /// Format this XYZ value.
    ///
    /// The precision applies to each coordinate.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let [x, y, z] = self.coordinates;
        match f.precision() {
            Some(precision) => write!(
                f,
                "xyz({:.*} {:.*} {:.*})",
                precision, x, precision, y, precision, z
            ),
            None => write!(f, "xyz({} {} {})", x, y, z),
        }
    }
}

// --------------------------------------------------------------------------------------------------------------------

/// A converter from light spectra to XYZ values.
///
/// The converter holds the spectrum strategy, so that applications configure
/// it once instead of passing the strategy around.
/// [`SpectrumConverter::default`] uses the 5nm/2º strategy and
/// [`SpectrumConverter::from_environment`] reads the strategy from the
/// `TRISTIMULUS_STRATEGY` environment variable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SpectrumConverter {
    strategy: SpectrumStrategy,
}

impl SpectrumConverter {
    /// Create a new converter with the given strategy.
    pub fn with_strategy(strategy: SpectrumStrategy) -> Self {
        Self { strategy }
    }

    /// Create a new converter with the strategy named by the
    /// `TRISTIMULUS_STRATEGY` environment variable.
    ///
    /// If the variable is not set or empty, the converter uses the default
    /// strategy. If the variable does not name a strategy, this method logs a
    /// warning and also uses the default strategy.
    pub fn from_environment() -> Self {
        converter_from_environment(&Env::default())
    }

    /// Get the strategy.
    pub fn strategy(&self) -> SpectrumStrategy {
        self.strategy
    }

    /// Convert the spectrum to XYZ.
    ///
    /// The result's data source is the spectrum's own data source, if it has
    /// one, and the spectrum itself otherwise.
    pub fn convert<S>(&self, spectrum: &Arc<S>) -> Xyz
    where
        S: LightSpectrum + Send + Sync + 'static,
    {
        let source: SourceRef = match spectrum.data_source() {
            Some(source) => source,
            None => {
                // Downgrade first, then unsize to the trait object.
                let weak: Weak<S> = Arc::downgrade(spectrum);
                weak
            }
        };

        self.convert_with_source(spectrum.as_ref(), source)
    }

    /// Convert a spectrum that is not shared through an [`Arc`].
    ///
    /// Without a shared handle, the spectrum itself cannot serve as data
    /// source. The result records the spectrum's own data source, if any, and
    /// has none otherwise. Python's `to_xyz` methods use this conversion.
    pub fn convert_detached<S>(&self, spectrum: &S) -> Xyz
    where
        S: LightSpectrum + ?Sized,
    {
        Xyz::new(spectrum_to_xyz(spectrum, self.strategy), spectrum.data_source())
    }

    /// Convert the spectrum to XYZ, recording the given data source.
    pub fn convert_with_source<S>(&self, spectrum: &S, source: SourceRef) -> Xyz
    where
        S: LightSpectrum + ?Sized,
    {
        Xyz::new(spectrum_to_xyz(spectrum, self.strategy), Some(source))
    }
}

pub(crate) fn converter_from_environment(env: &impl Environment) -> SpectrumConverter {
    let strategy = match env.read(STRATEGY_VARIABLE) {
        Ok(value) if value.trim().is_empty() => SpectrumStrategy::default(),
        Ok(value) => SpectrumStrategy::parse_or_default(&value),
        Err(std::env::VarError::NotPresent) => SpectrumStrategy::default(),
        Err(error) => {
            warn!(variable = STRATEGY_VARIABLE, %error, "ignoring spectrum strategy");
            SpectrumStrategy::default()
        }
    };

    debug!(%strategy, "configured spectrum converter");
    SpectrumConverter::with_strategy(strategy)
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;
    use std::sync::{Arc, Weak};

    use super::{converter_from_environment, spectrum_to_xyz, SpectrumConverter, SpectrumStrategy, Xyz};
    use crate::core::assert_same_tristimulus;
    use crate::error::{SpectrumError, UnknownStrategyError};
    use crate::function::Support;
    use crate::spectrum::{
        BlackBodySpectrum, ConstantSpectrum, DataSource, LightSpectrum, RegularSpectrum,
        SourceRef, TabularSpectrum,
    };
    use crate::util::FakeEnv;
    use crate::{assert_close_enough, Float};

    #[test]
    fn test_zero_spectrum() -> Result<(), SpectrumError> {
        let darkness = ConstantSpectrum::new(Support::new(300.0, 900.0), 0.0)?;
        let zeros = RegularSpectrum::new(380.0, 10.0, vec![0.0; 41])?;

        for strategy in SpectrumStrategy::ALL {
            assert_eq!(spectrum_to_xyz(&darkness, strategy), [0.0, 0.0, 0.0]);
            assert_eq!(spectrum_to_xyz(&zeros, strategy), [0.0, 0.0, 0.0]);
        }
        Ok(())
    }

    fn all_strategies(spectrum: &dyn LightSpectrum) -> Vec<[Float; 3]> {
        SpectrumStrategy::ALL
            .iter()
            .map(|strategy| spectrum_to_xyz(spectrum, *strategy))
            .collect()
    }

    #[test]
    fn test_non_negative() -> Result<(), SpectrumError> {
        let spectra = [
            all_strategies(&BlackBodySpectrum::new(2_856.0)?),
            all_strategies(&BlackBodySpectrum::new(6_504.0)?),
            all_strategies(&TabularSpectrum::new(
                vec![350.0, 520.0, 700.0],
                vec![0.0, 3.0, 0.5],
            )?),
        ];

        for coordinates in spectra.iter().flatten() {
            assert!(coordinates.iter().all(|&c| 0.0 <= c), "{:?}", coordinates);
        }
        Ok(())
    }

    #[test]
    fn test_outside_support() -> Result<(), SpectrumError> {
        let infrared = ConstantSpectrum::new(Support::new(900.0, 1_000.0), 1.0)?;
        let line = TabularSpectrum::new(vec![555.0], vec![1.0])?;
        let point = ConstantSpectrum::new(Support::new(500.0, 500.0), 1.0)?;

        for strategy in SpectrumStrategy::ALL {
            assert_eq!(spectrum_to_xyz(&infrared, strategy), [0.0, 0.0, 0.0]);
            assert_eq!(spectrum_to_xyz(&line, strategy), [0.0, 0.0, 0.0]);
            assert_eq!(spectrum_to_xyz(&point, strategy), [0.0, 0.0, 0.0]);
        }
        Ok(())
    }

    #[test]
    fn test_repeatable() -> Result<(), SpectrumError> {
        let spectrum = BlackBodySpectrum::new(4_000.0)?;
        for strategy in SpectrumStrategy::ALL {
            let first = spectrum_to_xyz(&spectrum, strategy);
            let second = spectrum_to_xyz(&spectrum, strategy);
            assert_eq!(first.map(Float::to_bits), second.map(Float::to_bits));
        }
        Ok(())
    }

    #[test]
    fn test_default_strategy() -> Result<(), SpectrumError> {
        let spectrum = BlackBodySpectrum::new(5_000.0)?;
        assert_eq!(SpectrumStrategy::default(), SpectrumStrategy::Nm5Deg2);
        assert_eq!(
            spectrum_to_xyz(&spectrum, SpectrumStrategy::default()),
            spectrum_to_xyz(&spectrum, SpectrumStrategy::Nm5Deg2)
        );

        let spectrum = Arc::new(spectrum);
        assert_eq!(
            SpectrumConverter::default().convert(&spectrum),
            SpectrumConverter::with_strategy(SpectrumStrategy::Nm5Deg2).convert(&spectrum)
        );
        Ok(())
    }

    #[test]
    fn test_equal_energy() -> Result<(), SpectrumError> {
        let white = ConstantSpectrum::new(Support::new(300.0, 900.0), 1.0)?;

        let xyz = Xyz::new(spectrum_to_xyz(&white, SpectrumStrategy::Nm5Deg2), None);
        assert!(106.8 < xyz.luminance() && xyz.luminance() < 106.9);
        let (x, y) = xyz.xy_chromaticity();
        assert!((x - 1.0 / 3.0).abs() < 0.001);
        assert!((y - 1.0 / 3.0).abs() < 0.001);

        for strategy in SpectrumStrategy::ALL {
            let (x, y) = Xyz::new(spectrum_to_xyz(&white, strategy), None).xy_chromaticity();
            assert!((x - 1.0 / 3.0).abs() < 0.005, "{} {}", strategy, x);
            assert!((y - 1.0 / 3.0).abs() < 0.005, "{} {}", strategy, y);
        }
        Ok(())
    }

    #[test]
    fn test_illuminant_a() -> Result<(), SpectrumError> {
        // CIE illuminant A has chromaticity (0.44757, 0.40745).
        let lamp = BlackBodySpectrum::new(2_856.0)?;
        let xyz = Xyz::new(spectrum_to_xyz(&lamp, SpectrumStrategy::Nm5Deg2), None);
        let (x, y) = xyz.xy_chromaticity();
        assert!((x - 0.44757).abs() < 0.001, "{}", x);
        assert!((y - 0.40745).abs() < 0.001, "{}", y);
        Ok(())
    }

    #[test]
    fn test_sampled_matches_analytic() -> Result<(), SpectrumError> {
        // Samples coincide with the 5nm table's native steps.
        let sampled = RegularSpectrum::new(380.0, 5.0, vec![1.0; 81])?;
        let analytic = ConstantSpectrum::new(Support::new(380.0, 780.0), 1.0)?;

        assert_same_tristimulus!(
            spectrum_to_xyz(&sampled, SpectrumStrategy::Nm5Deg2),
            spectrum_to_xyz(&analytic, SpectrumStrategy::Nm5Deg2)
        );
        Ok(())
    }

    #[test]
    fn test_strategy_codes() {
        for (code, strategy) in SpectrumStrategy::ALL.iter().enumerate() {
            assert_eq!(SpectrumStrategy::try_from(code as u8), Ok(*strategy));
            assert_eq!(u8::from(*strategy), code as u8);
        }

        assert_eq!(
            SpectrumStrategy::try_from(4),
            Err(UnknownStrategyError::new("4"))
        );
    }

    #[test]
    fn test_strategy_names() {
        for strategy in SpectrumStrategy::ALL {
            assert_eq!(strategy.to_string().parse(), Ok(strategy));
            assert_eq!(format!("{:?}", strategy).parse(), Ok(strategy));
        }

        assert_eq!("1NM/10°".parse(), Ok(SpectrumStrategy::Nm1Deg10));
        assert_eq!("5nm 10deg".parse(), Ok(SpectrumStrategy::Nm5Deg10));
        assert_eq!("0".parse(), Ok(SpectrumStrategy::Nm1Deg2));
        assert_eq!(
            "7nm-3deg".parse::<SpectrumStrategy>(),
            Err(UnknownStrategyError::new("7nm-3deg"))
        );
        assert_eq!(
            "9".parse::<SpectrumStrategy>(),
            Err(UnknownStrategyError::new("9"))
        );
        assert!("".parse::<SpectrumStrategy>().is_err());

        assert_eq!(
            SpectrumStrategy::parse_or_default("bogus"),
            SpectrumStrategy::Nm5Deg2
        );
        assert_eq!(
            SpectrumStrategy::parse_or_default("1nm-2deg"),
            SpectrumStrategy::Nm1Deg2
        );
    }

    #[test]
    fn test_strategy_properties() {
        use SpectrumStrategy::*;

        assert_eq!(Nm1Deg2.step(), 1.0);
        assert_eq!(Nm5Deg10.step(), 5.0);
        assert_eq!(Nm1Deg10.field_of_view(), 10);
        assert_eq!(Nm5Deg2.field_of_view(), 2);

        for strategy in SpectrumStrategy::ALL {
            for function in strategy.observer().functions() {
                assert_eq!(function.step(), strategy.step());
            }
        }
    }

    #[test]
    fn test_environment() {
        let mut env = FakeEnv::new();
        assert_eq!(
            converter_from_environment(&env).strategy(),
            SpectrumStrategy::Nm5Deg2
        );

        env.set("TRISTIMULUS_STRATEGY", "1nm-10deg");
        assert_eq!(
            converter_from_environment(&env).strategy(),
            SpectrumStrategy::Nm1Deg10
        );

        env.set("TRISTIMULUS_STRATEGY", "");
        assert_eq!(
            converter_from_environment(&env).strategy(),
            SpectrumStrategy::Nm5Deg2
        );

        env.set("TRISTIMULUS_STRATEGY", "2");
        assert_eq!(
            converter_from_environment(&env).strategy(),
            SpectrumStrategy::Nm5Deg10
        );

        env.set("TRISTIMULUS_STRATEGY", "bogus");
        assert_eq!(
            converter_from_environment(&env).strategy(),
            SpectrumStrategy::Nm5Deg2
        );
    }

    #[test]
    fn test_provenance() -> Result<(), SpectrumError> {
        let converter = SpectrumConverter::default();

        // Without a data source, the spectrum itself is the source.
        let spectrum = Arc::new(
            RegularSpectrum::new(400.0, 10.0, vec![1.0; 31])?.with_label("flat"),
        );
        let xyz = converter.convert(&spectrum);
        assert_eq!(xyz.source_label().as_deref(), Some("flat"));
        drop(spectrum);
        assert!(xyz.source().is_none());
        assert_eq!(xyz.source_label(), None);

        // With a data source, the data source takes precedence.
        let original = Arc::new(
            TabularSpectrum::new(vec![400.0, 700.0], vec![1.0, 1.0])?.with_label("measured"),
        );
        let weak: Weak<TabularSpectrum> = Arc::downgrade(&original);
        let weak: SourceRef = weak;
        let resampled = Arc::new(
            RegularSpectrum::new(400.0, 5.0, vec![1.0; 61])?
                .with_label("resampled")
                .with_source(weak.clone()),
        );
        let xyz = converter.convert(&resampled);
        assert_eq!(xyz.source_label().as_deref(), Some("measured"));

        // An explicitly supplied source is recorded as is.
        let xyz = converter.convert_with_source(resampled.as_ref(), weak);
        let source = xyz.source().map(|source| source.label());
        assert_eq!(source.as_deref(), Some("measured"));

        // Without a shared handle, only the spectrum's own source is recorded.
        let xyz = converter.convert_detached(resampled.as_ref());
        assert_eq!(xyz.source_label().as_deref(), Some("measured"));
        let flat = RegularSpectrum::new(400.0, 10.0, vec![1.0; 31])?;
        let xyz = converter.convert_detached(&flat);
        assert!(xyz.source().is_none());
        assert_eq!(xyz, converter.convert(&Arc::new(flat)));
        Ok(())
    }

    #[test]
    fn test_xyz() {
        let xyz = Xyz::new([0.5, 2.0, 1.5], None);
        assert_eq!(xyz.x(), 0.5);
        assert_eq!(xyz[1], 2.0);
        assert_eq!(xyz.as_ref(), &[0.5, 2.0, 1.5]);
        assert_eq!(xyz.xy_chromaticity(), (0.125, 0.5));
        assert_eq!(xyz.normalize().coordinates(), [0.25, 1.0, 0.75]);
        assert_eq!(Xyz::new([0.0, 0.0, 0.0], None).normalize().y(), 0.0);
        assert_eq!(format!("{}", xyz), "xyz(0.5 2 1.5)");
        assert_eq!(format!("{:.2}", xyz), "xyz(0.50 2.00 1.50)");
        assert_eq!(format!("{:?}", xyz), "Xyz([0.5, 2, 1.5])");
        assert_close_enough!(xyz.luminance(), 2.0);

        // Equality and hashing ignore rounding noise and data sources.
        let other = Xyz::new([0.1 + 0.4, 2.0, 1.5], None);
        assert_eq!(xyz, other);
        let set: HashSet<Xyz> = [xyz, other].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_data_source_label() -> Result<(), SpectrumError> {
        let spectrum = TabularSpectrum::new(vec![400.0, 500.0], vec![1.0, 2.0])?;
        assert_eq!(DataSource::label(&spectrum), "Tabular spectrum with 2 samples");
        Ok(())
    }
}
