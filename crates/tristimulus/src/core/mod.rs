mod equality;
mod math;

// equality
#[cfg(test)]
pub(crate) use equality::assert_same_tristimulus;
#[cfg(feature = "pyffi")]
pub use equality::close_enough;
pub use equality::to_eq_bits;
pub(crate) use equality::to_eq_coordinates;

// math
pub(crate) use math::{interpolate_regular, lerp, FloatExt, Sum};
