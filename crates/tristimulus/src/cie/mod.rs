mod two_deg;

pub(crate) use two_deg::{CIE_1931_X_5NM, CIE_1931_Y_5NM, CIE_1931_Z_5NM};
