//! Scalar-or-interval numeric values carried through the impact formulas.
pub mod bounded;

pub use bounded::{BoundedValue, InvalidRangeError};
