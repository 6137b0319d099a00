//! Grid impact factors, loaded once from an external table and read-only afterwards.
pub mod mix;

pub use mix::{ElectricityMix, ElectricityMixRepository, GridFactors, MixError};
