//! Environmental footprint of a single LLM inference request.
//!
//! A fixed graph of named formulas (`model::llm`) is evaluated by a generic,
//! memoizing executor (`graph`, `compute`) over scalar-or-interval values
//! (`value`). `impacts::ImpactEngine` drives one or two evaluations per request
//! and assembles usage, embodied and total impacts.

pub mod compute;
pub mod config;
pub mod display;
pub mod electricity;
pub mod error;
pub mod graph;
pub mod impacts;
pub mod logging;
pub mod model;
pub mod value;

#[cfg(feature = "python")]
pub mod bindings;

pub use config::ImpactConfig;
pub use electricity::{ElectricityMix, ElectricityMixRepository, GridFactors};
pub use error::ImpactError;
pub use impacts::{ImpactEngine, ImpactResult, LlmRequest};
pub use value::BoundedValue;

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Confirms the Rust core is callable from Python.
#[cfg(feature = "python")]
#[pyfunction]
fn rust_core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Defines the `_core` Python module.
/// The name `_core` is chosen to indicate it's an internal, compiled component.
#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(rust_core_version, m)?)?;
    m.add_class::<bindings::python::PyImpactEngine>()?;
    Ok(())
}
