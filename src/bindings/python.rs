use crate::config::ImpactConfig;
use crate::electricity::GridFactors;
use crate::error::ImpactError;
use crate::impacts::{ImpactEngine, LlmRequest};
use crate::value::BoundedValue;
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

fn to_py_err(e: ImpactError) -> PyErr {
    match e {
        ImpactError::UnknownProvider(_)
        | ImpactError::UnknownOperator(_)
        | ImpactError::InvalidRange(_)
        | ImpactError::Config(_) => PyValueError::new_err(e.to_string()),
        _ => PyRuntimeError::new_err(e.to_string()),
    }
}

/// A scalar, or an interval when an upper bound is given.
fn bounded(value: f64, max: Option<f64>) -> PyResult<BoundedValue> {
    match max {
        None => Ok(BoundedValue::scalar(value)),
        Some(max) => BoundedValue::interval(value, max).map_err(|e| PyValueError::new_err(e.to_string())),
    }
}

#[pyclass(name = "_ImpactEngine")]
pub struct PyImpactEngine {
    engine: ImpactEngine,
}

#[pymethods]
impl PyImpactEngine {
    #[new]
    #[pyo3(signature = (config_json=None))]
    pub fn new(config_json: Option<String>) -> PyResult<Self> {
        let config = match config_json {
            Some(json) => ImpactConfig::from_json_str(&json).map_err(to_py_err)?,
            None => ImpactConfig::default(),
        };
        let engine = ImpactEngine::new(config).map_err(to_py_err)?;
        Ok(Self { engine })
    }

    /// Computes the impacts of one request and returns them as a JSON document.
    #[pyo3(signature = (
        provider,
        active_parameters,
        total_parameters,
        output_tokens,
        if_electricity_mix_adpe,
        if_electricity_mix_pe,
        if_electricity_mix_gwp,
        if_electricity_mix_wcf,
        request_latency=None,
        active_parameters_max=None,
        total_parameters_max=None
    ))]
    #[allow(clippy::too_many_arguments)]
    pub fn compute(
        &self,
        provider: String,
        active_parameters: f64,
        total_parameters: f64,
        output_tokens: f64,
        if_electricity_mix_adpe: f64,
        if_electricity_mix_pe: f64,
        if_electricity_mix_gwp: f64,
        if_electricity_mix_wcf: f64,
        request_latency: Option<f64>,
        active_parameters_max: Option<f64>,
        total_parameters_max: Option<f64>,
    ) -> PyResult<String> {
        let grid = GridFactors {
            adpe: if_electricity_mix_adpe,
            pe: if_electricity_mix_pe,
            gwp: if_electricity_mix_gwp,
            wcf: if_electricity_mix_wcf,
        };
        let mut request = LlmRequest::new(
            provider,
            bounded(active_parameters, active_parameters_max)?,
            bounded(total_parameters, total_parameters_max)?,
            output_tokens,
            grid,
        );
        request.request_latency = request_latency;

        let result = self.engine.compute(&request).map_err(to_py_err)?;
        serde_json::to_string(&result).map_err(|e| PyRuntimeError::new_err(e.to_string()))
    }

    pub fn providers(&self) -> Vec<String> {
        self.engine.config().providers.keys().cloned().collect()
    }
}
