//! Immutable configuration of the impact model.
//!
//! An `ImpactConfig` is built once (from defaults or a JSON document) and
//! handed to `ImpactEngine::new`. Nothing mutates it afterwards.
pub mod defaults;

use crate::error::ImpactError;
use crate::model::llm::leaf;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Calibration constants fed into the graph as leaves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Calibration {
    pub model_quantization_bits: f64,
    pub gpu_energy_alpha: f64,
    pub gpu_energy_beta: f64,
    pub gpu_energy_stdev: f64,
    pub gpu_latency_alpha: f64,
    pub gpu_latency_beta: f64,
    pub gpu_latency_stdev: f64,
    pub gpu_memory: f64,
    pub gpu_embodied_gwp: f64,
    pub gpu_embodied_adpe: f64,
    pub gpu_embodied_pe: f64,
    pub server_gpu_count: f64,
    pub server_power: f64,
    pub server_embodied_gwp: f64,
    pub server_embodied_adpe: f64,
    pub server_embodied_pe: f64,
    pub server_lifetime: f64,
    pub water_fabricating_gpu: f64,
    pub gpus_in_server: f64,
    pub batching_size: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        use defaults::*;
        Self {
            model_quantization_bits: MODEL_QUANTIZATION_BITS,
            gpu_energy_alpha: GPU_ENERGY_ALPHA,
            gpu_energy_beta: GPU_ENERGY_BETA,
            gpu_energy_stdev: GPU_ENERGY_STDEV,
            gpu_latency_alpha: GPU_LATENCY_ALPHA,
            gpu_latency_beta: GPU_LATENCY_BETA,
            gpu_latency_stdev: GPU_LATENCY_STDEV,
            gpu_memory: GPU_MEMORY,
            gpu_embodied_gwp: GPU_EMBODIED_IMPACT_GWP,
            gpu_embodied_adpe: GPU_EMBODIED_IMPACT_ADPE,
            gpu_embodied_pe: GPU_EMBODIED_IMPACT_PE,
            server_gpu_count: SERVER_GPUS,
            server_power: SERVER_POWER,
            server_embodied_gwp: SERVER_EMBODIED_IMPACT_GWP,
            server_embodied_adpe: SERVER_EMBODIED_IMPACT_ADPE,
            server_embodied_pe: SERVER_EMBODIED_IMPACT_PE,
            server_lifetime: HARDWARE_LIFESPAN,
            water_fabricating_gpu: WATER_FABRICATING_GPU,
            gpus_in_server: GPUS_IN_SERVER,
            batching_size: BATCHING_SIZE,
        }
    }
}

impl Calibration {
    /// The calibration as `(leaf name, value)` pairs.
    pub fn leaves(&self) -> [(&'static str, f64); 20] {
        [
            (leaf::MODEL_QUANTIZATION_BITS, self.model_quantization_bits),
            (leaf::GPU_ENERGY_ALPHA, self.gpu_energy_alpha),
            (leaf::GPU_ENERGY_BETA, self.gpu_energy_beta),
            (leaf::GPU_ENERGY_STDEV, self.gpu_energy_stdev),
            (leaf::GPU_LATENCY_ALPHA, self.gpu_latency_alpha),
            (leaf::GPU_LATENCY_BETA, self.gpu_latency_beta),
            (leaf::GPU_LATENCY_STDEV, self.gpu_latency_stdev),
            (leaf::GPU_MEMORY, self.gpu_memory),
            (leaf::GPU_EMBODIED_GWP, self.gpu_embodied_gwp),
            (leaf::GPU_EMBODIED_ADPE, self.gpu_embodied_adpe),
            (leaf::GPU_EMBODIED_PE, self.gpu_embodied_pe),
            (leaf::SERVER_GPU_COUNT, self.server_gpu_count),
            (leaf::SERVER_POWER, self.server_power),
            (leaf::SERVER_EMBODIED_GWP, self.server_embodied_gwp),
            (leaf::SERVER_EMBODIED_ADPE, self.server_embodied_adpe),
            (leaf::SERVER_EMBODIED_PE, self.server_embodied_pe),
            (leaf::SERVER_LIFETIME, self.server_lifetime),
            (leaf::WATER_FABRICATING_GPU, self.water_fabricating_gpu),
            (leaf::GPUS_IN_SERVER, self.gpus_in_server),
            (leaf::BATCHING_SIZE, self.batching_size),
        ]
    }
}

/// Power and on-site water efficiency of a data-center operator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OperatorEfficiency {
    pub pue: f64,
    /// Litres of water consumed on site per kWh.
    pub wue_onsite: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImpactConfig {
    pub calibration: Calibration,
    /// Operator name -> efficiency.
    pub operators: BTreeMap<String, OperatorEfficiency>,
    /// AI provider identifier -> operator name.
    pub providers: BTreeMap<String, String>,
}

impl Default for ImpactConfig {
    fn default() -> Self {
        let operators = defaults::OPERATORS
            .iter()
            .map(|&(name, pue, wue_onsite)| (name.to_string(), OperatorEfficiency { pue, wue_onsite }))
            .collect();
        let providers = defaults::PROVIDERS
            .iter()
            .map(|&(provider, operator)| (provider.to_string(), operator.to_string()))
            .collect();

        Self { calibration: Calibration::default(), operators, providers }
    }
}

impl ImpactConfig {
    /// Parses a JSON document. Absent keys keep their defaults; a table that is
    /// present replaces the default table as a whole.
    pub fn from_json_str(json: &str) -> Result<Self, ImpactError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ImpactError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Resolves a provider identifier to its operator and that operator's efficiency.
    pub fn resolve_operator(&self, provider: &str) -> Result<(&str, OperatorEfficiency), ImpactError> {
        let operator = self
            .providers
            .get(provider)
            .ok_or_else(|| ImpactError::UnknownProvider(provider.to_string()))?;
        let efficiency = self
            .operators
            .get(operator)
            .ok_or_else(|| ImpactError::UnknownOperator(operator.clone()))?;
        Ok((operator.as_str(), *efficiency))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    #[rstest]
    #[case("anthropic", "Google", 1.09)]
    #[case("openai", "Microsoft", 1.18)]
    #[case("mistralai", "OVHCloud", 1.26)]
    #[case("litellm", "AWS", 1.15)]
    fn test_default_provider_resolution(#[case] provider: &str, #[case] operator: &str, #[case] pue: f64) {
        let config = ImpactConfig::default();
        let (resolved, efficiency) = config.resolve_operator(provider).unwrap();
        assert_eq!(resolved, operator);
        assert_eq!(efficiency.pue, pue);
    }

    #[test]
    fn test_unknown_provider_is_an_error() {
        let err = ImpactConfig::default().resolve_operator("acme").unwrap_err();
        assert!(matches!(err, ImpactError::UnknownProvider(ref p) if p == "acme"));
    }

    #[test]
    fn test_provider_pointing_at_missing_operator() {
        let mut config = ImpactConfig::default();
        config.providers.insert("acme".into(), "NoSuchCloud".into());
        let err = config.resolve_operator("acme").unwrap_err();
        assert!(matches!(err, ImpactError::UnknownOperator(ref o) if o == "NoSuchCloud"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = ImpactConfig::from_json_str(r#"{"calibration": {"gpu_memory": 40.0}}"#).unwrap();
        assert_eq!(config.calibration.gpu_memory, 40.0);
        assert_eq!(config.calibration.batching_size, defaults::BATCHING_SIZE);
        assert_eq!(config.operators.len(), defaults::OPERATORS.len());
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"providers": {{"acme": "AWS"}}}}"#).unwrap();

        let config = ImpactConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.providers.len(), 1);
        assert_eq!(config.resolve_operator("acme").unwrap().0, "AWS");
    }

    #[test]
    fn test_invalid_json_is_reported() {
        assert!(matches!(ImpactConfig::from_json_str("{"), Err(ImpactError::Config(_))));
    }

    #[test]
    fn test_calibration_leaves_cover_every_constant() {
        let leaves = Calibration::default().leaves();
        assert!(leaves.iter().any(|&(name, v)| name == leaf::SERVER_LIFETIME && v == 157_680_000.0));
    }
}
