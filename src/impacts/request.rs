//! The inputs of one LLM inference request.
use crate::electricity::GridFactors;
use crate::value::BoundedValue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmRequest {
    /// AI provider identifier, resolved to a data-center operator.
    pub provider: String,
    /// Active parameters, in billions.
    pub active_parameters: BoundedValue,
    /// Total parameters, in billions.
    pub total_parameters: BoundedValue,
    pub output_tokens: f64,
    /// Measured request latency in seconds; `None` means no ceiling.
    #[serde(default)]
    pub request_latency: Option<f64>,
    pub grid: GridFactors,
}

impl LlmRequest {
    pub fn new(
        provider: impl Into<String>,
        active_parameters: impl Into<BoundedValue>,
        total_parameters: impl Into<BoundedValue>,
        output_tokens: f64,
        grid: GridFactors,
    ) -> Self {
        Self {
            provider: provider.into(),
            active_parameters: active_parameters.into(),
            total_parameters: total_parameters.into(),
            output_tokens,
            request_latency: None,
            grid,
        }
    }

    pub fn with_request_latency(mut self, seconds: f64) -> Self {
        self.request_latency = Some(seconds);
        self
    }

    pub(crate) fn latency_ceiling(&self) -> f64 {
        self.request_latency.unwrap_or(f64::INFINITY)
    }
}
