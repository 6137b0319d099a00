//! Impact computation for LLM inference requests.
pub mod engine;
pub mod request;
pub mod result;

pub use engine::{parameter_passes, ImpactEngine, ParameterPass};
pub use request::LlmRequest;
pub use result::{EmbodiedImpacts, ImpactFields, ImpactMetric, ImpactResult, MetricKind, UsageImpacts};
