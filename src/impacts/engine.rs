//! The orchestrator: turns one request into an `ImpactResult`.
//!
//! Uncertainty on the parameter counts is not threaded through the formulas
//! as interval arithmetic. Instead the whole graph is evaluated once with all
//! minimums and once with all maximums, and each output is spanned from the
//! first pass's minimum to the second pass's maximum. This assumes outputs
//! grow with the parameter counts; it does not guarantee true bounds.

use super::request::LlmRequest;
use super::result::{ImpactFields, ImpactResult};
use crate::compute::Ledger;
use crate::config::ImpactConfig;
use crate::error::ImpactError;
use crate::graph::AssetGraph;
use crate::model::llm::{self, leaf};
use crate::value::BoundedValue;
use rayon::prelude::*;
use smallvec::{smallvec, SmallVec};
use std::collections::HashMap;
use tracing::debug;

/// Scalar (active, total) parameter counts of one graph pass.
pub type ParameterPass = (f64, f64);

/// Plans the graph passes: one when both counts are scalars, otherwise an
/// all-minimums pass followed by an all-maximums pass.
pub fn parameter_passes(active: &BoundedValue, total: &BoundedValue) -> SmallVec<[ParameterPass; 2]> {
    if active.is_interval() || total.is_interval() {
        smallvec![(active.min(), total.min()), (active.max(), total.max())]
    } else {
        smallvec![(active.min(), total.min())]
    }
}

/// The validated LLM impact graph together with its configuration.
///
/// Immutable after construction, so one engine can serve many threads.
#[derive(Debug)]
pub struct ImpactEngine {
    graph: AssetGraph<BoundedValue>,
    config: ImpactConfig,
}

impl ImpactEngine {
    /// Builds and validates the formula graph once.
    pub fn new(config: ImpactConfig) -> Result<Self, ImpactError> {
        let graph = llm::build_graph()?;
        let order = graph.validate(llm::LEAVES)?;
        debug!(assets = order.len(), "impact graph validated");
        Ok(Self { graph, config })
    }

    pub fn config(&self) -> &ImpactConfig { &self.config }

    pub fn graph(&self) -> &AssetGraph<BoundedValue> { &self.graph }

    /// The leaf values of one pass.
    fn leaves(&self, request: &LlmRequest, active: f64, total: f64) -> Result<HashMap<String, BoundedValue>, ImpactError> {
        let (_, efficiency) = self.config.resolve_operator(&request.provider)?;

        let request_leaves = [
            (leaf::MODEL_ACTIVE_PARAMETER_COUNT, active),
            (leaf::MODEL_TOTAL_PARAMETER_COUNT, total),
            (leaf::OUTPUT_TOKEN_COUNT, request.output_tokens),
            (leaf::REQUEST_LATENCY, request.latency_ceiling()),
            (leaf::IF_ELECTRICITY_MIX_ADPE, request.grid.adpe),
            (leaf::IF_ELECTRICITY_MIX_PE, request.grid.pe),
            (leaf::IF_ELECTRICITY_MIX_GWP, request.grid.gwp),
            (leaf::IF_ELECTRICITY_MIX_WCF, request.grid.wcf),
            (leaf::PROVIDER_PUE, efficiency.pue),
            (leaf::PROVIDER_WUE_ONSITE, efficiency.wue_onsite),
        ];

        Ok(request_leaves
            .into_iter()
            .chain(self.config.calibration.leaves())
            .map(|(name, value)| (name.to_string(), BoundedValue::scalar(value)))
            .collect())
    }

    /// Runs a single graph pass and returns every leaf and intermediate asset.
    pub fn compute_dag(&self, request: &LlmRequest, active: f64, total: f64) -> Result<Ledger<BoundedValue>, ImpactError> {
        let leaves = self.leaves(request, active, total)?;
        Ok(self.graph.execute(&leaves)?)
    }

    /// Computes the impacts of one request.
    pub fn compute(&self, request: &LlmRequest) -> Result<ImpactResult, ImpactError> {
        // Fail on an unknown provider before any evaluation.
        self.config.resolve_operator(&request.provider)?;

        let passes = parameter_passes(&request.active_parameters, &request.total_parameters);
        debug!(provider = %request.provider, passes = passes.len(), "computing request impacts");

        let mut merged: Option<ImpactFields> = None;
        for (active, total) in passes {
            let ledger = self.compute_dag(request, active, total)?;
            let fields = ImpactFields::from_ledger(&ledger)?;
            merged = Some(match merged {
                None => fields,
                Some(lower) => lower.span_to(&fields)?,
            });
        }

        merged
            .map(ImpactResult::from)
            .ok_or_else(|| ImpactError::MissingOutput(llm::asset::REQUEST_ENERGY.to_string()))
    }

    /// Computes independent requests in parallel.
    pub fn compute_batch(&self, requests: &[LlmRequest]) -> Vec<Result<ImpactResult, ImpactError>> {
        requests.par_iter().map(|request| self.compute(request)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::electricity::GridFactors;
    use rstest::rstest;

    fn iv(min: f64, max: f64) -> BoundedValue {
        BoundedValue::interval(min, max).unwrap()
    }

    #[rstest]
    #[case(BoundedValue::scalar(7.0), BoundedValue::scalar(7.0), 1)]
    #[case(iv(6.0, 8.0), BoundedValue::scalar(70.0), 2)]
    #[case(BoundedValue::scalar(7.0), iv(40.0, 70.0), 2)]
    #[case(iv(6.0, 8.0), iv(40.0, 70.0), 2)]
    fn test_pass_count(#[case] active: BoundedValue, #[case] total: BoundedValue, #[case] expected: usize) {
        assert_eq!(parameter_passes(&active, &total).len(), expected);
    }

    #[test]
    fn test_scalar_leaf_repeats_in_both_passes() {
        let passes = parameter_passes(&iv(6.0, 8.0), &BoundedValue::scalar(70.0));
        assert_eq!(passes.as_slice(), &[(6.0, 70.0), (8.0, 70.0)]);
    }

    #[test]
    fn test_compute_dag_exposes_intermediate_assets() {
        let engine = ImpactEngine::new(ImpactConfig::default()).unwrap();
        let request = LlmRequest::new("openai", 7.0, 7.0, 100.0, GridFactors::default());

        let ledger = engine.compute_dag(&request, 7.0, 7.0).unwrap();
        assert_eq!(ledger.get(leaf::PROVIDER_PUE), Some(&BoundedValue::scalar(1.18)));
        assert_eq!(ledger.get(llm::asset::GPU_REQUIRED_COUNT), Some(&BoundedValue::scalar(1.0)));
        assert_eq!(ledger.len(), engine.graph().len() + llm::LEAVES.len());
    }

    #[test]
    fn test_unknown_provider_stops_before_evaluation() {
        let engine = ImpactEngine::new(ImpactConfig::default()).unwrap();
        let request = LlmRequest::new("acme", 7.0, 7.0, 100.0, GridFactors::default());
        assert!(matches!(engine.compute(&request), Err(ImpactError::UnknownProvider(_))));
    }
}
