use llm_impacts_core::config::{ImpactConfig, OperatorEfficiency};
use llm_impacts_core::display::format_trace;
use llm_impacts_core::impacts::{ImpactEngine, LlmRequest};
use llm_impacts_core::model::llm::asset;
use llm_impacts_core::{BoundedValue, ElectricityMixRepository, GridFactors, ImpactError};

fn engine() -> ImpactEngine {
    llm_impacts_core::logging::init_test();
    ImpactEngine::new(ImpactConfig::default()).expect("default graph is valid")
}

fn zero_grid() -> GridFactors {
    GridFactors { adpe: 0.0, pe: 0.0, gwp: 0.0, wcf: 0.0 }
}

fn french_grid() -> GridFactors {
    GridFactors { adpe: 4.86e-8, pe: 11.29, gwp: 0.08, wcf: 2.5 }
}

fn assert_exact_zero(value: BoundedValue) {
    assert_eq!((value.min(), value.max()), (0.0, 0.0), "expected exactly zero, got {}", value);
}

#[test]
fn zero_grid_factors_zero_the_grid_usage_but_not_embodied() {
    let engine = engine();
    let request = LlmRequest::new("google", 7.0, 7.0, 100.0, zero_grid());

    let result = engine.compute(&request).unwrap();

    assert_exact_zero(result.usage.gwp.value);
    assert_exact_zero(result.usage.adpe.value);
    assert_exact_zero(result.usage.pe.value);
    assert!(result.usage.energy.value.min() > 0.0);

    // On-site cooling water does not depend on the grid.
    let wue = engine.config().operators["Google"].wue_onsite;
    assert_eq!(result.usage.water.value, result.usage.energy.value * wue);

    assert!(result.embodied.gwp.value.min() > 0.0);
    assert!(result.embodied.adpe.value.min() > 0.0);
    assert!(result.embodied.pe.value.min() > 0.0);
    assert!(result.embodied.water.value.min() > 0.0);
}

#[test]
fn zero_grid_and_dry_operator_give_zero_usage_water() {
    let mut config = ImpactConfig::default();
    config.operators.insert("Google".into(), OperatorEfficiency { pue: 1.09, wue_onsite: 0.0 });
    let engine = ImpactEngine::new(config).unwrap();

    let result = engine.compute(&LlmRequest::new("google", 7.0, 7.0, 100.0, zero_grid())).unwrap();
    assert_exact_zero(result.usage.water.value);
}

#[test]
fn memory_sizing_picks_one_gpu_for_70b_at_4_bits() {
    let engine = engine();
    let request = LlmRequest::new("openai", 70.0, 70.0, 100.0, french_grid());

    let ledger = engine.compute_dag(&request, 70.0, 70.0).unwrap();
    assert_eq!(ledger.get(asset::MODEL_REQUIRED_MEMORY), Some(&BoundedValue::scalar(42.0)));
    assert_eq!(ledger.get(asset::GPU_REQUIRED_COUNT), Some(&BoundedValue::scalar(1.0)));
}

#[test]
fn generation_latency_is_clamped_to_measured_latency() {
    let mut config = ImpactConfig::default();
    config.calibration.gpu_latency_alpha = 0.0;
    config.calibration.gpu_latency_beta = 0.05; // 50 ms per token
    let engine = ImpactEngine::new(config).unwrap();
    let request = LlmRequest::new("openai", 7.0, 7.0, 500.0, french_grid()).with_request_latency(1.0);

    let ledger = engine.compute_dag(&request, 7.0, 7.0).unwrap();
    assert_eq!(ledger.get(asset::GENERATION_LATENCY), Some(&BoundedValue::Scalar(1.0)));
}

#[test]
fn interval_active_parameters_span_both_passes() {
    let engine = engine();
    let active = BoundedValue::interval(6.0, 8.0).unwrap();
    let request = LlmRequest::new("openai", active, 70.0, 100.0, french_grid());

    let result = engine.compute(&request).unwrap();
    let low = engine.compute_dag(&request, 6.0, 70.0).unwrap();
    let high = engine.compute_dag(&request, 8.0, 70.0).unwrap();

    let energy = result.energy.value;
    assert!(energy.is_interval());
    assert_eq!(energy.min(), low.get(asset::REQUEST_ENERGY).unwrap().min());
    assert_eq!(energy.max(), high.get(asset::REQUEST_ENERGY).unwrap().max());
    assert!(energy.min() < energy.max());

    let gwp = result.usage.gwp.value;
    assert_eq!(gwp.min(), low.get(asset::REQUEST_USAGE_GWP).unwrap().min());
    assert_eq!(gwp.max(), high.get(asset::REQUEST_USAGE_GWP).unwrap().max());
}

#[test]
fn repeated_computation_is_bit_identical() {
    let engine = engine();
    let request = LlmRequest::new("mistralai", BoundedValue::interval(12.0, 40.0).unwrap(), 141.0, 250.0, french_grid())
        .with_request_latency(8.0);

    let first = engine.compute(&request).unwrap();
    let second = engine.compute(&request).unwrap();

    assert_eq!(first, second);
    assert_eq!(serde_json::to_string(&first).unwrap(), serde_json::to_string(&second).unwrap());
}

#[test]
fn unknown_provider_produces_no_result() {
    let engine = engine();
    let err = engine.compute(&LlmRequest::new("acme", 7.0, 7.0, 100.0, french_grid())).unwrap_err();
    assert!(matches!(err, ImpactError::UnknownProvider(ref p) if p == "acme"), "got {:?}", err);
}

#[test]
fn totals_add_usage_and_embodied() {
    let engine = engine();
    let result = engine.compute(&LlmRequest::new("anthropic", 20.0, 100.0, 400.0, french_grid())).unwrap();

    assert_eq!(result.gwp.value, result.usage.gwp.value + result.embodied.gwp.value);
    assert_eq!(result.water.value, result.usage.water.value + result.embodied.water.value);
    assert_eq!(result.energy, result.usage.energy);
    assert_eq!(result.pe.unit, "MJ");
}

#[test]
fn batch_evaluation_matches_single_requests() {
    let engine = engine();
    let requests = vec![
        LlmRequest::new("openai", 7.0, 7.0, 100.0, french_grid()),
        LlmRequest::new("cohere", BoundedValue::interval(30.0, 50.0).unwrap(), 100.0, 300.0, french_grid()),
        LlmRequest::new("acme", 7.0, 7.0, 100.0, french_grid()),
    ];

    let results = engine.compute_batch(&requests);

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap(), &engine.compute(&requests[0]).unwrap());
    assert_eq!(results[1].as_ref().unwrap(), &engine.compute(&requests[1]).unwrap());
    assert!(matches!(results[2], Err(ImpactError::UnknownProvider(_))));
}

#[test]
fn electricity_mix_feeds_the_request() {
    let table = "name,adpe,pe,gwp,wcf\nWOR,7.37e-08,9.99,0.59,3.14\nISL,0,0,0,0\n";
    let repo = ElectricityMixRepository::from_reader(table.as_bytes()).unwrap();
    let iceland = repo.find("ISL").unwrap();
    assert!(iceland.wcf_is_world_average);

    let engine = engine();
    let result = engine.compute(&LlmRequest::new("meta", 8.0, 8.0, 100.0, iceland.grid_factors())).unwrap();

    // gwp stays at the zone's own (zero) factor; water uses the world average.
    assert_exact_zero(result.usage.gwp.value);
    assert!(result.usage.water.value.min() > 0.0);
}

#[test]
fn audit_trace_walks_the_request_energy() {
    let engine = engine();
    let request = LlmRequest::new("openai", 7.0, 7.0, 100.0, french_grid());
    let ledger = engine.compute_dag(&request, 7.0, 7.0).unwrap();

    let trace = format_trace(engine.graph(), &ledger, asset::REQUEST_ENERGY);
    assert!(trace.contains("[L1] request_energy["));
    assert!(trace.contains("provider_pue[1.18] -> Leaf"));
    assert!(trace.contains("gpu_required_count -> (Ref to"));
}
