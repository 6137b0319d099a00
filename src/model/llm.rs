//! The LLM inference impact model: the fixed set of assets and their formulas.
//!
//! Every formula works on `BoundedValue`s, so a scalar and an interval input
//! are interchangeable at every call site. Calibration constants are leaves
//! supplied by the caller, never hard-coded here.

use crate::compute::ComputationError;
use crate::graph::AssetGraph;
use crate::value::{BoundedValue, InvalidRangeError};

/// z-score of a two-sided 95% confidence band.
const Z_95: f64 = 1.96;
const SECONDS_PER_HOUR: f64 = 3600.0;
/// Memory overhead on top of the raw weights.
const MEMORY_OVERHEAD: f64 = 1.2;

/// Names of the values the caller supplies.
pub mod leaf {
    pub const MODEL_ACTIVE_PARAMETER_COUNT: &str = "model_active_parameter_count";
    pub const MODEL_TOTAL_PARAMETER_COUNT: &str = "model_total_parameter_count";
    pub const OUTPUT_TOKEN_COUNT: &str = "output_token_count";
    pub const REQUEST_LATENCY: &str = "request_latency";

    pub const IF_ELECTRICITY_MIX_ADPE: &str = "if_electricity_mix_adpe";
    pub const IF_ELECTRICITY_MIX_PE: &str = "if_electricity_mix_pe";
    pub const IF_ELECTRICITY_MIX_GWP: &str = "if_electricity_mix_gwp";
    pub const IF_ELECTRICITY_MIX_WCF: &str = "if_electricity_mix_wcf";

    pub const PROVIDER_PUE: &str = "provider_pue";
    pub const PROVIDER_WUE_ONSITE: &str = "provider_wue_onsite";

    pub const MODEL_QUANTIZATION_BITS: &str = "model_quantization_bits";
    pub const GPU_ENERGY_ALPHA: &str = "gpu_energy_alpha";
    pub const GPU_ENERGY_BETA: &str = "gpu_energy_beta";
    pub const GPU_ENERGY_STDEV: &str = "gpu_energy_stdev";
    pub const GPU_LATENCY_ALPHA: &str = "gpu_latency_alpha";
    pub const GPU_LATENCY_BETA: &str = "gpu_latency_beta";
    pub const GPU_LATENCY_STDEV: &str = "gpu_latency_stdev";
    pub const GPU_MEMORY: &str = "gpu_memory";
    pub const GPU_EMBODIED_GWP: &str = "gpu_embodied_gwp";
    pub const GPU_EMBODIED_ADPE: &str = "gpu_embodied_adpe";
    pub const GPU_EMBODIED_PE: &str = "gpu_embodied_pe";
    pub const SERVER_GPU_COUNT: &str = "server_gpu_count";
    pub const SERVER_POWER: &str = "server_power";
    pub const SERVER_EMBODIED_GWP: &str = "server_embodied_gwp";
    pub const SERVER_EMBODIED_ADPE: &str = "server_embodied_adpe";
    pub const SERVER_EMBODIED_PE: &str = "server_embodied_pe";
    pub const SERVER_LIFETIME: &str = "server_lifetime";
    pub const WATER_FABRICATING_GPU: &str = "water_fabricating_gpu";
    pub const GPUS_IN_SERVER: &str = "gpus_in_server";
    pub const BATCHING_SIZE: &str = "batching_size";
}

/// Names of the computed assets.
pub mod asset {
    pub const GPU_ENERGY: &str = "gpu_energy";
    pub const GENERATION_LATENCY: &str = "generation_latency";
    pub const MODEL_REQUIRED_MEMORY: &str = "model_required_memory";
    pub const GPU_REQUIRED_COUNT: &str = "gpu_required_count";
    pub const SERVER_ENERGY: &str = "server_energy";
    pub const REQUEST_ENERGY: &str = "request_energy";
    pub const REQUEST_USAGE_GWP: &str = "request_usage_gwp";
    pub const REQUEST_USAGE_ADPE: &str = "request_usage_adpe";
    pub const REQUEST_USAGE_PE: &str = "request_usage_pe";
    pub const REQUEST_USAGE_WATER: &str = "request_usage_water";
    pub const SERVER_GPU_EMBODIED_GWP: &str = "server_gpu_embodied_gwp";
    pub const SERVER_GPU_EMBODIED_ADPE: &str = "server_gpu_embodied_adpe";
    pub const SERVER_GPU_EMBODIED_PE: &str = "server_gpu_embodied_pe";
    pub const REQUEST_EMBODIED_GWP: &str = "request_embodied_gwp";
    pub const REQUEST_EMBODIED_ADPE: &str = "request_embodied_adpe";
    pub const REQUEST_EMBODIED_PE: &str = "request_embodied_pe";
    pub const REQUEST_EMBODIED_WATER: &str = "request_embodied_water";
}

/// Every leaf the graph may consume; used for startup validation.
pub const LEAVES: &[&str] = &[
    leaf::MODEL_ACTIVE_PARAMETER_COUNT,
    leaf::MODEL_TOTAL_PARAMETER_COUNT,
    leaf::OUTPUT_TOKEN_COUNT,
    leaf::REQUEST_LATENCY,
    leaf::IF_ELECTRICITY_MIX_ADPE,
    leaf::IF_ELECTRICITY_MIX_PE,
    leaf::IF_ELECTRICITY_MIX_GWP,
    leaf::IF_ELECTRICITY_MIX_WCF,
    leaf::PROVIDER_PUE,
    leaf::PROVIDER_WUE_ONSITE,
    leaf::MODEL_QUANTIZATION_BITS,
    leaf::GPU_ENERGY_ALPHA,
    leaf::GPU_ENERGY_BETA,
    leaf::GPU_ENERGY_STDEV,
    leaf::GPU_LATENCY_ALPHA,
    leaf::GPU_LATENCY_BETA,
    leaf::GPU_LATENCY_STDEV,
    leaf::GPU_MEMORY,
    leaf::GPU_EMBODIED_GWP,
    leaf::GPU_EMBODIED_ADPE,
    leaf::GPU_EMBODIED_PE,
    leaf::SERVER_GPU_COUNT,
    leaf::SERVER_POWER,
    leaf::SERVER_EMBODIED_GWP,
    leaf::SERVER_EMBODIED_ADPE,
    leaf::SERVER_EMBODIED_PE,
    leaf::SERVER_LIFETIME,
    leaf::WATER_FABRICATING_GPU,
    leaf::GPUS_IN_SERVER,
    leaf::BATCHING_SIZE,
];

// --- Formulas ---

/// 95% band of a per-token linear profile `tokens * (alpha * params + beta ± 1.96 stdev)`,
/// with the lower bound floored at zero.
fn linear_profile_band(
    active_params: BoundedValue,
    output_tokens: BoundedValue,
    alpha: BoundedValue,
    beta: BoundedValue,
    stdev: BoundedValue,
) -> Result<BoundedValue, InvalidRangeError> {
    let per_token_mean = alpha * active_params + beta;
    let low = output_tokens * (per_token_mean - stdev * Z_95);
    let high = output_tokens * (per_token_mean + stdev * Z_95);
    BoundedValue::interval(low.min().max(0.0), high.max())
}

/// Energy of a single GPU in kWh, as a 95% confidence interval.
pub fn gpu_energy(
    active_params: BoundedValue,
    output_tokens: BoundedValue,
    alpha: BoundedValue,
    beta: BoundedValue,
    stdev: BoundedValue,
) -> Result<BoundedValue, InvalidRangeError> {
    linear_profile_band(active_params, output_tokens, alpha, beta, stdev)
}

/// Token generation latency in seconds.
///
/// The estimated band is kept only while it stays entirely below the measured
/// request latency; otherwise the measured latency is the answer.
pub fn generation_latency(
    active_params: BoundedValue,
    output_tokens: BoundedValue,
    alpha: BoundedValue,
    beta: BoundedValue,
    stdev: BoundedValue,
    request_latency: BoundedValue,
) -> Result<BoundedValue, InvalidRangeError> {
    let band = linear_profile_band(active_params, output_tokens, alpha, beta, stdev)?;
    if band.is_below(request_latency.max()) {
        Ok(band)
    } else {
        Ok(request_latency)
    }
}

/// GPU memory (GB) needed to load the weights.
pub fn model_required_memory(total_params: BoundedValue, quantization_bits: BoundedValue) -> BoundedValue {
    MEMORY_OVERHEAD * total_params * quantization_bits / 8.0
}

pub fn gpu_required_count(required_memory: BoundedValue, gpu_memory: BoundedValue) -> BoundedValue {
    (required_memory / gpu_memory).map(f64::ceil)
}

/// Server energy in kWh (GPUs excluded), pro rata of the GPUs in use.
pub fn server_energy(
    generation_latency: BoundedValue,
    server_power: BoundedValue,
    server_gpu_count: BoundedValue,
    gpu_required_count: BoundedValue,
) -> BoundedValue {
    (generation_latency / SECONDS_PER_HOUR) * server_power * (gpu_required_count / server_gpu_count)
}

pub fn request_energy(
    provider_pue: BoundedValue,
    server_energy: BoundedValue,
    gpu_required_count: BoundedValue,
    gpu_energy: BoundedValue,
) -> BoundedValue {
    provider_pue * (server_energy + gpu_required_count * gpu_energy)
}

/// Scales request energy by a grid impact factor (gwp, adpe or pe).
pub fn request_usage(request_energy: BoundedValue, grid_factor: BoundedValue) -> BoundedValue {
    request_energy * grid_factor
}

/// Litres of water: on-site cooling plus off-site generation.
pub fn request_usage_water(
    request_energy: BoundedValue,
    wue_onsite: BoundedValue,
    provider_pue: BoundedValue,
    grid_wcf: BoundedValue,
) -> BoundedValue {
    request_energy * (wue_onsite + provider_pue * grid_wcf)
}

/// Embodied impact of the server share in use plus the GPUs themselves.
pub fn server_gpu_embodied(
    server_embodied: BoundedValue,
    server_gpu_count: BoundedValue,
    gpu_embodied: BoundedValue,
    gpu_required_count: BoundedValue,
) -> BoundedValue {
    (gpu_required_count / server_gpu_count) * server_embodied + gpu_required_count * gpu_embodied
}

/// Amortizes a hardware embodied impact over the hardware lifetime.
pub fn request_embodied(
    server_gpu_embodied: BoundedValue,
    server_lifetime: BoundedValue,
    generation_latency: BoundedValue,
) -> BoundedValue {
    (generation_latency / server_lifetime) * server_gpu_embodied
}

pub fn request_embodied_water(
    server_lifetime: BoundedValue,
    batching_size: BoundedValue,
    water_fabricating_gpu: BoundedValue,
    gpus_in_server: BoundedValue,
    generation_latency: BoundedValue,
) -> BoundedValue {
    generation_latency * water_fabricating_gpu * gpus_in_server / (server_lifetime * batching_size)
}

// --- Graph ---

fn args<const N: usize>(node: &str, values: &[BoundedValue]) -> Result<[BoundedValue; N], ComputationError> {
    <[BoundedValue; N]>::try_from(values).map_err(|_| ComputationError::InputCountMismatch {
        node: node.to_string(),
        expected: N,
        actual: values.len(),
    })
}

/// Registers the usage asset of one grid factor.
fn register_usage(dag: &mut AssetGraph<BoundedValue>, name: &'static str, grid_factor: &str) -> Result<(), ComputationError> {
    dag.register(name, &[asset::REQUEST_ENERGY, grid_factor], move |v: &[BoundedValue]| {
        let [energy, factor] = args::<2>(name, v)?;
        Ok(request_usage(energy, factor))
    })
}

/// Registers the hardware and per-request embodied assets of one metric.
fn register_embodied(
    dag: &mut AssetGraph<BoundedValue>,
    hardware: &'static str,
    request: &'static str,
    server_embodied: &str,
    gpu_embodied: &str,
) -> Result<(), ComputationError> {
    dag.register(
        hardware,
        &[server_embodied, leaf::SERVER_GPU_COUNT, gpu_embodied, asset::GPU_REQUIRED_COUNT],
        move |v: &[BoundedValue]| {
            let [server, server_gpus, gpu, gpus] = args::<4>(hardware, v)?;
            Ok(server_gpu_embodied(server, server_gpus, gpu, gpus))
        },
    )?;
    dag.register(
        request,
        &[hardware, leaf::SERVER_LIFETIME, asset::GENERATION_LATENCY],
        move |v: &[BoundedValue]| {
            let [embodied, lifetime, latency] = args::<3>(request, v)?;
            Ok(request_embodied(embodied, lifetime, latency))
        },
    )
}

/// Builds the LLM impact graph.
pub fn build_graph() -> Result<AssetGraph<BoundedValue>, ComputationError> {
    let mut dag = AssetGraph::new();

    dag.register(
        asset::GPU_ENERGY,
        &[
            leaf::MODEL_ACTIVE_PARAMETER_COUNT,
            leaf::OUTPUT_TOKEN_COUNT,
            leaf::GPU_ENERGY_ALPHA,
            leaf::GPU_ENERGY_BETA,
            leaf::GPU_ENERGY_STDEV,
        ],
        |v: &[BoundedValue]| {
            let [params, tokens, alpha, beta, stdev] = args::<5>(asset::GPU_ENERGY, v)?;
            Ok(gpu_energy(params, tokens, alpha, beta, stdev)?)
        },
    )?;

    dag.register(
        asset::GENERATION_LATENCY,
        &[
            leaf::MODEL_ACTIVE_PARAMETER_COUNT,
            leaf::OUTPUT_TOKEN_COUNT,
            leaf::GPU_LATENCY_ALPHA,
            leaf::GPU_LATENCY_BETA,
            leaf::GPU_LATENCY_STDEV,
            leaf::REQUEST_LATENCY,
        ],
        |v: &[BoundedValue]| {
            let [params, tokens, alpha, beta, stdev, measured] = args::<6>(asset::GENERATION_LATENCY, v)?;
            Ok(generation_latency(params, tokens, alpha, beta, stdev, measured)?)
        },
    )?;

    dag.register(
        asset::MODEL_REQUIRED_MEMORY,
        &[leaf::MODEL_TOTAL_PARAMETER_COUNT, leaf::MODEL_QUANTIZATION_BITS],
        |v: &[BoundedValue]| {
            let [params, bits] = args::<2>(asset::MODEL_REQUIRED_MEMORY, v)?;
            Ok(model_required_memory(params, bits))
        },
    )?;

    dag.register(
        asset::GPU_REQUIRED_COUNT,
        &[asset::MODEL_REQUIRED_MEMORY, leaf::GPU_MEMORY],
        |v: &[BoundedValue]| {
            let [memory, gpu_memory] = args::<2>(asset::GPU_REQUIRED_COUNT, v)?;
            Ok(gpu_required_count(memory, gpu_memory))
        },
    )?;

    dag.register(
        asset::SERVER_ENERGY,
        &[asset::GENERATION_LATENCY, leaf::SERVER_POWER, leaf::SERVER_GPU_COUNT, asset::GPU_REQUIRED_COUNT],
        |v: &[BoundedValue]| {
            let [latency, power, server_gpus, gpus] = args::<4>(asset::SERVER_ENERGY, v)?;
            Ok(server_energy(latency, power, server_gpus, gpus))
        },
    )?;

    dag.register(
        asset::REQUEST_ENERGY,
        &[leaf::PROVIDER_PUE, asset::SERVER_ENERGY, asset::GPU_REQUIRED_COUNT, asset::GPU_ENERGY],
        |v: &[BoundedValue]| {
            let [pue, server, gpus, gpu] = args::<4>(asset::REQUEST_ENERGY, v)?;
            Ok(request_energy(pue, server, gpus, gpu))
        },
    )?;

    register_usage(&mut dag, asset::REQUEST_USAGE_GWP, leaf::IF_ELECTRICITY_MIX_GWP)?;
    register_usage(&mut dag, asset::REQUEST_USAGE_ADPE, leaf::IF_ELECTRICITY_MIX_ADPE)?;
    register_usage(&mut dag, asset::REQUEST_USAGE_PE, leaf::IF_ELECTRICITY_MIX_PE)?;

    dag.register(
        asset::REQUEST_USAGE_WATER,
        &[asset::REQUEST_ENERGY, leaf::PROVIDER_WUE_ONSITE, leaf::PROVIDER_PUE, leaf::IF_ELECTRICITY_MIX_WCF],
        |v: &[BoundedValue]| {
            let [energy, wue, pue, wcf] = args::<4>(asset::REQUEST_USAGE_WATER, v)?;
            Ok(request_usage_water(energy, wue, pue, wcf))
        },
    )?;

    register_embodied(
        &mut dag,
        asset::SERVER_GPU_EMBODIED_GWP,
        asset::REQUEST_EMBODIED_GWP,
        leaf::SERVER_EMBODIED_GWP,
        leaf::GPU_EMBODIED_GWP,
    )?;
    register_embodied(
        &mut dag,
        asset::SERVER_GPU_EMBODIED_ADPE,
        asset::REQUEST_EMBODIED_ADPE,
        leaf::SERVER_EMBODIED_ADPE,
        leaf::GPU_EMBODIED_ADPE,
    )?;
    register_embodied(
        &mut dag,
        asset::SERVER_GPU_EMBODIED_PE,
        asset::REQUEST_EMBODIED_PE,
        leaf::SERVER_EMBODIED_PE,
        leaf::GPU_EMBODIED_PE,
    )?;

    dag.register(
        asset::REQUEST_EMBODIED_WATER,
        &[
            leaf::SERVER_LIFETIME,
            leaf::BATCHING_SIZE,
            leaf::WATER_FABRICATING_GPU,
            leaf::GPUS_IN_SERVER,
            asset::GENERATION_LATENCY,
        ],
        |v: &[BoundedValue]| {
            let [lifetime, batching, water, gpus, latency] = args::<5>(asset::REQUEST_EMBODIED_WATER, v)?;
            Ok(request_embodied_water(lifetime, batching, water, gpus, latency))
        },
    )?;

    Ok(dag)
}
