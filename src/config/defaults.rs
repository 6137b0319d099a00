//! Default calibration of the LLM inference model.

pub const MODEL_QUANTIZATION_BITS: f64 = 4.0;

pub const GPU_ENERGY_ALPHA: f64 = 8.91e-8;
pub const GPU_ENERGY_BETA: f64 = 1.43e-6;
pub const GPU_ENERGY_STDEV: f64 = 5.19e-7;
pub const GPU_LATENCY_ALPHA: f64 = 8.02e-4;
pub const GPU_LATENCY_BETA: f64 = 2.23e-2;
pub const GPU_LATENCY_STDEV: f64 = 7.00e-6;

pub const GPU_MEMORY: f64 = 80.0; // GB
pub const GPU_EMBODIED_IMPACT_GWP: f64 = 143.0;
pub const GPU_EMBODIED_IMPACT_ADPE: f64 = 5.1e-3;
pub const GPU_EMBODIED_IMPACT_PE: f64 = 1828.0;

pub const SERVER_GPUS: f64 = 8.0;
pub const SERVER_POWER: f64 = 1.0; // kW
pub const SERVER_EMBODIED_IMPACT_GWP: f64 = 3000.0;
pub const SERVER_EMBODIED_IMPACT_ADPE: f64 = 0.24;
pub const SERVER_EMBODIED_IMPACT_PE: f64 = 38000.0;

/// Five years, in seconds.
pub const HARDWARE_LIFESPAN: f64 = 5.0 * 365.0 * 24.0 * 60.0 * 60.0;

/// Requests served concurrently by one server.
pub const BATCHING_SIZE: f64 = 16.0;
pub const GPUS_IN_SERVER: f64 = 8.0;

/// Litres of water per fabricated GPU die: 176.4 L per 300mm wafer mask layer
/// spread over ~314 dies of 15x15mm.
pub const WATER_FABRICATING_GPU: f64 = 0.56178343949;

/// Data-center operators: (name, PUE, on-site WUE in L/kWh).
pub const OPERATORS: &[(&str, f64, f64)] = &[
    ("Google", 1.09, 0.916),
    ("Meta", 1.09, 0.18),
    ("Microsoft", 1.18, 0.49),
    ("OVHCloud", 1.26, 0.37),
    ("Scaleway", 1.37, 0.216),
    ("AWS", 1.15, 0.18),
    ("Equinix", 1.42, 1.07),
];

/// AI service provider -> data-center operator hosting it.
pub const PROVIDERS: &[(&str, &str)] = &[
    ("anthropic", "Google"),
    ("mistralai", "OVHCloud"),
    ("cohere", "AWS"),
    ("databricks", "Microsoft"),
    ("meta", "Meta"),
    ("azureopenai", "Microsoft"),
    ("huggingface_hub", "AWS"),
    ("google", "Google"),
    ("microsoft", "Microsoft"),
    ("openai", "Microsoft"),
    ("litellm", "AWS"),
];
