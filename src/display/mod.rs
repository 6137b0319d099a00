//! Human-readable views of an evaluation.
pub mod trace;

pub use trace::format_trace;
