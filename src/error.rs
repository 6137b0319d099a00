//! Errors surfaced by the impact computation entry points.
use crate::compute::ComputationError;
use crate::value::InvalidRangeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImpactError {
    #[error("Unknown provider '{0}'")]
    UnknownProvider(String),
    #[error("Unknown data-center operator '{0}'")]
    UnknownOperator(String),
    #[error("Graph evaluation failed: {0}")]
    Computation(#[from] ComputationError),
    #[error(transparent)]
    InvalidRange(#[from] InvalidRangeError),
    #[error("Evaluation produced no value for '{0}'")]
    MissingOutput(String),
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
