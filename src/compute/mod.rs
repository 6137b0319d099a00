//! Executes the asset graph.
pub mod engine;
pub mod ledger;

pub use engine::ComputationEngine;
pub use ledger::{ComputationError, Ledger};
