//! Defines the core data structures for the asset graph.
pub mod dag;
pub mod node;

// Re-export key types for convenient access
pub use dag::AssetGraph;
pub use node::{AssetFn, AssetNode};
