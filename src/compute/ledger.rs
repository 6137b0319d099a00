//! ledger.rs
//! Per-evaluation storage of leaf and asset values.

use crate::value::InvalidRangeError;
use std::collections::HashMap;

pub use self::error::ComputationError;
mod error {
    use super::*;
    use thiserror::Error;

    #[derive(Error, Debug, Clone, PartialEq)]
    pub enum ComputationError {
        #[error("Asset '{0}' is already registered")]
        DuplicateNode(String),
        #[error("Cycle detected while resolving '{0}'")]
        CycleDetected(String),
        #[error("Input '{input}' of asset '{node}' is neither a registered asset nor a supplied leaf")]
        UnresolvedInput { node: String, input: String },
        #[error("Unknown asset '{0}'")]
        UnknownAsset(String),
        #[error("Asset '{node}' expects {expected} inputs, got {actual}")]
        InputCountMismatch { node: String, expected: usize, actual: usize },
        #[error(transparent)]
        InvalidRange(#[from] InvalidRangeError),
        #[error("Asset '{node}' failed: {source}")]
        AssetFailed { node: String, source: Box<ComputationError> },
    }
}

/// The ExecutionCache of one evaluation call.
///
/// Created fresh by every `ComputationEngine::compute`, so no state is shared
/// between calls. Holds the supplied leaves and every computed asset.
#[derive(Debug, Clone)]
pub struct Ledger<V> {
    values: HashMap<String, V>,
}

impl<V> Default for Ledger<V> {
    fn default() -> Self {
        Self { values: HashMap::new() }
    }
}

impl<V> Ledger<V> {
    pub fn new() -> Self { Self::default() }

    pub fn with_capacity(size: usize) -> Self {
        Self { values: HashMap::with_capacity(size) }
    }

    #[inline(always)]
    pub fn get(&self, name: &str) -> Option<&V> {
        self.values.get(name)
    }

    #[inline(always)]
    pub fn insert(&mut self, name: impl Into<String>, value: V) {
        self.values.insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize { self.values.len() }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn into_inner(self) -> HashMap<String, V> {
        self.values
    }
}
