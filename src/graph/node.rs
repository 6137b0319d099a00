//! Defines the `AssetNode`, a single named computation step in the impact graph.

use crate::compute::ComputationError;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// The pure function behind an asset. It receives its input values in the
/// order the asset declared them.
pub type AssetFn<V> = Arc<dyn Fn(&[V]) -> Result<V, ComputationError> + Send + Sync>;

/// A named computation step.
///
/// A node is the "skeleton" of the model: it defines the formula and the names
/// of the values it consumes, but does not hold computed values (those live in
/// the `compute::Ledger` of a single evaluation). Nodes are immutable once
/// registered.
#[derive(Clone)]
pub struct AssetNode<V> {
    name: String,
    // Order is significant: it is the argument order of `func`.
    inputs: SmallVec<[String; 6]>,
    func: AssetFn<V>,
}

impl<V> AssetNode<V> {
    pub(crate) fn new(name: String, inputs: SmallVec<[String; 6]>, func: AssetFn<V>) -> Self {
        Self { name, inputs, func }
    }

    pub fn name(&self) -> &str { &self.name }

    pub fn inputs(&self) -> &[String] { &self.inputs }

    #[inline(always)]
    pub(crate) fn call(&self, args: &[V]) -> Result<V, ComputationError> {
        (self.func)(args)
    }
}

impl<V> fmt::Debug for AssetNode<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssetNode")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .finish_non_exhaustive()
    }
}
