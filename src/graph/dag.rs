//! dag.rs
//! The registry of named assets plus the graph-level algorithms run on it.

use super::node::{AssetFn, AssetNode};
use crate::compute::{ComputationEngine, ComputationError, Ledger};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// A fixed set of named assets, each declaring the names of the values it needs.
///
/// Registration order is preserved and used as the default evaluation target
/// order, so `execute` is deterministic for identical inputs.
pub struct AssetGraph<V> {
    nodes: Vec<AssetNode<V>>,
    index: HashMap<String, usize>,
}

impl<V> Default for AssetGraph<V> {
    fn default() -> Self {
        Self { nodes: Vec::new(), index: HashMap::new() }
    }
}

impl<V> std::fmt::Debug for AssetGraph<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetGraph").field("nodes", &self.nodes).finish()
    }
}

impl<V: Clone> AssetGraph<V> {
    pub fn new() -> Self { Self::default() }

    /// Adds an asset. Fails if an asset with the same name already exists.
    pub fn register<F>(&mut self, name: &str, inputs: &[&str], func: F) -> Result<(), ComputationError>
    where
        F: Fn(&[V]) -> Result<V, ComputationError> + Send + Sync + 'static,
    {
        if self.index.contains_key(name) {
            return Err(ComputationError::DuplicateNode(name.to_string()));
        }
        let inputs: SmallVec<[String; 6]> = inputs.iter().map(|s| s.to_string()).collect();
        let func: AssetFn<V> = Arc::new(func);

        self.index.insert(name.to_string(), self.nodes.len());
        self.nodes.push(AssetNode::new(name.to_string(), inputs, func));
        Ok(())
    }

    /// Evaluates every registered asset against the supplied leaf values.
    ///
    /// The returned ledger holds every asset and every leaf.
    pub fn execute(&self, leaves: &HashMap<String, V>) -> Result<Ledger<V>, ComputationError> {
        let targets: Vec<&str> = self.names().collect();
        self.execute_targets(&targets, leaves)
    }

    /// Evaluates only the assets reachable from `targets`.
    pub fn execute_targets(&self, targets: &[&str], leaves: &HashMap<String, V>) -> Result<Ledger<V>, ComputationError> {
        ComputationEngine::new(self).compute(targets, leaves)
    }
}

impl<V> AssetGraph<V> {
    pub fn len(&self) -> usize { self.nodes.len() }

    pub fn is_empty(&self) -> bool { self.nodes.is_empty() }

    pub fn contains(&self, name: &str) -> bool { self.index.contains_key(name) }

    pub fn node(&self, name: &str) -> Option<&AssetNode<V>> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn node_at(&self, idx: usize) -> &AssetNode<V> {
        &self.nodes[idx]
    }

    /// Asset names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.name())
    }

    /// Static check run once at startup, before any evaluation.
    ///
    /// Every declared input must be either a registered asset or one of the
    /// documented `leaves`, and the asset dependencies must be acyclic.
    /// Returns the asset names in a valid evaluation order.
    pub fn validate(&self, leaves: &[&str]) -> Result<Vec<String>, ComputationError> {
        let leaves: HashSet<&str> = leaves.iter().copied().collect();
        let mut deps: DiGraph<usize, ()> = DiGraph::with_capacity(self.nodes.len(), 0);
        let ids: Vec<NodeIndex> = (0..self.nodes.len()).map(|i| deps.add_node(i)).collect();

        for (i, node) in self.nodes.iter().enumerate() {
            for input in node.inputs() {
                match self.index.get(input) {
                    Some(&parent) => {
                        deps.add_edge(ids[parent], ids[i], ());
                    }
                    None if leaves.contains(input.as_str()) => {}
                    None => {
                        return Err(ComputationError::UnresolvedInput {
                            node: node.name().to_string(),
                            input: input.clone(),
                        })
                    }
                }
            }
        }

        let order = toposort(&deps, None).map_err(|cycle| {
            let idx = deps[cycle.node_id()];
            ComputationError::CycleDetected(self.nodes[idx].name().to_string())
        })?;

        Ok(order.into_iter().map(|id| self.nodes[deps[id]].name().to_string()).collect())
    }
}
