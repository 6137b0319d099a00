//! A synchronous, single-threaded evaluation engine for the asset graph.
use crate::compute::ledger::{ComputationError, Ledger};
use crate::graph::AssetGraph;
use smallvec::SmallVec;
use std::collections::{HashMap, HashSet};
use tracing::debug;

pub struct ComputationEngine<'a, V> {
    graph: &'a AssetGraph<V>,
}

impl<'a, V: Clone> ComputationEngine<'a, V> {
    pub fn new(graph: &'a AssetGraph<V>) -> Self {
        Self { graph }
    }

    /// Computes the values of `targets`, calculating their dependencies as needed.
    ///
    /// A recursive DFS builds the evaluation order on the fly; each asset is
    /// then run exactly once, no matter how many downstream assets consume it.
    /// An input name resolves to a registered asset first, then to `leaves`.
    pub fn compute(&self, targets: &[&str], leaves: &HashMap<String, V>) -> Result<Ledger<V>, ComputationError> {
        let mut eval_order = Vec::with_capacity(self.graph.len());
        let mut visiting = HashSet::new(); // For cycle detection
        let mut visited = HashSet::new(); // For memoization

        for &target in targets {
            if self.graph.index_of(target).is_none() && !leaves.contains_key(target) {
                return Err(ComputationError::UnknownAsset(target.to_string()));
            }
            self.build_eval_order_dfs(target, None, leaves, &mut eval_order, &mut visiting, &mut visited)?;
        }
        debug!(assets = eval_order.len(), leaves = leaves.len(), "evaluating asset graph");

        let mut ledger = Ledger::with_capacity(leaves.len() + eval_order.len());
        for (name, value) in leaves {
            if !self.graph.contains(name) {
                ledger.insert(name.clone(), value.clone());
            }
        }

        for &idx in &eval_order {
            let node = self.graph.node_at(idx);
            // The DFS ensures every input is already in the ledger.
            let mut args: SmallVec<[V; 8]> = SmallVec::with_capacity(node.inputs().len());
            for input in node.inputs() {
                let value = ledger.get(input).ok_or_else(|| ComputationError::UnresolvedInput {
                    node: node.name().to_string(),
                    input: input.clone(),
                })?;
                args.push(value.clone());
            }

            let value = node.call(&args).map_err(|e| ComputationError::AssetFailed {
                node: node.name().to_string(),
                source: Box::new(e),
            })?;
            ledger.insert(node.name(), value);
        }

        Ok(ledger)
    }

    /// Post-order DFS over declared inputs, which yields a topological order.
    fn build_eval_order_dfs(
        &self,
        name: &str,
        requested_by: Option<&str>,
        leaves: &HashMap<String, V>,
        eval_order: &mut Vec<usize>,
        visiting: &mut HashSet<usize>,
        visited: &mut HashSet<usize>,
    ) -> Result<(), ComputationError> {
        let Some(idx) = self.graph.index_of(name) else {
            if leaves.contains_key(name) {
                return Ok(());
            }
            return Err(ComputationError::UnresolvedInput {
                node: requested_by.unwrap_or(name).to_string(),
                input: name.to_string(),
            });
        };

        if visited.contains(&idx) {
            return Ok(());
        }
        // Re-entering a node still on the stack means a cycle.
        if !visiting.insert(idx) {
            return Err(ComputationError::CycleDetected(name.to_string()));
        }

        let node = self.graph.node_at(idx);
        for input in node.inputs() {
            self.build_eval_order_dfs(input, Some(node.name()), leaves, eval_order, visiting, visited)?;
        }

        visiting.remove(&idx);
        visited.insert(idx);
        eval_order.push(idx);
        Ok(())
    }
}
