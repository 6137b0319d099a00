use crate::compute::Ledger;
use crate::graph::AssetGraph;
use std::collections::HashMap;
use std::fmt::{Display, Write};

/// Renders `target`, its value and, recursively, the values it was computed from.
///
/// Assets already printed higher up are shown as a reference to their level
/// instead of being expanded again.
pub fn format_trace<V: Display>(graph: &AssetGraph<V>, ledger: &Ledger<V>, target: &str) -> String {
    let mut tracer = Tracer {
        graph,
        ledger,
        visited_at_level: HashMap::new(),
        output: String::new(),
    };

    if graph.contains(target) || ledger.contains(target) {
        let _ = writeln!(tracer.output, "AUDIT TRACE for asset '{}':", target);
        let _ = writeln!(tracer.output, "--------------------------------------------------");
        tracer.trace_node(target, 1, "");
    } else {
        let _ = writeln!(tracer.output, "Error: Unknown asset '{}'", target);
    }
    tracer.output
}

struct Tracer<'a, V> {
    graph: &'a AssetGraph<V>,
    ledger: &'a Ledger<V>,
    visited_at_level: HashMap<String, usize>,
    output: String,
}

impl<'a, V: Display> Tracer<'a, V> {
    fn trace_node(&mut self, name: &str, level: usize, prefix: &str) {
        if let Some(&first_seen) = self.visited_at_level.get(name) {
            let _ = writeln!(self.output, "{}{} -> (Ref to L{})", prefix, name, first_seen);
            return;
        }
        self.visited_at_level.insert(name.to_string(), level);

        let value = match self.ledger.get(name) {
            Some(v) => format!("[{}]", v),
            None => "[not computed]".to_string(),
        };

        match self.graph.node(name) {
            Some(node) => {
                let _ = writeln!(self.output, "{}[L{}] {}{} = f({})", prefix, level, name, value, node.inputs().join(", "));
                let inputs: Vec<String> = node.inputs().to_vec();
                self.recurse_inputs(prefix, &inputs, level);
            }
            None => {
                let _ = writeln!(self.output, "{}[L{}] {}{} -> Leaf", prefix, level, name, value);
            }
        }
    }

    fn recurse_inputs(&mut self, prefix: &str, inputs: &[String], level: usize) {
        let stem = Self::build_child_stem(prefix);
        for (i, input) in inputs.iter().enumerate() {
            let connector = if i == inputs.len() - 1 { "`--" } else { "|--" };
            let full_prefix = format!("{}{}", stem, connector);
            self.trace_node(input, level + 1, &full_prefix);
        }
    }

    /// Turns a connector prefix into the indentation its children hang from.
    fn build_child_stem(prefix: &str) -> String {
        prefix.replace("`--", "   ").replace("|--", "|  ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_trace_shows_values_and_shared_references() {
        let mut graph: AssetGraph<f64> = AssetGraph::new();
        graph.register("double", &["x"], |v: &[f64]| Ok(v[0] * 2.0)).unwrap();
        graph.register("sum", &["double", "x"], |v: &[f64]| Ok(v[0] + v[1])).unwrap();
        let leaves: HashMap<String, f64> = [("x".to_string(), 2.0)].into_iter().collect();
        let ledger = graph.execute(&leaves).unwrap();

        let trace = format_trace(&graph, &ledger, "sum");

        assert!(trace.starts_with("AUDIT TRACE for asset 'sum':"));
        assert!(trace.contains("[L1] sum[6] = f(double, x)"), "{}", trace);
        assert!(trace.contains("|--[L2] double[4] = f(x)"), "{}", trace);
        assert!(trace.contains("|  `--[L3] x[2] -> Leaf"), "{}", trace);
        assert!(trace.contains("`--x -> (Ref to L3)"), "{}", trace);
    }

    #[test]
    fn test_trace_of_unknown_asset() {
        let graph: AssetGraph<f64> = AssetGraph::new();
        let trace = format_trace(&graph, &Ledger::new(), "missing");
        assert!(trace.contains("Unknown asset 'missing'"));
    }
}
