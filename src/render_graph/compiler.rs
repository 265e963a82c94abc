//! Render graph compilation.
//!
//! This module validates a [`RenderGraph`] description the way the host does
//! before executing it and produces an execution plan ([`CompiledGraph`]).
//!
//! The compiler performs:
//!
//! 1. **Reference check** - every edge endpoint and output names an existing pass
//! 2. **Input check** - an input field is fed by at most one data edge
//! 3. **Topological sort** - order passes respecting dependencies
//! 4. **Cycle detection** - the pass dependency graph must be a DAG
//!
//! Passes that become ready at the same time are ordered by creation, so the
//! result is deterministic.

use std::collections::BTreeSet;

use crate::error::{GraphError, Result};

use super::field::{EdgeKind, FieldRef};
use super::graph::RenderGraph;
use super::pass::PassHandle;

/// A compiled render graph: a topologically sorted pass order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CompiledGraph {
    pass_order: Vec<PassHandle>,
}

impl CompiledGraph {
    /// Pass execution order as handles into the compiled graph.
    pub fn pass_order(&self) -> &[PassHandle] {
        &self.pass_order
    }

    /// Number of passes in the order.
    pub fn pass_count(&self) -> usize {
        self.pass_order.len()
    }

    /// True for a graph without passes.
    pub fn is_empty(&self) -> bool {
        self.pass_order.is_empty()
    }

    /// Resolve the pass order to instance names.
    ///
    /// `graph` must be the graph this plan was compiled from.
    pub fn pass_names<'g>(&self, graph: &'g RenderGraph) -> Vec<&'g str> {
        self.pass_order
            .iter()
            .filter_map(|&handle| graph.pass_by_handle(handle))
            .map(|pass| pass.name())
            .collect()
    }
}

/// Compile a render graph into an execution plan.
///
/// # Returns
///
/// * `Ok(CompiledGraph)` - pass order ready for sequential execution
/// * `Err(GraphError::UnknownPass)` - an edge or output names a missing pass
/// * `Err(GraphError::InputAlreadyConnected)` - an input has two producers
/// * `Err(GraphError::CyclicDependency)` - the graph contains a cycle
pub fn compile(graph: &RenderGraph) -> Result<CompiledGraph> {
    let resolve = |field: &FieldRef| {
        graph
            .pass_handle(field.pass())
            .ok_or_else(|| GraphError::UnknownPass(field.pass().to_string()))
    };

    // (dependent, dependency) pairs
    let mut dependencies: Vec<(PassHandle, PassHandle)> = Vec::new();
    let mut connected_inputs: Vec<&FieldRef> = Vec::new();

    for edge in graph.edges() {
        let dependency = resolve(edge.src())?;
        let dependent = resolve(edge.dst())?;

        if edge.kind() == EdgeKind::Data {
            if connected_inputs.contains(&edge.dst()) {
                return Err(GraphError::InputAlreadyConnected(edge.dst().to_string()));
            }
            connected_inputs.push(edge.dst());
        }

        if !dependencies.contains(&(dependent, dependency)) {
            dependencies.push((dependent, dependency));
        }
    }

    for output in graph.outputs() {
        resolve(output)?;
    }

    let pass_order = sort_passes(graph.pass_count(), &dependencies)?;
    log::debug!(
        "{}: compiled {} passes, {} dependencies",
        graph.name(),
        pass_order.len(),
        dependencies.len()
    );

    Ok(CompiledGraph { pass_order })
}

/// Kahn's algorithm over `n` passes.
fn sort_passes(n: usize, dependencies: &[(PassHandle, PassHandle)]) -> Result<Vec<PassHandle>> {
    let mut in_degree = vec![0u32; n];
    for &(dependent, _dependency) in dependencies {
        in_degree[dependent.index()] += 1;
    }

    let mut ready: BTreeSet<PassHandle> = (0..n as u32)
        .map(PassHandle::new)
        .filter(|h| in_degree[h.index()] == 0)
        .collect();

    let mut order = Vec::with_capacity(n);
    while let Some(handle) = ready.pop_first() {
        order.push(handle);

        for &(dependent, dependency) in dependencies {
            if dependency == handle {
                in_degree[dependent.index()] -= 1;
                if in_degree[dependent.index()] == 0 {
                    ready.insert(dependent);
                }
            }
        }
    }

    // Passes left unprocessed sit on a cycle.
    if order.len() != n {
        return Err(GraphError::CyclicDependency);
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_graph::pass::PassConfig;

    fn graph_with(passes: &[&str]) -> RenderGraph {
        let mut graph = RenderGraph::new("test");
        for name in passes {
            graph.create_pass("Pass", *name, PassConfig::new()).unwrap();
        }
        graph
    }

    #[test]
    fn test_compile_empty_graph() {
        let graph = RenderGraph::new("empty");
        let compiled = compile(&graph).unwrap();
        assert!(compiled.is_empty());
        assert_eq!(compiled.pass_count(), 0);
    }

    #[test]
    fn test_compile_linear_chain() {
        // C -> B -> A, created in reverse
        let mut graph = graph_with(&["A", "B", "C"]);
        graph.add_edge("C.out", "B.in").unwrap();
        graph.add_edge("B.out", "A.in").unwrap();

        let compiled = compile(&graph).unwrap();
        assert_eq!(compiled.pass_names(&graph), ["C", "B", "A"]);
    }

    #[test]
    fn test_compile_diamond_dependency() {
        //     A
        //    / \
        //   B   C
        //    \ /
        //     D
        let mut graph = graph_with(&["D", "C", "B", "A"]);
        graph.add_edge("A.out", "B.in").unwrap();
        graph.add_edge("A.out", "C.in").unwrap();
        graph.add_edge("B.out", "D.left").unwrap();
        graph.add_edge("C.out", "D.right").unwrap();

        let compiled = compile(&graph).unwrap();
        // B and C become ready together; creation order puts C first.
        assert_eq!(compiled.pass_names(&graph), ["A", "C", "B", "D"]);
    }

    #[test]
    fn test_compile_independent_passes_keep_creation_order() {
        let graph = graph_with(&["A", "B", "C"]);
        let compiled = compile(&graph).unwrap();
        assert_eq!(compiled.pass_names(&graph), ["A", "B", "C"]);
    }

    #[test]
    fn test_compile_execution_edges() {
        let mut graph = graph_with(&["A", "B"]);
        graph.add_edge("B", "A").unwrap();

        let compiled = compile(&graph).unwrap();
        assert_eq!(compiled.pass_names(&graph), ["B", "A"]);
    }

    #[test]
    fn test_compile_cycle_two_nodes() {
        let mut graph = graph_with(&["A", "B"]);
        graph.add_edge("A.out", "B.in").unwrap();
        graph.add_edge("B.out", "A.in").unwrap();

        assert!(matches!(compile(&graph), Err(GraphError::CyclicDependency)));
    }

    #[test]
    fn test_compile_partial_cycle() {
        // D is independent, but A-B-C form a cycle
        let mut graph = graph_with(&["A", "B", "C", "D"]);
        graph.add_edge("A", "B").unwrap();
        graph.add_edge("B", "C").unwrap();
        graph.add_edge("C", "A").unwrap();

        assert!(matches!(compile(&graph), Err(GraphError::CyclicDependency)));
    }

    #[test]
    fn test_compile_self_edge_is_cycle() {
        let mut graph = graph_with(&["A"]);
        graph.add_edge("A.out", "A.in").unwrap();

        assert!(matches!(compile(&graph), Err(GraphError::CyclicDependency)));
    }

    #[test]
    fn test_compile_rejects_second_producer() {
        let mut graph = graph_with(&["A", "B", "C"]);
        graph.add_edge("A.out", "C.in").unwrap();
        graph.add_edge("B.out", "C.in").unwrap();

        assert!(matches!(
            compile(&graph),
            Err(GraphError::InputAlreadyConnected(input)) if input == "C.in"
        ));
    }

    #[test]
    fn test_compile_fanout_is_allowed() {
        let mut graph = graph_with(&["A", "B", "C"]);
        graph.add_edge("A.out", "B.in").unwrap();
        graph.add_edge("A.out", "C.in").unwrap();

        assert!(compile(&graph).is_ok());
    }

    #[test]
    fn test_compile_rejects_unknown_output_pass() {
        let mut graph = graph_with(&["A"]);
        graph.mark_output("Missing.color").unwrap();

        assert!(matches!(
            compile(&graph),
            Err(GraphError::UnknownPass(name)) if name == "Missing"
        ));
    }
}
