//! Render graph description.

use std::fmt;

use serde::Serialize;

use crate::error::{GraphError, Result};

use super::compiler::{self, CompiledGraph};
use super::field::{Edge, FieldRef};
use super::pass::{PassConfig, PassHandle, PassNode};

/// A named render graph: pass instances, the edges between their fields,
/// and the fields exposed as graph outputs.
///
/// The graph is a description only. The passes are implemented and executed
/// by the host framework.
///
/// # Construction
///
/// ```
/// use restir_fg_graph::{PassConfig, RenderGraph};
///
/// let mut graph = RenderGraph::new("Example");
/// graph.create_pass("VBufferRT", "VBufferRT", PassConfig::new().with("sampleCount", 16))?;
/// graph.create_pass("ReSTIR_FG", "ReSTIR_FG", PassConfig::new())?;
/// graph.add_edge("VBufferRT.vbuffer", "ReSTIR_FG.vbuffer")?;
/// graph.mark_output("ReSTIR_FG.color")?;
///
/// let compiled = graph.compile()?;
/// assert_eq!(compiled.pass_count(), 2);
/// # Ok::<(), restir_fg_graph::GraphError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderGraph {
    name: String,
    passes: Vec<PassNode>,
    edges: Vec<Edge>,
    outputs: Vec<FieldRef>,
}

impl RenderGraph {
    /// Create a new empty render graph.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passes: Vec::new(),
            edges: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Graph name, as registered with the host.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a pass instance of the given host pass type.
    ///
    /// Instance names must be unique within the graph.
    pub fn create_pass(
        &mut self,
        pass_type: impl Into<String>,
        name: impl Into<String>,
        config: PassConfig,
    ) -> Result<PassHandle> {
        let name = name.into();
        if self.pass(&name).is_some() {
            return Err(GraphError::DuplicatePass(name));
        }

        let pass = PassNode::new(pass_type, name, config);
        log::debug!(
            "{}: create pass '{}' ({}, {} options)",
            self.name,
            pass.name(),
            pass.pass_type(),
            pass.config().len()
        );

        let index = self.passes.len() as u32;
        self.passes.push(pass);
        Ok(PassHandle::new(index))
    }

    /// Remove a pass together with every edge and output marker naming it.
    ///
    /// Handles of passes created after the removed one are invalidated.
    pub fn remove_pass(&mut self, name: &str) -> Result<PassNode> {
        let index = self
            .passes
            .iter()
            .position(|p| p.name() == name)
            .ok_or_else(|| GraphError::UnknownPass(name.to_string()))?;

        self.edges.retain(|edge| !edge.touches(name));
        self.outputs.retain(|output| !output.refers_to(name));

        log::debug!("{}: remove pass '{}'", self.name, name);
        Ok(self.passes.remove(index))
    }

    /// Replace the configuration of a pass, returning the previous one.
    pub fn update_pass(&mut self, name: &str, config: PassConfig) -> Result<PassConfig> {
        let pass = self
            .passes
            .iter_mut()
            .find(|p| p.name() == name)
            .ok_or_else(|| GraphError::UnknownPass(name.to_string()))?;

        log::debug!("{}: update pass '{}'", self.name, name);
        Ok(pass.set_config(config))
    }

    /// Connect `src` to `dst`.
    ///
    /// `Pass.field` to `Pass.field` is a data edge, `Pass` to `Pass` an
    /// execution edge. The named passes may be created later; dangling
    /// references are reported by [`compile`](Self::compile).
    pub fn add_edge(&mut self, src: &str, dst: &str) -> Result<()> {
        let edge = Edge::new(FieldRef::parse(src)?, FieldRef::parse(dst)?)?;
        if self.edges.contains(&edge) {
            return Err(GraphError::DuplicateEdge {
                src: src.to_string(),
                dst: dst.to_string(),
            });
        }

        log::debug!("{}: add edge {}", self.name, edge);
        self.edges.push(edge);
        Ok(())
    }

    /// Remove the edge from `src` to `dst`.
    pub fn remove_edge(&mut self, src: &str, dst: &str) -> Result<()> {
        let edge = Edge::new(FieldRef::parse(src)?, FieldRef::parse(dst)?)?;
        let index = self
            .edges
            .iter()
            .position(|e| *e == edge)
            .ok_or_else(|| GraphError::EdgeNotFound {
                src: src.to_string(),
                dst: dst.to_string(),
            })?;

        log::debug!("{}: remove edge {}", self.name, edge);
        self.edges.remove(index);
        Ok(())
    }

    /// Expose a pass field as a graph output.
    pub fn mark_output(&mut self, field: &str) -> Result<()> {
        let output = FieldRef::parse(field)?;
        if !output.is_field() {
            return Err(GraphError::PassFieldAsOutput(field.to_string()));
        }
        if self.outputs.contains(&output) {
            return Err(GraphError::DuplicateOutput(field.to_string()));
        }

        log::debug!("{}: mark output {}", self.name, output);
        self.outputs.push(output);
        Ok(())
    }

    /// Stop exposing a pass field as a graph output.
    pub fn unmark_output(&mut self, field: &str) -> Result<()> {
        let output = FieldRef::parse(field)?;
        let index = self
            .outputs
            .iter()
            .position(|o| *o == output)
            .ok_or_else(|| GraphError::OutputNotMarked(field.to_string()))?;

        log::debug!("{}: unmark output {}", self.name, output);
        self.outputs.remove(index);
        Ok(())
    }

    /// Look up a pass by instance name.
    pub fn pass(&self, name: &str) -> Option<&PassNode> {
        self.passes.iter().find(|p| p.name() == name)
    }

    /// Get the handle of a pass by instance name.
    pub fn pass_handle(&self, name: &str) -> Option<PassHandle> {
        self.passes
            .iter()
            .position(|p| p.name() == name)
            .map(|index| PassHandle::new(index as u32))
    }

    /// Look up a pass by handle.
    pub fn pass_by_handle(&self, handle: PassHandle) -> Option<&PassNode> {
        self.passes.get(handle.index())
    }

    /// All passes in creation order.
    pub fn passes(&self) -> &[PassNode] {
        &self.passes
    }

    /// All edges in insertion order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Output markers in marking order.
    pub fn outputs(&self) -> &[FieldRef] {
        &self.outputs
    }

    /// True if `field` is marked as a graph output. Malformed references
    /// are never outputs.
    pub fn is_output(&self, field: &str) -> bool {
        FieldRef::parse(field).is_ok_and(|output| self.outputs.contains(&output))
    }

    /// Number of passes.
    pub fn pass_count(&self) -> usize {
        self.passes.len()
    }

    /// Names of the passes `name` directly depends on, without duplicates,
    /// in edge order.
    pub fn dependencies<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        let mut seen: Vec<&str> = Vec::new();
        self.edges
            .iter()
            .filter(move |edge| edge.dst().refers_to(name))
            .map(|edge| edge.src().pass())
            .filter(move |pass| {
                if seen.contains(pass) {
                    false
                } else {
                    seen.push(*pass);
                    true
                }
            })
    }

    /// Validate the graph and compute the pass execution order.
    pub fn compile(&self) -> Result<CompiledGraph> {
        compiler::compile(self)
    }

    /// Remove all passes, edges and outputs, keeping the name.
    pub fn clear(&mut self) {
        self.passes.clear();
        self.edges.clear();
        self.outputs.clear();
    }
}

/// Human-readable listing of the graph.
impl fmt::Display for RenderGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} ({} passes, {} edges, {} outputs)",
            self.name,
            self.passes.len(),
            self.edges.len(),
            self.outputs.len()
        )?;
        for pass in &self.passes {
            write!(f, "  pass {}: {}", pass.name(), pass.pass_type())?;
            for (i, (key, value)) in pass.config().iter().enumerate() {
                let sep = if i == 0 { " {" } else { ", " };
                write!(f, "{sep}{key}={value}")?;
            }
            if !pass.config().is_empty() {
                f.write_str("}")?;
            }
            writeln!(f)?;
        }
        for edge in &self.edges {
            writeln!(f, "  edge {edge}")?;
        }
        for output in &self.outputs {
            writeln!(f, "  output {output}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_graph::field::EdgeKind;
    use crate::render_graph::pass::PassOption;

    fn two_pass_graph() -> RenderGraph {
        let mut graph = RenderGraph::new("test");
        graph
            .create_pass("VBufferRT", "VBufferRT", PassConfig::new())
            .unwrap();
        graph
            .create_pass("ReSTIR_FG", "ReSTIR_FG", PassConfig::new())
            .unwrap();
        graph
    }

    #[test]
    fn test_create_pass() {
        let mut graph = RenderGraph::new("test");
        let handle = graph
            .create_pass("ToneMapper", "tonemap", PassConfig::new().with("clamp", true))
            .unwrap();

        assert_eq!(graph.pass_count(), 1);
        assert_eq!(handle.index(), 0);
        let pass = graph.pass_by_handle(handle).unwrap();
        assert_eq!(pass.pass_type(), "ToneMapper");
        assert_eq!(pass.name(), "tonemap");
        assert_eq!(pass.config().get("clamp"), Some(&PassOption::Bool(true)));
    }

    #[test]
    fn test_create_pass_duplicate_name() {
        let mut graph = two_pass_graph();
        let result = graph.create_pass("ToneMapper", "VBufferRT", PassConfig::new());
        assert!(matches!(result, Err(GraphError::DuplicatePass(name)) if name == "VBufferRT"));
        assert_eq!(graph.pass_count(), 2);
    }

    #[test]
    fn test_add_edge() {
        let mut graph = two_pass_graph();
        graph.add_edge("VBufferRT.mvec", "ReSTIR_FG.mvec").unwrap();

        assert_eq!(graph.edges().len(), 1);
        assert_eq!(graph.edges()[0].kind(), EdgeKind::Data);
        assert_eq!(graph.edges()[0].src().to_string(), "VBufferRT.mvec");
    }

    #[test]
    fn test_add_execution_edge() {
        let mut graph = two_pass_graph();
        graph.add_edge("VBufferRT", "ReSTIR_FG").unwrap();
        assert_eq!(graph.edges()[0].kind(), EdgeKind::Execution);
    }

    #[test]
    fn test_add_edge_rejects_duplicates_and_malformed() {
        let mut graph = two_pass_graph();
        graph.add_edge("VBufferRT.mvec", "ReSTIR_FG.mvec").unwrap();

        assert!(matches!(
            graph.add_edge("VBufferRT.mvec", "ReSTIR_FG.mvec"),
            Err(GraphError::DuplicateEdge { .. })
        ));
        assert!(matches!(
            graph.add_edge("VBufferRT.", "ReSTIR_FG.mvec"),
            Err(GraphError::InvalidFieldRef(_))
        ));
        assert!(matches!(
            graph.add_edge("VBufferRT.mvec", "ReSTIR_FG"),
            Err(GraphError::MixedEdge { .. })
        ));
        assert_eq!(graph.edges().len(), 1);
    }

    #[test]
    fn test_add_edge_to_missing_pass_is_deferred() {
        let mut graph = two_pass_graph();
        graph.add_edge("ReSTIR_FG.color", "AccumulatePass.input").unwrap();
        assert!(matches!(graph.compile(), Err(GraphError::UnknownPass(name)) if name == "AccumulatePass"));
    }

    #[test]
    fn test_remove_edge() {
        let mut graph = two_pass_graph();
        graph.add_edge("VBufferRT.mvec", "ReSTIR_FG.mvec").unwrap();

        graph.remove_edge("VBufferRT.mvec", "ReSTIR_FG.mvec").unwrap();
        assert!(graph.edges().is_empty());
        assert!(matches!(
            graph.remove_edge("VBufferRT.mvec", "ReSTIR_FG.mvec"),
            Err(GraphError::EdgeNotFound { .. })
        ));
    }

    #[test]
    fn test_mark_and_unmark_output() {
        let mut graph = two_pass_graph();
        graph.mark_output("ReSTIR_FG.color").unwrap();
        assert!(graph.is_output("ReSTIR_FG.color"));

        assert!(matches!(
            graph.mark_output("ReSTIR_FG.color"),
            Err(GraphError::DuplicateOutput(_))
        ));
        assert!(matches!(
            graph.mark_output("ReSTIR_FG"),
            Err(GraphError::PassFieldAsOutput(_))
        ));

        graph.unmark_output("ReSTIR_FG.color").unwrap();
        assert!(!graph.is_output("ReSTIR_FG.color"));
        assert!(matches!(
            graph.unmark_output("ReSTIR_FG.color"),
            Err(GraphError::OutputNotMarked(_))
        ));
    }

    #[test]
    fn test_remove_pass_cascades() {
        let mut graph = two_pass_graph();
        graph
            .create_pass("AccumulatePass", "AccumulatePass", PassConfig::new())
            .unwrap();
        graph.add_edge("VBufferRT.mvec", "ReSTIR_FG.mvec").unwrap();
        graph.add_edge("ReSTIR_FG.color", "AccumulatePass.input").unwrap();
        graph.mark_output("ReSTIR_FG.color").unwrap();
        graph.mark_output("AccumulatePass.output").unwrap();

        let removed = graph.remove_pass("ReSTIR_FG").unwrap();

        assert_eq!(removed.name(), "ReSTIR_FG");
        assert_eq!(graph.pass_count(), 2);
        assert!(graph.edges().is_empty());
        assert_eq!(graph.outputs().len(), 1);
        assert_eq!(graph.outputs()[0].to_string(), "AccumulatePass.output");
        assert_eq!(graph.pass_handle("AccumulatePass").map(PassHandle::index), Some(1));
        assert!(matches!(graph.remove_pass("ReSTIR_FG"), Err(GraphError::UnknownPass(_))));
    }

    #[test]
    fn test_update_pass() {
        let mut graph = two_pass_graph();
        let old = graph
            .update_pass("VBufferRT", PassConfig::new().with("sampleCount", 16))
            .unwrap();

        assert!(old.is_empty());
        assert_eq!(
            graph.pass("VBufferRT").unwrap().config().get("sampleCount"),
            Some(&PassOption::Int(16))
        );
        assert!(matches!(
            graph.update_pass("Missing", PassConfig::new()),
            Err(GraphError::UnknownPass(_))
        ));
    }

    #[test]
    fn test_dependencies() {
        let mut graph = two_pass_graph();
        graph.add_edge("VBufferRT.mvec", "ReSTIR_FG.mvec").unwrap();
        graph.add_edge("VBufferRT.vbuffer", "ReSTIR_FG.vbuffer").unwrap();

        let deps: Vec<_> = graph.dependencies("ReSTIR_FG").collect();
        assert_eq!(deps, ["VBufferRT"]);
        assert_eq!(graph.dependencies("VBufferRT").count(), 0);
    }

    #[test]
    fn test_display_summary() {
        let mut graph = two_pass_graph();
        graph
            .update_pass("VBufferRT", PassConfig::new().with("cull", "Back").with("useDOF", true))
            .unwrap();
        graph.add_edge("VBufferRT.vbuffer", "ReSTIR_FG.vbuffer").unwrap();
        graph.mark_output("ReSTIR_FG.color").unwrap();

        let expected = "\
test (2 passes, 1 edges, 1 outputs)
  pass VBufferRT: VBufferRT {cull=Back, useDOF=true}
  pass ReSTIR_FG: ReSTIR_FG
  edge VBufferRT.vbuffer -> ReSTIR_FG.vbuffer
  output ReSTIR_FG.color
";
        assert_eq!(graph.to_string(), expected);
    }

    #[test]
    fn test_clear() {
        let mut graph = two_pass_graph();
        graph.add_edge("VBufferRT", "ReSTIR_FG").unwrap();
        graph.clear();

        assert_eq!(graph.pass_count(), 0);
        assert!(graph.edges().is_empty());
        assert_eq!(graph.name(), "test");
    }
}
