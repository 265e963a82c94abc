//! Host registration.
//!
//! A built graph is handed to a host context only when the caller supplies
//! one. Without a host the graph is simply not registered, which is the
//! normal case when a description is built standalone.

use crate::error::{GraphError, Result};
use crate::render_graph::RenderGraph;

/// A host that takes ownership of render graphs, e.g. a running renderer.
pub trait GraphHost {
    /// Take ownership of a graph. Hosts may reject a graph with an error.
    fn add_graph(&mut self, graph: RenderGraph) -> Result<()>;
}

/// Outcome of [`register_graph`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Registration {
    /// The host accepted the graph.
    Registered { name: String },
    /// No host was supplied. Nothing happened.
    Skipped,
}

impl Registration {
    /// True if a host accepted the graph.
    pub fn is_registered(&self) -> bool {
        matches!(self, Self::Registered { .. })
    }
}

/// Hand `graph` to `host` if one is supplied.
///
/// Host failures are returned to the caller. A missing host is not an error.
pub fn register_graph(graph: RenderGraph, host: Option<&mut dyn GraphHost>) -> Result<Registration> {
    let Some(host) = host else {
        log::debug!("no host supplied, '{}' not registered", graph.name());
        return Ok(Registration::Skipped);
    };

    let name = graph.name().to_string();
    host.add_graph(graph)?;
    log::info!("registered render graph '{}'", name);
    Ok(Registration::Registered { name })
}

/// In-process host storing graphs by name, in registration order.
#[derive(Debug, Default)]
pub struct GraphRegistry {
    graphs: Vec<RenderGraph>,
}

impl GraphRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a registered graph by name.
    pub fn get(&self, name: &str) -> Option<&RenderGraph> {
        self.graphs.iter().find(|g| g.name() == name)
    }

    /// Unregister a graph, returning it.
    pub fn remove(&mut self, name: &str) -> Option<RenderGraph> {
        let index = self.graphs.iter().position(|g| g.name() == name)?;
        Some(self.graphs.remove(index))
    }

    /// Registered graph names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.graphs.iter().map(RenderGraph::name)
    }

    /// Registered graphs in registration order.
    pub fn graphs(&self) -> &[RenderGraph] {
        &self.graphs
    }

    /// Number of registered graphs.
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    /// True if no graph is registered.
    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }
}

impl GraphHost for GraphRegistry {
    fn add_graph(&mut self, graph: RenderGraph) -> Result<()> {
        if self.get(graph.name()).is_some() {
            return Err(GraphError::DuplicateGraph(graph.name().to_string()));
        }
        self.graphs.push(graph);
        Ok(())
    }
}
