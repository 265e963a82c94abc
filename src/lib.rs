//! ReSTIR FG Graph - declarative render graph descriptions for a host renderer
//!
//! The host framework implements and executes the passes. This crate owns
//! the wiring:
//! - Render graph descriptions: passes, option mappings, edges and outputs
//! - Host-style validation and pass ordering
//! - Export to the host's Python graph-script format and to JSON
//! - Explicit registration with a host context
//! - The `ReSTIR_FG_PG` graph (ray-traced visibility buffer, reservoir-based
//!   final gather, temporal accumulation and tone mapping)
//!
//! # Example
//!
//! ```
//! use restir_fg_graph::{presets::restir_fg, GraphRegistry, PythonScript};
//!
//! let graph = restir_fg::build()?;
//! let script = PythonScript::new(&graph).with_binding(restir_fg::SCRIPT_BINDING);
//! assert!(script.to_string().contains("g.add_edge('ReSTIR_FG.color', 'AccumulatePass.input')"));
//!
//! let mut host = GraphRegistry::new();
//! assert!(restir_fg::load(Some(&mut host))?.is_registered());
//! # Ok::<(), restir_fg_graph::GraphError>(())
//! ```

pub mod error;
pub mod host;
pub mod presets;
pub mod render_graph;
pub mod script;

pub use error::{GraphError, Result};
pub use host::{register_graph, GraphHost, GraphRegistry, Registration};
pub use render_graph::{
    CompiledGraph, Edge, EdgeKind, FieldRef, PassConfig, PassHandle, PassNode, PassOption,
    RenderGraph,
};
pub use script::{from_json, to_json, to_json_pretty, PythonScript};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
