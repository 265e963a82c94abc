//! Render Graph Description
//!
//! A declarative description of a host render graph: pass instances with
//! their option mappings, directed edges between pass fields, and the fields
//! exposed as graph outputs. The host framework owns pass implementations
//! and graph execution; this module owns the description and validates it.

pub mod compiler;
pub mod field;
pub mod graph;
pub mod pass;

pub use compiler::{compile, CompiledGraph};
pub use field::{Edge, EdgeKind, FieldRef};
pub use graph::RenderGraph;
pub use pass::{PassConfig, PassHandle, PassNode, PassOption};
