//! Prebuilt render graphs.

pub mod restir_fg;

use crate::error::Result;
use crate::render_graph::RenderGraph;

/// A named graph builder.
#[derive(Debug, Clone, Copy)]
pub struct Preset {
    /// Graph name.
    pub name: &'static str,
    /// Identifier used by exported scripts.
    pub binding: &'static str,
    pub build: fn() -> Result<RenderGraph>,
}

/// All prebuilt graphs.
pub const PRESETS: &[Preset] = &[Preset {
    name: restir_fg::GRAPH_NAME,
    binding: restir_fg::SCRIPT_BINDING,
    build: restir_fg::build,
}];

/// Find a preset by graph name.
pub fn find(name: &str) -> Option<&'static Preset> {
    PRESETS.iter().find(|p| p.name == name)
}
