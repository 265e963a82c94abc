//! ReSTIR final-gather path graph.
//!
//! ```text
//! VBufferRT --mvec/vbuffer--> ReSTIR_FG --color--> AccumulatePass --output--> ToneMapper
//! ```
//!
//! Outputs: `ToneMapper.dst` and `AccumulatePass.output`.

use crate::error::Result;
use crate::host::{register_graph, GraphHost, Registration};
use crate::render_graph::{PassConfig, RenderGraph};

/// Name of the render graph.
pub const GRAPH_NAME: &str = "ReSTIR_FG_PG";

/// Identifier the exported Python script binds the graph to.
pub const SCRIPT_BINDING: &str = "ReSTIR_FG";

fn accumulate_pass_config() -> PassConfig {
    PassConfig::new()
        .with("enabled", false)
        .with("outputSize", "Default")
        .with("autoReset", true)
        .with("precisionMode", "Single")
        .with("maxFrameCount", 0)
        .with("overflowMode", "Stop")
}

fn tone_mapper_config() -> PassConfig {
    PassConfig::new()
        .with("outputSize", "Default")
        .with("useSceneMetadata", true)
        .with("exposureCompensation", 0.0)
        .with("autoExposure", false)
        .with("filmSpeed", 100.0)
        .with("whiteBalance", false)
        .with("whitePoint", 6500.0)
        .with("operator", "Linear")
        .with("clamp", true)
        .with("whiteMaxLuminance", 1.0)
        .with("whiteScale", 11.199999809265137)
        .with("fNumber", 1.0)
        .with("shutter", 1.0)
        .with("exposureMode", "AperturePriority")
}

fn vbuffer_rt_config() -> PassConfig {
    PassConfig::new()
        .with("outputSize", "Default")
        .with("samplePattern", "Center")
        .with("sampleCount", 16)
        .with("useAlphaTest", true)
        .with("adjustShadingNormals", true)
        .with("forceCullMode", false)
        .with("cull", "Back")
        .with("useTraceRayInline", false)
        .with("useDOF", true)
}

/// Build the `ReSTIR_FG_PG` graph description.
///
/// Every call returns a new, independent graph.
pub fn build() -> Result<RenderGraph> {
    let mut g = RenderGraph::new(GRAPH_NAME);

    g.create_pass("AccumulatePass", "AccumulatePass", accumulate_pass_config())?;
    g.create_pass("ToneMapper", "ToneMapper", tone_mapper_config())?;
    g.create_pass("VBufferRT", "VBufferRT", vbuffer_rt_config())?;
    g.create_pass("ReSTIR_FG", "ReSTIR_FG", PassConfig::new())?;

    g.add_edge("AccumulatePass.output", "ToneMapper.src")?;
    g.add_edge("VBufferRT.mvec", "ReSTIR_FG.mvec")?;
    g.add_edge("VBufferRT.vbuffer", "ReSTIR_FG.vbuffer")?;
    g.add_edge("ReSTIR_FG.color", "AccumulatePass.input")?;

    g.mark_output("ToneMapper.dst")?;
    g.mark_output("AccumulatePass.output")?;

    Ok(g)
}

/// Build the graph and register it with `host`, if one is supplied.
pub fn load(host: Option<&mut dyn GraphHost>) -> Result<Registration> {
    register_graph(build()?, host)
}
