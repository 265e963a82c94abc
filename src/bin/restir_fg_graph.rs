//! Render graph export tool.
//!
//! Builds the `ReSTIR_FG_PG` graph (or loads a graph from JSON) and writes it
//! as a host graph script, as JSON, or as a readable summary.
//!
//! ```bash
//! # Host graph script on stdout
//! restir-fg-graph
//!
//! # JSON into a file, after validating the graph
//! restir-fg-graph --format json --validate --output ReSTIR_FG_PG.json
//!
//! # Convert a stored graph back into a script
//! restir-fg-graph --input ReSTIR_FG_PG.json --binding ReSTIR_FG
//! ```
//!
//! Logging is controlled through `RUST_LOG` (default `info`).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use restir_fg_graph::{presets, script, PythonScript, RenderGraph, Result};

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
enum ExportFormat {
    /// Python graph script loadable by the host renderer.
    #[default]
    Python,
    /// Indented JSON description.
    Json,
    /// Human-readable listing with the compiled pass order.
    Summary,
}

#[derive(Parser, Debug)]
#[command(
    name = "restir-fg-graph",
    about = "Export the ReSTIR final-gather render graph",
    long_about = "Builds the ReSTIR_FG_PG render graph description, or loads one from JSON,\n\
        and writes it as a host graph script, as JSON, or as a summary.\n\
        \n\
        EXAMPLES:\n\
          restir-fg-graph --format python\n\
          restir-fg-graph --format json --output graph.json\n\
          restir-fg-graph --input graph.json --format summary",
    version
)]
struct Args {
    /// Load the graph from a JSON file instead of building the preset.
    #[arg(long)]
    input: Option<PathBuf>,

    /// Output format.
    #[arg(long, default_value = "python", value_enum)]
    format: ExportFormat,

    /// Python identifier the script binds the graph to; other characters
    /// become `_`. Defaults to the preset binding, or the graph name for
    /// loaded graphs.
    #[arg(long)]
    binding: Option<String>,

    /// Write to this file instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Validate the graph before exporting.
    #[arg(long)]
    validate: bool,
}

/// Graph to export and the script binding it defaults to.
fn load_graph(args: &Args) -> Result<(RenderGraph, String)> {
    match &args.input {
        Some(path) => {
            log::info!("loading graph from {}", path.display());
            let graph = script::from_json(&std::fs::read_to_string(path)?)?;
            let binding = graph.name().to_string();
            Ok((graph, binding))
        }
        None => Ok((
            presets::restir_fg::build()?,
            presets::restir_fg::SCRIPT_BINDING.to_string(),
        )),
    }
}

fn render(args: &Args, graph: &RenderGraph, binding: &str) -> Result<String> {
    let text = match args.format {
        ExportFormat::Python => PythonScript::new(graph).with_binding(binding).to_string(),
        ExportFormat::Json => script::to_json_pretty(graph)? + "\n",
        ExportFormat::Summary => {
            let compiled = graph.compile()?;
            format!(
                "{graph}  order {}\n",
                compiled.pass_names(graph).join(" -> ")
            )
        }
    };
    Ok(text)
}

fn run(args: Args) -> Result<()> {
    let (graph, default_binding) = load_graph(&args)?;
    let binding = args.binding.clone().unwrap_or(default_binding);

    if args.validate {
        let compiled = graph.compile()?;
        log::info!("{}: {} passes valid", graph.name(), compiled.pass_count());
    }

    let text = render(&args, &graph, &binding)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, text)?;
            log::info!("wrote {} to {}", graph.name(), path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if args.binding.is_some() && args.format != ExportFormat::Python {
        log::warn!("--binding only applies to --format python");
    }

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
