//! Graph export and import.
//!
//! Two formats are supported:
//!
//! | Format | Direction | Purpose |
//! |--------|-----------|---------|
//! | Python graph script | export | Loaded by the host renderer |
//! | JSON | export and import | Tooling, storage, diffing |
//!
//! JSON import replays the construction calls, so an imported graph obeys the
//! same rules as one built in code.

use std::fmt::{self, Write as _};

use serde::Deserialize;

use crate::error::Result;
use crate::render_graph::{PassConfig, PassOption, RenderGraph};

/// Python graph script for a render graph.
///
/// The script defines `render_graph_<binding>()`, binds its result to
/// `<binding>` and registers it with the host's `m` object when that exists.
///
/// ```
/// use restir_fg_graph::{PythonScript, RenderGraph};
///
/// let graph = RenderGraph::new("Empty");
/// let script = PythonScript::new(&graph).to_string();
/// assert!(script.contains("g = RenderGraph('Empty')"));
/// assert!(script.ends_with("except NameError: None\n"));
/// ```
#[derive(Debug, Clone)]
pub struct PythonScript<'a> {
    graph: &'a RenderGraph,
    binding: String,
}

impl<'a> PythonScript<'a> {
    /// Script whose binding is the graph name, made a valid identifier with
    /// [`python_identifier`].
    pub fn new(graph: &'a RenderGraph) -> Self {
        Self {
            graph,
            binding: python_identifier(graph.name()),
        }
    }

    /// Set the Python identifier the graph is bound to.
    ///
    /// The name goes through [`python_identifier`], so `ReSTIR FG-PG` binds
    /// to `ReSTIR_FG_PG`.
    pub fn with_binding(mut self, binding: impl Into<String>) -> Self {
        self.binding = python_identifier(&binding.into());
        self
    }

    /// Identifier the script binds the graph to.
    pub fn binding(&self) -> &str {
        &self.binding
    }
}

impl fmt::Display for PythonScript<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let graph = self.graph;
        let function = format!("render_graph_{}", self.binding);

        writeln!(f, "from pathlib import WindowsPath, PosixPath")?;
        writeln!(f, "from falcor import *")?;
        writeln!(f)?;
        writeln!(f, "def {function}():")?;
        writeln!(f, "    g = RenderGraph({})", python_str(graph.name()))?;
        for pass in graph.passes() {
            writeln!(
                f,
                "    g.create_pass({}, {}, {})",
                python_str(pass.pass_type()),
                python_str(pass.name()),
                python_dict(pass.config())
            )?;
        }
        for edge in graph.edges() {
            writeln!(
                f,
                "    g.add_edge({}, {})",
                python_str(&edge.src().to_string()),
                python_str(&edge.dst().to_string())
            )?;
        }
        for output in graph.outputs() {
            writeln!(f, "    g.mark_output({})", python_str(&output.to_string()))?;
        }
        writeln!(f, "    return g")?;
        writeln!(f)?;
        writeln!(f, "{} = {function}()", self.binding)?;
        writeln!(f, "try: m.addGraph({})", self.binding)?;
        writeln!(f, "except NameError: None")
    }
}

const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Turn a name into a Python identifier.
///
/// Characters outside `[A-Za-z0-9_]` become `_`. A name that is empty or
/// starts with a digit gets a leading `_`, a keyword gets a trailing one.
pub fn python_identifier(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if PYTHON_KEYWORDS.contains(&ident.as_str()) {
        ident.push('_');
    }
    ident
}

/// Python literal for an option value.
pub fn python_literal(value: &PassOption) -> String {
    match value {
        PassOption::Bool(true) => "True".to_string(),
        PassOption::Bool(false) => "False".to_string(),
        PassOption::Int(v) => v.to_string(),
        PassOption::Float(v) => python_float(*v),
        PassOption::Str(v) => python_str(v),
    }
}

fn python_dict(config: &PassConfig) -> String {
    let mut out = String::from("{");
    for (i, (key, value)) in config.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{}: {}", python_str(key), python_literal(value));
    }
    out.push('}');
    out
}

fn python_str(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Matches Python's `repr(float)`.
///
/// Rust's `Debug` output already is the shortest round-trip form with the
/// same fixed/scientific thresholds; Python additionally signs the exponent
/// and pads it to two digits.
fn python_float(value: f64) -> String {
    if value.is_nan() {
        return "float('nan')".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "float('inf')" } else { "-float('inf')" }.to_string();
    }

    let text = format!("{value:?}");
    match text.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => text,
    }
}

/// Serialize a graph to compact JSON.
pub fn to_json(graph: &RenderGraph) -> Result<String> {
    Ok(serde_json::to_string(graph)?)
}

/// Serialize a graph to indented JSON.
pub fn to_json_pretty(graph: &RenderGraph) -> Result<String> {
    Ok(serde_json::to_string_pretty(graph)?)
}

#[derive(Deserialize)]
struct GraphDocument {
    name: String,
    #[serde(default)]
    passes: Vec<PassDocument>,
    #[serde(default)]
    edges: Vec<EdgeDocument>,
    #[serde(default)]
    outputs: Vec<String>,
}

#[derive(Deserialize)]
struct PassDocument {
    #[serde(rename = "type")]
    pass_type: String,
    name: String,
    #[serde(default)]
    options: PassConfig,
}

#[derive(Deserialize)]
struct EdgeDocument {
    src: String,
    dst: String,
}

/// Rebuild a graph from JSON produced by [`to_json`] or written by hand.
pub fn from_json(text: &str) -> Result<RenderGraph> {
    let document: GraphDocument = serde_json::from_str(text)?;

    let mut graph = RenderGraph::new(document.name);
    for pass in document.passes {
        graph.create_pass(pass.pass_type, pass.name, pass.options)?;
    }
    for edge in &document.edges {
        graph.add_edge(&edge.src, &edge.dst)?;
    }
    for output in &document.outputs {
        graph.mark_output(output)?;
    }

    log::debug!(
        "{}: loaded {} passes from JSON",
        graph.name(),
        graph.pass_count()
    );
    Ok(graph)
}
