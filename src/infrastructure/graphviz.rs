//! Graphviz adapter: DOT generation and the `dot` subprocess renderer

use std::fmt::Write as _;
use std::io;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::config::RenderConfig;
use crate::domain::{LayoutGraph, LayoutKind, LayoutNode};
use crate::infrastructure::error::RenderError;
use crate::infrastructure::traits::{CommandRunner, Renderer};

/// Quote a DOT identifier or attribute value.
fn quote(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('"');
    for c in raw.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

fn attr_list(attrs: &[(&str, String)]) -> String {
    attrs
        .iter()
        .map(|(key, value)| format!("{}={}", key, quote(value)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn node_attrs(node: &LayoutNode, config: &RenderConfig) -> Vec<(&'static str, String)> {
    let mut attrs = vec![
        ("label", node.label.clone()),
        ("fixedsize", "true".to_string()),
        ("fontname", config.font.clone()),
        ("ordering", "out".to_string()),
    ];
    if !node.visible {
        attrs.push(("style", "invis".to_string()));
        return attrs;
    }
    match (node.kind, &node.fill_color) {
        (LayoutKind::Sentinel, _) => {
            attrs.push(("style", "filled".to_string()));
            attrs.push(("fillcolor", "none".to_string()));
            attrs.push(("color", "none".to_string()));
        }
        (_, Some(fill)) => {
            attrs.push(("style", "filled".to_string()));
            attrs.push(("fillcolor", fill.clone()));
            attrs.push(("fontcolor", "white".to_string()));
        }
        (_, None) => {}
    }
    attrs
}

/// Graphviz DOT text for a layout graph.
pub fn to_dot(graph: &LayoutGraph, config: &RenderConfig) -> String {
    let mut graph_attrs = vec![
        ("center", "true".to_string()),
        ("dpi", config.dpi.to_string()),
    ];
    if let Some(title) = graph.title() {
        graph_attrs.push(("label", title.to_string()));
        graph_attrs.push(("labelloc", "t".to_string()));
    }

    let mut dot = String::from("digraph {\n");
    // writing into a String cannot fail
    let _ = writeln!(dot, "    graph [{}]", attr_list(&graph_attrs));
    for node in graph.nodes() {
        let _ = writeln!(
            dot,
            "    {} [{}]",
            quote(&node.id),
            attr_list(&node_attrs(node, config))
        );
    }
    for edge in graph.edges() {
        let mut attrs = vec![("weight", edge.weight.to_string())];
        if !edge.visible {
            attrs.push(("style", "invis".to_string()));
        }
        let _ = writeln!(
            dot,
            "    {} -> {} [{}]",
            quote(&edge.from),
            quote(&edge.to),
            attr_list(&attrs)
        );
    }
    dot.push_str("}\n");
    dot
}

/// Renders layouts by piping DOT into the configured Graphviz program.
pub struct GraphvizRenderer {
    cmd: Arc<dyn CommandRunner>,
    config: RenderConfig,
}

impl GraphvizRenderer {
    pub fn new(cmd: Arc<dyn CommandRunner>, config: RenderConfig) -> Self {
        Self { cmd, config }
    }

    fn classify(&self, error: io::Error) -> RenderError {
        let program = self.config.program.clone();
        match error.kind() {
            io::ErrorKind::NotFound | io::ErrorKind::PermissionDenied => {
                RenderError::Unavailable {
                    program,
                    source: error,
                }
            }
            io::ErrorKind::TimedOut => RenderError::Timeout {
                program,
                timeout: self.config.timeout(),
            },
            _ => RenderError::Io {
                program,
                source: error,
            },
        }
    }
}

impl Renderer for GraphvizRenderer {
    #[instrument(level = "debug", skip(self, graph), fields(program = %self.config.program))]
    fn render(&self, graph: &LayoutGraph) -> Result<Vec<u8>, RenderError> {
        let dot = to_dot(graph, &self.config);
        let format_arg = format!("-T{}", self.config.format);
        debug!(bytes = dot.len(), "piping DOT to renderer");

        let output = self
            .cmd
            .run_with_input(
                &self.config.program,
                &[format_arg.as_str()],
                dot.as_bytes(),
                self.config.timeout(),
            )
            .map_err(|e| self.classify(e))?;

        if !output.status.success() {
            return Err(RenderError::Failed {
                program: self.config.program.clone(),
                status: output.status.to_string(),
                diagnostic: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        if output.stdout.is_empty() {
            return Err(RenderError::EmptyOutput {
                program: self.config.program.clone(),
            });
        }
        Ok(output.stdout)
    }

    fn format(&self) -> &str {
        &self.config.format
    }
}
