//! Graphviz export.

use std::fmt::{self, Display, Write as _};
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{CircuitError, Result};
use crate::graph::{Node, OpenDigraph};

/// Render `graph` in the DOT language.
///
/// Inputs and outputs are pinned to their own ranks. Interior nodes with an
/// empty label (plain copies) are drawn as small circles, and an edge of
/// multiplicity `m` is written `m` times. With `verbose`, every node also
/// shows its id.
pub fn to_dot<L: Display>(graph: &OpenDigraph<L>, verbose: bool) -> String {
    let mut out = String::new();
    // writing into a String cannot fail
    let _ = write_dot(&mut out, graph, verbose);
    out
}

/// Write [`to_dot`] output to `path`.
pub fn save_dot<L: Display>(graph: &OpenDigraph<L>, path: impl AsRef<Path>, verbose: bool) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, to_dot(graph, verbose)).map_err(|e| CircuitError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    debug!(path = %path.display(), nodes = graph.len(), "saved dot file");
    Ok(())
}

fn write_dot<L: Display>(out: &mut String, graph: &OpenDigraph<L>, verbose: bool) -> fmt::Result {
    writeln!(out, "digraph G {{")?;
    writeln!(out, "    rankdir=TB;")?;

    writeln!(out, "    {{")?;
    writeln!(out, "        rank=same;")?;
    for node in graph.inputs().iter().filter_map(|&i| graph.node(i)) {
        writeln!(out, "        {} [{}, shape=none, color=green];", node.id(), label(node, verbose))?;
    }
    writeln!(out, "    }}")?;

    for node in graph.nodes().filter(|n| !graph.is_boundary(n.id())) {
        let text = node.label().to_string();
        if text.is_empty() {
            let shown = if verbose { node.id().0.to_string() } else { String::new() };
            writeln!(
                out,
                "    {} [label=\"{}\", shape=circle, width=0.3, height=0.3, fixedsize=true];",
                node.id(),
                shown
            )?;
        } else {
            writeln!(out, "    {} [{}];", node.id(), label(node, verbose))?;
        }
    }

    writeln!(out, "    {{")?;
    writeln!(out, "        rank=same;")?;
    for node in graph.outputs().iter().filter_map(|&o| graph.node(o)) {
        writeln!(out, "        {} [{}, shape=none, color=red];", node.id(), label(node, verbose))?;
    }
    writeln!(out, "    }}")?;

    for node in graph.nodes() {
        for (&child, &m) in node.children() {
            let color = if graph.is_input(node.id()) {
                " [color=green]"
            } else if graph.is_output(child) {
                " [color=red]"
            } else {
                ""
            };
            for _ in 0..m {
                writeln!(out, "    {} -> {}{};", node.id(), child, color)?;
            }
        }
    }
    writeln!(out, "}}")
}

fn label<L: Display>(node: &Node<L>, verbose: bool) -> String {
    let text = escape(&node.label().to_string());
    if verbose {
        format!("label=\"{}\\nid={}\"", text, node.id().0)
    } else {
        format!("label=\"{}\"", text)
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuit::{Circuit, Gate};
    use crate::graph::NodeId;

    fn sample() -> Circuit {
        let mut c = Circuit::empty();
        let fan = c.add_copy_node(&[], &[]).unwrap();
        let and = c.add_and_node(&[(fan, 2)], &[]).unwrap();
        c.add_input_node(fan).unwrap();
        c.add_output_node(and).unwrap();
        c
    }

    #[test]
    fn test_dot_structure() {
        let dot = to_dot(sample().graph(), false);
        assert!(dot.starts_with("digraph G {"));
        assert!(dot.trim_end().ends_with('}'));
        assert_eq!(dot.matches("rank=same;").count(), 2);
        assert!(dot.contains("v0 [label=\"\", shape=circle"));
        assert!(dot.contains("v1 [label=\"&\"];"));
        assert!(dot.contains("v2 [label=\"\", shape=none, color=green];"));
        assert!(dot.contains("v3 [label=\"\", shape=none, color=red];"));
    }

    #[test]
    fn test_multiplicity_repeats_edges() {
        let dot = to_dot(sample().graph(), false);
        assert_eq!(dot.matches("v0 -> v1;").count(), 2);
        assert_eq!(dot.matches("v2 -> v0 [color=green];").count(), 1);
        assert_eq!(dot.matches("v1 -> v3 [color=red];").count(), 1);
    }

    #[test]
    fn test_verbose_shows_ids() {
        let dot = to_dot(sample().graph(), true);
        assert!(dot.contains("v0 [label=\"0\", shape=circle"));
        assert!(dot.contains("v1 [label=\"&\\nid=1\"];"));
    }

    #[test]
    fn test_labels_are_escaped() {
        let mut g: OpenDigraph<String> = OpenDigraph::empty();
        g.add_node("say \"hi\"".to_string(), &[], &[]).unwrap();
        assert!(to_dot(&g, false).contains("v0 [label=\"say \\\"hi\\\"\"];"));
        assert_eq!(Gate::Const(true).to_string(), "1");
        assert_eq!(NodeId(4).to_string(), "v4");
    }

    #[test]
    fn test_save_dot() {
        let dir = std::env::temp_dir().join(format!("opencirc-dot-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sample.dot");
        save_dot(sample().graph(), &path, false).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), to_dot(sample().graph(), false));
        fs::remove_dir_all(&dir).unwrap();

        let missing = dir.join("no-such-dir").join("x.dot");
        assert!(matches!(
            save_dot(sample().graph(), &missing, false),
            Err(CircuitError::FileWriteError { .. })
        ));
    }
}
