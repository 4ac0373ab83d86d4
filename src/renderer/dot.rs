//! DOT generation from an assembled launch graph

use chrono::{Local, NaiveDateTime};

use crate::graph::{GraphStats, LaunchGraph, PackageGroup};
use crate::launch::LaunchFile;
use crate::stylesheet::{
    Stylesheet, CYCLE_EDGE, EDGE, LAUNCH_FILE, MISSING_FILE, NODE, TEST_NODE,
};

use super::DotConfig;

const INDENT: &str = "    ";

/// When and how a graph was generated
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provenance {
    pub generated: NaiveDateTime,
    pub command: String,
}

impl Provenance {
    pub fn new(generated: NaiveDateTime, command: impl Into<String>) -> Self {
        Self {
            generated,
            command: command.into(),
        }
    }

    /// Current local time and the command line of this process
    pub fn now() -> Self {
        Self {
            generated: Local::now().naive_local(),
            command: std::env::args().collect::<Vec<_>>().join(" "),
        }
    }
}

/// Build DOT statements line by line
pub struct DotBuilder {
    config: DotConfig,
    lines: Vec<String>,
    indent: usize,
    clusters: usize,
}

impl DotBuilder {
    /// Create a new DOT builder
    pub fn new(config: DotConfig) -> Self {
        Self {
            config,
            lines: vec![],
            indent: 0,
            clusters: 0,
        }
    }

    fn line(&mut self, text: impl AsRef<str>) {
        self.lines
            .push(format!("{}{}", INDENT.repeat(self.indent), text.as_ref()));
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }

    /// Add a `//` comment at the current indentation
    pub fn comment(&mut self, text: &str) {
        self.line(format!("// {}", text));
    }

    /// Open the top level digraph
    pub fn begin_graph(&mut self, name: &str) {
        let name = if name.starts_with(|c: char| c.is_ascii_digit()) {
            quote(name)
        } else {
            name.to_string()
        };
        self.line(format!("digraph {} {{", name));
        self.indent += 1;
    }

    /// Provenance block. It has to live inside the digraph, otherwise some
    /// file type detectors do not recognize the file as DOT.
    pub fn add_header(&mut self, provenance: &Provenance, stats: &GraphStats) {
        let command = provenance.command.replace("*/", "* /");
        let lines = [
            "/**".to_string(),
            format!(
                "  * This dot file was automatically generated on {}",
                provenance.generated.format("%Y-%m-%d %H:%M:%S%.6f")
            ),
            "  * By the command:".to_string(),
            format!("  *    {}", command),
            "  *".to_string(),
            "  * This launch graph has the following properties:".to_string(),
            format!("  *    - it contains {} ROS packages", stats.packages),
            format!("  *    - it contains {} ROS launch files", stats.launch_files),
            format!("  *    - it contains {} ROS nodes", stats.nodes),
            " */".to_string(),
        ];
        for line in lines {
            self.line(line);
        }
    }

    /// Global graph and node attributes
    pub fn add_graph_attributes(&mut self) {
        let graph = format!(
            "graph [fontsize={}, ranksep={}, nodesep={}];",
            self.config.font_size, self.config.rank_separation, self.config.node_separation
        );
        let node = format!("node [fontsize={}];", self.config.font_size);
        self.line(graph);
        self.line(node);
        // edges between clusters need compound layout
        self.line("compound=true;");
    }

    /// Open a numbered package cluster
    pub fn begin_cluster(&mut self, label: &str) {
        self.blank();
        self.comment(&format!("Subgraph for package: {}", label));
        self.line(format!("subgraph cluster_{} {{", self.clusters));
        self.clusters += 1;
        self.indent += 1;
        self.line(format!("label={};", quote(label)));
        self.line(format!(
            "penwidth={};  // Thicker borders on clusters",
            self.config.cluster_pen_width
        ));
    }

    /// Close the innermost cluster or graph
    pub fn end_block(&mut self) {
        self.indent = self.indent.saturating_sub(1);
        self.line("}");
    }

    /// Add a filled rectangle
    pub fn add_box(&mut self, id: &str, label: &str, fill: &str) {
        let attributes = attribute_list(&[
            format!("label={}", quote(label)),
            "shape=rectangle".to_string(),
            "style=filled".to_string(),
            format!("fillcolor={}", quote(fill)),
        ]);
        self.line(format!("{} [{}];", quote(id), attributes));
    }

    /// Add an edge with the configured stroke width
    pub fn add_edge(&mut self, from: &str, to: &str, color: Option<&str>) {
        let mut attributes = vec![format!("penwidth={}", self.config.edge_pen_width)];
        if let Some(color) = color {
            attributes.push(format!("color={}", quote(color)));
        }
        self.line(format!(
            "{} -> {} [{}];",
            quote(from),
            quote(to),
            attribute_list(&attributes)
        ));
    }

    pub fn add_blank_line(&mut self) {
        self.blank();
    }

    /// Build the final text; always ends with a newline
    pub fn finish(self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

/// Render an assembled graph to DOT
pub fn render_dot(
    graph: &LaunchGraph<'_>,
    provenance: &Provenance,
    config: &DotConfig,
    stylesheet: &Stylesheet,
) -> String {
    let mut builder = DotBuilder::new(config.clone());

    builder.begin_graph(&format!("{}_launch_graph", graph.root().clean_name()));
    builder.add_header(provenance, &graph.stats());
    builder.add_graph_attributes();

    for (package, group) in graph.packages() {
        render_package(graph, package, group, stylesheet, &mut builder);
    }

    builder.add_blank_line();
    builder.comment("Add connections between launch files");
    let edge_color = stylesheet.resolve_or_default(EDGE);
    let cycle_color = stylesheet.resolve_or_default(CYCLE_EDGE);
    for group in graph.packages().values() {
        for id in &group.files {
            let parent = graph.file(*id);
            for include in parent.includes() {
                let child = graph.file(include.target);
                let color = if include.cycle {
                    builder.comment("WARNING: This edge is cycle to a previous launch file");
                    &cycle_color
                } else {
                    &edge_color
                };
                builder.add_edge(&file_id(parent), &file_id(child), Some(color));
            }
        }
    }

    builder.add_blank_line();
    builder.comment("Add connections between launch files and nodes");
    for group in graph.packages().values() {
        for node in &group.nodes {
            let owner = graph.file(node.owner);
            builder.add_edge(&file_id(owner), &node_id(&node.name), None);
        }
    }

    builder.end_block();
    builder.finish()
}

fn render_package(
    graph: &LaunchGraph<'_>,
    package: &str,
    group: &PackageGroup<'_>,
    stylesheet: &Stylesheet,
    builder: &mut DotBuilder,
) {
    builder.begin_cluster(package);

    builder.add_blank_line();
    if group.files.is_empty() {
        builder.comment("This package contains no launch files");
    } else {
        builder.comment("Launch files contained in this package");
        for id in &group.files {
            let file = graph.file(*id);
            let token = if file.is_missing() {
                MISSING_FILE
            } else {
                LAUNCH_FILE
            };
            builder.add_box(
                &file_id(file),
                &file.file_name(),
                &stylesheet.resolve_or_default(token),
            );
        }
    }

    builder.add_blank_line();
    if group.nodes.is_empty() {
        builder.comment("This package contains no ROS nodes");
    } else {
        builder.comment("ROS nodes contained in this package");
        for node in &group.nodes {
            let token = if node.is_test {
                TEST_NODE
            } else {
                NODE
            };
            builder.add_box(
                &node_id(&node.name),
                &node.name,
                &stylesheet.resolve_or_default(token),
            );
        }
    }

    builder.end_block();
}

fn file_id(file: &LaunchFile) -> String {
    format!("file_{}", file.clean_name())
}

fn node_id(name: &str) -> String {
    format!("node_{}", name)
}

fn attribute_list(attributes: &[String]) -> String {
    attributes.join(", ")
}

/// Quote a DOT identifier, escaping embedded quotes and backslashes
fn quote(text: &str) -> String {
    let mut quoted = String::with_capacity(text.len() + 2);
    quoted.push('"');
    for c in text.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("plain"), "\"plain\"");
        assert_eq!(quote(r#"a"b\c"#), r#""a\"b\\c""#);
    }

    #[test]
    fn test_builder_indents_blocks() {
        let mut builder = DotBuilder::new(DotConfig::default());
        builder.begin_graph("demo_launch_graph");
        builder.begin_cluster("pkg");
        builder.add_box("file_a", "a.launch", "#d3d3d3");
        builder.end_block();
        builder.end_block();
        let dot = builder.finish();
        assert!(dot.starts_with("digraph demo_launch_graph {\n"));
        assert!(dot.contains("\n    subgraph cluster_0 {\n"));
        assert!(dot.contains(
            "\n        \"file_a\" [label=\"a.launch\", shape=rectangle, style=filled, fillcolor=\"#d3d3d3\"];\n"
        ));
        assert!(dot.ends_with("    }\n}\n"));
    }

    #[test]
    fn test_clusters_are_numbered() {
        let mut builder = DotBuilder::new(DotConfig::default());
        builder.begin_cluster("a");
        builder.end_block();
        builder.begin_cluster("b");
        builder.end_block();
        let dot = builder.finish();
        assert!(dot.contains("subgraph cluster_0 {"));
        assert!(dot.contains("subgraph cluster_1 {"));
    }

    #[test]
    fn test_graph_name_starting_with_digit_is_quoted() {
        let mut builder = DotBuilder::new(DotConfig::default());
        builder.begin_graph("2robots_launch_graph");
        assert!(builder.finish().starts_with("digraph \"2robots_launch_graph\" {"));
    }

    #[test]
    fn test_edge_attributes() {
        let mut builder = DotBuilder::new(DotConfig::default().with_edge_pen_width(7));
        builder.add_edge("file_a", "node_b", None);
        builder.add_edge("file_a", "file_b", Some("red"));
        let dot = builder.finish();
        assert!(dot.contains("\"file_a\" -> \"node_b\" [penwidth=7];"));
        assert!(dot.contains("\"file_a\" -> \"file_b\" [penwidth=7, color=\"red\"];"));
    }
}
