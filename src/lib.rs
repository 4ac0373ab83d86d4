//! Launch Graph - visualize ROS launch file trees
//!
//! This library resolves a launch file and everything it includes into a
//! tree of launch files and nodes, groups it by package, and renders it as a
//! Graphviz DOT graph.
//!
//! The pipeline has three independent stages:
//!
//! 1. [`resolve`] parses the launch tree, expanding substitution arguments
//!    and recording per-element failures as diagnostics
//! 2. [`assemble`] groups files and nodes by package and computes statistics
//! 3. [`render_dot`] writes the DOT text
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use launch_graph::render_file;
//!
//! let dot = render_file(Path::new("/ws/src/robot/launch/robot.launch")).unwrap();
//! assert!(dot.starts_with("digraph robot_launch_graph {"));
//! ```

pub mod error;
pub mod graph;
pub mod launch;
pub mod rasterize;
pub mod renderer;
pub mod stylesheet;
pub mod substitution;

use std::path::{Path, PathBuf};

pub use error::{DocumentError, ElementError, GraphError, SubstitutionError};
pub use graph::{assemble, GraphStats, LaunchGraph, PackageGroup};
pub use launch::{Diagnostic, LaunchTree, ResolutionContext, ResolveConfig};
pub use renderer::{render_dot, DotConfig, Provenance};
pub use substitution::{
    ArgumentTable, ChainLocator, Environment, PackageLocator, ProcessEnvironment, RospackLocator,
    StaticEnvironment, StaticLocator,
};

use thiserror::Error;

// Re-export Stylesheet for public API
pub use stylesheet::Stylesheet;

/// Errors that can occur during the render pipeline
#[derive(Debug, Error)]
pub enum RenderError {
    /// The root launch file could not be parsed
    #[error("parse error: {0}")]
    Parse(#[from] DocumentError),

    /// The resolved tree could not be turned into a graph
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    /// The DOT file could not be written
    #[error("failed to write '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration for the complete render pipeline
#[derive(Debug, Clone, Default)]
pub struct RenderConfig {
    /// Resolution options
    pub resolve: ResolveConfig,
    /// DOT output configuration
    pub dot: DotConfig,
    /// Stylesheet for color resolution
    pub stylesheet: Stylesheet,
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the resolution configuration
    pub fn with_resolve(mut self, config: ResolveConfig) -> Self {
        self.resolve = config;
        self
    }

    /// Set the DOT configuration
    pub fn with_dot(mut self, config: DotConfig) -> Self {
        self.dot = config;
        self
    }

    /// Set the stylesheet for color resolution
    pub fn with_stylesheet(mut self, stylesheet: Stylesheet) -> Self {
        self.stylesheet = stylesheet;
        self
    }
}

/// Resolve a launch file and everything it includes
///
/// Every call uses a fresh [`ResolutionContext`], so repeated calls never
/// see each other's visited files.
pub fn resolve(
    root: &Path,
    locator: &dyn PackageLocator,
    environment: &dyn Environment,
    config: &ResolveConfig,
) -> Result<LaunchTree, DocumentError> {
    ResolutionContext::new(locator, environment)
        .with_max_substitutions(config.max_substitutions)
        .resolve(root, config.arguments.clone())
}

/// Assemble and render an already resolved tree
pub fn render_tree(
    tree: &LaunchTree,
    provenance: &Provenance,
    config: &RenderConfig,
) -> Result<String, GraphError> {
    let graph = assemble(tree)?;
    Ok(render_dot(&graph, provenance, &config.dot, &config.stylesheet))
}

/// Render a launch file to DOT using `rospack` and the process environment
pub fn render_file(root: &Path) -> Result<String, RenderError> {
    let (dot, _) = render_file_with_config(
        root,
        &RospackLocator::new(),
        &ProcessEnvironment,
        &Provenance::now(),
        &RenderConfig::default(),
    )?;
    Ok(dot)
}

/// Render a launch file to DOT with explicit collaborators and configuration
///
/// Returns the DOT text together with the diagnostics of elements that were
/// skipped while resolving.
pub fn render_file_with_config(
    root: &Path,
    locator: &dyn PackageLocator,
    environment: &dyn Environment,
    provenance: &Provenance,
    config: &RenderConfig,
) -> Result<(String, Vec<Diagnostic>), RenderError> {
    let tree = resolve(root, locator, environment, &config.resolve)?;
    let dot = render_tree(&tree, provenance, config)?;
    Ok((dot, tree.into_diagnostics()))
}

/// Write rendered DOT text to `path`
pub fn write_dot(path: &Path, dot: &str) -> Result<(), RenderError> {
    std::fs::write(path, dot).map_err(|source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use chrono::NaiveDate;

    fn provenance() -> Provenance {
        let generated = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        Provenance::new(generated, "launch-graph test")
    }

    #[test]
    fn test_render_missing_root_produces_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("ghost/launch/ghost.launch");
        let (dot, diagnostics) = render_file_with_config(
            &root,
            &StaticLocator::new(),
            &StaticEnvironment::new(),
            &provenance(),
            &RenderConfig::default(),
        )
        .unwrap();
        assert!(diagnostics.is_empty());
        assert!(dot.contains(r##""file_ghost" [label="ghost.launch", shape=rectangle, style=filled, fillcolor="#cc0000"];"##));
    }

    #[test]
    fn test_render_malformed_root_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("pkg/launch/bad.launch");
        fs::create_dir_all(root.parent().unwrap()).unwrap();
        fs::write(&root, "<launch><node></launch>").unwrap();
        let result = render_file_with_config(
            &root,
            &StaticLocator::new(),
            &StaticEnvironment::new(),
            &provenance(),
            &RenderConfig::default(),
        );
        assert!(matches!(result, Err(RenderError::Parse(DocumentError::Xml { .. }))));
    }

    #[test]
    fn test_render_root_outside_package_is_graph_error() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nowhere.launch");
        fs::write(&root, "<launch/>").unwrap();
        let result = render_file_with_config(
            &root,
            &StaticLocator::new(),
            &StaticEnvironment::new(),
            &provenance(),
            &RenderConfig::default(),
        );
        assert!(matches!(
            result,
            Err(RenderError::Graph(GraphError::PackageNameDerivation { .. }))
        ));
    }

    #[test]
    fn test_write_dot_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/graph.dot");
        let err = write_dot(&path, "digraph g {}\n").unwrap_err();
        assert!(matches!(err, RenderError::Io { .. }));
        assert!(err.to_string().contains("graph.dot"));
    }

    #[test]
    fn test_render_collects_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("pkg/launch/root.launch");
        fs::create_dir_all(root.parent().unwrap()).unwrap();
        fs::write(
            &root,
            r#"<launch>
                <node pkg="pkg" type="t" name="good"/>
                <node pkg="pkg" type="t" name="bad" if="maybe"/>
            </launch>"#,
        )
        .unwrap();
        let (dot, diagnostics) = render_file_with_config(
            &root,
            &StaticLocator::new(),
            &StaticEnvironment::new(),
            &provenance(),
            &RenderConfig::default(),
        )
        .unwrap();
        assert!(dot.contains("\"node_good\""));
        assert!(!dot.contains("\"node_bad\""));
        assert_eq!(diagnostics.len(), 1);
        assert!(matches!(
            diagnostics[0].error,
            ElementError::InvalidBoolean { .. }
        ));
    }
}
