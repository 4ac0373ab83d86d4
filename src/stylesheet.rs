//! Stylesheet for graph colors
//!
//! Colors of launch files, nodes and edges are looked up by token so they can
//! be overridden from a TOML file:
//!
//! ```toml
//! [metadata]
//! name = "High contrast"
//!
//! [colors]
//! missing-file = "#ff00ff"
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Fill of launch files that exist
pub const LAUNCH_FILE: &str = "launch-file";
/// Fill of launch files that could not be found
pub const MISSING_FILE: &str = "missing-file";
/// Fill of regular nodes
pub const NODE: &str = "node";
/// Fill of test nodes
pub const TEST_NODE: &str = "test-node";
/// Stroke of include edges
pub const EDGE: &str = "edge";
/// Stroke of include edges that point back to a visited file
pub const CYCLE_EDGE: &str = "cycle-edge";

/// Errors that can occur when loading or parsing stylesheets
#[derive(Error, Debug)]
pub enum StylesheetError {
    #[error("Failed to read stylesheet file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse stylesheet TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// A stylesheet mapping color tokens to concrete values
#[derive(Debug, Clone)]
pub struct Stylesheet {
    /// Optional name for the stylesheet
    pub name: Option<String>,
    /// Optional description
    pub description: Option<String>,
    /// Color mappings: token name -> color
    pub colors: HashMap<String, String>,
}

/// TOML structure for deserializing stylesheets
#[derive(Deserialize)]
struct TomlStylesheet {
    metadata: Option<TomlMetadata>,
    #[serde(default)]
    colors: HashMap<String, String>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
    description: Option<String>,
}

const DEFAULT_PALETTE: &str = r##"
[colors]
launch-file = "#d3d3d3"
missing-file = "#cc0000"
node = "#6495ed"
test-node = "#009900"
edge = "black"
cycle-edge = "red"
"##;

impl Stylesheet {
    /// Load stylesheet from TOML file
    pub fn from_file(path: &Path) -> Result<Self, StylesheetError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load stylesheet from TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, StylesheetError> {
        let parsed: TomlStylesheet = toml::from_str(content)?;

        Ok(Stylesheet {
            name: parsed.metadata.as_ref().and_then(|m| m.name.clone()),
            description: parsed.metadata.as_ref().and_then(|m| m.description.clone()),
            colors: parsed.colors,
        })
    }

    /// Resolve a color token
    ///
    /// Returns None if the token is not defined in this stylesheet.
    pub fn resolve(&self, token: &str) -> Option<&str> {
        self.colors.get(token).map(|s| s.as_str())
    }

    /// Resolve a color token, falling back to the default palette and then
    /// to black
    pub fn resolve_or_default(&self, token: &str) -> String {
        if let Some(color) = self.resolve(token) {
            return color.to_string();
        }

        let default = Self::default();
        if let Some(color) = default.resolve(token) {
            return color.to_string();
        }

        "black".to_string()
    }
}

impl Default for Stylesheet {
    fn default() -> Self {
        Self::from_str(DEFAULT_PALETTE).expect("Default palette should be valid TOML")
    }
}
