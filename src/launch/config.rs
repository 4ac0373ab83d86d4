//! Configuration for launch tree resolution

use crate::substitution::{ArgumentTable, DEFAULT_MAX_SUBSTITUTIONS};

/// Options for one resolution run
#[derive(Debug, Clone)]
pub struct ResolveConfig {
    /// Values for arguments of the root launch file, as given with `name:=value`
    pub arguments: ArgumentTable,

    /// Maximum replacements while expanding a single attribute
    pub max_substitutions: usize,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            arguments: ArgumentTable::new(),
            max_substitutions: DEFAULT_MAX_SUBSTITUTIONS,
        }
    }
}

impl ResolveConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override an argument of the root launch file
    pub fn with_argument(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.arguments.insert(name, value);
        self
    }

    /// Set the substitution limit
    pub fn with_max_substitutions(mut self, max: usize) -> Self {
        self.max_substitutions = max;
        self
    }

    /// Parse a `name:=value` command line assignment
    pub fn parse_assignment(text: &str) -> Option<(String, String)> {
        let (name, value) = text.split_once(":=")?;
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        Some((name.to_string(), value.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ResolveConfig::default();
        assert!(config.arguments.is_empty());
        assert_eq!(config.max_substitutions, DEFAULT_MAX_SUBSTITUTIONS);
    }

    #[test]
    fn test_builder_pattern() {
        let config = ResolveConfig::new()
            .with_argument("cam", "front")
            .with_max_substitutions(4);
        assert_eq!(config.arguments.get("cam"), Some("front"));
        assert_eq!(config.max_substitutions, 4);
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(
            ResolveConfig::parse_assignment("cam:=front"),
            Some(("cam".to_string(), "front".to_string()))
        );
        assert_eq!(
            ResolveConfig::parse_assignment("url:=http://x:80"),
            Some(("url".to_string(), "http://x:80".to_string()))
        );
        assert_eq!(ResolveConfig::parse_assignment("cam=front"), None);
        assert_eq!(ResolveConfig::parse_assignment(":=front"), None);
    }
}
