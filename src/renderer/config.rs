//! Configuration for DOT output

/// Sizes and spacing written into the generated graph
#[derive(Debug, Clone, PartialEq)]
pub struct DotConfig {
    /// Font size for the graph and its nodes
    pub font_size: u32,

    /// Minimum vertical distance between ranks, in inches
    pub rank_separation: f64,

    /// Minimum horizontal distance between nodes, in inches
    pub node_separation: f64,

    /// Border width of package clusters
    pub cluster_pen_width: u32,

    /// Stroke width of edges
    pub edge_pen_width: u32,
}

impl Default for DotConfig {
    fn default() -> Self {
        Self {
            font_size: 35,
            rank_separation: 2.0,
            node_separation: 2.0,
            cluster_pen_width: 5,
            edge_pen_width: 3,
        }
    }
}

impl DotConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_font_size(mut self, size: u32) -> Self {
        self.font_size = size;
        self
    }

    /// Set rank and node separation
    pub fn with_spacing(mut self, rank_separation: f64, node_separation: f64) -> Self {
        self.rank_separation = rank_separation;
        self.node_separation = node_separation;
        self
    }

    pub fn with_cluster_pen_width(mut self, width: u32) -> Self {
        self.cluster_pen_width = width;
        self
    }

    pub fn with_edge_pen_width(mut self, width: u32) -> Self {
        self.edge_pen_width = width;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DotConfig::default();
        assert_eq!(config.font_size, 35);
        assert_eq!(config.rank_separation, 2.0);
        assert_eq!(config.node_separation, 2.0);
        assert_eq!(config.cluster_pen_width, 5);
        assert_eq!(config.edge_pen_width, 3);
    }

    #[test]
    fn test_builder_pattern() {
        let config = DotConfig::new()
            .with_font_size(12)
            .with_spacing(0.5, 0.25)
            .with_cluster_pen_width(1)
            .with_edge_pen_width(2);

        assert_eq!(config.font_size, 12);
        assert_eq!(config.rank_separation, 0.5);
        assert_eq!(config.node_separation, 0.25);
        assert_eq!(config.cluster_pen_width, 1);
        assert_eq!(config.edge_pen_width, 2);
    }
}
