//! DOT renderer for generating output from an assembled launch graph
//!
//! Produces Graphviz text with one cluster per package, ready to be laid out
//! by `dot`.

pub mod config;
pub mod dot;

pub use config::DotConfig;
pub use dot::{render_dot, DotBuilder, Provenance};
