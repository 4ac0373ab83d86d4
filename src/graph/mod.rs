//! Graph assembly
//!
//! Flattens a [`LaunchTree`](crate::launch::LaunchTree) into per-package
//! groups ready for rendering and computes summary statistics.

mod assemble;

pub use assemble::{assemble, GraphStats, LaunchGraph, PackageGroup};
