//! Launch file model and the recursive resolver that builds it

mod config;
pub mod document;
mod model;
mod parser;
mod visited;

pub use config::ResolveConfig;
pub use model::{
    absolute_path, clean_identifier, normalize_path, Diagnostic, FileId, Include, LaunchFile, LaunchNode,
    LaunchTree,
};
pub use parser::ResolutionContext;
pub use visited::VisitedRegistry;
