//! Conversion of DOT files to images with Graphviz

use std::path::{Path, PathBuf};
use std::process::Command;

use thiserror::Error;

/// Errors from the external layout tool
#[derive(Debug, Error)]
pub enum RasterizeError {
    #[error("could not run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' failed: {stderr}")]
    Failed { command: String, stderr: String },
}

/// Runs `dot -T<format> <input> -o <output>`
#[derive(Debug, Clone)]
pub struct Rasterizer {
    program: String,
    format: String,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self {
            program: "dot".to_string(),
            format: "png".to_string(),
        }
    }
}

impl Rasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Output format, also used as the output file extension
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = format.into();
        self
    }

    /// Image path next to the DOT file
    pub fn output_path(&self, input: &Path) -> PathBuf {
        input.with_extension(&self.format)
    }

    /// Printable form of the command run for `input`
    pub fn command_line(&self, input: &Path) -> String {
        format!(
            "{} -T{} {} -o {}",
            self.program,
            self.format,
            input.display(),
            self.output_path(input).display()
        )
    }

    /// Convert `input` and return the path of the written image
    pub fn rasterize(&self, input: &Path) -> Result<PathBuf, RasterizeError> {
        let output = self.output_path(input);
        log::debug!("running {}", self.command_line(input));

        let result = Command::new(&self.program)
            .arg(format!("-T{}", self.format))
            .arg(input)
            .arg("-o")
            .arg(&output)
            .output()
            .map_err(|source| RasterizeError::Spawn {
                command: self.command_line(input),
                source,
            })?;

        if !result.status.success() {
            return Err(RasterizeError::Failed {
                command: self.command_line(input),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_replaces_extension() {
        let rasterizer = Rasterizer::new();
        assert_eq!(
            rasterizer.output_path(Path::new("out/graph.dot")),
            PathBuf::from("out/graph.png")
        );
        assert_eq!(
            Rasterizer::new().with_format("svg").output_path(Path::new("graph")),
            PathBuf::from("graph.svg")
        );
    }

    #[test]
    fn test_command_line() {
        assert_eq!(
            Rasterizer::new().command_line(Path::new("g.dot")),
            "dot -Tpng g.dot -o g.png"
        );
    }

    #[test]
    fn test_missing_program_is_reported() {
        let rasterizer = Rasterizer::new().with_program("launch-graph-no-such-dot");
        let err = rasterizer.rasterize(Path::new("g.dot")).unwrap_err();
        assert!(matches!(err, RasterizeError::Spawn { .. }));
    }
}
