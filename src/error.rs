//! Error types for resolution, assembly and rendering

use std::path::PathBuf;

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// Errors raised while expanding `$(keyword argument)` expressions
#[derive(Debug, Error)]
pub enum SubstitutionError {
    /// Keyword with no handler
    #[error("unknown substitution argument '{keyword}'")]
    UnresolvedSubstitution { keyword: String },

    /// `$(arg name)` for a name not declared in the current file
    #[error("could not resolve unknown arg: '{name}'")]
    UndefinedArgument { name: String },

    /// `$(env NAME)` or `$(optenv NAME)` for an unset variable
    #[error("could not find environment variable: '{name}'")]
    MissingEnvironmentVariable { name: String },

    /// The package locator reported an error
    #[error("failed to find package '{package}': {message}")]
    PackageResolution { package: String, message: String },

    /// Expression shape is valid but its arguments are not
    #[error("malformed substitution '{expression}': {reason}")]
    MalformedExpression { expression: String, reason: String },

    /// Too many replacements, usually a value that expands to itself
    #[error("substitution limit of {limit} exceeded while resolving '{text}'")]
    LimitExceeded { text: String, limit: usize },
}

/// Errors raised while processing a single launch element
#[derive(Debug, Error)]
pub enum ElementError {
    /// Required XML attribute absent
    #[error("<{element}> is missing the '{attribute}' attribute")]
    MissingAttribute { element: String, attribute: String },

    /// `<arg>` with neither `value` nor `default`
    #[error("argument '{name}' must define either the 'value' or the 'default' attribute")]
    ArgumentWithoutValue { name: String },

    /// `if` / `unless` that is not a boolean literal
    #[error("invalid value in {attribute} attribute: '{value}'")]
    InvalidBoolean { attribute: String, value: String },

    /// Substitution failure in one of the element's attributes
    #[error(transparent)]
    Substitution(#[from] SubstitutionError),

    /// An included launch file could not be parsed
    #[error("failed to include launch file: {0}")]
    Include(#[from] Box<DocumentError>),
}

impl ElementError {
    /// Create a missing attribute error
    pub fn missing_attribute(element: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::MissingAttribute {
            element: element.into(),
            attribute: attribute.into(),
        }
    }

    /// Create an invalid boolean error
    pub fn invalid_boolean(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidBoolean {
            attribute: attribute.into(),
            value: value.into(),
        }
    }
}

/// Errors that abort the construction of one launch file
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to read launch file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed launch file {} at {span:?}: {message}", .path.display())]
    Xml {
        path: PathBuf,
        span: Span,
        message: String,
    },

    #[error("launch file {} has no root element", .path.display())]
    EmptyDocument { path: PathBuf },

    /// Element failure that is not isolated (an `<arg>` at file scope)
    #[error("in launch file {}: {source}", .path.display())]
    Element {
        path: PathBuf,
        #[source]
        source: ElementError,
    },
}

impl DocumentError {
    /// Path of the launch file that failed
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Read { path, .. }
            | Self::Xml { path, .. }
            | Self::EmptyDocument { path }
            | Self::Element { path, .. } => path,
        }
    }

    /// Format the error with source context using ariadne
    ///
    /// Only markup errors carry a span; the other variants fall back to
    /// their display text.
    pub fn format(&self, source: &str) -> String {
        let Self::Xml {
            path,
            span,
            message,
        } = self
        else {
            return self.to_string();
        };

        let filename = path.display().to_string();
        let span = span.start.min(source.len())..span.end.min(source.len());
        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename.as_str(), span.start)
            .with_message("malformed launch file")
            .with_label(
                Label::new((filename.as_str(), span))
                    .with_message(message)
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename.as_str(), Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

/// Errors that can occur while assembling the graph
#[derive(Debug, Error)]
pub enum GraphError {
    /// Path has no `<package>/launch/` segment
    #[error("failed to get package name for: {}", .path.display())]
    PackageNameDerivation { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_error_format_includes_message() {
        let err = DocumentError::Xml {
            path: PathBuf::from("demo/launch/a.launch"),
            span: 9..15,
            message: "unexpected end tag".to_string(),
        };
        let report = err.format("<launch></node>");
        assert!(report.contains("unexpected end tag"));
        assert!(report.contains("demo/launch/a.launch"));
    }

    #[test]
    fn test_non_xml_error_format_falls_back_to_display() {
        let err = DocumentError::EmptyDocument {
            path: PathBuf::from("x/launch/empty.launch"),
        };
        assert_eq!(err.format(""), err.to_string());
    }

    #[test]
    fn test_substitution_error_is_transparent_in_element_error() {
        let err: ElementError = SubstitutionError::UndefinedArgument {
            name: "cam".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "could not resolve unknown arg: 'cam'");
    }
}
