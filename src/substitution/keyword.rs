//! Substitution keywords

use crate::error::SubstitutionError;

/// A parsed `$(keyword argument)` expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Substitution {
    /// `$(find package)`: install path of a package
    Find(String),
    /// `$(arg name)`: value of an argument declared in the current file
    Arg(String),
    /// `$(env NAME)`: required environment variable
    Env(String),
    /// `$(optenv NAME default)`: environment variable with a fallback
    OptEnv { name: String, default: Option<String> },
    /// `$(anon name)`: name made unique within the run
    Anon(String),
}

impl Substitution {
    /// Build a substitution from the captured parts of an expression
    ///
    /// `default` is the free-form tail after the argument; only `optenv`
    /// accepts one.
    pub fn parse(
        expression: &str,
        keyword: &str,
        argument: &str,
        default: Option<&str>,
    ) -> Result<Self, SubstitutionError> {
        let argument = argument.to_string();
        let substitution = match keyword {
            "find" => Self::Find(argument),
            "arg" => Self::Arg(argument),
            "env" => Self::Env(argument),
            "anon" => Self::Anon(argument),
            "optenv" => {
                return Ok(Self::OptEnv {
                    name: argument,
                    default: default.map(str::to_string),
                })
            }
            other => {
                return Err(SubstitutionError::UnresolvedSubstitution {
                    keyword: other.to_string(),
                })
            }
        };

        if default.is_some() {
            return Err(SubstitutionError::MalformedExpression {
                expression: expression.to_string(),
                reason: format!("'{}' takes a single argument", keyword),
            });
        }
        Ok(substitution)
    }

    /// Keyword as written in launch files
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Find(_) => "find",
            Self::Arg(_) => "arg",
            Self::Env(_) => "env",
            Self::OptEnv { .. } => "optenv",
            Self::Anon(_) => "anon",
        }
    }
}
