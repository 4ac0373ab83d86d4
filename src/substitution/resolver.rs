//! Expression expansion

use std::cell::Cell;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::SubstitutionError;

use super::keyword::Substitution;
use super::locator::{Environment, PackageLocator};

/// Default cap on replacements performed for one piece of text
pub const DEFAULT_MAX_SUBSTITUTIONS: usize = 256;

fn expression_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\(([A-Za-z0-9_]+) ([A-Za-z0-9_]+)(?: ([^()]*))?\)")
            .expect("substitution pattern is valid")
    })
}

/// Arguments declared in one launch file, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentTable {
    entries: Vec<(String, String)>,
}

impl ArgumentTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an argument, keeping its original position when redefined
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ArgumentTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = ArgumentTable::new();
        for (name, value) in iter {
            table.insert(name, value);
        }
        table
    }
}

/// Expands substitution expressions for one resolution run
pub struct SubstitutionResolver<'a> {
    locator: &'a dyn PackageLocator,
    environment: &'a dyn Environment,
    anon_counter: Cell<u64>,
    max_substitutions: usize,
}

impl<'a> SubstitutionResolver<'a> {
    pub fn new(locator: &'a dyn PackageLocator, environment: &'a dyn Environment) -> Self {
        Self {
            locator,
            environment,
            anon_counter: Cell::new(0),
            max_substitutions: DEFAULT_MAX_SUBSTITUTIONS,
        }
    }

    /// Set the replacement cap
    pub fn with_max_substitutions(mut self, max: usize) -> Self {
        self.max_substitutions = max;
        self
    }

    /// Replace every expression in `text`
    ///
    /// After each replacement the whole string is scanned again, since a
    /// resolved value may itself contain expressions.
    pub fn resolve(&self, text: &str, args: &ArgumentTable) -> Result<String, SubstitutionError> {
        let pattern = expression_pattern();
        let mut text = text.to_string();
        let mut replacements = 0;

        while let Some(caps) = pattern.captures(&text) {
            let expression = caps[0].to_string();
            if replacements >= self.max_substitutions {
                return Err(SubstitutionError::LimitExceeded {
                    text,
                    limit: self.max_substitutions,
                });
            }

            let substitution = Substitution::parse(
                &expression,
                &caps[1],
                &caps[2],
                caps.get(3).map(|m| m.as_str()),
            )?;
            let value = self.evaluate(&substitution, args)?;

            let updated = text.replace(&expression, &value);
            if updated == text {
                // the value reintroduced the expression it replaced
                return Err(SubstitutionError::LimitExceeded {
                    text,
                    limit: self.max_substitutions,
                });
            }
            text = updated;
            replacements += 1;
        }

        Ok(text)
    }

    fn evaluate(
        &self,
        substitution: &Substitution,
        args: &ArgumentTable,
    ) -> Result<String, SubstitutionError> {
        log::trace!("evaluating $({} ...)", substitution.keyword());
        match substitution {
            Substitution::Find(package) => self.locator.find(package),
            Substitution::Arg(name) => args
                .get(name)
                .map(str::to_string)
                .ok_or_else(|| SubstitutionError::UndefinedArgument { name: name.clone() }),
            Substitution::Env(name) => self.environment.var(name).ok_or_else(|| {
                SubstitutionError::MissingEnvironmentVariable { name: name.clone() }
            }),
            Substitution::OptEnv { name, default } => self
                .environment
                .var(name)
                .or_else(|| default.clone())
                .ok_or_else(|| SubstitutionError::MissingEnvironmentVariable {
                    name: name.clone(),
                }),
            Substitution::Anon(name) => {
                let token = self.anon_counter.get();
                self.anon_counter.set(token + 1);
                Ok(format!("{}-{}", name, token))
            }
        }
    }
}
