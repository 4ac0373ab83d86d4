//! Recursive launch file parser
//!
//! Elements are processed strictly in document order, so an argument has to
//! be declared before anything that references it. A failing `<include>`,
//! `<group>`, `<node>` or `<test>` is recorded as a [`Diagnostic`] on the
//! file being parsed and skipped; its siblings are still processed.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DocumentError, ElementError};
use crate::substitution::{ArgumentTable, Environment, PackageLocator, SubstitutionResolver};

use super::document::{parse_document, Element};
use super::model::{absolute_path, Diagnostic, FileId, Include, LaunchFile, LaunchNode, LaunchTree};
use super::visited::VisitedRegistry;

const ARG_TAG: &str = "arg";
const GROUP_TAG: &str = "group";
const INCLUDE_TAG: &str = "include";
const NODE_TAG: &str = "node";
const TEST_TAG: &str = "test";

/// State for one resolution run
///
/// Holds the substitution resolver, the registry of visited files and the
/// entities built so far. Separate contexts never share state, so several
/// runs can happen in the same process.
pub struct ResolutionContext<'a> {
    resolver: SubstitutionResolver<'a>,
    visited: VisitedRegistry,
    files: Vec<LaunchFile>,
}

/// Declarations collected while parsing one file
struct FileScope {
    id: FileId,
    path: PathBuf,
    /// Values passed in by the includer or the command line
    overrides: ArgumentTable,
    used_overrides: Vec<String>,
    args: ArgumentTable,
    includes: Vec<Include>,
    nodes: Vec<LaunchNode>,
    diagnostics: Vec<Diagnostic>,
}

impl FileScope {
    fn new(id: FileId, path: PathBuf, overrides: ArgumentTable) -> Self {
        Self {
            id,
            path,
            overrides,
            used_overrides: Vec::new(),
            args: ArgumentTable::new(),
            includes: Vec::new(),
            nodes: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    /// Keep the value of a successful element, or record why it failed
    fn capture<T>(&mut self, element: &Element, outcome: Result<T, ElementError>) -> Option<T> {
        match outcome {
            Ok(value) => Some(value),
            Err(error) => {
                let diagnostic = Diagnostic {
                    file: self.path.clone(),
                    element: element.tag.clone(),
                    span: element.span.clone(),
                    error,
                };
                log::warn!("{}", diagnostic);
                self.diagnostics.push(diagnostic);
                None
            }
        }
    }

    fn finish(self, file: &mut LaunchFile) {
        for (name, _) in self.overrides.iter() {
            if !self.used_overrides.iter().any(|used| used == name) {
                log::warn!(
                    "argument '{}' passed to {} is never declared",
                    name,
                    self.path.display()
                );
            }
        }
        file.args = self.args;
        file.includes = self.includes;
        file.nodes = self.nodes;
        file.diagnostics = self.diagnostics;
    }
}

impl<'a> ResolutionContext<'a> {
    pub fn new(locator: &'a dyn PackageLocator, environment: &'a dyn Environment) -> Self {
        Self {
            resolver: SubstitutionResolver::new(locator, environment),
            visited: VisitedRegistry::new(),
            files: Vec::new(),
        }
    }

    /// Set the substitution limit used for every attribute
    pub fn with_max_substitutions(mut self, max: usize) -> Self {
        self.resolver = self.resolver.with_max_substitutions(max);
        self
    }

    /// Parse `root` and everything it includes
    ///
    /// `arguments` override the defaults of arguments the root declares.
    /// Only a failure of the root document itself is returned as an error;
    /// element failures end up in the diagnostics of their file.
    pub fn resolve(mut self, root: &Path, arguments: ArgumentTable) -> Result<LaunchTree, DocumentError> {
        let root = self.load_file(absolute_path(root), arguments)?;
        Ok(LaunchTree {
            files: self.files,
            root,
        })
    }

    /// Allocate the entity for `path`, mark it visited, then parse it
    ///
    /// When parsing fails the entity and everything it included are
    /// dropped again, so a later reference parses the file anew.
    fn load_file(&mut self, path: PathBuf, overrides: ArgumentTable) -> Result<FileId, DocumentError> {
        let missing = !path.exists();
        let id = FileId(self.files.len());
        self.files.push(LaunchFile::new(path.clone(), missing));
        self.visited.mark(&path, id);

        if missing {
            log::warn!("could not locate included launch file: {}", path.display());
            return Ok(id);
        }

        if let Err(e) = self.parse_file(id, path, overrides) {
            self.files.truncate(id.0);
            self.visited.forget_from(id);
            return Err(e);
        }
        Ok(id)
    }

    fn parse_file(&mut self, id: FileId, path: PathBuf, overrides: ArgumentTable) -> Result<(), DocumentError> {
        log::debug!("parsing launch file {}", path.display());
        let source = fs::read_to_string(&path).map_err(|source| DocumentError::Read {
            path: path.clone(),
            source,
        })?;
        let root = parse_document(&source, &path)?;
        if root.tag != "launch" {
            log::warn!(
                "{}: root element is <{}>, expected <launch>",
                path.display(),
                root.tag
            );
        }

        let mut scope = FileScope::new(id, path.clone(), overrides);
        self.parse_elements(&root.children, &mut scope)
            .map_err(|source| DocumentError::Element { path, source })?;
        scope.finish(&mut self.files[id.0]);
        Ok(())
    }

    /// Process sibling elements in order
    ///
    /// Only `<arg>` failures escape; they abort the enclosing group or file.
    fn parse_elements(&mut self, elements: &[Element], scope: &mut FileScope) -> Result<(), ElementError> {
        for element in elements {
            match element.tag.as_str() {
                ARG_TAG => self.parse_arg(element, scope)?,
                INCLUDE_TAG => {
                    let outcome = self.parse_include(element, scope);
                    scope.capture(element, outcome);
                }
                GROUP_TAG => {
                    let outcome = self.parse_group(element, scope);
                    scope.capture(element, outcome);
                }
                NODE_TAG | TEST_TAG => {
                    let outcome = self.parse_node(element, scope);
                    if let Some(Some(node)) = scope.capture(element, outcome) {
                        scope.nodes.push(node);
                    }
                }
                other => log::debug!("{}: ignoring <{}>", scope.path.display(), other),
            }
        }
        Ok(())
    }

    fn parse_arg(&self, element: &Element, scope: &mut FileScope) -> Result<(), ElementError> {
        if !self.is_enabled(element, &scope.args)? {
            return Ok(());
        }

        let name = required(element, "name")?;
        let value = element.attribute("value");
        let default = element.attribute("default");
        let raw = value.or(default).ok_or_else(|| ElementError::ArgumentWithoutValue {
            name: name.to_string(),
        })?;

        let name = self.expand(name, &scope.args)?;
        let passed = scope.overrides.get(&name).map(str::to_string);
        let resolved = match passed {
            Some(passed) if value.is_none() => {
                scope.used_overrides.push(name.clone());
                passed
            }
            Some(_) => {
                log::debug!(
                    "{}: argument '{}' has a fixed value, ignoring the passed one",
                    scope.path.display(),
                    name
                );
                scope.used_overrides.push(name.clone());
                self.expand(raw, &scope.args)?
            }
            None => self.expand(raw, &scope.args)?,
        };

        scope.args.insert(name, resolved);
        Ok(())
    }

    fn parse_group(&mut self, element: &Element, scope: &mut FileScope) -> Result<(), ElementError> {
        if !self.is_enabled(element, &scope.args)? {
            return Ok(());
        }
        self.parse_elements(&element.children, scope)
    }

    fn parse_include(&mut self, element: &Element, scope: &mut FileScope) -> Result<(), ElementError> {
        if !self.is_enabled(element, &scope.args)? {
            return Ok(());
        }

        let file = required(element, "file")?;
        let resolved = absolute_path(Path::new(&self.expand(file, &scope.args)?));
        let passed = self.include_arguments(element, &scope.args)?;

        if let Some(target) = self.visited.get(&resolved) {
            log::error!(
                "There is a cycle in the launch file graph from '{}' to '{}'",
                scope.path.display(),
                resolved.display()
            );
            scope.includes.push(Include {
                target,
                path: resolved,
                cycle: true,
            });
            return Ok(());
        }

        let target = self
            .load_file(resolved.clone(), passed)
            .map_err(|e| ElementError::Include(Box::new(e)))?;
        scope.includes.push(Include {
            target,
            path: resolved,
            cycle: false,
        });
        Ok(())
    }

    /// `<arg>` children of an include, resolved in the including file
    fn include_arguments(&self, include: &Element, args: &ArgumentTable) -> Result<ArgumentTable, ElementError> {
        let mut passed = ArgumentTable::new();
        for child in include.children.iter().filter(|c| c.tag == ARG_TAG) {
            if !self.is_enabled(child, args)? {
                continue;
            }
            let name = required(child, "name")?;
            let raw = child
                .attribute("value")
                .or_else(|| child.attribute("default"))
                .ok_or_else(|| ElementError::ArgumentWithoutValue {
                    name: name.to_string(),
                })?;
            passed.insert(self.expand(name, args)?, self.expand(raw, args)?);
        }
        Ok(passed)
    }

    fn parse_node(&self, element: &Element, scope: &FileScope) -> Result<Option<LaunchNode>, ElementError> {
        if !self.is_enabled(element, &scope.args)? {
            return Ok(None);
        }

        let is_test = element.tag == TEST_TAG;
        let name_attribute = if is_test { "test-name" } else { "name" };

        let package = required(element, "pkg")?;
        let node_type = required(element, "type")?;
        let name = required(element, name_attribute)?;

        Ok(Some(LaunchNode {
            owner: scope.id,
            package: self.expand(package, &scope.args)?,
            node_type: self.expand(node_type, &scope.args)?,
            name: self.expand(name, &scope.args)?,
            is_test,
        }))
    }

    /// Evaluate the `if` and `unless` attributes of an element
    fn is_enabled(&self, element: &Element, args: &ArgumentTable) -> Result<bool, ElementError> {
        if let Some(condition) = element.attribute("if") {
            let value = self.expand(condition, args)?;
            match value.to_lowercase().as_str() {
                "true" | "1" => {}
                "false" | "0" => return Ok(false),
                _ => return Err(ElementError::invalid_boolean("if", value)),
            }
        }

        if let Some(condition) = element.attribute("unless") {
            let value = self.expand(condition, args)?;
            match value.to_lowercase().as_str() {
                "false" | "0" => {}
                "true" | "1" => return Ok(false),
                _ => return Err(ElementError::invalid_boolean("unless", value)),
            }
        }

        Ok(true)
    }

    fn expand(&self, text: &str, args: &ArgumentTable) -> Result<String, ElementError> {
        Ok(self.resolver.resolve(text, args)?)
    }
}

fn required<'e>(element: &'e Element, attribute: &str) -> Result<&'e str, ElementError> {
    element
        .attribute(attribute)
        .ok_or_else(|| ElementError::missing_attribute(&element.tag, attribute))
}
