//! Launch tree entities

use std::path::{Component, Path, PathBuf};

use crate::error::{ElementError, GraphError, Span};
use crate::substitution::ArgumentTable;

/// Index of a launch file inside a [`LaunchTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub(crate) usize);

impl FileId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A process declared by a `<node>` or `<test>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchNode {
    /// The launch file whose markup declared this node
    pub owner: FileId,
    pub package: String,
    pub node_type: String,
    pub name: String,
    pub is_test: bool,
}

impl LaunchNode {
    /// Identity used when counting unique nodes
    pub fn identity(&self) -> (&str, &str, &str) {
        (&self.package, &self.node_type, &self.name)
    }
}

/// An `<include>` edge
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Include {
    pub target: FileId,
    /// Resolved path of the included file
    pub path: PathBuf,
    /// The target had already been visited, so it was not parsed again
    pub cycle: bool,
}

/// A launch element that failed and was skipped
#[derive(Debug)]
pub struct Diagnostic {
    /// Launch file containing the element
    pub file: PathBuf,
    /// Tag of the skipped element
    pub element: String,
    pub span: Span,
    pub error: ElementError,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: skipped <{}>: {}",
            self.file.display(),
            self.element,
            self.error
        )
    }
}

/// A single launch file and everything it declares directly
#[derive(Debug)]
pub struct LaunchFile {
    pub(crate) path: PathBuf,
    pub(crate) missing: bool,
    pub(crate) args: ArgumentTable,
    pub(crate) includes: Vec<Include>,
    pub(crate) nodes: Vec<LaunchNode>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

impl LaunchFile {
    pub(crate) fn new(path: PathBuf, missing: bool) -> Self {
        Self {
            path,
            missing,
            args: ArgumentTable::new(),
            includes: Vec::new(),
            nodes: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file did not exist when it was referenced
    pub fn is_missing(&self) -> bool {
        self.missing
    }

    /// Arguments declared in this file, resolved
    pub fn args(&self) -> &ArgumentTable {
        &self.args
    }

    pub fn includes(&self) -> &[Include] {
        &self.includes
    }

    pub fn nodes(&self) -> &[LaunchNode] {
        &self.nodes
    }

    /// Elements skipped because of an error
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Paths of includes that point back to an already visited file
    pub fn cycles(&self) -> impl Iterator<Item = &Path> {
        self.includes
            .iter()
            .filter(|i| i.cycle)
            .map(|i| i.path.as_path())
    }

    /// Base name of the file, e.g. `camera.launch`
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// File stem with every non-alphanumeric character replaced by `_`
    pub fn clean_name(&self) -> String {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        clean_identifier(&stem)
    }

    /// Name of the package that contains this file
    ///
    /// The package is the directory right before the first `launch`
    /// directory in the path.
    pub fn package_name(&self) -> Result<String, GraphError> {
        let components: Vec<Component<'_>> = self.path.components().collect();
        // the `launch` segment must be a directory, not the file itself
        let last = components.len().saturating_sub(1);
        components
            .iter()
            .enumerate()
            .take(last)
            .skip(1)
            .find(|(_, c)| c.as_os_str() == "launch")
            .and_then(|(i, _)| match components[i - 1] {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .ok_or_else(|| GraphError::PackageNameDerivation {
                path: self.path.clone(),
            })
    }
}

/// Replace every character that is not ASCII alphanumeric with `_`
pub fn clean_identifier(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Identity of a launch file: the path made absolute against the current
/// directory, then normalized
pub fn absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return normalize_path(path);
    }
    match std::env::current_dir() {
        Ok(cwd) => normalize_path(&cwd.join(path)),
        Err(e) => {
            log::warn!("could not read the current directory: {}", e);
            normalize_path(path)
        }
    }
}

/// Lexically normalize a path: drop `.` and fold `..` where possible
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let can_pop = matches!(
                    normalized.components().next_back(),
                    Some(Component::Normal(_))
                );
                if can_pop {
                    normalized.pop();
                } else if !matches!(
                    normalized.components().next_back(),
                    Some(Component::RootDir | Component::Prefix(_))
                ) {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Every launch file reached during one resolution run
#[derive(Debug)]
pub struct LaunchTree {
    pub(crate) files: Vec<LaunchFile>,
    pub(crate) root: FileId,
}

impl LaunchTree {
    pub fn root_id(&self) -> FileId {
        self.root
    }

    pub fn root(&self) -> &LaunchFile {
        self.get(self.root)
    }

    pub fn get(&self, id: FileId) -> &LaunchFile {
        &self.files[id.0]
    }

    /// All files in allocation order
    pub fn files(&self) -> impl Iterator<Item = (FileId, &LaunchFile)> {
        self.files
            .iter()
            .enumerate()
            .map(|(i, file)| (FileId(i), file))
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Diagnostics of every file
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.files.iter().flat_map(|f| f.diagnostics.iter())
    }

    /// Take the diagnostics of every file, in allocation order
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.files
            .into_iter()
            .flat_map(|f| f.diagnostics)
            .collect()
    }
}
