//! Package grouping and statistics

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use crate::error::GraphError;
use crate::launch::{FileId, LaunchFile, LaunchNode, LaunchTree};

/// Launch files and nodes belonging to one package
#[derive(Debug, Default)]
pub struct PackageGroup<'t> {
    pub files: Vec<FileId>,
    pub nodes: Vec<&'t LaunchNode>,
}

/// Summary numbers reported in the graph header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphStats {
    pub packages: usize,
    /// Distinct launch files, by path
    pub launch_files: usize,
    /// Distinct nodes, by (package, type, name)
    pub nodes: usize,
}

/// Everything reachable from the root, grouped by package
#[derive(Debug)]
pub struct LaunchGraph<'t> {
    tree: &'t LaunchTree,
    files: Vec<FileId>,
    nodes: Vec<&'t LaunchNode>,
    packages: BTreeMap<String, PackageGroup<'t>>,
    stats: GraphStats,
}

impl<'t> LaunchGraph<'t> {
    pub fn tree(&self) -> &'t LaunchTree {
        self.tree
    }

    pub fn root(&self) -> &'t LaunchFile {
        self.tree.root()
    }

    pub fn file(&self, id: FileId) -> &'t LaunchFile {
        self.tree.get(id)
    }

    /// Reachable files in depth-first include order
    pub fn files(&self) -> &[FileId] {
        &self.files
    }

    /// Nodes of every reachable file
    pub fn nodes(&self) -> &[&'t LaunchNode] {
        &self.nodes
    }

    /// Package groups sorted by package name
    pub fn packages(&self) -> &BTreeMap<String, PackageGroup<'t>> {
        &self.packages
    }

    pub fn stats(&self) -> GraphStats {
        self.stats
    }
}

/// Collect reachable files and nodes and group them by package
///
/// Fails if any reachable file lives outside a `<package>/launch/` directory.
pub fn assemble(tree: &LaunchTree) -> Result<LaunchGraph<'_>, GraphError> {
    let mut files = Vec::new();
    let mut seen = HashSet::new();
    collect_files(tree, tree.root_id(), &mut seen, &mut files);

    let nodes: Vec<&LaunchNode> = files
        .iter()
        .flat_map(|id| tree.get(*id).nodes().iter())
        .collect();

    let mut packages: BTreeMap<String, PackageGroup<'_>> = BTreeMap::new();
    for id in &files {
        let package = tree.get(*id).package_name()?;
        packages.entry(package).or_default().files.push(*id);
    }
    for node in &nodes {
        packages.entry(node.package.clone()).or_default().nodes.push(*node);
    }

    let unique_files: HashSet<&Path> = files.iter().map(|id| tree.get(*id).path()).collect();
    let unique_nodes: HashSet<(&str, &str, &str)> = nodes.iter().map(|n| n.identity()).collect();
    let stats = GraphStats {
        packages: packages.len(),
        launch_files: unique_files.len(),
        nodes: unique_nodes.len(),
    };

    log::debug!(
        "assembled graph: {} packages, {} launch files, {} nodes",
        stats.packages,
        stats.launch_files,
        stats.nodes
    );

    Ok(LaunchGraph {
        tree,
        files,
        nodes,
        packages,
        stats,
    })
}

fn collect_files(tree: &LaunchTree, id: FileId, seen: &mut HashSet<FileId>, out: &mut Vec<FileId>) {
    if !seen.insert(id) {
        return;
    }
    out.push(id);
    for include in tree.get(id).includes() {
        collect_files(tree, include.target, seen, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::launch::Include;

    fn file(path: &str) -> LaunchFile {
        LaunchFile::new(PathBuf::from(path), false)
    }

    fn node(owner: usize, package: &str, name: &str) -> LaunchNode {
        LaunchNode {
            owner: FileId(owner),
            package: package.to_string(),
            node_type: "t".to_string(),
            name: name.to_string(),
            is_test: false,
        }
    }

    fn include(target: usize, cycle: bool) -> Include {
        Include {
            target: FileId(target),
            path: PathBuf::new(),
            cycle,
        }
    }

    #[test]
    fn test_groups_by_package_in_name_order() {
        let mut root = file("/ws/zeta/launch/root.launch");
        root.includes = vec![include(1, false)];
        root.nodes = vec![node(0, "alpha", "a_node")];
        let mut child = file("/ws/alpha/launch/child.launch");
        child.nodes = vec![node(1, "zeta", "z_node")];
        let tree = LaunchTree {
            files: vec![root, child],
            root: FileId(0),
        };

        let graph = assemble(&tree).unwrap();
        let names: Vec<_> = graph.packages().keys().cloned().collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(graph.packages()["alpha"].files, vec![FileId(1)]);
        assert_eq!(graph.packages()["alpha"].nodes[0].name, "a_node");
        assert_eq!(graph.packages()["zeta"].files, vec![FileId(0)]);
        assert_eq!(
            graph.stats(),
            GraphStats {
                packages: 2,
                launch_files: 2,
                nodes: 2
            }
        );
    }

    #[test]
    fn test_cycle_edges_do_not_repeat_files() {
        let mut a = file("/ws/p/launch/a.launch");
        a.includes = vec![include(1, false)];
        let mut b = file("/ws/p/launch/b.launch");
        b.includes = vec![include(0, true)];
        let tree = LaunchTree {
            files: vec![a, b],
            root: FileId(0),
        };

        let graph = assemble(&tree).unwrap();
        assert_eq!(graph.files(), &[FileId(0), FileId(1)]);
        assert_eq!(graph.stats().launch_files, 2);
    }

    #[test]
    fn test_unreachable_files_are_skipped() {
        let tree = LaunchTree {
            files: vec![file("/ws/p/launch/a.launch"), file("/ws/q/launch/orphan.launch")],
            root: FileId(0),
        };
        let graph = assemble(&tree).unwrap();
        assert_eq!(graph.files(), &[FileId(0)]);
        assert!(!graph.packages().contains_key("q"));
    }

    #[test]
    fn test_file_outside_package_fails() {
        let tree = LaunchTree {
            files: vec![file("/ws/loose.launch")],
            root: FileId(0),
        };
        assert!(matches!(
            assemble(&tree),
            Err(GraphError::PackageNameDerivation { .. })
        ));
    }
}
