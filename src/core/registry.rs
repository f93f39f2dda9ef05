//! Package registry.
//!
//! The registry interns packages by identity. Files of the reserved entry
//! package that declare the entry function are kept apart, one node per
//! file, so every such file can become its own executable target.
//!
//! The registry is filled during discovery and only borrowed immutably while
//! building; build targets that need extra content are cloned out of it
//! instead of being modified in place.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::classify::ImportClass;
use crate::core::package::{NodeKey, PackageKind, PackageNode};
use crate::core::source_file::{SourceFile, ENTRY_PACKAGE, SOURCE_EXTENSION};

/// Result of [`PackageRegistry::merge`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Source content appended to the target; counts of new items
    Merged { files: usize, dependencies: usize },
    /// Target and source are the same node; nothing changed
    SelfMerge,
    /// One of the keys is unknown
    Missing(NodeKey),
}

/// Packages discovered in a source tree.
#[derive(Debug, Clone, Default)]
pub struct PackageRegistry {
    packages: BTreeMap<String, PackageNode>,
    entries: BTreeMap<PathBuf, PackageNode>,
}

impl PackageRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        PackageRegistry::default()
    }

    /// Make sure a node exists for an imported package.
    ///
    /// A `Local` classification promotes an existing node; nothing ever
    /// downgrades a node that is already local.
    pub fn ensure_dependency(&mut self, import: &ImportClass) -> &PackageNode {
        let node = self
            .packages
            .entry(import.identity.clone())
            .or_insert_with(|| PackageNode::new(&import.identity));
        node.set_kind(import.kind);
        node
    }

    /// Register a file under `identity` together with its dependency edges.
    ///
    /// Entry-package files declaring the entry function get a node of their
    /// own, keyed by file path. Returns the key the file was stored under.
    pub fn add_or_merge_file(
        &mut self,
        mut file: SourceFile,
        identity: &str,
        dependencies: &[String],
    ) -> NodeKey {
        file.set_package(identity);
        let file = Arc::new(file);

        if identity == ENTRY_PACKAGE && file.has_entry_point() {
            let path = file.path().to_path_buf();
            let mut node = PackageNode::new(ENTRY_PACKAGE)
                .with_kind(PackageKind::Local)
                .with_output_name(default_output_name(&path));
            node.add_file(file);
            for dep in dependencies {
                node.add_dependency(dep.as_str());
            }

            tracing::debug!("registered entry file {}", path.display());
            self.entries.insert(path.clone(), node);
            return NodeKey::EntryFile(path);
        }

        let node = self
            .packages
            .entry(identity.to_string())
            .or_insert_with(|| PackageNode::new(identity));
        node.add_file(file);
        for dep in dependencies {
            node.add_dependency(dep.as_str());
        }

        NodeKey::Package(identity.to_string())
    }

    /// Merge the node at `source` into the node at `target`.
    ///
    /// Repeating a merge adds nothing. Merging a node into itself is refused.
    pub fn merge(&mut self, target: &NodeKey, source: &NodeKey) -> MergeOutcome {
        if target == source {
            tracing::warn!("refusing to merge package {} into itself", target);
            return MergeOutcome::SelfMerge;
        }

        let Some(source_node) = self.node(source).cloned() else {
            return MergeOutcome::Missing(source.clone());
        };
        let Some(target_node) = self.node_mut(target) else {
            return MergeOutcome::Missing(target.clone());
        };

        let (files, dependencies) = target_node.merge(&source_node);
        MergeOutcome::Merged {
            files,
            dependencies,
        }
    }

    /// Build the node for one executable target.
    ///
    /// With `merge_shared` the entry node is cloned and combined with the
    /// shared entry package (files of package `main` without an entry
    /// function). The registry itself is never modified, so the same entry
    /// file can be built any number of times in one run.
    pub fn entry_target(&self, path: &Path, merge_shared: bool) -> Option<PackageNode> {
        let entry = self.entries.get(path)?;
        let mut target = entry.clone();

        if merge_shared {
            if let Some(shared) = self.packages.get(ENTRY_PACKAGE) {
                target.merge(shared);
            }
        }

        Some(target)
    }

    /// Look up a shared package by identity.
    pub fn get(&self, identity: &str) -> Option<&PackageNode> {
        self.packages.get(identity)
    }

    /// Look up any node by key.
    pub fn node(&self, key: &NodeKey) -> Option<&PackageNode> {
        match key {
            NodeKey::Package(identity) => self.packages.get(identity),
            NodeKey::EntryFile(path) => self.entries.get(path),
        }
    }

    fn node_mut(&mut self, key: &NodeKey) -> Option<&mut PackageNode> {
        match key {
            NodeKey::Package(identity) => self.packages.get_mut(identity),
            NodeKey::EntryFile(path) => self.entries.get_mut(path),
        }
    }

    /// Shared packages in lexical identity order.
    pub fn packages(&self) -> impl Iterator<Item = &PackageNode> {
        self.packages.values()
    }

    /// Entry candidates in path order.
    pub fn entries(&self) -> impl Iterator<Item = (&Path, &PackageNode)> {
        self.entries.iter().map(|(p, n)| (p.as_path(), n))
    }

    /// Paths of all files declaring the entry function, sorted.
    pub fn entry_files(&self) -> Vec<&Path> {
        self.entries.keys().map(|p| p.as_path()).collect()
    }

    pub fn is_entry_file(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn package_count(&self) -> usize {
        self.packages.len()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Total number of registered files.
    pub fn file_count(&self) -> usize {
        self.packages
            .values()
            .chain(self.entries.values())
            .map(|n| n.files().len())
            .sum()
    }
}

/// Default executable name for an entry file: its path without the extension.
pub fn default_output_name(path: &Path) -> String {
    let stem = match path.extension() {
        Some(ext) if ext == SOURCE_EXTENSION => path.with_extension(""),
        _ => path.to_path_buf(),
    };
    crate::core::classify::normalize_separators(&stem)
}
