use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use kure_scheme::{Gvk, Object};

/// One directory-to-be in the final manifest tree: a relative path, the
/// Objects that directory's `kustomization.yaml` must account for, and its
/// child directories.
///
/// `path` is always relative to the repository root (it already includes
/// the `ManifestsDir` segment and, when set, `ClusterName`), so it can be
/// handed straight to a Workflow Engine for `spec.path`/`spec.source.path`
/// and straight to the Writer for directory creation.
#[derive(Clone, Debug)]
pub struct ManifestLayout {
    pub name: String,
    pub path: PathBuf,
    pub resources: Vec<Object>,
    pub children: Vec<ManifestLayout>,
    pub package_ref: Option<Gvk>,
}

impl ManifestLayout {
    /// Every directory path in this subtree, including `self`.
    pub fn paths(&self) -> BTreeSet<PathBuf> {
        let mut out = BTreeSet::new();
        self.collect_paths(&mut out);
        out
    }

    fn collect_paths(&self, out: &mut BTreeSet<PathBuf>) {
        out.insert(self.path.clone());
        for child in &self.children {
            child.collect_paths(out);
        }
    }

    /// Finds the subtree rooted at exactly `path`, by mutable reference, so
    /// a Workflow Engine can attach index Objects at the right directory.
    pub fn find_mut(&mut self, path: &Path) -> Option<&mut ManifestLayout> {
        if self.path == path {
            return Some(self);
        }
        self.children.iter_mut().find_map(|c| c.find_mut(path))
    }

    /// The subtree rooted at exactly `path`, by shared reference.
    pub fn find(&self, path: &Path) -> Option<&ManifestLayout> {
        if self.path == path {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(path))
    }

    /// Inserts `child` in sorted-by-name order among this node's children.
    /// Used by a Workflow Engine to graft a dedicated `flux-system`
    /// directory onto an already-planned tree.
    pub fn insert_child(&mut self, child: ManifestLayout) {
        let pos = self.children.partition_point(|c| c.name < child.name);
        self.children.insert(pos, child);
    }

    /// Whether this directory is non-empty (has a manifest file worth of
    /// Resources, or a non-empty child) and therefore must get a
    /// `kustomization.yaml` per §4.8/P4.
    pub fn is_emittable(&self) -> bool {
        !self.resources.is_empty() || self.children.iter().any(ManifestLayout::is_emittable)
    }
}
