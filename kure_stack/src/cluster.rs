use std::collections::HashSet;

use kure_scheme::Gvk;
use tracing::{debug, instrument};

use crate::bundle::Bundle;
use crate::error::{Error, Result};
use crate::ids::{BundleId, NodeId};
use crate::node::Node;

/// Where and how this Cluster's Bundles get pushed: which GitOps tooling
/// owns reconciliation and what the generated index objects should be
/// named/placed as.
#[derive(Clone, Debug)]
pub struct GitOpsConfig {
    pub provider: String,
    pub cluster_name: String,
    /// The Git repository the fleet is pushed to; becomes the Flux
    /// `GitRepository` source URL or the Argo CD `Application`'s
    /// `spec.source.repoURL`.
    pub repo_url: String,
    pub bootstrap: BootstrapConfig,
}

/// The controller-install bootstrap this Cluster wants, mirroring the
/// `gitOps.bootstrap` field of the on-disk `cluster.yaml` (§6).
#[derive(Clone, Debug, Default)]
pub struct BootstrapConfig {
    pub enabled: bool,
    /// Flux advertises a single bootstrap mode (`"flux-system"`); this is
    /// forwarded to the Workflow Engine verbatim and otherwise opaque to
    /// the Stack Model.
    pub flux_mode: Option<String>,
}

/// The full tree of Nodes and Bundles that make up one target cluster's
/// manifests. Owns every Node and Bundle in a flat arena; Nodes and
/// Bundles refer to each other (and to their parents) only by [`NodeId`]
/// / [`BundleId`], so the structure can never form an ownership cycle.
#[derive(Debug)]
pub struct Cluster {
    pub gitops: GitOpsConfig,
    nodes: Vec<Node>,
    bundles: Vec<Bundle>,
    root: NodeId,
}

impl Cluster {
    /// Creates a Cluster with a single, unnamed root Node and an empty
    /// root Bundle.
    pub fn new(gitops: GitOpsConfig) -> Self {
        let mut bundles = Vec::new();
        bundles.push(Bundle::new("root"));
        let root_bundle = BundleId(0);

        let mut nodes = Vec::new();
        nodes.push(Node {
            name: String::new(),
            package_ref: None,
            bundle: root_bundle,
            children: Vec::new(),
            parent: None,
        });
        let root = NodeId(0);
        bundles[0].set_parent(root);

        Cluster {
            gitops,
            nodes,
            bundles,
            root,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn bundle(&self, id: BundleId) -> &Bundle {
        &self.bundles[id.0]
    }

    pub fn bundle_mut(&mut self, id: BundleId) -> &mut Bundle {
        &mut self.bundles[id.0]
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn bundles(&self) -> impl Iterator<Item = (BundleId, &Bundle)> {
        self.bundles.iter().enumerate().map(|(i, b)| (BundleId(i), b))
    }

    /// Adds a child Node under `parent`, carrying a fresh empty Bundle of
    /// its own. Returns the new Node's id.
    pub fn add_node(&mut self, parent: NodeId, name: impl Into<String>) -> Result<NodeId> {
        let name = name.into();
        if self.nodes[parent.0]
            .children
            .iter()
            .any(|&c| self.nodes[c.0].name == name)
        {
            return Err(Error::DuplicateName {
                kind: "Node",
                name,
            });
        }

        let bundle_id = BundleId(self.bundles.len());
        self.bundles.push(Bundle::new(format!("{name}-bundle")));

        let node_id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            name,
            package_ref: None,
            bundle: bundle_id,
            children: Vec::new(),
            parent: Some(parent),
        });
        self.bundles[bundle_id.0].set_parent(node_id);
        self.nodes[parent.0].children.push(node_id);
        Ok(node_id)
    }

    pub fn set_package_ref(&mut self, node: NodeId, package_ref: Gvk) {
        self.nodes[node.0].package_ref = Some(package_ref);
    }

    /// Walks from `node` up through its ancestors and returns the nearest
    /// one (including `node` itself) carrying an explicit `package_ref`.
    pub fn effective_package_ref(&self, node: NodeId) -> Option<&Gvk> {
        let mut current = Some(node);
        while let Some(id) = current {
            let n = &self.nodes[id.0];
            if let Some(ref gvk) = n.package_ref {
                return Some(gvk);
            }
            current = n.parent;
        }
        None
    }

    /// Checks every Bundle name is unique and that `Bundle::depends_on`
    /// forms no cycle across the whole Cluster.
    #[instrument(skip_all, fields(bundles = self.bundles.len()))]
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for bundle in &self.bundles {
            if !seen.insert(bundle.name.as_str()) {
                return Err(Error::DuplicateName {
                    kind: "Bundle",
                    name: bundle.name.clone(),
                });
            }
        }

        let mut visited = vec![false; self.bundles.len()];
        let mut on_stack = vec![false; self.bundles.len()];
        let mut path = Vec::new();
        for start in 0..self.bundles.len() {
            if !visited[start] {
                self.visit_bundle(start, &mut visited, &mut on_stack, &mut path)?;
            }
        }
        debug!("cluster validated");
        Ok(())
    }

    fn visit_bundle(
        &self,
        index: usize,
        visited: &mut [bool],
        on_stack: &mut [bool],
        path: &mut Vec<String>,
    ) -> Result<()> {
        visited[index] = true;
        on_stack[index] = true;
        path.push(self.bundles[index].name.clone());

        for dep in &self.bundles[index].depends_on {
            if on_stack[dep.0] {
                let mut cycle = path.clone();
                cycle.push(self.bundles[dep.0].name.clone());
                return Err(Error::DependencyCycle(cycle));
            }
            if !visited[dep.0] {
                self.visit_bundle(dep.0, visited, on_stack, path)?;
            }
        }

        path.pop();
        on_stack[index] = false;
        Ok(())
    }
}
