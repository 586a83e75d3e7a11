use kure_scheme::Gvk;

use crate::ids::{BundleId, NodeId};

/// A node in the Cluster's tree: a directory-to-be, carrying exactly one
/// Bundle of Applications and any number of child Nodes.
#[derive(Debug)]
pub struct Node {
    pub name: String,
    pub package_ref: Option<Gvk>,
    pub bundle: BundleId,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
}

impl Node {
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}
