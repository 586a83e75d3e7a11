#![warn(missing_docs)]
//! The Workflow Engine: turns a planned [`kure_layout::Plan`] into GitOps
//! index objects (Flux `Kustomization`s or Argo CD `Application`s) and
//! grafts them onto the tree, preserving the path-correspondence invariant
//! between every index object's `spec.path`/`spec.source.path` and an
//! actually planned directory.

mod argocd;
mod error;
mod flux;
mod path;
mod registry;

use kure_layout::{LayoutRules, Plan};
use kure_scheme::Object;
use kure_stack::Cluster;

pub use argocd::ArgoWorkflow;
pub use error::{Error, Result};
pub use flux::FluxWorkflow;
pub use registry::for_provider;

/// A pluggable GitOps Workflow Engine: Flux and Argo CD both implement
/// this, and `for_provider` picks one by `cluster.yaml`'s
/// `gitOps.provider` string.
pub trait Workflow {
    /// The bootstrap mode this engine advertises, e.g. `"flux-system"` or
    /// `"app-of-apps"` (§4.7, §6).
    fn bootstrap_mode(&self) -> &'static str;

    /// The directory name `bootstrap_objects` should be grafted under,
    /// e.g. `"flux-system"` or `"argocd"`.
    fn bootstrap_dir(&self) -> &'static str;

    /// Generates this engine's index objects for `cluster` and grafts them
    /// onto `plan` in place.
    fn apply(&self, cluster: &Cluster, plan: &mut Plan, rules: &LayoutRules) -> Result<()>;

    /// The Object set needed to install this engine's own controller and
    /// point it at the fleet's root directory.
    fn bootstrap_objects(&self, cluster: &Cluster, rules: &LayoutRules) -> Result<Vec<Object>>;
}

impl Workflow for FluxWorkflow {
    fn bootstrap_mode(&self) -> &'static str {
        flux::BOOTSTRAP_MODE
    }

    fn bootstrap_dir(&self) -> &'static str {
        "flux-system"
    }

    fn apply(&self, cluster: &Cluster, plan: &mut Plan, rules: &LayoutRules) -> Result<()> {
        let index = self.generate_index(cluster, plan);
        self.integrate(plan, rules, index)
    }

    fn bootstrap_objects(&self, cluster: &Cluster, rules: &LayoutRules) -> Result<Vec<Object>> {
        self.bootstrap(cluster, rules)
    }
}

impl Workflow for ArgoWorkflow {
    fn bootstrap_mode(&self) -> &'static str {
        argocd::BOOTSTRAP_MODE
    }

    fn bootstrap_dir(&self) -> &'static str {
        "argocd"
    }

    fn apply(&self, cluster: &Cluster, plan: &mut Plan, _rules: &LayoutRules) -> Result<()> {
        let index = self.generate_index(cluster, plan);
        self.integrate(plan, index)
    }

    fn bootstrap_objects(&self, cluster: &Cluster, _rules: &LayoutRules) -> Result<Vec<Object>> {
        self.bootstrap(cluster)
    }
}
