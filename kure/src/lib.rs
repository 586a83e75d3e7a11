#![warn(missing_docs)]
//! Compiles a fleet directory (a `cluster.yaml` plus ApplicationWrapper
//! files) into a GitOps-ready directory tree or tar archive, wiring
//! together the Stack Model, Layout Planner, Workflow Engine, and Writer.

mod error;
mod fleet;

use std::io::Write;
use std::path::Path;

use kure_layout::{LayoutRules, Plan};
use kure_stack::Cluster;
use tracing::{info, instrument};

pub use error::{Error, Result};
pub use fleet::load as load_fleet;

/// Compiles `fleet_dir` according to `rules`, using the GitOps provider
/// named on `cluster.gitops.provider`, and returns the finished `Plan`
/// (with that provider's index objects and bootstrap manifests already
/// grafted on).
#[instrument(skip_all, fields(dir = %fleet_dir.display()))]
pub fn compile(fleet_dir: &Path, rules: &LayoutRules) -> Result<Plan> {
    let cluster = fleet::load(fleet_dir)?;
    compile_cluster(&cluster, rules)
}

/// Runs the Planner and Workflow Engine over an already-loaded `Cluster`.
#[instrument(skip_all)]
pub fn compile_cluster(cluster: &Cluster, rules: &LayoutRules) -> Result<Plan> {
    let workflow = kure_workflow::for_provider(&cluster.gitops.provider)?;
    let mut plan = kure_layout::plan(cluster, rules)?;
    workflow.apply(cluster, &mut plan, rules)?;
    if cluster.gitops.bootstrap.enabled {
        let bootstrap = workflow.bootstrap_objects(cluster, rules)?;
        info!(objects = bootstrap.len(), mode = workflow.bootstrap_mode(), "generated bootstrap objects");
        graft_bootstrap(&mut plan, workflow.bootstrap_dir(), bootstrap);
    }
    info!(paths = plan.root.paths().len(), "compilation complete");
    Ok(plan)
}

fn graft_bootstrap(plan: &mut Plan, dir_name: &str, objects: Vec<kure_scheme::Object>) {
    if objects.is_empty() {
        return;
    }
    let path = plan.root.path.join(dir_name);
    match plan.root.find_mut(&path) {
        Some(existing) => existing.resources.extend(objects),
        None => plan.root.insert_child(kure_layout::ManifestLayout {
            name: dir_name.to_string(),
            path,
            resources: objects,
            children: Vec::new(),
            package_ref: None,
        }),
    }
}

/// Writes a `Plan` to disk under `out_dir`.
pub fn write_fs(plan: &Plan, config: &kure_writer::WriterConfig, rules: &LayoutRules) -> Result<()> {
    kure_writer::write_fs(&plan.root, config, rules)?;
    Ok(())
}

/// Writes a `Plan` into a tar archive.
pub fn write_tar<W: Write>(plan: &Plan, config: &kure_writer::WriterConfig, rules: &LayoutRules, into: W) -> Result<()> {
    kure_writer::write_tar(&plan.root, config, rules, into)?;
    Ok(())
}

/// Runs the Parser and Stack construction/validation only, without the
/// Planner, Workflow Engine, or Writer (the `kure validate` subcommand).
pub fn validate(fleet_dir: &Path) -> Result<()> {
    fleet::load(fleet_dir)?;
    Ok(())
}
