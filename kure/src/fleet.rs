//! Loads a fleet directory (one `cluster.yaml` plus ApplicationWrapper
//! files under each leaf Node's own subdirectory) into a [`kure_stack::Cluster`].

use std::path::Path;

use kure_scheme::Gvk;
use kure_stack::{BootstrapConfig, Cluster, GitOpsConfig};
use serde::Deserialize;
use tracing::{debug, instrument, trace};

use crate::error::{Error, Result};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FleetDoc {
    name: String,
    #[serde(rename = "gitOps")]
    git_ops: GitOpsDoc,
    node: NodeDoc,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GitOpsDoc {
    #[serde(rename = "type")]
    provider: String,
    repo_url: String,
    #[serde(default)]
    bootstrap: BootstrapDoc,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct BootstrapDoc {
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    flux_mode: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NodeDoc {
    name: String,
    #[serde(default)]
    children: Vec<NodeDoc>,
    #[serde(default)]
    package_ref: Option<GvkDoc>,
}

#[derive(Deserialize)]
struct GvkDoc {
    group: String,
    version: String,
    kind: String,
}

/// Loads `fleet_dir/cluster.yaml` and every leaf Node's sibling
/// ApplicationWrapper files into a fully-populated [`Cluster`].
#[instrument(skip_all, fields(dir = %fleet_dir.display()))]
pub fn load(fleet_dir: &Path) -> Result<Cluster> {
    let cluster_yaml = fleet_dir.join("cluster.yaml");
    let text = std::fs::read_to_string(&cluster_yaml)?;
    let doc: FleetDoc = serde_yaml::from_str(&text)?;

    let gitops = GitOpsConfig {
        provider: doc.git_ops.provider,
        cluster_name: doc.name,
        repo_url: doc.git_ops.repo_url,
        bootstrap: BootstrapConfig {
            enabled: doc.git_ops.bootstrap.enabled,
            flux_mode: doc.git_ops.bootstrap.flux_mode,
        },
    };
    let mut cluster = Cluster::new(gitops);
    let root = cluster.root();
    load_node(fleet_dir, &mut cluster, root, &doc.node, fleet_dir)?;
    cluster.validate()?;
    debug!("fleet loaded");
    Ok(cluster)
}

fn load_node(fleet_dir: &Path, cluster: &mut Cluster, node_id: kure_stack::NodeId, doc: &NodeDoc, dir: &Path) -> Result<()> {
    if let Some(package_ref) = &doc.package_ref {
        cluster.set_package_ref(node_id, Gvk::new(&package_ref.group, &package_ref.version, &package_ref.kind));
    }

    if doc.children.is_empty() {
        let bundle_id = cluster.node(node_id).bundle;
        for app in load_application_wrappers(fleet_dir, dir)? {
            cluster.bundle_mut(bundle_id).add_application(app)?;
        }
        return Ok(());
    }

    for child in &doc.children {
        let child_id = cluster.add_node(node_id, child.name.clone())?;
        let child_dir = dir.join(&child.name);
        load_node(fleet_dir, cluster, child_id, child, &child_dir)?;
    }
    Ok(())
}

/// Parses every `*.yaml`/`*.yml` file directly under `dir`, in sorted
/// directory order, decoding each document as an `ApplicationWrapper`.
fn load_application_wrappers(fleet_dir: &Path, dir: &Path) -> Result<Vec<kure_stack::Application>> {
    if !dir.is_dir() {
        return Err(Error::fleet_invalid(
            dir.strip_prefix(fleet_dir).unwrap_or(dir),
            "leaf node has no corresponding directory of ApplicationWrapper files",
        ));
    }

    let mut paths: Vec<_> = walkdir::WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| matches!(e.path().extension().and_then(std::ffi::OsStr::to_str), Some("yaml") | Some("yml")))
        .map(|e| e.path().to_path_buf())
        .collect();
    paths.sort();

    let mut apps = Vec::new();
    for path in paths {
        let text = std::fs::read_to_string(&path)?;
        for (index, document) in serde_yaml::Deserializer::from_str(&text).enumerate() {
            let value = serde_yaml::Value::deserialize(document).map_err(|e| Error::ParseInvalid {
                path: path.clone(),
                index,
                reason: e.to_string(),
            })?;
            if value.is_null() {
                trace!(path = %path.display(), index, "skipped empty document");
                continue;
            }
            let json: serde_json::Value = serde_json::to_value(&value).map_err(|e| Error::ParseInvalid {
                path: path.clone(),
                index,
                reason: e.to_string(),
            })?;
            let api_version = json.pointer("/apiVersion").and_then(|v| v.as_str()).unwrap_or_default();
            let kind = json.pointer("/kind").and_then(|v| v.as_str()).unwrap_or_default();
            let gvk = Gvk::from_api_version(api_version, kind);
            let decoded = kure_generators::decode_application_wrapper(&json, &gvk)?;
            apps.push(kure_stack::Application {
                name: decoded.name,
                namespace: decoded.namespace,
                config: decoded.config,
            });
        }
    }
    Ok(apps)
}
