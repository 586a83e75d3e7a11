use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use kure_generators::AppContext;
use kure_scheme::{Gvk, Object};
use kure_stack::{BundleId, Cluster, NodeId};
use tracing::{debug, instrument};

use crate::error::Result;
use crate::layout::ManifestLayout;
use crate::rules::{Grouping, LayoutRules};

/// The key a package-aware plan groups under when a Node carries no
/// `PackageRef` of its own and inherits none from an ancestor.
pub const DEFAULT_PACKAGE_KEY: &str = "default";

/// The Layout Planner's full output: the directory tree, plus lookup
/// tables a Workflow Engine uses to place its GitOps index Objects at the
/// directory that corresponds to a given Node or Bundle.
#[derive(Clone, Debug)]
pub struct Plan {
    pub root: ManifestLayout,
    pub node_paths: BTreeMap<NodeId, PathBuf>,
    pub bundle_paths: BTreeMap<BundleId, PathBuf>,
}

/// A partially-assembled directory: the Resources and child directories
/// that belong directly under some not-yet-wrapped path. Collapsing a
/// `Flat`-grouped level means splicing its Fragment into the caller's
/// Fragment instead of wrapping it in a new [`ManifestLayout`].
#[derive(Default)]
struct Fragment {
    resources: Vec<Object>,
    children: Vec<ManifestLayout>,
}

fn base_path(rules: &LayoutRules) -> PathBuf {
    let base = PathBuf::from(&rules.manifests_dir);
    match &rules.cluster_name {
        Some(name) => base.join(name),
        None => base,
    }
}

/// Walks `cluster` and emits the single `ManifestLayout` tree `rules`
/// describes, rooted at the Cluster's root Node. Never touches the
/// filesystem.
#[instrument(skip_all)]
pub fn plan(cluster: &Cluster, rules: &LayoutRules) -> Result<Plan> {
    let mut node_paths = BTreeMap::new();
    let mut bundle_paths = BTreeMap::new();
    let base = base_path(rules);
    let root_id = cluster.root();
    let frag = node_fragment(cluster, root_id, &base, rules, &mut node_paths, &mut bundle_paths)?;
    let root = ManifestLayout {
        name: String::new(),
        path: base,
        resources: frag.resources,
        children: frag.children,
        package_ref: cluster.effective_package_ref(root_id).cloned(),
    };
    debug!(paths = root.paths().len(), "planned layout");
    Ok(Plan {
        root,
        node_paths,
        bundle_paths,
    })
}

fn sorted_children(cluster: &Cluster, node_id: NodeId) -> Vec<NodeId> {
    let mut children: Vec<NodeId> = cluster.node(node_id).children().to_vec();
    children.sort_by(|&a, &b| cluster.node(a).name.cmp(&cluster.node(b).name));
    children
}

fn node_fragment(
    cluster: &Cluster,
    node_id: NodeId,
    own_path: &Path,
    rules: &LayoutRules,
    node_paths: &mut BTreeMap<NodeId, PathBuf>,
    bundle_paths: &mut BTreeMap<BundleId, PathBuf>,
) -> Result<Fragment> {
    node_paths.insert(node_id, own_path.to_path_buf());
    let node = cluster.node(node_id);

    let bundle_frag = bundle_fragment(cluster, node.bundle, own_path, rules, bundle_paths)?;
    let mut resources = bundle_frag.resources;
    let mut children = bundle_frag.children;

    for child_id in sorted_children(cluster, node_id) {
        let child_name = cluster.node(child_id).name.clone();
        match rules.node_grouping {
            Grouping::ByName => {
                let child_path = own_path.join(&child_name);
                let child_frag = node_fragment(cluster, child_id, &child_path, rules, node_paths, bundle_paths)?;
                children.push(ManifestLayout {
                    name: child_name,
                    path: child_path,
                    resources: child_frag.resources,
                    children: child_frag.children,
                    package_ref: cluster.effective_package_ref(child_id).cloned(),
                });
            }
            Grouping::Flat => {
                let child_frag = node_fragment(cluster, child_id, own_path, rules, node_paths, bundle_paths)?;
                resources.extend(child_frag.resources);
                children.extend(child_frag.children);
            }
        }
    }

    Ok(Fragment { resources, children })
}

fn bundle_fragment(
    cluster: &Cluster,
    bundle_id: BundleId,
    own_path: &Path,
    rules: &LayoutRules,
    bundle_paths: &mut BTreeMap<BundleId, PathBuf>,
) -> Result<Fragment> {
    let bundle = cluster.bundle(bundle_id);

    let bundle_path = match rules.bundle_grouping {
        Grouping::ByName => own_path.join(&bundle.name),
        Grouping::Flat => own_path.to_path_buf(),
    };
    bundle_paths.insert(bundle_id, bundle_path.clone());

    let mut resources = Vec::new();
    let mut children = Vec::new();

    for app in bundle.applications() {
        let ctx = AppContext {
            name: &app.name,
            namespace: &app.namespace,
        };
        let objects = app.config.generate(&ctx)?;
        match rules.application_grouping {
            Grouping::ByName => {
                let app_path = bundle_path.join(&app.name);
                children.push(ManifestLayout {
                    name: app.name.clone(),
                    path: app_path,
                    resources: objects,
                    children: Vec::new(),
                    package_ref: None,
                });
            }
            Grouping::Flat => resources.extend(objects),
        }
    }

    if rules.bundle_grouping.is_by_name() {
        Ok(Fragment {
            resources: Vec::new(),
            children: vec![ManifestLayout {
                name: bundle.name.clone(),
                path: bundle_path,
                resources,
                children,
                package_ref: None,
            }],
        })
    } else {
        Ok(Fragment { resources, children })
    }
}

/// The string a [`Gvk`] groups under in a package-aware plan.
pub fn package_key(gvk: &Gvk) -> String {
    gvk.to_string()
}

/// Groups the Node tree by each Node's effective `PackageRef` instead of by
/// Node identity: returns one `ManifestLayout` per distinct package key (or
/// [`DEFAULT_PACKAGE_KEY`] for Nodes with no effective `PackageRef`), each a
/// complete, independent tree that preserves the ordinary directory
/// hierarchy down to wherever that package's resources live, but contains
/// none of another package's content — satisfying P8.
#[instrument(skip_all)]
pub fn plan_by_package(cluster: &Cluster, rules: &LayoutRules) -> Result<BTreeMap<String, ManifestLayout>> {
    let mut node_paths = BTreeMap::new();
    let mut bundle_paths = BTreeMap::new();
    let base = base_path(rules);
    let root_id = cluster.root();
    let keyed = node_fragment_keyed(
        cluster,
        root_id,
        &base,
        DEFAULT_PACKAGE_KEY,
        rules,
        &mut node_paths,
        &mut bundle_paths,
    )?;

    let mut result = BTreeMap::new();
    for (key, frag) in keyed {
        if frag.resources.is_empty() && frag.children.is_empty() {
            continue;
        }
        result.insert(
            key,
            ManifestLayout {
                name: String::new(),
                path: base.clone(),
                resources: frag.resources,
                children: frag.children,
                package_ref: None,
            },
        );
    }
    Ok(result)
}

fn node_fragment_keyed(
    cluster: &Cluster,
    node_id: NodeId,
    own_path: &Path,
    inherited_key: &str,
    rules: &LayoutRules,
    node_paths: &mut BTreeMap<NodeId, PathBuf>,
    bundle_paths: &mut BTreeMap<BundleId, PathBuf>,
) -> Result<BTreeMap<String, Fragment>> {
    node_paths.insert(node_id, own_path.to_path_buf());
    let node = cluster.node(node_id);
    let this_key = node
        .package_ref
        .as_ref()
        .map(package_key)
        .unwrap_or_else(|| inherited_key.to_string());

    let mut result: BTreeMap<String, Fragment> = BTreeMap::new();
    let bundle_frag = bundle_fragment(cluster, node.bundle, own_path, rules, bundle_paths)?;
    {
        let entry = result.entry(this_key.clone()).or_default();
        entry.resources.extend(bundle_frag.resources);
        entry.children.extend(bundle_frag.children);
    }

    for child_id in sorted_children(cluster, node_id) {
        let child_name = cluster.node(child_id).name.clone();
        match rules.node_grouping {
            Grouping::ByName => {
                let child_path = own_path.join(&child_name);
                let child_map =
                    node_fragment_keyed(cluster, child_id, &child_path, &this_key, rules, node_paths, bundle_paths)?;
                for (key, frag) in child_map {
                    if frag.resources.is_empty() && frag.children.is_empty() {
                        continue;
                    }
                    let layout = ManifestLayout {
                        name: child_name.clone(),
                        path: child_path.clone(),
                        resources: frag.resources,
                        children: frag.children,
                        package_ref: cluster.effective_package_ref(child_id).cloned(),
                    };
                    result.entry(key).or_default().children.push(layout);
                }
            }
            Grouping::Flat => {
                let child_map =
                    node_fragment_keyed(cluster, child_id, own_path, &this_key, rules, node_paths, bundle_paths)?;
                for (key, frag) in child_map {
                    let entry = result.entry(key).or_default();
                    entry.resources.extend(frag.resources);
                    entry.children.extend(frag.children);
                }
            }
        }
    }

    Ok(result)
}
