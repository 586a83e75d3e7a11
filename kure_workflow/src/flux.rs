use k8s_openapi::api::core::v1::Namespace;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kure_layout::{FluxPlacement, LayoutRules, ManifestLayout, Plan};
use kure_scheme::types::flux::{
    FluxKustomization, FluxKustomizationSpec, GitRepository, GitRepositorySpec, LocalObjectReference, SourceRef,
};
use kure_scheme::Object;
use kure_stack::{BundleId, Cluster};
use tracing::instrument;

use crate::error::{Error, Result};
use crate::path::to_repo_path;

const NAMESPACE: &str = "flux-system";
const INTERVAL: &str = "10m";

/// The bootstrap mode the Flux Workflow Engine advertises (§4.7).
pub const BOOTSTRAP_MODE: &str = "flux-system";

/// One GitRepository source plus one Kustomization per Bundle, the way
/// `flux bootstrap` wires a fleet in a real cluster.
pub struct FluxIndex {
    pub source: Object,
    pub source_name: String,
    pub kustomizations: Vec<(BundleId, Object)>,
}

/// The Flux CD Workflow Engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct FluxWorkflow;

fn object_meta(name: &str, namespace: &str) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        ..Default::default()
    }
}

impl FluxWorkflow {
    /// Builds the GitRepository source and one Kustomization per Bundle,
    /// without touching the layout tree — see [`FluxWorkflow::integrate`].
    #[instrument(skip_all)]
    pub fn generate_index(&self, cluster: &Cluster, plan: &Plan) -> FluxIndex {
        let source_name = format!("{}-source", cluster.gitops.cluster_name);
        let source = kure_scheme::from_typed(&GitRepository {
            metadata: object_meta(&source_name, NAMESPACE),
            spec: GitRepositorySpec {
                url: cluster.gitops.repo_url.clone(),
                interval: INTERVAL.to_string(),
                reference: None,
                secret_ref: None,
            },
        });

        // The root bundle's own planned path is the manifests root itself
        // (there is no Node directory above it to collapse into), so a
        // Kustomization for it would reconcile the entire tree — including
        // `flux-system/` — and duplicate the root Kustomization `bootstrap`
        // already emits. Skip it; every other Bundle gets its own.
        let mut entries: Vec<(BundleId, std::path::PathBuf)> = plan
            .bundle_paths
            .iter()
            .filter(|(_, path)| *path != &plan.root.path)
            .map(|(id, path)| (*id, path.clone()))
            .collect();
        entries.sort_by(|a, b| a.1.cmp(&b.1));

        let kustomizations = entries
            .into_iter()
            .map(|(bundle_id, path)| {
                let bundle = cluster.bundle(bundle_id);
                let depends_on = bundle
                    .depends_on
                    .iter()
                    .map(|dep| LocalObjectReference {
                        name: cluster.bundle(*dep).name.clone(),
                    })
                    .collect();
                let object = kure_scheme::from_typed(&FluxKustomization {
                    metadata: object_meta(&bundle.name, NAMESPACE),
                    spec: FluxKustomizationSpec {
                        path: to_repo_path(&path),
                        interval: INTERVAL.to_string(),
                        source_ref: SourceRef {
                            kind: "GitRepository".to_string(),
                            name: source_name.clone(),
                            namespace: Some(NAMESPACE.to_string()),
                        },
                        prune: Some(true),
                        depends_on,
                        target_namespace: None,
                    },
                });
                (bundle_id, object)
            })
            .collect();

        FluxIndex {
            source,
            source_name,
            kustomizations,
        }
    }

    /// Grafts a previously generated [`FluxIndex`] onto a planned layout:
    /// under a dedicated `flux-system` directory when
    /// `FluxPlacement::Separate`, or colocated with each Bundle's own
    /// directory (in its *parent*, standing in for the child's own index;
    /// see §4.8) when `FluxPlacement::Integrated`.
    #[instrument(skip_all, fields(placement = ?rules.flux_placement))]
    pub fn integrate(&self, plan: &mut Plan, rules: &LayoutRules, index: FluxIndex) -> Result<()> {
        match rules.flux_placement {
            FluxPlacement::Separate => {
                let mut resources = vec![index.source];
                resources.extend(index.kustomizations.into_iter().map(|(_, o)| o));
                let path = plan.root.path.join("flux-system");
                plan.root.insert_child(ManifestLayout {
                    name: "flux-system".to_string(),
                    path,
                    resources,
                    children: Vec::new(),
                    package_ref: None,
                });
            }
            FluxPlacement::Integrated => {
                let source_path = plan.root.path.join("flux-system");
                plan.root.insert_child(ManifestLayout {
                    name: "flux-system".to_string(),
                    path: source_path,
                    resources: vec![index.source],
                    children: Vec::new(),
                    package_ref: None,
                });
                for (bundle_id, object) in index.kustomizations {
                    let bundle_path = plan
                        .bundle_paths
                        .get(&bundle_id)
                        .cloned()
                        .ok_or_else(|| Error::PathNotPlanned { path: plan.root.path.clone() })?;
                    let parent_path = bundle_path
                        .parent()
                        .filter(|p| !p.as_os_str().is_empty())
                        .map(Into::into)
                        .unwrap_or_else(|| plan.root.path.clone());
                    let parent = plan
                        .root
                        .find_mut(&parent_path)
                        .ok_or_else(|| Error::PathNotPlanned { path: parent_path.clone() })?;
                    parent.resources.push(object);
                }
            }
        }
        Ok(())
    }

    /// The minimal Object set needed to install the Flux controller itself:
    /// its namespace, a placeholder standing in for the controller install
    /// manifests (out of scope per §1), and the GitRepository+Kustomization
    /// pair that reconciles the cluster's own directory.
    #[instrument(skip_all)]
    pub fn bootstrap(&self, cluster: &Cluster, rules: &LayoutRules) -> Result<Vec<Object>> {
        let namespace = kure_scheme::from_typed(&Namespace {
            metadata: ObjectMeta {
                name: Some(NAMESPACE.to_string()),
                ..Default::default()
            },
            ..Default::default()
        });
        let source_name = format!("{}-source", cluster.gitops.cluster_name);
        let source = kure_scheme::from_typed(&GitRepository {
            metadata: object_meta(&source_name, NAMESPACE),
            spec: GitRepositorySpec {
                url: cluster.gitops.repo_url.clone(),
                interval: INTERVAL.to_string(),
                reference: None,
                secret_ref: None,
            },
        });
        let base = if let Some(cluster_name) = &rules.cluster_name {
            std::path::PathBuf::from(&rules.manifests_dir).join(cluster_name)
        } else {
            std::path::PathBuf::from(&rules.manifests_dir)
        };
        let root_ks = kure_scheme::from_typed(&FluxKustomization {
            metadata: object_meta(NAMESPACE, NAMESPACE),
            spec: FluxKustomizationSpec {
                path: to_repo_path(&base),
                interval: INTERVAL.to_string(),
                source_ref: SourceRef {
                    kind: "GitRepository".to_string(),
                    name: source_name,
                    namespace: Some(NAMESPACE.to_string()),
                },
                prune: Some(true),
                depends_on: Vec::new(),
                target_namespace: None,
            },
        });
        Ok(vec![namespace, source, root_ks])
    }
}
