use kure_layout::{ManifestLayout, Plan};
use kure_scheme::types::argocd::{
    Application as ArgoApplication, ApplicationDestination, ApplicationSource, ApplicationSpec, SyncPolicy,
    SyncPolicyAutomated,
};
use kure_scheme::Object;
use kure_stack::{BundleId, Cluster};
use tracing::instrument;

use crate::error::Result;
use crate::path::to_repo_path;

const NAMESPACE: &str = "argocd";
const PROJECT: &str = "default";
const ARGOCD_DIR: &str = "argocd";

/// The bootstrap mode the Argo CD Workflow Engine advertises (§4.7).
pub const BOOTSTRAP_MODE: &str = "app-of-apps";

/// One Argo CD `Application` per Bundle. Unlike Flux, Argo CD has no
/// separate source object — each `Application` carries its own
/// `spec.source`.
pub struct ArgoIndex {
    pub applications: Vec<(BundleId, Object)>,
}

/// The Argo CD Workflow Engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct ArgoWorkflow;

fn application_object(name: &str, repo_url: &str, path: &str, namespace: &str) -> Object {
    kure_scheme::from_typed(&ArgoApplication {
        metadata: k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(NAMESPACE.to_string()),
            ..Default::default()
        },
        spec: ApplicationSpec {
            project: PROJECT.to_string(),
            source: ApplicationSource {
                repo_url: repo_url.to_string(),
                path: path.to_string(),
                target_revision: None,
            },
            destination: ApplicationDestination {
                server: Some("https://kubernetes.default.svc".to_string()),
                name: None,
                namespace: namespace.to_string(),
            },
            sync_policy: Some(SyncPolicy {
                automated: Some(SyncPolicyAutomated {
                    prune: Some(true),
                    self_heal: Some(true),
                }),
                sync_options: Vec::new(),
            }),
        },
    })
}

impl ArgoWorkflow {
    /// Builds one `Application` per Bundle, each pointing at that Bundle's
    /// own planned directory.
    #[instrument(skip_all)]
    pub fn generate_index(&self, cluster: &Cluster, plan: &Plan) -> ArgoIndex {
        let mut entries: Vec<(BundleId, std::path::PathBuf)> =
            plan.bundle_paths.iter().map(|(id, path)| (*id, path.clone())).collect();
        entries.sort_by(|a, b| a.1.cmp(&b.1));

        let applications = entries
            .into_iter()
            .map(|(bundle_id, path)| {
                let bundle = cluster.bundle(bundle_id);
                let object = application_object(
                    &bundle.name,
                    &cluster.gitops.repo_url,
                    &to_repo_path(&path),
                    &cluster.gitops.cluster_name,
                );
                (bundle_id, object)
            })
            .collect();

        ArgoIndex { applications }
    }

    /// Grafts a previously generated [`ArgoIndex`] into a dedicated
    /// `argocd` directory — Argo CD has no `FluxPlacement`-style
    /// colocation option, since an `Application` is self-contained rather
    /// than referencing a source object.
    #[instrument(skip_all)]
    pub fn integrate(&self, plan: &mut Plan, index: ArgoIndex) -> Result<()> {
        let resources = index.applications.into_iter().map(|(_, o)| o).collect();
        let path = plan.root.path.join(ARGOCD_DIR);
        plan.root.insert_child(ManifestLayout {
            name: ARGOCD_DIR.to_string(),
            path,
            resources,
            children: Vec::new(),
            package_ref: None,
        });
        Ok(())
    }

    /// The root "app of apps" `Application` that bootstraps the rest: an
    /// Argo CD `Application` whose own source path is the `argocd`
    /// directory this Workflow Engine just populated.
    #[instrument(skip_all)]
    pub fn bootstrap(&self, cluster: &Cluster) -> Result<Vec<Object>> {
        let root_app = application_object(
            "app-of-apps",
            &cluster.gitops.repo_url,
            ARGOCD_DIR,
            &cluster.gitops.cluster_name,
        );
        Ok(vec![root_app])
    }
}
