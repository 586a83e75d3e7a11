use std::path::PathBuf;

use kure_generators::appworkload::{AppWorkloadConfig, ContainerSpec};
use kure_layout::{plan, LayoutRules};
use kure_stack::{Application, Cluster, GitOpsConfig};
use kure_workflow::{for_provider, ArgoWorkflow, FluxWorkflow, Workflow};

fn gitops() -> GitOpsConfig {
    GitOpsConfig {
        provider: "flux".into(),
        cluster_name: "test".into(),
        repo_url: "https://example.com/fleet.git".into(),
        bootstrap: Default::default(),
    }
}

fn app(name: &str) -> Application {
    Application {
        name: name.into(),
        namespace: "prod".into(),
        config: Box::new(AppWorkloadConfig {
            workload: Default::default(),
            replicas: 1,
            containers: vec![ContainerSpec {
                name: "main".into(),
                image: "example/app:latest".into(),
                ports: vec![8080],
                env: Default::default(),
                ..Default::default()
            }],
            services: Vec::new(),
            ingress: None,
            volume_claim_templates: Vec::new(),
            schedule: None,
        }),
    }
}

fn two_bundle_cluster_with(gitops: GitOpsConfig) -> Cluster {
    let mut cluster = Cluster::new(gitops);
    let root = cluster.root();
    let web = cluster.add_node(root, "web").unwrap();
    let worker = cluster.add_node(root, "worker").unwrap();
    let web_bundle = cluster.node(web).bundle;
    let worker_bundle = cluster.node(worker).bundle;
    cluster.bundle_mut(web_bundle).add_application(app("web")).unwrap();
    cluster.bundle_mut(worker_bundle).add_application(app("worker")).unwrap();
    cluster.bundle_mut(worker_bundle).depends_on.push(web_bundle);
    cluster
}

fn two_bundle_cluster() -> Cluster {
    two_bundle_cluster_with(gitops())
}

#[test]
fn flux_kustomizations_point_at_planned_directories() {
    let cluster = two_bundle_cluster();
    let rules = LayoutRules::default();
    let mut out = plan(&cluster, &rules).unwrap();
    let planned_paths = out.root.paths();

    let workflow = FluxWorkflow;
    workflow.apply(&cluster, &mut out, &rules).unwrap();

    let flux_system = out.root.find(&PathBuf::from("clusters/flux-system")).expect("flux-system directory grafted");
    assert!(!flux_system.resources.is_empty());

    for object in &flux_system.resources {
        if object.gvk().kind != "Kustomization" {
            continue;
        }
        let document = object.to_value();
        let path = document
            .pointer("/spec/path")
            .and_then(|v| v.as_str())
            .expect("Kustomization carries spec.path");
        assert!(
            planned_paths.contains(&PathBuf::from(path)),
            "{path} does not correspond to any planned directory"
        );
    }
}

#[test]
fn flux_separate_placement_keeps_bundle_directories_untouched() {
    let cluster = two_bundle_cluster();
    let rules = LayoutRules::default();
    let mut out = plan(&cluster, &rules).unwrap();
    let web_path = PathBuf::from("clusters/web");
    let before = out.root.find(&web_path).unwrap().resources.len();

    FluxWorkflow.apply(&cluster, &mut out, &rules).unwrap();

    let after = out.root.find(&web_path).unwrap().resources.len();
    assert_eq!(before, after, "Separate placement must not add resources into Bundle directories");
}

#[test]
fn flux_integrated_placement_colocates_kustomizations_with_their_parent() {
    let cluster = two_bundle_cluster();
    let rules = LayoutRules {
        flux_placement: kure_layout::FluxPlacement::Integrated,
        ..LayoutRules::default()
    };
    let mut out = plan(&cluster, &rules).unwrap();

    FluxWorkflow.apply(&cluster, &mut out, &rules).unwrap();

    let root_resources = &out.root.resources;
    assert!(
        root_resources.iter().any(|o| o.gvk().kind == "Kustomization"),
        "expected the per-bundle Kustomizations colocated in the root directory, got {root_resources:#?}"
    );
}

#[test]
fn argocd_applications_point_at_planned_directories() {
    let cluster = two_bundle_cluster_with(GitOpsConfig {
        provider: "argocd".into(),
        ..gitops()
    });
    let rules = LayoutRules::default();
    let mut out = plan(&cluster, &rules).unwrap();
    let planned_paths = out.root.paths();

    ArgoWorkflow.apply(&cluster, &mut out, &rules).unwrap();

    let argocd_dir = out.root.find(&PathBuf::from("clusters/argocd")).expect("argocd directory grafted");
    for object in &argocd_dir.resources {
        let document = object.to_value();
        let path = document
            .pointer("/spec/source/path")
            .and_then(|v| v.as_str())
            .expect("Application carries spec.source.path");
        assert!(planned_paths.contains(&PathBuf::from(path)));
    }
}

#[test]
fn flux_and_argocd_advertise_their_bootstrap_mode() {
    assert_eq!(FluxWorkflow.bootstrap_mode(), "flux-system");
    assert_eq!(ArgoWorkflow.bootstrap_mode(), "app-of-apps");
}

#[test]
fn flux_bootstrap_produces_a_namespace_source_and_root_kustomization() {
    let cluster = two_bundle_cluster();
    let rules = LayoutRules::default();
    let objects = FluxWorkflow.bootstrap_objects(&cluster, &rules).unwrap();
    let kinds: Vec<_> = objects.iter().map(|o| o.gvk().kind.clone()).collect();
    assert!(kinds.contains(&"Namespace".to_string()));
    assert!(kinds.contains(&"GitRepository".to_string()));
    assert!(kinds.contains(&"Kustomization".to_string()));
}

#[test]
fn unsupported_provider_is_reported_by_name() {
    let err = for_provider("bogus").unwrap_err();
    assert!(err.to_string().contains("bogus"));
}

#[test]
fn provider_name_selects_the_matching_engine() {
    assert_eq!(for_provider("flux").unwrap().bootstrap_mode(), "flux-system");
    assert_eq!(for_provider("argocd").unwrap().bootstrap_mode(), "app-of-apps");
}
