use std::path::PathBuf;

use kure_generators::appworkload::{AppWorkloadConfig, ContainerSpec};
use kure_layout::{plan, plan_by_package, Grouping, LayoutRules, DEFAULT_PACKAGE_KEY};
use kure_stack::{Application, Cluster, GitOpsConfig};

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

#[test]
fn minimal_cluster_compiles_to_the_documented_tree() {
    let mut cluster = Cluster::new(gitops());
    let root = cluster.root();
    let web = cluster.add_node(root, "web").unwrap();
    let bundle_id = cluster.node(web).bundle;
    cluster.bundle_mut(bundle_id).add_application(app("web")).unwrap();

    let out = plan(&cluster, &LayoutRules::default()).unwrap();
    let web_layout = out.root.find(&PathBuf::from("clusters/web")).expect("web directory planned");
    assert_eq!(web_layout.resources.len(), 1);
    assert_eq!(web_layout.resources[0].gvk().kind, "Deployment");
    assert!(out.root.paths().contains(&PathBuf::from("clusters/web")));
}

#[test]
fn by_name_grouping_nests_bundle_and_application_directories() {
    let mut cluster = Cluster::new(gitops());
    let root = cluster.root();
    let web = cluster.add_node(root, "web").unwrap();
    let bundle_id = cluster.node(web).bundle;
    cluster.bundle_mut(bundle_id).add_application(app("api")).unwrap();

    let rules = LayoutRules {
        node_grouping: Grouping::ByName,
        bundle_grouping: Grouping::ByName,
        application_grouping: Grouping::ByName,
        ..LayoutRules::default()
    };
    let out = plan(&cluster, &rules).unwrap();
    let expected = PathBuf::from("clusters/web").join(&cluster.bundle(bundle_id).name).join("api");
    assert!(out.root.find(&expected).is_some(), "expected {expected:?} in {:#?}", out.root.paths());
}

#[test]
fn cluster_name_prefixes_the_manifests_dir() {
    let mut cluster = Cluster::new(gitops());
    let root = cluster.root();
    cluster.add_node(root, "web").unwrap();

    let rules = LayoutRules {
        cluster_name: Some("prod-east".to_string()),
        ..LayoutRules::default()
    };
    let out = plan(&cluster, &rules).unwrap();
    assert_eq!(out.root.path, PathBuf::from("clusters/prod-east"));
}

#[test]
fn node_and_bundle_paths_are_populated_for_every_entry() {
    let mut cluster = Cluster::new(gitops());
    let root = cluster.root();
    let web = cluster.add_node(root, "web").unwrap();
    let bundle_id = cluster.node(web).bundle;

    let out = plan(&cluster, &LayoutRules::default()).unwrap();
    assert_eq!(out.node_paths.get(&web), Some(&PathBuf::from("clusters/web")));
    assert_eq!(out.bundle_paths.get(&bundle_id), Some(&PathBuf::from("clusters/web")));
}

#[test]
fn mixed_packages_isolate_into_distinct_plans() {
    let mut cluster = Cluster::new(gitops());
    let root = cluster.root();
    let oci_node = cluster.add_node(root, "oci-team").unwrap();
    let git_node = cluster.add_node(root, "git-team").unwrap();

    cluster.set_package_ref(oci_node, kure_scheme::Gvk::new("source.toolkit.fluxcd.io", "v1beta2", "OCIRepository"));
    cluster.set_package_ref(git_node, kure_scheme::Gvk::new("source.toolkit.fluxcd.io", "v1", "GitRepository"));

    let oci_bundle = cluster.node(oci_node).bundle;
    cluster.bundle_mut(oci_bundle).add_application(app("svc-a")).unwrap();
    let git_bundle = cluster.node(git_node).bundle;
    cluster.bundle_mut(git_bundle).add_application(app("svc-b")).unwrap();

    let plans = plan_by_package(&cluster, &LayoutRules::default()).unwrap();
    assert_eq!(plans.len(), 2);
    assert!(!plans.contains_key(DEFAULT_PACKAGE_KEY));

    for (key, layout) in &plans {
        for other_key in plans.keys() {
            if other_key == key {
                continue;
            }
            let other = &plans[other_key];
            for path in layout.paths() {
                if let Some(found) = other.find(&path) {
                    assert!(
                        found.resources.is_empty(),
                        "package {other_key} leaked resources at a path also used by {key}"
                    );
                }
            }
        }
    }
}

#[test]
fn nodes_without_a_package_ref_fall_under_the_default_key() {
    let mut cluster = Cluster::new(gitops());
    let root = cluster.root();
    let web = cluster.add_node(root, "web").unwrap();
    let bundle_id = cluster.node(web).bundle;
    cluster.bundle_mut(bundle_id).add_application(app("web")).unwrap();

    let plans = plan_by_package(&cluster, &LayoutRules::default()).unwrap();
    assert_eq!(plans.len(), 1);
    assert!(plans.contains_key(DEFAULT_PACKAGE_KEY));
}
