use std::collections::HashSet;
use std::fs;

use kure_generators::appworkload::{AppWorkloadConfig, ContainerSpec};
use kure_layout::{plan, plan_by_package, Grouping, KustomizationMode, LayoutRules};
use kure_scheme::Gvk;
use kure_stack::{Application, Cluster, GitOpsConfig};
use kure_writer::{write_fs, write_tar, WriterConfig};
use walkdir::WalkDir;

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
            replicas: 2,
            containers: vec![ContainerSpec {
                name: "nginx".into(),
                image: "nginx:1.21".into(),
                ports: vec![80],
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

fn minimal_cluster() -> Cluster {
    let mut cluster = Cluster::new(gitops());
    let root = cluster.root();
    let web = cluster.add_node(root, "web").unwrap();
    let bundle_id = cluster.node(web).bundle;
    cluster.bundle_mut(bundle_id).add_application(app("web")).unwrap();
    cluster
}

fn all_files(root: &std::path::Path) -> Vec<std::path::PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect()
}

#[test]
fn minimal_cluster_compiles_to_the_documented_tree() {
    let cluster = minimal_cluster();
    let rules = LayoutRules {
        node_grouping: Grouping::ByName,
        bundle_grouping: Grouping::Flat,
        application_grouping: Grouping::Flat,
        kustomization_mode: KustomizationMode::Explicit,
        ..LayoutRules::default()
    };
    let out = plan(&cluster, &rules).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let config = WriterConfig::new(dir.path());
    write_fs(&out.root, &config, &rules).unwrap();

    let web_dir = dir.path().join("clusters/web");
    assert!(web_dir.join("kustomization.yaml").exists());
    let deployment_file = fs::read_dir(&web_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .find(|e| e.file_name().to_string_lossy().contains("deployment"))
        .expect("a deployment manifest file was written");
    assert!(deployment_file.file_name().to_string_lossy().starts_with("prod-deployment-web"));

    let index = fs::read_to_string(web_dir.join("kustomization.yaml")).unwrap();
    assert!(index.contains(&deployment_file.file_name().to_string_lossy().to_string()));
    assert!(index.contains("apiVersion: kustomize.config.kubernetes.io/v1beta1"));
}

#[test]
fn writing_twice_produces_byte_identical_trees() {
    let cluster = minimal_cluster();
    let rules = LayoutRules::default();
    let out = plan(&cluster, &rules).unwrap();

    let first = tempfile::tempdir().unwrap();
    write_fs(&out.root, &WriterConfig::new(first.path()), &rules).unwrap();
    let second = tempfile::tempdir().unwrap();
    write_fs(&out.root, &WriterConfig::new(second.path()), &rules).unwrap();

    let first_files = all_files(first.path());
    let second_files = all_files(second.path());
    assert_eq!(first_files.len(), second_files.len());
    for (a, b) in first_files.iter().zip(second_files.iter()) {
        let rel_a = a.strip_prefix(first.path()).unwrap();
        let rel_b = b.strip_prefix(second.path()).unwrap();
        assert_eq!(rel_a, rel_b);
        assert_eq!(fs::read(a).unwrap(), fs::read(b).unwrap());
    }
}

#[test]
fn every_non_empty_directory_gets_a_kustomization_file() {
    let cluster = minimal_cluster();
    let rules = LayoutRules::default();
    let out = plan(&cluster, &rules).unwrap();

    let dir = tempfile::tempdir().unwrap();
    write_fs(&out.root, &WriterConfig::new(dir.path()), &rules).unwrap();

    for entry in WalkDir::new(dir.path()).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_dir()) {
        let has_manifest = fs::read_dir(entry.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .any(|e| e.path().extension().is_some_and(|ext| ext == "yaml") && e.file_name() != "kustomization.yaml");
        let has_subdir = fs::read_dir(entry.path()).unwrap().filter_map(|e| e.ok()).any(|e| e.file_type().unwrap().is_dir());
        let has_kustomization = entry.path().join("kustomization.yaml").exists();
        assert_eq!(has_manifest || has_subdir, has_kustomization, "{:?}", entry.path());
    }
}

#[test]
fn file_names_are_unique_within_a_directory() {
    let mut cluster = minimal_cluster();
    let root = cluster.root();
    let api = cluster.add_node(root, "api").unwrap();
    let bundle_id = cluster.node(api).bundle;
    cluster.bundle_mut(bundle_id).add_application(app("api")).unwrap();

    let rules = LayoutRules::default();
    let out = plan(&cluster, &rules).unwrap();

    let dir = tempfile::tempdir().unwrap();
    write_fs(&out.root, &WriterConfig::new(dir.path()), &rules).unwrap();

    for entry in WalkDir::new(dir.path()).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_dir()) {
        let mut seen = HashSet::new();
        for file in fs::read_dir(entry.path()).unwrap().filter_map(|e| e.ok()) {
            assert!(seen.insert(file.file_name()), "duplicate file name in {:?}", entry.path());
        }
    }
}

#[test]
fn package_aware_planning_writes_each_package_to_an_isolated_tree() {
    let mut cluster = minimal_cluster();
    let root = cluster.root();
    let api = cluster.add_node(root, "api").unwrap();
    let bundle_id = cluster.node(api).bundle;
    cluster.bundle_mut(bundle_id).add_application(app("api")).unwrap();

    let web_id = cluster.node(root).children()[0];
    cluster.set_package_ref(web_id, Gvk::new("source.toolkit.fluxcd.io", "v1", "GitRepository"));
    cluster.set_package_ref(api, Gvk::new("source.toolkit.fluxcd.io", "v1beta2", "OCIRepository"));

    let rules = LayoutRules::default();
    let plans = plan_by_package(&cluster, &rules).unwrap();
    assert_eq!(plans.len(), 2);

    let dir = tempfile::tempdir().unwrap();
    for (key, layout) in &plans {
        let package_dir = dir.path().join(key.replace([',', '=', '/'], "_"));
        let config = WriterConfig::new(&package_dir);
        write_fs(layout, &config, &rules).unwrap();
    }

    let written: Vec<_> = WalkDir::new(dir.path())
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name() == "kustomization.yaml")
        .map(|e| fs::read_to_string(e.path()).unwrap())
        .collect();
    assert_eq!(written.len(), 4, "each package tree plans its own clusters/{{name}} directory plus the clusters root");
    for content in &written {
        assert!(!content.contains("api") || !content.contains("web"), "no kustomization references both packages' content");
    }
}

#[test]
fn tar_archive_matches_the_filesystem_tree() {
    let cluster = minimal_cluster();
    let rules = LayoutRules::default();
    let out = plan(&cluster, &rules).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let config = WriterConfig::new(dir.path());
    write_fs(&out.root, &config, &rules).unwrap();

    let mut archive_bytes = Vec::new();
    write_tar(&out.root, &config, &rules, &mut archive_bytes).unwrap();

    let mut archive = tar::Archive::new(&archive_bytes[..]);
    let mut entries: Vec<String> = archive
        .entries()
        .unwrap()
        .map(|e| e.unwrap().path().unwrap().to_string_lossy().into_owned())
        .collect();
    entries.sort();

    let fs_entries: Vec<String> = all_files(dir.path())
        .into_iter()
        .map(|p| p.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
        .map(|rel| format!("{}/{rel}", dir.path().file_name().unwrap().to_string_lossy()))
        .collect();
    let mut fs_entries = fs_entries;
    fs_entries.sort();

    assert_eq!(entries, fs_entries);
}
