use std::fs;

use kure_layout::LayoutRules;
use kure_writer::WriterConfig;

const CLUSTER_YAML: &str = r#"
name: demo
gitOps:
  type: flux
  repoUrl: https://example.com/fleet.git
  bootstrap:
    enabled: false
node:
  name: root
  children:
    - name: web
"#;

const WEB_APP_YAML: &str = r#"
apiVersion: generators.gokure.dev/v1alpha1
kind: AppWorkload
metadata:
  name: web
  namespace: prod
spec:
  workload: Deployment
  replicas: 2
  containers:
    - name: nginx
      image: nginx:1.21
      ports: [80]
  services:
    - ports:
        - port: 80
"#;

fn write_fleet(dir: &std::path::Path) {
    fs::write(dir.join("cluster.yaml"), CLUSTER_YAML).unwrap();
    fs::create_dir_all(dir.join("web")).unwrap();
    fs::write(dir.join("web").join("web.yaml"), WEB_APP_YAML).unwrap();
}

#[test]
fn loads_a_fleet_directory_into_a_cluster() {
    let dir = tempfile::tempdir().unwrap();
    write_fleet(dir.path());

    let cluster = kure::load_fleet(dir.path()).unwrap();
    assert_eq!(cluster.gitops.provider, "flux");
    assert_eq!(cluster.gitops.cluster_name, "demo");

    let root = cluster.root();
    let web_id = cluster.node(root).children()[0];
    let web = cluster.node(web_id);
    assert_eq!(web.name, "web");
    let bundle = cluster.bundle(web.bundle);
    assert_eq!(bundle.applications().len(), 1);
    assert_eq!(bundle.applications()[0].name, "web");
}

#[test]
fn validate_accepts_a_well_formed_fleet() {
    let dir = tempfile::tempdir().unwrap();
    write_fleet(dir.path());
    kure::validate(dir.path()).unwrap();
}

#[test]
fn validate_rejects_a_leaf_node_missing_its_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("cluster.yaml"), CLUSTER_YAML).unwrap();
    assert!(kure::validate(dir.path()).is_err());
}

#[test]
fn compiles_and_writes_a_minimal_fleet_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    write_fleet(dir.path());

    let cluster = kure::load_fleet(dir.path()).unwrap();
    let rules = LayoutRules::default();
    let plan = kure::compile_cluster(&cluster, &rules).unwrap();

    let out = tempfile::tempdir().unwrap();
    let config = WriterConfig::new(out.path());
    kure::write_fs(&plan, &config, &rules).unwrap();

    let web_dir = out.path().join("clusters/web");
    assert!(web_dir.join("kustomization.yaml").exists());
    let flux_dir = out.path().join("clusters/flux-system");
    assert!(flux_dir.join("kustomization.yaml").exists());
}
