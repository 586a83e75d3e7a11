use kure_scheme::{parse, parse_dir, serialize, ParseOptions, StripLevel};

const DEPLOYMENT: &str = r#"
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  namespace: prod
spec:
  replicas: 2
  selector:
    matchLabels:
      app: web
  template:
    metadata:
      labels:
        app: web
    spec:
      containers:
        - name: web
          image: nginx:1.21
          ports:
            - containerPort: 80
"#;

#[test]
fn round_trip_preserves_typed_object() {
    let (objects, err) = parse(DEPLOYMENT, &ParseOptions::default());
    assert!(err.is_none());
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].name(), "web");
    assert_eq!(objects[0].namespace(), Some("prod"));

    let out = serialize(&objects, StripLevel::Full).unwrap();
    let (reparsed, err) = parse(&out, &ParseOptions::default());
    assert!(err.is_none());
    assert_eq!(reparsed.len(), 1);
    assert_eq!(reparsed[0].name(), "web");
    assert_eq!(reparsed[0].to_value(), objects[0].to_value());
}

#[test]
fn determinism_across_two_serializations() {
    let (objects, _) = parse(DEPLOYMENT, &ParseOptions::default());
    let first = serialize(&objects, StripLevel::Full).unwrap();
    let second = serialize(&objects, StripLevel::Full).unwrap();
    assert_eq!(first, second);
}

#[test]
fn unknown_kind_without_fallback_is_an_error() {
    let input = "apiVersion: example.com/v1\nkind: Widget\nmetadata:\n  name: x\n";
    let (objects, err) = parse(input, &ParseOptions::default());
    assert!(objects.is_empty());
    assert!(err.is_some());
}

#[test]
fn unknown_kind_with_fallback_decodes_free() {
    let input = "apiVersion: example.com/v1\nkind: Widget\nmetadata:\n  name: x\n  namespace: ns\nspec:\n  a: 1\n";
    let opts = ParseOptions {
        allow_unstructured: true,
    };
    let (objects, err) = parse(input, &opts);
    assert!(err.is_none());
    assert_eq!(objects.len(), 1);
    assert_eq!(objects[0].name(), "x");
    assert_eq!(objects[0].namespace(), Some("ns"));
}

#[test]
fn empty_documents_are_skipped() {
    let input = "---\n---\napiVersion: v1\nkind: Namespace\nmetadata:\n  name: ns\n---\n";
    let (objects, err) = parse(input, &ParseOptions::default());
    assert!(err.is_none());
    assert_eq!(objects.len(), 1);
}

#[test]
fn multi_document_stream_partitions_good_and_bad() {
    let input = "apiVersion: v1\nkind: Namespace\nmetadata:\n  name: ns\n---\napiVersion: bogus.example.com/v1\nkind: Nope\nmetadata:\n  name: x\n";
    let (objects, err) = parse(input, &ParseOptions::default());
    assert_eq!(objects.len(), 1);
    assert!(err.is_some());
}

#[test]
fn parse_dir_reads_yaml_files_in_sorted_order() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("b.yaml"),
        "apiVersion: v1\nkind: Namespace\nmetadata:\n  name: second\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("a.yml"),
        "apiVersion: v1\nkind: Namespace\nmetadata:\n  name: first\n",
    )
    .unwrap();
    std::fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();

    let (objects, err) = parse_dir(dir.path(), &ParseOptions::default());
    assert!(err.is_none());
    let names: Vec<&str> = objects.iter().map(|o| o.name()).collect();
    assert_eq!(names, vec!["first", "second"]);
}

#[test]
fn parse_dir_aggregates_errors_across_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("ok.yaml"),
        "apiVersion: v1\nkind: Namespace\nmetadata:\n  name: ok\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("bad.yaml"),
        "apiVersion: bogus.example.com/v1\nkind: Nope\nmetadata:\n  name: x\n",
    )
    .unwrap();

    let (objects, err) = parse_dir(dir.path(), &ParseOptions::default());
    assert_eq!(objects.len(), 1);
    assert!(err.is_some());
}
