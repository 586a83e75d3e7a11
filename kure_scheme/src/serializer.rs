use std::collections::BTreeMap;

use serde_json::{Map, Value};
use tracing::instrument;

use crate::error::Error;
use crate::object::Object;

/// How aggressively the Serializer strips server-populated fields before
/// writing an object out. Defaults to [`StripLevel::Full`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum StripLevel {
    None,
    Basic,
    #[default]
    Full,
}

const TOP_LEVEL_ORDER: &[&str] = &["apiVersion", "kind", "metadata", "spec", "data", "stringData", "type"];
const METADATA_STRIP_FIELDS: &[&str] = &["managedFields", "resourceVersion", "uid", "generation", "selfLink"];
const LAST_APPLIED_ANNOTATION: &str = "kubectl.kubernetes.io/last-applied-configuration";

/// Serializes an ordered list of objects into a multi-document YAML byte
/// stream with deterministic key ordering (§ key-order) and configurable
/// field stripping.
///
/// Two invocations over equal input produce byte-identical output: all
/// ordering in this function is either a fixed literal sequence or a sort,
/// never a hash-map iteration.
#[instrument(skip_all, fields(count = objects.len(), strip = ?strip))]
pub fn serialize(objects: &[Object], strip: StripLevel) -> Result<String, Error> {
    let mut docs = Vec::with_capacity(objects.len());
    for obj in objects {
        let mut value = obj.to_value();
        strip_fields(&mut value, strip);
        let ordered = order_value(value, true);
        let text = serde_yaml::to_string(&ordered).map_err(|source| Error::ParseInvalid {
            index: docs.len(),
            source: Box::new(source),
        })?;
        docs.push(text.trim_end_matches('\n').to_string());
    }
    Ok(docs.join("\n---\n"))
}

fn strip_fields(value: &mut Value, level: StripLevel) {
    if level == StripLevel::None {
        return;
    }
    if let Value::Object(map) = value {
        if let Some(status) = map.get("status") {
            if is_empty_status(status) {
                map.remove("status");
            }
        }
        strip_walk(map, level);
    }
}

fn is_empty_status(status: &Value) -> bool {
    match status {
        Value::Null => true,
        Value::Object(m) => m.is_empty(),
        _ => false,
    }
}

fn strip_walk(map: &mut Map<String, Value>, level: StripLevel) {
    if let Some(Value::Object(meta)) = map.get_mut("metadata") {
        strip_metadata(meta, level);
    }
    for value in map.values_mut() {
        walk_nested(value, level);
    }
}

fn walk_nested(value: &mut Value, level: StripLevel) {
    match value {
        Value::Object(map) => strip_walk(map, level),
        Value::Array(arr) => {
            for item in arr {
                walk_nested(item, level);
            }
        }
        _ => {}
    }
}

fn strip_metadata(meta: &mut Map<String, Value>, level: StripLevel) {
    if meta.get("creationTimestamp").is_some_and(Value::is_null) {
        meta.remove("creationTimestamp");
    }
    if level == StripLevel::Full {
        for field in METADATA_STRIP_FIELDS {
            meta.remove(*field);
        }
        if let Some(Value::Object(annotations)) = meta.get_mut("annotations") {
            annotations.remove(LAST_APPLIED_ANNOTATION);
            if annotations.is_empty() {
                meta.remove("annotations");
            }
        }
    }
}

/// Rebuilds `value` with deterministic key order: at the top level, the
/// fixed prefix in [`TOP_LEVEL_ORDER`], then the remainder alphabetically,
/// with `status` forced last; at every nested level, plain alphabetical
/// order. Also normalizes integer-valued floats so they don't render with a
/// spurious trailing `.0` (a quirk of `serde_yaml` rendering
/// `serde_json::Number`).
fn order_value(value: Value, top_level: bool) -> serde_yaml::Value {
    match value {
        Value::Object(map) => {
            let mut mapping = serde_yaml::Mapping::new();
            if top_level {
                for key in TOP_LEVEL_ORDER {
                    if let Some(v) = map.get(*key) {
                        mapping.insert(
                            serde_yaml::Value::String((*key).to_string()),
                            order_value(v.clone(), false),
                        );
                    }
                }
                let rest: BTreeMap<&String, &Value> = map
                    .iter()
                    .filter(|(k, _)| !TOP_LEVEL_ORDER.contains(&k.as_str()) && k.as_str() != "status")
                    .collect();
                for (k, v) in rest {
                    mapping.insert(serde_yaml::Value::String(k.clone()), order_value(v.clone(), false));
                }
                if let Some(v) = map.get("status") {
                    mapping.insert(serde_yaml::Value::String("status".to_string()), order_value(v.clone(), false));
                }
            } else {
                let sorted: BTreeMap<&String, &Value> = map.iter().collect();
                for (k, v) in sorted {
                    mapping.insert(serde_yaml::Value::String(k.clone()), order_value(v.clone(), false));
                }
            }
            serde_yaml::Value::Mapping(mapping)
        }
        Value::Array(arr) => serde_yaml::Value::Sequence(arr.into_iter().map(|v| order_value(v, false)).collect()),
        Value::Number(n) => number_to_yaml(&n),
        Value::Bool(b) => serde_yaml::Value::Bool(b),
        Value::String(s) => serde_yaml::Value::String(s),
        Value::Null => serde_yaml::Value::Null,
    }
}

/// Integer-kind numbers pass through unchanged. A float that happens to
/// have a zero fractional part (e.g. a port number that round-tripped
/// through JSON) renders without the trailing `.0` `serde_yaml` would
/// otherwise add, matching how a human author would have written it.
fn number_to_yaml(n: &serde_json::Number) -> serde_yaml::Value {
    if let Some(i) = n.as_i64() {
        return serde_yaml::Value::Number(serde_yaml::Number::from(i));
    }
    if let Some(u) = n.as_u64() {
        return serde_yaml::Value::Number(serde_yaml::Number::from(u));
    }
    let Some(f) = n.as_f64() else {
        return serde_yaml::Value::Null;
    };
    if f.is_finite() && f.fract() == 0.0 && f.abs() < (i64::MAX as f64) {
        // fract() == 0.0 already guarantees no truncation; the magnitude
        // check keeps the cast in i64 range.
        #[allow(clippy::cast_possible_truncation)]
        let as_int = f as i64;
        serde_yaml::Value::Number(serde_yaml::Number::from(as_int))
    } else {
        serde_yaml::Value::Number(serde_yaml::Number::from(f))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(value: Value) -> Object {
        Object::Typed {
            gvk: crate::Gvk::new("apps", "v1", "Deployment"),
            type_name: "test",
            value,
        }
    }

    #[test]
    fn key_order_and_status_last() {
        let v = json!({
            "spec": {"replicas": 1},
            "status": {"readyReplicas": 1},
            "kind": "Deployment",
            "apiVersion": "apps/v1",
            "metadata": {"name": "x"},
        });
        let out = serialize(&[obj(v)], StripLevel::None).unwrap();
        let api_pos = out.find("apiVersion").unwrap();
        let kind_pos = out.find("kind").unwrap();
        let meta_pos = out.find("metadata").unwrap();
        let spec_pos = out.find("spec").unwrap();
        let status_pos = out.find("status").unwrap();
        assert!(api_pos < kind_pos);
        assert!(kind_pos < meta_pos);
        assert!(meta_pos < spec_pos);
        assert!(spec_pos < status_pos);
    }

    #[test]
    fn full_strip_removes_server_fields() {
        let v = json!({
            "apiVersion": "apps/v1",
            "kind": "Deployment",
            "metadata": {
                "name": "x",
                "creationTimestamp": null,
                "resourceVersion": "123",
                "uid": "abc",
                "annotations": {"kubectl.kubernetes.io/last-applied-configuration": "{}"},
            },
            "spec": {},
            "status": {},
        });
        let out = serialize(&[obj(v)], StripLevel::Full).unwrap();
        assert!(!out.contains("resourceVersion"));
        assert!(!out.contains("creationTimestamp"));
        assert!(!out.contains("last-applied-configuration"));
        assert!(!out.contains("status"));
    }

    #[test]
    fn integer_valued_float_has_no_decimal() {
        let v = json!({
            "apiVersion": "v1",
            "kind": "Service",
            "metadata": {"name": "x"},
            "spec": {"ports": [{"port": 8080.0}]},
        });
        let out = serialize(&[obj(v)], StripLevel::None).unwrap();
        assert!(out.contains("8080"));
        assert!(!out.contains("8080.0"));
    }

    #[test]
    fn determinism() {
        let v = json!({
            "apiVersion": "v1",
            "kind": "ConfigMap",
            "metadata": {"name": "x"},
            "data": {"b": "2", "a": "1"},
        });
        let first = serialize(&[obj(v.clone())], StripLevel::Full).unwrap();
        let second = serialize(&[obj(v)], StripLevel::Full).unwrap();
        assert_eq!(first, second);
    }
}
