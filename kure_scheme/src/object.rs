use kube::core::DynamicObject;
use serde_json::Value;

use crate::apitype::ApiType;
use crate::gvk::Gvk;

/// An in-memory Kubernetes-style object, produced by the Parser or a
/// Generator and consumed by the Serializer/Writer.
///
/// `Typed` objects were decoded and validated against a registered Rust
/// type; `Free` objects fell back to a generic attribute tree because their
/// GVK was not registered (and the caller allowed that fallback). Both
/// variants carry the full document as a `serde_json::Value` so downstream
/// code (the deterministic Serializer in particular) can treat them
/// identically.
#[derive(Clone, Debug)]
pub enum Object {
    Typed {
        gvk: Gvk,
        type_name: &'static str,
        value: Value,
    },
    Free(DynamicObject),
}

impl Object {
    pub fn gvk(&self) -> Gvk {
        match self {
            Object::Typed { gvk, .. } => gvk.clone(),
            Object::Free(obj) => {
                let types = obj.types.as_ref();
                let api_version = types.map(|t| t.api_version.as_str()).unwrap_or_default();
                let kind = types.map(|t| t.kind.as_str()).unwrap_or_default();
                Gvk::from_api_version(api_version, kind)
            }
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Object::Typed { value, .. } => value
                .pointer("/metadata/name")
                .and_then(Value::as_str)
                .unwrap_or_default(),
            Object::Free(obj) => obj.metadata.name.as_deref().unwrap_or_default(),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        match self {
            Object::Typed { value, .. } => value.pointer("/metadata/namespace").and_then(Value::as_str),
            Object::Free(obj) => obj.metadata.namespace.as_deref(),
        }
    }

    /// The full document, ready for the Serializer.
    pub fn to_value(&self) -> Value {
        match self {
            Object::Typed { value, .. } => value.clone(),
            Object::Free(obj) => serde_json::to_value(obj).expect("DynamicObject always serializes"),
        }
    }

    /// The Rust type name a `Typed` object was constructed from, for
    /// diagnostics; `"<free>"` for the fallback variant.
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Typed { type_name, .. } => type_name,
            Object::Free(_) => "<free>",
        }
    }
}

/// Wraps a concrete, already-built value (produced by a Generator, not
/// decoded from YAML) into a [`Typed`](Object::Typed) object, inserting
/// `apiVersion`/`kind` the same way the Scheme Registry does for parsed
/// documents.
pub fn from_typed<T: ApiType + 'static>(value: &T) -> Object {
    let gvk = Gvk::new(T::GROUP, T::VERSION, T::KIND);
    let mut json = serde_json::to_value(value).expect("registered API types always serialize");
    if let Value::Object(map) = &mut json {
        map.insert("apiVersion".to_string(), Value::String(gvk.api_version()));
        map.insert("kind".to_string(), Value::String(T::KIND.to_string()));
    }
    Object::Typed {
        gvk,
        type_name: std::any::type_name::<T>(),
        value: json,
    }
}
