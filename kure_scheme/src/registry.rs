use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

use k8s_openapi::api::{apps, autoscaling, batch, core, networking};
use serde_json::Value;

use crate::apitype::{impl_k8s_api_type, ApiType};
use crate::error::Error;
use crate::gvk::Gvk;
use crate::types::{argocd, flux};

impl_k8s_api_type!(apps::v1::Deployment);
impl_k8s_api_type!(apps::v1::StatefulSet);
impl_k8s_api_type!(apps::v1::DaemonSet);
impl_k8s_api_type!(batch::v1::Job);
impl_k8s_api_type!(batch::v1::CronJob);
impl_k8s_api_type!(core::v1::Service);
impl_k8s_api_type!(core::v1::ConfigMap);
impl_k8s_api_type!(core::v1::Secret);
impl_k8s_api_type!(core::v1::Namespace);
impl_k8s_api_type!(core::v1::ServiceAccount);
impl_k8s_api_type!(core::v1::PersistentVolumeClaim);
impl_k8s_api_type!(networking::v1::Ingress);
impl_k8s_api_type!(autoscaling::v2::HorizontalPodAutoscaler);

/// The decode-and-validate closure registered for a GVK: deserialize into
/// the concrete Rust type (this *is* the "known-type check"), then
/// re-serialize so the rest of the pipeline works uniformly over
/// `serde_json::Value`. Re-inserts `apiVersion`/`kind` since the concrete
/// types don't carry those fields themselves (see [`register`]).
type Decode = Box<dyn Fn(Value) -> Result<Value, serde_json::Error> + Send + Sync>;

pub struct SchemeEntry {
    pub type_name: &'static str,
    decode: Decode,
}

/// Process-wide GVK scheme registry. Initialization happens inside the
/// `LazyLock` closure itself, so the first dereference anywhere in the
/// process is the one-shot, idempotent `register_builtin_types` step — there
/// is no separate `init()` a caller can forget to invoke, and no caller can
/// observe a partially-populated table.
static REGISTRY: LazyLock<RwLock<HashMap<Gvk, SchemeEntry>>> =
    LazyLock::new(|| RwLock::new(register_builtin_types()));

fn register<T: ApiType + 'static>(map: &mut HashMap<Gvk, SchemeEntry>) {
    let gvk = Gvk::new(T::GROUP, T::VERSION, T::KIND);
    let api_version = gvk.api_version();
    let kind = T::KIND.to_string();
    map.insert(
        gvk,
        SchemeEntry {
            type_name: std::any::type_name::<T>(),
            decode: Box::new(move |v| {
                let typed: T = serde_json::from_value(v)?;
                let mut out = serde_json::to_value(&typed)?;
                if let Value::Object(m) = &mut out {
                    m.insert("apiVersion".into(), Value::String(api_version.clone()));
                    m.insert("kind".into(), Value::String(kind.clone()));
                }
                Ok(out)
            }),
        },
    );
}

fn register_builtin_types() -> HashMap<Gvk, SchemeEntry> {
    let mut map = HashMap::new();
    register::<apps::v1::Deployment>(&mut map);
    register::<apps::v1::StatefulSet>(&mut map);
    register::<apps::v1::DaemonSet>(&mut map);
    register::<batch::v1::Job>(&mut map);
    register::<batch::v1::CronJob>(&mut map);
    register::<core::v1::Service>(&mut map);
    register::<core::v1::ConfigMap>(&mut map);
    register::<core::v1::Secret>(&mut map);
    register::<core::v1::Namespace>(&mut map);
    register::<core::v1::ServiceAccount>(&mut map);
    register::<core::v1::PersistentVolumeClaim>(&mut map);
    register::<networking::v1::Ingress>(&mut map);
    register::<autoscaling::v2::HorizontalPodAutoscaler>(&mut map);
    register::<flux::HelmRepository>(&mut map);
    register::<flux::GitRepository>(&mut map);
    register::<flux::OciRepository>(&mut map);
    register::<flux::Bucket>(&mut map);
    register::<flux::HelmRelease>(&mut map);
    register::<flux::FluxKustomization>(&mut map);
    register::<argocd::Application>(&mut map);
    map
}

/// Looks up a GVK in the Scheme Registry and, if found, decodes `value`
/// into its registered type, returning the normalized document. The
/// `document index` used in [`Error::TypeMismatch`]/[`Error::ParseInvalid`]
/// is supplied by the caller (the Parser), since the registry itself has no
/// notion of a document stream.
pub fn decode(index: usize, gvk: &Gvk, value: Value) -> Result<Option<(Value, &'static str)>, Error> {
    let guard = REGISTRY.read().expect("scheme registry lock poisoned");
    let Some(entry) = guard.get(gvk) else {
        return Ok(None);
    };
    let type_name = entry.type_name;
    (entry.decode)(value)
        .map(|v| Some((v, type_name)))
        .map_err(|_| Error::TypeMismatch {
            index,
            gvk: gvk.clone(),
        })
}

/// Whether a GVK has a registered constructor, without attempting a decode.
pub fn is_known(gvk: &Gvk) -> bool {
    REGISTRY
        .read()
        .expect("scheme registry lock poisoned")
        .contains_key(gvk)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_types_are_registered() {
        assert!(is_known(&Gvk::new("apps", "v1", "Deployment")));
        assert!(is_known(&Gvk::new("", "v1", "Service")));
        assert!(is_known(&Gvk::new(
            "helm.toolkit.fluxcd.io",
            "v2",
            "HelmRelease"
        )));
        assert!(!is_known(&Gvk::new("bogus.example.com", "v1", "Nope")));
    }

    #[test]
    fn repeated_first_access_is_idempotent() {
        assert!(is_known(&Gvk::new("apps", "v1", "Deployment")));
        assert!(is_known(&Gvk::new("apps", "v1", "Deployment")));
    }
}
