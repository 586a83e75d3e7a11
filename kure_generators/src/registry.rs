use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

use kure_scheme::Gvk;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::ApplicationConfig;
use crate::error::Error;
use crate::{appworkload, fluxhelm};

pub const GROUP: &str = "generators.gokure.dev";
pub const VERSION: &str = "v1alpha1";

type Factory = Box<dyn Fn(Value) -> Result<Box<dyn ApplicationConfig>, Error> + Send + Sync>;

/// Process-wide Generator Registry, mirroring the Scheme Registry's
/// lazily-initialized, read-mostly shape (see `kure_scheme::registry`).
static REGISTRY: LazyLock<RwLock<HashMap<Gvk, Factory>>> = LazyLock::new(|| RwLock::new(register_builtin_generators()));

fn register_builtin_generators() -> HashMap<Gvk, Factory> {
    let mut map: HashMap<Gvk, Factory> = HashMap::new();
    map.insert(
        Gvk::new(GROUP, VERSION, "AppWorkload"),
        Box::new(|spec| {
            let config: appworkload::AppWorkloadConfig = serde_json::from_value(spec).map_err(|e| {
                Error::config_invalid("spec", e.to_string())
            })?;
            config.validate()?;
            Ok(Box::new(config) as Box<dyn ApplicationConfig>)
        }),
    );
    map.insert(
        Gvk::new(GROUP, VERSION, "FluxHelm"),
        Box::new(|spec| {
            let config: fluxhelm::FluxHelmConfig = serde_json::from_value(spec).map_err(|e| {
                Error::config_invalid("spec", e.to_string())
            })?;
            config.validate()?;
            Ok(Box::new(config) as Box<dyn ApplicationConfig>)
        }),
    );
    map
}

/// A fully decoded `ApplicationWrapper`: the name/namespace from its
/// `metadata`, plus the generator-specific config its `spec` decoded to.
pub struct DecodedApplication {
    pub name: String,
    pub namespace: String,
    pub config: Box<dyn ApplicationConfig>,
}

/// Decodes a whole `ApplicationWrapper` document: looks up the factory for
/// `(apiVersion, kind)`, then hands `spec` to it.
#[instrument(skip(document), fields(%gvk))]
pub fn decode_application_wrapper(document: &Value, gvk: &Gvk) -> Result<DecodedApplication, Error> {
    let name = document
        .pointer("/metadata/name")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let namespace = document
        .pointer("/metadata/namespace")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let spec = document.get("spec").cloned().unwrap_or(Value::Null);

    let guard = REGISTRY.read().expect("generator registry lock poisoned");
    let factory = guard
        .get(gvk)
        .ok_or_else(|| Error::Scheme(kure_scheme::Error::UnknownType { gvk: gvk.clone() }))?;
    let config = factory(spec)?;
    debug!(name, namespace, "decoded application");
    Ok(DecodedApplication { name, namespace, config })
}

/// Whether a generator GVK is registered, without attempting a decode.
pub fn is_known(gvk: &Gvk) -> bool {
    REGISTRY.read().expect("generator registry lock poisoned").contains_key(gvk)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_generators_registered() {
        assert!(is_known(&Gvk::new(GROUP, VERSION, "AppWorkload")));
        assert!(is_known(&Gvk::new(GROUP, VERSION, "FluxHelm")));
        assert!(!is_known(&Gvk::new(GROUP, VERSION, "Bogus")));
    }
}
