use std::collections::HashMap;
use std::sync::{LazyLock, RwLock};

use tracing::instrument;

use crate::error::Error;
use crate::Workflow;
use crate::{argocd::ArgoWorkflow, flux::FluxWorkflow};

type Factory = Box<dyn Fn() -> Box<dyn Workflow> + Send + Sync>;

/// Process-wide Workflow Engine registry, mirroring the Scheme and
/// Generator registries' lazily-initialized, read-mostly shape.
static REGISTRY: LazyLock<RwLock<HashMap<&'static str, Factory>>> =
    LazyLock::new(|| RwLock::new(register_builtin_providers()));

fn register_builtin_providers() -> HashMap<&'static str, Factory> {
    let mut map: HashMap<&'static str, Factory> = HashMap::new();
    map.insert("flux", Box::new(|| Box::new(FluxWorkflow)));
    map.insert("argocd", Box::new(|| Box::new(ArgoWorkflow)));
    map
}

/// Looks up a GitOps provider by name (`cluster.yaml`'s `gitOps.provider`)
/// and constructs its Workflow Engine.
#[instrument]
pub fn for_provider(provider: &str) -> Result<Box<dyn Workflow>, Error> {
    let guard = REGISTRY.read().expect("workflow registry lock poisoned");
    guard
        .get(provider)
        .map(|factory| factory())
        .ok_or_else(|| Error::UnsupportedProvider(provider.to_string()))
}

/// Whether a provider name is registered, without constructing it.
pub fn is_known(provider: &str) -> bool {
    REGISTRY.read().expect("workflow registry lock poisoned").contains_key(provider)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_providers_registered() {
        assert!(is_known("flux"));
        assert!(is_known("argocd"));
        assert!(!is_known("bogus"));
    }

    #[test]
    fn unknown_provider_errors() {
        assert!(matches!(for_provider("bogus"), Err(Error::UnsupportedProvider(_))));
    }
}
