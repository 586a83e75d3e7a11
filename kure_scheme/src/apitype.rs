use serde::{de::DeserializeOwned, Serialize};

/// A type whose Group/Version/Kind are known at compile time.
///
/// `k8s-openapi` types already carry this information via
/// [`k8s_openapi::Resource`]; [`impl_k8s_api_type!`] bridges that trait into
/// this one so the Scheme Registry has a single interface to register
/// against, whether the underlying type came from `k8s-openapi` or is one of
/// this crate's own GitOps custom resource types (see [`crate::types`]).
pub trait ApiType: DeserializeOwned + Serialize {
    const GROUP: &'static str;
    const VERSION: &'static str;
    const KIND: &'static str;
}

/// Bridges a `k8s-openapi` resource type into [`ApiType`].
macro_rules! impl_k8s_api_type {
    ($t:ty) => {
        impl $crate::apitype::ApiType for $t {
            const GROUP: &'static str = <$t as k8s_openapi::Resource>::GROUP;
            const VERSION: &'static str = <$t as k8s_openapi::Resource>::VERSION;
            const KIND: &'static str = <$t as k8s_openapi::Resource>::KIND;
        }
    };
}

pub(crate) use impl_k8s_api_type;

/// Implements [`ApiType`] directly from a literal Group/Version/Kind, for
/// custom resource shapes this crate defines itself (Flux, Argo CD) rather
/// than reusing from `k8s-openapi`.
#[macro_export]
macro_rules! impl_gvk_const {
    ($t:ty, $group:literal, $version:literal, $kind:literal) => {
        impl $crate::apitype::ApiType for $t {
            const GROUP: &'static str = $group;
            const VERSION: &'static str = $version;
            const KIND: &'static str = $kind;
        }
    };
}
