use kure_scheme::Object;

use crate::error::Result;

/// The identity an Application carries into its `ApplicationConfig`'s
/// generator: everything the config itself doesn't already know.
#[derive(Clone, Debug)]
pub struct AppContext<'a> {
    pub name: &'a str,
    pub namespace: &'a str,
}

/// A decoded generator `spec`, capable of expanding itself into Kubernetes
/// objects. `Generate` is referentially transparent: the same config and
/// context always produce the same object list.
pub trait ApplicationConfig: std::fmt::Debug + Send + Sync {
    fn generate(&self, ctx: &AppContext<'_>) -> Result<Vec<Object>>;
}
