use kure_generators::ApplicationConfig;

/// A named unit owning one decoded generator config. Generates the
/// Kubernetes objects that make up one deployable piece of software.
pub struct Application {
    pub name: String,
    pub namespace: String,
    pub config: Box<dyn ApplicationConfig>,
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("name", &self.name)
            .field("namespace", &self.namespace)
            .field("config", &self.config)
            .finish()
    }
}
