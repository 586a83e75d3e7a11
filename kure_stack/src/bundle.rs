use kure_generators::AppContext;
use kure_scheme::Object;

use crate::application::Application;
use crate::error::{Error, Result};
use crate::ids::{BundleId, NodeId};

/// A named group of Applications deployed together; the unit the Workflow
/// Engine produces one GitOps index object per.
#[derive(Debug)]
pub struct Bundle {
    pub name: String,
    pub depends_on: Vec<BundleId>,
    pub(crate) parent: Option<NodeId>,
    applications: Vec<Application>,
}

impl Bundle {
    pub fn new(name: impl Into<String>) -> Self {
        Bundle {
            name: name.into(),
            depends_on: Vec::new(),
            parent: None,
            applications: Vec::new(),
        }
    }

    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    /// Adds an Application, rejecting a name already present in this
    /// Bundle.
    pub fn add_application(&mut self, app: Application) -> Result<()> {
        if self.applications.iter().any(|a| a.name == app.name) {
            return Err(Error::DuplicateName {
                kind: "Application",
                name: app.name,
            });
        }
        self.applications.push(app);
        Ok(())
    }

    pub fn set_parent(&mut self, parent: NodeId) {
        self.parent = Some(parent);
    }

    /// Invokes `Generate` on each Application in insertion order and
    /// concatenates the results.
    pub fn generate(&self) -> Result<Vec<Object>> {
        let mut objects = Vec::new();
        for app in &self.applications {
            let ctx = AppContext {
                name: &app.name,
                namespace: &app.namespace,
            };
            objects.extend(app.config.generate(&ctx)?);
        }
        Ok(objects)
    }
}
