#![warn(missing_docs)]
//! The Layout Planner: walks a [`kure_stack::Cluster`] and emits the
//! `ManifestLayout` directory tree the Writer and Workflow Engine consume.

mod error;
mod layout;
mod planner;
mod rules;

pub use error::{Error, Result};
pub use layout::ManifestLayout;
pub use planner::{package_key, plan, plan_by_package, Plan, DEFAULT_PACKAGE_KEY};
pub use rules::{ApplicationFileMode, FilePer, FluxPlacement, Grouping, KustomizationMode, LayoutRules};
