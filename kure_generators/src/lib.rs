#![warn(missing_docs)]
//! The Generator Registry and the built-in `AppWorkload`/`FluxHelm`
//! generators, plus the small builder library they're written on top of.

pub mod appworkload;
mod build;
pub mod builders;
mod config;
mod error;
pub mod fluxhelm;
mod registry;

pub use build::Build;
pub use config::{AppContext, ApplicationConfig};
pub use error::{Error, Result};
pub use registry::{decode_application_wrapper, is_known, DecodedApplication, GROUP, VERSION};
