#![warn(missing_docs)]
//! The Writer: walks a [`kure_layout::ManifestLayout`] and emits manifest
//! files and per-directory `kustomization.yaml` indexes, either to disk or
//! to a tar archive, in a deterministic order.

mod config;
mod error;
mod files;
mod fs;
mod kustomization;
mod path;
mod tar;

pub use config::{default_file_name, default_kind_file_name, WriterConfig};
pub use error::{Error, Result};
pub use fs::write as write_fs;
pub use tar::write as write_tar;
