use std::path::PathBuf;
use std::sync::Arc;

use kure_scheme::{Object, StripLevel};

/// Builds the default per-resource manifest file name:
/// `{namespace}-{kind-lowercased}-{name}.yaml` (§6).
pub fn default_file_name(object: &Object) -> String {
    format!(
        "{}-{}-{}.yaml",
        namespace_segment(object),
        object.gvk().kind.to_lowercase(),
        object.name()
    )
}

/// Builds the per-kind manifest file name used when `FilePer::Kind` groups
/// several objects of the same kind together: `{namespace}-{kind}.yaml`.
pub fn default_kind_file_name(object: &Object) -> String {
    format!("{}-{}.yaml", namespace_segment(object), object.gvk().kind.to_lowercase())
}

fn namespace_segment(object: &Object) -> &str {
    object.namespace().filter(|ns| !ns.is_empty()).unwrap_or("cluster")
}

/// Everything the Writer needs besides the `ManifestLayout` it walks: where
/// to write, how aggressively to strip server fields, and how to name
/// per-resource manifest files.
#[derive(Clone)]
pub struct WriterConfig {
    /// Root the directory tree (or tar archive) is written under.
    pub base_path: PathBuf,
    /// Forwarded to [`kure_scheme::serialize`] for every file written.
    pub strip: StripLevel,
    /// Names one manifest file for a single Object, under `FilePer::Resource`.
    pub file_name: Arc<dyn Fn(&Object) -> String + Send + Sync>,
    /// Names the shared manifest file for every Object of one Kind, under
    /// `FilePer::Kind`.
    pub kind_file_name: Arc<dyn Fn(&Object) -> String + Send + Sync>,
    /// Names one manifest file for a whole directory's resources, under
    /// `ApplicationFileMode::Single`.
    pub single_file_name: Arc<dyn Fn(&str) -> String + Send + Sync>,
}

impl WriterConfig {
    /// A `WriterConfig` rooted at `base_path` with every other field at its
    /// documented default.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        WriterConfig {
            base_path: base_path.into(),
            ..Self::default()
        }
    }
}

impl Default for WriterConfig {
    fn default() -> Self {
        WriterConfig {
            base_path: PathBuf::new(),
            strip: StripLevel::default(),
            file_name: Arc::new(default_file_name),
            kind_file_name: Arc::new(default_kind_file_name),
            single_file_name: Arc::new(|name| {
                if name.is_empty() {
                    "root.yaml".to_string()
                } else {
                    format!("{name}.yaml")
                }
            }),
        }
    }
}
