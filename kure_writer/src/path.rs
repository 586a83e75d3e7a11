use std::path::Path;

/// Renders a planned directory path the way a GitOps index Object's
/// `spec.path` carries it: forward-slash separated regardless of host
/// platform, matching `kure_workflow`'s own convention so path-correspondence
/// comparisons agree byte-for-byte.
pub fn to_repo_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
