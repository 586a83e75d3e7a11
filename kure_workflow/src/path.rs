use std::path::Path;

/// Renders a planned directory path the way a GitOps index Object's
/// `spec.path`/`spec.source.path` wants it: forward-slash separated,
/// regardless of host platform, matching the tar Writer's own convention
/// (§4.8).
pub fn to_repo_path(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
