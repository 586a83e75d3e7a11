use kure_layout::KustomizationMode;
use serde::Serialize;

use crate::files::FileGroup;

const API_VERSION: &str = "kustomize.config.kubernetes.io/v1beta1";

#[derive(Serialize)]
struct KustomizationDoc {
    #[serde(rename = "apiVersion")]
    api_version: &'static str,
    kind: &'static str,
    resources: Vec<String>,
}

/// Builds this directory's `kustomization.yaml` contents (§4.8 step 4).
///
/// `integrated_children` names the children whose directory reference is
/// replaced by a Flux Kustomization stand-in file rather than the bare
/// child name (`FluxPlacement::Integrated`); the stand-in file itself is
/// excluded from the plain file listing below since this substitution
/// already accounts for it.
pub fn build(
    mode: KustomizationMode,
    files: &[FileGroup<'_>],
    children: &[String],
    integrated_children: &[(String, String)],
) -> String {
    let is_leaf = children.is_empty();
    let mut resources = Vec::new();

    if matches!(mode, KustomizationMode::Explicit) || is_leaf {
        let mut file_names: Vec<&str> = files
            .iter()
            .map(|f| f.name.as_str())
            .filter(|name| !integrated_children.iter().any(|(_, stand_in)| stand_in == name))
            .collect();
        file_names.sort_unstable();
        resources.extend(file_names.into_iter().map(str::to_string));
    }

    let mut child_names = children.to_vec();
    child_names.sort();
    for child in child_names {
        if let Some((_, stand_in)) = integrated_children.iter().find(|(name, _)| name == &child) {
            resources.push(stand_in.clone());
        } else {
            resources.push(child);
        }
    }

    let doc = KustomizationDoc {
        api_version: API_VERSION,
        kind: "Kustomization",
        resources,
    };
    serde_yaml::to_string(&doc).expect("kustomization document always serializes")
}
