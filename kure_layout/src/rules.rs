use serde::{Deserialize, Serialize};

/// Whether a tree level becomes its own directory or collapses into its
/// parent.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum Grouping {
    #[default]
    ByName,
    Flat,
}

impl Grouping {
    pub fn is_by_name(self) -> bool {
        matches!(self, Grouping::ByName)
    }
}

/// One YAML file per generated Object, or one per Application.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum ApplicationFileMode {
    #[default]
    PerResource,
    Single,
}

/// Naming strategy when multiple Objects share a file.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum FilePer {
    #[default]
    Resource,
    Kind,
}

/// Whether a directory's `kustomization.yaml` lists every manifest file
/// directly or only its subdirectories (except at leaves, which always
/// list their files).
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum KustomizationMode {
    #[default]
    Explicit,
    Recursive,
}

/// Where a Flux Kustomization lives relative to the manifests it manages.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub enum FluxPlacement {
    #[default]
    Separate,
    Integrated,
}

fn default_manifests_dir() -> String {
    "clusters".to_string()
}

/// Every knob the Layout Planner and Writer read to turn a Cluster into a
/// directory tree.
///
/// `Default` resolves both open questions in the distilled spec: Node
/// grouping defaults to `ByName` (each Node is its own directory) while
/// Bundle/Application grouping default to `Flat` (they collapse into their
/// owning Node's directory) — this is the only `LayoutRules::default()` in
/// this codebase; there is no second, disagreeing copy.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutRules {
    #[serde(default)]
    pub node_grouping: Grouping,
    #[serde(default = "flat")]
    pub bundle_grouping: Grouping,
    #[serde(default = "flat")]
    pub application_grouping: Grouping,
    #[serde(default)]
    pub application_file_mode: ApplicationFileMode,
    #[serde(default)]
    pub file_per: FilePer,
    #[serde(default)]
    pub kustomization_mode: KustomizationMode,
    #[serde(default)]
    pub flux_placement: FluxPlacement,
    #[serde(default)]
    pub cluster_name: Option<String>,
    #[serde(default = "default_manifests_dir")]
    pub manifests_dir: String,
}

fn flat() -> Grouping {
    Grouping::Flat
}

impl Default for LayoutRules {
    fn default() -> Self {
        LayoutRules {
            node_grouping: Grouping::ByName,
            bundle_grouping: Grouping::Flat,
            application_grouping: Grouping::Flat,
            application_file_mode: ApplicationFileMode::PerResource,
            file_per: FilePer::Resource,
            kustomization_mode: KustomizationMode::Explicit,
            flux_placement: FluxPlacement::Separate,
            cluster_name: None,
            manifests_dir: default_manifests_dir(),
        }
    }
}
