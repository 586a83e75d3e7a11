use kure_scheme::types::flux::{
    GitRepository, GitRepositorySpec, HelmChartTemplate, HelmChartTemplateSpec, HelmRelease, HelmReleaseDependency,
    HelmReleaseInstallOptions, HelmReleaseSpec, HelmReleaseUpgradeOptions, KustomizeImage, KustomizePatch,
    KustomizePatchTarget, KustomizePostRenderer, OciRepository, OciRepositorySpec, PostRenderer, SourceRef,
    ValuesReference,
};
use kure_scheme::Object;
use serde::{Deserialize, Serialize};

use crate::config::{AppContext, ApplicationConfig};
use crate::error::{Error, Result};

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartSpec {
    pub name: String,
    pub version: String,
}

/// One of the four Flux source kinds the `source` field may describe.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "PascalCase")]
pub enum SourceSpec {
    HelmRepository {
        url: String,
        #[serde(default)]
        secret_name: Option<String>,
    },
    GitRepository {
        url: String,
        #[serde(default)]
        reference: Option<String>,
    },
    #[serde(rename = "OCIRepository")]
    OciRepository { url: String },
    Bucket {
        bucket_name: String,
        endpoint: String,
        #[serde(default)]
        provider: Option<String>,
    },
}

impl SourceSpec {
    fn kind(&self) -> &'static str {
        match self {
            SourceSpec::HelmRepository { .. } => "HelmRepository",
            SourceSpec::GitRepository { .. } => "GitRepository",
            SourceSpec::OciRepository { .. } => "OCIRepository",
            SourceSpec::Bucket { .. } => "Bucket",
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartRefSpec {
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseOptions {
    #[serde(default)]
    pub create_namespace: Option<bool>,
    #[serde(default)]
    pub disable_wait: Option<bool>,
    #[serde(default)]
    pub replace: Option<bool>,
    /// `Create`, `CreateReplace`, or `Skip` — Flux's CRD-management policy.
    #[serde(default)]
    pub crds: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KustomizePatchSpec {
    pub patch: String,
    #[serde(default)]
    pub target_kind: Option<String>,
    #[serde(default)]
    pub target_name: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KustomizeImageSpec {
    pub name: String,
    #[serde(default)]
    pub new_name: Option<String>,
    #[serde(default)]
    pub new_tag: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostRendererSpec {
    #[serde(default)]
    pub patches: Vec<KustomizePatchSpec>,
    #[serde(default)]
    pub images: Vec<KustomizeImageSpec>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuesFromSpec {
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub values_key: Option<String>,
    #[serde(default)]
    pub target_path: Option<String>,
    #[serde(default)]
    pub optional: Option<bool>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencySpec {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

/// The `FluxHelm` generator's decoded configuration. Exactly one of `chart`
/// or `chart_ref` must be set; [`FluxHelmConfig::validate`] enforces that at
/// decode time, before `generate` ever runs.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FluxHelmConfig {
    #[serde(default)]
    pub chart: Option<ChartSpec>,
    #[serde(default)]
    pub source: Option<SourceSpec>,
    #[serde(default)]
    pub chart_ref: Option<ChartRefSpec>,
    #[serde(default)]
    pub values: Option<serde_json::Value>,
    #[serde(default)]
    pub values_from: Vec<ValuesFromSpec>,
    #[serde(default)]
    pub release_name: Option<String>,
    #[serde(default)]
    pub target_namespace: Option<String>,
    #[serde(default = "default_interval")]
    pub interval: String,
    #[serde(default)]
    pub timeout: Option<String>,
    #[serde(default)]
    pub max_history: Option<i32>,
    #[serde(default)]
    pub suspend: Option<bool>,
    #[serde(default)]
    pub install: ReleaseOptions,
    #[serde(default)]
    pub upgrade: ReleaseOptions,
    #[serde(default)]
    pub depends_on: Vec<DependencySpec>,
    #[serde(default)]
    pub post_renderers: Vec<PostRendererSpec>,
}

const VALID_CRDS_POLICIES: [&str; 3] = ["Create", "CreateReplace", "Skip"];

fn default_interval() -> String {
    "10m".to_string()
}

impl FluxHelmConfig {
    pub fn validate(&self) -> Result<()> {
        match (&self.chart, &self.chart_ref) {
            (Some(_), Some(_)) => Err(Error::config_invalid(
                "chart/chartRef",
                "chart and chartRef are mutually exclusive",
            )),
            (None, None) => Err(Error::config_invalid(
                "chart/chartRef",
                "exactly one of chart or chartRef is required",
            )),
            (Some(_), None) if self.source.is_none() => {
                Err(Error::config_invalid("source", "required when chart is set"))
            }
            (None, Some(chart_ref)) if !matches!(chart_ref.kind.as_str(), "OCIRepository" | "HelmChart") => {
                Err(Error::config_invalid(
                    "chartRef.kind",
                    "must be OCIRepository or HelmChart",
                ))
            }
            _ => {
                parse_duration(&self.interval, "interval")?;
                if let Some(timeout) = &self.timeout {
                    parse_duration(timeout, "timeout")?;
                }
                validate_crds("install.crds", &self.install.crds)?;
                validate_crds("upgrade.crds", &self.upgrade.crds)?;
                Ok(())
            }
        }
    }
}

fn validate_crds(field: &'static str, value: &Option<String>) -> Result<()> {
    match value {
        Some(policy) if !VALID_CRDS_POLICIES.contains(&policy.as_str()) => Err(Error::config_invalid(
            field,
            format!("must be one of {VALID_CRDS_POLICIES:?}, got {policy:?}"),
        )),
        _ => Ok(()),
    }
}

/// Flux durations are Go duration strings (`10m`, `1h30m`); Kure only needs
/// to reject garbage, not parse the value, since it passes the string
/// through to the HelmRelease/source verbatim.
fn parse_duration(value: &str, field: &'static str) -> Result<()> {
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, 'h' | 'm' | 's' | '.'));
    if valid {
        Ok(())
    } else {
        Err(Error::config_invalid(field, format!("not a valid duration: {value}")))
    }
}

impl ApplicationConfig for FluxHelmConfig {
    fn generate(&self, ctx: &AppContext<'_>) -> Result<Vec<Object>> {
        let mut objects = Vec::new();
        let namespace = self.target_namespace.clone().unwrap_or_else(|| ctx.namespace.to_string());

        let source_ref = if let Some(chart_ref) = &self.chart_ref {
            SourceRef {
                kind: chart_ref.kind.clone(),
                name: chart_ref.name.clone(),
                namespace: chart_ref.namespace.clone(),
            }
        } else {
            let source = self.source.as_ref().expect("validate() requires source with chart");
            let source_name = format!("{}-source", ctx.name);
            objects.push(build_source(source, &source_name, &namespace));
            SourceRef {
                kind: source.kind().to_string(),
                name: source_name,
                namespace: Some(namespace.clone()),
            }
        };

        let chart = self.chart.as_ref().map(|c| HelmChartTemplate {
            spec: HelmChartTemplateSpec {
                chart: c.name.clone(),
                version: Some(c.version.clone()),
                source_ref: source_ref.clone(),
            },
        });

        let spec = HelmReleaseSpec {
            chart,
            chart_ref: self.chart_ref.as_ref().map(|_| source_ref.clone()),
            interval: self.interval.clone(),
            target_namespace: self.target_namespace.clone(),
            release_name: self.release_name.clone(),
            timeout: self.timeout.clone(),
            max_history: self.max_history,
            suspend: self.suspend,
            depends_on: self
                .depends_on
                .iter()
                .map(|d| HelmReleaseDependency {
                    name: d.name.clone(),
                    namespace: d.namespace.clone(),
                })
                .collect(),
            values: self.values.clone(),
            values_from: self
                .values_from
                .iter()
                .map(|v| ValuesReference {
                    kind: v.kind.clone(),
                    name: v.name.clone(),
                    values_key: v.values_key.clone(),
                    target_path: v.target_path.clone(),
                    optional: v.optional,
                })
                .collect(),
            install: Some(HelmReleaseInstallOptions {
                create_namespace: self.install.create_namespace,
                replace: self.install.replace,
                disable_wait: self.install.disable_wait,
                crds: self.install.crds.clone(),
            }),
            upgrade: Some(HelmReleaseUpgradeOptions {
                disable_wait: self.upgrade.disable_wait,
                force: None,
                crds: self.upgrade.crds.clone(),
            }),
            post_renderers: self.post_renderers.iter().map(build_post_renderer).collect(),
        };

        let release = HelmRelease {
            metadata: object_meta(ctx.name, &namespace),
            spec,
        };
        objects.push(kure_scheme::from_typed(&release));
        Ok(objects)
    }
}

fn object_meta(name: &str, namespace: &str) -> k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta {
    k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        ..Default::default()
    }
}

fn build_post_renderer(spec: &PostRendererSpec) -> PostRenderer {
    PostRenderer {
        kustomize: KustomizePostRenderer {
            patches: spec
                .patches
                .iter()
                .map(|p| KustomizePatch {
                    patch: p.patch.clone(),
                    target: (p.target_kind.is_some() || p.target_name.is_some()).then(|| KustomizePatchTarget {
                        kind: p.target_kind.clone(),
                        name: p.target_name.clone(),
                    }),
                })
                .collect(),
            images: spec
                .images
                .iter()
                .map(|i| KustomizeImage {
                    name: i.name.clone(),
                    new_name: i.new_name.clone(),
                    new_tag: i.new_tag.clone(),
                })
                .collect(),
        },
    }
}

fn build_source(source: &SourceSpec, name: &str, namespace: &str) -> Object {
    match source {
        SourceSpec::HelmRepository { url, secret_name } => kure_scheme::from_typed(&kure_scheme::types::flux::HelmRepository {
            metadata: object_meta(name, namespace),
            spec: kure_scheme::types::flux::HelmRepositorySpec {
                url: url.clone(),
                interval: default_interval(),
                repo_type: None,
                secret_ref: secret_name
                    .clone()
                    .map(|n| kure_scheme::types::flux::LocalObjectReference { name: n }),
            },
        }),
        SourceSpec::GitRepository { url, reference } => kure_scheme::from_typed(&GitRepository {
            metadata: object_meta(name, namespace),
            spec: GitRepositorySpec {
                url: url.clone(),
                interval: default_interval(),
                reference: reference.as_ref().map(|r| kure_scheme::types::flux::GitRepositoryRef {
                    branch: Some(r.clone()),
                    tag: None,
                    commit: None,
                }),
                secret_ref: None,
            },
        }),
        SourceSpec::OciRepository { url } => kure_scheme::from_typed(&OciRepository {
            metadata: object_meta(name, namespace),
            spec: OciRepositorySpec {
                url: url.clone(),
                interval: default_interval(),
                reference: None,
                secret_ref: None,
            },
        }),
        SourceSpec::Bucket {
            bucket_name,
            endpoint,
            provider,
        } => kure_scheme::from_typed(&kure_scheme::types::flux::Bucket {
            metadata: object_meta(name, namespace),
            spec: kure_scheme::types::flux::BucketSpec {
                bucket_name: bucket_name.clone(),
                endpoint: endpoint.clone(),
                interval: default_interval(),
                provider: provider.clone(),
                secret_ref: None,
            },
        }),
    }
}
