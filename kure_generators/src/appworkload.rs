use std::collections::BTreeMap;

use kure_scheme::Object;
use serde::{Deserialize, Serialize};

use crate::build::Build;
use crate::builders::{
    ContainerInput, CronJobBuilder, DaemonSetBuilder, DeploymentBuilder, IngressBuilder, JobBuilder, ProbeInput,
    PvcBuilder, ResourceInput, ServiceBuilder, ServicePortInput, StatefulSetBuilder, VolumeMountInput,
};
use crate::config::{AppContext, ApplicationConfig};
use crate::error::{Error, Result};

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum WorkloadKind {
    #[default]
    Deployment,
    StatefulSet,
    DaemonSet,
    Job,
    CronJob,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSpec {
    #[serde(default)]
    pub cpu: Option<String>,
    #[serde(default)]
    pub memory: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesSpec {
    #[serde(default)]
    pub requests: ResourceSpec,
    #[serde(default)]
    pub limits: ResourceSpec,
}

/// An HTTP GET or exec liveness/readiness probe; exactly one of `http_get`'s
/// `path`/`exec`'s `command` is expected to be set.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeSpec {
    #[serde(default)]
    pub http_get: Option<HttpGetProbeSpec>,
    #[serde(default)]
    pub exec: Option<ExecProbeSpec>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpGetProbeSpec {
    pub path: String,
    pub port: i32,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecProbeSpec {
    pub command: Vec<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeMountSpec {
    pub name: String,
    pub mount_path: String,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerSpec {
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub ports: Vec<i32>,
    #[serde(default)]
    pub env: BTreeMap<String, String>,
    #[serde(default)]
    pub resources: ResourcesSpec,
    #[serde(default)]
    pub liveness_probe: Option<ProbeSpec>,
    #[serde(default)]
    pub readiness_probe: Option<ProbeSpec>,
    #[serde(default)]
    pub volume_mounts: Vec<VolumeMountSpec>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServicePortSpec {
    pub port: i32,
    #[serde(default)]
    pub target_port: Option<i32>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSpec {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_service_type")]
    pub service_type: String,
    pub ports: Vec<ServicePortSpec>,
}

fn default_service_type() -> String {
    "ClusterIP".to_string()
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressSpec {
    pub host: String,
    #[serde(default = "default_ingress_path")]
    pub path: String,
    pub service_name: String,
    pub service_port: i32,
}

fn default_ingress_path() -> String {
    "/".to_string()
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistentVolumeClaimSpec {
    pub name: String,
    pub storage: String,
    #[serde(default = "default_access_modes")]
    pub access_modes: Vec<String>,
}

fn default_access_modes() -> Vec<String> {
    vec!["ReadWriteOnce".to_string()]
}

fn default_replicas() -> i32 {
    1
}

/// The `AppWorkload` generator's decoded configuration: a workload (one of
/// five kinds), its containers, and an optional set of Services/Ingress/PVC
/// templates built alongside it.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppWorkloadConfig {
    #[serde(default)]
    pub workload: WorkloadKind,
    #[serde(default = "default_replicas")]
    pub replicas: i32,
    pub containers: Vec<ContainerSpec>,
    #[serde(default)]
    pub services: Vec<ServiceSpec>,
    #[serde(default)]
    pub ingress: Option<IngressSpec>,
    #[serde(default)]
    pub volume_claim_templates: Vec<PersistentVolumeClaimSpec>,
    #[serde(default)]
    pub schedule: Option<String>,
}

impl ProbeSpec {
    fn validate(&self, field: &str) -> Result<()> {
        match (&self.http_get, &self.exec) {
            (Some(_), Some(_)) | (None, None) => Err(Error::config_invalid(
                field,
                "exactly one of httpGet or exec must be set",
            )),
            _ => Ok(()),
        }
    }

    fn into_input(&self) -> ProbeInput {
        match (&self.http_get, &self.exec) {
            (Some(h), _) => ProbeInput::HttpGet {
                path: h.path.clone(),
                port: h.port,
            },
            (None, Some(e)) => ProbeInput::Exec {
                command: e.command.clone(),
            },
            (None, None) => unreachable!("validate() rejects this combination"),
        }
    }
}

impl AppWorkloadConfig {
    pub fn validate(&self) -> Result<()> {
        if self.containers.is_empty() {
            return Err(Error::config_invalid("containers", "at least one container is required"));
        }
        if self.workload == WorkloadKind::CronJob && self.schedule.is_none() {
            return Err(Error::config_invalid("schedule", "required when workload is CronJob"));
        }
        for container in &self.containers {
            if let Some(probe) = &container.liveness_probe {
                probe.validate(&format!("containers[{}].livenessProbe", container.name))?;
            }
            if let Some(probe) = &container.readiness_probe {
                probe.validate(&format!("containers[{}].readinessProbe", container.name))?;
            }
        }
        Ok(())
    }
}

impl ApplicationConfig for AppWorkloadConfig {
    fn generate(&self, ctx: &AppContext<'_>) -> Result<Vec<Object>> {
        let containers: Vec<ContainerInput> = self
            .containers
            .iter()
            .map(|c| ContainerInput {
                name: c.name.clone(),
                image: c.image.clone(),
                ports: c.ports.clone(),
                env: c.env.clone(),
                requests: ResourceInput {
                    cpu: c.resources.requests.cpu.clone(),
                    memory: c.resources.requests.memory.clone(),
                },
                limits: ResourceInput {
                    cpu: c.resources.limits.cpu.clone(),
                    memory: c.resources.limits.memory.clone(),
                },
                liveness_probe: c.liveness_probe.as_ref().map(ProbeSpec::into_input),
                readiness_probe: c.readiness_probe.as_ref().map(ProbeSpec::into_input),
                volume_mounts: c
                    .volume_mounts
                    .iter()
                    .map(|m| VolumeMountInput {
                        name: m.name.clone(),
                        mount_path: m.mount_path.clone(),
                    })
                    .collect(),
            })
            .collect();

        let mut objects = Vec::new();

        match self.workload {
            WorkloadKind::Deployment => objects.push(kure_scheme::from_typed(&(DeploymentBuilder {
                name: ctx.name.to_string(),
                namespace: ctx.namespace.to_string(),
                replicas: self.replicas,
                containers,
            })
            .build())),
            WorkloadKind::StatefulSet => objects.push(kure_scheme::from_typed(&(StatefulSetBuilder {
                name: ctx.name.to_string(),
                namespace: ctx.namespace.to_string(),
                replicas: self.replicas,
                containers,
            })
            .build())),
            WorkloadKind::DaemonSet => objects.push(kure_scheme::from_typed(&(DaemonSetBuilder {
                name: ctx.name.to_string(),
                namespace: ctx.namespace.to_string(),
                containers,
            })
            .build())),
            WorkloadKind::Job => objects.push(kure_scheme::from_typed(&(JobBuilder {
                name: ctx.name.to_string(),
                namespace: ctx.namespace.to_string(),
                containers,
            })
            .build())),
            WorkloadKind::CronJob => {
                let schedule = self
                    .schedule
                    .clone()
                    .expect("validate() guarantees a schedule for CronJob");
                objects.push(kure_scheme::from_typed(&(CronJobBuilder {
                    name: ctx.name.to_string(),
                    namespace: ctx.namespace.to_string(),
                    schedule,
                    containers,
                })
                .build()))
            }
        }

        for (i, svc) in self.services.iter().enumerate() {
            let name = svc.name.clone().unwrap_or_else(|| default_service_name(ctx.name, i));
            objects.push(kure_scheme::from_typed(
                &(ServiceBuilder {
                    name,
                    namespace: ctx.namespace.to_string(),
                    selector_name: ctx.name.to_string(),
                    service_type: svc.service_type.clone(),
                    ports: svc
                        .ports
                        .iter()
                        .map(|p| ServicePortInput {
                            name: p.name.clone(),
                            port: p.port,
                            target_port: p.target_port,
                        })
                        .collect(),
                }
                .build()),
            ));
        }

        if let Some(ingress) = &self.ingress {
            objects.push(kure_scheme::from_typed(
                &(IngressBuilder {
                    name: format!("{}-ingress", ctx.name),
                    namespace: ctx.namespace.to_string(),
                    host: ingress.host.clone(),
                    path: ingress.path.clone(),
                    service_name: ingress.service_name.clone(),
                    service_port: ingress.service_port,
                }
                .build()),
            ));
        }

        for pvc in &self.volume_claim_templates {
            objects.push(kure_scheme::from_typed(
                &(PvcBuilder {
                    name: pvc.name.clone(),
                    namespace: ctx.namespace.to_string(),
                    storage: pvc.storage.clone(),
                    access_modes: pvc.access_modes.clone(),
                }
                .build()),
            ));
        }

        Ok(objects)
    }
}

/// The default Service name when a Service entry in the spec doesn't name
/// itself: `{app}-svc` for the first (or only) Service, `{app}-svc-{n}` for
/// subsequent ones, keeping names unique within the Application.
fn default_service_name(app: &str, index: usize) -> String {
    if index == 0 {
        format!("{app}-svc")
    } else {
        format!("{app}-svc-{index}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>() -> AppContext<'a> {
        AppContext {
            name: "web",
            namespace: "prod",
        }
    }

    #[test]
    fn single_deployment_and_service() {
        let cfg = AppWorkloadConfig {
            workload: WorkloadKind::Deployment,
            replicas: 2,
            containers: vec![ContainerSpec {
                name: "nginx".to_string(),
                image: "nginx:1.21".to_string(),
                ports: vec![80],
                env: BTreeMap::new(),
                ..Default::default()
            }],
            services: vec![ServiceSpec {
                name: None,
                service_type: "ClusterIP".to_string(),
                ports: vec![ServicePortSpec {
                    port: 80,
                    target_port: None,
                    name: None,
                }],
            }],
            ingress: None,
            volume_claim_templates: vec![],
            schedule: None,
        };
        cfg.validate().unwrap();
        let objects = cfg.generate(&ctx()).unwrap();
        assert_eq!(objects.len(), 2);
        assert_eq!(objects[0].gvk().kind, "Deployment");
        assert_eq!(objects[0].name(), "web");
        assert_eq!(objects[1].gvk().kind, "Service");
        assert_eq!(objects[1].name(), "web-svc");
    }

    #[test]
    fn cron_job_without_schedule_is_config_invalid() {
        let cfg = AppWorkloadConfig {
            workload: WorkloadKind::CronJob,
            replicas: 1,
            containers: vec![ContainerSpec {
                name: "job".to_string(),
                image: "busybox".to_string(),
                ports: vec![],
                env: BTreeMap::new(),
                ..Default::default()
            }],
            services: vec![],
            ingress: None,
            volume_claim_templates: vec![],
            schedule: None,
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn output_order_is_workload_services_ingress_pvcs() {
        let cfg = AppWorkloadConfig {
            workload: WorkloadKind::Deployment,
            replicas: 1,
            containers: vec![ContainerSpec {
                name: "nginx".to_string(),
                image: "nginx".to_string(),
                ports: vec![80],
                env: BTreeMap::new(),
                ..Default::default()
            }],
            services: vec![ServiceSpec {
                name: None,
                service_type: "ClusterIP".to_string(),
                ports: vec![ServicePortSpec {
                    port: 80,
                    target_port: None,
                    name: None,
                }],
            }],
            ingress: Some(IngressSpec {
                host: "web.example.com".to_string(),
                path: "/".to_string(),
                service_name: "web-svc".to_string(),
                service_port: 80,
            }),
            volume_claim_templates: vec![PersistentVolumeClaimSpec {
                name: "data".to_string(),
                storage: "10Gi".to_string(),
                access_modes: default_access_modes(),
            }],
            schedule: None,
        };
        let objects = cfg.generate(&ctx()).unwrap();
        let kinds: Vec<_> = objects.iter().map(|o| o.gvk().kind.clone()).collect();
        assert_eq!(kinds, vec!["Deployment", "Service", "Ingress", "PersistentVolumeClaim"]);
    }

    #[test]
    fn probe_with_neither_httpget_nor_exec_is_config_invalid() {
        let cfg = AppWorkloadConfig {
            workload: WorkloadKind::Deployment,
            replicas: 1,
            containers: vec![ContainerSpec {
                name: "web".to_string(),
                image: "nginx".to_string(),
                liveness_probe: Some(ProbeSpec {
                    http_get: None,
                    exec: None,
                }),
                ..Default::default()
            }],
            services: vec![],
            ingress: None,
            volume_claim_templates: vec![],
            schedule: None,
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn resources_probes_and_volume_mounts_reach_the_pod_spec() {
        let cfg = AppWorkloadConfig {
            workload: WorkloadKind::Deployment,
            replicas: 1,
            containers: vec![ContainerSpec {
                name: "web".to_string(),
                image: "nginx".to_string(),
                ports: vec![80],
                resources: ResourcesSpec {
                    requests: ResourceSpec {
                        cpu: Some("100m".to_string()),
                        memory: Some("128Mi".to_string()),
                    },
                    limits: ResourceSpec {
                        cpu: Some("500m".to_string()),
                        memory: None,
                    },
                },
                liveness_probe: Some(ProbeSpec {
                    http_get: Some(HttpGetProbeSpec {
                        path: "/healthz".to_string(),
                        port: 80,
                    }),
                    exec: None,
                }),
                readiness_probe: Some(ProbeSpec {
                    http_get: None,
                    exec: Some(ExecProbeSpec {
                        command: vec!["cat".to_string(), "/tmp/ready".to_string()],
                    }),
                }),
                volume_mounts: vec![VolumeMountSpec {
                    name: "data".to_string(),
                    mount_path: "/var/data".to_string(),
                }],
                ..Default::default()
            }],
            services: vec![],
            ingress: None,
            volume_claim_templates: vec![PersistentVolumeClaimSpec {
                name: "data".to_string(),
                storage: "1Gi".to_string(),
                access_modes: default_access_modes(),
            }],
            schedule: None,
        };
        cfg.validate().unwrap();
        let objects = cfg.generate(&ctx()).unwrap();
        let deployment = objects
            .iter()
            .find(|o| o.gvk().kind == "Deployment")
            .expect("deployment present");
        let json = deployment.to_value();
        let container = json["spec"]["template"]["spec"]["containers"][0].clone();
        assert_json_diff::assert_json_eq!(
            container,
            serde_json::json!({
                "name": "web",
                "image": "nginx",
                "ports": [{"containerPort": 80}],
                "resources": {
                    "requests": {"cpu": "100m", "memory": "128Mi"},
                    "limits": {"cpu": "500m"},
                },
                "livenessProbe": {"httpGet": {"path": "/healthz", "port": 80}},
                "readinessProbe": {"exec": {"command": ["cat", "/tmp/ready"]}},
                "volumeMounts": [{"name": "data", "mountPath": "/var/data"}],
            })
        );
        assert_eq!(
            json["spec"]["template"]["spec"]["volumes"][0]["persistentVolumeClaim"]["claimName"],
            "data"
        );
    }
}
