//! Small, pointwise-trivial constructors for the Kubernetes and Flux object
//! kinds the generators in this crate produce. Each `XxxBuilder` holds
//! already-validated fields and turns them into the concrete object via
//! [`Build::build`], mirroring the one-struct-per-kind builder library
//! pattern used throughout the wider Kure builder surface.

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{DaemonSet, DaemonSetSpec, Deployment, DeploymentSpec, StatefulSet, StatefulSetSpec};
use k8s_openapi::api::batch::v1::{CronJob, CronJobSpec, Job, JobSpec, JobTemplateSpec};
use k8s_openapi::api::core::v1::{
    Container, ContainerPort, EnvVar, ExecAction, HTTPGetAction, PersistentVolumeClaim, PersistentVolumeClaimSpec,
    PersistentVolumeClaimVolumeSource, PodSpec, PodTemplateSpec, Probe, ResourceRequirements, Service, ServicePort,
    ServiceSpec as K8sServiceSpec, Volume, VolumeMount,
};
use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule, IngressServiceBackend, IngressSpec,
    ServiceBackendPort,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use crate::build::Build;

/// The Kubernetes "recommended labels" convention, used as both selector and
/// template labels for every workload this crate builds.
pub fn standard_labels(name: &str) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert("app.kubernetes.io/name".to_string(), name.to_string());
    labels.insert("app.kubernetes.io/instance".to_string(), name.to_string());
    labels
}

fn object_meta(name: &str, namespace: &str, labels: &BTreeMap<String, String>) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: Some(namespace.to_string()),
        labels: Some(labels.clone().into_iter().collect()),
        ..Default::default()
    }
}

fn label_selector(labels: &BTreeMap<String, String>) -> LabelSelector {
    LabelSelector {
        match_labels: Some(labels.clone().into_iter().collect()),
        ..Default::default()
    }
}

fn pod_template(
    _name: &str,
    labels: &BTreeMap<String, String>,
    containers: Vec<Container>,
    volumes: Vec<Volume>,
) -> PodTemplateSpec {
    PodTemplateSpec {
        metadata: Some(ObjectMeta {
            labels: Some(labels.clone().into_iter().collect()),
            ..Default::default()
        }),
        spec: Some(PodSpec {
            containers,
            volumes: (!volumes.is_empty()).then_some(volumes),
            ..Default::default()
        }),
    }
}

/// CPU/memory quantities for one side (requests or limits) of a container's
/// `resources` block.
#[derive(Clone, Default)]
pub struct ResourceInput {
    pub cpu: Option<String>,
    pub memory: Option<String>,
}

impl ResourceInput {
    fn is_empty(&self) -> bool {
        self.cpu.is_none() && self.memory.is_none()
    }

    fn into_quantities(self) -> BTreeMap<String, Quantity> {
        let mut map = BTreeMap::new();
        if let Some(cpu) = self.cpu {
            map.insert("cpu".to_string(), Quantity(cpu));
        }
        if let Some(memory) = self.memory {
            map.insert("memory".to_string(), Quantity(memory));
        }
        map
    }
}

/// A liveness/readiness probe, either an HTTP GET or an exec command.
#[derive(Clone)]
pub enum ProbeInput {
    HttpGet { path: String, port: i32 },
    Exec { command: Vec<String> },
}

/// A single `volumeMounts` entry; the matching `volumes` entry (a
/// `persistentVolumeClaim` source named after this mount) is added to the
/// pod spec by the workload builders below.
#[derive(Clone)]
pub struct VolumeMountInput {
    pub name: String,
    pub mount_path: String,
}

/// One container specification's worth of inputs, already validated by the
/// caller; kept separate from the generator's own `ContainerSpec` so this
/// module has no dependency on the generator-config types.
#[derive(Default)]
pub struct ContainerInput {
    pub name: String,
    pub image: String,
    pub ports: Vec<i32>,
    pub env: BTreeMap<String, String>,
    pub requests: ResourceInput,
    pub limits: ResourceInput,
    pub liveness_probe: Option<ProbeInput>,
    pub readiness_probe: Option<ProbeInput>,
    pub volume_mounts: Vec<VolumeMountInput>,
}

fn build_probe(p: &ProbeInput) -> Probe {
    match p {
        ProbeInput::HttpGet { path, port } => Probe {
            http_get: Some(HTTPGetAction {
                path: Some(path.clone()),
                port: IntOrString::Int(*port),
                ..Default::default()
            }),
            ..Default::default()
        },
        ProbeInput::Exec { command } => Probe {
            exec: Some(ExecAction {
                command: Some(command.clone()),
            }),
            ..Default::default()
        },
    }
}

fn build_resources(c: &ContainerInput) -> Option<ResourceRequirements> {
    if c.requests.is_empty() && c.limits.is_empty() {
        return Some(ResourceRequirements::default());
    }
    Some(ResourceRequirements {
        requests: (!c.requests.is_empty()).then(|| c.requests.clone().into_quantities().into_iter().collect()),
        limits: (!c.limits.is_empty()).then(|| c.limits.clone().into_quantities().into_iter().collect()),
        ..Default::default()
    })
}

pub fn build_container(c: &ContainerInput) -> Container {
    Container {
        name: c.name.clone(),
        image: Some(c.image.clone()),
        ports: if c.ports.is_empty() {
            None
        } else {
            Some(
                c.ports
                    .iter()
                    .map(|p| ContainerPort {
                        container_port: *p,
                        ..Default::default()
                    })
                    .collect(),
            )
        },
        env: if c.env.is_empty() {
            None
        } else {
            Some(
                c.env
                    .iter()
                    .map(|(k, v)| EnvVar {
                        name: k.clone(),
                        value: Some(v.clone()),
                        ..Default::default()
                    })
                    .collect(),
            )
        },
        resources: build_resources(c),
        liveness_probe: c.liveness_probe.as_ref().map(build_probe),
        readiness_probe: c.readiness_probe.as_ref().map(build_probe),
        volume_mounts: if c.volume_mounts.is_empty() {
            None
        } else {
            Some(
                c.volume_mounts
                    .iter()
                    .map(|m| VolumeMount {
                        name: m.name.clone(),
                        mount_path: m.mount_path.clone(),
                        ..Default::default()
                    })
                    .collect(),
            )
        },
        ..Default::default()
    }
}

/// Derives the pod-level `volumes` entries a set of containers' mounts
/// require: one `persistentVolumeClaim` volume per distinct mount name,
/// assuming a PVC of the same name exists (the `AppWorkload` generator's
/// `volumeClaimTemplates` are emitted as standalone PVC Objects with
/// matching names — see §4.4).
pub fn volumes_for(containers: &[ContainerInput]) -> Vec<Volume> {
    let mut seen = std::collections::BTreeSet::new();
    let mut volumes = Vec::new();
    for mount in containers.iter().flat_map(|c| &c.volume_mounts) {
        if seen.insert(mount.name.clone()) {
            volumes.push(Volume {
                name: mount.name.clone(),
                persistent_volume_claim: Some(PersistentVolumeClaimVolumeSource {
                    claim_name: mount.name.clone(),
                    ..Default::default()
                }),
                ..Default::default()
            });
        }
    }
    volumes
}

pub struct DeploymentBuilder {
    pub name: String,
    pub namespace: String,
    pub replicas: i32,
    pub containers: Vec<ContainerInput>,
}

impl Build for DeploymentBuilder {
    type Output = Deployment;
    fn build(self) -> Deployment {
        let labels = standard_labels(&self.name);
        let volumes = volumes_for(&self.containers);
        let containers = self.containers.iter().map(build_container).collect();
        Deployment {
            metadata: object_meta(&self.name, &self.namespace, &labels),
            spec: Some(DeploymentSpec {
                replicas: Some(self.replicas),
                selector: label_selector(&labels),
                template: pod_template(&self.name, &labels, containers, volumes),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

pub struct StatefulSetBuilder {
    pub name: String,
    pub namespace: String,
    pub replicas: i32,
    pub containers: Vec<ContainerInput>,
}

impl Build for StatefulSetBuilder {
    type Output = StatefulSet;
    fn build(self) -> StatefulSet {
        let labels = standard_labels(&self.name);
        let volumes = volumes_for(&self.containers);
        let containers = self.containers.iter().map(build_container).collect();
        StatefulSet {
            metadata: object_meta(&self.name, &self.namespace, &labels),
            spec: Some(StatefulSetSpec {
                replicas: Some(self.replicas),
                service_name: format!("{}-headless", self.name),
                selector: label_selector(&labels),
                template: pod_template(&self.name, &labels, containers, volumes),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

pub struct DaemonSetBuilder {
    pub name: String,
    pub namespace: String,
    pub containers: Vec<ContainerInput>,
}

impl Build for DaemonSetBuilder {
    type Output = DaemonSet;
    fn build(self) -> DaemonSet {
        let labels = standard_labels(&self.name);
        let volumes = volumes_for(&self.containers);
        let containers = self.containers.iter().map(build_container).collect();
        DaemonSet {
            metadata: object_meta(&self.name, &self.namespace, &labels),
            spec: Some(DaemonSetSpec {
                selector: label_selector(&labels),
                template: pod_template(&self.name, &labels, containers, volumes),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

pub struct JobBuilder {
    pub name: String,
    pub namespace: String,
    pub containers: Vec<ContainerInput>,
}

impl Build for JobBuilder {
    type Output = Job;
    fn build(self) -> Job {
        let labels = standard_labels(&self.name);
        let volumes = volumes_for(&self.containers);
        let containers = self.containers.iter().map(build_container).collect();
        let mut template = pod_template(&self.name, &labels, containers, volumes);
        if let Some(spec) = template.spec.as_mut() {
            spec.restart_policy = Some("Never".to_string());
        }
        Job {
            metadata: object_meta(&self.name, &self.namespace, &labels),
            spec: Some(JobSpec {
                template,
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

pub struct CronJobBuilder {
    pub name: String,
    pub namespace: String,
    pub schedule: String,
    pub containers: Vec<ContainerInput>,
}

impl Build for CronJobBuilder {
    type Output = CronJob;
    fn build(self) -> CronJob {
        let labels = standard_labels(&self.name);
        let volumes = volumes_for(&self.containers);
        let containers = self.containers.iter().map(build_container).collect();
        let mut pod_template = pod_template(&self.name, &labels, containers, volumes);
        if let Some(spec) = pod_template.spec.as_mut() {
            spec.restart_policy = Some("Never".to_string());
        }
        CronJob {
            metadata: object_meta(&self.name, &self.namespace, &labels),
            spec: Some(CronJobSpec {
                schedule: self.schedule,
                job_template: JobTemplateSpec {
                    spec: Some(JobSpec {
                        template: pod_template,
                        ..Default::default()
                    }),
                    ..Default::default()
                },
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

pub struct ServicePortInput {
    pub name: Option<String>,
    pub port: i32,
    pub target_port: Option<i32>,
}

pub struct ServiceBuilder {
    pub name: String,
    pub namespace: String,
    pub selector_name: String,
    pub service_type: String,
    pub ports: Vec<ServicePortInput>,
}

impl Build for ServiceBuilder {
    type Output = Service;
    fn build(self) -> Service {
        let selector = standard_labels(&self.selector_name);
        Service {
            metadata: object_meta(&self.name, &self.namespace, &selector),
            spec: Some(K8sServiceSpec {
                type_: Some(self.service_type),
                selector: Some(selector.clone().into_iter().collect()),
                ports: Some(
                    self.ports
                        .into_iter()
                        .map(|p| ServicePort {
                            name: p.name,
                            port: p.port,
                            target_port: p.target_port.map(IntOrString::Int),
                            ..Default::default()
                        })
                        .collect(),
                ),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

pub struct IngressBuilder {
    pub name: String,
    pub namespace: String,
    pub host: String,
    pub path: String,
    pub service_name: String,
    pub service_port: i32,
}

impl Build for IngressBuilder {
    type Output = Ingress;
    fn build(self) -> Ingress {
        let labels = standard_labels(&self.service_name);
        Ingress {
            metadata: object_meta(&self.name, &self.namespace, &labels),
            spec: Some(IngressSpec {
                rules: Some(vec![IngressRule {
                    host: Some(self.host),
                    http: Some(HTTPIngressRuleValue {
                        paths: vec![HTTPIngressPath {
                            path: Some(self.path),
                            path_type: "Prefix".to_string(),
                            backend: IngressBackend {
                                service: Some(IngressServiceBackend {
                                    name: self.service_name,
                                    port: Some(ServiceBackendPort {
                                        number: Some(self.service_port),
                                        ..Default::default()
                                    }),
                                }),
                                ..Default::default()
                            },
                        }],
                    }),
                }]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

pub struct PvcBuilder {
    pub name: String,
    pub namespace: String,
    pub storage: String,
    pub access_modes: Vec<String>,
}

impl Build for PvcBuilder {
    type Output = PersistentVolumeClaim;
    fn build(self) -> PersistentVolumeClaim {
        let labels = standard_labels(&self.name);
        let mut requests = BTreeMap::new();
        requests.insert("storage".to_string(), Quantity(self.storage));
        PersistentVolumeClaim {
            metadata: object_meta(&self.name, &self.namespace, &labels),
            spec: Some(PersistentVolumeClaimSpec {
                access_modes: Some(self.access_modes),
                resources: Some(k8s_openapi::api::core::v1::VolumeResourceRequirements {
                    requests: Some(requests.into_iter().collect()),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}
