//! Resource composition
//!
//! Turns a provisioning intent into the ordered list of cluster objects that
//! realise it. Composition is pure: the same intent always yields the same
//! descriptors, and every object name is derived from the workload name.

use std::collections::BTreeMap;

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec, StatefulSet, StatefulSetSpec};
use k8s_openapi::api::batch::v1::{CronJob, CronJobSpec, JobSpec, JobTemplateSpec};
use k8s_openapi::api::core::v1::{
    ConfigMap, ConfigMapVolumeSource, Container, ContainerPort, EnvFromSource, EnvVar,
    EnvVarSource, PodSpec, PodTemplateSpec, ResourceRequirements, Secret, SecretEnvSource,
    SecretKeySelector, Service, ServicePort, ServiceSpec, Volume, VolumeMount,
};
use k8s_openapi::api::networking::v1::{
    HTTPIngressPath, HTTPIngressRuleValue, Ingress, IngressBackend, IngressRule,
    IngressServiceBackend, IngressSpec, ServiceBackendPort,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;

use crate::config::{ManagedPostgresConfig, ProbeConfig};
use crate::kubernetes::workloads::pods::APP_LABEL;
use crate::provisioning::spec::{AppSpec, DatabaseServiceSpec, ResourceRequests};

pub const POSTGRES_PORT: i32 = 5432;
pub const POSTGRES_CONFIG_VOLUME: &str = "postgres-config";
pub const POSTGRES_CONFIG_MOUNT: &str = "/etc/postgresql";
pub const POSTGRES_CONFIG: &str = "shared_buffers = 128MB\nmax_connections = 100";
pub const POSTGRES_USER_KEY: &str = "POSTGRES_USER";
pub const POSTGRES_PASSWORD_KEY: &str = "POSTGRES_PASSWORD";

/// Label placed on probe job pods; deliberately not `app` so probe pods are
/// never counted among the workload's instances
pub const PROBE_LABEL: &str = "kaas.io/probe-for";

pub fn secret_name(name: &str) -> String {
    format!("{}-secret", name)
}

pub fn config_map_name(name: &str) -> String {
    format!("{}-config", name)
}

pub fn probe_job_name(name: &str) -> String {
    format!("{}-health-probe", name)
}

/// Host used for externally exposed database services
pub fn database_host(name: &str) -> String {
    format!("{}.example.com", name)
}

/// In-cluster URL the probe job checks
pub fn probe_url(name: &str, namespace: &str, port: i32, path: &str) -> String {
    format!("http://{}.{}.svc.cluster.local:{}{}", name, namespace, port, path)
}

/// Kind of cluster object a descriptor creates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Secret,
    ConfigMap,
    Deployment,
    StatefulSet,
    Service,
    Ingress,
    ScheduledJob,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Secret => write!(f, "Secret"),
            Self::ConfigMap => write!(f, "ConfigMap"),
            Self::Deployment => write!(f, "Deployment"),
            Self::StatefulSet => write!(f, "StatefulSet"),
            Self::Service => write!(f, "Service"),
            Self::Ingress => write!(f, "Ingress"),
            Self::ScheduledJob => write!(f, "CronJob"),
        }
    }
}

/// `Kind/name` reference to a descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceRef {
    pub kind: ResourceKind,
    pub name: String,
}

impl std::fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

/// A fully built cluster object
#[derive(Debug, Clone, PartialEq)]
pub enum Resource {
    Secret(Secret),
    ConfigMap(ConfigMap),
    Deployment(Deployment),
    StatefulSet(StatefulSet),
    Service(Service),
    Ingress(Ingress),
    ScheduledJob(CronJob),
}

impl Resource {
    pub fn kind(&self) -> ResourceKind {
        match self {
            Resource::Secret(_) => ResourceKind::Secret,
            Resource::ConfigMap(_) => ResourceKind::ConfigMap,
            Resource::Deployment(_) => ResourceKind::Deployment,
            Resource::StatefulSet(_) => ResourceKind::StatefulSet,
            Resource::Service(_) => ResourceKind::Service,
            Resource::Ingress(_) => ResourceKind::Ingress,
            Resource::ScheduledJob(_) => ResourceKind::ScheduledJob,
        }
    }

    fn metadata(&self) -> &ObjectMeta {
        match self {
            Resource::Secret(o) => &o.metadata,
            Resource::ConfigMap(o) => &o.metadata,
            Resource::Deployment(o) => &o.metadata,
            Resource::StatefulSet(o) => &o.metadata,
            Resource::Service(o) => &o.metadata,
            Resource::Ingress(o) => &o.metadata,
            Resource::ScheduledJob(o) => &o.metadata,
        }
    }

    pub fn name(&self) -> &str {
        self.metadata().name.as_deref().unwrap_or_default()
    }

    pub fn reference(&self) -> ResourceRef {
        ResourceRef {
            kind: self.kind(),
            name: self.name().to_string(),
        }
    }
}

/// One cluster object to create, its position in the creation order and
/// the earlier descriptors it relies on
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceDescriptor {
    pub ordinal: usize,
    pub resource: Resource,
    pub depends_on: Vec<ResourceRef>,
}

impl ResourceDescriptor {
    pub fn reference(&self) -> ResourceRef {
        self.resource.reference()
    }
}

/// Appends descriptors with consecutive ordinals
#[derive(Default)]
struct DescriptorList {
    items: Vec<ResourceDescriptor>,
}

impl DescriptorList {
    fn push(&mut self, resource: Resource, depends_on: Vec<ResourceRef>) -> ResourceRef {
        let reference = resource.reference();
        self.items.push(ResourceDescriptor {
            ordinal: self.items.len(),
            resource,
            depends_on,
        });
        reference
    }

    fn finish(self) -> Vec<ResourceDescriptor> {
        self.items
    }
}

/// Builds descriptor lists for one target namespace
#[derive(Debug, Clone)]
pub struct Composer {
    namespace: String,
    probe: ProbeConfig,
    postgres: ManagedPostgresConfig,
}

impl Composer {
    pub fn new(namespace: impl Into<String>, probe: ProbeConfig, postgres: ManagedPostgresConfig) -> Self {
        Self {
            namespace: namespace.into(),
            probe,
            postgres,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Secret (if any secret variables), Deployment, Service, Ingress (if a
    /// domain is set), probe CronJob (if monitoring is enabled)
    pub fn compose_application(&self, spec: &AppSpec) -> Vec<ResourceDescriptor> {
        let mut list = DescriptorList::default();

        let secret = if spec.has_secrets() {
            let data = spec
                .secret_env()
                .map(|e| (e.key.clone(), e.value.clone()))
                .collect();
            Some(list.push(
                Resource::Secret(self.secret(&secret_name(&spec.name), data)),
                vec![],
            ))
        } else {
            None
        };

        let deployment = list.push(
            Resource::Deployment(self.application_deployment(spec)),
            secret.into_iter().collect(),
        );

        let service = list.push(
            Resource::Service(self.service(&spec.name, spec.service_port)),
            vec![deployment],
        );

        if let Some(domain) = &spec.domain {
            list.push(
                Resource::Ingress(self.ingress(&spec.name, domain, spec.service_port)),
                vec![service.clone()],
            );
        }

        if spec.monitoring_enabled {
            list.push(
                Resource::ScheduledJob(self.probe_job(&spec.name, spec.service_port)),
                vec![service],
            );
        }

        list.finish()
    }

    /// Secret, ConfigMap, StatefulSet, Service, Ingress (if external access)
    pub fn compose_database_service(&self, spec: &DatabaseServiceSpec) -> Vec<ResourceDescriptor> {
        let mut list = DescriptorList::default();

        let credentials = BTreeMap::from([
            (POSTGRES_USER_KEY.to_string(), self.postgres.admin_user.clone()),
            (POSTGRES_PASSWORD_KEY.to_string(), self.postgres.admin_password.clone()),
        ]);
        let secret = list.push(
            Resource::Secret(self.secret(&secret_name(&spec.name), credentials)),
            vec![],
        );

        let config_map = list.push(
            Resource::ConfigMap(self.postgres_config_map(&spec.name)),
            vec![],
        );

        let stateful_set = list.push(
            Resource::StatefulSet(self.postgres_stateful_set(spec)),
            vec![secret, config_map],
        );

        let service = list.push(
            Resource::Service(self.service(&spec.name, POSTGRES_PORT)),
            vec![stateful_set],
        );

        if spec.external_access {
            list.push(
                Resource::Ingress(self.ingress(&spec.name, &database_host(&spec.name), POSTGRES_PORT)),
                vec![service],
            );
        }

        list.finish()
    }

    fn metadata(&self, name: &str, labels: Option<BTreeMap<String, String>>) -> ObjectMeta {
        ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(self.namespace.clone()),
            labels,
            ..Default::default()
        }
    }

    fn secret(&self, name: &str, string_data: BTreeMap<String, String>) -> Secret {
        Secret {
            metadata: self.metadata(name, None),
            string_data: Some(string_data),
            ..Default::default()
        }
    }

    fn application_deployment(&self, spec: &AppSpec) -> Deployment {
        let secret = secret_name(&spec.name);

        let mut env: Vec<EnvVar> = spec
            .plain_env()
            .map(|e| EnvVar {
                name: e.key.clone(),
                value: Some(e.value.clone()),
                value_from: None,
            })
            .collect();
        env.extend(spec.secret_env().map(|e| secret_env_var(&e.key, &secret, &e.key)));

        let container = Container {
            name: spec.name.clone(),
            image: Some(spec.image.clone()),
            env: Some(env),
            ports: Some(vec![ContainerPort {
                container_port: spec.service_port,
                ..Default::default()
            }]),
            resources: Some(resource_requirements(&spec.resources)),
            ..Default::default()
        };

        Deployment {
            metadata: self.metadata(&spec.name, Some(app_labels(&spec.name))),
            spec: Some(DeploymentSpec {
                replicas: Some(spec.replicas),
                selector: app_selector(&spec.name),
                template: pod_template(
                    app_labels(&spec.name),
                    PodSpec {
                        containers: vec![container],
                        ..Default::default()
                    },
                ),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn postgres_config_map(&self, name: &str) -> ConfigMap {
        ConfigMap {
            metadata: self.metadata(&config_map_name(name), None),
            data: Some(BTreeMap::from([(
                "postgresql.conf".to_string(),
                POSTGRES_CONFIG.to_string(),
            )])),
            ..Default::default()
        }
    }

    fn postgres_stateful_set(&self, spec: &DatabaseServiceSpec) -> StatefulSet {
        let secret = secret_name(&spec.name);

        let container = Container {
            name: spec.name.clone(),
            image: Some(self.postgres.image.clone()),
            env: Some(vec![
                secret_env_var(POSTGRES_USER_KEY, &secret, POSTGRES_USER_KEY),
                secret_env_var(POSTGRES_PASSWORD_KEY, &secret, POSTGRES_PASSWORD_KEY),
            ]),
            ports: Some(vec![ContainerPort {
                container_port: POSTGRES_PORT,
                ..Default::default()
            }]),
            resources: Some(resource_requirements(&spec.resources)),
            volume_mounts: Some(vec![VolumeMount {
                name: POSTGRES_CONFIG_VOLUME.to_string(),
                mount_path: POSTGRES_CONFIG_MOUNT.to_string(),
                ..Default::default()
            }]),
            ..Default::default()
        };

        let volume = Volume {
            name: POSTGRES_CONFIG_VOLUME.to_string(),
            config_map: Some(ConfigMapVolumeSource {
                name: config_map_name(&spec.name).into(),
                ..Default::default()
            }),
            ..Default::default()
        };

        StatefulSet {
            metadata: self.metadata(&spec.name, Some(app_labels(&spec.name))),
            spec: Some(StatefulSetSpec {
                replicas: Some(1),
                service_name: spec.name.clone().into(),
                selector: app_selector(&spec.name),
                template: pod_template(
                    app_labels(&spec.name),
                    PodSpec {
                        containers: vec![container],
                        volumes: Some(vec![volume]),
                        ..Default::default()
                    },
                ),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn service(&self, name: &str, port: i32) -> Service {
        Service {
            metadata: self.metadata(name, Some(app_labels(name))),
            spec: Some(ServiceSpec {
                selector: Some(app_labels(name)),
                ports: Some(vec![ServicePort {
                    port,
                    target_port: Some(IntOrString::Int(port)),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn ingress(&self, name: &str, host: &str, port: i32) -> Ingress {
        let path = HTTPIngressPath {
            path: Some("/".to_string()),
            path_type: "ImplementationSpecific".to_string(),
            backend: IngressBackend {
                service: Some(IngressServiceBackend {
                    name: name.to_string(),
                    port: Some(ServiceBackendPort {
                        number: Some(port),
                        name: None,
                    }),
                }),
                resource: None,
            },
        };

        Ingress {
            metadata: self.metadata(name, Some(app_labels(name))),
            spec: Some(IngressSpec {
                rules: Some(vec![IngressRule {
                    host: Some(host.to_string()),
                    http: Some(HTTPIngressRuleValue { paths: vec![path] }),
                }]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn probe_job(&self, name: &str, port: i32) -> CronJob {
        let url = probe_url(name, &self.namespace, port, &self.probe.liveness_path);
        let labels = BTreeMap::from([(PROBE_LABEL.to_string(), name.to_string())]);

        let container = Container {
            name: "health-probe".to_string(),
            image: Some(self.probe.image.clone()),
            command: Some(vec!["kaas-probe".to_string()]),
            env: Some(vec![
                literal_env_var("KAAS_PROBE_APP_NAME", name),
                literal_env_var("KAAS_PROBE_URL", &url),
                literal_env_var("KAAS_PROBE_TIMEOUT_SECS", &self.probe.timeout_secs.to_string()),
            ]),
            env_from: Some(vec![EnvFromSource {
                secret_ref: Some(SecretEnvSource {
                    name: self.probe.credentials_secret.clone().into(),
                    ..Default::default()
                }),
                ..Default::default()
            }]),
            ..Default::default()
        };

        let job_spec = JobSpec {
            backoff_limit: Some(0),
            template: pod_template(
                labels.clone(),
                PodSpec {
                    containers: vec![container],
                    restart_policy: Some("Never".to_string()),
                    ..Default::default()
                },
            ),
            ..Default::default()
        };

        CronJob {
            metadata: self.metadata(&probe_job_name(name), Some(labels)),
            spec: Some(CronJobSpec {
                schedule: self.probe.schedule.clone(),
                concurrency_policy: Some("Forbid".to_string()),
                job_template: JobTemplateSpec {
                    metadata: None,
                    spec: Some(job_spec),
                },
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

fn app_labels(name: &str) -> BTreeMap<String, String> {
    BTreeMap::from([(APP_LABEL.to_string(), name.to_string())])
}

fn app_selector(name: &str) -> LabelSelector {
    LabelSelector {
        match_labels: Some(app_labels(name)),
        ..Default::default()
    }
}

fn pod_template(labels: BTreeMap<String, String>, spec: PodSpec) -> PodTemplateSpec {
    PodTemplateSpec {
        metadata: Some(ObjectMeta {
            labels: Some(labels),
            ..Default::default()
        }),
        spec: Some(spec),
    }
}

fn resource_requirements(resources: &ResourceRequests) -> ResourceRequirements {
    ResourceRequirements {
        requests: Some(BTreeMap::from([
            ("cpu".to_string(), Quantity(resources.cpu.clone())),
            ("memory".to_string(), Quantity(resources.memory.clone())),
        ])),
        ..Default::default()
    }
}

fn literal_env_var(name: &str, value: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value: Some(value.to_string()),
        value_from: None,
    }
}

fn secret_env_var(name: &str, secret: &str, key: &str) -> EnvVar {
    EnvVar {
        name: name.to_string(),
        value: None,
        value_from: Some(EnvVarSource {
            secret_key_ref: Some(SecretKeySelector {
                name: secret.to_string().into(),
                key: key.to_string(),
                ..Default::default()
            }),
            ..Default::default()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provisioning::spec::EnvironmentVariable;

    fn composer() -> Composer {
        Composer::new("apps", ProbeConfig::default(), ManagedPostgresConfig::default())
    }

    fn env(key: &str, value: &str, is_secret: bool) -> EnvironmentVariable {
        EnvironmentVariable {
            key: key.to_string(),
            value: value.to_string(),
            is_secret,
        }
    }

    fn svc1() -> AppSpec {
        AppSpec {
            name: "svc1".to_string(),
            replicas: 2,
            image: "repo/x:1.0".to_string(),
            service_port: 8080,
            domain: None,
            resources: ResourceRequests {
                cpu: "100m".to_string(),
                memory: "128Mi".to_string(),
            },
            env: vec![env("K", "V", false)],
            monitoring_enabled: false,
        }
    }

    fn kinds(descriptors: &[ResourceDescriptor]) -> Vec<ResourceKind> {
        descriptors.iter().map(|d| d.resource.kind()).collect()
    }

    fn deployment_of(descriptors: &[ResourceDescriptor]) -> &Deployment {
        descriptors
            .iter()
            .find_map(|d| match &d.resource {
                Resource::Deployment(deployment) => Some(deployment),
                _ => None,
            })
            .unwrap()
    }

    fn container_env(deployment: &Deployment) -> &[EnvVar] {
        let pod = deployment.spec.as_ref().unwrap().template.spec.as_ref().unwrap();
        pod.containers[0].env.as_deref().unwrap()
    }

    #[test]
    fn test_minimal_app_composes_deployment_and_service() {
        let descriptors = composer().compose_application(&svc1());

        assert_eq!(kinds(&descriptors), vec![ResourceKind::Deployment, ResourceKind::Service]);
        assert_eq!(descriptors[0].ordinal, 0);
        assert_eq!(descriptors[1].ordinal, 1);

        let deployment = deployment_of(&descriptors);
        let spec = deployment.spec.as_ref().unwrap();
        assert_eq!(spec.replicas, Some(2));
        assert_eq!(spec.selector.match_labels, Some(app_labels("svc1")));

        let pod = spec.template.spec.as_ref().unwrap();
        assert_eq!(pod.containers[0].name, "svc1");
        assert_eq!(pod.containers[0].image.as_deref(), Some("repo/x:1.0"));
        let requests = pod.containers[0].resources.as_ref().unwrap().requests.as_ref().unwrap();
        assert_eq!(requests["cpu"], Quantity("100m".to_string()));
        assert_eq!(requests["memory"], Quantity("128Mi".to_string()));
        assert_eq!(
            spec.template.metadata.as_ref().unwrap().labels,
            Some(app_labels("svc1"))
        );
    }

    #[test]
    fn test_service_targets_service_port() {
        let descriptors = composer().compose_application(&svc1());
        let Resource::Service(service) = &descriptors[1].resource else {
            panic!("expected a service");
        };

        let spec = service.spec.as_ref().unwrap();
        assert_eq!(spec.selector, Some(app_labels("svc1")));
        let ports = spec.ports.as_ref().unwrap();
        assert_eq!(ports.len(), 1);
        assert_eq!(ports[0].port, 8080);
        assert_eq!(ports[0].target_port, Some(IntOrString::Int(8080)));
    }

    #[test]
    fn test_no_secret_without_secret_variables() {
        let mut spec = svc1();
        spec.env = vec![env("A", "1", false), env("B", "2", false)];

        let descriptors = composer().compose_application(&spec);
        assert!(!kinds(&descriptors).contains(&ResourceKind::Secret));
        assert!(container_env(deployment_of(&descriptors))
            .iter()
            .all(|e| e.value_from.is_none()));
    }

    #[test]
    fn test_secret_variables_are_referenced_not_embedded() {
        let mut spec = svc1();
        spec.env = vec![
            env("PLAIN", "visible", false),
            env("TOKEN", "t0p-s3cret", true),
            env("PASSWORD", "hunter2", true),
        ];

        let descriptors = composer().compose_application(&spec);
        assert_eq!(
            kinds(&descriptors),
            vec![ResourceKind::Secret, ResourceKind::Deployment, ResourceKind::Service]
        );

        let Resource::Secret(secret) = &descriptors[0].resource else {
            panic!("expected a secret first");
        };
        assert_eq!(secret.metadata.name.as_deref(), Some("svc1-secret"));
        let data = secret.string_data.as_ref().unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data["TOKEN"], "t0p-s3cret");
        assert!(!data.contains_key("PLAIN"));

        let env = container_env(deployment_of(&descriptors));
        assert_eq!(env[0].name, "PLAIN");
        assert_eq!(env[0].value.as_deref(), Some("visible"));

        for (var, key) in env[1..].iter().zip(["TOKEN", "PASSWORD"]) {
            assert_eq!(var.name, key);
            assert!(var.value.is_none());
            let selector = var
                .value_from
                .as_ref()
                .and_then(|s| s.secret_key_ref.as_ref())
                .unwrap();
            assert_eq!(selector.key, key);
            let reference: Option<String> = selector.name.clone().into();
            assert_eq!(reference.as_deref(), Some("svc1-secret"));
        }

        let serialized = serde_json::to_string(deployment_of(&descriptors)).unwrap();
        assert!(!serialized.contains("t0p-s3cret"));
        assert!(!serialized.contains("hunter2"));

        assert_eq!(descriptors[1].depends_on, vec![descriptors[0].reference()]);
    }

    #[test]
    fn test_composition_is_deterministic() {
        let mut spec = svc1();
        spec.domain = Some("svc1.example.org".to_string());
        spec.monitoring_enabled = true;
        spec.env.push(env("TOKEN", "x", true));

        let composer = composer();
        assert_eq!(composer.compose_application(&spec), composer.compose_application(&spec));
    }

    #[test]
    fn test_dependencies_precede_dependents() {
        let mut spec = svc1();
        spec.domain = Some("svc1.example.org".to_string());
        spec.monitoring_enabled = true;
        spec.env.push(env("TOKEN", "x", true));

        let composer = composer();
        let database = DatabaseServiceSpec {
            name: "db".to_string(),
            resources: spec.resources.clone(),
            external_access: true,
        };

        for descriptors in [
            composer.compose_application(&spec),
            composer.compose_database_service(&database),
        ] {
            for descriptor in &descriptors {
                for dependency in &descriptor.depends_on {
                    let position = descriptors
                        .iter()
                        .position(|d| &d.reference() == dependency)
                        .unwrap();
                    assert!(position < descriptor.ordinal);
                }
            }
        }
    }

    #[test]
    fn test_ingress_routes_root_to_service() {
        let mut spec = svc1();
        spec.domain = Some("svc1.example.org".to_string());

        let descriptors = composer().compose_application(&spec);
        assert_eq!(descriptors.len(), 3);
        let Resource::Ingress(ingress) = &descriptors[2].resource else {
            panic!("expected an ingress");
        };

        let rule = &ingress.spec.as_ref().unwrap().rules.as_ref().unwrap()[0];
        assert_eq!(rule.host.as_deref(), Some("svc1.example.org"));
        let path = &rule.http.as_ref().unwrap().paths[0];
        assert_eq!(path.path.as_deref(), Some("/"));
        assert_eq!(path.path_type, "ImplementationSpecific");
        let backend = path.backend.service.as_ref().unwrap();
        assert_eq!(backend.name, "svc1");
        assert_eq!(backend.port.as_ref().unwrap().number, Some(8080));
    }

    #[test]
    fn test_monitoring_adds_probe_job() {
        let mut spec = svc1();
        spec.monitoring_enabled = true;

        let descriptors = composer().compose_application(&spec);
        let last = descriptors.last().unwrap();
        let Resource::ScheduledJob(job) = &last.resource else {
            panic!("expected the probe job last");
        };

        assert_eq!(job.metadata.name.as_deref(), Some("svc1-health-probe"));
        let cron = job.spec.as_ref().unwrap();
        assert_eq!(cron.schedule, "*/5 * * * *");

        let template = &cron.job_template.spec.as_ref().unwrap().template;
        let labels = template.metadata.as_ref().unwrap().labels.as_ref().unwrap();
        assert!(!labels.contains_key(APP_LABEL));

        let container = &template.spec.as_ref().unwrap().containers[0];
        let env = container.env.as_ref().unwrap();
        let url = env.iter().find(|e| e.name == "KAAS_PROBE_URL").unwrap();
        assert_eq!(
            url.value.as_deref(),
            Some("http://svc1.apps.svc.cluster.local:8080/healthz")
        );
        assert!(container.env_from.is_some());
    }

    #[test]
    fn test_database_service_composition() {
        let spec = DatabaseServiceSpec {
            name: "orders".to_string(),
            resources: ResourceRequests {
                cpu: "500m".to_string(),
                memory: "1Gi".to_string(),
            },
            external_access: false,
        };

        let descriptors = composer().compose_database_service(&spec);
        assert_eq!(
            kinds(&descriptors),
            vec![
                ResourceKind::Secret,
                ResourceKind::ConfigMap,
                ResourceKind::StatefulSet,
                ResourceKind::Service,
            ]
        );

        let Resource::Secret(secret) = &descriptors[0].resource else {
            panic!("expected a secret");
        };
        let credentials = secret.string_data.as_ref().unwrap();
        assert_eq!(credentials[POSTGRES_USER_KEY], "admin");
        assert_eq!(credentials[POSTGRES_PASSWORD_KEY], "adminpass");

        let Resource::ConfigMap(config_map) = &descriptors[1].resource else {
            panic!("expected a config map");
        };
        assert_eq!(config_map.metadata.name.as_deref(), Some("orders-config"));
        assert_eq!(config_map.data.as_ref().unwrap()["postgresql.conf"], POSTGRES_CONFIG);

        let Resource::StatefulSet(stateful_set) = &descriptors[2].resource else {
            panic!("expected a stateful set");
        };
        let set_spec = stateful_set.spec.as_ref().unwrap();
        assert_eq!(set_spec.replicas, Some(1));
        let pod = set_spec.template.spec.as_ref().unwrap();
        assert_eq!(pod.containers[0].image.as_deref(), Some("postgres:latest"));
        assert!(pod.containers[0]
            .env
            .as_ref()
            .unwrap()
            .iter()
            .all(|e| e.value.is_none() && e.value_from.is_some()));
        assert_eq!(
            pod.containers[0].volume_mounts.as_ref().unwrap()[0].mount_path,
            POSTGRES_CONFIG_MOUNT
        );
        assert_eq!(pod.volumes.as_ref().unwrap()[0].name, POSTGRES_CONFIG_VOLUME);
        assert_eq!(
            descriptors[2].depends_on,
            vec![descriptors[0].reference(), descriptors[1].reference()]
        );

        let Resource::Service(service) = &descriptors[3].resource else {
            panic!("expected a service");
        };
        assert_eq!(service.spec.as_ref().unwrap().ports.as_ref().unwrap()[0].port, 5432);
    }

    #[test]
    fn test_external_database_gets_ingress() {
        let spec = DatabaseServiceSpec {
            name: "orders".to_string(),
            resources: ResourceRequests {
                cpu: "500m".to_string(),
                memory: "1Gi".to_string(),
            },
            external_access: true,
        };

        let descriptors = composer().compose_database_service(&spec);
        let Resource::Ingress(ingress) = &descriptors.last().unwrap().resource else {
            panic!("expected an ingress last");
        };
        let rule = &ingress.spec.as_ref().unwrap().rules.as_ref().unwrap()[0];
        assert_eq!(rule.host.as_deref(), Some("orders.example.com"));
    }

    #[test]
    fn test_resource_ref_display() {
        let reference = ResourceRef {
            kind: ResourceKind::ScheduledJob,
            name: "web-health-probe".to_string(),
        };
        assert_eq!(reference.to_string(), "CronJob/web-health-probe");
    }
}
