//! SHIP platform component catalog.
//!
//! A component is a Helm chart plus optional one-off manifests applied
//! before or after the chart (configuration pods, Grafana dashboards and the
//! like). The catalog is ordered: charts that others depend on come first.

/// A Helm chart release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chart {
    /// Chart reference (e.g. `sprinthive-dev-charts/kong`).
    pub chart_path: &'static str,
    /// Namespace to install into.
    pub namespace: &'static str,
    /// Release name.
    pub release_name: &'static str,
    /// `--set` overrides; may contain `${domain}`.
    pub overrides: &'static [&'static str],
    /// Values file, relative to the resources directory.
    pub values_path: Option<&'static str>,
}

/// Kind of workload a readiness wait observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadKind {
    Deployment,
    DaemonSet,
    Pod,
}

impl WorkloadKind {
    /// kubectl resource type.
    #[must_use]
    pub fn resource(self) -> &'static str {
        match self {
            Self::Deployment => "deployment",
            Self::DaemonSet => "daemonset",
            Self::Pod => "pod",
        }
    }

    /// Status field read to decide readiness.
    #[must_use]
    pub fn status_field(self) -> &'static str {
        match self {
            Self::Deployment => "readyReplicas",
            Self::DaemonSet => "numberReady",
            Self::Pod => "phase",
        }
    }
}

/// A named workload in a namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkloadRef {
    pub kind: WorkloadKind,
    pub name: &'static str,
    pub namespace: &'static str,
}

impl std::fmt::Display for WorkloadRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}/{}", self.kind.resource(), self.namespace, self.name)
    }
}

/// Wait until `workload` has at least `min_ready` ready replicas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadyCondition {
    pub workload: WorkloadRef,
    pub min_ready: u32,
}

/// A manifest created around a chart install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestResource {
    /// Wait for this before creating the manifest.
    pub precondition: Option<ReadyCondition>,
    /// Manifest file, relative to the resources directory.
    pub manifest_path: &'static str,
    /// Namespace the manifest is created in.
    pub namespace: &'static str,
    /// Pod to wait for until it reaches `Succeeded`.
    pub wait_for_done: Option<WorkloadRef>,
    /// Keep the manifest's resources once done; otherwise they are deleted.
    pub persistent: bool,
}

/// A platform component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Component {
    pub chart: Chart,
    pub pre_install: &'static [ManifestResource],
    pub post_install: &'static [ManifestResource],
}

const fn chart(
    chart_path: &'static str,
    namespace: &'static str,
    release_name: &'static str,
    overrides: &'static [&'static str],
) -> Chart {
    Chart {
        chart_path,
        namespace,
        release_name,
        overrides,
        values_path: None,
    }
}

const fn component(chart: Chart) -> Component {
    Component {
        chart,
        pre_install: &[],
        post_install: &[],
    }
}

const fn persistent(manifest_path: &'static str, namespace: &'static str) -> ManifestResource {
    ManifestResource {
        precondition: None,
        manifest_path,
        namespace,
        wait_for_done: None,
        persistent: true,
    }
}

/// The default SHIP platform, in install order.
pub static DEFAULT_COMPONENTS: &[Component] = &[
    component(chart(
        "stable/heapster",
        "kube-system",
        "sysmetric",
        &["rbac.create=true"],
    )),
    component(chart(
        "sprinthive-dev-charts/postgresql",
        "infra",
        "inggwdb",
        &[
            "fullnameOverride=kong-postgres",
            "postgresUser=kong",
            "postgresDatabase=kong",
        ],
    )),
    component(chart("sprinthive-dev-charts/nexus", "infra", "repo", &[])),
    component(Chart {
        values_path: Some("resources/prometheus/values.yaml"),
        ..chart("stable/prometheus", "infra", "metricdb", &[])
    }),
    component(chart(
        "sprinthive-dev-charts/zipkin",
        "infra",
        "tracing",
        &[
            "ingress.enabled=true",
            "ingress.host=zipkin.${domain}",
            "ingress.class=kong",
            "ingress.path=/",
        ],
    )),
    component(chart(
        "sprinthive-dev-charts/jenkins",
        "infra",
        "cicd",
        &[
            "Master.HostName=jenkins.${domain}",
            "Master.Ingress.Annotations.kubernetes\\.io/ingress\\.class=kong",
            "Master.Ingress.TLS[0].secretName=cicd-jenkins-tls",
            "Master.Ingress.TLS[0].hosts[0]=jenkins.${domain}",
        ],
    )),
    component(chart(
        "sprinthive-dev-charts/kibana",
        "infra",
        "logviz",
        &[
            "ingress.enabled=true",
            "ingress.host=kibana.${domain}",
            "ingress.class=kong",
            "ingress.path=/",
        ],
    )),
    component(chart(
        "sprinthive-dev-charts/fluent-bit",
        "infra",
        "logcollect",
        &[],
    )),
    component(chart(
        "sprinthive-dev-charts/elasticsearch",
        "infra",
        "logdb",
        &["ClusterProfile=production"],
    )),
    Component {
        chart: Chart {
            values_path: Some("resources/grafana/values.yaml"),
            ..chart(
                "stable/grafana",
                "infra",
                "metricviz",
                &[
                    "sidecar.dashboards.enabled=true",
                    "sidecar.dashboards.label=grafana_dashboard",
                    "sidecar.datasources.enabled=true",
                    "sidecar.datasources.label=grafana_datasource",
                    "ingress.enabled=true",
                    "ingress.hosts={grafana.${domain}}",
                    "ingress.tls[0].hosts={grafana.${domain}}",
                ],
            )
        },
        pre_install: &[
            persistent("resources/grafana/datasource-elasticsearch.yaml", "infra"),
            persistent("resources/grafana/datasource-prometheus.yaml", "infra"),
            persistent("resources/grafana/dashboard-cluster-alarms.yaml", "infra"),
            persistent("resources/grafana/dashboard-ingress.yaml", "infra"),
            persistent("resources/grafana/dashboard-kubernetes.yaml", "infra"),
            persistent("resources/grafana/dashboard-pod-alarms.yaml", "infra"),
        ],
        post_install: &[],
    },
    Component {
        chart: chart(
            "sprinthive-dev-charts/kong",
            "infra",
            "inggw",
            &[
                "ProxyService.Type=ClusterIP",
                "IstioSidecar.enabled=false",
                "HostPort=true",
            ],
        ),
        pre_install: &[ManifestResource {
            precondition: Some(ReadyCondition {
                workload: WorkloadRef {
                    kind: WorkloadKind::Deployment,
                    name: "kong-postgres",
                    namespace: "infra",
                },
                min_ready: 1,
            }),
            manifest_path: "resources/kong/pod-kong-pre-configure.yaml",
            namespace: "infra",
            wait_for_done: Some(WorkloadRef {
                kind: WorkloadKind::Pod,
                name: "kong-pre-configure",
                namespace: "infra",
            }),
            persistent: false,
        }],
        post_install: &[ManifestResource {
            precondition: Some(ReadyCondition {
                workload: WorkloadRef {
                    kind: WorkloadKind::DaemonSet,
                    name: "inggw-kong",
                    namespace: "infra",
                },
                min_ready: 1,
            }),
            manifest_path: "resources/kong/pod-kong-configure.yaml",
            namespace: "infra",
            wait_for_done: Some(WorkloadRef {
                kind: WorkloadKind::Pod,
                name: "kong-configure",
                namespace: "infra",
            }),
            persistent: false,
        }],
    },
    component(chart(
        "sprinthive-dev-charts/kong-ingress-controller",
        "infra",
        "ingcontrol",
        &[],
    )),
    Component {
        chart: chart(
            "stable/cert-manager",
            "infra",
            "certman",
            &[
                "ingressShim.defaultIssuerName=letsencrypt-prod",
                "ingressShim.defaultIssuerKind=ClusterIssuer",
            ],
        ),
        pre_install: &[],
        post_install: &[persistent(
            "resources/cert-manager/clusterissuer-letsencrypt-prod.yaml",
            "infra",
        )],
    },
];
