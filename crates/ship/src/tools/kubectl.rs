//! kubectl command builders.

use std::path::{Path, PathBuf};

use super::Invocation;
use crate::components::{WorkloadKind, WorkloadRef};

/// Default binary name.
pub const BINARY: &str = "kubectl";

/// kubectl, bound to a resolved binary.
#[derive(Debug, Clone)]
pub struct Kubectl {
    bin: PathBuf,
}

impl Kubectl {
    #[must_use]
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self { bin: bin.into() }
    }

    /// `kubectl version --client`
    #[must_use]
    pub fn version(&self) -> Invocation {
        Invocation::new(&self.bin).args(["version", "--client"])
    }

    /// `kubectl create -f <manifest> --namespace <ns>`
    #[must_use]
    pub fn create(&self, manifest: &Path, namespace: &str) -> Invocation {
        Invocation::new(&self.bin)
            .args(["create", "-f"])
            .arg(manifest.display().to_string())
            .args(["--namespace", namespace])
    }

    /// `kubectl delete -f <manifest> --namespace <ns>`
    #[must_use]
    pub fn delete(&self, manifest: &Path, namespace: &str) -> Invocation {
        Invocation::new(&self.bin)
            .args(["delete", "-f"])
            .arg(manifest.display().to_string())
            .args(["--namespace", namespace])
    }

    /// `kubectl get <type> <name> -o jsonpath={.status.<field>} --namespace <ns>`
    ///
    /// Reads the field that tells whether `workload` is ready: the ready
    /// replica count for deployments and daemonsets, the phase for pods.
    #[must_use]
    pub fn status(&self, workload: &WorkloadRef) -> Invocation {
        Invocation::new(&self.bin)
            .args(["get", workload.kind.resource(), workload.name, "-o"])
            .arg(format!("jsonpath={{.status.{}}}", workload.kind.status_field()))
            .args(["--namespace", workload.namespace])
    }
}

/// Strip whitespace and the quoting some kubectl versions put around
/// jsonpath output.
#[must_use]
pub fn clean_jsonpath_output(output: &str) -> &str {
    output.trim().trim_matches('"').trim()
}

/// Whether status output satisfies the readiness condition for `kind`.
///
/// Replica counts must reach `min_ready`; pods must be `Succeeded`. Empty or
/// unparsable output counts as not ready.
#[must_use]
pub fn is_ready(kind: WorkloadKind, output: &str, min_ready: u32) -> bool {
    let value = clean_jsonpath_output(output);
    match kind {
        WorkloadKind::Pod => value == "Succeeded",
        WorkloadKind::Deployment | WorkloadKind::DaemonSet => value
            .parse::<u32>()
            .is_ok_and(|ready| ready >= min_ready),
    }
}

/// Whether status output shows `kind` can no longer become ready: a pod
/// in phase `Failed`.
#[must_use]
pub fn has_failed(kind: WorkloadKind, output: &str) -> bool {
    kind == WorkloadKind::Pod && clean_jsonpath_output(output) == "Failed"
}
