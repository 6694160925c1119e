//! kops command builders.
//!
//! Every cluster command carries `--state <url>` pointing at the kops state
//! store, so [`Kops`] binds the binary and the store together.

use std::path::{Path, PathBuf};

use super::Invocation;

/// Default binary name.
pub const BINARY: &str = "kops";

/// kops, bound to a resolved binary and a state store URL.
#[derive(Debug, Clone)]
pub struct Kops {
    bin: PathBuf,
    state_store: String,
}

impl Kops {
    #[must_use]
    pub fn new(bin: impl Into<PathBuf>, state_store: impl Into<String>) -> Self {
        Self {
            bin: bin.into(),
            state_store: state_store.into(),
        }
    }

    /// `kops version`
    #[must_use]
    pub fn version(bin: &Path) -> Invocation {
        Invocation::new(bin).arg("version")
    }

    fn with_state(&self, invocation: Invocation) -> Invocation {
        invocation.args(["--state", self.state_store.as_str()])
    }

    /// `kops create -f <config> --state <url>`
    #[must_use]
    pub fn create(&self, config: &Path) -> Invocation {
        self.with_state(
            Invocation::new(&self.bin)
                .args(["create", "-f"])
                .arg(config.display().to_string()),
        )
    }

    /// `kops create secret --name <cluster> sshpublickey admin -i <key> --state <url>`
    #[must_use]
    pub fn create_ssh_secret(&self, cluster: &str, public_key: &Path) -> Invocation {
        self.with_state(
            Invocation::new(&self.bin)
                .args(["create", "secret", "--name", cluster, "sshpublickey", "admin", "-i"])
                .arg(public_key.display().to_string()),
        )
    }

    /// `kops update cluster --name <cluster> --state <url> --yes`
    #[must_use]
    pub fn update_cluster(&self, cluster: &str) -> Invocation {
        self.with_state(Invocation::new(&self.bin).args(["update", "cluster", "--name", cluster]))
            .arg("--yes")
    }

    /// `kops replace cluster -f <config> --state <url>`
    #[must_use]
    pub fn replace_cluster(&self, config: &Path) -> Invocation {
        self.with_state(
            Invocation::new(&self.bin)
                .args(["replace", "cluster", "-f"])
                .arg(config.display().to_string()),
        )
    }

    /// `kops rolling-update cluster --name <cluster> --state <url>`
    #[must_use]
    pub fn rolling_update(&self, cluster: &str) -> Invocation {
        self.with_state(
            Invocation::new(&self.bin).args(["rolling-update", "cluster", "--name", cluster]),
        )
    }

    /// `kops delete cluster <cluster> --state <url> --yes`
    #[must_use]
    pub fn delete_cluster(&self, cluster: &str) -> Invocation {
        self.with_state(Invocation::new(&self.bin).args(["delete", "cluster", cluster]))
            .arg("--yes")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLUSTER: &str = "test.aws.testcompany.tech";
    const STORE: &str = "s3://testcompany-kops-config";

    fn kops() -> Kops {
        Kops::new("kops", STORE)
    }

    #[test]
    fn test_cluster_commands() {
        let kops = kops();
        let config = Path::new(".").join("kops.config");

        assert_eq!(
            kops.create(&config).args_line(),
            "create -f ./kops.config --state s3://testcompany-kops-config"
        );
        assert_eq!(
            kops.create_ssh_secret(CLUSTER, Path::new("id_rsa.pub")).args_line(),
            "create secret --name test.aws.testcompany.tech sshpublickey admin -i id_rsa.pub --state s3://testcompany-kops-config"
        );
        assert_eq!(
            kops.update_cluster(CLUSTER).args_line(),
            "update cluster --name test.aws.testcompany.tech --state s3://testcompany-kops-config --yes"
        );
        assert_eq!(
            kops.replace_cluster(&config).args_line(),
            "replace cluster -f ./kops.config --state s3://testcompany-kops-config"
        );
        assert_eq!(
            kops.rolling_update(CLUSTER).args_line(),
            "rolling-update cluster --name test.aws.testcompany.tech --state s3://testcompany-kops-config"
        );
        assert_eq!(
            kops.delete_cluster(CLUSTER).args_line(),
            "delete cluster test.aws.testcompany.tech --state s3://testcompany-kops-config --yes"
        );
    }

    #[test]
    fn test_version() {
        let invocation = Kops::version(Path::new("/usr/local/bin/kops"));
        assert_eq!(invocation.program, PathBuf::from("/usr/local/bin/kops"));
        assert_eq!(invocation.args, vec!["version"]);
    }
}
