//! Helm command builders.

use std::path::{Path, PathBuf};

use super::Invocation;
use crate::components::Chart;

/// Default binary name.
pub const BINARY: &str = "helm";

/// Chart repository the platform components are published to.
pub const CHART_REPO_NAME: &str = "sprinthive-dev-charts";

/// URL of [`CHART_REPO_NAME`].
pub const CHART_REPO_URL: &str = "https://s3.eu-west-2.amazonaws.com/sprinthive-dev-charts";

/// Placeholder in chart overrides replaced by the ingress base domain.
pub const DOMAIN_PLACEHOLDER: &str = "${domain}";

/// Helm, bound to a resolved binary.
#[derive(Debug, Clone)]
pub struct Helm {
    bin: PathBuf,
}

impl Helm {
    #[must_use]
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self { bin: bin.into() }
    }

    /// `helm version`
    #[must_use]
    pub fn version(&self) -> Invocation {
        Invocation::new(&self.bin).arg("version")
    }

    /// `helm repo add <name> <url>`
    #[must_use]
    pub fn repo_add(&self, name: &str, url: &str) -> Invocation {
        Invocation::new(&self.bin).args(["repo", "add", name, url])
    }

    /// `helm repo update`
    #[must_use]
    pub fn repo_update(&self) -> Invocation {
        Invocation::new(&self.bin).args(["repo", "update"])
    }

    /// `helm install <chart> -n <release> --namespace <ns> [--set k=v]... [--values <file>]`
    ///
    /// `${domain}` in overrides is replaced with `domain`; a relative values
    /// file is resolved against `resources_dir`.
    #[must_use]
    pub fn install(&self, chart: &Chart, domain: &str, resources_dir: &Path) -> Invocation {
        let mut invocation = Invocation::new(&self.bin).args([
            "install",
            chart.chart_path,
            "-n",
            chart.release_name,
            "--namespace",
            chart.namespace,
        ]);

        for value in chart.overrides {
            invocation = invocation
                .arg("--set")
                .arg(value.replace(DOMAIN_PLACEHOLDER, domain));
        }

        if let Some(values) = chart.values_path {
            invocation = invocation
                .arg("--values")
                .arg(resources_dir.join(values).display().to_string());
        }

        invocation
    }

    /// `helm list -q`
    #[must_use]
    pub fn list_releases(&self) -> Invocation {
        Invocation::new(&self.bin).args(["list", "-q"])
    }

    /// `helm delete --purge <release>`
    #[must_use]
    pub fn delete_release(&self, release: &str) -> Invocation {
        Invocation::new(&self.bin).args(["delete", "--purge", release])
    }
}

/// Parse the output of `helm list -q` into release names.
#[must_use]
pub fn parse_release_list(output: &str) -> Vec<String> {
    output
        .lines()
        .map(|line| line.trim().trim_matches('"'))
        .filter(|line| !line.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ZIPKIN: Chart = Chart {
        chart_path: "sprinthive-dev-charts/zipkin",
        namespace: "infra",
        release_name: "tracing",
        overrides: &["ingress.enabled=true", "ingress.host=zipkin.${domain}"],
        values_path: None,
    };

    #[test]
    fn test_install_substitutes_domain() {
        let helm = Helm::new("helm");
        let invocation = helm.install(&ZIPKIN, "example.com", Path::new("."));

        assert_eq!(
            invocation.args_line(),
            "install sprinthive-dev-charts/zipkin -n tracing --namespace infra \
             --set ingress.enabled=true --set ingress.host=zipkin.example.com"
        );
    }

    #[test]
    fn test_install_with_values_file() {
        let chart = Chart {
            values_path: Some("resources/grafana/values.yaml"),
            overrides: &[],
            ..ZIPKIN
        };
        let invocation = Helm::new("helm").install(&chart, "example.com", Path::new("/srv/ship"));

        assert_eq!(
            invocation.args[invocation.args.len() - 2..],
            ["--values", "/srv/ship/resources/grafana/values.yaml"]
        );
    }

    #[test]
    fn test_parse_release_list() {
        let releases = parse_release_list("repo\ntracing\n\n\"logdb\"\n");
        assert_eq!(releases, vec!["repo", "tracing", "logdb"]);
        assert!(parse_release_list("").is_empty());
    }

    #[test]
    fn test_release_commands() {
        let helm = Helm::new("helm");
        assert_eq!(helm.list_releases().args_line(), "list -q");
        assert_eq!(helm.repo_update().args_line(), "repo update");
        assert_eq!(helm.delete_release("repo").args_line(), "delete --purge repo");
        assert_eq!(
            helm.repo_add(CHART_REPO_NAME, CHART_REPO_URL).args_line(),
            "repo add sprinthive-dev-charts https://s3.eu-west-2.amazonaws.com/sprinthive-dev-charts"
        );
    }
}
