use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use ship_cli::components::DEFAULT_COMPONENTS;
use ship_cli::tools::{helm, kubectl, resolve_binary, Helm, Kubectl};
use ship_cli::{ui, InstallOptions, Platform, ProcessRunner};

/// Install the platform components
#[derive(Args)]
pub struct InstallCommand {
    /// Ingress base domain (e.g. `test.aws.example.com`).
    #[arg(short, long, value_name = "DOMAIN")]
    domain: String,

    /// Directory holding the component manifests and values files.
    #[arg(long, value_name = "DIR", default_value = ".")]
    resources_dir: PathBuf,

    /// Helm binary (defaults to `helm` on PATH).
    #[arg(long, value_name = "FILE")]
    helm: Option<PathBuf>,

    /// kubectl binary (defaults to `kubectl` on PATH).
    #[arg(long, value_name = "FILE")]
    kubectl: Option<PathBuf>,

    /// Seconds between readiness checks.
    #[arg(long, value_name = "SECS", default_value_t = 5)]
    poll_interval_secs: u64,

    /// Seconds to wait for a workload before giving up.
    #[arg(long, value_name = "SECS", default_value_t = 600)]
    wait_timeout_secs: u64,
}

impl InstallCommand {
    pub async fn run(&self) -> Result<()> {
        let helm = resolve_binary(helm::BINARY, self.helm.as_deref())
            .context("Config validation failed")?;
        let kubectl = resolve_binary(kubectl::BINARY, self.kubectl.as_deref())
            .context("Config validation failed")?;

        ui::print_section(&format!("📦 Installing platform for {}", self.domain));
        ui::print_kv("Resources", &self.resources_dir.display().to_string());
        ui::print_kv("Components", &DEFAULT_COMPONENTS.len().to_string());

        let options = InstallOptions {
            domain: self.domain.clone(),
            resources_dir: self.resources_dir.clone(),
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            wait_timeout: Duration::from_secs(self.wait_timeout_secs),
        };

        let runner = ProcessRunner;
        Platform::new(Helm::new(helm), Kubectl::new(kubectl), &runner, DEFAULT_COMPONENTS)
            .install(&options)
            .await
            .context("Install platform failed")?;

        ui::print_success("Platform installed");
        Ok(())
    }
}
