//! Platform component installation onto a running cluster.
//!
//! Installs the component catalog with Helm, applying any one-off manifests
//! around each chart with kubectl. Components are installed strictly in
//! catalog order; a manifest that waits on a workload polls its status until
//! it is ready or the wait timeout passes.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::components::{Component, ManifestResource, WorkloadRef};
use crate::error::ToolError;
use crate::tools::helm::{self, parse_release_list, CHART_REPO_NAME, CHART_REPO_URL};
use crate::tools::kubectl::{self, clean_jsonpath_output, has_failed, is_ready};
use crate::tools::{check_version, CommandRunner, Helm, Kubectl};
use crate::ui;

/// Settings for one install run.
#[derive(Debug, Clone)]
pub struct InstallOptions {
    /// Ingress base domain substituted for `${domain}` in chart overrides.
    pub domain: String,
    /// Directory manifest and values paths are resolved against.
    pub resources_dir: PathBuf,
    /// Delay between readiness checks.
    pub poll_interval: Duration,
    /// Give up on a readiness wait after this long.
    pub wait_timeout: Duration,
}

/// Installs and removes the platform components.
pub struct Platform<'a> {
    helm: Helm,
    kubectl: Kubectl,
    runner: &'a dyn CommandRunner,
    components: &'a [Component],
}

impl<'a> Platform<'a> {
    #[must_use]
    pub fn new(
        helm: Helm,
        kubectl: Kubectl,
        runner: &'a dyn CommandRunner,
        components: &'a [Component],
    ) -> Self {
        Self {
            helm,
            kubectl,
            runner,
            components,
        }
    }

    /// Install every component in order.
    ///
    /// # Errors
    ///
    /// Fails on the first tool failure or readiness timeout; components
    /// already installed stay installed.
    pub async fn install(&self, options: &InstallOptions) -> Result<()> {
        self.check_tools().await?;
        self.add_chart_repo().await?;

        let total = self.components.len();
        for (index, component) in self.components.iter().enumerate() {
            let chart = &component.chart;
            ui::print_progress_step(index + 1, total, chart.release_name);
            ui::print_component(chart.chart_path);
            info!(
                release = chart.release_name,
                chart = chart.chart_path,
                namespace = chart.namespace,
                "Installing component"
            );

            for resource in component.pre_install {
                self.apply_manifest(resource, options).await?;
            }

            ui::print_progress(&format!("Installing chart into {}...", chart.namespace));
            self.runner
                .run(&self.helm.install(chart, &options.domain, &options.resources_dir))
                .await
                .with_context(|| format!("Failed to install {}", chart.release_name))?;

            for resource in component.post_install {
                self.apply_manifest(resource, options).await?;
            }

            ui::print_success(&format!("{} installed", chart.release_name));
        }

        Ok(())
    }

    /// Delete every catalog release that is currently installed.
    ///
    /// Returns the deleted release names, in catalog order.
    ///
    /// # Errors
    ///
    /// Fails if releases cannot be listed or a delete fails.
    pub async fn uninstall(&self) -> Result<Vec<String>> {
        let output = self
            .runner
            .capture(&self.helm.list_releases())
            .await
            .context("Failed to list helm releases")?;
        let installed: HashSet<String> = parse_release_list(&output).into_iter().collect();

        let mut removed = Vec::new();
        for component in self.components {
            let release = component.chart.release_name;
            if !installed.contains(release) {
                debug!(release, "Release not installed, skipping");
                continue;
            }

            ui::print_progress(&format!("Deleting release {release}..."));
            self.runner
                .run(&self.helm.delete_release(release))
                .await
                .with_context(|| format!("Failed to delete {release}"))?;
            removed.push(release.to_string());
        }

        info!(count = removed.len(), "Releases deleted");
        Ok(removed)
    }

    async fn check_tools(&self) -> Result<()> {
        let helm_version = check_version(self.runner, helm::BINARY, &self.helm.version()).await?;
        let kubectl_version =
            check_version(self.runner, kubectl::BINARY, &self.kubectl.version()).await?;
        debug!(helm = %helm_version, kubectl = %kubectl_version, "Tools available");
        Ok(())
    }

    /// An existing repository makes `repo add` fail; fall back to refreshing
    /// the index.
    async fn add_chart_repo(&self) -> Result<()> {
        ui::print_progress(&format!("Adding chart repository {CHART_REPO_NAME}..."));
        if let Err(e) = self
            .runner
            .run(&self.helm.repo_add(CHART_REPO_NAME, CHART_REPO_URL))
            .await
        {
            warn!(error = %e, "Adding chart repository failed, updating instead");
            self.runner
                .run(&self.helm.repo_update())
                .await
                .context("Failed to add Helm repository")?;
        }
        Ok(())
    }

    async fn apply_manifest(&self, resource: &ManifestResource, options: &InstallOptions) -> Result<()> {
        if let Some(condition) = &resource.precondition {
            ui::print_progress(&format!("Waiting for {} to be ready...", condition.workload));
            self.wait_for(&condition.workload, condition.min_ready, options)
                .await?;
        }

        let manifest = options.resources_dir.join(resource.manifest_path);
        ui::print_progress(&format!("Applying {}...", resource.manifest_path));
        self.runner
            .run(&self.kubectl.create(&manifest, resource.namespace))
            .await
            .with_context(|| format!("Failed to apply {}", resource.manifest_path))?;

        if let Some(pod) = &resource.wait_for_done {
            ui::print_progress(&format!("Waiting for {pod} to complete..."));
            self.wait_for(pod, 0, options).await?;
        }

        if !resource.persistent {
            self.runner
                .run(&self.kubectl.delete(&manifest, resource.namespace))
                .await
                .with_context(|| format!("Failed to clean up {}", resource.manifest_path))?;
        }

        Ok(())
    }

    /// Poll `workload` until it is ready. Status check failures (the workload
    /// not existing yet, mostly) count as not ready; a failed pod ends the
    /// wait at once.
    async fn wait_for(
        &self,
        workload: &WorkloadRef,
        min_ready: u32,
        options: &InstallOptions,
    ) -> Result<(), ToolError> {
        let started = Instant::now();
        let status = self.kubectl.status(workload);

        loop {
            match self.runner.capture(&status).await {
                Ok(output) if is_ready(workload.kind, &output, min_ready) => {
                    debug!(%workload, elapsed = ?started.elapsed(), "Workload ready");
                    return Ok(());
                }
                Ok(output) if has_failed(workload.kind, &output) => {
                    return Err(ToolError::WorkloadFailed {
                        what: workload.to_string(),
                    });
                }
                Ok(output) => {
                    debug!(%workload, status = clean_jsonpath_output(&output), "Not ready yet");
                }
                Err(e) => debug!(%workload, error = %e, "Status check failed"),
            }

            if started.elapsed() >= options.wait_timeout {
                return Err(ToolError::Timeout {
                    what: workload.to_string(),
                    secs: options.wait_timeout.as_secs(),
                });
            }

            sleep(options.poll_interval).await;
        }
    }
}
