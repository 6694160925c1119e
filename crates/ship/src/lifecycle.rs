//! Cluster lifecycle sequences.
//!
//! Each operation is a fixed, linear sequence of Terraform and kops calls.
//! The first failing step aborts the sequence; nothing is rolled back, so a
//! failed run leaves both tools' state exactly as the failing step left it.
//!
//! | Operation | Sequence |
//! |-----------|----------|
//! | create    | render networking → terraform apply → extract IDs → render kops config → kops create → kops create secret → kops update |
//! | update    | confirm → render networking → terraform apply → extract IDs → render kops config → kops replace → kops update → (confirm) kops rolling-update |
//! | destroy   | confirm → kops delete → terraform destroy |

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::ValuesDocument;
use crate::error::{Aborted, ConfigError};
use crate::prompt::Confirmer;
use crate::render::{ClusterContext, TemplateRenderer};
use crate::state::{NetworkIds, TerraformState};
use crate::tools::{CommandRunner, Invocation, Kops, Terraform, Toolchain};
use crate::ui;

/// A validated values document together with its resolved tool binaries.
#[derive(Debug, Clone)]
pub struct Session {
    pub values: ValuesDocument,
    pub toolchain: Toolchain,
}

impl Session {
    /// Load and validate the values document, then discover and
    /// version-check the tool binaries it references.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first problem found.
    pub async fn open(values_path: &Path, runner: &dyn CommandRunner) -> Result<Self, ConfigError> {
        let values = ValuesDocument::load(values_path)?;
        let toolchain = Toolchain::discover(&values.paths, runner).await?;

        info!(
            cluster = %values.cluster_config.fully_qualified_name,
            zone = %values.cluster_config.zone(),
            terraform = %toolchain.terraform.display(),
            kops = %toolchain.kops.display(),
            "Configuration validated"
        );

        Ok(Self { values, toolchain })
    }
}

/// Runs lifecycle operations for one cluster.
pub struct Lifecycle<'a> {
    values: &'a ValuesDocument,
    terraform: Terraform,
    kops: Kops,
    renderer: TemplateRenderer,
    runner: &'a dyn CommandRunner,
    prompt: &'a dyn Confirmer,
}

impl<'a> Lifecycle<'a> {
    #[must_use]
    pub fn new(
        session: &'a Session,
        runner: &'a dyn CommandRunner,
        prompt: &'a dyn Confirmer,
    ) -> Self {
        let values = &session.values;
        Self {
            values,
            terraform: Terraform::new(&session.toolchain.terraform),
            kops: Kops::new(
                &session.toolchain.kops,
                &values.cluster_config.config_base_url,
            ),
            renderer: TemplateRenderer::new(),
            runner,
            prompt,
        }
    }

    fn cluster_name(&self) -> &str {
        &self.values.cluster_config.fully_qualified_name
    }

    /// Provision networking, then create and configure the cluster.
    ///
    /// # Errors
    ///
    /// Returns the first failing step's error.
    pub async fn create(&self) -> Result<()> {
        const TOTAL: usize = 6;
        let name = self.cluster_name();
        info!(cluster = %name, "Creating cluster");

        let network = self.provision_network(TOTAL).await?;

        step(3, TOTAL, "Rendering kops config");
        let kops_config = self.render_kops_config(&network)?;

        step(4, TOTAL, "Creating cluster");
        self.run(self.kops.create(&kops_config)).await?;

        step(5, TOTAL, "Registering SSH public key");
        self.run(
            self.kops
                .create_ssh_secret(name, &self.values.paths.ssh_public_key_path),
        )
        .await?;

        step(6, TOTAL, "Applying cluster configuration");
        self.run(self.kops.update_cluster(name)).await?;

        ui::print_success(&format!("Cluster {name} created"));
        Ok(())
    }

    /// Re-apply networking and the cluster spec, then optionally roll the
    /// nodes.
    ///
    /// # Errors
    ///
    /// Returns [`Aborted`] if the operator declines, or the first failing
    /// step's error.
    pub async fn update(&self) -> Result<()> {
        const TOTAL: usize = 6;
        let name = self.cluster_name();

        self.confirm_or_abort(&format!("Are you sure you want to update {name}?"))?;
        info!(cluster = %name, "Updating cluster");

        let network = self.provision_network(TOTAL).await?;

        step(3, TOTAL, "Rendering kops config");
        let kops_config = self.render_kops_config(&network)?;

        step(4, TOTAL, "Replacing cluster spec");
        self.run(self.kops.replace_cluster(&kops_config)).await?;

        step(5, TOTAL, "Applying cluster configuration");
        self.run(self.kops.update_cluster(name)).await?;

        if self.prompt.confirm("Should I initiate a rolling update?")? {
            step(6, TOTAL, "Rolling update of cluster nodes");
            self.run(self.kops.rolling_update(name)).await?;
        } else {
            ui::print_info("Skipping rolling update; nodes keep their current configuration");
        }

        ui::print_success(&format!("Cluster {name} updated"));
        Ok(())
    }

    /// Delete the cluster, then tear down its networking.
    ///
    /// # Errors
    ///
    /// Returns [`Aborted`] if the operator declines, or the first failing
    /// step's error.
    pub async fn destroy(&self) -> Result<()> {
        const TOTAL: usize = 2;
        let name = self.cluster_name();

        self.confirm_or_abort(&format!("Are you sure you want to destroy {name}?"))?;
        warn!(cluster = %name, "Destroying cluster");

        step(1, TOTAL, "Deleting cluster");
        self.run(self.kops.delete_cluster(name)).await?;

        step(2, TOTAL, "Destroying networking infrastructure");
        self.run(self.terraform.destroy(&self.values.paths.output_dir))
            .await?;

        ui::print_success(&format!("Cluster {name} destroyed"));
        Ok(())
    }

    /// Steps 1 and 2 of create/update: render and apply the networking
    /// config, then read the resulting resource IDs.
    async fn provision_network(&self, total: usize) -> Result<NetworkIds> {
        let paths = &self.values.paths;
        let cluster = &self.values.cluster_config;

        step(1, total, "Rendering networking config");
        self.renderer
            .render_to(&paths.terraform_template_path, cluster, &paths.networking_config())
            .context("Failed to generate networking config")?;

        step(2, total, "Applying networking infrastructure");
        let state_path = paths.terraform_state();
        self.run(self.terraform.apply(&paths.output_dir, &state_path))
            .await?;

        let state = TerraformState::load(&state_path)?;
        let network = NetworkIds::extract(
            &state,
            &cluster.short_name,
            &cluster.aws_region,
            &cluster.aws_az1,
        )
        .context("Failed to read network IDs from terraform state")?;

        ui::print_kv("VPC", &network.vpc_id);
        ui::print_kv("NAT gateway", &network.nat_gateway_id);
        ui::print_kv("Node subnet", &network.node_subnet_id);
        ui::print_kv("Public subnet", &network.public_subnet_id);

        Ok(network)
    }

    fn render_kops_config(&self, network: &NetworkIds) -> Result<PathBuf> {
        let paths = &self.values.paths;
        let context = ClusterContext {
            cluster: &self.values.cluster_config,
            network,
        };

        let path = self
            .renderer
            .render_to(&paths.kops_template_path, &context, &paths.kops_config())
            .context("Failed to generate kops config")?;
        Ok(path)
    }

    async fn run(&self, invocation: Invocation) -> Result<()> {
        self.runner.run(&invocation).await?;
        Ok(())
    }

    fn confirm_or_abort(&self, prompt: &str) -> Result<()> {
        if self.prompt.confirm(prompt)? {
            Ok(())
        } else {
            ui::print_warning("Aborted.");
            Err(Aborted.into())
        }
    }
}

fn step(current: usize, total: usize, message: &str) {
    info!(step = current, total, "{message}");
    ui::print_progress_step(current, total, message);
}
