use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use ship_cli::components::DEFAULT_COMPONENTS;
use ship_cli::tools::{helm, kubectl, resolve_binary, Helm, Kubectl};
use ship_cli::{ui, Aborted, Platform, ProcessRunner};

use super::confirmer;

/// Remove the platform components
#[derive(Args)]
pub struct UninstallCommand {
    /// Skip the confirmation prompt.
    #[arg(short, long)]
    yes: bool,

    /// Helm binary (defaults to `helm` on PATH).
    #[arg(long, value_name = "FILE")]
    helm: Option<PathBuf>,
}

impl UninstallCommand {
    pub async fn run(&self) -> Result<()> {
        let helm = resolve_binary(helm::BINARY, self.helm.as_deref())
            .context("Config validation failed")?;

        ui::print_section("🧹 Uninstalling platform");

        if !confirmer(self.yes)
            .confirm("Are you sure you want to delete all platform releases?")?
        {
            ui::print_warning("Aborted.");
            return Err(Aborted.into());
        }

        let runner = ProcessRunner;
        let removed = Platform::new(
            Helm::new(helm),
            Kubectl::new(kubectl::BINARY),
            &runner,
            DEFAULT_COMPONENTS,
        )
        .uninstall()
        .await
        .context("Uninstall platform failed")?;

        if removed.is_empty() {
            ui::print_info("No platform releases installed");
        } else {
            ui::print_success(&format!("Deleted {} releases", removed.len()));
        }
        Ok(())
    }
}
