use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use ship_cli::{ui, Lifecycle, ProcessRunner};

use super::{confirmer, open_session};

/// Destroy a cluster
#[derive(Args)]
pub struct DestroyCommand {
    /// Skip the confirmation prompt.
    #[arg(short, long)]
    yes: bool,
}

impl DestroyCommand {
    pub async fn run(&self, values: &Path) -> Result<()> {
        let runner = ProcessRunner;
        let session = open_session(values, &runner).await?;
        let prompt = confirmer(self.yes);

        ui::print_section(&format!(
            "💥 Destroying {}",
            session.values.cluster_config.fully_qualified_name
        ));

        Lifecycle::new(&session, &runner, prompt.as_ref())
            .destroy()
            .await
            .context("Destroy cluster failed")
    }
}
