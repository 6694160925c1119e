use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use ship_cli::{ui, Lifecycle, ProcessRunner};

use super::{confirmer, open_session};

/// Update a cluster
#[derive(Args)]
pub struct UpdateCommand {
    /// Skip the confirmation prompt and roll the nodes without asking.
    #[arg(short, long)]
    yes: bool,
}

impl UpdateCommand {
    pub async fn run(&self, values: &Path) -> Result<()> {
        let runner = ProcessRunner;
        let session = open_session(values, &runner).await?;
        let prompt = confirmer(self.yes);

        ui::print_section(&format!(
            "🔄 Updating {}",
            session.values.cluster_config.fully_qualified_name
        ));

        Lifecycle::new(&session, &runner, prompt.as_ref())
            .update()
            .await
            .context("Update cluster failed")
    }
}
