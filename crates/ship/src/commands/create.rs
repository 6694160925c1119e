use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use ship_cli::{ui, Lifecycle, ProcessRunner, TerminalPrompt};

use super::open_session;

/// Create a cluster
#[derive(Args)]
pub struct CreateCommand {}

impl CreateCommand {
    pub async fn run(&self, values: &Path) -> Result<()> {
        let runner = ProcessRunner;
        let session = open_session(values, &runner).await?;

        ui::print_section(&format!(
            "🚢 Creating {}",
            session.values.cluster_config.fully_qualified_name
        ));

        Lifecycle::new(&session, &runner, &TerminalPrompt)
            .create()
            .await
            .context("Create cluster failed")
    }
}
