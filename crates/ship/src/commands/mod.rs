//! Subcommand handlers.

use std::path::Path;

use anyhow::{Context, Result};
use ship_cli::{AssumeAnswer, CommandRunner, Confirmer, Session, TerminalPrompt};

pub mod create;
pub mod destroy;
pub mod install;
pub mod uninstall;
pub mod update;

/// Load the values document and check the lifecycle tools.
async fn open_session(values: &Path, runner: &dyn CommandRunner) -> Result<Session> {
    Session::open(values, runner)
        .await
        .context("Config validation failed")
}

/// `--yes` answers every prompt; otherwise ask on the terminal.
fn confirmer(assume_yes: bool) -> Box<dyn Confirmer> {
    if assume_yes {
        Box::new(AssumeAnswer(true))
    } else {
        Box::new(TerminalPrompt)
    }
}
