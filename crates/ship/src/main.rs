//! SHIP CLI.
//!
//! Creates, updates and destroys AWS Kubernetes clusters with Terraform and
//! kops, and installs the SHIP platform components with Helm.

// Allow product names without backticks in doc comments
#![allow(clippy::doc_markdown)]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use ship_cli::config::DEFAULT_VALUES_PATH;
use ship_cli::ui;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::create::CreateCommand;
use commands::destroy::DestroyCommand;
use commands::install::InstallCommand;
use commands::uninstall::UninstallCommand;
use commands::update::UpdateCommand;

/// SHIP - Kubernetes cluster lifecycle on AWS.
#[derive(Parser)]
#[command(
    name = "ship",
    version,
    about = "Create, update and destroy SHIP Kubernetes clusters",
    long_about = "Create, update and destroy SHIP Kubernetes clusters on AWS.\n\n\
                  Networking is provisioned with Terraform and the cluster with kops,\n\
                  both rendered from a single values document. The platform\n\
                  components are installed onto a running cluster with Helm."
)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Values document describing the cluster.
    #[arg(
        long,
        global = true,
        env = "SHIP_VALUES",
        value_name = "FILE",
        default_value = DEFAULT_VALUES_PATH
    )]
    values: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Provision networking and create the cluster.
    Create(CreateCommand),

    /// Re-apply networking and the cluster spec, optionally rolling nodes.
    Update(UpdateCommand),

    /// Delete the cluster and tear down its networking.
    Destroy(DestroyCommand),

    /// Install the platform components onto the current cluster.
    Install(InstallCommand),

    /// Remove the platform components from the current cluster.
    Uninstall(UninstallCommand),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info,ship_cli=debug,ship=debug")
    } else {
        EnvFilter::new("warn,ship_cli=info,ship=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Create(cmd) => cmd.run(&cli.values).await,
        Commands::Update(cmd) => cmd.run(&cli.values).await,
        Commands::Destroy(cmd) => cmd.run(&cli.values).await,
        Commands::Install(cmd) => cmd.run().await,
        Commands::Uninstall(cmd) => cmd.run().await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ui::print_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}
