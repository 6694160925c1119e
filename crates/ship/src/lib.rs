//! SHIP cluster lifecycle library.
//!
//! Creates, updates and destroys Kubernetes clusters on AWS by driving
//! Terraform (networking) and kops (cluster) from a single YAML values
//! document, and installs the SHIP platform components onto a running
//! cluster with Helm.
//!
//! # Example
//!
//! ```ignore
//! use ship_cli::{Lifecycle, ProcessRunner, Session, TerminalPrompt};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let runner = ProcessRunner;
//!     let session = Session::open("values.yaml".as_ref(), &runner).await?;
//!     Lifecycle::new(&session, &runner, &TerminalPrompt).create().await
//! }
//! ```

// Allow product names without backticks in doc comments
#![allow(clippy::doc_markdown)]

pub mod components;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod platform;
pub mod prompt;
pub mod render;
pub mod state;
pub mod tools;
pub mod ui;

// Re-export commonly used types at the crate root
pub use config::{ClusterConfig, Paths, ValuesDocument};
pub use error::{Aborted, ConfigError, ConfigErrorKind, RenderError, StateError, ToolError};
pub use lifecycle::{Lifecycle, Session};
pub use platform::{InstallOptions, Platform};
pub use prompt::{AssumeAnswer, Confirmer, TerminalPrompt};
pub use tools::{CommandRunner, ProcessRunner, Toolchain};
