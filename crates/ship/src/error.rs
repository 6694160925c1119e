//! Error types for the SHIP lifecycle CLI.
//!
//! Each stage of a lifecycle run has its own error enum so callers can tell
//! a malformed values file from a missing binary or a failed tool run.
//! Command handlers wrap these in `anyhow` with operation context.

use std::path::PathBuf;

use thiserror::Error;

/// Broad classification of configuration failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// The values document is not well-formed YAML.
    Parse,
    /// The document does not satisfy the values schema.
    Validation,
    /// A referenced file, directory, or binary is missing or unusable.
    Io,
}

/// Errors raised while loading and validating the values document.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The values file could not be read.
    #[error("Failed to read values file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The values file is not valid YAML.
    #[error("Failed to parse values file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A required field is missing or has the wrong type.
    #[error("Values do not match schema: {0}")]
    Schema(#[source] serde_yaml::Error),

    /// One or more field constraints were violated.
    #[error("Invalid values: {}", .0.join("; "))]
    Constraints(Vec<String>),

    /// A referenced file does not exist.
    #[error("{context} not found at {}", .path.display())]
    MissingFile { context: &'static str, path: PathBuf },

    /// The output directory does not exist.
    #[error("output directory '{}' does not exist", .0.display())]
    MissingOutputDir(PathBuf),

    /// A tool binary could not be found or failed its version check.
    #[error("{name} executable not valid: {reason}")]
    InvalidBinary { name: &'static str, reason: String },
}

impl ConfigError {
    /// Classify this error as a parse, validation, or I/O failure.
    #[must_use]
    pub fn kind(&self) -> ConfigErrorKind {
        match self {
            Self::Parse { .. } => ConfigErrorKind::Parse,
            Self::Schema(_) | Self::Constraints(_) => ConfigErrorKind::Validation,
            Self::Read { .. }
            | Self::MissingFile { .. }
            | Self::MissingOutputDir(_)
            | Self::InvalidBinary { .. } => ConfigErrorKind::Io,
        }
    }
}

/// Errors raised while rendering a template.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The template file could not be read.
    #[error("Failed to read template {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The template has invalid syntax.
    #[error("Invalid template {}: {source}", .path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: Box<handlebars::RenderError>,
    },

    /// A placeholder could not be resolved from the context.
    #[error("Failed to render template {}: {source}", .path.display())]
    Render {
        path: PathBuf,
        #[source]
        source: Box<handlebars::RenderError>,
    },

    /// The rendered output could not be written.
    #[error("Failed to write rendered config {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors raised while reading resource IDs out of Terraform state.
#[derive(Debug, Error)]
pub enum StateError {
    /// The state file could not be read.
    #[error("Failed to read terraform state {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The state document is not valid JSON or has an unexpected shape.
    #[error("Failed to parse terraform state: {0}")]
    Parse(#[from] serde_json::Error),

    /// The state document has no modules.
    #[error("terraform state contains no modules")]
    NoModules,

    /// An expected resource is absent from the state.
    #[error("resource '{0}' not found in terraform state")]
    MissingResource(String),

    /// A resource exists but has no primary instance.
    #[error("resource '{0}' has no primary instance in terraform state")]
    NoPrimary(String),
}

/// Errors raised while invoking an external tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The process could not be started.
    #[error("Failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The process ran but exited unsuccessfully.
    #[error("`{command}` {}", describe_failure(.code, .stderr))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    /// A readiness wait did not complete in time.
    #[error("Timed out after {secs}s waiting for {what}")]
    Timeout { what: String, secs: u64 },

    /// A waited-on workload ended in a terminal failure.
    #[error("{what} failed")]
    WorkloadFailed { what: String },
}

/// The operator declined a confirmation prompt.
#[derive(Debug, Error)]
#[error("Aborted by operator")]
pub struct Aborted;

#[allow(clippy::ref_option)]
fn describe_failure(code: &Option<i32>, stderr: &str) -> String {
    let status = match code {
        Some(code) => format!("exited with status {code}"),
        None => "was terminated by a signal".to_string(),
    };
    if stderr.is_empty() {
        status
    } else {
        format!("{status}: {stderr}")
    }
}
