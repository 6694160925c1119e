//! External tool invocation.
//!
//! Every external program (Terraform, kops, Helm, kubectl) is driven through
//! an [`Invocation`] built by the tool's wrapper and executed by a
//! [`CommandRunner`]. The production runner spawns real processes; tests
//! substitute a recording runner to assert the exact call sequence.

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use crate::config::Paths;
use crate::error::{ConfigError, ToolError};

pub mod helm;
pub mod kops;
pub mod kubectl;
pub mod terraform;

pub use helm::Helm;
pub use kops::Kops;
pub use kubectl::Kubectl;
pub use terraform::Terraform;

/// A single external program call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Program to execute.
    pub program: PathBuf,
    /// Arguments, in order.
    pub args: Vec<String>,
}

impl Invocation {
    /// Start an invocation of `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Append one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The argument list joined with spaces, without the program.
    #[must_use]
    pub fn args_line(&self) -> String {
        self.args.join(" ")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Executes invocations.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run to completion with the tool's output passed through to the
    /// terminal.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolError`] if the process cannot start or exits non-zero.
    async fn run(&self, invocation: &Invocation) -> Result<(), ToolError>;

    /// Run to completion and return captured standard output.
    ///
    /// # Errors
    ///
    /// Returns a [`ToolError`] if the process cannot start or exits non-zero.
    async fn capture(&self, invocation: &Invocation) -> Result<String, ToolError>;
}

/// Runs invocations as child processes, one at a time.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessRunner;

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<(), ToolError> {
        info!(command = %invocation, "Running");

        let status = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .map_err(|source| spawn_error(invocation, source))?;

        if !status.success() {
            return Err(ToolError::Failed {
                command: invocation.to_string(),
                code: status.code(),
                stderr: String::new(),
            });
        }

        Ok(())
    }

    async fn capture(&self, invocation: &Invocation) -> Result<String, ToolError> {
        debug!(command = %invocation, "Capturing output");

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| spawn_error(invocation, source))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ToolError::Failed {
                command: invocation.to_string(),
                code: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

fn spawn_error(invocation: &Invocation, source: std::io::Error) -> ToolError {
    ToolError::Spawn {
        program: invocation.program.display().to_string(),
        source,
    }
}

/// Resolve a tool binary: an explicit override is used as given, otherwise
/// the name is searched on `PATH`.
///
/// # Errors
///
/// Returns [`ConfigError::MissingFile`] for a missing override and
/// [`ConfigError::InvalidBinary`] when the name is not on `PATH`.
pub fn resolve_binary(
    name: &'static str,
    override_path: Option<&Path>,
) -> Result<PathBuf, ConfigError> {
    match override_path {
        Some(path) if path.is_file() => Ok(path.to_path_buf()),
        Some(path) => Err(ConfigError::MissingFile {
            context: binary_context(name),
            path: path.to_path_buf(),
        }),
        None => which::which(name).map_err(|e| ConfigError::InvalidBinary {
            name,
            reason: e.to_string(),
        }),
    }
}

fn binary_context(name: &'static str) -> &'static str {
    match name {
        terraform::BINARY => "terraform binary",
        kops::BINARY => "kops binary",
        helm::BINARY => "helm binary",
        kubectl::BINARY => "kubectl binary",
        _ => "binary",
    }
}

/// Run a version-check invocation, mapping failure to a configuration error
/// naming the binary.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidBinary`] if the check fails.
pub async fn check_version(
    runner: &dyn CommandRunner,
    name: &'static str,
    invocation: &Invocation,
) -> Result<String, ConfigError> {
    let output = runner
        .capture(invocation)
        .await
        .map_err(|e| ConfigError::InvalidBinary {
            name,
            reason: e.to_string(),
        })?;

    let version = output.lines().next().unwrap_or_default().trim().to_string();
    debug!(tool = name, version = %version, "Version check passed");
    Ok(version)
}

/// Resolved and version-checked lifecycle tool binaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    /// Terraform binary.
    pub terraform: PathBuf,
    /// kops binary.
    pub kops: PathBuf,
}

impl Toolchain {
    /// Resolve both binaries from `paths` and check they respond to a
    /// version query.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] naming the first binary that is missing or
    /// fails its version check.
    pub async fn discover(paths: &Paths, runner: &dyn CommandRunner) -> Result<Self, ConfigError> {
        let terraform = resolve_binary(terraform::BINARY, paths.terraform.as_deref())?;
        check_version(runner, terraform::BINARY, &Terraform::new(&terraform).version()).await?;

        let kops = resolve_binary(kops::BINARY, paths.kops.as_deref())?;
        check_version(runner, kops::BINARY, &Kops::version(&kops)).await?;

        Ok(Self { terraform, kops })
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! A recording runner for sequence tests.

    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    use super::*;

    /// Records every invocation; can be told to fail or to return canned
    /// output for particular argument lines.
    #[derive(Default)]
    pub(crate) struct RecordingRunner {
        calls: Mutex<Vec<Invocation>>,
        failures: Mutex<Vec<String>>,
        outputs: Mutex<HashMap<String, VecDeque<String>>>,
    }

    impl RecordingRunner {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        /// Fail any invocation whose argument line starts with `prefix`.
        pub(crate) fn fail_on(self, prefix: &str) -> Self {
            self.failures.lock().unwrap().push(prefix.to_string());
            self
        }

        /// Queue `output` for the next capture of exactly `args_line`.
        pub(crate) fn respond(self, args_line: &str, output: &str) -> Self {
            self.outputs
                .lock()
                .unwrap()
                .entry(args_line.to_string())
                .or_default()
                .push_back(output.to_string());
            self
        }

        pub(crate) fn calls(&self) -> Vec<Invocation> {
            self.calls.lock().unwrap().clone()
        }

        /// Argument lines of every recorded call, in order.
        pub(crate) fn lines(&self) -> Vec<String> {
            self.calls().iter().map(Invocation::args_line).collect()
        }

        fn record(&self, invocation: &Invocation) -> Result<(), ToolError> {
            self.calls.lock().unwrap().push(invocation.clone());
            let line = invocation.args_line();
            if self
                .failures
                .lock()
                .unwrap()
                .iter()
                .any(|prefix| line.starts_with(prefix.as_str()))
            {
                return Err(ToolError::Failed {
                    command: invocation.to_string(),
                    code: Some(1),
                    stderr: String::new(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl CommandRunner for RecordingRunner {
        async fn run(&self, invocation: &Invocation) -> Result<(), ToolError> {
            self.record(invocation)
        }

        async fn capture(&self, invocation: &Invocation) -> Result<String, ToolError> {
            self.record(invocation)?;
            let mut outputs = self.outputs.lock().unwrap();
            Ok(outputs
                .get_mut(&invocation.args_line())
                .and_then(VecDeque::pop_front)
                .unwrap_or_default())
        }
    }
}
