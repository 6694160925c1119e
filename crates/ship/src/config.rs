//! Values document types and validation.
//!
//! The values document is a YAML file with two sections: `paths`, which
//! locates templates, keys, binaries and the output directory, and
//! `clusterConfig`, which holds the variables substituted into both
//! templates. Loading happens in three stages that map onto the error
//! taxonomy: YAML syntax ([`ConfigErrorKind::Parse`]), schema and field
//! constraints ([`ConfigErrorKind::Validation`]) and referenced files
//! ([`ConfigErrorKind::Io`]).
//!
//! [`ConfigErrorKind::Parse`]: crate::error::ConfigErrorKind::Parse
//! [`ConfigErrorKind::Validation`]: crate::error::ConfigErrorKind::Validation
//! [`ConfigErrorKind::Io`]: crate::error::ConfigErrorKind::Io

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Default location of the values document.
pub const DEFAULT_VALUES_PATH: &str = "values.yaml";

/// File name of the rendered networking config inside the output directory.
pub const NETWORKING_CONFIG_FILE: &str = "networking.tf";

/// File name of the rendered kops config inside the output directory.
pub const KOPS_CONFIG_FILE: &str = "kops.config";

/// File name of the Terraform state inside the output directory.
pub const TERRAFORM_STATE_FILE: &str = "terraform.tfstate";

/// The full values document. Keys outside the two known sections are
/// ignored.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValuesDocument {
    /// File system locations.
    pub paths: Paths,
    /// Template variables for both the networking and kops templates.
    pub cluster_config: ClusterConfig,
}

/// File system locations referenced by the values document.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paths {
    /// Override for the Terraform binary (defaults to `terraform` on `PATH`).
    #[serde(default)]
    pub terraform: Option<PathBuf>,
    /// Override for the kops binary (defaults to `kops` on `PATH`).
    #[serde(default)]
    pub kops: Option<PathBuf>,
    /// Directory receiving rendered configs and Terraform state.
    pub output_dir: PathBuf,
    /// Handlebars template for the Terraform networking config.
    pub terraform_template_path: PathBuf,
    /// Handlebars template for the kops cluster spec.
    pub kops_template_path: PathBuf,
    /// SSH public key registered as the cluster admin key.
    pub ssh_public_key_path: PathBuf,
}

impl Paths {
    /// Path of the rendered networking config.
    #[must_use]
    pub fn networking_config(&self) -> PathBuf {
        self.output_dir.join(NETWORKING_CONFIG_FILE)
    }

    /// Path of the rendered kops config.
    #[must_use]
    pub fn kops_config(&self) -> PathBuf {
        self.output_dir.join(KOPS_CONFIG_FILE)
    }

    /// Path of the Terraform state file.
    #[must_use]
    pub fn terraform_state(&self) -> PathBuf {
        self.output_dir.join(TERRAFORM_STATE_FILE)
    }

    /// Check that every referenced file and directory exists.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingFile`] or [`ConfigError::MissingOutputDir`]
    /// for the first path that does not exist.
    pub fn verify(&self) -> Result<(), ConfigError> {
        require_file(&self.ssh_public_key_path, "SSH Public Key")?;
        require_file(&self.terraform_template_path, "Terraform Template")?;
        require_file(&self.kops_template_path, "Kops Template")?;

        if !self.output_dir.is_dir() {
            return Err(ConfigError::MissingOutputDir(self.output_dir.clone()));
        }

        if let Some(terraform) = &self.terraform {
            require_file(terraform, "terraform binary")?;
        }
        if let Some(kops) = &self.kops {
            require_file(kops, "kops binary")?;
        }

        Ok(())
    }
}

fn require_file(path: &Path, context: &'static str) -> Result<(), ConfigError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ConfigError::MissingFile {
            context,
            path: path.to_path_buf(),
        })
    }
}

/// Cluster parameters, serialized verbatim as the template context.
///
/// Keys not modelled here are kept in [`ClusterConfig::extra`] and passed to
/// the templates unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClusterConfig {
    /// Cluster DNS name, also the kops cluster name.
    pub fully_qualified_name: String,
    /// Short name used for Terraform resource names.
    pub short_name: String,
    /// kops state store URL (e.g. `s3://bucket`).
    #[serde(rename = "ConfigBaseURL")]
    pub config_base_url: String,
    /// AWS region (e.g. `eu-west-2`).
    #[serde(rename = "AWSRegion")]
    pub aws_region: String,
    /// Availability zone suffix within the region (e.g. `a`).
    #[serde(rename = "AWSAZ1")]
    pub aws_az1: String,

    pub master_machine_type: String,
    pub master_min_number: u32,
    pub master_max_number: u32,

    pub node_machine_type: String,
    pub node_min_number: u32,
    pub node_max_number: u32,

    pub bastion_machine_type: String,
    pub bastion_min_number: u32,
    pub bastion_max_number: u32,

    /// Additional template variables.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ClusterConfig {
    /// Region and availability zone joined, as used in resource names.
    #[must_use]
    pub fn zone(&self) -> String {
        format!("{}{}", self.aws_region, self.aws_az1)
    }

    /// Collect every constraint this configuration violates.
    #[must_use]
    pub fn violations(&self) -> Vec<String> {
        let mut violations = Vec::new();

        for (field, value) in [
            ("FullyQualifiedName", &self.fully_qualified_name),
            ("ShortName", &self.short_name),
            ("ConfigBaseURL", &self.config_base_url),
            ("AWSRegion", &self.aws_region),
            ("MasterMachineType", &self.master_machine_type),
            ("NodeMachineType", &self.node_machine_type),
            ("BastionMachineType", &self.bastion_machine_type),
        ] {
            if value.trim().is_empty() {
                violations.push(format!("{field} must not be empty"));
            }
        }

        if !self.config_base_url.is_empty() && !self.config_base_url.contains("://") {
            violations.push(format!(
                "ConfigBaseURL '{}' must be a URL such as s3://bucket",
                self.config_base_url
            ));
        }

        let mut az = self.aws_az1.chars();
        if !matches!((az.next(), az.next()), (Some(c), None) if c.is_ascii_lowercase()) {
            violations.push(format!(
                "AWSAZ1 '{}' must be a single lowercase letter",
                self.aws_az1
            ));
        }

        for (group, min, max) in [
            ("Master", self.master_min_number, self.master_max_number),
            ("Node", self.node_min_number, self.node_max_number),
            ("Bastion", self.bastion_min_number, self.bastion_max_number),
        ] {
            if min > max {
                violations.push(format!(
                    "{group}MinNumber ({min}) must not exceed {group}MaxNumber ({max})"
                ));
            }
        }

        if self.master_max_number == 0 {
            violations.push("MasterMaxNumber must be at least 1".to_string());
        }
        if self.node_max_number == 0 {
            violations.push("NodeMaxNumber must be at least 1".to_string());
        }

        violations
    }
}

impl ValuesDocument {
    /// Load, validate and verify the values document at `path`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the file cannot be read or parsed, does
    /// not match the schema, or references missing files.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let values = Self::from_yaml(&text).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;

        values.paths.verify()?;
        debug!(values = %path.display(), "Values document loaded");

        Ok(values)
    }

    /// Parse and validate a values document without touching the file system.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed YAML, and
    /// [`ConfigError::Schema`] or [`ConfigError::Constraints`] for documents
    /// that do not satisfy the schema.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        // Syntax first, so malformed YAML is reported apart from schema errors.
        serde_yaml::from_str::<serde_yaml::Value>(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;

        let values: Self = serde_yaml::from_str(text).map_err(ConfigError::Schema)?;

        let violations = values.cluster_config.violations();
        if !violations.is_empty() {
            return Err(ConfigError::Constraints(violations));
        }

        Ok(values)
    }
}
