//! Terraform state extraction.
//!
//! After `terraform apply` the networking resources are only known by the
//! IDs recorded in the state file. kops needs four of them, looked up by the
//! resource names the networking template is expected to use:
//!
//! | Resource key                              | Field                |
//! |-------------------------------------------|----------------------|
//! | `aws_vpc.<ShortName>`                     | `VPCID`              |
//! | `aws_nat_gateway.public-<region><az>`     | `PublicNATGatewayID` |
//! | `aws_subnet.nodes-<region><az>`           | `NodeSubnetID`       |
//! | `aws_subnet.public-<region><az>`          | `PublicSubnetID`     |

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::StateError;

/// Terraform state document (module-based layout).
#[derive(Debug, Clone, Deserialize)]
pub struct TerraformState {
    #[serde(default)]
    pub modules: Vec<StateModule>,
}

/// A single module's resources keyed by `<type>.<name>`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateModule {
    #[serde(default)]
    pub resources: HashMap<String, StateResource>,
}

/// A resource entry in the state.
#[derive(Debug, Clone, Deserialize)]
pub struct StateResource {
    #[serde(default)]
    pub primary: Option<PrimaryInstance>,
}

/// The primary instance of a resource.
#[derive(Debug, Clone, Deserialize)]
pub struct PrimaryInstance {
    pub id: String,
}

impl TerraformState {
    /// Parse a state document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Parse`] if the text is not a state document.
    pub fn from_json(text: &str) -> Result<Self, StateError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Read and parse the state file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::Read`] or [`StateError::Parse`].
    pub fn load(path: &Path) -> Result<Self, StateError> {
        let text = std::fs::read_to_string(path).map_err(|source| StateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Primary ID of the resource `key` in the first module.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::NoModules`], [`StateError::MissingResource`] or
    /// [`StateError::NoPrimary`].
    pub fn primary_id(&self, key: &str) -> Result<&str, StateError> {
        // Networking is applied as a single root module.
        let module = self.modules.first().ok_or(StateError::NoModules)?;
        let resource = module
            .resources
            .get(key)
            .ok_or_else(|| StateError::MissingResource(key.to_string()))?;
        resource
            .primary
            .as_ref()
            .map(|p| p.id.as_str())
            .ok_or_else(|| StateError::NoPrimary(key.to_string()))
    }
}

/// Network resource IDs injected into the kops template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkIds {
    #[serde(rename = "VPCID")]
    pub vpc_id: String,
    #[serde(rename = "PublicNATGatewayID")]
    pub nat_gateway_id: String,
    #[serde(rename = "NodeSubnetID")]
    pub node_subnet_id: String,
    #[serde(rename = "PublicSubnetID")]
    pub public_subnet_id: String,
}

impl NetworkIds {
    /// Look up the four network resources for `short_name` in `region` + `az`.
    ///
    /// # Errors
    ///
    /// Returns a [`StateError`] naming the first resource that is missing.
    pub fn extract(
        state: &TerraformState,
        short_name: &str,
        region: &str,
        az: &str,
    ) -> Result<Self, StateError> {
        let zone = format!("{region}{az}");

        let ids = Self {
            vpc_id: state.primary_id(&format!("aws_vpc.{short_name}"))?.to_string(),
            nat_gateway_id: state
                .primary_id(&format!("aws_nat_gateway.public-{zone}"))?
                .to_string(),
            node_subnet_id: state
                .primary_id(&format!("aws_subnet.nodes-{zone}"))?
                .to_string(),
            public_subnet_id: state
                .primary_id(&format!("aws_subnet.public-{zone}"))?
                .to_string(),
        };

        debug!(
            vpc = %ids.vpc_id,
            nat_gateway = %ids.nat_gateway_id,
            node_subnet = %ids.node_subnet_id,
            public_subnet = %ids.public_subnet_id,
            "Extracted network IDs from terraform state"
        );

        Ok(ids)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const STATE: &str = r#"{
        "version": 3,
        "modules": [
            {
                "path": ["root"],
                "resources": {
                    "aws_vpc.test": {
                        "type": "aws_vpc",
                        "primary": { "id": "test-vpc-id", "attributes": {} }
                    },
                    "aws_nat_gateway.public-eu-west-2a": {
                        "primary": { "id": "test-nat-gateway-id" }
                    },
                    "aws_subnet.nodes-eu-west-2a": {
                        "primary": { "id": "test-nodes-subnet-id" }
                    },
                    "aws_subnet.public-eu-west-2a": {
                        "primary": { "id": "test-public-subnet-id" }
                    }
                }
            }
        ]
    }"#;

    #[test]
    fn test_extract_network_ids() {
        let state = TerraformState::from_json(STATE).unwrap();
        let ids = NetworkIds::extract(&state, "test", "eu-west-2", "a").unwrap();

        assert_eq!(
            ids,
            NetworkIds {
                vpc_id: "test-vpc-id".into(),
                nat_gateway_id: "test-nat-gateway-id".into(),
                node_subnet_id: "test-nodes-subnet-id".into(),
                public_subnet_id: "test-public-subnet-id".into(),
            }
        );
    }

    #[test]
    fn test_missing_resource_is_named() {
        let state = TerraformState::from_json(STATE).unwrap();
        let err = NetworkIds::extract(&state, "test", "eu-west-2", "b").unwrap_err();

        assert!(matches!(
            err,
            StateError::MissingResource(ref key) if key == "aws_nat_gateway.public-eu-west-2b"
        ));
    }

    #[test]
    fn test_wrong_short_name() {
        let state = TerraformState::from_json(STATE).unwrap();
        let err = NetworkIds::extract(&state, "prod", "eu-west-2", "a").unwrap_err();
        assert_eq!(
            err.to_string(),
            "resource 'aws_vpc.prod' not found in terraform state"
        );
    }

    #[test]
    fn test_empty_state_has_no_modules() {
        let state = TerraformState::from_json("{}").unwrap();
        let err = state.primary_id("aws_vpc.test").unwrap_err();
        assert!(matches!(err, StateError::NoModules));
    }

    #[test]
    fn test_resource_without_primary() {
        let state = TerraformState::from_json(
            r#"{"modules": [{"resources": {"aws_vpc.test": {"deposed": []}}}]}"#,
        )
        .unwrap();
        let err = state.primary_id("aws_vpc.test").unwrap_err();
        assert!(matches!(err, StateError::NoPrimary(_)));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            TerraformState::from_json("not json"),
            Err(StateError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = TerraformState::load(&dir.path().join("terraform.tfstate")).unwrap_err();
        assert!(matches!(err, StateError::Read { .. }));
    }
}
