//! Deployment configuration record

use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

use crate::naming::{StackNaming, DEFAULT_NAME_PREFIX};
use super::versions::DEFAULT_CLUSTER_VERSION;

/// Parse a loosely typed boolean setting
///
/// Only `"true"` (any case, surrounding whitespace ignored) is true.
pub fn parse_boolean(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case("true")
}

fn lenient_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum BoolOrString {
        Bool(bool),
        Str(String),
    }

    Ok(match BoolOrString::deserialize(deserializer)? {
        BoolOrString::Bool(b) => b,
        BoolOrString::Str(s) => parse_boolean(&s),
    })
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Feature flags, instance suffix and pass-through imports for one deployment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentConfig {
    /// Deployment-instance qualifier appended to every stack name
    pub stack_suffix: String,
    /// Prefix shared by every stack name
    pub name_prefix: String,
    /// Requested cluster runtime version
    pub cluster_version: String,
    /// Public domain served by the deployment
    pub domain: Option<String>,
    pub hosted_zone_id: Option<String>,
    pub hosted_zone_name: Option<String>,
    /// Existing certificate to use instead of issuing one
    pub imported_certificate_arn: Option<String>,
    /// Existing network to use instead of creating one
    pub imported_vpc_id: Option<String>,
    /// Existing encryption key to use instead of creating one
    pub imported_kms_key_arn: Option<String>,
    /// Provision the secondary load balancer for real-time traffic
    #[serde(deserialize_with = "lenient_bool")]
    pub enable_calling_ingress: bool,
    /// Deploy the application once the cluster is ready
    #[serde(deserialize_with = "lenient_bool")]
    pub auto_deploy: bool,
    /// Enable the cluster autoscaler
    #[serde(deserialize_with = "lenient_bool")]
    pub enable_autoscaler: bool,
    /// Application license, required by the installer bootstrap
    pub license_path: Option<PathBuf>,
    /// Trust anchor shipped to the installer bootstrap
    pub ca_path: Option<PathBuf>,
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            stack_suffix: String::new(),
            name_prefix: DEFAULT_NAME_PREFIX.to_string(),
            cluster_version: DEFAULT_CLUSTER_VERSION.to_string(),
            domain: None,
            hosted_zone_id: None,
            hosted_zone_name: None,
            imported_certificate_arn: None,
            imported_vpc_id: None,
            imported_kms_key_arn: None,
            enable_calling_ingress: false,
            auto_deploy: true,
            enable_autoscaler: false,
            license_path: None,
            ca_path: None,
        }
    }
}

impl DeploymentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.stack_suffix = suffix.into();
        self
    }

    pub fn with_cluster_version(mut self, version: impl Into<String>) -> Self {
        self.cluster_version = version.into();
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_hosted_zone(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.hosted_zone_id = Some(id.into());
        self.hosted_zone_name = Some(name.into());
        self
    }

    pub fn with_calling_ingress(mut self, enabled: bool) -> Self {
        self.enable_calling_ingress = enabled;
        self
    }

    pub fn with_auto_deploy(mut self, enabled: bool) -> Self {
        self.auto_deploy = enabled;
        self
    }

    pub fn with_autoscaler(mut self, enabled: bool) -> Self {
        self.enable_autoscaler = enabled;
        self
    }

    pub fn with_license_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.license_path = Some(path.into());
        self
    }

    pub fn with_imported_vpc(mut self, vpc_id: impl Into<String>) -> Self {
        self.imported_vpc_id = Some(vpc_id.into());
        self
    }

    pub fn with_imported_kms_key(mut self, arn: impl Into<String>) -> Self {
        self.imported_kms_key_arn = Some(arn.into());
        self
    }

    pub fn with_imported_certificate(mut self, arn: impl Into<String>) -> Self {
        self.imported_certificate_arn = Some(arn.into());
        self
    }

    /// Naming for this deployment's stacks
    pub fn naming(&self) -> StackNaming {
        StackNaming::with_prefix(self.name_prefix.clone(), self.stack_suffix.clone())
    }

    pub fn domain(&self) -> Option<&str> {
        non_empty(&self.domain)
    }

    /// Hosted zone `(id, name)`, only when both halves are set
    pub fn hosted_zone(&self) -> Option<(&str, &str)> {
        Some((non_empty(&self.hosted_zone_id)?, non_empty(&self.hosted_zone_name)?))
    }

    pub fn imported_vpc_id(&self) -> Option<&str> {
        non_empty(&self.imported_vpc_id)
    }

    pub fn imported_kms_key_arn(&self) -> Option<&str> {
        non_empty(&self.imported_kms_key_arn)
    }

    pub fn imported_certificate_arn(&self) -> Option<&str> {
        non_empty(&self.imported_certificate_arn)
    }
}
