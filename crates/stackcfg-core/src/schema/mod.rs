//! Versioned configuration schema
//!
//! The schema is data: an ordered table of keys and the rule that fills
//! each one. The resolver walks whatever table it is given, so a new
//! schema version is a new table rather than new control flow.

mod rule;

use std::collections::HashSet;

use once_cell::sync::Lazy;

use crate::error::{StackcfgError, StackcfgResult};
use crate::naming::ComponentKind;

pub use rule::Rule;

/// `apiVersion` of the emitted document
pub const API_VERSION: &str = "kots.io/v1beta1";

/// `kind` of the emitted document
pub const KIND: &str = "ConfigValues";

/// One schema key and its rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEntry {
    pub key: &'static str,
    pub rule: Rule,
}

impl SchemaEntry {
    pub const fn new(key: &'static str, rule: Rule) -> Self {
        Self { key, rule }
    }

    /// Whether the value must be emitted as a plaintext secret
    pub fn is_plaintext_secret(&self) -> bool {
        matches!(self.rule, Rule::Secret { .. })
    }
}

/// Ordered, versioned list of configuration keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    version: &'static str,
    entries: Vec<SchemaEntry>,
}

impl Schema {
    pub fn new(version: &'static str, entries: Vec<SchemaEntry>) -> Self {
        Self { version, entries }
    }

    /// The built-in schema
    pub fn v1() -> &'static Schema {
        &SCHEMA_V1
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn entries(&self) -> &[SchemaEntry] {
        &self.entries
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.key)
    }

    pub fn entry(&self, key: &str) -> Option<&SchemaEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Components the schema reads outputs from
    pub fn components(&self) -> Vec<ComponentKind> {
        let mut kinds: Vec<_> = self.entries.iter().filter_map(|e| e.rule.component()).collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }

    /// Reject duplicate keys and derivations that read a key not defined earlier
    pub fn validate(&self) -> StackcfgResult<()> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if let Rule::Derived { source, .. } = &entry.rule {
                if !seen.contains(source) {
                    return Err(StackcfgError::configuration(format!(
                        "schema {}: {} derives from {}, which is not defined before it",
                        self.version, entry.key, source
                    )));
                }
            }
            if !seen.insert(entry.key) {
                return Err(StackcfgError::configuration(format!(
                    "schema {}: duplicate key {}",
                    self.version, entry.key
                )));
            }
        }
        Ok(())
    }
}

static SCHEMA_V1: Lazy<Schema> = Lazy::new(|| {
    use ComponentKind::*;

    Schema::new(
        "v1",
        vec![
            SchemaEntry::new("hostname", Rule::required(Certificate, "DomainName")),
            SchemaEntry::new("certificate_type", Rule::Constant("certificate_type_acm")),
            SchemaEntry::new("acm_arn", Rule::required(Certificate, "CertificateArn")),
            SchemaEntry::new(
                "ingress_controller_service_type",
                Rule::Constant("ingress_controller_service_type_clusterip"),
            ),
            SchemaEntry::new(
                "ingress_controller_target_group_binding_arn",
                Rule::required(LoadBalancer, "AlbTargetGroupArn"),
            ),
            SchemaEntry::new("pinned_certificate_enabled", Rule::Constant("1")),
            SchemaEntry::new(
                "pinned_certificate",
                Rule::TrustAnchor {
                    filename: "pinned-cert.pem",
                },
            ),
            SchemaEntry::new("mysql_host", Rule::required(Database, "DatabaseEndpoint")),
            SchemaEntry::new("mysql_reader_host", Rule::with_default(Database, "DatabaseEndpointRO", "")),
            SchemaEntry::new("mysql_user", Rule::Constant("admin")),
            SchemaEntry::new(
                "mysql_password",
                Rule::Secret {
                    component: Database,
                    output: "DatabaseSecretArn",
                    field: "password",
                },
            ),
            SchemaEntry::new("s3_bucket", Rule::required(Storage, "UploadBucketName")),
            SchemaEntry::new("s3_region", Rule::Region),
            SchemaEntry::new("s3_endpoint", Rule::RegionTemplate("s3.{region}.amazonaws.com")),
            SchemaEntry::new("fileproxy_service_account_name", Rule::Constant("fileproxy")),
            SchemaEntry::new(
                "cluster_autoscaler_enabled",
                Rule::with_default(Cluster, "ClusterAutoscalerEnabled", "0"),
            ),
            SchemaEntry::new(
                "cluster_autoscaler_service_account",
                Rule::Derived {
                    source: "cluster_autoscaler_enabled",
                    equals: "1",
                    then: "cluster-autoscaler",
                    otherwise: "",
                },
            ),
            SchemaEntry::new("cluster_name", Rule::required(Cluster, "WickrEnterpriseEksClusterName")),
            SchemaEntry::new("cluster_aws_region", Rule::Region),
            SchemaEntry::new("cluster_cloud_provider", Rule::Constant("cluster_cloud_provider_aws")),
        ],
    )
});
