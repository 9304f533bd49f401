//! Component naming model
//!
//! Every provisioned component is addressed by a stack identity built from a
//! deployment-wide prefix, the component's stable base name and the instance
//! suffix: `{prefix}{base}{suffix}`, e.g. `WickrRdsStaging`.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Default prefix shared by every stack of a deployment
pub const DEFAULT_NAME_PREFIX: &str = "Wickr";

/// The fixed set of infrastructure components a deployment is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    /// Encryption key
    EncryptionKey,
    /// Upload storage bucket
    Storage,
    /// Network (VPC)
    Network,
    /// TLS certificate
    Certificate,
    /// Primary (application) load balancer
    LoadBalancer,
    /// Secondary load balancer for real-time (calling) traffic
    CallingLoadBalancer,
    /// Database cluster
    Database,
    /// Container cluster
    Cluster,
    /// Installer bootstrap function
    InstallerBootstrap,
}

impl ComponentKind {
    /// All kinds, in declaration order
    pub const ALL: [ComponentKind; 9] = [
        ComponentKind::EncryptionKey,
        ComponentKind::Storage,
        ComponentKind::Network,
        ComponentKind::Certificate,
        ComponentKind::LoadBalancer,
        ComponentKind::CallingLoadBalancer,
        ComponentKind::Database,
        ComponentKind::Cluster,
        ComponentKind::InstallerBootstrap,
    ];

    /// Stable logical identifier used in stack names
    pub fn base_name(&self) -> &'static str {
        match self {
            ComponentKind::EncryptionKey => "Kms",
            ComponentKind::Storage => "S3",
            ComponentKind::Network => "Vpc",
            ComponentKind::Certificate => "Acm",
            ComponentKind::LoadBalancer => "Alb",
            ComponentKind::CallingLoadBalancer => "Nlb",
            ComponentKind::Database => "Rds",
            ComponentKind::Cluster => "Eks",
            ComponentKind::InstallerBootstrap => "Lambda",
        }
    }

    /// Whether the component only exists when a feature flag enables it
    pub fn is_optional(&self) -> bool {
        matches!(
            self,
            ComponentKind::CallingLoadBalancer | ComponentKind::InstallerBootstrap
        )
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.base_name())
    }
}

/// Identity of one provisioned component
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ComponentId {
    kind: ComponentKind,
    prefix: String,
    suffix: String,
}

impl ComponentId {
    pub fn new(kind: ComponentKind, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            kind,
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    pub fn kind(&self) -> ComponentKind {
        self.kind
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Stack-style identity used by the output registry
    pub fn stack_name(&self) -> String {
        format!("{}{}{}", self.prefix, self.kind.base_name(), self.suffix)
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stack_name())
    }
}

/// Builds component identities for one deployment instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackNaming {
    prefix: String,
    suffix: String,
}

impl StackNaming {
    /// Naming with the default prefix
    pub fn new(suffix: impl Into<String>) -> Self {
        Self::with_prefix(DEFAULT_NAME_PREFIX, suffix)
    }

    pub fn with_prefix(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    pub fn component(&self, kind: ComponentKind) -> ComponentId {
        ComponentId::new(kind, self.prefix.clone(), self.suffix.clone())
    }
}

impl Default for StackNaming {
    fn default() -> Self {
        Self::new("")
    }
}
