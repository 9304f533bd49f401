//! Supported cluster runtime versions

use serde::Serialize;

/// Version used when the deployment does not pick one
pub const DEFAULT_CLUSTER_VERSION: &str = "1.30";

/// Pinned component versions for one supported cluster runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterVersion {
    pub version: &'static str,
    pub kubernetes_version: &'static str,
    pub alb_controller_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_group_release_version: Option<&'static str>,
}

const ALB_CONTROLLER: &str = "v2.8.2";
const NODE_GROUP_RELEASE: Option<&str> = Some("1.30.0-ca9b9399");

pub const SUPPORTED: &[ClusterVersion] = &[
    ClusterVersion {
        version: "1.27",
        kubernetes_version: "1.27",
        alb_controller_version: ALB_CONTROLLER,
        node_group_release_version: NODE_GROUP_RELEASE,
    },
    ClusterVersion {
        version: "1.28",
        kubernetes_version: "1.28",
        alb_controller_version: ALB_CONTROLLER,
        node_group_release_version: NODE_GROUP_RELEASE,
    },
    ClusterVersion {
        version: "1.29",
        kubernetes_version: "1.29",
        alb_controller_version: ALB_CONTROLLER,
        node_group_release_version: NODE_GROUP_RELEASE,
    },
    ClusterVersion {
        version: "1.30",
        kubernetes_version: "1.30",
        alb_controller_version: ALB_CONTROLLER,
        node_group_release_version: NODE_GROUP_RELEASE,
    },
    ClusterVersion {
        version: "1.31",
        kubernetes_version: "1.31",
        alb_controller_version: ALB_CONTROLLER,
        node_group_release_version: NODE_GROUP_RELEASE,
    },
];

/// Look up a supported version
pub fn lookup(version: &str) -> Option<&'static ClusterVersion> {
    SUPPORTED.iter().find(|v| v.version == version)
}

/// All supported version strings
pub fn supported_versions() -> Vec<&'static str> {
    SUPPORTED.iter().map(|v| v.version).collect()
}
