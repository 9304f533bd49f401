//! Deployment configuration
//!
//! Everything the planner and resolver need is passed in explicitly through
//! these types; nothing in the library reads process-wide state on its own.
//!
//! - `DeploymentConfig`: feature flags, instance suffix and pass-through imports
//! - `ResolverSettings`: region and lookup limits for the configuration resolver
//! - `FileConfigSource`: YAML file holding both (user-level or explicit path)
//! - `versions`: supported cluster runtime versions

mod traits;
mod deployment;
mod settings;
mod file;
pub mod versions;

pub use traits::{ConfigError, ConfigResult};
pub use deployment::{parse_boolean, DeploymentConfig};
pub use settings::{resolve_region, resolve_region_with, ResolverSettings, DEFAULT_REGION};
pub use file::{ConfigFile, FileConfigSource, ResolverOptions};
pub use versions::{ClusterVersion, DEFAULT_CLUSTER_VERSION};
