//! stackcfg core
//!
//! Two cooperating pieces for a multi-tier cloud deployment:
//!
//! - the component graph builder ([`graph`]) decides which infrastructure
//!   components exist for a deployment and in which order they are built;
//! - the configuration resolver ([`resolver`]) later reads the outputs of
//!   those components, plus one secret, and assembles the installer's
//!   configuration document.
//!
//! Both share the naming model in [`naming`]. Neither reads ambient process
//! state: region, suffix and flags arrive through [`config`].
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use stackcfg_core::{aws, ConfigResolver, ResolveRequest, ResolverSettings};
//! use stackcfg_core::registry::CloudFormationRegistry;
//! use stackcfg_core::secrets::SecretsManagerStore;
//!
//! let sdk = aws::load_sdk_config("us-east-1").await;
//! let resolver = ConfigResolver::new(
//!     Arc::new(CloudFormationRegistry::new(&sdk)),
//!     Arc::new(SecretsManagerStore::new(&sdk)),
//!     ResolverSettings::new("us-east-1"),
//! );
//! let document = resolver.resolve(&ResolveRequest::new("Staging")).await?;
//! ```

pub mod error;
pub mod naming;
pub mod types;
pub mod logging;
pub mod config;
pub mod graph;
pub mod registry;
pub mod secrets;
pub mod schema;
pub mod document;
pub mod resolver;
#[cfg(feature = "aws")]
pub mod aws;

// Re-export commonly used types
pub use error::{StackcfgError, StackcfgResult};

pub use naming::{ComponentId, ComponentKind, StackNaming};

pub use types::CancellationToken;

pub use logging::{ConsoleLogger, LogLevel, Logger, NoOpLogger, SharedLogger};

pub use config::{DeploymentConfig, FileConfigSource, ResolverSettings};

pub use graph::{ComponentGraphBuilder, ConstructionPlan, OptionalComponent};

pub use registry::{MemoryOutputRegistry, OutputRegistry, RegistryError};

pub use secrets::{MemorySecretStore, SecretStore, SecretStoreError};

pub use schema::Schema;

pub use document::{ConfigDocument, ConfigValue, TrustAnchor};

pub use resolver::{ConfigResolver, ResolveRequest};
