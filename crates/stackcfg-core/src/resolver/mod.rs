//! Configuration resolution
//!
//! Produces the installer-facing [`ConfigDocument`](crate::document::ConfigDocument)
//! by reading outputs of already-provisioned components and one secret.

mod config_resolver;
mod secret;

pub use config_resolver::{ConfigResolver, ResolveRequest};
