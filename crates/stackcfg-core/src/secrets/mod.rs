//! Secret store clients
//!
//! - `SecretStore` trait for implementing custom stores
//! - Built-in implementations: `MemorySecretStore`, `SecretsManagerStore` (`aws` feature)

mod traits;
mod memory_store;
#[cfg(feature = "aws")]
mod secrets_manager;

pub use traits::{SecretStore, SecretStoreError, SecretStoreResult};
pub use memory_store::MemorySecretStore;
#[cfg(feature = "aws")]
pub use secrets_manager::SecretsManagerStore;
