//! Core traits and types for secret lookup

use async_trait::async_trait;
use thiserror::Error;

use crate::error::StackcfgError;

/// Errors that can occur while fetching a secret
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SecretStoreError {
    #[error("Secret not found: {0}")]
    NotFound(String),

    #[error("Secret {location} unavailable: {reason}")]
    Unavailable { location: String, reason: String },
}

impl SecretStoreError {
    pub fn unavailable(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            location: location.into(),
            reason: reason.into(),
        }
    }
}

pub type SecretStoreResult<T> = Result<T, SecretStoreError>;

impl From<SecretStoreError> for StackcfgError {
    fn from(err: SecretStoreError) -> Self {
        match err {
            SecretStoreError::NotFound(location) => {
                StackcfgError::secret_unavailable(location, "secret not found")
            }
            SecretStoreError::Unavailable { location, reason } => {
                StackcfgError::secret_unavailable(location, reason)
            }
        }
    }
}

/// Read-only secret store
///
/// Secrets are addressed by a location identifier (an ARN for Secrets
/// Manager) that is itself usually obtained from a component output.
///
/// Implementations:
/// - `MemorySecretStore`: in-memory, for tests and dry runs
/// - `SecretsManagerStore`: AWS Secrets Manager (`aws` feature)
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Human-readable name of this store
    fn name(&self) -> &str;

    /// Fetch the raw secret string stored at `location`
    async fn get_secret(&self, location: &str) -> SecretStoreResult<String>;
}
