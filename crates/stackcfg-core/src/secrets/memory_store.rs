//! In-memory secret store

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// In-memory secret store for testing and dry runs
///
/// # Example
///
/// ```
/// use stackcfg_core::secrets::MemorySecretStore;
///
/// let store = MemorySecretStore::new();
/// store.insert("arn:aws:secretsmanager:us-east-1:1:secret:db", r#"{"password":"pw"}"#);
/// assert_eq!(store.len(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: RwLock<HashMap<String, String>>,
}

impl MemorySecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a memory store with initial values
    pub fn with_secrets(initial: HashMap<String, String>) -> Self {
        Self {
            secrets: RwLock::new(initial),
        }
    }

    pub fn with_secret(self, location: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(location, value);
        self
    }

    pub fn insert(&self, location: impl Into<String>, value: impl Into<String>) {
        self.secrets.write().insert(location.into(), value.into());
    }

    /// Replace a value, as an external rotation would
    pub fn rotate(&self, location: &str, value: impl Into<String>) -> SecretStoreResult<()> {
        match self.secrets.write().get_mut(location) {
            Some(slot) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(SecretStoreError::NotFound(location.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.secrets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SecretStore for MemorySecretStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get_secret(&self, location: &str) -> SecretStoreResult<String> {
        self.secrets
            .read()
            .get(location)
            .cloned()
            .ok_or_else(|| SecretStoreError::NotFound(location.to_string()))
    }
}

impl Clone for MemorySecretStore {
    fn clone(&self) -> Self {
        Self::with_secrets(self.secrets.read().clone())
    }
}
