//! AWS Secrets Manager secret store

use async_trait::async_trait;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use aws_sdk_secretsmanager::Client;

use super::traits::{SecretStore, SecretStoreError, SecretStoreResult};

/// Secret store backed by `GetSecretValue`
pub struct SecretsManagerStore {
    client: Client,
}

impl SecretsManagerStore {
    pub fn new(sdk_config: &aws_config::SdkConfig) -> Self {
        Self {
            client: Client::new(sdk_config),
        }
    }
}

#[async_trait]
impl SecretStore for SecretsManagerStore {
    fn name(&self) -> &str {
        "secretsmanager"
    }

    async fn get_secret(&self, location: &str) -> SecretStoreResult<String> {
        let response = self
            .client
            .get_secret_value()
            .secret_id(location)
            .send()
            .await
            .map_err(|err| SecretStoreError::unavailable(location, DisplayErrorContext(&err).to_string()))?;

        // Binary secrets are not used by any schema entry
        response
            .secret_string()
            .map(str::to_string)
            .ok_or_else(|| SecretStoreError::unavailable(location, "secret has no string value"))
    }
}
