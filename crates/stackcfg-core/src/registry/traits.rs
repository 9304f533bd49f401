//! Output registry trait and errors

use async_trait::async_trait;
use thiserror::Error;

use crate::error::StackcfgError;
use crate::naming::ComponentId;

/// Errors returned by an output registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The component is not provisioned in the queried region
    #[error("Stack {component} not found in {region}")]
    ComponentNotFound { component: String, region: String },

    /// The component exists but has no such output
    #[error("Output key \"{key}\" not found in stack \"{component}\"")]
    OutputNotFound { component: String, key: String },

    /// The registry could not answer
    #[error("Registry unavailable for {component}: {reason}")]
    Unavailable { component: String, reason: String },
}

impl RegistryError {
    pub fn component_not_found(component: &ComponentId, region: impl Into<String>) -> Self {
        Self::ComponentNotFound {
            component: component.stack_name(),
            region: region.into(),
        }
    }

    pub fn output_not_found(component: &ComponentId, key: impl Into<String>) -> Self {
        Self::OutputNotFound {
            component: component.stack_name(),
            key: key.into(),
        }
    }

    pub fn unavailable(component: &ComponentId, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            component: component.stack_name(),
            reason: reason.into(),
        }
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;

impl From<RegistryError> for StackcfgError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::ComponentNotFound { component, region } => {
                StackcfgError::ComponentNotFound { component, region }
            }
            RegistryError::OutputNotFound { component, key } => {
                StackcfgError::RequiredValueMissing { component, key }
            }
            RegistryError::Unavailable { component, reason } => {
                StackcfgError::RegistryUnavailable { component, reason }
            }
        }
    }
}

/// Read-only access to the named outputs of provisioned components
///
/// Lookups are idempotent and side-effect free, so callers may issue them
/// concurrently.
#[async_trait]
pub trait OutputRegistry: Send + Sync {
    /// Human-readable name of this registry
    fn name(&self) -> &str;

    /// Fetch one output value
    async fn get_output(&self, component: &ComponentId, key: &str) -> RegistryResult<String>;

    /// Fetch one output value, falling back to `default` when the key is missing
    ///
    /// A missing component is still an error: the default only covers keys
    /// the component does not expose.
    async fn get_output_or(
        &self,
        component: &ComponentId,
        key: &str,
        default: Option<&str>,
    ) -> RegistryResult<String> {
        match (self.get_output(component, key).await, default) {
            (Err(RegistryError::OutputNotFound { .. }), Some(default)) => Ok(default.to_string()),
            (result, _) => result,
        }
    }
}
