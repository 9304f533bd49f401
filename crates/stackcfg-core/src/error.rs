//! Crate-level error taxonomy
//!
//! Every error is terminal for the current invocation. Nothing is retried
//! internally; callers re-run planning or resolution as a whole.

use thiserror::Error;

/// Errors surfaced by planning and resolution
#[derive(Error, Debug)]
pub enum StackcfgError {
    /// Invalid or unsupported deployment parameter, detected before any work starts
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The target component is not provisioned where we looked
    #[error(
        "Stack {component} not found in {region}. Set the AWS_REGION environment variable \
         if this region is incorrect, or pass a suffix with --stack-suffix."
    )]
    ComponentNotFound { component: String, region: String },

    /// The component exists but does not expose the requested output
    #[error("Output key \"{key}\" not found in stack \"{component}\"")]
    RequiredValueMissing { component: String, key: String },

    /// The secret location resolved but the secret itself could not be read
    #[error("Secret {location} unavailable: {reason}")]
    SecretUnavailable { location: String, reason: String },

    /// The output registry could not be reached
    #[error("Output registry unavailable for stack {component}: {reason}")]
    RegistryUnavailable { component: String, reason: String },

    /// Caller aborted or the deadline elapsed
    #[error("Resolution cancelled: {0}")]
    Cancelled(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StackcfgError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a component-not-found error
    pub fn component_not_found(component: impl Into<String>, region: impl Into<String>) -> Self {
        Self::ComponentNotFound {
            component: component.into(),
            region: region.into(),
        }
    }

    /// Create a required-value-missing error
    pub fn required_value_missing(component: impl Into<String>, key: impl Into<String>) -> Self {
        Self::RequiredValueMissing {
            component: component.into(),
            key: key.into(),
        }
    }

    /// Create a secret-unavailable error
    pub fn secret_unavailable(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SecretUnavailable {
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// Create a cancellation error
    pub fn cancelled(reason: impl Into<String>) -> Self {
        Self::Cancelled(reason.into())
    }

    /// Whether this error aborted a resolution on behalf of the caller
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

impl From<serde_json::Error> for StackcfgError {
    fn from(err: serde_json::Error) -> Self {
        StackcfgError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for StackcfgError {
    fn from(err: serde_yaml::Error) -> Self {
        StackcfgError::Serialization(err.to_string())
    }
}

pub type StackcfgResult<T> = Result<T, StackcfgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_not_found_carries_hint() {
        let err = StackcfgError::component_not_found("WickrRdsDev", "eu-west-1");
        let message = err.to_string();
        assert!(message.contains("WickrRdsDev"));
        assert!(message.contains("eu-west-1"));
        assert!(message.contains("AWS_REGION"));
        assert!(message.contains("--stack-suffix"));
    }

    #[test]
    fn test_required_value_missing_message() {
        let err = StackcfgError::required_value_missing("WickrAcm", "DomainName");
        assert_eq!(
            err.to_string(),
            "Output key \"DomainName\" not found in stack \"WickrAcm\""
        );
    }

    #[test]
    fn test_cancelled() {
        assert!(StackcfgError::cancelled("timed out").is_cancelled());
        assert!(!StackcfgError::configuration("bad").is_cancelled());
    }
}
