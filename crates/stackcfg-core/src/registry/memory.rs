//! In-memory output registry

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::naming::ComponentId;
use super::traits::{OutputRegistry, RegistryError, RegistryResult};

/// Output registry backed by a map of stack name to outputs
///
/// Used by tests and offline dry runs. An optional latency makes every
/// lookup sleep first, which is handy for exercising cancellation.
///
/// # Example
///
/// ```
/// use stackcfg_core::registry::MemoryOutputRegistry;
///
/// let registry = MemoryOutputRegistry::new("us-east-1")
///     .with_component("WickrAcm", [("DomainName", "chat.example.com")]);
/// assert_eq!(registry.component_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct MemoryOutputRegistry {
    region: String,
    stacks: RwLock<HashMap<String, HashMap<String, String>>>,
    latency: Option<Duration>,
    lookups: AtomicUsize,
}

impl MemoryOutputRegistry {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Self::default()
        }
    }

    /// Register a component with its outputs
    pub fn with_component<K, V>(self, stack_name: impl Into<String>, outputs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.insert_component(stack_name, outputs);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn insert_component<K, V>(&self, stack_name: impl Into<String>, outputs: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        let outputs = outputs.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self.stacks.write().insert(stack_name.into(), outputs);
    }

    pub fn set_output(&self, stack_name: &str, key: impl Into<String>, value: impl Into<String>) {
        self.stacks
            .write()
            .entry(stack_name.to_string())
            .or_default()
            .insert(key.into(), value.into());
    }

    pub fn remove_component(&self, stack_name: &str) {
        self.stacks.write().remove(stack_name);
    }

    pub fn component_count(&self) -> usize {
        self.stacks.read().len()
    }

    /// Number of lookups served so far
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OutputRegistry for MemoryOutputRegistry {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get_output(&self, component: &ComponentId, key: &str) -> RegistryResult<String> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        let stacks = self.stacks.read();
        let outputs = stacks
            .get(&component.stack_name())
            .ok_or_else(|| RegistryError::component_not_found(component, self.region.clone()))?;
        outputs
            .get(key)
            .cloned()
            .ok_or_else(|| RegistryError::output_not_found(component, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::{ComponentKind, StackNaming};

    fn registry() -> MemoryOutputRegistry {
        MemoryOutputRegistry::new("eu-west-1")
            .with_component("WickrEksDev", [("WickrEnterpriseEksClusterName", "wickr-dev")])
    }

    #[tokio::test]
    async fn test_get_output() {
        let eks = StackNaming::new("Dev").component(ComponentKind::Cluster);
        let value = registry().get_output(&eks, "WickrEnterpriseEksClusterName").await.unwrap();
        assert_eq!(value, "wickr-dev");
    }

    #[tokio::test]
    async fn test_missing_output_and_component() {
        let registry = registry();
        let naming = StackNaming::new("Dev");

        let err = registry
            .get_output(&naming.component(ComponentKind::Cluster), "Nope")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::OutputNotFound {
                component: "WickrEksDev".to_string(),
                key: "Nope".to_string()
            }
        );

        let err = registry
            .get_output(&naming.component(ComponentKind::Database), "DatabaseEndpoint")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::ComponentNotFound {
                component: "WickrRdsDev".to_string(),
                region: "eu-west-1".to_string()
            }
        );
        assert_eq!(registry.lookups(), 2);
    }

    #[tokio::test]
    async fn test_default_only_covers_missing_keys() {
        let registry = registry();
        let naming = StackNaming::new("Dev");
        let eks = naming.component(ComponentKind::Cluster);

        let value = registry
            .get_output_or(&eks, "ClusterAutoscalerEnabled", Some("0"))
            .await
            .unwrap();
        assert_eq!(value, "0");

        let present = registry
            .get_output_or(&eks, "WickrEnterpriseEksClusterName", Some("fallback"))
            .await
            .unwrap();
        assert_eq!(present, "wickr-dev");

        let err = registry
            .get_output_or(&naming.component(ComponentKind::Database), "DatabaseEndpointRO", Some(""))
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::ComponentNotFound { .. }));
    }

    #[tokio::test]
    async fn test_mutation_helpers() {
        let registry = registry();
        let eks = StackNaming::new("Dev").component(ComponentKind::Cluster);

        registry.set_output("WickrEksDev", "ClusterAutoscalerEnabled", "1");
        assert_eq!(registry.get_output(&eks, "ClusterAutoscalerEnabled").await.unwrap(), "1");

        registry.remove_component("WickrEksDev");
        assert_eq!(registry.component_count(), 0);
    }
}
