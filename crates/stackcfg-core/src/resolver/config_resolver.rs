//! Configuration resolution against provisioned components
//!
//! Every non-derived schema key is resolved independently, with at most
//! `max_concurrent_lookups` lookups in flight. Results are consumed in
//! schema order, so the first failure reported is always the earliest
//! failing key. Derived keys are then computed in order from the values
//! already resolved; they never trigger another lookup.

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};

use crate::config::ResolverSettings;
use crate::document::{ConfigDocument, ConfigValue, TrustAnchor};
use crate::error::{StackcfgError, StackcfgResult};
use crate::logging::{NoOpLogger, SharedLogger};
use crate::naming::{ComponentId, StackNaming};
use crate::registry::OutputRegistry;
use crate::schema::{Rule, Schema, SchemaEntry};
use crate::secrets::SecretStore;
use crate::types::CancellationToken;
use crate::{log_debug, log_info};
use super::secret::extract_field;

/// What to resolve
#[derive(Debug, Clone, Default)]
pub struct ResolveRequest {
    /// Deployment instance qualifier; empty for the unqualified deployment
    pub instance_suffix: String,
    /// Certificate to pin instead of the bundled one
    pub trust_anchor: Option<TrustAnchor>,
}

impl ResolveRequest {
    pub fn new(instance_suffix: impl Into<String>) -> Self {
        Self {
            instance_suffix: instance_suffix.into(),
            trust_anchor: None,
        }
    }

    pub fn with_trust_anchor(mut self, anchor: TrustAnchor) -> Self {
        self.trust_anchor = Some(anchor);
        self
    }
}

/// Builds the installer configuration document
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use stackcfg_core::config::ResolverSettings;
/// use stackcfg_core::registry::MemoryOutputRegistry;
/// use stackcfg_core::resolver::{ConfigResolver, ResolveRequest};
/// use stackcfg_core::secrets::MemorySecretStore;
///
/// # async fn run() -> stackcfg_core::StackcfgResult<()> {
/// let resolver = ConfigResolver::new(
///     Arc::new(MemoryOutputRegistry::new("us-east-1")),
///     Arc::new(MemorySecretStore::new()),
///     ResolverSettings::new("us-east-1"),
/// );
/// let document = resolver.resolve(&ResolveRequest::new("Staging")).await?;
/// println!("{}", document.to_json()?);
/// # Ok(())
/// # }
/// ```
pub struct ConfigResolver {
    registry: Arc<dyn OutputRegistry>,
    secrets: Arc<dyn SecretStore>,
    schema: Schema,
    settings: ResolverSettings,
    logger: SharedLogger,
}

impl ConfigResolver {
    /// Resolver for the built-in schema
    pub fn new(
        registry: Arc<dyn OutputRegistry>,
        secrets: Arc<dyn SecretStore>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            registry,
            secrets,
            schema: Schema::v1().clone(),
            settings,
            logger: Arc::new(NoOpLogger),
        }
    }

    /// Swap in another schema version; it is validated first
    pub fn with_schema(mut self, schema: Schema) -> StackcfgResult<Self> {
        schema.validate()?;
        self.schema = schema;
        Ok(self)
    }

    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Resolve the whole document
    pub async fn resolve(&self, request: &ResolveRequest) -> StackcfgResult<ConfigDocument> {
        self.resolve_with_cancel(request, &CancellationToken::new()).await
    }

    /// Resolve the whole document, aborting when `token` is cancelled or the
    /// configured timeout elapses
    pub async fn resolve_with_cancel(
        &self,
        request: &ResolveRequest,
        token: &CancellationToken,
    ) -> StackcfgResult<ConfigDocument> {
        let timeout = self.settings.timeout;
        let work = async {
            match timeout {
                Some(limit) => tokio::time::timeout(limit, self.run(request))
                    .await
                    .map_err(|_| StackcfgError::cancelled(format!("timed out after {:?}", limit)))?,
                None => self.run(request).await,
            }
        };

        let result = tokio::select! {
            biased;
            reason = token.cancelled() => Err(StackcfgError::cancelled(reason)),
            result = work => result,
        };

        if let Err(err) = &result {
            log_debug!(self.logger, "Resolution failed: {}", err);
        }
        result
    }

    async fn run(&self, request: &ResolveRequest) -> StackcfgResult<ConfigDocument> {
        let naming = StackNaming::with_prefix(self.settings.name_prefix.clone(), request.instance_suffix.clone());
        let anchor = request.trust_anchor.clone().unwrap_or_default();

        log_info!(
            self.logger,
            "Resolving schema {} for suffix {:?} in {} via {}",
            self.schema.version(),
            request.instance_suffix,
            self.settings.region,
            self.registry.name()
        );

        let entries = self.schema.entries();
        let direct: Vec<ConfigValue> = stream::iter(entries.iter().filter(|e| !e.rule.is_derived()))
            .map(|entry| self.resolve_direct(entry, &naming, &anchor))
            .buffered(self.settings.max_concurrent_lookups)
            .try_collect()
            .await?;

        let mut direct = direct.into_iter();
        let mut values: Vec<(String, ConfigValue)> = Vec::with_capacity(entries.len());
        for entry in entries {
            let value = if entry.rule.is_derived() {
                derive(entry, &values)?
            } else {
                direct.next().ok_or_else(|| {
                    StackcfgError::configuration(format!("{} was not resolved", entry.key))
                })?
            };
            values.push((entry.key.to_string(), value));
        }

        log_info!(self.logger, "Resolved {} configuration values", values.len());
        Ok(ConfigDocument::new(values))
    }

    /// Resolve one key that does not depend on other keys
    async fn resolve_direct(
        &self,
        entry: &SchemaEntry,
        naming: &StackNaming,
        anchor: &TrustAnchor,
    ) -> StackcfgResult<ConfigValue> {
        let region = self.settings.region.as_str();
        let value = match &entry.rule {
            Rule::Lookup {
                component,
                output,
                default,
            } => ConfigValue::plain(self.lookup(&naming.component(*component), output, *default).await?),
            Rule::Constant(value) => ConfigValue::plain(*value),
            Rule::Region => ConfigValue::plain(region),
            Rule::RegionTemplate(template) => ConfigValue::plain(template.replace("{region}", region)),
            Rule::Secret {
                component,
                output,
                field,
            } => {
                let location = self.lookup(&naming.component(*component), output, None).await?;
                log_debug!(self.logger, "Fetching secret for {} from {}", entry.key, self.secrets.name());
                let payload = self.secrets.get_secret(&location).await?;
                ConfigValue::plaintext_secret(extract_field(&location, &payload, field)?)
            }
            Rule::TrustAnchor { filename } => ConfigValue::file(*filename, anchor.as_bytes()),
            Rule::Derived { source, .. } => {
                return Err(StackcfgError::configuration(format!(
                    "{} derives from {} and cannot be looked up",
                    entry.key, source
                )))
            }
        };
        Ok(value)
    }

    async fn lookup(&self, component: &ComponentId, output: &str, default: Option<&str>) -> StackcfgResult<String> {
        log_debug!(self.logger, "Looking up {}.{}", component, output);
        Ok(self.registry.get_output_or(component, output, default).await?)
    }
}

/// Evaluate a derived key from values resolved earlier in schema order
fn derive(entry: &SchemaEntry, resolved: &[(String, ConfigValue)]) -> StackcfgResult<ConfigValue> {
    let Rule::Derived {
        source,
        equals,
        then,
        otherwise,
    } = &entry.rule
    else {
        return Err(StackcfgError::configuration(format!("{} is not a derived key", entry.key)));
    };

    let source_value = resolved
        .iter()
        .find(|(key, _)| key == source)
        .map(|(_, value)| value.as_str())
        .ok_or_else(|| {
            StackcfgError::configuration(format!("{} derives from unresolved key {}", entry.key, source))
        })?;

    Ok(ConfigValue::plain(if source_value == *equals { *then } else { *otherwise }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;

    use crate::registry::{MemoryOutputRegistry, RegistryError, RegistryResult};
    use crate::secrets::{MemorySecretStore, SecretStoreError, SecretStoreResult};

    const SECRET_ARN: &str = "arn:aws:secretsmanager:us-east-1:111:secret:wickr-db";

    fn registry(suffix: &str) -> MemoryOutputRegistry {
        MemoryOutputRegistry::new("us-east-1")
            .with_component(
                format!("WickrAcm{suffix}"),
                [
                    ("DomainName", "chat.example.com"),
                    ("CertificateArn", "arn:aws:acm:us-east-1:111:certificate/abc"),
                ],
            )
            .with_component(
                format!("WickrAlb{suffix}"),
                [("AlbTargetGroupArn", "arn:aws:elasticloadbalancing:us-east-1:111:targetgroup/tg")],
            )
            .with_component(
                format!("WickrRds{suffix}"),
                [
                    ("DatabaseEndpoint", "db.cluster-abc.us-east-1.rds.amazonaws.com"),
                    ("DatabaseSecretArn", SECRET_ARN),
                ],
            )
            .with_component(format!("WickrS3{suffix}"), [("UploadBucketName", "wickr-uploads")])
            .with_component(
                format!("WickrEks{suffix}"),
                [("WickrEnterpriseEksClusterName", "wickr-eks")],
            )
    }

    fn secrets() -> MemorySecretStore {
        MemorySecretStore::new().with_secret(SECRET_ARN, r#"{"username":"admin","password":"s3cret"}"#)
    }

    /// Registry whose transport fails for one output key
    struct FailingRegistry {
        inner: MemoryOutputRegistry,
        failing_key: &'static str,
    }

    #[async_trait]
    impl OutputRegistry for FailingRegistry {
        fn name(&self) -> &str {
            "failing"
        }

        async fn get_output(&self, component: &ComponentId, key: &str) -> RegistryResult<String> {
            if key == self.failing_key {
                return Err(RegistryError::unavailable(component, "connection reset"));
            }
            self.inner.get_output(component, key).await
        }
    }

    /// Secret store that cannot be reached
    struct UnreachableSecretStore;

    #[async_trait]
    impl SecretStore for UnreachableSecretStore {
        fn name(&self) -> &str {
            "unreachable"
        }

        async fn get_secret(&self, location: &str) -> SecretStoreResult<String> {
            Err(SecretStoreError::unavailable(location, "throttled"))
        }
    }

    #[derive(Default)]
    struct ErrorLog {
        errors: Mutex<Vec<String>>,
        debug: Mutex<Vec<String>>,
    }

    impl crate::logging::Logger for ErrorLog {
        fn debug(&self, message: &str) {
            self.debug.lock().push(message.to_string());
        }
        fn info(&self, _message: &str) {}
        fn warn(&self, _message: &str) {}
        fn error(&self, message: &str) {
            self.errors.lock().push(message.to_string());
        }
    }

    fn resolver(registry: MemoryOutputRegistry, secrets: MemorySecretStore) -> ConfigResolver {
        ConfigResolver::new(Arc::new(registry), Arc::new(secrets), ResolverSettings::new("us-east-1"))
    }

    fn value<'a>(doc: &'a ConfigDocument, key: &str) -> &'a str {
        doc.get(key).map(ConfigValue::as_str).unwrap()
    }

    #[tokio::test]
    async fn test_full_document_without_optional_features() {
        let doc = resolver(registry(""), secrets())
            .resolve(&ResolveRequest::default())
            .await
            .unwrap();

        assert_eq!(doc.api_version(), "kots.io/v1beta1");
        assert_eq!(doc.kind(), "ConfigValues");
        assert_eq!(doc.keys().collect::<Vec<_>>(), Schema::v1().keys().collect::<Vec<_>>());

        assert_eq!(value(&doc, "hostname"), "chat.example.com");
        assert_eq!(value(&doc, "certificate_type"), "certificate_type_acm");
        assert_eq!(value(&doc, "mysql_host"), "db.cluster-abc.us-east-1.rds.amazonaws.com");
        assert_eq!(value(&doc, "mysql_user"), "admin");
        assert_eq!(value(&doc, "s3_region"), "us-east-1");
        assert_eq!(value(&doc, "s3_endpoint"), "s3.us-east-1.amazonaws.com");
        assert_eq!(value(&doc, "cluster_name"), "wickr-eks");
        assert_eq!(value(&doc, "cluster_aws_region"), "us-east-1");

        // Disabled-state values
        assert_eq!(value(&doc, "mysql_reader_host"), "");
        assert_eq!(value(&doc, "cluster_autoscaler_enabled"), "0");
        assert_eq!(value(&doc, "cluster_autoscaler_service_account"), "");
    }

    #[tokio::test]
    async fn test_value_representations() {
        let doc = resolver(registry(""), secrets())
            .resolve(&ResolveRequest::default())
            .await
            .unwrap();

        assert_eq!(doc.get("mysql_password"), Some(&ConfigValue::plaintext_secret("s3cret")));
        assert_eq!(
            doc.get("pinned_certificate"),
            Some(&ConfigValue::file("pinned-cert.pem", TrustAnchor::bundled().as_bytes()))
        );
        assert!(matches!(doc.get("hostname"), Some(ConfigValue::Plain { .. })));
    }

    #[tokio::test]
    async fn test_trust_anchor_override() {
        let request = ResolveRequest::new("").with_trust_anchor(TrustAnchor::from_bytes(b"custom".to_vec()));
        let doc = resolver(registry(""), secrets()).resolve(&request).await.unwrap();

        assert_eq!(
            doc.get("pinned_certificate"),
            Some(&ConfigValue::File {
                filename: "pinned-cert.pem".to_string(),
                value: "Y3VzdG9t".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent() {
        let resolver = resolver(registry("Dev"), secrets());
        let request = ResolveRequest::new("Dev");

        let first = resolver.resolve(&request).await.unwrap().to_json().unwrap();
        let second = resolver.resolve(&request).await.unwrap().to_json().unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_derived_key_reuses_resolved_flag() {
        let registry = Arc::new(registry(""));
        let resolver = ConfigResolver::new(registry.clone(), Arc::new(secrets()), ResolverSettings::new("us-east-1"));
        resolver.resolve(&ResolveRequest::default()).await.unwrap();

        // One lookup per lookup rule plus one for the secret location
        assert_eq!(registry.lookups(), 9);
    }

    #[tokio::test]
    async fn test_reader_host_when_present() {
        let registry = registry("");
        registry.set_output("WickrRds", "DatabaseEndpointRO", "db-ro.example.com");
        let doc = resolver(registry, secrets()).resolve(&ResolveRequest::default()).await.unwrap();
        assert_eq!(value(&doc, "mysql_reader_host"), "db-ro.example.com");
    }

    #[tokio::test]
    async fn test_autoscaler_derivation() {
        for (flag, expected) in [("1", "cluster-autoscaler"), ("0", ""), ("true", "")] {
            let registry = registry("");
            registry.set_output("WickrEks", "ClusterAutoscalerEnabled", flag);
            let doc = resolver(registry, secrets()).resolve(&ResolveRequest::default()).await.unwrap();

            assert_eq!(value(&doc, "cluster_autoscaler_enabled"), flag);
            assert_eq!(value(&doc, "cluster_autoscaler_service_account"), expected, "flag {flag}");
        }
    }

    #[tokio::test]
    async fn test_missing_required_value() {
        let registry = registry("");
        registry.insert_component("WickrAcm", [("CertificateArn", "arn")]);

        let err = resolver(registry, secrets()).resolve(&ResolveRequest::default()).await.unwrap_err();
        match err {
            StackcfgError::RequiredValueMissing { component, key } => {
                assert_eq!(component, "WickrAcm");
                assert_eq!(key, "DomainName");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_failure_left_to_caller_to_report() {
        let log = Arc::new(ErrorLog::default());
        let result = resolver(registry("Prod"), secrets())
            .with_logger(log.clone())
            .resolve(&ResolveRequest::new("Staging"))
            .await;

        assert!(result.is_err());
        assert!(log.errors.lock().is_empty());
        assert!(log.debug.lock().iter().any(|m| m.starts_with("Resolution failed")));
    }

    #[tokio::test]
    async fn test_component_not_found_carries_region_and_hint() {
        let err = resolver(registry("Prod"), secrets())
            .resolve(&ResolveRequest::new("Staging"))
            .await
            .unwrap_err();

        assert!(matches!(
            &err,
            StackcfgError::ComponentNotFound { component, region }
                if component == "WickrAcmStaging" && region == "us-east-1"
        ));
        assert!(err.to_string().contains("--stack-suffix"));
    }

    #[tokio::test]
    async fn test_missing_component_ignores_default() {
        let registry = registry("");
        registry.remove_component("WickrEks");
        let err = resolver(registry, secrets()).resolve(&ResolveRequest::default()).await.unwrap_err();
        assert!(matches!(err, StackcfgError::ComponentNotFound { component, .. } if component == "WickrEks"));
    }

    #[tokio::test]
    async fn test_first_failure_in_schema_order() {
        let registry = registry("");
        registry.remove_component("WickrS3");
        registry.remove_component("WickrAlb");

        let err = resolver(registry, secrets()).resolve(&ResolveRequest::default()).await.unwrap_err();
        assert!(matches!(err, StackcfgError::ComponentNotFound { component, .. } if component == "WickrAlb"));
    }

    #[tokio::test]
    async fn test_secret_unavailable() {
        let err = resolver(registry(""), MemorySecretStore::new())
            .resolve(&ResolveRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(&err, StackcfgError::SecretUnavailable { location, .. } if location == SECRET_ARN));

        let garbled = MemorySecretStore::new().with_secret(SECRET_ARN, "not json");
        let err = resolver(registry(""), garbled)
            .resolve(&ResolveRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StackcfgError::SecretUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_registry_failure_on_defaulted_key_is_fatal() {
        let registry = FailingRegistry {
            inner: registry(""),
            failing_key: "DatabaseEndpointRO",
        };
        let result = ConfigResolver::new(Arc::new(registry), Arc::new(secrets()), ResolverSettings::new("us-east-1"))
            .resolve(&ResolveRequest::default())
            .await;

        match result {
            Err(StackcfgError::RegistryUnavailable { component, reason }) => {
                assert_eq!(component, "WickrRds");
                assert_eq!(reason, "connection reset");
            }
            other => panic!("expected RegistryUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_secret_store_outage() {
        let result = ConfigResolver::new(
            Arc::new(registry("")),
            Arc::new(UnreachableSecretStore),
            ResolverSettings::new("us-east-1"),
        )
        .resolve(&ResolveRequest::default())
        .await;

        match result {
            Err(StackcfgError::SecretUnavailable { location, reason }) => {
                assert_eq!(location, SECRET_ARN);
                assert_eq!(reason, "throttled");
            }
            other => panic!("expected SecretUnavailable, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_caller_cancellation() {
        let registry = registry("").with_latency(Duration::from_secs(30));
        let resolver = resolver(registry, secrets());
        let token = CancellationToken::new();

        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let started = std::time::Instant::now();
        let err = resolver
            .resolve_with_cancel(&ResolveRequest::default(), &token)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
        assert!(err.to_string().contains("cancelled by caller"));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_already_cancelled_token() {
        let token = CancellationToken::new();
        token.cancel();
        let err = resolver(registry(""), secrets())
            .resolve_with_cancel(&ResolveRequest::default(), &token)
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_timeout() {
        let registry = registry("").with_latency(Duration::from_secs(30));
        let settings = ResolverSettings::new("us-east-1").with_timeout(Duration::from_millis(50));
        let resolver = ConfigResolver::new(Arc::new(registry), Arc::new(secrets()), settings);

        let err = resolver.resolve(&ResolveRequest::default()).await.unwrap_err();
        assert!(err.is_cancelled());
        assert!(err.to_string().contains("timed out"));
    }

    #[tokio::test]
    async fn test_sequential_lookups_give_same_document() {
        let concurrent = resolver(registry(""), secrets());
        let sequential = ConfigResolver::new(
            Arc::new(registry("")),
            Arc::new(secrets()),
            ResolverSettings::new("us-east-1").with_max_concurrent_lookups(1),
        );

        let request = ResolveRequest::default();
        assert_eq!(
            concurrent.resolve(&request).await.unwrap(),
            sequential.resolve(&request).await.unwrap()
        );
    }

    #[tokio::test]
    async fn test_custom_schema() {
        let schema = Schema::new(
            "test",
            vec![
                SchemaEntry::new("flag", Rule::Constant("1")),
                SchemaEntry::new(
                    "mode",
                    Rule::Derived {
                        source: "flag",
                        equals: "1",
                        then: "on",
                        otherwise: "off",
                    },
                ),
                SchemaEntry::new("zone", Rule::RegionTemplate("{region}a")),
            ],
        );
        let doc = resolver(MemoryOutputRegistry::new("us-east-1"), MemorySecretStore::new())
            .with_schema(schema)
            .unwrap()
            .resolve(&ResolveRequest::default())
            .await
            .unwrap();

        assert_eq!(value(&doc, "mode"), "on");
        assert_eq!(value(&doc, "zone"), "us-east-1a");
    }

    #[test]
    fn test_invalid_schema_rejected() {
        let schema = Schema::new(
            "broken",
            vec![SchemaEntry::new(
                "mode",
                Rule::Derived {
                    source: "flag",
                    equals: "1",
                    then: "on",
                    otherwise: "off",
                },
            )],
        );
        let result = resolver(MemoryOutputRegistry::new("us-east-1"), MemorySecretStore::new()).with_schema(schema);
        assert!(matches!(result, Err(StackcfgError::Configuration(_))));
    }
}
