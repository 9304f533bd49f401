//! Component Graph Builder
//!
//! Turns a [`DeploymentConfig`] into an ordered [`ConstructionPlan`]. The
//! dependency shape is fixed; flags only decide whether the optional
//! components take part. No I/O happens here.

use std::sync::Arc;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::config::{versions, ClusterVersion, DeploymentConfig};
use crate::error::{StackcfgError, StackcfgResult};
use crate::logging::{NoOpLogger, SharedLogger};
use crate::naming::{ComponentKind, StackNaming};
use crate::{log_debug, log_warn};
use super::component::{ComponentDef, OptionalComponent};
use super::plan::ConstructionPlan;

/// Builds the construction plan for one deployment
pub struct ComponentGraphBuilder<'a> {
    config: &'a DeploymentConfig,
    logger: SharedLogger,
}

impl<'a> ComponentGraphBuilder<'a> {
    pub fn new(config: &'a DeploymentConfig) -> Self {
        Self {
            config,
            logger: Arc::new(NoOpLogger),
        }
    }

    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Validate the configuration and produce the ordered plan
    pub fn build(&self) -> StackcfgResult<ConstructionPlan> {
        let cluster_version = self.check_cluster_version()?;
        self.check_license()?;

        let mut present = Vec::new();
        let mut skipped = Vec::new();
        for slot in self.declare(&self.config.naming()) {
            match slot {
                OptionalComponent::Present(def) => present.push(def),
                OptionalComponent::Absent(s) => {
                    log_debug!(self.logger, "Skipping {} ({})", s.id, s.reason);
                    skipped.push(s);
                }
            }
        }

        let steps = order(present)?;
        Ok(ConstructionPlan::new(steps, skipped, cluster_version))
    }

    fn check_cluster_version(&self) -> StackcfgResult<&'static ClusterVersion> {
        let requested = self.config.cluster_version.trim();
        versions::lookup(requested).ok_or_else(|| {
            StackcfgError::configuration(format!(
                "Unsupported cluster version: {} (supported: {})",
                requested,
                versions::supported_versions().join(", ")
            ))
        })
    }

    fn check_license(&self) -> StackcfgResult<()> {
        if self.config.auto_deploy && self.config.license_path.is_none() {
            return Err(StackcfgError::configuration(
                "license_path must be set when auto_deploy is enabled",
            ));
        }
        Ok(())
    }

    /// Declare every component slot with its dependencies
    fn declare(&self, naming: &StackNaming) -> Vec<OptionalComponent> {
        let config = self.config;

        let kms = ComponentDef::new(naming.component(ComponentKind::EncryptionKey))
            .imported_from(config.imported_kms_key_arn());
        let s3 = ComponentDef::new(naming.component(ComponentKind::Storage));
        let vpc = ComponentDef::new(naming.component(ComponentKind::Network))
            .imported_from(config.imported_vpc_id());

        for def in [&kms, &vpc] {
            if def.provisioning().is_import() {
                log_debug!(self.logger, "{} is imported, not constructed", def.id());
            }
        }

        if config.hosted_zone().is_none() && config.imported_certificate_arn().is_none() {
            log_warn!(
                self.logger,
                "No hosted zone configured; the certificate will not be DNS-validated"
            );
        }

        // DNS validation needs the network, but only for a configured domain
        let acm = ComponentDef::new(naming.component(ComponentKind::Certificate))
            .imported_from(config.imported_certificate_arn())
            .depends_on_if(config.domain().is_some(), vpc.id());

        let alb = ComponentDef::new(naming.component(ComponentKind::LoadBalancer))
            .depends_on(vpc.id())
            .depends_on(acm.id());

        let nlb = OptionalComponent::when(
            config.enable_calling_ingress,
            ComponentDef::new(naming.component(ComponentKind::CallingLoadBalancer))
                .depends_on(vpc.id())
                .depends_on(acm.id()),
            "enable_calling_ingress is off",
        );

        let rds = ComponentDef::new(naming.component(ComponentKind::Database))
            .depends_on(vpc.id())
            .depends_on(kms.id());

        let mut eks = ComponentDef::new(naming.component(ComponentKind::Cluster))
            .depends_on(vpc.id())
            .depends_on(kms.id())
            .depends_on(s3.id())
            .depends_on(rds.id())
            .depends_on(alb.id())
            .with_autoscaler(config.enable_autoscaler);
        if let Some(nlb_id) = nlb.present_id() {
            eks = eks.depends_on(nlb_id);
        }

        let lambda = OptionalComponent::when(
            config.auto_deploy,
            ComponentDef::new(naming.component(ComponentKind::InstallerBootstrap))
                .depends_on(vpc.id())
                .depends_on(eks.id()),
            "auto_deploy is off",
        );

        vec![
            kms.into(),
            s3.into(),
            vpc.into(),
            acm.into(),
            alb.into(),
            nlb,
            rds.into(),
            eks.into(),
            lambda,
        ]
    }
}

/// Topologically sort the present components, dependencies first
fn order(mut defs: Vec<ComponentDef>) -> StackcfgResult<Vec<ComponentDef>> {
    let mut graph = DiGraphMap::<ComponentKind, ()>::new();
    for def in &defs {
        graph.add_node(def.kind());
    }
    for def in &defs {
        for dep in def.dependencies() {
            if !graph.contains_node(dep.kind()) {
                return Err(StackcfgError::configuration(format!(
                    "{} depends on {}, which is not part of the deployment",
                    def.id(),
                    dep
                )));
            }
            graph.add_edge(dep.kind(), def.kind(), ());
        }
    }

    let sorted = toposort(&graph, None).map_err(|cycle| {
        StackcfgError::configuration(format!(
            "Component dependency cycle involving {}",
            cycle.node_id()
        ))
    })?;

    let mut ordered = Vec::with_capacity(defs.len());
    for kind in sorted {
        if let Some(index) = defs.iter().position(|d| d.kind() == kind) {
            ordered.push(defs.swap_remove(index));
        }
    }
    Ok(ordered)
}
