//! Ordered construction plan

use serde::Serialize;

use crate::config::ClusterVersion;
use crate::naming::ComponentKind;
use super::component::{ComponentDef, ComponentDescriptor, SkippedComponent};

/// Components to construct, in dependency order
#[derive(Debug, Clone)]
pub struct ConstructionPlan {
    steps: Vec<ComponentDef>,
    skipped: Vec<SkippedComponent>,
    cluster_version: &'static ClusterVersion,
}

/// Serializable view of a plan
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary<'a> {
    pub cluster_version: &'a ClusterVersion,
    pub components: Vec<ComponentDescriptor>,
}

impl ConstructionPlan {
    pub(crate) fn new(
        steps: Vec<ComponentDef>,
        skipped: Vec<SkippedComponent>,
        cluster_version: &'static ClusterVersion,
    ) -> Self {
        Self {
            steps,
            skipped,
            cluster_version,
        }
    }

    /// Present components; each appears after everything it depends on
    pub fn steps(&self) -> &[ComponentDef] {
        &self.steps
    }

    /// Optional components left out of the graph
    pub fn skipped(&self) -> &[SkippedComponent] {
        &self.skipped
    }

    pub fn cluster_version(&self) -> &'static ClusterVersion {
        self.cluster_version
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn contains(&self, kind: ComponentKind) -> bool {
        self.step(kind).is_some()
    }

    pub fn step(&self, kind: ComponentKind) -> Option<&ComponentDef> {
        self.steps.iter().find(|s| s.kind() == kind)
    }

    /// Construction position of a present component
    pub fn position(&self, kind: ComponentKind) -> Option<usize> {
        self.steps.iter().position(|s| s.kind() == kind)
    }

    /// All `(dependent, dependency)` edges
    pub fn edges(&self) -> Vec<(ComponentKind, ComponentKind)> {
        self.steps
            .iter()
            .flat_map(|step| step.dependencies().iter().map(move |dep| (step.kind(), dep.kind())))
            .collect()
    }

    /// Present steps in order, then absent optional components
    pub fn descriptors(&self) -> Vec<ComponentDescriptor> {
        self.steps
            .iter()
            .map(ComponentDescriptor::from)
            .chain(self.skipped.iter().map(ComponentDescriptor::from))
            .collect()
    }

    pub fn summary(&self) -> PlanSummary<'_> {
        PlanSummary {
            cluster_version: self.cluster_version,
            components: self.descriptors(),
        }
    }
}
