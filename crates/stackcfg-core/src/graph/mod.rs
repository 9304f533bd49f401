//! Component graph
//!
//! Decides which infrastructure components a deployment is made of and in
//! which order they can be constructed. Optional components are modelled as
//! [`OptionalComponent::Absent`] and never appear in the ordered steps.

mod component;
mod builder;
mod plan;

pub use component::{ComponentDef, ComponentDescriptor, OptionalComponent, Provisioning, SkippedComponent};
pub use builder::ComponentGraphBuilder;
pub use plan::{ConstructionPlan, PlanSummary};
