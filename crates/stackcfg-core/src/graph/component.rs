//! Component definitions and the optional-component variant

use serde::Serialize;

use crate::naming::{ComponentId, ComponentKind};

/// How a component comes into existence
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provisioning {
    /// Constructed by this deployment
    Create,
    /// Pass-through reference to something that already exists
    Import { reference: String },
}

impl Provisioning {
    fn from_import(reference: Option<&str>) -> Self {
        match reference {
            Some(reference) => Provisioning::Import {
                reference: reference.to_string(),
            },
            None => Provisioning::Create,
        }
    }

    pub fn is_import(&self) -> bool {
        matches!(self, Provisioning::Import { .. })
    }
}

/// A component that is part of the construction plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentDef {
    id: ComponentId,
    depends_on: Vec<ComponentId>,
    provisioning: Provisioning,
    autoscaler: bool,
}

impl ComponentDef {
    pub fn new(id: ComponentId) -> Self {
        Self {
            id,
            depends_on: Vec::new(),
            provisioning: Provisioning::Create,
            autoscaler: false,
        }
    }

    /// Add a dependency on another component
    pub fn depends_on(mut self, other: &ComponentId) -> Self {
        if !self.depends_on.contains(other) {
            self.depends_on.push(other.clone());
        }
        self
    }

    /// Add a dependency only when `condition` holds
    pub fn depends_on_if(self, condition: bool, other: &ComponentId) -> Self {
        if condition {
            self.depends_on(other)
        } else {
            self
        }
    }

    /// Mark as imported when a reference is given
    pub fn imported_from(mut self, reference: Option<&str>) -> Self {
        self.provisioning = Provisioning::from_import(reference);
        self
    }

    /// Run the node autoscaler inside this component
    pub fn with_autoscaler(mut self, enabled: bool) -> Self {
        self.autoscaler = enabled;
        self
    }

    pub fn id(&self) -> &ComponentId {
        &self.id
    }

    pub fn kind(&self) -> ComponentKind {
        self.id.kind()
    }

    pub fn dependencies(&self) -> &[ComponentId] {
        &self.depends_on
    }

    pub fn depends_on_kind(&self, kind: ComponentKind) -> bool {
        self.depends_on.iter().any(|d| d.kind() == kind)
    }

    pub fn provisioning(&self) -> &Provisioning {
        &self.provisioning
    }

    pub fn is_optional(&self) -> bool {
        self.kind().is_optional()
    }

    pub fn has_autoscaler(&self) -> bool {
        self.autoscaler
    }
}

/// An optional component left out of the deployment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedComponent {
    pub id: ComponentId,
    /// Which setting left it out
    pub reason: &'static str,
}

/// A component slot that is either part of the graph or absent from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionalComponent {
    Present(ComponentDef),
    Absent(SkippedComponent),
}

impl OptionalComponent {
    /// `Present` when `enabled`, otherwise `Absent` with the given reason
    pub fn when(enabled: bool, def: ComponentDef, reason: &'static str) -> Self {
        if enabled {
            OptionalComponent::Present(def)
        } else {
            OptionalComponent::Absent(SkippedComponent {
                id: def.id,
                reason,
            })
        }
    }

    /// Identity of the component, only if it is present
    pub fn present_id(&self) -> Option<&ComponentId> {
        match self {
            OptionalComponent::Present(def) => Some(def.id()),
            OptionalComponent::Absent(_) => None,
        }
    }

    pub fn kind(&self) -> ComponentKind {
        match self {
            OptionalComponent::Present(def) => def.kind(),
            OptionalComponent::Absent(skipped) => skipped.id.kind(),
        }
    }
}

impl From<ComponentDef> for OptionalComponent {
    fn from(def: ComponentDef) -> Self {
        OptionalComponent::Present(def)
    }
}

/// Plan entry as handed to the provisioning layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentDescriptor {
    pub name: String,
    pub kind: ComponentKind,
    pub depends_on: Vec<String>,
    pub optional: bool,
    pub present: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imported_from: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub autoscaler: bool,
}

impl From<&ComponentDef> for ComponentDescriptor {
    fn from(def: &ComponentDef) -> Self {
        Self {
            name: def.id().stack_name(),
            kind: def.kind(),
            depends_on: def.dependencies().iter().map(ComponentId::stack_name).collect(),
            optional: def.is_optional(),
            present: true,
            imported_from: match def.provisioning() {
                Provisioning::Import { reference } => Some(reference.clone()),
                Provisioning::Create => None,
            },
            autoscaler: def.has_autoscaler(),
        }
    }
}

impl From<&SkippedComponent> for ComponentDescriptor {
    fn from(skipped: &SkippedComponent) -> Self {
        Self {
            name: skipped.id.stack_name(),
            kind: skipped.id.kind(),
            depends_on: Vec::new(),
            optional: true,
            present: false,
            imported_from: None,
            autoscaler: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::StackNaming;

    #[test]
    fn test_dependencies_are_deduplicated() {
        let naming = StackNaming::default();
        let vpc = naming.component(ComponentKind::Network);
        let def = ComponentDef::new(naming.component(ComponentKind::Database))
            .depends_on(&vpc)
            .depends_on(&vpc);
        assert_eq!(def.dependencies().len(), 1);
        assert!(def.depends_on_kind(ComponentKind::Network));
    }

    #[test]
    fn test_conditional_dependency() {
        let naming = StackNaming::default();
        let vpc = naming.component(ComponentKind::Network);
        let def = ComponentDef::new(naming.component(ComponentKind::Certificate)).depends_on_if(false, &vpc);
        assert!(def.dependencies().is_empty());
    }

    #[test]
    fn test_optional_component_when() {
        let naming = StackNaming::new("Dev");
        let def = ComponentDef::new(naming.component(ComponentKind::CallingLoadBalancer));

        let absent = OptionalComponent::when(false, def.clone(), "disabled");
        assert!(absent.present_id().is_none());
        assert_eq!(absent.kind(), ComponentKind::CallingLoadBalancer);

        let present = OptionalComponent::when(true, def, "disabled");
        assert_eq!(present.present_id().map(|id| id.stack_name()), Some("WickrNlbDev".to_string()));
    }

    #[test]
    fn test_descriptor_serialization() {
        let naming = StackNaming::default();
        let def = ComponentDef::new(naming.component(ComponentKind::Network)).imported_from(Some("vpc-123"));
        let json = serde_json::to_value(ComponentDescriptor::from(&def)).unwrap();
        assert_eq!(json["name"], "WickrVpc");
        assert_eq!(json["kind"], "network");
        assert_eq!(json["dependsOn"], serde_json::json!([]));
        assert_eq!(json["present"], true);
        assert_eq!(json["importedFrom"], "vpc-123");
        assert!(json.get("autoscaler").is_none());

        let eks = ComponentDef::new(naming.component(ComponentKind::Cluster)).with_autoscaler(true);
        let json = serde_json::to_value(ComponentDescriptor::from(&eks)).unwrap();
        assert_eq!(json["autoscaler"], true);
    }
}
