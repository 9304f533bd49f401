//! Per-key resolution rules

use crate::naming::ComponentKind;

/// How one configuration key obtains its value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Output of a component; `default` covers a missing key
    Lookup {
        component: ComponentKind,
        output: &'static str,
        default: Option<&'static str>,
    },
    /// Fixed literal
    Constant(&'static str),
    /// The deployment region
    Region,
    /// `{region}` substituted into a template
    RegionTemplate(&'static str),
    /// JSON field of a secret whose location is a component output
    Secret {
        component: ComponentKind,
        output: &'static str,
        field: &'static str,
    },
    /// `then` when the earlier key `source` equals `equals`, otherwise `otherwise`
    Derived {
        source: &'static str,
        equals: &'static str,
        then: &'static str,
        otherwise: &'static str,
    },
    /// Trust anchor certificate attached as a file
    TrustAnchor { filename: &'static str },
}

impl Rule {
    /// Required lookup with no default
    pub const fn required(component: ComponentKind, output: &'static str) -> Self {
        Rule::Lookup {
            component,
            output,
            default: None,
        }
    }

    pub const fn with_default(component: ComponentKind, output: &'static str, default: &'static str) -> Self {
        Rule::Lookup {
            component,
            output,
            default: Some(default),
        }
    }

    /// Whether evaluation needs other keys resolved first
    pub fn is_derived(&self) -> bool {
        matches!(self, Rule::Derived { .. })
    }

    /// Component this rule reads from, if any
    pub fn component(&self) -> Option<ComponentKind> {
        match self {
            Rule::Lookup { component, .. } | Rule::Secret { component, .. } => Some(*component),
            _ => None,
        }
    }
}
