//! Resolved configuration document
//!
//! The document handed to the installer: `apiVersion`, `kind` and an
//! ordered `spec.values` map from schema key to a tagged value.

use std::fmt;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::error::StackcfgResult;
use crate::schema::{API_VERSION, KIND};

const BUNDLED_TRUST_ANCHOR: &[u8] = include_bytes!("../assets/trust-anchor.pem");

/// One resolved value and its representation
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// File attachment; `value` is the base64 payload
    File { filename: String, value: String },
    Plain { value: String },
    /// Sensitive value the consumer must keep out of non-secure storage
    PlaintextSecret {
        #[serde(rename = "valuePlaintext")]
        value_plaintext: String,
    },
}

impl ConfigValue {
    pub fn plain(value: impl Into<String>) -> Self {
        ConfigValue::Plain { value: value.into() }
    }

    pub fn plaintext_secret(value: impl Into<String>) -> Self {
        ConfigValue::PlaintextSecret {
            value_plaintext: value.into(),
        }
    }

    /// File attachment with the payload base64-encoded
    pub fn file(filename: impl Into<String>, contents: &[u8]) -> Self {
        ConfigValue::File {
            filename: filename.into(),
            value: STANDARD.encode(contents),
        }
    }

    /// The value as emitted (base64 for attachments)
    pub fn as_str(&self) -> &str {
        match self {
            ConfigValue::File { value, .. } | ConfigValue::Plain { value } => value,
            ConfigValue::PlaintextSecret { value_plaintext } => value_plaintext,
        }
    }

    pub fn is_secret(&self) -> bool {
        matches!(self, ConfigValue::PlaintextSecret { .. })
    }
}

// Secrets stay out of debug output and therefore out of logs
impl fmt::Debug for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::File { filename, value } => f
                .debug_struct("File")
                .field("filename", filename)
                .field("len", &value.len())
                .finish(),
            ConfigValue::Plain { value } => f.debug_tuple("Plain").field(value).finish(),
            ConfigValue::PlaintextSecret { .. } => f.write_str("PlaintextSecret(<redacted>)"),
        }
    }
}

/// Ordered key/value pairs serialized as a map
#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct Values(Vec<(String, ConfigValue)>);

impl Serialize for Values {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct Spec {
    values: Values,
}

/// The installer-facing configuration document
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigDocument {
    api_version: String,
    kind: String,
    spec: Spec,
}

impl ConfigDocument {
    /// Build a document from values already in schema order
    pub fn new(values: Vec<(String, ConfigValue)>) -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            spec: Spec { values: Values(values) },
        }
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.spec.values.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.spec.values.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.spec.values.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spec.values.0.is_empty()
    }

    /// Compact JSON
    pub fn to_json(&self) -> StackcfgResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_yaml(&self) -> StackcfgResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Certificate pinned by the installer
#[derive(Clone, PartialEq, Eq)]
pub struct TrustAnchor {
    bytes: Vec<u8>,
}

impl TrustAnchor {
    /// The certificate shipped with this crate
    pub fn bundled() -> Self {
        Self::from_bytes(BUNDLED_TRUST_ANCHOR)
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self { bytes: bytes.into() }
    }

    /// Read an override certificate; the raw bytes are used as-is
    pub fn from_file(path: impl AsRef<Path>) -> StackcfgResult<Self> {
        Ok(Self::from_bytes(std::fs::read(path)?))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

impl Default for TrustAnchor {
    fn default() -> Self {
        Self::bundled()
    }
}

impl fmt::Debug for TrustAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrustAnchor").field("len", &self.bytes.len()).finish()
    }
}
