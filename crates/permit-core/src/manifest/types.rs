//! Manifest Types
//!
//! The `permissions` section of a manifest: entry identity → capability set.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::permissions::Capability;

/// Top level of a manifest file. Every other field is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManifestDocument {
    #[serde(default)]
    pub permissions: Option<Value>,
}

/// Scope shapes accepted in a manifest
///
/// `"read": ["/tmp", "/var"]`, `"read": "/tmp"`, `"net": []`, `"net": true`
/// and `"net": null` are all valid; the last three mean unscoped.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawScope {
    List(Vec<String>),
    Single(String),
    // Only the shape matters; `true`, `false` and `null` are all unscoped
    #[allow(dead_code)]
    Flag(Option<bool>),
}

impl From<RawScope> for Vec<String> {
    fn from(raw: RawScope) -> Self {
        match raw {
            RawScope::List(values) => values,
            RawScope::Single(value) if value.is_empty() => Vec::new(),
            RawScope::Single(value) => vec![value],
            RawScope::Flag(_) => Vec::new(),
        }
    }
}

/// One capability as written in the manifest, scopes still unresolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityEntry {
    pub name: String,
    pub scopes: Vec<String>,
}

impl CapabilityEntry {
    pub fn new<I, S>(name: impl Into<String>, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            scopes: scopes.into_iter().map(Into::into).collect(),
        }
    }

    /// `None` for names outside the known set
    pub fn capability(&self) -> Option<Capability> {
        self.name.parse().ok()
    }

    pub fn is_unscoped(&self) -> bool {
        self.scopes.is_empty()
    }
}

/// Capabilities required by one entry, in manifest order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    entries: Vec<CapabilityEntry>,
}

impl CapabilitySet {
    pub fn new(entries: Vec<CapabilityEntry>) -> Self {
        Self { entries }
    }

    /// Decode from the JSON object found under `permissions.<entry>`
    pub fn from_value(value: &Value) -> Result<Self, String> {
        let object = value
            .as_object()
            .ok_or_else(|| format!("expected an object, found {}", json_kind(value)))?;
        Self::from_map(object)
    }

    fn from_map(object: &Map<String, Value>) -> Result<Self, String> {
        let mut entries = Vec::with_capacity(object.len());

        for (name, scopes) in object {
            if name.is_empty() {
                continue;
            }
            let raw: RawScope = serde_json::from_value(scopes.clone()).map_err(|_| {
                format!(
                    "'{}' must be a string, a list of strings, a boolean or null, found {}",
                    name,
                    json_kind(scopes)
                )
            })?;
            entries.push(CapabilityEntry {
                name: name.clone(),
                scopes: raw.into(),
            });
        }

        Ok(Self { entries })
    }

    pub fn iter(&self) -> impl Iterator<Item = &CapabilityEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a CapabilitySet {
    type Item = &'a CapabilityEntry;
    type IntoIter = std::slice::Iter<'a, CapabilityEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl ManifestDocument {
    /// Capability set for `entry`
    ///
    /// `Ok(None)` when the document has no `permissions` object or the
    /// entry is not a key in it.
    pub fn capabilities_for(&self, entry: &str) -> Result<Option<CapabilitySet>, String> {
        let Some(permissions) = self.permissions.as_ref().and_then(Value::as_object) else {
            return Ok(None);
        };

        match permissions.get(entry) {
            Some(value) => CapabilitySet::from_value(value).map(Some),
            None => Ok(None),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
