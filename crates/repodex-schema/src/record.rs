//! Dumped package records and the name/version groupings built from them.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::{REPLACE_KEY, UID_KEY};

/// Versions of a single package, keyed by pretty version string.
pub type VersionGroup = IndexMap<String, PackageRecord>;

/// All packages of a build run, keyed by package name.
///
/// Iteration order is insertion order, which is what makes uid assignment
/// and the serialized output reproducible for identical input.
pub type PackageGroup = IndexMap<String, VersionGroup>;

/// Errors raised when a dumped attribute map is not a usable record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// A required attribute is absent or not a string.
    #[error("record has no string `{0}` attribute")]
    MissingField(&'static str),

    /// The dumped value is not a JSON object.
    #[error("record is not a JSON object")]
    NotAnObject,
}

/// Attribute map for one resolved package version.
///
/// Records arrive already dumped (plain JSON objects). The only attribute
/// repodex ever adds is `uid`, during indexing in providers mode.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct PackageRecord {
    attrs: Map<String, Value>,
}

impl PackageRecord {
    /// Wrap a dumped attribute map, checking that `name` and `version` are strings.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::MissingField`] if either attribute is missing or
    /// is not a JSON string.
    pub fn new(attrs: Map<String, Value>) -> Result<Self, RecordError> {
        for field in ["name", "version"] {
            if !attrs.get(field).is_some_and(Value::is_string) {
                return Err(RecordError::MissingField(field));
            }
        }
        Ok(Self { attrs })
    }

    /// The package name.
    pub fn name(&self) -> &str {
        self.str_attr("name")
    }

    /// The pretty version string (e.g. `1.0.x-dev`), used as the version key.
    pub fn pretty_version(&self) -> &str {
        self.str_attr("version")
    }

    /// The uid assigned during indexing, if any.
    pub fn uid(&self) -> Option<u64> {
        self.attrs.get(UID_KEY).and_then(Value::as_u64)
    }

    /// Inject the run-scoped uid into the attribute map.
    pub fn assign_uid(&mut self, uid: u64) {
        self.attrs.insert(UID_KEY.to_string(), Value::from(uid));
    }

    /// Whether this version lists `target` among its `replace` declarations.
    pub fn replaces(&self, target: &str) -> bool {
        self.attrs
            .get(REPLACE_KEY)
            .and_then(Value::as_object)
            .is_some_and(|replace| replace.contains_key(target))
    }

    /// Borrow the raw attribute map.
    pub fn attrs(&self) -> &Map<String, Value> {
        &self.attrs
    }

    fn str_attr(&self, key: &str) -> &str {
        self.attrs.get(key).and_then(Value::as_str).unwrap_or_default()
    }
}

impl TryFrom<Map<String, Value>> for PackageRecord {
    type Error = RecordError;

    fn try_from(attrs: Map<String, Value>) -> Result<Self, Self::Error> {
        Self::new(attrs)
    }
}

impl Serialize for PackageRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.attrs.serialize(serializer)
    }
}
