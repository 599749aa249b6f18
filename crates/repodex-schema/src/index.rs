//! Root repository document and include file payloads.
//!
//! Clients fetch the root document first. In flat mode it carries the whole
//! package group; in providers mode it only lists, per package, the hash of
//! the provider file to fetch from `providers-url`.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::{ContentHash, HashAlgorithm, PackageGroup};

/// Body of every include file: `{"packages": <group>}`.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct IncludePayload<'a> {
    /// Packages (or a replace group) carried by the include file.
    pub packages: &'a PackageGroup,
}

/// Hash reference from the root document to one provider file.
///
/// Serializes as a single-entry object keyed by the algorithm identifier,
/// e.g. `{"sha256": "<hex>"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEntry {
    /// Algorithm the provider file was hashed with.
    pub algorithm: HashAlgorithm,
    /// Hex digest of the provider file content.
    pub hash: ContentHash,
}

impl Serialize for ProviderEntry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.algorithm.as_str(), &self.hash)?;
        map.end()
    }
}

/// The root document of a generated repository.
///
/// Exactly one shape is produced per run, selected by the `providers` setting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RepoIndex {
    /// Flat mode: every package version inline.
    Packages {
        /// All packages of the run.
        packages: PackageGroup,
    },
    /// Providers mode: one hash-addressed provider file per package.
    Providers {
        /// Template clients expand to fetch a provider file.
        #[serde(rename = "providers-url")]
        providers_url: String,
        /// Package name to provider file hash.
        providers: IndexMap<String, ProviderEntry>,
    },
}

impl RepoIndex {
    /// Whether this is a providers-mode document.
    pub fn is_providers(&self) -> bool {
        matches!(self, Self::Providers { .. })
    }
}
