// cpk-common/src/model/descriptor.rs
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::reference::PackIdentifier;

/// A pack installed through its descriptor file, as recorded in the local
/// index. Logically keyed by `(vendor, name, version)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DescriptorReference {
    pub vendor: String,
    pub name: String,
    pub version: String,
    /// Directory URI the descriptor was installed from, ending in `/`.
    pub location: String,
}

impl DescriptorReference {
    pub fn same_key(&self, other: &DescriptorReference) -> bool {
        self.vendor == other.vendor && self.name == other.name && self.version == other.version
    }

    /// Matches vendor and name, and the version only when `version` is
    /// non-empty.
    pub fn matches(&self, vendor: &str, name: &str, version: &str) -> bool {
        self.vendor == vendor
            && self.name == name
            && (version.is_empty() || self.version == version)
    }
}

impl From<&PackIdentifier> for DescriptorReference {
    fn from(id: &PackIdentifier) -> Self {
        Self {
            vendor: id.vendor.clone(),
            name: id.name.clone(),
            version: id.version.clone(),
            location: id.location.clone(),
        }
    }
}

impl fmt::Display for DescriptorReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.vendor, self.name, self.version)
    }
}

/// Metadata read from a descriptor (PDSC) file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptorInfo {
    pub vendor: String,
    pub name: String,
    /// Version of the latest (first listed) release.
    pub version: String,
    pub description: Option<String>,
}
