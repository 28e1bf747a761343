// cpk-common/src/identifier.rs
//! Character-class and version grammar for pack identifiers.
//!
//! Vendor and pack names follow `[0-9A-Za-z_-]+`. Versions follow semantic
//! versioning (`MAJOR.MINOR.PATCH[-prerelease][+build]`) with no leading
//! zeros in numeric identifiers. Numeric parts are not size-limited.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref PACK_NAME_RE: Regex = Regex::new(r"^[0-9A-Za-z_-]+$").unwrap();
    static ref PACK_VERSION_RE: Regex = Regex::new(concat!(
        r"^(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)\.(0|[1-9][0-9]*)",
        r"(-(0|[1-9][0-9]*|[0-9]*[A-Za-z-][0-9A-Za-z-]*)(\.(0|[1-9][0-9]*|[0-9]*[A-Za-z-][0-9A-Za-z-]*))*)?",
        r"(\+[0-9A-Za-z-]+(\.[0-9A-Za-z-]+)*)?$"
    ))
    .unwrap();
}

/// Checks whether a pack vendor name matches `[0-9A-Za-z_-]+`.
pub fn valid_vendor_name(vendor: &str) -> bool {
    PACK_NAME_RE.is_match(vendor)
}

/// Checks whether a pack name matches `[0-9A-Za-z_-]+`.
pub fn valid_pack_name(name: &str) -> bool {
    PACK_NAME_RE.is_match(name)
}

/// Checks whether a version string is a well-formed semantic version.
///
/// The empty string is not a version; callers decide whether an omitted
/// version is acceptable.
pub fn valid_version(version: &str) -> bool {
    PACK_VERSION_RE.is_match(version)
}
