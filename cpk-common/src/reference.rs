// cpk-common/src/reference.rs
//! Turns pack reference strings into validated [`PackIdentifier`]s.
//!
//! Accepted full-form references:
//! - `/path/to/dev/Vendor.Pack.pdsc`
//! - `relative/dir/Vendor.Pack.1.2.3.pack` (or `.zip`)
//! - `https://example.com/dl/Vendor.Pack.1.2.3.pack`
//!
//! Short-form references (`Vendor.Pack[.x.y.z]`) address something that is
//! already installed, typically for removal.

use std::env;
use std::fmt;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CpkError, Result};
use crate::identifier::{valid_pack_name, valid_vendor_name, valid_version};

pub const PDSC_EXTENSION: &str = ".pdsc";
const VALID_EXTENSIONS: [&str; 3] = [".zip", ".pack", PDSC_EXTENSION];
const URI_PREFIXES: [&str; 3] = ["http://", "https://", "file://"];
const FILE_URI_PREFIX: &str = "file://";

const FULL_FORM: &str = "[location/]Vendor.Pack.x.y.z.pack, Vendor.Pack.x.y.z.zip or Vendor.Pack.pdsc";
const SHORT_FORM: &str = "Vendor.Pack[.x.y.z]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceMode {
    /// A concrete artifact: extension required, location normalized.
    Full,
    /// `Vendor.Pack[.x.y.z]`: no extension, no location.
    Short,
}

/// Identifier extracted from a pack reference.
///
/// `version` and `extension` are empty when the reference does not carry
/// them. `location` is an absolute `file://`, `http://` or `https://` URI
/// ending in `/` for full-form references and empty for short-form ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackIdentifier {
    pub vendor: String,
    pub name: String,
    pub version: String,
    pub extension: String,
    pub location: String,
}

impl PackIdentifier {
    pub fn is_descriptor(&self) -> bool {
        self.extension == PDSC_EXTENSION
    }

    pub fn is_remote(&self) -> bool {
        is_remote_location(&self.location)
    }

    /// File name the reference points at, e.g. `Vendor.Pack.pdsc`.
    pub fn file_name(&self) -> String {
        if self.version.is_empty() {
            format!("{}.{}{}", self.vendor, self.name, self.extension)
        } else {
            format!(
                "{}.{}.{}{}",
                self.vendor, self.name, self.version, self.extension
            )
        }
    }

    /// Local filesystem path of the referenced file, if the location is a
    /// `file://` URI.
    pub fn local_path(&self) -> Option<PathBuf> {
        self.location
            .strip_prefix(FILE_URI_PREFIX)
            .map(|dir| PathBuf::from(dir).join(self.file_name()))
    }
}

impl fmt::Display for PackIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}.{}", self.vendor, self.name)
        } else {
            write!(f, "{}.{}.{}", self.vendor, self.name, self.version)
        }
    }
}

pub fn is_remote_location(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Resolves `reference` using the process working directory for relative
/// locations.
pub fn resolve(reference: &str, mode: ReferenceMode) -> Result<PackIdentifier> {
    resolve_from(reference, mode, None)
}

/// Like [`resolve`], but relative locations are resolved against `base`.
pub fn resolve_relative_to(
    reference: &str,
    mode: ReferenceMode,
    base: &Path,
) -> Result<PackIdentifier> {
    resolve_from(reference, mode, Some(base))
}

fn resolve_from(
    reference: &str,
    mode: ReferenceMode,
    base: Option<&Path>,
) -> Result<PackIdentifier> {
    debug!("Extracting pack info from \"{}\" ({:?})", reference, mode);
    match mode {
        ReferenceMode::Full => resolve_full(reference, base),
        ReferenceMode::Short => resolve_short(reference),
    }
}

fn resolve_full(reference: &str, base: Option<&Path>) -> Result<PackIdentifier> {
    let (location, segment) = split_reference(reference);

    let extension = segment.rfind('.').map_or("", |idx| &segment[idx..]);
    if !VALID_EXTENSIONS.contains(&extension) {
        return Err(CpkError::InvalidExtension {
            reference: reference.to_string(),
            extension: extension.to_string(),
        });
    }

    let parts: Vec<&str> = segment.splitn(3, '.').collect();
    if parts.len() != 3 {
        return Err(CpkError::MalformedReference {
            reference: reference.to_string(),
            expected: FULL_FORM,
        });
    }

    let is_pdsc = extension == PDSC_EXTENSION;
    // Descriptor versions come from the file content, never from the name.
    let version = if is_pdsc {
        ""
    } else {
        parts[2].strip_suffix(extension).unwrap_or(parts[2])
    };

    check_components(reference, parts[0], parts[1], (!is_pdsc).then_some(version))?;

    Ok(PackIdentifier {
        vendor: parts[0].to_string(),
        name: parts[1].to_string(),
        version: version.to_string(),
        extension: extension.to_string(),
        location: normalize_location(location, base)?,
    })
}

fn resolve_short(reference: &str) -> Result<PackIdentifier> {
    let (_, segment) = split_reference(reference);

    let parts: Vec<&str> = segment.splitn(3, '.').collect();
    if parts.len() < 2 {
        return Err(CpkError::MalformedReference {
            reference: reference.to_string(),
            expected: SHORT_FORM,
        });
    }

    let version = parts.get(2).copied();
    check_components(reference, parts[0], parts[1], version)?;

    Ok(PackIdentifier {
        vendor: parts[0].to_string(),
        name: parts[1].to_string(),
        version: version.unwrap_or_default().to_string(),
        extension: String::new(),
        location: String::new(),
    })
}

/// Validates vendor, name and (when expected) version, in that order.
fn check_components(
    reference: &str,
    vendor: &str,
    name: &str,
    version: Option<&str>,
) -> Result<()> {
    if !valid_vendor_name(vendor) {
        debug!("Pack vendor \"{}\" is not a valid vendor name", vendor);
        return Err(CpkError::InvalidVendor {
            reference: reference.to_string(),
            vendor: vendor.to_string(),
        });
    }
    if !valid_pack_name(name) {
        debug!("Pack name \"{}\" is not a valid pack name", name);
        return Err(CpkError::InvalidName {
            reference: reference.to_string(),
            name: name.to_string(),
        });
    }
    if let Some(version) = version {
        if !valid_version(version) {
            debug!("Pack version \"{}\" is not a valid version", version);
            return Err(CpkError::InvalidVersion {
                reference: reference.to_string(),
                version: version.to_string(),
            });
        }
    }
    Ok(())
}

/// Splits a reference into its directory part (including the trailing
/// separator) and its trailing segment.
fn split_reference(reference: &str) -> (&str, &str) {
    match reference.rfind(|c: char| c == '/' || c == MAIN_SEPARATOR) {
        Some(idx) => reference.split_at(idx + 1),
        None => ("", reference),
    }
}

fn normalize_location(location: &str, base: Option<&Path>) -> Result<String> {
    if URI_PREFIXES.iter().any(|prefix| location.starts_with(prefix)) {
        return Ok(location.to_string());
    }

    let path = Path::new(location);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        match base {
            Some(base) => base.join(path),
            None => env::current_dir()?.join(path),
        }
    };

    let mut dir = clean_path(&absolute).to_string_lossy().into_owned();
    if !dir.ends_with(MAIN_SEPARATOR) {
        dir.push(MAIN_SEPARATOR);
    }
    Ok(format!("{FILE_URI_PREFIX}{dir}"))
}

/// Lexically removes `.` and `..` components.
fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                cleaned.pop();
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}
