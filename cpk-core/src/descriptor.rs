// cpk-core/src/descriptor.rs
//! Reading descriptor (PDSC) files.
//!
//! The version a descriptor declares is authoritative: it is the version of
//! the first `<release>` element, which PDSC files list newest first.

use std::fs;
use std::path::Path;

use cpk_common::error::{CpkError, Result};
use cpk_common::identifier::valid_version;
use cpk_common::model::DescriptorInfo;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::xml;

lazy_static! {
    static ref VENDOR_RE: Regex = Regex::new(r"(?s)<vendor\b[^>]*>(.*?)</vendor\s*>").unwrap();
    static ref NAME_RE: Regex = Regex::new(r"(?s)<name\b[^>]*>(.*?)</name\s*>").unwrap();
    static ref DESCRIPTION_RE: Regex =
        Regex::new(r"(?s)<description\b[^>]*>(.*?)</description\s*>").unwrap();
    static ref RELEASE_RE: Regex = Regex::new(r"<release\b([^>]*)>").unwrap();
}

/// Source of descriptor metadata. Implementations must be free of side
/// effects; callers cache the result.
pub trait DescriptorReader {
    fn read_descriptor(&self, path: &Path) -> Result<DescriptorInfo>;
}

/// Reads `.pdsc` files from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdscReader;

impl DescriptorReader for PdscReader {
    fn read_descriptor(&self, path: &Path) -> Result<DescriptorInfo> {
        debug!("Reading descriptor file {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| CpkError::DescriptorUnreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        parse_pdsc(&content).map_err(|reason| CpkError::DescriptorUnreadable {
            path: path.to_path_buf(),
            reason,
        })
    }
}

/// Extracts descriptor metadata from PDSC content.
pub fn parse_pdsc(content: &str) -> std::result::Result<DescriptorInfo, String> {
    let content = xml::strip_comments(content);

    // Only the package header is searched for vendor/name, so that nested
    // elements further down (components, examples) cannot shadow them.
    let header_end = content
        .find("<releases")
        .or_else(|| content.find("<release"))
        .unwrap_or(content.len());
    let header = &content[..header_end];

    let vendor = xml::element_text(header, &VENDOR_RE)
        .ok_or_else(|| "missing <vendor> element".to_string())?;
    let name =
        xml::element_text(header, &NAME_RE).ok_or_else(|| "missing <name> element".to_string())?;

    let release = RELEASE_RE
        .captures(&content)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| "no <release> element declared".to_string())?;
    let version = xml::attributes(release.as_str())
        .remove("version")
        .ok_or_else(|| "latest <release> has no version attribute".to_string())?;
    if !valid_version(&version) {
        return Err(format!("latest release version '{version}' is malformed"));
    }

    Ok(DescriptorInfo {
        vendor,
        name,
        version,
        description: xml::element_text(header, &DESCRIPTION_RE),
    })
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    const PDSC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package schemaVersion="1.7.7" xmlns:xs="http://www.w3.org/2001/XMLSchema-instance" xs:noNamespaceSchemaLocation="PACK.xsd">
  <vendor>TheVendor</vendor>
  <name>ThePack</name>
  <description>Drivers &amp; middleware</description>
  <url>https://example.com/packs/</url>
  <releases>
    <!-- <release version="9.9.9">not released yet</release> -->
    <release version="1.2.0" date="2024-02-01">Second release</release>
    <release version="1.1.0" date="2023-06-12">First release</release>
  </releases>
  <components>
    <component Cclass="Device" Cgroup="Startup">
      <description>Startup code</description>
    </component>
  </components>
</package>
"#;

    #[test]
    fn first_release_is_authoritative() {
        let info = parse_pdsc(PDSC).unwrap();
        assert_eq!(info.vendor, "TheVendor");
        assert_eq!(info.name, "ThePack");
        assert_eq!(info.version, "1.2.0");
        assert_eq!(info.description.as_deref(), Some("Drivers & middleware"));
    }

    #[test]
    fn missing_release_is_an_error() {
        let pdsc = "<package><vendor>V</vendor><name>P</name></package>";
        assert!(parse_pdsc(pdsc).unwrap_err().contains("<release>"));
    }

    #[test]
    fn malformed_release_version_is_an_error() {
        let pdsc =
            "<package><vendor>V</vendor><name>P</name><releases><release version=\"1.0\"/></releases></package>";
        assert!(parse_pdsc(pdsc).unwrap_err().contains("malformed"));
    }

    #[test]
    fn reader_reports_unreadable_files() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("Missing.Pack.pdsc");
        let err = PdscReader.read_descriptor(&missing).unwrap_err();
        assert!(matches!(err, CpkError::DescriptorUnreadable { ref path, .. } if path == &missing));

        let garbage = tmp.path().join("Garbage.Pack.pdsc");
        fs::write(&garbage, "this is not a descriptor").unwrap();
        assert!(matches!(
            PdscReader.read_descriptor(&garbage).unwrap_err(),
            CpkError::DescriptorUnreadable { .. }
        ));
    }

    #[test]
    fn reader_parses_files_on_disk() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("TheVendor.ThePack.pdsc");
        fs::write(&path, PDSC).unwrap();
        assert_eq!(PdscReader.read_descriptor(&path).unwrap().version, "1.2.0");
    }
}
