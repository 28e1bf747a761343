// cpk-core/src/index/pidx.rs
use std::fs;
use std::io;
use std::path::Path;

use chrono::{SecondsFormat, Utc};
use cpk_common::error::{CpkError, Result};
use cpk_common::model::DescriptorReference;
use cpk_common::root::InstallationRoot;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, error};

use crate::fs::replace_file;
use crate::xml;

lazy_static! {
    static ref INDEX_RE: Regex = Regex::new(r"<index\b").unwrap();
    static ref PINDEX_RE: Regex = Regex::new(r"(?s)<pindex\b[^>]*>(.*?)</pindex\s*>").unwrap();
    static ref PDSC_TAG_RE: Regex = Regex::new(r"<pdsc\b([^>]*?)/?>").unwrap();
}

/// Persistence of the local descriptor index.
pub trait IndexStore {
    /// Loads the persisted records; a missing index is empty.
    fn load(&self, root: &InstallationRoot) -> Result<Vec<DescriptorReference>>;
    /// Replaces the persisted index with `records`.
    fn save(&self, records: &[DescriptorReference], root: &InstallationRoot) -> Result<()>;
}

/// Stores the index as `<root>/.Local/local_repository.pidx`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PidxStore;

impl IndexStore for PidxStore {
    fn load(&self, root: &InstallationRoot) -> Result<Vec<DescriptorReference>> {
        let path = root.local_index_path();
        debug!("Loading local index from {}", path.display());

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Local index {} does not exist yet", path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(CpkError::IndexCorrupt {
                    path,
                    reason: e.to_string(),
                })
            }
        };

        let records = parse_pidx(&content)
            .map_err(|reason| CpkError::IndexCorrupt { path: path.clone(), reason })?;
        debug!("Loaded {} local index entries", records.len());
        Ok(records)
    }

    fn save(&self, records: &[DescriptorReference], root: &InstallationRoot) -> Result<()> {
        let path = root.local_index_path();
        debug!(
            "Writing {} local index entries to {}",
            records.len(),
            path.display()
        );
        let content = render_pidx(records, &root_url(root.path()));
        replace_file(&path, content.as_bytes()).map_err(|e| {
            error!("Failed to write local index {}: {}", path.display(), e);
            CpkError::IndexWriteError {
                path: path.clone(),
                reason: e.to_string(),
            }
        })
    }
}

fn root_url(root: &Path) -> String {
    let path = root.to_string_lossy();
    format!("file://localhost/{}", path.trim_start_matches(['/', '\\']))
}

pub fn parse_pidx(content: &str) -> std::result::Result<Vec<DescriptorReference>, String> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let content = xml::strip_comments(content);
    if !INDEX_RE.is_match(&content) {
        return Err("missing <index> root element".to_string());
    }

    let pindex = match PINDEX_RE.captures(&content).and_then(|caps| caps.get(1)) {
        Some(body) => body.as_str(),
        None => return Ok(Vec::new()),
    };

    PDSC_TAG_RE
        .captures_iter(pindex)
        .filter_map(|caps| caps.get(1))
        .map(|tag| -> std::result::Result<DescriptorReference, String> {
            let mut attrs = xml::attributes(tag.as_str());
            let mut take = |key: &str| {
                attrs
                    .remove(key)
                    .ok_or_else(|| format!("<pdsc> entry without '{key}' attribute"))
            };
            Ok(DescriptorReference {
                vendor: take("vendor")?,
                name: take("name")?,
                version: take("version")?,
                location: take("url")?,
            })
        })
        .collect()
}

pub fn render_pidx(records: &[DescriptorReference], root_url: &str) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\" ?>\n");
    out.push_str(
        "<index schemaVersion=\"1.1.0\" xmlns:xs=\"http://www.w3.org/2001/XMLSchema-instance\" xs:noNamespaceSchemaLocation=\"PackIndex.xsd\">\n",
    );
    out.push_str("  <vendor>local</vendor>\n");
    out.push_str(&format!("  <url>{}</url>\n", xml::escape(root_url)));
    out.push_str(&format!(
        "  <timestamp>{}</timestamp>\n",
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    ));
    out.push_str("  <pindex>\n");
    for record in records {
        out.push_str(&format!(
            "    <pdsc url=\"{}\" vendor=\"{}\" name=\"{}\" version=\"{}\"/>\n",
            xml::escape(&record.location),
            xml::escape(&record.vendor),
            xml::escape(&record.name),
            xml::escape(&record.version)
        ));
    }
    out.push_str("  </pindex>\n");
    out.push_str("</index>\n");
    out
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn record(vendor: &str, name: &str, version: &str, location: &str) -> DescriptorReference {
        DescriptorReference {
            vendor: vendor.to_string(),
            name: name.to_string(),
            version: version.to_string(),
            location: location.to_string(),
        }
    }

    #[test]
    fn missing_index_loads_empty() {
        let tmp = TempDir::new().unwrap();
        let root = InstallationRoot::set(tmp.path(), false).unwrap();
        assert!(PidxStore.load(&root).unwrap().is_empty());
    }

    #[test]
    fn saved_records_load_back_in_order() {
        let tmp = TempDir::new().unwrap();
        let root = InstallationRoot::set(tmp.path(), false).unwrap();
        let records = vec![
            record("Zeta", "Pack", "2.0.0", "file:///dev/zeta/"),
            record("Alpha", "Pack", "1.0.0-rc.1", "https://example.com/a&b/"),
        ];

        PidxStore.save(&records, &root).unwrap();
        assert!(root.local_index_path().is_file());
        let raw = fs::read_to_string(root.local_index_path()).unwrap();
        assert!(raw.contains("https://example.com/a&amp;b/"));

        assert_eq!(PidxStore.load(&root).unwrap(), records);
    }

    #[test]
    fn reads_indexes_written_by_other_tools() {
        let content = r#"<?xml version="1.0" encoding="UTF-8" ?>
<index schemaVersion="1.1.0">
  <vendor>local</vendor>
  <url>file://localhost/packs</url>
  <!-- <pdsc url="file:///old/" vendor="Old" name="Pack" version="0.1.0"/> -->
  <pindex>
    <pdsc url='file:///dev/' vendor='ARM' name='CMSIS' version='5.9.0'></pdsc>
    <pdsc vendor="Keil" name="MDK" version="1.0.0" url="file:///k/" />
  </pindex>
</index>"#;
        let records = parse_pidx(content).unwrap();
        assert_eq!(
            records,
            vec![
                record("ARM", "CMSIS", "5.9.0", "file:///dev/"),
                record("Keil", "MDK", "1.0.0", "file:///k/"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn root_url_has_a_single_slash_after_host() {
        assert_eq!(
            root_url(Path::new("/opt/packs")),
            "file://localhost/opt/packs"
        );

        let tmp = TempDir::new().unwrap();
        let root = InstallationRoot::set(tmp.path(), false).unwrap();
        PidxStore.save(&[], &root).unwrap();
        let raw = fs::read_to_string(root.local_index_path()).unwrap();
        assert!(raw.contains("<url>file://localhost/"));
        assert!(!raw.contains("file://localhost//"));
    }

    #[test]
    fn index_without_pindex_is_empty() {
        assert!(parse_pidx("<index><vendor>local</vendor></index>")
            .unwrap()
            .is_empty());
        assert!(parse_pidx("  \n").unwrap().is_empty());
    }

    #[test]
    fn corrupt_index_is_reported() {
        let tmp = TempDir::new().unwrap();
        let root = InstallationRoot::set(tmp.path(), false).unwrap();
        fs::create_dir_all(root.local_dir()).unwrap();

        fs::write(root.local_index_path(), "garbage").unwrap();
        assert!(matches!(
            PidxStore.load(&root).unwrap_err(),
            CpkError::IndexCorrupt { .. }
        ));

        fs::write(
            root.local_index_path(),
            "<index><pindex><pdsc vendor=\"V\" name=\"P\" url=\"file:///x/\"/></pindex></index>",
        )
        .unwrap();
        let err = PidxStore.load(&root).unwrap_err();
        assert!(matches!(err, CpkError::IndexCorrupt { ref reason, .. } if reason.contains("version")));
    }

    #[cfg(unix)]
    #[test]
    fn unwritable_index_location_is_a_write_error() {
        let tmp = TempDir::new().unwrap();
        let root = InstallationRoot::set(tmp.path(), false).unwrap();
        // A file where the .Local directory should be.
        fs::write(root.local_dir(), "").unwrap();
        let err = PidxStore
            .save(&[record("V", "P", "1.0.0", "file:///x/")], &root)
            .unwrap_err();
        assert!(matches!(err, CpkError::IndexWriteError { .. }));
    }
}
