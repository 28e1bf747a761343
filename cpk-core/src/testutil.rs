// cpk-core/src/testutil.rs
//! In-memory collaborators shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use cpk_common::error::{CpkError, Result};
use cpk_common::model::{DescriptorInfo, DescriptorReference};
use cpk_common::root::InstallationRoot;
use tempfile::TempDir;

use crate::descriptor::{DescriptorReader, PdscReader};
use crate::index::IndexStore;

#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    pub records: Rc<RefCell<Vec<DescriptorReference>>>,
    pub loads: Rc<Cell<usize>>,
    pub saves: Rc<Cell<usize>>,
    pub fail_saves: Rc<Cell<bool>>,
}

impl MemoryStore {
    pub fn with_records(records: Vec<DescriptorReference>) -> Self {
        let store = Self::default();
        *store.records.borrow_mut() = records;
        store
    }
}

impl IndexStore for MemoryStore {
    fn load(&self, _root: &InstallationRoot) -> Result<Vec<DescriptorReference>> {
        self.loads.set(self.loads.get() + 1);
        Ok(self.records.borrow().clone())
    }

    fn save(&self, records: &[DescriptorReference], root: &InstallationRoot) -> Result<()> {
        if self.fail_saves.get() {
            return Err(CpkError::IndexWriteError {
                path: root.local_index_path(),
                reason: "disk full".to_string(),
            });
        }
        self.saves.set(self.saves.get() + 1);
        *self.records.borrow_mut() = records.to_vec();
        Ok(())
    }
}

/// Reads real files and counts how often it was asked to.
#[derive(Clone, Default)]
pub(crate) struct CountingReader {
    pub reads: Rc<Cell<usize>>,
}

impl DescriptorReader for CountingReader {
    fn read_descriptor(&self, path: &Path) -> Result<DescriptorInfo> {
        self.reads.set(self.reads.get() + 1);
        PdscReader.read_descriptor(path)
    }
}

pub(crate) fn root_in(tmp: &TempDir) -> InstallationRoot {
    InstallationRoot::set(tmp.path(), false).unwrap()
}

pub(crate) fn record(vendor: &str, name: &str, version: &str) -> DescriptorReference {
    DescriptorReference {
        vendor: vendor.to_string(),
        name: name.to_string(),
        version: version.to_string(),
        location: "file:///dev/".to_string(),
    }
}

pub(crate) fn write_pdsc(
    dir: &Path,
    file_name: &str,
    vendor: &str,
    name: &str,
    version: &str,
) -> PathBuf {
    let path = dir.join(file_name);
    fs::write(
        &path,
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<package schemaVersion="1.7.7">
  <vendor>{vendor}</vendor>
  <name>{name}</name>
  <description>Test pack</description>
  <releases>
    <release version="{version}">Initial release</release>
  </releases>
</package>
"#
        ),
    )
    .unwrap();
    path
}
