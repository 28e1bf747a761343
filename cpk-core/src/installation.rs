// cpk-core/src/installation.rs
use std::path::Path;

use cpk_common::error::Result;
use cpk_common::model::{DescriptorInfo, DescriptorReference};
use cpk_common::root::InstallationRoot;
use tracing::{debug, info, warn};

use crate::descriptor::{DescriptorReader, PdscReader};
use crate::fs::create_dir_all;
use crate::index::{IndexStore, LocalIndex, PidxStore};

/// Per-run installation state: the pack root, the local descriptor index and
/// the collaborators used to read descriptors and persist the index.
///
/// The index is loaded at most once per context; reloading would discard
/// edits made earlier in the same run. Mutations stay in memory until
/// [`Installation::flush`].
pub struct Installation {
    root: InstallationRoot,
    store: Box<dyn IndexStore>,
    reader: Box<dyn DescriptorReader>,
    local_index: LocalIndex,
    local_is_loaded: bool,
    local_is_dirty: bool,
}

impl Installation {
    pub fn new(root: InstallationRoot) -> Self {
        Self::with_collaborators(root, Box::new(PidxStore), Box::new(PdscReader))
    }

    pub fn with_collaborators(
        root: InstallationRoot,
        store: Box<dyn IndexStore>,
        reader: Box<dyn DescriptorReader>,
    ) -> Self {
        Self {
            root,
            store,
            reader,
            local_index: LocalIndex::default(),
            local_is_loaded: false,
            local_is_dirty: false,
        }
    }

    pub fn root(&self) -> &InstallationRoot {
        &self.root
    }

    /// Creates the standard directories below the pack root and writes an
    /// empty local index when none exists yet.
    pub fn prepare_layout(&mut self) -> Result<()> {
        for dir in [
            self.root.local_dir(),
            self.root.download_dir(),
            self.root.web_dir(),
        ] {
            create_dir_all(&dir)?;
        }
        if !self.root.local_index_path().exists() {
            info!(
                "Creating empty local index {}",
                self.root.local_index_path().display()
            );
            self.store.save(&[], &self.root)?;
        }
        Ok(())
    }

    /// Loads the local index from the store unless it was already loaded in
    /// this context.
    pub fn ensure_local_loaded(&mut self) -> Result<()> {
        if self.local_is_loaded {
            return Ok(());
        }
        let records = self.store.load(&self.root)?;
        self.local_index = LocalIndex::from_records(records);
        self.local_is_loaded = true;
        debug!(
            "Local index loaded with {} entries",
            self.local_index.len()
        );
        Ok(())
    }

    pub fn local_index(&mut self) -> Result<&LocalIndex> {
        self.ensure_local_loaded()?;
        Ok(&self.local_index)
    }

    /// Upserts `record`; returns whether the index changed.
    pub fn add_descriptor(&mut self, record: DescriptorReference) -> Result<bool> {
        self.ensure_local_loaded()?;
        let changed = self.local_index.add(record);
        self.local_is_dirty |= changed;
        Ok(changed)
    }

    /// Removes all records matching vendor and name, and version when
    /// non-empty.
    pub fn remove_descriptors(
        &mut self,
        vendor: &str,
        name: &str,
        version: &str,
    ) -> Result<Vec<DescriptorReference>> {
        self.ensure_local_loaded()?;
        let removed = self.local_index.remove(vendor, name, version);
        self.local_is_dirty |= !removed.is_empty();
        Ok(removed)
    }

    pub fn read_descriptor(&self, path: &Path) -> Result<DescriptorInfo> {
        self.reader.read_descriptor(path)
    }

    /// Whether there are in-memory changes not yet persisted.
    pub fn is_dirty(&self) -> bool {
        self.local_is_dirty
    }

    /// Persists the local index if it changed. On failure the in-memory
    /// index keeps its changes so the flush can be retried.
    pub fn flush(&mut self) -> Result<()> {
        if !self.local_is_dirty {
            debug!("Local index unchanged, nothing to write");
            return Ok(());
        }
        if let Err(e) = self.store.save(self.local_index.records(), &self.root) {
            warn!("Local index not written, changes kept in memory: {}", e);
            return Err(e);
        }
        self.local_is_dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use cpk_common::error::CpkError;
    use tempfile::TempDir;

    use super::*;
    use crate::testutil::{record, root_in, CountingReader, MemoryStore};

    fn installation(tmp: &TempDir, store: &MemoryStore) -> Installation {
        Installation::with_collaborators(
            root_in(tmp),
            Box::new(store.clone()),
            Box::new(CountingReader::default()),
        )
    }

    #[test]
    fn edits_survive_repeated_loads() {
        let tmp = TempDir::new().unwrap();
        let store = MemoryStore::with_records(vec![record("Vendor", "Old", "1.0.0")]);
        let mut inst = installation(&tmp, &store);

        inst.add_descriptor(record("Vendor", "New", "1.0.0")).unwrap();
        inst.ensure_local_loaded().unwrap();
        inst.ensure_local_loaded().unwrap();

        assert_eq!(store.loads.get(), 1);
        assert_eq!(inst.local_index().unwrap().len(), 2);
    }

    #[test]
    fn flush_is_a_no_op_without_changes() {
        let tmp = TempDir::new().unwrap();
        let store = MemoryStore::with_records(vec![record("Vendor", "Pack", "1.0.0")]);
        let mut inst = installation(&tmp, &store);

        assert!(!inst.add_descriptor(record("Vendor", "Pack", "1.0.0")).unwrap());
        assert!(inst.remove_descriptors("Vendor", "Other", "").unwrap().is_empty());
        inst.flush().unwrap();

        assert_eq!(store.saves.get(), 0);
    }

    #[test]
    fn failed_flush_keeps_changes_for_a_retry() {
        let tmp = TempDir::new().unwrap();
        let store = MemoryStore::default();
        let mut inst = installation(&tmp, &store);
        inst.add_descriptor(record("Vendor", "Pack", "1.0.0")).unwrap();

        store.fail_saves.set(true);
        assert!(matches!(
            inst.flush().unwrap_err(),
            CpkError::IndexWriteError { .. }
        ));
        assert!(inst.is_dirty());
        assert_eq!(inst.local_index().unwrap().len(), 1);
        assert!(store.records.borrow().is_empty());

        store.fail_saves.set(false);
        inst.flush().unwrap();
        assert!(!inst.is_dirty());
        assert_eq!(*store.records.borrow(), vec![record("Vendor", "Pack", "1.0.0")]);
    }

    #[test]
    fn prepare_layout_creates_directories_and_empty_index() {
        let tmp = TempDir::new().unwrap();
        let mut inst = Installation::new(root_in(&tmp));
        inst.prepare_layout().unwrap();

        let root = inst.root().clone();
        assert!(root.local_dir().is_dir());
        assert!(root.download_dir().is_dir());
        assert!(root.web_dir().is_dir());
        assert!(root.local_index_path().is_file());
        assert!(inst.local_index().unwrap().is_empty());
    }
}
