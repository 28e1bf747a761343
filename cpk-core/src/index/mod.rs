// cpk-core/src/index/mod.rs
//! In-memory local descriptor index and its persistence.
pub mod pidx;

use cpk_common::model::DescriptorReference;
use tracing::debug;

pub use pidx::{IndexStore, PidxStore};

/// Ordered collection of descriptor installations, at most one record per
/// `(vendor, name, version)`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LocalIndex {
    records: Vec<DescriptorReference>,
}

impl LocalIndex {
    /// Builds an index from persisted records. Duplicate keys keep their
    /// first occurrence.
    pub fn from_records(records: Vec<DescriptorReference>) -> Self {
        let mut index = Self::default();
        for record in records {
            if index.records.iter().any(|r| r.same_key(&record)) {
                debug!("Dropping duplicate local index entry {}", record);
                continue;
            }
            index.records.push(record);
        }
        index
    }

    pub fn records(&self) -> &[DescriptorReference] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Inserts `record`, or refreshes the location of the record with the
    /// same key. Returns whether the index changed.
    pub fn add(&mut self, record: DescriptorReference) -> bool {
        match self.records.iter_mut().find(|r| r.same_key(&record)) {
            Some(existing) if existing.location == record.location => {
                debug!("{} is already in the local index", record);
                false
            }
            Some(existing) => {
                debug!(
                    "Updating location of {} from {} to {}",
                    record, existing.location, record.location
                );
                existing.location = record.location;
                true
            }
            None => {
                debug!("Adding {} to the local index", record);
                self.records.push(record);
                true
            }
        }
    }

    /// Removes every record matching vendor and name, and version when
    /// non-empty. Returns the removed records in index order.
    pub fn remove(&mut self, vendor: &str, name: &str, version: &str) -> Vec<DescriptorReference> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.records)
            .into_iter()
            .partition(|r| r.matches(vendor, name, version));
        self.records = kept;
        debug!(
            "Removed {} local index entries for {}.{} (version: '{}')",
            removed.len(),
            vendor,
            name,
            version
        );
        removed
    }
}
