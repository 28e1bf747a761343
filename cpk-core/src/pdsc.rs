// cpk-core/src/pdsc.rs
//! Install and uninstall of packs through their descriptor file.
//!
//! A [`PdscUnit`] moves through `Tagged` (reference resolved, local index
//! loaded) and `FileBacked` (descriptor parsed, authoritative version known)
//! before it is recorded in, or removed from, the local index.

use std::path::{Path, PathBuf};

use cpk_common::error::{CpkError, Result};
use cpk_common::model::{DescriptorInfo, DescriptorReference};
use cpk_common::reference::{resolve, PackIdentifier, ReferenceMode, PDSC_EXTENSION};
use tracing::{debug, warn};

use crate::installation::Installation;

#[derive(Debug, Clone)]
pub struct PdscUnit {
    reference: String,
    source_path: Option<PathBuf>,
    tag: PackIdentifier,
    file: Option<DescriptorInfo>,
}

impl PdscUnit {
    /// Resolves a descriptor reference (`[location/]Vendor.Pack.pdsc`) for
    /// installation and makes sure the local index is loaded.
    pub fn prepare(reference: &str, installation: &mut Installation) -> Result<Self> {
        let tag = resolve(reference, ReferenceMode::Full)?;
        if !tag.is_descriptor() {
            return Err(CpkError::ValidationError(format!(
                "'{reference}' is not a descriptor ({PDSC_EXTENSION}) reference"
            )));
        }
        Self::tagged(reference, tag, installation)
    }

    /// Resolves a reference for removal. `Vendor.Pack[.x.y.z]` addresses
    /// installed entries directly; a `.pdsc` path removes every version of
    /// that pack.
    pub fn prepare_removal(reference: &str, installation: &mut Installation) -> Result<Self> {
        let mode = if reference.ends_with(PDSC_EXTENSION) {
            ReferenceMode::Full
        } else {
            ReferenceMode::Short
        };
        let tag = resolve(reference, mode)?;
        Self::tagged(reference, tag, installation)
    }

    fn tagged(reference: &str, tag: PackIdentifier, installation: &mut Installation) -> Result<Self> {
        installation.ensure_local_loaded()?;
        // The file name may carry a version the tag dropped.
        let source_path = tag
            .local_path()
            .map(|path| match Path::new(reference).file_name() {
                Some(file) => path.with_file_name(file),
                None => path,
            });
        Ok(Self {
            reference: reference.to_string(),
            source_path,
            tag,
            file: None,
        })
    }

    pub fn tag(&self) -> &PackIdentifier {
        &self.tag
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Descriptor metadata, once the file has been read.
    pub fn descriptor(&self) -> Option<&DescriptorInfo> {
        self.file.as_ref()
    }

    /// Points the unit at a downloaded copy of a remote descriptor. The
    /// recorded location stays the remote one.
    pub fn set_local_copy(&mut self, path: PathBuf) {
        debug!(
            "Using local copy {} for {}",
            path.display(),
            self.reference
        );
        self.source_path = Some(path);
        self.file = None;
    }

    /// Returns the index record for this unit, taking the version from the
    /// descriptor file. The file is parsed on first use only.
    pub fn to_descriptor_reference(
        &mut self,
        installation: &Installation,
    ) -> Result<DescriptorReference> {
        let version = match &self.file {
            Some(info) => info.version.clone(),
            None => {
                let info = self.read_file(installation)?;
                let version = info.version.clone();
                self.file = Some(info);
                version
            }
        };
        self.tag.version = version;
        Ok(DescriptorReference::from(&self.tag))
    }

    fn read_file(&self, installation: &Installation) -> Result<DescriptorInfo> {
        let path = self
            .source_path
            .as_deref()
            .ok_or_else(|| CpkError::DescriptorUnreadable {
                path: PathBuf::from(&self.reference),
                reason: "remote descriptor has not been downloaded".to_string(),
            })?;
        let info = installation.read_descriptor(path)?;
        if info.vendor != self.tag.vendor || info.name != self.tag.name {
            warn!(
                "Descriptor {} declares {}.{} but is named {}.{}",
                path.display(),
                info.vendor,
                info.name,
                self.tag.vendor,
                self.tag.name
            );
        }
        Ok(info)
    }

    /// Records this descriptor in the local index. Returns whether the index
    /// changed; re-installing the same version is not an error.
    pub fn install(&mut self, installation: &mut Installation) -> Result<bool> {
        debug!("Installing \"{}\"", self.reference);
        let record = self.to_descriptor_reference(installation)?;
        installation.add_descriptor(record)
    }

    /// Removes matching entries from the local index. Without a version
    /// every installed version of the pack is removed.
    pub fn uninstall(&self, installation: &mut Installation) -> Result<Vec<DescriptorReference>> {
        debug!("Uninstalling \"{}\"", self.reference);
        let removed =
            installation.remove_descriptors(&self.tag.vendor, &self.tag.name, &self.tag.version)?;
        if removed.is_empty() {
            return Err(CpkError::NotInstalled(format!(
                "no local index entry matches {}",
                self.tag
            )));
        }
        Ok(removed)
    }
}
