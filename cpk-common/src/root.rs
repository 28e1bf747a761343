// cpk-common/src/root.rs
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::error::{CpkError, Result};

const LOCAL_DIR: &str = ".Local";
const DOWNLOAD_DIR: &str = ".Download";
const WEB_DIR: &str = ".Web";
const LOCAL_INDEX_FILENAME: &str = "local_repository.pidx";

/// The directory owning all persisted installation state of one run.
///
/// Built once per invocation by [`InstallationRoot::set`] and never mutated
/// afterwards; everything that touches the local index goes through it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallationRoot {
    root_path: PathBuf,
    created: bool,
}

impl InstallationRoot {
    /// Validates `path` as the pack root, creating it when it is missing and
    /// `create_if_missing` is set.
    pub fn set(path: &Path, create_if_missing: bool) -> Result<Self> {
        let root_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            env::current_dir()?.join(path)
        };
        debug!("Using pack root: {}", root_path.display());

        if root_path.exists() {
            if !root_path.is_dir() {
                return Err(CpkError::RootNotWritable {
                    path: root_path,
                    reason: "not a directory".to_string(),
                });
            }
            return Ok(Self {
                root_path,
                created: false,
            });
        }

        if !create_if_missing {
            return Err(CpkError::RootNotFound { path: root_path });
        }

        info!("Creating pack root {}", root_path.display());
        fs::create_dir_all(&root_path).map_err(|e| CpkError::RootNotWritable {
            path: root_path.clone(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            root_path,
            created: true,
        })
    }

    pub fn path(&self) -> &Path {
        &self.root_path
    }

    /// Whether this run created the root directory.
    pub fn created(&self) -> bool {
        self.created
    }

    pub fn local_dir(&self) -> PathBuf {
        self.root_path.join(LOCAL_DIR)
    }

    pub fn download_dir(&self) -> PathBuf {
        self.root_path.join(DOWNLOAD_DIR)
    }

    pub fn web_dir(&self) -> PathBuf {
        self.root_path.join(WEB_DIR)
    }

    /// `<root>/.Local/local_repository.pidx`
    pub fn local_index_path(&self) -> PathBuf {
        self.local_dir().join(LOCAL_INDEX_FILENAME)
    }
}
