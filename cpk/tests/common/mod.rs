//! Shared testing utilities for cpk CLI tests.

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Isolated pack root and work directory for one test.
#[allow(dead_code)]
pub struct TestContext {
    root: TempDir,
    pack_root: PathBuf,
    work_dir: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let root = TempDir::new().expect("Failed to create temp directory for tests");
        let pack_root = root.path().join("packs");
        let work_dir = root.path().join("work");
        fs::create_dir_all(&work_dir).expect("Failed to create test work directory");
        Self { root, pack_root, work_dir }
    }

    pub fn pack_root(&self) -> &Path {
        &self.pack_root
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    pub fn local_index(&self) -> PathBuf {
        self.pack_root.join(".Local").join("local_repository.pidx")
    }

    /// `cpk` pointed at this context's pack root, run from the work directory.
    pub fn cli(&self) -> Command {
        let mut cmd = Command::cargo_bin("cpk").expect("Failed to locate cpk binary");
        cmd.current_dir(&self.work_dir)
            .env("CMSIS_PACK_ROOT", &self.pack_root)
            .env_remove("CPK_PROXY")
            .env_remove("CPK_LOG")
            .env("NO_COLOR", "1");
        cmd
    }

    /// Writes a minimal descriptor into the work directory.
    pub fn write_pdsc(&self, file_name: &str, vendor: &str, name: &str, version: &str) -> PathBuf {
        let path = self.work_dir.join(file_name);
        fs::write(
            &path,
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<package schemaVersion="1.7.7">
  <vendor>{vendor}</vendor>
  <name>{name}</name>
  <description>Test pack</description>
  <releases>
    <release version="{version}">Latest</release>
  </releases>
</package>
"#
            ),
        )
        .expect("Failed to write descriptor");
        path
    }

    /// Initializes the pack root.
    pub fn init(&self) {
        self.cli().arg("init").assert().success();
    }
}
