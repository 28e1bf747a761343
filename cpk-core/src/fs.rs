// cpk-core/src/fs.rs
//! Primitive synchronous filesystem operations.
use std::fs::{self, Permissions};
use std::io::{self, Write};
use std::path::Path;

use cpk_common::error::{CpkError, Result};
use tempfile::Builder;
use tracing::{debug, error};

/// Creates a directory and all its parent components if they are missing.
pub fn create_dir_all(path: &Path) -> Result<()> {
    debug!("Creating directory recursively: {}", path.display());
    fs::create_dir_all(path).map_err(|e| {
        error!("Failed create dir {}: {}", path.display(), e);
        CpkError::from(e)
    })
}

/// Replaces the contents of `target` in one step. The new bytes go to a
/// hidden sibling (`.<name>.XXXXXX.tmp`) that is renamed over the target,
/// so readers see either the old file or the new one. An existing file's
/// permissions carry over to the replacement.
pub fn replace_file(target: &Path, content: &[u8]) -> Result<()> {
    let (Some(dir), Some(name)) = (target.parent(), target.file_name()) else {
        return Err(CpkError::from(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} does not name a file", target.display()),
        )));
    };
    create_dir_all(dir)?;
    let kept_permissions: Option<Permissions> =
        fs::metadata(target).ok().map(|meta| meta.permissions());

    let prefix = format!(".{}.", name.to_string_lossy());
    let mut staged = Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(dir)?;
    debug!(
        "Staging {} bytes for {} in {}",
        content.len(),
        target.display(),
        staged.path().display()
    );
    staged.write_all(content)?;
    staged.as_file().sync_all()?;
    if let Some(permissions) = kept_permissions {
        staged.as_file().set_permissions(permissions)?;
    }

    staged.persist(target).map_err(|e| {
        error!("Could not move staged file over {}: {}", target.display(), e.error);
        CpkError::from(e.error)
    })?;
    Ok(())
}
