// cpk-common/src/config.rs
use std::path::{Path, PathBuf};

use tracing::debug;
use url::Url;

use super::error::{CpkError, Result};

/// Default pack root below the user cache directory, as used by the CMSIS
/// toolchains.
const DEFAULT_PACK_ROOT_SUBDIR: &str = "arm/packs";

/// Log verbosity picked on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

/// Validated invocation settings, built once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    pub verbosity: Verbosity,
    pub proxy: Option<Url>,
    pub pack_root: PathBuf,
    pub create_pack_root: bool,
}

impl Settings {
    /// Builds settings from raw flag values.
    ///
    /// `-v` and `-q` are mutually exclusive; the proxy, when given, must be
    /// an absolute URL. A missing pack root falls back to
    /// [`default_pack_root`].
    pub fn new(
        verbose: bool,
        quiet: bool,
        proxy: Option<&str>,
        pack_root: Option<PathBuf>,
        create_pack_root: bool,
    ) -> Result<Self> {
        debug!("Loading cpk settings");

        let verbosity = match (verbose, quiet) {
            (true, true) => {
                return Err(CpkError::Config(
                    "both \"-q\" and \"-v\" were specified, please pick only one verboseness option"
                        .to_string(),
                ))
            }
            (true, false) => Verbosity::Verbose,
            (false, true) => Verbosity::Quiet,
            (false, false) => Verbosity::Normal,
        };

        let proxy = match proxy.filter(|p| !p.is_empty()) {
            Some(raw) => Some(
                Url::parse(raw)
                    .map_err(|e| CpkError::Config(format!("Invalid proxy URL '{raw}': {e}")))?,
            ),
            None => None,
        };

        let pack_root = match pack_root.filter(|p| !p.as_os_str().is_empty()) {
            Some(root) => root,
            None => {
                let fallback = default_pack_root()?;
                debug!(
                    "No pack root given, falling back to default: {}",
                    fallback.display()
                );
                fallback
            }
        };
        debug!("Effective pack root set to: {}", pack_root.display());

        Ok(Self {
            verbosity,
            proxy,
            pack_root,
            create_pack_root,
        })
    }

    pub fn pack_root(&self) -> &Path {
        &self.pack_root
    }

    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }
}

pub fn default_pack_root() -> Result<PathBuf> {
    dirs::cache_dir()
        .map(|dir| dir.join(DEFAULT_PACK_ROOT_SUBDIR))
        .ok_or_else(|| {
            CpkError::Config(
                "Could not determine a default pack root; pass --pack-root or set CMSIS_PACK_ROOT"
                    .to_string(),
            )
        })
}
