use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Grammar for vendor and pack names, quoted in error messages.
pub const PACK_NAME_GRAMMAR: &str = "[0-9A-Za-z_-]+";
/// Grammar for pack versions, quoted in error messages.
pub const PACK_VERSION_GRAMMAR: &str = "MAJOR.MINOR.PATCH[-prerelease][+build]";

#[derive(Error, Debug, Clone)]
pub enum CpkError {
    #[error("I/O Error: {0}")]
    Io(#[from] Arc<std::io::Error>),

    #[error("HTTP Request Error: {0}")]
    Http(#[from] Arc<reqwest::Error>),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Malformed pack reference '{reference}': expected {expected}")]
    MalformedReference {
        reference: String,
        expected: &'static str,
    },

    #[error(
        "Invalid extension '{extension}' in pack reference '{reference}': expected one of .zip, .pack, .pdsc"
    )]
    InvalidExtension { reference: String, extension: String },

    #[error("Invalid vendor '{vendor}' in pack reference '{reference}': must match {}", PACK_NAME_GRAMMAR)]
    InvalidVendor { reference: String, vendor: String },

    #[error("Invalid pack name '{name}' in pack reference '{reference}': must match {}", PACK_NAME_GRAMMAR)]
    InvalidName { reference: String, name: String },

    #[error(
        "Invalid version '{version}' in pack reference '{reference}': must match {}", PACK_VERSION_GRAMMAR
    )]
    InvalidVersion { reference: String, version: String },

    #[error("Descriptor file {} could not be read: {reason}", .path.display())]
    DescriptorUnreadable { path: PathBuf, reason: String },

    #[error("Local index {} is corrupt: {reason}", .path.display())]
    IndexCorrupt { path: PathBuf, reason: String },

    #[error("Failed to write local index {}: {reason}", .path.display())]
    IndexWriteError { path: PathBuf, reason: String },

    #[error("Pack root {} does not exist (use --create-pack-root to create it)", .path.display())]
    RootNotFound { path: PathBuf },

    #[error("Pack root {} is not usable: {reason}", .path.display())]
    RootNotWritable { path: PathBuf, reason: String },

    #[error("Not installed: {0}")]
    NotInstalled(String),

    #[error("DownloadError: Failed to download '{0}' from '{1}': {2}")]
    DownloadError(String, String, String),

    #[error("HttpError: {0}")]
    HttpError(String),

    #[error("Validation Error: {0}")]
    ValidationError(String),

    #[error("Generic Error: {0}")]
    Generic(String),
}

impl CpkError {
    /// True for the kinds produced while resolving a pack reference.
    pub fn is_identifier_error(&self) -> bool {
        matches!(
            self,
            CpkError::MalformedReference { .. }
                | CpkError::InvalidExtension { .. }
                | CpkError::InvalidVendor { .. }
                | CpkError::InvalidName { .. }
                | CpkError::InvalidVersion { .. }
        )
    }
}

impl From<std::io::Error> for CpkError {
    fn from(err: std::io::Error) -> Self {
        CpkError::Io(Arc::new(err))
    }
}

impl From<reqwest::Error> for CpkError {
    fn from(err: reqwest::Error) -> Self {
        CpkError::Http(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, CpkError>;
