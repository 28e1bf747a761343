// cpk-common/src/lib.rs
pub mod config;
pub mod error;
pub mod identifier;
pub mod model;
pub mod reference;
pub mod root;

// Re-export key types
pub use config::Settings;
pub use error::{CpkError, Result};
pub use model::{DescriptorInfo, DescriptorReference};
pub use reference::{PackIdentifier, ReferenceMode};
pub use root::InstallationRoot;
