// cpk-core/src/lib.rs

// Declare the top-level modules within the library crate
pub mod descriptor;
pub mod fs;
pub mod index;
pub mod installation;
pub mod pdsc;
mod xml;

#[cfg(test)]
mod testutil;

// Re-export key types for easier use by the CLI crate
pub use descriptor::{DescriptorReader, PdscReader};
pub use index::{IndexStore, LocalIndex, PidxStore};
pub use installation::Installation;
pub use pdsc::PdscUnit;
