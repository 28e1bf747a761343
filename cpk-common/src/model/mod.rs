// cpk-common/src/model/mod.rs
pub mod descriptor;

pub use descriptor::{DescriptorInfo, DescriptorReference};
