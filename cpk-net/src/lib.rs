// cpk-net/src/lib.rs
pub mod http;
pub mod validation;

pub use cpk_common::error::{CpkError, Result};
pub use http::{build_http_client, fetch_descriptor};
pub use reqwest::Client;
pub use validation::validate_url;
