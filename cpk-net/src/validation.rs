// cpk-net/src/validation.rs
use cpk_common::error::{CpkError, Result};
use url::Url;

/// Validates a URL, ensuring it uses the HTTP or HTTPS scheme.
pub fn validate_url(url_str: &str) -> Result<Url> {
    let url = Url::parse(url_str).map_err(|e| {
        CpkError::ValidationError(format!("Failed to parse URL '{url_str}': {e}"))
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(CpkError::ValidationError(format!(
            "Invalid URL scheme for '{url_str}': Must be http or https, but got '{scheme}'"
        ))),
    }
}
