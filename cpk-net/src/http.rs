use std::path::{Path, PathBuf};
use std::time::Duration;

use cpk_common::error::{CpkError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Proxy, StatusCode};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, warn};
use url::Url;

use crate::validation::validate_url;

const DOWNLOAD_TIMEOUT_SECS: u64 = 300;
const CONNECT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT_STRING: &str = concat!("cpk/", env!("CARGO_PKG_VERSION"));

/// Builds the client used for every download of a run, routed through
/// `proxy` when one is configured.
pub fn build_http_client(proxy: Option<&Url>) -> Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_STRING));
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));

    let mut builder = Client::builder()
        .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(10));
    if let Some(proxy) = proxy {
        debug!("Using proxy {}", proxy);
        let proxy = Proxy::all(proxy.as_str())
            .map_err(|e| CpkError::HttpError(format!("Invalid proxy '{proxy}': {e}")))?;
        builder = builder.proxy(proxy);
    }
    builder
        .build()
        .map_err(|e| CpkError::HttpError(format!("Failed to build HTTP client: {e}")))
}

/// Downloads the descriptor at `url` into `dest_dir`, keeping the file name
/// from the URL. Returns the path of the downloaded copy.
pub async fn fetch_descriptor(client: &Client, url: &str, dest_dir: &Path) -> Result<PathBuf> {
    let parsed = validate_url(url)?;
    let filename = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .ok_or_else(|| CpkError::ValidationError(format!("URL '{url}' has no file name")))?;

    fs::create_dir_all(dest_dir).await?;
    let final_path = dest_dir.join(&filename);
    let temp_path = dest_dir.join(format!(".{filename}.download"));
    debug!("Downloading {} to {}", url, temp_path.display());
    if fs::try_exists(&temp_path).await.unwrap_or(false) {
        if let Err(e) = fs::remove_file(&temp_path).await {
            warn!(
                "Could not remove existing temporary file {}: {}",
                temp_path.display(),
                e
            );
        }
    }

    let response = client.get(parsed).send().await.map_err(|e| {
        debug!("HTTP request failed for {url}: {e}");
        CpkError::HttpError(format!("HTTP request failed for {url}: {e}"))
    })?;
    let status = response.status();
    debug!("Received HTTP status: {} for {}", status, url);

    if !status.is_success() {
        error!("HTTP error {} for URL {}", status, url);
        return match status {
            StatusCode::NOT_FOUND => Err(CpkError::DownloadError(
                filename,
                url.to_string(),
                "Resource not found (404)".to_string(),
            )),
            StatusCode::FORBIDDEN => Err(CpkError::DownloadError(
                filename,
                url.to_string(),
                "Access forbidden (403)".to_string(),
            )),
            _ => Err(CpkError::HttpError(format!(
                "HTTP error {status} for URL {url}"
            ))),
        };
    }

    let content = response
        .bytes()
        .await
        .map_err(|e| CpkError::HttpError(format!("Failed to read response body bytes: {e}")))?;
    let mut temp_file = fs::File::create(&temp_path).await?;
    temp_file.write_all(&content).await?;
    temp_file.flush().await?;
    drop(temp_file);

    fs::rename(&temp_path, &final_path).await?;
    debug!("Downloaded descriptor to {}", final_path.display());
    Ok(final_path)
}
