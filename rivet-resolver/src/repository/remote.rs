// rivet-resolver/src/repository/remote.rs
// Blocking HTTPS fetch of repository files into the local layout. One
// attempt per endpoint, last error wins; a published .sha256 sidecar is
// verified when present.
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use rivet_common::error::{Result, RivetError};
use tracing::{debug, error};
use url::Url;

use super::local::verify_checksum;

const DOWNLOAD_TIMEOUT_SECS: u64 = 300;
const CONNECT_TIMEOUT_SECS: u64 = 30;
const USER_AGENT_STRING: &str = "rivet artifact resolver (Rust; +https://github.com/rivet-build/rivet)";

#[derive(Debug, Clone)]
pub struct RemoteClient {
    client: Client,
    endpoints: Vec<String>,
    offline: bool,
}

impl RemoteClient {
    pub fn new(endpoints: Vec<String>, offline: bool) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .user_agent(USER_AGENT_STRING)
            .build()?;
        Ok(Self {
            client,
            endpoints,
            offline,
        })
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    pub fn is_offline(&self) -> bool {
        self.offline
    }

    /// Fetch `relative_path` from the configured endpoints (plus
    /// `extra_endpoints`, tried after them) into `dest`.
    pub fn fetch(
        &self,
        relative_path: &str,
        extra_endpoints: &[String],
        dest: &Path,
    ) -> Result<PathBuf> {
        if self.offline {
            return Err(RivetError::NotFound(format!(
                "offline mode: will not fetch '{relative_path}'"
            )));
        }

        let mut last_error: Option<RivetError> = None;
        for endpoint in self.endpoints.iter().chain(extra_endpoints.iter()) {
            let endpoint = endpoint.trim_end_matches('/');
            let url = format!("{endpoint}/{relative_path}");
            if let Err(e) = validate_url(&url) {
                error!("Skipping invalid repository endpoint {}: {}", endpoint, e);
                last_error = Some(e);
                continue;
            }
            debug!("Attempting download from: {}", url);
            match self.download(&url, dest) {
                Ok(path) => {
                    debug!("Successfully downloaded: {}", path.display());
                    return Ok(path);
                }
                Err(e) => {
                    debug!("Download attempt failed from {}: {}", url, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            RivetError::NotFound(format!(
                "'{relative_path}' not available from any configured repository"
            ))
        }))
    }

    fn download(&self, url: &str, dest: &Path) -> Result<PathBuf> {
        let response = self.client.get(url).send()?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(RivetError::NotFound(format!("{url}: 404")));
        }
        if !response.status().is_success() {
            return Err(RivetError::DownloadError(
                dest.display().to_string(),
                url.to_string(),
                format!("HTTP status {}", response.status()),
            ));
        }
        let bytes = response.bytes()?;

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(dest, &bytes)?;

        // Verify against the published sidecar when the endpoint has one.
        match self.client.get(format!("{url}.sha256")).send() {
            Ok(sidecar) if sidecar.status().is_success() => {
                let expected = sidecar.text()?;
                if let Err(e) = verify_checksum(dest, &expected) {
                    let _ = fs::remove_file(dest);
                    return Err(e);
                }
            }
            _ => debug!("No checksum sidecar published for {}", url),
        }

        Ok(dest.to_path_buf())
    }
}

/// Repository endpoints must be https.
pub fn validate_url(url_str: &str) -> Result<()> {
    let url = Url::parse(url_str)
        .map_err(|e| RivetError::Generic(format!("Failed to parse URL '{url_str}': {e}")))?;
    if url.scheme() == "https" {
        Ok(())
    } else {
        Err(RivetError::ValidationError(format!(
            "Invalid URL scheme for '{}': Must be https, but got '{}'",
            url_str,
            url.scheme()
        )))
    }
}
