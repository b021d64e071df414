use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::header::ACCEPT;
use reqwest::{Client, Proxy, StatusCode};
use serde::Deserialize;
use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Callback type for reporting download progress.
/// Arguments: label, bytes downloaded, total bytes if known, is_complete
pub type ProgressFn = Arc<dyn Fn(&str, u64, Option<u64>, bool) + Send + Sync>;

/// Public GitHub REST API.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

/// Write buffer size for downloaded bodies.
const CHUNK_SIZE: usize = 8 * 1024;

/// Name prefix of in-progress downloads.
const TEMP_PREFIX: &str = ".release-fetch-";

/// The subset of a GitHub release used for asset selection.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

impl Release {
    /// The release title, falling back to the tag for untitled releases.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.tag_name)
    }
}

/// A downloadable file attached to a release.
#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    pub name: String,
    pub size: u64,
    pub browser_download_url: String,
}

/// Queries release metadata and streams assets to disk.
pub struct Downloader {
    client: Client,
    /// API root without a trailing slash.
    base_url: String,
    /// Bearer token sent with API requests only.
    token: Option<String>,
    progress: Option<ProgressFn>,
}

impl Downloader {
    /// Create a downloader for `base_url` with no token, proxy or progress.
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_config(base_url, None, None, None)
    }

    pub fn with_config(
        base_url: &str,
        token: Option<String>,
        proxy: Option<String>,
        progress: Option<ProgressFn>,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(proxy.as_deref())?,
            base_url: base_url.trim_end_matches('/').to_owned(),
            token,
            progress,
        })
    }

    /// URL of the latest-release endpoint for `repo`.
    pub fn release_url(&self, repo: &str) -> String {
        format!("{}/repos/{}/releases/latest", self.base_url, repo)
    }

    /// Fetch the latest release of `repo` (`owner/repo`).
    pub async fn latest_release(&self, repo: &str) -> Result<Release> {
        let url = self.release_url(repo);
        tracing::debug!(%url, "fetching latest release");

        let mut request = self
            .client
            .get(&url)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Status { url, status });
        }

        let release: Release = resp.json().await?;
        tracing::debug!(
            repo,
            release = release.display_name(),
            assets = release.assets.len(),
            "resolved latest release"
        );
        Ok(release)
    }

    /// Stream `url` into `dest`, replacing any existing file.
    ///
    /// The body is written to a uniquely named temporary file in the
    /// destination directory and persisted over `dest` only after the whole
    /// response has been received. On failure the temporary file is dropped
    /// and `dest` is left as it was. Returns the number of bytes written.
    pub async fn download(&self, url: &str, dest: &Path) -> Result<u64> {
        let (tmp, written) = self.stream_to_temp(url, dest).await?;
        tmp.persist(dest).map_err(|e| e.error)?;

        tracing::debug!(%url, dest = %dest.display(), bytes = written, "download complete");
        Ok(written)
    }

    async fn stream_to_temp(&self, url: &str, dest: &Path) -> Result<(NamedTempFile, u64)> {
        tracing::debug!(%url, "requesting asset");
        let resp = self.client.get(url).send().await?;
        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(url.to_owned()));
        }
        if !status.is_success() {
            return Err(Error::Status {
                url: url.to_owned(),
                status,
            });
        }

        let label = dest
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| url.to_owned());
        let total = resp.content_length();
        let mut downloaded: u64 = 0;
        let mut stream = resp.bytes_stream();

        // Created with O_EXCL, so it never replaces another asset in the directory.
        let tmp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(".part")
            .tempfile_in(parent_dir(dest))?;
        let mut file = BufWriter::with_capacity(CHUNK_SIZE, tmp);

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk)?;
            downloaded += chunk.len() as u64;

            if let Some(progress) = &self.progress {
                progress(&label, downloaded, total, false);
            }
        }

        let tmp = file.into_inner().map_err(|e| e.into_error())?;
        tmp.as_file().sync_all()?;

        if let Some(progress) = &self.progress {
            progress(&label, downloaded, total, true);
        }

        Ok((tmp, downloaded))
    }
}

/// Build the HTTP client, optionally with proxy support.
fn build_client(proxy: Option<&str>) -> Result<Client> {
    let mut builder = Client::builder()
        .connect_timeout(Duration::from_secs(30))
        .read_timeout(Duration::from_secs(60))
        .user_agent(concat!("release-fetch/", env!("CARGO_PKG_VERSION")));
    if let Some(proxy_url) = proxy {
        builder = builder.proxy(Proxy::all(proxy_url)?);
    }
    Ok(builder.build()?)
}

/// Directory that receives the temporary file for `dest`.
fn parent_dir(dest: &Path) -> &Path {
    dest.parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}
