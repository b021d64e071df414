use std::path::{Path, PathBuf};

use crate::config::{self, ReleaseItem};
use crate::downloader::{Asset, Downloader, ProgressFn, DEFAULT_API_URL};
use crate::error::{Error, Result};
use crate::freshness::{self, Freshness};
use crate::pattern::Pattern;
use crate::progress::default_progress_fn;

// ──────────────────────────────────────────────────────────────────────────────
// Api
// ──────────────────────────────────────────────────────────────────────────────

/// Top-level entry-point with a chainable builder API.
///
/// # Example
/// ```rust,no_run
/// use release_fetch::Api;
///
/// #[tokio::main]
/// async fn main() {
///     let summary = Api::new()
///         .set_download_dir("./downloads")
///         .run_config("github-releases.yaml".as_ref())
///         .await
///         .unwrap();
///     println!("{} downloaded", summary.downloaded.len());
/// }
/// ```
pub struct Api {
    download_dir: PathBuf,
    base_url: String,
    token: Option<String>,
    proxy: Option<String>,
    progress: Option<ProgressFn>,
    quiet: bool,
}

impl Api {
    /// Create a new `Api` downloading into the working directory from the
    /// public GitHub API, without progress bars.
    ///
    /// Proxy is read from `HTTP_PROXY` / `HTTPS_PROXY` environment variables.
    pub fn new() -> Self {
        let proxy = std::env::var("HTTP_PROXY")
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| std::env::var("HTTPS_PROXY").ok().filter(|s| !s.is_empty()));

        Self {
            download_dir: PathBuf::from("."),
            base_url: DEFAULT_API_URL.to_owned(),
            token: None,
            proxy,
            progress: None,
            quiet: false,
        }
    }

    /// Set the download directory (builder).
    pub fn set_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    /// Set the API base URL, e.g. a GitHub Enterprise `https://host/api/v3` (builder).
    pub fn set_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_owned();
        self
    }

    /// Authenticate API requests with a bearer token (builder).
    pub fn set_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    /// Set an explicit HTTP/HTTPS proxy URL (builder).
    pub fn set_proxy(mut self, proxy: &str) -> Self {
        self.proxy = Some(proxy.to_owned());
        self
    }

    /// Override the progress callback (builder).
    pub fn set_progress(mut self, progress: ProgressFn) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Draw `indicatif` progress bars for downloads (builder).
    pub fn show_progress(self) -> Self {
        self.set_progress(default_progress_fn())
    }

    /// Disable progress output (builder).
    pub fn no_progress(mut self) -> Self {
        self.progress = None;
        self
    }

    /// Suppress stdout messages and progress bars (builder).
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Load `path` and process every item in it.
    pub async fn run_config(&self, path: &Path) -> Result<RunSummary> {
        let items = config::load_config(path)?;
        self.run(&items).await
    }

    /// Process `items` in order, one request at a time.
    ///
    /// Failures to resolve a release or fetch an asset are logged, recorded
    /// in the summary, and do not stop the remaining work. The only error
    /// returned is a failure to build the HTTP client.
    pub async fn run(&self, items: &[ReleaseItem]) -> Result<RunSummary> {
        let progress = if self.quiet { None } else { self.progress.clone() };
        let downloader = Downloader::with_config(
            &self.base_url,
            self.token.clone(),
            self.proxy.clone(),
            progress,
        )?;

        let mut summary = RunSummary::default();
        for item in items {
            self.process_item(&downloader, item, &mut summary).await;
        }
        Ok(summary)
    }

    async fn process_item(
        &self,
        downloader: &Downloader,
        item: &ReleaseItem,
        summary: &mut RunSummary,
    ) {
        let release = match downloader.latest_release(&item.repository).await {
            Ok(release) => release,
            Err(error) => {
                eprintln!("Error: could not get latest release of {}: {error}", item.name);
                tracing::debug!(repo = %item.repository, ?error, "release lookup failed");
                summary.failures.push(Failure {
                    item: item.name.clone(),
                    asset: None,
                    error,
                });
                return;
            }
        };

        self.say(format_args!(
            "Latest release of {} is {}",
            item.name,
            release.display_name()
        ));

        for pattern in &item.files {
            self.say(format_args!(" Looking for assets that match pattern {pattern}"));
            let matched = self
                .process_pattern(downloader, item, pattern, &release.assets, summary)
                .await;
            if matched == 0 {
                tracing::info!(repo = %item.repository, %pattern, "no assets matched");
            }
        }
    }

    /// Fetch or skip every asset matching `pattern`. Returns the match count.
    async fn process_pattern(
        &self,
        downloader: &Downloader,
        item: &ReleaseItem,
        pattern: &Pattern,
        assets: &[Asset],
        summary: &mut RunSummary,
    ) -> usize {
        let mut matched = 0;
        for asset in assets.iter().filter(|asset| pattern.matches(&asset.name)) {
            matched += 1;
            if let Err(error) = self.process_asset(downloader, asset, summary).await {
                eprintln!("Error: {} ({}): {error}", asset.name, item.name);
                tracing::debug!(asset = %asset.name, ?error, "asset fetch failed");
                summary.failures.push(Failure {
                    item: item.name.clone(),
                    asset: Some(asset.name.clone()),
                    error,
                });
            }
        }
        matched
    }

    async fn process_asset(
        &self,
        downloader: &Downloader,
        asset: &Asset,
        summary: &mut RunSummary,
    ) -> Result<()> {
        let path = freshness::local_path(&self.download_dir, &asset.name)?;

        match freshness::check(&path, asset.size) {
            Freshness::Skip => {
                self.say(format_args!(
                    "  File {} already exists and is the same size. Skipping download.",
                    asset.name
                ));
                summary.skipped.push(path);
            }
            Freshness::Fetch => {
                self.say(format_args!("  Downloading asset {}", asset.name));
                let written = downloader.download(&asset.browser_download_url, &path).await?;
                if written != asset.size {
                    tracing::warn!(
                        asset = %asset.name,
                        expected = asset.size,
                        written,
                        "downloaded size differs from release metadata"
                    );
                }
                summary.downloaded.push(path);
            }
        }
        Ok(())
    }

    fn say(&self, message: std::fmt::Arguments<'_>) {
        if !self.quiet {
            println!("{message}");
        }
    }
}

impl Default for Api {
    fn default() -> Self {
        Self::new()
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// RunSummary
// ──────────────────────────────────────────────────────────────────────────────

/// Outcome of one pass over the configured items.
#[derive(Debug, Default)]
pub struct RunSummary {
    /// Files written during this run, in processing order. A file matched by
    /// two patterns appears once here and once in `skipped`.
    pub downloaded: Vec<PathBuf>,
    /// Files left alone because their size already matched.
    pub skipped: Vec<PathBuf>,
    pub failures: Vec<Failure>,
}

impl RunSummary {
    /// Whether every item resolved and every matched asset is in place.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// A per-item or per-asset error recorded without stopping the run.
#[derive(Debug)]
pub struct Failure {
    /// Display name of the configured item.
    pub item: String,
    /// `None` when the release itself could not be resolved.
    pub asset: Option<String>,
    pub error: Error,
}
