use std::fs::OpenOptions;
use std::path::Path;

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::pattern::Pattern;

/// Default configuration file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "github-releases.yaml";

/// One entry of the configuration file.
///
/// ```yaml
/// - name: My Tool
///   repository: acme/tool
///   files:
///     - 'tool-.*-linux-amd64\.tar\.gz'
///     - checksums
///     - literal: 'tool+extras.zip'
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseItem {
    /// Display label.
    pub name: String,
    /// GitHub repository in `owner/repo` format.
    pub repository: String,
    #[serde(default)]
    pub files: Vec<Pattern>,
}

/// Parse configuration text. Every pattern is compiled here, so an invalid
/// regex fails the whole load.
pub fn parse_config(text: &str) -> Result<Vec<ReleaseItem>> {
    // An empty document means no items.
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_yaml::from_str(text)?)
}

/// Read and parse the configuration file at `path`.
pub fn load_config(path: &Path) -> Result<Vec<ReleaseItem>> {
    if !path.exists() {
        return Err(Error::ConfigMissing(path.to_owned()));
    }
    let text = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
        path: path.to_owned(),
        source,
    })?;
    let items = parse_config(&text)?;
    tracing::debug!(path = %path.display(), items = items.len(), "loaded configuration");
    Ok(items)
}

/// Check that `dir` exists, is a directory, and accepts new files.
pub fn validate_download_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Err(Error::DestinationInvalid(dir.to_owned()));
    }

    let probe = dir.join(format!(".release-fetch-probe-{}", std::process::id()));
    match OpenOptions::new().write(true).create_new(true).open(&probe) {
        Ok(file) => {
            drop(file);
            let _ = std::fs::remove_file(&probe);
            Ok(())
        }
        Err(_) => Err(Error::DestinationInvalid(dir.to_owned())),
    }
}
