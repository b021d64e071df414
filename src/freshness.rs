use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Outcome of comparing a local file against a remote asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    /// A regular file with exactly the reported size is already present.
    Skip,
    Fetch,
}

/// Decide whether the asset at `path` needs downloading.
///
/// Only the byte size is compared: a corrupted file of the right length is
/// reported as [`Freshness::Skip`].
pub fn check(path: &Path, size: u64) -> Freshness {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() == size => Freshness::Skip,
        _ => Freshness::Fetch,
    }
}

/// Join `asset_name` onto `dir`, refusing names that would escape it.
pub fn local_path(dir: &Path, asset_name: &str) -> Result<PathBuf> {
    let mut components = Path::new(asset_name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) if !asset_name.contains(['/', '\\']) => {
            Ok(dir.join(asset_name))
        }
        _ => Err(Error::UnsafeAssetName(asset_name.to_owned())),
    }
}
