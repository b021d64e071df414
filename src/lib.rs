//! # release-fetch
//!
//! Downloads the assets of the latest GitHub release of each repository listed
//! in a YAML file, skipping files already present with the same size.
//!
//! ## Configuration
//!
//! ```yaml
//! - name: My Tool
//!   repository: acme/tool
//!   files:
//!     - 'tool-.*-linux-amd64\.tar\.gz'   # regex, matched from the start of the name
//!     - LICENSE                          # exact name
//!     - literal: 'tool+extras.zip'       # exact name containing regex characters
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use release_fetch::{config, Api};
//!
//! #[tokio::main]
//! async fn main() {
//!     let items = config::load_config("github-releases.yaml".as_ref()).unwrap();
//!     let summary = Api::new()
//!         .set_download_dir("./downloads")
//!         .show_progress()
//!         .run(&items)
//!         .await
//!         .unwrap();
//!     assert!(summary.is_success());
//! }
//! ```

pub mod api;
pub mod config;
pub mod downloader;
pub mod error;
pub mod freshness;
pub mod pattern;
pub mod progress;

pub use api::{Api, Failure, RunSummary};
pub use config::ReleaseItem;
pub use downloader::{Asset, Downloader, Release};
pub use error::{Error, Result};
pub use freshness::Freshness;
pub use pattern::Pattern;
