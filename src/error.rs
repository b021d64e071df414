use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("config file {} does not exist", .0.display())]
    ConfigMissing(PathBuf),

    #[error("error reading config file {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing config file: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{} does not exist or is not writable", .0.display())]
    DestinationInvalid(PathBuf),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned {status}")]
    Status { url: String, status: StatusCode },

    #[error("file not found at {0}")]
    NotFound(String),

    #[error("refusing to write asset with unsafe name `{0}`")]
    UnsafeAssetName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
