use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The token endpoint answered but the token markup was not in the body.
    #[error("valid token not found")]
    Authentication,
    #[error("torrent {0} not found")]
    NotFound(String),
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{action} failed, status: {status}")]
    Status { action: String, status: StatusCode },
    #[error(transparent)]
    Metainfo(#[from] torrent_meta::Error),
    #[error("torrent is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("cannot read torrent file {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
