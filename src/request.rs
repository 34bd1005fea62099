use std::path::PathBuf;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::error::{Error, Result};

/// A `.torrent` file in one of the shapes callers tend to have at hand.
#[derive(Debug, Clone)]
pub enum TorrentFile {
    Bytes(Vec<u8>),
    Base64(String),
    Path(PathBuf),
}

impl TorrentFile {
    pub async fn into_bytes(self) -> Result<Vec<u8>> {
        match self {
            Self::Bytes(bytes) => Ok(bytes),
            Self::Base64(s) => Ok(STANDARD.decode(s.trim())?),
            Self::Path(path) => match tokio::fs::read(&path).await {
                Ok(bytes) => Ok(bytes),
                Err(source) => Err(Error::Io { path, source }),
            },
        }
    }
}

impl From<Vec<u8>> for TorrentFile {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for TorrentFile {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl From<PathBuf> for TorrentFile {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

/// What `normalized_add_torrent` accepts.
#[derive(Debug, Clone)]
pub enum TorrentSource {
    Magnet(String),
    File(TorrentFile),
}

impl From<TorrentFile> for TorrentSource {
    fn from(file: TorrentFile) -> Self {
        Self::File(file)
    }
}

impl From<Vec<u8>> for TorrentSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::File(TorrentFile::Bytes(bytes))
    }
}

impl From<PathBuf> for TorrentSource {
    fn from(path: PathBuf) -> Self {
        Self::File(TorrentFile::Path(path))
    }
}

impl TorrentSource {
    /// A magnet uri, or else base64 encoded torrent file content.
    pub fn from_text(s: impl Into<String>) -> Self {
        let s = s.into();
        if torrent_meta::is_magnet(&s) {
            Self::Magnet(s)
        } else {
            Self::File(TorrentFile::Base64(s))
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AddTorrentOptions {
    pub start_paused: bool,
    pub label: Option<String>,
}

/// Arguments of the `rss-update` action
#[derive(Debug, Clone)]
pub struct RssFeedUpdate {
    pub url: String,
    /// id of the feed to update, -1 for a new feed
    pub id: i64,
    pub alias: String,
    /// Automatically download all items published in the feed
    pub subscribe: bool,
    /// Use smart episode filter
    pub smart_filter: bool,
    pub enabled: bool,
}

impl RssFeedUpdate {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            id: -1,
            alias: String::new(),
            subscribe: false,
            smart_filter: false,
            enabled: true,
        }
    }

    pub(crate) fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("url", self.url.clone()),
            ("alias", self.alias.clone()),
            ("feed-id", self.id.to_string()),
            ("subscribe", u8::from(self.subscribe).to_string()),
            ("smart-filter", u8::from(self.smart_filter).to_string()),
            ("enabled", self.enabled.to_string()),
        ]
    }
}
