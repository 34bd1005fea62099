//! Response bodies of the web UI's JSON actions.

use std::fmt;

use serde::{
    de::{self, SeqAccess, Visitor},
    Deserialize, Deserializer, Serialize,
};
use serde_json::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BaseResponse {
    #[serde(default)]
    pub build: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionResponse {
    #[serde(default)]
    pub build: i64,
    pub version: Version,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Version {
    pub device_id: String,
    pub engine_version: i64,
    pub features: Value,
    pub major_version: i64,
    pub minor_version: i64,
    pub name: String,
    pub peer_id: String,
    pub product_code: String,
    pub tiny_version: i64,
    pub ui_version: i64,
    pub user_agent: String,
    pub version_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    #[serde(default)]
    pub build: i64,
    pub settings: Vec<Setting>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SettingType {
    Integer,
    Boolean,
    String,
}

impl TryFrom<u8> for SettingType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Integer),
            1 => Ok(Self::Boolean),
            2 => Ok(Self::String),
            n => Err(format!("unknown setting type {n}")),
        }
    }
}

impl From<SettingType> for u8 {
    fn from(value: SettingType) -> Self {
        match value {
            SettingType::Integer => 0,
            SettingType::Boolean => 1,
            SettingType::String => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Access {
    R,
    W,
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingAccess {
    pub access: Access,
}

/// `[name, type, access]`, newer servers put the current value before the
/// access descriptor: `[name, type, value, access]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Setting {
    pub name: String,
    pub kind: SettingType,
    pub value: Option<String>,
    pub access: Option<SettingAccess>,
}

impl<'de> Deserialize<'de> for Setting {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct SettingVisitor;

        impl<'de> Visitor<'de> for SettingVisitor {
            type Value = Setting;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a setting tuple")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Setting, A::Error> {
                let name: String = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                let kind: SettingType = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(1, &self))?;
                let mut value = None;
                let mut access = None;
                while let Some(item) = seq.next_element::<Value>()? {
                    match item {
                        Value::Object(_) => {
                            access = serde_json::from_value(item).map_err(de::Error::custom)?
                        }
                        Value::String(s) => value = Some(s),
                        Value::Null => {}
                        other => value = Some(other.to_string()),
                    }
                }
                Ok(Setting {
                    name,
                    kind,
                    value,
                    access,
                })
            }
        }

        deserializer.deserialize_seq(SettingVisitor)
    }
}

/// One row of the torrent list, kept exactly as the server sent it.
///
/// The server packs each torrent into a positional array; the accessors
/// below are the only place that knows the slot layout. A short or
/// mistyped row reads as zero / empty rather than failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TorrentData(pub Vec<Value>);

mod slot {
    pub const HASH: usize = 0;
    pub const STATUS: usize = 1;
    pub const NAME: usize = 2;
    pub const SIZE: usize = 3;
    pub const PROGRESS: usize = 4;
    pub const DOWNLOADED: usize = 5;
    pub const UPLOADED: usize = 6;
    pub const RATIO: usize = 7;
    pub const UPLOAD_SPEED: usize = 8;
    pub const DOWNLOAD_SPEED: usize = 9;
    pub const ETA: usize = 10;
    pub const LABEL: usize = 11;
    pub const PEERS_CONNECTED: usize = 12;
    pub const PEERS_SWARM: usize = 13;
    pub const SEEDS_CONNECTED: usize = 14;
    pub const SEEDS_SWARM: usize = 15;
    pub const AVAILABILITY: usize = 16;
    pub const QUEUE_POSITION: usize = 17;
    pub const REMAINING: usize = 18;
    pub const DOWNLOAD_URL: usize = 19;
    pub const RSS_FEED_URL: usize = 20;
    pub const STATUS_MESSAGE: usize = 21;
    pub const STREAM_ID: usize = 22;
    pub const DATE_ADDED: usize = 23;
    pub const DATE_COMPLETED: usize = 24;
    pub const APP_UPDATE_URL: usize = 25;
    pub const SAVE_PATH: usize = 26;
}

impl TorrentData {
    fn str_at(&self, i: usize) -> &str {
        self.0.get(i).and_then(Value::as_str).unwrap_or_default()
    }

    fn int_at(&self, i: usize) -> i64 {
        match self.0.get(i) {
            Some(v) => v
                .as_i64()
                .or_else(|| v.as_f64().map(|f| f as i64))
                .unwrap_or_default(),
            None => 0,
        }
    }

    pub fn hash(&self) -> &str {
        self.str_at(slot::HASH)
    }
    /// Bitmask, see [`crate::normalize`]
    pub fn status(&self) -> i64 {
        self.int_at(slot::STATUS)
    }
    pub fn name(&self) -> &str {
        self.str_at(slot::NAME)
    }
    /// Bytes
    pub fn size(&self) -> i64 {
        self.int_at(slot::SIZE)
    }
    /// Per mille
    pub fn progress(&self) -> i64 {
        self.int_at(slot::PROGRESS)
    }
    pub fn downloaded(&self) -> i64 {
        self.int_at(slot::DOWNLOADED)
    }
    pub fn uploaded(&self) -> i64 {
        self.int_at(slot::UPLOADED)
    }
    /// Per mille
    pub fn ratio(&self) -> i64 {
        self.int_at(slot::RATIO)
    }
    /// Bytes per second
    pub fn upload_speed(&self) -> i64 {
        self.int_at(slot::UPLOAD_SPEED)
    }
    /// Bytes per second
    pub fn download_speed(&self) -> i64 {
        self.int_at(slot::DOWNLOAD_SPEED)
    }
    /// Seconds
    pub fn eta(&self) -> i64 {
        self.int_at(slot::ETA)
    }
    pub fn label(&self) -> &str {
        self.str_at(slot::LABEL)
    }
    pub fn peers_connected(&self) -> i64 {
        self.int_at(slot::PEERS_CONNECTED)
    }
    pub fn peers_in_swarm(&self) -> i64 {
        self.int_at(slot::PEERS_SWARM)
    }
    pub fn seeds_connected(&self) -> i64 {
        self.int_at(slot::SEEDS_CONNECTED)
    }
    pub fn seeds_in_swarm(&self) -> i64 {
        self.int_at(slot::SEEDS_SWARM)
    }
    /// In 1/65536ths
    pub fn availability(&self) -> i64 {
        self.int_at(slot::AVAILABILITY)
    }
    pub fn queue_position(&self) -> i64 {
        self.int_at(slot::QUEUE_POSITION)
    }
    /// Bytes left to download
    pub fn remaining(&self) -> i64 {
        self.int_at(slot::REMAINING)
    }
    pub fn download_url(&self) -> &str {
        self.str_at(slot::DOWNLOAD_URL)
    }
    pub fn rss_feed_url(&self) -> &str {
        self.str_at(slot::RSS_FEED_URL)
    }
    pub fn status_message(&self) -> &str {
        self.str_at(slot::STATUS_MESSAGE)
    }
    pub fn stream_id(&self) -> &str {
        self.str_at(slot::STREAM_ID)
    }
    /// Epoch seconds
    pub fn date_added(&self) -> i64 {
        self.int_at(slot::DATE_ADDED)
    }
    /// Epoch seconds, 0 while incomplete
    pub fn date_completed(&self) -> i64 {
        self.int_at(slot::DATE_COMPLETED)
    }
    pub fn app_update_url(&self) -> &str {
        self.str_at(slot::APP_UPDATE_URL)
    }
    pub fn save_path(&self) -> &str {
        self.str_at(slot::SAVE_PATH)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TorrentListResponse {
    #[serde(default)]
    pub build: i64,
    #[serde(default)]
    pub torrents: Vec<TorrentData>,
    /// `[label name, torrent count]`
    #[serde(default)]
    pub label: Vec<(String, i64)>,
    /// cache id
    #[serde(default)]
    pub torrentc: String,
    #[serde(default)]
    pub rssfeeds: Vec<Value>,
    #[serde(default)]
    pub rssfilters: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RssUpdateResponse {
    #[serde(default)]
    pub build: i64,
    pub rss_ident: i64,
}
