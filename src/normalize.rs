//! Positional torrent rows into [`NormalizedTorrent`].

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::response::{TorrentData, TorrentListResponse};

const STATE_STARTED: i64 = 1;
const STATE_CHECKING: i64 = 2;
const STATE_ERROR: i64 = 16;
const STATE_PAUSED: i64 = 32;
const STATE_QUEUED: i64 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TorrentState {
    Downloading,
    Seeding,
    Paused,
    Queued,
    Checking,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedTorrent {
    /// Lower-case info hash
    pub id: String,
    pub name: String,
    pub state: TorrentState,
    pub is_completed: bool,
    pub state_message: String,
    /// `raw / 100` of the server's progress slot
    pub progress: f64,
    pub ratio: f64,
    pub date_added: DateTime<Utc>,
    pub date_completed: DateTime<Utc>,
    pub label: String,
    pub save_path: String,
    /// Bytes per second
    pub upload_speed: i64,
    /// Bytes per second
    pub download_speed: i64,
    /// Seconds
    pub eta: i64,
    pub queue_position: i64,
    pub connected_peers: i64,
    pub connected_seeds: i64,
    pub total_peers: i64,
    pub total_seeds: i64,
    pub total_selected: i64,
    pub total_size: i64,
    pub total_uploaded: i64,
    pub total_downloaded: i64,
    pub raw: TorrentData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Label {
    pub id: String,
    pub name: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AllClientData {
    pub torrents: Vec<NormalizedTorrent>,
    pub labels: Vec<Label>,
    pub raw: TorrentListResponse,
}

impl AllClientData {
    pub fn from_list(list: TorrentListResponse) -> Self {
        let torrents = list.torrents.iter().map(normalize_torrent_data).collect();
        let labels = list
            .label
            .iter()
            .map(|(name, count)| Label {
                id: name.clone(),
                name: name.clone(),
                count: *count,
            })
            .collect();
        Self {
            torrents,
            labels,
            raw: list,
        }
    }
}

/// First matching bit wins, in this order.
pub fn resolve_state(status: i64, done: bool) -> TorrentState {
    if status & STATE_PAUSED != 0 {
        TorrentState::Paused
    } else if status & STATE_STARTED != 0 {
        if done {
            TorrentState::Seeding
        } else {
            TorrentState::Downloading
        }
    } else if status & STATE_CHECKING != 0 {
        TorrentState::Checking
    } else if status & STATE_ERROR != 0 {
        TorrentState::Error
    } else if status & STATE_QUEUED != 0 {
        TorrentState::Queued
    } else {
        // finished and stopped both show as paused
        TorrentState::Paused
    }
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}

pub fn normalize_torrent_data(torrent: &TorrentData) -> NormalizedTorrent {
    let progress = torrent.progress() as f64 / 100.0;
    let done = progress >= 100.0;

    NormalizedTorrent {
        id: torrent.hash().to_lowercase(),
        name: torrent.name().to_string(),
        state: resolve_state(torrent.status(), done),
        is_completed: done,
        state_message: String::new(),
        progress,
        ratio: torrent.ratio() as f64 / 1000.0,
        date_added: timestamp(torrent.date_added()),
        date_completed: timestamp(torrent.date_completed()),
        label: torrent.label().to_string(),
        save_path: torrent.save_path().to_string(),
        upload_speed: torrent.upload_speed(),
        download_speed: torrent.download_speed(),
        eta: torrent.eta(),
        queue_position: torrent.queue_position(),
        connected_peers: torrent.peers_connected(),
        connected_seeds: torrent.seeds_connected(),
        total_peers: torrent.peers_in_swarm(),
        total_seeds: torrent.seeds_in_swarm(),
        total_selected: torrent.remaining(),
        total_size: torrent.size(),
        total_uploaded: torrent.uploaded(),
        total_downloaded: torrent.downloaded(),
        raw: torrent.clone(),
    }
}
