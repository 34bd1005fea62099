#[macro_use]
extern crate log;

pub mod client;
pub mod config;
pub mod error;
pub mod normalize;
pub mod request;
pub mod response;
pub mod session;

pub use client::UtClient;
pub use config::Config;
pub use error::{Error, Result};
pub use normalize::{AllClientData, NormalizedTorrent, TorrentState};
pub use request::{AddTorrentOptions, RssFeedUpdate, TorrentFile, TorrentSource};
