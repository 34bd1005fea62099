//! Local torrent metadata helpers: info-hash of `.torrent` files and
//! magnet link decoding.

#[macro_use]
extern crate log;

pub mod bencode;
mod magnet;

pub use magnet::{is_magnet, Magnet};

use sha1::{Digest, Sha1};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("bencode syntax error at byte {offset}: {reason}")]
    Syntax { offset: usize, reason: &'static str },
    #[error("torrent file has no info dictionary")]
    MissingInfo,
    #[error("invalid magnet link: {0}")]
    InvalidMagnet(String),
    #[error("magnet did not contain hash")]
    MissingHash,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Lower-case hex SHA-1 over the exact bytes of the `info` dictionary.
pub fn info_hash(torrent: &[u8]) -> Result<String> {
    let info = bencode::info_span(torrent)?;
    let digest = Sha1::digest(info);
    let hash = hex::encode(digest);
    debug!("info hash {} computed over {} bytes", hash, info.len());
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) const TORRENT: &[u8] = b"d8:announce23:http://tracker/announce4:infod6:lengthi12e4:name8:file.txt12:piece lengthi16384e6:pieces20:aaaaaaaaaaaaaaaaaaaaee";

    #[test]
    fn test_info_hash() {
        assert_eq!(
            info_hash(TORRENT).unwrap(),
            "3e2ad64942f9f50df7303d627d2278f97e766b7c"
        );
    }

    #[test]
    fn test_info_hash_missing_info() {
        let r = info_hash(b"d8:announce3:abce");
        assert!(matches!(r, Err(Error::MissingInfo)));
    }

    #[test]
    fn test_info_hash_garbage() {
        assert!(matches!(
            info_hash(b"not a torrent"),
            Err(Error::Syntax { .. })
        ));
    }
}
