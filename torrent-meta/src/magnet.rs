use url::Url;

use crate::{Error, Result};

const BTIH_PREFIX: &str = "urn:btih:";
const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// The parts of a magnet link the remote client cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Magnet {
    /// Lower-case hex, always 40 chars
    pub info_hash: String,
    pub name: Option<String>,
    pub trackers: Vec<String>,
}

impl Magnet {
    pub fn parse(uri: &str) -> Result<Self> {
        if !is_magnet(uri) {
            return Err(Error::InvalidMagnet(format!("not a magnet uri: {uri}")));
        }
        let url = Url::parse(uri).map_err(|e| Error::InvalidMagnet(e.to_string()))?;

        let mut info_hash = None;
        let mut name = None;
        let mut trackers = vec![];
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "xt" if info_hash.is_none() => {
                    if let Some(hash) = value.strip_prefix(BTIH_PREFIX) {
                        info_hash = Some(decode_btih(hash)?);
                    }
                }
                "dn" => name = Some(value.into_owned()),
                "tr" => trackers.push(value.into_owned()),
                _ => {}
            }
        }
        let info_hash = info_hash.ok_or(Error::MissingHash)?;
        debug!("magnet decoded, info hash {info_hash}");

        Ok(Self {
            info_hash,
            name,
            trackers,
        })
    }
}

pub fn is_magnet(s: &str) -> bool {
    s.get(..7)
        .map(|scheme| scheme.eq_ignore_ascii_case("magnet:"))
        .unwrap_or(false)
}

/// Accepts both the 40 char hex and the 32 char base32 forms.
fn decode_btih(hash: &str) -> Result<String> {
    match hash.len() {
        40 => {
            let bytes = hex::decode(hash)
                .map_err(|e| Error::InvalidMagnet(format!("bad hex info hash: {e}")))?;
            Ok(hex::encode(bytes))
        }
        32 => base32_decode(hash)
            .map(hex::encode)
            .ok_or_else(|| Error::InvalidMagnet(format!("bad base32 info hash: {hash}"))),
        n => Err(Error::InvalidMagnet(format!(
            "info hash has unexpected length {n}"
        ))),
    }
}

fn base32_decode(s: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(s.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits = 0;
    for c in s.bytes() {
        let c = c.to_ascii_uppercase();
        let v = BASE32_ALPHABET.iter().position(|a| *a == c)? as u32;
        buffer = (buffer << 5) | v;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        let m = Magnet::parse(
            "magnet:?xt=urn:btih:3E2AD64942F9F50DF7303D627D2278F97E766B7C&dn=file.txt&tr=udp%3A%2F%2Ftracker.example%3A80&tr=http%3A%2F%2Fother%2Fannounce",
        )
        .unwrap();
        assert_eq!(m.info_hash, "3e2ad64942f9f50df7303d627d2278f97e766b7c");
        assert_eq!(m.name.as_deref(), Some("file.txt"));
        assert_eq!(
            m.trackers,
            vec!["udp://tracker.example:80", "http://other/announce"]
        );
    }

    #[test]
    fn test_parse_base32() {
        let m = Magnet::parse("magnet:?xt=urn:btih:HYVNMSKC7H2Q35ZQHVRH2ITY7F7HM234").unwrap();
        assert_eq!(m.info_hash, "3e2ad64942f9f50df7303d627d2278f97e766b7c");
        assert_eq!(m.name, None);
        assert!(m.trackers.is_empty());
    }

    #[test]
    fn test_missing_hash() {
        assert!(matches!(
            Magnet::parse("magnet:?dn=nothing"),
            Err(Error::MissingHash)
        ));
        assert!(matches!(
            Magnet::parse("magnet:?xt=urn:sha1:abc"),
            Err(Error::MissingHash)
        ));
    }

    #[test]
    fn test_invalid() {
        assert!(Magnet::parse("http://example.com/a.torrent").is_err());
        assert!(Magnet::parse("magnet:?xt=urn:btih:xyz").is_err());
        assert!(Magnet::parse("magnet:?xt=urn:btih:!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!!").is_err());
    }

    #[test]
    fn test_is_magnet() {
        assert!(is_magnet("MAGNET:?xt=x"));
        assert!(!is_magnet("magn"));
    }
}
