// infohash.rs
use std::error::Error;
use std::fmt;
use std::path::Path;

use log::{debug, warn};
use sha1::{Digest, Sha1};

use crate::bencode::{decode_bencode_exact, BValue, Encoder};

/// SHA-1 of a torrent's bencoded `info` dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfoHash(pub [u8; 20]);

impl InfoHash {
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Computes the info-hash of a decoded metainfo dictionary.
///
/// Only the `info` key is looked at. Its value is re-encoded in the order it
/// was decoded in, so the hash matches the bytes that were on disk.
pub fn calculate_info_hash(metainfo: &BValue) -> Result<InfoHash, Box<dyn Error + Send + Sync>> {
    let root_dict = match metainfo {
        BValue::Dict(m) => m,
        _ => return Err("Root of .torrent must be a dictionary".into()),
    };

    let info = root_dict
        .get(b"info")
        .ok_or_else(|| "Missing 'info' dictionary".to_string())?;

    let info_dict = match info {
        BValue::Dict(m) => m,
        _ => return Err("'info' must be a dictionary".into()),
    };

    if !info_dict.is_canonical() {
        warn!("'info' keys are not sorted; hashing them in stored order");
    }

    let encoded = Encoder::preserving().encode(info);
    debug!("hashing {} bytes of 'info'", encoded.len());

    let mut hasher = Sha1::new();
    hasher.update(&encoded);
    let result = hasher.finalize();

    let mut hash_bytes = [0u8; 20];
    hash_bytes.copy_from_slice(&result);
    Ok(InfoHash(hash_bytes))
}

/// Reads a .torrent file from disk and computes its info-hash.
pub fn info_hash_from_file<P: AsRef<Path>>(path: P) -> Result<InfoHash, Box<dyn Error + Send + Sync>> {
    let buf = std::fs::read(path.as_ref())
        .map_err(|e| format!("I/O error while reading {}: {}", path.as_ref().display(), e))?;

    let metainfo = decode_bencode_exact(&buf).map_err(|e| format!("Bencode error: {}", e))?;
    calculate_info_hash(&metainfo)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TORRENT: &[u8] =
        b"d8:announce15:http://test.com4:infod6:lengthi1024e4:name4:test12:piece lengthi16384e6:pieces20:\x00\x01\x02\x03\x04\x05\x06\x07\x08\x09\x0a\x0b\x0c\x0d\x0e\x0f\x10\x11\x12\x13ee";

    fn sha1_of(bytes: &[u8]) -> [u8; 20] {
        let mut hasher = Sha1::new();
        hasher.update(bytes);
        let mut out = [0u8; 20];
        out.copy_from_slice(&hasher.finalize());
        out
    }

    fn info_slice(torrent: &[u8]) -> &[u8] {
        // Everything between "4:info" and the closing 'e' of the root dict.
        let start = torrent
            .windows(6)
            .position(|w| w == b"4:info")
            .unwrap()
            + 6;
        &torrent[start..torrent.len() - 1]
    }

    #[test]
    fn test_info_hash_matches_raw_info_bytes() {
        let metainfo = decode_bencode_exact(TORRENT).unwrap();
        let hash = calculate_info_hash(&metainfo).unwrap();
        assert_eq!(hash.as_bytes(), &sha1_of(info_slice(TORRENT)));
        assert_eq!(hash.to_hex().len(), 40);
        assert_eq!(hash.to_string(), hash.to_hex());
    }

    #[test]
    fn test_info_hash_of_unsorted_info_uses_stored_order() {
        let torrent: &[u8] = b"d4:infod4:name4:test6:lengthi1eee";
        let metainfo = decode_bencode_exact(torrent).unwrap();
        let hash = calculate_info_hash(&metainfo).unwrap();
        assert_eq!(hash.0, sha1_of(info_slice(torrent)));
    }

    #[test]
    fn test_info_hash_errors() {
        assert!(calculate_info_hash(&BValue::Integer(1)).is_err());
        let no_info = decode_bencode_exact(b"d8:announce3:urle").unwrap();
        assert!(calculate_info_hash(&no_info).is_err());
        let bad_info = decode_bencode_exact(b"d4:infoi1ee").unwrap();
        assert!(calculate_info_hash(&bad_info).is_err());
    }

    #[test]
    fn test_info_hash_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TORRENT).unwrap();
        let hash = info_hash_from_file(file.path()).unwrap();
        assert_eq!(hash.0, sha1_of(info_slice(TORRENT)));
    }

    #[test]
    fn test_info_hash_from_file_rejects_garbage() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"d4:info").unwrap();
        assert!(info_hash_from_file(file.path()).is_err());
        assert!(info_hash_from_file("/definitely/not/here.torrent").is_err());
    }
}
