use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use bytes::Bytes;

use crate::bencode::{Decoder, DictOrder, Encoder, DEFAULT_MAX_DEPTH};

pub const DEFAULT_CONFIG_PATH: &str = "pieces.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Deepest list/dict nesting the decoder accepts.
    pub max_depth: usize,
    pub dict_order: DictOrder,
    pub log_level: log::LevelFilter,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            dict_order: DictOrder::Preserve,
            log_level: log::LevelFilter::Warn,
        }
    }
}

impl Config {
    /// Loads `pieces.toml` from the working directory, or the defaults if
    /// there is none.
    pub fn load() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let config_path = path.as_ref();
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn decoder(&self, data: impl Into<Bytes>) -> Decoder {
        Decoder::with_max_depth(data, self.max_depth)
    }

    pub fn encoder(&self) -> Encoder {
        Encoder::new(self.dict_order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bencode::BencodeError;
    use std::io::Write;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.encoder(), Encoder::preserving());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "max_depth = 2").unwrap();
        writeln!(file, "dict_order = \"canonical\"").unwrap();
        let config = Config::load_from(file.path()).unwrap();

        assert_eq!(config.max_depth, 2);
        assert_eq!(config.encoder(), Encoder::canonical());
        assert_eq!(config.log_level, log::LevelFilter::Warn);

        let mut decoder = config.decoder(&b"llleee"[..]);
        assert!(matches!(
            decoder.decode().unwrap_err(),
            BencodeError::NestingTooDeep { max_depth: 2, .. }
        ));
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = Config {
            max_depth: 16,
            dict_order: DictOrder::Canonical,
            log_level: log::LevelFilter::Debug,
        };
        let text = toml::to_string(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_bad_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "dict_order = \"shuffled\"").unwrap();
        assert!(Config::load_from(file.path()).is_err());
    }
}
