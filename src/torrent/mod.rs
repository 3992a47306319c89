pub mod infohash;

pub use infohash::{calculate_info_hash, info_hash_from_file, InfoHash};
