// lib.rs - Library interface for the pieces bencode codec

pub mod bencode;
pub mod config;
pub mod torrent;

// Re-export commonly used types for easier testing
pub use bencode::*;
pub use config::Config;
pub use torrent::*;
