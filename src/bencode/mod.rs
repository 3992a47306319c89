pub mod bvalue;
pub mod decode;
pub mod encode;
pub mod error;
pub mod json;

pub use bvalue::{BValue, Dictionary};   // re-export
pub use decode::{decode_bencode, decode_bencode_exact, Decoder, DEFAULT_MAX_DEPTH};   // re-export
pub use encode::{encode_canonical, encode_preserving, DictOrder, Encoder};   // re-export
pub use error::BencodeError;   // re-export
pub use json::{bvalue_to_json, json_to_bvalue};   // re-export
