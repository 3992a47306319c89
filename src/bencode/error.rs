use thiserror::Error;

/// Everything that can go wrong while decoding bencode or converting foreign
/// values into a `BValue`.
///
/// Decode errors carry the byte offset at which the problem was detected.
#[derive(Debug, Error, PartialEq)]
pub enum BencodeError {
    #[error("Unexpected end of input at byte {offset}")]
    UnexpectedEnd { offset: usize },

    #[error("Unknown token {token:?} at byte {offset}")]
    UnknownToken { token: char, offset: usize },

    #[error("Malformed integer at byte {offset}: {reason}")]
    MalformedInteger { offset: usize, reason: &'static str },

    #[error("Malformed string length at byte {offset}")]
    MalformedStringLength { offset: usize },

    #[error("String at byte {offset} declares {declared} bytes but only {remaining} remain")]
    OutOfBounds {
        offset: usize,
        declared: usize,
        remaining: usize,
    },

    #[error("Missing 'e' terminator for value starting at byte {offset}")]
    MissingEndToken { offset: usize },

    #[error("Dict key at byte {offset} is not a byte string")]
    NonStringDictKey { offset: usize },

    #[error("Duplicate dict key at byte {offset}")]
    DuplicateDictKey { offset: usize },

    #[error("Nesting deeper than {max_depth} levels at byte {offset}")]
    NestingTooDeep { max_depth: usize, offset: usize },

    #[error("Trailing data after value at byte {offset}")]
    TrailingData { offset: usize },

    #[error("Unsupported value type: {0}")]
    UnsupportedValueType(&'static str),

    #[error("Invalid hex byte string: {0}")]
    InvalidHex(#[from] hex::FromHexError),
}

impl BencodeError {
    /// Byte offset of a decode error, if the error came from the decoder.
    pub fn offset(&self) -> Option<usize> {
        match self {
            BencodeError::UnexpectedEnd { offset }
            | BencodeError::UnknownToken { offset, .. }
            | BencodeError::MalformedInteger { offset, .. }
            | BencodeError::MalformedStringLength { offset }
            | BencodeError::OutOfBounds { offset, .. }
            | BencodeError::MissingEndToken { offset }
            | BencodeError::NonStringDictKey { offset }
            | BencodeError::DuplicateDictKey { offset }
            | BencodeError::NestingTooDeep { offset, .. }
            | BencodeError::TrailingData { offset } => Some(*offset),
            BencodeError::UnsupportedValueType(_) | BencodeError::InvalidHex(_) => None,
        }
    }
}
