use std::collections::HashSet;

use bytes::Bytes;
use log::{debug, trace};

use super::error::BencodeError;
use crate::bencode::bvalue::{BValue, Dictionary};

/// How many lists/dicts may be open at once before decoding gives up.
pub const DEFAULT_MAX_DEPTH: usize = 64;

const TOKEN_INTEGER: u8 = b'i';
const TOKEN_LIST: u8 = b'l';
const TOKEN_DICT: u8 = b'd';
const TOKEN_END: u8 = b'e';
const TOKEN_STRING_SEPARATOR: u8 = b':';

/// Decodes bencoded values out of a buffer that is already fully in memory.
///
/// The decoder owns the buffer and a read cursor. Each call to [`decode`]
/// consumes exactly one value; call it again to read the next top-level value.
/// Byte strings are returned as slices of the buffer, so a string never costs
/// an allocation proportional to its declared length.
///
/// [`decode`]: Decoder::decode
#[derive(Debug, Clone)]
pub struct Decoder {
    data: Bytes,
    index: usize,
    max_depth: usize,
}

impl Decoder {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self::with_max_depth(data, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(data: impl Into<Bytes>, max_depth: usize) -> Self {
        Self {
            data: data.into(),
            index: 0,
            max_depth,
        }
    }

    /// The byte under the cursor, or `None` once the buffer is exhausted.
    pub fn peek(&self) -> Option<u8> {
        self.data.get(self.index).copied()
    }

    pub fn position(&self) -> usize {
        self.index
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.index
    }

    pub fn is_exhausted(&self) -> bool {
        self.index >= self.data.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Decodes one value starting at the cursor.
    ///
    /// On success the cursor moves past the value. On failure nothing is
    /// returned and the cursor stays where it was.
    pub fn decode(&mut self) -> Result<BValue, BencodeError> {
        let mut pos = self.index;
        match self.decode_value(&mut pos, 0) {
            Ok(value) => {
                trace!("decoded value spanning bytes {}..{}", self.index, pos);
                self.index = pos;
                Ok(value)
            }
            Err(err) => {
                debug!("bencode decode failed at byte {}: {}", self.index, err);
                Err(err)
            }
        }
    }

    /// Decodes values until the buffer is exhausted.
    pub fn decode_all(&mut self) -> Result<Vec<BValue>, BencodeError> {
        let mut values = Vec::new();
        while !self.is_exhausted() {
            values.push(self.decode()?);
        }
        Ok(values)
    }

    fn decode_value(&self, pos: &mut usize, depth: usize) -> Result<BValue, BencodeError> {
        let token = *self
            .data
            .get(*pos)
            .ok_or(BencodeError::UnexpectedEnd { offset: *pos })?;

        match token {
            TOKEN_INTEGER => self.decode_integer(pos),
            TOKEN_LIST => {
                self.enter(*pos, depth)?;
                self.decode_list(pos, depth + 1)
            }
            TOKEN_DICT => {
                self.enter(*pos, depth)?;
                self.decode_dict(pos, depth + 1)
            }
            c if c.is_ascii_digit() => self.decode_string(pos),
            c => Err(BencodeError::UnknownToken {
                token: c as char,
                offset: *pos,
            }),
        }
    }

    /// Refuses to open another container once `max_depth` are already open.
    fn enter(&self, offset: usize, depth: usize) -> Result<(), BencodeError> {
        if depth >= self.max_depth {
            return Err(BencodeError::NestingTooDeep {
                max_depth: self.max_depth,
                offset,
            });
        }
        Ok(())
    }

    /// `i<digits>e`, with an optional leading '-'.
    fn decode_integer(&self, pos: &mut usize) -> Result<BValue, BencodeError> {
        let start = *pos;
        *pos += 1; // skip 'i'

        let negative = self.data.get(*pos) == Some(&b'-');
        if negative {
            *pos += 1;
        }

        let digits_start = *pos;
        let mut value: i64 = 0;
        loop {
            match self.data.get(*pos) {
                None => return Err(BencodeError::MissingEndToken { offset: start }),
                Some(&TOKEN_END) => break,
                Some(&c) if c.is_ascii_digit() => {
                    let digit = i64::from(c - b'0');
                    // Accumulate towards the sign so i64::MIN still fits.
                    value = value
                        .checked_mul(10)
                        .and_then(|v| {
                            if negative {
                                v.checked_sub(digit)
                            } else {
                                v.checked_add(digit)
                            }
                        })
                        .ok_or(BencodeError::MalformedInteger {
                            offset: start,
                            reason: "out of range for a 64-bit integer",
                        })?;
                    *pos += 1;
                }
                Some(_) => {
                    return Err(BencodeError::MalformedInteger {
                        offset: *pos,
                        reason: "unexpected byte",
                    })
                }
            }
        }

        let digits = &self.data[digits_start..*pos];
        if digits.is_empty() {
            return Err(BencodeError::MalformedInteger {
                offset: start,
                reason: "no digits",
            });
        }
        if digits.len() > 1 && digits[0] == b'0' {
            return Err(BencodeError::MalformedInteger {
                offset: start,
                reason: "leading zeros are not allowed",
            });
        }
        if negative && digits == b"0" {
            return Err(BencodeError::MalformedInteger {
                offset: start,
                reason: "negative zero is not allowed",
            });
        }

        *pos += 1; // skip 'e'
        Ok(BValue::Integer(value))
    }

    /// `<length>:<bytes>`. The declared length is checked against what is
    /// left in the buffer before the payload is touched.
    fn decode_string(&self, pos: &mut usize) -> Result<BValue, BencodeError> {
        let start = *pos;
        let mut length: usize = 0;
        loop {
            match self.data.get(*pos) {
                Some(&TOKEN_STRING_SEPARATOR) => break,
                Some(&c) if c.is_ascii_digit() => {
                    length = length
                        .checked_mul(10)
                        .and_then(|l| l.checked_add(usize::from(c - b'0')))
                        .ok_or(BencodeError::MalformedStringLength { offset: start })?;
                    *pos += 1;
                }
                // Either a stray byte or no ':' before the end of the buffer.
                _ => return Err(BencodeError::MalformedStringLength { offset: start }),
            }
        }

        let digits = &self.data[start..*pos];
        if digits.len() > 1 && digits[0] == b'0' {
            return Err(BencodeError::MalformedStringLength { offset: start });
        }

        *pos += 1; // skip ':'
        let remaining = self.data.len() - *pos;
        if length > remaining {
            return Err(BencodeError::OutOfBounds {
                offset: start,
                declared: length,
                remaining,
            });
        }

        let bytes = self.data.slice(*pos..*pos + length);
        *pos += length;
        Ok(BValue::ByteString(bytes))
    }

    /// `l<values>e`
    fn decode_list(&self, pos: &mut usize, depth: usize) -> Result<BValue, BencodeError> {
        *pos += 1; // skip 'l'
        let mut items = Vec::new();

        loop {
            match self.data.get(*pos) {
                None => return Err(BencodeError::UnexpectedEnd { offset: *pos }),
                Some(&TOKEN_END) => break,
                Some(_) => items.push(self.decode_value(pos, depth)?),
            }
        }

        *pos += 1; // skip 'e'
        Ok(BValue::List(items))
    }

    /// `d(<string><value>)*e`. Pairs are kept in parse order.
    fn decode_dict(&self, pos: &mut usize, depth: usize) -> Result<BValue, BencodeError> {
        *pos += 1; // skip 'd'
        let mut dict = Dictionary::new();
        let mut seen: HashSet<Bytes> = HashSet::new();

        loop {
            let key_offset = *pos;
            let key = match self.data.get(*pos) {
                None => return Err(BencodeError::UnexpectedEnd { offset: *pos }),
                Some(&TOKEN_END) => break,
                Some(&(TOKEN_INTEGER | TOKEN_LIST | TOKEN_DICT)) => {
                    return Err(BencodeError::NonStringDictKey { offset: key_offset })
                }
                Some(_) => match self.decode_value(pos, depth)? {
                    BValue::ByteString(key) => key,
                    _ => return Err(BencodeError::NonStringDictKey { offset: key_offset }),
                },
            };

            if !seen.insert(key.clone()) {
                return Err(BencodeError::DuplicateDictKey { offset: key_offset });
            }

            let value = self.decode_value(pos, depth)?;
            dict.push_unchecked(key, value);
        }

        *pos += 1; // skip 'e'
        Ok(BValue::Dict(dict))
    }
}

/// Decodes the first value in `input`, returning how many bytes it used.
///
/// Anything after the value is left alone, which is what peer extension
/// messages need: they append raw data after a bencoded dictionary.
pub fn decode_bencode(input: &[u8]) -> Result<(usize, BValue), BencodeError> {
    let mut decoder = Decoder::new(Bytes::copy_from_slice(input));
    let value = decoder.decode()?;
    Ok((decoder.position(), value))
}

/// Decodes `input` as exactly one value; leftover bytes are an error.
pub fn decode_bencode_exact(input: &[u8]) -> Result<BValue, BencodeError> {
    let (consumed, value) = decode_bencode(input)?;
    if consumed != input.len() {
        return Err(BencodeError::TrailingData { offset: consumed });
    }
    Ok(value)
}
