use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use super::BValue;
use crate::bencode::bvalue::Dictionary;

/// Order in which dict pairs are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DictOrder {
	/// Stored order. Reproduces a decoded document byte for byte.
	Preserve,
	/// Ascending by raw key bytes, the form other clients hash against.
	Canonical,
}

/// Turns a `BValue` tree into bencode. Holds nothing but its dict ordering,
/// so one encoder can be shared freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Encoder {
	order: DictOrder,
}

impl Encoder {
	pub fn new(order: DictOrder) -> Self {
		Self { order }
	}

	pub fn preserving() -> Self {
		Self::new(DictOrder::Preserve)
	}

	pub fn canonical() -> Self {
		Self::new(DictOrder::Canonical)
	}

	pub fn order(&self) -> DictOrder {
		self.order
	}

	pub fn encode(&self, value: &BValue) -> Vec<u8> {
		let mut out: Vec<u8> = Vec::new();
		self.encode_into(value, &mut out);
		out
	}

	/// Encodes the whole value first, then hands it to `writer` in one go.
	pub fn encode_to<W: Write>(&self, value: &BValue, writer: &mut W) -> io::Result<()> {
		writer.write_all(&self.encode(value))
	}

	fn encode_into(&self, value: &BValue, out: &mut Vec<u8>) {
		match value {
			BValue::Integer(i) => {
				out.push(b'i');
				out.extend_from_slice(i.to_string().as_bytes());
				out.push(b'e');
			}
			BValue::ByteString(bytes) => encode_bytes(bytes, out),
			BValue::List(items) => {
				out.push(b'l');
				for item in items {
					self.encode_into(item, out);
				}
				out.push(b'e');
			}
			BValue::Dict(dict) => self.encode_dict(dict, out),
		}
	}

	fn encode_dict(&self, dict: &Dictionary, out: &mut Vec<u8>) {
		out.push(b'd');
		match self.order {
			DictOrder::Preserve => {
				for (key, val) in dict.iter() {
					encode_bytes(key, out);
					self.encode_into(val, out);
				}
			}
			DictOrder::Canonical => {
				let mut pairs: Vec<_> = dict.iter().collect();
				pairs.sort_by(|a, b| a.0.cmp(b.0));
				for (key, val) in pairs {
					encode_bytes(key, out);
					self.encode_into(val, out);
				}
			}
		}
		out.push(b'e');
	}
}

// Length is the raw byte count, never a character count.
fn encode_bytes(bytes: &[u8], out: &mut Vec<u8>) {
	out.extend_from_slice(bytes.len().to_string().as_bytes());
	out.push(b':');
	out.extend_from_slice(bytes);
}

/// Encode a `BValue`, writing dict pairs in the order they are stored.
pub fn encode_preserving(value: &BValue) -> Vec<u8> {
	Encoder::preserving().encode(value)
}

/// Encode a `BValue`, writing dict pairs sorted by key.
pub fn encode_canonical(value: &BValue) -> Vec<u8> {
	Encoder::canonical().encode(value)
}
