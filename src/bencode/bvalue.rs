use bytes::Bytes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BValue {
	ByteString(Bytes), // raw bytes, never assumed to be UTF-8
	Integer(i64),
	List(Vec<BValue>),
	Dict(Dictionary) // keys kept in parse/insertion order
}

impl BValue {
	/// Byte string holding the UTF-8 bytes of `s`.
	pub fn string(s: &str) -> Self {
		BValue::ByteString(Bytes::copy_from_slice(s.as_bytes()))
	}

	pub fn bytes(b: impl Into<Bytes>) -> Self {
		BValue::ByteString(b.into())
	}

	pub fn as_integer(&self) -> Option<i64> {
		match self {
			BValue::Integer(i) => Some(*i),
			_ => None,
		}
	}

	pub fn as_bytes(&self) -> Option<&Bytes> {
		match self {
			BValue::ByteString(b) => Some(b),
			_ => None,
		}
	}

	/// The byte string as `&str`, if it is one and holds valid UTF-8.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			BValue::ByteString(b) => std::str::from_utf8(b).ok(),
			_ => None,
		}
	}

	pub fn as_list(&self) -> Option<&[BValue]> {
		match self {
			BValue::List(l) => Some(l),
			_ => None,
		}
	}

	pub fn as_dict(&self) -> Option<&Dictionary> {
		match self {
			BValue::Dict(d) => Some(d),
			_ => None,
		}
	}

	pub fn into_dict(self) -> Option<Dictionary> {
		match self {
			BValue::Dict(d) => Some(d),
			_ => None,
		}
	}

	/// Looks up `key` if this value is a dict.
	pub fn get(&self, key: &[u8]) -> Option<&BValue> {
		self.as_dict()?.get(key)
	}
}

impl From<i64> for BValue {
	fn from(i: i64) -> Self {
		BValue::Integer(i)
	}
}

impl From<&str> for BValue {
	fn from(s: &str) -> Self {
		BValue::string(s)
	}
}

impl From<Bytes> for BValue {
	fn from(b: Bytes) -> Self {
		BValue::ByteString(b)
	}
}

impl From<Vec<u8>> for BValue {
	fn from(b: Vec<u8>) -> Self {
		BValue::ByteString(Bytes::from(b))
	}
}

impl From<Vec<BValue>> for BValue {
	fn from(l: Vec<BValue>) -> Self {
		BValue::List(l)
	}
}

impl From<Dictionary> for BValue {
	fn from(d: Dictionary) -> Self {
		BValue::Dict(d)
	}
}

/// An ordered bencode dictionary.
///
/// Pairs are kept in the order they were inserted (or parsed), which is what
/// lets a decoded document be re-encoded byte for byte. Keys are unique:
/// inserting an existing key replaces its value without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
	entries: Vec<(Bytes, BValue)>,
}

impl Dictionary {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_capacity(capacity: usize) -> Self {
		Self { entries: Vec::with_capacity(capacity) }
	}

	/// Inserts a pair, returning the previous value stored under `key`.
	pub fn insert(&mut self, key: impl Into<Bytes>, value: BValue) -> Option<BValue> {
		let key = key.into();
		match self.position(&key) {
			Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
			None => {
				self.entries.push((key, value));
				None
			}
		}
	}

	/// Appends without checking for an existing key. Callers guarantee uniqueness.
	pub(crate) fn push_unchecked(&mut self, key: Bytes, value: BValue) {
		self.entries.push((key, value));
	}

	pub fn get(&self, key: &[u8]) -> Option<&BValue> {
		self.position(key).map(|idx| &self.entries[idx].1)
	}

	pub fn contains_key(&self, key: &[u8]) -> bool {
		self.position(key).is_some()
	}

	/// Removes `key`, keeping the relative order of the remaining pairs.
	pub fn remove(&mut self, key: &[u8]) -> Option<BValue> {
		let idx = self.position(key)?;
		Some(self.entries.remove(idx).1)
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&Bytes, &BValue)> {
		self.entries.iter().map(|(k, v)| (k, v))
	}

	pub fn keys(&self) -> impl Iterator<Item = &Bytes> {
		self.entries.iter().map(|(k, _)| k)
	}

	pub fn values(&self) -> impl Iterator<Item = &BValue> {
		self.entries.iter().map(|(_, v)| v)
	}

	/// True when keys are strictly ascending by raw bytes, i.e. the order a
	/// canonical encoder would emit.
	pub fn is_canonical(&self) -> bool {
		self.entries.windows(2).all(|pair| pair[0].0 < pair[1].0)
	}

	fn position(&self, key: &[u8]) -> Option<usize> {
		self.entries.iter().position(|(k, _)| k.as_ref() == key)
	}
}

impl<K: Into<Bytes>> FromIterator<(K, BValue)> for Dictionary {
	fn from_iter<I: IntoIterator<Item = (K, BValue)>>(iter: I) -> Self {
		let mut dict = Dictionary::new();
		for (key, value) in iter {
			dict.insert(key, value);
		}
		dict
	}
}

impl IntoIterator for Dictionary {
	type Item = (Bytes, BValue);
	type IntoIter = std::vec::IntoIter<(Bytes, BValue)>;

	fn into_iter(self) -> Self::IntoIter {
		self.entries.into_iter()
	}
}
