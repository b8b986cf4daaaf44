//! PDF value model
//!
//! A closed tagged union over every PDF object kind, plus the canonical
//! textual form used both for debugging views and for emitting objects
//! into an incremental update.
//!
//! ```text
//! 12 0 R                      Reference
//! /FlateDecode                Name
//! (report.txt)                String
//! [1 0 R 2 0 R]               Array
//! <</Length 21 /Type /XObject>> Dictionary (keys sorted)
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::encoding::decode_text;
use crate::error::PdfAppendError;

/// Object reference (object number, generation number)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjRef(pub u32, pub u16);

impl ObjRef {
    pub fn number(&self) -> u32 {
        self.0
    }

    pub fn generation(&self) -> u16 {
        self.1
    }
}

impl fmt::Display for ObjRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} R", self.0, self.1)
    }
}

static ABSENT: Value = Value::Absent;

/// A PDF value.
///
/// `Absent` is the default and stands for "not present": missing keys,
/// failed appends. It is distinct from the PDF `null` object.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Absent,
    Null,
    Boolean(bool),
    Integer(i64),
    Real(f64),
    String(Vec<u8>),
    Name(String),
    Array(Vec<Value>),
    Dictionary(Dictionary),
    Stream(Stream),
    Reference(ObjRef),
    Definition { reference: ObjRef, value: Box<Value> },
}

/// Dictionary keyed by name. Keys are unique and iterate in byte order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dictionary(BTreeMap<String, Value>);

/// Stream header, undecoded payload and the file offset it was read from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stream {
    pub dict: Dictionary,
    pub raw: Vec<u8>,
    pub offset: u64,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Value stored under `key`, or [`Value::Absent`].
    pub fn key(&self, key: &str) -> &Value {
        self.0.get(key).unwrap_or(&ABSENT)
    }

    /// Store `value` under `key`. Storing [`Value::Absent`] deletes the key.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if value.is_absent() {
            self.0.remove(&key);
        } else {
            self.0.insert(key, value);
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn write_canonical(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(b"<<");
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(b' ');
            }
            out.push(b'/');
            out.extend_from_slice(key.as_bytes());
            out.push(b' ');
            value.write_canonical(out);
        }
        out.extend_from_slice(b">>");
    }

    pub fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_canonical(&mut out);
        out
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut dict = Dictionary::new();
        for (key, value) in iter {
            dict.set(key, value);
        }
        dict
    }
}

impl fmt::Display for Dictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.to_canonical_bytes()))
    }
}

impl Value {
    pub fn array() -> Self {
        Value::Array(Vec::new())
    }

    pub fn dictionary() -> Self {
        Value::Dictionary(Dictionary::new())
    }

    pub fn integer(n: i64) -> Self {
        Value::Integer(n)
    }

    pub fn name(name: impl Into<String>) -> Self {
        Value::Name(name.into())
    }

    pub fn string(bytes: impl Into<Vec<u8>>) -> Self {
        Value::String(bytes.into())
    }

    pub fn reference(number: u32, generation: u16) -> Self {
        Value::Reference(ObjRef(number, generation))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Value::Absent)
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Absent => "absent",
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::String(_) => "string",
            Value::Name(_) => "name",
            Value::Array(_) => "array",
            Value::Dictionary(_) => "dictionary",
            Value::Stream(_) => "stream",
            Value::Reference(_) => "reference",
            Value::Definition { .. } => "definition",
        }
    }

    /// Append `item` to an array. Any other variant yields [`Value::Absent`].
    pub fn append(self, item: Value) -> Value {
        match self {
            Value::Array(mut items) => {
                items.push(item);
                Value::Array(items)
            }
            _ => Value::Absent,
        }
    }

    /// Set or delete (with [`Value::Absent`]) a key on a dictionary or stream header.
    pub fn set_key(&mut self, key: impl Into<String>, value: Value) -> Result<(), PdfAppendError> {
        match self {
            Value::Dictionary(dict) => dict.set(key, value),
            Value::Stream(stream) => stream.dict.set(key, value),
            other => return Err(PdfAppendError::NotKeyedContainer(other.kind_name())),
        }
        Ok(())
    }

    /// Look up `key` in a dictionary, stream header or object definition.
    pub fn key(&self, key: &str) -> &Value {
        match self {
            Value::Dictionary(dict) => dict.key(key),
            Value::Stream(stream) => stream.dict.key(key),
            Value::Definition { value, .. } => value.key(key),
            _ => &ABSENT,
        }
    }

    pub fn index(&self, i: usize) -> &Value {
        match self {
            Value::Array(items) => items.get(i).unwrap_or(&ABSENT),
            Value::Definition { value, .. } => value.index(i),
            _ => &ABSENT,
        }
    }

    /// Number of array elements or dictionary entries.
    pub fn len(&self) -> usize {
        match self {
            Value::Array(items) => items.len(),
            Value::Dictionary(dict) => dict.len(),
            Value::Stream(stream) => stream.dict.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            Value::Name(name) => Some(name),
            _ => None,
        }
    }

    /// Raw bytes of a string object.
    pub fn raw_string(&self) -> Option<&[u8]> {
        match self {
            Value::String(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn as_reference(&self) -> Option<ObjRef> {
        match self {
            Value::Reference(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&Dictionary> {
        match self {
            Value::Dictionary(dict) => Some(dict),
            Value::Stream(stream) => Some(&stream.dict),
            Value::Definition { value, .. } => value.as_dict(),
            _ => None,
        }
    }

    pub fn as_stream(&self) -> Option<&Stream> {
        match self {
            Value::Stream(stream) => Some(stream),
            Value::Definition { value, .. } => value.as_stream(),
            _ => None,
        }
    }

    /// Object number of a reference or definition.
    pub fn object_number(&self) -> Option<u32> {
        match self {
            Value::Reference(r) | Value::Definition { reference: r, .. } => Some(r.0),
            _ => None,
        }
    }

    /// Render into `out` using the canonical PDF syntax.
    pub fn write_canonical(&self, out: &mut Vec<u8>) {
        match self {
            Value::Absent => {}
            Value::Null => out.extend_from_slice(b"null"),
            Value::Boolean(b) => out.extend_from_slice(if *b { &b"true"[..] } else { &b"false"[..] }),
            Value::Integer(n) => out.extend_from_slice(n.to_string().as_bytes()),
            Value::Real(r) => out.extend_from_slice(r.to_string().as_bytes()),
            Value::String(bytes) => write_literal_string(bytes, out),
            Value::Name(name) => {
                out.push(b'/');
                out.extend_from_slice(name.as_bytes());
            }
            Value::Array(items) => {
                out.push(b'[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push(b' ');
                    }
                    item.write_canonical(out);
                }
                out.push(b']');
            }
            Value::Dictionary(dict) => dict.write_canonical(out),
            Value::Stream(stream) => {
                stream.dict.write_canonical(out);
                out.extend_from_slice(format!("@{}", stream.offset).as_bytes());
            }
            Value::Reference(r) => out.extend_from_slice(r.to_string().as_bytes()),
            Value::Definition { reference, value } => {
                out.extend_from_slice(format!("{{{} {} obj}}", reference.0, reference.1).as_bytes());
                value.write_canonical(out);
            }
        }
    }

    pub fn to_canonical_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_canonical(&mut out);
        out
    }

    /// Canonical form as text. Bytes that are not UTF-8 are replaced.
    pub fn ustring(&self) -> String {
        String::from_utf8_lossy(&self.to_canonical_bytes()).into_owned()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.ustring())
    }
}

impl From<Dictionary> for Value {
    fn from(dict: Dictionary) -> Self {
        Value::Dictionary(dict)
    }
}

impl From<ObjRef> for Value {
    fn from(r: ObjRef) -> Self {
        Value::Reference(r)
    }
}

/// Write a literal string, decoding known text encodings first.
fn write_literal_string(bytes: &[u8], out: &mut Vec<u8>) {
    let text = decode_text(bytes);
    let body = match &text {
        Some(text) => text.as_bytes(),
        None => bytes,
    };
    out.push(b'(');
    for &b in body {
        if matches!(b, b'(' | b')' | b'\\') {
            out.push(b'\\');
        }
        out.push(b);
    }
    out.push(b')');
}
