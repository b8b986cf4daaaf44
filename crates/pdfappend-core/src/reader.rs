//! Read access to the original document
//!
//! Parsing the original PDF is delegated to `lopdf`. This module adapts a
//! loaded `lopdf::Document` to the small surface the update machinery needs:
//!
//! ```text
//! trailer()     -> << /Root 1 0 R /Size 6 ... >>
//! size()        -> 6
//! startxref()   -> byte offset of the last xref section
//! xref(n)       -> (offset, generation), generation 65535 when free/unknown
//! resolve(ref)  -> the object behind an indirect reference
//! ```

use lopdf::xref::XrefEntry;
use lopdf::{Document, Object};

use crate::error::PdfAppendError;
use crate::value::{Dictionary, ObjRef, Stream, Value};

/// Generation number marking a free or unknown xref slot.
pub const FREE_GENERATION: u16 = 65535;

/// Keys only meaningful in a cross-reference stream dictionary.
const XREF_STREAM_KEYS: [&str; 6] = ["Type", "W", "Index", "Filter", "DecodeParms", "Length"];

/// Read side of an incremental update.
pub trait Reader {
    /// The document trailer (the most recent one).
    fn trailer(&self) -> &Dictionary;

    /// Offset recorded after the final `startxref` keyword.
    fn startxref(&self) -> u64;

    /// Offset and generation of `number`; generation is [`FREE_GENERATION`]
    /// when the slot is free or the object is unknown.
    fn xref(&self, number: u32) -> (u64, u16);

    /// Load the object behind `reference`, `None` if it does not exist.
    fn resolve(&self, reference: ObjRef) -> Option<Value>;

    /// `Size` entry of the trailer, 0 if missing or not an integer.
    fn size(&self) -> i64 {
        self.trailer().key("Size").as_i64().unwrap_or(0)
    }
}

/// [`Reader`] backed by a fully loaded `lopdf` document.
#[derive(Debug)]
pub struct LopdfReader {
    document: Document,
    trailer: Dictionary,
    startxref: u64,
}

impl LopdfReader {
    /// Parse the document in `bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PdfAppendError> {
        if !bytes.starts_with(b"%PDF-") {
            return Err(PdfAppendError::Parse("Not a valid PDF".into()));
        }
        let startxref = find_startxref(bytes)?;
        let document =
            Document::load_mem(bytes).map_err(|e| PdfAppendError::Parse(e.to_string()))?;
        let trailer = classic_trailer(&document.trailer);
        tracing::debug!(
            "Loaded PDF {} with {} objects, startxref {}",
            document.version,
            document.objects.len(),
            startxref
        );
        Ok(Self {
            document,
            trailer,
            startxref,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

impl Reader for LopdfReader {
    fn trailer(&self) -> &Dictionary {
        &self.trailer
    }

    fn startxref(&self) -> u64 {
        self.startxref
    }

    fn xref(&self, number: u32) -> (u64, u16) {
        match self.document.reference_table.get(number) {
            Some(XrefEntry::Normal { offset, generation }) => (*offset as u64, *generation),
            // Objects inside object streams always have generation 0
            Some(XrefEntry::Compressed { .. }) => (0, 0),
            _ => (0, FREE_GENERATION),
        }
    }

    fn resolve(&self, reference: ObjRef) -> Option<Value> {
        let object = self.document.get_object((reference.0, reference.1)).ok()?;
        let (offset, _) = self.xref(reference.0);
        Some(convert_object(object, offset))
    }
}

/// Convert a `lopdf` object into the value model. `offset` is recorded on streams.
pub fn convert_object(object: &Object, offset: u64) -> Value {
    match object {
        Object::Null => Value::Null,
        Object::Boolean(b) => Value::Boolean(*b),
        Object::Integer(n) => Value::Integer(*n),
        Object::Real(r) => Value::Real(f64::from(*r)),
        Object::Name(name) => Value::Name(String::from_utf8_lossy(name).into_owned()),
        Object::String(bytes, _) => Value::String(bytes.clone()),
        Object::Array(items) => {
            Value::Array(items.iter().map(|o| convert_object(o, offset)).collect())
        }
        Object::Dictionary(dict) => Value::Dictionary(convert_dictionary(dict, offset)),
        Object::Stream(stream) => Value::Stream(Stream {
            dict: convert_dictionary(&stream.dict, offset),
            raw: stream.content.clone(),
            offset,
        }),
        Object::Reference((number, generation)) => Value::reference(*number, *generation),
    }
}

pub fn convert_dictionary(dict: &lopdf::Dictionary, offset: u64) -> Dictionary {
    dict.iter()
        .map(|(key, value)| {
            (
                String::from_utf8_lossy(key).into_owned(),
                convert_object(value, offset),
            )
        })
        .collect()
}

/// Trailer as a classic trailer dictionary.
///
/// Documents whose last section is a cross-reference stream expose the
/// stream dictionary as trailer; its stream-only keys are dropped.
///
/// Known limitation: the string syntax (literal or hex) is not kept. The
/// bytes of `/ID` and other hex strings survive conversion, but the copied
/// trailer renders them as literal strings. Readers may normalise raw CR
/// bytes in those, and byte runs that decode as PDFDocEncoding are written
/// back as UTF-8, so the new revision can carry a different `/ID`.
fn classic_trailer(trailer: &lopdf::Dictionary) -> Dictionary {
    let mut dict = convert_dictionary(trailer, 0);
    if dict.key("Type").as_name() == Some("XRef") {
        for key in XREF_STREAM_KEYS {
            dict.remove(key);
        }
    }
    dict
}

/// Find the offset after the last `startxref` keyword
pub fn find_startxref(bytes: &[u8]) -> Result<u64, PdfAppendError> {
    // Search backwards from end for "startxref"
    let search_start = bytes.len().saturating_sub(1024);
    let tail = &bytes[search_start..];

    let pos = rfind_pattern(tail, b"startxref")
        .ok_or_else(|| PdfAppendError::Parse("startxref not found".into()))?;

    let after = &tail[pos + b"startxref".len()..];
    let start = after
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .ok_or_else(|| PdfAppendError::Parse("Invalid startxref offset".into()))?;
    let digits = &after[start..];
    let end = digits
        .iter()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());

    std::str::from_utf8(&digits[..end])
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| PdfAppendError::Parse("Invalid startxref number".into()))
}

/// Find the last occurrence of pattern in bytes
fn rfind_pattern(bytes: &[u8], pattern: &[u8]) -> Option<usize> {
    if pattern.is_empty() || pattern.len() > bytes.len() {
        return None;
    }
    bytes
        .windows(pattern.len())
        .rposition(|window| window == pattern)
}
