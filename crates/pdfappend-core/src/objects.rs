//! Objects staged for an incremental update
//!
//! ```text
//! 7 0 obj
//! <</Filter /FlateDecode /Length 20>>
//! stream
//! ...deflated bytes...
//! endstream
//! endobj
//! ```

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

use crate::error::PdfAppendError;
use crate::value::{Dictionary, ObjRef, Value};

/// One object awaiting serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct StagedObject {
    pub number: u32,
    pub generation: u16,
    pub dict: Dictionary,
    /// Stored stream bytes; `None` for a plain dictionary object.
    pub payload: Option<Vec<u8>>,
    /// Offset from the start of the appended region, set while writing.
    pub offset: Option<u64>,
}

impl StagedObject {
    pub fn reference(&self) -> ObjRef {
        ObjRef(self.number, self.generation)
    }

    pub fn is_stream(&self) -> bool {
        self.payload.is_some()
    }

    /// Serialize as `n g obj ... endobj`.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = format!("{} {} obj\n", self.number, self.generation).into_bytes();
        self.dict.write_canonical(&mut out);
        out.push(b'\n');
        if let Some(payload) = &self.payload {
            out.extend_from_slice(b"stream\n");
            out.extend_from_slice(payload);
            out.extend_from_slice(b"\nendstream\n");
        }
        out.extend_from_slice(b"endobj\n");
        out
    }
}

/// Build a stream object.
///
/// Content without a `Filter` entry is deflated and marked `/FlateDecode`;
/// otherwise it is taken as already encoded. A missing `Length` is set to the
/// stored byte count.
pub fn stream_object(
    number: u32,
    generation: u16,
    content: &[u8],
    mut dict: Dictionary,
) -> Result<StagedObject, PdfAppendError> {
    let payload = if dict.contains_key("Filter") {
        content.to_vec()
    } else {
        dict.set("Filter", Value::name("FlateDecode"));
        deflate(content)?
    };
    if !dict.contains_key("Length") {
        dict.set("Length", Value::integer(payload.len() as i64));
    }
    Ok(StagedObject {
        number,
        generation,
        dict,
        payload: Some(payload),
        offset: None,
    })
}

/// Build the file specification pointing at embedded file stream `target`.
pub fn filespec_object(
    number: u32,
    generation: u16,
    target: ObjRef,
    filename: &str,
    mut dict: Dictionary,
) -> StagedObject {
    dict.set("Type", Value::name("Filespec"));
    dict.set("F", Value::string(filename));
    let mut ef = Dictionary::new();
    ef.set("F", Value::Reference(target));
    dict.set("EF", Value::Dictionary(ef));
    StagedObject {
        number,
        generation,
        dict,
        payload: None,
        offset: None,
    }
}

fn deflate(content: &[u8]) -> Result<Vec<u8>, PdfAppendError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(content)
        .map_err(PdfAppendError::Compression)?;
    encoder.finish().map_err(PdfAppendError::Compression)
}
