//! Incremental updates for existing PDF files
//!
//! This crate appends new or replacement objects to a PDF without touching
//! a single byte of the original. The result carries a fresh xref section and
//! a trailer chained to the previous revision through `/Prev`.
//!
//! Parsing of the original document is delegated to `lopdf` behind the
//! [`Reader`] trait; everything written is produced by this crate:
//! - `value`: the PDF value model and its canonical rendering
//! - `objects`: stream and file specification constructors
//! - `builder`: the staging session over the original bytes
//! - `writer`: the byte-exact incremental writer
//! - `traverse`: locating an object in the graph reachable from the trailer

pub mod builder;
pub mod config;
pub mod diagnostics;
pub mod encoding;
pub mod error;
pub mod objects;
pub mod reader;
pub mod traverse;
pub mod value;
pub mod writer;

#[cfg(test)]
mod testutil;

pub use builder::UpdateBuilder;
pub use config::{TrailerKeys, UpdateConfig};
pub use diagnostics::Warning;
pub use error::PdfAppendError;
pub use objects::{filespec_object, stream_object, StagedObject};
pub use reader::{LopdfReader, Reader, FREE_GENERATION};
pub use traverse::{find_object, Traversal};
pub use value::{Dictionary, ObjRef, Stream, Value};
pub use writer::WriteReport;

/// Append `content` as a new stream to the PDF in `original`.
///
/// Shorthand for a builder session with a single addition.
pub fn append_stream(original: &[u8], content: &[u8]) -> Result<Vec<u8>, PdfAppendError> {
    let mut builder = UpdateBuilder::new(original)?;
    builder.stage_addition(content, Dictionary::new())?;
    builder.to_bytes()
}

/// Attach `content` under `filename` to the PDF in `original`.
pub fn attach_file(
    original: &[u8],
    filename: &str,
    content: &[u8],
) -> Result<Vec<u8>, PdfAppendError> {
    let mut builder = UpdateBuilder::new(original)?;
    builder.stage_attachment(filename, content, Dictionary::new())?;
    builder.to_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::sample_pdf;

    #[test]
    fn test_append_stream_extends_original() {
        let pdf = sample_pdf();
        let out = append_stream(&pdf.bytes, b"some content").unwrap();
        assert!(out.starts_with(&pdf.bytes));
        assert!(out.ends_with(b"%%EOF\n"));
    }

    #[test]
    fn test_attach_file_reports_parse_errors() {
        let err = attach_file(b"not a pdf", "a.txt", b"x").unwrap_err();
        assert!(matches!(err, PdfAppendError::Parse(_)));
    }
}
