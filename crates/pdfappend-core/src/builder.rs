//! Update builder
//!
//! A mutable overlay over the original document bytes. Objects are staged
//! here and only serialized by [`UpdateBuilder::write`]; the original buffer
//! is borrowed immutably and never modified.

use std::io::Write;

use crate::config::UpdateConfig;
use crate::error::PdfAppendError;
use crate::objects::{filespec_object, stream_object, StagedObject};
use crate::reader::{LopdfReader, Reader, FREE_GENERATION};
use crate::value::{Dictionary, ObjRef, Value};
use crate::writer::{self, WriteReport};

/// One mutation session over an existing PDF.
#[derive(Debug)]
pub struct UpdateBuilder<'a, R: Reader = LopdfReader> {
    original: &'a [u8],
    reader: R,
    next_number: u32,
    additions: Vec<StagedObject>,
    replacements: Vec<StagedObject>,
    config: UpdateConfig,
}

impl<'a> UpdateBuilder<'a, LopdfReader> {
    /// Parse `original` and start a session over it.
    pub fn new(original: &'a [u8]) -> Result<Self, PdfAppendError> {
        let reader = LopdfReader::from_bytes(original)?;
        Self::with_reader(original, reader)
    }
}

impl<'a, R: Reader> UpdateBuilder<'a, R> {
    /// Start a session with an already constructed reader over `original`.
    pub fn with_reader(original: &'a [u8], reader: R) -> Result<Self, PdfAppendError> {
        let size = reader.size();
        if size < 1 {
            return Err(PdfAppendError::UnusableTrailer(format!(
                "too small Size {}",
                size
            )));
        }
        let next_number = u32::try_from(size).map_err(|_| {
            PdfAppendError::UnusableTrailer(format!("Size {} out of range", size))
        })?;
        Ok(Self {
            original,
            reader,
            next_number,
            additions: Vec::new(),
            replacements: Vec::new(),
            config: UpdateConfig::default(),
        })
    }

    /// Replace the default marker and trailer keys. Invalid values are rejected.
    pub fn with_config(mut self, config: UpdateConfig) -> Result<Self, PdfAppendError> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Stage a new stream object built from `content`.
    pub fn stage_addition(
        &mut self,
        content: &[u8],
        dict: Dictionary,
    ) -> Result<ObjRef, PdfAppendError> {
        let number = self.reserve(1)?;
        let obj = stream_object(number, 0, content, dict)?;
        let reference = obj.reference();
        self.additions.push(obj);
        self.next_number += 1;
        tracing::debug!("Staged stream {}", reference);
        Ok(reference)
    }

    /// Stage an embedded file stream plus the file specification naming it.
    ///
    /// `dict` becomes the file specification dictionary. Returns its reference.
    pub fn stage_attachment(
        &mut self,
        filename: &str,
        content: &[u8],
        dict: Dictionary,
    ) -> Result<ObjRef, PdfAppendError> {
        let stream_number = self.reserve(2)?;
        let filespec_number = stream_number + 1;

        let mut stream_dict = Dictionary::new();
        stream_dict.set("Type", Value::name("EmbeddedFile"));
        let stream = stream_object(stream_number, 0, content, stream_dict)?;
        let filespec = filespec_object(filespec_number, 0, stream.reference(), filename, dict);
        let reference = filespec.reference();

        self.additions.push(stream);
        self.additions.push(filespec);
        self.next_number += 2;
        tracing::debug!("Staged attachment {:?} as {}", filename, reference);
        Ok(reference)
    }

    /// Stage new content for existing object `number`, keeping its generation.
    ///
    /// Best effort: an object that is reachable from the trailer through more
    /// than one path cannot be rewritten safely yet, and readers may still
    /// pick up the original through the other path.
    pub fn stage_replacement(
        &mut self,
        number: u32,
        content: &[u8],
        dict: Dictionary,
    ) -> Result<ObjRef, PdfAppendError> {
        if number == 0 {
            return Err(PdfAppendError::ReplaceObjectZero);
        }
        let (_, generation) = self.reader.xref(number);
        if generation == FREE_GENERATION {
            return Err(PdfAppendError::ObjectNotFound(number));
        }
        // Same generation: this replaces the existing object in place.
        let obj = stream_object(number, generation, content, dict)?;
        let reference = obj.reference();
        self.replacements.push(obj);
        tracing::debug!("Staged replacement {}", reference);
        Ok(reference)
    }

    /// Write the original bytes plus the staged update to `w`.
    pub fn write<W: Write>(&mut self, w: &mut W) -> Result<WriteReport, PdfAppendError> {
        writer::write(
            self.original,
            &mut self.additions,
            &mut self.replacements,
            &self.reader,
            self.next_number,
            &self.config,
            w,
        )
    }

    /// Convenience wrapper around [`UpdateBuilder::write`] into a new buffer.
    pub fn to_bytes(&mut self) -> Result<Vec<u8>, PdfAppendError> {
        let mut out = Vec::with_capacity(self.original.len() + 1024);
        self.write(&mut out)?;
        Ok(out)
    }

    pub fn original(&self) -> &[u8] {
        self.original
    }

    pub fn reader(&self) -> &R {
        &self.reader
    }

    pub fn config(&self) -> &UpdateConfig {
        &self.config
    }

    /// Number the next staged object will get.
    pub fn next_number(&self) -> u32 {
        self.next_number
    }

    pub fn additions(&self) -> &[StagedObject] {
        &self.additions
    }

    pub fn replacements(&self) -> &[StagedObject] {
        &self.replacements
    }

    pub fn has_changes(&self) -> bool {
        !self.additions.is_empty() || !self.replacements.is_empty()
    }

    /// First of `count` free object numbers. Nothing is consumed until the
    /// caller advances `next_number`.
    fn reserve(&self, count: u32) -> Result<u32, PdfAppendError> {
        self.next_number
            .checked_add(count)
            .map(|_| self.next_number)
            .ok_or_else(|| PdfAppendError::UnusableTrailer("object numbers exhausted".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{dict, sample_pdf, MemoryReader};
    use pretty_assertions::assert_eq;

    fn reader_with_size(size: Value) -> MemoryReader {
        MemoryReader::new(dict([("Size", size), ("Root", Value::reference(1, 0))]))
            .with_object(1, Value::dictionary())
            .with_generation(3, 2, Value::dictionary())
    }

    #[test]
    fn test_new_from_sample() {
        let pdf = sample_pdf();
        let builder = UpdateBuilder::new(&pdf.bytes).expect("Should parse");
        assert_eq!(builder.next_number(), 6);
        assert!(!builder.has_changes());
        assert_eq!(builder.original(), pdf.bytes.as_slice());
    }

    #[test]
    fn test_rejects_missing_size() {
        let reader = MemoryReader::new(Dictionary::new());
        let err = UpdateBuilder::with_reader(b"", reader).unwrap_err();
        assert!(matches!(err, PdfAppendError::UnusableTrailer(_)));
    }

    #[test]
    fn test_rejects_small_size() {
        for size in [Value::integer(0), Value::integer(-3), Value::name("Six")] {
            let err = UpdateBuilder::with_reader(b"", reader_with_size(size)).unwrap_err();
            assert!(matches!(err, PdfAppendError::UnusableTrailer(_)));
        }
    }

    #[test]
    fn test_rejects_oversized_size() {
        let reader = reader_with_size(Value::integer(i64::from(u32::MAX) + 1));
        assert!(UpdateBuilder::with_reader(b"", reader).is_err());
    }

    #[test]
    fn test_addition_consumes_one_number() {
        let mut builder = UpdateBuilder::with_reader(b"", reader_with_size(Value::integer(6))).unwrap();
        let first = builder.stage_addition(b"some content", Dictionary::new()).unwrap();
        let second = builder.stage_addition(b"other content", Dictionary::new()).unwrap();

        assert_eq!(first, ObjRef(6, 0));
        assert_eq!(second, ObjRef(7, 0));
        assert_eq!(builder.next_number(), 8);
        assert_eq!(builder.additions().len(), 2);
    }

    #[test]
    fn test_attachment_consumes_two_numbers() {
        let mut builder = UpdateBuilder::with_reader(b"", reader_with_size(Value::integer(6))).unwrap();
        let filespec = builder.stage_attachment("f.txt", b"hello", Dictionary::new()).unwrap();

        assert_eq!(filespec, ObjRef(7, 0));
        assert_eq!(builder.next_number(), 8);

        let [stream, spec] = builder.additions() else {
            panic!("expected two staged objects");
        };
        assert_eq!(stream.number, 6);
        assert_eq!(stream.dict.key("Type").as_name(), Some("EmbeddedFile"));
        assert!(stream.is_stream());
        assert!(!spec.is_stream());
        assert_eq!(spec.dict.key("EF").key("F"), &Value::reference(6, 0));
        assert_eq!(spec.dict.key("F").raw_string(), Some(&b"f.txt"[..]));
    }

    #[test]
    fn test_replacement_keeps_generation() {
        let mut builder = UpdateBuilder::with_reader(b"", reader_with_size(Value::integer(6))).unwrap();
        let reference = builder.stage_replacement(3, b"BT ET", Dictionary::new()).unwrap();

        assert_eq!(reference, ObjRef(3, 2));
        assert_eq!(builder.next_number(), 6);
        assert_eq!(builder.replacements().len(), 1);
        assert!(builder.additions().is_empty());
    }

    #[test]
    fn test_replacement_of_object_zero_fails() {
        let mut builder = UpdateBuilder::with_reader(b"", reader_with_size(Value::integer(6))).unwrap();
        let err = builder.stage_replacement(0, b"x", Dictionary::new()).unwrap_err();
        assert!(matches!(err, PdfAppendError::ReplaceObjectZero));
        assert!(!builder.has_changes());
    }

    #[test]
    fn test_replacement_of_missing_object_fails() {
        let pdf = sample_pdf();
        let mut builder = UpdateBuilder::new(&pdf.bytes).unwrap();
        let err = builder.stage_replacement(7, b"x", Dictionary::new()).unwrap_err();
        assert!(matches!(err, PdfAppendError::ObjectNotFound(7)));
        assert!(!builder.has_changes());

        // A valid target still works after a rejected one.
        assert_eq!(
            builder.stage_replacement(5, b"x", Dictionary::new()).unwrap(),
            ObjRef(5, 0)
        );
    }

    #[test]
    fn test_with_config_validates() {
        let builder = UpdateBuilder::with_reader(b"", reader_with_size(Value::integer(6))).unwrap();
        let mut config = UpdateConfig::default();
        config.marker = "additions".into();
        let err = builder.with_config(config).unwrap_err();
        assert!(matches!(err, PdfAppendError::Config(_)));

        let builder = UpdateBuilder::with_reader(b"", reader_with_size(Value::integer(6))).unwrap();
        let mut config = UpdateConfig::default();
        config.keys.replaced_streams = "Bad/Key".into();
        assert!(builder.with_config(config).is_err());

        let builder = UpdateBuilder::with_reader(b"", reader_with_size(Value::integer(6))).unwrap();
        let mut config = UpdateConfig::default();
        config.marker = "% acme".into();
        let builder = builder.with_config(config).unwrap();
        assert_eq!(builder.config().marker, "% acme");
    }

    #[test]
    fn test_number_exhaustion() {
        let reader = reader_with_size(Value::integer(i64::from(u32::MAX)));
        let mut builder = UpdateBuilder::with_reader(b"", reader).unwrap();
        assert!(builder.stage_addition(b"x", Dictionary::new()).is_err());
        assert!(builder.stage_attachment("x", b"x", Dictionary::new()).is_err());
        assert!(!builder.has_changes());
    }
}
