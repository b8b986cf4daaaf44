//! Incremental writer
//!
//! Appends one revision to an existing PDF:
//!
//! ```text
//! <original bytes, untouched>
//! % Qoorp additions
//! 5 0 obj ... endobj          replacements, in staging order
//! 6 0 obj ... endobj          additions, in staging order
//! xref
//! 5 1                         one subsection per replacement
//! 0000001234 00000 n
//! 6 2                         one contiguous subsection for additions
//! 0000001301 00000 n
//! 0000001390 00000 n
//! trailer
//! <</Prev 502 /QoorpAddedStreams1 [6 0 R] ... /Size 8>>
//! startxref
//! <offset of xref>
//! %%EOF
//! ```

use std::io::{self, Write};

use crate::config::UpdateConfig;
use crate::diagnostics::Warning;
use crate::error::PdfAppendError;
use crate::objects::StagedObject;
use crate::reader::{Reader, FREE_GENERATION};
use crate::value::Value;

/// Outcome of a successful write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteReport {
    /// Total bytes written, original included.
    pub written: usize,
    /// Offset of the new xref section, `None` when nothing was staged.
    pub startxref: Option<u64>,
    pub warnings: Vec<Warning>,
}

/// Byte-counting wrapper; a failed write reports what made it out before.
struct Tally<'w, W> {
    inner: &'w mut W,
    written: usize,
}

impl<'w, W: Write> Tally<'w, W> {
    fn new(inner: &'w mut W) -> Self {
        Self { inner, written: 0 }
    }

    /// Like `write_all`, but every accepted byte is counted even when a later
    /// chunk fails.
    fn put(&mut self, bytes: &[u8]) -> Result<usize, PdfAppendError> {
        let mut rest = bytes;
        while !rest.is_empty() {
            match self.inner.write(rest) {
                Ok(0) => {
                    return Err(PdfAppendError::Write {
                        written: self.written,
                        source: io::Error::new(
                            io::ErrorKind::WriteZero,
                            "failed to write whole buffer",
                        ),
                    })
                }
                Ok(n) => {
                    self.written += n;
                    rest = &rest[n..];
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(source) => {
                    return Err(PdfAppendError::Write {
                        written: self.written,
                        source,
                    })
                }
            }
        }
        Ok(bytes.len())
    }
}

/// Write `original` followed by an update containing the staged objects.
///
/// With nothing staged the output is exactly `original`. Each staged object's
/// `offset` is set relative to the end of `original`.
pub fn write<R: Reader + ?Sized, W: Write>(
    original: &[u8],
    additions: &mut [StagedObject],
    replacements: &mut [StagedObject],
    reader: &R,
    next_number: u32,
    config: &UpdateConfig,
    w: &mut W,
) -> Result<WriteReport, PdfAppendError> {
    let mut out = Tally::new(w);
    out.put(original)?;
    if additions.is_empty() && replacements.is_empty() {
        return Ok(WriteReport {
            written: out.written,
            ..WriteReport::default()
        });
    }

    let mut warnings = Vec::new();
    write_objects(&mut out, config, replacements, additions)?;
    let startxref = out.written as u64;
    write_xref(
        &mut out,
        original.len() as u64,
        replacements,
        additions,
        reader,
        &mut warnings,
    )?;
    write_trailer(&mut out, reader, next_number, config, additions, replacements)?;
    out.put(format!("startxref\n{}\n%%EOF\n", startxref).as_bytes())?;

    tracing::debug!(
        "Appended {} additions and {} replacements, {} bytes total",
        additions.len(),
        replacements.len(),
        out.written
    );
    Ok(WriteReport {
        written: out.written,
        startxref: Some(startxref),
        warnings,
    })
}

/// One fixed-width (20 byte) xref entry for an in-use object
pub fn xref_entry(offset: u64, generation: u16) -> String {
    format!("{:010} {:05} n \n", offset, generation)
}

/// Write the marker and all objects, recording offsets relative to the marker.
fn write_objects<W: Write>(
    out: &mut Tally<'_, W>,
    config: &UpdateConfig,
    replacements: &mut [StagedObject],
    additions: &mut [StagedObject],
) -> Result<usize, PdfAppendError> {
    let start = out.written;
    let mut result = out.put(format!("{}\n", config.marker).as_bytes())?;
    for obj in replacements.iter_mut().chain(additions.iter_mut()) {
        obj.offset = Some(result as u64);
        result += out.put(&obj.to_bytes())?;
    }
    debug_assert_eq!(result, out.written - start);
    Ok(result)
}

fn write_xref<R: Reader + ?Sized, W: Write>(
    out: &mut Tally<'_, W>,
    body_len: u64,
    replacements: &[StagedObject],
    additions: &[StagedObject],
    reader: &R,
    warnings: &mut Vec<Warning>,
) -> Result<usize, PdfAppendError> {
    let mut result = out.put(b"xref\n")?;
    for obj in replacements {
        let (_, generation) = reader.xref(obj.number);
        if generation == FREE_GENERATION {
            warnings.push(Warning::MissingFromXref { number: obj.number }.emit());
            continue;
        }
        let offset = obj.offset.unwrap_or_default() + body_len;
        result += out.put(format!("{} 1\n", obj.number).as_bytes())?;
        result += out.put(xref_entry(offset, obj.generation).as_bytes())?;
    }
    if let Some(first) = additions.first() {
        result += out.put(format!("{} {}\n", first.number, additions.len()).as_bytes())?;
        for obj in additions {
            let offset = obj.offset.unwrap_or_default() + body_len;
            result += out.put(xref_entry(offset, obj.generation).as_bytes())?;
        }
    }
    Ok(result)
}

fn write_trailer<R: Reader + ?Sized, W: Write>(
    out: &mut Tally<'_, W>,
    reader: &R,
    next_number: u32,
    config: &UpdateConfig,
    additions: &[StagedObject],
    replacements: &[StagedObject],
) -> Result<usize, PdfAppendError> {
    let mut trailer = reader.trailer().clone();
    trailer.set("Size", Value::integer(i64::from(next_number)));
    trailer.set("Prev", Value::integer(reader.startxref() as i64));

    if !additions.is_empty() {
        let (streams, files): (Vec<_>, Vec<_>) = additions.iter().partition(|o| o.is_stream());
        trailer.set(config.keys.added_files.as_str(), reference_array(&files));
        trailer.set(config.keys.added_streams.as_str(), reference_array(&streams));
    }
    if !replacements.is_empty() {
        let replaced: Vec<_> = replacements.iter().collect();
        trailer.set(config.keys.replaced_streams.as_str(), reference_array(&replaced));
    }

    let mut bytes = b"trailer\n".to_vec();
    trailer.write_canonical(&mut bytes);
    bytes.push(b'\n');
    out.put(&bytes)
}

fn reference_array(objs: &[&StagedObject]) -> Value {
    Value::Array(objs.iter().map(|o| Value::Reference(o.reference())).collect())
}
