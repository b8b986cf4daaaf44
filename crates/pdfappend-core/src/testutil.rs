//! Fixtures shared by the unit tests

use std::collections::BTreeMap;

use crate::reader::{Reader, FREE_GENERATION};
use crate::value::{Dictionary, ObjRef, Value};

/// A small single-page PDF plus the bookkeeping needed to assert on it.
pub struct SamplePdf {
    pub bytes: Vec<u8>,
    /// Offsets of objects 1..=5
    pub offsets: Vec<u64>,
    pub xref_offset: u64,
    /// Raw content of stream object 5
    pub content: Vec<u8>,
}

/// Build a minimal valid PDF with trailer `Size 6`
///
/// 1 Catalog, 2 Pages, 3 Page, 4 Font, 5 content stream.
pub fn sample_pdf() -> SamplePdf {
    let content = b"BT\n/F1 24 Tf\n100 700 Td\n(Hello) Tj\nET".to_vec();
    let mut pdf = Vec::new();
    let mut offsets = Vec::new();

    pdf.extend_from_slice(b"%PDF-1.4\n");

    offsets.push(pdf.len() as u64);
    pdf.extend_from_slice(b"1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n");

    offsets.push(pdf.len() as u64);
    pdf.extend_from_slice(b"2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n");

    offsets.push(pdf.len() as u64);
    pdf.extend_from_slice(
        b"3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
          /Resources << /Font << /F1 4 0 R >> >> /Contents 5 0 R >>\nendobj\n",
    );

    offsets.push(pdf.len() as u64);
    pdf.extend_from_slice(
        b"4 0 obj\n<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>\nendobj\n",
    );

    offsets.push(pdf.len() as u64);
    pdf.extend_from_slice(format!("5 0 obj\n<< /Length {} >>\nstream\n", content.len()).as_bytes());
    pdf.extend_from_slice(&content);
    pdf.extend_from_slice(b"\nendstream\nendobj\n");

    let xref_offset = pdf.len() as u64;
    pdf.extend_from_slice(b"xref\n0 6\n0000000000 65535 f \n");
    for offset in &offsets {
        pdf.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
    }
    pdf.extend_from_slice(b"trailer\n<< /Size 6 /Root 1 0 R >>\n");
    pdf.extend_from_slice(format!("startxref\n{}\n%%EOF\n", xref_offset).as_bytes());

    SamplePdf {
        bytes: pdf,
        offsets,
        xref_offset,
        content,
    }
}

/// [`Reader`] over objects assembled in code.
#[derive(Debug, Default)]
pub struct MemoryReader {
    pub trailer: Dictionary,
    pub objects: BTreeMap<u32, (u16, Value)>,
    pub startxref: u64,
}

impl MemoryReader {
    pub fn new(trailer: Dictionary) -> Self {
        Self {
            trailer,
            ..Self::default()
        }
    }

    pub fn with_object(mut self, number: u32, value: Value) -> Self {
        self.objects.insert(number, (0, value));
        self
    }

    pub fn with_generation(mut self, number: u32, generation: u16, value: Value) -> Self {
        self.objects.insert(number, (generation, value));
        self
    }
}

impl Reader for MemoryReader {
    fn trailer(&self) -> &Dictionary {
        &self.trailer
    }

    fn startxref(&self) -> u64 {
        self.startxref
    }

    fn xref(&self, number: u32) -> (u64, u16) {
        match self.objects.get(&number) {
            Some((generation, _)) => (u64::from(number) * 100, *generation),
            None => (0, FREE_GENERATION),
        }
    }

    fn resolve(&self, reference: ObjRef) -> Option<Value> {
        self.objects
            .get(&reference.0)
            .filter(|(generation, _)| *generation == reference.1)
            .map(|(_, value)| value.clone())
    }
}

/// Build a dictionary from `(key, value)` pairs.
pub fn dict<const N: usize>(entries: [(&str, Value); N]) -> Dictionary {
    entries.into_iter().collect()
}
