//! Text encodings used inside PDF string objects
//!
//! PDF strings carry raw bytes. Text strings are either PDFDocEncoding
//! (a single-byte superset of printable ASCII) or UTF-16BE introduced by
//! the byte order mark `FE FF`.

/// Code points for bytes 0x18..=0x1F (spacing diacritics).
const DIACRITICS: [char; 8] = [
    '\u{02d8}', '\u{02c7}', '\u{02c6}', '\u{02d9}', '\u{02dd}', '\u{02db}', '\u{02da}', '\u{02dc}',
];

/// Code points for bytes 0x80..=0x9E (typographic punctuation and ligatures).
const HIGH_PUNCTUATION: [char; 31] = [
    '\u{2022}', '\u{2020}', '\u{2021}', '\u{2026}', '\u{2014}', '\u{2013}', '\u{0192}', '\u{2044}',
    '\u{2039}', '\u{203a}', '\u{2212}', '\u{2030}', '\u{201e}', '\u{201c}', '\u{201d}', '\u{2018}',
    '\u{2019}', '\u{201a}', '\u{2122}', '\u{fb01}', '\u{fb02}', '\u{0141}', '\u{0152}', '\u{0160}',
    '\u{0178}', '\u{017d}', '\u{0131}', '\u{0142}', '\u{0153}', '\u{0161}', '\u{017e}',
];

/// Map one PDFDocEncoding byte to its character, `None` for undefined bytes.
pub fn pdf_doc_char(byte: u8) -> Option<char> {
    match byte {
        b'\t' | b'\n' | b'\r' | 0x20..=0x7e => Some(byte as char),
        0x18..=0x1f => Some(DIACRITICS[(byte - 0x18) as usize]),
        0x80..=0x9e => Some(HIGH_PUNCTUATION[(byte - 0x80) as usize]),
        0xa0 => Some('\u{20ac}'),
        // Latin-1 coincides with Unicode here
        0xa1..=0xac | 0xae..=0xff => Some(byte as char),
        _ => None,
    }
}

/// True if the bytes carry the UTF-16BE byte order mark and an even length.
pub fn is_utf16(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0] == 0xfe && bytes[1] == 0xff && bytes.len() % 2 == 0
}

/// True if every byte is defined in PDFDocEncoding and the string is not UTF-16.
pub fn is_pdf_doc_encoded(bytes: &[u8]) -> bool {
    !is_utf16(bytes) && bytes.iter().all(|&b| pdf_doc_char(b).is_some())
}

/// Decode PDFDocEncoding bytes to text. Undefined bytes become U+FFFD.
pub fn pdf_doc_decode(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| pdf_doc_char(b).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Decode big-endian UTF-16 code units (without the byte order mark).
pub fn utf16_decode(bytes: &[u8]) -> String {
    let units = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]));
    char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Decode a string object's bytes to text if they match a known text encoding.
///
/// Returns `None` for byte strings that are neither UTF-16BE nor PDFDocEncoding;
/// those are passed through untouched by the renderer.
pub fn decode_text(bytes: &[u8]) -> Option<String> {
    if is_utf16(bytes) {
        Some(utf16_decode(&bytes[2..]))
    } else if is_pdf_doc_encoded(bytes) {
        Some(pdf_doc_decode(bytes))
    } else {
        None
    }
}
