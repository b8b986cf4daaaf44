use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfAppendError {
    #[error("Failed to parse PDF: {0}")]
    Parse(String),

    #[error("Unusable trailer: {0}")]
    UnusableTrailer(String),

    #[error("Can not replace magic object 0")]
    ReplaceObjectZero,

    #[error("Can not replace non-existing object {0}")]
    ObjectNotFound(u32),

    #[error("Not a keyed container: {0}")]
    NotKeyedContainer(&'static str),

    #[error("Stream compression failed: {0}")]
    Compression(#[source] std::io::Error),

    #[error("Write failed after {written} bytes: {source}")]
    Write {
        written: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl PdfAppendError {
    /// Bytes successfully written before a write failure, zero for every other kind.
    pub fn written(&self) -> usize {
        match self {
            PdfAppendError::Write { written, .. } => *written,
            _ => 0,
        }
    }
}
