//! Update configuration
//!
//! Controls the marker comment placed before the appended objects and the
//! private trailer keys that list added and replaced material. Defaults match
//! the keys other tools already look for; override them from TOML:
//!
//! ```toml
//! marker = "% Qoorp additions"
//!
//! [keys]
//! added_files = "QoorpAddedFiles1"
//! added_streams = "QoorpAddedStreams1"
//! replaced_streams = "QoorpReplacedStreams1"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PdfAppendError;

pub const ADDED_FILES_KEY: &str = "QoorpAddedFiles1";
pub const ADDED_STREAMS_KEY: &str = "QoorpAddedStreams1";
pub const REPLACED_STREAMS_KEY: &str = "QoorpReplacedStreams1";
pub const DEFAULT_MARKER: &str = "% Qoorp additions";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    /// Comment line written before the first appended object, without newline.
    pub marker: String,
    pub keys: TrailerKeys,
}

/// Trailer keys kept outside the standard attachment structures, so added
/// material does not show up as ordinary attachments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrailerKeys {
    /// References to added file specifications
    pub added_files: String,
    /// References to added payload-bearing objects
    pub added_streams: String,
    /// References to replaced objects
    pub replaced_streams: String,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            keys: TrailerKeys::default(),
        }
    }
}

impl Default for TrailerKeys {
    fn default() -> Self {
        Self {
            added_files: ADDED_FILES_KEY.to_string(),
            added_streams: ADDED_STREAMS_KEY.to_string(),
            replaced_streams: REPLACED_STREAMS_KEY.to_string(),
        }
    }
}

impl UpdateConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, PdfAppendError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            PdfAppendError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, PdfAppendError> {
        let config: Self = toml::from_str(s).map_err(|e| PdfAppendError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would corrupt the appended section.
    pub fn validate(&self) -> Result<(), PdfAppendError> {
        if !self.marker.starts_with('%') || self.marker.contains(['\n', '\r']) {
            return Err(PdfAppendError::Config(
                "marker must be a single comment line starting with %".into(),
            ));
        }
        for key in [
            &self.keys.added_files,
            &self.keys.added_streams,
            &self.keys.replaced_streams,
        ] {
            let valid = !key.is_empty()
                && key
                    .bytes()
                    .all(|b| b.is_ascii_graphic() && !b"()<>[]{}/%#".contains(&b));
            if !valid {
                return Err(PdfAppendError::Config(format!(
                    "trailer key {:?} is not a plain PDF name",
                    key
                )));
            }
        }
        Ok(())
    }
}
