//! Non-fatal findings collected while walking or writing a document
//!
//! Each warning is logged through `tracing` when it is raised and also
//! returned to the caller, so tests can assert on them.

use std::fmt;

use crate::value::ObjRef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// An edge from object `from` to a lower (or the same) object `to` under `key`.
    BackEdge { key: String, from: u32, to: u32 },
    /// A reference the reader could not resolve.
    UnresolvedReference { key: String, reference: ObjRef },
    /// A staged replacement whose object is no longer in the original xref.
    MissingFromXref { number: u32 },
}

impl Warning {
    /// Log through `tracing` and hand the warning back.
    pub(crate) fn emit(self) -> Self {
        tracing::warn!("{}", self);
        self
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::BackEdge { key, from, to } => write!(
                f,
                "{} may not go back in PDF object graph from {} to {}",
                key, from, to
            ),
            Warning::UnresolvedReference { key, reference } => {
                write!(f, "{} references unresolvable object {}", key, reference)
            }
            Warning::MissingFromXref { number } => {
                write!(f, "Object does not exist in xref: {}", number)
            }
        }
    }
}
