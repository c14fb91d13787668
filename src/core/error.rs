use thiserror::Error;

use crate::core::types::Section;

#[derive(Error, Debug)]
pub enum TigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Truncated {section} section: expected {expected}, found {found}")]
    Truncated {
        section: Section,
        expected: u64,
        found: u64,
    },

    #[error("Invalid tig format: {0}")]
    InvalidFormat(String),

    #[error("Tig invariant violated: {0}")]
    InvariantViolation(String),

    #[error("Section {section} declares {len} elements, exceeding the allowed maximum")]
    SectionTooLarge { section: Section, len: u64 },

    #[error("Invalid layout at line {line}: {message}")]
    Layout { line: usize, message: String },
}

impl TigError {
    /// Restate a single-element truncation as progress through a section of
    /// `expected` elements, `found` of which were read completely.
    pub(crate) fn at_element(self, expected: u64, found: u64) -> Self {
        match self {
            Self::Truncated { section, .. } => Self::Truncated {
                section,
                expected,
                found,
            },
            other => other,
        }
    }

    /// Convert a bincode failure while reading element `found` of `expected`
    /// in `section`. An early end of stream is reported as truncation.
    pub(crate) fn from_bincode(
        err: bincode::Error,
        section: Section,
        expected: u64,
        found: u64,
    ) -> Self {
        match *err {
            bincode::ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::UnexpectedEof => {
                Self::Truncated {
                    section,
                    expected,
                    found,
                }
            }
            bincode::ErrorKind::Io(io) => Self::Io(io),
            other => Self::InvalidFormat(format!("{section}: {other}")),
        }
    }
}
