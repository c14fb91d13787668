use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::error::TigError;
use crate::core::types::{Section, TechType};
use crate::utils::io::read_fully;

/// Size of the on-disk name field, including the terminating NUL
pub const LIBRARY_NAME_SIZE: usize = 128;

/// Serialized size of a [`Library`]
pub const LIBRARY_RECORD_SIZE: u64 = LIBRARY_NAME_SIZE as u64 + 8 + DEPRECATED_BLOCK_SIZE;

/// Name given to libraries created without one
pub const UNDEFINED_LIBRARY_NAME: &str = "UNDEFINED";

const DEPRECATED_BLOCK_SIZE: u64 = 40;

/// Key/value feature block from older library records.
///
/// Nothing reads or writes library features any more; the block is kept,
/// always zeroed, so the record size matches files written by older
/// versions. The pointer-sized fields held in-memory addresses in those
/// files and are never interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
struct DeprecatedKeyValues {
    key_len: u32,
    key_alloc: u32,
    keys: u64,
    values: u64,
    kv_len: u32,
    kv_alloc: u32,
    kv_data: u64,
}

impl DeprecatedKeyValues {
    fn is_populated(&self) -> bool {
        self.key_len != 0 || self.kv_len != 0
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct LibraryFields {
    id: u32,
    tech: u32,
    deprecated: DeprecatedKeyValues,
}

/// A named group of reads sharing technology and provenance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
    name: String,
    id: u32,
    tech: TechType,
}

impl Default for Library {
    fn default() -> Self {
        Self::new(None, 0, TechType::Generic)
    }
}

impl Library {
    /// Create a library, making `name` safe to use as a file name prefix.
    ///
    /// Path separators and whitespace become `_`, the name is cut to fit the
    /// on-disk field, and an absent or empty name becomes `UNDEFINED`.
    #[must_use]
    pub fn new(name: Option<&str>, id: u32, tech: TechType) -> Self {
        Self {
            name: sanitize_library_name(name),
            id,
            tech,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    #[must_use]
    pub fn tech_type(&self) -> TechType {
        self.tech
    }

    #[must_use]
    pub fn tech_type_name(&self) -> String {
        self.tech.to_string()
    }

    /// Write the fixed-size library record
    ///
    /// # Errors
    ///
    /// Returns `TigError::Io` if the writer fails.
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<(), TigError> {
        let mut name = [0u8; LIBRARY_NAME_SIZE];
        name[..self.name.len()].copy_from_slice(self.name.as_bytes());
        writer.write_all(&name)?;

        let fields = LibraryFields {
            id: self.id,
            tech: self.tech.code(),
            deprecated: DeprecatedKeyValues::default(),
        };
        bincode::serialize_into(writer, &fields)
            .map_err(|e| TigError::from_bincode(e, Section::Library, LIBRARY_RECORD_SIZE, 0))
    }

    /// Read a library record written by [`Library::save`] or an older version
    ///
    /// # Errors
    ///
    /// Returns `TigError::Truncated` if the record is incomplete and
    /// `TigError::InvalidFormat` for an unknown technology code.
    pub fn load<R: Read>(reader: &mut R) -> Result<Self, TigError> {
        let mut name = [0u8; LIBRARY_NAME_SIZE];
        let n = read_fully(reader, &mut name)?;
        if n < name.len() {
            return Err(TigError::Truncated {
                section: Section::Library,
                expected: LIBRARY_RECORD_SIZE,
                found: n as u64,
            });
        }

        let fields: LibraryFields = bincode::deserialize_from(reader).map_err(|e| {
            TigError::from_bincode(
                e,
                Section::Library,
                LIBRARY_RECORD_SIZE,
                LIBRARY_NAME_SIZE as u64,
            )
        })?;

        let tech = TechType::from_code(fields.tech).ok_or_else(|| {
            TigError::InvalidFormat(format!("unknown library technology code {}", fields.tech))
        })?;

        if fields.deprecated.is_populated() {
            warn!(
                "Library {} has {} deprecated feature keys; discarding them",
                fields.id, fields.deprecated.key_len
            );
        }

        let end = name.iter().position(|&b| b == 0).unwrap_or(LIBRARY_NAME_SIZE - 1);
        let stored = String::from_utf8_lossy(&name[..end]);

        Ok(Self::new(Some(&*stored), fields.id, tech))
    }
}

/// Make a library name safe to use as a file name prefix
#[must_use]
pub fn sanitize_library_name(name: Option<&str>) -> String {
    let Some(name) = name.filter(|n| !n.is_empty()) else {
        return UNDEFINED_LIBRARY_NAME.to_string();
    };

    let mut sanitized = String::with_capacity(name.len().min(LIBRARY_NAME_SIZE));
    for c in name.chars() {
        let c = if c == '/' || c == '\\' || c.is_whitespace() || c == '\0' {
            '_'
        } else {
            c
        };
        if sanitized.len() + c.len_utf8() > LIBRARY_NAME_SIZE - 1 {
            break;
        }
        sanitized.push(c);
    }
    sanitized
}
