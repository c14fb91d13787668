use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::core::error::TigError;
use crate::core::types::{Section, TigId, UNASSIGNED_TIG_ID};
use crate::utils::io::read_fully;

/// Serialized size of a [`TigHeader`]
pub const TIG_HEADER_SIZE: u64 = 56;

/// Suggestion flags for a tig.
///
/// Bits 0..3 hold the repeat, unique, circular, and haploid suggestions.
/// The remaining bits are reserved; they are kept as read so files written
/// by other tools round-trip unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TigFlags(pub u32);

impl TigFlags {
    pub const REPEAT: u32 = 1 << 0;
    pub const UNIQUE: u32 = 1 << 1;
    pub const CIRCULAR: u32 = 1 << 2;
    pub const HAPLOID: u32 = 1 << 3;

    /// Bits not assigned to any suggestion
    pub const RESERVED_MASK: u32 = !(Self::REPEAT | Self::UNIQUE | Self::CIRCULAR | Self::HAPLOID);

    #[must_use]
    pub fn suggest_repeat(self) -> bool {
        self.0 & Self::REPEAT != 0
    }

    #[must_use]
    pub fn suggest_unique(self) -> bool {
        self.0 & Self::UNIQUE != 0
    }

    #[must_use]
    pub fn suggest_circular(self) -> bool {
        self.0 & Self::CIRCULAR != 0
    }

    #[must_use]
    pub fn suggest_haploid(self) -> bool {
        self.0 & Self::HAPLOID != 0
    }

    pub fn set_repeat(&mut self, value: bool) {
        self.set(Self::REPEAT, value);
    }

    pub fn set_unique(&mut self, value: bool) {
        self.set(Self::UNIQUE, value);
    }

    pub fn set_circular(&mut self, value: bool) {
        self.set(Self::CIRCULAR, value);
    }

    pub fn set_haploid(&mut self, value: bool) {
        self.set(Self::HAPLOID, value);
    }

    #[must_use]
    pub fn reserved(self) -> u32 {
        self.0 & Self::RESERVED_MASK
    }

    fn set(&mut self, bit: u32, value: bool) {
        if value {
            self.0 |= bit;
        } else {
            self.0 &= !bit;
        }
    }
}

/// A flat, fixed-size snapshot of a tig.
///
/// Holds every scalar of a [`Tig`](crate::core::tig::Tig) and the length of
/// each variable section, but none of the contents. This is the first record
/// of every serialized tig; a reader uses the lengths to size the sections
/// that follow.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TigHeader {
    pub tig_id: TigId,

    pub coverage_stat: f64,
    pub microhet_prob: f64,

    pub flags: TigFlags,

    pub layout_len: u32,
    pub gapped_len: u32,
    pub ungapped_len: u32,
    pub children_len: u32,
    pub child_deltas_len: u32,
    pub variants_len: u32,
    pub variant_data_len: u64,
}

impl Default for TigHeader {
    fn default() -> Self {
        Self {
            tig_id: UNASSIGNED_TIG_ID,
            coverage_stat: 0.0,
            microhet_prob: 0.0,
            flags: TigFlags::default(),
            layout_len: 0,
            gapped_len: 0,
            ungapped_len: 0,
            children_len: 0,
            child_deltas_len: 0,
            variants_len: 0,
            variant_data_len: 0,
        }
    }
}

impl TigHeader {
    #[must_use]
    pub fn is_assigned(&self) -> bool {
        self.tig_id != UNASSIGNED_TIG_ID
    }

    /// Write the fixed-size record
    ///
    /// # Errors
    ///
    /// Returns `TigError::Io` if the writer fails.
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<(), TigError> {
        bincode::serialize_into(writer, self)
            .map_err(|e| TigError::from_bincode(e, Section::Header, TIG_HEADER_SIZE, 0))
    }

    /// Read the next header, or `None` if the stream is already at its end.
    ///
    /// # Errors
    ///
    /// Returns `TigError::Truncated` if the stream ends partway through the
    /// header, or `TigError::Io` on a read failure.
    pub fn read_next<R: Read>(reader: &mut R) -> Result<Option<Self>, TigError> {
        let mut bytes = [0u8; TIG_HEADER_SIZE as usize];
        let n = read_fully(reader, &mut bytes)?;
        if n == 0 {
            return Ok(None);
        }
        if n < bytes.len() {
            return Err(TigError::Truncated {
                section: Section::Header,
                expected: TIG_HEADER_SIZE,
                found: n as u64,
            });
        }
        bincode::deserialize(&bytes)
            .map(Some)
            .map_err(|e| TigError::from_bincode(e, Section::Header, TIG_HEADER_SIZE, 0))
    }

    /// Read a header that must be present
    ///
    /// # Errors
    ///
    /// Returns `TigError::Truncated` if the stream ends before a full header.
    pub fn load<R: Read>(reader: &mut R) -> Result<Self, TigError> {
        Self::read_next(reader)?.ok_or(TigError::Truncated {
            section: Section::Header,
            expected: TIG_HEADER_SIZE,
            found: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> TigHeader {
        let mut flags = TigFlags::default();
        flags.set_unique(true);
        flags.set_circular(true);
        TigHeader {
            tig_id: 12,
            coverage_stat: 4.5,
            microhet_prob: 0.97,
            flags,
            layout_len: 2_000,
            gapped_len: 2_000,
            ungapped_len: 1_950,
            children_len: 14,
            child_deltas_len: 60,
            variants_len: 2,
            variant_data_len: 128,
        }
    }

    #[test]
    fn test_serialized_size_is_fixed() {
        assert_eq!(bincode::serialized_size(&sample()).unwrap(), TIG_HEADER_SIZE);
        assert_eq!(
            bincode::serialized_size(&TigHeader::default()).unwrap(),
            TIG_HEADER_SIZE
        );
    }

    #[test]
    fn test_flags_are_independent() {
        let mut flags = TigFlags::default();
        flags.set_repeat(true);
        flags.set_haploid(true);
        assert!(flags.suggest_repeat());
        assert!(!flags.suggest_unique());
        assert!(!flags.suggest_circular());
        assert!(flags.suggest_haploid());

        flags.set_repeat(false);
        assert!(!flags.suggest_repeat());
        assert!(flags.suggest_haploid());
        assert_eq!(flags.reserved(), 0);
    }

    #[test]
    fn test_save_load_keeps_reserved_bits() {
        let mut header = sample();
        header.flags.0 |= 0x00F0_0000;

        let mut bytes = Vec::new();
        header.save(&mut bytes).unwrap();
        assert_eq!(bytes.len() as u64, TIG_HEADER_SIZE);

        let loaded = TigHeader::load(&mut bytes.as_slice()).unwrap();
        assert_eq!(loaded, header);
        assert_eq!(loaded.flags.reserved(), 0x00F0_0000);
        assert!(loaded.flags.suggest_unique());
    }

    #[test]
    fn test_read_next_at_end() {
        let empty: &[u8] = &[];
        assert!(TigHeader::read_next(&mut &*empty).unwrap().is_none());
        assert!(matches!(
            TigHeader::load(&mut &*empty),
            Err(TigError::Truncated { found: 0, .. })
        ));
    }

    #[test]
    fn test_read_next_partial() {
        let mut bytes = Vec::new();
        sample().save(&mut bytes).unwrap();
        bytes.truncate(10);
        assert!(matches!(
            TigHeader::read_next(&mut bytes.as_slice()),
            Err(TigError::Truncated { found: 10, .. })
        ));
    }

    #[test]
    fn test_default_is_unassigned() {
        let header = TigHeader::default();
        assert!(!header.is_assigned());
        assert_eq!(header.children_len, 0);
    }
}
