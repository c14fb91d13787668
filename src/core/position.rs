use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::core::error::TigError;
use crate::core::types::{ChildKind, Section};

/// Serialized size of a [`PositionRecord`]
pub const POSITION_RECORD_SIZE: u64 = 36;

/// Bits of the kind word that carry the object kind; the rest are reserved
const KIND_MASK: u32 = 0b111;

/// Placement of one child object (read, unitig, or contig) in a parent tig.
///
/// The owning tig is implied by which tig's children array holds the record.
/// Delta alignments are stored in the owner's child delta pool and
/// referenced here by offset and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PositionRecord {
    /// ID of the placed object
    pub obj_id: u32,

    /// Kind bits (bit 0 read, bit 1 unitig, bit 2 contig). Bits 3..31 are
    /// reserved and carried through unchanged.
    pub kind_bits: u32,

    /// ID of the like-typed object this one is aligned to
    pub anchor: u32,

    /// Placement relative to the anchor
    pub ahang: i32,
    pub bhang: i32,

    /// Coordinates in the parent; `bgn > end` means reverse orientation
    pub bgn: u32,
    pub end: u32,

    /// Delta alignment range in the parent's child delta pool
    pub delta_offset: u32,
    pub delta_len: u32,
}

impl PositionRecord {
    #[must_use]
    pub fn new(kind: ChildKind, obj_id: u32, bgn: u32, end: u32) -> Self {
        Self {
            obj_id,
            kind_bits: kind.bit(),
            bgn,
            end,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_anchor(mut self, anchor: u32, ahang: i32, bhang: i32) -> Self {
        self.anchor = anchor;
        self.ahang = ahang;
        self.bhang = bhang;
        self
    }

    #[must_use]
    pub fn with_deltas(mut self, offset: u32, len: u32) -> Self {
        self.delta_offset = offset;
        self.delta_len = len;
        self
    }

    /// The object kind, or `None` when zero or several kind bits are set
    #[must_use]
    pub fn kind(&self) -> Option<ChildKind> {
        match self.kind_bits & KIND_MASK {
            b if b == ChildKind::Read.bit() => Some(ChildKind::Read),
            b if b == ChildKind::Unitig.bit() => Some(ChildKind::Unitig),
            b if b == ChildKind::Contig.bit() => Some(ChildKind::Contig),
            _ => None,
        }
    }

    /// Replace the kind, leaving the reserved bits alone
    pub fn set_kind(&mut self, kind: ChildKind) {
        self.kind_bits = (self.kind_bits & !KIND_MASK) | kind.bit();
    }

    #[must_use]
    pub fn is_read(&self) -> bool {
        self.kind_bits & ChildKind::Read.bit() != 0
    }

    #[must_use]
    pub fn is_unitig(&self) -> bool {
        self.kind_bits & ChildKind::Unitig.bit() != 0
    }

    #[must_use]
    pub fn is_contig(&self) -> bool {
        self.kind_bits & ChildKind::Contig.bit() != 0
    }

    #[must_use]
    pub fn is_forward(&self) -> bool {
        self.bgn < self.end
    }

    #[must_use]
    pub fn is_reverse(&self) -> bool {
        self.bgn > self.end
    }

    #[must_use]
    pub fn min(&self) -> u32 {
        self.bgn.min(self.end)
    }

    #[must_use]
    pub fn max(&self) -> u32 {
        self.bgn.max(self.end)
    }

    /// Span covered in the parent
    #[must_use]
    pub fn span(&self) -> u32 {
        self.max() - self.min()
    }

    /// End of the delta range, widened so it cannot overflow
    #[must_use]
    pub fn delta_end(&self) -> u64 {
        u64::from(self.delta_offset) + u64::from(self.delta_len)
    }

    /// Write the fixed-size record
    ///
    /// # Errors
    ///
    /// Returns `TigError::Io` if the writer fails.
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<(), TigError> {
        bincode::serialize_into(writer, self)
            .map_err(|e| TigError::from_bincode(e, Section::Children, 1, 0))
    }

    /// Read one fixed-size record
    ///
    /// # Errors
    ///
    /// Returns `TigError::Truncated` if the stream ends inside the record.
    pub fn load<R: Read>(reader: &mut R) -> Result<Self, TigError> {
        bincode::deserialize_from(reader)
            .map_err(|e| TigError::from_bincode(e, Section::Children, 1, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_size_is_fixed() {
        let record = PositionRecord::new(ChildKind::Read, 1, 0, 100);
        let size = bincode::serialized_size(&record).unwrap();
        assert_eq!(size, POSITION_RECORD_SIZE);
    }

    #[test]
    fn test_kind_exclusivity() {
        for kind in [ChildKind::Read, ChildKind::Unitig, ChildKind::Contig] {
            let record = PositionRecord::new(kind, 5, 10, 20);
            let flags = [record.is_read(), record.is_unitig(), record.is_contig()];
            assert_eq!(flags.iter().filter(|&&f| f).count(), 1);
            assert_eq!(record.kind(), Some(kind));
        }
    }

    #[test]
    fn test_invalid_kind_bits() {
        let mut record = PositionRecord::default();
        assert_eq!(record.kind(), None);

        record.kind_bits = ChildKind::Read.bit() | ChildKind::Contig.bit();
        assert_eq!(record.kind(), None);
    }

    #[test]
    fn test_set_kind_preserves_reserved_bits() {
        let mut record = PositionRecord::new(ChildKind::Read, 1, 0, 10);
        record.kind_bits |= 1 << 20;
        record.set_kind(ChildKind::Unitig);
        assert_eq!(record.kind(), Some(ChildKind::Unitig));
        assert_eq!(record.kind_bits & (1 << 20), 1 << 20);
    }

    #[test]
    fn test_orientation() {
        let forward = PositionRecord::new(ChildKind::Read, 1, 10, 200);
        assert!(forward.is_forward());
        assert!(!forward.is_reverse());
        assert_eq!(forward.min(), 10);
        assert_eq!(forward.max(), 200);

        let reverse = PositionRecord::new(ChildKind::Read, 2, 200, 10);
        assert!(reverse.is_reverse());
        assert!(!reverse.is_forward());
        assert_eq!(reverse.min(), 10);
        assert_eq!(reverse.span(), 190);

        let empty = PositionRecord::new(ChildKind::Read, 3, 50, 50);
        assert!(!empty.is_forward());
        assert!(!empty.is_reverse());
        assert_eq!(empty.span(), 0);
    }

    #[test]
    fn test_save_load() {
        let mut record = PositionRecord::new(ChildKind::Unitig, 42, 900, 15)
            .with_anchor(17, -30, 12)
            .with_deltas(8, 3);
        record.kind_bits |= 0x8000_0000;

        let mut bytes = Vec::new();
        record.save(&mut bytes).unwrap();
        assert_eq!(bytes.len() as u64, POSITION_RECORD_SIZE);

        let loaded = PositionRecord::load(&mut bytes.as_slice()).unwrap();
        assert_eq!(loaded, record);
        assert_eq!(loaded.ahang, -30);
        assert_eq!(loaded.kind_bits & 0x8000_0000, 0x8000_0000);
    }

    #[test]
    fn test_load_truncated() {
        let record = PositionRecord::new(ChildKind::Read, 1, 0, 10);
        let mut bytes = Vec::new();
        record.save(&mut bytes).unwrap();
        bytes.truncate(20);

        let result = PositionRecord::load(&mut bytes.as_slice());
        assert!(matches!(result, Err(TigError::Truncated { .. })));
    }
}
