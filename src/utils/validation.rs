//! Centralized validation and resource limits.

use crate::core::error::TigError;
use crate::core::position::PositionRecord;
use crate::core::types::Section;

/// Largest number of bytes a single section may declare (DOS protection).
///
/// Loading never allocates a section up front; memory grows with the bytes
/// actually present, so this bounds how far a corrupt header can make a
/// reader go before giving up.
pub const MAX_SECTION_BYTES: u64 = 1 << 32;

/// Check that a section of `len` elements of `elem_size` bytes is within limits.
///
/// # Errors
///
/// Returns `TigError::SectionTooLarge` if the section would exceed
/// [`MAX_SECTION_BYTES`].
pub fn check_section_len(section: Section, len: u64, elem_size: u64) -> Result<(), TigError> {
    match len.checked_mul(elem_size) {
        Some(bytes) if bytes <= MAX_SECTION_BYTES => Ok(()),
        _ => Err(TigError::SectionTooLarge { section, len }),
    }
}

/// Check one child placement against the size of its tig's delta pool.
///
/// # Errors
///
/// Returns `TigError::InvariantViolation` if the child does not have exactly
/// one kind bit set or its delta range runs past the pool.
pub fn check_child(index: usize, child: &PositionRecord, deltas_len: usize) -> Result<(), TigError> {
    if child.kind().is_none() {
        return Err(TigError::InvariantViolation(format!(
            "child {index} (object {}) has kind bits {:#05b}; exactly one must be set",
            child.obj_id,
            child.kind_bits & 0b111
        )));
    }

    if child.delta_end() > deltas_len as u64 {
        return Err(TigError::InvariantViolation(format!(
            "child {index} (object {}) delta range {}+{} exceeds {deltas_len} deltas",
            child.obj_id, child.delta_offset, child.delta_len
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ChildKind;

    #[test]
    fn test_check_section_len() {
        assert!(check_section_len(Section::Children, 1_000, 36).is_ok());
        assert!(check_section_len(Section::GappedBases, MAX_SECTION_BYTES, 1).is_ok());
        assert!(matches!(
            check_section_len(Section::GappedBases, MAX_SECTION_BYTES + 1, 1),
            Err(TigError::SectionTooLarge { .. })
        ));
        assert!(check_section_len(Section::Children, u64::MAX, 36).is_err());
    }

    #[test]
    fn test_check_child_delta_bounds() {
        let child = PositionRecord::new(ChildKind::Read, 1, 0, 100).with_deltas(4, 6);
        assert!(check_child(0, &child, 10).is_ok());
        assert!(check_child(0, &child, 9).is_err());

        let at_max = PositionRecord::new(ChildKind::Read, 1, 0, 100).with_deltas(u32::MAX, 1);
        assert!(check_child(0, &at_max, 10).is_err());
    }

    #[test]
    fn test_check_child_kind() {
        let mut child = PositionRecord::new(ChildKind::Contig, 1, 0, 100);
        assert!(check_child(0, &child, 0).is_ok());

        child.kind_bits = 0;
        assert!(check_child(0, &child, 0).is_err());

        child.kind_bits = ChildKind::Read.bit() | ChildKind::Unitig.bit();
        assert!(check_child(0, &child, 0).is_err());
    }
}
