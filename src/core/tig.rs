//! The in-memory tig and its binary save/load protocol.
//!
//! A serialized tig is a [`TigHeader`] followed by each variable section in a
//! fixed order:
//!
//! | Section | Contents |
//! |---------|----------|
//! | gapped bases, gapped quals | `gapped_len` bytes each |
//! | ungapped bases, ungapped quals | `ungapped_len` bytes each |
//! | children | `children_len` fixed-size [`PositionRecord`]s |
//! | child deltas | `child_deltas_len` little-endian `i32`s |
//! | variants | `variants_len` [`VariantRecord`]s |
//! | variant data | `variant_data_len` bytes |
//!
//! Section lengths are only stored in the header, so a reader does one
//! fixed-size read and then one bulk read per section. There is no magic
//! number or checksum; writers and readers must agree on the format.

use std::io::{BufRead, Read, Write};

use crate::core::buffer::GrowableBuffer;
use crate::core::error::TigError;
use crate::core::header::{TigFlags, TigHeader, TIG_HEADER_SIZE};
use crate::core::position::{PositionRecord, POSITION_RECORD_SIZE};
use crate::core::types::{Section, TigId, UNASSIGNED_TIG_ID};
use crate::core::variant::{VariantRecord, VARIANT_SCALARS_SIZE};
use crate::parsing::layout;
use crate::utils::validation::{check_child, check_section_len};

/// Bytes and per-base qualities of one consensus sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Consensus {
    bases: GrowableBuffer<u8>,
    quals: GrowableBuffer<u8>,
}

impl Consensus {
    #[must_use]
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    /// Bases that fit in both arrays without reallocating
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.bases.capacity().min(self.quals.capacity())
    }

    #[must_use]
    pub fn bases(&self) -> &[u8] {
        self.bases.as_slice()
    }

    #[must_use]
    pub fn quals(&self) -> &[u8] {
        self.quals.as_slice()
    }

    pub fn push(&mut self, base: u8, qual: u8) {
        self.bases.push(base);
        self.quals.push(qual);
    }

    /// Replace the contents
    ///
    /// # Errors
    ///
    /// Returns `TigError::InvariantViolation` if the arrays differ in length.
    pub fn set(&mut self, bases: &[u8], quals: &[u8]) -> Result<(), TigError> {
        if bases.len() != quals.len() {
            return Err(TigError::InvariantViolation(format!(
                "consensus has {} bases but {} qualities",
                bases.len(),
                quals.len()
            )));
        }
        self.clear();
        self.bases.extend_from_slice(bases);
        self.quals.extend_from_slice(quals);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.bases.clear();
        self.quals.clear();
    }

    fn resize_default(&mut self, len: usize) {
        self.clear();
        self.bases.resize_default(len);
        self.quals.resize_default(len);
    }
}

/// An assembled contig or unitig.
///
/// Owns its consensus sequences and four variable sections: child
/// placements, the child delta pool, variants, and the variant data pool.
/// [`Tig::clear`] empties everything but keeps the allocations, so one `Tig`
/// can be reused to load many tigs in turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Tig {
    /// ID in the store, or [`UNASSIGNED_TIG_ID`]
    pub tig_id: TigId,

    pub coverage_stat: f64,
    pub microhet_prob: f64,

    pub flags: TigFlags,

    /// Largest coordinate in the layout; equals the gapped length once a
    /// gapped consensus exists
    pub layout_len: u32,

    gapped: Consensus,
    ungapped: Consensus,

    children: GrowableBuffer<PositionRecord>,
    child_deltas: GrowableBuffer<i32>,
    variants: GrowableBuffer<VariantRecord>,
    variant_data: GrowableBuffer<u8>,
}

impl Default for Tig {
    fn default() -> Self {
        Self::new()
    }
}

impl Tig {
    /// An empty, unassigned tig with no memory allocated
    #[must_use]
    pub fn new() -> Self {
        Self {
            tig_id: UNASSIGNED_TIG_ID,
            coverage_stat: 0.0,
            microhet_prob: 0.0,
            flags: TigFlags::default(),
            layout_len: 0,
            gapped: Consensus::default(),
            ungapped: Consensus::default(),
            children: GrowableBuffer::new(),
            child_deltas: GrowableBuffer::new(),
            variants: GrowableBuffer::new(),
            variant_data: GrowableBuffer::new(),
        }
    }

    #[must_use]
    pub fn with_id(tig_id: TigId) -> Self {
        Self {
            tig_id,
            ..Self::new()
        }
    }

    #[must_use]
    pub fn is_assigned(&self) -> bool {
        self.tig_id != UNASSIGNED_TIG_ID
    }

    #[must_use]
    pub fn gapped(&self) -> &Consensus {
        &self.gapped
    }

    #[must_use]
    pub fn ungapped(&self) -> &Consensus {
        &self.ungapped
    }

    #[must_use]
    pub fn children(&self) -> &[PositionRecord] {
        self.children.as_slice()
    }

    #[must_use]
    pub fn number_of_children(&self) -> usize {
        self.children.len()
    }

    #[must_use]
    pub fn child(&self, index: usize) -> Option<&PositionRecord> {
        self.children.get(index)
    }

    #[must_use]
    pub fn child_deltas(&self) -> &[i32] {
        self.child_deltas.as_slice()
    }

    /// The delta alignment of child `index`
    #[must_use]
    pub fn deltas_of(&self, index: usize) -> Option<&[i32]> {
        let child = self.children.get(index)?;
        let start = child.delta_offset as usize;
        self.child_deltas
            .as_slice()
            .get(start..start + child.delta_len as usize)
    }

    #[must_use]
    pub fn variants(&self) -> &[VariantRecord] {
        self.variants.as_slice()
    }

    #[must_use]
    pub fn variant_data(&self) -> &[u8] {
        self.variant_data.as_slice()
    }

    /// Reset to an empty, unassigned tig, keeping every allocation
    pub fn clear(&mut self) {
        self.tig_id = UNASSIGNED_TIG_ID;
        self.coverage_stat = 0.0;
        self.microhet_prob = 0.0;
        self.flags = TigFlags::default();
        self.layout_len = 0;

        self.gapped.clear();
        self.ungapped.clear();
        self.children.clear();
        self.child_deltas.clear();
        self.variants.clear();
        self.variant_data.clear();
    }

    /// Copy the scalars of `header` and size every section to the header's
    /// lengths. Section contents are default-valued until loaded.
    #[allow(clippy::cast_possible_truncation)] // Lengths fit in memory by the caller's choice
    pub fn assign_from(&mut self, header: &TigHeader) {
        self.assign_scalars(header);

        self.gapped.resize_default(header.gapped_len as usize);
        self.ungapped.resize_default(header.ungapped_len as usize);
        self.children.resize_default(header.children_len as usize);
        self.child_deltas.resize_default(header.child_deltas_len as usize);
        self.variants.resize_default(header.variants_len as usize);
        self.variant_data
            .resize_default(header.variant_data_len as usize);
    }

    /// Copy the scalars of `header` and empty every section
    fn assign_scalars(&mut self, header: &TigHeader) {
        self.clear();
        self.tig_id = header.tig_id;
        self.coverage_stat = header.coverage_stat;
        self.microhet_prob = header.microhet_prob;
        self.flags = header.flags;
        self.layout_len = header.layout_len;
    }

    /// Append a child placement, returning its index.
    ///
    /// Without a gapped consensus the layout length grows to cover the child.
    pub fn add_child(&mut self, child: PositionRecord) -> usize {
        if self.gapped.is_empty() {
            self.layout_len = self.layout_len.max(child.max());
        }
        self.children.push(child)
    }

    /// Append a child together with its delta alignment, pointing the child's
    /// delta range at the appended deltas.
    ///
    /// # Errors
    ///
    /// Returns `TigError::InvariantViolation` if the delta pool outgrows 32-bit
    /// offsets.
    pub fn add_child_with_deltas(
        &mut self,
        child: PositionRecord,
        deltas: &[i32],
    ) -> Result<usize, TigError> {
        let offset = self.append_deltas(deltas)?;
        let len = u32::try_from(deltas.len())
            .map_err(|_| TigError::InvariantViolation("delta alignment too long".to_string()))?;
        Ok(self.add_child(child.with_deltas(offset, len)))
    }

    /// Append to the child delta pool, returning the offset of the first delta
    ///
    /// # Errors
    ///
    /// Returns `TigError::InvariantViolation` if the pool outgrows 32-bit
    /// offsets.
    pub fn append_deltas(&mut self, deltas: &[i32]) -> Result<u32, TigError> {
        if (self.child_deltas.len() + deltas.len()) as u64 > u64::from(u32::MAX) {
            return Err(TigError::InvariantViolation(
                "child delta pool exceeds 32-bit offsets".to_string(),
            ));
        }
        let offset = self.child_deltas.extend_from_slice(deltas);
        Ok(offset as u32)
    }

    /// Append a variant, returning its index
    pub fn add_variant(&mut self, variant: VariantRecord) -> usize {
        self.variants.push(variant)
    }

    /// Append to the variant data pool, returning the offset of the first byte
    pub fn append_variant_data(&mut self, data: &[u8]) -> u64 {
        self.variant_data.extend_from_slice(data) as u64
    }

    /// Replace the gapped consensus; the layout length follows it
    ///
    /// # Errors
    ///
    /// Returns `TigError::InvariantViolation` if the arrays differ in length or
    /// the consensus is longer than 32-bit coordinates allow.
    pub fn set_gapped_consensus(&mut self, bases: &[u8], quals: &[u8]) -> Result<(), TigError> {
        let len = u32::try_from(bases.len()).map_err(|_| {
            TigError::InvariantViolation("gapped consensus exceeds 32-bit length".to_string())
        })?;
        self.gapped.set(bases, quals)?;
        if len > 0 {
            self.layout_len = len;
        }
        Ok(())
    }

    /// Replace the ungapped consensus
    ///
    /// # Errors
    ///
    /// Returns `TigError::InvariantViolation` if the arrays differ in length.
    pub fn set_ungapped_consensus(&mut self, bases: &[u8], quals: &[u8]) -> Result<(), TigError> {
        self.ungapped.set(bases, quals)
    }

    /// Check every structural invariant the save/load protocol relies on.
    ///
    /// # Errors
    ///
    /// Returns `TigError::InvariantViolation` describing the first failure.
    pub fn validate(&self) -> Result<(), TigError> {
        for (name, len) in [
            ("gapped consensus", self.gapped.len()),
            ("ungapped consensus", self.ungapped.len()),
            ("children", self.children.len()),
            ("child deltas", self.child_deltas.len()),
            ("variants", self.variants.len()),
        ] {
            if len as u64 > u64::from(u32::MAX) {
                return Err(TigError::InvariantViolation(format!(
                    "{name} length {len} exceeds 32 bits"
                )));
            }
        }

        if !self.gapped.is_empty() && self.layout_len as usize != self.gapped.len() {
            return Err(TigError::InvariantViolation(format!(
                "layout length {} differs from gapped consensus length {}",
                self.layout_len,
                self.gapped.len()
            )));
        }

        for (i, child) in self.children.iter().enumerate() {
            check_child(i, child, self.child_deltas.len())?;
        }

        for variant in &self.variants {
            variant.validate()?;
        }

        Ok(())
    }

    /// Serialize to a byte vector
    ///
    /// # Errors
    ///
    /// Returns `TigError::InvariantViolation` if the tig fails [`Tig::validate`].
    pub fn to_bytes(&self) -> Result<Vec<u8>, TigError> {
        self.validate()?;

        let header = TigHeader::from(self);
        let capacity = TIG_HEADER_SIZE as usize
            + 2 * (self.gapped.len() + self.ungapped.len())
            + POSITION_RECORD_SIZE as usize * self.children.len()
            + 4 * self.child_deltas.len()
            + VARIANT_SCALARS_SIZE as usize * self.variants.len()
            + self.variant_data.len();
        let mut bytes = Vec::with_capacity(capacity);

        header.save(&mut bytes)?;
        bytes.extend_from_slice(self.gapped.bases());
        bytes.extend_from_slice(self.gapped.quals());
        bytes.extend_from_slice(self.ungapped.bases());
        bytes.extend_from_slice(self.ungapped.quals());
        for child in &self.children {
            child.save(&mut bytes)?;
        }
        for delta in &self.child_deltas {
            bytes.extend_from_slice(&delta.to_le_bytes());
        }
        for variant in &self.variants {
            variant.save(&mut bytes)?;
        }
        bytes.extend_from_slice(self.variant_data.as_slice());

        Ok(bytes)
    }

    /// Write the tig as a header followed by its sections.
    ///
    /// The record is assembled in memory first and handed to the writer in a
    /// single `write_all`, so an invalid tig writes nothing. A writer failure
    /// is returned as-is; the destination should then be discarded.
    ///
    /// # Errors
    ///
    /// Returns `TigError::InvariantViolation` for an invalid tig or
    /// `TigError::Io` if the writer fails.
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<(), TigError> {
        let bytes = self.to_bytes()?;
        writer.write_all(&bytes)?;
        Ok(())
    }

    /// Replace this tig with one read from `reader`.
    ///
    /// On any error the tig is cleared.
    ///
    /// # Errors
    ///
    /// Returns `TigError::Truncated` if the stream ends early (including
    /// before the header), `TigError::SectionTooLarge` for an oversized
    /// section, or `TigError::InvariantViolation` if the loaded tig is
    /// inconsistent.
    pub fn load<R: Read>(&mut self, reader: &mut R) -> Result<(), TigError> {
        if self.load_next(reader)? {
            Ok(())
        } else {
            Err(TigError::Truncated {
                section: Section::Header,
                expected: TIG_HEADER_SIZE,
                found: 0,
            })
        }
    }

    /// Like [`Tig::load`], but returns `Ok(false)` if the stream is already
    /// at its end. Used to read back-to-back tigs.
    ///
    /// # Errors
    ///
    /// Same as [`Tig::load`], except that a clean end of stream is not an
    /// error.
    pub fn load_next<R: Read>(&mut self, reader: &mut R) -> Result<bool, TigError> {
        let result = self.read_record(reader);
        if result.is_err() {
            self.clear();
        }
        result
    }

    fn read_record<R: Read>(&mut self, reader: &mut R) -> Result<bool, TigError> {
        let Some(header) = TigHeader::read_next(reader)? else {
            self.clear();
            return Ok(false);
        };

        check_section_len(Section::GappedBases, u64::from(header.gapped_len), 1)?;
        check_section_len(Section::UngappedBases, u64::from(header.ungapped_len), 1)?;
        check_section_len(
            Section::Children,
            u64::from(header.children_len),
            POSITION_RECORD_SIZE,
        )?;
        check_section_len(Section::ChildDeltas, u64::from(header.child_deltas_len), 4)?;
        check_section_len(
            Section::Variants,
            u64::from(header.variants_len),
            VARIANT_SCALARS_SIZE,
        )?;
        check_section_len(Section::VariantData, header.variant_data_len, 1)?;

        // Sections grow with the data actually read, never to the declared
        // sizes up front
        self.assign_scalars(&header);

        let gapped_len = u64::from(header.gapped_len);
        read_section(reader, &mut self.gapped.bases, gapped_len, Section::GappedBases)?;
        read_section(reader, &mut self.gapped.quals, gapped_len, Section::GappedQuals)?;
        let ungapped_len = u64::from(header.ungapped_len);
        read_section(reader, &mut self.ungapped.bases, ungapped_len, Section::UngappedBases)?;
        read_section(reader, &mut self.ungapped.quals, ungapped_len, Section::UngappedQuals)?;

        let expected = u64::from(header.children_len);
        for i in 0..expected {
            let child = PositionRecord::load(reader).map_err(|e| e.at_element(expected, i))?;
            self.children.push(child);
        }

        let expected = u64::from(header.child_deltas_len);
        let mut delta_bytes = GrowableBuffer::new();
        let n = delta_bytes.fill_from(reader, 4 * expected)?;
        if (n as u64) < 4 * expected {
            return Err(TigError::Truncated {
                section: Section::ChildDeltas,
                expected,
                found: (n / 4) as u64,
            });
        }
        for chunk in delta_bytes.as_slice().chunks_exact(4) {
            self.child_deltas
                .push(i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]));
        }

        let expected = u64::from(header.variants_len);
        for i in 0..expected {
            let variant = VariantRecord::load(reader).map_err(|e| e.at_element(expected, i))?;
            self.variants.push(variant);
        }

        read_section(
            reader,
            &mut self.variant_data,
            header.variant_data_len,
            Section::VariantData,
        )?;

        self.validate()?;
        Ok(true)
    }

    /// Write the layout (identity, flags, statistics, children) as text
    ///
    /// # Errors
    ///
    /// Returns `TigError::Io` if the writer fails.
    pub fn dump_layout<W: Write>(&self, writer: &mut W) -> Result<(), TigError> {
        layout::write_layout(self, writer)
    }

    /// Replace this tig with the next layout read from `reader`.
    ///
    /// Returns `Ok(false)` if the input ends before another layout starts.
    ///
    /// # Errors
    ///
    /// Returns `TigError::Layout` for malformed text.
    pub fn load_layout<R: BufRead>(&mut self, reader: &mut R) -> Result<bool, TigError> {
        layout::read_layout(self, reader)
    }
}

impl From<&Tig> for TigHeader {
    fn from(tig: &Tig) -> Self {
        let len32 = |len: usize| u32::try_from(len).unwrap_or(u32::MAX);
        Self {
            tig_id: tig.tig_id,
            coverage_stat: tig.coverage_stat,
            microhet_prob: tig.microhet_prob,
            flags: tig.flags,
            layout_len: tig.layout_len,
            gapped_len: len32(tig.gapped.len()),
            ungapped_len: len32(tig.ungapped.len()),
            children_len: len32(tig.children.len()),
            child_deltas_len: len32(tig.child_deltas.len()),
            variants_len: len32(tig.variants.len()),
            variant_data_len: tig.variant_data.len() as u64,
        }
    }
}

impl From<&TigHeader> for Tig {
    fn from(header: &TigHeader) -> Self {
        let mut tig = Self::new();
        tig.assign_from(header);
        tig
    }
}

/// Read exactly `len` bytes of a section
fn read_section<R: Read>(
    reader: &mut R,
    buf: &mut GrowableBuffer<u8>,
    len: u64,
    section: Section,
) -> Result<(), TigError> {
    let n = buf.fill_from(reader, len)? as u64;
    if n < len {
        return Err(TigError::Truncated {
            section,
            expected: len,
            found: n,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ChildKind;

    fn sample_tig() -> Tig {
        let mut tig = Tig::with_id(7);
        tig.coverage_stat = 12.5;
        tig.microhet_prob = 0.25;
        tig.flags.set_unique(true);
        tig.flags.set_haploid(true);

        tig.add_child_with_deltas(PositionRecord::new(ChildKind::Read, 100, 0, 10), &[3, -5])
            .unwrap();
        tig.add_child_with_deltas(
            PositionRecord::new(ChildKind::Read, 101, 12, 4).with_anchor(100, 4, 2),
            &[7],
        )
        .unwrap();
        tig.add_child(PositionRecord::new(ChildKind::Unitig, 9, 2, 8).with_anchor(100, 2, -2));

        tig.set_gapped_consensus(b"ACGT-ACGTACG", b"IIII!IIIIIII").unwrap();
        tig.set_ungapped_consensus(b"ACGTACGTACG", b"IIIIIIIIIII").unwrap();

        let mut variant = VariantRecord::new(0, 4, 5);
        variant.add_allele(b"-", 3, &[100]).unwrap();
        variant.add_allele(b"T", 1, &[101]).unwrap();
        tig.add_variant(variant);
        tig.append_variant_data(b"payload");
        tig
    }

    #[test]
    fn test_new_is_empty() {
        let tig = Tig::new();
        assert!(!tig.is_assigned());
        assert_eq!(tig.number_of_children(), 0);
        assert!(tig.gapped().is_empty());
        assert!(tig.child_deltas().is_empty());
    }

    #[test]
    fn test_add_child_extends_layout() {
        let mut tig = Tig::new();
        tig.add_child(PositionRecord::new(ChildKind::Read, 1, 0, 500));
        tig.add_child(PositionRecord::new(ChildKind::Read, 2, 900, 300));
        assert_eq!(tig.layout_len, 900);
    }

    #[test]
    fn test_deltas_of() {
        let tig = sample_tig();
        assert_eq!(tig.deltas_of(0), Some(&[3, -5][..]));
        assert_eq!(tig.deltas_of(1), Some(&[7][..]));
        assert_eq!(tig.deltas_of(2), Some(&[][..]));
        assert!(tig.deltas_of(3).is_none());
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut tig = sample_tig();
        let children_capacity = tig.children.capacity();
        let gapped_capacity = tig.gapped.capacity();

        tig.clear();
        assert_eq!(tig.tig_id, UNASSIGNED_TIG_ID);
        assert_eq!(tig.flags, TigFlags::default());
        assert_eq!(tig.coverage_stat, 0.0);
        assert_eq!(tig.layout_len, 0);
        assert_eq!(tig.number_of_children(), 0);
        assert!(tig.variants().is_empty());
        assert!(tig.variant_data().is_empty());
        assert_eq!(tig.children.capacity(), children_capacity);
        assert_eq!(tig.gapped.capacity(), gapped_capacity);
    }

    #[test]
    fn test_header_projection() {
        let tig = sample_tig();
        let header = TigHeader::from(&tig);
        assert_eq!(header.tig_id, 7);
        assert_eq!(header.gapped_len, 12);
        assert_eq!(header.ungapped_len, 11);
        assert_eq!(header.children_len, 3);
        assert_eq!(header.child_deltas_len, 3);
        assert_eq!(header.variants_len, 1);
        assert_eq!(header.variant_data_len, 7);
        assert_eq!(header.layout_len, 12);

        let shell = Tig::from(&header);
        assert_eq!(shell.tig_id, tig.tig_id);
        assert_eq!(shell.coverage_stat, tig.coverage_stat);
        assert_eq!(shell.microhet_prob, tig.microhet_prob);
        assert_eq!(shell.flags, tig.flags);
        assert_eq!(shell.layout_len, tig.layout_len);
        assert_eq!(shell.gapped().len(), 12);
        assert_eq!(shell.number_of_children(), 3);
        assert_eq!(shell.child_deltas(), &[0, 0, 0]);
        assert_eq!(TigHeader::from(&shell), header);
    }

    #[test]
    fn test_save_load_round_trip() {
        let tig = sample_tig();
        let mut bytes = Vec::new();
        tig.save(&mut bytes).unwrap();

        let mut loaded = Tig::new();
        loaded.load(&mut bytes.as_slice()).unwrap();
        assert_eq!(loaded, tig);
        assert_eq!(loaded.variants()[0].allele_seq(1), Some(&b"T"[..]));
    }

    #[test]
    fn test_load_reuses_tig() {
        let first = sample_tig();
        let mut second = Tig::with_id(8);
        second.add_child(PositionRecord::new(ChildKind::Contig, 3, 0, 40));

        let mut bytes = Vec::new();
        first.save(&mut bytes).unwrap();
        second.save(&mut bytes).unwrap();

        let mut reader = bytes.as_slice();
        let mut tig = Tig::new();
        assert!(tig.load_next(&mut reader).unwrap());
        assert_eq!(tig, first);
        assert!(tig.load_next(&mut reader).unwrap());
        assert_eq!(tig, second);
        assert!(!tig.load_next(&mut reader).unwrap());
        assert!(!tig.is_assigned());
    }

    #[test]
    fn test_empty_tig_round_trip() {
        let mut tig = sample_tig();
        tig.clear();

        let mut bytes = Vec::new();
        tig.save(&mut bytes).unwrap();
        assert_eq!(bytes.len() as u64, TIG_HEADER_SIZE);

        let mut loaded = sample_tig();
        loaded.load(&mut bytes.as_slice()).unwrap();
        assert_eq!(loaded, Tig::new());
    }

    #[test]
    fn test_reserved_flag_bits_survive() {
        let mut tig = sample_tig();
        tig.flags.0 |= 0x4000_0000;
        let mut bytes = Vec::new();
        tig.save(&mut bytes).unwrap();

        let mut loaded = Tig::new();
        loaded.load(&mut bytes.as_slice()).unwrap();
        assert_eq!(loaded.flags.reserved(), 0x4000_0000);
    }

    #[test]
    fn test_truncated_load_clears_tig() {
        let mut bytes = Vec::new();
        sample_tig().save(&mut bytes).unwrap();

        // Cut inside the children section
        bytes.truncate(TIG_HEADER_SIZE as usize + 2 * (12 + 11) + 40);

        let mut tig = sample_tig();
        let err = tig.load(&mut bytes.as_slice()).unwrap_err();
        match err {
            TigError::Truncated {
                section,
                expected,
                found,
            } => {
                assert_eq!(section, Section::Children);
                assert_eq!(expected, 3);
                assert_eq!(found, 1);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(tig, Tig::new());
    }

    #[test]
    fn test_truncated_consensus() {
        let mut bytes = Vec::new();
        sample_tig().save(&mut bytes).unwrap();
        bytes.truncate(TIG_HEADER_SIZE as usize + 5);

        let mut tig = Tig::new();
        assert!(matches!(
            tig.load(&mut bytes.as_slice()),
            Err(TigError::Truncated {
                section: Section::GappedBases,
                expected: 12,
                found: 5
            })
        ));
    }

    #[test]
    fn test_load_empty_stream() {
        let mut tig = Tig::new();
        let empty: &[u8] = &[];
        assert!(matches!(
            tig.load(&mut &*empty),
            Err(TigError::Truncated {
                section: Section::Header,
                ..
            })
        ));
    }

    #[test]
    fn test_oversized_section_rejected() {
        let header = TigHeader {
            tig_id: 1,
            variant_data_len: u64::MAX,
            ..TigHeader::default()
        };
        let mut bytes = Vec::new();
        header.save(&mut bytes).unwrap();

        let mut tig = Tig::new();
        assert!(matches!(
            tig.load(&mut bytes.as_slice()),
            Err(TigError::SectionTooLarge {
                section: Section::VariantData,
                ..
            })
        ));
    }

    #[test]
    fn test_header_only_stream_with_large_sections() {
        let cases = [
            (
                TigHeader {
                    tig_id: 1,
                    children_len: 100_000_000,
                    child_deltas_len: 1_000_000_000,
                    ..TigHeader::default()
                },
                Section::Children,
            ),
            (
                TigHeader {
                    tig_id: 2,
                    child_deltas_len: 1_000_000_000,
                    variant_data_len: 1 << 32,
                    ..TigHeader::default()
                },
                Section::ChildDeltas,
            ),
            (
                TigHeader {
                    tig_id: 3,
                    gapped_len: u32::MAX,
                    ..TigHeader::default()
                },
                Section::GappedBases,
            ),
        ];

        for (header, truncated_section) in cases {
            let mut bytes = Vec::new();
            header.save(&mut bytes).unwrap();
            assert_eq!(bytes.len() as u64, TIG_HEADER_SIZE);

            let mut tig = Tig::new();
            match tig.load(&mut bytes.as_slice()) {
                Err(TigError::Truncated { section, found, .. }) => {
                    assert_eq!(section, truncated_section);
                    assert_eq!(found, 0);
                }
                other => panic!("unexpected result: {other:?}"),
            }
            assert_eq!(tig, Tig::new());
        }
    }

    #[test]
    fn test_save_rejects_delta_overflow() {
        let mut tig = Tig::with_id(1);
        tig.append_deltas(&[1, 2]).unwrap();
        tig.add_child(PositionRecord::new(ChildKind::Read, 1, 0, 10).with_deltas(1, 2));

        let mut bytes = Vec::new();
        assert!(matches!(
            tig.save(&mut bytes),
            Err(TigError::InvariantViolation(_))
        ));
        assert!(bytes.is_empty());
    }

    #[test]
    fn test_load_rejects_corrupt_kind() {
        let mut tig = Tig::with_id(1);
        tig.add_child(PositionRecord::new(ChildKind::Read, 1, 0, 10));
        let mut bytes = tig.to_bytes().unwrap();

        // The kind word follows the object ID in the first child record
        let kind_at = TIG_HEADER_SIZE as usize + 4;
        bytes[kind_at] = 0b011;

        let mut loaded = Tig::new();
        assert!(matches!(
            loaded.load(&mut bytes.as_slice()),
            Err(TigError::InvariantViolation(_))
        ));
        assert_eq!(loaded, Tig::new());
    }

    #[test]
    fn test_save_to_failing_writer() {
        struct FailingWriter;

        impl Write for FailingWriter {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::Other, "disk full"))
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let result = sample_tig().save(&mut FailingWriter);
        assert!(matches!(result, Err(TigError::Io(_))));
    }

    #[test]
    fn test_consensus_length_mismatch() {
        let mut tig = Tig::new();
        assert!(tig.set_gapped_consensus(b"ACGT", b"II").is_err());
        assert!(tig.set_ungapped_consensus(b"AC", b"III").is_err());
    }

    #[test]
    fn test_layout_must_match_gapped_length() {
        let mut tig = sample_tig();
        tig.layout_len = 99;
        assert!(tig.validate().is_err());
    }
}
