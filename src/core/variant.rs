//! Variant calls stored with a tig.
//!
//! A [`VariantRecord`] describes a region of the consensus where reads
//! disagree. Each allele is an [`AllelePosition`] whose sequence and
//! supporting read IDs live in pools owned by the record. On disk the
//! alleles are written in a compact text encoding ([`EncodedAlleles`]):
//! slash-separated read counts, weights, allele sequences, and read IDs.
//! Loading parses that encoding and rebuilds the alleles and pools, so the
//! structured form is always the one the rest of the crate works with.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::core::error::TigError;
use crate::core::types::{Section, NO_PHASE};
use crate::utils::io::read_fully;
use crate::utils::validation::MAX_SECTION_BYTES;

/// Serialized size of the fixed part of a variant record
pub const VARIANT_SCALARS_SIZE: u64 = 36;

/// Separator between fields of an encoded allele buffer
const FIELD_SEPARATOR: u8 = b'/';

/// One allele of a variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AllelePosition {
    pub num_reads: u32,
    pub weight: u32,
    /// Offset of this allele's sequence in the owning record's sequence pool
    pub var_seq_offset: u32,
    /// Offset of this allele's first read in the owning record's read-id pool
    pub read_id_offset: u32,
}

/// Fixed part of a variant record as written to disk
#[derive(Debug, Serialize, Deserialize)]
struct VariantScalars {
    var_id: i32,
    phased_id: i32,
    bgn: u32,
    end: u32,
    num_reads: i32,
    num_alleles: i32,
    num_alleles_confirmed: i32,
    min_anchor_size: i32,
    var_length: i32,
}

/// A called variant region
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VariantRecord {
    pub var_id: i32,
    /// Variant this one is phased with, or [`NO_PHASE`]
    pub phased_id: i32,

    pub bgn: u32,
    pub end: u32,

    pub num_reads: i32,
    pub num_alleles: i32,
    pub num_alleles_confirmed: i32,
    pub min_anchor_size: i32,
    /// Bases in the variant region; every allele sequence has this length
    pub var_length: i32,

    pub alleles: Vec<AllelePosition>,
    pub var_seq: Vec<u8>,
    pub read_ids: Vec<i32>,
}

/// The compact on-disk form of a variant's alleles
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EncodedAlleles {
    pub num_reads: Vec<u8>,
    pub weights: Vec<u8>,
    pub var_seq: Vec<u8>,
    pub read_ids: Vec<u8>,
}

impl VariantRecord {
    #[must_use]
    pub fn new(var_id: i32, bgn: u32, end: u32) -> Self {
        Self {
            var_id,
            phased_id: NO_PHASE,
            bgn,
            end,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_phase(mut self, phased_id: i32) -> Self {
        self.phased_id = phased_id;
        self
    }

    #[must_use]
    pub fn is_phased(&self) -> bool {
        self.phased_id != NO_PHASE
    }

    /// Append an allele, copying its sequence and reads into the pools.
    ///
    /// The first allele fixes `var_length`; later alleles must match it.
    ///
    /// # Errors
    ///
    /// Returns `TigError::InvariantViolation` if the sequence length differs
    /// from earlier alleles or the sequence contains the field separator.
    pub fn add_allele(
        &mut self,
        seq: &[u8],
        weight: u32,
        read_ids: &[i32],
    ) -> Result<usize, TigError> {
        if self.alleles.is_empty() && self.var_length == 0 {
            self.var_length = to_i32(seq.len(), "variant length")?;
        } else if seq.len() != self.var_length as usize {
            return Err(TigError::InvariantViolation(format!(
                "variant {}: allele of {} bases in a {} base region",
                self.var_id,
                seq.len(),
                self.var_length
            )));
        }
        if seq.contains(&FIELD_SEPARATOR) {
            return Err(TigError::InvariantViolation(format!(
                "variant {}: allele sequence contains '/'",
                self.var_id
            )));
        }

        let allele = AllelePosition {
            num_reads: to_u32(read_ids.len(), "allele read count")?,
            weight,
            var_seq_offset: to_u32(self.var_seq.len(), "allele sequence offset")?,
            read_id_offset: to_u32(self.read_ids.len(), "allele read offset")?,
        };
        self.var_seq.extend_from_slice(seq);
        self.read_ids.extend_from_slice(read_ids);
        self.alleles.push(allele);
        self.num_alleles = to_i32(self.alleles.len(), "allele count")?;
        self.num_reads = to_i32(self.read_ids.len(), "variant read count")?;
        Ok(self.alleles.len() - 1)
    }

    /// Sequence of allele `index`
    #[must_use]
    pub fn allele_seq(&self, index: usize) -> Option<&[u8]> {
        let allele = self.alleles.get(index)?;
        let start = allele.var_seq_offset as usize;
        self.var_seq.get(start..start + self.var_length.max(0) as usize)
    }

    /// Supporting read IDs of allele `index`
    #[must_use]
    pub fn allele_read_ids(&self, index: usize) -> Option<&[i32]> {
        let allele = self.alleles.get(index)?;
        let start = allele.read_id_offset as usize;
        self.read_ids.get(start..start + allele.num_reads as usize)
    }

    /// Check counts and that the alleles lay out the pools the way
    /// [`VariantRecord::add_allele`] does, so the encoding round-trips
    ///
    /// # Errors
    ///
    /// Returns `TigError::InvariantViolation` describing the first problem.
    pub fn validate(&self) -> Result<(), TigError> {
        let fail = |message: String| -> Result<(), TigError> {
            Err(TigError::InvariantViolation(format!(
                "variant {}: {message}",
                self.var_id
            )))
        };

        if self.var_length < 0 || self.num_alleles < 0 {
            return fail(format!(
                "negative length {} or allele count {}",
                self.var_length, self.num_alleles
            ));
        }
        if self.alleles.len() != self.num_alleles as usize {
            return fail(format!(
                "{} alleles stored but {} declared",
                self.alleles.len(),
                self.num_alleles
            ));
        }
        if self.num_alleles_confirmed > self.num_alleles {
            return fail(format!(
                "{} confirmed alleles out of {}",
                self.num_alleles_confirmed, self.num_alleles
            ));
        }

        // Alleles own consecutive, non-overlapping slices of both pools, in
        // order, and together cover each pool exactly
        let var_length = self.var_length as u64;
        let mut seq_end = 0u64;
        let mut reads_end = 0u64;
        for (i, allele) in self.alleles.iter().enumerate() {
            if u64::from(allele.var_seq_offset) != seq_end {
                return fail(format!(
                    "allele {i} sequence starts at {}, expected {seq_end}",
                    allele.var_seq_offset
                ));
            }
            if u64::from(allele.read_id_offset) != reads_end {
                return fail(format!(
                    "allele {i} reads start at {}, expected {reads_end}",
                    allele.read_id_offset
                ));
            }
            seq_end += var_length;
            reads_end += u64::from(allele.num_reads);
        }
        if seq_end != self.var_seq.len() as u64 {
            return fail(format!(
                "alleles cover {seq_end} sequence bytes, pool holds {}",
                self.var_seq.len()
            ));
        }
        if reads_end != self.read_ids.len() as u64 {
            return fail(format!(
                "alleles cover {reads_end} read ids, pool holds {}",
                self.read_ids.len()
            ));
        }
        if self.var_seq.contains(&FIELD_SEPARATOR) {
            return fail("allele sequence contains '/'".to_string());
        }
        Ok(())
    }

    /// Produce the compact encoding of the alleles
    ///
    /// # Errors
    ///
    /// Returns `TigError::InvariantViolation` if the record is inconsistent.
    pub fn encode(&self) -> Result<EncodedAlleles, TigError> {
        self.validate()?;

        let mut encoded = EncodedAlleles::default();
        for (i, allele) in self.alleles.iter().enumerate() {
            if i > 0 {
                encoded.num_reads.push(FIELD_SEPARATOR);
                encoded.weights.push(FIELD_SEPARATOR);
                encoded.var_seq.push(FIELD_SEPARATOR);
            }
            encoded
                .num_reads
                .extend_from_slice(allele.num_reads.to_string().as_bytes());
            encoded
                .weights
                .extend_from_slice(allele.weight.to_string().as_bytes());
            // validate() guarantees both ranges are in bounds
            encoded
                .var_seq
                .extend_from_slice(self.allele_seq(i).unwrap_or_default());
            for read_id in self.allele_read_ids(i).unwrap_or_default() {
                if !encoded.read_ids.is_empty() {
                    encoded.read_ids.push(FIELD_SEPARATOR);
                }
                encoded
                    .read_ids
                    .extend_from_slice(read_id.to_string().as_bytes());
            }
        }
        Ok(encoded)
    }

    /// Write the scalar block followed by the four encoded buffers
    ///
    /// # Errors
    ///
    /// Returns `TigError::InvariantViolation` for an inconsistent record or
    /// `TigError::Io` if the writer fails.
    pub fn save<W: Write>(&self, writer: &mut W) -> Result<(), TigError> {
        let encoded = self.encode()?;

        let scalars = VariantScalars {
            var_id: self.var_id,
            phased_id: self.phased_id,
            bgn: self.bgn,
            end: self.end,
            num_reads: self.num_reads,
            num_alleles: self.num_alleles,
            num_alleles_confirmed: self.num_alleles_confirmed,
            min_anchor_size: self.min_anchor_size,
            var_length: self.var_length,
        };
        bincode::serialize_into(&mut *writer, &scalars)
            .map_err(|e| TigError::from_bincode(e, Section::Variants, 1, 0))?;

        for buffer in [
            &encoded.num_reads,
            &encoded.weights,
            &encoded.var_seq,
            &encoded.read_ids,
        ] {
            let len = to_u32(buffer.len(), "encoded allele buffer")?;
            writer.write_all(&len.to_le_bytes())?;
            writer.write_all(buffer)?;
        }
        Ok(())
    }

    /// Read a record written by [`VariantRecord::save`]
    ///
    /// # Errors
    ///
    /// Returns `TigError::Truncated` if the stream ends inside the record and
    /// `TigError::InvalidFormat` if the encoded alleles cannot be decoded.
    pub fn load<R: Read>(reader: &mut R) -> Result<Self, TigError> {
        let scalars: VariantScalars = bincode::deserialize_from(&mut *reader)
            .map_err(|e| TigError::from_bincode(e, Section::Variants, 1, 0))?;

        let encoded = EncodedAlleles {
            num_reads: read_buffer(reader)?,
            weights: read_buffer(reader)?,
            var_seq: read_buffer(reader)?,
            read_ids: read_buffer(reader)?,
        };

        let mut record = Self {
            var_id: scalars.var_id,
            phased_id: scalars.phased_id,
            bgn: scalars.bgn,
            end: scalars.end,
            num_reads: scalars.num_reads,
            num_alleles: scalars.num_alleles,
            num_alleles_confirmed: scalars.num_alleles_confirmed,
            min_anchor_size: scalars.min_anchor_size,
            var_length: scalars.var_length,
            ..Self::default()
        };
        encoded.decode_into(&mut record)?;
        record.validate()?;
        Ok(record)
    }
}

impl EncodedAlleles {
    /// Rebuild `record`'s alleles and pools from this encoding, using the
    /// record's `num_alleles` and `var_length`.
    ///
    /// # Errors
    ///
    /// Returns `TigError::InvalidFormat` if a buffer has the wrong number of
    /// fields, a sequence has the wrong length, or a number does not parse.
    pub fn decode_into(&self, record: &mut VariantRecord) -> Result<(), TigError> {
        let var_id = record.var_id;
        let invalid = |message: String| TigError::InvalidFormat(format!("variant {var_id}: {message}"));

        if record.num_alleles < 0 || record.var_length < 0 {
            return Err(invalid(format!(
                "negative allele count {} or length {}",
                record.num_alleles, record.var_length
            )));
        }
        let num_alleles = record.num_alleles as usize;
        let var_length = record.var_length as usize;

        let counts = parse_fields::<u32>(&self.num_reads, num_alleles, "read counts")
            .map_err(&invalid)?;
        let weights =
            parse_fields::<u32>(&self.weights, num_alleles, "weights").map_err(&invalid)?;
        let seqs = split_fields(&self.var_seq, num_alleles);
        if seqs.len() != num_alleles {
            return Err(invalid(format!(
                "{} allele sequences for {num_alleles} alleles",
                seqs.len()
            )));
        }
        let total_reads = counts.iter().map(|&c| c as usize).sum::<usize>();
        let read_ids =
            parse_fields::<i32>(&self.read_ids, total_reads, "read ids").map_err(&invalid)?;

        record.alleles.clear();
        record.var_seq.clear();
        record.read_ids = read_ids;

        let mut read_offset = 0u32;
        for (i, seq) in seqs.iter().enumerate() {
            if seq.len() != var_length {
                return Err(invalid(format!(
                    "allele {i} has {} bases, expected {var_length}",
                    seq.len()
                )));
            }
            let var_seq_offset = to_u32(record.var_seq.len(), "allele sequence offset")?;
            record.var_seq.extend_from_slice(seq);
            record.alleles.push(AllelePosition {
                num_reads: counts[i],
                weight: weights[i],
                var_seq_offset,
                read_id_offset: read_offset,
            });
            read_offset += counts[i];
        }
        Ok(())
    }
}

/// Split a buffer on the field separator. An empty buffer holds a single
/// empty field when one is expected, and no fields otherwise.
fn split_fields(buf: &[u8], expected: usize) -> Vec<&[u8]> {
    if buf.is_empty() {
        return vec![buf; expected.min(1)];
    }
    buf.split(|&b| b == FIELD_SEPARATOR).collect()
}

fn parse_fields<T: std::str::FromStr>(
    buf: &[u8],
    expected: usize,
    what: &str,
) -> Result<Vec<T>, String> {
    if expected == 0 {
        return if buf.is_empty() {
            Ok(Vec::new())
        } else {
            Err(format!("unexpected {what} field"))
        };
    }

    let fields = split_fields(buf, expected);
    if fields.len() != expected {
        return Err(format!(
            "{} {what} fields, expected {expected}",
            fields.len()
        ));
    }
    fields
        .into_iter()
        .map(|field| {
            std::str::from_utf8(field)
                .ok()
                .and_then(|s| s.parse::<T>().ok())
                .ok_or_else(|| {
                    format!(
                        "invalid {what} field '{}'",
                        String::from_utf8_lossy(field)
                    )
                })
        })
        .collect()
}

/// Read one `u32`-length-prefixed buffer
fn read_buffer<R: Read>(reader: &mut R) -> Result<Vec<u8>, TigError> {
    let mut len_bytes = [0u8; 4];
    if read_fully(reader, &mut len_bytes)? < len_bytes.len() {
        return Err(TigError::Truncated {
            section: Section::Variants,
            expected: 1,
            found: 0,
        });
    }
    let len = u32::from_le_bytes(len_bytes);
    if u64::from(len) > MAX_SECTION_BYTES {
        return Err(TigError::SectionTooLarge {
            section: Section::Variants,
            len: u64::from(len),
        });
    }

    let mut buffer = Vec::new();
    if (reader.take(u64::from(len)).read_to_end(&mut buffer)? as u64) < u64::from(len) {
        return Err(TigError::Truncated {
            section: Section::Variants,
            expected: 1,
            found: 0,
        });
    }
    Ok(buffer)
}

fn to_u32(value: usize, what: &str) -> Result<u32, TigError> {
    u32::try_from(value)
        .map_err(|_| TigError::InvariantViolation(format!("{what} {value} does not fit in 32 bits")))
}

fn to_i32(value: usize, what: &str) -> Result<i32, TigError> {
    i32::try_from(value)
        .map_err(|_| TigError::InvariantViolation(format!("{what} {value} does not fit in 32 bits")))
}
