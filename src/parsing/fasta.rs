//! Writer for tig consensus sequences in FASTA format using noodles.
//!
//! Each tig with an ungapped consensus becomes one record named
//! `tig` followed by the zero-padded tig ID, e.g. `>tig00000012 len=2400`.
//! Tigs without an ungapped consensus are skipped.

use std::io::Write;

use noodles::fasta;
use tracing::debug;

use crate::core::tig::Tig;

/// FASTA record name for a tig
#[must_use]
pub fn record_name(tig: &Tig) -> String {
    if tig.is_assigned() {
        format!("tig{:08}", tig.tig_id)
    } else {
        "tig-unassigned".to_string()
    }
}

/// Write the ungapped consensus of every tig with one, returning the number
/// of records written
///
/// # Errors
///
/// Returns an I/O error if the writer fails.
pub fn write_consensus<'a, W, I>(tigs: I, writer: W) -> std::io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a Tig>,
{
    let mut fasta_writer = fasta::io::Writer::new(writer);
    let mut written = 0;

    for tig in tigs {
        let bases = tig.ungapped().bases();
        if bases.is_empty() {
            debug!("Tig {} has no ungapped consensus; skipping", tig.tig_id);
            continue;
        }

        let definition = fasta::record::Definition::new(
            record_name(tig),
            Some(format!("len={}", bases.len()).into()),
        );
        let record = fasta::Record::new(definition, fasta::record::Sequence::from(bases.to_vec()));
        fasta_writer.write_record(&record)?;
        written += 1;
    }

    fasta_writer.get_mut().flush()?;
    Ok(written)
}
