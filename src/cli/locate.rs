use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::core::position::PositionRecord;
use crate::core::types::ChildKind;
use crate::store::index::{ChildIndex, Placement};
use crate::store::store::TigStore;

#[derive(Args)]
pub struct LocateArgs {
    /// Tig store to search (gzip-compressed if it ends in .gz)
    #[arg(required = true)]
    pub store: PathBuf,

    /// Read ID to find
    #[arg(long, required = true)]
    pub read: u32,
}

pub fn run(args: LocateArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let store = TigStore::load_from_file(&args.store)?;
    let index = ChildIndex::build(&store);

    if verbose {
        eprintln!(
            "Indexed {} objects in {} tigs",
            index.len(),
            store.len()
        );
    }

    let hits: Vec<(Placement, &PositionRecord)> = index
        .find(ChildKind::Read, args.read)
        .iter()
        .filter_map(|&p| ChildIndex::resolve(&store, p).map(|record| (p, record)))
        .collect();

    match format {
        OutputFormat::Text => print_text_hits(args.read, &hits),
        OutputFormat::Json => print_json_hits(args.read, &hits)?,
        OutputFormat::Tsv => print_tsv_hits(args.read, &hits),
    }

    Ok(())
}

fn orientation(record: &PositionRecord) -> char {
    if record.is_reverse() {
        '-'
    } else {
        '+'
    }
}

fn print_text_hits(read: u32, hits: &[(Placement, &PositionRecord)]) {
    if hits.is_empty() {
        println!("Read {read} is not placed in any tig");
        return;
    }

    println!("Read {read} is placed in {} tig(s):", hits.len());
    for (placement, record) in hits {
        println!(
            "  tig {} child {}: {}-{} ({})",
            placement.tig_id,
            placement.child_index,
            record.min(),
            record.max(),
            orientation(record)
        );
    }
}

fn print_json_hits(read: u32, hits: &[(Placement, &PositionRecord)]) -> anyhow::Result<()> {
    let placements: Vec<serde_json::Value> = hits
        .iter()
        .map(|(placement, record)| {
            serde_json::json!({
                "tig_id": placement.tig_id,
                "child_index": placement.child_index,
                "bgn": record.bgn,
                "end": record.end,
                "reverse": record.is_reverse(),
            })
        })
        .collect();

    let output = serde_json::json!({
        "read": read,
        "placements": placements,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_hits(read: u32, hits: &[(Placement, &PositionRecord)]) {
    println!("read\ttig_id\tchild_index\tbgn\tend\torientation");
    for (placement, record) in hits {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            read,
            placement.tig_id,
            placement.child_index,
            record.bgn,
            record.end,
            orientation(record)
        );
    }
}
