use std::path::PathBuf;

use clap::Args;

use crate::cli::OutputFormat;
use crate::core::tig::Tig;
use crate::store::store::TigStore;

#[derive(Args)]
pub struct SummaryArgs {
    /// Tig store to summarize (gzip-compressed if it ends in .gz)
    #[arg(required = true)]
    pub store: PathBuf,
}

pub fn run(args: SummaryArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let store = TigStore::load_from_file(&args.store)?;

    if verbose {
        eprintln!(
            "Loaded {} tigs from {}",
            store.len(),
            args.store.display()
        );
    }

    match format {
        OutputFormat::Text => print_text_summary(&args, &store),
        OutputFormat::Json => print_json_summary(&store)?,
        OutputFormat::Tsv => print_tsv_summary(&store),
    }

    Ok(())
}

/// MD5 of the ungapped consensus, uppercased
fn consensus_md5(tig: &Tig) -> Option<String> {
    let bases = tig.ungapped().bases();
    if bases.is_empty() {
        return None;
    }
    let uppercase: Vec<u8> = bases.iter().map(u8::to_ascii_uppercase).collect();
    Some(format!("{:x}", md5::compute(&uppercase)))
}

fn flag_names(tig: &Tig) -> String {
    let flags = tig.flags;
    let names: Vec<&str> = [
        (flags.suggest_repeat(), "repeat"),
        (flags.suggest_unique(), "unique"),
        (flags.suggest_circular(), "circular"),
        (flags.suggest_haploid(), "haploid"),
    ]
    .into_iter()
    .filter_map(|(set, name)| set.then_some(name))
    .collect();

    if names.is_empty() {
        "-".to_string()
    } else {
        names.join(",")
    }
}

fn print_text_summary(args: &SummaryArgs, store: &TigStore) {
    let summary = store.summary();

    println!("Tig Store Summary");
    println!("{}", "=".repeat(60));
    println!("\nStore: {}", args.store.display());
    println!("  Tigs: {}", summary.tig_count);
    println!("  Children: {}", summary.total_children);

    for tig in store {
        println!("\nTig {}", tig.tig_id);
        println!("  Layout length: {}", tig.layout_len);
        println!("  Consensus length: {}", tig.ungapped().len());
        println!("  Children: {}", tig.number_of_children());
        println!("  Variants: {}", tig.variants().len());
        println!("  Coverage stat: {:.2}", tig.coverage_stat);
        println!("  Microhet prob: {:.2}", tig.microhet_prob);
        println!("  Suggested: {}", flag_names(tig));
        if let Some(md5) = consensus_md5(tig) {
            println!("  Consensus MD5: {md5}");
        }
    }
}

fn print_json_summary(store: &TigStore) -> anyhow::Result<()> {
    let summary = store.summary();

    let tigs: Vec<serde_json::Value> = store
        .iter()
        .zip(&summary.tigs)
        .map(|(tig, header)| {
            serde_json::json!({
                "header": header,
                "consensus_md5": consensus_md5(tig),
                "suggested": flag_names(tig),
            })
        })
        .collect();

    let output = serde_json::json!({
        "version": summary.version,
        "created_at": summary.created_at,
        "tig_count": summary.tig_count,
        "total_children": summary.total_children,
        "tigs": tigs,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_tsv_summary(store: &TigStore) {
    println!(
        "tig_id\tlayout_len\tconsensus_len\tchildren\tvariants\tcoverage_stat\tmicrohet_prob\tsuggested\tconsensus_md5"
    );
    for tig in store {
        println!(
            "{}\t{}\t{}\t{}\t{}\t{:.4}\t{:.4}\t{}\t{}",
            tig.tig_id,
            tig.layout_len,
            tig.ungapped().len(),
            tig.number_of_children(),
            tig.variants().len(),
            tig.coverage_stat,
            tig.microhet_prob,
            flag_names(tig),
            consensus_md5(tig).unwrap_or_else(|| "-".to_string()),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consensus_md5_uppercases() {
        let mut lower = Tig::with_id(0);
        lower.set_ungapped_consensus(b"acgt", b"!!!!").unwrap();
        let mut upper = Tig::with_id(1);
        upper.set_ungapped_consensus(b"ACGT", b"!!!!").unwrap();

        assert_eq!(consensus_md5(&lower), consensus_md5(&upper));
        assert_eq!(
            consensus_md5(&upper).as_deref(),
            Some("f1f8f4bf413b16ad135722aa4591043e")
        );
        assert_eq!(consensus_md5(&Tig::new()), None);
    }

    #[test]
    fn test_flag_names() {
        let mut tig = Tig::with_id(0);
        assert_eq!(flag_names(&tig), "-");
        tig.flags.set_unique(true);
        tig.flags.set_circular(true);
        assert_eq!(flag_names(&tig), "unique,circular");
    }
}
