use std::io::BufReader;
use std::path::PathBuf;

use clap::Args;
use tracing::debug;

use crate::cli::OutputFormat;
use crate::core::tig::Tig;
use crate::store::store::TigStore;
use crate::utils::io::open_reader;

#[derive(Args)]
pub struct ImportArgs {
    /// Layout text to read (gzip-compressed if it ends in .gz)
    #[arg(required = true)]
    pub layout: PathBuf,

    /// Tig store to write (gzip-compressed if it ends in .gz)
    #[arg(required = true)]
    pub store: PathBuf,
}

pub fn run(args: ImportArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    let mut reader = BufReader::new(open_reader(&args.layout)?);

    let mut store = TigStore::new();
    let mut tig = Tig::new();
    while tig
        .load_layout(&mut reader)
        .map_err(|e| anyhow::anyhow!("{}: {e}", args.layout.display()))?
    {
        let id = store.add(tig.clone())?;
        debug!("Imported tig {id} with {} children", tig.number_of_children());
    }

    store.save_to_file(&args.store)?;

    if verbose {
        eprintln!(
            "Imported {} tigs from {}",
            store.len(),
            args.layout.display()
        );
    }

    let children: usize = store.iter().map(Tig::number_of_children).sum();
    match format {
        OutputFormat::Text => {
            println!(
                "Wrote {} tigs with {} children to {}",
                store.len(),
                children,
                args.store.display()
            );
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "store": args.store.display().to_string(),
                "tig_count": store.len(),
                "total_children": children,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Tsv => {
            println!("store\ttig_count\ttotal_children");
            println!("{}\t{}\t{}", args.store.display(), store.len(), children);
        }
    }

    Ok(())
}
