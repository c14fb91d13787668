use std::path::PathBuf;

use clap::Args;
use tracing::debug;

use crate::cli::OutputFormat;
use crate::parsing::fasta::write_consensus;
use crate::store::store::TigStore;
use crate::utils::io::create_writer;

#[derive(Args)]
pub struct ConsensusArgs {
    /// Tig store to read (gzip-compressed if it ends in .gz)
    #[arg(required = true)]
    pub store: PathBuf,

    /// FASTA file to write, or "-" for stdout
    #[arg(required = true)]
    pub output: PathBuf,
}

pub fn run(args: ConsensusArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    if !matches!(format, OutputFormat::Text) {
        debug!("Consensus is always written as FASTA; ignoring --format {format:?}");
    }

    let store = TigStore::load_from_file(&args.store)?;

    let written = if args.output.as_os_str() == "-" {
        write_consensus(&store, std::io::stdout().lock())?
    } else {
        let mut writer = create_writer(&args.output)?;
        let written = write_consensus(&store, &mut writer)?;
        writer.finish()?;
        written
    };

    if verbose {
        eprintln!(
            "Wrote {written} of {} tigs to {}",
            store.len(),
            args.output.display()
        );
    }

    Ok(())
}
