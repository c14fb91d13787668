use std::io::Write;
use std::path::PathBuf;

use clap::Args;
use tracing::debug;

use crate::cli::OutputFormat;
use crate::core::types::TigId;
use crate::store::store::TigStore;
use crate::utils::io::create_writer;

#[derive(Args)]
pub struct LayoutArgs {
    /// Tig store to read (gzip-compressed if it ends in .gz)
    #[arg(required = true)]
    pub store: PathBuf,

    /// Only write the layout of this tig
    #[arg(long)]
    pub tig: Option<TigId>,

    /// Write layouts to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: LayoutArgs, format: OutputFormat, verbose: bool) -> anyhow::Result<()> {
    if !matches!(format, OutputFormat::Text) {
        debug!("Layouts are always written as text; ignoring --format {format:?}");
    }

    let store = TigStore::load_from_file(&args.store)?;

    let tigs: Vec<_> = match args.tig {
        Some(id) => vec![store
            .get(id)
            .ok_or_else(|| anyhow::anyhow!("Tig {id} not found in {}", args.store.display()))?],
        None => store.iter().collect(),
    };

    match &args.output {
        Some(path) => {
            let mut writer = create_writer(path)?;
            for tig in &tigs {
                tig.dump_layout(&mut writer)?;
            }
            writer.finish()?;
        }
        None => {
            let mut writer = std::io::stdout().lock();
            for tig in &tigs {
                tig.dump_layout(&mut writer)?;
            }
            writer.flush()?;
        }
    }

    if verbose {
        eprintln!("Wrote {} layouts", tigs.len());
    }

    Ok(())
}
