use clap::Parser;
use tracing_subscriber::EnvFilter;

use tigstore::cli;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("tigstore=debug,info")
    } else {
        EnvFilter::new("tigstore=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    match cli.command {
        cli::Commands::Summary(args) => {
            cli::summary::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Layout(args) => {
            cli::layout::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::ImportLayout(args) => {
            cli::import::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Consensus(args) => {
            cli::consensus::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Locate(args) => {
            cli::locate::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
