//! Command-line interface for tigstore.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **summary**: Summarize every tig in a store
//! - **layout**: Write tig layouts as text
//! - **import-layout**: Build a binary store from layout text
//! - **consensus**: Write ungapped consensus sequences as FASTA
//! - **locate**: Find the tigs a read was placed in
//!
//! ## Usage
//!
//! ```text
//! # Summarize a store
//! tigstore summary unitigs.tigs
//!
//! # JSON output for scripting
//! tigstore summary unitigs.tigs --format json
//!
//! # Dump one layout, edit it, and import it again
//! tigstore layout unitigs.tigs --tig 12 > tig12.layout
//! tigstore import-layout tig12.layout edited.tigs
//!
//! # Where did read 1234 end up?
//! tigstore locate unitigs.tigs --read 1234
//! ```

use clap::{Parser, Subcommand};

pub mod consensus;
pub mod import;
pub mod layout;
pub mod locate;
pub mod summary;

#[derive(Parser)]
#[command(name = "tigstore")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Inspect and convert stores of assembled tigs")]
#[command(
    long_about = "tigstore reads and writes binary stores of assembled tigs: consensus sequence, read placements, and variants.\n\nIt can:\n- Summarize the tigs in a store\n- Convert between the binary format and text layouts\n- Export consensus sequence as FASTA\n- Locate reads within tigs"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Summarize the tigs in a store
    Summary(summary::SummaryArgs),

    /// Write tig layouts as text
    Layout(layout::LayoutArgs),

    /// Build a binary store from layout text
    ImportLayout(import::ImportArgs),

    /// Write ungapped consensus sequences as FASTA
    Consensus(consensus::ConsensusArgs),

    /// Find the tigs containing a read
    Locate(locate::LocateArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
