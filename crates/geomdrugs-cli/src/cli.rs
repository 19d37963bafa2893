use super::commands;
use clap::{Args, Parser, Subcommand};
use geomdrugs_core::DEFAULT_PERMUTATION_SEED;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Flatten a directory of conformer archives into the atom table artifacts.
    Extract {
        #[arg(long)]
        archive_dir: PathBuf,
        #[arg(long)]
        output_dir: PathBuf,
        /// Conformers kept per molecule
        #[arg(long, default_value_t = 4)]
        conformations: usize,
        #[arg(long)]
        keep_hydrogens: bool,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Create the split permutation for an atom table. Never overwrites.
    Permute {
        #[arg(long)]
        table: PathBuf,
        /// Defaults to `geom_permutation.npy` next to the table
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, default_value_t = DEFAULT_PERMUTATION_SEED)]
        seed: u64,
    },
    /// Split a table and report dataset and batch statistics.
    Inspect(InspectArgs),
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    #[arg(long)]
    pub table: PathBuf,
    /// Defaults to `geom_permutation.npy` next to the table
    #[arg(long)]
    pub permutation: Option<PathBuf>,
    /// JSON pipeline configuration; flags given on the command line take precedence
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub val: Option<f64>,
    #[arg(long)]
    pub test: Option<f64>,
    /// Keep only molecules with at most this many atoms
    #[arg(long)]
    pub filter_size: Option<usize>,
    #[arg(long)]
    pub batch_size: Option<usize>,
    #[arg(long)]
    pub seed: Option<u64>,
    /// Size-grouped batches instead of padded random batches
    #[arg(long)]
    pub sequential: bool,
    #[arg(long)]
    pub shuffle: bool,
    #[arg(long)]
    pub drop_last: bool,
    #[arg(long)]
    pub include_charges: bool,
    /// The table was extracted with hydrogens
    #[arg(long)]
    pub keep_hydrogens: bool,
    #[arg(long)]
    pub cpu: bool,
}

impl Cli {
    pub fn execute(self) -> anyhow::Result<()> {
        match self.command {
            Commands::Extract {
                archive_dir,
                output_dir,
                conformations,
                keep_hydrogens,
                seed,
            } => commands::extract::execute(
                archive_dir,
                output_dir,
                conformations,
                keep_hydrogens,
                seed,
            ),
            Commands::Permute {
                table,
                output,
                seed,
            } => commands::permute::execute(table, output, seed),
            Commands::Inspect(args) => commands::inspect::execute(args),
        }
    }
}
