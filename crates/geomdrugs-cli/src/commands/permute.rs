use geomdrugs_io::{create_permutation, permutation_path_for, read_table};
use std::path::PathBuf;

pub fn execute(table: PathBuf, output: Option<PathBuf>, seed: u64) -> anyhow::Result<()> {
    let output = output.unwrap_or_else(|| permutation_path_for(&table));
    let n_molecules = read_table(&table)?.blocks().len();
    create_permutation(&output, n_molecules, seed)?;
    println!("{} molecules -> {}", n_molecules, output.display());
    Ok(())
}
