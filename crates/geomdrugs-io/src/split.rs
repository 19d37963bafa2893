use crate::npy::read_table;
use crate::permutation::load_permutation;
use crate::Result;
use geomdrugs_core::{split_molecules, Split, SplitConfig};
use std::path::Path;

/// Load a saved atom table and its permutation, then split.
pub fn load_and_split(
    table_path: &Path,
    permutation_path: &Path,
    config: &SplitConfig,
) -> Result<Split> {
    let table = read_table(table_path)?;
    let permutation = load_permutation(permutation_path)?;
    let blocks = table.blocks();
    if permutation.len() != blocks.len() {
        log::warn!(
            "permutation has {} entries for {} molecules",
            permutation.len(),
            blocks.len()
        );
    }
    Ok(split_molecules(blocks, &permutation, config)?)
}
