use geomdrugs_core::ExtractConfig;
use geomdrugs_io::{extract_to_dir, ArchiveScorer};
use std::path::PathBuf;

pub fn execute(
    archive_dir: PathBuf,
    output_dir: PathBuf,
    conformations: usize,
    keep_hydrogens: bool,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    let config = ExtractConfig::builder()
        .conformations(conformations)
        .remove_hydrogens(!keep_hydrogens)
        .maybe_seed(seed)
        .build();
    let (extraction, paths) = extract_to_dir(&archive_dir, &output_dir, ArchiveScorer, config)?;
    println!(
        "{} molecules / {} atoms -> {}",
        extraction.num_molecules(),
        extraction.table.num_atoms(),
        paths.table.display()
    );
    Ok(())
}
