//! # geomdrugs-io
//!
//! Filesystem side of the GEOM-drugs pipeline.
//!
//! __geomdrugs-io__ provides functionality for:
//! * Listing and reading pickled conformer archives
//! * Writing the atom table, SMILES list and atom counts as numbered artifacts
//! * Creating the split permutation once and loading it read-only afterwards
//! * Loading a saved table and splitting it in one call
//!
mod archive;
mod artifacts;
mod error;
mod extract;
mod npy;
mod permutation;
mod scorer;
mod split;

pub use self::archive::{is_archive, list_archives, read_archive, write_archive};
pub use self::artifacts::{
    permutation_path_for, write_extraction, ArtifactNames, ExtractionPaths, PERMUTATION_FILE,
    SMILES_FILE,
};
pub use self::error::{Error, Result};
pub use self::extract::{extract_directory, extract_to_dir};
pub use self::npy::{read_atom_counts, read_table, write_atom_counts, write_table};
pub use self::permutation::{create_permutation, load_permutation};
pub use self::scorer::ArchiveScorer;
pub use self::split::load_and_split;
