//! Output file naming.
//!
//! Artifact names encode the extraction settings, so runs with different settings can share an
//! output directory: `geom_drugs_{no_h_}{k}_random.npy` for the table and
//! `geom_drugs_n_{no_h_}{k}_random_prop.npy` for the atom counts.
use crate::npy::{write_atom_counts, write_table};
use crate::{Error, Result};
use geomdrugs_core::{ExtractConfig, Extraction};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

pub const PERMUTATION_FILE: &str = "geom_permutation.npy";
pub const SMILES_FILE: &str = "geom_drugs_smiles_random.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArtifactNames {
    pub conformations: usize,
    pub remove_hydrogens: bool,
}

impl ArtifactNames {
    pub fn new(config: &ExtractConfig) -> Self {
        Self {
            conformations: config.conformations,
            remove_hydrogens: config.remove_hydrogens,
        }
    }

    fn stem(&self) -> String {
        let hydrogens = if self.remove_hydrogens { "no_h_" } else { "" };
        format!("{}{}_random", hydrogens, self.conformations)
    }

    pub fn table(&self) -> String {
        format!("geom_drugs_{}.npy", self.stem())
    }

    pub fn atom_counts(&self) -> String {
        format!("geom_drugs_n_{}_prop.npy", self.stem())
    }

    pub fn smiles(&self) -> &'static str {
        SMILES_FILE
    }
}

/// The permutation artifact that sits next to `table`.
pub fn permutation_path_for(table: &Path) -> PathBuf {
    table
        .parent()
        .unwrap_or_else(|| Path::new(""))
        .join(PERMUTATION_FILE)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionPaths {
    pub table: PathBuf,
    pub smiles: PathBuf,
    pub atom_counts: PathBuf,
}

/// Write the three extraction artifacts into `dir`, creating it when needed.
pub fn write_extraction(
    dir: &Path,
    names: &ArtifactNames,
    extraction: &Extraction,
) -> Result<ExtractionPaths> {
    fs::create_dir_all(dir).map_err(Error::io(dir))?;
    let paths = ExtractionPaths {
        table: dir.join(names.table()),
        smiles: dir.join(names.smiles()),
        atom_counts: dir.join(names.atom_counts()),
    };

    write_table(&paths.table, &extraction.table)?;
    log::info!("dataset saved to {}", paths.table.display());

    let file = File::create(&paths.smiles).map_err(Error::io(&paths.smiles))?;
    let mut writer = BufWriter::new(file);
    for smiles in &extraction.smiles {
        writeln!(writer, "{}", smiles).map_err(Error::io(&paths.smiles))?;
    }
    writer.flush().map_err(Error::io(&paths.smiles))?;
    log::info!("SMILES list saved to {}", paths.smiles.display());

    write_atom_counts(&paths.atom_counts, &extraction.atom_counts)?;
    log::info!("atom counts saved to {}", paths.atom_counts.display());
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_names() {
        let names = ArtifactNames::new(&ExtractConfig::default());
        assert_eq!(names.table(), "geom_drugs_no_h_4_random.npy");
        assert_eq!(names.atom_counts(), "geom_drugs_n_no_h_4_random_prop.npy");
        assert_eq!(names.smiles(), "geom_drugs_smiles_random.txt");

        let config = ExtractConfig::builder()
            .conformations(30)
            .remove_hydrogens(false)
            .build();
        let names = ArtifactNames::new(&config);
        assert_eq!(names.table(), "geom_drugs_30_random.npy");
        assert_eq!(names.atom_counts(), "geom_drugs_n_30_random_prop.npy");
    }

    #[test]
    fn test_permutation_path_for() {
        assert_eq!(
            permutation_path_for(Path::new("data/geom/geom_drugs_30_random.npy")),
            PathBuf::from("data/geom/geom_permutation.npy")
        );
        assert_eq!(
            permutation_path_for(Path::new("table.npy")),
            PathBuf::from("geom_permutation.npy")
        );
    }
}
