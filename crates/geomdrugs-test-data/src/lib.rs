//! geomdrugs-test-data
//!
//! A module to provide small conformer archives for use in testing.
//!
//! Archives are generated in code and written as pickle files into a temporary directory, the
//! same layout the extractor reads from a GEOM-drugs `rdkit_folder/drugs` dump.
use geomdrugs_core::{Conformer, DrugLikeness, MoleculeArchive};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use tempfile::{Builder, TempDir};

#[derive(Debug)]
/// Test Archive
///
/// Example usage:
///
/// ```ignore
/// // returns (directory, _tempdir_handle).
/// // _handle ensures the directory remains in scope
/// use geomdrugs_test_data::TestArchive;
/// let (archive_dir, _temp) = TestArchive::create_temp_dir(&TestArchive::drugs()).unwrap();
/// ```
pub struct TestArchive {
    filename: &'static str,
    molecule: MoleculeArchive,
}

impl TestArchive {
    /// Methanol, 3 conformers. 2 heavy atoms, 6 with hydrogens.
    pub fn methanol() -> Self {
        Self {
            filename: "CO.pickle",
            molecule: molecule(
                "CO",
                &[6, 8],
                &[3, 1],
                3,
                Some(DrugLikeness {
                    qed: 0.385,
                    logp: -0.392,
                    sas: 1.977,
                }),
            ),
        }
    }

    /// Ethanol, 5 conformers. 3 heavy atoms, 9 with hydrogens.
    pub fn ethanol() -> Self {
        Self {
            filename: "CCO.pickle",
            molecule: molecule(
                "CCO",
                &[6, 6, 8],
                &[3, 2, 1],
                5,
                Some(DrugLikeness {
                    qed: 0.407,
                    logp: -0.001,
                    sas: 1.987,
                }),
            ),
        }
    }

    /// Acetic acid, 6 conformers. 4 heavy atoms, 8 with hydrogens.
    pub fn acetic_acid() -> Self {
        Self {
            filename: "CC(=O)O.pickle",
            molecule: molecule(
                "CC(=O)O",
                &[6, 6, 8, 8],
                &[3, 0, 0, 1],
                6,
                Some(DrugLikeness {
                    qed: 0.429,
                    logp: 0.091,
                    sas: 1.935,
                }),
            ),
        }
    }

    /// Benzene, 2 conformers. 6 heavy atoms, 12 with hydrogens.
    pub fn benzene() -> Self {
        Self {
            filename: "c1ccccc1.pickle",
            molecule: molecule(
                "c1ccccc1",
                &[6; 6],
                &[1; 6],
                2,
                Some(DrugLikeness {
                    qed: 0.443,
                    logp: 1.687,
                    sas: 1.0,
                }),
            ),
        }
    }

    /// Chloroform archive without precomputed scores.
    pub fn unscored() -> Self {
        Self {
            filename: "ClC(Cl)Cl.pickle",
            molecule: molecule("ClC(Cl)Cl", &[17, 6, 17, 17], &[0, 1, 0, 0], 2, None),
        }
    }

    /// The standard fixture set, in the sorted order the extractor visits them.
    ///
    /// With 4 conformations per molecule and hydrogens removed this yields 13 molecules and 46
    /// atoms (110 atoms with hydrogens).
    pub fn drugs() -> Vec<Self> {
        vec![
            Self::acetic_acid(),
            Self::ethanol(),
            Self::methanol(),
            Self::benzene(),
        ]
    }

    pub fn filename(&self) -> &str {
        self.filename
    }

    pub fn molecule(&self) -> &MoleculeArchive {
        &self.molecule
    }

    /// Write `archives` into a fresh temporary directory, plus one file that is not an archive.
    pub fn create_temp_dir(archives: &[Self]) -> std::io::Result<(PathBuf, TempDir)> {
        let temp = Builder::new().prefix("geom-drugs").tempdir()?;
        for archive in archives {
            let file = File::create(temp.path().join(archive.filename))?;
            let mut writer = BufWriter::new(file);
            serde_pickle::to_writer(&mut writer, &archive.molecule, serde_pickle::SerOptions::new())
                .map_err(std::io::Error::other)?;
        }
        fs::write(temp.path().join("summary_drugs.json"), b"{}")?;
        let path = temp.path().to_path_buf();
        Ok((path, temp))
    }
}

/// Heavy atoms on a zigzag chain with their hydrogens fanned around them. Each conformer is
/// rotated a little further about the chain axis and gets a distinct energy.
fn molecule(
    smiles: &str,
    heavy: &[u32],
    hydrogens: &[usize],
    n_conformers: usize,
    properties: Option<DrugLikeness>,
) -> MoleculeArchive {
    let conformers = (0..n_conformers)
        .map(|c| {
            let twist = 0.3 * c as f64;
            let mut atomic_numbers = Vec::new();
            let mut positions = Vec::new();
            for (i, &z) in heavy.iter().enumerate() {
                let x = 1.5 * i as f64;
                let y = if i % 2 == 0 { 0.0 } else { 0.8 };
                atomic_numbers.push(z);
                positions.push([x, y * twist.cos(), y * twist.sin()]);
            }
            for (i, &n_h) in hydrogens.iter().enumerate() {
                for h in 0..n_h {
                    let angle = twist + h as f64 * 2.1;
                    atomic_numbers.push(1);
                    positions.push([1.5 * i as f64 + 0.3, angle.cos(), angle.sin()]);
                }
            }
            Conformer {
                atomic_numbers,
                positions,
                total_energy: -10.0 - c as f64 * 0.25,
            }
        })
        .collect();
    MoleculeArchive {
        smiles: smiles.to_string(),
        conformers,
        properties,
    }
}
