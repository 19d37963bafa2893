//! Conformer extraction.
//!
//! Turns conformer archives into the flat atom table. For every archive a random subset of its
//! conformers is kept; each kept conformer becomes one molecule with its own id, its atoms as
//! `(atomic_number, x, y, z)` rows, and its property vector broadcast onto every row.
use crate::archive::{Conformer, MoleculeArchive};
use crate::properties::PropertyScorer;
use crate::table::{AtomTable, MoleculeBlock};
use crate::Result;
use bon::Builder;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

const HYDROGEN: u32 = 1;

/// What to do with files in an archive directory that are not conformer archives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnrecognizedFiles {
    /// Ignore them without reporting an error.
    #[default]
    Skip,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Maximum number of conformers kept per molecule.
    #[builder(default = 4)]
    pub conformations: usize,
    #[builder(default = true)]
    pub remove_hydrogens: bool,
    /// Seed for conformer selection; entropy when absent.
    pub seed: Option<u64>,
    #[builder(default)]
    pub unrecognized_files: UnrecognizedFiles,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Output of an extraction run.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub table: AtomTable,
    /// One SMILES per source molecule, whatever the number of conformers it yielded.
    pub smiles: Vec<String>,
    /// Atom count of every emitted molecule, in molecule-id order.
    pub atom_counts: Vec<usize>,
}

impl Extraction {
    pub fn num_molecules(&self) -> usize {
        self.atom_counts.len()
    }

    pub fn mean_atoms_per_molecule(&self) -> f64 {
        self.table.num_atoms() as f64 / self.num_molecules() as f64
    }
}

/// Accumulates molecule blocks archive by archive.
///
/// ```ignore
/// let mut extractor = ConformerExtractor::new(scorer, ExtractConfig::default());
/// for archive in archives {
///     extractor.push(&archive)?;
/// }
/// let extraction = extractor.finish()?;
/// ```
pub struct ConformerExtractor<S> {
    scorer: S,
    config: ExtractConfig,
    rng: StdRng,
    blocks: Vec<MoleculeBlock>,
    smiles: Vec<String>,
    next_id: i64,
}

impl<S: PropertyScorer> ConformerExtractor<S> {
    pub fn new(scorer: S, config: ExtractConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            scorer,
            config,
            rng,
            blocks: Vec::new(),
            smiles: Vec::new(),
            next_id: 0,
        }
    }

    pub fn config(&self) -> &ExtractConfig {
        &self.config
    }

    /// Uniformly random subset of conformer indices, at most `conformations` long.
    ///
    /// The energy ranking is computed but does not take part in the selection.
    pub fn select_conformers(&mut self, molecule: &MoleculeArchive) -> Vec<usize> {
        let ranking = molecule.energy_ranking();
        log::trace!(
            "{}: lowest-energy conformer {:?} (unused for selection)",
            molecule.smiles,
            ranking.first()
        );

        let mut selected: Vec<usize> = (0..molecule.conformers.len()).collect();
        selected.shuffle(&mut self.rng);
        selected.truncate(self.config.conformations);
        selected
    }

    /// Add every selected conformer of one archive. Returns the number of molecules emitted.
    pub fn push(&mut self, molecule: &MoleculeArchive) -> Result<usize> {
        self.smiles.push(molecule.smiles.clone());

        let mut emitted = 0;
        for idx in self.select_conformers(molecule) {
            let conformer = &molecule.conformers[idx];
            conformer.validate()?;
            let properties = self.scorer.properties(molecule, conformer)?.to_vec();

            let atoms = flatten_conformer(conformer, &properties, self.config.remove_hydrogens)?;
            if atoms.nrows() == 0 {
                log::warn!(
                    "{}: conformer {} has no atoms left, skipping",
                    molecule.smiles,
                    idx
                );
                continue;
            }
            self.blocks.push(MoleculeBlock::new(self.next_id, atoms)?);
            self.next_id += 1;
            emitted += 1;
        }
        log::debug!("{}: {} conformers kept", molecule.smiles, emitted);
        Ok(emitted)
    }

    /// Concatenate everything pushed so far into the atom table.
    pub fn finish(self) -> Result<Extraction> {
        let table = AtomTable::from_blocks(&self.blocks)?;
        let atom_counts = self.blocks.iter().map(MoleculeBlock::num_atoms).collect();
        let extraction = Extraction {
            table,
            smiles: self.smiles,
            atom_counts,
        };
        log::info!(
            "Total number of conformers saved {}",
            extraction.num_molecules()
        );
        log::info!(
            "Total number of atoms in the dataset {}",
            extraction.table.num_atoms()
        );
        log::info!(
            "Average number of atoms per molecule {:.2}",
            extraction.mean_atoms_per_molecule()
        );
        Ok(extraction)
    }

    pub fn extract<'a, I>(mut self, molecules: I) -> Result<Extraction>
    where
        I: IntoIterator<Item = &'a MoleculeArchive>,
    {
        for molecule in molecules {
            self.push(molecule)?;
        }
        self.finish()
    }
}

/// `[n, 4 + k]` rows of `(atomic_number, x, y, z, properties..)`, hydrogens dropped on request.
fn flatten_conformer(
    conformer: &Conformer,
    properties: &[f64],
    remove_hydrogens: bool,
) -> Result<Array2<f64>> {
    let width = 4 + properties.len();
    let rows: Vec<f64> = conformer
        .iter_atoms()
        .filter(|(z, _)| !(remove_hydrogens && *z == HYDROGEN))
        .flat_map(|(z, [x, y, zc])| {
            [z as f64, *x, *y, *zc]
                .into_iter()
                .chain(properties.iter().copied())
        })
        .collect();
    let n = rows.len() / width;
    Ok(Array2::from_shape_vec((n, width), rows)?)
}
