//! Conformer archive records.
//!
//! One archive holds one source molecule: its canonical SMILES and every conformer generated for
//! it. Parsing the on-disk container is left to the caller; these types are what it must produce.

use crate::properties::DrugLikeness;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoleculeArchive {
    pub smiles: String,
    pub conformers: Vec<Conformer>,
    /// 2D scores computed upstream, if the archive carries them.
    #[serde(default)]
    pub properties: Option<DrugLikeness>,
}

/// One 3D arrangement of a molecule's atoms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conformer {
    pub atomic_numbers: Vec<u32>,
    pub positions: Vec<[f64; 3]>,
    #[serde(rename = "totalenergy")]
    pub total_energy: f64,
}

impl Conformer {
    pub fn num_atoms(&self) -> usize {
        self.atomic_numbers.len()
    }

    pub fn validate(&self) -> Result<()> {
        if self.atomic_numbers.len() != self.positions.len() {
            return Err(Error::MalformedConformer {
                atoms: self.atomic_numbers.len(),
                positions: self.positions.len(),
            });
        }
        Ok(())
    }

    /// Atoms as `(atomic_number, [x, y, z])` pairs.
    pub fn iter_atoms(&self) -> impl Iterator<Item = (u32, &[f64; 3])> + '_ {
        self.atomic_numbers
            .iter()
            .copied()
            .zip(self.positions.iter())
    }
}

impl MoleculeArchive {
    /// Conformer indices ordered by ascending total energy.
    pub fn energy_ranking(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.conformers.len()).collect();
        order.sort_by(|&a, &b| {
            self.conformers[a]
                .total_energy
                .total_cmp(&self.conformers[b].total_energy)
        });
        order
    }
}
