//! Per-molecule featurization.
//!
//! [`Transform::apply`] is a pure function of the molecule block, the atom vocabulary and the
//! configuration, so items can be featurized on any thread in any order.
use crate::info::constants::AtomVocabulary;
use crate::properties::Property;
use crate::table::MoleculeBlock;
use crate::{Error, Result};
use bon::Builder;
use ndarray::{s, Array2};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Builder, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Emit an `n x 1` zero charge channel instead of an empty placeholder.
    #[builder(default)]
    #[serde(default)]
    pub include_charges: bool,
    /// Size-grouped batching: also emit the per-molecule edge mask.
    #[builder(default)]
    #[serde(default)]
    pub sequential: bool,
    /// Property used as the conditioning signal.
    #[builder(default)]
    #[serde(default)]
    pub context: Property,
}

/// Features of a single molecule with `n` atoms.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeRecord {
    /// `[n, 3]`
    pub positions: Array2<f32>,
    /// `[n, K]`, one column per vocabulary entry
    pub one_hot: Array2<bool>,
    /// `[n, 1]`
    pub context: Array2<f32>,
    /// `[n, 1]` zeros, or `[0, 1]` when charges are disabled
    pub charges: Array2<f32>,
    /// `[n, 1]` ones
    pub atom_mask: Array2<f32>,
    /// `[n, n]`, ones off the diagonal; only in sequential mode
    pub edge_mask: Option<Array2<f32>>,
}

impl MoleculeRecord {
    pub fn num_atoms(&self) -> usize {
        self.positions.nrows()
    }
}

#[derive(Debug, Clone, Builder)]
pub struct Transform {
    #[builder(default)]
    vocabulary: AtomVocabulary,
    #[builder(default)]
    config: TransformConfig,
}

impl Transform {
    pub fn new(vocabulary: AtomVocabulary, config: TransformConfig) -> Self {
        Self { vocabulary, config }
    }

    pub fn vocabulary(&self) -> &AtomVocabulary {
        &self.vocabulary
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    pub fn apply(&self, block: &MoleculeBlock) -> Result<MoleculeRecord> {
        let n = block.num_atoms();
        let atoms = block.atoms();

        let positions = block.positions().mapv(|v| v as f32);

        // an atomic number outside the vocabulary leaves its row all-false
        let mut one_hot = Array2::from_elem((n, self.vocabulary.len()), false);
        for (mut row, &z) in one_hot.outer_iter_mut().zip(block.atomic_numbers()) {
            if let Some(col) = self.vocabulary.position(z as u32) {
                row[col] = true;
            }
        }

        let column = self.config.context.block_column();
        if column >= atoms.ncols() {
            return Err(Error::FeatureWidth {
                field: "context",
                expected: column + 1,
                found: atoms.ncols(),
            });
        }
        let context = atoms.slice(s![.., column..column + 1]).mapv(|v| v as f32);

        let charges = if self.config.include_charges {
            Array2::zeros((n, 1))
        } else {
            Array2::zeros((0, 1))
        };

        let edge_mask = self
            .config
            .sequential
            .then(|| Array2::from_shape_fn((n, n), |(i, j)| if i == j { 0.0 } else { 1.0 }));

        Ok(MoleculeRecord {
            positions,
            one_hot,
            context,
            charges,
            atom_mask: Array2::ones((n, 1)),
            edge_mask,
        })
    }
}
