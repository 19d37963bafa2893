//! Per-molecule scalar properties.
//!
//! Properties are computed once per selected conformer and broadcast to every atom row of that
//! molecule, in [`Property`] order.
use crate::archive::{Conformer, MoleculeArchive};
use crate::table::BLOCK_FIXED_COLUMNS;
use crate::Result;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Display,
    EnumString,
    EnumIter,
    EnumCount,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Property {
    /// Quantitative estimate of drug-likeness
    Qed = 0,
    /// Octanol-water partition coefficient
    #[default]
    #[strum(serialize = "logp")]
    #[serde(rename = "logp")]
    LogP = 1,
    /// Synthetic accessibility
    Sas = 2,
    Asphericity = 3,
}

impl Property {
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Column of this property inside a molecule block.
    pub fn block_column(&self) -> usize {
        BLOCK_FIXED_COLUMNS + self.index()
    }
}

/// 2D scores of a molecular graph.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrugLikeness {
    pub qed: f64,
    pub logp: f64,
    pub sas: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MolecularProperties {
    pub qed: f64,
    pub logp: f64,
    pub sas: f64,
    pub asphericity: f64,
}

impl MolecularProperties {
    pub fn new(scores: DrugLikeness, asphericity: f64) -> Self {
        Self {
            qed: scores.qed,
            logp: scores.logp,
            sas: scores.sas,
            asphericity,
        }
    }

    pub fn to_vec(&self) -> Vec<f64> {
        vec![self.qed, self.logp, self.sas, self.asphericity]
    }
}

/// Pluggable property calculator.
///
/// `score` sees the 2D molecule (the archive record with its SMILES), `score_3d` a single
/// conformer.
pub trait PropertyScorer {
    fn score(&self, molecule: &MoleculeArchive) -> Result<DrugLikeness>;

    fn score_3d(&self, conformer: &Conformer) -> Result<f64>;

    fn properties(
        &self,
        molecule: &MoleculeArchive,
        conformer: &Conformer,
    ) -> Result<MolecularProperties> {
        Ok(MolecularProperties::new(
            self.score(molecule)?,
            self.score_3d(conformer)?,
        ))
    }
}

impl<S: PropertyScorer + ?Sized> PropertyScorer for &S {
    fn score(&self, molecule: &MoleculeArchive) -> Result<DrugLikeness> {
        (**self).score(molecule)
    }

    fn score_3d(&self, conformer: &Conformer) -> Result<f64> {
        (**self).score_3d(conformer)
    }
}

/// Asphericity of a point cloud with every point weighted equally.
pub fn asphericity(positions: &[[f64; 3]]) -> f64 {
    weighted_asphericity(positions, &vec![1.0; positions.len()])
}

/// Asphericity of a point cloud from its weighted gyration tensor.
///
/// With gyration eigenvalues `l1..l3` this is
/// `0.5 * sum_{i<j} (li - lj)^2 / sum li^2`, computed from `tr(G)` and `tr(G^2)` so no
/// eigendecomposition is needed. Weighting atoms by their masses reproduces RDKit's
/// `Descriptors3D.Asphericity`. `weights` pairs with `positions`; extra entries on either side
/// are ignored. Degenerate geometries (one atom, coincident atoms, zero total weight) give `0`.
pub fn weighted_asphericity(positions: &[[f64; 3]], weights: &[f64]) -> f64 {
    let total: f64 = weights.iter().take(positions.len()).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let mut center = [0.0f64; 3];
    for (p, w) in positions.iter().zip(weights) {
        for k in 0..3 {
            center[k] += w * p[k] / total;
        }
    }

    let mut gyration = [[0.0f64; 3]; 3];
    for (p, w) in positions.iter().zip(weights) {
        let d = [p[0] - center[0], p[1] - center[1], p[2] - center[2]];
        for a in 0..3 {
            for b in 0..3 {
                gyration[a][b] += w * d[a] * d[b] / total;
            }
        }
    }

    let trace: f64 = (0..3).map(|a| gyration[a][a]).sum();
    let trace_sq: f64 = gyration.iter().flatten().map(|g| g * g).sum();
    if trace_sq <= f64::EPSILON {
        return 0.0;
    }
    0.5 * (3.0 * trace_sq - trace * trace) / trace_sq
}
