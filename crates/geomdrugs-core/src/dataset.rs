use crate::table::MoleculeBlock;
use crate::transform::{MoleculeRecord, Transform};
use crate::{Error, Result};
use itertools::Itertools;

/// Molecules of one split, sorted by atom count.
///
/// `size_boundaries` holds every sorted position whose atom count differs from the one before
/// it; position `0` is never a boundary.
#[derive(Debug, Clone)]
pub struct MoleculeDataset {
    blocks: Vec<MoleculeBlock>,
    size_boundaries: Vec<usize>,
    transform: Option<Transform>,
}

impl MoleculeDataset {
    pub fn new(mut blocks: Vec<MoleculeBlock>) -> Self {
        // stable: equal-sized molecules keep their split order
        blocks.sort_by_key(MoleculeBlock::num_atoms);
        let size_boundaries = blocks
            .iter()
            .map(MoleculeBlock::num_atoms)
            .tuple_windows()
            .positions(|(a, b)| a != b)
            .map(|p| p + 1)
            .collect();
        Self {
            blocks,
            size_boundaries,
            transform: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn transform(&self) -> Option<&Transform> {
        self.transform.as_ref()
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn size_boundaries(&self) -> &[usize] {
        &self.size_boundaries
    }

    pub fn is_size_boundary(&self, idx: usize) -> bool {
        self.size_boundaries.binary_search(&idx).is_ok()
    }

    /// Atom counts in sorted order.
    pub fn sizes(&self) -> impl Iterator<Item = usize> + '_ {
        self.blocks.iter().map(MoleculeBlock::num_atoms)
    }

    pub fn get(&self, idx: usize) -> Result<&MoleculeBlock> {
        self.blocks.get(idx).ok_or(Error::IndexOutOfBounds {
            index: idx,
            len: self.blocks.len(),
        })
    }

    /// The molecule at `idx` passed through the dataset's transform.
    pub fn record(&self, idx: usize) -> Result<MoleculeRecord> {
        let transform = self.transform.as_ref().ok_or(Error::MissingTransform)?;
        transform.apply(self.get(idx)?)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MoleculeBlock> {
        self.blocks.iter()
    }
}
