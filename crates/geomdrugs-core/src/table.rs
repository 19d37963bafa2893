//! Flat atom table and molecule blocks.
//!
//! The table is the on-disk representation: one row per atom,
//! `[molecule_id, atomic_number, x, y, z, property_1..property_k]`, molecules stored as
//! contiguous runs of rows. A [`MoleculeBlock`] is one such run with the id column stripped.
use crate::{Error, Result};
use itertools::Itertools;
use ndarray::{concatenate, s, Array2, ArrayView1, ArrayView2, Axis};
use std::iter::once;

/// `molecule_id, atomic_number, x, y, z`
pub const TABLE_FIXED_COLUMNS: usize = 5;
/// `atomic_number, x, y, z`
pub const BLOCK_FIXED_COLUMNS: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeBlock {
    molecule_id: i64,
    atoms: Array2<f64>,
}

impl MoleculeBlock {
    pub fn new(molecule_id: i64, atoms: Array2<f64>) -> Result<Self> {
        if atoms.ncols() < BLOCK_FIXED_COLUMNS {
            return Err(Error::TableColumns {
                expected: BLOCK_FIXED_COLUMNS,
                found: atoms.ncols(),
            });
        }
        Ok(Self { molecule_id, atoms })
    }

    pub fn molecule_id(&self) -> i64 {
        self.molecule_id
    }

    pub fn num_atoms(&self) -> usize {
        self.atoms.nrows()
    }

    pub fn num_properties(&self) -> usize {
        self.atoms.ncols() - BLOCK_FIXED_COLUMNS
    }

    pub fn atoms(&self) -> ArrayView2<'_, f64> {
        self.atoms.view()
    }

    pub fn atomic_numbers(&self) -> ArrayView1<'_, f64> {
        self.atoms.column(0)
    }

    /// `[n, 3]` coordinates.
    pub fn positions(&self) -> ArrayView2<'_, f64> {
        self.atoms.slice(s![.., 1..BLOCK_FIXED_COLUMNS])
    }

    /// `[n, k]` per-atom copies of the molecule's property vector.
    pub fn properties(&self) -> ArrayView2<'_, f64> {
        self.atoms.slice(s![.., BLOCK_FIXED_COLUMNS..])
    }

    /// True when every atom row carries the same property vector.
    pub fn has_uniform_properties(&self) -> bool {
        let props = self.properties();
        props
            .outer_iter()
            .tuple_windows()
            .all(|(a, b)| a == b)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtomTable {
    data: Array2<f64>,
}

impl AtomTable {
    pub fn from_array(data: Array2<f64>) -> Result<Self> {
        if data.ncols() < TABLE_FIXED_COLUMNS {
            return Err(Error::TableColumns {
                expected: TABLE_FIXED_COLUMNS,
                found: data.ncols(),
            });
        }
        if data.nrows() == 0 {
            return Err(Error::EmptyDataset);
        }
        Ok(Self { data })
    }

    /// Concatenate blocks in order, writing each block's id into the leading column.
    ///
    /// Fails with [`Error::EmptyDataset`] when there is nothing to concatenate.
    pub fn from_blocks(blocks: &[MoleculeBlock]) -> Result<Self> {
        let first = blocks.first().ok_or(Error::EmptyDataset)?;
        let width = first.atoms.ncols();
        let parts = blocks
            .iter()
            .map(|block| {
                if block.atoms.ncols() != width {
                    return Err(Error::PropertyColumns {
                        molecule_id: block.molecule_id,
                        expected: width - BLOCK_FIXED_COLUMNS,
                        found: block.num_properties(),
                    });
                }
                let mut rows = Array2::zeros((block.num_atoms(), width + 1));
                rows.column_mut(0).fill(block.molecule_id as f64);
                rows.slice_mut(s![.., 1..]).assign(&block.atoms);
                Ok(rows)
            })
            .collect::<Result<Vec<_>>>()?;
        let views: Vec<_> = parts.iter().map(|p| p.view()).collect();
        Self::from_array(concatenate(Axis(0), &views)?)
    }

    pub fn as_array(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn into_array(self) -> Array2<f64> {
        self.data
    }

    pub fn num_atoms(&self) -> usize {
        self.data.nrows()
    }

    pub fn num_properties(&self) -> usize {
        self.data.ncols() - TABLE_FIXED_COLUMNS
    }

    pub fn molecule_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.data.column(0).into_iter().map(|&id| id as i64)
    }

    /// Row positions where the molecule id differs from the previous row.
    pub fn boundaries(&self) -> Vec<usize> {
        self.molecule_ids()
            .tuple_windows()
            .positions(|(a, b)| a != b)
            .map(|p| p + 1)
            .collect()
    }

    /// Regroup rows into molecule blocks by id-change detection.
    ///
    /// Rows of one molecule must already be contiguous; two runs that share an id but are
    /// separated by another molecule come back as two blocks.
    pub fn blocks(&self) -> Vec<MoleculeBlock> {
        let boundaries = self.boundaries();
        let starts = once(0).chain(boundaries.iter().copied());
        let ends = boundaries.iter().copied().chain(once(self.num_atoms()));
        starts
            .zip(ends)
            .map(|(start, end)| MoleculeBlock {
                molecule_id: self.data[[start, 0]] as i64,
                atoms: self.data.slice(s![start..end, 1..]).to_owned(),
            })
            .collect()
    }

    /// Number of atoms of each molecule, in table order.
    pub fn atom_counts(&self) -> Vec<usize> {
        self.blocks().iter().map(MoleculeBlock::num_atoms).collect()
    }
}
