//! Batch collation.
//!
//! Stacks per-molecule records into batch arrays, zero-padding the atom dimension of every
//! field to the largest molecule in the batch, and derives the pairwise edge mask.
use crate::transform::MoleculeRecord;
use crate::{Error, Result};
use candle_core::{Device, Tensor, WithDType};
use ndarray::{s, Array, Array2, Array3, ArrayView2, Axis, Dimension};

/// Model-ready batch of `B` molecules padded to `N` atoms.
#[derive(Debug, Clone, PartialEq)]
pub struct MoleculeBatch {
    /// `[B, N, 3]`
    pub positions: Array3<f32>,
    /// `[B, N, K]`
    pub one_hot: Array3<bool>,
    /// `[B, N, 1]`
    pub context: Array3<f32>,
    /// `[B, N, 1]`, or `[B, 0, 1]` when charges are disabled
    pub charges: Array3<f32>,
    /// `[B, N]`, 1 for real atoms and 0 for padding
    pub atom_mask: Array2<f32>,
    /// `[B * N * N, 1]`
    pub edge_mask: Array2<f32>,
}

impl MoleculeBatch {
    pub fn batch_size(&self) -> usize {
        self.atom_mask.nrows()
    }

    pub fn max_atoms(&self) -> usize {
        self.atom_mask.ncols()
    }

    pub fn to_tensors(&self, device: &Device) -> Result<BatchTensors> {
        Ok(BatchTensors {
            positions: to_tensor(&self.positions, device)?,
            one_hot: to_tensor(&self.one_hot.mapv(u8::from), device)?,
            context: to_tensor(&self.context, device)?,
            charges: to_tensor(&self.charges, device)?,
            atom_mask: to_tensor(&self.atom_mask, device)?,
            edge_mask: to_tensor(&self.edge_mask, device)?,
        })
    }
}

/// [`MoleculeBatch`] on a candle device. `one_hot` is `u8`.
#[derive(Debug, Clone)]
pub struct BatchTensors {
    pub positions: Tensor,
    pub one_hot: Tensor,
    pub context: Tensor,
    pub charges: Tensor,
    pub atom_mask: Tensor,
    pub edge_mask: Tensor,
}

fn to_tensor<T, D>(array: &Array<T, D>, device: &Device) -> candle_core::Result<Tensor>
where
    T: WithDType,
    D: Dimension,
{
    let shape = array.shape().to_vec();
    let data: Vec<T> = array.iter().copied().collect();
    Tensor::from_vec(data, shape, device)
}

/// Stack `[n_i, w]` arrays into `[B, max n_i, w]`, padding with `T::default()`.
pub fn stack_padded<T: Clone + Default>(
    field: &'static str,
    items: &[ArrayView2<'_, T>],
) -> Result<Array3<T>> {
    let width = items.first().ok_or(Error::EmptyBatch)?.ncols();
    let max_len = items.iter().map(|a| a.nrows()).max().unwrap_or(0);
    let mut out = Array3::from_elem((items.len(), max_len, width), T::default());
    for (mut slot, item) in out.outer_iter_mut().zip(items) {
        if item.ncols() != width {
            return Err(Error::FeatureWidth {
                field,
                expected: width,
                found: item.ncols(),
            });
        }
        slot.slice_mut(s![..item.nrows(), ..]).assign(item);
    }
    Ok(out)
}

/// Pairwise mask `m_i * m_j` with the diagonal zeroed, flattened to `[B * N * N, 1]`.
pub fn edge_mask_from_atom_mask(atom_mask: ArrayView2<'_, f32>) -> Result<Array2<f32>> {
    let (batch_size, n_nodes) = atom_mask.dim();
    let mut edges = Array3::<f32>::zeros((batch_size, n_nodes, n_nodes));
    for (mut pairs, mask) in edges.outer_iter_mut().zip(atom_mask.outer_iter()) {
        pairs.assign(&Array2::from_shape_fn((n_nodes, n_nodes), |(i, j)| {
            if i == j {
                0.0
            } else {
                mask[i] * mask[j]
            }
        }));
    }
    Ok(edges.into_shape_with_order((batch_size * n_nodes * n_nodes, 1))?)
}

fn field_views<'a, T>(
    records: &'a [MoleculeRecord],
    field: impl Fn(&'a MoleculeRecord) -> &'a Array2<T>,
) -> Vec<ArrayView2<'a, T>> {
    records.iter().map(|r| field(r).view()).collect()
}

/// Collate records into one batch.
///
/// Records from size-grouped batching carry their own edge masks and share one size; those are
/// stacked directly. Otherwise the edge mask is derived from the padded atom mask.
pub fn collate(records: &[MoleculeRecord]) -> Result<MoleculeBatch> {
    if records.is_empty() {
        return Err(Error::EmptyBatch);
    }
    let positions = stack_padded("positions", &field_views(records, |r| &r.positions))?;
    let one_hot = stack_padded("one_hot", &field_views(records, |r| &r.one_hot))?;
    let context = stack_padded("context", &field_views(records, |r| &r.context))?;
    let charges = stack_padded("charges", &field_views(records, |r| &r.charges))?;
    let atom_mask = stack_padded("atom_mask", &field_views(records, |r| &r.atom_mask))?
        .index_axis_move(Axis(2), 0);

    let n_nodes = atom_mask.ncols();
    let own_masks: Option<Vec<&Array2<f32>>> =
        records.iter().map(|r| r.edge_mask.as_ref()).collect();
    let edge_mask = match own_masks {
        Some(masks) if masks.iter().all(|m| m.dim() == (n_nodes, n_nodes)) => {
            let flat: Vec<f32> = masks.iter().flat_map(|m| m.iter().copied()).collect();
            Array2::from_shape_vec((flat.len(), 1), flat)?
        }
        _ => edge_mask_from_atom_mask(atom_mask.view())?,
    };

    Ok(MoleculeBatch {
        positions,
        one_hot,
        context,
        charges,
        atom_mask,
        edge_mask,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::constants::AtomVocabulary;
    use crate::table::MoleculeBlock;
    use crate::transform::{Transform, TransformConfig};
    use ndarray::array;

    fn block(n: usize) -> MoleculeBlock {
        let atoms = Array2::from_shape_fn((n, 8), |(i, j)| match j {
            0 => 6.0,
            1..=3 => (i + 1) as f64,
            _ => 0.5,
        });
        MoleculeBlock::new(n as i64, atoms).unwrap()
    }

    fn records(sizes: &[usize], config: TransformConfig) -> Vec<MoleculeRecord> {
        let transform = Transform::new(AtomVocabulary::default(), config);
        sizes
            .iter()
            .map(|&n| transform.apply(&block(n)).unwrap())
            .collect()
    }

    #[test]
    fn test_stack_padded() {
        let a = array![[1, 2], [3, 4]];
        let b = array![[5, 6]];
        let out = stack_padded("x", &[a.view(), b.view()]).unwrap();
        assert_eq!(out, array![[[1, 2], [3, 4]], [[5, 6], [0, 0]]]);
    }

    #[test]
    fn test_stack_padded_width_mismatch() {
        let a = array![[1.0f32, 2.0]];
        let b = array![[5.0f32]];
        assert!(matches!(
            stack_padded("x", &[a.view(), b.view()]),
            Err(Error::FeatureWidth { field: "x", .. })
        ));
    }

    #[test]
    fn test_collate_pads_to_largest() {
        let batch = collate(&records(&[2, 4, 3], TransformConfig::default())).unwrap();
        assert_eq!(batch.batch_size(), 3);
        assert_eq!(batch.max_atoms(), 4);
        assert_eq!(batch.positions.dim(), (3, 4, 3));
        assert_eq!(batch.one_hot.dim(), (3, 4, 15));
        assert_eq!(batch.context.dim(), (3, 4, 1));
        assert_eq!(batch.charges.dim(), (3, 0, 1));
        assert_eq!(
            batch.atom_mask,
            array![[1.0f32, 1.0, 0.0, 0.0], [1.0, 1.0, 1.0, 1.0], [1.0, 1.0, 1.0, 0.0]]
        );
        // padding rows are zero
        assert_eq!(batch.positions[[0, 2, 0]], 0.0);
        assert!(!batch.one_hot[[0, 3, 1]]);
        assert!(batch.one_hot[[0, 1, 1]]);
        assert_eq!(batch.edge_mask.dim(), (3 * 4 * 4, 1));
    }

    #[test]
    fn test_edge_mask_matches_real_atoms() {
        let batch = collate(&records(&[2, 4, 3], TransformConfig::default())).unwrap();
        let (b, n) = batch.atom_mask.dim();
        let edges = batch.edge_mask.into_shape_with_order((b, n, n)).unwrap();
        for k in 0..b {
            for i in 0..n {
                for j in 0..n {
                    let real = batch.atom_mask[[k, i]] == 1.0 && batch.atom_mask[[k, j]] == 1.0;
                    let expected = if i != j && real { 1.0 } else { 0.0 };
                    assert_eq!(edges[[k, i, j]], expected, "batch {k} pair ({i}, {j})");
                }
            }
        }
    }

    #[test]
    fn test_collate_with_charges() {
        let config = TransformConfig::builder().include_charges(true).build();
        let batch = collate(&records(&[1, 3], config)).unwrap();
        assert_eq!(batch.charges.dim(), (2, 3, 1));
    }

    #[test]
    fn test_sequential_masks_are_stacked() {
        let seq = TransformConfig::builder().sequential(true).build();
        let stacked = collate(&records(&[3, 3], seq)).unwrap();
        let derived = collate(&records(&[3, 3], TransformConfig::default())).unwrap();
        assert_eq!(stacked.edge_mask, derived.edge_mask);
        assert_eq!(stacked.edge_mask.sum(), 12.0);
    }

    #[test]
    fn test_empty_batch() {
        assert!(matches!(collate(&[]), Err(Error::EmptyBatch)));
    }

    #[test]
    fn test_to_tensors() {
        let batch = collate(&records(&[2, 3], TransformConfig::default())).unwrap();
        let tensors = batch.to_tensors(&Device::Cpu).unwrap();
        assert_eq!(tensors.positions.dims(), &[2, 3, 3]);
        assert_eq!(tensors.one_hot.dims(), &[2, 3, 15]);
        assert_eq!(tensors.charges.dims(), &[2, 0, 1]);
        assert_eq!(tensors.edge_mask.dims(), &[18, 1]);
        let mask: Vec<Vec<f32>> = tensors.atom_mask.to_vec2().unwrap();
        assert_eq!(mask, vec![vec![1.0, 1.0, 0.0], vec![1.0, 1.0, 1.0]]);
    }
}
