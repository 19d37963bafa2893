//! Batch samplers.
//!
//! Both strategies only decide batch membership; turning indices into features is left to the
//! dataset's transform and [`crate::collate`].
//!
//! - [`SizeGroupedSampler`]: walks the size-sorted dataset in order and cuts a batch whenever it
//!   is full or the next molecule has a different size. Every batch is size-homogeneous.
//! - [`RandomBatchSampler`]: fixed-size batches over shuffled (or in-order) indices, sizes mixed;
//!   the collate step pads them.
use crate::dataset::MoleculeDataset;
use crate::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Produces a sequence of index batches.
pub trait BatchSampler {
    fn batches(&mut self) -> Box<dyn Iterator<Item = Vec<usize>> + '_>;

    /// Number of batches `batches` yields.
    fn num_batches(&self) -> usize;

    /// Whether every batch is guaranteed to hold molecules of a single size.
    fn uniform_sizes(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone)]
pub struct SizeGroupedSampler {
    len: usize,
    size_boundaries: Vec<usize>,
    batch_size: usize,
    drop_last: bool,
}

impl SizeGroupedSampler {
    pub fn new(dataset: &MoleculeDataset, batch_size: usize, drop_last: bool) -> Result<Self> {
        Self::from_boundaries(
            dataset.len(),
            dataset.size_boundaries().to_vec(),
            batch_size,
            drop_last,
        )
    }

    /// `size_boundaries` must be sorted ascending.
    pub fn from_boundaries(
        len: usize,
        size_boundaries: Vec<usize>,
        batch_size: usize,
        drop_last: bool,
    ) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::ZeroBatchSize);
        }
        Ok(Self {
            len,
            size_boundaries,
            batch_size,
            drop_last,
        })
    }

    fn is_boundary(&self, idx: usize) -> bool {
        self.size_boundaries.binary_search(&idx).is_ok()
    }

    pub fn iter(&self) -> SizeGroupedBatches<'_> {
        SizeGroupedBatches {
            sampler: self,
            next: 0,
        }
    }
}

impl BatchSampler for SizeGroupedSampler {
    fn batches(&mut self) -> Box<dyn Iterator<Item = Vec<usize>> + '_> {
        Box::new(self.iter())
    }

    fn num_batches(&self) -> usize {
        // same cut rule as `SizeGroupedBatches::next`, counted instead of collected
        let mut count = 0;
        let mut filled = 0;
        for idx in 0..self.len {
            filled += 1;
            if filled == self.batch_size || self.is_boundary(idx + 1) {
                count += 1;
                filled = 0;
            }
        }
        if filled > 0 && !self.drop_last {
            count += 1;
        }
        count
    }

    fn uniform_sizes(&self) -> bool {
        true
    }
}

/// Lazy iterator over size-homogeneous batches.
pub struct SizeGroupedBatches<'a> {
    sampler: &'a SizeGroupedSampler,
    next: usize,
}

impl Iterator for SizeGroupedBatches<'_> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut batch = Vec::with_capacity(self.sampler.batch_size);
        while self.next < self.sampler.len {
            let idx = self.next;
            self.next += 1;
            batch.push(idx);
            if batch.len() == self.sampler.batch_size || self.sampler.is_boundary(idx + 1) {
                return Some(batch);
            }
        }
        // only the trailing remainder is subject to drop_last
        if !batch.is_empty() && !self.sampler.drop_last {
            Some(batch)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct RandomBatchSampler {
    len: usize,
    batch_size: usize,
    shuffle: bool,
    drop_last: bool,
    rng: StdRng,
}

impl RandomBatchSampler {
    pub fn new(
        len: usize,
        batch_size: usize,
        shuffle: bool,
        drop_last: bool,
        seed: Option<u64>,
    ) -> Result<Self> {
        if batch_size == 0 {
            return Err(Error::ZeroBatchSize);
        }
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            len,
            batch_size,
            shuffle,
            drop_last,
            rng,
        })
    }
}

impl BatchSampler for RandomBatchSampler {
    fn batches(&mut self) -> Box<dyn Iterator<Item = Vec<usize>> + '_> {
        let mut order: Vec<usize> = (0..self.len).collect();
        if self.shuffle {
            order.shuffle(&mut self.rng);
        }
        let batch_size = self.batch_size;
        let n_batches = self.num_batches();
        Box::new((0..n_batches).map(move |b| {
            let end = ((b + 1) * batch_size).min(order.len());
            order[b * batch_size..end].to_vec()
        }))
    }

    fn num_batches(&self) -> usize {
        if self.drop_last {
            self.len / self.batch_size
        } else {
            self.len.div_ceil(self.batch_size)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::MoleculeBlock;
    use ndarray::Array2;
    use std::collections::HashSet;

    fn dataset(sizes: &[usize]) -> MoleculeDataset {
        let blocks = sizes
            .iter()
            .enumerate()
            .map(|(id, &n)| MoleculeBlock::new(id as i64, Array2::zeros((n, 8))).unwrap())
            .collect();
        MoleculeDataset::new(blocks)
    }

    #[test]
    fn test_size_grouped_scenario() {
        let ds = dataset(&[3, 5, 3, 7, 5, 3, 5, 7, 3, 5]);
        let mut sampler = SizeGroupedSampler::new(&ds, 3, false).unwrap();
        let batches: Vec<Vec<usize>> = sampler.batches().collect();
        assert_eq!(
            batches,
            vec![vec![0, 1, 2], vec![3], vec![4, 5, 6], vec![7], vec![8, 9]]
        );
        assert_eq!(sampler.num_batches(), 5);
        assert!(sampler.uniform_sizes());
    }

    #[test]
    fn test_size_grouped_batches_are_homogeneous() {
        let ds = dataset(&[4, 1, 1, 6, 4, 4, 2, 6, 6, 6, 1, 2, 4]);
        for batch_size in 1..6 {
            let sampler = SizeGroupedSampler::new(&ds, batch_size, false).unwrap();
            let mut seen = 0;
            for batch in sampler.iter() {
                let sizes: HashSet<usize> =
                    batch.iter().map(|&i| ds.get(i).unwrap().num_atoms()).collect();
                assert_eq!(sizes.len(), 1);
                assert!(batch.len() <= batch_size);
                seen += batch.len();
            }
            assert_eq!(seen, ds.len());
            assert_eq!(sampler.iter().count(), sampler.num_batches());
        }
    }

    #[test]
    fn test_size_grouped_drop_last() {
        let ds = dataset(&[3, 5, 3, 7, 5, 3, 5, 7, 3, 5]);
        let mut sampler = SizeGroupedSampler::new(&ds, 3, true).unwrap();
        let batches: Vec<Vec<usize>> = sampler.batches().collect();
        // boundary-cut batches survive, only the final remainder is dropped
        assert_eq!(batches, vec![vec![0, 1, 2], vec![3], vec![4, 5, 6], vec![7]]);
        assert_eq!(sampler.num_batches(), 4);
    }

    #[test]
    fn test_size_grouped_exact_fill() {
        let sampler = SizeGroupedSampler::from_boundaries(6, vec![3], 3, true).unwrap();
        let batches: Vec<Vec<usize>> = sampler.iter().collect();
        assert_eq!(batches, vec![vec![0, 1, 2], vec![3, 4, 5]]);
        assert_eq!(sampler.num_batches(), 2);
    }

    #[test]
    fn test_zero_batch_size() {
        assert!(matches!(
            SizeGroupedSampler::from_boundaries(3, vec![], 0, false),
            Err(Error::ZeroBatchSize)
        ));
        assert!(RandomBatchSampler::new(3, 0, true, false, None).is_err());
    }

    #[test]
    fn test_random_sampler_covers_everything() {
        let mut sampler = RandomBatchSampler::new(10, 4, true, false, Some(3)).unwrap();
        let batches: Vec<Vec<usize>> = sampler.batches().collect();
        assert_eq!(batches.len(), 3);
        assert_eq!(sampler.num_batches(), 3);
        assert_eq!(batches[2].len(), 2);
        let mut all: Vec<usize> = batches.concat();
        all.sort();
        assert_eq!(all, (0..10).collect::<Vec<_>>());
        assert!(!sampler.uniform_sizes());
    }

    #[test]
    fn test_random_sampler_in_order_drop_last() {
        let mut sampler = RandomBatchSampler::new(10, 4, false, true, None).unwrap();
        let batches: Vec<Vec<usize>> = sampler.batches().collect();
        assert_eq!(batches, vec![vec![0, 1, 2, 3], vec![4, 5, 6, 7]]);
        assert_eq!(sampler.num_batches(), 2);
    }

    #[test]
    fn test_random_sampler_reshuffles_each_epoch() {
        let mut sampler = RandomBatchSampler::new(64, 64, true, false, Some(9)).unwrap();
        let first: Vec<Vec<usize>> = sampler.batches().collect();
        let second: Vec<Vec<usize>> = sampler.batches().collect();
        assert_ne!(first, second);
    }
}
