//! Permutation-based train/val/test splitting.
//!
//! The permutation is external state: it is generated once (see [`Permutation::generate`]),
//! persisted next to the dataset, and reused for every later split so that the partition of
//! molecules stays fixed across runs.
use crate::table::{AtomTable, MoleculeBlock};
use crate::{Error, Result};
use bon::Builder;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PERMUTATION_SEED: u64 = 2022;

/// What to do with permutation entries that point past the current molecule count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PermutationOverflow {
    /// Drop them, so a permutation built for a slightly larger dataset still applies.
    #[default]
    Truncate,
    Reject,
}

/// Ordering of molecule indices: split position -> original molecule index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    indices: Vec<i64>,
}

impl Permutation {
    pub fn new(indices: Vec<i64>) -> Self {
        Self { indices }
    }

    /// Uniform random permutation of `0..n`.
    pub fn generate(n: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut indices: Vec<i64> = (0..n as i64).collect();
        indices.shuffle(&mut rng);
        Self { indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &[i64] {
        &self.indices
    }

    /// Reorder `items` by the permutation.
    pub fn apply<T: Clone>(&self, items: &[T], overflow: PermutationOverflow) -> Result<Vec<T>> {
        let n = items.len();
        let mut out = Vec::with_capacity(n.min(self.indices.len()));
        for &entry in &self.indices {
            match usize::try_from(entry) {
                Ok(idx) if idx < n => out.push(items[idx].clone()),
                Ok(_) if overflow == PermutationOverflow::Truncate => {}
                _ => {
                    return Err(Error::PermutationOutOfRange {
                        entry,
                        n_molecules: n,
                    })
                }
            }
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SplitFractions {
    pub val: f64,
    pub test: f64,
}

impl Default for SplitFractions {
    fn default() -> Self {
        Self {
            val: 0.1,
            test: 0.1,
        }
    }
}

impl SplitFractions {
    pub fn validate(&self) -> Result<()> {
        let in_range = |f: f64| (0.0..=1.0).contains(&f);
        if !in_range(self.val) || !in_range(self.test) || self.val + self.test > 1.0 {
            return Err(Error::InvalidFractions {
                val: self.val,
                test: self.test,
            });
        }
        Ok(())
    }

    /// `(val_count, test_bound)` for `n` molecules.
    pub fn bounds(&self, n: usize) -> (usize, usize) {
        let val_count = (n as f64 * self.val).floor() as usize;
        let test_count = (n as f64 * self.test).floor() as usize;
        (val_count, (val_count + test_count).min(n))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Builder, Serialize, Deserialize)]
pub struct SplitConfig {
    #[builder(default)]
    #[serde(default)]
    pub fractions: SplitFractions,
    /// Keep only molecules with at most this many atoms.
    pub size_filter: Option<usize>,
    #[builder(default)]
    #[serde(default)]
    pub overflow: PermutationOverflow,
}

#[derive(Debug, Clone)]
pub struct Split {
    pub train: Vec<MoleculeBlock>,
    pub val: Vec<MoleculeBlock>,
    pub test: Vec<MoleculeBlock>,
}

impl Split {
    pub fn len(&self) -> usize {
        self.train.len() + self.val.len() + self.test.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drop molecules with more than `max_atoms` atoms. An empty result is an error.
pub fn filter_by_size(blocks: Vec<MoleculeBlock>, max_atoms: usize) -> Result<Vec<MoleculeBlock>> {
    let kept: Vec<_> = blocks
        .into_iter()
        .filter(|b| b.num_atoms() <= max_atoms)
        .collect();
    if kept.is_empty() {
        return Err(Error::EmptyAfterFilter { max_atoms });
    }
    Ok(kept)
}

/// Filter, permute and partition molecule blocks.
///
/// The permuted list is cut as `[val | test | train]`.
pub fn split_molecules(
    blocks: Vec<MoleculeBlock>,
    permutation: &Permutation,
    config: &SplitConfig,
) -> Result<Split> {
    config.fractions.validate()?;
    let blocks = match config.size_filter {
        Some(max_atoms) => filter_by_size(blocks, max_atoms)?,
        None => blocks,
    };

    let mut val = permutation.apply(&blocks, config.overflow)?;
    let (val_count, test_bound) = config.fractions.bounds(val.len());
    let mut test = val.split_off(val_count);
    let train = test.split_off(test_bound - val_count);

    log::info!(
        "split {} molecules into train={} val={} test={}",
        blocks.len(),
        train.len(),
        val.len(),
        test.len()
    );
    Ok(Split { train, val, test })
}

/// Regroup a flat atom table into molecules and split them.
pub fn split_table(
    table: &AtomTable,
    permutation: &Permutation,
    config: &SplitConfig,
) -> Result<Split> {
    split_molecules(table.blocks(), permutation, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;
    use std::collections::HashSet;

    fn blocks(sizes: &[usize]) -> Vec<MoleculeBlock> {
        sizes
            .iter()
            .enumerate()
            .map(|(id, &n)| MoleculeBlock::new(id as i64, Array2::zeros((n, 8))).unwrap())
            .collect()
    }

    fn ids(blocks: &[MoleculeBlock]) -> Vec<i64> {
        blocks.iter().map(MoleculeBlock::molecule_id).collect()
    }

    #[test]
    fn test_split_sizes_100() {
        let perm = Permutation::generate(100, DEFAULT_PERMUTATION_SEED);
        let split = split_molecules(blocks(&[3; 100]), &perm, &SplitConfig::default()).unwrap();
        assert_eq!(split.val.len(), 10);
        assert_eq!(split.test.len(), 10);
        assert_eq!(split.train.len(), 80);
    }

    #[test]
    fn test_split_is_a_partition() {
        let n = 37;
        let perm = Permutation::generate(n, 11);
        let config = SplitConfig::builder()
            .fractions(SplitFractions {
                val: 0.15,
                test: 0.2,
            })
            .build();
        let split = split_molecules(blocks(&vec![2; n]), &perm, &config).unwrap();
        // floor(37 * 0.15) = 5, floor(37 * 0.2) = 7
        assert_eq!(split.val.len(), 5);
        assert_eq!(split.test.len(), 7);
        assert_eq!(split.train.len(), 25);

        let all: Vec<i64> = [ids(&split.val), ids(&split.test), ids(&split.train)].concat();
        let unique: HashSet<i64> = all.iter().copied().collect();
        assert_eq!(all.len(), n);
        assert_eq!(unique.len(), n);
    }

    #[test]
    fn test_split_follows_permutation_order() {
        let perm = Permutation::new(vec![4, 3, 2, 1, 0, 9, 8, 7, 6, 5]);
        let config = SplitConfig::builder()
            .fractions(SplitFractions {
                val: 0.2,
                test: 0.3,
            })
            .build();
        let split = split_molecules(blocks(&[1; 10]), &perm, &config).unwrap();
        assert_eq!(ids(&split.val), vec![4, 3]);
        assert_eq!(ids(&split.test), vec![2, 1, 0]);
        assert_eq!(ids(&split.train), vec![9, 8, 7, 6, 5]);
    }

    #[test]
    fn test_permutation_overflow_truncates() {
        let perm = Permutation::new(vec![5, 0, 7, 2, 1, 6]);
        let items = vec!['a', 'b', 'c'];
        let out = perm.apply(&items, PermutationOverflow::Truncate).unwrap();
        assert_eq!(out, vec!['a', 'c', 'b']);
    }

    #[test]
    fn test_permutation_overflow_rejects() {
        let perm = Permutation::new(vec![0, 3, 1]);
        let res = perm.apply(&[1, 2, 3], PermutationOverflow::Reject);
        assert!(matches!(
            res,
            Err(Error::PermutationOutOfRange {
                entry: 3,
                n_molecules: 3
            })
        ));
    }

    #[test]
    fn test_negative_permutation_entry() {
        let perm = Permutation::new(vec![0, -1]);
        assert!(perm.apply(&[1, 2], PermutationOverflow::Truncate).is_err());
    }

    #[test]
    fn test_size_filter() {
        let config = SplitConfig::builder().size_filter(4).build();
        let perm = Permutation::generate(6, 1);
        let split = split_molecules(blocks(&[3, 9, 4, 5, 2, 1]), &perm, &config).unwrap();
        assert_eq!(split.len(), 4);
        assert!(split
            .train
            .iter()
            .chain(&split.val)
            .chain(&split.test)
            .all(|b| b.num_atoms() <= 4));
    }

    #[test]
    fn test_size_filter_empty_is_fatal() {
        let config = SplitConfig::builder().size_filter(2).build();
        let perm = Permutation::generate(3, 1);
        let res = split_molecules(blocks(&[3, 4, 5]), &perm, &config);
        assert!(matches!(res, Err(Error::EmptyAfterFilter { max_atoms: 2 })));
    }

    #[test]
    fn test_invalid_fractions() {
        let config = SplitConfig::builder()
            .fractions(SplitFractions {
                val: 0.7,
                test: 0.6,
            })
            .build();
        let perm = Permutation::generate(3, 1);
        assert!(matches!(
            split_molecules(blocks(&[1, 1, 1]), &perm, &config),
            Err(Error::InvalidFractions { .. })
        ));
    }

    #[test]
    fn test_split_table() {
        let table = AtomTable::from_blocks(&blocks(&[2, 3, 4, 5])).unwrap();
        let perm = Permutation::new(vec![3, 2, 1, 0]);
        let config = SplitConfig::builder()
            .fractions(SplitFractions {
                val: 0.25,
                test: 0.25,
            })
            .build();
        let split = split_table(&table, &perm, &config).unwrap();
        assert_eq!(split.val[0].num_atoms(), 5);
        assert_eq!(split.test[0].num_atoms(), 4);
        assert_eq!(ids(&split.train), vec![1, 0]);
    }

    #[test]
    fn test_generated_permutation_is_deterministic() {
        let a = Permutation::generate(50, DEFAULT_PERMUTATION_SEED);
        let b = Permutation::generate(50, DEFAULT_PERMUTATION_SEED);
        assert_eq!(a, b);
        let mut sorted = a.indices().to_vec();
        sorted.sort();
        assert_eq!(sorted, (0..50).collect::<Vec<i64>>());
    }
}
