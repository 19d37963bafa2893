use crate::collate::{collate, MoleculeBatch};
use crate::dataset::MoleculeDataset;
use crate::sampler::{BatchSampler, RandomBatchSampler, SizeGroupedSampler};
use crate::{Error, Result};
use bon::Builder;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    #[builder(default = 32)]
    pub batch_size: usize,
    /// Size-grouped batches over the size-sorted order instead of padded batches.
    #[builder(default)]
    pub sequential: bool,
    #[builder(default)]
    pub shuffle: bool,
    #[builder(default)]
    pub drop_last: bool,
    pub seed: Option<u64>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Pull-based batch producer over one dataset.
pub struct MoleculeLoader<'a> {
    dataset: &'a MoleculeDataset,
    sampler: Box<dyn BatchSampler + Send + 'a>,
}

impl<'a> MoleculeLoader<'a> {
    pub fn new(dataset: &'a MoleculeDataset, config: &LoaderConfig) -> Result<Self> {
        let sampler: Box<dyn BatchSampler + Send> = if config.sequential {
            if config.shuffle {
                return Err(Error::ShuffleInSequentialMode);
            }
            Box::new(SizeGroupedSampler::new(
                dataset,
                config.batch_size,
                config.drop_last,
            )?)
        } else {
            Box::new(RandomBatchSampler::new(
                dataset.len(),
                config.batch_size,
                config.shuffle,
                config.drop_last,
                config.seed,
            )?)
        };
        Ok(Self { dataset, sampler })
    }

    pub fn with_sampler(dataset: &'a MoleculeDataset, sampler: Box<dyn BatchSampler + Send + 'a>) -> Self {
        Self { dataset, sampler }
    }

    pub fn num_batches(&self) -> usize {
        self.sampler.num_batches()
    }

    /// One epoch of batches, produced lazily as the caller pulls them.
    pub fn batches(&mut self) -> impl Iterator<Item = Result<MoleculeBatch>> + '_ {
        let dataset = self.dataset;
        self.sampler
            .batches()
            .map(move |indices| load_batch(dataset, &indices))
    }
}

/// Transform the molecules at `indices` in parallel and collate them.
pub fn load_batch(dataset: &MoleculeDataset, indices: &[usize]) -> Result<MoleculeBatch> {
    let records = indices
        .par_iter()
        .map(|&idx| dataset.record(idx))
        .collect::<Result<Vec<_>>>()?;
    collate(&records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::info::constants::AtomVocabulary;
    use crate::table::MoleculeBlock;
    use crate::transform::{Transform, TransformConfig};
    use ndarray::Array2;

    fn dataset(sizes: &[usize], sequential: bool) -> MoleculeDataset {
        let blocks = sizes
            .iter()
            .enumerate()
            .map(|(id, &n)| {
                let atoms = Array2::from_shape_fn((n, 8), |(_, j)| if j == 0 { 7.0 } else { 1.0 });
                MoleculeBlock::new(id as i64, atoms).unwrap()
            })
            .collect();
        let config = TransformConfig::builder().sequential(sequential).build();
        MoleculeDataset::new(blocks).with_transform(Transform::new(AtomVocabulary::default(), config))
    }

    const SIZES: [usize; 10] = [3, 5, 3, 7, 5, 3, 5, 7, 3, 5];

    #[test]
    fn test_sequential_loader() {
        let ds = dataset(&SIZES, true);
        let config = LoaderConfig::builder()
            .batch_size(3)
            .sequential(true)
            .build();
        let mut loader = MoleculeLoader::new(&ds, &config).unwrap();
        assert_eq!(loader.num_batches(), 5);
        let batches: Vec<MoleculeBatch> = loader.batches().collect::<Result<_>>().unwrap();
        let shapes: Vec<(usize, usize)> = batches.iter().map(|b| b.atom_mask.dim()).collect();
        assert_eq!(shapes, vec![(3, 3), (1, 3), (3, 5), (1, 5), (2, 7)]);
        // no padding in size-grouped batches
        assert!(batches.iter().all(|b| b.atom_mask.iter().all(|&m| m == 1.0)));
    }

    #[test]
    fn test_sequential_rejects_shuffle() {
        let ds = dataset(&SIZES, true);
        let config = LoaderConfig::builder()
            .sequential(true)
            .shuffle(true)
            .build();
        assert!(matches!(
            MoleculeLoader::new(&ds, &config),
            Err(Error::ShuffleInSequentialMode)
        ));
    }

    #[test]
    fn test_random_loader_pads() {
        let ds = dataset(&SIZES, false);
        let config = LoaderConfig::builder()
            .batch_size(4)
            .shuffle(true)
            .seed(5)
            .build();
        let mut loader = MoleculeLoader::new(&ds, &config).unwrap();
        assert_eq!(loader.num_batches(), 3);
        let mut seen = 0;
        for batch in loader.batches() {
            let batch = batch.unwrap();
            let n = batch.max_atoms();
            let real: f32 = batch.atom_mask.sum();
            seen += batch.batch_size();
            assert_eq!(batch.edge_mask.dim(), (batch.batch_size() * n * n, 1));
            assert!(real <= (batch.batch_size() * n) as f32);
        }
        assert_eq!(seen, SIZES.len());
    }

    #[test]
    fn test_loader_without_transform() {
        let blocks = vec![MoleculeBlock::new(0, Array2::zeros((2, 8))).unwrap()];
        let ds = MoleculeDataset::new(blocks);
        let mut loader = MoleculeLoader::new(&ds, &LoaderConfig::default()).unwrap();
        let first = loader.batches().next().unwrap();
        assert!(matches!(first, Err(Error::MissingTransform)));
    }

    #[test]
    fn test_custom_sampler() {
        let ds = dataset(&SIZES, false);
        let sampler = SizeGroupedSampler::new(&ds, 10, false).unwrap();
        let mut loader = MoleculeLoader::with_sampler(&ds, Box::new(sampler));
        assert_eq!(loader.num_batches(), 3);
        assert_eq!(loader.batches().count(), 3);
    }
}
