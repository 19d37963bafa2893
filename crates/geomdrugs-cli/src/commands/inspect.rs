use crate::cli::InspectArgs;
use anyhow::Context;
use candle_core::utils::{cuda_is_available, metal_is_available};
use candle_core::Device;
use geomdrugs_core::{
    AtomVocabulary, LoaderConfig, MoleculeBlock, MoleculeDataset, MoleculeLoader, SplitConfig,
    Transform, TransformConfig,
};
use geomdrugs_io::{load_and_split, permutation_path_for};
use serde::{Deserialize, Serialize};
use std::fs;

/// Everything between the saved table and a batch, loadable from JSON.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub split: SplitConfig,
    pub loader: LoaderConfig,
    pub transform: TransformConfig,
    pub keep_hydrogens: bool,
}

impl PipelineConfig {
    fn apply_args(mut self, args: &InspectArgs) -> Self {
        if let Some(val) = args.val {
            self.split.fractions.val = val;
        }
        if let Some(test) = args.test {
            self.split.fractions.test = test;
        }
        if args.filter_size.is_some() {
            self.split.size_filter = args.filter_size;
        }
        if let Some(batch_size) = args.batch_size {
            self.loader.batch_size = batch_size;
        }
        if args.seed.is_some() {
            self.loader.seed = args.seed;
        }
        self.loader.sequential |= args.sequential;
        self.loader.shuffle |= args.shuffle;
        self.loader.drop_last |= args.drop_last;
        self.transform.include_charges |= args.include_charges;
        self.transform.sequential = self.loader.sequential;
        self.keep_hydrogens |= args.keep_hydrogens;
        self
    }
}

pub fn device(cpu: bool) -> candle_core::Result<Device> {
    if cpu {
        Ok(Device::Cpu)
    } else if cuda_is_available() {
        Device::new_cuda(0)
    } else if metal_is_available() {
        Device::new_metal(0)
    } else {
        log::info!("Running on CPU, to run on GPU, build with `--features cuda` or `--features metal`");
        Ok(Device::Cpu)
    }
}

pub fn execute(args: InspectArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str::<PipelineConfig>(&text)
                .with_context(|| format!("parsing {}", path.display()))?
        }
        None => PipelineConfig::default(),
    }
    .apply_args(&args);
    log::debug!("{:?}", config);

    let permutation = args
        .permutation
        .clone()
        .unwrap_or_else(|| permutation_path_for(&args.table));
    let split = load_and_split(&args.table, &permutation, &config.split)?;
    println!(
        "split: train={} val={} test={}",
        split.train.len(),
        split.val.len(),
        split.test.len()
    );

    let vocabulary = AtomVocabulary::for_dataset(!config.keep_hydrogens);
    println!(
        "vocabulary ({}): {}",
        vocabulary.len(),
        vocabulary.symbols().join(" ")
    );
    let device = device(args.cpu)?;
    for (name, blocks) in [
        ("train", split.train),
        ("val", split.val),
        ("test", split.test),
    ] {
        // only the training split is ever shuffled
        let loader_config = LoaderConfig {
            shuffle: config.loader.shuffle && name == "train",
            ..config.loader.clone()
        };
        report(name, blocks, &vocabulary, &config.transform, &loader_config, &device)?;
    }
    Ok(())
}

fn report(
    name: &str,
    blocks: Vec<MoleculeBlock>,
    vocabulary: &AtomVocabulary,
    transform: &TransformConfig,
    loader_config: &LoaderConfig,
    device: &Device,
) -> anyhow::Result<()> {
    let dataset = MoleculeDataset::new(blocks)
        .with_transform(Transform::new(vocabulary.clone(), transform.clone()));
    let mut loader = MoleculeLoader::new(&dataset, loader_config)?;
    println!(
        "{}: molecules={} size_boundaries={} batches={}",
        name,
        dataset.len(),
        dataset.size_boundaries().len(),
        loader.num_batches()
    );

    if let Some(batch) = loader.batches().next() {
        let tensors = batch?.to_tensors(device)?;
        println!(
            "{} first batch: positions={:?} one_hot={:?} context={:?} charges={:?} atom_mask={:?} edge_mask={:?}",
            name,
            tensors.positions.dims(),
            tensors.one_hot.dims(),
            tensors.context.dims(),
            tensors.charges.dims(),
            tensors.atom_mask.dims(),
            tensors.edge_mask.dims(),
        );
    }
    Ok(())
}
