//! # geomdrugs-core
//!
//! Data preparation and batching for 3D molecular generative models trained on GEOM-drugs.
//!
//! __geomdrugs-core__ provides functionality for:
//! * Flattening selected conformers and per-molecule properties into one atom-indexed table
//! * Regrouping that table into molecule blocks and splitting it into train/val/test
//! * Serving size-sorted molecules through padded-random or size-grouped batching
//! * Building position / one-hot / context / mask features for the model
//!
//! The flow is `MoleculeArchive` -> [`ConformerExtractor`] -> [`AtomTable`] -> [`split_table`]
//! -> [`MoleculeDataset`] -> [`BatchSampler`] -> [`Transform`] / [`collate`] -> [`MoleculeBatch`].
//!
mod archive;
mod collate;
mod dataset;
mod error;
mod extract;
mod info;
mod loader;
mod properties;
mod sampler;
mod split;
mod table;
mod transform;

pub use self::archive::{Conformer, MoleculeArchive};
pub use self::collate::{collate, edge_mask_from_atom_mask, stack_padded, BatchTensors, MoleculeBatch};
pub use self::dataset::MoleculeDataset;
pub use self::error::{Error, Result};
pub use self::extract::{ConformerExtractor, ExtractConfig, Extraction, UnrecognizedFiles};
pub use self::info::constants::{
    atomic_mass, element_symbol, AtomVocabulary, GEOM_ATOMIC_NUMBERS,
};
pub use self::loader::{load_batch, LoaderConfig, MoleculeLoader};
pub use self::properties::{
    asphericity, weighted_asphericity, DrugLikeness, MolecularProperties, Property,
    PropertyScorer,
};
pub use self::sampler::{BatchSampler, RandomBatchSampler, SizeGroupedBatches, SizeGroupedSampler};
pub use self::split::{
    filter_by_size, split_molecules, split_table, Permutation, PermutationOverflow, Split,
    SplitConfig, SplitFractions, DEFAULT_PERMUTATION_SEED,
};
pub use self::table::{AtomTable, MoleculeBlock, BLOCK_FIXED_COLUMNS, TABLE_FIXED_COLUMNS};
pub use self::transform::{MoleculeRecord, Transform, TransformConfig};
