use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no conformers were extracted; refusing to build an empty atom table")]
    EmptyDataset,

    #[error("no molecules left after keeping molecules with at most {max_atoms} atoms")]
    EmptyAfterFilter { max_atoms: usize },

    #[error("atom table needs at least {expected} columns, found {found}")]
    TableColumns { expected: usize, found: usize },

    #[error("molecule {molecule_id} has {found} property columns, expected {expected}")]
    PropertyColumns {
        molecule_id: i64,
        expected: usize,
        found: usize,
    },

    #[error("conformer lists {atoms} atomic numbers but {positions} positions")]
    MalformedConformer { atoms: usize, positions: usize },

    #[error("property scoring failed for {smiles}: {reason}")]
    Scoring { smiles: String, reason: String },

    #[error("no atomic mass known for atomic number {atomic_number}")]
    UnknownElement { atomic_number: u32 },

    #[error("permutation entry {entry} is out of range for {n_molecules} molecules")]
    PermutationOutOfRange { entry: i64, n_molecules: usize },

    #[error("invalid split fractions: val={val}, test={test}")]
    InvalidFractions { val: f64, test: f64 },

    #[error("index {index} is out of bounds for a dataset of {len} molecules")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("dataset was built without a transform")]
    MissingTransform,

    #[error("batch size must be at least 1")]
    ZeroBatchSize,

    #[error("shuffling is not allowed with size-grouped sequential batching")]
    ShuffleInSequentialMode,

    #[error("cannot collate an empty batch")]
    EmptyBatch,

    #[error("field `{field}` has width {found}, expected {expected}")]
    FeatureWidth {
        field: &'static str,
        expected: usize,
        found: usize,
    },

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    #[error(transparent)]
    Candle(#[from] candle_core::Error),
}
