use ndarray_npy::{ReadNpyError, WriteNpyError};
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode conformer archive {path}")]
    Pickle {
        path: PathBuf,
        #[source]
        source: serde_pickle::Error,
    },

    #[error("failed to read array from {path}")]
    ReadNpy {
        path: PathBuf,
        #[source]
        source: ReadNpyError,
    },

    #[error("failed to write array to {path}")]
    WriteNpy {
        path: PathBuf,
        #[source]
        source: WriteNpyError,
    },

    #[error("permutation file {0} not found; it has to be generated once before splitting")]
    MissingPermutation(PathBuf),

    #[error("permutation file {0} already exists and is never overwritten")]
    PermutationExists(PathBuf),

    #[error("{0} is not a conformer archive")]
    UnrecognizedArchive(PathBuf),

    #[error(transparent)]
    Core(#[from] geomdrugs_core::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| Error::Io { path, source }
    }
}
