//! The split permutation artifact.
//!
//! Created exactly once per dataset and read-only afterwards; a second creation attempt fails
//! instead of silently reshuffling the split. The array is written to a temporary file next to
//! the target and only moved into place once complete, so a failed write leaves nothing behind.
use crate::npy::{read_permutation, write_permutation};
use crate::{Error, Result};
use geomdrugs_core::Permutation;
use std::fs::File;
use std::io::{BufWriter, ErrorKind};
use std::path::Path;
use tempfile::NamedTempFile;

pub fn create_permutation(path: &Path, n_molecules: usize, seed: u64) -> Result<Permutation> {
    create_permutation_with(path, n_molecules, seed, |permutation, file| {
        write_permutation(path, permutation, BufWriter::new(file))
    })
}

fn create_permutation_with<F>(
    path: &Path,
    n_molecules: usize,
    seed: u64,
    write: F,
) -> Result<Permutation>
where
    F: FnOnce(&Permutation, &mut File) -> Result<()>,
{
    if path.exists() {
        return Err(Error::PermutationExists(path.to_path_buf()));
    }
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir).map_err(Error::io(dir))?;

    let permutation = Permutation::generate(n_molecules, seed);
    // on error `temp` is dropped and the partial file removed
    write(&permutation, temp.as_file_mut())?;
    temp.persist_noclobber(path).map_err(|err| {
        if err.error.kind() == ErrorKind::AlreadyExists {
            Error::PermutationExists(path.to_path_buf())
        } else {
            Error::Io {
                path: path.to_path_buf(),
                source: err.error,
            }
        }
    })?;

    log::info!(
        "permutation of {} molecules (seed {}) saved to {}",
        n_molecules,
        seed,
        path.display()
    );
    Ok(permutation)
}

pub fn load_permutation(path: &Path) -> Result<Permutation> {
    if !path.is_file() {
        return Err(Error::MissingPermutation(path.to_path_buf()));
    }
    read_permutation(path)
}
