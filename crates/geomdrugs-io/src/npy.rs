//! `.npy` artifacts.
use crate::{Error, Result};
use geomdrugs_core::{AtomTable, Permutation};
use ndarray::{Array1, Array2};
use ndarray_npy::{ReadNpyError, ReadNpyExt, WriteNpyExt};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

fn read_array<A: ReadNpyExt>(path: &Path) -> Result<A> {
    let file = File::open(path).map_err(Error::io(path))?;
    A::read_npy(BufReader::new(file)).map_err(|source| Error::ReadNpy {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn write_array<A: WriteNpyExt, W: Write>(
    path: &Path,
    array: &A,
    mut writer: W,
) -> Result<()> {
    array.write_npy(&mut writer).map_err(|source| Error::WriteNpy {
        path: path.to_path_buf(),
        source,
    })?;
    // a buffered writer would otherwise swallow the last write error on drop
    writer.flush().map_err(Error::io(path))
}

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).map_err(Error::io(path))?;
    Ok(BufWriter::new(file))
}

/// Load a float64 `[atoms, 5 + k]` table.
pub fn read_table(path: &Path) -> Result<AtomTable> {
    let data: Array2<f64> = read_array(path)?;
    log::info!("loaded {} atom rows from {}", data.nrows(), path.display());
    Ok(AtomTable::from_array(data)?)
}

pub fn write_table(path: &Path, table: &AtomTable) -> Result<()> {
    write_array(path, table.as_array(), create(path)?)
}

/// Atom count per molecule, stored as int64.
pub fn write_atom_counts(path: &Path, counts: &[usize]) -> Result<()> {
    let array: Array1<i64> = counts.iter().map(|&n| n as i64).collect();
    write_array(path, &array, create(path)?)
}

pub fn read_atom_counts(path: &Path) -> Result<Vec<usize>> {
    let array: Array1<i64> = read_array(path)?;
    Ok(array.iter().map(|&n| n.max(0) as usize).collect())
}

/// Write as int32 when every entry fits, int64 otherwise.
pub(crate) fn write_permutation<W: Write>(path: &Path, permutation: &Permutation, writer: W) -> Result<()> {
    let narrow: Option<Array1<i32>> = permutation
        .indices()
        .iter()
        .map(|&i| i32::try_from(i).ok())
        .collect();
    match narrow {
        Some(array) => write_array(path, &array, writer),
        None => write_array(path, &Array1::from(permutation.indices().to_vec()), writer),
    }
}

/// Accepts int32 and int64 arrays.
pub(crate) fn read_permutation(path: &Path) -> Result<Permutation> {
    match read_array::<Array1<i32>>(path) {
        Ok(array) => Ok(Permutation::new(array.iter().map(|&i| i as i64).collect())),
        Err(Error::ReadNpy {
            source: ReadNpyError::WrongDescriptor(_),
            ..
        }) => {
            let array: Array1<i64> = read_array(path)?;
            Ok(Permutation::new(array.to_vec()))
        }
        Err(err) => Err(err),
    }
}
