//! Conformer archive files.
//!
//! An archive directory holds one pickle per source molecule. Only file names ending in
//! `pickle` are archives; anything else is skipped or rejected according to
//! [`UnrecognizedFiles`].
use crate::{Error, Result};
use geomdrugs_core::{MoleculeArchive, UnrecognizedFiles};
use serde_pickle::{DeOptions, SerOptions};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

pub fn is_archive(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with("pickle"))
}

/// Archive paths under `dir`, sorted by file name.
pub fn list_archives(dir: &Path, unrecognized: UnrecognizedFiles) -> Result<Vec<PathBuf>> {
    let mut archives = Vec::new();
    for entry in fs::read_dir(dir).map_err(Error::io(dir))? {
        let path = entry.map_err(Error::io(dir))?.path();
        if is_archive(&path) {
            archives.push(path);
            continue;
        }
        match unrecognized {
            UnrecognizedFiles::Skip => log::debug!("skipping {}", path.display()),
            UnrecognizedFiles::Reject => return Err(Error::UnrecognizedArchive(path)),
        }
    }
    archives.sort();
    Ok(archives)
}

pub fn read_archive(path: &Path) -> Result<MoleculeArchive> {
    let file = File::open(path).map_err(Error::io(path))?;
    serde_pickle::from_reader(BufReader::new(file), DeOptions::new()).map_err(|source| {
        Error::Pickle {
            path: path.to_path_buf(),
            source,
        }
    })
}

pub fn write_archive(path: &Path, molecule: &MoleculeArchive) -> Result<()> {
    let file = File::create(path).map_err(Error::io(path))?;
    let mut writer = BufWriter::new(file);
    serde_pickle::to_writer(&mut writer, molecule, SerOptions::new()).map_err(|source| {
        Error::Pickle {
            path: path.to_path_buf(),
            source,
        }
    })
}
