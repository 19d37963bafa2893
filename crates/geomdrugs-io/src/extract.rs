use crate::archive::{list_archives, read_archive};
use crate::artifacts::{write_extraction, ArtifactNames, ExtractionPaths};
use crate::Result;
use geomdrugs_core::{ConformerExtractor, ExtractConfig, Extraction, PropertyScorer};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

/// Run the extractor over every archive in `dir`, in sorted file order.
pub fn extract_directory<S: PropertyScorer>(
    dir: &Path,
    scorer: S,
    config: ExtractConfig,
) -> Result<Extraction> {
    let files = list_archives(dir, config.unrecognized_files)?;
    log::info!("found {} conformer archives in {}", files.len(), dir.display());

    let progress = ProgressBar::new(files.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
    {
        progress.set_style(style.progress_chars("#>-"));
    }

    let mut extractor = ConformerExtractor::new(scorer, config);
    for path in &files {
        let molecule = read_archive(path)?;
        extractor.push(&molecule)?;
        progress.inc(1);
    }
    progress.finish_and_clear();
    Ok(extractor.finish()?)
}

/// [`extract_directory`] followed by [`write_extraction`] into `output_dir`.
pub fn extract_to_dir<S: PropertyScorer>(
    archive_dir: &Path,
    output_dir: &Path,
    scorer: S,
    config: ExtractConfig,
) -> Result<(Extraction, ExtractionPaths)> {
    let names = ArtifactNames::new(&config);
    let extraction = extract_directory(archive_dir, scorer, config)?;
    let paths = write_extraction(output_dir, &names, &extraction)?;
    Ok((extraction, paths))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::npy::{read_atom_counts, read_table};
    use crate::scorer::ArchiveScorer;
    use crate::Error;
    use geomdrugs_core::UnrecognizedFiles;
    use geomdrugs_test_data::TestArchive;
    use std::fs;

    fn config(remove_hydrogens: bool) -> ExtractConfig {
        ExtractConfig::builder()
            .remove_hydrogens(remove_hydrogens)
            .seed(11)
            .build()
    }

    #[test]
    fn test_extract_directory() {
        let (dir, _temp) = TestArchive::create_temp_dir(&TestArchive::drugs()).unwrap();
        let extraction = extract_directory(&dir, ArchiveScorer, config(true)).unwrap();
        assert_eq!(extraction.num_molecules(), 13);
        assert_eq!(extraction.table.num_atoms(), 46);
        assert_eq!(extraction.table.num_properties(), 4);
        // acetic acid, ethanol, methanol, benzene
        assert_eq!(
            extraction.atom_counts,
            vec![4, 4, 4, 4, 3, 3, 3, 3, 2, 2, 2, 6, 6]
        );
        assert_eq!(extraction.smiles, vec!["CC(=O)O", "CCO", "CO", "c1ccccc1"]);
    }

    #[test]
    fn test_extract_with_hydrogens() {
        let (dir, _temp) = TestArchive::create_temp_dir(&TestArchive::drugs()).unwrap();
        let extraction = extract_directory(&dir, ArchiveScorer, config(false)).unwrap();
        assert_eq!(extraction.table.num_atoms(), 110);
    }

    #[test]
    fn test_extract_to_dir() {
        let (dir, _temp) = TestArchive::create_temp_dir(&TestArchive::drugs()).unwrap();
        let out = tempfile::tempdir().unwrap();
        let (extraction, paths) =
            extract_to_dir(&dir, &out.path().join("processed"), ArchiveScorer, config(true))
                .unwrap();

        assert!(paths.table.ends_with("geom_drugs_no_h_4_random.npy"));
        assert_eq!(read_table(&paths.table).unwrap(), extraction.table);
        assert_eq!(read_atom_counts(&paths.atom_counts).unwrap(), extraction.atom_counts);
        let smiles = fs::read_to_string(&paths.smiles).unwrap();
        assert_eq!(smiles.lines().count(), 4);
    }

    #[test]
    fn test_unscored_archive_fails() {
        let (dir, _temp) =
            TestArchive::create_temp_dir(&[TestArchive::methanol(), TestArchive::unscored()])
                .unwrap();
        let res = extract_directory(&dir, ArchiveScorer, config(true));
        assert!(matches!(
            res,
            Err(Error::Core(geomdrugs_core::Error::Scoring { .. }))
        ));
    }

    #[test]
    fn test_reject_unrecognized() {
        let (dir, _temp) = TestArchive::create_temp_dir(&TestArchive::drugs()).unwrap();
        let config = ExtractConfig::builder()
            .unrecognized_files(UnrecognizedFiles::Reject)
            .build();
        assert!(matches!(
            extract_directory(&dir, ArchiveScorer, config),
            Err(Error::UnrecognizedArchive(_))
        ));
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            extract_directory(dir.path(), ArchiveScorer, ExtractConfig::default()),
            Err(Error::Core(geomdrugs_core::Error::EmptyDataset))
        ));
    }
}
