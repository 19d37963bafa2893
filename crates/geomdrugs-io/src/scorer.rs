use geomdrugs_core::{
    atomic_mass, weighted_asphericity, Conformer, DrugLikeness, Error, MoleculeArchive,
    PropertyScorer, Result,
};

/// Reads the 2D scores stored in each archive and computes the mass-weighted asphericity of
/// the conformer, matching RDKit's default.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveScorer;

impl PropertyScorer for ArchiveScorer {
    fn score(&self, molecule: &MoleculeArchive) -> Result<DrugLikeness> {
        molecule.properties.ok_or_else(|| Error::Scoring {
            smiles: molecule.smiles.clone(),
            reason: "archive carries no qed/logp/sas scores".to_string(),
        })
    }

    fn score_3d(&self, conformer: &Conformer) -> Result<f64> {
        conformer.validate()?;
        let masses = conformer
            .atomic_numbers
            .iter()
            .map(|&z| atomic_mass(z).ok_or(Error::UnknownElement { atomic_number: z }))
            .collect::<Result<Vec<_>>>()?;
        Ok(weighted_asphericity(&conformer.positions, &masses))
    }
}
