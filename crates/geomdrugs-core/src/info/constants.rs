//! # Constants
//!
//! Fixed chemistry tables used when featurizing molecules.
//!
//! ## Atom Vocabulary
//! GEOM-drugs contains sixteen elements. The one-hot atom type of every atom is an indicator over
//! this list of atomic numbers, in this order:
//!
//! - `H B C N O F Al Si P S Cl As Br I Hg Bi`
//!
//! When hydrogens are stripped during extraction the vocabulary drops `H` as well.
//!

/// Atomic numbers present in GEOM-drugs, hydrogen included.
pub const GEOM_ATOMIC_NUMBERS: [u32; 16] = [1, 5, 6, 7, 8, 9, 13, 14, 15, 16, 17, 33, 35, 53, 80, 83];

const ELEMENT_LIST: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

/// Element symbol for an atomic number, `None` outside `1..=118`.
pub fn element_symbol(atomic_number: u32) -> Option<&'static str> {
    let idx = (atomic_number as usize).checked_sub(1)?;
    ELEMENT_LIST.get(idx).copied()
}

/// Standard atomic weight of the GEOM-drugs elements, `None` for anything else.
pub fn atomic_mass(atomic_number: u32) -> Option<f64> {
    let mass = match atomic_number {
        1 => 1.008,
        5 => 10.812,
        6 => 12.011,
        7 => 14.007,
        8 => 15.999,
        9 => 18.998,
        13 => 26.982,
        14 => 28.086,
        15 => 30.974,
        16 => 32.067,
        17 => 35.453,
        33 => 74.922,
        35 => 79.904,
        53 => 126.904,
        80 => 200.59,
        83 => 208.98,
        _ => return None,
    };
    Some(mass)
}

/// Read-only list of atomic numbers that defines the one-hot atom type columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomVocabulary {
    atomic_numbers: Vec<u32>,
}

impl AtomVocabulary {
    pub fn new(atomic_numbers: Vec<u32>) -> Self {
        Self { atomic_numbers }
    }

    pub fn geom_with_hydrogens() -> Self {
        Self::new(GEOM_ATOMIC_NUMBERS.to_vec())
    }

    pub fn geom_without_hydrogens() -> Self {
        Self::new(
            GEOM_ATOMIC_NUMBERS
                .iter()
                .copied()
                .filter(|&z| z != 1)
                .collect(),
        )
    }

    /// Vocabulary matching a dataset extracted with or without hydrogens.
    pub fn for_dataset(remove_hydrogens: bool) -> Self {
        if remove_hydrogens {
            Self::geom_without_hydrogens()
        } else {
            Self::geom_with_hydrogens()
        }
    }

    pub fn len(&self) -> usize {
        self.atomic_numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atomic_numbers.is_empty()
    }

    pub fn atomic_numbers(&self) -> &[u32] {
        &self.atomic_numbers
    }

    /// One-hot column of an atomic number.
    pub fn position(&self, atomic_number: u32) -> Option<usize> {
        self.atomic_numbers.iter().position(|&z| z == atomic_number)
    }

    pub fn symbols(&self) -> Vec<&'static str> {
        self.atomic_numbers
            .iter()
            .map(|&z| element_symbol(z).unwrap_or("?"))
            .collect()
    }
}

impl Default for AtomVocabulary {
    fn default() -> Self {
        Self::geom_without_hydrogens()
    }
}
