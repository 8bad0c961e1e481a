use crate::{
    enzyme::Digest,
    mass::{ion_mz, monoisotopic},
    modification::Modifications,
};

#[derive(Debug, Clone, PartialEq, PartialOrd)]
pub struct Peptide {
    pub sequence: String,
    /// Unmodified monoisotopic mass
    pub monoisotopic: f64,
}

#[derive(Debug, Clone, PartialEq, PartialOrd)]
/// A charged, possibly modified, peptide
pub struct Ion {
    pub charge: u8,
    pub mz: f64,
    pub mass_shift: f64,
    pub modification_fixed: String,
    pub modification_variable: String,
}

/// Charge states generated when none are configured
pub const DEFAULT_CHARGES: [u8; 2] = [2, 3];

impl Peptide {
    /// One ion per modification assignment and charge state, in assignment
    /// order and then in the order of `charges`
    pub fn ions(&self, modifications: &Modifications, charges: &[u8]) -> Vec<Ion> {
        let assignments = modifications.enumerate(&self.sequence);
        let mut ions = Vec::with_capacity(assignments.len() * charges.len());
        for assignment in &assignments {
            let (fixed, variable) = assignment.split();
            for &charge in charges.iter().filter(|&&z| z > 0) {
                ions.push(Ion {
                    charge,
                    mz: ion_mz(self.monoisotopic + assignment.mass_shift, charge),
                    mass_shift: assignment.mass_shift,
                    modification_fixed: fixed.to_string(),
                    modification_variable: variable.to_string(),
                });
            }
        }
        ions
    }
}

impl TryFrom<&str> for Peptide {
    type Error = char;

    fn try_from(sequence: &str) -> Result<Self, Self::Error> {
        Ok(Peptide {
            monoisotopic: monoisotopic(sequence)?,
            sequence: sequence.to_string(),
        })
    }
}

impl TryFrom<&Digest<'_>> for Peptide {
    type Error = char;

    fn try_from(value: &Digest<'_>) -> Result<Self, Self::Error> {
        Peptide::try_from(value.sequence)
    }
}

impl std::fmt::Display for Peptide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.sequence)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn invalid_residue() {
        assert_eq!(Peptide::try_from("PEPZIDE"), Err('Z'));
        let digest = Digest {
            sequence: "PEPTIDE",
            missed_cleavages: 0,
        };
        let peptide = Peptide::try_from(&digest).unwrap();
        assert_eq!(peptide.to_string(), "PEPTIDE");
    }

    #[test]
    fn unmodified_ions() {
        let peptide = Peptide::try_from("PEPTIDE").unwrap();
        let mods = Modifications {
            fixed: BTreeMap::new(),
            variable: BTreeMap::new(),
            encode_unmodified: true,
        };
        let ions = peptide.ions(&mods, &DEFAULT_CHARGES);
        assert_eq!(ions.len(), 2);
        assert_eq!(ions[0].charge, 2);
        assert!((ions[0].mz - 400.687259).abs() < 1E-5);
        assert_eq!(ions[1].charge, 3);
        assert!((ions[1].mz - 267.460598).abs() < 1E-5);
        assert!(ions.iter().all(|ion| ion.modification_fixed.is_empty()
            && ion.modification_variable.is_empty()));
    }

    #[test]
    fn modified_ions() {
        let peptide = Peptide::try_from("CAMK").unwrap();
        let ions = peptide.ions(&Modifications::default(), &[2]);
        // (C fixed + unmodified) x (M unmodified + oxidized)
        assert_eq!(ions.len(), 4);
        assert_eq!(ions[0].modification_fixed, "C[57.021464]");
        assert_eq!(ions[0].modification_variable, "");
        assert!((ions[0].mz - ion_mz(peptide.monoisotopic + 57.021464, 2)).abs() < 1E-9);
        assert_eq!(ions[1].modification_fixed, "");
        assert!((ions[1].mz - ion_mz(peptide.monoisotopic, 2)).abs() < 1E-9);
        assert_eq!(ions[2].modification_variable, "M3[15.994915]");
        assert_eq!(ions[3].modification_fixed, "");
        assert_eq!(ions[3].modification_variable, "M3[15.994915]");
    }
}
