use std::{
    collections::{BTreeMap, HashMap},
    fmt::{Display, Write},
    str::FromStr,
};

use serde::Serialize;

use crate::mass::VALID_AA;

/// Joins the fixed half and the variable half of a modification label
pub const FIXED_MODIFICATION_SEPARATOR: &str = "---";

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// A residue that carries a modification
pub struct ModificationSite(pub u8);

impl Display for ModificationSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_char(self.0 as char)
    }
}

impl Serialize for ModificationSite {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InvalidModification {
    Empty,
    InvalidResidue(char),
    TooLong(String),
}

impl FromStr for ModificationSite {
    type Err = InvalidModification;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (None, _) => Err(InvalidModification::Empty),
            (Some(_), Some(_)) => Err(InvalidModification::TooLong(s.into())),
            (Some(c), None) => {
                if c.is_ascii() && VALID_AA.contains(&(c as u8)) {
                    Ok(ModificationSite(c as u8))
                } else {
                    Err(InvalidModification::InvalidResidue(c))
                }
            }
        }
    }
}

/// Parse a residue -> mass table, logging and skipping invalid residues
pub fn validate_mods(input: Option<HashMap<String, f64>>) -> BTreeMap<ModificationSite, f64> {
    let mut output = BTreeMap::new();
    if let Some(input) = input {
        for (s, mass) in input {
            match ModificationSite::from_str(&s) {
                Ok(m) => {
                    output.insert(m, mass);
                }
                Err(InvalidModification::Empty) => {
                    log::error!("Skipping invalid modification string: empty")
                }
                Err(InvalidModification::InvalidResidue(c)) => {
                    log::error!(
                        "Skipping invalid modification string: unrecognized residue ({})",
                        c
                    )
                }
                Err(InvalidModification::TooLong(s)) => {
                    log::error!("Skipping invalid modification string: {} is too long", s)
                }
            }
        }
    }
    output
}

#[derive(Clone, Debug, PartialEq, Serialize)]
/// One combination of modifications on a peptide
pub struct ModificationAssignment {
    /// e.g. `C[57.021464]---M5[15.994915]`
    pub label: String,
    pub mass_shift: f64,
}

impl ModificationAssignment {
    /// Split the label into its fixed and variable halves
    pub fn split(&self) -> (&str, &str) {
        split_label(&self.label, self.mass_shift)
    }
}

/// Split an encoded label into `(fixed, variable)`.
///
/// An unmodified assignment (zero mass shift) has two empty halves; a label
/// without separator only carries variable modifications.
pub fn split_label(label: &str, mass_shift: f64) -> (&str, &str) {
    if mass_shift == 0.0 {
        return ("", "");
    }
    match label.split_once(FIXED_MODIFICATION_SEPARATOR) {
        Some((fixed, variable)) => (fixed, variable),
        None => ("", label),
    }
}

fn write_mass(label: &mut String, mass: f64) {
    let mut buffer = ryu::Buffer::new();
    label.push('[');
    label.push_str(buffer.format(mass));
    label.push(']');
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Modifications {
    /// Applied to every occurrence of the residue
    pub fixed: BTreeMap<ModificationSite, f64>,
    /// Each occurrence of the residue may or may not be modified
    pub variable: BTreeMap<ModificationSite, f64>,
    /// Also emit the unprefixed assignments, modelling peptides where the
    /// fixed modifications are absent
    pub encode_unmodified: bool,
}

impl Default for Modifications {
    fn default() -> Self {
        Modifications {
            fixed: [(ModificationSite(b'C'), 57.021464)].into_iter().collect(),
            variable: [(ModificationSite(b'M'), 15.994915)].into_iter().collect(),
            encode_unmodified: true,
        }
    }
}

impl Modifications {
    /// Every combination of modifications on `sequence`.
    ///
    /// Each variable modifiable position doubles the number of assignments,
    /// the unmodified copy first. If any fixed modification applies, each
    /// assignment is emitted with the fixed label prefix and total fixed mass,
    /// followed by the unprefixed assignment when `encode_unmodified` is set.
    pub fn enumerate(&self, sequence: &str) -> Vec<ModificationAssignment> {
        let mut variable = vec![(String::new(), 0.0)];
        let mut fixed: BTreeMap<ModificationSite, usize> = BTreeMap::new();

        for (idx, residue) in sequence.bytes().enumerate() {
            let site = ModificationSite(residue);
            if self.fixed.contains_key(&site) {
                *fixed.entry(site).or_default() += 1;
            }
            if let Some(&mass) = self.variable.get(&site) {
                let modified = variable
                    .iter()
                    .map(|(label, shift)| {
                        let mut label = label.clone();
                        label.push(residue as char);
                        label.push_str(itoa::Buffer::new().format(idx + 1));
                        write_mass(&mut label, mass);
                        (label, shift + mass)
                    })
                    .collect::<Vec<_>>();
                variable.extend(modified);
            }
        }

        if fixed.is_empty() {
            return variable
                .into_iter()
                .map(|(label, mass_shift)| ModificationAssignment { label, mass_shift })
                .collect();
        }

        let mut prefix = String::new();
        let mut fixed_mass = 0.0;
        for (site, count) in fixed {
            let mass = self.fixed[&site];
            fixed_mass += mass * count as f64;
            prefix.push(site.0 as char);
            write_mass(&mut prefix, mass);
        }
        prefix.push_str(FIXED_MODIFICATION_SEPARATOR);

        let mut assignments = Vec::with_capacity(variable.len() * 2);
        for (label, mass_shift) in variable {
            assignments.push(ModificationAssignment {
                label: format!("{}{}", prefix, label),
                mass_shift: fixed_mass + mass_shift,
            });
            if self.encode_unmodified {
                assignments.push(ModificationAssignment { label, mass_shift });
            }
        }
        assignments
    }
}
