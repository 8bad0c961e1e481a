use crate::aggregate::Aggregator;
use crate::enzyme::{CleavageRule, Digester};
use crate::fasta::Fasta;
use crate::modification::{validate_mods, Modifications};
use crate::peptide::DEFAULT_CHARGES;
use crate::pipeline::Pipeline;
use crate::DigestError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct EnzymeBuilder {
    /// One of the reference rules (trypsin, chymotrypsin, cnbr, proteinase_k,
    /// cutall). Ignored if `cleave_at` is set
    pub name: Option<String>,
    /// How many missed cleavages to use
    pub missed_cleavages: Option<u8>,
    /// Minimum peptide length, 0 disables the bound
    pub min_len: Option<usize>,
    /// Maximum peptide length, 0 disables the bound
    pub max_len: Option<usize>,
    /// Residues of a custom rule
    pub cleave_at: Option<String>,
    pub restrict: Option<char>,
    pub c_terminal: Option<bool>,
}

impl Default for EnzymeBuilder {
    fn default() -> Self {
        Self {
            name: Some("trypsin".into()),
            missed_cleavages: Some(0),
            min_len: Some(7),
            max_len: Some(45),
            cleave_at: None,
            restrict: None,
            c_terminal: None,
        }
    }
}

impl TryFrom<EnzymeBuilder> for Digester {
    type Error = DigestError;

    fn try_from(en: EnzymeBuilder) -> Result<Self, Self::Error> {
        let rule = match (en.cleave_at, en.name) {
            (Some(cleave_at), name) => CleavageRule::new(
                name.unwrap_or_else(|| "custom".into()),
                &cleave_at,
                en.restrict,
                en.c_terminal.unwrap_or(true),
            )?,
            (None, Some(name)) => CleavageRule::named(&name)?,
            (None, None) => return Err(DigestError::MissingEnzyme),
        };
        Ok(Digester::new(
            rule,
            en.min_len.unwrap_or(7),
            en.max_len.unwrap_or(45),
            en.missed_cleavages.unwrap_or(0),
        ))
    }
}

#[derive(Deserialize, Default, Clone, Debug)]
/// Parameters used for digesting a protein database
pub struct Builder {
    /// Enzymes applied one after another. Defaults to a single trypsin digest
    pub enzymes: Option<Vec<EnzymeBuilder>>,
    /// Static modifications to add to matching amino acids
    pub static_mods: Option<HashMap<String, f64>>,
    /// Variable modifications to add to matching amino acids
    pub variable_mods: Option<HashMap<String, f64>>,
    /// Also generate ions without the static modifications
    pub encode_unmodified: Option<bool>,
    /// Charge states of generated ions
    pub charges: Option<Vec<u8>>,
    /// Path to fasta database
    pub fasta: Option<String>,
}

impl Builder {
    pub fn make_parameters(self) -> Result<Parameters, DigestError> {
        let defaults = Modifications::default();
        let modifications = Modifications {
            fixed: match self.static_mods {
                Some(mods) => validate_mods(Some(mods)),
                None => defaults.fixed,
            },
            variable: match self.variable_mods {
                Some(mods) => validate_mods(Some(mods)),
                None => defaults.variable,
            },
            encode_unmodified: self
                .encode_unmodified
                .unwrap_or(defaults.encode_unmodified),
        };

        let mut charges = self.charges.unwrap_or_else(|| DEFAULT_CHARGES.to_vec());
        if charges.contains(&0) {
            log::warn!("ignoring charge state 0");
            charges.retain(|&z| z > 0);
        }
        charges.sort_unstable();
        charges.dedup();

        Ok(Parameters {
            enzymes: self
                .enzymes
                .unwrap_or_else(|| vec![EnzymeBuilder::default()]),
            modifications,
            charges,
            fasta: self.fasta.ok_or(DigestError::MissingFasta)?,
        })
    }

    pub fn update_fasta(&mut self, fasta: String) {
        self.fasta = Some(fasta)
    }
}

#[derive(Serialize, Clone, Debug)]
pub struct Parameters {
    pub enzymes: Vec<EnzymeBuilder>,
    pub modifications: Modifications,
    pub charges: Vec<u8>,
    pub fasta: String,
}

impl Parameters {
    pub fn pipeline(&self) -> Result<Pipeline, DigestError> {
        let stages = self
            .enzymes
            .iter()
            .cloned()
            .map(Digester::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Pipeline::new(stages)
    }

    /// Digest every protein of `fasta` with the configured enzymes
    pub fn build(&self, fasta: &Fasta) -> Result<Aggregator, DigestError> {
        log::trace!("digesting fasta");
        Ok(self.pipeline()?.run(&fasta.proteins))
    }
}
