use regex::Regex;
use std::ops::Range;

use crate::mass::VALID_AA;
use crate::DigestError;

/// Reference cleavage rules: (name, cleavage residues, restricting suffix).
/// All of them cleave C-terminal to the site; `*` matches any residue
static RULES: [(&str, &str, Option<char>); 5] = [
    ("cutall", "*", None),
    ("trypsin", "KR", Some('P')),
    ("chymotrypsin", "FYWL", Some('P')),
    ("cnbr", "M", None),
    ("proteinase_k", "FYWLIAV", None),
];

fn is_residue(ch: char) -> bool {
    ch.is_ascii() && VALID_AA.contains(&(ch as u8))
}

#[derive(Clone, Debug)]
/// A site-specific cleavage rule
///
/// The rule only ever looks at the residue(s) immediately flanking a candidate
/// site, so splitting is a pure function of the sequence.
pub struct CleavageRule {
    name: String,
    // Regex for matching cleavage sites
    regex: Regex,
    // Skip cleaving if the site is flanked by this AA (followed for C-terminal
    // rules, preceded for N-terminal rules)
    pub skip_suffix: Option<char>,
    // Cleave at c-terminal?
    pub c_terminal: bool,
}

impl CleavageRule {
    pub fn new<S: Into<String>>(
        name: S,
        cleave: &str,
        skip_suffix: Option<char>,
        c_terminal: bool,
    ) -> Result<Self, DigestError> {
        if cleave.is_empty() {
            return Err(DigestError::InvalidRule(
                "cleavage sequence must not be empty".into(),
            ));
        }

        let invalid = match cleave {
            "*" => None,
            _ => cleave.chars().find(|x| !is_residue(*x)),
        };
        if let Some(ch) = invalid {
            return Err(DigestError::InvalidRule(format!(
                "cleavage sequence contains non-amino acid character: {}",
                ch
            )));
        }

        if let Some(ch) = skip_suffix.filter(|x| !is_residue(*x)) {
            return Err(DigestError::InvalidRule(format!(
                "cleavage restriction is non-amino acid character: {}",
                ch
            )));
        }

        let pattern = match cleave {
            "*" => String::from("(?s)."),
            _ => format!("[{}]", cleave),
        };

        Ok(CleavageRule {
            name: name.into(),
            regex: Regex::new(&pattern).map_err(|e| DigestError::InvalidRule(e.to_string()))?,
            skip_suffix,
            c_terminal,
        })
    }

    /// Look up one of the reference rules by (case-insensitive) name
    pub fn named(name: &str) -> Result<Self, DigestError> {
        let lower = name.to_ascii_lowercase();
        let lower = match lower.as_str() {
            "proteinasek" => "proteinase_k",
            other => other,
        };
        RULES
            .iter()
            .find(|(rule, _, _)| *rule == lower)
            .ok_or_else(|| DigestError::UnknownEnzyme(name.into()))
            .and_then(|(rule, cleave, skip)| CleavageRule::new(*rule, cleave, *skip, true))
    }

    /// Names of all reference rules
    pub fn names() -> impl Iterator<Item = &'static str> {
        RULES.iter().map(|(name, _, _)| *name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Partition `sequence` into the maximal fragments between cleavage sites.
    ///
    /// The returned ranges are contiguous, non-empty and cover the whole
    /// sequence; an empty sequence has no fragments.
    pub fn sites(&self, sequence: &str) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        if sequence.is_empty() {
            return ranges;
        }

        let mut left = 0;
        for mat in self.regex.find_iter(sequence) {
            let right = match self.c_terminal {
                true => mat.end(),
                false => mat.start(),
            };
            // Never cut at the protein termini
            if right == left || right >= sequence.len() {
                continue;
            }
            if let Some(skip) = self.skip_suffix {
                let restricted = match self.c_terminal {
                    true => sequence[right..].starts_with(skip),
                    false => sequence[..right].ends_with(skip),
                };
                if restricted {
                    continue;
                }
            }
            ranges.push(left..right);
            left = right;
        }
        ranges.push(left..sequence.len());
        ranges
    }

    /// Split `sequence` into its ordered base fragments
    pub fn split<'s>(&self, sequence: &'s str) -> Vec<&'s str> {
        self.sites(sequence)
            .into_iter()
            .map(|range| &sequence[range])
            .collect()
    }
}

impl PartialEq for CleavageRule {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.regex.as_str() == other.regex.as_str()
            && self.skip_suffix == other.skip_suffix
            && self.c_terminal == other.c_terminal
    }
}

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
/// An enzymatic digest, borrowed from the digested sequence
pub struct Digest<'s> {
    /// Cleaved peptide sequence
    pub sequence: &'s str,
    /// Missed cleavages
    pub missed_cleavages: u8,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Digester {
    pub rule: CleavageRule,
    /// Number of missed cleavages to produce
    pub missed_cleavages: u8,
    /// Inclusive, 0 disables the bound
    pub min_len: usize,
    /// Inclusive, 0 disables the bound
    pub max_len: usize,
}

/// Strip whitespace and upper-case a raw protein sequence
pub fn normalize(sequence: &str) -> String {
    sequence
        .chars()
        .filter(|ch| !ch.is_whitespace())
        .map(|ch| ch.to_ascii_uppercase())
        .collect()
}

impl Digester {
    pub fn new(rule: CleavageRule, min_len: usize, max_len: usize, missed_cleavages: u8) -> Self {
        Digester {
            rule,
            missed_cleavages,
            min_len,
            max_len,
        }
    }

    /// Does a peptide of length `len` pass the length bounds?
    pub fn in_bounds(&self, len: usize) -> bool {
        len > 0
            && (self.min_len == 0 || len >= self.min_len)
            && (self.max_len == 0 || len <= self.max_len)
    }

    /// Digest an already normalized sequence.
    ///
    /// Every run of `1..=missed_cleavages + 1` consecutive base fragments is
    /// produced, ordered by start fragment and then by the number of spanned
    /// fragments. Peptides occurring more than once are produced more than once.
    pub fn digest<'s>(&self, sequence: &'s str) -> Vec<Digest<'s>> {
        let sites = self.rule.sites(sequence);
        let mut digests = Vec::with_capacity(sites.len() * (self.missed_cleavages as usize + 1));

        for (start, first) in sites.iter().enumerate() {
            let last = (start + self.missed_cleavages as usize + 1).min(sites.len());
            for (missed, end) in sites[start..last].iter().enumerate() {
                if self.in_bounds(end.end - first.start) {
                    digests.push(Digest {
                        sequence: &sequence[first.start..end.end],
                        missed_cleavages: missed as u8,
                    });
                }
            }
        }
        digests
    }

    /// Normalize and digest a raw protein sequence
    pub fn digest_protein(&self, sequence: Option<&str>) -> Result<Vec<String>, DigestError> {
        let sequence = normalize(sequence.ok_or(DigestError::MissingSequence)?);
        Ok(self
            .digest(&sequence)
            .into_iter()
            .map(|digest| digest.sequence.to_string())
            .collect())
    }
}
