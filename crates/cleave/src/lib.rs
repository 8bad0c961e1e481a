pub mod aggregate;
pub mod database;
pub mod enzyme;
pub mod fasta;
pub mod mass;
pub mod modification;
pub mod peptide;
pub mod pipeline;
pub mod report;

use std::path::Path;

#[derive(Debug)]
pub enum DigestError {
    /// No cleavage rule was configured
    MissingEnzyme,
    /// No reference rule with this name
    UnknownEnzyme(String),
    /// A custom cleavage rule could not be built
    InvalidRule(String),
    /// A protein record carried no sequence
    MissingSequence,
    /// No FASTA database was configured
    MissingFasta,
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for DigestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingEnzyme => f.write_str("no enzyme configured"),
            Self::UnknownEnzyme(name) => write!(
                f,
                "unknown enzyme '{}', expected one of: {}",
                name,
                enzyme::CleavageRule::names().collect::<Vec<_>>().join(", ")
            ),
            Self::InvalidRule(reason) => write!(f, "invalid cleavage rule: {}", reason),
            Self::MissingSequence => f.write_str("protein sequence is missing"),
            Self::MissingFasta => f.write_str("a fasta file must be provided"),
            Self::Io(e) => e.fmt(f),
            Self::Json(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for DigestError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for DigestError {
    fn from(e: std::io::Error) -> Self {
        DigestError::Io(e)
    }
}

impl From<serde_json::Error> for DigestError {
    fn from(e: serde_json::Error) -> Self {
        DigestError::Json(e)
    }
}

pub fn read_fasta<P: AsRef<Path>>(path: P) -> Result<fasta::Fasta, DigestError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(fasta::Fasta::parse(&contents))
}

pub fn read_json<P, T>(path: P) -> Result<T, DigestError>
where
    P: AsRef<Path>,
    T: for<'de> serde::Deserialize<'de>,
{
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}
