use std::sync::Arc;

use crate::enzyme::normalize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Protein {
    /// First whitespace-delimited token of the header
    pub accession: Arc<str>,
    /// Remainder of the header, or the accession if there is none
    pub description: String,
    /// Upper-cased, whitespace-free sequence
    pub sequence: String,
}

#[derive(Clone, Debug, Default)]
pub struct Fasta {
    pub proteins: Vec<Protein>,
}

fn record(header: &str, sequence: String) -> Protein {
    let header = header.trim();
    let (accession, description) = match header.split_once(char::is_whitespace) {
        Some((accession, rest)) if !rest.trim().is_empty() => (accession, rest.trim()),
        Some((accession, _)) => (accession, accession),
        None => (header, header),
    };
    Protein {
        accession: Arc::from(accession),
        description: description.to_string(),
        sequence,
    }
}

impl Fasta {
    // Parse a string into a fasta database
    pub fn parse(contents: &str) -> Fasta {
        let mut proteins = Vec::new();
        let mut last_id: Option<&str> = None;
        let mut s = String::new();

        let mut flush = |id: Option<&str>, s: &mut String| match id {
            Some(id) if !s.is_empty() => proteins.push(record(id, std::mem::take(s))),
            Some(id) => log::warn!("skipping FASTA entry without sequence: {}", id.trim()),
            // Sequence lines before the first header
            None if !s.is_empty() => {
                log::warn!("skipping {} residues without FASTA header", s.len());
                s.clear();
            }
            None => {}
        };

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if let Some(id) = line.strip_prefix('>') {
                flush(last_id, &mut s);
                last_id = Some(id);
            } else {
                s.push_str(&normalize(line));
            }
        }
        flush(last_id, &mut s);

        Fasta { proteins }
    }

    pub fn len(&self) -> usize {
        self.proteins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proteins.is_empty()
    }
}
