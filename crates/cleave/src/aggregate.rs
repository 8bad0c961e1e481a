use fnv::FnvHashMap;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::enzyme::Digester;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Everything known about one distinct peptide sequence
pub struct AggregationEntry {
    /// Proteins that produced this peptide, sorted and deduplicated
    pub accessions: BTreeSet<Arc<str>>,
    /// Every time the peptide was produced, including repeats within a
    /// protein and repeats from different missed cleavage windows
    pub occurrences: usize,
}

impl AggregationEntry {
    /// Comma-joined accession list, in sorted order
    pub fn accession_list(&self) -> String {
        self.accessions
            .iter()
            .map(|accession| &**accession)
            .collect::<Vec<&str>>()
            .join(",")
    }

    fn absorb(&mut self, other: AggregationEntry) {
        if self.accessions.len() < other.accessions.len() {
            let mine = std::mem::replace(&mut self.accessions, other.accessions);
            self.accessions.extend(mine);
        } else {
            self.accessions.extend(other.accessions);
        }
        self.occurrences += other.occurrences;
    }
}

/// Accumulates peptide -> (accessions, occurrence count) across all
/// processed proteins and digestion rounds.
///
/// The aggregator never flushes itself: callers poll [`Aggregator::needs_flush`]
/// at batch boundaries and [`Aggregator::drain`] or [`Aggregator::clear`] it.
#[derive(Clone, Debug, Default)]
pub struct Aggregator {
    entries: FnvHashMap<String, AggregationEntry>,
    // Remaining occurrence weight of peptides that were cut by a later
    // digestion round. If a later round produces them again, counting
    // resumes from here.
    retired: FnvHashMap<String, usize>,
}

fn combine_entries(
    mut lhs: FnvHashMap<String, AggregationEntry>,
    mut rhs: FnvHashMap<String, AggregationEntry>,
) -> FnvHashMap<String, AggregationEntry> {
    if lhs.len() < rhs.len() {
        std::mem::swap(&mut lhs, &mut rhs);
    }
    for (peptide, entry) in rhs {
        lhs.entry(peptide).or_default().absorb(entry);
    }
    lhs
}

impl Aggregator {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, peptide: &str) -> bool {
        self.entries.contains_key(peptide)
    }

    pub fn get(&self, peptide: &str) -> Option<&AggregationEntry> {
        self.entries.get(peptide)
    }

    pub fn occurrences(&self, peptide: &str) -> Option<usize> {
        self.entries.get(peptide).map(|entry| entry.occurrences)
    }

    pub fn accessions(&self, peptide: &str) -> Option<&BTreeSet<Arc<str>>> {
        self.entries.get(peptide).map(|entry| &entry.accessions)
    }

    /// Record one sighting of `peptide` in the protein `accession`
    pub fn merge(&mut self, peptide: &str, accession: &Arc<str>) {
        let entry = match self.entries.get_mut(peptide) {
            Some(entry) => entry,
            None => {
                let occurrences = self.retired.remove(peptide).unwrap_or(0);
                self.entries
                    .entry(peptide.to_string())
                    .or_insert(AggregationEntry {
                        accessions: BTreeSet::new(),
                        occurrences,
                    })
            }
        };
        if !entry.accessions.contains(accession) {
            entry.accessions.insert(accession.clone());
        }
        entry.occurrences += 1;
    }

    /// Merge two aggregators built from disjoint batches of proteins.
    ///
    /// Commutative and associative: accessions are unioned and occurrence
    /// counts are summed.
    pub fn combine(self, other: Aggregator) -> Aggregator {
        let entries = combine_entries(self.entries, other.entries);
        let (mut retired, other) = match self.retired.len() >= other.retired.len() {
            true => (self.retired, other.retired),
            false => (other.retired, self.retired),
        };
        for (peptide, count) in other {
            *retired.entry(peptide).or_default() += count;
        }
        Aggregator { entries, retired }
    }

    /// Digest every distinct peptide with the next enzyme of a chain.
    ///
    /// Each derived peptide inherits the accessions of its source and gains
    /// one occurrence per source accession; the source loses the same weight.
    /// A peptide left uncut by `digester` therefore keeps its count.
    pub fn merge_round(self, digester: &Digester) -> Aggregator {
        let Aggregator {
            entries: previous,
            mut retired,
        } = self;

        let derived = previous
            .par_iter()
            .fold(
                FnvHashMap::default,
                |mut acc: FnvHashMap<String, AggregationEntry>, (source, entry)| {
                    for digest in digester.digest(source) {
                        let target = match acc.get_mut(digest.sequence) {
                            Some(target) => target,
                            None => acc.entry(digest.sequence.to_string()).or_default(),
                        };
                        target.accessions.extend(entry.accessions.iter().cloned());
                        target.occurrences += entry.accessions.len();
                    }
                    acc
                },
            )
            .reduce(FnvHashMap::default, combine_entries);

        let mut entries = FnvHashMap::default();
        entries.reserve(derived.len());
        for (peptide, mut entry) in derived {
            entry.occurrences += match previous.get(&peptide) {
                Some(source) => source.occurrences.saturating_sub(source.accessions.len()),
                None => retired.remove(&peptide).unwrap_or(0),
            };
            entries.insert(peptide, entry);
        }

        for (peptide, source) in previous {
            if !entries.contains_key(&peptide) {
                let remaining = source.occurrences.saturating_sub(source.accessions.len());
                retired.insert(peptide, remaining);
            }
        }

        Aggregator { entries, retired }
    }

    /// Remove every peptide longer than `max_len`, returning how many were removed
    pub fn retain_len(&mut self, max_len: usize) -> usize {
        let before = self.entries.len();
        self.entries.retain(|peptide, _| peptide.len() <= max_len);
        before - self.entries.len()
    }

    /// All entries, sorted by peptide sequence
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AggregationEntry)> {
        let mut entries = self
            .entries
            .iter()
            .map(|(peptide, entry)| (peptide.as_str(), entry))
            .collect::<Vec<_>>();
        entries.par_sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries.into_iter()
    }

    /// Has the number of distinct peptides reached `threshold`? A threshold
    /// of 0 never triggers.
    pub fn needs_flush(&self, threshold: usize) -> bool {
        threshold > 0 && self.entries.len() >= threshold
    }

    /// Take every entry out of the aggregator, sorted by peptide, and reset it
    pub fn drain(&mut self) -> Vec<(String, AggregationEntry)> {
        let mut entries = self.entries.drain().collect::<Vec<_>>();
        self.retired.clear();
        entries.par_sort_unstable_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.retired.clear();
    }
}
