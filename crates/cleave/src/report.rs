use serde::Serialize;

use crate::aggregate::AggregationEntry;

/// Column names of the flat peptide report
pub const HEADER: [&str; 5] = [
    "peptide",
    "peptideLength",
    "#accessions",
    "#occurrences",
    "accessions",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// One line of the flat peptide report
pub struct Row {
    pub peptide: String,
    pub length: usize,
    pub accession_count: usize,
    pub occurrences: usize,
    /// Comma-joined, sorted
    pub accessions: String,
}

impl Row {
    pub fn new(peptide: &str, entry: &AggregationEntry) -> Self {
        Row {
            peptide: peptide.to_string(),
            length: peptide.len(),
            accession_count: entry.accessions.len(),
            occurrences: entry.occurrences,
            accessions: entry.accession_list(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::aggregate::Aggregator;
    use std::sync::Arc;

    #[test]
    fn row() {
        let mut agg = Aggregator::default();
        agg.merge("PEPTIDEK", &Arc::<str>::from("P2"));
        agg.merge("PEPTIDEK", &Arc::<str>::from("P1"));
        agg.merge("PEPTIDEK", &Arc::<str>::from("P1"));

        let row = Row::new("PEPTIDEK", agg.get("PEPTIDEK").unwrap());
        assert_eq!(
            row,
            Row {
                peptide: "PEPTIDEK".into(),
                length: 8,
                accession_count: 2,
                occurrences: 3,
                accessions: "P1,P2".into(),
            }
        );
    }
}
