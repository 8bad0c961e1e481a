use rayon::prelude::*;

use crate::aggregate::Aggregator;
use crate::enzyme::Digester;
use crate::fasta::Protein;
use crate::mass::is_amino_acid_sequence;
use crate::DigestError;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// Non-fatal notices about a pipeline configuration. Processing continues
/// with the documented semantics.
pub enum Advisory {
    /// Chaining enzymes while allowing missed cleavages does not correspond to
    /// a well-defined biological digest
    MissedCleavagesWithMultipleEnzymes,
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Advisory::MissedCleavagesWithMultipleEnzymes => f.write_str(
                "multiple enzymes combined with missed cleavages > 0 will not produce a meaningful digest",
            ),
        }
    }
}

/// A chain of enzymes applied one after another.
///
/// The first enzyme digests proteins; every further enzyme digests the
/// distinct peptides produced by the enzyme before it. With more than one
/// enzyme, no stage filters by maximum length: long intermediates may still be
/// cut by a later enzyme, so the maximum length of the last stage is only
/// enforced once the chain has run.
#[derive(Clone, Debug)]
pub struct Pipeline {
    stages: Vec<Digester>,
    max_len: usize,
}

impl Pipeline {
    pub fn new(mut stages: Vec<Digester>) -> Result<Self, DigestError> {
        let max_len = stages.last().ok_or(DigestError::MissingEnzyme)?.max_len;
        if stages.len() > 1 {
            stages.iter_mut().for_each(|stage| stage.max_len = 0);
        }

        let pipeline = Pipeline { stages, max_len };
        for advisory in pipeline.warnings() {
            log::warn!("{}", advisory);
        }
        Ok(pipeline)
    }

    pub fn stages(&self) -> &[Digester] {
        &self.stages
    }

    /// Maximum peptide length enforced after the last stage
    pub fn max_len(&self) -> usize {
        self.max_len
    }

    pub fn warnings(&self) -> Vec<Advisory> {
        let mut warnings = Vec::new();
        if self.stages.len() > 1 && self.stages.iter().any(|s| s.missed_cleavages > 0) {
            warnings.push(Advisory::MissedCleavagesWithMultipleEnzymes);
        }
        warnings
    }

    /// Digest one protein with the first enzyme, recording each peptide in
    /// `aggregator`. Returns the number of peptides recorded.
    ///
    /// Fragments containing non amino acid characters are reported and
    /// skipped, the rest of the protein is still digested.
    pub fn digest_protein(&self, aggregator: &mut Aggregator, protein: &Protein) -> usize {
        let mut recorded = 0;
        for digest in self.stages[0].digest(&protein.sequence) {
            if !is_amino_acid_sequence(digest.sequence) {
                log::warn!(
                    "{}: skipping non-peptide sequence '{}'",
                    protein.accession,
                    digest.sequence
                );
                continue;
            }
            aggregator.merge(digest.sequence, &protein.accession);
            recorded += 1;
        }
        recorded
    }

    /// Digest a batch of proteins with the first enzyme, in parallel
    pub fn digest_proteins(&self, proteins: &[Protein]) -> Aggregator {
        proteins
            .par_iter()
            .fold(Aggregator::default, |mut aggregator, protein| {
                self.digest_protein(&mut aggregator, protein);
                aggregator
            })
            .reduce(Aggregator::default, Aggregator::combine)
    }

    /// Run the remaining enzymes over the peptides of the first one, then
    /// apply the deferred maximum length filter
    pub fn finish(&self, aggregator: Aggregator) -> Aggregator {
        let mut aggregator =
            self.stages[1..]
                .iter()
                .fold(aggregator, |aggregator, stage| {
                    log::info!(
                        "digesting {} peptides with {}",
                        aggregator.len(),
                        stage.rule.name()
                    );
                    let aggregator = aggregator.merge_round(stage);
                    log::info!(
                        "digestion with {} done, {} peptides",
                        stage.rule.name(),
                        aggregator.len()
                    );
                    aggregator
                });

        if self.stages.len() > 1 && self.max_len > 0 {
            let removed = aggregator.retain_len(self.max_len);
            log::info!(
                "removed {} peptides longer than {}, {} remaining",
                removed,
                self.max_len,
                aggregator.len()
            );
        }
        aggregator
    }

    /// Digest `proteins` with the whole chain of enzymes
    pub fn run(&self, proteins: &[Protein]) -> Aggregator {
        log::info!(
            "digesting {} proteins with {}",
            proteins.len(),
            self.stages[0].rule.name()
        );
        let aggregator = self.digest_proteins(proteins);
        log::info!(
            "digestion with {} done, {} peptides",
            self.stages[0].rule.name(),
            aggregator.len()
        );
        self.finish(aggregator)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::enzyme::CleavageRule;
    use std::sync::Arc;

    fn protein(accession: &str, sequence: &str) -> Protein {
        Protein {
            accession: Arc::from(accession),
            description: accession.into(),
            sequence: sequence.into(),
        }
    }

    fn digester(name: &str, min_len: usize, max_len: usize, missed: u8) -> Digester {
        Digester::new(CleavageRule::named(name).unwrap(), min_len, max_len, missed)
    }

    #[test]
    fn empty_chain() {
        assert!(matches!(
            Pipeline::new(Vec::new()),
            Err(DigestError::MissingEnzyme)
        ));
    }

    #[test]
    fn single_enzyme_keeps_bounds() {
        let pipeline = Pipeline::new(vec![digester("trypsin", 2, 4, 0)]).unwrap();
        assert_eq!(pipeline.stages()[0].max_len, 4);
        assert!(pipeline.warnings().is_empty());

        let agg = pipeline.run(&[protein("P1", "AAKAAAAAKCCR")]);
        assert_eq!(agg.iter().map(|(p, _)| p).collect::<Vec<_>>(), vec!["AAK", "CCR"]);
    }

    #[test]
    fn occurrences_across_proteins() {
        let pipeline = Pipeline::new(vec![digester("trypsin", 0, 0, 0)]).unwrap();
        let agg = pipeline.run(&[
            protein("P1", "DIGESTKAAKDIGESTK"),
            protein("P2", "DIGESTKCC"),
        ]);
        assert_eq!(agg.occurrences("DIGESTK"), Some(3));
        assert_eq!(agg.accessions("DIGESTK").unwrap().len(), 2);
        assert_eq!(agg.occurrences("AAK"), Some(1));
    }

    #[test]
    fn non_peptide_fragments_are_skipped() {
        let pipeline = Pipeline::new(vec![digester("trypsin", 0, 0, 0)]).unwrap();
        let mut agg = Aggregator::default();
        let recorded = pipeline.digest_protein(&mut agg, &protein("P1", "AAKB1XKCCR"));
        assert_eq!(recorded, 2);
        assert!(agg.contains("AAK"));
        assert!(agg.contains("CCR"));
        assert!(!agg.contains("B1XK"));
    }

    #[test]
    fn chained_enzymes_defer_max_len() {
        let pipeline = Pipeline::new(vec![
            digester("trypsin", 2, 5, 0),
            digester("cnbr", 2, 5, 0),
        ])
        .unwrap();
        assert!(pipeline.stages().iter().all(|s| s.max_len == 0));
        assert_eq!(pipeline.max_len(), 5);
        assert!(pipeline.warnings().is_empty());

        // AAMAAAAK is too long after trypsin but is cut by CNBr into AAM + AAAAK
        let agg = pipeline.run(&[protein("P1", "AAMAAAAKCCCCCCCCR")]);
        assert_eq!(
            agg.iter().map(|(p, _)| p).collect::<Vec<_>>(),
            vec!["AAAAK", "AAM"]
        );
        assert_eq!(agg.occurrences("AAM"), Some(1));
    }

    #[test]
    fn chained_enzymes_with_missed_cleavages_warn() {
        let pipeline = Pipeline::new(vec![
            digester("trypsin", 0, 0, 1),
            digester("cnbr", 0, 0, 0),
        ])
        .unwrap();
        assert_eq!(
            pipeline.warnings(),
            vec![Advisory::MissedCleavagesWithMultipleEnzymes]
        );
    }

    #[test]
    fn chained_enzymes_are_deterministic() {
        let proteins = vec![
            protein("P1", "MTEYKLVVVGAAGVGKSALTIQLIQNHFVDEYDPTIEDSYRKQVVIDGETCLLDILDTAG"),
            protein("P2", "REEYSAMRDQYMRTGEGFLCVFAINNTKSFEDIHHYREQIKRVKDSEDVPMVLVGNNCDL"),
            protein("P3", "MTEYKLVVVGAAGVGKSALTIQLIQNHFVDEYDPTIEDSYRKQVVIDGETCLLDILDTAG"),
        ];
        let pipeline = Pipeline::new(vec![
            digester("trypsin", 3, 20, 0),
            digester("chymotrypsin", 3, 20, 0),
        ])
        .unwrap();

        let collect = |agg: &Aggregator| {
            agg.iter()
                .map(|(p, e)| (p.to_string(), e.accession_list(), e.occurrences))
                .collect::<Vec<_>>()
        };
        let first = collect(&pipeline.run(&proteins));
        let second = collect(&pipeline.run(&proteins));
        assert!(!first.is_empty());
        assert_eq!(first, second);
        for (peptide, accessions, occurrences) in &first {
            assert!(peptide.len() >= 3 && peptide.len() <= 20);
            assert!(*occurrences >= accessions.split(',').count());
        }
    }
}
