use cleave_core::database::{Builder, EnzymeBuilder};
use cleave_core::enzyme::{CleavageRule, Digester};
use cleave_core::mass::ion_mz;
use cleave_core::modification::Modifications;
use cleave_core::peptide::{Peptide, DEFAULT_CHARGES};
use cleave_core::pipeline::Pipeline;
use cleave_core::report::Row;

const FASTA: &str = "../../tests/Q99536.fasta";

#[test]
fn read_fasta() {
    let fasta = cleave_core::read_fasta(FASTA).unwrap();
    assert_eq!(fasta.len(), 2);
    assert_eq!(&*fasta.proteins[0].accession, "sp|Q99536|VAT1_HUMAN");
    assert!(fasta.proteins[0].sequence.starts_with("MSDEREVAEAATGEDASSPPPK"));
    assert!(fasta.proteins[0].sequence.ends_with("VLLVPGPEKEN"));
    assert_eq!(
        fasta.proteins[1].sequence,
        "CLVLTGFGGYDKCLVLTGFGGYDK"
    );

    assert!(matches!(
        cleave_core::read_fasta("../../tests/missing.fasta"),
        Err(cleave_core::DigestError::Io(_))
    ));
}

#[test]
fn tryptic_digest() {
    let fasta = cleave_core::read_fasta(FASTA).unwrap();
    let parameters = Builder {
        fasta: Some(FASTA.into()),
        ..Default::default()
    }
    .make_parameters()
    .unwrap();
    let peptides = parameters.build(&fasta).unwrap();

    for peptide in [
        "EVAEAATGEDASSPPPK",
        "TEAASDPQHPAASEGAAAAAASPPLLR",
        "LQSRPAAPPAPGPGQLTLR",
        "ACGLNFADLMAR",
    ] {
        assert_eq!(peptides.occurrences(peptide), Some(1), "{}", peptide);
    }
    // too short
    assert!(!peptides.contains("MSDER"));
    assert!(!peptides.contains("VK"));

    let entry = peptides.get("CLVLTGFGGYDK").unwrap();
    assert_eq!(entry.occurrences, 3);
    assert_eq!(entry.accession_list(), "sp|Q99536|VAT1_HUMAN,tr|TEST01|DUPLICATE");

    let row = Row::new("CLVLTGFGGYDK", entry);
    assert_eq!((row.length, row.accession_count, row.occurrences), (12, 2, 3));

    for (peptide, entry) in peptides.iter() {
        assert!(peptide.len() >= 7 && peptide.len() <= 45);
        assert!(entry.occurrences >= entry.accessions.len());
    }
}

#[test]
fn missed_cleavages() {
    let fasta = cleave_core::read_fasta(FASTA).unwrap();
    let parameters = Builder {
        enzymes: Some(vec![EnzymeBuilder {
            missed_cleavages: Some(1),
            ..Default::default()
        }]),
        fasta: Some(FASTA.into()),
        ..Default::default()
    }
    .make_parameters()
    .unwrap();
    let peptides = parameters.build(&fasta).unwrap();

    assert!(peptides.contains("EVAEAATGEDASSPPPK"));
    assert!(peptides.contains("MSDEREVAEAATGEDASSPPPK"));
    // only the repeat protein carries two adjacent copies
    assert_eq!(peptides.occurrences("CLVLTGFGGYDKCLVLTGFGGYDK"), Some(1));
    assert!(peptides.contains("CLVLTGFGGYDKVK"));
}

#[test]
fn chained_digest_matches_manual_chain() {
    let fasta = cleave_core::read_fasta(FASTA).unwrap();
    let trypsin = || Digester::new(CleavageRule::named("trypsin").unwrap(), 5, 20, 0);
    let cnbr = || Digester::new(CleavageRule::named("cnbr").unwrap(), 5, 20, 0);

    let pipeline = Pipeline::new(vec![trypsin(), cnbr()]).unwrap();
    let peptides = pipeline.run(&fasta.proteins);

    // ACGLNFADLMAR is cut by CNBr after the methionine
    assert!(!peptides.contains("ACGLNFADLMAR"));
    assert!(peptides.contains("ACGLNFADLM"));
    for (peptide, _) in peptides.iter() {
        assert!(peptide.len() >= 5 && peptide.len() <= 20);
    }

    // Every peptide is a CNBr product of some tryptic peptide
    let unbounded = Digester::new(CleavageRule::named("trypsin").unwrap(), 5, 0, 0);
    let cnbr = Digester::new(CleavageRule::named("cnbr").unwrap(), 5, 20, 0);
    let mut expected = fasta
        .proteins
        .iter()
        .flat_map(|protein| unbounded.digest(&protein.sequence))
        .flat_map(|digest| cnbr.digest(digest.sequence))
        .map(|digest| digest.sequence.to_string())
        .collect::<Vec<_>>();
    expected.sort();
    expected.dedup();
    assert_eq!(
        peptides.iter().map(|(p, _)| p.to_string()).collect::<Vec<_>>(),
        expected
    );
}

#[test]
fn ions_for_digested_peptide() {
    let peptide = Peptide::try_from("ACGLNFADLMAR").unwrap();
    let ions = peptide.ions(&Modifications::default(), &DEFAULT_CHARGES);
    // C fixed (with and without) x M variable, at two charge states
    assert_eq!(ions.len(), 8);
    assert_eq!(ions[0].modification_fixed, "C[57.021464]");
    assert_eq!(ions[0].charge, 2);
    assert!((ions[0].mz - ion_mz(peptide.monoisotopic + 57.021464, 2)).abs() < 1E-9);
    assert_eq!(ions[7].modification_fixed, "");
    assert_eq!(ions[7].modification_variable, "M10[15.994915]");
    assert_eq!(ions[7].charge, 3);
}
