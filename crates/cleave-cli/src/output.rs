use cleave_core::aggregate::Aggregator;
use cleave_core::peptide::{Ion, Peptide};
use cleave_core::report::{Row, HEADER};
use csv::ByteRecord;
use rayon::prelude::*;

use crate::runner::Runner;

impl Runner {
    pub fn serialize_row(&self, row: &Row) -> ByteRecord {
        let mut record = ByteRecord::new();
        record.push_field(row.peptide.as_bytes());
        record.push_field(itoa::Buffer::new().format(row.length).as_bytes());
        record.push_field(itoa::Buffer::new().format(row.accession_count).as_bytes());
        record.push_field(itoa::Buffer::new().format(row.occurrences).as_bytes());
        record.push_field(row.accessions.as_bytes());
        record
    }

    pub fn serialize_ion(&self, peptide: &str, ion: &Ion) -> ByteRecord {
        let mut record = ByteRecord::new();
        record.push_field(peptide.as_bytes());
        record.push_field(itoa::Buffer::new().format(ion.charge).as_bytes());
        record.push_field(ion.modification_fixed.as_bytes());
        record.push_field(ion.modification_variable.as_bytes());
        record.push_field(ryu::Buffer::new().format(ion.mz).as_bytes());
        record
    }

    pub fn write_peptides(&self, peptides: &Aggregator) -> anyhow::Result<String> {
        let path = self.make_path("peptides.tsv");

        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_path(&path)?;

        wtr.write_byte_record(&ByteRecord::from(HEADER.to_vec()))?;
        for (peptide, entry) in peptides.iter() {
            wtr.write_byte_record(&self.serialize_row(&Row::new(peptide, entry)))?;
        }

        wtr.flush()?;
        Ok(path.to_string_lossy().into_owned())
    }

    pub fn write_ions(&self, peptides: &Aggregator) -> anyhow::Result<String> {
        let path = self.make_path("ions.tsv");

        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_path(&path)?;

        let headers = ByteRecord::from(vec![
            "peptide",
            "charge",
            "modification_fixed",
            "modification_variable",
            "mass_to_charge",
        ]);
        wtr.write_byte_record(&headers)?;

        let modifications = &self.parameters.database.modifications;
        let charges = &self.parameters.database.charges;
        let sequences = peptides.iter().map(|(p, _)| p).collect::<Vec<_>>();
        let records = sequences
            .into_par_iter()
            .filter_map(|sequence| match Peptide::try_from(sequence) {
                Ok(peptide) => Some(peptide),
                Err(ch) => {
                    log::warn!("skipping ions of {}: invalid residue {}", sequence, ch);
                    None
                }
            })
            .flat_map_iter(|peptide| {
                peptide
                    .ions(modifications, charges)
                    .into_iter()
                    .map(move |ion| self.serialize_ion(&peptide.sequence, &ion))
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();

        log::info!("writing {} ions", records.len());
        for record in records {
            wtr.write_byte_record(&record)?;
        }

        wtr.flush()?;
        Ok(path.to_string_lossy().into_owned())
    }
}
