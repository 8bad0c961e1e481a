use super::input::Settings;
use anyhow::Context;
use cleave_core::aggregate::Aggregator;
use cleave_core::fasta::Fasta;
use cleave_core::pipeline::Pipeline;
use log::info;
use std::path::PathBuf;
use std::time::Instant;

pub struct Runner {
    pub parameters: Settings,
    pub pipeline: Pipeline,
    start: Instant,
}

impl Runner {
    pub fn new(parameters: Settings) -> anyhow::Result<Self> {
        let start = Instant::now();
        let pipeline = parameters
            .database
            .pipeline()
            .context("Failed to configure enzymes")?;
        Ok(Self {
            parameters,
            pipeline,
            start,
        })
    }

    // Create a path for `file_name` in the specified output directory
    pub(crate) fn make_path<S: AsRef<str>>(&self, file_name: S) -> PathBuf {
        self.parameters.output_directory.join(file_name.as_ref())
    }

    /// Digest `fasta` in batches of proteins, then run the remaining enzymes
    /// over the combined peptides
    pub fn digest(&self, fasta: &Fasta) -> Aggregator {
        let batches = fasta.proteins.chunks(self.parameters.batch_size.max(1));
        let mut peptides = Aggregator::default();
        for (batch_idx, batch) in batches.enumerate() {
            let start = Instant::now();
            let digested = self.pipeline.digest_proteins(batch);
            info!(
                "digested batch {} ({} proteins) into {} peptides in {}ms",
                batch_idx,
                batch.len(),
                digested.len(),
                start.elapsed().as_millis()
            );
            peptides = peptides.combine(digested);
        }

        let start = Instant::now();
        let peptides = self.pipeline.finish(peptides);
        info!(
            "aggregated {} distinct peptides in {}ms",
            peptides.len(),
            start.elapsed().as_millis()
        );
        peptides
    }

    pub fn run(mut self) -> anyhow::Result<()> {
        let path = &self.parameters.database.fasta;
        let fasta = cleave_core::read_fasta(path)
            .with_context(|| format!("Failed to read FASTA from `{}`", path))?;
        info!("read {} proteins from {}", fasta.len(), path);

        let peptides = self.digest(&fasta);

        let start = Instant::now();
        let path = self.write_peptides(&peptides)?;
        self.parameters.output_paths.push(path);
        if self.parameters.write_ions {
            let path = self.write_ions(&peptides)?;
            self.parameters.output_paths.push(path);
        }
        info!("- file IO: {:8} ms", start.elapsed().as_millis());

        let path = self.make_path("results.json");
        self.parameters
            .output_paths
            .push(path.to_string_lossy().into_owned());
        println!("{}", serde_json::to_string_pretty(&self.parameters)?);

        let bytes = serde_json::to_vec_pretty(&self.parameters)?;
        std::fs::write(&path, bytes)
            .with_context(|| format!("Failed to write `{}`", path.display()))?;

        let run_time = (Instant::now() - self.start).as_secs();
        info!("finished in {}s", run_time);
        Ok(())
    }
}
