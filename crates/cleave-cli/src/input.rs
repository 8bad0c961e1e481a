use anyhow::{ensure, Context};
use clap::ArgMatches;
use cleave_core::database::{Builder, Parameters};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Serialize)]
/// Actual digestion parameters - may include overrides or default values not set by user
pub struct Settings {
    pub version: String,
    pub database: Parameters,
    pub write_ions: bool,
    /// Number of proteins digested per batch
    pub batch_size: usize,
    pub output_paths: Vec<String>,

    #[serde(skip_serializing)]
    pub output_directory: PathBuf,
}

#[derive(Deserialize)]
/// Input digestion parameters deserialized from JSON file
pub struct Input {
    database: Builder,
    output_directory: Option<String>,
    write_ions: Option<bool>,
    batch_size: Option<usize>,
}

impl Input {
    pub fn from_arguments(matches: ArgMatches) -> anyhow::Result<Self> {
        let path = matches
            .get_one::<String>("parameters")
            .expect("required parameters");
        let mut input = Input::load(path)
            .with_context(|| format!("Failed to read parameters from `{path}`"))?;

        // Handle JSON configuration overrides
        if let Some(output_directory) = matches.get_one::<String>("output_directory") {
            log::trace!("overriding `output_directory` parameter.");
            input.output_directory = Some(output_directory.into());
        }
        if let Some(fasta) = matches.get_one::<String>("fasta") {
            log::trace!("overriding `database.fasta` parameter.");
            input.database.update_fasta(fasta.into());
        }
        if matches.get_flag("ions") {
            log::trace!("overriding `write_ions` parameter.");
            input.write_ions = Some(true);
        }
        if let Some(batch_size) = matches.get_one::<u32>("batch-size").copied() {
            log::trace!("overriding `batch_size` parameter.");
            input.batch_size = Some(batch_size as usize);
        }

        ensure!(
            input.database.fasta.is_some(),
            "`database.fasta` must be set. For more information try '--help'"
        );

        Ok(input)
    }

    pub fn load<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        cleave_core::read_json(path).map_err(anyhow::Error::from)
    }

    pub fn build(self) -> anyhow::Result<Settings> {
        let database = self.database.make_parameters()?;

        if database.enzymes.len() > 1
            && database
                .enzymes
                .iter()
                .any(|enzyme| enzyme.max_len.is_some())
        {
            log::warn!(
                "`max_len` is only applied after the last enzyme when multiple enzymes are used"
            );
        }
        if database.charges.is_empty() {
            log::warn!("no charge states configured, no ions will be generated");
        }

        let batch_size = match self.batch_size {
            Some(0) => {
                log::warn!("`batch_size` must be positive, using 1");
                1
            }
            Some(n) => n,
            None => num_cpus::get() * 1024,
        };

        let output_directory = match self.output_directory {
            Some(path) => {
                let path = PathBuf::from(path);
                std::fs::create_dir_all(&path)
                    .with_context(|| format!("Failed to create `{}`", path.display()))?;
                path
            }
            None => std::env::current_dir()?,
        };

        Ok(Settings {
            version: clap::crate_version!().into(),
            database,
            write_ions: self.write_ions.unwrap_or(false),
            batch_size,
            output_paths: Vec::new(),
            output_directory,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let input: Input = serde_json::from_str(r#"{ "database": { "fasta": "db.fasta" } }"#).unwrap();
        let dir = std::env::temp_dir().join("cleave-input-defaults");
        let input = Input {
            output_directory: Some(dir.to_string_lossy().into_owned()),
            ..input
        };
        let settings = input.build().unwrap();
        assert!(!settings.write_ions);
        assert!(settings.batch_size > 0);
        assert_eq!(settings.output_directory, dir);
        assert!(dir.is_dir());
        assert_eq!(settings.database.fasta, "db.fasta");
        assert_eq!(settings.database.charges, vec![2, 3]);
    }

    #[test]
    fn missing_fasta() {
        let input: Input = serde_json::from_str(r#"{ "database": {} }"#).unwrap();
        assert!(input.build().is_err());
    }
}
