use clap::{value_parser, Arg, Command, ValueHint};
use cleave_cli::input::Input;
use cleave_cli::runner::Runner;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::default()
        .filter_level(log::LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("CLEAVE_LOG", "error,cleave=info"))
        .init();

    let matches = Command::new("cleave")
        .version(clap::crate_version!())
        .author("The cleave developers")
        .about("In silico digestion of protein databases into peptides and ions")
        .arg(
            Arg::new("parameters")
                .required(true)
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help("Path to configuration parameters (JSON file)")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("fasta")
                .short('f')
                .long("fasta")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help(
                    "Path to FASTA database. Overrides the FASTA file \
                     specified in the configuration file.",
                )
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("output_directory")
                .short('o')
                .long("output_directory")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help(
                    "Path where peptide and ion tables will be written. \
                     Overrides the directory specified in the configuration file.",
                )
                .value_hint(ValueHint::DirPath),
        )
        .arg(
            Arg::new("batch-size")
                .long("batch-size")
                .value_parser(value_parser!(u32).range(1..))
                .help("Number of proteins to digest per batch (default = # of CPUs * 1024)")
                .value_hint(ValueHint::Other),
        )
        .arg(
            Arg::new("ions")
                .long("ions")
                .action(clap::ArgAction::SetTrue)
                .help("Write theoretical ion m/z values to `ions.tsv`"),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Written by {author-with-newline}Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    let input = Input::from_arguments(matches)?;

    let runner = input.build().and_then(Runner::new)?;

    runner.run()
}
