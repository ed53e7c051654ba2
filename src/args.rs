use clap::Parser;

/// This is a console viewer for synthetic election results.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON file describing the election: candidates, areas, ages and
    /// voter count. The built-in election is used when not provided.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path or ':memory:', optional) An SQLite database holding the voter roll. The roll is
    /// written the first time and read back on later runs. Overrides the database of the --config file.
    #[clap(long, value_parser)]
    pub db: Option<String>,

    /// (integer, optional) The seed of the random generator. Runs with the same seed and
    /// configuration produce the same roll.
    #[clap(short, long, value_parser)]
    pub seed: Option<u64>,

    /// (integer, optional) The number of voters to generate. Overrides the --config file.
    #[clap(short = 'n', long, value_parser)]
    pub count: Option<u32>,

    /// (file path, 'stdout' or empty) If specified, the summary of the results will be written in JSON
    /// format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, tallyview will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// If passed, the viewer does not read commands and exits after writing the summary.
    #[clap(long, takes_value = false)]
    pub batch: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
