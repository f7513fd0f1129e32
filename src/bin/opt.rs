use std::path::PathBuf;

use clap::Parser;
use gteff::config::ClusterSource;

#[derive(Debug, Parser)]
#[clap(about, author, version)]
pub(crate) struct Opt {
    /// Configuration file in YAML format.
    ///
    /// Without a configuration file, the SuperNEMO calorimeter geometry
    /// and default analysis settings are used.
    #[clap(long, short, value_parser)]
    pub(crate) config: Option<PathBuf>,

    /// Write the efficiency report in YAML format to this file.
    #[clap(long, short, value_parser)]
    pub(crate) report: Option<PathBuf>,

    /// Write the diagnostic histograms in YAML format to this file.
    #[clap(long, value_parser)]
    pub(crate) histograms: Option<PathBuf>,

    /// Maximum time difference in ns between consecutive hits of a
    /// cluster. Overrides the configuration file.
    #[clap(long)]
    pub(crate) time_gap: Option<f64>,

    #[clap(
        long,
        value_parser = parse_cluster_source,
        help = "Calorimeter hits used for clustering. Overrides the configuration file.
Possible values are 'calibrated' and 'neutral-tracks'."
    )]
    pub(crate) cluster_source: Option<ClusterSource>,

    /// Verbosity level
    #[clap(
        short,
        long,
        default_value = "Info",
        help = "Verbosity level.
Possible values with increasing amount of output are
'off', 'error', 'warn', 'info', 'debug', 'trace'.\n"
    )]
    pub(crate) loglevel: String,

    #[clap(
        short,
        long,
        default_value_t,
        help = "Number of threads.
If set to 0, a default number of threads is chosen.
The default can be set with the `RAYON_NUM_THREADS` environment
variable."
    )]
    pub(crate) threads: usize,

    /// Number of events that are read and analysed together.
    #[clap(long, default_value = "1000", value_parser = parse_batch_size)]
    pub(crate) batch_size: usize,

    /// Input event files
    #[clap(name = "INFILES", value_parser, required = true)]
    pub(crate) infiles: Vec<PathBuf>,
}

fn parse_cluster_source(s: &str) -> Result<ClusterSource, strum::ParseError> {
    s.to_ascii_lowercase().parse()
}

fn parse_batch_size(s: &str) -> Result<usize, String> {
    match s.parse() {
        Ok(0) => Err("Batch size has to be positive".to_owned()),
        Ok(n) => Ok(n),
        Err(err) => Err(format!("{err}")),
    }
}
