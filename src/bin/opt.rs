use std::path::PathBuf;

use clap::Parser;
use genweights::config::{Config, ConfigError};

const DEFAULT_GEN_EVENT: &str = "generator";
const DEFAULT_LHE_INFO: &str = "externalLHEProducer";

#[derive(Debug, Parser)]
#[clap(about, author, version)]
pub(crate) struct Opt {
    /// Settings file in YAML format.
    ///
    /// Options given on the command line take precedence over
    /// the settings in the file.
    #[clap(long, short, value_parser)]
    pub(crate) config: Option<PathBuf>,

    /// Label of the generator event information.
    #[clap(long)]
    pub(crate) gen_event: Option<String>,

    /// Label of the LHE event and run information.
    #[clap(long)]
    pub(crate) lhe_info: Option<String>,

    /// Comma-separated LHA ids of PDF sets in order of preference.
    #[clap(long, value_delimiter = ',')]
    pub(crate) preferred_pdfs: Vec<u32>,

    /// Comma-separated ids of weights to store individually.
    #[clap(long, value_delimiter = ',')]
    pub(crate) named_weight_ids: Vec<String>,

    /// Comma-separated column labels for the named weights.
    #[clap(long, value_delimiter = ',')]
    pub(crate) named_weight_labels: Vec<String>,

    /// Log details of the first run header and the first LHE event.
    #[clap(long)]
    pub(crate) debug: bool,

    /// Output file for the run summaries in YAML format.
    ///
    /// If not given, the summaries are written to standard output.
    #[clap(long, short, value_parser)]
    pub(crate) outfile: Option<PathBuf>,

    /// Include the weight tables for each event in the output.
    #[clap(long)]
    pub(crate) dump_events: bool,

    /// Number of parallel streams per run.
    #[clap(long, default_value = "1")]
    pub(crate) streams: usize,

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

    /// Les Houches Event input files, one per run.
    #[clap(name = "INFILES", value_parser)]
    pub(crate) infiles: Vec<PathBuf>,
}

impl Opt {
    /// Settings from the settings file and the command line
    pub(crate) fn settings(&self) -> Result<Config, ConfigError> {
        let mut config = match &self.config {
            Some(file) => Config::from_file(file)?,
            None => Config::builder()
                .gen_event(DEFAULT_GEN_EVENT)
                .lhe_info(DEFAULT_LHE_INFO)
                .build(),
        };
        if let Some(gen_event) = &self.gen_event {
            config.gen_event = gen_event.clone();
        }
        if let Some(lhe_info) = &self.lhe_info {
            config.lhe_info = lhe_info.clone();
        }
        if !self.preferred_pdfs.is_empty() {
            config.preferred_pdfs = self.preferred_pdfs.clone();
        }
        if !self.named_weight_ids.is_empty() {
            config.named_weight_ids = self.named_weight_ids.clone();
        }
        if !self.named_weight_labels.is_empty() {
            config.named_weight_labels = self.named_weight_labels.clone();
        }
        config.debug |= self.debug;
        config.validate()
    }
}
