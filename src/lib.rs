//! `genweights` turns Monte Carlo generator weights into flat
//! per-event tables and per-run sums.
//!
//! For each run, the LHE header is scanned for the scale variation
//! and PDF variation weight groups. Each event then yields a table
//! with the generator weight and tables with the selected LHE weights
//! relative to the nominal weight. At the end of each run, the sums of
//! all weights over the events are available as a single table.
//!
//! # How to use
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use genweights::prelude::*;
//!
//! let config = Config::builder()
//!     .gen_event("generator")
//!     .lhe_info("externalLHEProducer")
//!     .preferred_pdfs(vec![306000, 260000])
//!     .build();
//! let processor = RunProcessorBuilder::default()
//!     .aggregator(RunAggregator::new(config)?)
//!     .nstreams(4)
//!     .build()?;
//! let reader = FileReader::try_new("events.lhe.gz")?;
//! let run = reader.run(1);
//! let events = reader.collect::<Result<Vec<_>, _>>()?;
//! let output = processor.process_run(&run, &events)?;
//! println!("{:?}", output.counters.float("genEventSumw"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Most relevant modules
//!
//! - [prelude] exports a list of the most relevant classes and objects
//! - [aggregator] contains the per-run lifecycle hooks
//! - [processor] drives the hooks over parallel streams
//! - [header] for the LHE header scanner
//! - [event_tables] for the per-event tables
//! - [lhef] for reading Les Houches Event Files
//!

/// Per-run lifecycle of the weight tables
pub mod aggregator;
/// Settings
pub mod config;
/// Event weight counter
pub mod counter;
/// Event and run payloads
pub mod event;
/// Per-event weight tables
pub mod event_tables;
/// LHE header scanner
pub mod header;
/// Les Houches Event File interface
#[cfg(feature = "lhef")]
pub mod lhef;
/// Most important exports
pub mod prelude;
/// Parallel processing of runs
pub mod processor;
/// Progress bar
pub mod progress_bar;
/// Extended precision sums
pub mod sum;
/// Output tables
pub mod table;
/// Common traits
pub mod traits;
/// Per-run choice of LHE weights
pub mod weight_choice;

#[cfg(feature = "lhef")]
mod parsing;
mod util;

use lazy_static::lazy_static;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
lazy_static! {
    pub static ref VERSION_MAJOR: u32 =
        env!("CARGO_PKG_VERSION_MAJOR").parse().unwrap();
    pub static ref VERSION_MINOR: u32 =
        env!("CARGO_PKG_VERSION_MINOR").parse().unwrap();
    pub static ref VERSION_PATCH: u32 =
        env!("CARGO_PKG_VERSION_PATCH").parse().unwrap();
}
pub const GIT_REV: Option<&str> = option_env!("VERGEN_GIT_SHA");
pub const GIT_BRANCH: Option<&str> = option_env!("VERGEN_GIT_BRANCH");
