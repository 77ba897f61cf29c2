use std::sync::Arc;

use log::{debug, info};
use parking_lot::Mutex;

use crate::{
    config::{Config, ConfigError},
    counter::Counter,
    event::{Event, Run},
    event_tables::{EventError, EventTableBuilder, EventTables},
    header::{HeaderParser, ParseError},
    table::MergableCounterTable,
    traits::Merge,
    weight_choice::WeightChoice,
};

/// Counter collecting the contributions of all streams of a run
///
/// Stream contributions are merged under a lock, so streams may
/// finish in any order and on any thread.
#[derive(Debug, Default)]
pub struct RunSummary(Mutex<Counter>);

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the contribution of one stream
    pub fn merge(&self, counter: &Counter) {
        self.0.lock().merge(counter)
    }

    /// Snapshot of the current totals
    pub fn counter(&self) -> Counter {
        self.0.lock().clone()
    }
}

/// Generator weight tables over the lifetime of a job
///
/// The hooks are called by the event loop in the following order for
/// each run:
///
/// 1. [global_begin_run](RunAggregator::global_begin_run) and
///    [global_begin_run_summary](RunAggregator::global_begin_run_summary)
/// 2. for each stream: [stream_begin_run](RunAggregator::stream_begin_run),
///    [produce](RunAggregator::produce) for each event,
///    [stream_end_run_summary](RunAggregator::stream_end_run_summary)
/// 3. [global_end_run_summary](RunAggregator::global_end_run_summary)
///    and [global_end_run_produce](RunAggregator::global_end_run_produce)
///
/// Stream counters are created with [begin_stream](RunAggregator::begin_stream).
#[derive(Debug)]
pub struct RunAggregator {
    config: Config,
    parser: HeaderParser,
    tables: EventTableBuilder,
}

impl RunAggregator {
    /// Construct from the given settings
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let config = config.validate()?;
        let parser =
            HeaderParser::new(config.preferred_pdfs.clone(), config.debug);
        let tables = EventTableBuilder::new(&config)?;
        Ok(Self {
            config,
            parser,
            tables,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Fresh counter owned by a new stream
    pub fn begin_stream(&self) -> Counter {
        Counter::new()
    }

    /// Reset the stream counter at the beginning of a run
    pub fn stream_begin_run(&self, counter: &mut Counter) {
        counter.clear()
    }

    /// Determine the choice of LHE weights for a run
    ///
    /// The result is shared by all streams processing events of
    /// the run.
    pub fn global_begin_run(
        &self,
        run: &Run,
    ) -> Result<Arc<WeightChoice>, ParseError> {
        self.tables.rearm_warning();
        if run.lhe.is_none() {
            debug!(
                "No LHE run information with label {} in run {}",
                self.config.lhe_info, run.number
            );
        }
        let choice = self.parser.parse(run.lhe.as_ref())?;
        info!(
            "Run {}: {} scale variation weights, {} PDF weights",
            run.number,
            choice.scale_weight_ids.len(),
            choice.pdf_weight_ids.len()
        );
        Ok(Arc::new(choice))
    }

    /// Empty counter for the contributions of all streams
    pub fn global_begin_run_summary(&self) -> RunSummary {
        RunSummary::new()
    }

    /// Build the tables for a single event
    pub fn produce(
        &self,
        counter: &mut Counter,
        choice: &WeightChoice,
        event: &Event,
    ) -> Result<EventTables, EventError> {
        self.tables.fill(counter, choice, event)
    }

    /// Add the stream counter to the run summary
    pub fn stream_end_run_summary(&self, counter: &Counter, summary: &RunSummary) {
        summary.merge(counter)
    }

    pub fn global_end_run_summary(&self, run: &Run, summary: &RunSummary) {
        let counter = summary.counter();
        debug!(
            "Run {}: {} events, sum of weights {:e}",
            run.number,
            counter.num(),
            counter.sumw()
        );
    }

    /// The per-run table of summed weights
    pub fn global_end_run_produce(&self, summary: &RunSummary) -> MergableCounterTable {
        let counter = summary.counter();
        let mut out = MergableCounterTable::new();
        out.add_int("genEventCount", "event count", counter.num());
        out.add_float("genEventSumw", "sum of gen weights", counter.sumw());
        out.add_float("genEventSumw2", "sum of gen (weight^2)", counter.sumw2());
        out.add_vfloat(
            "LHEScaleSumw",
            "Sum of genEventWeight * LHEScaleWeight[i]",
            counter.sum_scale(),
        );
        out.add_vfloat(
            "LHEPdfSumw",
            "Sum of genEventWeight * LHEPdfWeight[i]",
            counter.sum_pdf(),
        );
        // empty if there was no LHE information
        let sum_named = counter.sum_named();
        if !sum_named.is_empty() {
            let labels = self.tables.named_weight_labels();
            for (label, sum) in labels.iter().zip(sum_named) {
                out.add_float(
                    format!("LHESumw_{label}"),
                    format!("Sum of genEventWeight * LHEWeight_{label}"),
                    sum,
                );
            }
        }
        out
    }
}
