use std::cmp::max;

use derive_builder::Builder;
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    aggregator::RunAggregator,
    event::{Event, Run},
    event_tables::{EventError, EventTables},
    header::ParseError,
    progress_bar::{Progress, ProgressBar},
    table::MergableCounterTable,
    weight_choice::WeightChoice,
};

/// Output for a single run
#[derive(Deserialize, Serialize)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunOutput {
    /// Run number
    pub run: u32,
    /// The LHE weights selected from the run header
    pub weight_choice: WeightChoice,
    /// Per-event tables in input order, if requested
    pub event_tables: Vec<EventTables>,
    /// Summed weights of the run
    pub counters: MergableCounterTable,
}

/// Processes the events of a run on several parallel streams
///
/// Events are divided into contiguous blocks, one per stream. Each
/// stream fills its own counter, which is merged into the run total
/// when the stream is done.
#[derive(Builder)]
#[builder(pattern = "owned")]
pub struct RunProcessor {
    aggregator: RunAggregator,
    /// Number of parallel streams
    #[builder(default = "1")]
    nstreams: usize,
    /// Whether to keep the per-event tables in the output
    #[builder(default)]
    keep_event_tables: bool,
    #[builder(default = "true")]
    show_progress: bool,
}

impl RunProcessor {
    pub fn aggregator(&self) -> &RunAggregator {
        &self.aggregator
    }

    /// Process all events of a run
    pub fn process_run(
        &self,
        run: &Run,
        events: &[Event],
    ) -> Result<RunOutput, ProcessError> {
        let agg = &self.aggregator;
        let choice = agg.global_begin_run(run)?;
        let summary = agg.global_begin_run_summary();

        let nstreams = max(self.nstreams, 1);
        let stream_len = max(1, (events.len() + nstreams - 1) / nstreams);
        info!(
            "Processing {} events of run {} on {} streams",
            events.len(),
            run.number,
            nstreams
        );
        // the debug dump is logged at info level
        let progress = if self.show_progress && !agg.config().debug {
            ProgressBar::new(events.len() as u64, "events processed:")
        } else {
            ProgressBar::default()
        };
        let tables: Result<Vec<Vec<EventTables>>, ProcessError> = events
            .par_chunks(stream_len)
            .enumerate()
            .map(|(stream, stream_events)| {
                let mut counter = agg.begin_stream();
                agg.stream_begin_run(&mut counter);
                let mut tables = Vec::new();
                for (n, event) in stream_events.iter().enumerate() {
                    let event_tables = agg
                        .produce(&mut counter, &choice, event)
                        .map_err(|source| ProcessError::Event {
                            index: stream * stream_len + n,
                            source,
                        })?;
                    if self.keep_event_tables {
                        tables.push(event_tables);
                    }
                    progress.inc(1);
                }
                agg.stream_end_run_summary(&counter, &summary);
                Ok(tables)
            })
            .collect();
        progress.finish();
        let tables = tables?;

        agg.global_end_run_summary(run, &summary);
        let counters = agg.global_end_run_produce(&summary);
        Ok(RunOutput {
            run: run.number,
            weight_choice: (*choice).clone(),
            event_tables: tables.into_iter().flatten().collect(),
            counters,
        })
    }
}

/// Error processing a run
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The run header could not be parsed
    #[error("Failed to parse LHE header")]
    Header(#[from] ParseError),
    /// An event could not be processed
    #[error("Failed to process event {index}")]
    Event {
        /// Position of the event in the run
        index: usize,
        /// Cause
        source: EventError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        event::{HeaderBlock, LheEvent, LheRunInfo, WeightRecord},
    };

    fn log_init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn processor(nstreams: usize) -> RunProcessor {
        let config = Config::builder()
            .gen_event("generator")
            .lhe_info("externalLHEProducer")
            .preferred_pdfs(vec![260000])
            .build();
        RunProcessorBuilder::default()
            .aggregator(RunAggregator::new(config).unwrap())
            .nstreams(nstreams)
            .keep_event_tables(true)
            .show_progress(false)
            .build()
            .unwrap()
    }

    fn run() -> Run {
        let header = r#"<weightgroup combine="hessian" name="PDF_variation">
<weight id="11"> PDF set = 260000 </weight>
<weight id="12"> PDF set = 260001 </weight>
</weightgroup>"#;
        Run::new(
            7,
            Some(LheRunInfo::new(vec![HeaderBlock::from_text("initrwgt", header)])),
        )
    }

    fn events(n: usize) -> Vec<Event> {
        (0..n)
            .map(|i| {
                let w = (i + 1) as f64;
                let weights = vec![
                    WeightRecord::new("11", 0.5 * w),
                    WeightRecord::new("12", 2. * w),
                ];
                Event::with_lhe(w, LheEvent::new(w, weights))
            })
            .collect()
    }

    #[test]
    fn independent_of_streams() {
        log_init();
        let events = events(37);
        let reference = processor(1).process_run(&run(), &events).unwrap();
        assert_eq!(reference.run, 7);
        assert_eq!(reference.counters.int("genEventCount"), Some(37));
        assert_eq!(reference.counters.float("genEventSumw"), Some(703.));
        assert_eq!(
            reference.counters.vfloat("LHEPdfSumw"),
            Some([351.5, 1406.].as_slice())
        );
        assert_eq!(reference.event_tables.len(), 37);
        for nstreams in [2, 3, 8, 100] {
            let out = processor(nstreams).process_run(&run(), &events).unwrap();
            assert_eq!(out, reference);
        }
    }

    #[test]
    fn empty_run() {
        let out = processor(4).process_run(&run(), &[]).unwrap();
        assert_eq!(out.counters.int("genEventCount"), Some(0));
        assert_eq!(out.counters.float("genEventSumw"), Some(0.));
        assert!(out.event_tables.is_empty());
    }

    #[test]
    fn missing_gen_info() {
        let mut events = events(10);
        events[6].gen = None;
        let err = processor(3).process_run(&run(), &events).unwrap_err();
        assert!(matches!(err, ProcessError::Event { index: 6, .. }));
    }
}
