pub use crate::{
    aggregator::{RunAggregator, RunSummary},
    config::Config,
    event::{Event, HeaderBlock, LheEvent, LheRunInfo, Run, WeightRecord},
    event_tables::EventTables,
    processor::{RunOutput, RunProcessor, RunProcessorBuilder},
    table::{FlatTable, MergableCounterTable},
    weight_choice::WeightChoice,
};

#[cfg(feature = "lhef")]
pub use crate::lhef::FileReader;
