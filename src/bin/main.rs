mod opt;

use std::{
    fs::File,
    io::{stdout, BufWriter, Write},
};

use crate::opt::Opt;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use genweights::{
    aggregator::RunAggregator,
    lhef::FileReader,
    processor::{RunOutput, RunProcessorBuilder},
    table::MergableCounterTable,
    GIT_BRANCH, GIT_REV, VERSION,
};
use log::{debug, info, warn};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct Summary {
    runs: Vec<RunOutput>,
    total: Option<MergableCounterTable>,
}

fn main() -> Result<()> {
    let args = argfile::expand_args_from(
        std::env::args_os(),
        argfile::parse_fromfile,
        argfile::PREFIX,
    )
    .with_context(|| "Failed to read argument file")?;
    let opt = Opt::parse_from(args);

    let env = Env::default().filter_or("GENWEIGHTS_LOG", &opt.loglevel);
    env_logger::init_from_env(env);

    rayon::ThreadPoolBuilder::new()
        .num_threads(opt.threads)
        .build_global()?;

    if let (Some(rev), Some(branch)) = (GIT_REV, GIT_BRANCH) {
        info!("genweights {VERSION} rev {rev} ({branch})");
    } else {
        info!("genweights {VERSION}");
    }

    debug!("settings: {:#?}", opt);
    let config = opt.settings().context("Invalid settings")?;
    let aggregator = RunAggregator::new(config)?;
    let processor = RunProcessorBuilder::default()
        .aggregator(aggregator)
        .nstreams(opt.streams)
        .keep_event_tables(opt.dump_events)
        .build()?;

    let mut runs = Vec::with_capacity(opt.infiles.len());
    for (n, infile) in opt.infiles.iter().enumerate() {
        let reader = FileReader::try_new(infile)
            .with_context(|| format!("Failed to open {infile:?}"))?;
        let run = reader.run(n as u32 + 1);
        let events: Vec<_> = reader
            .collect::<Result<_, _>>()
            .with_context(|| format!("Failed to read events from {infile:?}"))?;
        let output = processor
            .process_run(&run, &events)
            .with_context(|| format!("Failed to process events from {infile:?}"))?;
        runs.push(output);
    }

    let total = merge_runs(&runs);
    let summary = Summary { runs, total };
    match &opt.outfile {
        Some(outfile) => {
            let file = File::create(outfile)
                .with_context(|| format!("Failed to create {outfile:?}"))?;
            let mut out = BufWriter::new(file);
            serde_yaml::to_writer(&mut out, &summary)?;
            out.flush()?;
        }
        None => {
            let mut out = stdout().lock();
            serde_yaml::to_writer(&mut out, &summary)?;
            out.flush()?;
        }
    }
    info!("done");
    Ok(())
}

fn merge_runs(runs: &[RunOutput]) -> Option<MergableCounterTable> {
    let (first, rest) = runs.split_first()?;
    let mut total = first.counters.clone();
    for run in rest {
        if let Err(err) = total.merge(&run.counters) {
            warn!("Not merging run summaries: {err}");
            return None;
        }
    }
    Some(total)
}
