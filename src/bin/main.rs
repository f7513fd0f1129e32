mod opt;

use std::fs::File;
use std::path::Path;

use crate::opt::Opt;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use gteff::{
    prelude::*,
    progress_bar::ProgressBar,
    GIT_BRANCH, GIT_REV, VERSION,
};
use itertools::Itertools;
use log::{debug, info};
use serde::Serialize;

fn main() -> Result<()> {
    let args = argfile::expand_args_from(
        std::env::args_os(),
        argfile::parse_fromfile,
        argfile::PREFIX,
    )
    .with_context(|| "Failed to read argument file")?;
    let opt = Opt::parse_from(args);

    let env = Env::default().filter_or("GTEFF_LOG", &opt.loglevel);
    env_logger::init_from_env(env);

    rayon::ThreadPoolBuilder::new()
        .num_threads(opt.threads)
        .build_global()?;

    if let (Some(rev), Some(branch)) = (GIT_REV, GIT_BRANCH) {
        info!("gteff {VERSION} rev {rev} ({branch})");
    } else {
        info!("gteff {VERSION}");
    }

    debug!("settings: {:#?}", opt);

    let mut config = match &opt.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to read configuration from {path:?}"))?,
        None => Config::default(),
    };
    if let Some(time_gap) = opt.time_gap {
        config.analysis.time_gap = time_gap;
    }
    if let Some(source) = opt.cluster_source {
        config.analysis.cluster_source = source;
    }
    debug!("configuration: {:#?}", config);

    let locator = NeighbourGraph::from(&config.geometry);
    let mut analysis = GammaTrackingEfficiency::with_config(locator, &config);

    let mut nevents = 0;
    let mut nskipped = 0;
    let mut next_id = 0;
    let progress = ProgressBar::new(opt.infiles.len() as u64, "files analysed:");
    for file in &opt.infiles {
        let mut reader = EventReader::open_with_first_id(file, next_id)?;
        for batch in &reader.by_ref().chunks(opt.batch_size) {
            let events: Vec<Event> = batch.collect::<Result<_, _>>()?;
            nevents += events.len();
            let status = analysis.process_all(&events)?;
            nskipped += status
                .iter()
                .filter(|s| matches!(s, ProcessStatus::Skipped(_)))
                .count();
        }
        next_id = reader.next_id();
        progress.inc(1);
    }
    progress.finish();
    info!("Analysed {nevents} events, skipped {nskipped}");

    let summary = analysis.finalize();
    info!("\n{}", summary.efficiency);

    if let Some(path) = &opt.report {
        write_yaml(path, &summary.efficiency)?;
    }
    if let Some(path) = &opt.histograms {
        write_yaml(path, &summary.diagnostics)?;
    }
    info!("done");
    Ok(())
}

fn write_yaml<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let out = File::create(path)
        .with_context(|| format!("Failed to create {path:?}"))?;
    serde_yaml::to_writer(out, value)
        .with_context(|| format!("Failed to write to {path:?}"))?;
    debug!("Written {path:?}");
    Ok(())
}
