//! Runs a simulation scenario and prints the executed events.
#![warn(
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_import_braces,
    unused_qualifications
)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions, clippy::default_trait_access)]

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use eyre::WrapErr;
use structopt::StructOpt;

use evsim::scenario::Scenario;
use evsim::Time;

/// Runs a discrete-event simulation scenario.
///
/// The trace of executed events is printed to the standard output, one JSON object per line.
#[derive(StructOpt)]
#[structopt(author)]
struct Opt {
    /// Path to a YAML file containing the scenario.
    #[structopt(long)]
    scenario: PathBuf,

    /// Stop the simulation at this time.
    #[structopt(long)]
    until: Option<Time>,

    /// Verbosity.
    #[structopt(short, long, parse(from_occurrences))]
    verbose: i32,

    /// Store the logs this file.
    #[structopt(long)]
    log_output: Option<PathBuf>,

    /// Do not log to the stderr.
    #[structopt(long)]
    no_stderr: bool,
}

/// Set up a logger based on the given user options.
fn set_up_logger(opt: &Opt) -> Result<(), fern::InitError> {
    let log_level = match opt.verbose {
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        3 => log::LevelFilter::Trace,
        _ => log::LevelFilter::Warn,
    };
    let dispatch = fern::Dispatch::new()
        .format(|out, message, record| out.finish(format_args!("[{}] {}", record.level(), message)))
        .level(log_level);
    let dispatch = if let Some(path) = &opt.log_output {
        dispatch.chain(
            std::fs::OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)?,
        )
    } else {
        dispatch
    };
    let dispatch = if opt.no_stderr {
        dispatch
    } else {
        dispatch.chain(io::stderr())
    };
    dispatch.apply()?;
    Ok(())
}

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let opt = Opt::from_args();
    set_up_logger(&opt)?;
    let file = File::open(&opt.scenario)
        .wrap_err_with(|| format!("unable to open scenario: {}", opt.scenario.display()))?;
    let scenario = Scenario::from_yaml(file)
        .map_err(|err| eyre::eyre!("{:#}", err))
        .wrap_err_with(|| format!("invalid scenario: {}", opt.scenario.display()))?;
    log::info!("Loaded {} initial events", scenario.events.len());
    let report = scenario.run(opt.until)?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for entry in &report.trace {
        serde_json::to_writer(&mut out, entry)?;
        writeln!(out)?;
    }
    out.flush()?;
    log::info!(
        "Finished at time {} with {} pending events",
        report.end,
        report.pending
    );
    Ok(())
}
