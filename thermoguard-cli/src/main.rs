//! thermoguard - interactive environmental station simulator
//!
//! Usage:
//!   thermoguard --config-file station.ini
//!   thermoguard --config-file station.json --show-samples --no-storage
//!   RUST_LOG=thermoguard_core=debug thermoguard --config-file station.ini
//!
//! Events are printed on stdout, logs go to stderr.

mod repl;

use std::{
    io::{self, BufRead},
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
    thread,
};

use anyhow::{Context, Result};
use clap::Parser;
use thermoguard_connectors::{ConsoleSink, SqliteSink, StationConfig};
use thermoguard_core::{Drivers, EventKind, QueuedSink};
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::repl::{Command, Flow};

#[derive(Parser, Debug)]
#[command(name = "thermoguard")]
#[command(about = "Simulate temperature and humidity probes following a daily profile")]
#[command(version)]
struct Cli {
    /// Station configuration (INI, or JSON with a .json extension)
    #[arg(long, value_name = "PATH")]
    config_file: PathBuf,

    /// Log filter, e.g. "debug" or "thermoguard_core=trace" (overrides RUST_LOG)
    #[arg(long, value_name = "FILTER", value_parser = parse_filter)]
    log_level: Option<String>,

    /// Print every raw sample, not only averages and alerts
    #[arg(long)]
    show_samples: bool,

    /// Ignore the [storage] section
    #[arg(long)]
    no_storage: bool,
}

fn parse_filter(directives: &str) -> Result<String, String> {
    EnvFilter::try_new(directives)
        .map(|_| directives.to_owned())
        .map_err(|err| err.to_string())
}

fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info")),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|err| {
            // Subscriber is not installed yet
            if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
                eprintln!("ignoring {}: {err}", EnvFilter::DEFAULT_ENV);
            }
            EnvFilter::new("info")
        }),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Read stdin lines on a plain thread
///
/// A read still pending when the loop ends must not hold up runtime
/// shutdown, so the thread is detached and left behind on exit.
fn spawn_stdin_reader() -> io::Result<mpsc::Receiver<io::Result<String>>> {
    let (sender, receiver) = mpsc::channel(16);
    thread::Builder::new()
        .name("stdin".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                if sender.blocking_send(line).is_err() {
                    break;
                }
            }
        })?;
    Ok(receiver)
}

async fn run(cli: Cli) -> Result<()> {
    let config = StationConfig::load(&cli.config_file)
        .with_context(|| format!("cannot load {}", cli.config_file.display()))?;

    let station = Arc::new(
        config
            .station_builder()
            .context("invalid profile")?
            .build()
            .context("cannot build station")?,
    );

    let console = Arc::new(ConsoleSink::stdout(&config.display).show_samples(cli.show_samples));
    station.dispatcher().subscribe_all(console.clone());

    let storage = match (&config.storage.path, cli.no_storage) {
        (Some(path), false) => {
            let sink = SqliteSink::open(path)
                .with_context(|| format!("cannot open database {}", path.display()))?;
            let queued = Arc::new(QueuedSink::spawn(Arc::new(sink))?);
            station.dispatcher().subscribe(EventKind::Average, queued.clone());
            station.dispatcher().subscribe(EventKind::Alert, queued.clone());
            Some(queued)
        }
        _ => None,
    };

    let drivers = Drivers::spawn(Arc::clone(&station), config.timing.driver_config())?;
    let mut lines = spawn_stdin_reader().context("cannot read stdin")?;
    let interrupt = tokio::signal::ctrl_c();
    tokio::pin!(interrupt);
    console.say(&repl::banner(&station))?;

    loop {
        let line = tokio::select! {
            line = lines.recv() => line.transpose().context("cannot read command")?,
            _ = &mut interrupt => None,
        };
        // EOF or Ctrl-C
        let Some(line) = line else { break };

        if repl::execute(&Command::parse(&line), &station, &console)? == Flow::Quit {
            break;
        }
    }

    drivers.stop().await;
    if let Some(queued) = storage {
        // Drain pending inserts before exiting
        tokio::task::spawn_blocking(move || queued.shutdown()).await?;
    }
    console.say("Bye.")?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
