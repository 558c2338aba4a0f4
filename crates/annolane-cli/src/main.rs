#![doc = include_str!("../README.md")]

mod config;
mod output;
mod telemetry;

use annolane::{Annotator, ChannelSubscriber, Event, FileSource};
use anyhow::{anyhow, bail};
use clap::Parser;
use config::{CliArgs, RunConfig};
use output::{PassThrough, Sink, metadata, write_line, write_value};
use telemetry::init_telemetry;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Results buffered between the coordination thread and the writer.
const EVENT_BUFFER: usize = 1024;

fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = RunConfig::try_from(args)?;

    init_telemetry()?;
    log_startup_info(&config);

    let source = FileSource::new(config.inputs.clone())?;
    let mut out = Sink::create(config.output.as_deref())?;
    write_value(&mut out, &metadata(&config.inputs, &config.annotator))?;

    let (subscriber, events) = ChannelSubscriber::bounded(EVENT_BUFFER);
    let coordinator = Annotator::new(source, PassThrough)
        .with_config(config.annotator)
        .subscribe(subscriber)?;

    let mut written = 0u64;
    let mut failed = 0u64;
    let outcome = loop {
        match events.recv() {
            Ok(Event::Next(item)) => {
                if item.is_failed() {
                    failed += 1;
                }
                write_line(&mut out, item)?;
                written += 1;
            }
            Ok(Event::Complete) => break Ok(()),
            Ok(Event::Error(e)) => break Err(anyhow::Error::from(e)),
            Err(_) => break Err(anyhow!("Run stopped without reporting an outcome")),
        }
    };
    out.finish()?;

    if coordinator.join().is_err() {
        bail!("Coordinator thread panicked");
    }

    match &outcome {
        Ok(()) => tracing::info!(written, failed, "Annotation finished"),
        Err(e) => tracing::error!(written, failed, "Annotation aborted: {e}"),
    }
    outcome
}

fn log_startup_info(config: &RunConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting annotation with full config: {:#?}", config);
    } else {
        tracing::info!(
            "Starting annotation of {} with {} workers",
            config.inputs.vcf.display(),
            config.annotator.workers
        );
    }
}
