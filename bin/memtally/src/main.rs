use std::io;
use std::sync;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};
use memtally::logging;
use memtally::observer::{LogReplaySource, Recorder, TextTraceSource};
use memtally::{EventSource, RegionRegistry, Session};

use crate::error::AppError;
use crate::config::{Args, Settings, TraceFormat};

mod error;
mod config;

fn main() -> ExitCode {
    // Missing required paths end here with usage and a non-zero exit.
    let args = Args::parse();

    let settings = match Settings::resolve(args) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("memtally: {}", e);
            return ExitCode::FAILURE;
        },
    };

    if let Err(e) = logging::init(settings.log_file.as_deref(), settings.log_level) {
        eprintln!("memtally: {}", e);
        return ExitCode::FAILURE;
    }

    match run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        },
    }
}

fn run(settings: &Settings) -> Result<(), AppError> {
    let registry = RegionRegistry::load_file(&settings.input, settings.load_options)?;
    let mut session = Session::new(registry);

    let recorder = match &settings.record {
        Some(path) => {
            let recorder = sync::Arc::new(Recorder::create(path)?);
            session.attach_observer("recorder", recorder.clone())?;
            Some(recorder)
        },
        None => None,
    };

    let mut source = open_source(settings)?;
    session.run(source.as_mut())?;
    drop(source);

    // Drain the recorder before surfacing a report error.
    let report = session.finish(&settings.output);
    if let Some(recorder) = recorder {
        let recorder = sync::Arc::try_unwrap(recorder).map_err(|_| AppError::RecorderShared)?;
        let frames = recorder.finish()?;
        info!("Recorded {} access(es)", frames);
    }
    report?;

    Ok(())
}

fn open_source(settings: &Settings) -> Result<Box<dyn EventSource>, AppError> {
    let policy = settings.load_options.parse;

    let source: Box<dyn EventSource> = match (&settings.trace, settings.trace_format) {
        (Some(path), TraceFormat::Text) => Box::new(TextTraceSource::open(path, policy)?),
        (Some(path), TraceFormat::Binary) => Box::new(LogReplaySource::open(path)?),
        (None, TraceFormat::Text) => Box::new(TextTraceSource::new(io::stdin().lock(), policy)),
        (None, TraceFormat::Binary) => Box::new(LogReplaySource::new(io::stdin().lock())),
    };

    Ok(source)
}
