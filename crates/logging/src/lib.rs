use std::io;
use std::path::Path;

use log::*;
use log4rs::*;
use thiserror::Error;
use log4rs::append::file::FileAppender;
use log4rs::encode::pattern::PatternEncoder;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};

const PATTERN: &str = "MT | {d(%Y-%m-%d %H:%M:%S)} | {({l}):5.5} | {m}{n}";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("could not open log file: {0}")]
    File(#[from] io::Error),

    #[error("invalid logging configuration: {0}")]
    Config(#[from] log4rs::config::runtime::ConfigErrors),

    #[error("a logger has already been installed: {0}")]
    AlreadyInitialized(#[from] SetLoggerError),
}

/// Installs the global logger. Console output goes to stderr so stdout stays free for piping,
/// the optional file receives the same lines.
pub fn init(file: Option<&Path>, level: LevelFilter) -> Result<(), LoggingError> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build();

    let mut root = Root::builder().appender("stderr");
    let mut config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)));

    if let Some(file) = file {
        let file = FileAppender::builder()
            .encoder(Box::new(PatternEncoder::new(PATTERN)))
            .build(file)?;

        config = config.appender(Appender::builder().build("file", Box::new(file)));
        root = root.appender("file");
    }

    let config = config.build(root.build(level))?;

    init_config(config)?;

    log_panics::init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use log::LevelFilter;

    use crate::{init, LoggingError};

    #[test]
    fn we_can_log_to_a_file_once() {
        let directory = tempfile::tempdir().unwrap();
        let path = directory.path().join("memtally.log");

        init(Some(&path), LevelFilter::Info).unwrap();
        log::info!("logging test line");
        log::debug!("filtered out");

        let contents = fs::read_to_string(&path).unwrap();
        assert!(contents.contains("logging test line"));
        assert!(!contents.contains("filtered out"));

        let second = init(None, LevelFilter::Info);
        assert!(matches!(second, Err(LoggingError::AlreadyInitialized(_))));
    }
}
