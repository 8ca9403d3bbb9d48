use std::env;
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};
use log::LevelFilter;
use serde::Deserialize;
use memtally::observer::{DuplicatePolicy, LoadOptions, ParsePolicy};

use crate::error::ConfigError;

const PROFILE_ENV_VAR: &str = "MEMTALLY_PROFILE";

#[derive(Parser, Debug)]
#[command(version, about = "Counts reads and writes that overlap registered memory regions", long_about = None)]
pub(crate) struct Args {
    /// Region descriptor, one `id, address, size` line per monitored region.
    #[arg(short, long)]
    pub input: PathBuf,

    /// Report written once the observed program has terminated.
    #[arg(short, long)]
    pub output: PathBuf,

    /// Access trace to replay. Reads from stdin if not specified.
    #[arg(short, long)]
    pub trace: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub trace_format: Option<TraceFormat>,

    /// Also record every access into a binary access log.
    #[arg(long)]
    pub record: Option<PathBuf>,

    /// Fail on malformed descriptor or trace lines instead of degrading them.
    #[arg(long)]
    pub strict: bool,

    /// Fail when the descriptor registers the same region ID twice.
    #[arg(long)]
    pub reject_duplicates: bool,

    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// TOML profile with defaults for the options above. Falls back to $MEMTALLY_PROFILE.
    #[arg(short, long)]
    pub profile: Option<PathBuf>,
}

#[derive(ValueEnum, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub(crate) enum TraceFormat {
    /// `R|W <address> <size>` lines
    #[default]
    Text,
    /// Access log written by --record
    Binary,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Profile {
    #[serde(default)]
    pub strict: bool,

    #[serde(default)]
    pub reject_duplicates: bool,

    pub trace_format: Option<TraceFormat>,

    pub log_file: Option<PathBuf>,

    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

pub(crate) fn read_profile(path: &Path) -> Result<Profile, ConfigError> {
    let contents = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::ProfileRead { path: path.to_path_buf(), source })?;

    toml::from_str(contents.as_str())
        .map_err(|source| ConfigError::ProfileParse { path: path.to_path_buf(), source })
}

#[derive(Debug)]
pub(crate) struct Settings {
    pub input: PathBuf,
    pub output: PathBuf,
    pub trace: Option<PathBuf>,
    pub trace_format: TraceFormat,
    pub record: Option<PathBuf>,
    pub load_options: LoadOptions,
    pub log_file: Option<PathBuf>,
    pub log_level: LevelFilter,
}

impl Settings {
    /// Merges the command line over the profile, if any. Flags on the command line win.
    pub(crate) fn resolve(args: Args) -> Result<Self, ConfigError> {
        let profile_path = args.profile.clone()
            .or_else(|| env::var_os(PROFILE_ENV_VAR).map(PathBuf::from));

        let profile = match profile_path {
            Some(path) => read_profile(&path)?,
            None => Profile { log_level: default_log_level(), ..Profile::default() },
        };

        let log_level = profile.log_level.parse::<LevelFilter>()
            .map_err(|_| ConfigError::LogLevel(profile.log_level.clone()))?;

        let parse = if args.strict || profile.strict {
            ParsePolicy::Strict
        } else {
            ParsePolicy::Permissive
        };

        let duplicates = if args.reject_duplicates || profile.reject_duplicates {
            DuplicatePolicy::Reject
        } else {
            DuplicatePolicy::Replace
        };

        Ok(Self {
            input: args.input,
            output: args.output,
            trace: args.trace,
            trace_format: args.trace_format.or(profile.trace_format).unwrap_or_default(),
            record: args.record,
            load_options: LoadOptions { parse, duplicates },
            log_file: args.log_file.or(profile.log_file),
            log_level,
        })
    }
}
