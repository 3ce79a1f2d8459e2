use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use mirrorkit_io_fs::{EnumMirrorPatternMode, SpecMirrorOptions};
use tracing::Level;

/// How `--exclude` values are matched against entry names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PatternArg {
    Exact,
    Glob,
    Regex,
}

impl From<PatternArg> for EnumMirrorPatternMode {
    fn from(value: PatternArg) -> Self {
        match value {
            PatternArg::Exact => EnumMirrorPatternMode::Exact,
            PatternArg::Glob => EnumMirrorPatternMode::Glob,
            PatternArg::Regex => EnumMirrorPatternMode::Regex,
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory to mirror from
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Directory to mirror into (created when missing)
    #[arg(value_name = "DESTINATION")]
    pub destination: PathBuf,

    /// Entry name to leave out wherever it occurs (repeatable)
    #[arg(short, long, value_name = "NAME")]
    pub exclude: Vec<String>,

    /// How exclude names are matched
    #[arg(long, value_enum, default_value_t = PatternArg::Exact)]
    pub pattern: PatternArg,

    /// Also copy permissions, timestamps and extended attributes
    #[arg(long, default_value_t = false)]
    pub preserve_metadata: bool,

    /// Error log file [default: file-move.log next to the executable]
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Exit with status 1 when the run fails or any entry fails
    #[arg(long, default_value_t = false)]
    pub fail_on_error: bool,

    /// Suppress non-error messages
    #[arg(short, long, default_value_t = false, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Increase verbosity
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Args {
    pub fn log_level(&self) -> Level {
        if self.verbose {
            Level::DEBUG
        } else if self.quiet {
            Level::ERROR
        } else {
            Level::INFO
        }
    }

    pub fn to_options(&self) -> SpecMirrorOptions {
        SpecMirrorOptions {
            names_exclude: self.exclude.clone(),
            rule_pattern: self.pattern.into(),
            if_preserve_metadata: self.preserve_metadata,
            flag_cancel: None,
        }
    }
}
