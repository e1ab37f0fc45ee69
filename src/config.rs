//! Command line configuration.
//!
//! `bubbletea_rs::Model::init` takes no arguments, so the parsed [`Config`]
//! is installed once into a process-wide cell before the program starts and
//! read back by [`crate::app::App`]'s `init`.

use crate::error::{Error, Result};
use crate::state::DEFAULT_TOTAL_SECONDS;
use clap::{Parser, ValueEnum};
use once_cell::sync::OnceCell;
use std::path::PathBuf;

static CONFIG: OnceCell<Config> = OnceCell::new();

/// How the progress indicator is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum IndicatorStyle {
    Ring,
    Bar,
}

/// CLI arguments for the `countdown` binary.
#[derive(Parser, Debug, Clone)]
#[command(name = "countdown")]
#[command(about = "A single-screen countdown timer for the terminal")]
#[command(version)]
pub struct Config {
    /// Initial duration, as M:SS or a number of seconds
    #[arg(short, long, default_value = "1:00", value_parser = parse_duration)]
    pub duration: u32,

    /// Width of the progress bar in columns
    #[arg(short, long, default_value_t = 40)]
    pub width: i32,

    /// Progress indicator style
    #[arg(long, value_enum, default_value_t = IndicatorStyle::Ring)]
    pub style: IndicatorStyle,

    /// Write logs to this file (nothing is logged otherwise)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            duration: DEFAULT_TOTAL_SECONDS,
            width: 40,
            style: IndicatorStyle::Ring,
            log_file: None,
            verbose: false,
        }
    }
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Default log filter directive for the crate
    pub fn log_level(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

/// Makes `config` the process-wide configuration. Only the first call succeeds.
pub fn install(config: Config) -> Result<()> {
    CONFIG.set(config).map_err(|_| Error::AlreadyConfigured)
}

/// The installed configuration, or the defaults if none was installed.
pub fn current() -> Config {
    CONFIG.get().cloned().unwrap_or_default()
}

/// Parses `M:SS` or a plain second count into seconds (at least one).
pub fn parse_duration(input: &str) -> Result<u32> {
    let invalid = |reason| Error::InvalidDuration {
        input: input.to_string(),
        reason,
    };
    let trimmed = input.trim();

    let total = match trimmed.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u32 = minutes
                .parse()
                .map_err(|_| invalid("minutes are not a number"))?;
            if seconds.len() != 2 {
                return Err(invalid("seconds must have two digits"));
            }
            let seconds: u32 = seconds
                .parse()
                .map_err(|_| invalid("seconds are not a number"))?;
            if seconds >= 60 {
                return Err(invalid("seconds must be below 60"));
            }
            minutes
                .checked_mul(60)
                .and_then(|m| m.checked_add(seconds))
                .ok_or_else(|| invalid("duration is too long"))?
        }
        None => trimmed
            .parse()
            .map_err(|_| invalid("expected M:SS or a number of seconds"))?,
    };

    if total == 0 {
        return Err(invalid("duration must be at least one second"));
    }
    Ok(total)
}
