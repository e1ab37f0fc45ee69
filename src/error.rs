//! Errors from the countdown's outer surface (CLI parsing, startup).
//!
//! The timer itself has no failure modes: out-of-range adjustments are
//! clamped or ignored.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid duration {input:?}: {reason}")]
    InvalidDuration { input: String, reason: &'static str },

    #[error("failed to open log file {}", path.display())]
    LogFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration already installed")]
    AlreadyConfigured,
}

pub type Result<T> = std::result::Result<T, Error>;
