//! `countdown` - a single-screen countdown timer in the terminal.

use anyhow::{Context, Result};
use bubbletea_countdown::config::{self, Config};
use bubbletea_countdown::{App, Error};
use bubbletea_rs::Program;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Logs go to `--log-file` only; writing to stdout or stderr would corrupt the TUI.
fn init_tracing(config: &Config) -> bubbletea_countdown::Result<()> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| Error::LogFile {
            path: path.clone(),
            source,
        })?;

    let level = config.log_level();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("bubbletea_countdown={level},countdown={level}"))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .with(env_filter)
        .init();

    info!(path = %path.display(), "logging initialized");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();
    init_tracing(&config)?;

    info!(
        duration = config.duration,
        style = ?config.style,
        "starting countdown"
    );
    config::install(config)?;

    let program = Program::<App>::builder()
        .alt_screen(true)
        .build()
        .context("failed to set up the terminal")?;
    program.run().await.context("countdown program failed")?;

    info!("countdown exited");
    Ok(())
}
