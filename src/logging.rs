use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use tracing_subscriber::EnvFilter;

#[derive(Args, Clone, Debug)]
pub struct LogConfig {
    /// Append logs to this file. The TUI logs nothing without it.
    #[arg(long, env = "FUNDGRID_LOG_FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Filter directive, e.g. `debug` or `fundgrid::table=trace`
    #[arg(long, env = "FUNDGRID_LOG", default_value = "info", global = true)]
    pub log_level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_file: None,
            log_level: "info".to_string(),
        }
    }
}

/// Where log output goes for the current command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Full-screen mode: stderr would corrupt the terminal.
    Terminal,
    /// Headless commands log to stderr when no file is given.
    Headless,
}

pub fn init(config: &LogConfig, target: LogTarget) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_level)
        .with_context(|| format!("invalid log filter: {}", config.log_level))?;

    match (&config.log_file, target) {
        (Some(path), _) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .try_init()
                .map_err(|e| anyhow!("failed to install logger: {e}"))?;
        }
        (None, LogTarget::Headless) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow!("failed to install logger: {e}"))?;
        }
        (None, LogTarget::Terminal) => {}
    }
    Ok(())
}
