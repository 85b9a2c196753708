//! Log file setup. The terminal belongs to the UI, so events go to
//! `<data_dir>/dopl-chatbot.log`.

use color_eyre::Result;
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, LoggingConfig};

const LOG_FILE_NAME: &str = "dopl-chatbot.log";

/// `RUST_LOG` if set, otherwise the configured level
fn build_filter(logging: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Installs the global subscriber and returns the log file path
pub fn init(logging: &LoggingConfig) -> Result<PathBuf> {
    let log_dir = Config::data_dir()?;
    fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new().create(true).append(true).open(&log_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(build_filter(logging))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true)
        .try_init()
        .map_err(|error| color_eyre::eyre::eyre!("Failed to install logger: {}", error))?;

    Ok(log_path)
}
