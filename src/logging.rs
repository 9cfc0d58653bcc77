use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("log path {} has no parent directory or file name", .0.display())]
    BadPath(PathBuf),

    #[error("failed to open log file: {0}")]
    Appender(String),

    #[error("failed to install tracing subscriber: {0}")]
    Init(String),
}

/// Parse a level name, falling back to `INFO` for anything unrecognised.
pub fn level_filter(level: &str) -> LevelFilter {
    level.parse::<LevelFilter>().unwrap_or(LevelFilter::INFO)
}

/// Build a never-rotating appender that writes exactly to `path`.
pub fn file_appender(path: &Path) -> Result<RollingFileAppender, LoggingError> {
    let bad_path = || LoggingError::BadPath(path.to_path_buf());

    let parent = path.parent().ok_or_else(bad_path)?;
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(bad_path)?;

    let mut builder = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(stem);
    if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
        builder = builder.filename_suffix(ext);
    }

    builder
        .build(parent)
        .map_err(|err| LoggingError::Appender(err.to_string()))
}

/// Route tracing output to `path`. The terminal belongs to the UI, so there is
/// no stdout layer.
pub fn init(level: &str, path: &Path) -> Result<(), LoggingError> {
    let appender = file_appender(path)?;

    tracing_subscriber::fmt()
        .with_writer(appender)
        .with_max_level(level_filter(level))
        .with_ansi(false)
        .with_target(false)
        .try_init()
        .map_err(|err| LoggingError::Init(err.to_string()))
}
