// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Structured JSON logging to stdout, plus an optional rolling log file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Log files kept per process: the active one plus five older ones.
pub const MAX_LOG_FILES: usize = 6;

/// Rolling appender for one process kind.
///
/// Files are named `{prefix}_log.{YYYY-MM-DD}.log` and roll over daily.
/// Only the newest [`MAX_LOG_FILES`] stay on disk.
pub fn file_appender(log_dir: &Path, prefix: &str) -> Result<RollingFileAppender, InitError> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(format!("{}_log", prefix))
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)
}

/// Initialize structured JSON logging.
///
/// When `log_dir` is set, every event is also written to a rolling file in
/// that directory (see [`file_appender`]). Returns the directory in that case.
pub fn init_logging(log_dir: Option<&Path>, prefix: &str) -> io::Result<Option<PathBuf>> {
    let stdout = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let file_layer = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir)?;
            let appender = file_appender(dir, prefix).map_err(io::Error::other)?;

            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_target(false)
                    .flatten_event(true)
                    .with_writer(appender),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("strava_mirror=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(stdout)
        .with(file_layer)
        .init();

    Ok(log_dir.map(Path::to_path_buf))
}
