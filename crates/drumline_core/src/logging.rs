//! File logging bootstrap for the notation engine.
//!
//! # Invariants
//! - The rolling file logger starts at most once per process.
//! - Re-initializing with the same level and directory is a no-op; any other
//!   level or directory is rejected, never applied.
//!
//! Engine code logs through the `log` facade only and works without any
//! backend installed.

use flexi_logger::{Age, Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{info, LevelFilter};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const LOG_FILE_BASENAME: &str = "drumline";
const KEPT_LOG_FILES: usize = 7;

static ACTIVE_LOGGER: OnceCell<ActiveLogger> = OnceCell::new();

/// Errors from logger setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    /// Log directory must be absolute.
    RelativeLogDir(PathBuf),
    /// Log directory could not be created.
    CreateLogDir { dir: PathBuf, message: String },
    /// flexi_logger refused to start.
    Backend(String),
    /// Logging already runs with a different level or directory.
    AlreadyInitialized { level: LevelFilter, dir: PathBuf },
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RelativeLogDir(dir) => {
                write!(f, "log directory must be absolute: {}", dir.display())
            }
            Self::CreateLogDir { dir, message } => {
                write!(f, "cannot create log directory {}: {message}", dir.display())
            }
            Self::Backend(message) => write!(f, "logger failed to start: {message}"),
            Self::AlreadyInitialized { level, dir } => write!(
                f,
                "logging already active at level {level} in {}",
                dir.display()
            ),
        }
    }
}

impl Error for LoggingError {}

struct ActiveLogger {
    level: LevelFilter,
    dir: PathBuf,
    _handle: LoggerHandle,
}

/// Starts daily-rotated file logging at `level` inside `log_dir`.
///
/// Levels come from `log`'s parser, e.g. `"debug".parse::<LevelFilter>()`.
pub fn init_logging(level: LevelFilter, log_dir: impl AsRef<Path>) -> Result<(), LoggingError> {
    let dir = log_dir.as_ref().to_path_buf();
    if !dir.is_absolute() {
        return Err(LoggingError::RelativeLogDir(dir));
    }

    let active = ACTIVE_LOGGER.get_or_try_init(|| start(level, dir.clone()))?;
    if active.level != level || active.dir != dir {
        return Err(LoggingError::AlreadyInitialized {
            level: active.level,
            dir: active.dir.clone(),
        });
    }
    Ok(())
}

/// Level and directory of the running logger, if any.
pub fn logging_status() -> Option<(LevelFilter, PathBuf)> {
    ACTIVE_LOGGER
        .get()
        .map(|active| (active.level, active.dir.clone()))
}

pub fn default_log_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

fn start(level: LevelFilter, dir: PathBuf) -> Result<ActiveLogger, LoggingError> {
    std::fs::create_dir_all(&dir).map_err(|err| LoggingError::CreateLogDir {
        dir: dir.clone(),
        message: err.to_string(),
    })?;

    let level_name = level.as_str().to_ascii_lowercase();
    let handle = Logger::try_with_str(&level_name)
        .map_err(|err| LoggingError::Backend(err.to_string()))?
        .log_to_file(FileSpec::default().directory(&dir).basename(LOG_FILE_BASENAME))
        .rotate(
            Criterion::Age(Age::Day),
            Naming::Timestamps,
            Cleanup::KeepLogFiles(KEPT_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .format_for_files(flexi_logger::with_thread)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    info!(
        "event=engine_start module=core status=ok version={} level={} log_dir={}",
        env!("CARGO_PKG_VERSION"),
        level_name,
        dir.display()
    );

    Ok(ActiveLogger {
        level,
        dir,
        _handle: handle,
    })
}

#[cfg(test)]
mod tests {
    use super::{init_logging, logging_status, LoggingError};
    use log::LevelFilter;
    use std::path::PathBuf;

    #[test]
    fn relative_directory_is_rejected_before_start() {
        assert_eq!(
            init_logging(LevelFilter::Info, "logs/dev").unwrap_err(),
            LoggingError::RelativeLogDir(PathBuf::from("logs/dev"))
        );
    }

    #[test]
    fn second_init_must_match_the_first() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();

        init_logging(LevelFilter::Info, first.path()).unwrap();
        init_logging(LevelFilter::Info, first.path()).unwrap();

        assert!(matches!(
            init_logging(LevelFilter::Debug, first.path()),
            Err(LoggingError::AlreadyInitialized { .. })
        ));
        assert!(matches!(
            init_logging(LevelFilter::Info, second.path()),
            Err(LoggingError::AlreadyInitialized { .. })
        ));
        assert_eq!(
            logging_status(),
            Some((LevelFilter::Info, first.path().to_path_buf()))
        );
    }
}
