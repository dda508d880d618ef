//! Rolling file logs for the pokedex process.
//!
//! # Responsibility
//! - Own the log level vocabulary used by configuration.
//! - Open the rolling log sink at most once per process.
//! - Emit metadata-only `key=value` events; record payloads stay out of logs.
//!
//! # Invariants
//! - Re-opening the sink with the same level and directory is a no-op.
//! - Re-opening it with a different level or directory is rejected.
//! - Opening the sink never panics.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;

const LOG_FILE_BASENAME: &str = "pokedex";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 5;
const PANIC_DETAIL_MAX_CHARS: usize = 160;

static ACTIVE_SINK: OnceCell<ActiveSink> = OnceCell::new();
static PANIC_HOOK: OnceCell<()> = OnceCell::new();

/// Verbosity accepted by `POKEDEX_LOG_LEVEL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = LoggingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(LoggingError::UnknownLevel(value.trim().to_string())),
        }
    }
}

/// Failure while validating log settings or opening the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoggingError {
    UnknownLevel(String),
    EmptyLogDir,
    RelativeLogDir(String),
    CreateLogDir { dir: PathBuf, message: String },
    /// The sink is already open with other settings.
    SinkConflict { active: String, requested: String },
    Backend(String),
}

impl Display for LoggingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownLevel(value) => write!(
                f,
                "unsupported log level `{value}`; expected trace|debug|info|warn|error"
            ),
            Self::EmptyLogDir => write!(f, "log directory cannot be empty"),
            Self::RelativeLogDir(value) => {
                write!(f, "log directory must be an absolute path, got `{value}`")
            }
            Self::CreateLogDir { dir, message } => {
                write!(f, "failed to create log directory `{}`: {message}", dir.display())
            }
            Self::SinkConflict { active, requested } => write!(
                f,
                "pokedex log sink already open with {active}; refusing to switch to {requested}"
            ),
            Self::Backend(message) => write!(f, "failed to open log sink: {message}"),
        }
    }
}

impl Error for LoggingError {}

struct ActiveSink {
    level: LogLevel,
    dir: PathBuf,
    _handle: LoggerHandle,
}

impl ActiveSink {
    fn check_reopen(&self, level: LogLevel, dir: &Path) -> Result<(), LoggingError> {
        if self.dir != dir {
            return Err(LoggingError::SinkConflict {
                active: format!("dir `{}`", self.dir.display()),
                requested: format!("dir `{}`", dir.display()),
            });
        }
        if self.level != level {
            return Err(LoggingError::SinkConflict {
                active: format!("level `{}`", self.level),
                requested: format!("level `{level}`"),
            });
        }
        Ok(())
    }
}

/// Opens the rolling `pokedex` log files under `log_dir`.
///
/// # Errors
/// - `log_dir` is relative or cannot be created.
/// - The sink is already open with a different level or directory.
/// - The logger backend fails to start.
pub fn init_logging(level: LogLevel, log_dir: &Path) -> Result<(), LoggingError> {
    let dir = parse_log_dir(&log_dir.to_string_lossy())?;

    if let Some(sink) = ACTIVE_SINK.get() {
        return sink.check_reopen(level, &dir);
    }

    let sink = ACTIVE_SINK.get_or_try_init(|| open_sink(level, &dir))?;
    sink.check_reopen(level, &dir)
}

/// Returns the open sink's `(level, log_dir)`, if any.
pub fn logging_status() -> Option<(LogLevel, PathBuf)> {
    ACTIVE_SINK.get().map(|sink| (sink.level, sink.dir.clone()))
}

/// `debug` for debug builds, `info` for release builds.
pub fn default_log_level() -> LogLevel {
    if cfg!(debug_assertions) {
        LogLevel::Debug
    } else {
        LogLevel::Info
    }
}

pub(crate) fn parse_log_dir(raw: &str) -> Result<PathBuf, LoggingError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LoggingError::EmptyLogDir);
    }
    let path = Path::new(trimmed);
    if !path.is_absolute() {
        return Err(LoggingError::RelativeLogDir(trimmed.to_string()));
    }
    Ok(path.to_path_buf())
}

fn open_sink(level: LogLevel, dir: &Path) -> Result<ActiveSink, LoggingError> {
    std::fs::create_dir_all(dir).map_err(|err| LoggingError::CreateLogDir {
        dir: dir.to_path_buf(),
        message: err.to_string(),
    })?;

    let handle = Logger::try_with_str(level.as_str())
        .map_err(|err| LoggingError::Backend(err.to_string()))?
        .log_to_file(FileSpec::default().directory(dir).basename(LOG_FILE_BASENAME))
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()
        .map_err(|err| LoggingError::Backend(err.to_string()))?;

    capture_panics_once();

    info!(
        "event=pokedex_start module=logging status=ok version={} build={} os={}",
        env!("CARGO_PKG_VERSION"),
        if cfg!(debug_assertions) { "debug" } else { "release" },
        std::env::consts::OS
    );
    info!(
        "event=log_sink_open module=logging status=ok level={} dir={} rotate_bytes={} keep_files={}",
        level,
        dir.display(),
        ROTATE_AT_BYTES,
        KEEP_LOG_FILES
    );

    Ok(ActiveSink {
        level,
        dir: dir.to_path_buf(),
        _handle: handle,
    })
}

fn capture_panics_once() {
    if PANIC_HOOK.set(()).is_err() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_info.payload();
        let detail = payload
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
            .unwrap_or("non-string panic payload");
        // Payloads may echo pokemon names or lookup terms.
        error!(
            "event=pokedex_panic module=logging status=error location={} detail={}",
            location,
            single_line(detail, PANIC_DETAIL_MAX_CHARS)
        );
        previous_hook(panic_info);
    }));
}

fn single_line(value: &str, max_chars: usize) -> String {
    let flattened = value.replace(['\n', '\r'], " ");
    if flattened.chars().count() <= max_chars {
        return flattened;
    }
    let mut clipped: String = flattened.chars().take(max_chars).collect();
    clipped.push_str("...");
    clipped
}

#[cfg(test)]
mod tests {
    use super::{init_logging, logging_status, parse_log_dir, single_line, LogLevel, LoggingError};

    #[test]
    fn log_level_parses_case_insensitively() {
        assert_eq!(" INFO ".parse::<LogLevel>(), Ok(LogLevel::Info));
        assert_eq!("warning".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert_eq!(
            "verbose".parse::<LogLevel>(),
            Err(LoggingError::UnknownLevel("verbose".to_string()))
        );
        assert_eq!(LogLevel::Warn.to_string(), "warn");
    }

    #[test]
    fn log_dir_must_be_absolute_and_non_empty() {
        assert_eq!(
            parse_log_dir("logs/dev"),
            Err(LoggingError::RelativeLogDir("logs/dev".to_string()))
        );
        assert_eq!(parse_log_dir("  "), Err(LoggingError::EmptyLogDir));
    }

    #[test]
    fn single_line_flattens_and_clips() {
        assert_eq!(single_line("mew\ntwo", 20), "mew two");
        assert_eq!(single_line("bulbasaur\rivysaur", 9), "bulbasaur...");
    }

    #[test]
    fn sink_reopens_with_same_settings_and_rejects_switches() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();

        init_logging(LogLevel::Info, first.path()).expect("first open should succeed");
        init_logging(LogLevel::Info, first.path()).expect("same settings are a no-op");

        let level_error = init_logging(LogLevel::Debug, first.path()).unwrap_err();
        assert!(matches!(
            level_error,
            LoggingError::SinkConflict { ref requested, .. } if requested == "level `debug`"
        ));

        let dir_error = init_logging(LogLevel::Info, second.path()).unwrap_err();
        assert!(matches!(dir_error, LoggingError::SinkConflict { .. }));
        assert!(dir_error.to_string().contains("refusing to switch"));

        let (active_level, active_dir) = logging_status().expect("sink should be open");
        assert_eq!(active_level, LogLevel::Info);
        assert_eq!(active_dir, first.path());
    }
}
