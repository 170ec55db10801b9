//! Logging bootstrap.
//!
//! # Responsibility
//! - Start the `flexi_logger` backend once per process from [`LoggingConfig`].
//! - Capture panics as structured log events.
//!
//! # Invariants
//! - Initialization is idempotent for an identical configuration and rejects
//!   a different one.
//! - Initialization never panics.
//! - Log lines are `event=... module=... status=...` key/value messages.

use crate::config::LoggingConfig;
use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use log::{error, info};
use once_cell::sync::OnceCell;
use std::path::PathBuf;
use thiserror::Error;

const LOG_FILE_BASENAME: &str = "folio";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;
const MAX_LOG_FILES: usize = 5;
const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    dir: Option<PathBuf>,
    _logger: LoggerHandle,
}

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("unsupported log level `{0}`; expected trace|debug|info|warn|error")]
    UnsupportedLevel(String),
    #[error("log dir must be an absolute path, got `{0}`")]
    RelativeDir(PathBuf),
    #[error("failed to create log directory `{path}`: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to start logger: {0}")]
    Backend(#[from] flexi_logger::FlexiLoggerError),
    #[error("logging already initialized with {active}; refusing to switch to {requested}")]
    Conflict { active: String, requested: String },
}

/// Starts process-wide logging.
///
/// # Errors
/// - Unsupported level, relative directory, or directory creation failure.
/// - A previous call used a different level or destination.
pub fn init_logging(config: &LoggingConfig) -> Result<(), LoggingError> {
    let level = normalize_level(&config.level)?;
    if let Some(dir) = &config.dir {
        if !dir.is_absolute() {
            return Err(LoggingError::RelativeDir(dir.clone()));
        }
    }

    let state = LOGGING_STATE.get_or_try_init(|| start_logger(level, config.dir.clone()))?;
    if state.level != level || state.dir != config.dir {
        return Err(LoggingError::Conflict {
            active: describe(state.level, state.dir.as_ref()),
            requested: describe(level, config.dir.as_ref()),
        });
    }
    Ok(())
}

/// Returns `(level, dir)` of active logging, or `None` before init.
pub fn logging_status() -> Option<(&'static str, Option<PathBuf>)> {
    LOGGING_STATE
        .get()
        .map(|state| (state.level, state.dir.clone()))
}

/// Default level for the current build mode: `debug` or `info`.
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

fn start_logger(level: &'static str, dir: Option<PathBuf>) -> Result<LoggingState, LoggingError> {
    let logger = Logger::try_with_str(level)?;
    let handle = match &dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).map_err(|source| LoggingError::CreateDir {
                path: dir.clone(),
                source,
            })?;
            logger
                .log_to_file(
                    FileSpec::default()
                        .directory(dir.as_path())
                        .basename(LOG_FILE_BASENAME),
                )
                .rotate(
                    Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
                    Naming::Numbers,
                    Cleanup::KeepLogFiles(MAX_LOG_FILES),
                )
                .write_mode(WriteMode::BufferAndFlush)
                .append()
                .format_for_files(flexi_logger::detailed_format)
                .start()?
        }
        None => logger
            .log_to_stderr()
            .format_for_stderr(flexi_logger::detailed_format)
            .start()?,
    };

    install_panic_hook_once();
    info!(
        "event=app_start module=core status=ok platform={} version={} level={level} destination={}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION"),
        dir.as_ref()
            .map_or_else(|| "stderr".to_string(), |dir| dir.display().to_string())
    );

    Ok(LoggingState {
        level,
        dir,
        _logger: handle,
    })
}

fn describe(level: &str, dir: Option<&PathBuf>) -> String {
    match dir {
        Some(dir) => format!("level `{level}` at `{}`", dir.display()),
        None => format!("level `{level}` on stderr"),
    }
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(LoggingError::UnsupportedLevel(other.to_string())),
    }
}

fn install_panic_hook_once() {
    if PANIC_HOOK_INSTALLED.set(()).is_err() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = if let Some(message) = panic_info.payload().downcast_ref::<&str>() {
            (*message).to_string()
        } else if let Some(message) = panic_info.payload().downcast_ref::<String>() {
            message.clone()
        } else {
            "non-string panic payload".to_string()
        };
        error!(
            "event=panic_captured module=core status=error location={location} payload={}",
            sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
        );
        previous_hook(panic_info);
    }));
}

/// Flattens newlines and caps length; payloads may carry user text.
fn sanitize_message(value: &str, max_chars: usize) -> String {
    let normalized = value.replace(['\n', '\r'], " ");
    let mut truncated = normalized.chars().take(max_chars).collect::<String>();
    if normalized.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}

#[cfg(test)]
mod tests {
    use super::{init_logging, logging_status, normalize_level, sanitize_message, LoggingError};
    use crate::config::LoggingConfig;
    use std::path::PathBuf;

    #[test]
    fn normalize_level_accepts_known_values() {
        assert_eq!(normalize_level("INFO").unwrap(), "info");
        assert_eq!(normalize_level(" warning ").unwrap(), "warn");
        assert!(matches!(
            normalize_level("loud"),
            Err(LoggingError::UnsupportedLevel(level)) if level == "loud"
        ));
    }

    #[test]
    fn relative_log_dir_is_rejected_before_init() {
        let config = LoggingConfig {
            level: "info".to_string(),
            dir: Some(PathBuf::from("logs/dev")),
        };
        assert!(matches!(
            init_logging(&config),
            Err(LoggingError::RelativeDir(_))
        ));
    }

    #[test]
    fn sanitize_message_removes_newlines_and_truncates() {
        let sanitized = sanitize_message("line1\nline2\rline3", 8);
        assert!(!sanitized.contains('\n'));
        assert!(!sanitized.contains('\r'));
        assert!(sanitized.ends_with("..."));
    }

    #[test]
    fn init_is_idempotent_and_rejects_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            level: "info".to_string(),
            dir: Some(dir.path().to_path_buf()),
        };

        init_logging(&config).unwrap();
        init_logging(&config).unwrap();

        let louder = LoggingConfig {
            level: "debug".to_string(),
            ..config.clone()
        };
        assert!(matches!(
            init_logging(&louder),
            Err(LoggingError::Conflict { .. })
        ));

        let elsewhere = LoggingConfig {
            level: "info".to_string(),
            dir: None,
        };
        assert!(matches!(
            init_logging(&elsewhere),
            Err(LoggingError::Conflict { .. })
        ));

        let (level, active_dir) = logging_status().unwrap();
        assert_eq!(level, "info");
        assert_eq!(active_dir.as_deref(), Some(dir.path()));
    }
}
