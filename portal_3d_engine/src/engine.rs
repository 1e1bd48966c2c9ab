//! Process-wide logging state.
//!
//! Portals, cameras and travellers are plain data owned by the caller; the
//! logger and its severity filter are the only globals.

use std::sync::{OnceLock, RwLock};
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::SystemTime;
use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};

static LOGGER: OnceLock<RwLock<Box<dyn Logger>>> = OnceLock::new();

// discriminant of the lowest forwarded severity
static MIN_SEVERITY: AtomicU8 = AtomicU8::new(LogSeverity::Trace as u8);

fn logger() -> &'static RwLock<Box<dyn Logger>> {
    LOGGER.get_or_init(|| RwLock::new(Box::new(DefaultLogger)))
}

fn severity_from_u8(value: u8) -> LogSeverity {
    match value {
        0 => LogSeverity::Trace,
        1 => LogSeverity::Debug,
        2 => LogSeverity::Info,
        3 => LogSeverity::Warn,
        _ => LogSeverity::Error,
    }
}

/// Entry point for engine-wide settings.
///
/// ```no_run
/// use portal_3d_engine::portal3d::{Engine, log::{Logger, LogEntry, LogSeverity}};
///
/// struct Quiet;
/// impl Logger for Quiet {
///     fn log(&self, _entry: &LogEntry) {}
/// }
///
/// Engine::set_logger(Quiet);
/// Engine::set_min_severity(LogSeverity::Info);
/// ```
pub struct Engine;

impl Engine {
    /// Routes all further entries to `logger`.
    pub fn set_logger<L: Logger + 'static>(logger: L) {
        if let Ok(mut lock) = self::logger().write() {
            *lock = Box::new(logger);
        }
    }

    /// Back to the colored stdout logger.
    pub fn reset_logger() {
        if let Ok(mut lock) = self::logger().write() {
            *lock = Box::new(DefaultLogger);
        }
    }

    /// Entries below `severity` are dropped before reaching the logger.
    /// Per-frame render and crossing decisions are logged at Trace.
    pub fn set_min_severity(severity: LogSeverity) {
        MIN_SEVERITY.store(severity as u8, Ordering::Relaxed);
    }

    pub fn min_severity() -> LogSeverity {
        severity_from_u8(MIN_SEVERITY.load(Ordering::Relaxed))
    }

    /// Backs `engine_trace!` through `engine_warn!`.
    pub fn log(severity: LogSeverity, source: &str, message: String) {
        Self::dispatch(severity, source, message, None, None);
    }

    /// Same as [`Engine::log`] with a source location; backs `engine_error!`.
    pub fn log_detailed(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: &'static str,
        line: u32,
    ) {
        Self::dispatch(severity, source, message, Some(file), Some(line));
    }

    fn dispatch(
        severity: LogSeverity,
        source: &str,
        message: String,
        file: Option<&'static str>,
        line: Option<u32>,
    ) {
        if severity < Self::min_severity() {
            return;
        }
        if let Ok(lock) = self::logger().read() {
            lock.log(&LogEntry {
                severity,
                timestamp: SystemTime::now(),
                source: source.to_string(),
                message,
                file,
                line,
            });
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
