//! Engine logging.
//!
//! Everything the crate reports goes through [`Engine::log`](crate::portal3d::Engine)
//! to a single replaceable [`Logger`]. The default one prints colored lines
//! to stdout. ERROR entries raised through the macros carry `file:line`.

use colored::*;
use std::time::SystemTime;
use chrono::{DateTime, Local};

/// Sink for engine log entries.
///
/// Install one with `Engine::set_logger` to route portal diagnostics to a
/// file, an in-game console or a test buffer.
///
/// ```no_run
/// use portal_3d_engine::portal3d::log::{Logger, LogEntry};
///
/// struct Console;
///
/// impl Logger for Console {
///     fn log(&self, entry: &LogEntry) {
///         eprintln!("{}: {}", entry.source, entry.message);
///     }
/// }
/// ```
pub trait Logger: Send + Sync {
    fn log(&self, entry: &LogEntry);
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub severity: LogSeverity,
    pub timestamp: SystemTime,
    /// Emitting component, e.g. `"portal3d::PortalWorld"`.
    pub source: String,
    pub message: String,
    /// Set for ERROR entries only.
    pub file: Option<&'static str>,
    /// Set for ERROR entries only.
    pub line: Option<u32>,
}

/// Ordered from most to least verbose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogSeverity {
    /// Per-frame render decisions and crossing offsets
    Trace,
    Debug,
    Info,
    /// Recovered failures such as a skipped portal render
    Warn,
    Error,
}

impl LogSeverity {
    /// Fixed-width tag used by [`DefaultLogger`].
    pub fn label(self) -> &'static str {
        match self {
            LogSeverity::Trace => "TRACE",
            LogSeverity::Debug => "DEBUG",
            LogSeverity::Info => "INFO ",
            LogSeverity::Warn => "WARN ",
            LogSeverity::Error => "ERROR",
        }
    }

    fn colored_label(self) -> ColoredString {
        let label = self.label();
        match self {
            LogSeverity::Trace => label.bright_black(),
            LogSeverity::Debug => label.cyan(),
            LogSeverity::Info => label.green(),
            LogSeverity::Warn => label.yellow(),
            LogSeverity::Error => label.red().bold(),
        }
    }
}

/// Renders an entry as `[time] [LEVEL] [source] message`, followed by
/// ` (file:line)` when the location is known. No colors.
pub fn format_entry(entry: &LogEntry) -> String {
    let mut line = format!(
        "[{}] [{}] [{}] {}",
        local_time(entry.timestamp),
        entry.severity.label(),
        entry.source,
        entry.message,
    );
    if let (Some(file), Some(line_number)) = (entry.file, entry.line) {
        line.push_str(&format!(" ({}:{})", file, line_number));
    }
    line
}

fn local_time(timestamp: SystemTime) -> String {
    let datetime: DateTime<Local> = timestamp.into();
    datetime.format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}

/// Colored stdout logger installed until `Engine::set_logger` replaces it.
pub struct DefaultLogger;

impl Logger for DefaultLogger {
    fn log(&self, entry: &LogEntry) {
        let location = match (entry.file, entry.line) {
            (Some(file), Some(line)) => format!(" ({}:{})", file, line),
            _ => String::new(),
        };
        println!(
            "[{}] [{}] [{}] {}{}",
            local_time(entry.timestamp),
            entry.severity.colored_label(),
            entry.source.bright_blue(),
            entry.message,
            location,
        );
    }
}

// ===== LOGGING MACROS =====

#[doc(hidden)]
#[macro_export]
macro_rules! engine_log {
    ($severity:ident, $source:expr, $($arg:tt)*) => {
        $crate::portal3d::Engine::log(
            $crate::portal3d::log::LogSeverity::$severity,
            $source,
            format!($($arg)*)
        )
    };
}

#[macro_export]
macro_rules! engine_trace {
    ($source:expr, $($arg:tt)*) => { $crate::engine_log!(Trace, $source, $($arg)*) };
}

#[macro_export]
macro_rules! engine_debug {
    ($source:expr, $($arg:tt)*) => { $crate::engine_log!(Debug, $source, $($arg)*) };
}

#[macro_export]
macro_rules! engine_info {
    ($source:expr, $($arg:tt)*) => { $crate::engine_log!(Info, $source, $($arg)*) };
}

#[macro_export]
macro_rules! engine_warn {
    ($source:expr, $($arg:tt)*) => { $crate::engine_log!(Warn, $source, $($arg)*) };
}

/// ERROR entry tagged with the call site.
#[macro_export]
macro_rules! engine_error {
    ($source:expr, $($arg:tt)*) => {
        $crate::portal3d::Engine::log_detailed(
            $crate::portal3d::log::LogSeverity::Error,
            $source,
            format!($($arg)*),
            file!(),
            line!()
        )
    };
}

/// Logs an ERROR and evaluates to `Error::BackendError` carrying the same text.
///
/// ```ignore
/// let texture = allocate().map_err(|e| engine_err!("portal3d::mock", "Allocation failed: {}", e))?;
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::portal3d::Error::BackendError(message)
    }};
}

/// `return Err(engine_err!(..))`
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

/// Logs an ERROR and evaluates to `Error::InvalidConfiguration`.
#[macro_export]
macro_rules! engine_config_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::portal3d::Error::InvalidConfiguration(message)
    }};
}

#[cfg(test)]
#[path = "log_tests.rs"]
mod tests;
