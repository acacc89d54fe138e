//! Debug logging context for ectop.
//!
//! Structured debug output with the format `[+0000ms] [LEVEL] [component] message`.
//! Unlike a process-wide logger, a [`DebugLog`] is created once (usually in `main`)
//! and passed by value into the model, its views and the monitor. Clones share the
//! same enabled flag, start time and writer.
//!
//! Enabled via `--debug` flag or `ECTOP_DEBUG=1` environment variable.

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Environment variable that enables debug output.
pub const DEBUG_ENV: &str = "ECTOP_DEBUG";

/// Debug log levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    /// Tracing entry/exit of functions
    Trace,
    /// Debug information
    Debug,
    /// Informational messages
    Info,
    /// Warnings
    Warn,
    /// Errors
    Error,
}

impl Level {
    /// Fixed-width label printed in each line.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }

    fn color_code(self) -> &'static str {
        match self {
            Level::Trace => "\x1b[90m", // Gray
            Level::Debug => "\x1b[36m", // Cyan
            Level::Info => "\x1b[32m",  // Green
            Level::Warn => "\x1b[33m",  // Yellow
            Level::Error => "\x1b[31m", // Red
        }
    }
}

struct Inner {
    enabled: AtomicBool,
    colored: bool,
    start: Instant,
    writer: Mutex<Box<dyn Write + Send>>,
}

/// Shared debug logging context.
///
/// Disabled by default; a disabled context formats nothing.
#[derive(Clone)]
pub struct DebugLog {
    inner: Arc<Inner>,
}

impl DebugLog {
    /// Creates a disabled context writing colored lines to stderr.
    #[must_use]
    pub fn new() -> Self {
        Self::build(Box::new(io::stderr()), true)
    }

    /// Creates a disabled context writing plain lines to `writer`.
    #[must_use]
    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self::build(writer, false)
    }

    /// Creates a stderr context, enabled when `flag` is set or `ECTOP_DEBUG=1`.
    #[must_use]
    pub fn from_env(flag: bool) -> Self {
        let log = Self::new();
        let env_enabled = std::env::var(DEBUG_ENV).is_ok_and(|v| v == "1");
        if flag || env_enabled {
            log.enable();
        }
        log
    }

    fn build(writer: Box<dyn Write + Send>, colored: bool) -> Self {
        Self {
            inner: Arc::new(Inner {
                enabled: AtomicBool::new(false),
                colored,
                start: Instant::now(),
                writer: Mutex::new(writer),
            }),
        }
    }

    /// Enables output for every clone of this context.
    pub fn enable(&self) {
        self.inner.enabled.store(true, Ordering::SeqCst);
    }

    /// Disables output for every clone of this context.
    pub fn disable(&self) {
        self.inner.enabled.store(false, Ordering::SeqCst);
    }

    /// Returns true if output is enabled.
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.inner.enabled.load(Ordering::Relaxed)
    }

    /// Milliseconds since the context was created.
    #[must_use]
    pub fn elapsed_ms(&self) -> u128 {
        self.inner.start.elapsed().as_millis()
    }

    /// Logs a message if output is enabled.
    pub fn log(&self, level: Level, component: &str, message: &str) {
        if !self.is_enabled() {
            return;
        }

        let elapsed = self.elapsed_ms();
        let (color, reset) = if self.inner.colored {
            (level.color_code(), "\x1b[0m")
        } else {
            ("", "")
        };

        if let Ok(mut writer) = self.inner.writer.lock() {
            // Format: [+0000ms] [LEVEL] [component] message
            let _ = writeln!(
                writer,
                "[+{:04}ms] {}[{:5}]{} [{}] {}",
                elapsed,
                color,
                level.as_str(),
                reset,
                component,
                message
            );
        }
    }

    /// Starts a timing scope that logs entry now and duration on drop.
    pub fn time_scope(&self, component: &'static str, operation: impl Into<String>) -> TimingGuard {
        TimingGuard::new(self.clone(), component, operation)
    }
}

impl Default for DebugLog {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DebugLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DebugLog").field("enabled", &self.is_enabled()).finish()
    }
}

/// Logs with format arguments through a [`DebugLog`].
#[macro_export]
macro_rules! debug_log {
    ($log:expr, $level:expr, $component:expr, $($arg:tt)*) => {
        if $log.is_enabled() {
            $log.log($level, $component, &format!($($arg)*));
        }
    };
}

/// Convenience macro for trace level.
#[macro_export]
macro_rules! trace {
    ($log:expr, $component:expr, $($arg:tt)*) => {
        $crate::debug_log!($log, $crate::debug::Level::Trace, $component, $($arg)*)
    };
}

/// Convenience macro for debug level.
#[macro_export]
macro_rules! debug {
    ($log:expr, $component:expr, $($arg:tt)*) => {
        $crate::debug_log!($log, $crate::debug::Level::Debug, $component, $($arg)*)
    };
}

/// Convenience macro for info level.
#[macro_export]
macro_rules! info {
    ($log:expr, $component:expr, $($arg:tt)*) => {
        $crate::debug_log!($log, $crate::debug::Level::Info, $component, $($arg)*)
    };
}

/// Convenience macro for warn level.
#[macro_export]
macro_rules! warn {
    ($log:expr, $component:expr, $($arg:tt)*) => {
        $crate::debug_log!($log, $crate::debug::Level::Warn, $component, $($arg)*)
    };
}

/// Convenience macro for error level.
#[macro_export]
macro_rules! error {
    ($log:expr, $component:expr, $($arg:tt)*) => {
        $crate::debug_log!($log, $crate::debug::Level::Error, $component, $($arg)*)
    };
}

/// RAII guard for timing a scope.
pub struct TimingGuard {
    log: DebugLog,
    component: &'static str,
    operation: String,
    start: Instant,
}

impl TimingGuard {
    /// Creates a new timing guard.
    pub fn new(log: DebugLog, component: &'static str, operation: impl Into<String>) -> Self {
        let operation = operation.into();
        if log.is_enabled() {
            log.log(Level::Trace, component, &format!("-> {operation}"));
        }
        Self { log, component, operation, start: Instant::now() }
    }
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        if self.log.is_enabled() {
            let elapsed = self.start.elapsed();
            self.log.log(
                Level::Trace,
                self.component,
                &format!("<- {} ({:.2}ms)", self.operation, elapsed.as_secs_f64() * 1000.0),
            );
        }
    }
}

/// Creates a timing guard for a scope.
#[macro_export]
macro_rules! time_scope {
    ($log:expr, $component:expr, $operation:expr) => {
        let _guard = $log.time_scope($component, $operation);
    };
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Writer that appends into a shared buffer, for capturing log output.
    #[derive(Clone, Default)]
    pub(crate) struct Capture(pub(crate) Arc<Mutex<Vec<u8>>>);

    impl Capture {
        pub(crate) fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    pub(crate) fn captured() -> (DebugLog, Capture) {
        let capture = Capture::default();
        let log = DebugLog::with_writer(Box::new(capture.clone()));
        (log, capture)
    }

    #[test]
    fn test_debug_disabled_by_default() {
        let log = DebugLog::new();
        assert!(!log.is_enabled());
    }

    #[test]
    fn test_enable_disable_shared_between_clones() {
        let log = DebugLog::new();
        let clone = log.clone();

        log.enable();
        assert!(clone.is_enabled());

        clone.disable();
        assert!(!log.is_enabled());
    }

    #[test]
    fn test_level_as_str() {
        assert_eq!(Level::Trace.as_str(), "TRACE");
        assert_eq!(Level::Debug.as_str(), "DEBUG");
        assert_eq!(Level::Info.as_str(), "INFO");
        assert_eq!(Level::Warn.as_str(), "WARN");
        assert_eq!(Level::Error.as_str(), "ERROR");
    }

    #[test]
    fn test_level_has_color() {
        for level in [Level::Trace, Level::Debug, Level::Info, Level::Warn, Level::Error] {
            assert!(!level.color_code().is_empty());
        }
    }

    #[test]
    fn test_log_when_disabled_writes_nothing() {
        let (log, capture) = captured();
        log.log(Level::Debug, "test", "message");
        assert!(capture.text().is_empty());
    }

    #[test]
    fn test_log_line_format() {
        let (log, capture) = captured();
        log.enable();
        log.log(Level::Info, "grid", "hello world");

        let text = capture.text();
        assert!(text.starts_with("[+"), "{text}");
        assert!(text.contains("[INFO ] [grid] hello world"), "{text}");
        assert!(!text.contains('\x1b'), "captured output is uncolored");
    }

    #[test]
    fn test_macros_format_arguments() {
        let (log, capture) = captured();
        log.enable();
        crate::warn!(log, "view", "{} rows", 3);
        crate::error!(log, "log", "flush failed: {}", "disk");

        let text = capture.text();
        assert!(text.contains("[WARN ] [view] 3 rows"));
        assert!(text.contains("[ERROR] [log] flush failed: disk"));
    }

    #[test]
    fn test_timing_guard_logs_entry_and_exit() {
        let (log, capture) = captured();
        log.enable();
        {
            let _guard = log.time_scope("test", "operation");
        }
        let text = capture.text();
        assert!(text.contains("-> operation"));
        assert!(text.contains("<- operation ("));
    }

    #[test]
    fn test_timing_guard_when_disabled() {
        let (log, capture) = captured();
        {
            crate::time_scope!(log, "test", "noop");
        }
        assert!(capture.text().is_empty());
    }

    #[test]
    fn test_level_ordering() {
        assert!(Level::Trace < Level::Error);
        assert_ne!(Level::Trace, Level::Debug);
    }
}
