//! Query tracing sink.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Notice,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Debug => "debug",
            LogLevel::Notice => "notice",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(label)
    }
}

/// Where executed statements and recoverable anomalies are reported.
pub trait QueryLogger: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

/// Default sink: forwards to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl QueryLogger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!(target: "mysql_middleware::query", "{message}"),
            LogLevel::Notice => tracing::info!(target: "mysql_middleware", "{message}"),
            LogLevel::Warn => tracing::warn!(target: "mysql_middleware", "{message}"),
            LogLevel::Error => tracing::error!(target: "mysql_middleware", "{message}"),
        }
    }
}

/// A logger plus an on/off switch that can be flipped temporarily.
#[derive(Clone)]
pub struct QueryLog {
    sink: Arc<dyn QueryLogger>,
    enabled: Arc<AtomicBool>,
}

impl fmt::Debug for QueryLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryLog")
            .field("enabled", &self.is_enabled())
            .finish_non_exhaustive()
    }
}

impl Default for QueryLog {
    fn default() -> Self {
        Self::new(Arc::new(TracingLogger))
    }
}

impl QueryLog {
    #[must_use]
    pub fn new(sink: Arc<dyn QueryLogger>) -> Self {
        Self {
            sink,
            enabled: Arc::new(AtomicBool::new(true)),
        }
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub fn log(&self, level: LogLevel, message: &str) {
        if self.is_enabled() {
            self.sink.log(level, message);
        }
    }

    /// Suspend logging until the returned guard is dropped. The previous state comes back
    /// even when the guarded code returns early with an error.
    #[must_use]
    pub fn suspend(&self) -> LogSuspendGuard {
        let previous = self.enabled.swap(false, Ordering::Relaxed);
        LogSuspendGuard {
            enabled: self.enabled.clone(),
            previous,
        }
    }
}

pub struct LogSuspendGuard {
    enabled: Arc<AtomicBool>,
    previous: bool,
}

impl Drop for LogSuspendGuard {
    fn drop(&mut self) {
        self.enabled.store(self.previous, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Collect(Mutex<Vec<String>>);

    impl QueryLogger for Collect {
        fn log(&self, level: LogLevel, message: &str) {
            self.0.lock().unwrap().push(format!("{level}: {message}"));
        }
    }

    #[test]
    fn suspension_is_scoped_and_nests() {
        let sink = Arc::new(Collect::default());
        let log = QueryLog::new(sink.clone());

        log.log(LogLevel::Debug, "one");
        {
            let _outer = log.suspend();
            log.log(LogLevel::Debug, "hidden");
            {
                let _inner = log.suspend();
            }
            assert!(!log.is_enabled());
        }
        log.log(LogLevel::Warn, "two");

        assert_eq!(*sink.0.lock().unwrap(), vec!["debug: one", "warn: two"]);
    }

    #[test]
    fn restores_after_early_return() {
        let log = QueryLog::default();
        let attempt = || -> Result<(), ()> {
            let _guard = log.suspend();
            Err(())
        };
        assert!(attempt().is_err());
        assert!(log.is_enabled());
    }
}
