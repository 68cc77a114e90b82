//! Logger setup for the `--echo-log` flag.

use std::error::Error;
use std::io::Write;
use std::sync::Arc;

use tt_core::{LogBackend, LogLevel, Logger, TracingBackend};

/// Tracing backend that also counts levels at or above `min_level` as enabled,
/// so they reach logger observers even when tracing would filter them out.
#[derive(Debug, Clone, Copy)]
pub struct EchoBackend {
    min_level: LogLevel,
}

impl EchoBackend {
    pub const fn new(min_level: LogLevel) -> Self {
        Self { min_level }
    }
}

impl LogBackend for EchoBackend {
    fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.min_level || TracingBackend.is_enabled(level)
    }

    fn write(&self, level: LogLevel, message: &str, error: Option<&(dyn Error + 'static)>) {
        // tracing applies its own filter here.
        TracingBackend.write(level, message, error);
    }
}

/// Builds the process logger, echoing messages to stderr when requested.
pub fn build_logger(echo: Option<LogLevel>) -> Arc<Logger> {
    let Some(min_level) = echo else {
        return Logger::shared();
    };

    let logger = Arc::new(Logger::new(EchoBackend::new(min_level)));
    logger.subscribe(move |level, message| {
        if level >= min_level {
            let _ = writeln!(std::io::stderr().lock(), "[{level}] {message}");
        }
    });
    logger
}
