//! Logging facade that fans every emitted message out to observers.
//!
//! [`Logger`] wraps a leveled [`LogBackend`] and additionally republishes each
//! message it writes to every subscribed observer, such as an on-screen log
//! pane. A single `Logger` is shared per process as an `Arc<Logger>` and handed
//! to the components that log through it.

use std::error::Error;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

/// Severity of a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = UnknownLogLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(UnknownLogLevel(s.to_string())),
        }
    }
}

/// Error returned when parsing an unrecognized log level.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown log level: {0}")]
pub struct UnknownLogLevel(String);

/// The leveled logger a [`Logger`] writes through.
pub trait LogBackend: Send + Sync {
    /// Whether messages at `level` would be recorded.
    fn is_enabled(&self, level: LogLevel) -> bool;

    /// Records a message. Only called when `is_enabled(level)` returned true.
    fn write(&self, level: LogLevel, message: &str, error: Option<&(dyn Error + 'static)>);
}

/// Backend that emits `tracing` events under the `tt` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingBackend;

impl LogBackend for TracingBackend {
    fn is_enabled(&self, level: LogLevel) -> bool {
        match level {
            LogLevel::Debug => tracing::enabled!(target: "tt", tracing::Level::DEBUG),
            LogLevel::Info => tracing::enabled!(target: "tt", tracing::Level::INFO),
            LogLevel::Warn => tracing::enabled!(target: "tt", tracing::Level::WARN),
            LogLevel::Error => tracing::enabled!(target: "tt", tracing::Level::ERROR),
        }
    }

    fn write(&self, level: LogLevel, message: &str, error: Option<&(dyn Error + 'static)>) {
        match (level, error) {
            (LogLevel::Debug, None) => tracing::debug!(target: "tt", "{message}"),
            (LogLevel::Debug, Some(err)) => tracing::debug!(target: "tt", error = %err, "{message}"),
            (LogLevel::Info, None) => tracing::info!(target: "tt", "{message}"),
            (LogLevel::Info, Some(err)) => tracing::info!(target: "tt", error = %err, "{message}"),
            (LogLevel::Warn, None) => tracing::warn!(target: "tt", "{message}"),
            (LogLevel::Warn, Some(err)) => tracing::warn!(target: "tt", error = %err, "{message}"),
            (LogLevel::Error, None) => tracing::error!(target: "tt", "{message}"),
            (LogLevel::Error, Some(err)) => tracing::error!(target: "tt", error = %err, "{message}"),
        }
    }
}

/// Handle returned by [`Logger::subscribe`], used to unsubscribe later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Arc<dyn Fn(LogLevel, &str) + Send + Sync>;

/// Generates the plain, with-error and formatted methods for one level.
macro_rules! level_methods {
    ($level:expr, $plain:ident, $with_error:ident, $formatted:ident) => {
        #[doc = concat!("Logs a message at ", stringify!($plain), " level.")]
        pub fn $plain(&self, message: &str) {
            self.dispatch($level, message, None);
        }

        #[doc = concat!("Logs a message and its cause at ", stringify!($plain), " level.")]
        ///
        /// The error reaches the backend as structured detail; observers only
        /// receive the message.
        pub fn $with_error(&self, message: &str, error: &(dyn Error + 'static)) {
            self.dispatch($level, message, Some(error));
        }

        #[doc = concat!("Logs pre-built format arguments at ", stringify!($plain), " level.")]
        pub fn $formatted(&self, args: fmt::Arguments<'_>) {
            self.dispatch_fmt($level, args);
        }
    };
}

/// Leveled logger that republishes every written message to its observers.
pub struct Logger {
    backend: Box<dyn LogBackend>,
    observers: Mutex<Vec<(SubscriptionId, Observer)>>,
    next_id: AtomicU64,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("observers", &self.observer_count())
            .finish_non_exhaustive()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(TracingBackend)
    }
}

impl Logger {
    /// Creates a logger writing through `backend`.
    pub fn new(backend: impl LogBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            observers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Creates the shared, tracing-backed logger.
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    level_methods!(LogLevel::Debug, debug, debug_with_error, debug_fmt);
    level_methods!(LogLevel::Info, info, info_with_error, info_fmt);
    level_methods!(LogLevel::Warn, warn, warn_with_error, warn_fmt);
    level_methods!(LogLevel::Error, error, error_with_error, error_fmt);

    /// Logs a message at an arbitrary level.
    pub fn log(&self, level: LogLevel, message: &str) {
        self.dispatch(level, message, None);
    }

    /// Registers an observer for every message this logger writes.
    ///
    /// Observers are notified in subscription order.
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(LogLevel, &str) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock_observers().push((id, Arc::new(observer)));
        id
    }

    /// Removes an observer. Returns false if it was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.lock_observers();
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    pub fn observer_count(&self) -> usize {
        self.lock_observers().len()
    }

    fn dispatch_fmt(&self, level: LogLevel, args: fmt::Arguments<'_>) {
        if !self.backend.is_enabled(level) {
            return;
        }
        let message = args.to_string();
        self.emit(level, &message, None);
    }

    fn dispatch(&self, level: LogLevel, message: &str, error: Option<&(dyn Error + 'static)>) {
        if !self.backend.is_enabled(level) {
            return;
        }
        self.emit(level, message, error);
    }

    fn emit(&self, level: LogLevel, message: &str, error: Option<&(dyn Error + 'static)>) {
        self.backend.write(level, message, error);

        // Snapshot so observers can log or unsubscribe without deadlocking.
        let observers: Vec<Observer> = self
            .lock_observers()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in observers {
            observer(level, message);
        }
    }

    fn lock_observers(&self) -> std::sync::MutexGuard<'_, Vec<(SubscriptionId, Observer)>> {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
