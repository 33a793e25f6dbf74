//! Diagnostic logging.
//!
//! Provides the binder's `log`/`info`/`warn`/`error` channel. Messages go to a
//! [`DiagnosticSink`]. A logger without a sink, or whose sink has nowhere to
//! write, refuses to log and reports [`BinderError::NoDiagnosticSink`].

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use tracing::dispatcher;
use tracing::subscriber::NoSubscriber;
use tracing::{error, info, warn};

use crate::runner::error::BinderError;

/// Severity of a diagnostic message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Level {
    #[default]
    Log,
    Info,
    Warn,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Log => write!(f, "log"),
            Level::Info => write!(f, "info"),
            Level::Warn => write!(f, "warn"),
            Level::Error => write!(f, "error"),
        }
    }
}

/// Destination for diagnostic messages.
pub trait DiagnosticSink {
    fn write(&self, level: Level, message: &str);

    /// Whether written messages reach anything.
    fn is_available(&self) -> bool {
        true
    }
}

/// Forwards messages as `tracing` events.
///
/// Unavailable until a subscriber is installed, globally or for the current
/// thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn is_available(&self) -> bool {
        dispatcher::has_been_set() || dispatcher::get_default(|d| !d.is::<NoSubscriber>())
    }

    fn write(&self, level: Level, message: &str) {
        match level {
            Level::Log | Level::Info => info!(target: "ctrl", "{}", message),
            Level::Warn => warn!(target: "ctrl", "{}", message),
            Level::Error => error!(target: "ctrl", "{}", message),
        }
    }
}

/// Writes `log`/`info` to stdout and `warn`/`error` to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleSink;

impl DiagnosticSink for ConsoleSink {
    fn write(&self, level: Level, message: &str) {
        match level {
            Level::Log | Level::Info => println!("{}", message),
            Level::Warn => eprintln!("Warning: {}", message),
            Level::Error => eprintln!("Error: {}", message),
        }
    }
}

/// Records messages in memory. Clones share the same record.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Rc<RefCell<Vec<(Level, String)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }

    /// All recorded messages, oldest first.
    pub fn records(&self) -> Vec<(Level, String)> {
        self.records.borrow().clone()
    }

    /// Recorded messages at `level`.
    pub fn messages(&self, level: Level) -> Vec<String> {
        self.records
            .borrow()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    pub fn clear(&self) {
        self.records.borrow_mut().clear();
    }
}

impl DiagnosticSink for MemorySink {
    fn write(&self, level: Level, message: &str) {
        self.records.borrow_mut().push((level, message.to_string()));
    }
}

/// Severity-tagged logger over an optional sink.
pub struct Logger {
    sink: Option<Box<dyn DiagnosticSink>>,
}

impl Logger {
    pub fn new(sink: impl DiagnosticSink + 'static) -> Self {
        Logger {
            sink: Some(Box::new(sink)),
        }
    }

    /// A logger with nowhere to write; every `log` call fails.
    pub fn without_sink() -> Self {
        Logger { sink: None }
    }

    pub fn set_sink(&mut self, sink: impl DiagnosticSink + 'static) {
        self.sink = Some(Box::new(sink));
    }

    pub fn remove_sink(&mut self) -> Option<Box<dyn DiagnosticSink>> {
        self.sink.take()
    }

    /// True when a sink is installed and can currently be written to.
    pub fn has_sink(&self) -> bool {
        self.sink.as_ref().map_or(false, |sink| sink.is_available())
    }

    /// Write `message` at `level`.
    pub fn log(&self, message: impl AsRef<str>, level: Level) -> Result<(), BinderError> {
        let message = message.as_ref();
        match &self.sink {
            Some(sink) if sink.is_available() => {
                sink.write(level, message);
                Ok(())
            }
            _ => Err(BinderError::NoDiagnosticSink(message.to_string())),
        }
    }

    pub fn warn(&self, message: impl AsRef<str>) -> Result<(), BinderError> {
        self.log(message, Level::Warn)
    }
}

impl Default for Logger {
    fn default() -> Self {
        Logger::new(TracingSink)
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").field("has_sink", &self.has_sink()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_defaults_to_log_level() {
        let sink = MemorySink::new();
        let logger = Logger::new(sink.clone());

        logger.log("hello", Level::default()).unwrap();
        logger.warn("careful").unwrap();

        assert_eq!(
            sink.records(),
            vec![
                (Level::Log, "hello".to_string()),
                (Level::Warn, "careful".to_string()),
            ]
        );
        assert_eq!(sink.messages(Level::Warn), vec!["careful".to_string()]);
    }

    #[test]
    fn test_log_without_sink_fails() {
        let logger = Logger::without_sink();
        match logger.log("lost", Level::Error) {
            Err(BinderError::NoDiagnosticSink(message)) => assert_eq!(message, "lost"),
            other => panic!("expected NoDiagnosticSink, got {:?}", other),
        }
    }

    #[test]
    fn test_remove_sink_disables_logging() {
        let mut logger = Logger::new(MemorySink::new());
        assert!(logger.has_sink());
        assert!(logger.remove_sink().is_some());
        assert!(logger.warn("gone").is_err());
    }

    #[test]
    fn test_tracing_sink_needs_a_subscriber() {
        let logger = Logger::default();
        if !dispatcher::has_been_set() {
            assert!(!logger.has_sink());
            assert!(matches!(logger.warn("unheard"), Err(BinderError::NoDiagnosticSink(_))));
        }

        let subscriber = tracing_subscriber::fmt().with_writer(std::io::sink).finish();
        tracing::subscriber::with_default(subscriber, || {
            assert!(logger.has_sink());
            assert!(logger.warn("heard").is_ok());
        });
    }
}
