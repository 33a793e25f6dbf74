//! Error type shared by the binder, the document model and the parsers.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Lifecycle hook that raised an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    BeforeStart,
    AfterStart,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookStage::BeforeStart => write!(f, "beforeStart"),
            HookStage::AfterStart => write!(f, "afterStart"),
        }
    }
}

/// Errors surfaced by the binder.
///
/// A missing or unknown controller name is not an error: it is reported as a
/// warning through the [`Logger`](crate::runner::logger::Logger) and the
/// element is skipped.
#[derive(Debug, Error)]
pub enum BinderError {
    /// The logger has no diagnostic sink to write to.
    #[error("no diagnostic sink available for message: {0}")]
    NoDiagnosticSink(String),

    /// A controller constructor returned an error.
    #[error("controller \"{controller}\" failed to start: {source}")]
    Construction {
        controller: String,
        source: anyhow::Error,
    },

    /// A `beforeStart` or `afterStart` hook returned an error.
    #[error("{stage} hook of controller \"{controller}\" failed: {source}")]
    Hook {
        controller: String,
        stage: HookStage,
        source: anyhow::Error,
    },

    /// A selector string could not be parsed.
    #[error("invalid selector {selector:?}: {message}")]
    Selector { selector: String, message: String },

    /// Markup could not be parsed into a document.
    #[error("markup error: {0}")]
    Markup(String),

    /// Configuration could not be parsed.
    #[error("config error: {0}")]
    Config(String),

    /// A file could not be read.
    #[error("I/O error reading {}: {error}", .path.display())]
    Io {
        path: PathBuf,
        error: std::io::Error,
    },

    /// One or more controllers failed while failures were isolated.
    #[error("{failures} controller(s) failed to start")]
    Isolated { failures: usize },
}

impl BinderError {
    /// True for errors raised by controller code rather than by the binder.
    pub fn is_controller_failure(&self) -> bool {
        matches!(self, BinderError::Construction { .. } | BinderError::Hook { .. })
    }
}
