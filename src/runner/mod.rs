//! Controller resolution and lifecycle engine.
//!
//! One [`Binder::run`](api::Binder::run) pass:
//!
//! ```text
//! DocumentSource::select(selector)
//!        │  candidates (fixed for the pass)
//!        ▼
//! PrioritySorter::sort ──► higher data-priority first
//!        │
//!        ▼  for each element, in order
//! Dispatcher::use_controller
//!   1. read data-controller       (missing  → warn, skip)
//!   2. Registry::get(name)        (unknown  → warn, skip)
//!   3. options = base ⊕ {element} ⊕ definition.options
//!   4. beforeStart?(options, ctor) → Some(replacement) | None
//!   5. ctor.construct(options)
//!   6. afterStart?(instance)
//! ```
//!
//! Constructor and hook errors abort the pass unless the binder is configured
//! with [`FailurePolicy::Isolate`](config::FailurePolicy::Isolate).

pub mod api;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod lifecycle;
pub mod logger;
pub mod options;
pub mod priority;

pub use api::{Binder, PlannedDispatch};
pub use config::{BinderConfig, FailurePolicy};
pub use error::{BinderError, HookStage};
pub use logger::{ConsoleSink, DiagnosticSink, Level, Logger, MemorySink, TracingSink};
pub use options::{OptionValue, Options};
pub use priority::{PriorityPolicy, PrioritySorter};
