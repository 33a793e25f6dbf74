//! The binder: selection, ordering and dispatch over a document.

use std::fmt;

use tracing::{debug, info_span};

use crate::dom::{DocumentSource, ElementRef};
use crate::runner::config::{BinderConfig, FailurePolicy};
use crate::runner::controller::{ControllerDefinition, Registry, RegistryHandle};
use crate::runner::dispatch::Dispatcher;
use crate::runner::error::BinderError;
use crate::runner::logger::{Level, Logger};
use crate::runner::options::Options;
use crate::runner::priority::PrioritySorter;

/// One entry of [`Binder::plan`].
#[derive(Debug, Clone)]
pub struct PlannedDispatch {
    pub element: ElementRef,
    /// Value of the controller attribute, if present and non-empty.
    pub controller: Option<String>,
    pub priority: Option<f64>,
    /// Whether `controller` names a registered definition.
    pub registered: bool,
}

/// Binds registered controllers to the elements of a document.
pub struct Binder<D: DocumentSource> {
    document: D,
    registry: RegistryHandle,
    config: BinderConfig,
    base_options: Options,
    sorter: PrioritySorter,
    logger: Logger,
}

impl<D: DocumentSource> Binder<D> {
    /// Create a binder over `document` with an initial set of controllers.
    pub fn new(document: D, controllers: Registry, config: BinderConfig) -> Self {
        let base_options = config.base_options();
        let sorter = PrioritySorter::new(config.priority_attribute.clone(), config.priority);
        Binder {
            document,
            registry: RegistryHandle::new(controllers),
            config,
            base_options,
            sorter,
            logger: Logger::default(),
        }
    }

    /// A binder with no controllers and the default configuration.
    pub fn with_defaults(document: D) -> Self {
        Self::new(document, Registry::new(), BinderConfig::default())
    }

    /// Select, sort and dispatch every candidate element once.
    ///
    /// Candidates and registry contents are captured when the pass starts.
    pub fn run(&self) -> Result<(), BinderError> {
        let span = info_span!("run", selector = %self.config.selector);
        let _enter = span.enter();

        let candidates = self.document.select(&self.config.selector)?;
        let registry = self.registry.snapshot();
        let ordered = self.sorter.sort(candidates);
        debug!(candidates = ordered.len(), "dispatching");

        let dispatcher = Dispatcher::new(
            &registry,
            &self.logger,
            &self.base_options,
            &self.config.controller_attribute,
        );

        let mut failures = 0;
        for element in &ordered {
            match dispatcher.use_controller(element) {
                Ok(_) => {}
                Err(err) if err.is_controller_failure() && self.config.failures == FailurePolicy::Isolate => {
                    self.logger.log(err.to_string(), Level::Error)?;
                    failures += 1;
                }
                Err(err) => return Err(err),
            }
        }

        if failures > 0 {
            return Err(BinderError::Isolated { failures });
        }
        Ok(())
    }

    /// The sorted candidates `run()` would dispatch, without dispatching.
    pub fn plan(&self) -> Result<Vec<PlannedDispatch>, BinderError> {
        let candidates = self.document.select(&self.config.selector)?;
        let registry = self.registry.snapshot();
        Ok(self
            .sorter
            .sort_with_priorities(candidates)
            .into_iter()
            .map(|(element, priority)| {
                let controller = element
                    .attribute(&self.config.controller_attribute)
                    .filter(|name| !name.is_empty());
                let registered = controller.as_deref().map_or(false, |name| registry.contains(name));
                PlannedDispatch {
                    element,
                    controller,
                    priority,
                    registered,
                }
            })
            .collect())
    }

    /// The definition registered under `name`.
    pub fn controller(&self, name: &str) -> Option<ControllerDefinition> {
        self.registry.get(name)
    }

    /// Register `definition` under `name`, replacing any previous one.
    pub fn set_controller(
        &self,
        name: impl Into<String>,
        definition: impl Into<ControllerDefinition>,
    ) -> ControllerDefinition {
        self.registry.set(name, definition)
    }

    /// Handle for registering controllers from inside constructors and hooks.
    pub fn registry_handle(&self) -> RegistryHandle {
        self.registry.clone()
    }

    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    pub fn document(&self) -> &D {
        &self.document
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn logger_mut(&mut self) -> &mut Logger {
        &mut self.logger
    }
}

impl<D: DocumentSource> fmt::Debug for Binder<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binder")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("logger", &self.logger)
            .finish()
    }
}
