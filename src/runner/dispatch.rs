//! Per-element dispatch: name → definition → options → hooks → instance.

use tracing::debug;

use crate::dom::ElementRef;
use crate::runner::controller::{ControllerDefinition, Instance, Registry};
use crate::runner::error::BinderError;
use crate::runner::lifecycle::{execute_after_start, execute_before_start, run_controller};
use crate::runner::logger::Logger;
use crate::runner::options::{OptionValue, Options, ELEMENT_KEY};

/// Resolves and starts the controller of a single element.
pub struct Dispatcher<'a> {
    registry: &'a Registry,
    logger: &'a Logger,
    base_options: &'a Options,
    controller_attribute: &'a str,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        registry: &'a Registry,
        logger: &'a Logger,
        base_options: &'a Options,
        controller_attribute: &'a str,
    ) -> Self {
        Dispatcher {
            registry,
            logger,
            base_options,
            controller_attribute,
        }
    }

    /// Options for `definition` on `element`: base ⊕ `{element}` ⊕ static options.
    pub fn merged_options(&self, element: &ElementRef, definition: &ControllerDefinition) -> Options {
        let mut options = self.base_options.clone();
        options.insert(ELEMENT_KEY, OptionValue::Element(element.clone()));
        if let Some(static_options) = definition.options() {
            options.extend_from(static_options);
        }
        options
    }

    /// Start the controller named by `element`.
    ///
    /// Returns `Ok(None)` when the element names no controller or an unknown
    /// one; both cases are logged as warnings. Constructor and hook errors
    /// are returned as-is.
    pub fn use_controller(&self, element: &ElementRef) -> Result<Option<Instance>, BinderError> {
        let name = match element.attribute(self.controller_attribute) {
            Some(name) if !name.is_empty() => name,
            _ => {
                self.logger.warn("Controller not defined")?;
                return Ok(None);
            }
        };

        let definition = match self.registry.get(&name) {
            Some(definition) => definition,
            None => {
                self.logger.warn(format!("Controller \"{}\" not found", name))?;
                return Ok(None);
            }
        };

        debug!(controller = %name, element = ?element, "dispatching controller");

        let ctor = definition.ctor();
        let options = self.merged_options(element, definition);

        let instance = match definition.before_start() {
            Some(hook) => execute_before_start(&name, hook, ctor, options)?,
            None => run_controller(&name, ctor, options)?,
        };

        let instance = match definition.after_start() {
            Some(hook) => execute_after_start(&name, hook, instance)?,
            None => instance,
        };

        Ok(Some(instance))
    }
}
