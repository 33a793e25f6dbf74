//! Controller instantiation and the `beforeStart` / `afterStart` protocol.
//!
//! ```text
//! merged options ──► beforeStart(options, ctor) ──► Some(x): use x
//!                                               └─► None:    keep options
//!                         │
//!                         ▼
//!                 ctor.construct(options) ──► instance ──► afterStart(instance)
//! ```
//!
//! The constructor runs exactly once whether or not a `beforeStart` hook is
//! present; a hook cannot skip instantiation. `afterStart` cannot replace the
//! instance.

use tracing::trace;

use crate::runner::controller::{AfterStart, BeforeStart, Constructor, Instance};
use crate::runner::error::{BinderError, HookStage};
use crate::runner::options::Options;

/// Invoke `ctor` with `options`.
pub fn run_controller(controller: &str, ctor: &Constructor, options: Options) -> Result<Instance, BinderError> {
    trace!(controller, "constructing controller");
    ctor.construct(options)
        .map_err(|source| BinderError::Construction {
            controller: controller.to_string(),
            source,
        })
}

/// Run `hook`, then construct with its replacement options or the originals.
pub fn execute_before_start(
    controller: &str,
    hook: &BeforeStart,
    ctor: &Constructor,
    options: Options,
) -> Result<Instance, BinderError> {
    let replacement = hook.call(&options, ctor).map_err(|source| BinderError::Hook {
        controller: controller.to_string(),
        stage: HookStage::BeforeStart,
        source,
    })?;

    run_controller(controller, ctor, replacement.unwrap_or(options))
}

/// Run `hook` on `instance` and hand the same instance back.
pub fn execute_after_start(controller: &str, hook: &AfterStart, instance: Instance) -> Result<Instance, BinderError> {
    hook.call(&instance).map_err(|source| BinderError::Hook {
        controller: controller.to_string(),
        stage: HookStage::AfterStart,
        source,
    })?;
    Ok(instance)
}
