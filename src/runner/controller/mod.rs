//! Controller definitions and the registry that names them.
//!
//! A name resolves to either a bare [`Constructor`] or a
//! [`CompositeDefinition`] that adds static options and the `beforeStart` /
//! `afterStart` hooks:
//!
//! ```
//! use ctrl::runner::controller::{CompositeDefinition, Constructor, Registry};
//! use ctrl::runner::options::Options;
//!
//! struct Tabs {
//!     active: f64,
//! }
//!
//! let mut registry = Registry::new();
//! registry.set(
//!     "tabs",
//!     CompositeDefinition::new(Constructor::new(|opts: Options| {
//!         Ok(Tabs { active: opts.get_number("active").unwrap_or(0.0) })
//!     }))
//!     .with_options(Options::new().with("active", 1))
//!     .with_after_start(|instance| {
//!         assert!(instance.downcast_ref::<Tabs>().is_some());
//!         Ok(())
//!     }),
//! );
//! assert!(registry.contains("tabs"));
//! ```

pub mod registry;
pub mod types;

pub use registry::{Registry, RegistryHandle};
pub use types::{AfterStart, BeforeStart, CompositeDefinition, Constructor, ControllerDefinition, Instance};
