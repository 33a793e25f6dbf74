//! # ctrl - declarative controller binder
//!
//! Scans a document for elements tagged with `data-controller`, resolves the
//! named controller from a registry, merges its options and starts it,
//! running optional `beforeStart` / `afterStart` hooks around construction.
//! Elements with a higher `data-priority` are started first.
//!
//! ## Quick Start
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use ctrl::dom::Document;
//! use ctrl::runner::controller::{CompositeDefinition, Constructor, Registry};
//! use ctrl::runner::{Binder, BinderConfig, Options};
//!
//! struct Greeter {
//!     name: String,
//! }
//!
//! let doc = Document::parse(r#"<main><p data-controller="greet" data-name="Ada"></p></main>"#)?;
//!
//! let greeted = Rc::new(RefCell::new(Vec::new()));
//! let log = greeted.clone();
//!
//! let mut controllers = Registry::new();
//! controllers.set(
//!     "greet",
//!     CompositeDefinition::new(Constructor::new(|opts: Options| {
//!         let el = opts.element().expect("the element is always set");
//!         Ok(Greeter { name: el.attribute("data-name").unwrap_or_default() })
//!     }))
//!     .with_after_start(move |instance| {
//!         let greeter = instance.downcast_ref::<Greeter>().expect("a Greeter");
//!         log.borrow_mut().push(format!("hello {}", greeter.name));
//!         Ok(())
//!     }),
//! );
//!
//! let binder = Binder::new(doc, controllers, BinderConfig::default());
//! binder.run()?;
//!
//! assert_eq!(*greeted.borrow(), vec!["hello Ada".to_string()]);
//! # Ok::<(), ctrl::runner::BinderError>(())
//! ```
//!
//! ## Architecture
//!
//! - **[`runner`]** - registry, logger, priority sorter, dispatcher and the
//!   [`Binder`](runner::Binder) entry point
//! - **[`dom`]** - the document capabilities the binder consumes, plus an
//!   in-memory [`Document`](dom::Document)
//! - **[`parser`]** - markup and selector grammars for the in-memory document

#[macro_use]
extern crate lazy_static;

pub mod dom;
pub mod parser;
pub mod runner;
