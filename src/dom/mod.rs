//! Document capabilities consumed by the binder.
//!
//! The binder never walks a concrete tree. It asks a [`DocumentSource`] for
//! the elements matching a selector and reads attributes through
//! [`DomElement`]. Any DOM binding can implement these two traits; this crate
//! ships an in-memory [`Document`] built from markup so the binder can be used
//! and tested without a browser.
//!
//! ```text
//! Binder::run
//!    │  select("[data-controller]")
//!    ▼
//! DocumentSource ──► Vec<ElementRef>
//!                        │ attribute("data-controller")
//!                        │ attribute("data-priority")
//!                        ▼
//!                    DomElement
//! ```

pub mod document;

use std::fmt;
use std::rc::Rc;

use uuid::Uuid;

use crate::runner::error::BinderError;

pub use document::{Document, Element};

/// A handle to one element of a document.
pub trait DomElement: fmt::Debug {
    /// Stable identity of the underlying node.
    ///
    /// Two handles referring to the same node return the same id.
    fn id(&self) -> Uuid;

    /// Lower-cased tag name.
    fn tag_name(&self) -> String;

    /// Value of the named attribute, `None` when the attribute is absent.
    fn attribute(&self, name: &str) -> Option<String>;
}

/// Shared, type-erased element handle.
pub type ElementRef = Rc<dyn DomElement>;

/// Something that can be queried for elements.
pub trait DocumentSource {
    /// All elements matching `selector`, in document order.
    fn select(&self, selector: &str) -> Result<Vec<ElementRef>, BinderError>;
}

impl<T: DocumentSource + ?Sized> DocumentSource for &T {
    fn select(&self, selector: &str) -> Result<Vec<ElementRef>, BinderError> {
        (**self).select(selector)
    }
}

impl<T: DocumentSource + ?Sized> DocumentSource for Rc<T> {
    fn select(&self, selector: &str) -> Result<Vec<ElementRef>, BinderError> {
        (**self).select(selector)
    }
}

/// Identity comparison between two element handles.
pub fn same_element(a: &dyn DomElement, b: &dyn DomElement) -> bool {
    a.id() == b.id()
}
