//! In-memory document tree.
//!
//! A [`Document`] is a cheap, clonable handle over a shared node arena.
//! Element handles keep the arena alive and read it on demand, so changes a
//! controller makes while the binder is running are visible to every handle.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use uuid::Uuid;

use super::{DocumentSource, DomElement, ElementRef};
use crate::parser::selector::{self, SelectorList};
use crate::runner::error::BinderError;

enum NodeData {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
    Comment(String),
}

struct Node {
    id: Uuid,
    parent: Option<usize>,
    children: Vec<usize>,
    data: NodeData,
}

#[derive(Default)]
struct Tree {
    nodes: Vec<Node>,
    roots: Vec<usize>,
}

impl Tree {
    fn push(&mut self, parent: Option<usize>, data: NodeData) -> usize {
        let index = self.nodes.len();
        self.nodes.push(Node {
            id: Uuid::new_v4(),
            parent,
            children: Vec::new(),
            data,
        });
        match parent {
            Some(p) => self.nodes[p].children.push(index),
            None => self.roots.push(index),
        }
        index
    }

    /// Element indices in document order (pre-order, depth first).
    fn element_order(&self) -> Vec<usize> {
        let mut order = Vec::new();
        let mut stack: Vec<usize> = self.roots.iter().rev().copied().collect();
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index];
            if let NodeData::Element { .. } = node.data {
                order.push(index);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        order
    }

    fn is_element(&self, index: usize) -> bool {
        matches!(self.nodes[index].data, NodeData::Element { .. })
    }
}

/// Shared handle to an in-memory document.
#[derive(Clone, Default)]
pub struct Document {
    tree: Rc<RefCell<Tree>>,
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Document::default()
    }

    /// Parse markup into a document.
    pub fn parse(markup: &str) -> Result<Self, BinderError> {
        crate::parser::markup::parse_document(markup)
    }

    /// Create a new element at the top level of the document.
    pub fn create_element(&self, tag: &str) -> Element {
        let index = self.push_element(None, tag, Vec::new());
        self.element(index)
    }

    pub(crate) fn push_element(
        &self,
        parent: Option<usize>,
        tag: &str,
        attributes: Vec<(String, String)>,
    ) -> usize {
        let attributes = attributes
            .into_iter()
            .map(|(name, value)| (name.to_ascii_lowercase(), value))
            .collect();
        self.tree.borrow_mut().push(
            parent,
            NodeData::Element {
                tag: tag.to_ascii_lowercase(),
                attributes,
            },
        )
    }

    pub(crate) fn push_text(&self, parent: Option<usize>, text: String) {
        self.tree.borrow_mut().push(parent, NodeData::Text(text));
    }

    pub(crate) fn push_comment(&self, parent: Option<usize>, text: String) {
        self.tree.borrow_mut().push(parent, NodeData::Comment(text));
    }

    fn element(&self, index: usize) -> Element {
        let id = self.tree.borrow().nodes[index].id;
        Element {
            tree: Rc::clone(&self.tree),
            index,
            id,
        }
    }

    /// Every element, in document order.
    pub fn elements(&self) -> Vec<Element> {
        let order = self.tree.borrow().element_order();
        order.into_iter().map(|i| self.element(i)).collect()
    }

    /// Top-level elements.
    pub fn root_elements(&self) -> Vec<Element> {
        let roots: Vec<usize> = {
            let tree = self.tree.borrow();
            tree.roots
                .iter()
                .copied()
                .filter(|&i| tree.is_element(i))
                .collect()
        };
        roots.into_iter().map(|i| self.element(i)).collect()
    }

    /// Number of elements in the document.
    pub fn element_count(&self) -> usize {
        self.tree.borrow().element_order().len()
    }

    /// Elements matching `selectors`, in document order.
    pub fn query_selector_all(&self, selectors: &SelectorList) -> Vec<Element> {
        self.elements()
            .into_iter()
            .filter(|el| selectors.matches(el))
            .collect()
    }

    /// First element whose `id` attribute equals `id`.
    pub fn get_element_by_id(&self, id: &str) -> Option<Element> {
        self.elements()
            .into_iter()
            .find(|el| el.attribute("id").as_deref() == Some(id))
    }

    /// True when both handles share the same tree.
    pub fn ptr_eq(&self, other: &Document) -> bool {
        Rc::ptr_eq(&self.tree, &other.tree)
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("elements", &self.element_count())
            .finish()
    }
}

impl DocumentSource for Document {
    fn select(&self, selector: &str) -> Result<Vec<ElementRef>, BinderError> {
        let selectors = selector::compile(selector)?;
        Ok(self
            .query_selector_all(&selectors)
            .into_iter()
            .map(|el| Rc::new(el) as ElementRef)
            .collect())
    }
}

/// Handle to one element node of a [`Document`].
#[derive(Clone)]
pub struct Element {
    tree: Rc<RefCell<Tree>>,
    index: usize,
    id: Uuid,
}

impl Element {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn tag_name(&self) -> String {
        match &self.tree.borrow().nodes[self.index].data {
            NodeData::Element { tag, .. } => tag.clone(),
            _ => String::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        match &self.tree.borrow().nodes[self.index].data {
            NodeData::Element { attributes, .. } => attributes
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| v.clone()),
            _ => None,
        }
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// All attributes in source order.
    pub fn attributes(&self) -> Vec<(String, String)> {
        match &self.tree.borrow().nodes[self.index].data {
            NodeData::Element { attributes, .. } => attributes.clone(),
            _ => Vec::new(),
        }
    }

    /// Set an attribute, replacing any previous value.
    pub fn set_attribute(&self, name: &str, value: impl Into<String>) {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        let mut tree = self.tree.borrow_mut();
        if let NodeData::Element { attributes, .. } = &mut tree.nodes[self.index].data {
            match attributes.iter_mut().find(|(n, _)| *n == name) {
                Some(slot) => slot.1 = value,
                None => attributes.push((name, value)),
            }
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attribute(&self, name: &str) -> Option<String> {
        let name = name.to_ascii_lowercase();
        let mut tree = self.tree.borrow_mut();
        if let NodeData::Element { attributes, .. } = &mut tree.nodes[self.index].data {
            let pos = attributes.iter().position(|(n, _)| *n == name)?;
            return Some(attributes.remove(pos).1);
        }
        None
    }

    /// Child elements (text and comments are skipped).
    pub fn children(&self) -> Vec<Element> {
        let indices: Vec<usize> = {
            let tree = self.tree.borrow();
            tree.nodes[self.index]
                .children
                .iter()
                .copied()
                .filter(|&i| tree.is_element(i))
                .collect()
        };
        indices.into_iter().map(|i| self.sibling_handle(i)).collect()
    }

    pub fn parent(&self) -> Option<Element> {
        let parent = self.tree.borrow().nodes[self.index].parent?;
        Some(self.sibling_handle(parent))
    }

    /// Append a new child element and return it.
    pub fn append_child(&self, tag: &str) -> Element {
        let index = self.tree.borrow_mut().push(
            Some(self.index),
            NodeData::Element {
                tag: tag.to_ascii_lowercase(),
                attributes: Vec::new(),
            },
        );
        self.sibling_handle(index)
    }

    /// Append a text node.
    pub fn append_text(&self, text: impl Into<String>) {
        self.tree
            .borrow_mut()
            .push(Some(self.index), NodeData::Text(text.into()));
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self) -> String {
        let tree = self.tree.borrow();
        let mut out = String::new();
        let mut stack = vec![self.index];
        while let Some(index) = stack.pop() {
            let node = &tree.nodes[index];
            match &node.data {
                NodeData::Text(text) => out.push_str(text),
                NodeData::Comment(_) => {}
                NodeData::Element { .. } => stack.extend(node.children.iter().rev().copied()),
            }
        }
        out
    }

    /// The document this element belongs to.
    pub fn document(&self) -> Document {
        Document {
            tree: Rc::clone(&self.tree),
        }
    }

    fn sibling_handle(&self, index: usize) -> Element {
        let id = self.tree.borrow().nodes[index].id;
        Element {
            tree: Rc::clone(&self.tree),
            index,
            id,
        }
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.tag_name())?;
        for (name, value) in self.attributes() {
            write!(f, " {}={:?}", name, value)?;
        }
        write!(f, ">")
    }
}

impl DomElement for Element {
    fn id(&self) -> Uuid {
        self.id
    }

    fn tag_name(&self) -> String {
        Element::tag_name(self)
    }

    fn attribute(&self, name: &str) -> Option<String> {
        Element::attribute(self, name)
    }
}
