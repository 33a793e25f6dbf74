//! Controller options.
//!
//! Options are a flat, string-keyed map of loosely typed values. The binder
//! builds one [`Options`] value per dispatch by layering the base
//! configuration, the element handle and the definition's static options;
//! later layers replace earlier keys (shallow merge, nested maps are not
//! merged).

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::convert::TryFrom;
use std::fmt;

use crate::dom::{same_element, ElementRef};
use crate::runner::error::BinderError;

/// Key under which the dispatched element is stored.
pub const ELEMENT_KEY: &str = "element";

/// Key under which the configured selector is stored in the base options.
pub const SELECTOR_KEY: &str = "selector";

/// A single option value.
#[derive(Clone)]
pub enum OptionValue {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<OptionValue>),
    Map(Options),
    Element(ElementRef),
}

impl OptionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            OptionValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_element(&self) -> Option<&ElementRef> {
        match self {
            OptionValue::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Options> {
        match self {
            OptionValue::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl PartialEq for OptionValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (OptionValue::Null, OptionValue::Null) => true,
            (OptionValue::Bool(a), OptionValue::Bool(b)) => a == b,
            (OptionValue::Number(a), OptionValue::Number(b)) => a == b,
            (OptionValue::String(a), OptionValue::String(b)) => a == b,
            (OptionValue::List(a), OptionValue::List(b)) => a == b,
            (OptionValue::Map(a), OptionValue::Map(b)) => a == b,
            (OptionValue::Element(a), OptionValue::Element(b)) => same_element(&**a, &**b),
            _ => false,
        }
    }
}

impl fmt::Debug for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Null => write!(f, "null"),
            OptionValue::Bool(b) => write!(f, "{}", b),
            OptionValue::Number(n) => write!(f, "{}", n),
            OptionValue::String(s) => write!(f, "{:?}", s),
            OptionValue::List(items) => f.debug_list().entries(items).finish(),
            OptionValue::Map(map) => fmt::Debug::fmt(map, f),
            OptionValue::Element(el) => write!(f, "{:?}", el),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(b: bool) -> Self {
        OptionValue::Bool(b)
    }
}

impl From<f64> for OptionValue {
    fn from(n: f64) -> Self {
        OptionValue::Number(n)
    }
}

impl From<i32> for OptionValue {
    fn from(n: i32) -> Self {
        OptionValue::Number(n as f64)
    }
}

impl From<i64> for OptionValue {
    fn from(n: i64) -> Self {
        OptionValue::Number(n as f64)
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::String(s.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(s: String) -> Self {
        OptionValue::String(s)
    }
}

impl From<Vec<OptionValue>> for OptionValue {
    fn from(items: Vec<OptionValue>) -> Self {
        OptionValue::List(items)
    }
}

impl From<Options> for OptionValue {
    fn from(map: Options) -> Self {
        OptionValue::Map(map)
    }
}

impl From<ElementRef> for OptionValue {
    fn from(el: ElementRef) -> Self {
        OptionValue::Element(el)
    }
}

impl TryFrom<toml::Value> for OptionValue {
    type Error = BinderError;

    fn try_from(value: toml::Value) -> Result<Self, Self::Error> {
        Ok(match value {
            toml::Value::String(s) => OptionValue::String(s),
            toml::Value::Integer(i) => OptionValue::Number(i as f64),
            toml::Value::Float(f) => OptionValue::Number(f),
            toml::Value::Boolean(b) => OptionValue::Bool(b),
            toml::Value::Datetime(d) => OptionValue::String(d.to_string()),
            toml::Value::Array(items) => OptionValue::List(
                items
                    .into_iter()
                    .map(OptionValue::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            toml::Value::Table(table) => OptionValue::Map(Options::try_from(table)?),
        })
    }
}

/// String-keyed option map.
#[derive(Clone, Default, PartialEq)]
pub struct Options {
    entries: BTreeMap<String, OptionValue>,
}

impl Options {
    pub fn new() -> Self {
        Options::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<OptionValue>) -> Option<OptionValue> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<OptionValue> {
        self.entries.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.entries.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(OptionValue::as_str)
    }

    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(OptionValue::as_number)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(OptionValue::as_bool)
    }

    /// The element stored under [`ELEMENT_KEY`], if it is an element.
    pub fn element(&self) -> Option<&ElementRef> {
        self.get(ELEMENT_KEY).and_then(OptionValue::as_element)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, OptionValue> {
        self.entries.iter()
    }

    /// Copy every entry of `other` over this map.
    pub fn extend_from(&mut self, other: &Options) {
        for (key, value) in other.iter() {
            self.entries.insert(key.clone(), value.clone());
        }
    }

    /// Shallow merge of `layers`; later layers win on conflicting keys.
    pub fn merge<'a>(layers: impl IntoIterator<Item = &'a Options>) -> Options {
        let mut merged = Options::new();
        for layer in layers {
            merged.extend_from(layer);
        }
        merged
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

impl<K: Into<String>, V: Into<OptionValue>> FromIterator<(K, V)> for Options {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut options = Options::new();
        for (key, value) in iter {
            options.insert(key, value);
        }
        options
    }
}

impl<'a> IntoIterator for &'a Options {
    type Item = (&'a String, &'a OptionValue);
    type IntoIter = btree_map::Iter<'a, String, OptionValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl TryFrom<toml::Table> for Options {
    type Error = BinderError;

    fn try_from(table: toml::Table) -> Result<Self, Self::Error> {
        let mut options = Options::new();
        for (key, value) in table {
            options.insert(key, OptionValue::try_from(value)?);
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use std::rc::Rc;

    #[test]
    fn test_merge_later_layers_win() {
        let base = Options::new().with("selector", "[data-controller]").with("theme", "light");
        let static_options = Options::new().with("theme", "dark").with("delay", 250);

        let merged = Options::merge([&base, &static_options]);
        assert_eq!(merged.get_str("theme"), Some("dark"));
        assert_eq!(merged.get_str("selector"), Some("[data-controller]"));
        assert_eq!(merged.get_number("delay"), Some(250.0));
    }

    #[test]
    fn test_merge_is_shallow() {
        let a = Options::new().with("nested", Options::new().with("x", 1).with("y", 2));
        let b = Options::new().with("nested", Options::new().with("x", 10));

        let merged = Options::merge([&a, &b]);
        let nested = merged.get("nested").and_then(OptionValue::as_map).unwrap();
        assert_eq!(nested.get_number("x"), Some(10.0));
        assert!(!nested.contains_key("y"));
    }

    #[test]
    fn test_element_values_compare_by_identity() {
        let doc = Document::new();
        let el: ElementRef = Rc::new(doc.create_element("div"));
        let other: ElementRef = Rc::new(doc.create_element("div"));

        let a = Options::new().with(ELEMENT_KEY, el.clone());
        let b = Options::new().with(ELEMENT_KEY, el);
        let c = Options::new().with(ELEMENT_KEY, other);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert!(a.element().is_some());
    }

    #[test]
    fn test_from_toml_table() {
        let table: toml::Table = toml::from_str("a = 1\nb = [true, 'x']\n[c]\nd = 2.5").unwrap();
        let options = Options::try_from(table).unwrap();
        assert_eq!(options.get_number("a"), Some(1.0));
        assert_eq!(
            options.get("b"),
            Some(&OptionValue::List(vec![OptionValue::Bool(true), "x".into()]))
        );
        assert_eq!(
            options.get("c").and_then(OptionValue::as_map).and_then(|c| c.get_number("d")),
            Some(2.5)
        );
    }
}
