//! Selector parsing and matching.
//!
//! Supported syntax is a comma separated list of compound selectors. A
//! compound is an optional tag name (or `*`) followed by any number of
//! `#id`, `.class`, `[attr]` and `[attr=value]` parts:
//!
//! ```text
//! [data-controller]
//! div.widget[data-controller="tabs"], #sidebar
//! ```

use pest::error::Error;
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use super::get_unexpected_error;
use crate::dom::DomElement;
use crate::runner::config::{DEFAULT_CONTROLLER_ATTRIBUTE, DEFAULT_SELECTOR};
use crate::runner::error::BinderError;

#[derive(Parser)]
#[grammar = "parser/selector.pest"] // relative to src
struct SelectorParser;

lazy_static! {
    static ref DEFAULT_SELECTOR_LIST: SelectorList =
        SelectorList::attribute_present(DEFAULT_CONTROLLER_ATTRIBUTE);
}

/// One `#id`, `.class` or `[attr]` part of a compound selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    Id(String),
    Class(String),
    Attribute { name: String, value: Option<String> },
}

impl SimpleSelector {
    fn matches(&self, element: &dyn DomElement) -> bool {
        match self {
            SimpleSelector::Id(id) => element.attribute("id").as_deref() == Some(id.as_str()),
            SimpleSelector::Class(class) => element
                .attribute("class")
                .map(|classes| classes.split_whitespace().any(|c| c == class))
                .unwrap_or(false),
            SimpleSelector::Attribute { name, value } => match (element.attribute(name), value) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == *expected,
            },
        }
    }
}

/// A tag constraint plus a list of simple selectors, all of which must match.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    /// Lower-cased tag name; `None` matches any tag.
    pub tag: Option<String>,
    pub parts: Vec<SimpleSelector>,
}

impl CompoundSelector {
    pub fn matches(&self, element: &dyn DomElement) -> bool {
        if let Some(tag) = &self.tag {
            if !element.tag_name().eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        self.parts.iter().all(|part| part.matches(element))
    }
}

/// Comma separated selector groups; an element matches if any group does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(pub Vec<CompoundSelector>);

impl SelectorList {
    /// Parse a selector string.
    pub fn parse(selector: &str) -> Result<Self, BinderError> {
        let to_error = |e: Error<Rule>| BinderError::Selector {
            selector: selector.to_string(),
            message: e.to_string(),
        };
        let mut pairs = SelectorParser::parse(Rule::selector_list, selector).map_err(to_error)?;
        let list = match pairs.next() {
            Some(list) => list,
            None => return Ok(SelectorList(Vec::new())),
        };

        let mut groups = vec![];
        for pair in list.into_inner() {
            match pair.as_rule() {
                Rule::compound => groups.push(build_compound(pair).map_err(to_error)?),
                Rule::EOI => {}
                _ => return Err(to_error(get_unexpected_error(1, &pair))),
            }
        }
        Ok(SelectorList(groups))
    }

    /// `[name]`
    pub fn attribute_present(name: &str) -> Self {
        SelectorList(vec![CompoundSelector {
            tag: None,
            parts: vec![SimpleSelector::Attribute {
                name: name.to_ascii_lowercase(),
                value: None,
            }],
        }])
    }

    pub fn matches(&self, element: &dyn DomElement) -> bool {
        self.0.iter().any(|group| group.matches(element))
    }
}

/// Parse `selector`, reusing the prebuilt list for the default selector.
pub fn compile(selector: &str) -> Result<SelectorList, BinderError> {
    if selector.trim() == DEFAULT_SELECTOR {
        return Ok(DEFAULT_SELECTOR_LIST.clone());
    }
    SelectorList::parse(selector)
}

fn build_compound(pair: Pair<Rule>) -> Result<CompoundSelector, Error<Rule>> {
    let mut compound = CompoundSelector::default();
    for part in pair.into_inner() {
        match part.as_rule() {
            Rule::type_selector => {
                let inner = part
                    .clone()
                    .into_inner()
                    .next()
                    .ok_or_else(|| get_unexpected_error(2, &part))?;
                if inner.as_rule() == Rule::ident {
                    compound.tag = Some(inner.as_str().to_ascii_lowercase());
                }
            }
            Rule::id_selector => {
                compound.parts.push(SimpleSelector::Id(first_ident(&part)?));
            }
            Rule::class_selector => {
                compound.parts.push(SimpleSelector::Class(first_ident(&part)?));
            }
            Rule::attribute_selector => {
                let mut inner = part.clone().into_inner();
                let name = inner
                    .next()
                    .ok_or_else(|| get_unexpected_error(3, &part))?
                    .as_str()
                    .to_ascii_lowercase();
                let value = match inner.next() {
                    None => None,
                    Some(v) => Some(attribute_value(v)?),
                };
                compound.parts.push(SimpleSelector::Attribute { name, value });
            }
            _ => return Err(get_unexpected_error(4, &part)),
        }
    }
    Ok(compound)
}

fn first_ident(pair: &Pair<Rule>) -> Result<String, Error<Rule>> {
    pair.clone()
        .into_inner()
        .next()
        .map(|p| p.as_str().to_string())
        .ok_or_else(|| get_unexpected_error(5, pair))
}

fn attribute_value(pair: Pair<Rule>) -> Result<String, Error<Rule>> {
    match pair.as_rule() {
        Rule::bare_value => Ok(pair.as_str().to_string()),
        Rule::double_quoted | Rule::single_quoted => pair
            .clone()
            .into_inner()
            .next()
            .map(|p| p.as_str().to_string())
            .ok_or_else(|| get_unexpected_error(6, &pair)),
        _ => Err(get_unexpected_error(7, &pair)),
    }
}
