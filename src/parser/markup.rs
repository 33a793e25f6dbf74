//! Markup parsing into an in-memory [`Document`].

use pest::error::{Error, ErrorVariant};
use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use super::get_unexpected_error;
use crate::dom::Document;
use crate::runner::error::BinderError;

#[derive(Parser)]
#[grammar = "parser/markup.pest"] // relative to src
struct MarkupParser;

/// Parse markup into a new document.
///
/// Whitespace-only text between tags is dropped; other text is kept verbatim
/// after decoding the basic character references.
pub fn parse_document(markup: &str) -> Result<Document, BinderError> {
    let to_error = |e: Error<Rule>| BinderError::Markup(e.to_string());
    let mut pairs = MarkupParser::parse(Rule::document, markup).map_err(to_error)?;
    let document = Document::new();
    if let Some(root) = pairs.next() {
        for pair in root.into_inner() {
            build_node(&document, None, pair).map_err(to_error)?;
        }
    }
    Ok(document)
}

fn build_node(document: &Document, parent: Option<usize>, pair: Pair<Rule>) -> Result<(), Error<Rule>> {
    match pair.as_rule() {
        Rule::element => build_element(document, parent, pair),
        Rule::text => {
            let text = pair.as_str();
            if !text.trim().is_empty() {
                document.push_text(parent, decode_entities(text));
            }
            Ok(())
        }
        Rule::comment => {
            let body = pair.into_inner().next().map(|p| p.as_str()).unwrap_or("");
            document.push_comment(parent, body.to_string());
            Ok(())
        }
        Rule::EOI => Ok(()),
        _ => Err(get_unexpected_error(1, &pair)),
    }
}

fn build_element(document: &Document, parent: Option<usize>, pair: Pair<Rule>) -> Result<(), Error<Rule>> {
    let mut inner = pair.clone().into_inner();
    let tag = inner.next().ok_or_else(|| get_unexpected_error(2, &pair))?;
    let (name, attributes) = build_tag(tag.clone())?;
    let index = document.push_element(parent, &name, attributes);

    if tag.as_rule() != Rule::open_tag {
        return Ok(());
    }
    for child in inner {
        if child.as_rule() == Rule::close_tag {
            let close = child
                .clone()
                .into_inner()
                .next()
                .ok_or_else(|| get_unexpected_error(3, &child))?;
            if !close.as_str().eq_ignore_ascii_case(&name) {
                let message = format!("expected </{}>, found </{}>", name, close.as_str());
                return Err(Error::new_from_span(ErrorVariant::CustomError { message }, child.as_span()));
            }
            continue;
        }
        build_node(document, Some(index), child)?;
    }
    Ok(())
}

/// Tag name and attributes of an open, self-closing or void tag.
fn build_tag(pair: Pair<Rule>) -> Result<(String, Vec<(String, String)>), Error<Rule>> {
    let mut inner = pair.clone().into_inner();
    let name = inner
        .next()
        .ok_or_else(|| get_unexpected_error(4, &pair))?
        .as_str()
        .to_string();

    let mut attributes = vec![];
    for attr in inner {
        if attr.as_rule() != Rule::attribute {
            return Err(get_unexpected_error(5, &attr));
        }
        let mut parts = attr.clone().into_inner();
        let attr_name = parts
            .next()
            .ok_or_else(|| get_unexpected_error(6, &attr))?
            .as_str()
            .to_string();
        let value = match parts.next() {
            None => String::new(),
            Some(v) => match v.as_rule() {
                Rule::unquoted => decode_entities(v.as_str()),
                Rule::double_quoted | Rule::single_quoted => {
                    decode_entities(v.into_inner().next().map(|p| p.as_str()).unwrap_or(""))
                }
                _ => return Err(get_unexpected_error(7, &v)),
            },
        };
        attributes.push((attr_name, value));
    }
    Ok((name, attributes))
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
