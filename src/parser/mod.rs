//! Grammars for the in-memory document model.
//!
//! - [`markup`] turns a small, strict subset of HTML into a
//!   [`Document`](crate::dom::Document).
//! - [`selector`] parses the selector strings used to find candidate elements.

pub mod markup;
pub mod selector;

use pest::error::{Error, ErrorVariant};
use pest::iterators::Pair;
use pest::RuleType;

pub use markup::parse_document;
pub use selector::{CompoundSelector, SelectorList, SimpleSelector};

/// Error for a parse tree shape the grammar should never produce.
pub(crate) fn get_unexpected_error<R: RuleType>(id: i32, pair: &Pair<R>) -> Error<R> {
    let message = format!("Unexpected state reached [{:?}] - {}", pair.as_rule(), id);
    Error::new_from_span(ErrorVariant::CustomError { message }, pair.as_span())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pest::Parser;

    #[derive(pest_derive::Parser)]
    #[grammar_inline = "word = { ASCII_ALPHA+ }"]
    struct WordParser;

    #[test]
    fn test_unexpected_error_names_rule_and_id() {
        let pair = WordParser::parse(Rule::word, "abc").unwrap().next().unwrap();
        let message = get_unexpected_error(9, &pair).to_string();
        assert!(message.contains("Unexpected state reached [word] - 9"));
    }
}
