//! Decorator argument grammars using chumsky
//!
//! Relationship decorators accept a handful of optional clauses:
//!
//! ```text
//! args     := '(' target [',' inverse] rest ')'
//! target   := params '=>' name
//! inverse  := params '=>' name '.' property
//! params   := '(' ... ')' | identifier
//! rest     := anything with balanced parentheses (options object, etc.)
//! ```
//!
//! Each clause is its own parser, so a new optional clause is one more
//! `.then(...)` rather than another copy of the whole pattern.

use chumsky::prelude::*;

use crate::core::{
    balanced_parens, dotted_name, optional_whitespace, parse_prefix, rest_of_group,
    string_literal,
};

/// Arguments of a relationship decorator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRelationship {
    /// Entity named by the target lambda
    pub target: String,
    /// Property on the target named by the inverse lambda
    pub inverse: Option<String>,
}

/// `params =>`, where params is a parenthesized list or a bare identifier
fn lambda_head<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    balanced_parens()
        .or(text::ident().ignored())
        .then(optional_whitespace())
        .then(just("=>"))
        .then(optional_whitespace())
        .ignored()
}

fn target_parser<'src>() -> impl Parser<'src, &'src str, String> + Clone {
    lambda_head()
        .ignore_then(dotted_name())
        .map(|path: String| last_segment(&path).to_string())
}

fn inverse_parser<'src>() -> impl Parser<'src, &'src str, Option<String>> + Clone {
    just(',')
        .ignore_then(optional_whitespace())
        .ignore_then(lambda_head())
        .ignore_then(dotted_name())
        .map(|path: String| path.rsplit_once('.').map(|(_, property)| property.to_string()))
}

fn relationship_parser<'src>() -> impl Parser<'src, &'src str, ParsedRelationship> {
    just('(')
        .ignore_then(optional_whitespace())
        .ignore_then(target_parser())
        .then_ignore(optional_whitespace())
        .then(inverse_parser().or_not().map(Option::flatten))
        .then_ignore(rest_of_group())
        .then_ignore(just(')'))
        .then_ignore(optional_whitespace())
        .then_ignore(end())
        .map(|(target, inverse)| ParsedRelationship { target, inverse })
}

fn last_segment(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

/// Parse the argument list of a relationship decorator, parentheses included
pub fn parse_relationship_args(args: &str) -> Option<ParsedRelationship> {
    relationship_parser().parse(args).into_result().ok()
}

/// True when the argument list starts with a type thunk (`() => Address`)
pub fn is_type_thunk(args: &str) -> bool {
    let thunk = just('(')
        .ignore_then(optional_whitespace())
        .ignore_then(lambda_head());
    parse_prefix(thunk, args).is_some()
}

/// The first argument when it is a string literal (`('employees')`)
pub fn leading_string_literal(args: &str) -> Option<String> {
    let literal = just('(')
        .ignore_then(optional_whitespace())
        .ignore_then(string_literal());
    parse_prefix(literal, args).map(|(value, _)| value.to_string())
}

/// True when an options object in `args` sets `key: true`
pub fn option_is_true(args: &str, key: &str) -> bool {
    let flag = just(key)
        .then(optional_whitespace())
        .then(just(':'))
        .then(optional_whitespace())
        .then(text::keyword("true"));
    args.match_indices(key).any(|(pos, _)| {
        let word_start = !matches!(
            args[..pos].chars().next_back(),
            Some(c) if c.is_alphanumeric() || c == '_' || c == '$'
        );
        word_start && parse_prefix(flag.clone(), &args[pos..]).is_some()
    })
}
