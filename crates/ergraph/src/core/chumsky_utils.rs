//! Shared chumsky parser utilities for declaration parsing
//!
//! This module provides the small combinators the declaration scanner and the
//! relationship grammar are built from. All of them run against masked source
//! text (see [`MaskedSource`](super::MaskedSource)), so they never need to
//! understand comments.

use chumsky::prelude::*;

/// Parse optional whitespace including newlines.
///
/// Uses explicit character matching to avoid the "repeated combinator making no progress"
/// issue that can occur with `chumsky::text::whitespace().repeated()`.
pub fn optional_whitespace<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    one_of(" \t\n\r").repeated().ignored()
}

/// Parse required whitespace (at least one whitespace/newline character).
pub fn whitespace_required<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    one_of(" \t\n\r").repeated().at_least(1).ignored()
}

/// Parse an identifier into an owned string.
pub fn identifier<'src>() -> impl Parser<'src, &'src str, String> + Clone {
    text::ident().map(|s: &str| s.to_string())
}

/// Parse a dotted name such as `Reflect.metadata`.
pub fn dotted_name<'src>() -> impl Parser<'src, &'src str, String> + Clone {
    text::ident()
        .then(just('.').then(text::ident()).repeated())
        .to_slice()
        .map(|s: &str| s.to_string())
}

/// Parse a parenthesized group with arbitrarily nested parentheses.
pub fn balanced_parens<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    recursive(|group| {
        just('(')
            .ignore_then(none_of("()").ignored().or(group).repeated())
            .then_ignore(just(')'))
            .ignored()
    })
}

/// Skip everything up to (not including) the `)` closing the current group.
pub fn rest_of_group<'src>() -> impl Parser<'src, &'src str, ()> + Clone {
    none_of("()").ignored().or(balanced_parens()).repeated()
}

fn quoted<'src>(quote: char) -> impl Parser<'src, &'src str, &'src str> + Clone {
    let escaped = just('\\').then(any()).ignored();
    let plain = any()
        .filter(move |c: &char| *c != quote && *c != '\\' && *c != '\n')
        .ignored();
    just(quote)
        .ignore_then(escaped.or(plain).repeated().to_slice())
        .then_ignore(just(quote))
}

/// Parse a single, double or backtick quoted literal, yielding its contents.
pub fn string_literal<'src>() -> impl Parser<'src, &'src str, &'src str> + Clone {
    quoted('\'').or(quoted('"')).or(quoted('`'))
}

/// Run `parser` against the start of `input`.
///
/// Returns the parser output together with the number of bytes it consumed;
/// whatever follows the match is ignored.
pub fn parse_prefix<'src, O>(
    parser: impl Parser<'src, &'src str, O>,
    input: &'src str,
) -> Option<(O, usize)> {
    parser
        .then(any().repeated().to_slice())
        .parse(input)
        .into_result()
        .ok()
        .map(|(output, rest): (O, &str)| (output, input.len() - rest.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optional_whitespace() {
        let parser = optional_whitespace().then(just("test")).then_ignore(end());
        assert!(parser.parse("test").into_result().is_ok());
        assert!(parser.parse(" test").into_result().is_ok());
        assert!(parser.parse("\t\n test").into_result().is_ok());
    }

    #[test]
    fn test_whitespace_required() {
        let parser = just("a")
            .then(whitespace_required())
            .then(just("b"))
            .then_ignore(end());
        assert!(parser.parse("a b").into_result().is_ok());
        assert!(parser.parse("a\nb").into_result().is_ok());
        assert!(parser.parse("ab").into_result().is_err());
    }

    #[test]
    fn test_dotted_name() {
        let parser = dotted_name().then_ignore(end());
        assert_eq!(
            parser.parse("Reflect.metadata").into_result().unwrap(),
            "Reflect.metadata"
        );
        assert_eq!(parser.parse("Column").into_result().unwrap(), "Column");
    }

    #[test]
    fn test_balanced_parens() {
        let parser = balanced_parens().then_ignore(end());
        assert!(parser.parse("()").into_result().is_ok());
        assert!(parser.parse("(a, (b) => b.c, { d: f(1) })").into_result().is_ok());
        assert!(parser.parse("((a)").into_result().is_err());
    }

    #[test]
    fn test_string_literal() {
        let parser = string_literal().then_ignore(end());
        assert_eq!(parser.parse("'ANNUAL'").into_result().unwrap(), "ANNUAL");
        assert_eq!(parser.parse("\"x y\"").into_result().unwrap(), "x y");
        assert_eq!(parser.parse(r"'it\'s'").into_result().unwrap(), r"it\'s");
        assert!(parser.parse("'open").into_result().is_err());
    }

    #[test]
    fn test_parse_prefix_reports_consumed_length() {
        let (name, consumed) = parse_prefix(dotted_name(), "Column({ nullable: true })").unwrap();
        assert_eq!(name, "Column");
        assert_eq!(consumed, 6);
        assert!(parse_prefix(dotted_name(), "(x)").is_none());
    }
}
